// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Probe strategies: HTTP latency, TCP port reachability and remote agent
//! metrics. Each one performs blocking I/O bounded by a timeout and never
//! returns an error to its caller: every failure becomes a `ProbeResult`.

mod agent;
mod http;
mod port;

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::debug;

use crate::errors::ProbeError;
use crate::result::{AggregateResult, ProbeResult, aggregate};

pub use agent::{AgentItem, AgentMetricProbe, DEFAULT_AGENT_PORT, DEFAULT_AGENT_TIMEOUT};
pub use http::{
    DEFAULT_HTTP_TIMEOUT, HttpClient, HttpLatencyProbe, HttpReply, UreqClient, normalize_url,
};
pub use port::{DEFAULT_PORT_TIMEOUT, TcpPortProbe};

/// A single-shot health probe.
pub trait Probe {
    /// Human readable name used in logs.
    fn name(&self) -> &str;

    /// Probe every target, in order. Never empty.
    fn run(&self) -> Vec<ProbeResult>;

    /// Probe and reduce to one overall severity.
    fn check(&self) -> AggregateResult {
        aggregate(self.run())
    }
}

impl<P: Probe + ?Sized> Probe for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self) -> Vec<ProbeResult> {
        (**self).run()
    }
}

fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>, ProbeError> {
    let dns_error = |reason: String| ProbeError::Dns {
        host: host.to_string(),
        reason,
    };
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|e| dns_error(e.to_string()))?
        .collect();
    if addrs.is_empty() {
        return Err(dns_error("no addresses found".to_string()));
    }
    Ok(addrs)
}

/// Connect to `host:port`, trying every resolved address with the same
/// per-attempt timeout. The last error wins when all of them fail.
fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, ProbeError> {
    let mut last_err = None;
    for addr in resolve(host, port)? {
        debug!("Connecting to {addr} (timeout {}s)", timeout.as_secs_f64());
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(ProbeError::from_connect(e, timeout)),
        }
    }
    Err(last_err.unwrap_or_else(|| ProbeError::Dns {
        host: host.to_string(),
        reason: "no addresses found".to_string(),
    }))
}

/// Bound every subsequent read and write on `stream` by `timeout`.
fn apply_io_timeout(stream: &TcpStream, timeout: Duration) -> Result<(), ProbeError> {
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    Ok(())
}

/// Map an I/O failure during an exchange, so read timeouts are reported
/// as timeouts rather than generic errors.
fn io_failure(err: std::io::Error, timeout: Duration) -> ProbeError {
    if crate::errors::is_timeout(&err) {
        ProbeError::Timeout(timeout)
    } else {
        ProbeError::Io(err)
    }
}
