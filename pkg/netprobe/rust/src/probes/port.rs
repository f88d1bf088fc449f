// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::{Probe, apply_io_timeout, connect, io_failure};
use crate::errors::{ConfigError, ProbeError};
use crate::result::{PerfData, ProbeResult};
use crate::severity::Severity;

pub const DEFAULT_PORT_TIMEOUT: Duration = Duration::from_secs(5);

// One read of the HEAD response is enough to find a banner or status line
const CONTENT_BUFFER_LEN: usize = 1024;
const LATENCY_PRECISION: usize = 3;

/// Checks that each port of one host accepts TCP connections, optionally
/// asserting that a HEAD response contains a given string.
///
/// Ports are probed one after the other; a failing port never stops the
/// others and results keep the order of `ports`.
pub struct TcpPortProbe {
    host: String,
    ports: Vec<u16>,
    timeout: Duration,
    content_match: Option<String>,
}

impl TcpPortProbe {
    pub fn new(host: &str, ports: Vec<u16>, timeout: Duration) -> Self {
        Self {
            host: host.to_string(),
            ports,
            timeout,
            content_match: None,
        }
    }

    pub fn with_content_match(mut self, content: Option<String>) -> Self {
        self.content_match = content.filter(|c| !c.is_empty());
        self
    }

    fn check_port(&self, port: u16) -> ProbeResult {
        let target = format!("{}:{}", self.host, port);
        debug!("Performing TCP check: {target}");

        let start = Instant::now();
        let stream = match connect(&self.host, port, self.timeout) {
            Ok(stream) => stream,
            Err(ProbeError::Timeout(_)) => {
                warn!("TCP check timed out: {target}");
                return ProbeResult::new(
                    target,
                    Severity::Critical,
                    format!("Port {port} on {} timed out", self.host),
                )
                .with_perfdata(self.latency_perfdata(self.timeout));
            }
            Err(err) => {
                warn!("TCP check connection failed: {target} - {err}");
                return ProbeResult::new(
                    target,
                    Severity::Critical,
                    format!("Port {port} on {} is closed or unreachable: {err}", self.host),
                );
            }
        };
        let latency = start.elapsed();

        if let Some(needle) = &self.content_match {
            match self.fetch_head(stream) {
                Ok(response) if !response.contains(needle.as_str()) => {
                    warn!("TCP check content mismatch on {target}: missing '{needle}'");
                    return ProbeResult::new(
                        target,
                        Severity::Warning,
                        format!("Port {port} open but content mismatch (missing: {needle})"),
                    )
                    .with_measurement(latency.as_secs_f64());
                }
                Ok(_) => {}
                Err(ProbeError::Timeout(_)) => {
                    return ProbeResult::new(
                        target,
                        Severity::Critical,
                        format!("Port {port} on {} timed out waiting for content", self.host),
                    )
                    .with_perfdata(self.latency_perfdata(self.timeout));
                }
                Err(err) => {
                    return ProbeResult::new(
                        target,
                        Severity::Critical,
                        format!("Port {port} on {} content check failed: {err}", self.host),
                    );
                }
            }
        }

        ProbeResult::new(
            target,
            Severity::Ok,
            format!("Port {port} on {} is open", self.host),
        )
        .with_measurement(latency.as_secs_f64())
        .with_perfdata(self.latency_perfdata(latency))
    }

    /// Send a minimal HEAD request and return whatever one read yields.
    fn fetch_head(&self, mut stream: TcpStream) -> Result<String, ProbeError> {
        apply_io_timeout(&stream, self.timeout)?;

        let request = format!("HEAD / HTTP/1.1\r\nHost: {}\r\n\r\n", self.host);
        stream
            .write_all(request.as_bytes())
            .map_err(|e| io_failure(e, self.timeout))?;

        let mut buf = [0u8; CONTENT_BUFFER_LEN];
        let read = stream
            .read(&mut buf)
            .map_err(|e| io_failure(e, self.timeout))?;
        let received = buf.get(..read).unwrap_or_default();
        Ok(String::from_utf8_lossy(received).into_owned())
    }

    fn latency_perfdata(&self, latency: Duration) -> PerfData {
        PerfData::new("latency", latency.as_secs_f64(), "s").with_precision(LATENCY_PRECISION)
    }
}

impl Probe for TcpPortProbe {
    fn name(&self) -> &str {
        "port"
    }

    fn run(&self) -> Vec<ProbeResult> {
        if self.ports.is_empty() {
            let err = ProbeError::Config(ConfigError::NoPorts);
            return vec![ProbeResult::failed(&self.host, "Cannot check ports", &err)];
        }
        self.ports.iter().map(|&port| self.check_port(port)).collect()
    }
}
