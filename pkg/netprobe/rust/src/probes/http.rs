// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::error::Error as _;
use std::io;
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::{Probe, io_failure};
use crate::errors::{ConfigError, ProbeError, is_timeout};
use crate::result::ProbeResult;
use crate::severity::Severity;
use crate::threshold::{Metric, Thresholds, evaluate};

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

const EXPECTED_STATUS: u16 = 200;
const SUPPORTED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Status and wall-clock duration of one completed GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub elapsed: Duration,
}

/// Transport used by [`HttpLatencyProbe`].
pub trait HttpClient {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpReply, ProbeError>;
}

/// Blocking client backed by `ureq`. One agent per request, no retries;
/// `timeout` bounds the whole exchange including the body.
#[derive(Debug, Default, Clone, Copy)]
pub struct UreqClient;

impl HttpClient for UreqClient {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpReply, ProbeError> {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        let start = Instant::now();
        let response = match agent.get(url).call() {
            Ok(resp) => resp,
            // Non-2xx/3xx statuses still carry a measurable response
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(transport)) => {
                return Err(transport_error(url, transport, timeout));
            }
        };
        let status = response.status();

        // Drain the body so the measurement covers full response receipt
        let mut body = response.into_reader();
        io::copy(&mut body, &mut io::sink()).map_err(|e| io_failure(e, timeout))?;

        Ok(HttpReply {
            status,
            elapsed: start.elapsed(),
        })
    }
}

fn transport_error(url: &str, transport: ureq::Transport, timeout: Duration) -> ProbeError {
    match transport.kind() {
        ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
            ConfigError::InvalidUrl {
                url: url.to_string(),
                reason: transport.to_string(),
            }
            .into()
        }
        ureq::ErrorKind::Dns => ProbeError::Dns {
            host: transport
                .url()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| url.to_string()),
            reason: transport.to_string(),
        },
        _ => {
            let timed_out = transport
                .source()
                .and_then(|s| s.downcast_ref::<io::Error>())
                .is_some_and(is_timeout);
            if timed_out {
                ProbeError::Timeout(timeout)
            } else {
                ProbeError::Transport(transport.to_string())
            }
        }
    }
}

/// Prefix `http://` when the URL carries no supported scheme.
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    let lower = raw.to_ascii_lowercase();
    if SUPPORTED_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        raw.to_string()
    } else {
        format!("http://{raw}")
    }
}

/// Measures the latency of a single GET and grades it in milliseconds.
pub struct HttpLatencyProbe<C: HttpClient = UreqClient> {
    url: String,
    thresholds: Thresholds,
    timeout: Duration,
    client: C,
}

impl HttpLatencyProbe<UreqClient> {
    pub fn new(url: &str, thresholds: Thresholds, timeout: Duration) -> Self {
        Self {
            url: normalize_url(url),
            thresholds,
            timeout,
            client: UreqClient,
        }
    }
}

impl<C: HttpClient> HttpLatencyProbe<C> {
    pub fn with_client<D: HttpClient>(self, client: D) -> HttpLatencyProbe<D> {
        HttpLatencyProbe {
            url: self.url,
            thresholds: self.thresholds,
            timeout: self.timeout,
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn probe(&self) -> ProbeResult {
        let metric = Metric::RESPONSE_TIME;
        if let Err(err) = self.thresholds.validate(&metric) {
            return ProbeResult::failed(&self.url, "Cannot check website", &err.into());
        }

        debug!(
            "Performing HTTP check: GET {} (timeout {}s)",
            self.url,
            self.timeout.as_secs_f64()
        );
        let reply = match self.client.get(&self.url, self.timeout) {
            Ok(reply) => reply,
            Err(err) => {
                warn!("HTTP check error for {}: {}", self.url, err);
                return ProbeResult::failed(&self.url, "Error checking website", &err);
            }
        };

        let elapsed_ms = reply.elapsed.as_nanos() as f64 / 1_000_000.0;
        if reply.status != EXPECTED_STATUS {
            warn!(
                "HTTP check failed for {}: expected {}, got {}",
                self.url, EXPECTED_STATUS, reply.status
            );
            return ProbeResult::new(
                &self.url,
                Severity::Critical,
                format!("Website is down. Status Code: {}", reply.status),
            )
            .with_measurement(elapsed_ms);
        }

        let eval = evaluate(elapsed_ms, &self.thresholds, &metric);
        debug!("HTTP check for {}: {}", self.url, eval.reason);
        ProbeResult::new(&self.url, eval.severity, eval.reason)
            .with_measurement(elapsed_ms)
            .with_perfdata(eval.perfdata)
    }
}

impl<C: HttpClient> Probe for HttpLatencyProbe<C> {
    fn name(&self) -> &str {
        "http"
    }

    fn run(&self) -> Vec<ProbeResult> {
        vec![self.probe()]
    }
}
