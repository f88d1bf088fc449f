// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;
use std::time::Duration;

use log::{debug, warn};

use super::{Probe, apply_io_timeout, connect, io_failure};
use crate::errors::{ConfigError, ProbeError};
use crate::protocol::{AgentRequest, AgentResponse};
use crate::result::ProbeResult;
use crate::severity::Severity;
use crate::threshold::{Metric, Thresholds, evaluate};

pub const DEFAULT_AGENT_PORT: u16 = 10050;
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(10);

const SUPPORTED_OS: [&str; 2] = ["linux", "macos"];
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
// Replies are a single scalar; anything bigger is not a valid answer
const MAX_RESPONSE_LEN: u64 = 64 * 1024;

/// Items the agent probe knows how to query and interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentItem {
    CpuUsage,
    AvailableMemory,
}

impl AgentItem {
    pub fn key(self) -> &'static str {
        match self {
            AgentItem::CpuUsage => "system.cpu.util[,idle]",
            AgentItem::AvailableMemory => "vm.memory.size[available]",
        }
    }

    pub fn metric(self) -> Metric {
        match self {
            AgentItem::CpuUsage => Metric::CPU_USAGE,
            AgentItem::AvailableMemory => Metric::AVAILABLE_MEMORY,
        }
    }

    fn label(self) -> &'static str {
        match self {
            AgentItem::CpuUsage => "CPU",
            AgentItem::AvailableMemory => "memory",
        }
    }

    /// Turn the raw reply into the graded value: idle percent becomes
    /// usage percent, bytes become megabytes.
    fn convert(self, raw: &str) -> Option<f64> {
        match self {
            AgentItem::CpuUsage => {
                let idle: f64 = raw.parse().ok()?;
                idle.is_finite().then(|| 100.0 - idle)
            }
            AgentItem::AvailableMemory => {
                let bytes: u64 = raw.parse().ok()?;
                Some(bytes as f64 / BYTES_PER_MB)
            }
        }
    }
}

impl FromStr for AgentItem {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(AgentItem::CpuUsage),
            "memory" => Ok(AgentItem::AvailableMemory),
            other => Err(ConfigError::UnsupportedCheck(other.to_string())),
        }
    }
}

impl fmt::Display for AgentItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentItem::CpuUsage => f.write_str("cpu"),
            AgentItem::AvailableMemory => f.write_str("memory"),
        }
    }
}

fn check_os(os: &str) -> Result<(), ConfigError> {
    if SUPPORTED_OS.contains(&os) {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedOs(os.to_string()))
    }
}

/// Queries one item from a remote agent over its framed TCP protocol and
/// grades the converted value.
pub struct AgentMetricProbe {
    host: String,
    port: u16,
    item: AgentItem,
    thresholds: Thresholds,
    timeout: Duration,
}

impl AgentMetricProbe {
    pub fn new(host: &str, item: AgentItem, thresholds: Thresholds) -> Self {
        Self {
            host: host.to_string(),
            port: DEFAULT_AGENT_PORT,
            item,
            thresholds,
            timeout: DEFAULT_AGENT_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// One request per connection: send the frame, read until the agent
    /// closes, decode.
    fn query(&self) -> Result<AgentResponse, ProbeError> {
        let mut stream = connect(&self.host, self.port, self.timeout)?;
        apply_io_timeout(&stream, self.timeout)?;

        let request = AgentRequest::new(self.item.key());
        debug!("Sending '{}' to {}:{}", request.key(), self.host, self.port);
        stream
            .write_all(&request.encode())
            .map_err(|e| io_failure(e, self.timeout))?;

        let mut buf = Vec::new();
        (&mut stream)
            .take(MAX_RESPONSE_LEN)
            .read_to_end(&mut buf)
            .map_err(|e| io_failure(e, self.timeout))?;

        Ok(AgentResponse::decode(&buf)?)
    }

    fn probe(&self) -> ProbeResult {
        let target = format!("{}:{}", self.host, self.port);
        let metric = self.item.metric();

        let ready = check_os(std::env::consts::OS).and_then(|()| self.thresholds.validate(&metric));
        if let Err(err) = ready {
            return ProbeResult::failed(target, "Cannot query agent", &err.into());
        }

        let key = self.item.key();
        debug!("Querying '{key}' from agent at {target}");
        let response = match self.query() {
            Ok(response) => response,
            Err(err) => {
                warn!("Agent query failed for {target}: {err}");
                return ProbeResult::failed(
                    target,
                    &format!("Failed to query '{key}' from agent at {}", self.host),
                    &err,
                );
            }
        };

        if let Some(reason) = response.not_supported() {
            warn!("Agent at {target} does not support '{key}': {reason}");
            return ProbeResult::new(
                target,
                Severity::Critical,
                format!("Agent does not support '{key}': {reason}"),
            );
        }

        let Some(value) = self.item.convert(response.value()) else {
            let err = ProbeError::InvalidResponse {
                raw: response.value().to_string(),
            };
            warn!("Agent at {target}: {err}");
            return ProbeResult::failed(
                target,
                &format!("Invalid {} response from agent", self.item.label()),
                &err,
            );
        };

        let eval = evaluate(value, &self.thresholds, &metric);
        debug!("Agent check for {target}: {}", eval.reason);
        ProbeResult::new(target, eval.severity, eval.reason)
            .with_measurement(value)
            .with_perfdata(eval.perfdata)
    }
}

impl Probe for AgentMetricProbe {
    fn name(&self) -> &str {
        "agent"
    }

    fn run(&self) -> Vec<ProbeResult> {
        vec![self.probe()]
    }
}
