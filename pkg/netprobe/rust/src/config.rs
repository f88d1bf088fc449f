// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Check configuration in the usual `init_config` / `instances` layout:
//!
//! ```yaml
//! init_config:
//!   timeout: 5
//!   log_level: info
//! instances:
//!   - type: http
//!     url: https://example.com
//!     warning: 100
//!     critical: 500
//!   - type: port
//!     host: db.internal
//!     ports: [5432, 6432]
//!   - type: agent
//!     host: 10.0.0.12
//!     check: memory
//!     warning_threshold: 4096
//!     critical_threshold: 1024
//! ```

use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Deserializer};

use crate::errors::{ConfigError, ProbeError};
use crate::probes::{
    AgentItem, AgentMetricProbe, DEFAULT_AGENT_PORT, DEFAULT_AGENT_TIMEOUT, DEFAULT_HTTP_TIMEOUT,
    DEFAULT_PORT_TIMEOUT, HttpLatencyProbe, Probe, TcpPortProbe,
};
use crate::result::{AggregateResult, ProbeResult, aggregate};
use crate::threshold::Thresholds;

const DEFAULT_LOG_LEVEL: log::Level = log::Level::Warn;

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct InitConfig {
    /// Seconds; used by instances that set no timeout of their own.
    pub timeout: Option<f64>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, deserialize_with = "null_as_default")]
    pub init_config: InitConfig,
    /// Kept raw so one malformed instance does not reject the whole file.
    #[serde(default, deserialize_with = "null_as_default")]
    pub instances: Vec<serde_yaml::Value>,
}

// A bare `init_config:` key is null in YAML
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Instance {
    Http {
        url: String,
        warning: Option<f64>,
        critical: Option<f64>,
        timeout: Option<f64>,
    },
    Port {
        host: String,
        #[serde(default)]
        ports: Vec<u16>,
        content: Option<String>,
        timeout: Option<f64>,
    },
    Agent {
        host: String,
        check: String,
        warning_threshold: Option<f64>,
        critical_threshold: Option<f64>,
        port: Option<u16>,
        timeout: Option<f64>,
    },
}

/// Convert a user supplied number of seconds into a probe timeout.
pub fn timeout_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTimeout(secs))
    } else {
        Err(ConfigError::InvalidTimeout(secs))
    }
}

impl Instance {
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, ConfigError> {
        serde_yaml::from_value(value).map_err(|e| ConfigError::InvalidInstance(e.to_string()))
    }

    /// Label used when the instance cannot be turned into a probe.
    pub fn target(&self) -> &str {
        match self {
            Instance::Http { url, .. } => url,
            Instance::Port { host, .. } | Instance::Agent { host, .. } => host,
        }
    }

    fn timeout(&self, init: &InitConfig, default: Duration) -> Result<Duration, ConfigError> {
        let own = match self {
            Instance::Http { timeout, .. }
            | Instance::Port { timeout, .. }
            | Instance::Agent { timeout, .. } => *timeout,
        };
        own.or(init.timeout).map_or(Ok(default), timeout_from_secs)
    }

    /// Instantiate the probe described by this instance. The instance
    /// timeout wins over `init_config.timeout`, which wins over the probe
    /// default.
    pub fn build(&self, init: &InitConfig) -> Result<Box<dyn Probe>, ConfigError> {
        match self {
            Instance::Http {
                url,
                warning,
                critical,
                ..
            } => {
                let warning = warning.ok_or(ConfigError::MissingField("warning"))?;
                let critical = critical.ok_or(ConfigError::MissingField("critical"))?;
                let timeout = self.timeout(init, DEFAULT_HTTP_TIMEOUT)?;
                Ok(Box::new(HttpLatencyProbe::new(
                    url,
                    Thresholds::new(Some(warning), Some(critical)),
                    timeout,
                )))
            }
            Instance::Port {
                host,
                ports,
                content,
                ..
            } => {
                if ports.is_empty() {
                    return Err(ConfigError::NoPorts);
                }
                let timeout = self.timeout(init, DEFAULT_PORT_TIMEOUT)?;
                Ok(Box::new(
                    TcpPortProbe::new(host, ports.clone(), timeout)
                        .with_content_match(content.clone()),
                ))
            }
            Instance::Agent {
                host,
                check,
                warning_threshold,
                critical_threshold,
                port,
                ..
            } => {
                let item: AgentItem = check.parse()?;
                let timeout = self.timeout(init, DEFAULT_AGENT_TIMEOUT)?;
                Ok(Box::new(
                    AgentMetricProbe::new(
                        host,
                        item,
                        Thresholds::new(*warning_threshold, *critical_threshold),
                    )
                    .with_port(port.unwrap_or(DEFAULT_AGENT_PORT))
                    .with_timeout(timeout),
                ))
            }
        }
    }
}

/// Loads and parses the YAML configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    if contents.trim().is_empty() {
        warn!("Config file {} is empty", path.display());
        return Ok(Config::default());
    }
    let config: Option<Config> = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse YAML config {}", path.display()))?;
    Ok(config.unwrap_or_default())
}

/// Run every configured instance in file order and fold all results into
/// one severity. Instances that cannot be built report UNKNOWN.
pub fn run_instances(config: &Config) -> AggregateResult {
    let mut results = Vec::new();
    for (index, value) in config.instances.iter().enumerate() {
        let built = Instance::from_value(value.clone())
            .map_err(|e| (format!("instance #{index}"), e))
            .and_then(|instance| {
                instance
                    .build(&config.init_config)
                    .map_err(|e| (instance.target().to_string(), e))
            });

        match built {
            Ok(probe) => {
                debug!("Running instance #{index} ({})", probe.name());
                results.extend(probe.run());
            }
            Err((target, err)) => {
                warn!("Skipping instance #{index}: {err}");
                results.push(ProbeResult::failed(
                    target,
                    "Cannot run instance",
                    &ProbeError::Config(err),
                ));
            }
        }
    }
    aggregate(results)
}

fn parse_log_level(level: &str) -> log::Level {
    match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "info" => log::Level::Info,
        "warn" | "warning" => log::Level::Warn,
        "error" | "critical" | "off" => log::Level::Error,
        _ => DEFAULT_LOG_LEVEL,
    }
}

/// Gets the log level from the environment or the configuration.
/// Priority: DD_LOG_LEVEL > LOG_LEVEL > init_config.log_level > warn
pub fn get_log_level(config: Option<&Config>) -> log::Level {
    if let Ok(level) = env::var("DD_LOG_LEVEL") {
        return parse_log_level(&level);
    }

    if let Ok(level) = env::var("LOG_LEVEL") {
        return parse_log_level(&level);
    }

    config
        .and_then(|c| c.init_config.log_level.as_deref())
        .map(parse_log_level)
        .unwrap_or(DEFAULT_LOG_LEVEL)
}
