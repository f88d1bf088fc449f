// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;

use crate::config::{Config, run_instances, timeout_from_secs};
use crate::probes::{
    AgentItem, AgentMetricProbe, DEFAULT_AGENT_PORT, HttpLatencyProbe, Probe, TcpPortProbe,
};
use crate::result::{AggregateResult, ProbeResult, aggregate};
use crate::severity::Severity;
use crate::threshold::Thresholds;

#[derive(Parser, Debug)]
#[command(name = "dd-netprobe", version)]
#[command(about = "Single-shot network health probes with monitoring-plugin exit codes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Grade the response time of one HTTP GET
    Http(HttpArgs),
    /// Check that TCP ports accept connections
    Port(PortArgs),
    /// Query a CPU or memory item from a remote monitoring agent
    Agent(AgentArgs),
    /// Run every instance of a YAML configuration file
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct HttpArgs {
    /// URL to check, `http://` is assumed when no scheme is given
    #[arg(short = 'H', long = "host")]
    pub url: String,

    /// Warning threshold in milliseconds
    #[arg(short, long)]
    pub warning: f64,

    /// Critical threshold in milliseconds
    #[arg(short, long)]
    pub critical: f64,

    /// Timeout in seconds
    #[arg(short, long, default_value = "10", value_parser = parse_timeout)]
    pub timeout: Duration,
}

#[derive(Args, Debug)]
pub struct PortArgs {
    #[arg(short = 'H', long)]
    pub host: String,

    /// Comma separated list of ports, checked in order
    #[arg(short = 'P', long, value_delimiter = ',', required = true)]
    pub ports: Vec<u16>,

    /// Timeout in seconds, per port
    #[arg(short, long, default_value = "5", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// String expected in the reply to a HEAD request
    #[arg(short, long, alias = "content-check")]
    pub content: Option<String>,
}

#[derive(Args, Debug)]
pub struct AgentArgs {
    #[arg(short = 'H', long)]
    pub host: String,

    /// Item to query: cpu or memory
    #[arg(long)]
    pub check: AgentItem,

    /// Warning threshold (percent for cpu, MB for memory)
    #[arg(long)]
    pub warning_threshold: Option<f64>,

    /// Critical threshold (percent for cpu, MB for memory)
    #[arg(long)]
    pub critical_threshold: Option<f64>,

    #[arg(long, default_value_t = DEFAULT_AGENT_PORT)]
    pub port: u16,

    /// Timeout in seconds
    #[arg(short, long, default_value = "10", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// Accepted for compatibility, not used
    #[arg(long)]
    pub api_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the YAML configuration
    #[arg(long)]
    pub config: PathBuf,
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number of seconds"))?;
    timeout_from_secs(secs).map_err(|e| e.to_string())
}

impl HttpArgs {
    pub fn probe(&self) -> HttpLatencyProbe {
        HttpLatencyProbe::new(
            &self.url,
            Thresholds::new(Some(self.warning), Some(self.critical)),
            self.timeout,
        )
    }
}

impl PortArgs {
    pub fn probe(&self) -> TcpPortProbe {
        TcpPortProbe::new(&self.host, self.ports.clone(), self.timeout)
            .with_content_match(self.content.clone())
    }
}

impl AgentArgs {
    pub fn probe(&self) -> AgentMetricProbe {
        if let Some(url) = &self.api_url {
            info!("Ignoring --api-url {url}");
        }
        AgentMetricProbe::new(
            &self.host,
            self.check,
            Thresholds::new(self.warning_threshold, self.critical_threshold),
        )
        .with_port(self.port)
        .with_timeout(self.timeout)
    }
}

impl Cli {
    /// Configuration file used by the selected command, if any.
    pub fn config_path(&self) -> Option<&Path> {
        match &self.command {
            Command::Run(args) => Some(&args.config),
            _ => None,
        }
    }
}

/// Execute the selected command. `config` is the outcome of loading
/// [`Cli::config_path`] and is only consulted by `run`.
pub fn execute(command: &Command, config: Option<Result<Config>>) -> AggregateResult {
    match command {
        Command::Http(args) => args.probe().check(),
        Command::Port(args) => args.probe().check(),
        Command::Agent(args) => args.probe().check(),
        Command::Run(args) => match config {
            Some(Ok(config)) => run_instances(&config),
            Some(Err(err)) => aggregate(vec![ProbeResult::new(
                args.config.display().to_string(),
                Severity::Unknown,
                format!("Cannot load configuration: {err:#}"),
            )]),
            None => aggregate(vec![ProbeResult::new(
                args.config.display().to_string(),
                Severity::Unknown,
                "Cannot load configuration: not loaded",
            )]),
        },
    }
}

/// Install the stderr logger at `level`. A failure is reported as a single
/// UNKNOWN result so the process still prints one plugin line.
pub fn init_logger(level: log::Level) -> Result<(), AggregateResult> {
    simple_logger::init_with_level(level).map_err(|err| {
        aggregate(vec![ProbeResult::new(
            "logger",
            Severity::Unknown,
            format!("Cannot initialize logging: {err}"),
        )])
    })
}

/// Process exit code for an argument parsing failure: help and version
/// requests succeed, anything else is UNKNOWN.
pub fn parse_error_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        Severity::Unknown.exit_code()
    } else {
        Severity::Ok.exit_code()
    }
}
