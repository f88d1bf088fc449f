// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

pub mod cli;
pub mod config;
mod errors;
pub mod probes;
pub mod protocol;
mod result;
mod severity;
mod threshold;

// Re-export the public API
pub use errors::{ConfigError, ProbeError, ProtocolError};
pub use probes::{
    AgentItem, AgentMetricProbe, HttpClient, HttpLatencyProbe, HttpReply, Probe, TcpPortProbe,
    UreqClient,
};
pub use result::{AggregateResult, PerfData, ProbeResult, aggregate};
pub use severity::Severity;
pub use threshold::{Direction, Evaluation, Metric, Thresholds, evaluate};
