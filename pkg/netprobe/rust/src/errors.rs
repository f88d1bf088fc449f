// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::severity::Severity;

/// Malformed or unexpected agent frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("response too short: got {len} bytes, header needs {expected}")]
    TooShort { len: usize, expected: usize },

    #[error("bad magic bytes {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("unsupported protocol flags 0x{0:02x}")]
    UnsupportedFlags(u8),

    #[error("declared payload length {declared} does not match received {actual} bytes")]
    LengthMismatch { declared: u64, actual: usize },

    #[error("payload is not valid UTF-8")]
    NotUtf8,

    #[error("no data received from agent")]
    Empty,
}

/// Failures while executing a probe.
///
/// Every variant is terminal for its target: probes turn them into a
/// `ProbeResult` carrying the severity from [`ProbeError::severity`].
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(#[source] io::Error),

    #[error("could not resolve {host}: {reason}")]
    Dns { host: String, reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("invalid response '{raw}'")]
    InvalidResponse { raw: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ProbeError {
    /// Network and protocol failures are CRITICAL; a probe that could not
    /// even be attempted is UNKNOWN.
    pub fn severity(&self) -> Severity {
        match self {
            ProbeError::Config(_) => Severity::Unknown,
            _ => Severity::Critical,
        }
    }

    pub(crate) fn from_connect(err: io::Error, timeout: Duration) -> Self {
        if is_timeout(&err) {
            ProbeError::Timeout(timeout)
        } else {
            ProbeError::Connect(err)
        }
    }
}

/// `WouldBlock` is what a socket read with `SO_RCVTIMEO` reports on most
/// unixes when the timeout fires.
pub(crate) fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

/// Unsupported configuration, surfaced as UNKNOWN before any I/O.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid thresholds for {metric}: {reason}")]
    InvalidThresholds { metric: String, reason: String },

    #[error("no ports to check")]
    NoPorts,

    #[error("unsupported check type '{0}'")]
    UnsupportedCheck(String),

    #[error("unsupported OS type {0}")]
    UnsupportedOs(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid timeout {0}: must be a positive number of seconds")]
    InvalidTimeout(f64),

    #[error("invalid instance: {0}")]
    InvalidInstance(String),
}
