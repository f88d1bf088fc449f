// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::fmt;

use crate::errors::ProbeError;
use crate::severity::Severity;

const DEFAULT_PRECISION: usize = 2;

/// Performance data token appended to a plugin output line:
/// `label=value[unit][;warn[;crit]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PerfData {
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub warning: Option<f64>,
    pub critical: Option<f64>,
    precision: usize,
}

impl PerfData {
    pub fn new(label: &str, value: f64, unit: &str) -> Self {
        Self {
            label: label.to_string(),
            value,
            unit: unit.to_string(),
            warning: None,
            critical: None,
            precision: DEFAULT_PRECISION,
        }
    }

    pub fn with_thresholds(mut self, warning: Option<f64>, critical: Option<f64>) -> Self {
        self.warning = warning;
        self.critical = critical;
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={:.*}{}",
            self.label, self.precision, self.value, self.unit
        )?;
        match (self.warning, self.critical) {
            (None, None) => Ok(()),
            (Some(w), None) => write!(f, ";{w}"),
            (None, Some(c)) => write!(f, ";;{c}"),
            (Some(w), Some(c)) => write!(f, ";{w};{c}"),
        }
    }
}

/// Outcome of probing a single target.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// Host, port, URL or metric the result is about.
    pub target: String,
    /// `None` when the probe failed before measuring anything.
    pub measurement: Option<f64>,
    pub severity: Severity,
    pub message: String,
    pub perfdata: Option<PerfData>,
}

impl ProbeResult {
    pub fn new(target: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            measurement: None,
            severity,
            message: message.into(),
            perfdata: None,
        }
    }

    /// A failed probe; the severity follows the error class.
    pub fn failed(target: impl Into<String>, context: &str, err: &ProbeError) -> Self {
        Self::new(target, err.severity(), format!("{context}: {err}"))
    }

    pub fn with_measurement(mut self, value: f64) -> Self {
        self.measurement = Some(value);
        self
    }

    pub fn with_perfdata(mut self, perfdata: PerfData) -> Self {
        self.perfdata = Some(perfdata);
        self
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.severity, self.message)?;
        if let Some(perfdata) = &self.perfdata {
            write!(f, " | {perfdata}")?;
        }
        Ok(())
    }
}

/// Reduction of all per-target results of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    pub severity: Severity,
    pub results: Vec<ProbeResult>,
}

impl AggregateResult {
    pub fn exit_code(&self) -> u8 {
        self.severity.exit_code()
    }

    /// One display line per target, in probing order.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.results.iter().map(ProbeResult::to_string)
    }

    /// All perf-data tokens, in probing order.
    pub fn perfdata(&self) -> impl Iterator<Item = &PerfData> {
        self.results.iter().filter_map(|r| r.perfdata.as_ref())
    }
}

/// Worst-case reduction: CRITICAL, then UNKNOWN, then WARNING, then OK.
///
/// An empty input is a caller error and yields UNKNOWN.
pub fn aggregate(results: Vec<ProbeResult>) -> AggregateResult {
    match Severity::worst(results.iter().map(|r| r.severity)) {
        Some(severity) => AggregateResult { severity, results },
        None => AggregateResult {
            severity: Severity::Unknown,
            results: vec![ProbeResult::new(
                "",
                Severity::Unknown,
                "no probe results to aggregate",
            )],
        },
    }
}
