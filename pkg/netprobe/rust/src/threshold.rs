// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::errors::ConfigError;
use crate::result::PerfData;
use crate::severity::Severity;

/// Which side of a bound is unhealthy for a given metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Latency, CPU usage, age.
    GreaterIsWorse,
    /// Available memory, free space.
    LesserIsWorse,
}

impl Direction {
    fn crosses(self, value: f64, bound: f64) -> bool {
        match self {
            Direction::GreaterIsWorse => value >= bound,
            Direction::LesserIsWorse => value <= bound,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Direction::GreaterIsWorse => "exceeds",
            Direction::LesserIsWorse => "is below",
        }
    }

    fn operator(self) -> &'static str {
        match self {
            Direction::GreaterIsWorse => ">=",
            Direction::LesserIsWorse => "<=",
        }
    }
}

/// A measured quantity and the direction its thresholds apply in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metric {
    pub name: &'static str,
    pub unit: &'static str,
    pub direction: Direction,
}

impl Metric {
    pub const RESPONSE_TIME: Metric = Metric {
        name: "response_time",
        unit: "ms",
        direction: Direction::GreaterIsWorse,
    };

    pub const CPU_USAGE: Metric = Metric {
        name: "cpu_usage",
        unit: "%",
        direction: Direction::GreaterIsWorse,
    };

    pub const AVAILABLE_MEMORY: Metric = Metric {
        name: "available_memory",
        unit: "MB",
        direction: Direction::LesserIsWorse,
    };
}

/// Optional warning/critical bounds for one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    pub warning: Option<f64>,
    pub critical: Option<f64>,
}

impl Thresholds {
    pub fn new(warning: Option<f64>, critical: Option<f64>) -> Self {
        Self { warning, critical }
    }

    /// Reject bounds that can never behave as configured: non-finite
    /// numbers, or a critical bound that is "better" than the warning one.
    pub fn validate(&self, metric: &Metric) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidThresholds {
            metric: metric.name.to_string(),
            reason,
        };

        for bound in [self.warning, self.critical].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(invalid(format!("{bound} is not a finite number")));
            }
        }

        if let (Some(warning), Some(critical)) = (self.warning, self.critical) {
            let ordered = match metric.direction {
                Direction::GreaterIsWorse => critical >= warning,
                Direction::LesserIsWorse => critical <= warning,
            };
            if !ordered {
                return Err(invalid(format!(
                    "critical ({critical}) must be {} warning ({warning})",
                    match metric.direction {
                        Direction::GreaterIsWorse => "greater than or equal to",
                        Direction::LesserIsWorse => "less than or equal to",
                    }
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of comparing one measurement against its thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub severity: Severity,
    pub reason: String,
    pub perfdata: PerfData,
}

/// Classify `value`. Critical is checked before warning, absent bounds are
/// skipped, and the result degrades to OK when neither bound is set.
pub fn evaluate(value: f64, thresholds: &Thresholds, metric: &Metric) -> Evaluation {
    let direction = metric.direction;
    let perfdata = PerfData::new(metric.name, value, metric.unit)
        .with_thresholds(thresholds.warning, thresholds.critical);

    let crossed = |bound: Option<f64>| bound.filter(|b| direction.crosses(value, *b));

    let (severity, reason) = if let Some(critical) = crossed(thresholds.critical) {
        (
            Severity::Critical,
            format!(
                "{} {} critical threshold ({value:.2} {} {critical})",
                metric.name,
                direction.verb(),
                direction.operator()
            ),
        )
    } else if let Some(warning) = crossed(thresholds.warning) {
        (
            Severity::Warning,
            format!(
                "{} {} warning threshold ({value:.2} {} {warning})",
                metric.name,
                direction.verb(),
                direction.operator()
            ),
        )
    } else {
        (
            Severity::Ok,
            format!("{} is within acceptable limits ({value:.2})", metric.name),
        )
    };

    Evaluation {
        severity,
        reason,
        perfdata,
    }
}
