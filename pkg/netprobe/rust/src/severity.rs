// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::fmt;

/// Service check status understood by monitoring supervisors.
///
/// The discriminant is the process exit code of a monitoring plugin.
/// `Unknown` means the probe could not be executed or interpreted. Exit
/// codes do not give the reduction order, see [`Severity::combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl Severity {
    pub fn exit_code(self) -> u8 {
        self as u8
    }

    // CRITICAL > UNKNOWN > WARNING > OK
    fn precedence(self) -> u8 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Unknown => 2,
            Severity::Critical => 3,
        }
    }

    /// Combine two findings: a CRITICAL anywhere wins, then UNKNOWN,
    /// then WARNING.
    pub fn combine(self, other: Severity) -> Severity {
        if other.precedence() > self.precedence() {
            other
        } else {
            self
        }
    }

    /// Fold a sequence of severities, `None` when the sequence is empty.
    pub fn worst<I>(severities: I) -> Option<Severity>
    where
        I: IntoIterator<Item = Severity>,
    {
        severities.into_iter().reduce(Severity::combine)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
