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
#![deny(clippy::print_stderr)]

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use dd_netprobe::cli::{self, Cli};
use dd_netprobe::config;
use dd_netprobe::AggregateResult;
use log::{debug, info};

fn main() -> Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout, usage errors to stderr
            err.print()?;
            return Ok(ExitCode::from(cli::parse_error_exit_code(&err)));
        }
    };

    let config = cli.config_path().map(config::load_config);
    let log_level = config::get_log_level(config.as_ref().and_then(|c| c.as_ref().ok()));
    if let Err(result) = cli::init_logger(log_level) {
        return Ok(report(&result));
    }
    debug!("Log level set to: {:?}", log_level);

    let result = cli::execute(&cli.command, config);
    let code = report(&result);
    debug!(
        "Perf-data: {}",
        result
            .perfdata()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    );

    info!(
        "Finished with {} ({} target(s))",
        result.severity,
        result.results.len()
    );
    Ok(code)
}

/// Print one plugin line per target and return the matching exit code.
fn report(result: &AggregateResult) -> ExitCode {
    for line in result.lines() {
        println!("{line}");
    }
    ExitCode::from(result.exit_code())
}
