// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

mod helpers;

use std::time::Duration;

use dd_netprobe::{
    AgentItem, AgentMetricProbe, HttpLatencyProbe, Probe, Severity, TcpPortProbe, Thresholds,
};
use helpers::{FakeServer, closed_port, exit_code, run_netprobe, stdout_lines, write_config};

// ===========================================================================
// Library probes against loopback servers
// ===========================================================================

#[test]
fn test_http_probe_slow_server_is_warning() {
    let server = FakeServer::http(200, Duration::from_millis(150));
    let probe = HttpLatencyProbe::new(
        &server.url(),
        Thresholds::new(Some(100.0), Some(5000.0)),
        Duration::from_secs(10),
    );

    let agg = probe.check();
    assert_eq!(agg.severity, Severity::Warning);
    let result = &agg.results[0];
    assert!(result.measurement.unwrap() >= 150.0);
    assert!(
        result
            .message
            .starts_with("response_time exceeds warning threshold ("),
        "{}",
        result.message
    );
    let perfdata = result.perfdata.as_ref().unwrap().to_string();
    assert!(perfdata.starts_with("response_time="), "{perfdata}");
    assert!(perfdata.ends_with("ms;100;5000"), "{perfdata}");
}

#[test]
fn test_http_probe_error_status_is_critical() {
    let server = FakeServer::http(503, Duration::ZERO);
    let probe = HttpLatencyProbe::new(
        &server.url(),
        Thresholds::new(Some(100.0), Some(500.0)),
        Duration::from_secs(5),
    );
    let result = probe.run().remove(0);
    assert_eq!(result.severity, Severity::Critical);
    assert_eq!(result.message, "Website is down. Status Code: 503");
}

#[test]
fn test_http_probe_times_out() {
    let server = FakeServer::http(200, Duration::from_secs(3));
    let probe = HttpLatencyProbe::new(
        &server.url(),
        Thresholds::new(Some(100.0), Some(500.0)),
        Duration::from_millis(500),
    );
    let result = probe.run().remove(0);
    assert_eq!(result.severity, Severity::Critical);
    assert!(result.message.starts_with("Error checking website"));
}

#[test]
fn test_http_probe_connection_refused_is_critical() {
    let url = format!("http://127.0.0.1:{}/", closed_port());
    let probe = HttpLatencyProbe::new(
        &url,
        Thresholds::new(Some(100.0), Some(500.0)),
        Duration::from_secs(2),
    );
    assert_eq!(probe.check().severity, Severity::Critical);
}

#[test]
fn test_port_probe_unreachable_hosts_fail_in_order() {
    // TEST-NET-1 is never routed; either the connect times out or the
    // network is reported unreachable
    let probe = TcpPortProbe::new("192.0.2.1", vec![22, 9999], Duration::from_secs(1));
    let agg = probe.check();

    assert_eq!(agg.severity, Severity::Critical);
    assert_eq!(agg.results.len(), 2);
    assert_eq!(agg.results[0].target, "192.0.2.1:22");
    assert_eq!(agg.results[1].target, "192.0.2.1:9999");
    for result in &agg.results {
        assert_eq!(result.severity, Severity::Critical);
    }
}

#[test]
fn test_port_probe_content_match() {
    let server = FakeServer::banner("HTTP/1.1 200 OK\r\nServer: fake-nginx\r\n\r\n");
    let ok = TcpPortProbe::new("127.0.0.1", vec![server.port], Duration::from_secs(2))
        .with_content_match(Some("nginx".to_string()))
        .check();
    assert_eq!(ok.severity, Severity::Ok);

    let mismatch = TcpPortProbe::new("127.0.0.1", vec![server.port], Duration::from_secs(2))
        .with_content_match(Some("apache".to_string()))
        .check();
    assert_eq!(mismatch.severity, Severity::Warning);
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[test]
fn test_agent_probe_cpu_usage() {
    let server = FakeServer::agent(b"12.5");
    let probe = AgentMetricProbe::new(
        "127.0.0.1",
        AgentItem::CpuUsage,
        Thresholds::new(Some(80.0), Some(95.0)),
    )
    .with_port(server.port)
    .with_timeout(Duration::from_secs(2));

    let result = probe.run().remove(0);
    assert_eq!(result.severity, Severity::Warning);
    assert_eq!(result.measurement, Some(87.5));
    assert_eq!(
        result.to_string(),
        "WARNING - cpu_usage exceeds warning threshold (87.50 >= 80) | cpu_usage=87.50%;80;95"
    );
}

// ===========================================================================
// Binary end-to-end
// ===========================================================================

#[test]
fn test_cli_http_warning_exit_code() {
    let server = FakeServer::http(200, Duration::from_millis(150));
    let output = run_netprobe(&["http", "-H", &server.url(), "-w", "100", "-c", "5000"]);

    assert_eq!(exit_code(&output), 1);
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("WARNING - response_time exceeds warning threshold"));
    assert!(lines[0].contains(" | response_time="));
}

#[test]
fn test_cli_port_reports_each_port() {
    let open = FakeServer::banner("SSH-2.0-OpenSSH_9.6\r\n");
    let closed = closed_port();
    let ports = format!("{},{}", open.port, closed);
    let output = run_netprobe(&["port", "-H", "127.0.0.1", "-P", &ports, "-t", "2"]);

    assert_eq!(exit_code(&output), 2);
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 2);
    assert!(
        lines[0].starts_with(&format!("OK - Port {} on 127.0.0.1 is open | latency=", open.port)),
        "{}",
        lines[0]
    );
    assert!(
        lines[1].starts_with(&format!("CRITICAL - Port {closed} on 127.0.0.1 is closed")),
        "{}",
        lines[1]
    );
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
#[test]
fn test_cli_agent_memory() {
    let server = FakeServer::agent(b"2147483648");
    let port = server.port.to_string();
    let output = run_netprobe(&[
        "agent",
        "-H",
        "127.0.0.1",
        "--port",
        &port,
        "--check",
        "memory",
        "--warning-threshold",
        "4096",
        "--critical-threshold",
        "1024",
    ]);

    assert_eq!(exit_code(&output), 1);
    assert_eq!(
        stdout_lines(&output),
        vec![
            "WARNING - available_memory is below warning threshold (2048.00 <= 4096) \
             | available_memory=2048.00MB;4096;1024"
        ]
    );
}

#[test]
fn test_cli_run_config_aggregates_instances() {
    let dir = tempfile::tempdir().unwrap();
    let http = FakeServer::http(200, Duration::ZERO);
    let closed = closed_port();
    let config = write_config(
        dir.path(),
        &format!(
            r#"
init_config:
  timeout: 2
instances:
  - type: http
    url: {}
    warning: 1000
    critical: 5000
  - type: port
    host: 127.0.0.1
    ports: [{closed}]
"#,
            http.url()
        ),
    );

    let output = run_netprobe(&["run", "--config", config.to_str().unwrap()]);
    assert_eq!(exit_code(&output), 2);
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("OK - response_time is within acceptable limits"));
    assert!(lines[1].starts_with("CRITICAL - Port"));
}

#[test]
fn test_cli_missing_config_is_unknown() {
    let output = run_netprobe(&["run", "--config", "/nonexistent/netprobe.yaml"]);
    assert_eq!(exit_code(&output), 3);
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("UNKNOWN - Cannot load configuration"));
}

#[test]
fn test_cli_argument_errors_are_unknown() {
    let output = run_netprobe(&["http", "-H", "example.com", "-w", "100"]);
    assert_eq!(exit_code(&output), 3);
    assert!(output.stdout.is_empty());

    let output = run_netprobe(&["agent", "-H", "h", "--check", "disk"]);
    assert_eq!(exit_code(&output), 3);

    let output = run_netprobe(&[]);
    assert_eq!(exit_code(&output), 3);
}

#[test]
fn test_cli_help_and_version_succeed() {
    let output = run_netprobe(&["--help"]);
    assert_eq!(exit_code(&output), 0);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));

    let output = run_netprobe(&["--version"]);
    assert_eq!(exit_code(&output), 0);
}

#[test]
fn test_cli_logs_stay_off_stdout() {
    let closed = closed_port().to_string();
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_dd-netprobe"))
        .args(["port", "-H", "127.0.0.1", "-P", &closed, "-t", "1"])
        .env("DD_LOG_LEVEL", "debug")
        .output()
        .unwrap();

    assert_eq!(exit_code(&output), 2);
    assert_eq!(stdout_lines(&output).len(), 1);
    assert!(String::from_utf8_lossy(&output.stderr).contains("DEBUG"));
}
