// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::thread;
use std::time::Duration;

const NETPROBE_BIN: &str = env!("CARGO_BIN_EXE_dd-netprobe");

/// A loopback server answering every connection from a background thread.
pub struct FakeServer {
    pub port: u16,
}

impl FakeServer {
    /// Bind `127.0.0.1:0` and serve each connection with `handler` until the
    /// test process exits.
    fn spawn<F>(handler: F) -> Self
    where
        F: Fn(TcpStream) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind fake server");
        let port = listener.local_addr().expect("no local addr").port();
        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => handler(stream),
                    Err(_) => break,
                }
            }
        });
        Self { port }
    }

    /// HTTP/1.1 server that waits `delay` before replying with `status`.
    pub fn http(status: u16, delay: Duration) -> Self {
        Self::spawn(move |mut stream| {
            read_http_request(&mut stream);
            thread::sleep(delay);
            let response = format!(
                "HTTP/1.1 {status} Fake\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"
            );
            let _ = stream.write_all(response.as_bytes());
        })
    }

    /// Agent that answers every request with one framed `payload`.
    pub fn agent(payload: &'static [u8]) -> Self {
        Self::spawn(move |mut stream| {
            let mut request = [0u8; 512];
            let _ = stream.read(&mut request);
            let _ = stream.write_all(&frame(payload));
        })
    }

    /// Plain TCP service that sends `banner` after reading the request.
    pub fn banner(banner: &'static str) -> Self {
        Self::spawn(move |mut stream| {
            read_http_request(&mut stream);
            let _ = stream.write_all(banner.as_bytes());
        })
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}/", self.port)
    }
}

fn read_http_request(stream: &mut TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    while !received.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => received.extend_from_slice(&buf[..n]),
        }
    }
}

/// Wrap `payload` in an agent protocol frame.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut buf = b"ZBXD\x01".to_vec();
    buf.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// A port on loopback with nothing listening.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    listener.local_addr().expect("no local addr").port()
}

/// Run the binary with `args`, without inherited log level overrides.
pub fn run_netprobe(args: &[&str]) -> Output {
    Command::new(NETPROBE_BIN)
        .args(args)
        .env_remove("DD_LOG_LEVEL")
        .env_remove("LOG_LEVEL")
        .output()
        .expect("failed to run dd-netprobe")
}

pub fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn exit_code(output: &Output) -> i32 {
    output.status.code().expect("dd-netprobe killed by a signal")
}

pub fn write_config(dir: &Path, yaml: &str) -> std::path::PathBuf {
    let path = dir.join("netprobe.yaml");
    std::fs::write(&path, yaml).expect("failed to write config");
    path
}
