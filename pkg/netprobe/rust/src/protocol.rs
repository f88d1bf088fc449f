// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Binary request/response framing spoken by remote monitoring agents.
//!
//! A frame is `ZBXD`, one flags byte (`0x01`), the payload length as an
//! unsigned 64-bit little-endian integer, then the payload itself.

use crate::errors::ProtocolError;

pub const MAGIC: [u8; 4] = *b"ZBXD";
pub const PROTOCOL_VERSION: u8 = 0x01;
pub const HEADER_LEN: usize = 13;

const NOT_SUPPORTED: &str = "ZBX_NOTSUPPORTED";

/// Fixed-width frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub flags: u8,
    pub length: u64,
}

impl FrameHeader {
    pub fn new(length: u64) -> Self {
        Self {
            flags: PROTOCOL_VERSION,
            length,
        }
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        let (magic, rest) = out.split_at_mut(MAGIC.len());
        magic.copy_from_slice(&MAGIC);
        let (flags, length) = rest.split_at_mut(1);
        flags.copy_from_slice(&[self.flags]);
        length.copy_from_slice(&self.length.to_le_bytes());
        out
    }

    /// Decode the header at the start of `buf`, returning it with the rest
    /// of the buffer.
    pub fn decode(buf: &[u8]) -> Result<(Self, &[u8]), ProtocolError> {
        let too_short = || ProtocolError::TooShort {
            len: buf.len(),
            expected: HEADER_LEN,
        };

        let (magic, rest) = buf.split_first_chunk::<4>().ok_or_else(too_short)?;
        let (&flags, rest) = rest.split_first().ok_or_else(too_short)?;
        let (length, payload) = rest.split_first_chunk::<8>().ok_or_else(too_short)?;

        if *magic != MAGIC {
            return Err(ProtocolError::BadMagic(*magic));
        }
        if flags != PROTOCOL_VERSION {
            return Err(ProtocolError::UnsupportedFlags(flags));
        }

        let header = Self {
            flags,
            length: u64::from_le_bytes(*length),
        };
        Ok((header, payload))
    }
}

/// Request for a single item key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    key: String,
}

impl AgentRequest {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn encode(&self) -> Vec<u8> {
        let payload = self.key.as_bytes();
        let header = FrameHeader::new(payload.len() as u64);

        let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
        frame.extend_from_slice(&header.encode());
        frame.extend_from_slice(payload);
        frame
    }
}

/// Decoded agent reply; the value is kept as text, parsing is up to the
/// caller since its type depends on the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResponse {
    value: String,
}

impl AgentResponse {
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.is_empty() {
            return Err(ProtocolError::Empty);
        }

        let (header, payload) = FrameHeader::decode(buf)?;
        if header.length != payload.len() as u64 {
            return Err(ProtocolError::LengthMismatch {
                declared: header.length,
                actual: payload.len(),
            });
        }

        let text = std::str::from_utf8(payload).map_err(|_| ProtocolError::NotUtf8)?;
        let value = text.trim();
        if value.is_empty() {
            return Err(ProtocolError::Empty);
        }

        Ok(Self {
            value: value.to_string(),
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The agent answers `ZBX_NOTSUPPORTED`, optionally followed by a NUL and
    /// a reason, for items it cannot collect.
    pub fn not_supported(&self) -> Option<&str> {
        let rest = self.value.strip_prefix(NOT_SUPPORTED)?;
        Some(rest.trim_start_matches('\0').trim())
    }
}
