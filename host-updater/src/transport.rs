// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Serial transport for one logical channel (`host` or `debug`).
//!
//! Each [`Link`] wraps one physical serial port and implements
//! [`bootloader_core::Channel`], so the same wire-format encoders the device
//! decodes against can be driven directly here with no separate host-side
//! protocol implementation.

use std::io::{Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use bootloader_core::{Channel, ChannelError};
use serialport::SerialPort;

pub const BAUD_RATE: u32 = 115_200;
const TIMEOUT_MS: u64 = 5_000;

pub struct Link {
    port: Box<dyn SerialPort>,
}

impl Link {
    pub fn open(port_name: &str) -> Result<Self> {
        let port = serialport::new(port_name, BAUD_RATE)
            .timeout(Duration::from_millis(TIMEOUT_MS))
            .open()
            .with_context(|| format!("failed to open serial port {port_name}"))?;
        Ok(Self { port })
    }

    /// Read whatever arrives within a short timeout, for diagnostics whose
    /// length isn't known ahead of time (the boot-time release message).
    pub fn drain_for(&mut self, window: Duration) -> Vec<u8> {
        let old_timeout = self.port.timeout();
        let _ = self.port.set_timeout(window);

        let mut collected = Vec::new();
        let mut byte = [0u8; 1];
        while self.port.read(&mut byte).unwrap_or(0) == 1 {
            collected.push(byte[0]);
        }

        let _ = self.port.set_timeout(old_timeout);
        collected
    }
}

impl Channel for Link {
    fn read_byte(&mut self) -> Result<u8, ChannelError> {
        let mut byte = [0u8; 1];
        self.port.read_exact(&mut byte).map_err(|_| ChannelError)?;
        Ok(byte[0])
    }

    fn write_byte(&mut self, byte: u8) {
        let _ = self.port.write_all(&[byte]);
        let _ = self.port.flush();
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let _ = self.port.write_all(bytes);
        let _ = self.port.flush();
    }
}
