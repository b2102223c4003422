// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::seal::Sealer;
use crate::transport::Link;

/// Pre-shared keys baked into the device image. Match
/// `bootloader-fw::consts::{HMAC_KEY, AES_KEY}` exactly; a production
/// deployment injects these the same way the device image is provisioned,
/// not by editing this file.
const HMAC_KEY: [u8; 32] = [
    0x8f, 0x2a, 0x4e, 0x91, 0x03, 0x7c, 0xd5, 0x1b, 0x6a, 0xe9, 0x44, 0xf0, 0x2d, 0x88, 0x5b, 0x3e,
    0x7a, 0x19, 0xc6, 0x52, 0xab, 0x0d, 0xf4, 0x3c, 0x95, 0x61, 0x2e, 0xd8, 0x07, 0xba, 0x4f, 0x10,
];
const AES_KEY: [u8; 16] = [
    0x3d, 0xc1, 0x8a, 0x56, 0xe2, 0x9f, 0x04, 0x7b, 0x1e, 0x6d, 0xa8, 0x33, 0xf9, 0x20, 0x5c, 0x77,
];

#[derive(Parser)]
#[command(name = "host-updater")]
#[command(about = "Firmware update tool for bootloader-fw")]
pub struct Cli {
    /// Serial port carrying commands and payload bytes (e.g. /dev/ttyACM0)
    #[arg(long)]
    pub host_port: String,

    /// Serial port carrying authenticators and diagnostics (e.g. /dev/ttyACM1)
    #[arg(long)]
    pub debug_port: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload new firmware and a release message
    Update {
        /// Firmware binary file
        #[arg(value_name = "FIRMWARE")]
        firmware: PathBuf,

        /// Release message file (plain text)
        #[arg(long, value_name = "FILE")]
        message: PathBuf,

        /// Firmware version; 0 requests a rollback-exempt debug upload
        #[arg(long, default_value = "1")]
        version: u16,
    },

    /// Request the device boot its installed firmware
    Boot,
}

pub fn run(cli: Cli) -> Result<()> {
    let mut host = Link::open(&cli.host_port)?;
    let mut debug = Link::open(&cli.debug_port)?;
    let sealer = Sealer::new(HMAC_KEY, AES_KEY);

    match cli.command {
        Commands::Update {
            firmware,
            message,
            version,
        } => commands::update(&mut host, &mut debug, &sealer, &firmware, &message, version),
        Commands::Boot => commands::boot(&mut host, &mut debug),
    }
}
