// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Firmware update tool for bootloader-fw.
//!
//! Usage:
//!   host-updater --host-port /dev/ttyACM0 --debug-port /dev/ttyACM1 \
//!       update firmware.bin --message release-notes.txt --version 3
//!   host-updater --host-port /dev/ttyACM0 --debug-port /dev/ttyACM1 boot

mod cli;
mod commands;
mod seal;
mod transport;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args)
}
