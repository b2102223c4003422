// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations: drive one full update transaction, or request a
//! boot, over the `host`/`debug` link pair.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use bootloader_core::layout::{FW_MAX, MSG_MAX, PAGE, RESERVED_VERSION};
use bootloader_core::{Channel, FirmwareMetadata, FrameMetadata, ERROR, OK};
use indicatif::{ProgressBar, ProgressStyle};

use crate::seal::Sealer;
use crate::transport::Link;

const CMD_UPDATE: u8 = b'U';
const CMD_BOOT: u8 = b'B';

fn expect_ack(host: &mut Link, what: &str) -> Result<()> {
    let byte = host.read_byte().context("reading acknowledgement byte")?;
    match byte {
        OK => Ok(()),
        ERROR => bail!("device rejected {what} (ERROR byte received); device has reset"),
        other => bail!("unexpected byte 0x{other:02x} waiting for {what} acknowledgement"),
    }
}

/// Upload `firmware` at `version`, with `release_message` attached, and wait
/// for the device's commit acknowledgement.
pub fn update(
    host: &mut Link,
    debug: &mut Link,
    sealer: &Sealer,
    firmware: &Path,
    release_message: &Path,
    version: u16,
) -> Result<()> {
    let plaintext = fs::read(firmware)
        .with_context(|| format!("failed to read {}", firmware.display()))?;
    let release_msg = fs::read(release_message)
        .with_context(|| format!("failed to read {}", release_message.display()))?;

    if version == RESERVED_VERSION {
        bail!("version {RESERVED_VERSION} is reserved and always rejected by the device");
    }
    if plaintext.len() > FW_MAX {
        bail!("firmware image ({} bytes) exceeds the {FW_MAX}-byte maximum", plaintext.len());
    }
    if release_msg.len() > MSG_MAX {
        bail!(
            "release message ({} bytes) exceeds the {MSG_MAX}-byte maximum",
            release_msg.len()
        );
    }

    println!("firmware:  {} ({} bytes)", firmware.display(), plaintext.len());
    println!("message:   {} ({} bytes)", release_message.display(), release_msg.len());
    println!("version:   {version}");

    host.write_byte(CMD_UPDATE);
    let echo = host.read_byte().context("waiting for update handshake echo")?;
    if echo != CMD_UPDATE {
        bail!("unexpected handshake echo 0x{echo:02x}");
    }

    let meta = FirmwareMetadata {
        version,
        fw_size: plaintext.len() as u16,
        release_msg_size: release_msg.len() as u16,
    };
    let meta_bytes = meta.to_bytes();
    host.write_bytes(&meta_bytes);
    debug.write_bytes(&sealer.hmac(&meta_bytes));
    expect_ack(host, "metadata")?;

    let mut ciphertext = plaintext.clone();
    let (iv, tag) = sealer.seal_in_place(&mut ciphertext);

    let last_frame_index = ((ciphertext.len() + PAGE - 1) / PAGE).saturating_sub(1) as u16;
    let pb = ProgressBar::new(ciphertext.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
            .expect("static template is valid")
            .progress_chars("#>-"),
    );

    for i in 0..=last_frame_index {
        let off = i as usize * PAGE;
        let len = std::cmp::min(PAGE, ciphertext.len() - off);
        let frame = &ciphertext[off..off + len];

        let fm = FrameMetadata {
            index: i,
            frame_length: len as u16,
            frame_version: version,
        };
        let fm_bytes = fm.to_bytes();
        host.write_bytes(&fm_bytes);
        debug.write_bytes(&sealer.hmac(&fm_bytes));

        host.write_bytes(frame);
        let mut combined = Vec::with_capacity(frame.len() + fm_bytes.len());
        combined.extend_from_slice(frame);
        combined.extend_from_slice(&fm_bytes);
        debug.write_bytes(&sealer.hmac(&combined));

        expect_ack(host, &format!("frame {i}"))?;
        pb.set_position((off + len) as u64);
    }
    pb.finish_and_clear();

    debug.write_bytes(&sealer.hmac(&ciphertext));
    expect_ack(host, "whole-firmware integrity")?;

    host.write_bytes(&release_msg);
    debug.write_bytes(&sealer.hmac(&release_msg));
    expect_ack(host, "release message")?;

    let mut combined = Vec::with_capacity(ciphertext.len() + meta_bytes.len() + release_msg.len());
    combined.extend_from_slice(&ciphertext);
    combined.extend_from_slice(&meta_bytes);
    combined.extend_from_slice(&release_msg);
    debug.write_bytes(&sealer.hmac(&combined));
    expect_ack(host, "combined integrity")?;

    debug.write_bytes(&iv);
    debug.write_bytes(&tag);
    expect_ack(host, "decrypt")?;

    println!("update committed.");
    Ok(())
}

/// Request a boot, printing back the stored release message.
pub fn boot(host: &mut Link, debug: &mut Link) -> Result<()> {
    host.write_byte(CMD_BOOT);
    let echo = host.read_byte().context("waiting for boot handshake echo")?;
    if echo != CMD_BOOT {
        bail!("unexpected handshake echo 0x{echo:02x}");
    }

    let message = debug.drain_for(Duration::from_millis(200));
    if !message.is_empty() {
        println!("release message: {}", String::from_utf8_lossy(&message));
    }
    println!("device is booting.");
    Ok(())
}
