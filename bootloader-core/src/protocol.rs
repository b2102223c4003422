// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! The update protocol state machine: handshake, per-frame authentication,
//! whole-firmware and combined authentication, decryption, and commit.
//!
//! Generic over [`Channel`] and [`RawFlash`] so the entire transaction can be
//! driven against in-memory fakes in tests, with no hardware involved.

use crate::channel::Channel;
use crate::crypto::Verifier;
use crate::error::{AuthStage, UpdateError};
use crate::flash::{FlashRegion, RawFlash};
use crate::layout::{
    FlashLayout, DEBUG_VERSION, FRAME_METADATA_SIZE, FW_MAX, FW_METADATA_SIZE, MSG_MAX, PAGE,
    RESERVED_VERSION,
};
use crate::metadata::{FirmwareMetadata, FrameMetadata};
use crate::staging::StagingBuffer;

pub const OK: u8 = 0x00;
pub const ERROR: u8 = 0x01;

/// Runs one full update transaction.
///
/// Called once the host's `U` byte has already been echoed back by the
/// dispatch loop. `stored_version` must be the version field currently
/// persisted in flash, read by the caller via an ordinary volatile read
/// before the transaction starts.
///
/// Returns the `FirmwareMetadata` that was committed to flash on success.
#[allow(clippy::too_many_arguments)]
pub fn run_update<H: Channel, D: Channel, F: RawFlash>(
    host: &mut H,
    debug: &mut D,
    flash: &mut F,
    verifier: &Verifier,
    layout: &FlashLayout,
    stored_version: u16,
    staging: &mut StagingBuffer,
) -> Result<FirmwareMetadata, UpdateError> {
    let meta = recv_metadata(host, debug, verifier, stored_version)?;
    host.write_byte(OK);

    let fw_size = meta.fw_size as usize;
    let last_frame_index = last_frame_index(fw_size);

    let bytes_received =
        recv_frames(host, debug, verifier, staging, meta.version, last_frame_index, fw_size)?;
    if bytes_received != fw_size {
        return Err(UpdateError::Bounds("total received does not match fw_size"));
    }

    verifier.hmac_verify(debug, &staging.bytes[..fw_size], AuthStage::WholeFirmware)?;
    host.write_byte(OK);

    let msg_size = meta.release_msg_size as usize;
    host.read_exact(&mut staging.msg_buf[..msg_size])?;
    verifier.hmac_verify(debug, &staging.msg_buf[..msg_size], AuthStage::ReleaseMessage)?;
    host.write_byte(OK);

    let meta_bytes = meta.to_bytes();
    fold_combined_region(staging, fw_size, &meta_bytes, msg_size);
    verifier.hmac_verify(
        debug,
        &staging.bytes[..fw_size + FW_METADATA_SIZE + msg_size],
        AuthStage::Combined,
    )?;
    zero_trailing_region(staging, fw_size, msg_size);
    host.write_byte(OK);

    verifier.gcm_open(debug, &mut staging.bytes[..fw_size])?;
    host.write_byte(OK);

    let final_meta = commit(flash, layout, staging, &meta, stored_version, fw_size, msg_size)?;

    Ok(final_meta)
}

fn last_frame_index(fw_size: usize) -> u16 {
    (((fw_size + PAGE - 1) / PAGE) - 1) as u16
}

fn recv_metadata<H: Channel, D: Channel>(
    host: &mut H,
    debug: &mut D,
    verifier: &Verifier,
    stored_version: u16,
) -> Result<FirmwareMetadata, UpdateError> {
    let mut meta_bytes = [0u8; FW_METADATA_SIZE];
    host.read_exact(&mut meta_bytes)?;
    verifier.hmac_verify(debug, &meta_bytes, AuthStage::Metadata)?;
    let meta = FirmwareMetadata::parse(&meta_bytes);

    if meta.fw_size == 0 {
        return Err(UpdateError::Bounds("fw_size is zero"));
    }
    if meta.fw_size as usize > FW_MAX {
        return Err(UpdateError::Bounds("fw_size exceeds maximum"));
    }
    if meta.release_msg_size as usize > MSG_MAX {
        return Err(UpdateError::Bounds("release_msg_size exceeds maximum"));
    }
    if meta.version != DEBUG_VERSION && meta.version < stored_version {
        return Err(UpdateError::Bounds("version below stored floor"));
    }

    Ok(meta)
}

#[allow(clippy::too_many_arguments)]
fn recv_frames<H: Channel, D: Channel>(
    host: &mut H,
    debug: &mut D,
    verifier: &Verifier,
    staging: &mut StagingBuffer,
    version: u16,
    last_frame_index: u16,
    fw_size: usize,
) -> Result<usize, UpdateError> {
    let mut bytes_received = 0usize;

    for i in 0..=last_frame_index {
        let mut frame_meta_bytes = [0u8; FRAME_METADATA_SIZE];
        host.read_exact(&mut frame_meta_bytes)?;
        verifier.hmac_verify(debug, &frame_meta_bytes, AuthStage::Frame)?;
        let fm = FrameMetadata::parse(&frame_meta_bytes);

        if fm.index != i || fm.index > last_frame_index {
            return Err(UpdateError::Bounds("frame index out of sequence"));
        }
        if fm.frame_length as usize > PAGE {
            return Err(UpdateError::Bounds("frame length exceeds page"));
        }
        if fm.frame_version == RESERVED_VERSION {
            return Err(UpdateError::Bounds("reserved frame version"));
        }
        if fm.frame_version != version {
            return Err(UpdateError::Bounds("frame version mismatch"));
        }

        let frame_len = fm.frame_length as usize;
        let frame_off = i as usize * PAGE;
        host.read_exact(&mut staging.bytes[frame_off..frame_off + frame_len])?;

        bytes_received += frame_len;
        if bytes_received > fw_size {
            return Err(UpdateError::Bounds("received more than fw_size"));
        }

        let meta_off = frame_off + frame_len;
        staging.bytes[meta_off..meta_off + FRAME_METADATA_SIZE].copy_from_slice(&frame_meta_bytes);
        verifier.hmac_verify(
            debug,
            &staging.bytes[frame_off..meta_off + FRAME_METADATA_SIZE],
            AuthStage::Frame,
        )?;

        host.write_byte(OK);
    }

    Ok(bytes_received)
}

fn fold_combined_region(staging: &mut StagingBuffer, fw_size: usize, meta_bytes: &[u8; FW_METADATA_SIZE], msg_size: usize) {
    staging.bytes[fw_size..fw_size + FW_METADATA_SIZE].copy_from_slice(meta_bytes);
    staging.bytes[fw_size + FW_METADATA_SIZE..fw_size + FW_METADATA_SIZE + msg_size]
        .copy_from_slice(&staging.msg_buf[..msg_size]);
}

fn zero_trailing_region(staging: &mut StagingBuffer, fw_size: usize, msg_size: usize) {
    for b in staging.bytes[fw_size..fw_size + FW_METADATA_SIZE + msg_size].iter_mut() {
        *b = 0;
    }
}

#[allow(clippy::too_many_arguments)]
fn commit<F: RawFlash>(
    flash: &mut F,
    layout: &FlashLayout,
    staging: &StagingBuffer,
    meta: &FirmwareMetadata,
    stored_version: u16,
    fw_size: usize,
    msg_size: usize,
) -> Result<FirmwareMetadata, UpdateError> {
    let mut region = FlashRegion::new(flash);

    let mut off = 0usize;
    while off < fw_size {
        let len = core::cmp::min(PAGE, fw_size - off);
        region.program(layout.fw_addr + off as u32, &staging.bytes[off..off + len])?;
        off += PAGE;
    }

    let mut final_meta = *meta;
    if meta.version == DEBUG_VERSION {
        final_meta.version = stored_version;
    }

    region.program(layout.msg_addr, &staging.msg_buf[..msg_size])?;
    region.program(layout.meta_addr, &final_meta.to_bytes())?;

    Ok(final_meta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_frame_index_matches_scenario_one() {
        assert_eq!(last_frame_index(2500), 2);
    }

    #[test]
    fn last_frame_index_exact_multiple_of_page() {
        assert_eq!(last_frame_index(2048), 1);
    }

    #[test]
    fn last_frame_index_single_partial_page() {
        assert_eq!(last_frame_index(1), 0);
    }
}
