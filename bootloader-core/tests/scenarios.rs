// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! End-to-end update transactions driven against in-memory fakes: a
//! simulated host assembling a fully sealed update exactly as the wire
//! protocol requires, and a simulated device running it through
//! `run_update`.

use aes_gcm::aead::AeadInPlace;
use aes_gcm::{Aes128Gcm, KeyInit, Nonce};
use bootloader_core::fake::{FakeChannel, FakeFlash};
use bootloader_core::layout::{FlashLayout, DEBUG_VERSION, FW_METADATA_SIZE, PAGE, RESERVED_VERSION};
use bootloader_core::{run_update, FirmwareMetadata, FrameMetadata, StagingBuffer, UpdateError, Verifier};
use hmac::{Hmac, Mac};
use sha2::Sha256;

const HMAC_KEY: [u8; 32] = [0x42; 32];
const AES_KEY: [u8; 16] = [0x24; 16];
const IV: [u8; 16] = [0x11; 16];

const META_ADDR: u32 = 0x1000;
const MSG_ADDR: u32 = 0x2000;
const FW_ADDR: u32 = 0x4000;
const FLASH_SIZE: usize = 0x10000;

fn layout() -> FlashLayout {
    FlashLayout::new(META_ADDR, MSG_ADDR, FW_ADDR)
}

fn hmac_of(data: &[u8]) -> [u8; 32] {
    let mut mac = Hmac::<Sha256>::new_from_slice(&HMAC_KEY).unwrap();
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Seals `plaintext` into the exact `(host_bytes, debug_bytes)` streams
/// `run_update` expects to read, given a version and release message.
fn seal_update(version: u16, plaintext: &[u8], release_msg: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut host = Vec::new();
    let mut debug = Vec::new();

    let fw_size = plaintext.len() as u16;
    let meta = FirmwareMetadata {
        version,
        fw_size,
        release_msg_size: release_msg.len() as u16,
    };
    let meta_bytes = meta.to_bytes();
    host.extend_from_slice(&meta_bytes);
    debug.extend_from_slice(&hmac_of(&meta_bytes));

    let cipher = Aes128Gcm::new_from_slice(&AES_KEY).unwrap();
    let mut ciphertext = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&IV), &[], &mut ciphertext)
        .unwrap();

    let last_frame_index = ((plaintext.len() + PAGE - 1) / PAGE).saturating_sub(1) as u16;
    for i in 0..=last_frame_index {
        let off = i as usize * PAGE;
        let len = core::cmp::min(PAGE, ciphertext.len() - off);
        let frame = &ciphertext[off..off + len];

        let fm = FrameMetadata {
            index: i,
            frame_length: len as u16,
            frame_version: version,
        };
        let fm_bytes = fm.to_bytes();
        host.extend_from_slice(&fm_bytes);
        debug.extend_from_slice(&hmac_of(&fm_bytes));

        host.extend_from_slice(frame);
        let mut combined = Vec::new();
        combined.extend_from_slice(frame);
        combined.extend_from_slice(&fm_bytes);
        debug.extend_from_slice(&hmac_of(&combined));
    }

    debug.extend_from_slice(&hmac_of(&ciphertext));

    host.extend_from_slice(release_msg);
    debug.extend_from_slice(&hmac_of(release_msg));

    let mut combined = Vec::new();
    combined.extend_from_slice(&ciphertext);
    combined.extend_from_slice(&meta_bytes);
    combined.extend_from_slice(release_msg);
    debug.extend_from_slice(&hmac_of(&combined));

    debug.extend_from_slice(&IV);
    debug.extend_from_slice(&tag);

    (host, debug)
}

fn run(
    host_bytes: &[u8],
    debug_bytes: &[u8],
    stored_version: u16,
) -> (Result<FirmwareMetadata, UpdateError>, FakeFlash) {
    let mut host = FakeChannel::with_input(host_bytes);
    let mut debug = FakeChannel::with_input(debug_bytes);
    let mut flash = FakeFlash::new(FLASH_SIZE);
    let verifier = Verifier::new(HMAC_KEY, AES_KEY);
    let mut staging = StagingBuffer::new();

    let result = run_update(
        &mut host,
        &mut debug,
        &mut flash,
        &verifier,
        &layout(),
        stored_version,
        &mut staging,
    );
    (result, flash)
}

#[test]
fn s1_small_single_frame_update_commits() {
    let plaintext = b"tiny firmware image";
    let (host_bytes, debug_bytes) = seal_update(5, plaintext, b"first release");
    let (result, flash) = run(&host_bytes, &debug_bytes, 1);

    let meta = result.unwrap();
    assert_eq!(meta.version, 5);
    assert_eq!(meta.fw_size, plaintext.len() as u16);
    assert_eq!(flash.read(FW_ADDR, plaintext.len()), plaintext);
    assert_eq!(
        flash.read(MSG_ADDR, b"first release".len()),
        b"first release"
    );
    assert_eq!(flash.read(META_ADDR, FW_METADATA_SIZE), &meta.to_bytes());
}

#[test]
fn s2_multi_frame_update_spans_several_pages() {
    let plaintext: Vec<u8> = (0..(PAGE * 2 + 37)).map(|i| (i % 256) as u8).collect();
    let (host_bytes, debug_bytes) = seal_update(3, &plaintext, b"multi-frame release");
    let (result, flash) = run(&host_bytes, &debug_bytes, 1);

    let meta = result.unwrap();
    assert_eq!(meta.fw_size, plaintext.len() as u16);
    assert_eq!(flash.read(FW_ADDR, plaintext.len()), plaintext.as_slice());
}

#[test]
fn s3_rollback_below_stored_version_is_rejected() {
    let plaintext = b"stale firmware";
    let (host_bytes, debug_bytes) = seal_update(2, plaintext, b"old release");
    let (result, _flash) = run(&host_bytes, &debug_bytes, 9);

    assert_eq!(
        result.unwrap_err(),
        UpdateError::Bounds("version below stored floor")
    );
}

#[test]
fn s4_debug_version_bypasses_rollback_and_preserves_stored_version() {
    let plaintext = b"debug build";
    let (host_bytes, debug_bytes) = seal_update(DEBUG_VERSION, plaintext, b"debug release");
    let (result, flash) = run(&host_bytes, &debug_bytes, 9);

    let meta = result.unwrap();
    assert_eq!(meta.version, 9);
    assert_eq!(flash.read(META_ADDR, FW_METADATA_SIZE), &meta.to_bytes());
}

#[test]
fn s5_reserved_frame_version_is_rejected() {
    let plaintext = b"x".repeat(4);
    let (host_bytes, debug_bytes) = seal_update(RESERVED_VERSION, &plaintext, b"msg");
    // seal_update happily stamps RESERVED_VERSION into metadata/frame version;
    // the device must still reject it during metadata parsing before any
    // frame is ever read.
    let (result, _flash) = run(&host_bytes, &debug_bytes, 0);
    assert!(matches!(result.unwrap_err(), UpdateError::Bounds(_)));
}

#[test]
fn s6_tampered_frame_hmac_aborts_before_commit() {
    let plaintext = b"firmware payload bytes";
    let (mut host_bytes, debug_bytes) = seal_update(4, plaintext, b"release");
    // Corrupt one byte of the first frame's ciphertext after it has already
    // been accounted for in the host's HMAC computation above.
    let corrupt_at = FW_METADATA_SIZE + 6;
    host_bytes[corrupt_at] ^= 0xFF;

    let (result, flash) = run(&host_bytes, &debug_bytes, 0);

    assert!(matches!(
        result.unwrap_err(),
        UpdateError::Auth(bootloader_core::AuthStage::Frame)
    ));
    assert_eq!(flash.erase_count, 0);
    assert_eq!(flash.program_count, 0);
}

#[test]
fn oversized_firmware_is_rejected_before_any_frame_is_read() {
    // fw_size is a u16, so this is the smallest value that both fits the
    // wire format and exceeds FW_MAX.
    let oversized_size = (bootloader_core::layout::FW_MAX + 1) as u16;
    let meta_bytes = FirmwareMetadata {
        version: 2,
        fw_size: oversized_size,
        release_msg_size: 0,
    }
    .to_bytes();

    let host_bytes = meta_bytes.to_vec();
    let debug_bytes = hmac_of(&meta_bytes).to_vec();

    let (result, flash) = run(&host_bytes, &debug_bytes, 0);
    assert_eq!(
        result.unwrap_err(),
        UpdateError::Bounds("fw_size exceeds maximum")
    );
    assert_eq!(flash.erase_count, 0);
}

#[test]
fn zero_length_firmware_is_rejected() {
    let mut meta_bytes = [0u8; FW_METADATA_SIZE];
    meta_bytes[0..2].copy_from_slice(&2u16.to_le_bytes());
    let host_bytes = meta_bytes.to_vec();
    let debug_bytes = hmac_of(&meta_bytes).to_vec();

    let (result, _flash) = run(&host_bytes, &debug_bytes, 0);
    assert_eq!(result.unwrap_err(), UpdateError::Bounds("fw_size is zero"));
}

#[test]
fn boot_command_reads_back_committed_release_message() {
    let plaintext = b"v2 firmware";
    let release_msg = b"now with release notes";
    let (host_bytes, debug_bytes) = seal_update(2, plaintext, release_msg);
    let (result, flash) = run(&host_bytes, &debug_bytes, 1);

    let meta = result.unwrap();
    let stored_msg = flash.read(MSG_ADDR, meta.release_msg_size as usize);
    assert_eq!(stored_msg, release_msg);
}
