// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host-side sealing: the mirror image of `bootloader_core::crypto::Verifier`.
//!
//! Computes the HMACs the device will verify and produces the AES-128-GCM
//! ciphertext, IV, and tag the device will open, using the same pre-shared
//! keys and the same wire types (`bootloader-core`, `std` feature) so the
//! byte layouts match exactly.

use aes_gcm::aead::AeadInPlace;
use aes_gcm::{Aes128Gcm, KeyInit, Nonce};
use bootloader_core::layout::IV_SIZE;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub struct Sealer {
    hmac_key: [u8; 32],
    aes_key: [u8; 16],
}

impl Sealer {
    pub fn new(hmac_key: [u8; 32], aes_key: [u8; 16]) -> Self {
        Self { hmac_key, aes_key }
    }

    pub fn hmac(&self, data: &[u8]) -> [u8; 32] {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.hmac_key)
            .expect("hmac accepts any key length");
        mac.update(data);
        mac.finalize().into_bytes().into()
    }

    /// Encrypt `plaintext` in place with a fresh random IV, returning
    /// `(iv, tag)`. Ciphertext length always equals plaintext length.
    pub fn seal_in_place(&self, buf: &mut [u8]) -> ([u8; IV_SIZE], [u8; 16]) {
        let mut iv = [0u8; IV_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);

        let cipher = Aes128Gcm::new_from_slice(&self.aes_key).expect("16-byte key");
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&iv), &[], buf)
            .expect("encryption over a bounded in-memory buffer cannot fail");

        (iv, tag.into())
    }
}
