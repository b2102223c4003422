// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Constant-time HMAC-SHA256 verification and AES-128-GCM open, behind a
//! narrow capability so no RustCrypto type ever appears in the protocol
//! module's signatures.

use aes_gcm::aead::AeadInPlace;
use aes_gcm::{Aes128Gcm, KeyInit, Nonce, Tag};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::channel::Channel;
use crate::error::{AuthStage, UpdateError};
use crate::layout::{HMAC_SIZE, IV_SIZE, TAG_SIZE};

type HmacSha256 = Hmac<Sha256>;

/// Holds the two pre-shared keys. Immutable, `Copy`, provisioned once at
/// build time.
#[derive(Clone, Copy)]
pub struct Verifier {
    hmac_key: [u8; 32],
    aes_key: [u8; 16],
}

impl Verifier {
    pub const fn new(hmac_key: [u8; 32], aes_key: [u8; 16]) -> Self {
        Self { hmac_key, aes_key }
    }

    /// Read the 32-byte expected MAC from `debug`, compute HMAC-SHA256 over
    /// `data` with the pre-shared key, and compare in constant time.
    pub fn hmac_verify(
        &self,
        debug: &mut impl Channel,
        data: &[u8],
        stage: AuthStage,
    ) -> Result<(), UpdateError> {
        let mut expected = [0u8; HMAC_SIZE];
        debug.read_exact(&mut expected)?;

        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.hmac_key)
            .expect("hmac accepts any key length");
        mac.update(data);
        let computed = mac.finalize().into_bytes();

        if constant_time_eq(&expected, computed.as_slice()) {
            Ok(())
        } else {
            Err(UpdateError::Auth(stage))
        }
    }

    /// Read a 16-byte IV and 16-byte tag from `debug`, then decrypt `buf` in
    /// place with AES-128-GCM, verifying the tag. No associated data.
    pub fn gcm_open(&self, debug: &mut impl Channel, buf: &mut [u8]) -> Result<(), UpdateError> {
        let mut iv = [0u8; IV_SIZE];
        debug.read_exact(&mut iv)?;
        let mut tag_bytes = [0u8; TAG_SIZE];
        debug.read_exact(&mut tag_bytes)?;

        let cipher = Aes128Gcm::new_from_slice(&self.aes_key).expect("16-byte key");
        let nonce = Nonce::from_slice(&iv);
        let tag = Tag::from_slice(&tag_bytes);

        cipher
            .decrypt_in_place_detached(nonce, &[], buf, tag)
            .map_err(|_| UpdateError::Auth(AuthStage::Decrypt))
    }
}

/// XOR-accumulates every byte difference before testing for equality once,
/// so the number of loop iterations and the final branch never depend on
/// where (or whether) the two digests first differ.
fn constant_time_eq(a: &[u8; HMAC_SIZE], b: &[u8]) -> bool {
    let mut acc = 0u8;
    for i in 0..HMAC_SIZE {
        acc |= a[i] ^ b[i];
    }
    acc == 0
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;
    use crate::fake::FakeChannel;

    const HMAC_KEY: [u8; 32] = [0x42; 32];
    const AES_KEY: [u8; 16] = [0x24; 16];

    fn compute_hmac(data: &[u8]) -> [u8; 32] {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&HMAC_KEY).unwrap();
        mac.update(data);
        mac.finalize().into_bytes().into()
    }

    #[test]
    fn hmac_verify_accepts_matching_mac() {
        let v = Verifier::new(HMAC_KEY, AES_KEY);
        let data = b"firmware bytes go here";
        let mac = compute_hmac(data);
        let mut debug = FakeChannel::with_input(&mac);
        assert!(v.hmac_verify(&mut debug, data, AuthStage::Frame).is_ok());
    }

    #[test]
    fn hmac_verify_rejects_tampered_data() {
        let v = Verifier::new(HMAC_KEY, AES_KEY);
        let mac = compute_hmac(b"original data");
        let mut debug = FakeChannel::with_input(&mac);
        let err = v
            .hmac_verify(&mut debug, b"tampered data", AuthStage::Frame)
            .unwrap_err();
        assert_eq!(err, UpdateError::Auth(AuthStage::Frame));
    }

    #[test]
    fn hmac_verify_rejects_tampered_mac() {
        let v = Verifier::new(HMAC_KEY, AES_KEY);
        let data = b"some data";
        let mut mac = compute_hmac(data);
        mac[0] ^= 0x01;
        let mut debug = FakeChannel::with_input(&mac);
        assert!(v.hmac_verify(&mut debug, data, AuthStage::Metadata).is_err());
    }

    #[test]
    fn gcm_roundtrip() {
        let v = Verifier::new(HMAC_KEY, AES_KEY);
        let plaintext = b"secret firmware payload";
        let iv = [0x11u8; IV_SIZE];

        let cipher = Aes128Gcm::new_from_slice(&AES_KEY).unwrap();
        let mut buf = *plaintext;
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&iv), &[], &mut buf)
            .unwrap();

        let mut sealed = Vec::new();
        sealed.extend_from_slice(&iv);
        sealed.extend_from_slice(&tag);
        let mut debug = FakeChannel::with_input(&sealed);

        v.gcm_open(&mut debug, &mut buf).unwrap();
        assert_eq!(&buf[..], &plaintext[..]);
    }

    #[test]
    fn gcm_rejects_tampered_ciphertext() {
        let v = Verifier::new(HMAC_KEY, AES_KEY);
        let plaintext = b"secret firmware payload";
        let iv = [0x11u8; IV_SIZE];

        let cipher = Aes128Gcm::new_from_slice(&AES_KEY).unwrap();
        let mut buf = *plaintext;
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&iv), &[], &mut buf)
            .unwrap();
        buf[0] ^= 0x01;

        let mut sealed = Vec::new();
        sealed.extend_from_slice(&iv);
        sealed.extend_from_slice(&tag);
        let mut debug = FakeChannel::with_input(&sealed);

        assert!(v.gcm_open(&mut debug, &mut buf).is_err());
    }
}
