// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Hashing and payload encryption.
//!
//! The key hash driving the walker and XOR mask comes from [`HashAlgo`];
//! chunk payloads are encrypted with AES-256-CBC (PKCS#7, zero IV) under a
//! PBKDF2-HMAC-SHA256 key derived from the data key, salted with the
//! configured hash of the master key. The IV can be fixed because every
//! key/payload pair is embedded at most once per container.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use zeroize::Zeroizing;

use super::error::StegoError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// PBKDF2 iteration count for the payload key.
const PBKDF2_ITERATIONS: u32 = 65_536;

/// Hash algorithm for the walker/mask key hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgo {
    Md5,
    Sha1,
    Sha256,
    #[default]
    Sha512,
}

impl HashAlgo {
    /// Canonical algorithm name, as stored in Hash chunks.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Resolve a canonical name back to an algorithm.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MD5" => Some(Self::Md5),
            "SHA-1" => Some(Self::Sha1),
            "SHA-256" => Some(Self::Sha256),
            "SHA-512" => Some(Self::Sha512),
            _ => None,
        }
    }

    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Md5 => Md5::digest(data).to_vec(),
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

/// Derive the AES-256 payload key from the data key.
///
/// The salt is the configured hash of the master key, so both sides derive
/// identical keys without embedding a salt in the container.
pub fn derive_payload_key(key: &[u8], salt: &[u8]) -> Zeroizing<[u8; 32]> {
    let mut out = Zeroizing::new([0u8; 32]);
    pbkdf2::pbkdf2_hmac::<Sha256>(key, salt, PBKDF2_ITERATIONS, &mut *out);
    out
}

/// Encrypt with AES-256-CBC / PKCS#7 under the derived payload key.
pub fn encrypt(plaintext: &[u8], key: &[u8], salt: &[u8]) -> Vec<u8> {
    let derived = derive_payload_key(key, salt);
    let iv = [0u8; 16];
    Aes256CbcEnc::new((&*derived).into(), (&iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt AES-256-CBC / PKCS#7 data.
///
/// Fails with [`StegoError::DecryptionFailed`] on bad padding, which is how
/// a wrong key usually manifests.
pub fn decrypt(ciphertext: &[u8], key: &[u8], salt: &[u8]) -> Result<Vec<u8>, StegoError> {
    if ciphertext.is_empty() || ciphertext.len() % 16 != 0 {
        return Err(StegoError::DecryptionFailed);
    }
    let derived = derive_payload_key(key, salt);
    let iv = [0u8; 16];
    Aes256CbcDec::new((&*derived).into(), (&iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| StegoError::DecryptionFailed)
}
