// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Embedding parameters.

use super::crypto::HashAlgo;

/// Parameters shared by embed and extract.
///
/// The master key seeds the walker and XOR mask through its hash; the data
/// key (falling back to the master key) encrypts chunk payloads. Both sides
/// must agree on every field.
#[derive(Clone)]
pub struct Parameters {
    master_key: Vec<u8>,
    data_key: Option<Vec<u8>>,
    hash_algo: HashAlgo,
    bit_start: u8,
    auto_extend: bool,
}

impl Parameters {
    pub fn new(master_key: impl Into<Vec<u8>>) -> Self {
        Self {
            master_key: master_key.into(),
            data_key: None,
            hash_algo: HashAlgo::default(),
            bit_start: 0,
            auto_extend: true,
        }
    }

    /// Separate key for payload encryption. Without one, the master key is
    /// used for both selection and encryption.
    pub fn with_data_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.data_key = Some(key.into());
        self
    }

    pub fn with_hash_algo(mut self, algo: HashAlgo) -> Self {
        self.hash_algo = algo;
        self
    }

    /// Starting bit-plane (0 = LSB .. 7). Values above 7 are rejected when
    /// the walker is built.
    pub fn with_bit_start(mut self, plane: u8) -> Self {
        self.bit_start = plane;
        self
    }

    /// Whether to escalate to higher bit-planes when the current plane's
    /// usable slots run out.
    pub fn with_auto_extend(mut self, enabled: bool) -> Self {
        self.auto_extend = enabled;
        self
    }

    /// Hash of the master key: drives index selection and the XOR mask.
    pub fn key_hash(&self) -> Vec<u8> {
        self.hash_algo.digest(&self.master_key)
    }

    /// Raw master key; its first byte seeds the XOR mask offset.
    pub fn master_key(&self) -> &[u8] {
        &self.master_key
    }

    pub fn data_key(&self) -> &[u8] {
        self.data_key.as_deref().unwrap_or(&self.master_key)
    }

    pub fn hash_algo(&self) -> HashAlgo {
        self.hash_algo
    }

    pub fn bit_start(&self) -> u8 {
        self.bit_start
    }

    pub fn auto_extend(&self) -> bool {
        self.auto_extend
    }
}
