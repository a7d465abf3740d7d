// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Carrier format registry.
//!
//! Maps file bytes or extensions to a carrier codec. The registry is a
//! plain value owned by the caller; there is no global table.

/// A carrier file format the embedder understands.
pub trait CarrierCodec {
    /// Stable codec identifier, recorded alongside embedded data.
    fn name(&self) -> &'static str;

    /// Lowercase file extensions this codec claims.
    fn extensions(&self) -> &'static [&'static str];

    /// Whether the leading bytes look like this format.
    fn matches(&self, data: &[u8]) -> bool;
}

/// JPEG carrier, recognized by its SOI/marker prefix.
pub struct JpegCarrier;

impl CarrierCodec for JpegCarrier {
    fn name(&self) -> &'static str {
        "JPEG/BINARY/20230101"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["jpg", "jpe", "jpeg", "jfif"]
    }

    fn matches(&self, data: &[u8]) -> bool {
        data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF
    }
}

/// Ordered collection of carrier codecs; first match wins.
pub struct CodecRegistry {
    codecs: Vec<Box<dyn CarrierCodec>>,
}

impl CodecRegistry {
    /// Registry with the built-in codecs.
    pub fn new() -> Self {
        let mut r = Self { codecs: Vec::new() };
        r.register(Box::new(JpegCarrier));
        r
    }

    pub fn empty() -> Self {
        Self { codecs: Vec::new() }
    }

    pub fn register(&mut self, codec: Box<dyn CarrierCodec>) {
        self.codecs.push(codec);
    }

    /// Codec claiming the given file content, by magic bytes.
    pub fn for_bytes(&self, data: &[u8]) -> Option<&dyn CarrierCodec> {
        self.codecs
            .iter()
            .map(|c| c.as_ref())
            .find(|c| c.matches(data))
    }

    /// Codec claiming the given extension, case-insensitively.
    pub fn for_extension(&self, ext: &str) -> Option<&dyn CarrierCodec> {
        let ext = ext.to_ascii_lowercase();
        self.codecs
            .iter()
            .map(|c| c.as_ref())
            .find(|c| c.extensions().contains(&ext.as_str()))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}
