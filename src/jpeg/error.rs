// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for JPEG coefficient decoding and encoding.

use std::fmt;

/// Errors that can occur while decoding or re-encoding a JPEG stream.
///
/// Three families: structural damage (bad magic, impossible Huffman path,
/// inconsistent segment contents), truncation (the stream ends before a
/// declared length is satisfied), and features this codec deliberately
/// does not handle (multiple frames, arithmetic coding, 12-bit precision).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JpegError {
    /// Input ends mid-marker or mid-scan.
    Truncated,
    /// Missing SOI (0xFFD8) at the start of the data.
    NotAJpeg,
    /// A marker segment is malformed or internally inconsistent.
    Structural(&'static str),
    /// The entropy stream reached a trie position with no symbol and no child.
    BadCode,
    /// A Huffman table referenced by the scan was never defined.
    MissingHuffmanTable(u8),
    /// Component ID referenced in SOS not declared in SOF.
    UnknownComponentId(u8),
    /// A feature outside the supported subset (multi-frame, multi-scan
    /// baseline, differential/lossless/arithmetic SOF variants).
    Unsupported(&'static str),
    /// A frame marker this codec rejects at parse time.
    UnsupportedMarker(u8),
    /// Sample precision other than 8 bits.
    UnsupportedPrecision(u8),
}

impl fmt::Display for JpegError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "truncated JPEG data"),
            Self::NotAJpeg => write!(f, "missing SOI marker (not a JPEG)"),
            Self::Structural(msg) => write!(f, "structurally invalid JPEG: {msg}"),
            Self::BadCode => write!(f, "invalid Huffman code in entropy stream"),
            Self::MissingHuffmanTable(id) => write!(f, "Huffman table {id} not defined"),
            Self::UnknownComponentId(id) => write!(f, "unknown component ID in SOS: {id}"),
            Self::Unsupported(msg) => write!(f, "unsupported JPEG feature: {msg}"),
            Self::UnsupportedMarker(m) => write!(f, "unsupported JPEG marker: 0xFF{m:02X}"),
            Self::UnsupportedPrecision(p) => write!(f, "unsupported sample precision: {p}-bit"),
        }
    }
}

impl std::error::Error for JpegError {}

pub type Result<T> = std::result::Result<T, JpegError>;
