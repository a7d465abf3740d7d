// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the embedding pipeline.
//!
//! [`StegoError`] covers everything from carrier parsing through container
//! framing. Capacity exhaustion inside the bit channel is a boolean outcome,
//! not an error; only the outer embed operation converts it to
//! [`StegoError::CapacityExceeded`].

use core::fmt;

use crate::jpeg::error::JpegError;

pub type Result<T> = core::result::Result<T, StegoError>;

/// Errors from steganographic embedding or extraction.
#[derive(Debug)]
pub enum StegoError {
    /// The carrier could not be parsed as a valid JPEG.
    Jpeg(JpegError),
    /// A structural problem in stego data (bad magic, malformed chunk).
    Structural(&'static str),
    /// The stream ended before a declared length was satisfied.
    Truncated,
    /// The payload does not fit, even after full bit-plane escalation.
    CapacityExceeded,
    /// A chunk carried a tag the container format does not define.
    UnknownChunkTag(u8),
    /// AES decryption failed (wrong key or corrupted data).
    DecryptionFailed,
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jpeg(e) => write!(f, "invalid JPEG carrier: {e}"),
            Self::Structural(msg) => write!(f, "malformed stego data: {msg}"),
            Self::Truncated => write!(f, "stego data ended unexpectedly"),
            Self::CapacityExceeded => write!(f, "payload too large for this carrier"),
            Self::UnknownChunkTag(tag) => write!(f, "unknown chunk tag 0x{tag:02X}"),
            Self::DecryptionFailed => write!(f, "decryption failed (wrong key?)"),
        }
    }
}

impl std::error::Error for StegoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Jpeg(e) => Some(e),
            _ => None,
        }
    }
}

impl From<JpegError> for StegoError {
    fn from(e: JpegError) -> Self {
        Self::Jpeg(e)
    }
}
