// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! JPEG marker stream parsing.
//!
//! Walks every marker segment in a JPEG byte stream up to EOI, recording
//! scan-data start offsets as it crosses SOS segments. Unknown application
//! segments are kept verbatim so a rewrite can carry them through.

use super::error::{JpegError, Result};

/// JPEG marker bytes (without the 0xFF prefix).
pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOF0: u8 = 0xC0;
pub const SOF1: u8 = 0xC1;
pub const SOF2: u8 = 0xC2;
pub const DHT: u8 = 0xC4;
pub const DQT: u8 = 0xDB;
pub const DRI: u8 = 0xDD;
pub const SOS: u8 = 0xDA;
pub const COM: u8 = 0xFE;
pub const APP0: u8 = 0xE0;

/// One parsed marker with its position in the source stream.
pub struct MarkerEntry {
    pub marker: u8,
    /// Segment body without the 2-byte length field. Empty for standalone
    /// markers (SOI, EOI, RSTn).
    pub data: Vec<u8>,
    /// Byte offset of the marker's 0xFF prefix in the source.
    pub offset: usize,
}

impl MarkerEntry {
    /// True for APPn/COM segments that are passed through on rewrite.
    pub fn is_passthrough(&self) -> bool {
        self.marker == COM || (0xE0..=0xEF).contains(&self.marker)
    }
}

/// SOF markers this decoder cannot handle: lossless, differential, and
/// arithmetic-coded frames.
fn is_unsupported(marker: u8) -> bool {
    matches!(
        marker,
        0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF
    )
}

/// Parse the complete marker stream of a JPEG file.
///
/// Returns every marker up to and including EOI, plus the byte offset where
/// each scan's entropy-coded data begins (one entry per SOS). Entropy data
/// itself is skipped, not parsed.
pub fn parse_markers(data: &[u8]) -> Result<(Vec<MarkerEntry>, Vec<usize>)> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != SOI {
        return Err(JpegError::NotAJpeg);
    }

    let mut entries = vec![MarkerEntry {
        marker: SOI,
        data: Vec::new(),
        offset: 0,
    }];
    let mut scan_starts = Vec::new();
    let mut pos = 2;

    loop {
        while pos < data.len() && data[pos] != 0xFF {
            pos += 1;
        }
        // Skip 0xFF fill bytes before the marker byte.
        while pos + 1 < data.len() && data[pos + 1] == 0xFF {
            pos += 1;
        }
        if pos + 1 >= data.len() {
            return Err(JpegError::Truncated);
        }

        let marker_offset = pos;
        let marker = data[pos + 1];
        pos += 2;

        // A stuffed 0xFF 0x00 outside scan data is tolerated as noise.
        if marker == 0x00 {
            continue;
        }

        if marker == EOI || (0xD0..=0xD7).contains(&marker) {
            entries.push(MarkerEntry {
                marker,
                data: Vec::new(),
                offset: marker_offset,
            });
            if marker == EOI {
                return Ok((entries, scan_starts));
            }
            continue;
        }

        if is_unsupported(marker) {
            return Err(JpegError::UnsupportedMarker(marker));
        }

        if pos + 2 > data.len() {
            return Err(JpegError::Truncated);
        }
        let length = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        if length < 2 || pos + length > data.len() {
            return Err(JpegError::Structural("marker segment length out of range"));
        }

        entries.push(MarkerEntry {
            marker,
            data: data[pos + 2..pos + length].to_vec(),
            offset: marker_offset,
        });
        pos += length;

        if marker == SOS {
            scan_starts.push(pos);
            pos = skip_scan_data(data, pos)?;
        }
    }
}

/// Scan component selector from an SOS header:
/// (component_id, dc_table_id, ac_table_id).
pub fn parse_sos(data: &[u8]) -> Result<Vec<(u8, u8, u8)>> {
    if data.is_empty() {
        return Err(JpegError::Structural("empty SOS header"));
    }
    let num_components = data[0] as usize;
    if num_components == 0 || num_components > 4 {
        return Err(JpegError::Structural("SOS component count out of range"));
    }
    if data.len() < 1 + num_components * 2 + 3 {
        return Err(JpegError::Truncated);
    }

    let mut selectors = Vec::with_capacity(num_components);
    for i in 0..num_components {
        let offset = 1 + i * 2;
        let comp_id = data[offset];
        let tables = data[offset + 1];
        selectors.push((comp_id, tables >> 4, tables & 0x0F));
    }
    Ok(selectors)
}

/// Spectral selection and successive approximation parameters from an SOS
/// header (the trailing Ss, Se, Ah/Al bytes). Baseline scans carry
/// ss=0, se=63, ah=al=0.
#[derive(Debug, Clone, Copy)]
pub struct SosParams {
    pub ss: u8,
    pub se: u8,
    pub ah: u8,
    pub al: u8,
}

pub fn parse_sos_params(data: &[u8]) -> Result<SosParams> {
    if data.is_empty() {
        return Err(JpegError::Structural("empty SOS header"));
    }
    let params_offset = 1 + data[0] as usize * 2;
    if data.len() < params_offset + 3 {
        return Err(JpegError::Truncated);
    }
    Ok(SosParams {
        ss: data[params_offset],
        se: data[params_offset + 1],
        ah: data[params_offset + 2] >> 4,
        al: data[params_offset + 2] & 0x0F,
    })
}

/// Parse a DRI (Define Restart Interval) segment body.
pub fn parse_dri(data: &[u8]) -> Result<u16> {
    if data.len() < 2 {
        return Err(JpegError::Truncated);
    }
    Ok(u16::from_be_bytes([data[0], data[1]]))
}

/// Skip entropy-coded scan data starting at `pos`, returning the offset of
/// the 0xFF prefix of the next non-restart marker. Stuffed 0xFF 0x00 pairs
/// and RSTn markers belong to the scan and are stepped over.
fn skip_scan_data(data: &[u8], mut pos: usize) -> Result<usize> {
    while pos < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        if pos + 1 >= data.len() {
            return Err(JpegError::Truncated);
        }
        match data[pos + 1] {
            0x00 => pos += 2,
            0xD0..=0xD7 => pos += 2,
            0xFF => pos += 1,
            _ => return Ok(pos),
        }
    }
    Err(JpegError::Truncated)
}
