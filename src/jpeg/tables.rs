// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Quantization and Huffman table segments.
//!
//! Parses DQT and DHT marker bodies (both may hold multiple tables) and
//! serializes them back. Also carries the fixed ITU-T T.81 Annex K table
//! set: re-encoding always uses these standard tables, because optimized
//! tables recovered from a decode can lack codes for mutated coefficients.

use super::dct::QuantTable;
use super::error::{JpegError, Result};
use super::zigzag::ZIGZAG_TO_NATURAL;

/// Parse a DQT marker segment body (after the 2-byte length).
///
/// Returns (table_id, table) pairs; a single segment can define several.
pub fn parse_dqt(data: &[u8]) -> Result<Vec<(u8, QuantTable)>> {
    let mut tables = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let pq_tq = data[pos];
        pos += 1;
        let precision = pq_tq >> 4;
        let table_id = pq_tq & 0x0F;

        if table_id > 3 {
            return Err(JpegError::Structural("quantization table id out of range"));
        }

        let mut values = [0u16; 64];
        match precision {
            0 => {
                if pos + 64 > data.len() {
                    return Err(JpegError::Truncated);
                }
                for zi in 0..64 {
                    values[ZIGZAG_TO_NATURAL[zi]] = data[pos + zi] as u16;
                }
                pos += 64;
            }
            1 => {
                if pos + 128 > data.len() {
                    return Err(JpegError::Truncated);
                }
                for zi in 0..64 {
                    values[ZIGZAG_TO_NATURAL[zi]] =
                        u16::from_be_bytes([data[pos + zi * 2], data[pos + zi * 2 + 1]]);
                }
                pos += 128;
            }
            _ => return Err(JpegError::Structural("invalid DQT precision")),
        }

        tables.push((table_id, QuantTable::new(values)));
    }

    Ok(tables)
}

/// Write a DQT marker segment (including the 0xFFDB marker and length).
pub fn write_dqt(table_id: u8, qt: &QuantTable) -> Vec<u8> {
    let precision = u8::from(qt.values.iter().any(|&v| v > 255));
    let data_len = if precision == 0 { 64 } else { 128 };
    let length = 2 + 1 + data_len;

    let mut out = vec![0xFF, super::marker::DQT];
    out.push((length >> 8) as u8);
    out.push(length as u8);
    out.push((precision << 4) | (table_id & 0x0F));

    for zi in 0..64 {
        let v = qt.values[ZIGZAG_TO_NATURAL[zi]];
        if precision == 0 {
            out.push(v as u8);
        } else {
            out.extend_from_slice(&v.to_be_bytes());
        }
    }

    out
}

/// Parsed Huffman table definition.
#[derive(Debug, Clone)]
pub struct HuffmanSpec {
    /// Table class: 0 = DC, 1 = AC.
    pub class: u8,
    /// Table ID (0–3).
    pub id: u8,
    /// Number of codes of each length (1–16).
    pub bits: [u8; 16],
    /// Symbol values in order of increasing code length.
    pub huffval: Vec<u8>,
}

/// Parse a DHT marker segment body (after the 2-byte length).
pub fn parse_dht(data: &[u8]) -> Result<Vec<HuffmanSpec>> {
    let mut specs = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let tc_th = data[pos];
        pos += 1;
        let class = tc_th >> 4;
        let id = tc_th & 0x0F;

        if class > 1 || id > 3 {
            return Err(JpegError::Structural("Huffman table class/id out of range"));
        }

        if pos + 16 > data.len() {
            return Err(JpegError::Truncated);
        }
        let mut bits = [0u8; 16];
        bits.copy_from_slice(&data[pos..pos + 16]);
        pos += 16;

        let total: usize = bits.iter().map(|&b| b as usize).sum();
        if pos + total > data.len() {
            return Err(JpegError::Truncated);
        }
        let huffval = data[pos..pos + total].to_vec();
        pos += total;

        specs.push(HuffmanSpec {
            class,
            id,
            bits,
            huffval,
        });
    }

    Ok(specs)
}

/// Write a DHT marker segment (including the 0xFFC4 marker and length)
/// holding all given table definitions.
pub fn write_dht(specs: &[&HuffmanSpec]) -> Vec<u8> {
    let mut body = Vec::new();
    for spec in specs {
        body.push((spec.class << 4) | (spec.id & 0x0F));
        body.extend_from_slice(&spec.bits);
        body.extend_from_slice(&spec.huffval);
    }

    let length = (body.len() + 2) as u16;
    let mut out = vec![0xFF, super::marker::DHT];
    out.push((length >> 8) as u8);
    out.push(length as u8);
    out.extend_from_slice(&body);
    out
}

// Fixed standard tables, ITU-T T.81 Annex K (Tables K.3–K.6).

const STD_DC_LUMA_BITS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
const STD_DC_CHROMA_BITS: [u8; 16] = [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0];
const STD_DC_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

const STD_AC_LUMA_BITS: [u8; 16] = [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7D];
const STD_AC_LUMA_VALUES: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12,
    0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
    0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08,
    0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52, 0xD1, 0xF0,
    0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A, 0x16,
    0x17, 0x18, 0x19, 0x1A, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2A, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39,
    0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
    0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59,
    0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
    0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79,
    0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
    0x8A, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98,
    0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7,
    0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6,
    0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5,
    0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4,
    0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2,
    0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA,
    0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8,
    0xF9, 0xFA,
];

const STD_AC_CHROMA_BITS: [u8; 16] = [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 0x77];
const STD_AC_CHROMA_VALUES: [u8; 162] = [
    0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21,
    0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
    0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91,
    0xA1, 0xB1, 0xC1, 0x09, 0x23, 0x33, 0x52, 0xF0,
    0x15, 0x62, 0x72, 0xD1, 0x0A, 0x16, 0x24, 0x34,
    0xE1, 0x25, 0xF1, 0x17, 0x18, 0x19, 0x1A, 0x26,
    0x27, 0x28, 0x29, 0x2A, 0x35, 0x36, 0x37, 0x38,
    0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
    0x49, 0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58,
    0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
    0x69, 0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78,
    0x79, 0x7A, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
    0x88, 0x89, 0x8A, 0x92, 0x93, 0x94, 0x95, 0x96,
    0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5,
    0xA6, 0xA7, 0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4,
    0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3,
    0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2,
    0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA,
    0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9,
    0xEA, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8,
    0xF9, 0xFA,
];

/// The standard DC table for luminance (id 0) or chrominance (id 1).
pub fn standard_dc_spec(chroma: bool) -> HuffmanSpec {
    HuffmanSpec {
        class: 0,
        id: u8::from(chroma),
        bits: if chroma { STD_DC_CHROMA_BITS } else { STD_DC_LUMA_BITS },
        huffval: STD_DC_VALUES.to_vec(),
    }
}

/// The standard AC table for luminance (id 0) or chrominance (id 1).
pub fn standard_ac_spec(chroma: bool) -> HuffmanSpec {
    HuffmanSpec {
        class: 1,
        id: u8::from(chroma),
        bits: if chroma { STD_AC_CHROMA_BITS } else { STD_AC_LUMA_BITS },
        huffval: if chroma {
            STD_AC_CHROMA_VALUES.to_vec()
        } else {
            STD_AC_LUMA_VALUES.to_vec()
        },
    }
}
