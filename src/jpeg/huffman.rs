// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Canonical Huffman coding for JPEG entropy data.
//!
//! Decode uses [`HuffmanTrie`], a binary decision trie built from the 16
//! code-length counts plus the symbol list of a DHT definition. Encode uses
//! [`HuffmanEncodeTable`], a flat symbol-to-codeword map built from the same
//! canonical definition.

use super::bitio::BitReader;
use super::error::{JpegError, Result};

/// One trie node: up to two child links and up to two terminal symbols,
/// indexed by the bit value read.
#[derive(Default)]
struct TrieNode {
    child: [Option<u32>; 2],
    sym: [Option<u8>; 2],
}

/// Binary decision trie over canonical Huffman codes.
///
/// Built once per DHT definition and read-only afterwards. Construction
/// walks code lengths 1..=16 keeping the frontier of open nodes per depth:
/// at each depth the first `bits[len-1]` slots (in left-to-right frontier
/// order) become terminals for the next symbols, and the remaining slots
/// open child nodes for the next depth. This reproduces the canonical
/// assignment where shorter codes are lexicographically smaller.
pub struct HuffmanTrie {
    nodes: Vec<TrieNode>,
}

impl HuffmanTrie {
    /// Build a trie from a JPEG table definition.
    ///
    /// `bits[i]` is the number of codes of length i+1; `huffval` lists the
    /// symbols in order of increasing code length.
    pub fn build(bits: &[u8; 16], huffval: &[u8]) -> Result<Self> {
        let total: usize = bits.iter().map(|&b| b as usize).sum();
        if total != huffval.len() {
            return Err(JpegError::Structural("DHT symbol count mismatch"));
        }

        let mut nodes: Vec<TrieNode> = vec![TrieNode::default()];
        let mut level: Vec<u32> = vec![0];
        let mut si = 0usize;

        for &count in bits.iter() {
            let count = count as usize;
            // Slots at this depth, left to right: (node, bit) pairs.
            let slot_count = level.len() * 2;
            if count > slot_count {
                return Err(JpegError::Structural("DHT code counts overfill a level"));
            }
            for s in 0..count {
                let node = level[s / 2] as usize;
                nodes[node].sym[s % 2] = Some(huffval[si]);
                si += 1;
            }
            if si == huffval.len() {
                break;
            }
            // Remaining slots open nodes for the next depth.
            let mut next = Vec::with_capacity(slot_count - count);
            for s in count..slot_count {
                let node = level[s / 2] as usize;
                let id = nodes.len() as u32;
                nodes.push(TrieNode::default());
                nodes[node].child[s % 2] = Some(id);
                next.push(id);
            }
            if next.is_empty() {
                return Err(JpegError::Structural("DHT symbols left with no open slots"));
            }
            level = next;
        }

        if si != huffval.len() {
            return Err(JpegError::Structural("DHT symbols left with no open slots"));
        }

        Ok(Self { nodes })
    }

    /// Decode one symbol, descending the trie bit by bit.
    pub fn decode(&self, reader: &mut BitReader) -> Result<u8> {
        let mut node = 0usize;
        loop {
            let bit = reader.read_bit()? as usize;
            let n = &self.nodes[node];
            if let Some(sym) = n.sym[bit] {
                return Ok(sym);
            }
            match n.child[bit] {
                Some(c) => node = c as usize,
                None => return Err(JpegError::BadCode),
            }
        }
    }
}

/// Huffman encode table: maps symbol -> (codeword, length).
pub struct HuffmanEncodeTable {
    /// Length 0 means the symbol has no code in this table.
    table: [(u16, u8); 256],
}

impl HuffmanEncodeTable {
    /// Build an encode table from a JPEG table definition.
    pub fn build(bits: &[u8; 16], huffval: &[u8]) -> Self {
        let mut table = [(0u16, 0u8); 256];
        let mut code: u32 = 0;
        let mut si = 0;

        for length in 1..=16u8 {
            for _ in 0..bits[(length - 1) as usize] {
                if si < huffval.len() {
                    table[huffval[si] as usize] = (code as u16, length);
                    si += 1;
                }
                code += 1;
            }
            code <<= 1;
        }

        Self { table }
    }

    /// Look up the codeword for a symbol.
    pub fn encode(&self, symbol: u8) -> Result<(u16, u8)> {
        let (code, len) = self.table[symbol as usize];
        if len == 0 {
            Err(JpegError::Structural("Huffman table missing code for symbol"))
        } else {
            Ok((code, len))
        }
    }
}

/// Extend a value from its JPEG "additional bits" representation
/// (ITU-T T.81 Table F.1: a leading 0 bit marks a negative value).
pub fn extend_sign(value: u16, bits: u8) -> i16 {
    if bits == 0 {
        return 0;
    }
    let half = 1i32 << (bits - 1);
    if (value as i32) < half {
        (value as i32 - (1i32 << bits) + 1) as i16
    } else {
        value as i16
    }
}

/// Encode a signed value into its magnitude category and additional bits.
/// Returns (magnitude_bits, category).
pub fn magnitude_category(value: i16) -> (u16, u8) {
    if value == 0 {
        return (0, 0);
    }
    let abs = value.unsigned_abs();
    let size = 16 - abs.leading_zeros() as u8;
    let bits = if value > 0 {
        value as u16
    } else {
        // One's complement for negatives.
        (value - 1) as u16
    };
    (bits & ((1u16 << size) - 1), size)
}
