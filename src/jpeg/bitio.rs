// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Bit-level I/O for JPEG entropy-coded data.
//!
//! [`BitReader`] feeds the Huffman trie one bit at a time during decode;
//! [`BitWriter`] packs codes during encode. Both handle JPEG byte-stuffing
//! (0xFF -> 0xFF 0x00) and operate MSB-first.

use super::error::{JpegError, Result};

/// Bit-level reader over entropy-coded scan data.
///
/// De-stuffs 0xFF 0x00 sequences and flags real markers. After a marker is
/// hit, further reads return 1-fill so a decode in flight over the trailing
/// pad bits can finish without an index error.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    cur: u8,
    bits_left: u8,
    /// Set when a marker (0xFF followed by a non-zero byte) interrupts the stream.
    marker_found: Option<u8>,
}

impl<'a> BitReader<'a> {
    /// Create a reader with `pos` pointing at the first entropy-coded byte
    /// (right after the SOS header).
    pub fn new(data: &'a [u8], pos: usize) -> Self {
        Self {
            data,
            pos,
            cur: 0,
            bits_left: 0,
            marker_found: None,
        }
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<u8> {
        if self.bits_left == 0 {
            self.fill_byte()?;
        }
        self.bits_left -= 1;
        Ok((self.cur >> self.bits_left) & 1)
    }

    /// Read `count` bits (1–16), returned right-aligned.
    pub fn read_bits(&mut self, count: u8) -> Result<u16> {
        debug_assert!(count >= 1 && count <= 16);
        let mut val = 0u16;
        for _ in 0..count {
            val = (val << 1) | self.read_bit()? as u16;
        }
        Ok(val)
    }

    /// Discard the rest of the current byte.
    pub fn byte_align(&mut self) {
        self.bits_left = 0;
    }

    /// Current byte position in the underlying data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The marker byte, if a marker interrupted the entropy stream.
    pub fn marker_found(&self) -> Option<u8> {
        self.marker_found
    }

    /// Consume a restart marker (0xFFD0–0xFFD7) at a restart boundary.
    ///
    /// Handles both cases: `fill_byte` may already have swallowed the RST
    /// while a Huffman decode drained the pad bits, or the marker sits at
    /// the current stream position (possibly behind 0xFF fill bytes).
    /// Returns the marker's low nibble (0–7) if one was consumed.
    pub fn check_restart_marker(&mut self) -> Result<Option<u8>> {
        self.byte_align();

        if let Some(m) = self.marker_found {
            if (m & 0xF8) == 0xD0 {
                self.marker_found = None;
                return Ok(Some(m & 0x07));
            }
        }

        while self.pos + 1 < self.data.len() && self.data[self.pos] == 0xFF {
            let next = self.data[self.pos + 1];
            if next == 0xFF {
                self.pos += 1;
                continue;
            }
            if (next & 0xF8) == 0xD0 {
                self.pos += 2;
                return Ok(Some(next & 0x07));
            }
            break;
        }

        Ok(None)
    }

    fn fill_byte(&mut self) -> Result<()> {
        if self.marker_found.is_some() {
            // Past the end of the scan: 1-fill, like the pad bits.
            self.cur = 0xFF;
            self.bits_left = 8;
            return Ok(());
        }
        if self.pos >= self.data.len() {
            return Err(JpegError::Truncated);
        }
        let byte = self.data[self.pos];
        self.pos += 1;

        if byte == 0xFF {
            if self.pos >= self.data.len() {
                return Err(JpegError::Truncated);
            }
            let next = self.data[self.pos];
            if next == 0x00 {
                // Byte-stuffed 0xFF is data.
                self.pos += 1;
            } else {
                self.marker_found = Some(next);
                self.pos += 1;
                self.cur = 0xFF;
                self.bits_left = 8;
                return Ok(());
            }
        }

        self.cur = byte;
        self.bits_left = 8;
        Ok(())
    }
}

/// Bit-level writer for entropy-coded scan data.
///
/// Byte-stuffs 0xFF on output; [`BitWriter::finish`] pads the final partial
/// byte with 1-bits as the scan terminator requires.
pub struct BitWriter {
    output: Vec<u8>,
    buf: u8,
    bits_used: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            buf: 0,
            bits_used: 0,
        }
    }

    /// Write `count` bits (1–16) from the low bits of `value`, MSB-first.
    pub fn write_bits(&mut self, value: u16, count: u8) {
        debug_assert!(count >= 1 && count <= 16);
        for i in (0..count).rev() {
            let bit = (value >> i) & 1;
            self.buf = (self.buf << 1) | (bit as u8);
            self.bits_used += 1;
            if self.bits_used == 8 {
                self.emit_byte(self.buf);
                self.buf = 0;
                self.bits_used = 0;
            }
        }
    }

    /// Pad the final byte with 1-bits and return the accumulated output.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bits_used > 0 {
            let remaining = 8 - self.bits_used;
            self.buf = (self.buf << remaining) | ((1u8 << remaining) - 1);
            self.emit_byte(self.buf);
        }
        self.output
    }

    fn emit_byte(&mut self, byte: u8) {
        self.output.push(byte);
        if byte == 0xFF {
            self.output.push(0x00);
        }
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}
