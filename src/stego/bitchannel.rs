// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Bit-level payload transport over a keyed walker.
//!
//! Each payload byte is XOR-masked with a rotating key-hash byte, then
//! written bit by bit (most significant first) to the indices the walker
//! yields. Decode mirrors the order exactly and hands each unmasked byte to
//! a [`ByteSink`], so extraction can stop at the container's stop chunk
//! instead of reading the whole substrate.

use log::trace;

use super::bag::{ByteSink, StreamStep};
use super::error::Result;
use super::progress::{ProgressReport, ProgressSink, Throttle};
use super::walker::{IndexWalker, Substrate};

/// Rotating XOR mask drawn from the key hash.
///
/// The starting offset comes from the first byte of the raw key, so both
/// sides stay in lockstep from the key material alone. The byte at the
/// seeded offset masks the first payload byte.
struct MaskStream<'a> {
    hash: &'a [u8],
    cursor: usize,
}

impl<'a> MaskStream<'a> {
    fn new(hash: &'a [u8], key_first: u8) -> Self {
        Self {
            hash,
            cursor: key_first as usize % hash.len(),
        }
    }

    fn next_byte(&mut self) -> u8 {
        let byte = self.hash[self.cursor];
        self.cursor = (self.cursor + 1) % self.hash.len();
        byte
    }
}

fn next_index<S: Substrate>(walker: &mut IndexWalker<S>, auto_extend: bool) -> Option<usize> {
    loop {
        if let Some(idx) = walker.advance() {
            return Some(idx);
        }
        if !auto_extend || !walker.escalate() {
            return None;
        }
    }
}

/// Write the payload through the walker. Returns `false` when the carrier
/// runs out of usable bits, leaving the substrate partially written.
pub fn encode<S: Substrate, P: ProgressSink>(
    walker: &mut IndexWalker<S>,
    key: &[u8],
    key_hash: &[u8],
    payload: &[u8],
    auto_extend: bool,
    progress: &mut P,
) -> bool {
    let capacity_bits = walker.capacity_bits(auto_extend) as u64;
    let mut mask = MaskStream::new(key_hash, key.first().copied().unwrap_or(0));
    let mut throttle = Throttle::new();
    let mut bits_used = 0u64;
    let mut bits_changed = 0u64;

    for &byte in payload {
        let masked = byte ^ mask.next_byte();
        for shift in (0..8).rev() {
            let bit = (masked >> shift) & 1;
            let Some(idx) = next_index(walker, auto_extend) else {
                trace!("carrier exhausted after {bits_used} bits");
                return false;
            };
            if walker.write_bit(idx, bit) {
                bits_changed += 1;
            }
            bits_used += 1;
            if throttle.ready() {
                progress.report(ProgressReport {
                    bits_used,
                    bits_changed,
                    capacity_bits,
                });
            }
        }
    }

    progress.report(ProgressReport {
        bits_used,
        bits_changed,
        capacity_bits,
    });
    true
}

/// Read bytes through the walker into the sink until the sink signals
/// [`StreamStep::EarlyComplete`] or the carrier runs out of usable bits.
///
/// Exhaustion is not an error here: the sink's own finalization decides
/// whether the stream it saw was complete.
pub fn decode<S: Substrate, K: ByteSink, P: ProgressSink>(
    walker: &mut IndexWalker<S>,
    key: &[u8],
    key_hash: &[u8],
    auto_extend: bool,
    sink: &mut K,
    progress: &mut P,
) -> Result<()> {
    let capacity_bits = walker.capacity_bits(auto_extend) as u64;
    let mut mask = MaskStream::new(key_hash, key.first().copied().unwrap_or(0));
    let mut throttle = Throttle::new();
    let mut bits_used = 0u64;

    loop {
        let mut acc = 0u8;
        for _ in 0..8 {
            let Some(idx) = next_index(walker, auto_extend) else {
                trace!("carrier exhausted after {bits_used} bits");
                return Ok(());
            };
            acc = (acc << 1) | walker.read_bit(idx);
            bits_used += 1;
            if throttle.ready() {
                progress.report(ProgressReport {
                    bits_used,
                    bits_changed: 0,
                    capacity_bits,
                });
            }
        }
        let byte = acc ^ mask.next_byte();
        if sink.push(byte)? == StreamStep::EarlyComplete {
            progress.report(ProgressReport {
                bits_used,
                bits_changed: 0,
                capacity_bits,
            });
            return Ok(());
        }
    }
}
