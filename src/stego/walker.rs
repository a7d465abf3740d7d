// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Keyed, non-repeating index walk over an addressable bit substrate.
//!
//! [`IndexWalker`] turns a key hash into a pseudo-random sequence of
//! substrate indices: each step adds the next hash byte to the running
//! index modulo the domain size, then linear-probes past indices that are
//! already used or unusable at the active bit-plane. Within one plane an
//! index is never yielded twice; [`IndexWalker::escalate`] moves to the
//! next plane and forgets the used set.
//!
//! The [`Substrate`] trait abstracts the three carrier domains: JPEG DCT
//! coefficients (magnitude-gated usability), raster pixel channels, and
//! opaque byte slots (both always usable).

use log::debug;

use super::error::{Result, StegoError};
use crate::jpeg::dct::DctGrid;

/// An addressable domain of bit-plane units.
pub trait Substrate {
    /// Number of addressable units.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the unit may carry a bit at the given plane.
    fn usable(&self, idx: usize, plane: u8) -> bool;

    /// The unit's bit at the given plane (0 or 1).
    fn read_bit(&self, idx: usize, plane: u8) -> u8;

    /// Set the unit's bit at the given plane. Returns whether the stored
    /// value actually changed.
    fn write_bit(&mut self, idx: usize, plane: u8, bit: u8) -> bool;

    /// Per-plane usable-unit counts, if the substrate gates usability.
    /// `None` means every unit is usable at every plane.
    fn plane_histogram(&self) -> Option<&[usize; 8]> {
        None
    }
}

/// A JPEG coefficient is usable at plane b iff it has significant magnitude
/// bits above b, so flipping bit b cannot manufacture structure out of a
/// zero or near-zero coefficient.
fn coeff_usable(coef: i16, plane: u8) -> bool {
    (coef as i32) & ((-1i32) << (plane + 1)) != 0
}

/// Substrate over the flattened DCT coefficients of all components.
///
/// Indices run through component 0's coefficients in block-raster order,
/// then component 1's, and so on. The usable-count histogram is computed
/// once here; plane-b writes never change plane-b usability, so it stays
/// exact for the walk.
pub struct CoeffSubstrate<'a> {
    grids: &'a mut [DctGrid],
    /// Flat index where each grid begins.
    starts: Vec<usize>,
    total: usize,
    histogram: [usize; 8],
}

impl<'a> CoeffSubstrate<'a> {
    pub fn new(grids: &'a mut [DctGrid]) -> Self {
        let mut starts = Vec::with_capacity(grids.len());
        let mut total = 0usize;
        for grid in grids.iter() {
            starts.push(total);
            total += grid.len();
        }

        let mut histogram = [0usize; 8];
        for grid in grids.iter() {
            for &coef in grid.coeffs() {
                for plane in 0..8u8 {
                    if coeff_usable(coef, plane) {
                        histogram[plane as usize] += 1;
                    }
                }
            }
        }
        debug!("coefficient substrate: {total} units, usable per plane {histogram:?}");

        Self {
            grids,
            starts,
            total,
            histogram,
        }
    }

    fn locate(&self, idx: usize) -> (usize, usize) {
        debug_assert!(idx < self.total);
        let gi = match self.starts.binary_search(&idx) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (gi, idx - self.starts[gi])
    }
}

impl Substrate for CoeffSubstrate<'_> {
    fn len(&self) -> usize {
        self.total
    }

    fn usable(&self, idx: usize, plane: u8) -> bool {
        let (gi, off) = self.locate(idx);
        coeff_usable(self.grids[gi].get_flat(off), plane)
    }

    fn read_bit(&self, idx: usize, plane: u8) -> u8 {
        let (gi, off) = self.locate(idx);
        ((self.grids[gi].get_flat(off) >> plane) & 1) as u8
    }

    fn write_bit(&mut self, idx: usize, plane: u8, bit: u8) -> bool {
        let (gi, off) = self.locate(idx);
        let coef = self.grids[gi].get_flat(off);
        let mask = 1i16 << plane;
        let new = if bit != 0 { coef | mask } else { coef & !mask };
        if new != coef {
            self.grids[gi].set_flat(off, new);
            true
        } else {
            false
        }
    }

    fn plane_histogram(&self) -> Option<&[usize; 8]> {
        Some(&self.histogram)
    }
}

/// Raster pixel access provided by an external bitmap library.
pub trait PixelBuffer {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Color channels per pixel (3 for RGB, 4 for RGBA).
    fn channels(&self) -> usize;
    fn channel(&self, x: usize, y: usize, c: usize) -> u8;
    fn set_channel(&mut self, x: usize, y: usize, c: usize, value: u8);
}

/// Substrate over raster pixel channels; every channel byte is usable at
/// every plane.
pub struct PixelSubstrate<'a, B: PixelBuffer> {
    buf: &'a mut B,
}

impl<'a, B: PixelBuffer> PixelSubstrate<'a, B> {
    pub fn new(buf: &'a mut B) -> Self {
        Self { buf }
    }

    fn locate(&self, idx: usize) -> (usize, usize, usize) {
        let c = idx % self.buf.channels();
        let pixel = idx / self.buf.channels();
        (pixel % self.buf.width(), pixel / self.buf.width(), c)
    }
}

impl<B: PixelBuffer> Substrate for PixelSubstrate<'_, B> {
    fn len(&self) -> usize {
        self.buf.width() * self.buf.height() * self.buf.channels()
    }

    fn usable(&self, _idx: usize, _plane: u8) -> bool {
        true
    }

    fn read_bit(&self, idx: usize, plane: u8) -> u8 {
        let (x, y, c) = self.locate(idx);
        (self.buf.channel(x, y, c) >> plane) & 1
    }

    fn write_bit(&mut self, idx: usize, plane: u8, bit: u8) -> bool {
        let (x, y, c) = self.locate(idx);
        let value = self.buf.channel(x, y, c);
        let mask = 1u8 << plane;
        let new = if bit != 0 { value | mask } else { value & !mask };
        if new != value {
            self.buf.set_channel(x, y, c, new);
            true
        } else {
            false
        }
    }
}

/// Substrate over opaque byte slots (document carriers); always usable.
pub struct SlotSubstrate<'a> {
    slots: &'a mut [u8],
}

impl<'a> SlotSubstrate<'a> {
    pub fn new(slots: &'a mut [u8]) -> Self {
        Self { slots }
    }
}

impl Substrate for SlotSubstrate<'_> {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn usable(&self, _idx: usize, _plane: u8) -> bool {
        true
    }

    fn read_bit(&self, idx: usize, plane: u8) -> u8 {
        (self.slots[idx] >> plane) & 1
    }

    fn write_bit(&mut self, idx: usize, plane: u8, bit: u8) -> bool {
        let value = self.slots[idx];
        let mask = 1u8 << plane;
        let new = if bit != 0 { value | mask } else { value & !mask };
        if new != value {
            self.slots[idx] = new;
            true
        } else {
            false
        }
    }
}

/// Keyed index walk over a substrate.
///
/// Owns the substrate for the duration of one embed or extract pass; the
/// used-index set is exclusive to this walker, so no synchronization is
/// ever needed.
pub struct IndexWalker<S: Substrate> {
    substrate: S,
    hash: Vec<u8>,
    /// Rotating position in the hash; survives escalation.
    cursor: usize,
    /// Running index accumulator.
    index: usize,
    used: Vec<bool>,
    used_count: usize,
    plane: u8,
}

impl<S: Substrate> IndexWalker<S> {
    /// Build a walker from a key hash, starting at the given bit-plane.
    ///
    /// The hash cursor starts at `hash[0] % hash.len()` and the index
    /// accumulator at the hash byte found there.
    pub fn new(hash: &[u8], substrate: S, start_plane: u8) -> Result<Self> {
        if hash.is_empty() {
            return Err(StegoError::Structural("empty key hash"));
        }
        if start_plane > 7 {
            return Err(StegoError::Structural("bit-plane out of range"));
        }
        let cursor = hash[0] as usize % hash.len();
        let index = hash[cursor] as usize;
        let used = vec![false; substrate.len()];
        Ok(Self {
            substrate,
            hash: hash.to_vec(),
            cursor,
            index,
            used,
            used_count: 0,
            plane: start_plane,
        })
    }

    fn plane_capacity(&self, plane: u8) -> usize {
        match self.substrate.plane_histogram() {
            Some(h) => h[plane as usize],
            None => self.substrate.len(),
        }
    }

    /// Bit capacity from the active plane: the current plane's usable count,
    /// or the cumulative count through plane 7 with auto-extend.
    pub fn capacity_bits(&self, auto_extend: bool) -> usize {
        if auto_extend {
            (self.plane..8).map(|p| self.plane_capacity(p)).sum()
        } else {
            self.plane_capacity(self.plane)
        }
    }

    /// Yield the next index, or `None` when the active plane's usable
    /// units are exhausted.
    pub fn advance(&mut self) -> Option<usize> {
        let n = self.substrate.len();
        if n == 0 || self.used_count >= self.plane_capacity(self.plane) {
            return None;
        }

        self.cursor = (self.cursor + 1) % self.hash.len();
        self.index += self.hash[self.cursor] as usize;

        // At least one usable unused index remains, so the probe terminates.
        loop {
            self.index %= n;
            if self.used[self.index] || !self.substrate.usable(self.index, self.plane) {
                self.index += 1;
                continue;
            }
            break;
        }

        self.used[self.index] = true;
        self.used_count += 1;
        Some(self.index)
    }

    /// Move to the next bit-plane, clearing the used set but keeping the
    /// hash cursor. Returns `false` at the top plane.
    pub fn escalate(&mut self) -> bool {
        if self.plane >= 7 {
            return false;
        }
        self.used.fill(false);
        self.used_count = 0;
        self.plane += 1;
        debug!("escalating to bit-plane {}", self.plane);
        true
    }

    pub fn plane(&self) -> u8 {
        self.plane
    }

    /// Read the substrate bit at the active plane.
    pub fn read_bit(&self, idx: usize) -> u8 {
        self.substrate.read_bit(idx, self.plane)
    }

    /// Write the substrate bit at the active plane. Returns whether the
    /// carrier value changed.
    pub fn write_bit(&mut self, idx: usize, bit: u8) -> bool {
        self.substrate.write_bit(idx, self.plane, bit)
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stego::crypto::HashAlgo;

    fn abc_hash() -> Vec<u8> {
        HashAlgo::Sha512.digest(b"abc")
    }

    #[test]
    fn deterministic_sequence_over_64_slots() {
        let hash = abc_hash();
        let mut first = [0u8; 64];
        let mut second = [0u8; 64];

        let mut a = IndexWalker::new(&hash, SlotSubstrate::new(&mut first), 0).unwrap();
        let mut b = IndexWalker::new(&hash, SlotSubstrate::new(&mut second), 0).unwrap();

        let seq_a: Vec<usize> = (0..10).map(|_| a.advance().unwrap()).collect();
        let seq_b: Vec<usize> = (0..10).map(|_| b.advance().unwrap()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn no_repeats_within_a_plane() {
        let hash = abc_hash();
        let mut slots = [0u8; 64];
        let mut walker = IndexWalker::new(&hash, SlotSubstrate::new(&mut slots), 0).unwrap();

        let mut seen = [false; 64];
        for _ in 0..64 {
            let idx = walker.advance().unwrap();
            assert!(!seen[idx], "index {idx} yielded twice");
            seen[idx] = true;
        }
        assert!(walker.advance().is_none());
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn different_keys_different_sequences() {
        let mut a_slots = [0u8; 64];
        let mut b_slots = [0u8; 64];
        let mut a = IndexWalker::new(
            &HashAlgo::Sha512.digest(b"abc"),
            SlotSubstrate::new(&mut a_slots),
            0,
        )
        .unwrap();
        let mut b = IndexWalker::new(
            &HashAlgo::Sha512.digest(b"abd"),
            SlotSubstrate::new(&mut b_slots),
            0,
        )
        .unwrap();

        let seq_a: Vec<usize> = (0..10).map(|_| a.advance().unwrap()).collect();
        let seq_b: Vec<usize> = (0..10).map(|_| b.advance().unwrap()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn coefficient_usability_gate() {
        // 0 and ±1 are unusable at plane 0; anything with magnitude bits
        // above the plane is usable. Negative values are always usable
        // (sign extension keeps high bits set).
        assert!(!coeff_usable(0, 0));
        assert!(!coeff_usable(1, 0));
        assert!(coeff_usable(-1, 0));
        assert!(coeff_usable(2, 0));
        assert!(coeff_usable(-2, 0));
        assert!(!coeff_usable(3, 1));
        assert!(coeff_usable(4, 1));
        assert!(coeff_usable(512, 7));
        assert!(!coeff_usable(255, 7));
    }

    #[test]
    fn yielded_coefficients_satisfy_the_gate() {
        let mut grid = DctGrid::new(2, 2);
        for i in 0..grid.len() {
            grid.set_flat(i, (i as i16 % 9) - 4);
        }
        let mut grids = vec![grid];
        let snapshot: Vec<i16> = grids[0].coeffs().to_vec();

        let hash = abc_hash();
        let mut walker =
            IndexWalker::new(&hash, CoeffSubstrate::new(&mut grids), 0).unwrap();
        while let Some(idx) = walker.advance() {
            assert!(
                coeff_usable(snapshot[idx], 0),
                "unusable coefficient {} yielded at {idx}",
                snapshot[idx]
            );
        }
    }

    #[test]
    fn histogram_counts_each_plane() {
        let mut grid = DctGrid::new(1, 1);
        grid.set_flat(0, 2); // usable at plane 0 only
        grid.set_flat(1, 5); // usable at planes 0-1
        grid.set_flat(2, -1); // usable everywhere
        let mut grids = vec![grid];
        let sub = CoeffSubstrate::new(&mut grids);
        let hist = sub.plane_histogram().unwrap();
        assert_eq!(hist[0], 3);
        assert_eq!(hist[1], 2);
        assert_eq!(hist[7], 1);
    }

    #[test]
    fn escalation_covers_cumulative_capacity() {
        let mut grid = DctGrid::new(1, 1);
        grid.set_flat(0, 2);
        grid.set_flat(1, 5);
        grid.set_flat(2, -1);
        let mut grids = vec![grid];

        let hash = abc_hash();
        let mut walker =
            IndexWalker::new(&hash, CoeffSubstrate::new(&mut grids), 0).unwrap();
        let expected = walker.capacity_bits(true);
        assert_eq!(
            expected,
            walker
                .substrate()
                .plane_histogram()
                .unwrap()
                .iter()
                .sum::<usize>()
        );

        let mut yielded = 0usize;
        loop {
            while walker.advance().is_some() {
                yielded += 1;
            }
            if !walker.escalate() {
                break;
            }
        }
        assert_eq!(yielded, expected);
    }

    #[test]
    fn all_zero_coefficients_exhaust_immediately() {
        let mut grids = vec![DctGrid::new(2, 2)];
        let hash = abc_hash();
        let mut walker =
            IndexWalker::new(&hash, CoeffSubstrate::new(&mut grids), 0).unwrap();
        assert_eq!(walker.capacity_bits(true), 0);
        for _ in 0..8 {
            assert!(walker.advance().is_none());
            walker.escalate();
        }
    }

    #[test]
    fn write_bit_reports_changes() {
        let mut slots = [0u8; 4];
        let mut walker =
            IndexWalker::new(&[7, 7, 7], SlotSubstrate::new(&mut slots), 0).unwrap();
        let idx = walker.advance().unwrap();
        assert_eq!(walker.read_bit(idx), 0);
        assert!(walker.write_bit(idx, 1));
        assert!(!walker.write_bit(idx, 1));
        assert_eq!(walker.read_bit(idx), 1);
        assert!(walker.write_bit(idx, 0));
    }

    #[test]
    fn bad_construction_rejected() {
        let mut slots = [0u8; 4];
        assert!(IndexWalker::new(&[], SlotSubstrate::new(&mut slots), 0).is_err());
        let mut slots = [0u8; 4];
        assert!(IndexWalker::new(&[1], SlotSubstrate::new(&mut slots), 8).is_err());
    }

    struct TestImage {
        pixels: Vec<u8>,
        width: usize,
        height: usize,
    }

    impl PixelBuffer for TestImage {
        fn width(&self) -> usize {
            self.width
        }
        fn height(&self) -> usize {
            self.height
        }
        fn channels(&self) -> usize {
            3
        }
        fn channel(&self, x: usize, y: usize, c: usize) -> u8 {
            self.pixels[(y * self.width + x) * 3 + c]
        }
        fn set_channel(&mut self, x: usize, y: usize, c: usize, value: u8) {
            self.pixels[(y * self.width + x) * 3 + c] = value;
        }
    }

    #[test]
    fn pixel_substrate_addresses_every_channel() {
        let mut img = TestImage {
            pixels: vec![0u8; 4 * 2 * 3],
            width: 4,
            height: 2,
        };
        let mut sub = PixelSubstrate::new(&mut img);
        assert_eq!(sub.len(), 24);
        for idx in 0..24 {
            assert!(sub.usable(idx, 3));
            assert!(sub.write_bit(idx, 0, 1));
        }
        assert!(img.pixels.iter().all(|&p| p == 1));
    }
}
