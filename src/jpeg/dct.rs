// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Quantized DCT coefficient storage.
//!
//! [`DctGrid`] holds the coefficients of one image component in block-raster
//! order; [`QuantTable`] round-trips the 64-entry quantization matrices
//! (captured from DQT, never applied — embedding works on the already
//! quantized values).

/// Quantization table: 64 values in natural (row-major) order.
#[derive(Debug, Clone)]
pub struct QuantTable {
    /// Quantization values, indexed by row * 8 + col.
    pub values: [u16; 64],
}

impl QuantTable {
    pub fn new(values: [u16; 64]) -> Self {
        Self { values }
    }
}

/// Grid of quantized DCT coefficients for one image component.
///
/// Storage is flat: `blocks_tall * blocks_wide * 64` values in block-raster
/// order, each 64-element chunk one 8×8 block in natural (row-major) order.
/// Index 0 of a block is the DC term, 1–63 the de-zigzagged AC terms.
#[derive(Debug, Clone)]
pub struct DctGrid {
    blocks_wide: usize,
    blocks_tall: usize,
    coeffs: Vec<i16>,
}

impl DctGrid {
    /// Create a new grid initialized to zero.
    pub fn new(blocks_wide: usize, blocks_tall: usize) -> Self {
        Self {
            blocks_wide,
            blocks_tall,
            coeffs: vec![0i16; blocks_wide * blocks_tall * 64],
        }
    }

    pub fn blocks_wide(&self) -> usize {
        self.blocks_wide
    }

    pub fn blocks_tall(&self) -> usize {
        self.blocks_tall
    }

    /// Total number of 8×8 blocks.
    pub fn total_blocks(&self) -> usize {
        self.blocks_wide * self.blocks_tall
    }

    /// Total number of coefficients (blocks × 64).
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Get a coefficient value.
    /// - `br`, `bc`: block row and column (0-based)
    /// - `i`, `j`: frequency row and column within the block (0–7)
    pub fn get(&self, br: usize, bc: usize, i: usize, j: usize) -> i16 {
        self.coeffs[self.index(br, bc, i, j)]
    }

    /// Set a coefficient value.
    pub fn set(&mut self, br: usize, bc: usize, i: usize, j: usize, val: i16) {
        let idx = self.index(br, bc, i, j);
        self.coeffs[idx] = val;
    }

    /// Coefficient at a flat index (block-raster order). Used by the index
    /// walker, whose domain is the flat coefficient sequence.
    pub fn get_flat(&self, idx: usize) -> i16 {
        self.coeffs[idx]
    }

    /// Set a coefficient at a flat index.
    pub fn set_flat(&mut self, idx: usize, val: i16) {
        self.coeffs[idx] = val;
    }

    /// Read-only view of the 64-coefficient block at (br, bc).
    pub fn block(&self, br: usize, bc: usize) -> &[i16] {
        let start = (br * self.blocks_wide + bc) * 64;
        &self.coeffs[start..start + 64]
    }

    /// Mutable view of the 64-coefficient block at (br, bc).
    pub fn block_mut(&mut self, br: usize, bc: usize) -> &mut [i16] {
        let start = (br * self.blocks_wide + bc) * 64;
        &mut self.coeffs[start..start + 64]
    }

    /// Raw read-only access to all coefficients.
    pub fn coeffs(&self) -> &[i16] {
        &self.coeffs
    }

    fn index(&self, br: usize, bc: usize, i: usize, j: usize) -> usize {
        debug_assert!(br < self.blocks_tall, "block row {br} >= {}", self.blocks_tall);
        debug_assert!(bc < self.blocks_wide, "block col {bc} >= {}", self.blocks_wide);
        debug_assert!(i < 8 && j < 8);
        (br * self.blocks_wide + bc) * 64 + i * 8 + j
    }
}
