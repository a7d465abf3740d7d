// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! JPEG frame header (SOF) parsing.
//!
//! Extracts image dimensions, component declarations, and sampling factors
//! from SOF0/SOF1/SOF2 marker segments. Grid dimensions are rounded up to
//! whole 8-pixel blocks and whole MCUs.

use super::error::{JpegError, Result};

/// One image component declared in SOF.
#[derive(Debug, Clone)]
pub struct Component {
    /// Component ID (typically 1=Y, 2=Cb, 3=Cr).
    pub id: u8,
    /// Horizontal sampling factor (1–4).
    pub h_sampling: u8,
    /// Vertical sampling factor (1–4).
    pub v_sampling: u8,
    /// Quantization table ID (0–3).
    pub quant_table_id: u8,
}

/// Frame information parsed from a SOF marker.
///
/// Built once per decode; component order is the SOF declaration order and
/// is preserved everywhere downstream.
#[derive(Debug, Clone)]
pub struct FrameInfo {
    /// Sample precision in bits (must be 8).
    pub precision: u8,
    /// Image height in pixels.
    pub height: u16,
    /// Image width in pixels.
    pub width: u16,
    /// Components in declaration order.
    pub components: Vec<Component>,
    /// Maximum horizontal sampling factor across all components.
    pub max_h_sampling: u8,
    /// Maximum vertical sampling factor across all components.
    pub max_v_sampling: u8,
    /// Number of MCUs horizontally.
    pub mcus_wide: u16,
    /// Number of MCUs vertically.
    pub mcus_tall: u16,
    /// True for progressive (SOF2) frames.
    pub is_progressive: bool,
}

impl FrameInfo {
    /// Number of 8×8 blocks wide for a component (MCU-aligned).
    pub fn blocks_wide(&self, comp_idx: usize) -> usize {
        (self.mcus_wide as usize) * (self.components[comp_idx].h_sampling as usize)
    }

    /// Number of 8×8 blocks tall for a component (MCU-aligned).
    pub fn blocks_tall(&self, comp_idx: usize) -> usize {
        (self.mcus_tall as usize) * (self.components[comp_idx].v_sampling as usize)
    }

    /// Index of the component with the given SOS component ID.
    pub fn component_index(&self, id: u8) -> Result<usize> {
        self.components
            .iter()
            .position(|c| c.id == id)
            .ok_or(JpegError::UnknownComponentId(id))
    }
}

/// Parse a SOF0/SOF1/SOF2 marker segment body (after the 2-byte length).
/// `progressive` is true when the marker was SOF2.
pub fn parse_sof(data: &[u8], progressive: bool) -> Result<FrameInfo> {
    if data.len() < 6 {
        return Err(JpegError::Truncated);
    }

    let precision = data[0];
    if precision != 8 {
        return Err(JpegError::UnsupportedPrecision(precision));
    }

    let height = u16::from_be_bytes([data[1], data[2]]);
    let width = u16::from_be_bytes([data[3], data[4]]);
    let num_components = data[5] as usize;

    if width == 0 || height == 0 {
        return Err(JpegError::Structural("zero image dimension"));
    }
    if data.len() < 6 + num_components * 3 {
        return Err(JpegError::Truncated);
    }

    let mut components = Vec::with_capacity(num_components);
    let mut max_h = 0u8;
    let mut max_v = 0u8;

    for i in 0..num_components {
        let offset = 6 + i * 3;
        let id = data[offset];
        let sampling = data[offset + 1];
        let h_sampling = sampling >> 4;
        let v_sampling = sampling & 0x0F;
        let quant_table_id = data[offset + 2];

        if h_sampling == 0 || v_sampling == 0 || h_sampling > 4 || v_sampling > 4 {
            return Err(JpegError::Structural("invalid sampling factors"));
        }
        if quant_table_id > 3 {
            return Err(JpegError::Structural("quantization table id out of range"));
        }

        max_h = max_h.max(h_sampling);
        max_v = max_v.max(v_sampling);

        components.push(Component {
            id,
            h_sampling,
            v_sampling,
            quant_table_id,
        });
    }

    let mcu_width = (max_h as u16) * 8;
    let mcu_height = (max_v as u16) * 8;

    Ok(FrameInfo {
        precision,
        height,
        width,
        components,
        max_h_sampling: max_h,
        max_v_sampling: max_v,
        mcus_wide: width.div_ceil(mcu_width),
        mcus_tall: height.div_ceil(mcu_height),
        is_progressive: progressive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ycbcr_420() {
        // precision=8, 640x480, Y 2x2 / Cb 1x1 / Cr 1x1
        let data = [
            8, 1, 0xE0, 2, 0x80, 3,
            1, 0x22, 0,
            2, 0x11, 1,
            3, 0x11, 1,
        ];

        let fi = parse_sof(&data, false).unwrap();
        assert_eq!(fi.height, 480);
        assert_eq!(fi.width, 640);
        assert_eq!(fi.components.len(), 3);
        assert_eq!(fi.max_h_sampling, 2);
        assert_eq!(fi.max_v_sampling, 2);
        assert_eq!(fi.mcus_wide, 40);
        assert_eq!(fi.mcus_tall, 30);

        assert_eq!(fi.blocks_wide(0), 80);
        assert_eq!(fi.blocks_tall(0), 60);
        assert_eq!(fi.blocks_wide(1), 40);
        assert_eq!(fi.blocks_tall(1), 30);

        assert_eq!(fi.component_index(2).unwrap(), 1);
        assert!(fi.component_index(9).is_err());
    }

    #[test]
    fn parse_grayscale() {
        let data = [8, 0, 64, 0, 64, 1, 1, 0x11, 0];
        let fi = parse_sof(&data, false).unwrap();
        assert_eq!(fi.components.len(), 1);
        assert_eq!(fi.mcus_wide, 8);
        assert_eq!(fi.mcus_tall, 8);
    }

    #[test]
    fn non_aligned_rounds_up() {
        // 10x10 with 1x1 sampling: 2x2 MCUs
        let data = [8, 0, 10, 0, 10, 1, 1, 0x11, 0];
        let fi = parse_sof(&data, false).unwrap();
        assert_eq!(fi.mcus_wide, 2);
        assert_eq!(fi.mcus_tall, 2);
    }

    #[test]
    fn reject_12bit() {
        let data = [12, 0, 8, 0, 8, 1, 1, 0x11, 0];
        assert!(matches!(
            parse_sof(&data, false),
            Err(JpegError::UnsupportedPrecision(12))
        ));
    }
}
