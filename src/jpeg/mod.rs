// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! JPEG coefficient codec.
//!
//! Reads baseline and progressive JPEG files into quantized DCT coefficient
//! grids and writes them back out, without ever touching the pixel domain.
//! Embedding mutates coefficients in place between the two steps.
//!
//! Supports:
//! - Baseline and extended sequential DCT (SOF0/SOF1), 8-bit precision
//! - Progressive DCT (SOF2), single scan
//! - Grayscale, YCbCr, and arbitrary component counts and subsampling
//! - Restart markers on decode (never written)
//!
//! Output is always a single baseline interleaved scan using the fixed
//! ITU-T T.81 Annex K Huffman tables, so mutated coefficients can never
//! fall outside the code table. APPn and COM segments pass through
//! verbatim; DQT is regenerated from the parsed tables; DRI is dropped.
//!
//! Not supported (rejected at parse time): lossless, hierarchical, and
//! arithmetic-coded frames, 12-bit precision, multiple frames, and any
//! stream with more than one scan.

pub mod bitio;
pub mod dct;
pub mod error;
pub mod frame;
pub mod huffman;
pub mod marker;
pub mod scan;
pub mod tables;
pub mod zigzag;

use log::debug;

use dct::{DctGrid, QuantTable};
use error::{JpegError, Result};
use frame::FrameInfo;
use marker::{parse_dri, parse_markers, parse_sos, parse_sos_params};
use scan::ScanComponent;
use tables::{parse_dht, parse_dqt, standard_ac_spec, standard_dc_spec, HuffmanSpec};

/// A decoded JPEG image exposing its quantized DCT coefficients.
///
/// Parse with [`JpegImage::from_bytes`], mutate grids through
/// [`JpegImage::grids_mut`], and serialize with [`JpegImage::to_bytes`].
#[derive(Clone)]
pub struct JpegImage {
    frame: FrameInfo,
    /// One grid per frame component, in declaration order.
    grids: Vec<DctGrid>,
    quant_tables: [Option<QuantTable>; 4],
    /// APPn/COM segments in original order, carried through a rewrite.
    passthrough: Vec<(u8, Vec<u8>)>,
}

impl JpegImage {
    /// Parse a JPEG file.
    ///
    /// Walks the marker stream once, tracking Huffman and quantization
    /// table redefinitions in stream order, and decodes the scan. Exactly
    /// one scan is accepted; a second SOS is rejected even in a
    /// progressive stream.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (entries, scan_starts) = parse_markers(data)?;

        let mut frame_info: Option<FrameInfo> = None;
        let mut grids: Vec<DctGrid> = Vec::new();
        let mut quant_tables: [Option<QuantTable>; 4] = [None, None, None, None];
        let mut dc_specs: [Option<HuffmanSpec>; 4] = [None, None, None, None];
        let mut ac_specs: [Option<HuffmanSpec>; 4] = [None, None, None, None];
        let mut passthrough = Vec::new();
        let mut restart_interval = 0u16;
        let mut scans_decoded = 0usize;

        for entry in &entries {
            match entry.marker {
                marker::SOI | marker::EOI => {}
                marker::DQT => {
                    for (id, qt) in parse_dqt(&entry.data)? {
                        quant_tables[id as usize] = Some(qt);
                    }
                }
                marker::DHT => {
                    for spec in parse_dht(&entry.data)? {
                        let id = spec.id as usize;
                        if id > 3 {
                            return Err(JpegError::Structural(
                                "Huffman table id out of range",
                            ));
                        }
                        if spec.class == 0 {
                            dc_specs[id] = Some(spec);
                        } else {
                            ac_specs[id] = Some(spec);
                        }
                    }
                }
                marker::DRI => restart_interval = parse_dri(&entry.data)?,
                marker::SOF0 | marker::SOF1 | marker::SOF2 => {
                    if frame_info.is_some() {
                        return Err(JpegError::Unsupported("multiple frames"));
                    }
                    let fi = frame::parse_sof(&entry.data, entry.marker == marker::SOF2)?;
                    for comp_idx in 0..fi.components.len() {
                        grids.push(DctGrid::new(
                            fi.blocks_wide(comp_idx),
                            fi.blocks_tall(comp_idx),
                        ));
                    }
                    frame_info = Some(fi);
                }
                marker::SOS => {
                    let fi = frame_info
                        .as_ref()
                        .ok_or(JpegError::Structural("SOS before SOF"))?;

                    let mut scan_components = Vec::new();
                    for (comp_id, dc_id, ac_id) in parse_sos(&entry.data)? {
                        scan_components.push(ScanComponent {
                            comp_idx: fi.component_index(comp_id)?,
                            dc_table: dc_id as usize,
                            ac_table: ac_id as usize,
                        });
                    }

                    if scans_decoded > 0 {
                        return Err(JpegError::Unsupported("multiple scans"));
                    }

                    let scan_start = scan_starts[scans_decoded];
                    if fi.is_progressive {
                        let params = parse_sos_params(&entry.data)?;
                        scan::decode_progressive_scan(
                            data,
                            scan_start,
                            fi,
                            &scan_components,
                            &dc_specs,
                            &ac_specs,
                            restart_interval,
                            &params,
                            &mut grids,
                        )?;
                    } else {
                        scan::decode_scan(
                            data,
                            scan_start,
                            fi,
                            &scan_components,
                            &dc_specs,
                            &ac_specs,
                            restart_interval,
                            &mut grids,
                        )?;
                    }
                    scans_decoded += 1;
                }
                m if entry.is_passthrough() => {
                    passthrough.push((m, entry.data.clone()));
                }
                _ => {}
            }
        }

        let frame = frame_info.ok_or(JpegError::Structural("no frame header"))?;
        if scans_decoded == 0 {
            return Err(JpegError::Structural("no scan data"));
        }

        debug!(
            "decoded jpeg: {}x{}, {} component(s), {} scan(s), progressive={}",
            frame.width,
            frame.height,
            frame.components.len(),
            scans_decoded,
            frame.is_progressive
        );

        Ok(Self {
            frame,
            grids,
            quant_tables,
            passthrough,
        })
    }

    /// Serialize as a baseline JPEG.
    ///
    /// Always writes SOF0 with a single interleaved scan over all
    /// components, using the standard Annex K Huffman tables: component 0
    /// takes the luminance tables, all others the chrominance tables.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let ncomp = self.frame.components.len();

        let dc_specs: [Option<HuffmanSpec>; 4] = [
            Some(standard_dc_spec(false)),
            Some(standard_dc_spec(true)),
            None,
            None,
        ];
        let ac_specs: [Option<HuffmanSpec>; 4] = [
            Some(standard_ac_spec(false)),
            Some(standard_ac_spec(true)),
            None,
            None,
        ];

        let scan_components: Vec<ScanComponent> = (0..ncomp)
            .map(|comp_idx| {
                let table = usize::from(comp_idx != 0);
                ScanComponent {
                    comp_idx,
                    dc_table: table,
                    ac_table: table,
                }
            })
            .collect();

        let mut out = vec![0xFF, marker::SOI];

        for (m, data) in &self.passthrough {
            push_segment(&mut out, *m, data);
        }

        for id in 0..4u8 {
            if let Some(qt) = &self.quant_tables[id as usize] {
                out.extend_from_slice(&tables::write_dqt(id, qt));
            }
        }

        let mut sof = vec![
            self.frame.precision,
            (self.frame.height >> 8) as u8,
            self.frame.height as u8,
            (self.frame.width >> 8) as u8,
            self.frame.width as u8,
            ncomp as u8,
        ];
        for comp in &self.frame.components {
            sof.push(comp.id);
            sof.push((comp.h_sampling << 4) | comp.v_sampling);
            sof.push(comp.quant_table_id);
        }
        push_segment(&mut out, marker::SOF0, &sof);

        let mut dht_specs: Vec<&HuffmanSpec> = Vec::with_capacity(4);
        for specs in [&dc_specs, &ac_specs] {
            for id in 0..if ncomp > 1 { 2 } else { 1 } {
                if let Some(spec) = &specs[id] {
                    dht_specs.push(spec);
                }
            }
        }
        out.extend_from_slice(&tables::write_dht(&dht_specs));

        let mut sos = vec![ncomp as u8];
        for (comp, sc) in self.frame.components.iter().zip(&scan_components) {
            sos.push(comp.id);
            sos.push(((sc.dc_table as u8) << 4) | sc.ac_table as u8);
        }
        sos.extend_from_slice(&[0, 63, 0]);
        push_segment(&mut out, marker::SOS, &sos);

        let scan_bytes = scan::encode_scan(
            &self.frame,
            &scan_components,
            &self.grids,
            &dc_specs,
            &ac_specs,
        )?;
        debug!("encoded jpeg scan: {} bytes", scan_bytes.len());
        out.extend_from_slice(&scan_bytes);

        out.push(0xFF);
        out.push(marker::EOI);
        Ok(out)
    }

    pub fn frame_info(&self) -> &FrameInfo {
        &self.frame
    }

    /// Coefficient grids, one per component in declaration order.
    pub fn grids(&self) -> &[DctGrid] {
        &self.grids
    }

    pub fn grids_mut(&mut self) -> &mut [DctGrid] {
        &mut self.grids
    }

    pub fn quant_table(&self, id: usize) -> Option<&QuantTable> {
        self.quant_tables[id].as_ref()
    }

    pub fn num_components(&self) -> usize {
        self.grids.len()
    }
}

fn push_segment(out: &mut Vec<u8>, m: u8, data: &[u8]) {
    let length = (data.len() + 2) as u16;
    out.push(0xFF);
    out.push(m);
    out.push((length >> 8) as u8);
    out.push(length as u8);
    out.extend_from_slice(data);
}
