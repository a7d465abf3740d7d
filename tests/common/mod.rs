// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic JPEG fixtures assembled straight from the codec building
//! blocks, so integration tests need no binary assets.

// Each test binary uses a subset of these helpers.
#![allow(dead_code)]

use hushcore::jpeg::dct::{DctGrid, QuantTable};
use hushcore::jpeg::frame::{self, FrameInfo};
use hushcore::jpeg::marker;
use hushcore::jpeg::scan::{self, ScanComponent};
use hushcore::jpeg::tables::{self, standard_ac_spec, standard_dc_spec, HuffmanSpec};

pub fn segment(m: u8, data: &[u8]) -> Vec<u8> {
    let length = (data.len() + 2) as u16;
    let mut out = vec![0xFF, m, (length >> 8) as u8, length as u8];
    out.extend_from_slice(data);
    out
}

fn flat_quant() -> QuantTable {
    QuantTable::new([16u16; 64])
}

/// One-component baseline file, `blocks_wide` x `blocks_tall` 8x8 blocks,
/// coefficients taken from `fill` over the flat grid index.
pub fn gray_jpeg(blocks_wide: usize, blocks_tall: usize, fill: impl Fn(usize) -> i16) -> Vec<u8> {
    let width = (blocks_wide * 8) as u16;
    let height = (blocks_tall * 8) as u16;
    let sof = [
        8,
        (height >> 8) as u8,
        height as u8,
        (width >> 8) as u8,
        width as u8,
        1,
        1,
        0x11,
        0,
    ];
    let frame = frame::parse_sof(&sof, false).unwrap();

    let mut grid = DctGrid::new(blocks_wide, blocks_tall);
    for i in 0..grid.len() {
        grid.set_flat(i, fill(i));
    }

    let comps = [ScanComponent {
        comp_idx: 0,
        dc_table: 0,
        ac_table: 0,
    }];
    let dc_specs: [Option<HuffmanSpec>; 4] = [Some(standard_dc_spec(false)), None, None, None];
    let ac_specs: [Option<HuffmanSpec>; 4] = [Some(standard_ac_spec(false)), None, None, None];
    let scan_bytes = scan::encode_scan(&frame, &comps, &[grid], &dc_specs, &ac_specs).unwrap();

    assemble(&sof, &frame, &[0], &scan_bytes, &[(1, 0x00)])
}

/// Three-component 16x16 baseline file with 4:2:0 subsampling. `luma` fills
/// the 2x2-block luminance grid, `chroma` the two single-block grids.
pub fn ycbcr420_jpeg(luma: impl Fn(usize) -> i16, chroma: impl Fn(usize) -> i16) -> Vec<u8> {
    let sof = [
        8, 0, 16, 0, 16, 3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1,
    ];
    let frame = frame::parse_sof(&sof, false).unwrap();

    let mut y = DctGrid::new(2, 2);
    for i in 0..y.len() {
        y.set_flat(i, luma(i));
    }
    let mut cb = DctGrid::new(1, 1);
    let mut cr = DctGrid::new(1, 1);
    for i in 0..64 {
        cb.set_flat(i, chroma(i));
        cr.set_flat(i, chroma(i + 64));
    }
    let grids = [y, cb, cr];

    let comps = [
        ScanComponent {
            comp_idx: 0,
            dc_table: 0,
            ac_table: 0,
        },
        ScanComponent {
            comp_idx: 1,
            dc_table: 1,
            ac_table: 1,
        },
        ScanComponent {
            comp_idx: 2,
            dc_table: 1,
            ac_table: 1,
        },
    ];
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
    let scan_bytes = scan::encode_scan(&frame, &comps, &grids, &dc_specs, &ac_specs).unwrap();

    assemble(
        &sof,
        &frame,
        &[0, 1],
        &scan_bytes,
        &[(1, 0x00), (2, 0x11), (3, 0x11)],
    )
}

fn assemble(
    sof: &[u8],
    frame: &FrameInfo,
    quant_ids: &[u8],
    scan_bytes: &[u8],
    sos_components: &[(u8, u8)],
) -> Vec<u8> {
    let chroma_tables = frame.components.len() > 1;

    let mut out = vec![0xFF, marker::SOI];
    out.extend_from_slice(&segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0"));
    for &id in quant_ids {
        out.extend_from_slice(&tables::write_dqt(id, &flat_quant()));
    }
    out.extend_from_slice(&segment(marker::SOF0, sof));

    let dc0 = standard_dc_spec(false);
    let ac0 = standard_ac_spec(false);
    let dc1 = standard_dc_spec(true);
    let ac1 = standard_ac_spec(true);
    let mut specs: Vec<&HuffmanSpec> = vec![&dc0, &ac0];
    if chroma_tables {
        specs.push(&dc1);
        specs.push(&ac1);
    }
    out.extend_from_slice(&tables::write_dht(&specs));

    let mut sos = vec![sos_components.len() as u8];
    for &(id, tbl) in sos_components {
        sos.push(id);
        sos.push(tbl);
    }
    sos.extend_from_slice(&[0, 63, 0]);
    out.extend_from_slice(&segment(marker::SOS, &sos));
    out.extend_from_slice(scan_bytes);
    out.push(0xFF);
    out.push(marker::EOI);
    out
}
