// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! JPEG scan data decoding and encoding.
//!
//! Decodes entropy-coded scan data into [`DctGrid`]s, including all four
//! progressive scan procedures, and re-encodes modified grids as a single
//! baseline interleaved scan. Decode accepts restart markers; encode never
//! emits them.

use super::bitio::{BitReader, BitWriter};
use super::dct::DctGrid;
use super::error::{JpegError, Result};
use super::frame::FrameInfo;
use super::huffman::{extend_sign, magnitude_category, HuffmanEncodeTable, HuffmanTrie};
use super::marker::SosParams;
use super::tables::HuffmanSpec;
use super::zigzag::{NATURAL_TO_ZIGZAG, ZIGZAG_TO_NATURAL};

/// One scan component from an SOS header, resolved against the frame.
#[derive(Clone)]
pub struct ScanComponent {
    /// Index into `FrameInfo::components`.
    pub comp_idx: usize,
    /// DC Huffman table ID.
    pub dc_table: usize,
    /// AC Huffman table ID.
    pub ac_table: usize,
}

fn build_trie(specs: &[Option<HuffmanSpec>; 4], id: usize) -> Result<HuffmanTrie> {
    let spec = specs[id]
        .as_ref()
        .ok_or(JpegError::MissingHuffmanTable(id as u8))?;
    HuffmanTrie::build(&spec.bits, &spec.huffval)
}

/// Decode a baseline interleaved scan into `grids` (indexed by frame
/// component). Returns the byte offset just past the entropy-coded data.
#[allow(clippy::too_many_arguments)]
pub fn decode_scan(
    data: &[u8],
    scan_start: usize,
    frame: &FrameInfo,
    scan_components: &[ScanComponent],
    dc_specs: &[Option<HuffmanSpec>; 4],
    ac_specs: &[Option<HuffmanSpec>; 4],
    restart_interval: u16,
    grids: &mut [DctGrid],
) -> Result<usize> {
    let mut dc_tries: [Option<HuffmanTrie>; 4] = [None, None, None, None];
    let mut ac_tries: [Option<HuffmanTrie>; 4] = [None, None, None, None];
    for sc in scan_components {
        if dc_tries[sc.dc_table].is_none() {
            dc_tries[sc.dc_table] = Some(build_trie(dc_specs, sc.dc_table)?);
        }
        if ac_tries[sc.ac_table].is_none() {
            ac_tries[sc.ac_table] = Some(build_trie(ac_specs, sc.ac_table)?);
        }
    }

    let mut reader = BitReader::new(data, scan_start);
    let mut dc_pred = vec![0i32; scan_components.len()];
    let mut mcu_count = 0usize;

    for mcu_row in 0..frame.mcus_tall as usize {
        for mcu_col in 0..frame.mcus_wide as usize {
            if restart_interval > 0
                && mcu_count > 0
                && mcu_count % (restart_interval as usize) == 0
            {
                // Any RST is accepted without sequence validation, like
                // libjpeg does.
                reader.check_restart_marker()?;
                for pred in &mut dc_pred {
                    *pred = 0;
                }
            }

            for (sci, sc) in scan_components.iter().enumerate() {
                let comp = &frame.components[sc.comp_idx];
                let dc_trie = dc_tries[sc.dc_table].as_ref().ok_or(JpegError::BadCode)?;
                let ac_trie = ac_tries[sc.ac_table].as_ref().ok_or(JpegError::BadCode)?;

                for v in 0..comp.v_sampling as usize {
                    for h in 0..comp.h_sampling as usize {
                        let block_row = mcu_row * (comp.v_sampling as usize) + v;
                        let block_col = mcu_col * (comp.h_sampling as usize) + h;

                        let mut zz = [0i16; 64];

                        let dc_size = dc_trie.decode(&mut reader)?;
                        if dc_size > 0 {
                            let dc_bits = reader.read_bits(dc_size)?;
                            dc_pred[sci] += extend_sign(dc_bits, dc_size) as i32;
                        }
                        zz[0] = dc_pred[sci].clamp(i16::MIN as i32, i16::MAX as i32) as i16;

                        let mut k = 1;
                        while k < 64 {
                            let rs = ac_trie.decode(&mut reader)?;
                            let run = (rs >> 4) as usize;
                            let size = rs & 0x0F;

                            if size == 0 {
                                if run == 15 {
                                    k += 16;
                                    continue;
                                }
                                // EOB
                                break;
                            }

                            k += run;
                            if k >= 64 {
                                return Err(JpegError::Structural(
                                    "AC run past end of block",
                                ));
                            }
                            let ac_bits = reader.read_bits(size)?;
                            zz[k] = extend_sign(ac_bits, size);
                            k += 1;
                        }

                        let block = grids[sc.comp_idx].block_mut(block_row, block_col);
                        for zi in 0..64 {
                            block[ZIGZAG_TO_NATURAL[zi]] = zz[zi];
                        }
                    }
                }
            }

            mcu_count += 1;
        }
    }

    Ok(reader.position())
}

/// Encode `grids` as one baseline interleaved scan.
///
/// Returns the raw entropy-coded bytes (without the SOS header). Restart
/// markers are never written; the rewritten stream carries no DRI.
pub fn encode_scan(
    frame: &FrameInfo,
    scan_components: &[ScanComponent],
    grids: &[DctGrid],
    dc_specs: &[Option<HuffmanSpec>; 4],
    ac_specs: &[Option<HuffmanSpec>; 4],
) -> Result<Vec<u8>> {
    let mut dc_tables: [Option<HuffmanEncodeTable>; 4] = [None, None, None, None];
    let mut ac_tables: [Option<HuffmanEncodeTable>; 4] = [None, None, None, None];
    for sc in scan_components {
        if dc_tables[sc.dc_table].is_none() {
            let spec = dc_specs[sc.dc_table]
                .as_ref()
                .ok_or(JpegError::MissingHuffmanTable(sc.dc_table as u8))?;
            dc_tables[sc.dc_table] = Some(HuffmanEncodeTable::build(&spec.bits, &spec.huffval));
        }
        if ac_tables[sc.ac_table].is_none() {
            let spec = ac_specs[sc.ac_table]
                .as_ref()
                .ok_or(JpegError::MissingHuffmanTable(sc.ac_table as u8))?;
            ac_tables[sc.ac_table] = Some(HuffmanEncodeTable::build(&spec.bits, &spec.huffval));
        }
    }

    let mut writer = BitWriter::new();
    let mut dc_pred = vec![0i32; scan_components.len()];

    for mcu_row in 0..frame.mcus_tall as usize {
        for mcu_col in 0..frame.mcus_wide as usize {
            for (sci, sc) in scan_components.iter().enumerate() {
                let comp = &frame.components[sc.comp_idx];
                let dc_tab = dc_tables[sc.dc_table].as_ref().ok_or(JpegError::BadCode)?;
                let ac_tab = ac_tables[sc.ac_table].as_ref().ok_or(JpegError::BadCode)?;

                for v in 0..comp.v_sampling as usize {
                    for h in 0..comp.h_sampling as usize {
                        let block_row = mcu_row * (comp.v_sampling as usize) + v;
                        let block_col = mcu_col * (comp.h_sampling as usize) + h;

                        let block = grids[sc.comp_idx].block(block_row, block_col);
                        let mut zz = [0i16; 64];
                        for ni in 0..64 {
                            zz[NATURAL_TO_ZIGZAG[ni]] = block[ni];
                        }

                        let dc_diff = (zz[0] as i32 - dc_pred[sci]) as i16;
                        dc_pred[sci] = zz[0] as i32;
                        let (dc_bits, dc_size) = magnitude_category(dc_diff);
                        let (dc_code, dc_code_len) = dc_tab.encode(dc_size)?;
                        writer.write_bits(dc_code, dc_code_len);
                        if dc_size > 0 {
                            writer.write_bits(dc_bits, dc_size);
                        }

                        let mut k = 1;
                        while k < 64 {
                            let mut run = 0usize;
                            while k + run < 64 && zz[k + run] == 0 {
                                run += 1;
                            }
                            if k + run >= 64 {
                                let (eob_code, eob_len) = ac_tab.encode(0x00)?;
                                writer.write_bits(eob_code, eob_len);
                                break;
                            }
                            while run >= 16 {
                                let (zrl_code, zrl_len) = ac_tab.encode(0xF0)?;
                                writer.write_bits(zrl_code, zrl_len);
                                run -= 16;
                                k += 16;
                            }
                            k += run;
                            let (ac_bits, ac_size) = magnitude_category(zz[k]);
                            let (ac_code, ac_code_len) =
                                ac_tab.encode(((run as u8) << 4) | ac_size)?;
                            writer.write_bits(ac_code, ac_code_len);
                            writer.write_bits(ac_bits, ac_size);
                            k += 1;
                        }
                    }
                }
            }
        }
    }

    Ok(writer.finish())
}

/// Decode one progressive scan into `grids` (indexed by frame component),
/// accumulating on top of whatever earlier scans contributed.
///
/// The SOS parameters select one of four procedures:
/// - ss=0, ah=0: DC first (values shifted left by al)
/// - ss=0, ah>0: DC refinement (one bit per block)
/// - ss>0, ah=0: AC first for the band [ss..=se]
/// - ss>0, ah>0: AC refinement for the band
///
/// Returns the byte offset just past the entropy-coded data.
#[allow(clippy::too_many_arguments)]
pub fn decode_progressive_scan(
    data: &[u8],
    scan_start: usize,
    frame: &FrameInfo,
    scan_components: &[ScanComponent],
    dc_specs: &[Option<HuffmanSpec>; 4],
    ac_specs: &[Option<HuffmanSpec>; 4],
    restart_interval: u16,
    params: &SosParams,
    grids: &mut [DctGrid],
) -> Result<usize> {
    let ss = params.ss as usize;
    let se = params.se as usize;
    let ah = params.ah;
    let al = params.al;

    if ss > 63 || se > 63 || ss > se {
        return Err(JpegError::Structural("spectral selection out of range"));
    }
    if ss > 0 && scan_components.len() != 1 {
        return Err(JpegError::Structural("interleaved AC scan"));
    }

    let mut dc_tries: [Option<HuffmanTrie>; 4] = [None, None, None, None];
    let mut ac_tries: [Option<HuffmanTrie>; 4] = [None, None, None, None];
    for sc in scan_components {
        if ss == 0 && ah == 0 && dc_tries[sc.dc_table].is_none() {
            dc_tries[sc.dc_table] = Some(build_trie(dc_specs, sc.dc_table)?);
        }
        if ss > 0 && ac_tries[sc.ac_table].is_none() {
            ac_tries[sc.ac_table] = Some(build_trie(ac_specs, sc.ac_table)?);
        }
    }

    let mut reader = BitReader::new(data, scan_start);
    let mut dc_pred = vec![0i32; scan_components.len()];
    let mut eob_run: u32 = 0;

    if ss > 0 {
        // AC scans are single-component, blocks in raster order; the restart
        // interval counts blocks here.
        let sc = &scan_components[0];
        let ac_trie = ac_tries[sc.ac_table].as_ref().ok_or(JpegError::BadCode)?;
        let grid = &mut grids[sc.comp_idx];
        let (bw, bt) = (grid.blocks_wide(), grid.blocks_tall());
        let mut block_count = 0usize;

        for block_row in 0..bt {
            for block_col in 0..bw {
                if restart_interval > 0
                    && block_count > 0
                    && block_count % (restart_interval as usize) == 0
                {
                    reader.check_restart_marker()?;
                    eob_run = 0;
                }

                let block = grid.block_mut(block_row, block_col);
                if ah == 0 {
                    decode_ac_first(&mut reader, ac_trie, al, ss, se, &mut eob_run, block)?;
                } else {
                    decode_ac_refine(&mut reader, ac_trie, al, ss, se, &mut eob_run, block)?;
                }
                block_count += 1;
            }
        }
    } else {
        // DC scans cover all scan components, MCU-interleaved.
        let mut mcu_count = 0usize;

        for mcu_row in 0..frame.mcus_tall as usize {
            for mcu_col in 0..frame.mcus_wide as usize {
                if restart_interval > 0
                    && mcu_count > 0
                    && mcu_count % (restart_interval as usize) == 0
                {
                    reader.check_restart_marker()?;
                    for pred in &mut dc_pred {
                        *pred = 0;
                    }
                }

                for (sci, sc) in scan_components.iter().enumerate() {
                    let comp = &frame.components[sc.comp_idx];
                    for v in 0..comp.v_sampling as usize {
                        for h in 0..comp.h_sampling as usize {
                            let block_row = mcu_row * (comp.v_sampling as usize) + v;
                            let block_col = mcu_col * (comp.h_sampling as usize) + h;
                            let block = grids[sc.comp_idx].block_mut(block_row, block_col);

                            if ah == 0 {
                                let dc_trie = dc_tries[sc.dc_table]
                                    .as_ref()
                                    .ok_or(JpegError::BadCode)?;
                                let dc_size = dc_trie.decode(&mut reader)?;
                                if dc_size > 0 {
                                    let dc_bits = reader.read_bits(dc_size)?;
                                    dc_pred[sci] += extend_sign(dc_bits, dc_size) as i32;
                                }
                                let clamped = dc_pred[sci]
                                    .clamp(i16::MIN as i32, i16::MAX as i32)
                                    as i16;
                                block[0] = clamped << al;
                            } else if reader.read_bit()? != 0 {
                                block[0] |= 1i16 << al;
                            }
                        }
                    }
                }
                mcu_count += 1;
            }
        }
    }

    Ok(reader.position())
}

/// AC first scan for one block: run-length coded values in [ss..=se],
/// shifted left by al, with EOBn runs spanning blocks.
fn decode_ac_first(
    reader: &mut BitReader,
    ac_trie: &HuffmanTrie,
    al: u8,
    ss: usize,
    se: usize,
    eob_run: &mut u32,
    block: &mut [i16],
) -> Result<()> {
    if *eob_run > 0 {
        *eob_run -= 1;
        return Ok(());
    }

    let mut k = ss;
    while k <= se {
        let rs = ac_trie.decode(reader)?;
        let run = (rs >> 4) as usize;
        let size = rs & 0x0F;

        if size == 0 {
            if run == 15 {
                k += 16;
                continue;
            }
            // EOBn: 2^run blocks plus `run` extra bits, this block included.
            *eob_run = 1u32 << run;
            if run > 0 {
                *eob_run += reader.read_bits(run as u8)? as u32;
            }
            *eob_run -= 1;
            return Ok(());
        }

        k += run;
        if k > se {
            return Err(JpegError::Structural("AC run past end of band"));
        }
        let bits = reader.read_bits(size)?;
        block[ZIGZAG_TO_NATURAL[k]] = extend_sign(bits, size) << al;
        k += 1;
    }

    Ok(())
}

/// What the AC refinement pass does next as it walks the band
/// (ITU-T T.81 G.1.2.3).
enum RefineState {
    /// Decode the next run/size symbol.
    ReadSymbol,
    /// ZRL: pass `remaining` zero positions, refining nonzero ones.
    SkipZeros { remaining: usize },
    /// Pass `remaining` zero positions, then place `pending` at the next one.
    SkipThenSet { remaining: usize, pending: i16 },
    /// Place `pending` at the next zero position.
    SetPending { pending: i16 },
    /// EOBn: refine nonzero positions through the end of the band.
    EobRefine,
}

/// AC refinement scan for one block.
///
/// Every position already nonzero consumes one correction bit whenever the
/// walk passes it; zero positions are consumed by run counts and may receive
/// a new ±(1 << al) value.
fn decode_ac_refine(
    reader: &mut BitReader,
    ac_trie: &HuffmanTrie,
    al: u8,
    ss: usize,
    se: usize,
    eob_run: &mut u32,
    block: &mut [i16],
) -> Result<()> {
    let p1 = 1i16 << al;
    let m1 = -1i16 << al;

    let mut state = if *eob_run > 0 {
        RefineState::EobRefine
    } else {
        RefineState::ReadSymbol
    };
    let mut k = ss;

    // One correction bit; only called on nonzero positions.
    fn refine(reader: &mut BitReader, coef: &mut i16, p1: i16, m1: i16) -> Result<()> {
        if reader.read_bit()? != 0 {
            *coef += if *coef > 0 { p1 } else { m1 };
        }
        Ok(())
    }

    while k <= se {
        match state {
            RefineState::ReadSymbol => {
                let rs = ac_trie.decode(reader)?;
                let run = (rs >> 4) as usize;
                let size = rs & 0x0F;
                state = match size {
                    1 => {
                        let pending = if reader.read_bit()? != 0 { p1 } else { m1 };
                        if run == 0 {
                            RefineState::SetPending { pending }
                        } else {
                            RefineState::SkipThenSet {
                                remaining: run,
                                pending,
                            }
                        }
                    }
                    0 if run == 15 => RefineState::SkipZeros { remaining: 16 },
                    0 => {
                        *eob_run = 1u32 << run;
                        if run > 0 {
                            *eob_run += reader.read_bits(run as u8)? as u32;
                        }
                        RefineState::EobRefine
                    }
                    _ => return Err(JpegError::BadCode),
                };
            }
            RefineState::SkipZeros { ref mut remaining } => {
                let coef = &mut block[ZIGZAG_TO_NATURAL[k]];
                if *coef != 0 {
                    refine(reader, coef, p1, m1)?;
                } else {
                    *remaining -= 1;
                    if *remaining == 0 {
                        state = RefineState::ReadSymbol;
                    }
                }
                k += 1;
            }
            RefineState::SkipThenSet {
                ref mut remaining,
                pending,
            } => {
                let coef = &mut block[ZIGZAG_TO_NATURAL[k]];
                if *coef != 0 {
                    refine(reader, coef, p1, m1)?;
                } else {
                    *remaining -= 1;
                    if *remaining == 0 {
                        state = RefineState::SetPending { pending };
                    }
                }
                k += 1;
            }
            RefineState::SetPending { pending } => {
                let coef = &mut block[ZIGZAG_TO_NATURAL[k]];
                if *coef != 0 {
                    refine(reader, coef, p1, m1)?;
                } else {
                    *coef = pending;
                    state = RefineState::ReadSymbol;
                }
                k += 1;
            }
            RefineState::EobRefine => {
                let coef = &mut block[ZIGZAG_TO_NATURAL[k]];
                if *coef != 0 {
                    refine(reader, coef, p1, m1)?;
                }
                k += 1;
            }
        }
    }

    if matches!(state, RefineState::EobRefine) {
        *eob_run -= 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jpeg::frame::parse_sof;
    use crate::jpeg::tables::{standard_ac_spec, standard_dc_spec};

    fn luma_specs() -> ([Option<HuffmanSpec>; 4], [Option<HuffmanSpec>; 4]) {
        (
            [Some(standard_dc_spec(false)), None, None, None],
            [Some(standard_ac_spec(false)), None, None, None],
        )
    }

    fn one_block_frame() -> FrameInfo {
        let sof = [8, 0, 8, 0, 8, 1, 1, 0x11, 0];
        parse_sof(&sof, false).unwrap()
    }

    #[test]
    fn baseline_round_trip() {
        let frame = one_block_frame();
        let comps = [ScanComponent {
            comp_idx: 0,
            dc_table: 0,
            ac_table: 0,
        }];
        let (dc_specs, ac_specs) = luma_specs();

        let mut grid = DctGrid::new(1, 1);
        grid.set(0, 0, 0, 0, -42);
        grid.set(0, 0, 0, 1, 17);
        grid.set(0, 0, 3, 2, -3);
        grid.set(0, 0, 7, 7, 255);
        let original = grid.clone();

        let encoded =
            encode_scan(&frame, &comps, &[grid], &dc_specs, &ac_specs).unwrap();

        let mut decoded = vec![DctGrid::new(1, 1)];
        decode_scan(
            &encoded, 0, &frame, &comps, &dc_specs, &ac_specs, 0, &mut decoded,
        )
        .unwrap();

        assert_eq!(decoded[0].coeffs(), original.coeffs());
    }

    #[test]
    fn baseline_round_trip_multi_block() {
        // 2x2 MCUs of one component, with DC prediction across blocks.
        let sof = [8, 0, 16, 0, 16, 1, 1, 0x11, 0];
        let frame = parse_sof(&sof, false).unwrap();
        let comps = [ScanComponent {
            comp_idx: 0,
            dc_table: 0,
            ac_table: 0,
        }];
        let (dc_specs, ac_specs) = luma_specs();

        let mut grid = DctGrid::new(2, 2);
        for (i, dc) in [100i16, -100, 3, 0].iter().enumerate() {
            grid.set(i / 2, i % 2, 0, 0, *dc);
            grid.set(i / 2, i % 2, 5, 5, (i as i16) - 2);
        }
        let original = grid.clone();

        let encoded =
            encode_scan(&frame, &comps, &[grid], &dc_specs, &ac_specs).unwrap();

        let mut decoded = vec![DctGrid::new(2, 2)];
        decode_scan(
            &encoded, 0, &frame, &comps, &dc_specs, &ac_specs, 0, &mut decoded,
        )
        .unwrap();

        assert_eq!(decoded[0].coeffs(), original.coeffs());
    }

    #[test]
    fn progressive_dc_first_and_refine() {
        let frame = one_block_frame();
        let comps = [ScanComponent {
            comp_idx: 0,
            dc_table: 0,
            ac_table: 0,
        }];
        let (dc_specs, ac_specs) = luma_specs();

        // DC first at al=1: diff 5, stored as 5 << 1 = 10.
        let dc_spec = standard_dc_spec(false);
        let dc_enc = HuffmanEncodeTable::build(&dc_spec.bits, &dc_spec.huffval);
        let mut w = BitWriter::new();
        let (bits, size) = magnitude_category(5);
        let (code, len) = dc_enc.encode(size).unwrap();
        w.write_bits(code, len);
        w.write_bits(bits, size);
        let stream = w.finish();

        let mut grids = vec![DctGrid::new(1, 1)];
        let params = SosParams {
            ss: 0,
            se: 0,
            ah: 0,
            al: 1,
        };
        decode_progressive_scan(
            &stream, 0, &frame, &comps, &dc_specs, &ac_specs, 0, &params, &mut grids,
        )
        .unwrap();
        assert_eq!(grids[0].get(0, 0, 0, 0), 10);

        // DC refinement at al=0: one 1-bit sets bit 0, giving 11.
        let stream = [0b1000_0000u8];
        let params = SosParams {
            ss: 0,
            se: 0,
            ah: 1,
            al: 0,
        };
        decode_progressive_scan(
            &stream, 0, &frame, &comps, &dc_specs, &ac_specs, 0, &params, &mut grids,
        )
        .unwrap();
        assert_eq!(grids[0].get(0, 0, 0, 0), 11);
    }

    #[test]
    fn progressive_ac_first_band() {
        let frame = one_block_frame();
        let comps = [ScanComponent {
            comp_idx: 0,
            dc_table: 0,
            ac_table: 0,
        }];
        let (dc_specs, ac_specs) = luma_specs();

        // Band [1..=5] at al=1: value 3 at k=2 (run 1), then EOB0.
        let ac_spec = standard_ac_spec(false);
        let ac_enc = HuffmanEncodeTable::build(&ac_spec.bits, &ac_spec.huffval);
        let mut w = BitWriter::new();
        let (bits, size) = magnitude_category(3);
        let (code, len) = ac_enc.encode((1 << 4) | size).unwrap();
        w.write_bits(code, len);
        w.write_bits(bits, size);
        let (eob, eob_len) = ac_enc.encode(0x00).unwrap();
        w.write_bits(eob, eob_len);
        let stream = w.finish();

        let mut grids = vec![DctGrid::new(1, 1)];
        let params = SosParams {
            ss: 1,
            se: 5,
            ah: 0,
            al: 1,
        };
        decode_progressive_scan(
            &stream, 0, &frame, &comps, &dc_specs, &ac_specs, 0, &params, &mut grids,
        )
        .unwrap();

        let block = grids[0].block(0, 0);
        assert_eq!(block[ZIGZAG_TO_NATURAL[2]], 6); // 3 << 1
        for k in [1usize, 3, 4, 5] {
            assert_eq!(block[ZIGZAG_TO_NATURAL[k]], 0, "zigzag {k}");
        }
    }

    #[test]
    fn progressive_ac_refine_places_and_corrects() {
        let frame = one_block_frame();
        let comps = [ScanComponent {
            comp_idx: 0,
            dc_table: 0,
            ac_table: 0,
        }];
        let (dc_specs, ac_specs) = luma_specs();

        // Prior state: zigzag 1 holds 2. Refinement at al=0 over [1..=5]:
        // symbol (run=0, size=1) with sign 1 -> pending +1; passing zigzag 1
        // consumes a correction bit (1 -> becomes 3); zigzag 2 is zero and
        // takes the pending +1; then EOB0 ends the block.
        let ac_spec = standard_ac_spec(false);
        let ac_enc = HuffmanEncodeTable::build(&ac_spec.bits, &ac_spec.huffval);
        let mut w = BitWriter::new();
        let (code, len) = ac_enc.encode(0x01).unwrap();
        w.write_bits(code, len);
        w.write_bits(1, 1); // sign: positive
        w.write_bits(1, 1); // correction bit for zigzag 1
        let (eob, eob_len) = ac_enc.encode(0x00).unwrap();
        w.write_bits(eob, eob_len);
        let stream = w.finish();

        let mut grids = vec![DctGrid::new(1, 1)];
        grids[0].set_flat(ZIGZAG_TO_NATURAL[1], 2);

        let params = SosParams {
            ss: 1,
            se: 5,
            ah: 1,
            al: 0,
        };
        decode_progressive_scan(
            &stream, 0, &frame, &comps, &dc_specs, &ac_specs, 0, &params, &mut grids,
        )
        .unwrap();

        let block = grids[0].block(0, 0);
        assert_eq!(block[ZIGZAG_TO_NATURAL[1]], 3);
        assert_eq!(block[ZIGZAG_TO_NATURAL[2]], 1);
    }

    #[test]
    fn eob_run_spans_blocks() {
        // Two blocks; after one value in the first, EOB1 (symbol 0x10, one
        // extra bit = 0) ends it and skips the second entirely. The standard
        // tables carry no EOBn symbols, so the scan uses its own table:
        // "0" -> 0x10 (EOB1), "10" -> 0x00 (EOB0), "11" -> 0x01.
        let sof = [8, 0, 8, 0, 16, 1, 1, 0x11, 0];
        let frame = parse_sof(&sof, false).unwrap();
        let comps = [ScanComponent {
            comp_idx: 0,
            dc_table: 0,
            ac_table: 0,
        }];

        let mut bits = [0u8; 16];
        bits[0] = 1;
        bits[1] = 2;
        let ac_spec = HuffmanSpec {
            class: 1,
            id: 0,
            bits,
            huffval: vec![0x10, 0x00, 0x01],
        };
        let dc_specs: [Option<HuffmanSpec>; 4] =
            [Some(standard_dc_spec(false)), None, None, None];
        let ac_specs: [Option<HuffmanSpec>; 4] = [Some(ac_spec.clone()), None, None, None];

        let ac_enc = HuffmanEncodeTable::build(&ac_spec.bits, &ac_spec.huffval);
        let mut w = BitWriter::new();
        let (code, len) = ac_enc.encode(0x01).unwrap(); // run 0, size 1
        w.write_bits(code, len);
        w.write_bits(1, 1); // value +1 at zigzag 1
        let (code, len) = ac_enc.encode(0x10).unwrap();
        w.write_bits(code, len);
        w.write_bits(0, 1); // eob_run = 2 + 0
        let stream = w.finish();

        let mut grids = vec![DctGrid::new(1, 2)];
        let params = SosParams {
            ss: 1,
            se: 63,
            ah: 0,
            al: 0,
        };
        decode_progressive_scan(
            &stream, 0, &frame, &comps, &dc_specs, &ac_specs, 0, &params, &mut grids,
        )
        .unwrap();

        let first = grids[0].block(0, 0);
        assert_eq!(first[ZIGZAG_TO_NATURAL[1]], 1);
        assert_eq!(first.iter().filter(|&&c| c != 0).count(), 1);
        assert!(grids[0].block(1, 0).iter().all(|&c| c == 0));
    }
}
