// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Full embed/extract round trips over synthetic carriers.

mod common;

use hushcore::stego::NoProgress;
use hushcore::{
    capacity, embed, extract, Chunk, ChunkData, DataBag, DataContent, HashAlgo, JpegImage,
    Parameters, StegoError,
};

fn spread(i: usize) -> i16 {
    let v = (i % 59) as i16 - 29;
    if v == 0 {
        7
    } else {
        v
    }
}

/// 64-block grayscale carrier with coefficients spread across magnitudes.
fn carrier() -> Vec<u8> {
    common::gray_jpeg(8, 8, spread)
}

#[test]
fn embed_extract_round_trip() {
    let params = Parameters::new(b"orchard gate".to_vec());
    let mut bag = DataBag::new();
    bag.add_chunk(Chunk::Data(
        ChunkData::encrypted("note.txt", b"meet at noon", params.data_key(), &params.key_hash())
            .unwrap(),
    ));
    bag.add_chunk(Chunk::Data(ChunkData::plaintext("tag", b"v1").unwrap()));
    bag.add_hash(HashAlgo::Sha256);

    let cover = carrier();
    let stego = embed(&cover, &bag, &params, &mut NoProgress).unwrap();
    assert_ne!(stego, cover);

    let recovered = extract(&stego, &params, &mut NoProgress).unwrap();
    assert_eq!(recovered, bag);
    assert!(recovered.verify_hashes());
    assert_eq!(
        recovered
            .data_chunks()
            .next()
            .unwrap()
            .open(params.data_key(), &params.key_hash()),
        DataContent::Plain {
            name: "note.txt".to_owned(),
            data: b"meet at noon".to_vec(),
        }
    );
}

#[test]
fn stego_output_is_a_valid_jpeg() {
    let params = Parameters::new(b"key".to_vec());
    let mut bag = DataBag::new();
    bag.add_chunk(Chunk::Data(ChunkData::plaintext("x", b"payload").unwrap()));

    let stego = embed(&carrier(), &bag, &params, &mut NoProgress).unwrap();
    let img = JpegImage::from_bytes(&stego).unwrap();
    assert_eq!(img.num_components(), 1);
    assert_eq!(img.grids()[0].len(), 64 * 64);
}

#[test]
fn wrong_key_finds_nothing() {
    let params = Parameters::new(b"right key".to_vec());
    let mut bag = DataBag::new();
    bag.add_chunk(Chunk::Data(ChunkData::plaintext("x", b"data").unwrap()));
    let stego = embed(&carrier(), &bag, &params, &mut NoProgress).unwrap();

    let wrong = Parameters::new(b"wrong key".to_vec());
    assert!(extract(&stego, &wrong, &mut NoProgress).is_err());
}

#[test]
fn separate_data_key() {
    let params = Parameters::new(b"selection key".to_vec()).with_data_key(b"payload key".to_vec());
    let mut bag = DataBag::new();
    bag.add_chunk(Chunk::Data(
        ChunkData::encrypted("s", b"secret", params.data_key(), &params.key_hash()).unwrap(),
    ));
    let stego = embed(&carrier(), &bag, &params, &mut NoProgress).unwrap();

    let recovered = extract(&stego, &params, &mut NoProgress).unwrap();
    let chunk = recovered.data_chunks().next().unwrap();
    assert_eq!(
        chunk.open(b"selection key", &params.key_hash()),
        DataContent::Opaque
    );
    assert_eq!(
        chunk.open(b"payload key", &params.key_hash()),
        DataContent::Plain {
            name: "s".to_owned(),
            data: b"secret".to_vec(),
        }
    );
}

#[test]
fn clean_carrier_has_no_container() {
    let params = Parameters::new(b"any key".to_vec());
    assert!(extract(&carrier(), &params, &mut NoProgress).is_err());
}

#[test]
fn oversized_payload_rejected() {
    let params = Parameters::new(b"key".to_vec());
    let small = common::gray_jpeg(2, 2, spread);
    let mut bag = DataBag::new();
    bag.add_chunk(Chunk::Data(
        ChunkData::plaintext("big.bin", &vec![0xA5u8; 1024]).unwrap(),
    ));
    assert!(matches!(
        embed(&small, &bag, &params, &mut NoProgress),
        Err(StegoError::CapacityExceeded)
    ));
}

#[test]
fn zero_coefficient_carrier_has_no_capacity() {
    let params = Parameters::new(b"key".to_vec());
    let blank = common::gray_jpeg(4, 4, |_| 0);
    assert_eq!(capacity(&blank, &params).unwrap(), 0);

    let bag = DataBag::new();
    assert!(matches!(
        embed(&blank, &bag, &params, &mut NoProgress),
        Err(StegoError::CapacityExceeded)
    ));
}

#[test]
fn auto_extend_raises_capacity() {
    let cover = carrier();
    let base = Parameters::new(b"key".to_vec()).with_auto_extend(false);
    let extended = Parameters::new(b"key".to_vec());
    let single = capacity(&cover, &base).unwrap();
    let all = capacity(&cover, &extended).unwrap();
    assert!(single > 0);
    assert!(all > single);
}

#[test]
fn higher_start_plane_still_round_trips() {
    let params = Parameters::new(b"key".to_vec()).with_bit_start(2);
    let mut bag = DataBag::new();
    bag.add_chunk(Chunk::Data(ChunkData::plaintext("p", b"plane two").unwrap()));

    let stego = embed(&carrier(), &bag, &params, &mut NoProgress).unwrap();
    let recovered = extract(&stego, &params, &mut NoProgress).unwrap();
    assert_eq!(recovered, bag);
}
