// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! # hushcore
//!
//! Steganography core for hiding named, optionally encrypted payloads in
//! JPEG photos. The `jpeg` module decodes a file down to its quantized DCT
//! coefficients and re-encodes them losslessly as baseline JPEG; the
//! `stego` module spreads a chunked payload container across those
//! coefficients along a key-derived walk.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use hushcore::{embed, extract, Chunk, ChunkData, DataBag, DataContent, Parameters};
//! use hushcore::stego::NoProgress;
//!
//! let cover = std::fs::read("photo.jpg").unwrap();
//! let params = Parameters::new(b"passphrase".to_vec());
//! let mut bag = DataBag::new();
//! bag.add_chunk(Chunk::Data(
//!     ChunkData::encrypted("note.txt", b"hi", params.data_key(), &params.key_hash()).unwrap(),
//! ));
//!
//! let stego = embed(&cover, &bag, &params, &mut NoProgress).unwrap();
//! let recovered = extract(&stego, &params, &mut NoProgress).unwrap();
//! for chunk in recovered.data_chunks() {
//!     if let DataContent::Plain { name, data } = chunk.open(params.data_key(), &params.key_hash()) {
//!         println!("{name}: {} bytes", data.len());
//!     }
//! }
//! ```

pub mod jpeg;
pub mod stego;

pub use jpeg::dct::{DctGrid, QuantTable};
pub use jpeg::error::{JpegError, Result as JpegResult};
pub use jpeg::frame::FrameInfo;
pub use jpeg::JpegImage;
pub use stego::{
    capacity, embed, extract, Chunk, ChunkData, ChunkHash, DataBag, DataContent, HashAlgo,
    Parameters, StegoError,
};
