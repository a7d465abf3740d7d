// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Steganographic embedding and extraction.
//!
//! The pipeline is the same on both sides: hash the master key, walk the
//! carrier's usable bits in the keyed order, and move the serialized chunk
//! container through the bit channel. [`embed`] and [`extract`] wire it up
//! for JPEG carriers; the pieces are public so other carrier types can
//! reuse them through their own [`walker::Substrate`].

pub mod bag;
pub mod bitchannel;
pub mod crypto;
pub mod error;
pub mod params;
pub mod progress;
pub mod registry;
pub mod walker;

use log::{debug, info};

pub use bag::{BagBuilder, Chunk, ChunkData, ChunkHash, DataBag, DataContent};
pub use crypto::HashAlgo;
pub use error::{Result, StegoError};
pub use params::Parameters;
pub use progress::{NoProgress, ProgressReport, ProgressSink};
pub use registry::{CarrierCodec, CodecRegistry, JpegCarrier};
pub use walker::{CoeffSubstrate, IndexWalker, PixelBuffer, PixelSubstrate, SlotSubstrate};

use crate::jpeg::JpegImage;

/// Embed a container into a JPEG carrier, returning the rewritten file.
///
/// Fails with [`StegoError::CapacityExceeded`] when the serialized bag does
/// not fit, even after escalation if the parameters allow it.
pub fn embed<P: ProgressSink>(
    carrier: &[u8],
    bag: &DataBag,
    params: &Parameters,
    progress: &mut P,
) -> Result<Vec<u8>> {
    let mut image = JpegImage::from_bytes(carrier)?;
    let payload = bag.to_bytes();
    let key_hash = params.key_hash();
    debug!("embedding {} container bytes", payload.len());

    let substrate = CoeffSubstrate::new(image.grids_mut());
    let mut walker = IndexWalker::new(&key_hash, substrate, params.bit_start())?;
    let fits = bitchannel::encode(
        &mut walker,
        params.master_key(),
        &key_hash,
        &payload,
        params.auto_extend(),
        progress,
    );
    drop(walker);
    if !fits {
        return Err(StegoError::CapacityExceeded);
    }

    info!("embedded {} bytes, rewriting carrier", payload.len());
    Ok(image.to_bytes()?)
}

/// Extract a container from a JPEG carrier.
///
/// Stops reading at the container's stop chunk. A wrong key typically fails
/// on the container magic within the first few bytes.
pub fn extract<P: ProgressSink>(
    carrier: &[u8],
    params: &Parameters,
    progress: &mut P,
) -> Result<DataBag> {
    let mut image = JpegImage::from_bytes(carrier)?;
    let key_hash = params.key_hash();

    let substrate = CoeffSubstrate::new(image.grids_mut());
    let mut walker = IndexWalker::new(&key_hash, substrate, params.bit_start())?;
    let mut builder = BagBuilder::new();
    bitchannel::decode(
        &mut walker,
        params.master_key(),
        &key_hash,
        params.auto_extend(),
        &mut builder,
        progress,
    )?;
    builder.finish()
}

/// Bit capacity of a JPEG carrier under the given parameters.
pub fn capacity(carrier: &[u8], params: &Parameters) -> Result<usize> {
    let mut image = JpegImage::from_bytes(carrier)?;
    let key_hash = params.key_hash();
    let substrate = CoeffSubstrate::new(image.grids_mut());
    let walker = IndexWalker::new(&key_hash, substrate, params.bit_start())?;
    Ok(walker.capacity_bits(params.auto_extend()))
}
