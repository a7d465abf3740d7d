// Copyright (c) 2026 hushcore contributors
// SPDX-License-Identifier: GPL-3.0-only

//! Chunked payload container.
//!
//! A bag is a magic prefix followed by tagged chunks. Data chunks carry a
//! named payload, optionally encrypted; hash chunks carry a digest over all
//! data chunk payloads; a stop chunk terminates the stream. On the wire
//! every chunk is one tag byte plus a 3-byte little-endian length plus the
//! payload; stop carries length zero, and extraction halts at its tag byte
//! without reading the length.
//!
//! [`BagBuilder`] consumes the container byte by byte, which lets the bit
//! channel stop reading carrier bits as soon as the stop tag arrives
//! instead of draining the whole substrate.

use log::debug;

use super::crypto::{self, HashAlgo};
use super::error::{Result, StegoError};

/// Container magic, first bytes of every bag.
pub const BAG_MAGIC: [u8; 8] = [0xEC, 0x95, 0x88, 0xEB, 0x85, 0x95, 0x46, 0x46];

/// Marks a plaintext data chunk payload.
const DATA_MAGIC: [u8; 4] = [0xFF, 0x0F, 0xEF, 0x78];

const TAG_STOP: u8 = 0x00;
const TAG_DATA: u8 = 0x01;
const TAG_HASH: u8 = 0x02;

/// Largest chunk payload the 3-byte length field can frame.
const MAX_PAYLOAD: usize = 0xFF_FFFF;

/// Outcome of feeding one byte to a [`ByteSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStep {
    /// The sink wants more bytes.
    Continue,
    /// The sink has seen a complete stream; stop feeding it.
    EarlyComplete,
}

/// Byte-at-a-time consumer of an extracted stream.
pub trait ByteSink {
    fn push(&mut self, byte: u8) -> Result<StreamStep>;
}

/// One container chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// End of container.
    Stop,
    Data(ChunkData),
    Hash(ChunkHash),
}

/// A named payload, stored either in the clear or AES-encrypted.
///
/// The wire payload is opaque until [`ChunkData::open`] checks for the
/// plaintext header and, failing that, tries to decrypt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkData {
    payload: Vec<u8>,
}

/// Result of opening a data chunk with a candidate key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataContent {
    Plain { name: String, data: Vec<u8> },
    /// Neither plaintext nor decryptable with the given key.
    Opaque,
}

impl ChunkData {
    /// Build an unencrypted data chunk.
    pub fn plaintext(name: &str, data: &[u8]) -> Result<Self> {
        let payload = Self::frame(name, data)?;
        Ok(Self { payload })
    }

    /// Build an encrypted data chunk; the framed name and data are
    /// AES-256-CBC encrypted under the given key, with the master-key hash
    /// as the derivation salt.
    pub fn encrypted(name: &str, data: &[u8], key: &[u8], salt: &[u8]) -> Result<Self> {
        let framed = Self::frame(name, data)?;
        let payload = crypto::encrypt(&framed, key, salt);
        if payload.len() > MAX_PAYLOAD {
            return Err(StegoError::Structural("data chunk too large"));
        }
        Ok(Self { payload })
    }

    fn frame(name: &str, data: &[u8]) -> Result<Vec<u8>> {
        if name.len() > 255 {
            return Err(StegoError::Structural("data chunk name too long"));
        }
        let total = 8 + name.len() + data.len();
        // Leave headroom for one block of padding when encrypting.
        if total + 16 > MAX_PAYLOAD {
            return Err(StegoError::Structural("data chunk too large"));
        }
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&DATA_MAGIC);
        out.push(name.len() as u8);
        out.extend_from_slice(&(data.len() as u32).to_le_bytes()[..3]);
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(data);
        Ok(out)
    }

    fn unframe(payload: &[u8]) -> Option<(String, Vec<u8>)> {
        if payload.len() < 8 || payload[..4] != DATA_MAGIC {
            return None;
        }
        let name_len = payload[4] as usize;
        let data_len =
            u32::from_le_bytes([payload[5], payload[6], payload[7], 0]) as usize;
        if payload.len() != 8 + name_len + data_len {
            return None;
        }
        let name = String::from_utf8(payload[8..8 + name_len].to_vec()).ok()?;
        Some((name, payload[8 + name_len..].to_vec()))
    }

    /// Recover name and data, decrypting with `key` and `salt` if the
    /// payload is not stored in the clear. A wrong key yields
    /// [`DataContent::Opaque`], not an error, because an opaque chunk is
    /// indistinguishable from one encrypted for somebody else.
    pub fn open(&self, key: &[u8], salt: &[u8]) -> DataContent {
        if let Some((name, data)) = Self::unframe(&self.payload) {
            return DataContent::Plain { name, data };
        }
        if let Ok(framed) = crypto::decrypt(&self.payload, key, salt) {
            if let Some((name, data)) = Self::unframe(&framed) {
                return DataContent::Plain { name, data };
            }
        }
        DataContent::Opaque
    }

    /// Wire payload as stored in the container.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Digest over the wire payloads of all data chunks, in container order.
///
/// Hashing the stored payloads rather than the plaintext means integrity
/// can be checked without any key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHash {
    algo_name: String,
    digest: Vec<u8>,
}

impl ChunkHash {
    pub fn over(algo: HashAlgo, data_chunks: &[&ChunkData]) -> Self {
        let mut all = Vec::new();
        for chunk in data_chunks {
            all.extend_from_slice(chunk.payload());
        }
        Self {
            algo_name: algo.name().to_owned(),
            digest: algo.digest(&all),
        }
    }

    pub fn algo_name(&self) -> &str {
        &self.algo_name
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.algo_name.len() + self.digest.len());
        out.push(self.algo_name.len() as u8);
        out.extend_from_slice(self.algo_name.as_bytes());
        out.extend_from_slice(&self.digest);
        out
    }

    fn from_wire(payload: &[u8]) -> Result<Self> {
        let name_len = *payload
            .first()
            .ok_or(StegoError::Structural("empty hash chunk"))? as usize;
        if payload.len() < 1 + name_len {
            return Err(StegoError::Structural("hash chunk shorter than its name"));
        }
        let algo_name = String::from_utf8(payload[1..1 + name_len].to_vec())
            .map_err(|_| StegoError::Structural("hash algorithm name not UTF-8"))?;
        Ok(Self {
            algo_name,
            digest: payload[1 + name_len..].to_vec(),
        })
    }
}

/// An ordered collection of chunks, terminated by a stop chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataBag {
    chunks: Vec<Chunk>,
}

impl DataBag {
    pub fn new() -> Self {
        Self {
            chunks: vec![Chunk::Stop],
        }
    }

    /// Insert a chunk ahead of the trailing stop chunk.
    pub fn add_chunk(&mut self, chunk: Chunk) {
        match self.chunks.last() {
            Some(Chunk::Stop) => {
                let at = self.chunks.len() - 1;
                self.chunks.insert(at, chunk);
            }
            _ => self.chunks.push(chunk),
        }
    }

    /// Append a hash chunk covering the data chunks present right now.
    pub fn add_hash(&mut self, algo: HashAlgo) {
        let data: Vec<&ChunkData> = self.data_chunks().collect();
        let hash = ChunkHash::over(algo, &data);
        self.add_chunk(Chunk::Hash(hash));
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn data_chunks(&self) -> impl Iterator<Item = &ChunkData> {
        self.chunks.iter().filter_map(|c| match c {
            Chunk::Data(d) => Some(d),
            _ => None,
        })
    }

    /// Re-verify every hash chunk against the data chunks. True when all
    /// digests match (vacuously true without hash chunks); false on a
    /// mismatch or an unknown algorithm name.
    pub fn verify_hashes(&self) -> bool {
        let data: Vec<&ChunkData> = self.data_chunks().collect();
        self.chunks.iter().all(|c| match c {
            Chunk::Hash(h) => match HashAlgo::from_name(h.algo_name()) {
                Some(algo) => ChunkHash::over(algo, &data).digest() == h.digest(),
                None => false,
            },
            _ => true,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&BAG_MAGIC);
        for chunk in &self.chunks {
            match chunk {
                Chunk::Stop => out.extend_from_slice(&[TAG_STOP, 0, 0, 0]),
                Chunk::Data(d) => {
                    out.push(TAG_DATA);
                    out.extend_from_slice(&(d.payload.len() as u32).to_le_bytes()[..3]);
                    out.extend_from_slice(&d.payload);
                }
                Chunk::Hash(h) => {
                    let wire = h.to_wire();
                    out.push(TAG_HASH);
                    out.extend_from_slice(&(wire.len() as u32).to_le_bytes()[..3]);
                    out.extend_from_slice(&wire);
                }
            }
        }
        out
    }

    /// Parse a serialized bag. Bytes after the stop chunk are ignored; a
    /// stream that simply runs out between chunks parses as a bag without
    /// a trailing stop.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut builder = BagBuilder::new();
        for &b in bytes {
            if builder.push(b)? == StreamStep::EarlyComplete {
                break;
            }
        }
        builder.finish()
    }
}

enum BuilderState {
    Magic { matched: usize },
    ChunkType,
    ChunkLength { tag: u8, len: [u8; 3], got: usize },
    ChunkPayload { tag: u8, remaining: usize, buf: Vec<u8> },
    Complete,
}

/// Incremental bag parser fed one byte at a time.
pub struct BagBuilder {
    state: BuilderState,
    chunks: Vec<Chunk>,
}

impl BagBuilder {
    pub fn new() -> Self {
        Self {
            state: BuilderState::Magic { matched: 0 },
            chunks: Vec::new(),
        }
    }

    fn take_chunk(&mut self, tag: u8, payload: Vec<u8>) -> Result<()> {
        let chunk = match tag {
            TAG_DATA => Chunk::Data(ChunkData { payload }),
            TAG_HASH => Chunk::Hash(ChunkHash::from_wire(&payload)?),
            _ => unreachable!("tag validated on entry"),
        };
        self.chunks.push(chunk);
        self.state = BuilderState::ChunkType;
        Ok(())
    }

    /// The bag accumulated so far, requiring a clean chunk boundary.
    /// Mid-chunk exhaustion is a truncated stream.
    pub fn finish(self) -> Result<DataBag> {
        match self.state {
            BuilderState::Complete | BuilderState::ChunkType => {
                debug!("container parsed: {} chunks", self.chunks.len());
                Ok(DataBag {
                    chunks: self.chunks,
                })
            }
            _ => Err(StegoError::Truncated),
        }
    }
}

impl Default for BagBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSink for BagBuilder {
    fn push(&mut self, byte: u8) -> Result<StreamStep> {
        match &mut self.state {
            BuilderState::Magic { matched } => {
                if byte != BAG_MAGIC[*matched] {
                    return Err(StegoError::Structural("bad container magic"));
                }
                *matched += 1;
                if *matched == BAG_MAGIC.len() {
                    self.state = BuilderState::ChunkType;
                }
                Ok(StreamStep::Continue)
            }
            BuilderState::ChunkType => match byte {
                TAG_STOP => {
                    self.chunks.push(Chunk::Stop);
                    self.state = BuilderState::Complete;
                    Ok(StreamStep::EarlyComplete)
                }
                TAG_DATA | TAG_HASH => {
                    self.state = BuilderState::ChunkLength {
                        tag: byte,
                        len: [0; 3],
                        got: 0,
                    };
                    Ok(StreamStep::Continue)
                }
                other => Err(StegoError::UnknownChunkTag(other)),
            },
            BuilderState::ChunkLength { tag, len, got } => {
                len[*got] = byte;
                *got += 1;
                if *got == 3 {
                    let tag = *tag;
                    let n = u32::from_le_bytes([len[0], len[1], len[2], 0]) as usize;
                    if n == 0 {
                        self.take_chunk(tag, Vec::new())?;
                    } else {
                        self.state = BuilderState::ChunkPayload {
                            tag,
                            remaining: n,
                            buf: Vec::with_capacity(n),
                        };
                    }
                }
                Ok(StreamStep::Continue)
            }
            BuilderState::ChunkPayload {
                tag,
                remaining,
                buf,
            } => {
                buf.push(byte);
                *remaining -= 1;
                if *remaining == 0 {
                    let tag = *tag;
                    let payload = std::mem::take(buf);
                    self.take_chunk(tag, payload)?;
                }
                Ok(StreamStep::Continue)
            }
            // Bytes past the stop chunk are carrier noise.
            BuilderState::Complete => Ok(StreamStep::EarlyComplete),
        }
    }
}
