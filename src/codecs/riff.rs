use crate::prelude::*;

use super::WaveSpec;

// Format tags
pub(crate) const FORMAT_PCM: u16 = 1;

// Chunk Identifiers
pub(crate) const RIFF_CHUNK_ID: &[u8; 4] = b"RIFF";
pub(crate) const WAVE_FORMAT_ID: &[u8; 4] = b"WAVE";
pub(crate) const FMT_CHUNK_ID: &[u8; 4] = b"fmt ";
pub(crate) const DATA_CHUNK_ID: &[u8; 4] = b"data";

// Chunk Structures
pub(crate) const STANDARD_FMT_CHUNK_SIZE: u32 = 16;
pub(crate) const HEADER_SIZE: usize = 12; // RIFF + size + WAVE
pub(crate) const CHUNK_HEADER_SIZE: usize = 8; // id + size
pub(crate) const FMT_CHUNK_TOTAL: usize = CHUNK_HEADER_SIZE + STANDARD_FMT_CHUNK_SIZE as usize;
pub(crate) const CANONICAL_HEADER_SIZE: usize = HEADER_SIZE + FMT_CHUNK_TOTAL + CHUNK_HEADER_SIZE;

/// RIFF size field for a canonical file carrying `data_size` payload bytes,
/// excluding any pad byte.
pub(crate) fn canonical_riff_size(data_size: u64) -> u64 {
    ((CANONICAL_HEADER_SIZE - 8) as u64).saturating_add(data_size)
}

/// The 12 byte `RIFF....WAVE` preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RiffHeader {
    pub chunk_id: [u8; 4],
    pub chunk_size: u32,
    pub riff_type: [u8; 4],
}

impl RiffHeader {
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            chunk_id: fourcc(&bytes[0..4]),
            chunk_size: LittleEndian::read_u32(&bytes[4..8]),
            riff_type: fourcc(&bytes[8..12]),
        }
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.chunk_id);
        LittleEndian::write_u32(&mut out[4..8], self.chunk_size);
        out[8..12].copy_from_slice(&self.riff_type);
        out
    }

    /// Checks the ids and that the declared size covers exactly `file_len` bytes.
    pub fn validate(&self, file_len: u64) -> Result<()> {
        if &self.chunk_id != RIFF_CHUNK_ID {
            return Err(WavError::IncorrectRiffChunkId(self.chunk_id));
        }
        if &self.riff_type != WAVE_FORMAT_ID {
            return Err(WavError::IncorrectRiffTypeId(self.riff_type));
        }
        let declared = u64::from(self.chunk_size);
        if declared + 8 != file_len {
            return Err(WavError::ChunkSizeMismatch {
                declared,
                actual: file_len,
            });
        }
        Ok(())
    }
}

/// Id and payload size of any sub-chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkHeader {
    pub id: [u8; 4],
    pub size: u32,
}

impl ChunkHeader {
    pub fn parse(bytes: &[u8; CHUNK_HEADER_SIZE]) -> Self {
        Self {
            id: fourcc(&bytes[0..4]),
            size: LittleEndian::read_u32(&bytes[4..8]),
        }
    }

    pub fn encode(&self) -> [u8; CHUNK_HEADER_SIZE] {
        let mut out = [0u8; CHUNK_HEADER_SIZE];
        out[0..4].copy_from_slice(&self.id);
        LittleEndian::write_u32(&mut out[4..8], self.size);
        out
    }

    /// Bytes occupied on disk, including the word alignment pad.
    pub fn padded_size(&self) -> u64 {
        let size = u64::from(self.size);
        size + size % 2
    }

    pub fn id_str(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}

/// The 16 byte PCM `fmt ` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FmtChunk {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub valid_bits: u16,
}

impl FmtChunk {
    pub fn from_spec(spec: &WaveSpec) -> Self {
        // WaveSpec::new keeps block align within 16 bits. Byte rate wraps at 32.
        Self {
            format_tag: FORMAT_PCM,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            byte_rate: spec.byte_rate() as u32,
            block_align: spec.block_align() as u16,
            valid_bits: spec.valid_bits,
        }
    }

    pub fn parse(bytes: &[u8; STANDARD_FMT_CHUNK_SIZE as usize]) -> Self {
        Self {
            format_tag: LittleEndian::read_u16(&bytes[0..2]),
            channels: LittleEndian::read_u16(&bytes[2..4]),
            sample_rate: LittleEndian::read_u32(&bytes[4..8]),
            byte_rate: LittleEndian::read_u32(&bytes[8..12]),
            block_align: LittleEndian::read_u16(&bytes[12..14]),
            valid_bits: LittleEndian::read_u16(&bytes[14..16]),
        }
    }

    /// Full chunk including its 8 byte header.
    pub fn encode(&self) -> [u8; FMT_CHUNK_TOTAL] {
        let mut out = [0u8; FMT_CHUNK_TOTAL];
        let header = ChunkHeader {
            id: *FMT_CHUNK_ID,
            size: STANDARD_FMT_CHUNK_SIZE,
        };
        out[0..8].copy_from_slice(&header.encode());
        LittleEndian::write_u16(&mut out[8..10], self.format_tag);
        LittleEndian::write_u16(&mut out[10..12], self.channels);
        LittleEndian::write_u32(&mut out[12..16], self.sample_rate);
        LittleEndian::write_u32(&mut out[16..20], self.byte_rate);
        LittleEndian::write_u16(&mut out[20..22], self.block_align);
        LittleEndian::write_u16(&mut out[22..24], self.valid_bits);
        out
    }

    /// Applies the PCM-only rules and returns the bytes per sample.
    pub fn validate(&self) -> Result<u16> {
        if self.format_tag != FORMAT_PCM {
            return Err(WavError::CompressionNotSupported(self.format_tag));
        }
        if self.channels == 0 {
            return Err(WavError::ZeroChannels);
        }
        if self.block_align == 0 {
            return Err(WavError::ZeroBlockAlign);
        }
        if self.valid_bits < MIN_VALID_BITS {
            return Err(WavError::ValidBitsTooSmall(self.valid_bits));
        }
        if self.valid_bits > MAX_VALID_BITS {
            return Err(WavError::ValidBitsTooLarge(self.valid_bits));
        }

        let bytes_per_sample = self.valid_bits.div_ceil(8);
        let expected = u32::from(bytes_per_sample) * u32::from(self.channels);
        if expected != u32::from(self.block_align) {
            return Err(WavError::BlockAlignMismatch {
                block_align: self.block_align,
                expected,
            });
        }
        Ok(bytes_per_sample)
    }
}

/// The 44 byte canonical header: RIFF preamble, `fmt ` chunk and `data` chunk header.
pub(crate) fn encode_canonical_header(spec: &WaveSpec) -> [u8; CANONICAL_HEADER_SIZE] {
    let riff = RiffHeader {
        chunk_id: *RIFF_CHUNK_ID,
        chunk_size: spec.riff_chunk_size() as u32,
        riff_type: *WAVE_FORMAT_ID,
    };
    let data = ChunkHeader {
        id: *DATA_CHUNK_ID,
        size: spec.data_chunk_size() as u32,
    };

    let mut out = [0u8; CANONICAL_HEADER_SIZE];
    out[0..HEADER_SIZE].copy_from_slice(&riff.encode());
    out[HEADER_SIZE..HEADER_SIZE + FMT_CHUNK_TOTAL]
        .copy_from_slice(&FmtChunk::from_spec(spec).encode());
    out[HEADER_SIZE + FMT_CHUNK_TOTAL..].copy_from_slice(&data.encode());
    out
}

/// Reads until `buf` is full or the source is exhausted, returning the count.
pub(crate) fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn fourcc(bytes: &[u8]) -> [u8; 4] {
    [bytes[0], bytes[1], bytes[2], bytes[3]]
}
