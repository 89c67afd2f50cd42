use std::fmt;

use crate::prelude::*;
mod buffer;
mod riff;
mod sample;
mod wav;
pub use sample::{FloatScale, Sample};
pub use wav::WaveFile;

// Sample size limits
pub const MIN_VALID_BITS: u16 = 2;
pub const MAX_VALID_BITS: u16 = 64;

/// Which direction a [`WaveFile`] currently moves samples in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoMode {
    Reading,
    Writing,
    Closed,
}

impl fmt::Display for IoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IoMode::Reading => "reading",
            IoMode::Writing => "writing",
            IoMode::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Validated stream parameters shared by the reader and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveSpec {
    pub channels: u16,
    pub frames: u64,
    pub valid_bits: u16,
    pub sample_rate: u32,
}

impl WaveSpec {
    /// Checks raw construction parameters, failing before anything touches disk.
    ///
    /// Signed inputs mirror the range checks callers expect: a negative frame
    /// count or sample rate is reported as such rather than wrapping.
    pub fn new(channels: u32, frames: i64, valid_bits: u32, sample_rate: i64) -> Result<Self> {
        let channels = u16::try_from(channels)
            .ok()
            .filter(|&c| c >= 1)
            .ok_or(WavError::IllegalNumberOfChannels(channels))?;
        let frames = u64::try_from(frames).map_err(|_| WavError::NegativeFrameCount(frames))?;
        let valid_bits = u16::try_from(valid_bits)
            .ok()
            .filter(|bits| (MIN_VALID_BITS..=MAX_VALID_BITS).contains(bits))
            .ok_or(WavError::IllegalValidBits(valid_bits))?;
        let sample_rate = u32::try_from(sample_rate)
            .map_err(|_| WavError::SampleRateOutOfRange(sample_rate))?;

        let spec = Self {
            channels,
            frames,
            valid_bits,
            sample_rate,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Re-checks a spec that may have been built field by field.
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(WavError::IllegalNumberOfChannels(0));
        }
        if !(MIN_VALID_BITS..=MAX_VALID_BITS).contains(&self.valid_bits) {
            return Err(WavError::IllegalValidBits(u32::from(self.valid_bits)));
        }
        let block_align = self.block_align();
        if block_align > u32::from(u16::MAX) {
            return Err(WavError::BlockAlignTooLarge(block_align));
        }
        if self.riff_chunk_size() > u64::from(u32::MAX) {
            return Err(WavError::DataChunkTooLarge(self.data_chunk_size()));
        }
        Ok(())
    }

    /// Bytes needed to store one sample, `ceil(valid_bits / 8)`.
    pub fn bytes_per_sample(&self) -> u32 {
        u32::from(self.valid_bits).div_ceil(8)
    }

    /// Bytes used by one frame across all channels.
    pub fn block_align(&self) -> u32 {
        self.bytes_per_sample() * u32::from(self.channels)
    }

    pub fn byte_rate(&self) -> u64 {
        u64::from(self.sample_rate) * u64::from(self.block_align())
    }

    pub fn data_chunk_size(&self) -> u64 {
        u64::from(self.block_align()).saturating_mul(self.frames)
    }

    /// Whether a pad byte must follow the sample payload.
    pub fn needs_pad_byte(&self) -> bool {
        self.data_chunk_size() % 2 == 1
    }

    /// Value of the RIFF size field: everything after the first 8 bytes,
    /// including the pad byte.
    pub(crate) fn riff_chunk_size(&self) -> u64 {
        riff::canonical_riff_size(self.data_chunk_size())
            .saturating_add(u64::from(self.needs_pad_byte()))
    }
}
