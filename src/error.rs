//! Error types for wavcodex

use thiserror::Error;

use crate::codecs::IoMode;

/// Result type alias for wavcodex operations
pub type Result<T> = std::result::Result<T, WavError>;

/// Broad grouping of [`WavError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected construction parameters, nothing was written.
    Validation,
    /// The file on disk is not a well-formed PCM wave file.
    Header,
    /// Misuse or truncation detected while transferring frames.
    Runtime,
    /// The operating system reported a failure.
    Io,
}

/// Main error type for wavcodex
#[derive(Error, Debug)]
pub enum WavError {
    #[error("Illegal number of channels ({0}), valid range 1 to 65535")]
    IllegalNumberOfChannels(u32),

    #[error("Number of frames must be positive, got {0}")]
    NegativeFrameCount(i64),

    #[error("Illegal number of valid bits ({0}), valid range 2 to 64")]
    IllegalValidBits(u32),

    #[error("Sample rate must be positive and fit in 32 bits, got {0}")]
    SampleRateOutOfRange(i64),

    #[error("Data chunk of {0} bytes does not fit in a RIFF size field")]
    DataChunkTooLarge(u64),

    #[error("Block align of {0} bytes does not fit in 16 bits")]
    BlockAlignTooLarge(u32),

    #[error("Not enough wav file bytes for header ({0} of 12)")]
    NotEnoughHeaderBytes(usize),

    #[error("Invalid wav header data, incorrect riff chunk ID {:?}", String::from_utf8_lossy(.0))]
    IncorrectRiffChunkId([u8; 4]),

    #[error("Invalid wav header data, incorrect riff type ID {:?}", String::from_utf8_lossy(.0))]
    IncorrectRiffTypeId([u8; 4]),

    #[error("Header chunk size ({declared}) does not match file size ({actual})")]
    ChunkSizeMismatch { declared: u64, actual: u64 },

    #[error("Reached end of file without finding format chunk")]
    FormatChunkNotFound,

    #[error("Could not read chunk header")]
    CouldNotReadChunkHeader,

    #[error("Compression code {0} not supported")]
    CompressionNotSupported(u16),

    #[error("Number of channels specified in header is equal to zero")]
    ZeroChannels,

    #[error("Block align specified in header is equal to zero")]
    ZeroBlockAlign,

    #[error("Valid bits specified in header ({0}) is less than 2")]
    ValidBitsTooSmall(u16),

    #[error("Valid bits specified in header ({0}) is greater than 64")]
    ValidBitsTooLarge(u16),

    #[error(
        "Block align ({block_align}) does not agree with bytes required for valid bits and number of channels ({expected})"
    )]
    BlockAlignMismatch { block_align: u16, expected: u32 },

    #[error("Data chunk found before format chunk")]
    DataBeforeFormat,

    #[error("Data chunk size ({size}) is not a multiple of block align ({block_align})")]
    DataSizeNotMultipleOfBlockAlign { size: u32, block_align: u16 },

    #[error("Format chunk is {0} bytes, at least 16 are required")]
    FormatChunkTooShort(u32),

    #[error("Did not find a data chunk")]
    DataChunkNotFound,

    #[error("Not enough data available")]
    NotEnoughData,

    #[error("Cannot use {actual} wave file for {expected}")]
    WrongMode { expected: IoMode, actual: IoMode },

    #[error("Buffer too small: need {need}, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    #[error("Channel {channel} out of range for {channels} channel file")]
    ChannelOutOfRange { channel: usize, channels: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WavError {
    /// Numeric code identifying the failure, `None` for operating-system errors.
    pub fn code(&self) -> Option<u32> {
        let code = match self {
            WavError::IllegalNumberOfChannels(_) => 1001,
            WavError::NegativeFrameCount(_) => 1002,
            WavError::IllegalValidBits(_) => 1003,
            WavError::SampleRateOutOfRange(_) => 1004,
            WavError::NotEnoughHeaderBytes(_) => 1005,
            WavError::IncorrectRiffChunkId(_) => 1006,
            WavError::IncorrectRiffTypeId(_) => 1007,
            WavError::ChunkSizeMismatch { .. } => 1008,
            WavError::FormatChunkNotFound => 1009,
            WavError::DataChunkTooLarge(_) => 1010,
            WavError::BlockAlignTooLarge(_) => 1011,
            WavError::CouldNotReadChunkHeader => 2001,
            WavError::CompressionNotSupported(_) => 2002,
            WavError::ZeroChannels => 2003,
            WavError::ZeroBlockAlign => 2004,
            WavError::ValidBitsTooSmall(_) => 2005,
            WavError::ValidBitsTooLarge(_) => 2006,
            WavError::BlockAlignMismatch { .. } => 2007,
            WavError::DataBeforeFormat => 2008,
            WavError::DataSizeNotMultipleOfBlockAlign { .. } => 2009,
            WavError::FormatChunkTooShort(_) => 2010,
            WavError::DataChunkNotFound => 3001,
            WavError::NotEnoughData => 3002,
            WavError::WrongMode { .. } => 3003,
            WavError::BufferTooSmall { .. } => 3004,
            WavError::ChannelOutOfRange { .. } => 3005,
            WavError::Io(_) => return None,
        };
        Some(code)
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            WavError::IllegalNumberOfChannels(_)
            | WavError::NegativeFrameCount(_)
            | WavError::IllegalValidBits(_)
            | WavError::SampleRateOutOfRange(_)
            | WavError::DataChunkTooLarge(_)
            | WavError::BlockAlignTooLarge(_) => ErrorCategory::Validation,
            WavError::NotEnoughData
            | WavError::WrongMode { .. }
            | WavError::BufferTooSmall { .. }
            | WavError::ChannelOutOfRange { .. } => ErrorCategory::Runtime,
            WavError::Io(_) => ErrorCategory::Io,
            _ => ErrorCategory::Header,
        }
    }
}
