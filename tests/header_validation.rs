use std::path::PathBuf;

use byteorder::{ByteOrder, LittleEndian};
use tempfile::TempDir;
use wavcodex_lib::{ErrorCategory, WavError, WaveFile};

/// Little builder for hand made RIFF files.
struct RiffBuilder {
    riff_id: [u8; 4],
    wave_id: [u8; 4],
    chunks: Vec<u8>,
    size_adjust: i64,
}

impl RiffBuilder {
    fn new() -> Self {
        Self {
            riff_id: *b"RIFF",
            wave_id: *b"WAVE",
            chunks: Vec::new(),
            size_adjust: 0,
        }
    }

    fn chunk(mut self, id: &[u8; 4], payload: &[u8]) -> Self {
        self.chunks.extend_from_slice(id);
        let mut size = [0u8; 4];
        LittleEndian::write_u32(&mut size, payload.len() as u32);
        self.chunks.extend_from_slice(&size);
        self.chunks.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            self.chunks.push(0);
        }
        self
    }

    /// Chunk header declaring `size` with no payload behind it.
    fn bare_header(mut self, id: &[u8; 4], size: u32) -> Self {
        self.chunks.extend_from_slice(id);
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, size);
        self.chunks.extend_from_slice(&bytes);
        self
    }

    fn fmt(self, tag: u16, channels: u16, block_align: u16, bits: u16) -> Self {
        let mut payload = [0u8; 16];
        LittleEndian::write_u16(&mut payload[0..2], tag);
        LittleEndian::write_u16(&mut payload[2..4], channels);
        LittleEndian::write_u32(&mut payload[4..8], 8000);
        LittleEndian::write_u32(&mut payload[8..12], 8000 * u32::from(block_align));
        LittleEndian::write_u16(&mut payload[12..14], block_align);
        LittleEndian::write_u16(&mut payload[14..16], bits);
        self.chunk(b"fmt ", &payload)
    }

    fn pcm16_mono(self) -> Self {
        self.fmt(1, 1, 2, 16)
    }

    fn riff_id(mut self, id: &[u8; 4]) -> Self {
        self.riff_id = *id;
        self
    }

    fn wave_id(mut self, id: &[u8; 4]) -> Self {
        self.wave_id = *id;
        self
    }

    fn size_adjust(mut self, adjust: i64) -> Self {
        self.size_adjust = adjust;
        self
    }

    fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(12 + self.chunks.len());
        out.extend_from_slice(&self.riff_id);
        let size = (4 + self.chunks.len()) as i64 + self.size_adjust;
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, size as u32);
        out.extend_from_slice(&bytes);
        out.extend_from_slice(&self.wave_id);
        out.extend_from_slice(&self.chunks);
        out
    }
}

fn write_file(bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crafted.wav");
    std::fs::write(&path, bytes).unwrap();
    (dir, path)
}

fn open_err(bytes: &[u8]) -> WavError {
    let (_dir, path) = write_file(bytes);
    match WaveFile::open(&path) {
        Ok(_) => panic!("expected open to fail"),
        Err(e) => e,
    }
}

#[test]
fn test_valid_file_with_unknown_chunks() {
    let bytes = RiffBuilder::new()
        .chunk(b"JUNK", &[1, 2, 3])
        .pcm16_mono()
        .chunk(b"LIST", &[0; 10])
        .chunk(b"data", &[0x34, 0x12, 0xFF, 0xFF])
        .chunk(b"id3 ", &[9; 5])
        .build();
    let (_dir, path) = write_file(&bytes);

    let mut wave = WaveFile::open(&path).unwrap();
    assert_eq!(wave.num_frames(), 2);
    let mut read = [0i16; 2];
    assert_eq!(wave.read_frames(&mut read, 4).unwrap(), 2);
    assert_eq!(read, [0x1234, -1]);
}

#[test]
fn test_extended_fmt_chunk_is_skipped_past() {
    let mut payload = vec![0u8; 18];
    LittleEndian::write_u16(&mut payload[0..2], 1);
    LittleEndian::write_u16(&mut payload[2..4], 2);
    LittleEndian::write_u32(&mut payload[4..8], 44100);
    LittleEndian::write_u16(&mut payload[12..14], 6);
    LittleEndian::write_u16(&mut payload[14..16], 24);
    let bytes = RiffBuilder::new()
        .chunk(b"fmt ", &payload)
        .chunk(b"data", &[1, 0, 0, 2, 0, 0])
        .build();
    let (_dir, path) = write_file(&bytes);

    let mut wave = WaveFile::open(&path).unwrap();
    assert_eq!(wave.num_channels(), 2);
    assert_eq!(wave.bytes_per_sample(), 3);
    let mut read = [0i32; 2];
    assert_eq!(wave.read_frames(&mut read, 1).unwrap(), 1);
    assert_eq!(read, [1, 2]);
}

#[test]
fn test_short_header() {
    assert!(matches!(
        open_err(b"RIFF\x04\0\0\0"),
        WavError::NotEnoughHeaderBytes(8)
    ));
    assert!(matches!(open_err(b""), WavError::NotEnoughHeaderBytes(0)));
}

#[test]
fn test_wrong_ids() {
    let rifx = RiffBuilder::new()
        .riff_id(b"RIFX")
        .pcm16_mono()
        .chunk(b"data", &[])
        .build();
    let err = open_err(&rifx);
    assert!(matches!(err, WavError::IncorrectRiffChunkId(id) if &id == b"RIFX"));
    assert_eq!(err.code(), Some(1006));
    assert_eq!(err.category(), ErrorCategory::Header);

    let avi = RiffBuilder::new()
        .wave_id(b"AVI ")
        .pcm16_mono()
        .chunk(b"data", &[])
        .build();
    assert!(matches!(open_err(&avi), WavError::IncorrectRiffTypeId(_)));
}

#[test]
fn test_size_mismatch() {
    let bytes = RiffBuilder::new()
        .pcm16_mono()
        .chunk(b"data", &[0, 0])
        .size_adjust(2)
        .build();
    assert!(matches!(
        open_err(&bytes),
        WavError::ChunkSizeMismatch {
            declared: 40,
            actual: 46
        }
    ));
}

#[test]
fn test_missing_chunks() {
    let empty = RiffBuilder::new().build();
    assert!(matches!(open_err(&empty), WavError::FormatChunkNotFound));

    let only_junk = RiffBuilder::new().chunk(b"JUNK", &[0; 4]).build();
    assert!(matches!(open_err(&only_junk), WavError::FormatChunkNotFound));

    let no_data = RiffBuilder::new().pcm16_mono().build();
    assert!(matches!(open_err(&no_data), WavError::DataChunkNotFound));

    let data_first = RiffBuilder::new()
        .chunk(b"data", &[0, 0])
        .pcm16_mono()
        .build();
    assert!(matches!(open_err(&data_first), WavError::DataBeforeFormat));
}

#[test]
fn test_partial_chunk_header() {
    let mut bytes = RiffBuilder::new().pcm16_mono().build();
    bytes.extend_from_slice(b"dat");
    let size = (bytes.len() - 8) as u32;
    LittleEndian::write_u32(&mut bytes[4..8], size);
    assert!(matches!(open_err(&bytes), WavError::CouldNotReadChunkHeader));
}

#[test]
fn test_fmt_field_rules() {
    let cases: [(RiffBuilder, fn(&WavError) -> bool); 7] = [
        (RiffBuilder::new().fmt(3, 1, 4, 32), |e| {
            matches!(e, WavError::CompressionNotSupported(3))
        }),
        (RiffBuilder::new().fmt(1, 0, 2, 16), |e| {
            matches!(e, WavError::ZeroChannels)
        }),
        (RiffBuilder::new().fmt(1, 1, 0, 16), |e| {
            matches!(e, WavError::ZeroBlockAlign)
        }),
        (RiffBuilder::new().fmt(1, 1, 1, 1), |e| {
            matches!(e, WavError::ValidBitsTooSmall(1))
        }),
        (RiffBuilder::new().fmt(1, 1, 9, 65), |e| {
            matches!(e, WavError::ValidBitsTooLarge(65))
        }),
        (RiffBuilder::new().fmt(1, 2, 2, 16), |e| {
            matches!(
                e,
                WavError::BlockAlignMismatch {
                    block_align: 2,
                    expected: 4
                }
            )
        }),
        (RiffBuilder::new().chunk(b"fmt ", &[1, 0, 1, 0]), |e| {
            matches!(e, WavError::FormatChunkTooShort(4))
        }),
    ];

    for (builder, expected) in cases {
        let bytes = builder.chunk(b"data", &[0; 4]).build();
        let err = open_err(&bytes);
        assert!(expected(&err), "unexpected error: {}", err);
        assert_eq!(err.category(), ErrorCategory::Header);
    }
}

#[test]
fn test_data_not_multiple_of_block_align() {
    let bytes = RiffBuilder::new()
        .fmt(1, 2, 4, 16)
        .chunk(b"data", &[0; 6])
        .build();
    assert!(matches!(
        open_err(&bytes),
        WavError::DataSizeNotMultipleOfBlockAlign {
            size: 6,
            block_align: 4
        }
    ));
}

#[test]
fn test_truncated_payload_fails_mid_read() {
    // Data chunk claims 4 frames but only 2 are present
    let mut bytes = RiffBuilder::new()
        .pcm16_mono()
        .bare_header(b"data", 8)
        .build();
    bytes.extend_from_slice(&[1, 0, 2, 0]);
    let size = (bytes.len() - 8) as u32;
    LittleEndian::write_u32(&mut bytes[4..8], size);
    let (_dir, path) = write_file(&bytes);

    let mut wave = WaveFile::open(&path).unwrap();
    assert_eq!(wave.num_frames(), 4);
    let mut read = [0i16; 4];
    let err = wave.read_frames(&mut read, 4).unwrap_err();
    assert!(matches!(err, WavError::NotEnoughData));
    assert_eq!(err.category(), ErrorCategory::Runtime);
    assert_eq!(&read[..2], &[1, 2]);
    assert_eq!(wave.frames_remaining(), 2);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = WaveFile::open(dir.path().join("absent.wav")).unwrap_err();
    assert!(matches!(err, WavError::Io(_)));
    assert_eq!(err.code(), None);
}
