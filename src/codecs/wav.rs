use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::prelude::*;

use super::buffer::SampleStream;
use super::riff::{
    CHUNK_HEADER_SIZE, ChunkHeader, DATA_CHUNK_ID, FMT_CHUNK_ID, FmtChunk, HEADER_SIZE,
    RiffHeader, STANDARD_FMT_CHUNK_SIZE, encode_canonical_header, read_up_to,
};
use super::sample::{FloatScale, Sample};

/// Open handle plus its buffer. Only one direction is ever live.
#[derive(Debug)]
enum IoState {
    Reading(SampleStream<File>),
    Writing(SampleStream<File>),
    Closed,
}

/// A PCM wave file opened for sequential frame reads or created for
/// sequential frame writes.
///
/// Every transfer clamps to the frames left in the file and returns how many
/// frames actually moved, so `0` marks the end of the stream. Channel `c` of
/// frame `f` lives at `offset + f * channels + c` in interleaved buffers and
/// at `bufs[c][offset + f]` in planar ones.
#[derive(Debug)]
pub struct WaveFile {
    path: PathBuf,
    state: IoState,
    spec: WaveSpec,
    bytes_per_sample: usize,
    frame_counter: u64,
    word_align_adjust: bool,
    float_scale: FloatScale,
}

impl WaveFile {
    /// Creates `path` and writes the complete header immediately.
    ///
    /// `num_frames` is final: the header sizes are derived from it and later
    /// writes clamp to it.
    pub fn create<P: AsRef<Path>>(
        path: P,
        num_channels: u32,
        num_frames: i64,
        valid_bits: u32,
        sample_rate: i64,
    ) -> Result<Self> {
        let spec = WaveSpec::new(num_channels, num_frames, valid_bits, sample_rate)?;
        Self::create_with_spec(path, spec)
    }

    /// Same as [`WaveFile::create`] for an already assembled spec, which is
    /// validated again before the file is created.
    pub fn create_with_spec<P: AsRef<Path>>(path: P, spec: WaveSpec) -> Result<Self> {
        spec.validate()?;
        let path = path.as_ref().to_path_buf();
        let header = encode_canonical_header(&spec);

        let mut file = File::create(&path)?;
        file.write_all(&header)?;

        dprintln!(
            "Created {}: {} channels, {} frames, {} bits @ {} Hz, data chunk {} bytes",
            path.display(),
            spec.channels,
            spec.frames,
            spec.valid_bits,
            spec.sample_rate,
            spec.data_chunk_size()
        );

        Ok(Self {
            path,
            state: IoState::Writing(SampleStream::new(file)),
            bytes_per_sample: spec.bytes_per_sample() as usize,
            word_align_adjust: spec.needs_pad_byte(),
            float_scale: FloatScale::for_writing(spec.valid_bits),
            frame_counter: 0,
            spec,
        })
    }

    /// Opens `path`, validates its header and positions at the first sample.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;
        let file_len = file.metadata()?.len();

        let mut riff_bytes = [0u8; HEADER_SIZE];
        let read = read_up_to(&mut file, &mut riff_bytes)?;
        if read != HEADER_SIZE {
            return Err(WavError::NotEnoughHeaderBytes(read));
        }
        RiffHeader::parse(&riff_bytes).validate(file_len)?;

        let mut format: Option<(FmtChunk, u16)> = None;
        let (fmt, bytes_per_sample, num_frames) = loop {
            let mut chunk_bytes = [0u8; CHUNK_HEADER_SIZE];
            match read_up_to(&mut file, &mut chunk_bytes)? {
                CHUNK_HEADER_SIZE => {}
                0 if format.is_none() => return Err(WavError::FormatChunkNotFound),
                0 => return Err(WavError::DataChunkNotFound),
                _ => return Err(WavError::CouldNotReadChunkHeader),
            }
            let chunk = ChunkHeader::parse(&chunk_bytes);

            match &chunk.id {
                FMT_CHUNK_ID => {
                    if chunk.size < STANDARD_FMT_CHUNK_SIZE {
                        return Err(WavError::FormatChunkTooShort(chunk.size));
                    }
                    let mut payload = [0u8; STANDARD_FMT_CHUNK_SIZE as usize];
                    if read_up_to(&mut file, &mut payload)? != payload.len() {
                        return Err(WavError::CouldNotReadChunkHeader);
                    }
                    let fmt = FmtChunk::parse(&payload);
                    let bytes_per_sample = fmt.validate()?;

                    // Skip any extension bytes plus padding
                    let extra = chunk.padded_size() - u64::from(STANDARD_FMT_CHUNK_SIZE);
                    if extra > 0 {
                        file.seek(SeekFrom::Current(extra as i64))?;
                    }
                    format = Some((fmt, bytes_per_sample));
                }
                DATA_CHUNK_ID => {
                    let Some((fmt, bytes_per_sample)) = format else {
                        return Err(WavError::DataBeforeFormat);
                    };
                    if chunk.size % u32::from(fmt.block_align) != 0 {
                        return Err(WavError::DataSizeNotMultipleOfBlockAlign {
                            size: chunk.size,
                            block_align: fmt.block_align,
                        });
                    }
                    break (
                        fmt,
                        bytes_per_sample,
                        chunk.size / u32::from(fmt.block_align),
                    );
                }
                _ => {
                    dprintln!(
                        "Skipping '{}' chunk ({} bytes)",
                        chunk.id_str(),
                        chunk.size
                    );
                    file.seek(SeekFrom::Current(chunk.padded_size() as i64))?;
                }
            }
        };

        let spec = WaveSpec {
            channels: fmt.channels,
            frames: u64::from(num_frames),
            valid_bits: fmt.valid_bits,
            sample_rate: fmt.sample_rate,
        };

        dprintln!(
            "Opened {}: {} channels, {} frames, {} bits @ {} Hz",
            path.display(),
            spec.channels,
            spec.frames,
            spec.valid_bits,
            spec.sample_rate
        );

        Ok(Self {
            path,
            state: IoState::Reading(SampleStream::new(file)),
            spec,
            bytes_per_sample: usize::from(bytes_per_sample),
            frame_counter: 0,
            word_align_adjust: false,
            float_scale: FloatScale::for_reading(fmt.valid_bits),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn spec(&self) -> WaveSpec {
        self.spec
    }

    pub fn num_channels(&self) -> u16 {
        self.spec.channels
    }

    pub fn num_frames(&self) -> u64 {
        self.spec.frames
    }

    pub fn frames_remaining(&self) -> u64 {
        self.spec.frames - self.frame_counter
    }

    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    pub fn valid_bits(&self) -> u16 {
        self.spec.valid_bits
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bytes_per_sample
    }

    pub fn block_align(&self) -> u32 {
        self.spec.block_align()
    }

    pub fn float_scale(&self) -> FloatScale {
        self.float_scale
    }

    pub fn mode(&self) -> IoMode {
        match self.state {
            IoState::Reading(_) => IoMode::Reading,
            IoState::Writing(_) => IoMode::Writing,
            IoState::Closed => IoMode::Closed,
        }
    }

    // ---- reading ----

    /// Reads up to `frames` interleaved frames into the start of `buf`.
    pub fn read_frames<T: Sample>(&mut self, buf: &mut [T], frames: usize) -> Result<usize> {
        self.read_frames_at(buf, 0, frames)
    }

    pub fn read_frames_at<T: Sample>(
        &mut self,
        buf: &mut [T],
        offset: usize,
        frames: usize,
    ) -> Result<usize> {
        let count = self.clamp(IoMode::Reading, frames)?;
        let channels = usize::from(self.spec.channels);
        check_len(buf.len(), offset, count.checked_mul(channels))?;

        let scale = self.float_scale;
        self.read_with(count, |f, c, raw| {
            buf[offset + f * channels + c] = T::from_raw(raw, &scale);
        })
    }

    /// Reads up to `frames` frames into one buffer per channel.
    pub fn read_planar<T: Sample, B: AsMut<[T]>>(
        &mut self,
        bufs: &mut [B],
        frames: usize,
    ) -> Result<usize> {
        self.read_planar_at(bufs, 0, frames)
    }

    pub fn read_planar_at<T: Sample, B: AsMut<[T]>>(
        &mut self,
        bufs: &mut [B],
        offset: usize,
        frames: usize,
    ) -> Result<usize> {
        let count = self.clamp(IoMode::Reading, frames)?;
        check_len(bufs.len(), 0, Some(usize::from(self.spec.channels)))?;
        for buf in bufs.iter_mut() {
            check_len(buf.as_mut().len(), offset, Some(count))?;
        }

        let scale = self.float_scale;
        self.read_with(count, |f, c, raw| {
            bufs[c].as_mut()[offset + f] = T::from_raw(raw, &scale);
        })
    }

    /// Reads up to `frames` frames, keeping only `channel`.
    ///
    /// The other channels are still consumed so the stream stays frame aligned.
    pub fn read_channel<T: Sample>(
        &mut self,
        buf: &mut [T],
        frames: usize,
        channel: usize,
    ) -> Result<usize> {
        self.read_channel_at(buf, 0, frames, channel)
    }

    pub fn read_channel_at<T: Sample>(
        &mut self,
        buf: &mut [T],
        offset: usize,
        frames: usize,
        channel: usize,
    ) -> Result<usize> {
        let count = self.clamp(IoMode::Reading, frames)?;
        if channel >= usize::from(self.spec.channels) {
            return Err(WavError::ChannelOutOfRange {
                channel,
                channels: self.spec.channels,
            });
        }
        check_len(buf.len(), offset, Some(count))?;

        let scale = self.float_scale;
        self.read_with(count, |f, c, raw| {
            if c == channel {
                buf[offset + f] = T::from_raw(raw, &scale);
            }
        })
    }

    // ---- writing ----

    /// Writes up to `frames` interleaved frames from the start of `buf`.
    pub fn write_frames<T: Sample>(&mut self, buf: &[T], frames: usize) -> Result<usize> {
        self.write_frames_at(buf, 0, frames)
    }

    pub fn write_frames_at<T: Sample>(
        &mut self,
        buf: &[T],
        offset: usize,
        frames: usize,
    ) -> Result<usize> {
        let count = self.clamp(IoMode::Writing, frames)?;
        let channels = usize::from(self.spec.channels);
        check_len(buf.len(), offset, count.checked_mul(channels))?;

        let scale = self.float_scale;
        self.write_with(count, |f, c| buf[offset + f * channels + c].to_raw(&scale))
    }

    /// Writes up to `frames` frames from one buffer per channel.
    pub fn write_planar<T: Sample, B: AsRef<[T]>>(
        &mut self,
        bufs: &[B],
        frames: usize,
    ) -> Result<usize> {
        self.write_planar_at(bufs, 0, frames)
    }

    pub fn write_planar_at<T: Sample, B: AsRef<[T]>>(
        &mut self,
        bufs: &[B],
        offset: usize,
        frames: usize,
    ) -> Result<usize> {
        let count = self.clamp(IoMode::Writing, frames)?;
        check_len(bufs.len(), 0, Some(usize::from(self.spec.channels)))?;
        for buf in bufs {
            check_len(buf.as_ref().len(), offset, Some(count))?;
        }

        let scale = self.float_scale;
        self.write_with(count, |f, c| bufs[c].as_ref()[offset + f].to_raw(&scale))
    }

    /// Flushes buffered samples, appends the pad byte if the data size is
    /// odd and releases the file. Calling it again does nothing.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, IoState::Closed) {
            IoState::Reading(_) => {
                dprintln!(
                    "Closed {} after reading {} of {} frames",
                    self.path.display(),
                    self.frame_counter,
                    self.spec.frames
                );
            }
            IoState::Writing(mut stream) => {
                if self.word_align_adjust {
                    stream.write_byte(0)?;
                }
                let flushed = stream.flush()?;
                dprintln!(
                    "Closed {} after writing {} of {} frames ({} bytes flushed, pad byte: {})",
                    self.path.display(),
                    self.frame_counter,
                    self.spec.frames,
                    flushed,
                    self.word_align_adjust
                );
            }
            IoState::Closed => {}
        }
        Ok(())
    }

    // Mode check plus the remaining-frames clamp shared by every transfer.
    fn clamp(&self, expected: IoMode, frames: usize) -> Result<usize> {
        let actual = self.mode();
        if actual != expected {
            return Err(WavError::WrongMode { expected, actual });
        }
        let remaining = self.frames_remaining();
        Ok(usize::try_from(remaining).map_or(frames, |r| frames.min(r)))
    }

    fn read_with<F>(&mut self, count: usize, mut store: F) -> Result<usize>
    where
        F: FnMut(usize, usize, i64),
    {
        let actual = self.mode();
        let channels = usize::from(self.spec.channels);
        let bytes = self.bytes_per_sample;
        let IoState::Reading(stream) = &mut self.state else {
            return Err(WavError::WrongMode {
                expected: IoMode::Reading,
                actual,
            });
        };

        for f in 0..count {
            for c in 0..channels {
                store(f, c, stream.read_sample(bytes)?);
            }
            self.frame_counter += 1;
        }
        Ok(count)
    }

    fn write_with<F>(&mut self, count: usize, mut fetch: F) -> Result<usize>
    where
        F: FnMut(usize, usize) -> i64,
    {
        let actual = self.mode();
        let channels = usize::from(self.spec.channels);
        let bytes = self.bytes_per_sample;
        let IoState::Writing(stream) = &mut self.state else {
            return Err(WavError::WrongMode {
                expected: IoMode::Writing,
                actual,
            });
        };

        for f in 0..count {
            for c in 0..channels {
                stream.write_sample(fetch(f, c), bytes)?;
            }
            self.frame_counter += 1;
        }
        Ok(count)
    }
}

impl Drop for WaveFile {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            dprintln!("Failed to close {}: {}", self.path.display(), e);
        }
    }
}

impl fmt::Display for WaveFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.path.display())?;
        writeln!(
            f,
            "Channels: {}, Frames: {}",
            self.spec.channels, self.spec.frames
        )?;
        writeln!(f, "IO State: {}", self.mode())?;
        writeln!(
            f,
            "Sample Rate: {}, Block Align: {}",
            self.spec.sample_rate,
            self.spec.block_align()
        )?;
        write!(
            f,
            "Valid Bits: {}, Bytes per sample: {}",
            self.spec.valid_bits, self.bytes_per_sample
        )
    }
}

// `len` elements starting at `offset` must fit in `have`. Sizes that
// overflow `usize` can never fit and report `need` as `usize::MAX`.
fn check_len(have: usize, offset: usize, len: Option<usize>) -> Result<()> {
    let need = len
        .and_then(|len| offset.checked_add(len))
        .unwrap_or(usize::MAX);
    if have < need {
        return Err(WavError::BufferTooSmall { need, have });
    }
    Ok(())
}
