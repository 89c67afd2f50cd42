//! Fixed size byte buffer sitting between per-sample codecs and the file.

use crate::prelude::*;

use super::riff::read_up_to;

pub(crate) const BUFFER_SIZE: usize = 4096;

/// Batches single byte reads or writes into `BUFFER_SIZE` transfers on `inner`.
///
/// Reading: `pos <= filled`, refilled only once `pos == filled`.
/// Writing: `pos <= BUFFER_SIZE`, drained only once `pos == BUFFER_SIZE`
/// (or on [`SampleStream::flush`]).
#[derive(Debug)]
pub(crate) struct SampleStream<T> {
    inner: T,
    buf: Box<[u8]>,
    pos: usize,
    filled: usize,
}

impl<T> SampleStream<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: vec![0u8; BUFFER_SIZE].into_boxed_slice(),
            pos: 0,
            filled: 0,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<R: Read> SampleStream<R> {
    /// Next byte of the stream, refilling from `inner` when exhausted.
    ///
    /// Running out of bytes here means the file is shorter than its header
    /// claims, so it is reported as [`WavError::NotEnoughData`].
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.pos == self.filled {
            let read = read_up_to(&mut self.inner, &mut self.buf)?;
            if read == 0 {
                return Err(WavError::NotEnoughData);
            }
            self.filled = read;
            self.pos = 0;
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        Ok(byte)
    }
}

impl<W: Write> SampleStream<W> {
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.pos == BUFFER_SIZE {
            self.inner.write_all(&self.buf)?;
            self.pos = 0;
        }
        self.buf[self.pos] = byte;
        self.pos += 1;
        Ok(())
    }

    /// Writes out whatever is buffered, returning how many bytes that was.
    pub fn flush(&mut self) -> Result<usize> {
        let flushed = self.pos;
        if flushed > 0 {
            self.inner.write_all(&self.buf[..flushed])?;
            self.pos = 0;
        }
        self.inner.flush()?;
        Ok(flushed)
    }
}
