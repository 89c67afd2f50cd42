//! Raw sample codec and int <-> float scaling.

use crate::prelude::*;

use super::buffer::SampleStream;

// Sample widths that store unsigned data
const UNSIGNED_MAX_BITS: u16 = 8;

/// Offset/scale pair for normalized floating point samples.
///
/// Reading maps a raw integer to `offset + raw / scale`, writing maps a value
/// to `(offset + value) * scale` truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatScale {
    pub offset: f64,
    pub scale: f64,
}

impl FloatScale {
    /// Constants used when decoding `valid_bits` wide samples.
    pub fn for_reading(valid_bits: u16) -> Self {
        if valid_bits > UNSIGNED_MAX_BITS {
            Self {
                offset: 0.0,
                scale: (1u64 << (valid_bits - 1)) as f64,
            }
        } else {
            Self {
                offset: -1.0,
                scale: 0.5 * ((1u64 << valid_bits) - 1) as f64,
            }
        }
    }

    /// Constants used when encoding `valid_bits` wide samples.
    ///
    /// Above 8 bits the scale is `2^(valid_bits - 1) - 1`, one less than the
    /// reading scale, so a float write followed by a float read is not bit
    /// identical.
    pub fn for_writing(valid_bits: u16) -> Self {
        if valid_bits > UNSIGNED_MAX_BITS {
            Self {
                offset: 0.0,
                scale: (i64::MAX >> (64 - u32::from(valid_bits))) as f64,
            }
        } else {
            Self {
                offset: 1.0,
                scale: 0.5 * ((1u64 << valid_bits) - 1) as f64,
            }
        }
    }

    /// Smallest distinguishable step between decoded values.
    pub fn step(&self) -> f64 {
        1.0 / self.scale
    }
}

/// A sample type frames can be transferred in.
///
/// Integer types carry the raw value, truncated or widened with no scaling.
/// `f64` applies the file's [`FloatScale`].
pub trait Sample: Copy {
    fn from_raw(raw: i64, scale: &FloatScale) -> Self;
    fn to_raw(self, scale: &FloatScale) -> i64;
}

macro_rules! impl_int_sample {
    ($($ty:ty),*) => {
        $(
            impl Sample for $ty {
                #[inline]
                fn from_raw(raw: i64, _scale: &FloatScale) -> Self {
                    raw as $ty
                }

                #[inline]
                fn to_raw(self, _scale: &FloatScale) -> i64 {
                    self as i64
                }
            }
        )*
    };
}

impl_int_sample!(i16, i32, i64);

impl Sample for f64 {
    #[inline]
    fn from_raw(raw: i64, scale: &FloatScale) -> Self {
        scale.offset + raw as f64 / scale.scale
    }

    #[inline]
    fn to_raw(self, scale: &FloatScale) -> i64 {
        ((scale.offset + self) * scale.scale) as i64
    }
}

impl<R: Read> SampleStream<R> {
    /// Accumulates one little-endian sample of `bytes` bytes.
    ///
    /// Single byte samples are unsigned. Wider samples take their sign from
    /// the most significant byte.
    pub fn read_sample(&mut self, bytes: usize) -> Result<i64> {
        let mut val: i64 = 0;
        for b in 0..bytes {
            let byte = self.read_byte()?;
            let v = if b + 1 < bytes || bytes == 1 {
                i64::from(byte)
            } else {
                i64::from(byte as i8)
            };
            val = val.wrapping_add(v << (b * 8));
        }
        Ok(val)
    }
}

impl<W: Write> SampleStream<W> {
    /// Writes the low `bytes` bytes of `val`, least significant first.
    pub fn write_sample(&mut self, mut val: i64, bytes: usize) -> Result<()> {
        for _ in 0..bytes {
            self.write_byte((val & 0xFF) as u8)?;
            val >>= 8;
        }
        Ok(())
    }
}
