//! Frame-oriented reader/writer for canonical PCM RIFF/WAVE files.
//!
//! A [`WaveFile`] is either created for writing, in which case the complete
//! header is emitted up front from the declared frame count, or opened for
//! reading, in which case the header is validated and the stream positioned
//! at the first sample. Frames then move sequentially as `i16`, `i32`, `i64`
//! or normalized `f64` samples, interleaved or one buffer per channel.

pub mod codecs;
pub mod error;
mod prelude;

pub use codecs::{FloatScale, IoMode, MAX_VALID_BITS, MIN_VALID_BITS, Sample, WaveFile, WaveSpec};
pub use error::{ErrorCategory, Result, WavError};

pub fn debug_println(args: std::fmt::Arguments) {
    if cfg!(debug_assertions) {
        println!("{}", args);
    }
}

// Helper macro to use it like println!
#[macro_export]
macro_rules! dprintln {
    ($($arg:tt)*) => {
        $crate::debug_println(format_args!($($arg)*))
    };
}
