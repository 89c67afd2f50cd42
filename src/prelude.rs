pub use crate::codecs::{IoMode, MAX_VALID_BITS, MIN_VALID_BITS, WaveSpec};
pub use crate::dprintln; // Make the macro available
pub use crate::error::{Result, WavError};
pub use byteorder::{ByteOrder, LittleEndian};
pub use std::io::{Read, Seek, SeekFrom, Write};
