//! Para-pointers: offsets into the module buffer
//!
//! IT stores three pointer encodings:
//! - 16-bit paragraphs: `offset = value * 16`
//! - 24-bit paragraphs (high byte + 16-bit low word): `offset = ((hi << 16) | lo) * 16`
//! - 32-bit absolute offsets (instrument/sample/pattern tables, sample payloads)
//!
//! A raw value of zero always means "absent", never "offset zero". The only way
//! to get at bytes is [`ParaPointer::resolve`], which checks the requested span
//! against the buffer length.

use std::ops::Range;

use crate::error::ItError;

/// Common behaviour of every pointer encoding
pub trait ParaPointer: Copy {
    /// Absolute byte offset this pointer refers to
    fn offset(&self) -> usize;

    /// Raw zero marks an absent entry
    fn is_null(&self) -> bool;

    /// Resolve `len` bytes at this pointer against a buffer of `data_len` bytes
    fn resolve(&self, len: usize, data_len: usize) -> Result<Range<usize>, ItError> {
        let start = self.offset();
        match start.checked_add(len) {
            Some(end) if end <= data_len => Ok(start..end),
            _ => Err(ItError::short_read(start, len, data_len)),
        }
    }

    /// Bytes from this pointer to the end of the buffer
    fn resolve_tail(&self, data_len: usize) -> Result<Range<usize>, ItError> {
        let start = self.offset();
        if start > data_len {
            return Err(ItError::short_read(start, 0, data_len));
        }
        Ok(start..data_len)
    }
}

/// 16-bit paragraph pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ParaPointer16(pub u16);

impl ParaPointer for ParaPointer16 {
    fn offset(&self) -> usize {
        (self.0 as usize) << 4
    }

    fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// 24-bit paragraph pointer, stored as a high byte followed by a 16-bit low word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParaPointer24 {
    pub hi: u8,
    pub lo: ParaPointer16,
}

impl ParaPointer24 {
    pub const fn new(hi: u8, lo: u16) -> Self {
        Self {
            hi,
            lo: ParaPointer16(lo),
        }
    }
}

impl ParaPointer for ParaPointer24 {
    fn offset(&self) -> usize {
        (((self.hi as usize) << 16) | self.lo.0 as usize) << 4
    }

    fn is_null(&self) -> bool {
        self.hi == 0 && self.lo.is_null()
    }
}

/// 32-bit absolute pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ParaPointer32(pub u32);

impl ParaPointer for ParaPointer32 {
    fn offset(&self) -> usize {
        self.0 as usize
    }

    fn is_null(&self) -> bool {
        self.0 == 0
    }
}
