//! Error types for IT module decoding

use std::fmt;
use std::io;

use thiserror::Error;

/// Which pointer table an offset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTable {
    Instrument,
    Sample,
    Pattern,
}

impl fmt::Display for PointerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instrument => write!(f, "instrument"),
            Self::Sample => write!(f, "sample"),
            Self::Pattern => write!(f, "pattern"),
        }
    }
}

/// Errors that can occur when decoding IT modules
#[derive(Debug, Error)]
pub enum ItError {
    /// Header magic is not "IMPM"
    #[error("Invalid signature: expected 'IMPM', found {found:02X?}")]
    InvalidSignature { found: [u8; 4] },

    /// A fixed-size read ran past the end of the buffer
    #[error("Unexpected end of data: needed {needed} bytes at offset 0x{offset:08X}, {available} available")]
    StructuralRead {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A nonzero table pointer lies below the current valid boundary
    #[error("Invalid {table} pointer #{index}: 0x{offset:08X} is below the valid boundary 0x{boundary:08X}")]
    InvalidPointer {
        table: PointerTable,
        index: usize,
        offset: usize,
        boundary: usize,
    },

    /// Cell-decode cursor is past the packed pattern data
    #[error("Cell cursor {position} is out of bounds for {len} bytes of packed data")]
    OutOfBounds { position: usize, len: usize },

    /// Input stream exceeds the configured read limit
    #[error("Input too large: {len} bytes (limit {limit})")]
    InputTooLarge { len: usize, limit: usize },

    /// IO error while buffering the input stream
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ItError {
    pub(crate) fn short_read(offset: usize, needed: usize, data_len: usize) -> Self {
        Self::StructuralRead {
            offset,
            needed,
            available: data_len.saturating_sub(offset),
        }
    }
}
