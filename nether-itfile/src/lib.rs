//! Nether-ITFile: read-only decoder for Impulse Tracker (IT) modules
//!
//! Decodes an IT file into an immutable [`ItFile`]: header, order list, the
//! three pointer tables, instruments (old or new layout), samples with their
//! raw payloads, packed patterns, edit history and extension blocks.
//!
//! # Validation model
//!
//! Offsets in an IT file are chosen by the author and cannot be trusted. The
//! decoder computes a *valid boundary*: the smallest nonzero table pointer (or
//! the song message offset, if lower). Everything below it is header data. The
//! extension-block chain starting at the boundary may push it further up. Any
//! nonzero instrument, sample or pattern pointer found below the boundary in
//! effect at the time it is decoded rejects the whole file.
//!
//! The block chain has no explicit terminator. It ends at a block shorter than
//! its own header, at the `IMPI` instrument marker, or at the first read that
//! fails. A truncated or corrupt chain is therefore indistinguishable from a
//! well-formed end; real files depend on this, so it is kept.
//!
//! # Usage
//!
//! ```ignore
//! use nether_itfile::read_it;
//!
//! let file = std::fs::File::open("song.it").unwrap();
//! let module = read_it(file).unwrap();
//!
//! println!("Song: {}", module.header.name);
//! println!("Patterns: {}", module.patterns.len());
//! ```
//!
//! # Format Reference
//!
//! - Impulse Tracker Technical Specification (ITTECH.TXT)
//! - <https://github.com/schismtracker/schismtracker/wiki/ITTECH.TXT>

mod error;
mod module;
mod options;
mod parapointer;
mod parser;
mod sniff;

pub use error::{ItError, PointerTable};
pub use module::{
    Block, CHANNEL_DISABLED, ChannelData, ChannelDataFlags, ConvertFlags, DuplicateCheckAction,
    DuplicateCheckType, EditDate, EditHistory, EditTime, Envelope, EnvelopeFlags, FullSample,
    Instrument, ItFile, ItFlags, ItNote, ModuleHeader, NewInstrument, NewNoteAction, NodePoint,
    Note, OldInstrument, OldInstrumentFlags, OldNodePoint, PackedPattern, Runtime, SampleFlags,
    SampleHeader, SpecialFlags, decode_cell, fourcc,
};
pub use options::{DEFAULT_MAX_INPUT_LEN, ReadOptions};
pub use parapointer::{ParaPointer, ParaPointer16, ParaPointer24, ParaPointer32};
pub use parser::{
    BlockScan, delta_decode_8, delta_decode_16, parse_it, parse_it_with, read_it, read_it_with,
    scan_blocks, valid_boundary,
};
pub use sniff::{ModVariant, ModuleFormat, sniff};

// =============================================================================
// Constants
// =============================================================================

/// IT format magic string "IMPM"
pub const IT_MAGIC: &[u8; 4] = b"IMPM";

/// Instrument magic string "IMPI", also the end-of-chain marker for blocks
pub const INSTRUMENT_MAGIC: &[u8; 4] = b"IMPI";

/// Sample magic string "IMPS"
pub const SAMPLE_MAGIC: &[u8; 4] = b"IMPS";

/// Compatibility versions below this use the old instrument layout
pub const INSTRUMENT_FORMAT_SPLIT: u16 = 0x0200;

/// Maximum envelope points
pub const MAX_ENVELOPE_POINTS: usize = 25;

/// Rows in the pattern synthesized for a zero pattern pointer
pub const DEFAULT_PATTERN_ROWS: u16 = 64;

// =============================================================================
// Note Constants
// =============================================================================

/// Note value for "note cut" (^^^)
pub const NOTE_CUT: u8 = 254;

/// Note value for "note off" (===)
pub const NOTE_OFF: u8 = 255;

/// Maximum valid note (B-9)
pub const NOTE_MAX: u8 = 119;

// =============================================================================
// Order Constants
// =============================================================================

/// Order value for "skip" (+++)
pub const ORDER_SKIP: u8 = 254;

/// Order value for "end" (---)
pub const ORDER_END: u8 = 255;
