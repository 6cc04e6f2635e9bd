//! IT module data structures

mod block;
mod envelope;
mod header;
mod history;
mod instrument;
mod pattern;
mod sample;

pub use block::{Block, fourcc};
pub use envelope::{Envelope, EnvelopeFlags, NodePoint, OldNodePoint};
pub use header::{CHANNEL_DISABLED, ModuleHeader};
pub(crate) use header::enabled_channels;
pub use history::{EditDate, EditHistory, EditTime, Runtime};
pub use instrument::{
    DuplicateCheckAction, DuplicateCheckType, Instrument, NewInstrument, NewNoteAction,
    OldInstrument, OldInstrumentFlags,
};
pub use pattern::{ChannelData, ChannelDataFlags, ItNote, Note, PackedPattern, decode_cell};
pub use sample::{ConvertFlags, FullSample, SampleFlags, SampleHeader};

use crate::parapointer::ParaPointer32;

/// A fully decoded IT file
///
/// Built by a single pass of [`crate::parse_it`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ItFile {
    /// Module header
    pub header: ModuleHeader,
    /// Pattern order list (254 = skip, 255 = end)
    pub orders: Vec<u8>,
    /// Instrument pointer table, `header.instrument_count` entries
    pub instrument_pointers: Vec<ParaPointer32>,
    /// Sample pointer table, `header.sample_count` entries
    pub sample_pointers: Vec<ParaPointer32>,
    /// Pattern pointer table, `header.pattern_count` entries
    pub pattern_pointers: Vec<ParaPointer32>,
    /// Instruments in pointer-table order, `None` where the pointer was zero
    pub instruments: Vec<Option<Instrument>>,
    /// Samples in pointer-table order, `None` where the pointer was zero
    pub samples: Vec<Option<FullSample>>,
    /// Patterns in pointer-table order; zero pointers yield the blank default
    pub patterns: Vec<PackedPattern>,
    /// Edit history records
    pub edit_history: Vec<EditHistory>,
    /// Extension blocks found between the tables and the first payload
    pub blocks: Vec<Block>,
    /// Song message, when attached and in range
    pub message: Option<String>,
    /// Final valid boundary after the block scan
    pub boundary: usize,
}

impl ItFile {
    /// Get the pattern at the given order position
    pub fn pattern_at_order(&self, order: usize) -> Option<&PackedPattern> {
        let pattern_idx = *self.orders.get(order)? as usize;
        if pattern_idx >= crate::ORDER_SKIP as usize {
            return None; // Skip or end marker
        }
        self.patterns.get(pattern_idx)
    }

    /// Number of playable orders before the end marker
    pub fn total_orders(&self) -> usize {
        self.orders
            .iter()
            .take_while(|&&o| o != crate::ORDER_END)
            .filter(|&&o| o != crate::ORDER_SKIP)
            .count()
    }

    /// Pattern names from a `PNAM` block, if present
    pub fn pattern_names(&self) -> Option<&[String]> {
        self.blocks.iter().find_map(|b| match b {
            Block::PatternNames { names, .. } => Some(names.as_slice()),
            _ => None,
        })
    }

    /// Channel names from a `CNAM` block, if present
    pub fn channel_names(&self) -> Option<&[String]> {
        self.blocks.iter().find_map(|b| match b {
            Block::ChannelNames { names, .. } => Some(names.as_slice()),
            _ => None,
        })
    }

    /// Check if the module uses instruments (vs samples-only mode)
    pub fn uses_instruments(&self) -> bool {
        self.header.flags.contains(ItFlags::INSTRUMENTS)
    }
}

bitflags::bitflags! {
    /// IT module flags (header offset 0x2C)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ItFlags: u16 {
        /// Stereo output
        const STEREO = 0x0001;
        /// Vol0MixOptimizations - skip mixing silent channels
        const VOL0_MIX_OPT = 0x0002;
        /// Use instruments (vs samples-only mode)
        const INSTRUMENTS = 0x0004;
        /// Use linear slides (vs Amiga slides)
        const LINEAR_SLIDES = 0x0008;
        /// Use old effects (S3M compatibility)
        const OLD_EFFECTS = 0x0010;
        /// Link G memory with E/F for portamento
        const LINK_G_MEMORY = 0x0020;
        /// Use MIDI pitch controller
        const MIDI_PITCH_CTRL = 0x0040;
        /// Request embedded MIDI configuration
        const EMBEDDED_MIDI = 0x0080;
    }
}

bitflags::bitflags! {
    /// IT special flags (header offset 0x2E)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SpecialFlags: u16 {
        /// Song message attached
        const MESSAGE_ATTACHED = 0x0001;
        /// Edit history follows the pattern pointer table
        const HISTORY_INCLUDED = 0x0002;
        /// MIDI configuration embedded
        const MIDI_CONFIG_EMBEDDED = 0x0008;
    }
}
