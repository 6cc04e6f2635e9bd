//! IT instrument structures and enums
//!
//! Two on-disk layouts exist, both 554 bytes long. Files whose compatibility
//! version is below 2.00 store the old layout with a single byte-sampled volume
//! envelope; later files store three structured envelopes.

use super::{Envelope, OldNodePoint};

/// New Note Action - what happens when a new note is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum NewNoteAction {
    /// Cut the previous note immediately
    #[default]
    Cut = 0,
    /// Continue playing the previous note in background
    Continue = 1,
    /// Release the previous note (key-off)
    NoteOff = 2,
    /// Fade out the previous note
    NoteFade = 3,
}

impl NewNoteAction {
    pub fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::Continue,
            2 => Self::NoteOff,
            3 => Self::NoteFade,
            _ => Self::Cut,
        }
    }
}

/// Duplicate Check Type - when to check for duplicate notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DuplicateCheckType {
    /// No duplicate checking
    #[default]
    Off = 0,
    /// Check for same note
    Note = 1,
    /// Check for same sample
    Sample = 2,
    /// Check for same instrument
    Instrument = 3,
}

impl DuplicateCheckType {
    pub fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::Note,
            2 => Self::Sample,
            3 => Self::Instrument,
            _ => Self::Off,
        }
    }
}

/// Duplicate Check Action - what to do with duplicate notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DuplicateCheckAction {
    /// Cut the duplicate note
    #[default]
    Cut = 0,
    /// Release the duplicate note (key-off)
    NoteOff = 1,
    /// Fade out the duplicate note
    NoteFade = 2,
}

impl DuplicateCheckAction {
    pub fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::NoteOff,
            2 => Self::NoteFade,
            _ => Self::Cut,
        }
    }
}

bitflags::bitflags! {
    /// Flags of an old-layout instrument
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OldInstrumentFlags: u8 {
        /// Use volume envelope
        const VOLUME_ENVELOPE = 0x01;
        /// Use volume loop
        const VOLUME_LOOP = 0x02;
        /// Use sustain volume loop
        const SUSTAIN_LOOP = 0x04;
    }
}

/// Instrument stored in the pre-2.00 layout
#[derive(Debug, Clone)]
pub struct OldInstrument {
    /// Magic bytes, "IMPI" in well-formed files
    pub magic: [u8; 4],
    /// DOS filename (max 12 chars)
    pub filename: String,
    pub flags: OldInstrumentFlags,
    /// Volume loop start/end, as envelope node indices
    pub volume_loop: (u8, u8),
    /// Sustain loop start/end, as envelope node indices
    pub sustain_loop: (u8, u8),
    /// Fadeout (0-64)
    pub fadeout: u16,
    pub nna: NewNoteAction,
    /// Duplicate note check on/off
    pub duplicate_note_check: bool,
    /// Tracker version (instrument files only)
    pub tracker_version: u16,
    /// Number of samples (instrument files only)
    pub sample_count: u8,
    /// Instrument name (max 26 chars)
    pub name: String,
    /// Note-Sample-Keyboard table: (note_to_play, sample_number)
    pub note_sample_table: [(u8, u8); 120],
    /// Precalculated volume envelope, one byte per tick
    pub volume_envelope: [u8; 200],
    /// Volume envelope node points
    pub node_points: [OldNodePoint; 25],
}

impl OldInstrument {
    /// Node points before the 0xFF end marker
    pub fn active_nodes(&self) -> &[OldNodePoint] {
        let end = self
            .node_points
            .iter()
            .position(OldNodePoint::is_end_marker)
            .unwrap_or(self.node_points.len());
        &self.node_points[..end]
    }
}

/// Instrument stored in the 2.00+ layout
#[derive(Debug, Clone)]
pub struct NewInstrument {
    /// Magic bytes, "IMPI" in well-formed files
    pub magic: [u8; 4],
    /// DOS filename (max 12 chars)
    pub filename: String,
    pub nna: NewNoteAction,
    pub dct: DuplicateCheckType,
    pub dca: DuplicateCheckAction,
    /// Fadeout value (0-1024)
    pub fadeout: u16,
    /// Pitch-Pan Separation (-32 to +32)
    pub pitch_pan_separation: i8,
    /// Pitch-Pan Center note (0-119)
    pub pitch_pan_center: u8,
    /// Global volume (0-128)
    pub global_volume: u8,
    /// Default panning (0-64), None if not enabled
    pub default_pan: Option<u8>,
    /// Random volume variation (0-100%)
    pub random_volume: u8,
    /// Random panning variation (0-64)
    pub random_pan: u8,
    /// Tracker version (instrument files only)
    pub tracker_version: u16,
    /// Number of samples (instrument files only)
    pub sample_count: u8,
    /// Instrument name (max 26 chars)
    pub name: String,
    /// Initial filter cutoff (0-127), None if not set
    pub filter_cutoff: Option<u8>,
    /// Initial filter resonance (0-127), None if not set
    pub filter_resonance: Option<u8>,
    /// MIDI channel (0-16, 0 = disabled)
    pub midi_channel: u8,
    /// MIDI program (0-127)
    pub midi_program: u8,
    /// MIDI bank (0-16383)
    pub midi_bank: u16,
    /// Note-Sample-Keyboard table: (note_to_play, sample_number)
    pub note_sample_table: [(u8, u8); 120],
    pub volume_envelope: Envelope,
    pub panning_envelope: Envelope,
    /// Pitch envelope, or filter envelope when its FILTER flag is set
    pub pitch_envelope: Envelope,
}

/// A decoded instrument in whichever layout the file uses
#[derive(Debug, Clone)]
pub enum Instrument {
    Old(Box<OldInstrument>),
    New(Box<NewInstrument>),
}

impl Instrument {
    /// On-disk size of either layout
    pub const SIZE: usize = 554;

    pub fn name(&self) -> &str {
        match self {
            Self::Old(inst) => &inst.name,
            Self::New(inst) => &inst.name,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            Self::Old(inst) => &inst.filename,
            Self::New(inst) => &inst.filename,
        }
    }

    pub fn fadeout(&self) -> u16 {
        match self {
            Self::Old(inst) => inst.fadeout,
            Self::New(inst) => inst.fadeout,
        }
    }

    pub fn nna(&self) -> NewNoteAction {
        match self {
            Self::Old(inst) => inst.nna,
            Self::New(inst) => inst.nna,
        }
    }

    /// Check the record's magic against "IMPI"
    pub fn has_valid_magic(&self) -> bool {
        let magic = match self {
            Self::Old(inst) => &inst.magic,
            Self::New(inst) => &inst.magic,
        };
        magic == crate::INSTRUMENT_MAGIC
    }

    pub fn note_sample_table(&self) -> &[(u8, u8); 120] {
        match self {
            Self::Old(inst) => &inst.note_sample_table,
            Self::New(inst) => &inst.note_sample_table,
        }
    }

    /// Is the volume envelope switched on
    pub fn volume_envelope_enabled(&self) -> bool {
        match self {
            Self::Old(inst) => inst.flags.contains(OldInstrumentFlags::VOLUME_ENVELOPE),
            Self::New(inst) => inst.volume_envelope.is_enabled(),
        }
    }

    /// Get the sample number for a given note
    pub fn sample_for_note(&self, note: u8) -> Option<u8> {
        let (_, sample) = *self.note_sample_table().get(note as usize)?;
        (sample > 0).then_some(sample)
    }

    /// Get the transposed note for a given input note
    pub fn note_for_input(&self, note: u8) -> u8 {
        self.note_sample_table()
            .get(note as usize)
            .map_or(note, |&(mapped, _)| mapped)
    }
}
