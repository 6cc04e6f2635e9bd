//! Packed IT patterns and cell decoding

use std::fmt;

use crate::error::ItError;
use crate::{DEFAULT_PATTERN_ROWS, NOTE_CUT, NOTE_MAX, NOTE_OFF};

/// Note value from a pattern cell
///
/// 0-119 = C-0 to B-9, 254 = note cut, 255 = note off, anything else = note fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Note(pub u8);

impl Note {
    pub fn is_playable(&self) -> bool {
        self.0 <= NOTE_MAX
    }

    pub fn is_cut(&self) -> bool {
        self.0 == NOTE_CUT
    }

    pub fn is_off(&self) -> bool {
        self.0 == NOTE_OFF
    }

    pub fn is_fade(&self) -> bool {
        !self.is_playable() && !self.is_cut() && !self.is_off()
    }

    /// (octave 0-9, semitone 0-11) for playable notes
    pub fn octave_semitone(&self) -> Option<(u8, u8)> {
        self.is_playable().then_some((self.0 / 12, self.0 % 12))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 12] = [
            "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-",
        ];
        match self.octave_semitone() {
            Some((octave, semitone)) => write!(f, "{}{}", NAMES[semitone as usize], octave),
            None if self.is_cut() => write!(f, "^^^"),
            None if self.is_off() => write!(f, "==="),
            None => write!(f, "~~~"),
        }
    }
}

bitflags::bitflags! {
    /// Presence flags of a single decoded cell
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChannelDataFlags: u8 {
        /// Note byte follows
        const NOTE = 0x01;
        /// Instrument byte follows
        const INSTRUMENT = 0x02;
        /// Volume/pan byte follows
        const VOLUME_PAN = 0x04;
        /// Command and argument bytes follow
        const COMMAND = 0x08;
    }
}

/// One decoded cell from the packed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelData {
    /// Raw flag byte
    pub flags: u8,
    pub note: Option<Note>,
    pub instrument: Option<u8>,
    /// Combined volume column byte (volume, pan or volume effect)
    pub volume_pan: Option<u8>,
    /// Effect command and its argument
    pub command: Option<(u8, u8)>,
}

impl ChannelData {
    /// A zero flag byte terminates the current row
    pub fn is_end_of_row(&self) -> bool {
        self.flags == 0
    }

    pub fn presence(&self) -> ChannelDataFlags {
        ChannelDataFlags::from_bits_truncate(self.flags)
    }
}

/// Fully unpacked cell, as produced by [`PackedPattern::unpack`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItNote {
    /// Note value, `None` when the cell carries no note
    pub note: Option<Note>,
    /// Instrument number (1-99, 0 = none)
    pub instrument: u8,
    /// Volume column (complex encoding, see ITTECH), `None` when absent
    pub volume: Option<u8>,
    /// Effect command (A-Z = 1-26)
    pub effect: u8,
    /// Effect parameter
    pub effect_param: u8,
}

impl ItNote {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A pattern as stored on disk: 8-byte header plus packed cell stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPattern {
    /// Declared length of the packed stream in bytes
    pub length: u16,
    /// Number of rows
    pub rows: u16,
    pub reserved: [u8; 4],
    /// Packed cell stream, exactly `length` bytes
    pub data: Vec<u8>,
}

impl PackedPattern {
    /// Size of the pattern header preceding the packed data
    pub const HEADER_SIZE: usize = 8;

    /// Default pattern used when the pointer is zero: 64 blank rows
    pub fn blank() -> Self {
        Self {
            length: DEFAULT_PATTERN_ROWS,
            rows: DEFAULT_PATTERN_ROWS,
            reserved: [0; 4],
            data: vec![0; DEFAULT_PATTERN_ROWS as usize],
        }
    }

    /// Decode one cell starting at `position` in the packed stream
    ///
    /// Returns the cell and the number of bytes consumed (1-6). Row and length
    /// bookkeeping is left to the caller.
    pub fn decode_cell(&self, position: usize) -> Result<(ChannelData, usize), ItError> {
        decode_cell(&self.data, position)
    }

    /// Walk the IT channel-variable encoding into a `rows x channels` grid
    ///
    /// Uses per-channel mask memory and the "repeat last value" bits. Cells for
    /// channels at or beyond `num_channels` are consumed and dropped. A
    /// truncated stream stops the walk and leaves the remaining rows blank.
    pub fn unpack(&self, num_channels: u8) -> Vec<Vec<ItNote>> {
        let mut notes = vec![vec![ItNote::default(); num_channels as usize]; self.rows as usize];
        let data = self.data.as_slice();

        // Per-channel previous values for pattern compression
        let mut prev_mask = [0u8; 64];
        let mut prev = [ItNote::default(); 64];

        let mut pos = 0;
        let mut row = 0;
        let mut next = || -> Option<u8> {
            let b = data.get(pos).copied();
            pos += 1;
            b
        };

        while row < notes.len() {
            let Some(channel_marker) = next() else { break };

            if channel_marker == 0 {
                row += 1;
                continue;
            }

            let channel = ((channel_marker - 1) & 0x3F) as usize;
            let mask = if channel_marker & 0x80 != 0 {
                let Some(m) = next() else { break };
                prev_mask[channel] = m;
                m
            } else {
                prev_mask[channel]
            };

            let last = &mut prev[channel];
            let mut cell = ItNote::default();

            if mask & 0x01 != 0 {
                let Some(n) = next() else { break };
                last.note = Some(Note(n));
            }
            if mask & 0x11 != 0 {
                cell.note = last.note;
            }

            if mask & 0x02 != 0 {
                let Some(i) = next() else { break };
                last.instrument = i;
            }
            if mask & 0x22 != 0 {
                cell.instrument = last.instrument;
            }

            if mask & 0x04 != 0 {
                let Some(v) = next() else { break };
                last.volume = Some(v);
            }
            if mask & 0x44 != 0 {
                cell.volume = last.volume;
            }

            if mask & 0x08 != 0 {
                let (Some(e), Some(p)) = (next(), next()) else { break };
                last.effect = e;
                last.effect_param = p;
            }
            if mask & 0x88 != 0 {
                cell.effect = last.effect;
                cell.effect_param = last.effect_param;
            }

            if let Some(slot) = notes[row].get_mut(channel) {
                *slot = cell;
            }
        }

        notes
    }
}

/// Decode one flag-prefixed cell from a packed stream
///
/// A zero flag byte ends the row and consumes one byte. Otherwise bits 0-3 of
/// the flag each gate one field, read in order: note, instrument, volume/pan,
/// command + argument.
pub fn decode_cell(data: &[u8], position: usize) -> Result<(ChannelData, usize), ItError> {
    let len = data.len();
    let mut pos = position;
    let mut next = || -> Result<u8, ItError> {
        let b = *data
            .get(pos)
            .ok_or(ItError::OutOfBounds { position: pos, len })?;
        pos += 1;
        Ok(b)
    };

    let flags = next()?;
    let mut cell = ChannelData {
        flags,
        ..Default::default()
    };

    if flags != 0 {
        let presence = ChannelDataFlags::from_bits_truncate(flags);
        if presence.contains(ChannelDataFlags::NOTE) {
            cell.note = Some(Note(next()?));
        }
        if presence.contains(ChannelDataFlags::INSTRUMENT) {
            cell.instrument = Some(next()?);
        }
        if presence.contains(ChannelDataFlags::VOLUME_PAN) {
            cell.volume_pan = Some(next()?);
        }
        if presence.contains(ChannelDataFlags::COMMAND) {
            let command = next()?;
            let argument = next()?;
            cell.command = Some((command, argument));
        }
    }

    Ok((cell, pos - position))
}
