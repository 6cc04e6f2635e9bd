//! IT envelope structures and flags

use crate::MAX_ENVELOPE_POINTS;

/// Node point of a new-layout envelope (3 bytes on disk)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodePoint {
    /// Magnitude: volume 0..=64, pan/pitch -32..=32
    pub y: i8,
    /// Tick position
    pub tick: u16,
}

/// Node point of an old-layout volume envelope (2 bytes on disk)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OldNodePoint {
    pub tick: u8,
    pub magnitude: u8,
}

impl OldNodePoint {
    /// Old envelopes terminate their node list with a 0xFF tick
    pub fn is_end_marker(&self) -> bool {
        self.tick == 0xFF
    }
}

/// Structured envelope from a new-layout instrument (82 bytes on disk)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Envelope flags
    pub flags: EnvelopeFlags,
    /// Number of node points in use
    pub count: u8,
    /// Loop begin node index
    pub loop_begin: u8,
    /// Loop end node index
    pub loop_end: u8,
    /// Sustain loop begin node index
    pub sustain_begin: u8,
    /// Sustain loop end node index
    pub sustain_end: u8,
    /// All 25 stored node points, including unused trailing slots
    pub nodes: [NodePoint; MAX_ENVELOPE_POINTS],
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            flags: EnvelopeFlags::empty(),
            count: 0,
            loop_begin: 0,
            loop_end: 0,
            sustain_begin: 0,
            sustain_end: 0,
            nodes: [NodePoint::default(); MAX_ENVELOPE_POINTS],
        }
    }
}

impl Envelope {
    /// On-disk size including the trailing reserved byte
    pub const SIZE: usize = 6 + MAX_ENVELOPE_POINTS * 3 + 1;

    /// Node points actually in use
    pub fn points(&self) -> &[NodePoint] {
        let count = (self.count as usize).min(MAX_ENVELOPE_POINTS);
        &self.nodes[..count]
    }

    /// Check if envelope is enabled
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(EnvelopeFlags::ENABLED)
    }

    /// Check if envelope has loop
    pub fn has_loop(&self) -> bool {
        self.flags.contains(EnvelopeFlags::LOOP)
    }

    /// Check if envelope has sustain loop
    pub fn has_sustain(&self) -> bool {
        self.flags.contains(EnvelopeFlags::SUSTAIN_LOOP)
    }

    /// Check if this is a filter envelope (pitch envelope slot only)
    pub fn is_filter(&self) -> bool {
        self.flags.contains(EnvelopeFlags::FILTER)
    }

    /// Loop range as node indices, when the loop is on
    pub fn loop_range(&self) -> Option<(u8, u8)> {
        self.has_loop().then_some((self.loop_begin, self.loop_end))
    }

    /// Sustain loop range as node indices, when the sustain loop is on
    pub fn sustain_range(&self) -> Option<(u8, u8)> {
        self.has_sustain()
            .then_some((self.sustain_begin, self.sustain_end))
    }

    /// Get interpolated envelope value at a given tick
    pub fn value_at(&self, tick: u16) -> i8 {
        let points = self.points();
        let Some(last) = points.last() else {
            return 64;
        };

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if tick >= a.tick && tick < b.tick {
                let dx = (b.tick - a.tick) as f32;
                let dy = b.y as f32 - a.y as f32;
                let t = (tick - a.tick) as f32 / dx;
                return (a.y as f32 + dy * t) as i8;
            }
        }

        if tick < points[0].tick {
            points[0].y
        } else {
            last.y
        }
    }
}

bitflags::bitflags! {
    /// Envelope flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EnvelopeFlags: u8 {
        /// Envelope is enabled
        const ENABLED = 0x01;
        /// Loop is enabled
        const LOOP = 0x02;
        /// Sustain loop is enabled
        const SUSTAIN_LOOP = 0x04;
        /// Carry envelope (continue from previous note)
        const CARRY = 0x08;
        /// Filter envelope (pitch envelope slot only)
        const FILTER = 0x80;
    }
}
