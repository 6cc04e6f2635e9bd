//! IT module header (IMPM block)

use super::ItFlags;
use super::SpecialFlags;

/// Fixed-size module header, everything before the order list
#[derive(Debug, Clone)]
pub struct ModuleHeader {
    /// Signature bytes, "IMPM" for a valid file
    pub magic: [u8; 4],
    /// Song name (max 26 chars)
    pub name: String,
    /// Pattern row highlight (minor, major)
    pub highlight: (u8, u8),
    /// Number of entries in the order list
    pub order_count: u16,
    /// Number of instrument pointers
    pub instrument_count: u16,
    /// Number of sample pointers
    pub sample_count: u16,
    /// Number of pattern pointers
    pub pattern_count: u16,
    /// Created with tracker version (Cwt/v)
    pub created_with: u16,
    /// Compatible with version (Cmwt), selects the instrument layout
    pub compatible_with: u16,
    /// Module flags
    pub flags: ItFlags,
    /// Special flags
    pub special: SpecialFlags,
    /// Global volume (0-128)
    pub global_volume: u8,
    /// Mix volume (0-128)
    pub mix_volume: u8,
    /// Initial speed (ticks per row)
    pub initial_speed: u8,
    /// Initial tempo (BPM)
    pub initial_tempo: u8,
    /// Panning separation (0-128)
    pub panning_separation: u8,
    /// Pitch wheel depth for MIDI
    pub pitch_wheel_depth: u8,
    /// Song message length in bytes
    pub message_length: u16,
    /// Absolute offset of the song message
    pub message_offset: u32,
    /// Reserved dword at 0x3C
    pub reserved: u32,
    /// Per-channel default panning, +128 = channel disabled
    pub channel_pan: [u8; 64],
    /// Per-channel default volume (0-64)
    pub channel_vol: [u8; 64],
}

impl ModuleHeader {
    /// Size of the header on disk; the order list follows immediately
    pub const SIZE: usize = 0xC0;

    /// Check the signature against "IMPM"
    pub fn has_valid_magic(&self) -> bool {
        &self.magic == crate::IT_MAGIC
    }

    /// Number of channels whose pan byte does not have the disabled bit set
    pub fn active_channels(&self) -> u8 {
        enabled_channels(&self.channel_pan)
    }

    /// Grid width needed to hold every enabled channel
    ///
    /// Disabled channels below the last enabled one still carry pattern data,
    /// so this is the highest enabled index + 1 rather than the count.
    pub fn pattern_channels(&self) -> u8 {
        channel_span(&self.channel_pan)
    }

    /// Does the compatibility version select the old instrument layout
    pub fn uses_old_instruments(&self) -> bool {
        self.compatible_with < crate::INSTRUMENT_FORMAT_SPLIT
    }

    /// Byte offset just past the three pointer tables
    pub fn tables_end(&self) -> usize {
        Self::SIZE
            + self.order_count as usize
            + 4 * (self.instrument_count as usize
                + self.sample_count as usize
                + self.pattern_count as usize)
    }
}

/// Pan bit marking a channel as disabled
pub const CHANNEL_DISABLED: u8 = 0x80;

/// Count the pan bytes with the disabled bit clear
pub(crate) fn enabled_channels(pans: &[u8]) -> u8 {
    pans.iter().filter(|&&p| p & CHANNEL_DISABLED == 0).count() as u8
}

/// Highest enabled channel index + 1, or 0 when every channel is disabled
pub(crate) fn channel_span(pans: &[u8]) -> u8 {
    pans.iter()
        .rposition(|&p| p & CHANNEL_DISABLED == 0)
        .map_or(0, |last| last as u8 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> ModuleHeader {
        ModuleHeader {
            magic: *b"IMPM",
            name: String::new(),
            highlight: (4, 16),
            order_count: 3,
            instrument_count: 2,
            sample_count: 1,
            pattern_count: 4,
            created_with: 0x0214,
            compatible_with: 0x0200,
            flags: ItFlags::empty(),
            special: SpecialFlags::empty(),
            global_volume: 128,
            mix_volume: 48,
            initial_speed: 6,
            initial_tempo: 125,
            panning_separation: 128,
            pitch_wheel_depth: 0,
            message_length: 0,
            message_offset: 0,
            reserved: 0,
            channel_pan: [32; 64],
            channel_vol: [64; 64],
        }
    }

    #[test]
    fn test_tables_end() {
        assert_eq!(header().tables_end(), 0xC0 + 3 + 4 * 7);
    }

    #[test]
    fn test_active_channels() {
        let mut h = header();
        assert_eq!(h.active_channels(), 64);
        assert_eq!(h.pattern_channels(), 64);
        h.channel_pan = [32 | CHANNEL_DISABLED; 64];
        h.channel_pan[1..4].fill(32);
        assert_eq!(h.active_channels(), 3);
        assert_eq!(h.pattern_channels(), 4);
    }

    #[test]
    fn test_gap_between_enabled_channels() {
        let mut h = header();
        h.channel_pan = [CHANNEL_DISABLED; 64];
        h.channel_pan[0] = 0;
        h.channel_pan[5] = 64;
        assert_eq!(h.active_channels(), 2);
        assert_eq!(h.pattern_channels(), 6);
    }

    #[test]
    fn test_all_channels_disabled() {
        let mut h = header();
        h.channel_pan = [32 | CHANNEL_DISABLED; 64];
        assert_eq!(h.active_channels(), 0);
        assert_eq!(h.pattern_channels(), 0);
    }

    #[test]
    fn test_instrument_layout_split() {
        let mut h = header();
        assert!(!h.uses_old_instruments());
        h.compatible_with = 0x0106;
        assert!(h.uses_old_instruments());
    }
}
