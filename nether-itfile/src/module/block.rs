//! Extension blocks stored between the pointer tables and the first payload

/// Build a big-endian FourCC from four ASCII bytes
pub const fn fourcc(tag: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*tag)
}

/// A self-describing extension block: 4-byte tag, 4-byte length, payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `PNAM`: pattern names, 32 bytes each
    PatternNames { length: u32, names: Vec<String> },
    /// `CNAM`: channel names, 20 bytes each
    ChannelNames { length: u32, names: Vec<String> },
    /// Any other tag; only its identity and size are kept
    Unknown { tag: [u8; 4], length: u32 },
}

impl Block {
    /// Size of the tag + length prefix
    pub const HEADER_SIZE: usize = 8;

    pub const PATTERN_NAMES: u32 = fourcc(b"PNAM");
    pub const CHANNEL_NAMES: u32 = fourcc(b"CNAM");

    /// Tag as a big-endian 32-bit identifier
    pub fn fourcc(&self) -> u32 {
        match self {
            Self::PatternNames { .. } => Self::PATTERN_NAMES,
            Self::ChannelNames { .. } => Self::CHANNEL_NAMES,
            Self::Unknown { tag, .. } => fourcc(tag),
        }
    }

    /// Declared payload length
    pub fn payload_len(&self) -> u32 {
        match self {
            Self::PatternNames { length, .. }
            | Self::ChannelNames { length, .. }
            | Self::Unknown { length, .. } => *length,
        }
    }

    /// Total length including the 8-byte header
    pub fn length(&self) -> usize {
        Self::HEADER_SIZE + self.payload_len() as usize
    }

    /// Tag rendered as text, for display
    pub fn tag_str(&self) -> String {
        String::from_utf8_lossy(&self.fourcc().to_be_bytes()).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_is_big_endian() {
        assert_eq!(fourcc(b"IMPI"), 0x494D_5049);
        assert_eq!(Block::PATTERN_NAMES, 0x504E_414D);
    }

    #[test]
    fn test_lengths() {
        let block = Block::Unknown {
            tag: *b"XTPM",
            length: 12,
        };
        assert_eq!(block.length(), 20);
        assert_eq!(block.tag_str(), "XTPM");

        let names = Block::ChannelNames {
            length: 40,
            names: vec!["Kick".into(), "Snare".into()],
        };
        assert_eq!(names.fourcc(), Block::CHANNEL_NAMES);
        assert_eq!(names.length(), 48);
    }
}
