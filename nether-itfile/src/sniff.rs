//! Tracker format detection by magic bytes
//!
//! Only identification is provided here; [`crate::parse_it`] decodes IT files.

use std::fmt;

use crate::IT_MAGIC;
use crate::module::enabled_channels;

/// Offset of the 4-byte MOD signature (after title and 31 sample headers)
const MOD_SIGNATURE_OFFSET: usize = 1080;

/// Offset of the IT channel pan table
const IT_CHANNEL_PAN_OFFSET: usize = 0x40;

/// Tracker family a MOD signature belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModVariant {
    /// Amiga ProTracker / NoiseTracker (`M.K.`, `M!K!`)
    ProTracker,
    /// StarTrekker (`FLT4`, `FLT8`)
    StarTrekker,
    /// FastTracker (`xCHN`, `xxCH`)
    FastTracker,
}

/// Detected module format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFormat {
    /// `IMPM` at offset 0
    ImpulseTracker { channels: u8 },
    /// MOD signature at offset 1080
    Mod { channels: u8, variant: ModVariant },
}

impl ModuleFormat {
    pub fn channels(&self) -> u8 {
        match self {
            Self::ImpulseTracker { channels } | Self::Mod { channels, .. } => *channels,
        }
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImpulseTracker { channels } => {
                write!(f, "Impulse Tracker ({channels} channels)")
            }
            Self::Mod { channels, variant } => {
                write!(f, "MOD, {variant:?} ({channels} channels)")
            }
        }
    }
}

const MOD_SIGNATURES: &[(&[u8; 4], u8, ModVariant)] = &[
    (b"M.K.", 4, ModVariant::ProTracker),
    (b"M!K!", 4, ModVariant::ProTracker),
    (b"FLT4", 4, ModVariant::StarTrekker),
    (b"FLT8", 8, ModVariant::StarTrekker),
    (b"2CHN", 2, ModVariant::FastTracker),
    (b"4CHN", 4, ModVariant::FastTracker),
    (b"6CHN", 6, ModVariant::FastTracker),
    (b"8CHN", 8, ModVariant::FastTracker),
    (b"10CH", 10, ModVariant::FastTracker),
    (b"11CH", 11, ModVariant::FastTracker),
    (b"12CH", 12, ModVariant::FastTracker),
    (b"13CH", 13, ModVariant::FastTracker),
    (b"14CH", 14, ModVariant::FastTracker),
    (b"15CH", 15, ModVariant::FastTracker),
    (b"16CH", 16, ModVariant::FastTracker),
    (b"17CH", 17, ModVariant::FastTracker),
    (b"18CH", 18, ModVariant::FastTracker),
    (b"19CH", 19, ModVariant::FastTracker),
    (b"20CH", 20, ModVariant::FastTracker),
    (b"21CH", 21, ModVariant::FastTracker),
    (b"22CH", 22, ModVariant::FastTracker),
    (b"23CH", 23, ModVariant::FastTracker),
    (b"24CH", 24, ModVariant::FastTracker),
    (b"25CH", 25, ModVariant::FastTracker),
    (b"26CH", 26, ModVariant::FastTracker),
    (b"27CH", 27, ModVariant::FastTracker),
    (b"28CH", 28, ModVariant::FastTracker),
    (b"29CH", 29, ModVariant::FastTracker),
    (b"30CH", 30, ModVariant::FastTracker),
    (b"31CH", 31, ModVariant::FastTracker),
    (b"32CH", 32, ModVariant::FastTracker),
];

/// Detect a tracker format by magic bytes
pub fn sniff(data: &[u8]) -> Option<ModuleFormat> {
    if data.get(..4) == Some(IT_MAGIC.as_slice()) {
        let pans = data.get(IT_CHANNEL_PAN_OFFSET..IT_CHANNEL_PAN_OFFSET + 64)?;
        return Some(ModuleFormat::ImpulseTracker {
            channels: enabled_channels(pans),
        });
    }

    let signature = data.get(MOD_SIGNATURE_OFFSET..MOD_SIGNATURE_OFFSET + 4)?;
    MOD_SIGNATURES
        .iter()
        .find(|(sig, _, _)| sig.as_slice() == signature)
        .map(|&(_, channels, variant)| ModuleFormat::Mod { channels, variant })
}
