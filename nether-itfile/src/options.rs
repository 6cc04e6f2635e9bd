//! Decoder configuration

use serde::Deserialize;

/// Default upper bound on the buffered input (64 MiB)
pub const DEFAULT_MAX_INPUT_LEN: usize = 64 * 1024 * 1024;

/// Options controlling how an IT stream is read
///
/// Deserializable so tools can load it from a TOML table; every field has a
/// default, so an empty table is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Reject input streams longer than this many bytes
    pub max_input_len: usize,
    /// Apply delta decoding to samples whose convert flags mark them as deltas
    pub delta_decode_samples: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_input_len: DEFAULT_MAX_INPUT_LEN,
            delta_decode_samples: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ReadOptions::default();
        assert_eq!(opts.max_input_len, DEFAULT_MAX_INPUT_LEN);
        assert!(opts.delta_decode_samples);
    }
}
