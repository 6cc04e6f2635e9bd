//! IT sample structures and flags

use crate::parapointer::ParaPointer32;

bitflags::bitflags! {
    /// Sample flags (IMPS offset 0x12)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SampleFlags: u8 {
        /// Sample data is present
        const EXISTS = 0x01;
        /// 16-bit samples (vs 8-bit)
        const SAMPLE_16BIT = 0x02;
        /// Stereo sample
        const STEREO = 0x04;
        /// IT214/IT215 compressed
        const COMPRESSED = 0x08;
        /// Loop enabled
        const LOOP = 0x10;
        /// Sustain loop enabled
        const SUSTAIN_LOOP = 0x20;
        /// Ping-pong loop (vs forward)
        const PINGPONG_LOOP = 0x40;
        /// Ping-pong sustain loop (vs forward)
        const PINGPONG_SUSTAIN = 0x80;
    }
}

bitflags::bitflags! {
    /// Sample conversion flags (IMPS offset 0x2E)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ConvertFlags: u8 {
        /// Signed samples (vs unsigned)
        const SIGNED = 0x01;
        /// Big-endian 16-bit samples
        const BIG_ENDIAN = 0x02;
        /// Stored as delta values
        const DELTA = 0x04;
        /// Stored as byte delta values (PTM loader)
        const BYTE_DELTA = 0x08;
        /// 12-bit TX-Wave samples
        const TX_WAVE = 0x10;
        /// Prompt for left/right/both when loading stereo
        const STEREO_PROMPT = 0x20;
    }
}

/// IMPS sample header (80 bytes on disk)
#[derive(Debug, Clone)]
pub struct SampleHeader {
    /// Magic bytes, "IMPS" in well-formed files
    pub magic: [u8; 4],
    /// DOS filename (max 12 chars)
    pub filename: String,
    /// Global volume (0-64)
    pub global_volume: u8,
    pub flags: SampleFlags,
    /// Default volume (0-64)
    pub default_volume: u8,
    /// Sample name (max 26 chars)
    pub name: String,
    pub convert: ConvertFlags,
    /// Default panning (0-64), None if not enabled
    pub default_pan: Option<u8>,
    /// Sample length in samples (not bytes)
    pub length: u32,
    pub loop_begin: u32,
    pub loop_end: u32,
    /// C5 speed (sample rate for C-5)
    pub c5_speed: u32,
    pub sustain_loop_begin: u32,
    pub sustain_loop_end: u32,
    /// Absolute offset of the sample payload
    pub sample_pointer: ParaPointer32,
    /// Auto-vibrato speed (0-64)
    pub vibrato_speed: u8,
    /// Auto-vibrato depth (0-64)
    pub vibrato_depth: u8,
    /// Auto-vibrato rate (0-64)
    pub vibrato_rate: u8,
    /// Auto-vibrato waveform (0=sine, 1=ramp down, 2=square, 3=random)
    pub vibrato_type: u8,
}

impl SampleHeader {
    /// On-disk size of the header
    pub const SIZE: usize = 0x50;

    /// Check the record's magic against "IMPS"
    pub fn has_valid_magic(&self) -> bool {
        &self.magic == crate::SAMPLE_MAGIC
    }

    pub fn exists(&self) -> bool {
        self.flags.contains(SampleFlags::EXISTS)
    }

    pub fn is_16bit(&self) -> bool {
        self.flags.contains(SampleFlags::SAMPLE_16BIT)
    }

    pub fn is_stereo(&self) -> bool {
        self.flags.contains(SampleFlags::STEREO)
    }

    pub fn is_compressed(&self) -> bool {
        self.flags.contains(SampleFlags::COMPRESSED)
    }

    pub fn has_loop(&self) -> bool {
        self.flags.contains(SampleFlags::LOOP)
    }

    pub fn has_sustain_loop(&self) -> bool {
        self.flags.contains(SampleFlags::SUSTAIN_LOOP)
    }

    /// Payload size in bytes: length x (2 if 16-bit) x (2 if stereo), 0 when absent
    pub fn payload_len(&self) -> usize {
        if !self.exists() {
            return 0;
        }
        let width = if self.is_16bit() { 2 } else { 1 };
        let channels = if self.is_stereo() { 2 } else { 1 };
        self.length as usize * width * channels
    }
}

/// Sample header plus its raw payload bytes
#[derive(Debug, Clone)]
pub struct FullSample {
    pub header: SampleHeader,
    /// Little-endian PCM as stored, delta-decoded when the convert flags ask for it
    pub data: Vec<u8>,
}

impl FullSample {
    /// Interpret the payload as signed 8-bit frames
    pub fn as_i8(&self) -> Option<Vec<i8>> {
        (!self.header.is_16bit()).then(|| self.data.iter().map(|&b| b as i8).collect())
    }

    /// Interpret the payload as signed 16-bit little-endian frames
    pub fn as_i16(&self) -> Option<Vec<i16>> {
        self.header.is_16bit().then(|| {
            self.data
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(flags: SampleFlags, length: u32) -> SampleHeader {
        SampleHeader {
            magic: *b"IMPS",
            filename: String::new(),
            global_volume: 64,
            flags,
            default_volume: 64,
            name: String::new(),
            convert: ConvertFlags::SIGNED,
            default_pan: None,
            length,
            loop_begin: 0,
            loop_end: 0,
            c5_speed: 8363,
            sustain_loop_begin: 0,
            sustain_loop_end: 0,
            sample_pointer: ParaPointer32(0),
            vibrato_speed: 0,
            vibrato_depth: 0,
            vibrato_rate: 0,
            vibrato_type: 0,
        }
    }

    #[test]
    fn test_payload_len() {
        assert_eq!(header(SampleFlags::empty(), 100).payload_len(), 0);
        assert_eq!(header(SampleFlags::EXISTS, 100).payload_len(), 100);
        assert_eq!(
            header(SampleFlags::EXISTS | SampleFlags::SAMPLE_16BIT, 100).payload_len(),
            200
        );
        assert_eq!(
            header(
                SampleFlags::EXISTS | SampleFlags::SAMPLE_16BIT | SampleFlags::STEREO,
                100
            )
            .payload_len(),
            400
        );
    }

    #[test]
    fn test_frame_views() {
        let sample = FullSample {
            header: header(SampleFlags::EXISTS | SampleFlags::SAMPLE_16BIT, 2),
            data: vec![0x01, 0x00, 0xFF, 0xFF],
        };
        assert_eq!(sample.as_i16(), Some(vec![1, -1]));
        assert_eq!(sample.as_i8(), None);
    }
}
