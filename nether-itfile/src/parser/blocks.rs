//! Edit history and extension-block chain scanning

use std::io::Cursor;

use tracing::{debug, trace, warn};

use crate::INSTRUMENT_MAGIC;
use crate::error::ItError;
use crate::module::{Block, EditDate, EditHistory, EditTime, Runtime, fourcc};

use super::helpers::{read_array, read_string, read_u16, read_u32, read_vec};

/// Entry size of a `PNAM` block
const PATTERN_NAME_LEN: usize = 32;
/// Entry size of a `CNAM` block
const CHANNEL_NAME_LEN: usize = 20;

/// Read the edit history that follows the pattern pointer table
///
/// A 2-byte count comes first. When the history it announces would not end
/// inside the buffer the count is treated as garbage: the cursor is rewound to
/// the count field and no history is returned. Otherwise one record is decoded.
pub(crate) fn parse_edit_history(
    cursor: &mut Cursor<&[u8]>,
) -> Result<Vec<EditHistory>, ItError> {
    let start = cursor.position();
    let data_len = cursor.get_ref().len();
    let count = read_u16(cursor)?;

    let history_end = start as usize + count as usize * EditHistory::SIZE + 2;
    if history_end >= data_len {
        warn!(
            count,
            offset = start,
            "edit history runs past end of file, ignoring it"
        );
        cursor.set_position(start);
        return Ok(Vec::new());
    }

    let date = EditDate(read_u16(cursor)?);
    let time = EditTime(read_u16(cursor)?);
    let runtime = Runtime(read_u32(cursor)?);
    Ok(vec![EditHistory {
        date,
        time,
        runtime,
    }])
}

/// Result of walking the extension-block chain
#[derive(Debug, Clone, Default)]
pub struct BlockScan {
    /// Blocks in file order
    pub blocks: Vec<Block>,
    /// Valid boundary after the scan, never below the starting boundary
    pub boundary: usize,
    /// Offset at which scanning stopped
    pub end: usize,
}

enum ScanState {
    Scanning { offset: usize },
    Done { offset: usize },
}

/// Walk the extension-block chain starting at `boundary`
///
/// The chain ends, without error, at the `IMPI` instrument marker, at the
/// first read that fails, or at a block whose end overflows the offset range. Corrupt
/// or truncated chains end the same way as well-formed ones. Each complete
/// block whose end still lies inside the buffer raises the boundary to that
/// end.
pub fn scan_blocks(data: &[u8], boundary: usize) -> BlockScan {
    let mut scan = BlockScan {
        boundary,
        ..Default::default()
    };
    let mut state = ScanState::Scanning { offset: boundary };

    loop {
        state = match state {
            ScanState::Scanning { offset } => match read_block(data, offset) {
                Ok(Some(block)) => {
                    trace!(tag = %block.tag_str(), offset, length = block.length(), "extension block");
                    match offset.checked_add(block.length()) {
                        Some(next) => {
                            scan.blocks.push(block);
                            if next < data.len() {
                                scan.boundary = scan.boundary.max(next);
                            }
                            ScanState::Scanning { offset: next }
                        }
                        None => {
                            warn!(offset, "block length overflows the offset range");
                            ScanState::Done { offset }
                        }
                    }
                }
                Ok(None) => ScanState::Done { offset },
                Err(err) => {
                    warn!(offset, %err, "block chain ended on read failure");
                    ScanState::Done { offset }
                }
            },
            ScanState::Done { offset } => {
                scan.end = offset;
                break;
            }
        };
    }

    debug!(
        blocks = scan.blocks.len(),
        boundary = scan.boundary,
        "block scan finished"
    );
    scan
}

/// Read one block at `offset`; `Ok(None)` marks a clean end of chain
fn read_block(data: &[u8], offset: usize) -> Result<Option<Block>, ItError> {
    let mut cursor = Cursor::new(data);
    cursor.set_position(offset as u64);

    let tag_bytes = read_array::<4>(&mut cursor)?;
    let payload_len = read_u32(&mut cursor)?;

    if fourcc(&tag_bytes) == fourcc(INSTRUMENT_MAGIC) {
        return Ok(None);
    }

    let payload = read_vec(&mut cursor, payload_len as usize)?;

    let block = match fourcc(&tag_bytes) {
        Block::PATTERN_NAMES => Block::PatternNames {
            length: payload_len,
            names: split_names(&payload, PATTERN_NAME_LEN),
        },
        Block::CHANNEL_NAMES => Block::ChannelNames {
            length: payload_len,
            names: split_names(&payload, CHANNEL_NAME_LEN),
        },
        _ => Block::Unknown {
            tag: tag_bytes,
            length: payload_len,
        },
    };
    Ok(Some(block))
}

fn split_names(payload: &[u8], entry_len: usize) -> Vec<String> {
    payload.chunks(entry_len).map(read_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = tag.to_vec();
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_scan_advances_boundary() {
        let mut data = vec![0u8; 0x10];
        data.extend(block(b"XTPM", &[1, 2, 3, 4]));
        data.extend(block(b"STPM", &[]));
        data.extend(b"IMPI");
        data.extend(vec![0u8; 16]);

        let scan = scan_blocks(&data, 0x10);
        assert_eq!(scan.blocks.len(), 2);
        assert_eq!(scan.boundary, 0x10 + 12 + 8);
        assert_eq!(scan.end, 0x10 + 12 + 8);
        assert_eq!(
            scan.blocks[0],
            Block::Unknown {
                tag: *b"XTPM",
                length: 4
            }
        );
    }

    #[test]
    fn test_scan_boundary_is_monotonic() {
        let mut data = vec![0u8; 0x20];
        for _ in 0..4 {
            data.extend(block(b"ABCD", &[0; 3]));
        }
        data.extend(b"IMPI");

        let mut previous = 0x20;
        for step in 0..=4 {
            // Cut the chain after `step` blocks by truncating the buffer
            let cut = 0x20 + step * 11 + 4;
            let scan = scan_blocks(&data[..cut.min(data.len())], 0x20);
            assert!(scan.boundary >= previous);
            previous = scan.boundary;
        }
    }

    #[test]
    fn test_block_ending_at_buffer_end_keeps_boundary() {
        let mut data = vec![0u8; 8];
        data.extend(block(b"ABCD", &[9, 9]));
        let scan = scan_blocks(&data, 8);
        assert_eq!(scan.blocks.len(), 1);
        // The block ends exactly at the end of the buffer, so the boundary stays
        assert_eq!(scan.boundary, 8);
    }

    #[test]
    fn test_truncated_payload_ends_chain() {
        let mut data = vec![0u8; 4];
        data.extend(b"ABCD");
        data.extend(100u32.to_le_bytes());
        data.extend([0u8; 10]);
        let scan = scan_blocks(&data, 4);
        assert!(scan.blocks.is_empty());
        assert_eq!(scan.boundary, 4);
    }

    #[test]
    fn test_max_declared_length_ends_chain() {
        let mut data = vec![0u8; 8];
        data.extend(b"ABCD");
        data.extend(u32::MAX.to_le_bytes());
        data.extend([0u8; 24]);
        let scan = scan_blocks(&data, 8);
        assert!(scan.blocks.is_empty());
        assert_eq!(scan.boundary, 8);
        assert_eq!(scan.end, 8);
    }

    #[test]
    fn test_scan_at_end_of_buffer() {
        let data = vec![0u8; 32];
        let scan = scan_blocks(&data, 32);
        assert!(scan.blocks.is_empty());
        assert_eq!(scan.boundary, 32);
    }

    #[test]
    fn test_name_blocks() {
        let mut payload = Vec::new();
        payload.extend(b"Intro");
        payload.resize(32, 0);
        payload.extend(b"Verse");
        payload.resize(64, 0);
        let mut data = block(b"PNAM", &payload);
        let mut channels = b"Bass".to_vec();
        channels.resize(20, 0);
        data.extend(block(b"CNAM", &channels));
        data.extend(b"IMPI");

        let scan = scan_blocks(&data, 0);
        assert_eq!(
            scan.blocks[0],
            Block::PatternNames {
                length: 64,
                names: vec!["Intro".into(), "Verse".into()]
            }
        );
        assert_eq!(
            scan.blocks[1],
            Block::ChannelNames {
                length: 20,
                names: vec!["Bass".into()]
            }
        );
    }

    #[test]
    fn test_edit_history_record() {
        let mut data = vec![0u8; 4];
        data.extend(1u16.to_le_bytes());
        data.extend(0x3000u16.to_le_bytes());
        data.extend(0x6000u16.to_le_bytes());
        data.extend(1820u32.to_le_bytes());
        data.extend([0u8; 8]);

        let mut cursor = Cursor::new(data.as_slice());
        cursor.set_position(4);
        let history = parse_edit_history(&mut cursor).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, EditDate(0x3000));
        assert_eq!(history[0].runtime, Runtime(1820));
        assert_eq!(cursor.position(), 4 + 2 + 8);
    }

    #[test]
    fn test_edit_history_past_end_rewinds() {
        let mut data = vec![0u8; 4];
        data.extend(500u16.to_le_bytes());
        data.extend([0u8; 16]);

        let mut cursor = Cursor::new(data.as_slice());
        cursor.set_position(4);
        let history = parse_edit_history(&mut cursor).unwrap();
        assert!(history.is_empty());
        assert_eq!(cursor.position(), 4);
    }
}
