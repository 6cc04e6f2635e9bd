//! Pattern parsing

use std::io::Cursor;

use crate::error::ItError;
use crate::module::PackedPattern;
use crate::parapointer::{ParaPointer, ParaPointer32};

use super::helpers::{read_array, read_u16, read_vec};

/// Read the packed pattern at `ptr`
///
/// Only the 8-byte header and the packed stream are read; the stream is
/// decoded lazily through [`PackedPattern::decode_cell`] or
/// [`PackedPattern::unpack`]. The row count is kept as stored.
pub(crate) fn parse_pattern(data: &[u8], ptr: ParaPointer32) -> Result<PackedPattern, ItError> {
    let range = ptr.resolve(PackedPattern::HEADER_SIZE, data.len())?;
    let mut cursor = Cursor::new(data);
    cursor.set_position(range.start as u64);

    // Length (2 bytes) - packed data size (excluding 8-byte header)
    let length = read_u16(&mut cursor)?;
    let rows = read_u16(&mut cursor)?;
    let reserved = read_array::<4>(&mut cursor)?;
    let packed = read_vec(&mut cursor, length as usize)?;

    Ok(PackedPattern {
        length,
        rows,
        reserved,
        data: packed,
    })
}
