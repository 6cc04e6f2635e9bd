//! Valid-boundary calculation over the pointer tables

use crate::parapointer::{ParaPointer, ParaPointer32};

/// Smallest offset at which instrument, sample or pattern payload may begin
///
/// Takes the minimum nonzero pointer across all tables, lowered to the song
/// message offset when one is given and precedes it. The boundary never
/// exceeds the buffer length, so with no nonzero pointer at all it is the end
/// of the buffer. Zero pointers mark absent entries and never take part in
/// the minimum.
pub fn valid_boundary(
    tables: &[&[ParaPointer32]],
    message_offset: Option<u32>,
    data_len: usize,
) -> usize {
    let pointer_min = tables
        .iter()
        .flat_map(|table| table.iter())
        .filter(|ptr| !ptr.is_null())
        .map(ParaPointer::offset)
        .fold(data_len, usize::min);

    match message_offset {
        Some(offset) if offset != 0 => pointer_min.min(offset as usize),
        _ => pointer_min,
    }
}
