//! IT file parser

use std::io::{Cursor, Read};

use tracing::debug;

use crate::error::{ItError, PointerTable};
use crate::module::{ItFile, SpecialFlags};
use crate::options::ReadOptions;
use crate::parapointer::{ParaPointer, ParaPointer32};

mod blocks;
mod boundary;
mod header;
mod helpers;
mod instrument;
mod pattern;
mod sample;

use blocks::parse_edit_history;
use header::{parse_header, parse_message, parse_orders, parse_pointer_table};
use instrument::parse_instrument;
use pattern::parse_pattern;
use sample::parse_sample;

// Re-export public APIs
pub use blocks::{BlockScan, scan_blocks};
pub use boundary::valid_boundary;
pub use sample::{delta_decode_8, delta_decode_16};

/// Parse an IT file held in memory with default options
///
/// # Arguments
/// * `data` - Raw IT file bytes
///
/// # Returns
/// * `Ok(ItFile)` - Fully decoded file
/// * `Err(ItError)` - The file was rejected; no partial result is produced
pub fn parse_it(data: &[u8]) -> Result<ItFile, ItError> {
    parse_it_with(data, &ReadOptions::default())
}

/// Parse an IT file held in memory
///
/// Decoding runs in a fixed order: header, signature check, order list,
/// pointer tables, valid boundary, edit history, block scan, then
/// instruments, samples and patterns in pointer-table order.
pub fn parse_it_with(data: &[u8], options: &ReadOptions) -> Result<ItFile, ItError> {
    let mut cursor = Cursor::new(data);

    let header = parse_header(&mut cursor)?;
    if !header.has_valid_magic() {
        return Err(ItError::InvalidSignature {
            found: header.magic,
        });
    }

    let orders = parse_orders(&mut cursor, header.order_count)?;
    let instrument_pointers = parse_pointer_table(&mut cursor, header.instrument_count)?;
    let sample_pointers = parse_pointer_table(&mut cursor, header.sample_count)?;
    let pattern_pointers = parse_pointer_table(&mut cursor, header.pattern_count)?;

    let message_offset = header
        .special
        .contains(SpecialFlags::MESSAGE_ATTACHED)
        .then_some(header.message_offset);
    let initial_boundary = valid_boundary(
        &[&instrument_pointers, &sample_pointers, &pattern_pointers],
        message_offset,
        data.len(),
    );
    debug!(
        name = %header.name,
        boundary = initial_boundary,
        "header and pointer tables read"
    );

    let edit_history = if header.special.contains(SpecialFlags::HISTORY_INCLUDED) {
        parse_edit_history(&mut cursor)?
    } else {
        Vec::new()
    };

    let scan = scan_blocks(data, initial_boundary);
    let boundary = scan.boundary;

    let mut instruments = Vec::with_capacity(instrument_pointers.len());
    for (index, &ptr) in instrument_pointers.iter().enumerate() {
        if ptr.is_null() {
            instruments.push(None);
            continue;
        }
        check_pointer(ptr, PointerTable::Instrument, index, boundary)?;
        instruments.push(Some(parse_instrument(data, ptr, header.compatible_with)?));
    }

    let mut samples = Vec::with_capacity(sample_pointers.len());
    for (index, &ptr) in sample_pointers.iter().enumerate() {
        if ptr.is_null() {
            samples.push(None);
            continue;
        }
        check_pointer(ptr, PointerTable::Sample, index, boundary)?;
        samples.push(Some(parse_sample(data, ptr, options.delta_decode_samples)?));
    }

    let mut patterns = Vec::with_capacity(pattern_pointers.len());
    for (index, &ptr) in pattern_pointers.iter().enumerate() {
        if ptr.is_null() {
            patterns.push(crate::module::PackedPattern::blank());
            continue;
        }
        check_pointer(ptr, PointerTable::Pattern, index, boundary)?;
        patterns.push(parse_pattern(data, ptr)?);
    }

    let message = parse_message(data, &header);

    debug!(
        instruments = instruments.len(),
        samples = samples.len(),
        patterns = patterns.len(),
        blocks = scan.blocks.len(),
        "IT file decoded"
    );

    Ok(ItFile {
        header,
        orders,
        instrument_pointers,
        sample_pointers,
        pattern_pointers,
        instruments,
        samples,
        patterns,
        edit_history,
        blocks: scan.blocks,
        message,
        boundary,
    })
}

/// Buffer an IT stream and decode it with default options
pub fn read_it<R: Read>(reader: R) -> Result<ItFile, ItError> {
    read_it_with(reader, &ReadOptions::default())
}

/// Buffer an IT stream and decode it
///
/// At most `options.max_input_len` bytes are accepted. Reading stops one byte
/// past the limit, so the length reported by [`ItError::InputTooLarge`] is a
/// lower bound.
pub fn read_it_with<R: Read>(reader: R, options: &ReadOptions) -> Result<ItFile, ItError> {
    let limit = options.max_input_len;
    let mut data = Vec::new();
    reader
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut data)?;
    if data.len() > limit {
        return Err(ItError::InputTooLarge {
            len: data.len(),
            limit,
        });
    }
    parse_it_with(&data, options)
}

/// Reject a nonzero pointer that lies below the valid boundary
fn check_pointer(
    ptr: ParaPointer32,
    table: PointerTable,
    index: usize,
    boundary: usize,
) -> Result<(), ItError> {
    if ptr.offset() < boundary {
        return Err(ItError::InvalidPointer {
            table,
            index,
            offset: ptr.offset(),
            boundary,
        });
    }
    Ok(())
}
