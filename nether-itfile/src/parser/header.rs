//! Module header and pointer table parsing

use std::io::Cursor;

use crate::error::ItError;
use crate::module::{ItFlags, ModuleHeader, SpecialFlags};
use crate::parapointer::ParaPointer32;

use super::helpers::{read_array, read_string, read_u8, read_u16, read_u32, read_vec};

/// Parse the fixed 0xC0-byte header at the cursor
///
/// The signature is captured but not checked here.
pub(crate) fn parse_header(cursor: &mut Cursor<&[u8]>) -> Result<ModuleHeader, ItError> {
    let magic = read_array::<4>(cursor)?;

    // Song name (26 bytes, null-terminated)
    let name = read_string(&read_array::<26>(cursor)?);

    // PHiligt
    let highlight_minor = read_u8(cursor)?;
    let highlight_major = read_u8(cursor)?;

    // OrdNum, InsNum, SmpNum, PatNum
    let order_count = read_u16(cursor)?;
    let instrument_count = read_u16(cursor)?;
    let sample_count = read_u16(cursor)?;
    let pattern_count = read_u16(cursor)?;

    // Cwt/v, Cmwt
    let created_with = read_u16(cursor)?;
    let compatible_with = read_u16(cursor)?;

    // Flags, Special
    let flags = ItFlags::from_bits_retain(read_u16(cursor)?);
    let special = SpecialFlags::from_bits_retain(read_u16(cursor)?);

    // GV, MV, IS, IT, Sep, PWD
    let global_volume = read_u8(cursor)?;
    let mix_volume = read_u8(cursor)?;
    let initial_speed = read_u8(cursor)?;
    let initial_tempo = read_u8(cursor)?;
    let panning_separation = read_u8(cursor)?;
    let pitch_wheel_depth = read_u8(cursor)?;

    // MsgLgth, MsgOff, Reserved
    let message_length = read_u16(cursor)?;
    let message_offset = read_u32(cursor)?;
    let reserved = read_u32(cursor)?;

    let channel_pan = read_array::<64>(cursor)?;
    let channel_vol = read_array::<64>(cursor)?;

    Ok(ModuleHeader {
        magic,
        name,
        highlight: (highlight_minor, highlight_major),
        order_count,
        instrument_count,
        sample_count,
        pattern_count,
        created_with,
        compatible_with,
        flags,
        special,
        global_volume,
        mix_volume,
        initial_speed,
        initial_tempo,
        panning_separation,
        pitch_wheel_depth,
        message_length,
        message_offset,
        reserved,
        channel_pan,
        channel_vol,
    })
}

/// Read the order list that follows the header
pub(crate) fn parse_orders(cursor: &mut Cursor<&[u8]>, count: u16) -> Result<Vec<u8>, ItError> {
    read_vec(cursor, count as usize)
}

/// Read one table of 32-bit pointers
pub(crate) fn parse_pointer_table(
    cursor: &mut Cursor<&[u8]>,
    count: u16,
) -> Result<Vec<ParaPointer32>, ItError> {
    (0..count)
        .map(|_| read_u32(cursor).map(ParaPointer32))
        .collect()
}

/// Decode the song message when it is flagged, sized and in range
///
/// IT uses CR as the line separator; the text ends at the first NUL.
pub(crate) fn parse_message(data: &[u8], header: &ModuleHeader) -> Option<String> {
    if !header.special.contains(SpecialFlags::MESSAGE_ATTACHED)
        || header.message_length == 0
        || header.message_offset == 0
    {
        return None;
    }

    let start = header.message_offset as usize;
    let end = start.checked_add(header.message_length as usize)?;
    let bytes = data.get(start..end)?;
    Some(read_string(bytes).replace('\r', "\n"))
}
