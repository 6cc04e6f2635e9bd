//! Sample header parsing and sample payload loading

use std::io::Cursor;

use tracing::trace;

use crate::error::ItError;
use crate::module::{ConvertFlags, FullSample, SampleFlags, SampleHeader};
use crate::parapointer::{ParaPointer, ParaPointer32};

use super::helpers::{read_array, read_string, read_u8, read_u32, skip};

/// Parse the IMPS header at `ptr`
pub(crate) fn parse_sample_header(
    data: &[u8],
    ptr: ParaPointer32,
) -> Result<SampleHeader, ItError> {
    let range = ptr.resolve(SampleHeader::SIZE, data.len())?;
    let mut cursor = Cursor::new(data);
    cursor.set_position(range.start as u64);
    read_sample_header(&mut cursor)
}

fn read_sample_header(cursor: &mut Cursor<&[u8]>) -> Result<SampleHeader, ItError> {
    let magic = read_array::<4>(cursor)?;
    let filename = read_string(&read_array::<12>(cursor)?);

    // Reserved (1 byte)
    skip(cursor, 1)?;

    // GvL, Flg, Vol
    let global_volume = read_u8(cursor)?;
    let flags = SampleFlags::from_bits_retain(read_u8(cursor)?);
    let default_volume = read_u8(cursor)?;

    let name = read_string(&read_array::<26>(cursor)?);

    // Cvt, DfP
    let convert = ConvertFlags::from_bits_retain(read_u8(cursor)?);
    let dfp = read_u8(cursor)?;
    let default_pan = (dfp & 0x80 != 0).then_some(dfp & 0x7F);

    let length = read_u32(cursor)?;
    let loop_begin = read_u32(cursor)?;
    let loop_end = read_u32(cursor)?;
    let c5_speed = read_u32(cursor)?;
    let sustain_loop_begin = read_u32(cursor)?;
    let sustain_loop_end = read_u32(cursor)?;

    // SmpPoint - offset to sample data
    let sample_pointer = ParaPointer32(read_u32(cursor)?);

    // ViS, ViD, ViR, ViT (vibrato)
    let vibrato_speed = read_u8(cursor)?;
    let vibrato_depth = read_u8(cursor)?;
    let vibrato_rate = read_u8(cursor)?;
    let vibrato_type = read_u8(cursor)?;

    Ok(SampleHeader {
        magic,
        filename,
        global_volume,
        flags,
        default_volume,
        name,
        convert,
        default_pan,
        length,
        loop_begin,
        loop_end,
        c5_speed,
        sustain_loop_begin,
        sustain_loop_end,
        sample_pointer,
        vibrato_speed,
        vibrato_depth,
        vibrato_rate,
        vibrato_type,
    })
}

/// Decode the sample at `ptr`: header plus payload
///
/// The payload is copied from the header's sample pointer. Uncompressed
/// payloads must lie entirely inside the buffer. Compressed payloads have no
/// stored size, so they are copied up to the computed length or the end of
/// the buffer, whichever comes first.
pub(crate) fn parse_sample(
    data: &[u8],
    ptr: ParaPointer32,
    delta_decode: bool,
) -> Result<FullSample, ItError> {
    let header = parse_sample_header(data, ptr)?;

    let len = header.payload_len();
    if len == 0 || header.sample_pointer.is_null() {
        return Ok(FullSample {
            header,
            data: Vec::new(),
        });
    }

    let range = if header.is_compressed() {
        let tail = header.sample_pointer.resolve_tail(data.len())?;
        tail.start..tail.end.min(tail.start + len)
    } else {
        header.sample_pointer.resolve(len, data.len())?
    };
    let mut payload = data[range].to_vec();

    if delta_decode && !header.is_compressed() && header.convert.contains(ConvertFlags::DELTA) {
        trace!(name = %header.name, bytes = payload.len(), "delta decoding sample");
        if header.is_16bit() {
            delta_decode_16(&mut payload);
        } else {
            delta_decode_8(&mut payload);
        }
    }

    Ok(FullSample {
        header,
        data: payload,
    })
}

/// Turn 8-bit deltas into absolute values, in place
pub fn delta_decode_8(data: &mut [u8]) {
    let mut acc = 0u8;
    for byte in data.iter_mut() {
        acc = acc.wrapping_add(*byte);
        *byte = acc;
    }
}

/// Turn little-endian 16-bit deltas into absolute values, in place
///
/// A trailing odd byte is left untouched.
pub fn delta_decode_16(data: &mut [u8]) {
    let mut acc = 0u16;
    for pair in data.chunks_exact_mut(2) {
        acc = acc.wrapping_add(u16::from_le_bytes([pair[0], pair[1]]));
        pair.copy_from_slice(&acc.to_le_bytes());
    }
}
