//! Helper functions for reading binary data

use std::io::{Cursor, Read};

use crate::error::ItError;

fn short_read(cursor: &Cursor<&[u8]>, needed: usize) -> ItError {
    ItError::short_read(cursor.position() as usize, needed, cursor.get_ref().len())
}

/// Read a fixed-size byte array
pub(crate) fn read_array<const N: usize>(cursor: &mut Cursor<&[u8]>) -> Result<[u8; N], ItError> {
    let mut buf = [0u8; N];
    let start = cursor.position();
    if cursor.read_exact(&mut buf).is_err() {
        cursor.set_position(start);
        return Err(short_read(cursor, N));
    }
    Ok(buf)
}

/// Read a single byte
pub(crate) fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, ItError> {
    Ok(read_array::<1>(cursor)?[0])
}

/// Read a signed byte
pub(crate) fn read_i8(cursor: &mut Cursor<&[u8]>) -> Result<i8, ItError> {
    Ok(read_u8(cursor)? as i8)
}

/// Read a 16-bit little-endian integer
pub(crate) fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16, ItError> {
    Ok(u16::from_le_bytes(read_array(cursor)?))
}

/// Read a 32-bit little-endian integer
pub(crate) fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, ItError> {
    Ok(u32::from_le_bytes(read_array(cursor)?))
}

/// Read `len` bytes into an owned buffer
pub(crate) fn read_vec(cursor: &mut Cursor<&[u8]>, len: usize) -> Result<Vec<u8>, ItError> {
    let start = cursor.position() as usize;
    let data = *cursor.get_ref();
    let bytes = start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| short_read(cursor, len))?;
    cursor.set_position((start + len) as u64);
    Ok(bytes.to_vec())
}

/// Skip `len` bytes that must still be present
pub(crate) fn skip(cursor: &mut Cursor<&[u8]>, len: usize) -> Result<(), ItError> {
    let start = cursor.position() as usize;
    if start.saturating_add(len) > cursor.get_ref().len() {
        return Err(short_read(cursor, len));
    }
    cursor.set_position((start + len) as u64);
    Ok(())
}

/// Read a null-terminated or fixed-length string
pub(crate) fn read_string(bytes: &[u8]) -> String {
    // Find null terminator or end of slice
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    // Trim trailing spaces and convert
    String::from_utf8_lossy(&bytes[..len])
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_string() {
        assert_eq!(read_string(b"Hello\0World"), "Hello");
        assert_eq!(read_string(b"No null"), "No null");
        assert_eq!(read_string(b"Trailing   "), "Trailing");
        assert_eq!(read_string(b""), "");
    }

    #[test]
    fn test_read_integers() {
        let data: &[u8] = &[0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut cursor = Cursor::new(data);
        assert_eq!(read_u8(&mut cursor).unwrap(), 0x01);
        assert_eq!(read_u16(&mut cursor).unwrap(), 0x1234);
        assert_eq!(read_u32(&mut cursor).unwrap(), 0x1234_5678);
        assert!(read_u8(&mut cursor).is_err());
    }

    #[test]
    fn test_short_read_reports_position() {
        let data: &[u8] = &[0xAA, 0xBB, 0xCC];
        let mut cursor = Cursor::new(data);
        skip(&mut cursor, 2).unwrap();
        match read_u16(&mut cursor) {
            Err(ItError::StructuralRead {
                offset,
                needed,
                available,
            }) => {
                assert_eq!((offset, needed, available), (2, 2, 1));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        // A failed read leaves the cursor where it was
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_read_vec_and_skip() {
        let data: &[u8] = &[1, 2, 3, 4, 5];
        let mut cursor = Cursor::new(data);
        assert_eq!(read_vec(&mut cursor, 3).unwrap(), vec![1, 2, 3]);
        assert!(read_vec(&mut cursor, 3).is_err());
        assert!(skip(&mut cursor, 3).is_err());
        skip(&mut cursor, 2).unwrap();
        assert_eq!(cursor.position(), 5);
    }
}
