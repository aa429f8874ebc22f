use byteorder::{ByteOrder, LittleEndian};

/// Append `value` to `out` as 4 little-endian bytes.
pub fn put_u32(out: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    out.extend_from_slice(&buf);
}

/// Append `value` to `out` as 8 little-endian bytes.
pub fn put_u64(out: &mut Vec<u8>, value: u64) {
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, value);
    out.extend_from_slice(&buf);
}

/// Overwrite 8 bytes of `out` at `offset` with `value`.
///
/// `offset + 8` must not exceed `out.len()`.
pub fn patch_u64(out: &mut [u8], offset: usize, value: u64) {
    LittleEndian::write_u64(&mut out[offset..offset + 8], value);
}

/// Bounds checked little-endian u32 read.
pub fn read_u32_at(data: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    data.get(offset..end).map(LittleEndian::read_u32)
}

/// Bounds checked little-endian u64 read.
pub fn read_u64_at(data: &[u8], offset: usize) -> Option<u64> {
    let end = offset.checked_add(8)?;
    data.get(offset..end).map(LittleEndian::read_u64)
}

/// Decode a whole slice of little-endian u32 values.
pub fn read_u32_slice(data: &[u8]) -> Option<Vec<u32>> {
    if data.len() % 4 != 0 {
        return None;
    }
    let mut values = vec![0u32; data.len() / 4];
    LittleEndian::read_u32_into(data, &mut values);
    Some(values)
}

/// Decode a whole slice of little-endian u64 values.
pub fn read_u64_slice(data: &[u8]) -> Option<Vec<u64>> {
    if data.len() % 8 != 0 {
        return None;
    }
    let mut values = vec![0u64; data.len() / 8];
    LittleEndian::read_u64_into(data, &mut values);
    Some(values)
}

/// LEB128 encoding, 7 bits per byte, high bit set on all but the last byte.
pub fn write_uvarint(out: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Read one LEB128 value starting at `*cursor` and advance the cursor past it.
pub fn read_uvarint(data: &[u8], cursor: &mut usize) -> Option<u32> {
    let mut value: u32 = 0;
    let mut shift = 0u32;
    loop {
        let byte = *data.get(*cursor)?;
        *cursor += 1;
        if shift >= 32 || (shift == 28 && byte & 0x70 != 0) {
            return None;
        }
        value |= ((byte & 0x7F) as u32) << shift;
        if byte & 0x80 == 0 {
            return Some(value);
        }
        shift += 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_helpers() {
        let mut out = Vec::new();
        put_u32(&mut out, 0xDEADBEEF);
        put_u64(&mut out, 42);
        assert_eq!(out.len(), 12);
        assert_eq!(&out[..4], &[0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(read_u32_at(&out, 0), Some(0xDEADBEEF));
        assert_eq!(read_u64_at(&out, 4), Some(42));
        assert_eq!(read_u64_at(&out, 5), None);

        patch_u64(&mut out, 4, 7);
        assert_eq!(read_u64_at(&out, 4), Some(7));
    }

    #[test]
    fn test_slices() {
        let mut out = Vec::new();
        for v in [1u32, 2, 3] {
            put_u32(&mut out, v);
        }
        assert_eq!(read_u32_slice(&out), Some(vec![1, 2, 3]));
        assert_eq!(read_u32_slice(&out[1..]), None);
        assert_eq!(read_u64_slice(&out), None);
        assert_eq!(read_u64_slice(&out[..8]), Some(vec![(2u64 << 32) | 1]));
    }

    #[test]
    fn test_uvarint() {
        let values = [0u32, 1, 127, 128, 300, 16_383, 16_384, u32::MAX];
        let mut out = Vec::new();
        for &v in &values {
            write_uvarint(&mut out, v);
        }
        let mut cursor = 0;
        for &v in &values {
            assert_eq!(read_uvarint(&out, &mut cursor), Some(v));
        }
        assert_eq!(cursor, out.len());
        assert_eq!(read_uvarint(&out, &mut cursor), None);

        // Five continuation bytes never describe a u32.
        let mut cursor = 0;
        assert_eq!(read_uvarint(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01], &mut cursor), None);
    }
}
