//! Little-endian primitives shared by both format variants
//!
//! Readers only need [`Read`]: padding is consumed by reading and discarding,
//! so a stream that ends inside padding is still reported as truncated.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::IfpError;

/// Size of the scratch buffer used when skipping or zero-filling
const SCRATCH_LEN: usize = 256;

/// Upper bound on records preallocated from an untrusted count field
const MAX_PREALLOC: u32 = 1024;

// =============================================================================
// Readers
// =============================================================================

pub(crate) fn read_u32<R: Read + ?Sized>(r: &mut R) -> Result<u32, IfpError> {
    Ok(r.read_u32::<LittleEndian>()?)
}

pub(crate) fn read_f32<R: Read + ?Sized>(r: &mut R) -> Result<f32, IfpError> {
    Ok(r.read_f32::<LittleEndian>()?)
}

/// Read `N` consecutive `i16` values (advances exactly `2 * N` bytes)
pub(crate) fn read_i16_array<R: Read + ?Sized, const N: usize>(
    r: &mut R,
) -> Result<[i16; N], IfpError> {
    let mut out = [0i16; N];
    r.read_i16_into::<LittleEndian>(&mut out)?;
    Ok(out)
}

/// Read `N` consecutive `u32` values (advances exactly `4 * N` bytes)
pub(crate) fn read_u32_array<R: Read + ?Sized, const N: usize>(
    r: &mut R,
) -> Result<[u32; N], IfpError> {
    let mut out = [0u32; N];
    r.read_u32_into::<LittleEndian>(&mut out)?;
    Ok(out)
}

/// Read `N` consecutive `f32` values (advances exactly `4 * N` bytes)
pub(crate) fn read_f32_array<R: Read + ?Sized, const N: usize>(
    r: &mut R,
) -> Result<[f32; N], IfpError> {
    let mut out = [0f32; N];
    r.read_f32_into::<LittleEndian>(&mut out)?;
    Ok(out)
}

/// Read a raw 4-byte marker
pub(crate) fn read_tag<R: Read + ?Sized>(r: &mut R) -> Result<[u8; 4], IfpError> {
    let mut tag = [0u8; 4];
    r.read_exact(&mut tag)?;
    Ok(tag)
}

/// Read a 4-byte marker and fail unless it equals `expected`
pub(crate) fn expect_tag<R: Read + ?Sized>(
    r: &mut R,
    expected: &'static [u8; 4],
) -> Result<(), IfpError> {
    let found = read_tag(r)?;
    if &found != expected {
        return Err(IfpError::UnexpectedTag {
            expected: tag_str(expected),
            found: String::from_utf8_lossy(&found).into_owned(),
        });
    }
    Ok(())
}

/// Read a null-terminated ASCII string stored in a `max_len`-byte slot
///
/// Stops at the first zero byte but always consumes all `max_len` bytes.
/// The buffer grows with the bytes actually read, so a bogus length from the
/// file fails as truncated instead of allocating up front.
pub(crate) fn read_fixed_string<R: Read + ?Sized>(
    r: &mut R,
    max_len: usize,
) -> Result<String, IfpError> {
    let mut bytes = Vec::with_capacity(max_len.min(SCRATCH_LEN));
    Read::take(&mut *r, max_len as u64).read_to_end(&mut bytes)?;
    if bytes.len() < max_len {
        return Err(IfpError::Truncated);
    }

    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let name = &bytes[..len];
    if !name.is_ascii() {
        return Err(IfpError::InvalidName {
            value: String::from_utf8_lossy(name).into_owned(),
        });
    }
    Ok(name.iter().map(|&b| char::from(b)).collect())
}

/// Consume and discard `len` bytes
pub(crate) fn skip<R: Read + ?Sized>(r: &mut R, len: usize) -> Result<(), IfpError> {
    let mut scratch = [0u8; SCRATCH_LEN];
    let mut remaining = len;
    while remaining > 0 {
        let n = remaining.min(SCRATCH_LEN);
        r.read_exact(&mut scratch[..n])?;
        remaining -= n;
    }
    Ok(())
}

/// Vec capacity for `count` records read from the stream
pub(crate) fn capacity_hint(count: u32) -> usize {
    count.min(MAX_PREALLOC) as usize
}

// =============================================================================
// Writers
// =============================================================================

pub(crate) fn write_i16<W: Write + ?Sized>(w: &mut W, v: i16) -> Result<(), IfpError> {
    w.write_i16::<LittleEndian>(v)?;
    Ok(())
}

pub(crate) fn write_u32<W: Write + ?Sized>(w: &mut W, v: u32) -> Result<(), IfpError> {
    w.write_u32::<LittleEndian>(v)?;
    Ok(())
}

pub(crate) fn write_f32<W: Write + ?Sized>(w: &mut W, v: f32) -> Result<(), IfpError> {
    w.write_f32::<LittleEndian>(v)?;
    Ok(())
}

pub(crate) fn write_tag<W: Write + ?Sized>(w: &mut W, tag: &[u8; 4]) -> Result<(), IfpError> {
    w.write_all(tag)?;
    Ok(())
}

/// Write `value` into a `max_len`-byte slot, null-terminated and zero-padded
///
/// Fails before writing anything when the string plus its terminator does
/// not fit.
pub(crate) fn write_fixed_string<W: Write + ?Sized>(
    w: &mut W,
    value: &str,
    max_len: usize,
) -> Result<(), IfpError> {
    check_fixed_string(value, max_len)?;
    w.write_all(value.as_bytes())?;
    write_zeros(w, max_len - value.len())
}

/// Check that `value` is NUL-free ASCII and fits a `max_len`-byte slot with
/// its null terminator
pub(crate) fn check_fixed_string(value: &str, max_len: usize) -> Result<(), IfpError> {
    if !value.is_ascii() || value.contains('\0') {
        return Err(IfpError::InvalidName {
            value: value.to_string(),
        });
    }
    if value.len() >= max_len {
        return Err(IfpError::StringTooLong {
            value: value.to_string(),
            max_len,
        });
    }
    Ok(())
}

/// Write `len` zero bytes
pub(crate) fn write_zeros<W: Write + ?Sized>(w: &mut W, len: usize) -> Result<(), IfpError> {
    let zeros = [0u8; SCRATCH_LEN];
    let mut remaining = len;
    while remaining > 0 {
        let n = remaining.min(SCRATCH_LEN);
        w.write_all(&zeros[..n])?;
        remaining -= n;
    }
    Ok(())
}

/// Narrow a count or size to its 32-bit field
pub(crate) fn to_u32(field: &'static str, value: impl TryInto<u64>) -> Result<u32, IfpError> {
    let value: u64 = value.try_into().unwrap_or(u64::MAX);
    u32::try_from(value).map_err(|_| IfpError::SizeOverflow { field, value })
}

// =============================================================================
// Alignment
// =============================================================================

/// Bytes needed after `len` to reach the next multiple of `align`
pub(crate) fn padding_for(len: u64, align: u64) -> u64 {
    (align - len % align) % align
}

/// `len` rounded up to the next multiple of `align`
pub(crate) fn align_up(len: u64, align: u64) -> u64 {
    len + padding_for(len, align)
}

pub(crate) fn tag_str(tag: &'static [u8; 4]) -> &'static str {
    std::str::from_utf8(tag).unwrap_or("????")
}

/// Writer adapter that tracks how many bytes went through it
pub(crate) struct CountingWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> CountingWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub(crate) fn written(&self) -> u64 {
        self.written
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_fixed_string_consumes_full_width() {
        let data = b"walk\0junk\0\0\0XYZ";
        let mut r: &[u8] = data;
        assert_eq!(read_fixed_string(&mut r, 12).unwrap(), "walk");
        assert_eq!(r, b"XYZ");
    }

    #[test]
    fn test_read_fixed_string_without_terminator() {
        let mut r: &[u8] = b"ABCD";
        assert_eq!(read_fixed_string(&mut r, 4).unwrap(), "ABCD");
    }

    #[test]
    fn test_write_fixed_string_pads_with_zeros() {
        let mut out = Vec::new();
        write_fixed_string(&mut out, "Model", 24).unwrap();
        assert_eq!(out.len(), 24);
        assert_eq!(&out[..5], b"Model");
        assert!(out[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_fixed_string_rejects_full_slot() {
        let mut out = Vec::new();
        let result = write_fixed_string(&mut out, "ABCD", 4);
        assert!(matches!(
            result,
            Err(IfpError::StringTooLong { max_len: 4, .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_fixed_string_rejects_non_ascii() {
        let mut r: &[u8] = b"\xFF\xFEab\0\0\0\0";
        assert!(matches!(
            read_fixed_string(&mut r, 8),
            Err(IfpError::InvalidName { .. })
        ));

        let mut out = Vec::new();
        for value in ["caf\u{e9}", "a\0b"] {
            assert!(matches!(
                write_fixed_string(&mut out, value, 24),
                Err(IfpError::InvalidName { .. })
            ));
        }
        assert!(out.is_empty());
    }

    #[test]
    fn test_huge_fixed_string_is_truncated() {
        let mut r: &[u8] = b"short\0\0\0";
        assert!(matches!(
            read_fixed_string(&mut r, 0xFFFF_FFF0),
            Err(IfpError::Truncated)
        ));
    }

    #[test]
    fn test_to_u32() {
        assert_eq!(to_u32("count", 7usize).unwrap(), 7);
        assert!(matches!(
            to_u32("size", u64::from(u32::MAX) + 1),
            Err(IfpError::SizeOverflow { field: "size", value }) if value == 1 << 32
        ));
    }

    #[test]
    fn test_read_arrays_advance_exact_width() {
        let mut data = Vec::new();
        for v in [1i16, -2, 4096] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&7u32.to_le_bytes());
        let mut r: &[u8] = &data;
        assert_eq!(read_i16_array::<_, 3>(&mut r).unwrap(), [1, -2, 4096]);
        assert_eq!(read_u32(&mut r).unwrap(), 7);
        assert!(r.is_empty());
    }

    #[test]
    fn test_short_read_is_truncated() {
        let mut r: &[u8] = &[1, 2, 3];
        assert!(matches!(read_u32(&mut r), Err(IfpError::Truncated)));
    }

    #[test]
    fn test_skip_past_end_is_truncated() {
        let mut r: &[u8] = &[0; 10];
        assert!(matches!(skip(&mut r, 600), Err(IfpError::Truncated)));
    }

    #[test]
    fn test_expect_tag_mismatch() {
        let mut r: &[u8] = b"CPAX";
        let err = expect_tag(&mut r, b"CPAN").unwrap_err();
        assert!(matches!(
            err,
            IfpError::UnexpectedTag { expected: "CPAN", ref found } if found == "CPAX"
        ));
    }

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(0, 4), 0);
        assert_eq!(padding_for(5, 4), 3);
        assert_eq!(padding_for(8, 4), 0);
        assert_eq!(padding_for(100, 2048), 1948);
        assert_eq!(align_up(2049, 2048), 4096);
    }

    #[test]
    fn test_counting_writer() {
        let mut w = CountingWriter::new(Vec::new());
        write_u32(&mut w, 1).unwrap();
        write_zeros(&mut w, 300).unwrap();
        assert_eq!(w.written(), 304);
    }
}
