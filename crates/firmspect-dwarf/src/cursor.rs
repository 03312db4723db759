//! Bounds-checked reader over a debug section's bytes.

use crate::{DwarfError, Result};

/// Position-tracking reader with a per-file byte order.
///
/// Debug sections default to big-endian; a byte-swapped container flips
/// every multi-byte read.
#[derive(Debug)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    big_endian: bool,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub fn new(data: &'a [u8], big_endian: bool) -> Self {
        Self {
            data,
            pos: 0,
            big_endian,
        }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(DwarfError::TruncatedStream);
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b: [u8; 2] = self.take(2)?.try_into().unwrap_or_default();
        Ok(if self.big_endian {
            u16::from_be_bytes(b)
        } else {
            u16::from_le_bytes(b)
        })
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b: [u8; 4] = self.take(4)?.try_into().unwrap_or_default();
        Ok(if self.big_endian {
            u32::from_be_bytes(b)
        } else {
            u32::from_le_bytes(b)
        })
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let b: [u8; 8] = self.take(8)?.try_into().unwrap_or_default();
        Ok(if self.big_endian {
            u64::from_be_bytes(b)
        } else {
            u64::from_le_bytes(b)
        })
    }

    /// Read a NUL-terminated string at the current position, consuming the
    /// terminator.
    pub fn read_cstr(&mut self) -> Result<String> {
        let rest = &self.data[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(DwarfError::TruncatedStream)?;
        let s = String::from_utf8_lossy(&rest[..end]).into_owned();
        self.pos += end + 1;
        Ok(s)
    }
}

/// Read a NUL-terminated string from `data` at `offset` without a cursor.
pub fn cstr_at(data: &[u8], offset: usize) -> Result<String> {
    if offset > data.len() {
        return Err(DwarfError::TruncatedStream);
    }
    let rest = &data[offset..];
    let end = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(DwarfError::TruncatedStream)?;
    Ok(String::from_utf8_lossy(&rest[..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endian_reads() {
        let data = [0x12, 0x34, 0x56, 0x78];
        let mut be = Cursor::new(&data, true);
        assert_eq!(be.read_u32().unwrap(), 0x1234_5678);

        let mut le = Cursor::new(&data, false);
        assert_eq!(le.read_u32().unwrap(), 0x7856_3412);
    }

    #[test]
    fn test_truncated_read() {
        let mut cursor = Cursor::new(&[0x01, 0x02], true);
        assert!(matches!(
            cursor.read_u32(),
            Err(DwarfError::TruncatedStream)
        ));
        // Position is untouched by a failed read.
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_cstr() {
        let data = b"abc\0def\0";
        let mut cursor = Cursor::new(data, true);
        assert_eq!(cursor.read_cstr().unwrap(), "abc");
        assert_eq!(cursor.position(), 4);
        assert_eq!(cstr_at(data, 4).unwrap(), "def");
        assert!(cstr_at(b"no-nul", 0).is_err());
    }
}
