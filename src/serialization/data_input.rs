//! Read half of the binary cursor.

use crate::error::{GridError, Result};
use bytes::Buf;
use std::io::Cursor;

use super::data_output::StringForm;

/// Trait for reading primitive values from the GridCache binary format.
///
/// All multi-byte values are read in big-endian byte order. Every read
/// mirrors a [`super::DataOutput`] write; reading past the end of the
/// buffer fails with [`GridError::UnexpectedEndOfStream`] and no partial
/// value is ever returned.
pub trait DataInput {
    /// Reads a single byte (i8).
    fn read_byte(&mut self) -> Result<i8>;

    /// Reads a boolean from a single byte.
    fn read_bool(&mut self) -> Result<bool>;

    /// Reads a 16-bit signed integer in big-endian order.
    fn read_short(&mut self) -> Result<i16>;

    /// Reads a 32-bit signed integer in big-endian order.
    fn read_int(&mut self) -> Result<i32>;

    /// Reads a 64-bit signed integer in big-endian order.
    fn read_long(&mut self) -> Result<i64>;

    /// Reads a 32-bit floating point in big-endian order.
    fn read_float(&mut self) -> Result<f32>;

    /// Reads a 64-bit floating point in big-endian order.
    fn read_double(&mut self) -> Result<f64>;

    /// Reads the specified number of raw bytes.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>>;

    /// Reads a tagged string in any of its four wire forms.
    fn read_string(&mut self) -> Result<String>;
}

/// A buffer-based implementation of `DataInput`.
#[derive(Debug)]
pub struct ObjectDataInput<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ObjectDataInput<'a> {
    /// Creates a new `ObjectDataInput` from the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Returns the number of bytes remaining to be read.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Returns the current position in the buffer.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Drains and returns all bytes remaining in the buffer.
    pub fn take_remaining(&mut self) -> Vec<u8> {
        let mut rest = vec![0u8; self.cursor.remaining()];
        self.cursor.copy_to_slice(&mut rest);
        rest
    }

    fn ensure_remaining(&self, n: usize) -> Result<()> {
        if self.cursor.remaining() < n {
            Err(GridError::UnexpectedEndOfStream {
                needed: n,
                remaining: self.cursor.remaining(),
            })
        } else {
            Ok(())
        }
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.ensure_remaining(1)?;
        Ok(self.cursor.get_u8())
    }

    fn read_u16(&mut self) -> Result<u16> {
        self.ensure_remaining(2)?;
        Ok(self.cursor.get_u16())
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.ensure_remaining(4)?;
        Ok(self.cursor.get_u32())
    }
}

impl DataInput for ObjectDataInput<'_> {
    fn read_byte(&mut self) -> Result<i8> {
        self.ensure_remaining(1)?;
        Ok(self.cursor.get_i8())
    }

    fn read_bool(&mut self) -> Result<bool> {
        self.ensure_remaining(1)?;
        Ok(self.cursor.get_u8() != 0)
    }

    fn read_short(&mut self) -> Result<i16> {
        self.ensure_remaining(2)?;
        Ok(self.cursor.get_i16())
    }

    fn read_int(&mut self) -> Result<i32> {
        self.ensure_remaining(4)?;
        Ok(self.cursor.get_i32())
    }

    fn read_long(&mut self) -> Result<i64> {
        self.ensure_remaining(8)?;
        Ok(self.cursor.get_i64())
    }

    fn read_float(&mut self) -> Result<f32> {
        self.ensure_remaining(4)?;
        Ok(self.cursor.get_f32())
    }

    fn read_double(&mut self) -> Result<f64> {
        self.ensure_remaining(8)?;
        Ok(self.cursor.get_f64())
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.ensure_remaining(len)?;
        let mut buf = vec![0u8; len];
        self.cursor.copy_to_slice(&mut buf);
        Ok(buf)
    }

    fn read_string(&mut self) -> Result<String> {
        let form = StringForm::from_tag(self.read_u8()?)?;
        match form {
            StringForm::Ascii | StringForm::Utf8 => {
                let len = self.read_u16()? as usize;
                let bytes = self.read_bytes(len)?;
                String::from_utf8(bytes).map_err(|e| {
                    GridError::Serialization(format!("invalid UTF-8 string: {}", e))
                })
            }
            StringForm::AsciiHuge => {
                let len = self.read_u32()? as usize;
                let bytes = self.read_bytes(len)?;
                String::from_utf8(bytes).map_err(|e| {
                    GridError::Serialization(format!("invalid UTF-8 string: {}", e))
                })
            }
            StringForm::Utf16Huge => {
                let units = self.read_u32()? as usize;
                let mut buf = Vec::with_capacity(units);
                for _ in 0..units {
                    buf.push(self.read_u16()?);
                }
                String::from_utf16(&buf).map_err(|e| {
                    GridError::Serialization(format!("invalid UTF-16 string: {}", e))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{DataOutput, ObjectDataOutput};
    use super::*;

    fn round_trip_string(s: &str) {
        let mut output = ObjectDataOutput::new();
        output.write_string(s).unwrap();
        let bytes = output.into_bytes();
        let mut input = ObjectDataInput::new(&bytes);
        assert_eq!(input.read_string().unwrap(), s);
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn test_new_input() {
        let data = [1, 2, 3, 4];
        let input = ObjectDataInput::new(&data);
        assert_eq!(input.remaining(), 4);
        assert_eq!(input.position(), 0);
    }

    #[test]
    fn test_read_byte() {
        let data = [42u8, 0xFF];
        let mut input = ObjectDataInput::new(&data);
        assert_eq!(input.read_byte().unwrap(), 42);
        assert_eq!(input.read_byte().unwrap(), -1);
    }

    #[test]
    fn test_read_bool() {
        let data = [1u8, 0, 42];
        let mut input = ObjectDataInput::new(&data);
        assert!(input.read_bool().unwrap());
        assert!(!input.read_bool().unwrap());
        assert!(input.read_bool().unwrap());
    }

    #[test]
    fn test_read_short_big_endian() {
        let data = [0x01, 0x02];
        let mut input = ObjectDataInput::new(&data);
        assert_eq!(input.read_short().unwrap(), 0x0102);
    }

    #[test]
    fn test_read_int_big_endian() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut input = ObjectDataInput::new(&data);
        assert_eq!(input.read_int().unwrap(), 0x01020304);
    }

    #[test]
    fn test_read_long_big_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut input = ObjectDataInput::new(&data);
        assert_eq!(input.read_long().unwrap(), 0x0102030405060708);
    }

    #[test]
    fn test_read_float() {
        let data = [0x3F, 0x80, 0x00, 0x00];
        let mut input = ObjectDataInput::new(&data);
        assert_eq!(input.read_float().unwrap(), 1.0f32);
    }

    #[test]
    fn test_read_double() {
        let data = [0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let mut input = ObjectDataInput::new(&data);
        assert_eq!(input.read_double().unwrap(), 1.0f64);
    }

    #[test]
    fn test_read_bytes() {
        let data = [1, 2, 3, 4, 5];
        let mut input = ObjectDataInput::new(&data);
        assert_eq!(input.read_bytes(3).unwrap(), vec![1, 2, 3]);
        assert_eq!(input.remaining(), 2);
    }

    #[test]
    fn test_take_remaining() {
        let data = [1, 2, 3, 4, 5];
        let mut input = ObjectDataInput::new(&data);
        input.read_bytes(2).unwrap();
        assert_eq!(input.take_remaining(), vec![3, 4, 5]);
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn test_short_ascii_string_round_trip() {
        round_trip_string("ten chars!");
    }

    #[test]
    fn test_empty_string_round_trip() {
        round_trip_string("");
    }

    #[test]
    fn test_utf8_string_round_trip() {
        round_trip_string("héllo wörld");
        round_trip_string("こんにちは");
    }

    #[test]
    fn test_huge_ascii_string_round_trip() {
        round_trip_string(&"a".repeat(70_000));
    }

    #[test]
    fn test_huge_utf16_string_round_trip() {
        let mut s = "a".repeat(70_000);
        s.push('é');
        round_trip_string(&s);
    }

    #[test]
    fn test_huge_utf16_supplementary_plane_round_trip() {
        // forces surrogate pairs in the UTF-16 form
        let mut s = "a".repeat(70_000);
        s.push('🚀');
        round_trip_string(&s);
    }

    #[test]
    fn test_insufficient_data_primitives() {
        let data = [0x01];
        let mut input = ObjectDataInput::new(&data);
        assert!(matches!(
            input.read_int(),
            Err(GridError::UnexpectedEndOfStream {
                needed: 4,
                remaining: 1
            })
        ));
    }

    #[test]
    fn test_insufficient_data_bytes() {
        let data = [1, 2, 3];
        let mut input = ObjectDataInput::new(&data);
        assert!(input.read_bytes(5).is_err());
    }

    #[test]
    fn test_truncated_string_body() {
        // ascii tag, claims 4 bytes, carries 2
        let data = [1, 0, 4, b'h', b'i'];
        let mut input = ObjectDataInput::new(&data);
        assert!(matches!(
            input.read_string(),
            Err(GridError::UnexpectedEndOfStream { .. })
        ));
    }

    #[test]
    fn test_unknown_string_tag() {
        let data = [9, 0, 0];
        let mut input = ObjectDataInput::new(&data);
        assert!(matches!(
            input.read_string(),
            Err(GridError::Serialization(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_body() {
        let data = [1, 0, 2, 0xFF, 0xFE];
        let mut input = ObjectDataInput::new(&data);
        assert!(input.read_string().is_err());
    }

    #[test]
    fn test_position_advances() {
        let data = [0, 0, 0, 42, 1, 2, 3, 4];
        let mut input = ObjectDataInput::new(&data);
        input.read_int().unwrap();
        assert_eq!(input.position(), 4);
        input.read_int().unwrap();
        assert_eq!(input.position(), 8);
    }
}
