//! Write half of the binary cursor.

use crate::error::{GridError, Result};
use bytes::{BufMut, BytesMut};

/// Wire tags for the four string forms.
///
/// A producer picks the form from the string's content alone: the short
/// forms carry a u16 length prefix and require the encoded length to fit
/// 16 bits; the huge forms carry a u32 prefix. ASCII forms are chosen iff
/// every character encodes to a single byte. Both sides of the wire derive
/// the same choice deterministically, so the split is a bit-exact contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum StringForm {
    /// u16 length + single-byte characters.
    Ascii = 1,
    /// u16 byte length + UTF-8 bytes.
    Utf8 = 2,
    /// u32 length + single-byte characters.
    AsciiHuge = 3,
    /// u32 UTF-16 unit count + big-endian UTF-16 code units.
    Utf16Huge = 4,
}

impl StringForm {
    pub(crate) fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Self::Ascii),
            2 => Ok(Self::Utf8),
            3 => Ok(Self::AsciiHuge),
            4 => Ok(Self::Utf16Huge),
            _ => Err(GridError::Serialization(format!(
                "unknown string form tag: {}",
                tag
            ))),
        }
    }

    /// Selects the form for a string from its content.
    pub(crate) fn select(v: &str) -> Self {
        let utf8_len = v.len();
        let ascii = utf8_len == v.chars().count();
        match (utf8_len <= u16::MAX as usize, ascii) {
            (true, true) => Self::Ascii,
            (true, false) => Self::Utf8,
            (false, true) => Self::AsciiHuge,
            (false, false) => Self::Utf16Huge,
        }
    }
}

/// Trait for writing primitive values in the GridCache binary format.
///
/// All multi-byte values are written in big-endian byte order.
pub trait DataOutput {
    /// Writes a single byte (i8).
    fn write_byte(&mut self, v: i8) -> Result<()>;

    /// Writes a boolean as a single byte (0 for false, 1 for true).
    fn write_bool(&mut self, v: bool) -> Result<()>;

    /// Writes a 16-bit signed integer in big-endian order.
    fn write_short(&mut self, v: i16) -> Result<()>;

    /// Writes a 32-bit signed integer in big-endian order.
    fn write_int(&mut self, v: i32) -> Result<()>;

    /// Writes a 64-bit signed integer in big-endian order.
    fn write_long(&mut self, v: i64) -> Result<()>;

    /// Writes a 32-bit floating point in big-endian order.
    fn write_float(&mut self, v: f32) -> Result<()>;

    /// Writes a 64-bit floating point in big-endian order.
    fn write_double(&mut self, v: f64) -> Result<()>;

    /// Writes raw bytes without length prefix.
    fn write_bytes(&mut self, v: &[u8]) -> Result<()>;

    /// Writes a string in its content-derived tagged form.
    fn write_string(&mut self, v: &str) -> Result<()>;
}

/// A buffer-based implementation of `DataOutput`.
#[derive(Debug)]
pub struct ObjectDataOutput {
    buffer: BytesMut,
}

impl ObjectDataOutput {
    /// Creates a new `ObjectDataOutput` with default capacity.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(256),
        }
    }

    /// Creates a new `ObjectDataOutput` with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Returns the written bytes as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the output and returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.to_vec()
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clears the buffer, removing all written data.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for ObjectDataOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl DataOutput for ObjectDataOutput {
    fn write_byte(&mut self, v: i8) -> Result<()> {
        self.buffer.put_i8(v);
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.buffer.put_u8(if v { 1 } else { 0 });
        Ok(())
    }

    fn write_short(&mut self, v: i16) -> Result<()> {
        self.buffer.put_i16(v);
        Ok(())
    }

    fn write_int(&mut self, v: i32) -> Result<()> {
        self.buffer.put_i32(v);
        Ok(())
    }

    fn write_long(&mut self, v: i64) -> Result<()> {
        self.buffer.put_i64(v);
        Ok(())
    }

    fn write_float(&mut self, v: f32) -> Result<()> {
        self.buffer.put_f32(v);
        Ok(())
    }

    fn write_double(&mut self, v: f64) -> Result<()> {
        self.buffer.put_f64(v);
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.buffer.put_slice(v);
        Ok(())
    }

    fn write_string(&mut self, v: &str) -> Result<()> {
        let form = StringForm::select(v);
        self.buffer.put_u8(form as u8);
        match form {
            StringForm::Ascii | StringForm::Utf8 => {
                self.buffer.put_u16(v.len() as u16);
                self.buffer.put_slice(v.as_bytes());
            }
            StringForm::AsciiHuge => {
                self.buffer.put_u32(v.len() as u32);
                self.buffer.put_slice(v.as_bytes());
            }
            StringForm::Utf16Huge => {
                let units = v.encode_utf16().count();
                self.buffer.put_u32(units as u32);
                for unit in v.encode_utf16() {
                    self.buffer.put_u16(unit);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_output_is_empty() {
        let output = ObjectDataOutput::new();
        assert!(output.is_empty());
        assert_eq!(output.len(), 0);
    }

    #[test]
    fn test_write_byte() {
        let mut output = ObjectDataOutput::new();
        output.write_byte(42).unwrap();
        assert_eq!(output.as_bytes(), &[42u8]);
    }

    #[test]
    fn test_write_byte_negative() {
        let mut output = ObjectDataOutput::new();
        output.write_byte(-1).unwrap();
        assert_eq!(output.as_bytes(), &[0xFF]);
    }

    #[test]
    fn test_write_bool() {
        let mut output = ObjectDataOutput::new();
        output.write_bool(true).unwrap();
        output.write_bool(false).unwrap();
        assert_eq!(output.as_bytes(), &[1, 0]);
    }

    #[test]
    fn test_write_short_big_endian() {
        let mut output = ObjectDataOutput::new();
        output.write_short(0x0102).unwrap();
        assert_eq!(output.as_bytes(), &[0x01, 0x02]);
    }

    #[test]
    fn test_write_int_big_endian() {
        let mut output = ObjectDataOutput::new();
        output.write_int(0x01020304).unwrap();
        assert_eq!(output.as_bytes(), &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_write_long_big_endian() {
        let mut output = ObjectDataOutput::new();
        output.write_long(0x0102030405060708).unwrap();
        assert_eq!(
            output.as_bytes(),
            &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
        );
    }

    #[test]
    fn test_write_float() {
        let mut output = ObjectDataOutput::new();
        output.write_float(1.0).unwrap();
        assert_eq!(output.as_bytes(), &[0x3F, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn test_write_double() {
        let mut output = ObjectDataOutput::new();
        output.write_double(1.0).unwrap();
        assert_eq!(output.len(), 8);
    }

    #[test]
    fn test_write_bytes_no_prefix() {
        let mut output = ObjectDataOutput::new();
        output.write_bytes(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(output.as_bytes(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_write_short_ascii_string() {
        let mut output = ObjectDataOutput::new();
        output.write_string("test").unwrap();
        assert_eq!(
            output.as_bytes(),
            &[StringForm::Ascii as u8, 0, 4, b't', b'e', b's', b't']
        );
    }

    #[test]
    fn test_write_empty_string_is_ascii_form() {
        let mut output = ObjectDataOutput::new();
        output.write_string("").unwrap();
        assert_eq!(output.as_bytes(), &[StringForm::Ascii as u8, 0, 0]);
    }

    #[test]
    fn test_write_utf8_string_selects_utf8_form() {
        let mut output = ObjectDataOutput::new();
        output.write_string("héllo").unwrap();
        assert_eq!(output.as_bytes()[0], StringForm::Utf8 as u8);
        // two-byte prefix carries the UTF-8 byte length, not the char count
        assert_eq!(&output.as_bytes()[1..3], &[0, 6]);
    }

    #[test]
    fn test_select_ascii_short() {
        assert_eq!(StringForm::select("plain"), StringForm::Ascii);
    }

    #[test]
    fn test_select_utf8_short() {
        assert_eq!(StringForm::select("héllo"), StringForm::Utf8);
    }

    #[test]
    fn test_select_ascii_huge_by_length_alone() {
        // all-ASCII but past the u16 prefix capacity
        let s = "a".repeat(70_000);
        assert_eq!(StringForm::select(&s), StringForm::AsciiHuge);
    }

    #[test]
    fn test_select_utf16_huge() {
        let mut s = "a".repeat(70_000);
        s.push('é');
        assert_eq!(StringForm::select(&s), StringForm::Utf16Huge);
    }

    #[test]
    fn test_select_boundary_at_u16_max() {
        let s = "a".repeat(65_535);
        assert_eq!(StringForm::select(&s), StringForm::Ascii);
        let s = "a".repeat(65_536);
        assert_eq!(StringForm::select(&s), StringForm::AsciiHuge);
    }

    #[test]
    fn test_string_form_tag_round_trip() {
        for tag in 1..=4u8 {
            let form = StringForm::from_tag(tag).unwrap();
            assert_eq!(form as u8, tag);
        }
    }

    #[test]
    fn test_string_form_invalid_tag() {
        assert!(StringForm::from_tag(0).is_err());
        assert!(StringForm::from_tag(5).is_err());
    }

    #[test]
    fn test_into_bytes() {
        let mut output = ObjectDataOutput::new();
        output.write_int(42).unwrap();
        assert_eq!(output.into_bytes(), vec![0, 0, 0, 42]);
    }

    #[test]
    fn test_clear() {
        let mut output = ObjectDataOutput::new();
        output.write_int(42).unwrap();
        output.clear();
        assert!(output.is_empty());
    }
}
