//! TLV wire primitives.
//!
//! Every variable-length field on the wire is framed as:
//! ```text
//! ┌──────────┬───────────┬───────────┐
//! │ Tag      │ Length    │ Value     │
//! │ 1 byte   │ 4 bytes   │ N bytes   │
//! │          │ uint32 BE │           │
//! └──────────┴───────────┴───────────┘
//! ```
//!
//! All multi-byte integers are Big Endian. A declared length must equal the
//! exact byte count of the value that follows; a shortfall is a protocol
//! error, never a truncation.

use bytes::{Buf, BufMut};

use crate::error::{Result, TombolaError};

/// Tag size in bytes.
pub const TAG_SIZE: usize = 1;

/// Length prefix size in bytes.
pub const LEN_SIZE: usize = 4;

/// Sanity cap on a single field value (1 MB).
///
/// A corrupt length prefix fails here instead of driving a giant allocation.
pub const MAX_FIELD_SIZE: u32 = 1_048_576;

/// Single-byte message and field tags.
///
/// The values are the stable one-to-one mapping spoken by the authority;
/// they never change between releases.
pub mod tags {
    /// Batch of bets: u32 count + N × BET messages.
    pub const BATCH: u8 = b'Z';
    /// One bet: u32 length + concatenated field TLVs.
    pub const BET: u8 = b'B';
    /// Agency identifier field.
    pub const AGENCY: u8 = b'A';
    /// First name field.
    pub const NAME: u8 = b'N';
    /// Surname field.
    pub const SURNAME: u8 = b'L';
    /// National document field.
    pub const DOCUMENT: u8 = b'D';
    /// Birth date field.
    pub const BIRTHDATE: u8 = b'H';
    /// Bet number field.
    pub const NUMBER: u8 = b'U';
    /// Poll request: i32 agency id, no TLV framing.
    pub const POLL: u8 = b'P';
    /// End of submission, no payload.
    pub const FINISH: u8 = b'F';
    /// Confirmation success, no payload (echoed number field in strict mode).
    pub const OK: u8 = b'O';
    /// Poll response: drawing not done yet, no payload.
    pub const AWAIT: u8 = b'W';
    /// Poll response: u32 count + N × DOCUMENT fields.
    pub const WINNERS: u8 = b'G';
}

/// Append one TLV field to a buffer: tag + u32 BE length + raw bytes.
pub fn put_field(buf: &mut impl BufMut, tag: u8, value: &str) {
    buf.put_u8(tag);
    buf.put_u32(value.len() as u32);
    buf.put_slice(value.as_bytes());
}

/// Encoded size of one TLV field.
#[inline]
pub fn field_len(value: &str) -> usize {
    TAG_SIZE + LEN_SIZE + value.len()
}

/// Cursor over a byte slice for decoding TLV structures.
///
/// Every read checks the remaining byte count first, so a corrupt or
/// truncated buffer surfaces as [`TombolaError::Protocol`] instead of an
/// overrun.
pub struct Decoder<'a> {
    buf: &'a [u8],
}

impl<'a> Decoder<'a> {
    /// Wrap a byte slice for decoding.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Remaining undecoded bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Whether every byte has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Read one tag byte.
    pub fn get_tag(&mut self) -> Result<u8> {
        if self.buf.remaining() < TAG_SIZE {
            return Err(TombolaError::Protocol(
                "Truncated buffer: missing tag byte".to_string(),
            ));
        }
        Ok(self.buf.get_u8())
    }

    /// Read a u32 Big Endian (length or count prefix).
    pub fn get_u32(&mut self) -> Result<u32> {
        if self.buf.remaining() < LEN_SIZE {
            return Err(TombolaError::Protocol(
                "Truncated buffer: missing u32 prefix".to_string(),
            ));
        }
        Ok(self.buf.get_u32())
    }

    /// Read exactly `n` raw bytes.
    pub fn get_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.buf.remaining() < n {
            return Err(TombolaError::Protocol(format!(
                "Declared length {} exceeds remaining {} bytes",
                n,
                self.buf.remaining()
            )));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    /// Read one full TLV field, validating that its tag is `expected`.
    ///
    /// Returns the field value as an owned UTF-8 string.
    pub fn get_field(&mut self, expected: u8) -> Result<String> {
        let tag = self.get_tag()?;
        if tag != expected {
            return Err(TombolaError::Protocol(format!(
                "Unexpected tag {:#04x}, expected {:#04x}",
                tag, expected
            )));
        }
        self.get_field_value()
    }

    /// Read the length + value of a field whose tag was already consumed.
    pub fn get_field_value(&mut self) -> Result<String> {
        let len = self.get_u32()?;
        if len > MAX_FIELD_SIZE {
            return Err(TombolaError::Protocol(format!(
                "Field length {} exceeds maximum {}",
                len, MAX_FIELD_SIZE
            )));
        }
        let raw = self.get_bytes(len as usize)?;
        String::from_utf8(raw.to_vec())
            .map_err(|e| TombolaError::Protocol(format!("Invalid UTF-8 in field: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_field_layout() {
        let mut buf = Vec::new();
        put_field(&mut buf, tags::NAME, "Juan");

        assert_eq!(buf.len(), field_len("Juan"));
        assert_eq!(buf[0], b'N');
        assert_eq!(&buf[1..5], &[0, 0, 0, 4]); // length 4, BE
        assert_eq!(&buf[5..], b"Juan");
    }

    #[test]
    fn test_put_field_empty_value() {
        let mut buf = Vec::new();
        put_field(&mut buf, tags::NUMBER, "");

        assert_eq!(buf.len(), TAG_SIZE + LEN_SIZE);
        assert_eq!(&buf[1..5], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_decoder_field_roundtrip() {
        let mut buf = Vec::new();
        put_field(&mut buf, tags::DOCUMENT, "30904465");

        let mut dec = Decoder::new(&buf);
        let value = dec.get_field(tags::DOCUMENT).unwrap();
        assert_eq!(value, "30904465");
        assert!(dec.is_empty());
    }

    #[test]
    fn test_decoder_rejects_wrong_tag() {
        let mut buf = Vec::new();
        put_field(&mut buf, tags::NAME, "Juan");

        let mut dec = Decoder::new(&buf);
        let err = dec.get_field(tags::DOCUMENT).unwrap_err();
        assert!(err.to_string().contains("Unexpected tag"));
    }

    #[test]
    fn test_decoder_rejects_truncated_value() {
        let mut buf = Vec::new();
        put_field(&mut buf, tags::NAME, "Juan");
        buf.truncate(buf.len() - 1); // chop one value byte

        let mut dec = Decoder::new(&buf);
        let err = dec.get_field(tags::NAME).unwrap_err();
        assert!(err.to_string().contains("exceeds remaining"));
    }

    #[test]
    fn test_decoder_rejects_missing_length() {
        let buf = [tags::NAME]; // tag only
        let mut dec = Decoder::new(&buf);
        assert!(dec.get_field(tags::NAME).is_err());
    }

    #[test]
    fn test_decoder_rejects_oversized_length() {
        let mut buf = Vec::new();
        buf.put_u8(tags::NAME);
        buf.put_u32(MAX_FIELD_SIZE + 1);

        let mut dec = Decoder::new(&buf);
        let err = dec.get_field(tags::NAME).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_decoder_empty_buffer() {
        let mut dec = Decoder::new(&[]);
        assert!(dec.is_empty());
        assert!(dec.get_tag().is_err());
        assert!(dec.get_u32().is_err());
    }

    #[test]
    fn test_decoder_sequential_fields() {
        let mut buf = Vec::new();
        put_field(&mut buf, tags::NAME, "Juan");
        put_field(&mut buf, tags::SURNAME, "Perez");

        let mut dec = Decoder::new(&buf);
        assert_eq!(dec.get_field(tags::NAME).unwrap(), "Juan");
        assert_eq!(dec.get_field(tags::SURNAME).unwrap(), "Perez");
        assert!(dec.is_empty());
    }

    #[test]
    fn test_tags_are_distinct() {
        let all = [
            tags::BATCH,
            tags::BET,
            tags::AGENCY,
            tags::NAME,
            tags::SURNAME,
            tags::DOCUMENT,
            tags::BIRTHDATE,
            tags::NUMBER,
            tags::POLL,
            tags::FINISH,
            tags::OK,
            tags::AWAIT,
            tags::WINNERS,
        ];
        for (i, a) in all.iter().enumerate() {
            for (j, b) in all.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Tag values must be one-to-one");
                }
            }
        }
    }
}
