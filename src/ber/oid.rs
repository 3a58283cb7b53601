//! OBJECT IDENTIFIER (§4.2).
//!
//! OIDs are handled as an opaque byte blob — tag, length, and body preserved
//! byte-for-byte — rather than decoded into an arc sequence, since the core
//! only ever needs to compare OIDs for equality against known algorithm
//! identifiers (§4.2, §4.6). Capped at `max_oid_len` bytes of content.

use crate::cursor::{Reader, Writer};
use crate::error::{DecodeError, DecodeResult, EncodeResult};
use crate::limits::Limits;
use crate::tag::universal;

use super::header::{read_header, write_header};
use super::length::Length;

/// An encoded OBJECT IDENTIFIER, preserved byte-for-byte (content only, not
/// including the tag/length header) for exact comparison.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ObjectIdentifier(pub Vec<u8>);

pub fn write_oid(writer: &mut Writer, oid: &ObjectIdentifier) -> EncodeResult<()> {
    write_header(writer, crate::tag::Tag::universal(universal::OBJECT_IDENTIFIER), oid.0.len())?;
    writer.put_all(&oid.0)
}

pub fn read_oid(reader: &mut Reader<'_>, limits: &Limits) -> DecodeResult<ObjectIdentifier> {
    let header = read_header(reader, limits, false)?;
    if header.tag.number != universal::OBJECT_IDENTIFIER || header.tag.constructed {
        return Err(DecodeError::bad_data("expected OBJECT IDENTIFIER"));
    }
    let len = match header.length {
        Length::Definite(n) => n,
        Length::Indefinite => return Err(DecodeError::bad_data("OBJECT IDENTIFIER cannot be indefinite-length")),
    };
    if len > limits.max_oid_len {
        return Err(DecodeError::bad_data("OBJECT IDENTIFIER exceeds the maximum supported length"));
    }
    if len == 0 {
        return Err(DecodeError::bad_data("OBJECT IDENTIFIER must have non-empty content"));
    }
    Ok(ObjectIdentifier(reader.get_n(len)?.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        // 1.2.840.113549.1.1.1 (rsaEncryption)
        let oid = ObjectIdentifier(vec![0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01]);
        let mut w = Writer::new();
        write_oid(&mut w, &oid).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let decoded = read_oid(&mut r, &Limits::default()).unwrap();
        assert_eq!(decoded, oid);
    }

    #[test]
    fn rejects_oversized() {
        let mut bytes = vec![0x06, 33];
        bytes.extend(std::iter::repeat(0x81).take(33));
        let mut r = Reader::new(&bytes);
        assert!(read_oid(&mut r, &Limits::default()).is_err());
    }
}
