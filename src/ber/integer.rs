//! INTEGER, ENUMERATED, BOOLEAN, and NULL (§4.2).
//!
//! Integers are stored internally unsigned and serialised signed: a zero
//! octet is prepended iff the high bit of the most significant magnitude
//! byte is set, so a DER reader can never mistake a large unsigned value for
//! a negative one. A zero value encodes as `02 01 00`. Reading tolerates a
//! leading zero that merely clears the sign bit, and tolerates zero-length
//! content (some encoders emit `02 00` for zero).

use num_bigint::{BigInt, Sign};

use crate::cursor::{Reader, Writer};
use crate::error::{DecodeError, DecodeResult, EncodeResult};
use crate::limits::Limits;
use crate::tag::{universal, Tag};

use super::header::read_header;
use super::length::{read_length, write_length, Length};
use super::tagging::{plan, TagPlan};

fn integer_tag() -> Tag {
    Tag::universal(universal::INTEGER)
}

fn enumerated_tag() -> Tag {
    Tag::universal(universal::ENUMERATED)
}

/// Minimal signed-magnitude bytes for an unsigned magnitude `magnitude`
/// (big-endian, no leading zero bytes other than a single one needed to
/// clear the sign bit).
fn signed_bytes(magnitude: &[u8]) -> Vec<u8> {
    let trimmed: &[u8] = {
        let first_nonzero = magnitude.iter().position(|&b| b != 0);
        match first_nonzero {
            Some(i) => &magnitude[i..],
            None => &[],
        }
    };
    if trimmed.is_empty() {
        return vec![0];
    }
    if trimmed[0] & 0x80 != 0 {
        let mut out = Vec::with_capacity(trimmed.len() + 1);
        out.push(0);
        out.extend_from_slice(trimmed);
        out
    } else {
        trimmed.to_vec()
    }
}

fn write_tagged_bytes(writer: &mut Writer, natural: Tag, tag: i32, body: &[u8]) -> EncodeResult<()> {
    match plan(tag, natural) {
        TagPlan::Use(t) => {
            writer.put(t.to_octet())?;
            write_length(writer, body.len())?;
        }
        TagPlan::Skip => {
            write_length(writer, body.len())?;
        }
    }
    writer.put_all(body)
}

fn read_tagged_body<'a>(
    reader: &mut Reader<'a>,
    limits: &Limits,
    natural: Tag,
    tag: i32,
) -> DecodeResult<&'a [u8]> {
    let len = match plan(tag, natural) {
        TagPlan::Use(expected) => {
            let header = read_header(reader, limits, false)?;
            if header.tag != expected {
                return Err(DecodeError::bad_data(format!(
                    "expected tag (class {:?}, number {}), found (class {:?}, number {})",
                    expected.class, expected.number, header.tag.class, header.tag.number
                )));
            }
            header.length
        }
        TagPlan::Skip => read_length(reader, limits, false, true)?,
    };
    let len = match len {
        Length::Definite(n) => n,
        Length::Indefinite => {
            return Err(DecodeError::bad_data("INTEGER/ENUMERATED cannot be indefinite-length"))
        }
    };
    reader.get_n(len)
}

/// Writes an unsigned magnitude (big-endian, no required sign byte) as a
/// DER INTEGER, inserting the sign-extension byte per §4.2.
pub fn write_integer_bytes(writer: &mut Writer, magnitude: &[u8], tag: i32) -> EncodeResult<()> {
    let body = signed_bytes(magnitude);
    write_tagged_bytes(writer, integer_tag(), tag, &body)
}

/// Reads an INTEGER's raw signed-magnitude bytes and returns them already
/// reduced to their unsigned magnitude form (the leading zero that merely
/// clears the sign bit, if present, is stripped). Zero-length content is
/// tolerated and returned as `[0]` (§4.2, bug-for-bug compatibility).
pub fn read_integer_bytes(reader: &mut Reader<'_>, limits: &Limits, tag: i32) -> DecodeResult<Vec<u8>> {
    let bytes = read_tagged_body(reader, limits, integer_tag(), tag)?;
    if bytes.is_empty() {
        return Ok(vec![0]);
    }
    if bytes.len() > 1 && bytes[0] == 0 && bytes[1] & 0x80 == 0 {
        // Non-minimal encoding (extra leading zero beyond the one needed to
        // clear the sign bit). Not canonical, but reading tolerates it.
        Ok(bytes[1..].to_vec())
    } else if bytes[0] == 0 {
        Ok(bytes[1..].to_vec())
    } else {
        Ok(bytes.to_vec())
    }
}

/// Writes a `BigInt` as a DER INTEGER. Negative values are not expected in
/// the certificate domain (serial numbers, etc. are always non-negative)
/// but are supported for completeness via two's-complement encoding.
pub fn write_integer(writer: &mut Writer, value: &BigInt, tag: i32) -> EncodeResult<()> {
    let body = if value.sign() == Sign::Minus {
        value.to_signed_bytes_be()
    } else {
        signed_bytes(&value.to_bytes_be().1)
    };
    write_tagged_bytes(writer, integer_tag(), tag, &body)
}

/// Reads a DER INTEGER as a `BigInt`.
pub fn read_integer(reader: &mut Reader<'_>, limits: &Limits, tag: i32) -> DecodeResult<BigInt> {
    let bytes = read_tagged_body(reader, limits, integer_tag(), tag)?;
    if bytes.is_empty() {
        return Ok(BigInt::from(0));
    }
    Ok(BigInt::from_signed_bytes_be(bytes))
}

/// Writes a value that fits in an `i64` as a DER INTEGER (the "short
/// integer" fast path, sized so that writing returns 3–7 bytes per §4.2).
pub fn write_short_integer(writer: &mut Writer, value: i64, tag: i32) -> EncodeResult<()> {
    let body = if value < 0 {
        BigInt::from(value).to_signed_bytes_be()
    } else {
        signed_bytes(&value.to_be_bytes())
    };
    write_tagged_bytes(writer, integer_tag(), tag, &body)
}

/// Reads an INTEGER expected to fit in an `i64`.
pub fn read_short_integer(reader: &mut Reader<'_>, limits: &Limits, tag: i32) -> DecodeResult<i64> {
    let bytes = read_tagged_body(reader, limits, integer_tag(), tag)?;
    if bytes.len() > 8 {
        return Err(DecodeError::new(crate::error::DecodeErrorKind::Overflow {
            reason: "INTEGER does not fit in a short integer".into(),
        }));
    }
    if bytes.is_empty() {
        return Ok(0);
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut buf = [if negative { 0xFFu8 } else { 0u8 }; 8];
    buf[8 - bytes.len()..].copy_from_slice(bytes);
    Ok(i64::from_be_bytes(buf))
}

/// Writes a DER ENUMERATED value.
pub fn write_enumerated(writer: &mut Writer, value: i32, tag: i32) -> EncodeResult<()> {
    let body = signed_bytes(&(value as i64).to_be_bytes());
    write_tagged_bytes(writer, enumerated_tag(), tag, &body)
}

/// Reads a DER ENUMERATED value.
pub fn read_enumerated(reader: &mut Reader<'_>, limits: &Limits, tag: i32) -> DecodeResult<i32> {
    let bytes = read_tagged_body(reader, limits, enumerated_tag(), tag)?;
    if bytes.len() > 4 {
        return Err(DecodeError::new(crate::error::DecodeErrorKind::Overflow {
            reason: "ENUMERATED does not fit in 32 bits".into(),
        }));
    }
    if bytes.is_empty() {
        return Ok(0);
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut buf = [if negative { 0xFFu8 } else { 0u8 }; 4];
    buf[4 - bytes.len()..].copy_from_slice(bytes);
    Ok(i32::from_be_bytes(buf))
}

/// Writes a BOOLEAN. DER requires `0xFF` for true; any nonzero byte is
/// accepted as true on read.
pub fn write_boolean(writer: &mut Writer, value: bool, tag: i32) -> EncodeResult<()> {
    write_tagged_bytes(writer, Tag::universal(universal::BOOLEAN), tag, &[if value { 0xFF } else { 0x00 }])
}

/// Reads a BOOLEAN; content length must be exactly 1 (§4.3).
pub fn read_boolean(reader: &mut Reader<'_>, limits: &Limits, tag: i32) -> DecodeResult<bool> {
    let bytes = read_tagged_body(reader, limits, Tag::universal(universal::BOOLEAN), tag)?;
    if bytes.len() != 1 {
        return Err(DecodeError::bad_data("BOOLEAN content must be exactly one octet"));
    }
    Ok(bytes[0] != 0)
}

/// Writes a NULL (zero-length content).
pub fn write_null(writer: &mut Writer, tag: i32) -> EncodeResult<()> {
    write_tagged_bytes(writer, Tag::universal(universal::NULL), tag, &[])
}

/// Reads a NULL; content length must be exactly 0 (§4.3).
pub fn read_null(reader: &mut Reader<'_>, limits: &Limits, tag: i32) -> DecodeResult<()> {
    let bytes = read_tagged_body(reader, limits, Tag::universal(universal::NULL), tag)?;
    if !bytes.is_empty() {
        return Err(DecodeError::bad_data("NULL content must be zero length"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scenario_1_short_positive() {
        let mut w = Writer::new();
        write_short_integer(&mut w, 127, crate::tag::DEFAULT_TAG).unwrap();
        assert_eq!(w.into_bytes(), vec![0x02, 0x01, 0x7F]);
    }

    #[test]
    fn scenario_2_sign_byte_inserted() {
        let mut w = Writer::new();
        write_short_integer(&mut w, 128, crate::tag::DEFAULT_TAG).unwrap();
        assert_eq!(w.into_bytes(), vec![0x02, 0x02, 0x00, 0x80]);
    }

    #[test]
    fn zero_encodes_canonically() {
        let mut w = Writer::new();
        write_short_integer(&mut w, 0, crate::tag::DEFAULT_TAG).unwrap();
        assert_eq!(w.into_bytes(), vec![0x02, 0x01, 0x00]);
    }

    #[test]
    fn roundtrip_i64() {
        for v in [0i64, 1, -1, 127, 128, -128, 32767, -32768, i64::MAX, i64::MIN] {
            let mut w = Writer::new();
            write_short_integer(&mut w, v, crate::tag::DEFAULT_TAG).unwrap();
            let bytes = w.into_bytes();
            let mut r = Reader::new(&bytes);
            let decoded = read_short_integer(&mut r, &Limits::default(), crate::tag::DEFAULT_TAG).unwrap();
            assert_eq!(decoded, v);
        }
    }

    #[test]
    fn scenario_3_4_boolean() {
        let mut r = Reader::new(&[0x01, 0x01, 0x00]);
        assert_eq!(read_boolean(&mut r, &Limits::default(), crate::tag::DEFAULT_TAG).unwrap(), false);
        let mut r = Reader::new(&[0x01, 0x01, 0xFF]);
        assert_eq!(read_boolean(&mut r, &Limits::default(), crate::tag::DEFAULT_TAG).unwrap(), true);
    }

    #[test]
    fn tolerates_zero_length_integer() {
        let mut r = Reader::new(&[0x02, 0x00]);
        let v = read_integer_bytes(&mut r, &Limits::default(), crate::tag::DEFAULT_TAG).unwrap();
        assert_eq!(v, vec![0]);
    }

    #[test]
    fn implicit_context_tag() {
        let mut w = Writer::new();
        write_short_integer(&mut w, 5, 3).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes[0], 0x83); // context, primitive, tag 3
        let mut r = Reader::new(&bytes);
        assert_eq!(read_short_integer(&mut r, &Limits::default(), 3).unwrap(), 5);
    }

    #[test]
    fn no_tag_skips_tag_octet() {
        let mut w = Writer::new();
        write_length(&mut w, 1).unwrap();
        w.put(0x2A).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(read_short_integer(&mut r, &Limits::default(), crate::tag::NO_TAG).unwrap(), 0x2A);
    }
}
