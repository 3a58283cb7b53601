//! OCTET STRING (§4.2).
//!
//! The body is passed through unchanged. A constructed OCTET STRING — the
//! legacy Netscape encoding, a sequence of primitive OCTET STRING segments —
//! is accepted on read by concatenating each inner segment into one
//! contiguous buffer; it is never produced on write (DER only emits the
//! primitive form, §6.1).

use crate::cursor::{Reader, Writer};
use crate::error::{DecodeError, DecodeResult, EncodeResult};
use crate::limits::Limits;
use crate::tag::{universal, Tag};

use super::header::{read_eoc, read_header, peek_is_eoc};
use super::length::{write_length, Length};
use super::tagging::{plan, TagPlan};

fn octet_string_tag() -> Tag {
    Tag::universal(universal::OCTET_STRING)
}

pub fn write_octet_string(writer: &mut Writer, value: &[u8], tag: i32) -> EncodeResult<()> {
    match plan(tag, octet_string_tag()) {
        TagPlan::Use(t) => {
            writer.put(t.to_octet())?;
            write_length(writer, value.len())?;
        }
        TagPlan::Skip => {
            write_length(writer, value.len())?;
        }
    }
    writer.put_all(value)
}

pub fn read_octet_string(reader: &mut Reader<'_>, limits: &Limits, tag: i32) -> DecodeResult<Vec<u8>> {
    match plan(tag, octet_string_tag()) {
        TagPlan::Use(expected) => read_octet_string_tagged(reader, limits, expected),
        TagPlan::Skip => {
            let len = super::length::read_length(reader, limits, false, true)?;
            match len {
                Length::Definite(n) => Ok(reader.get_n(n)?.to_vec()),
                Length::Indefinite => Err(DecodeError::bad_data("indefinite OCTET STRING requires a tag to drive segment reads")),
            }
        }
    }
}

fn read_octet_string_tagged(
    reader: &mut Reader<'_>,
    limits: &Limits,
    expected: Tag,
) -> DecodeResult<Vec<u8>> {
    let saved = reader.save_position();
    let header = read_header(reader, limits, true)?;
    if header.tag.class != expected.class || header.tag.number != expected.number {
        return Err(DecodeError::bad_data("unexpected tag reading OCTET STRING"));
    }
    if !header.tag.constructed {
        reader.restore_position(saved);
        let header = read_header(reader, limits, false)?;
        let len = header.length.definite()?;
        return Ok(reader.get_n(len)?.to_vec());
    }

    // Constructed (Netscape-legacy) encoding: a sequence of primitive OCTET
    // STRING segments, definite- or indefinite-length outer wrapper.
    let mut out = Vec::new();
    match header.length {
        Length::Definite(total) => {
            let end = reader.position() + total;
            while reader.position() < end {
                out.extend(read_octet_string_segment(reader, limits)?);
            }
        }
        Length::Indefinite => loop {
            if peek_is_eoc(reader)? {
                read_eoc(reader)?;
                break;
            }
            out.extend(read_octet_string_segment(reader, limits)?);
        },
    }
    Ok(out)
}

fn read_octet_string_segment(reader: &mut Reader<'_>, limits: &Limits) -> DecodeResult<Vec<u8>> {
    let header = read_header(reader, limits, false)?;
    if header.tag.number != universal::OCTET_STRING || header.tag.constructed {
        return Err(DecodeError::bad_data("expected a primitive OCTET STRING segment"));
    }
    let len = header.length.definite()?;
    Ok(reader.get_n(len)?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let mut w = Writer::new();
        write_octet_string(&mut w, b"hello", crate::tag::DEFAULT_TAG).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes, [&[0x04, 0x05][..], b"hello"].concat());
        let mut r = Reader::new(&bytes);
        let decoded = read_octet_string(&mut r, &Limits::default(), crate::tag::DEFAULT_TAG).unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn constructed_segments_are_concatenated() {
        // 24 80 (constructed OCTET STRING, indefinite)
        //   04 02 'h' 'e'
        //   04 03 'l' 'l' 'o'
        // 00 00
        let bytes = [
            0x24, 0x80, 0x04, 0x02, b'h', b'e', 0x04, 0x03, b'l', b'l', b'o', 0x00, 0x00,
        ];
        let mut r = Reader::new(&bytes);
        let decoded = read_octet_string(&mut r, &Limits::default(), crate::tag::DEFAULT_TAG).unwrap();
        assert_eq!(decoded, b"hello");
    }
}
