//! The raw wire layer for the ASN.1 character-string family (§4.2).
//!
//! Each of PrintableString, IA5String, VisibleString, T61String, BMPString,
//! UTF8String, NumericString, and GeneralString is a distinct universal
//! tag. At this layer the content is just bytes — BMPString content is
//! still big-endian UCS-2 bytes, not yet decoded to a host string. The
//! character-set canonicaliser (`src/charset.rs`) sits above this and
//! performs the actual set detection/conversion; callers that already know
//! their tag use these functions directly.

use crate::cursor::{Reader, Writer};
use crate::error::{DecodeError, DecodeResult, EncodeResult};
use crate::limits::Limits;
use crate::tag::Tag;

use super::header::read_header;
use super::length::Length;
use super::tagging::{plan, TagPlan};

pub fn write_character_string(
    writer: &mut Writer,
    universal_tag: u32,
    tag: i32,
    bytes: &[u8],
) -> EncodeResult<()> {
    match plan(tag, Tag::universal(universal_tag)) {
        TagPlan::Use(t) => {
            writer.put(t.to_octet())?;
            super::length::write_length(writer, bytes.len())?;
        }
        TagPlan::Skip => {
            super::length::write_length(writer, bytes.len())?;
        }
    }
    writer.put_all(bytes)
}

pub fn read_character_string(
    reader: &mut Reader<'_>,
    limits: &Limits,
    universal_tag: u32,
    tag: i32,
) -> DecodeResult<Vec<u8>> {
    let len = match plan(tag, Tag::universal(universal_tag)) {
        TagPlan::Use(expected) => {
            let header = read_header(reader, limits, false)?;
            if header.tag.class != expected.class || header.tag.number != expected.number {
                return Err(DecodeError::bad_data(format!(
                    "expected character-string tag {}, found (class {:?}, number {})",
                    universal_tag, header.tag.class, header.tag.number
                )));
            }
            header.length
        }
        TagPlan::Skip => super::length::read_length(reader, limits, false, true)?,
    };
    match len {
        Length::Definite(n) => Ok(reader.get_n(n)?.to_vec()),
        Length::Indefinite => Err(DecodeError::bad_data("character string cannot be indefinite-length")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::universal;

    #[test]
    fn roundtrip_printable_string() {
        let mut w = Writer::new();
        write_character_string(&mut w, universal::PRINTABLE_STRING, crate::tag::DEFAULT_TAG, b"abc").unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes, [&[0x13, 0x03][..], b"abc"].concat());
        let mut r = Reader::new(&bytes);
        let decoded =
            read_character_string(&mut r, &Limits::default(), universal::PRINTABLE_STRING, crate::tag::DEFAULT_TAG)
                .unwrap();
        assert_eq!(decoded, b"abc");
    }

    #[test]
    fn wrong_tag_rejected() {
        let bytes = [0x16, 0x03, b'a', b'b', b'c']; // IA5String tag
        let mut r = Reader::new(&bytes);
        assert!(read_character_string(&mut r, &Limits::default(), universal::PRINTABLE_STRING, crate::tag::DEFAULT_TAG).is_err());
    }
}
