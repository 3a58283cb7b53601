//! Item headers: the tag-plus-length pair that precedes every BER/DER value
//! (§3.3), and the constructed-type readers built on top of it (§4.2).

use crate::cursor::{Reader, Writer};
use crate::error::{DecodeError, DecodeErrorKind, EncodeResult};
use crate::limits::Limits;
use crate::tag::{universal, Class, Tag};

use super::length::{read_length, write_length, Length};

/// A parsed item header: the tag octet, its length (possibly indefinite),
/// and the header's own size in bytes (§3.3).
#[derive(Copy, Clone, Debug)]
pub struct ItemHeader {
    pub tag: Tag,
    pub length: Length,
    pub header_len: usize,
}

/// Reads a tag octet and length field. `allow_indefinite` gates whether an
/// indefinite length is accepted (only constructed tags may carry one;
/// callers enforce that separately in the encoding validator, §4.3).
pub fn read_header(
    reader: &mut Reader<'_>,
    limits: &Limits,
    allow_indefinite: bool,
) -> Result<ItemHeader, DecodeError> {
    let start = reader.save_position();
    let tag_octet = reader.get()?;
    let tag = Tag::from_octet(tag_octet).ok_or(DecodeError::new(DecodeErrorKind::UnsupportedTag {
        class: tag_octet >> 6,
        number: 0x1F,
    }))?;
    let length = read_length(reader, limits, allow_indefinite, true)?;
    let header_len = reader.save_position() - start;
    Ok(ItemHeader { tag, length, header_len })
}

/// Writes a tag octet and a DER-canonical length field.
pub fn write_header(writer: &mut Writer, tag: Tag, content_len: usize) -> EncodeResult<()> {
    writer.put(tag.to_octet())?;
    write_length(writer, content_len)
}

/// The size, in bytes, of an object with `content_len` bytes of content once
/// wrapped in a single-byte tag plus a length field (§4.2 `sizeofObject`).
/// Content lengths requiring a high-tag-number (>30) encoding are not
/// supported (§3.2), so the tag is always exactly one octet.
pub fn sizeof_object(content_len: usize) -> usize {
    let len_octets = if content_len < 0x80 {
        1
    } else {
        let bytes = content_len.to_be_bytes();
        let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
        1 + (bytes.len() - first_nonzero)
    };
    1 + len_octets + content_len
}

fn expect_constructed(header: &ItemHeader, expected: Tag) -> Result<(), DecodeError> {
    if header.tag.class != expected.class || header.tag.number != expected.number {
        return Err(DecodeError::bad_data(format!(
            "expected tag (class {:?}, number {}), found (class {:?}, number {})",
            expected.class, expected.number, header.tag.class, header.tag.number
        )));
    }
    if !header.tag.constructed {
        return Err(DecodeError::bad_data("expected constructed encoding"));
    }
    Ok(())
}

/// Reads a `SEQUENCE` header and returns its body length (or the indefinite
/// sentinel).
pub fn read_sequence(reader: &mut Reader<'_>, limits: &Limits) -> Result<Length, DecodeError> {
    let header = read_header(reader, limits, true)?;
    expect_constructed(&header, Tag::universal_constructed(universal::SEQUENCE))?;
    Ok(header.length)
}

/// Reads a `SET` header and returns its body length (or the indefinite
/// sentinel).
pub fn read_set(reader: &mut Reader<'_>, limits: &Limits) -> Result<Length, DecodeError> {
    let header = read_header(reader, limits, true)?;
    expect_constructed(&header, Tag::universal_constructed(universal::SET))?;
    Ok(header.length)
}

/// Reads a constructed, context-specific `[n]` header (explicit tagging) and
/// returns its body length.
pub fn read_constructed(
    reader: &mut Reader<'_>,
    tag_number: u32,
    limits: &Limits,
) -> Result<Length, DecodeError> {
    let header = read_header(reader, limits, true)?;
    expect_constructed(&header, Tag::context(tag_number, true))?;
    Ok(header.length)
}

/// Writes a `SEQUENCE` header for a body of `content_len` bytes.
pub fn write_sequence_header(writer: &mut Writer, content_len: usize) -> EncodeResult<()> {
    write_header(writer, Tag::universal_constructed(universal::SEQUENCE), content_len)
}

/// Writes a `SET` header for a body of `content_len` bytes.
pub fn write_set_header(writer: &mut Writer, content_len: usize) -> EncodeResult<()> {
    write_header(writer, Tag::universal_constructed(universal::SET), content_len)
}

/// Writes an explicit `[n]` constructed header for a body of `content_len`
/// bytes.
pub fn write_constructed_header(
    writer: &mut Writer,
    tag_number: u32,
    content_len: usize,
) -> EncodeResult<()> {
    write_header(writer, Tag::context(tag_number, true), content_len)
}

/// Reads the `00 00` end-of-contents marker that terminates an
/// indefinite-length constructed encoding.
pub fn read_eoc(reader: &mut Reader<'_>) -> Result<(), DecodeError> {
    let bytes = reader.get_n(2)?;
    if bytes == [0x00, 0x00] {
        Ok(())
    } else {
        Err(DecodeError::bad_data("expected end-of-contents octets 00 00"))
    }
}

/// Peeks whether the next two bytes are the end-of-contents marker, without
/// consuming them on a mismatch.
pub fn peek_is_eoc(reader: &mut Reader<'_>) -> Result<bool, DecodeError> {
    let saved = reader.save_position();
    let is_eoc = matches!(reader.get_n(2), Ok([0x00, 0x00]));
    reader.restore_position(saved);
    Ok(is_eoc)
}
