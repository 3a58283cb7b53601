//! The encoding validator (§4.3): walks a complete encoded object once,
//! checking well-formedness, nesting depth, and the
//! `AlgorithmIdentifier`+`BIT/OCTET STRING` "hole" pattern that signals
//! encapsulated content (e.g. a `SubjectPublicKeyInfo`'s key BIT STRING, or
//! an X.509 extension's OCTET STRING value).
//!
//! The hole-detection heuristic tracks a tiny per-sibling-list state machine
//! (§4.3):
//!
//! ```text
//! START --SEQUENCE--> S1 --OID--> S2
//! S2 --NULL-->     S3  (expect BIT STRING hole as the *next sibling*)
//! S2 --BOOLEAN-->  S4  (expect OCTET STRING hole as the *next sibling*)
//! S2 --SEQUENCE--> S3  (expect BIT STRING hole as the *next sibling*)
//! ```
//!
//! A child `SEQUENCE` whose first two elements are `OID` then one of
//! `NULL`/`BOOLEAN`/`SEQUENCE` sets an expectation for whichever primitive
//! string type immediately follows it among its parent's children. When that
//! expectation is met, the string's content is speculatively parsed as a
//! nested ASN.1 object; on any mismatch, the probe's result is discarded and
//! the string is treated as opaque — the one "clear error and retry" case
//! (§9.1) in this codec, implemented by simply constructing an independent
//! [`Reader`] over the already-extracted content and discarding it on
//! failure, since nothing about the outer cursor needs rolling back.

use crate::cursor::Reader;
use crate::error::{DecodeError, DecodeErrorKind};
use crate::limits::Limits;
use crate::tag::{universal, Class};

use crate::ber::header::read_header;
use crate::ber::length::Length;

/// What the *next* sibling at this nesting level is expected to be, set by
/// a preceding `AlgorithmIdentifier`-shaped `SEQUENCE` (§4.3).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PendingHole {
    BitString,
    OctetString,
}

/// Walks `bytes` as a single complete encoded object and returns its total
/// encoded length, or a structural error. This is the sole entry point
/// described in §4.3.
pub fn check_object_encoding(bytes: &[u8], limits: &Limits) -> Result<usize, DecodeError> {
    let mut reader = Reader::new(bytes);
    walk_item(&mut reader, 0, limits, None)?;
    Ok(reader.position())
}

fn tag_supported(class: Class, number: u32) -> bool {
    if class == Class::Context {
        return number <= 30;
    }
    if class != Class::Universal {
        return false;
    }
    matches!(
        number,
        universal::BOOLEAN
            | universal::INTEGER
            | universal::ENUMERATED
            | universal::NULL
            | universal::OBJECT_IDENTIFIER
            | universal::SEQUENCE
            | universal::SET
            | universal::BIT_STRING
            | universal::OCTET_STRING
            | universal::UTC_TIME
            | universal::GENERALIZED_TIME
            | universal::UTF8_STRING
            | universal::PRINTABLE_STRING
            | universal::IA5_STRING
            | universal::VISIBLE_STRING
            | universal::TELETEX_STRING
            | universal::NUMERIC_STRING
            | universal::GENERAL_STRING
            | universal::BMP_STRING
    )
}

/// Parses one complete item (tag, length, content) at the cursor, validating
/// it and recursing into constructed content. Returns the item's own tag
/// number (so a parent can track its first two children's kinds) and the
/// hole expectation it sets for its next sibling — `None` for anything that
/// isn't a qualifying `SEQUENCE`.
fn walk_item(
    reader: &mut Reader<'_>,
    depth: usize,
    limits: &Limits,
    expect: Option<PendingHole>,
) -> Result<(u32, Option<PendingHole>), DecodeError> {
    if depth > limits.max_nesting {
        return Err(DecodeError::new(DecodeErrorKind::NestingTooDeep {
            depth,
            limit: limits.max_nesting,
        }));
    }

    let header = read_header(reader, limits, true)?;
    if !tag_supported(header.tag.class, header.tag.number) {
        return Err(DecodeError::new(DecodeErrorKind::UnsupportedTag {
            class: header.tag.class as u8,
            number: header.tag.number,
        }));
    }
    if matches!(header.length, Length::Indefinite) && !header.tag.constructed {
        return Err(DecodeError::bad_data("indefinite length on a primitive tag"));
    }

    if header.tag.constructed {
        let shape = walk_constructed(reader, depth, limits, header.length)?;
        return Ok((header.tag.number, shape));
    }

    let len = header.length.definite()?;
    let body = reader.get_n(len)?;
    validate_primitive_content(header.tag.number, body)?;

    match header.tag.number {
        universal::BIT_STRING if expect == Some(PendingHole::BitString) => {
            probe_bit_string_hole(body, depth, limits);
        }
        universal::OCTET_STRING if expect == Some(PendingHole::OctetString) => {
            probe_octet_string_hole(body, depth, limits);
        }
        _ => {}
    }
    Ok((header.tag.number, None))
}

fn validate_primitive_content(tag_number: u32, body: &[u8]) -> Result<(), DecodeError> {
    match tag_number {
        universal::BOOLEAN => {
            if body.len() != 1 {
                return Err(DecodeError::bad_data("BOOLEAN content must be exactly one octet"));
            }
        }
        universal::NULL => {
            if !body.is_empty() {
                return Err(DecodeError::bad_data("NULL content must be zero length"));
            }
        }
        universal::UTC_TIME => {
            if !(body.len() == 11 || body.len() == 13) || body.last() != Some(&b'Z') {
                return Err(DecodeError::bad_data("malformed UTCTime"));
            }
        }
        universal::GENERALIZED_TIME => {
            if body.len() != 15 || body.last() != Some(&b'Z') {
                return Err(DecodeError::bad_data("malformed GeneralizedTime"));
            }
        }
        universal::BIT_STRING => {
            if body.is_empty() {
                return Err(DecodeError::bad_data("BIT STRING must carry an unused-bits octet"));
            }
            if body[0] > 7 {
                return Err(DecodeError::bad_data("BIT STRING unused-bits count greater than 7"));
            }
        }
        universal::OBJECT_IDENTIFIER => {
            // A tighter semantic ceiling than the raw codec's hard 32-byte
            // cap (§4.2 vs §4.3): no OID occurring in the certificate
            // profiles this core handles needs more than 30 content bytes.
            if body.is_empty() || body.len() > 30 {
                return Err(DecodeError::bad_data("OBJECT IDENTIFIER length out of range"));
            }
        }
        universal::INTEGER | universal::ENUMERATED => {
            // Any length, including zero, is tolerated for bug compatibility (§4.3).
        }
        _ => {}
    }
    Ok(())
}

fn walk_constructed(
    reader: &mut Reader<'_>,
    depth: usize,
    limits: &Limits,
    length: Length,
) -> Result<Option<PendingHole>, DecodeError> {
    let mut pending: Option<PendingHole> = None;
    let mut child_tags: Vec<u32> = Vec::with_capacity(2);

    match length {
        Length::Definite(len) => {
            let end = reader.position() + len;
            while reader.position() < end {
                let (child_tag, shape) = walk_item(reader, depth + 1, limits, pending.take())?;
                if child_tags.len() < 2 {
                    child_tags.push(child_tag);
                }
                pending = shape;
            }
            if reader.position() != end {
                return Err(DecodeError::bad_data("constructed content length mismatch"));
            }
        }
        Length::Indefinite => loop {
            if crate::ber::header::peek_is_eoc(reader)? {
                crate::ber::header::read_eoc(reader)?;
                break;
            }
            let (child_tag, shape) = walk_item(reader, depth + 1, limits, pending.take())?;
            if child_tags.len() < 2 {
                child_tags.push(child_tag);
            }
            pending = shape;
        },
    }

    Ok(classify_sequence(&child_tags))
}

fn classify_sequence(first_two: &[u32]) -> Option<PendingHole> {
    if first_two.len() < 2 || first_two[0] != universal::OBJECT_IDENTIFIER {
        return None;
    }
    match first_two[1] {
        universal::NULL | universal::SEQUENCE => Some(PendingHole::BitString),
        universal::BOOLEAN => Some(PendingHole::OctetString),
        _ => None,
    }
}

/// Speculatively parses a BIT STRING's content (after its unused-bits
/// octet) as a nested object. Treated as encapsulating iff it parses as
/// `SEQUENCE { INTEGER, ... }` consuming the whole body (§4.3). Any mismatch
/// is silently discarded — the string is simply opaque.
fn probe_bit_string_hole(body: &[u8], depth: usize, limits: &Limits) {
    if body.is_empty() {
        return;
    }
    let inner = &body[1..];
    let _ = try_parse_as_sequence_of_integer(inner, depth, limits);
}

/// Speculatively parses an OCTET STRING's content as a nested object.
fn probe_octet_string_hole(body: &[u8], depth: usize, limits: &Limits) {
    let _ = try_parse_as_any_object(body, depth, limits);
}

fn try_parse_as_sequence_of_integer(body: &[u8], depth: usize, limits: &Limits) -> Result<(), DecodeError> {
    let mut probe = Reader::new(body);
    let header = read_header(&mut probe, limits, true)?;
    if header.tag.number != universal::SEQUENCE || !header.tag.constructed {
        return Err(DecodeError::bad_data("not a SEQUENCE"));
    }
    walk_constructed(&mut probe, depth + 1, limits, header.length)?;
    if probe.position() != body.len() {
        return Err(DecodeError::bad_data("trailing bytes after probed SEQUENCE"));
    }
    Ok(())
}

fn try_parse_as_any_object(body: &[u8], depth: usize, limits: &Limits) -> Result<(), DecodeError> {
    if body.is_empty() {
        return Err(DecodeError::bad_data("empty hole candidate"));
    }
    let mut probe = Reader::new(body);
    let _ = walk_item(&mut probe, depth + 1, limits, None)?;
    if probe.position() != body.len() {
        return Err(DecodeError::bad_data("trailing bytes after probed object"));
    }
    Ok(())
}
