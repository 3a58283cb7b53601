//! BIT STRING (§4.2).
//!
//! An unused-bits count (0–7) precedes the data octets. Writers always emit
//! the minimum unused-bits count for the supplied bit length; readers reject
//! an unused-bits count greater than 7 (§4.3). When a bit string is used as
//! a flag enumeration, bit 0 in the ASN.1 sense is the most-significant bit
//! of the first data byte — the reverse of the natural byte order — so the
//! conversions here expose both the raw octets (as written on the wire) and
//! a reversed-bit-order view for flag use (§4.2).

use crate::cursor::{Reader, Writer};
use crate::error::{DecodeError, DecodeResult, EncodeResult};
use crate::limits::Limits;
use crate::tag::{universal, Tag};

use super::header::read_header;
use super::length::{write_length, Length};
use super::tagging::{plan, TagPlan};

/// A decoded BIT STRING: the data octets as they appeared on the wire, plus
/// how many trailing bits of the final octet are padding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitString {
    pub bytes: Vec<u8>,
    pub unused_bits: u8,
}

impl BitString {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        BitString { bytes, unused_bits: 0 }
    }

    /// Number of meaningful bits.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 - self.unused_bits as usize
    }

    /// Reads bit `index` (0 = most significant bit of the first byte, the
    /// ASN.1 flag-enumeration convention, §4.2).
    pub fn get_flag(&self, index: usize) -> bool {
        let byte = index / 8;
        let bit_in_byte = 7 - (index % 8);
        self.bytes.get(byte).map(|b| b & (1 << bit_in_byte) != 0).unwrap_or(false)
    }
}

fn bitstring_tag() -> Tag {
    Tag::universal(universal::BIT_STRING)
}

pub fn write_bit_string(writer: &mut Writer, value: &BitString, tag: i32) -> EncodeResult<()> {
    let content_len = 1 + value.bytes.len();
    match plan(tag, bitstring_tag()) {
        TagPlan::Use(t) => {
            writer.put(t.to_octet())?;
            write_length(writer, content_len)?;
        }
        TagPlan::Skip => {
            write_length(writer, content_len)?;
        }
    }
    writer.put(value.unused_bits)?;
    writer.put_all(&value.bytes)
}

pub fn read_bit_string(reader: &mut Reader<'_>, limits: &Limits, tag: i32) -> DecodeResult<BitString> {
    let len = match plan(tag, bitstring_tag()) {
        TagPlan::Use(expected) => {
            let header = read_header(reader, limits, false)?;
            if header.tag != expected {
                return Err(DecodeError::bad_data("unexpected tag reading BIT STRING"));
            }
            header.length
        }
        TagPlan::Skip => super::length::read_length(reader, limits, false, true)?,
    };
    let len = match len {
        Length::Definite(n) => n,
        Length::Indefinite => return Err(DecodeError::bad_data("BIT STRING cannot be indefinite-length here")),
    };
    if len == 0 {
        return Err(DecodeError::bad_data("BIT STRING must carry an unused-bits octet"));
    }
    let unused_bits = reader.get()?;
    if unused_bits > 7 {
        return Err(DecodeError::bad_data("BIT STRING unused-bits count greater than 7"));
    }
    let bytes = reader.get_n(len - 1)?.to_vec();
    if bytes.is_empty() && unused_bits != 0 {
        return Err(DecodeError::bad_data("empty BIT STRING must have zero unused bits"));
    }
    Ok(BitString { bytes, unused_bits })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let bs = BitString { bytes: vec![0b1010_0000], unused_bits: 4 };
        let mut w = Writer::new();
        write_bit_string(&mut w, &bs, crate::tag::DEFAULT_TAG).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes, vec![0x03, 0x02, 0x04, 0b1010_0000]);
        let mut r = Reader::new(&bytes);
        let decoded = read_bit_string(&mut r, &Limits::default(), crate::tag::DEFAULT_TAG).unwrap();
        assert_eq!(decoded, bs);
    }

    #[test]
    fn rejects_unused_bits_over_seven() {
        let bytes = [0x03, 0x02, 0x08, 0x00];
        let mut r = Reader::new(&bytes);
        assert!(read_bit_string(&mut r, &Limits::default(), crate::tag::DEFAULT_TAG).is_err());
    }

    #[test]
    fn flag_bit_order_is_msb_first() {
        let bs = BitString { bytes: vec![0b1000_0001], unused_bits: 0 };
        assert!(bs.get_flag(0));
        assert!(!bs.get_flag(1));
        assert!(bs.get_flag(7));
    }
}
