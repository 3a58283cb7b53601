//! BER/DER length-octet encoding (§4.2).
//!
//! Writing always produces the canonical DER form: short form under 128,
//! otherwise the minimum number of long-form length octets with no leading
//! zero padding. Output never uses indefinite length — that's an input-only
//! accommodation (§1, §6.1 Non-goals).
//!
//! Reading accepts short form, long form with up to 8 length octets
//! (tolerating leading zero padding, keeping at most 4 significant octets
//! after stripping), and — only where the caller explicitly allows it —
//! indefinite length, signalled by [`Length::Indefinite`].

use crate::cursor::{Reader, Writer};
use crate::error::{DecodeError, DecodeErrorKind, EncodeError, EncodeResult};
use crate::limits::Limits;

/// A decoded length: either a concrete byte count or the indefinite-length
/// sentinel (§3.3).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Length {
    Definite(usize),
    Indefinite,
}

impl Length {
    pub fn definite(self) -> Result<usize, DecodeError> {
        match self {
            Length::Definite(n) => Ok(n),
            Length::Indefinite => Err(DecodeError::new(DecodeErrorKind::IndefiniteNotPermitted)),
        }
    }
}

/// Writes `len` in canonical DER form.
pub fn write_length(writer: &mut Writer, len: usize) -> EncodeResult<()> {
    if len < 0x80 {
        return writer.put(len as u8);
    }
    let bytes = len.to_be_bytes();
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    let sig = &bytes[first_nonzero..];
    writer.put(0x80 | sig.len() as u8)?;
    writer.put_all(sig)
}

/// Reads a length field, permitting indefinite length only when
/// `allow_indefinite` is set. `limits.max_int_length` bounds the returned
/// definite length (§3.3) unless `bounded` is false, in which case only the
/// buffer's remaining length is the ceiling (the "long-length reader" of
/// §3.3, used once the validator already knows it's walking a larger
/// container).
pub fn read_length(
    reader: &mut Reader<'_>,
    limits: &Limits,
    allow_indefinite: bool,
    bounded: bool,
) -> Result<Length, DecodeError> {
    let first = reader.get()?;
    if first & 0x80 == 0 {
        return Ok(Length::Definite(first as usize));
    }
    let count = (first & 0x7F) as usize;
    if count == 0 {
        if !allow_indefinite {
            return Err(DecodeError::bad_data("indefinite length not permitted here"));
        }
        return Ok(Length::Indefinite);
    }
    if count > 8 {
        return Err(DecodeError::new(DecodeErrorKind::Overflow {
            reason: "more than 8 length octets".into(),
        }));
    }
    let octets = reader.get_n(count)?;
    let first_nonzero = octets.iter().position(|&b| b != 0);
    let significant = match first_nonzero {
        None => return Ok(Length::Definite(0)), // fully-zero long length, tolerated
        Some(i) => &octets[i..],
    };
    if significant.len() > 4 {
        return Err(DecodeError::new(DecodeErrorKind::Overflow {
            reason: "length exceeds 4 significant octets".into(),
        }));
    }
    let mut value: u64 = 0;
    for &b in significant {
        value = (value << 8) | b as u64;
    }
    let value = value as usize;
    let ceiling = if bounded { limits.max_int_length } else { reader.remaining() };
    if value > ceiling {
        return Err(DecodeError::new(DecodeErrorKind::Overflow {
            reason: "decoded length exceeds the configured limit".into(),
        }));
    }
    Ok(Length::Definite(value))
}
