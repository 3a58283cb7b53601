//! UTCTime and GeneralizedTime (§4.2).
//!
//! UTCTime is `YYMMDDHHMMSSZ` (13 chars) or `YYMMDDHHMMZ` (11 chars, seconds
//! omitted) with a mandatory `Z`. Its two-digit year is windowed: 50–99 maps
//! to 1950–1999, 00–49 to 2000–2049. GeneralizedTime is always
//! `YYYYMMDDHHMMSSZ` (15 chars), no fractional seconds. Writing always
//! produces the canonical form with seconds and `Z`; the encoded time is UTC
//! and conversion to local time is left to the caller (§9.2).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::cursor::{Reader, Writer};
use crate::error::{DecodeError, DecodeResult, EncodeResult};
use crate::limits::Limits;
use crate::tag::universal;

use super::header::{read_header, write_header};
use super::length::Length;

fn parse_2(s: &[u8]) -> Option<u32> {
    std::str::from_utf8(s).ok()?.parse().ok()
}

fn parse_digits(s: &[u8], n: usize) -> Option<u32> {
    if s.len() != n {
        return None;
    }
    parse_2(s)
}

/// Reads a UTCTime, returning seconds since the epoch (UTC).
pub fn read_utc_time(reader: &mut Reader<'_>, limits: &Limits) -> DecodeResult<i64> {
    let header = read_header(reader, limits, false)?;
    if header.tag.number != universal::UTC_TIME || header.tag.constructed {
        return Err(DecodeError::bad_data("expected UTCTime"));
    }
    let len = match header.length {
        Length::Definite(n) => n,
        Length::Indefinite => return Err(DecodeError::bad_data("UTCTime cannot be indefinite-length")),
    };
    let body = reader.get_n(len)?;
    parse_utc_time_body(body)
}

fn parse_utc_time_body(body: &[u8]) -> DecodeResult<i64> {
    if !(body.len() == 11 || body.len() == 13) || body.last() != Some(&b'Z') {
        return Err(DecodeError::bad_data("malformed UTCTime"));
    }
    let yy = parse_digits(&body[0..2], 2).ok_or_else(|| DecodeError::bad_data("bad UTCTime year"))?;
    let month = parse_digits(&body[2..4], 2).ok_or_else(|| DecodeError::bad_data("bad UTCTime month"))?;
    let day = parse_digits(&body[4..6], 2).ok_or_else(|| DecodeError::bad_data("bad UTCTime day"))?;
    let hour = parse_digits(&body[6..8], 2).ok_or_else(|| DecodeError::bad_data("bad UTCTime hour"))?;
    let minute = parse_digits(&body[8..10], 2).ok_or_else(|| DecodeError::bad_data("bad UTCTime minute"))?;
    let second = if body.len() == 13 {
        parse_digits(&body[10..12], 2).ok_or_else(|| DecodeError::bad_data("bad UTCTime second"))?
    } else {
        0
    };
    let year = if yy >= 50 { 1900 + yy } else { 2000 + yy };
    to_epoch(year as i32, month, day, hour, minute, second)
}

/// Writes a UTCTime from seconds since the epoch (UTC), always in the
/// canonical `YYMMDDHHMMSSZ` form.
pub fn write_utc_time(writer: &mut Writer, epoch_seconds: i64, tag: i32) -> EncodeResult<()> {
    let dt = from_epoch(epoch_seconds)?;
    let year = dt.year();
    let yy = if (1950..2050).contains(&year) {
        (year % 100) as u32
    } else {
        return Err(crate::error::EncodeError::new(crate::error::EncodeErrorKind::BadData {
            reason: "UTCTime year outside the representable 1950-2049 window".into(),
        }));
    };
    let body = format!(
        "{:02}{:02}{:02}{:02}{:02}{:02}Z",
        yy, dt.month, dt.day, dt.hour, dt.minute, dt.second
    );
    write_tagged_time(writer, universal::UTC_TIME, tag, body.as_bytes())
}

/// Reads a GeneralizedTime, returning seconds since the epoch (UTC).
pub fn read_generalized_time(reader: &mut Reader<'_>, limits: &Limits) -> DecodeResult<i64> {
    let header = read_header(reader, limits, false)?;
    if header.tag.number != universal::GENERALIZED_TIME || header.tag.constructed {
        return Err(DecodeError::bad_data("expected GeneralizedTime"));
    }
    let len = match header.length {
        Length::Definite(n) => n,
        Length::Indefinite => return Err(DecodeError::bad_data("GeneralizedTime cannot be indefinite-length")),
    };
    let body = reader.get_n(len)?;
    if body.len() != 15 || body.last() != Some(&b'Z') {
        return Err(DecodeError::bad_data("malformed GeneralizedTime"));
    }
    let year = std::str::from_utf8(&body[0..4])
        .ok()
        .and_then(|s| s.parse::<i32>().ok())
        .ok_or_else(|| DecodeError::bad_data("bad GeneralizedTime year"))?;
    let month = parse_digits(&body[4..6], 2).ok_or_else(|| DecodeError::bad_data("bad GeneralizedTime month"))?;
    let day = parse_digits(&body[6..8], 2).ok_or_else(|| DecodeError::bad_data("bad GeneralizedTime day"))?;
    let hour = parse_digits(&body[8..10], 2).ok_or_else(|| DecodeError::bad_data("bad GeneralizedTime hour"))?;
    let minute = parse_digits(&body[10..12], 2).ok_or_else(|| DecodeError::bad_data("bad GeneralizedTime minute"))?;
    let second = parse_digits(&body[12..14], 2).ok_or_else(|| DecodeError::bad_data("bad GeneralizedTime second"))?;
    to_epoch(year, month, day, hour, minute, second)
}

/// Writes a GeneralizedTime from seconds since the epoch (UTC), always in
/// the canonical `YYYYMMDDHHMMSSZ` form (no fractional seconds).
pub fn write_generalized_time(writer: &mut Writer, epoch_seconds: i64, tag: i32) -> EncodeResult<()> {
    let dt = from_epoch(epoch_seconds)?;
    let body = format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}Z",
        dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second
    );
    write_tagged_time(writer, universal::GENERALIZED_TIME, tag, body.as_bytes())
}

fn write_tagged_time(writer: &mut Writer, natural: u32, tag: i32, body: &[u8]) -> EncodeResult<()> {
    use super::tagging::{plan, TagPlan};
    match plan(tag, crate::tag::Tag::universal(natural)) {
        TagPlan::Use(t) => write_header(writer, t, body.len())?,
        TagPlan::Skip => super::length::write_length(writer, body.len())?,
    }
    writer.put_all(body)
}

struct Fields {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
}

fn from_epoch(epoch_seconds: i64) -> EncodeResult<Fields> {
    let dt = DateTime::<Utc>::from_timestamp(epoch_seconds, 0).ok_or_else(|| {
        crate::error::EncodeError::new(crate::error::EncodeErrorKind::BadData {
            reason: "epoch seconds out of range".into(),
        })
    })?;
    use chrono::Datelike;
    use chrono::Timelike;
    Ok(Fields {
        year: dt.year(),
        month: dt.month(),
        day: dt.day(),
        hour: dt.hour(),
        minute: dt.minute(),
        second: dt.second(),
    })
}

fn to_epoch(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DecodeResult<i64> {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DecodeError::bad_data("invalid calendar date in time field"))?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| DecodeError::bad_data("invalid time-of-day in time field"))?;
    let naive = NaiveDateTime::new(date, time);
    Ok(naive.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_5_utc_time_with_seconds() {
        let bytes = [0x17, 0x0D, b'9', b'9', b'0', b'1', b'0', b'1', b'0', b'0', b'0', b'0', b'0', b'0', b'Z'];
        let mut r = Reader::new(&bytes);
        let epoch = read_utc_time(&mut r, &Limits::default()).unwrap();
        assert_eq!(epoch, to_epoch(1999, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn scenario_6_y2k_window() {
        let text = b"000101000000Z";
        let mut bytes = vec![0x17, text.len() as u8];
        bytes.extend_from_slice(text);
        let mut r = Reader::new(&bytes);
        let epoch = read_utc_time(&mut r, &Limits::default()).unwrap();
        assert_eq!(epoch, to_epoch(2000, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn utc_time_without_seconds() {
        let text = b"9901010000Z";
        let mut bytes = vec![0x17, text.len() as u8];
        bytes.extend_from_slice(text);
        let mut r = Reader::new(&bytes);
        let epoch = read_utc_time(&mut r, &Limits::default()).unwrap();
        assert_eq!(epoch, to_epoch(1999, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn writer_always_includes_seconds_and_z() {
        let epoch = to_epoch(1999, 6, 15, 12, 30, 0).unwrap();
        let mut w = Writer::new();
        write_utc_time(&mut w, epoch, crate::tag::DEFAULT_TAG).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 2 + 13);
        assert!(bytes.ends_with(b"Z"));
        let mut r = Reader::new(&bytes);
        assert_eq!(read_utc_time(&mut r, &Limits::default()).unwrap(), epoch);
    }

    #[test]
    fn generalized_time_roundtrip() {
        let epoch = to_epoch(2038, 1, 19, 3, 14, 7).unwrap();
        let mut w = Writer::new();
        write_generalized_time(&mut w, epoch, crate::tag::DEFAULT_TAG).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(read_generalized_time(&mut r, &Limits::default()).unwrap(), epoch);
    }

    #[test]
    fn missing_z_rejected() {
        let text = b"990101000000X";
        let mut bytes = vec![0x17, text.len() as u8];
        bytes.extend_from_slice(text);
        let mut r = Reader::new(&bytes);
        assert!(read_utc_time(&mut r, &Limits::default()).is_err());
    }
}
