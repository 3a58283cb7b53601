//! The character-set canonicaliser (§4.4): detects the actual character set
//! of a string claimed to be one of the ASN.1 string types, reverses common
//! sender errors, and converts between that set and a host string.
//!
//! The string-type lattice (§3.4) is narrowest-first:
//! `PrintableString ⊂ IA5String ⊂ T61String (8859-1) ⊂ BMPString (UCS-2)`.
//! The canonicaliser's output is always the narrowest form that losslessly
//! represents the input (the lattice invariant, §3.4).

use crate::tag::universal;

/// The canonical ASN.1 string type a value has been narrowed to (§3.4).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum StringKind {
    PrintableString,
    Ia5String,
    T61String,
    BmpString,
}

impl StringKind {
    pub fn universal_tag(self) -> u32 {
        match self {
            StringKind::PrintableString => universal::PRINTABLE_STRING,
            StringKind::Ia5String => universal::IA5_STRING,
            StringKind::T61String => universal::TELETEX_STRING,
            StringKind::BmpString => universal::BMP_STRING,
        }
    }
}

/// A canonicalised string: its narrowest representable kind plus the Unicode
/// scalar values it carries (the host-native form regardless of kind — the
/// wire encoding is derived from `kind` at write time).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CanonicalString {
    pub kind: StringKind,
    pub text: String,
}

const PRINTABLE_CHARS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789 '()+,-./:=?";

fn is_printable_char(c: char) -> bool {
    PRINTABLE_CHARS.contains(c)
}

fn is_ia5_char(c: char) -> bool {
    // 7-bit ASCII minus control characters (§3.4).
    (c as u32) < 0x80 && !c.is_control()
}

fn narrowest_kind_for(text: &str) -> StringKind {
    if text.chars().all(is_printable_char) {
        StringKind::PrintableString
    } else if text.chars().all(is_ia5_char) {
        StringKind::Ia5String
    } else if text.chars().all(|c| (c as u32) <= 0xFF) {
        StringKind::T61String
    } else {
        StringKind::BmpString
    }
}

/// Validates that `s` contains only characters permitted by the ASN.1
/// string type named by `tag` (the universal tag number). Used to check
/// caller-supplied text before it is written (§4.4 `checkTextStringData`).
pub fn check_text_string_data(s: &str, universal_tag: u32) -> bool {
    match universal_tag {
        universal::PRINTABLE_STRING => s.chars().all(is_printable_char),
        universal::IA5_STRING | universal::VISIBLE_STRING => s.chars().all(is_ia5_char),
        universal::TELETEX_STRING => s.chars().all(|c| (c as u32) <= 0xFF),
        universal::BMP_STRING => s.chars().all(|c| (c as u32) <= 0xFFFF),
        universal::UTF8_STRING => true,
        _ => false,
    }
}

/// Folds a T61String's `0xC8 X` floating-diacritic escape sequences into
/// their precomposed 8859-1 code points (§4.4). Recognises the six umlaut
/// combinations listed in §4.4; any other `0xC8 X` pair is left as-is since
/// its meaning is unspecified.
fn fold_t61_diacritics(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0xC8 && i + 1 < bytes.len() {
            let folded = match bytes[i + 1] {
                b'a' => Some(0xE4u8), // ä
                b'A' => Some(0xC4),   // Ä
                b'o' => Some(0xF6),   // ö
                b'O' => Some(0xD6),   // Ö
                b'u' => Some(0xFC),   // ü
                b'U' => Some(0xDC),   // Ü
                _ => None,
            };
            if let Some(code) = folded {
                out.push(code);
                i += 2;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

/// Decodes big-endian UCS-2 bytes into a `String`, with a byte-order swap if
/// the content looks little-endian-padded (the "BMPString containing only
/// 8-bit values" sender error manifests as alternating `00 xx` vs `xx 00`
/// patterns; true big-endian BMP content has the high byte first).
fn decode_ucs2_be(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let mut s = String::with_capacity(bytes.len() / 2);
    for chunk in bytes.chunks(2) {
        let unit = u16::from_be_bytes([chunk[0], chunk[1]]);
        s.push(char::from_u32(unit as u32)?);
    }
    Some(s)
}

/// Detects a BMPString whose content is plain ASCII/8859-1 text padded with
/// zero high bytes (scenario 11, §8.2) — a common sender error — and
/// returns the demoted text if so.
fn demote_padded_bmp(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    if bytes.chunks(2).all(|c| c[0] == 0x00) {
        let text: String = bytes.chunks(2).map(|c| c[1] as char).collect();
        return Some(text);
    }
    None
}

/// Rejects overlong UTF-8: `str::from_utf8` already refuses overlong
/// encodings (they aren't valid UTF-8 at all), so this is a thin documenting
/// wrapper over the standard decoder (§4.4, §6.1).
fn decode_canonical_utf8(bytes: &[u8]) -> Option<&str> {
    std::str::from_utf8(bytes).ok()
}

/// Decodes wire bytes declared as ASN.1 type `declared_tag`, reversing
/// common sender errors and narrowing to the lattice's tightest
/// representable kind (§4.4 decode direction).
pub fn decode_canonical(bytes: &[u8], declared_tag: u32) -> Option<CanonicalString> {
    let text = match declared_tag {
        universal::PRINTABLE_STRING | universal::IA5_STRING | universal::VISIBLE_STRING
        | universal::NUMERIC_STRING | universal::GENERAL_STRING => {
            std::str::from_utf8(bytes).ok()?.to_string()
        }
        universal::TELETEX_STRING => {
            let folded = fold_t61_diacritics(bytes);
            folded.iter().map(|&b| b as char).collect()
        }
        universal::BMP_STRING => {
            if let Some(demoted) = demote_padded_bmp(bytes) {
                demoted
            } else {
                decode_ucs2_be(bytes)?
            }
        }
        universal::UTF8_STRING => decode_canonical_utf8(bytes)?.to_string(),
        _ => return None,
    };
    let kind = narrowest_kind_for(&text);
    Some(CanonicalString { kind, text })
}

/// Encodes a canonicalised string to wire bytes in its narrowest form.
/// UTF-8 is never emitted — it is an input-only accommodation (§4.4, §6.1).
pub fn encode_canonical(s: &CanonicalString) -> Vec<u8> {
    match s.kind {
        StringKind::PrintableString | StringKind::Ia5String => s.text.as_bytes().to_vec(),
        StringKind::T61String => s.text.chars().map(|c| c as u8).collect(),
        StringKind::BmpString => {
            let mut out = Vec::with_capacity(s.text.chars().count() * 2);
            for c in s.text.chars() {
                out.extend_from_slice(&(c as u32 as u16).to_be_bytes());
            }
            out
        }
    }
}

/// Classifies native text into the narrowest lattice kind it fits,
/// independent of any prior declared tag — used when building a string
/// field from scratch rather than decoding one off the wire (§4.4 encode
/// direction).
pub fn classify(text: &str) -> CanonicalString {
    CanonicalString { kind: narrowest_kind_for(text), text: text.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_11_bmp_padded_ascii_demotes_to_printable() {
        let bytes = [0x00, b'a', 0x00, b'b', 0x00, b'c'];
        let decoded = decode_canonical(&bytes, universal::BMP_STRING).unwrap();
        assert_eq!(decoded.kind, StringKind::PrintableString);
        assert_eq!(decoded.text, "abc");
        let reencoded = encode_canonical(&decoded);
        assert_eq!(reencoded, b"abc");
    }

    #[test]
    fn scenario_12_t61_floating_diaeresis_folds() {
        let bytes = [0xC8, b'a'];
        let decoded = decode_canonical(&bytes, universal::TELETEX_STRING).unwrap();
        assert_eq!(decoded.text, "\u{E4}");
        let reencoded = encode_canonical(&decoded);
        assert_eq!(reencoded.len(), 1);
        assert_eq!(reencoded[0], 0xE4);
    }

    #[test]
    fn t61_unrecognised_escape_left_as_is() {
        let bytes = [0xC8, b'z'];
        let decoded = decode_canonical(&bytes, universal::TELETEX_STRING).unwrap();
        assert_eq!(decoded.text.as_bytes(), &[0xC8, b'z']);
    }

    #[test]
    fn narrowing_is_tightest_fit() {
        assert_eq!(classify("hello").kind, StringKind::PrintableString);
        assert_eq!(classify("a_b").kind, StringKind::Ia5String); // underscore not in PrintableString
        assert_eq!(classify("caf\u{E9}").kind, StringKind::T61String); // é fits in 8859-1
        assert_eq!(classify("\u{4E2D}").kind, StringKind::BmpString); // needs UCS-2
    }

    #[test]
    fn overlong_utf8_rejected() {
        // overlong 2-byte encoding of NUL: C0 80
        let bytes = [0xC0, 0x80];
        assert!(decode_canonical(&bytes, universal::UTF8_STRING).is_none());
    }

    #[test]
    fn check_text_string_data_rejects_out_of_range() {
        assert!(!check_text_string_data("abc_def", universal::PRINTABLE_STRING));
        assert!(check_text_string_data("abc_def", universal::IA5_STRING));
    }

    #[test]
    fn roundtrip_property_canonical_input_is_stable() {
        for text in ["HELLO 123", "a.b-c", "caf\u{E9}", "\u{4E2D}\u{6587}"] {
            let s = classify(text);
            let encoded = encode_canonical(&s);
            let decoded = decode_canonical(&encoded, s.kind.universal_tag()).unwrap();
            assert_eq!(decoded.text, text);
        }
    }
}
