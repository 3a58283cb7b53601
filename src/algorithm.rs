//! Algorithm identifiers (§3.6): a tagged enum over the small set of
//! algorithms actually supported, serialised as `SEQUENCE { oid OID,
//! parameters NULL or absent }`.

use crate::ber::header::{read_sequence, write_sequence_header};
use crate::ber::integer::{read_null, write_null};
use crate::ber::oid::{read_oid, write_oid, ObjectIdentifier};
use crate::cursor::{Reader, Writer};
use crate::error::{DecodeError, DecodeResult, EncodeResult};
use crate::limits::Limits;
use crate::tag::DEFAULT_TAG;

/// Digest algorithms the core understands (§2, §4.5 step 7: SHA-1 is the
/// default and only digest wired through the signer).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DigestAlgorithm {
    Sha1,
}

/// Public-key algorithms the core understands (§6.4 `PublicKey`/`Signer`).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyAlgorithm {
    Rsa,
    Dsa,
    Dh,
}

/// OID content bytes (sans tag/length) for the algorithms the core supports.
mod oids {
    pub const SHA1: &[u8] = &[0x2B, 0x0E, 0x03, 0x02, 0x1A];
    pub const RSA_ENCRYPTION: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01];
    pub const SHA1_WITH_RSA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x05];
    pub const DSA: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x38, 0x04, 0x01];
    pub const DSA_WITH_SHA1: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x38, 0x04, 0x03];
    pub const DH: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x03, 0x01];
}

impl DigestAlgorithm {
    fn oid(self) -> ObjectIdentifier {
        match self {
            DigestAlgorithm::Sha1 => ObjectIdentifier(oids::SHA1.to_vec()),
        }
    }
}

impl KeyAlgorithm {
    fn oid(self) -> ObjectIdentifier {
        match self {
            KeyAlgorithm::Rsa => ObjectIdentifier(oids::RSA_ENCRYPTION.to_vec()),
            KeyAlgorithm::Dsa => ObjectIdentifier(oids::DSA.to_vec()),
            KeyAlgorithm::Dh => ObjectIdentifier(oids::DH.to_vec()),
        }
    }
}

/// A signature algorithm: the combination of a digest and a key algorithm,
/// the thing actually written into a certificate's `signatureAlgorithm`
/// field (§4.5 step 7).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SignatureAlgorithm {
    Sha1WithRsa,
    Sha1WithDsa,
}

impl SignatureAlgorithm {
    fn oid(self) -> ObjectIdentifier {
        match self {
            SignatureAlgorithm::Sha1WithRsa => ObjectIdentifier(oids::SHA1_WITH_RSA.to_vec()),
            SignatureAlgorithm::Sha1WithDsa => ObjectIdentifier(oids::DSA_WITH_SHA1.to_vec()),
        }
    }

    /// Whether this algorithm's `SEQUENCE` carries a `NULL` parameters
    /// field (RSA-family) or omits parameters entirely (DSA-family).
    fn has_null_parameters(self) -> bool {
        matches!(self, SignatureAlgorithm::Sha1WithRsa)
    }

    pub fn key_algorithm(self) -> KeyAlgorithm {
        match self {
            SignatureAlgorithm::Sha1WithRsa => KeyAlgorithm::Rsa,
            SignatureAlgorithm::Sha1WithDsa => KeyAlgorithm::Dsa,
        }
    }
}

fn write_algorithm_identifier(
    writer: &mut Writer,
    oid: &ObjectIdentifier,
    null_parameters: bool,
) -> EncodeResult<()> {
    let mut body = Writer::sink();
    write_oid(&mut body, oid)?;
    if null_parameters {
        write_null(&mut body, DEFAULT_TAG)?;
    }
    let content_len = body.position();
    write_sequence_header(writer, content_len)?;
    write_oid(writer, oid)?;
    if null_parameters {
        write_null(writer, DEFAULT_TAG)?;
    }
    Ok(())
}

/// Writes `SEQUENCE { oid, NULL }` for a signature algorithm (§3.6).
pub fn write_signature_algorithm(writer: &mut Writer, algo: SignatureAlgorithm) -> EncodeResult<()> {
    write_algorithm_identifier(writer, &algo.oid(), algo.has_null_parameters())
}

/// Reads a `SEQUENCE { oid, parameters }` and identifies which supported
/// signature algorithm it names.
pub fn read_signature_algorithm(
    reader: &mut Reader<'_>,
    limits: &Limits,
) -> DecodeResult<SignatureAlgorithm> {
    let len = read_sequence(reader, limits)?.definite()?;
    let start = reader.position();
    let oid = read_oid(reader, limits)?;
    let algo = if oid.0 == oids::SHA1_WITH_RSA {
        SignatureAlgorithm::Sha1WithRsa
    } else if oid.0 == oids::DSA_WITH_SHA1 {
        SignatureAlgorithm::Sha1WithDsa
    } else {
        return Err(DecodeError::bad_data("unsupported signature algorithm OID"));
    };
    let consumed = reader.position() - start;
    if consumed < len {
        // Trailing NULL parameters, if present; tolerate absence (DSA-family).
        let _ = read_null(reader, limits, DEFAULT_TAG);
    }
    Ok(algo)
}

/// Writes `SEQUENCE { oid, NULL }` for an RSA/DSA/DH key algorithm,
/// as it appears inside a `SubjectPublicKeyInfo` (§4.7).
pub fn write_key_algorithm(writer: &mut Writer, algo: KeyAlgorithm) -> EncodeResult<()> {
    write_algorithm_identifier(writer, &algo.oid(), matches!(algo, KeyAlgorithm::Rsa))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_algorithm_roundtrip() {
        for algo in [SignatureAlgorithm::Sha1WithRsa, SignatureAlgorithm::Sha1WithDsa] {
            let mut w = Writer::new();
            write_signature_algorithm(&mut w, algo).unwrap();
            let bytes = w.into_bytes();
            let mut r = Reader::new(&bytes);
            let decoded = read_signature_algorithm(&mut r, &Limits::default()).unwrap();
            assert_eq!(decoded, algo);
        }
    }

    #[test]
    fn sha1_with_rsa_includes_null_parameters() {
        let mut w = Writer::new();
        write_signature_algorithm(&mut w, SignatureAlgorithm::Sha1WithRsa).unwrap();
        let bytes = w.into_bytes();
        // SEQUENCE { OID(9 bytes), NULL(0 bytes) } => 2 + 9 + 2 + 0 = content 13
        assert_eq!(bytes[1] as usize, 2 + oids::SHA1_WITH_RSA.len() + 2);
    }
}
