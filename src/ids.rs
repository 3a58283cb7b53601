//! Cert-store-compatible identifiers (§3.7, §6.3): fixed-width SHA-1
//! digests used as keyset lookup keys.
//!
//! - `nameID(dn) = SHA-1(dn_encoded)`
//! - `issuerID(dn, serial) = SHA-1(SEQUENCE { dn, serial })`
//! - `certID(cert) = SHA-1(cert_encoded)`

use crate::ber::header::write_sequence_header;
use crate::ber::integer::write_integer_bytes;
use crate::collab::{Hash, HashAlgorithm};
use crate::cursor::Writer;
use crate::tag::DEFAULT_TAG;

/// `nameID` (§3.7): the SHA-1 of an already-DER-encoded DN.
pub fn name_id<H: Hash>(dn_encoded: &[u8]) -> [u8; 20] {
    let mut h = H::new(HashAlgorithm::Sha1);
    h.update(dn_encoded);
    h.finalize()
}

/// `issuerID` (§3.7): the SHA-1 of `SEQUENCE { issuerDN, serialNumber }`,
/// where `serialNumber` is the serial's unsigned magnitude bytes.
pub fn issuer_id<H: Hash>(dn_encoded: &[u8], serial_magnitude: &[u8]) -> [u8; 20] {
    let mut body = Writer::sink();
    body.put_all(dn_encoded).ok();
    write_integer_bytes(&mut body, serial_magnitude, DEFAULT_TAG).ok();
    let content_len = body.position();

    let mut w = Writer::new();
    write_sequence_header(&mut w, content_len).ok();
    w.put_all(dn_encoded).ok();
    write_integer_bytes(&mut w, serial_magnitude, DEFAULT_TAG).ok();
    let bytes = w.into_bytes();

    let mut h = H::new(HashAlgorithm::Sha1);
    h.update(&bytes);
    h.finalize()
}

/// `certID` (§3.7): the SHA-1 of the certificate's full encoded form.
pub fn cert_id<H: Hash>(cert_encoded: &[u8]) -> [u8; 20] {
    let mut h = H::new(HashAlgorithm::Sha1);
    h.update(cert_encoded);
    h.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSha1(Vec<u8>);
    impl Hash for FakeSha1 {
        fn new(_algo: HashAlgorithm) -> Self {
            FakeSha1(Vec::new())
        }
        fn update(&mut self, data: &[u8]) {
            self.0.extend_from_slice(data);
        }
        fn finalize(self) -> [u8; 20] {
            // Deterministic stand-in digest for unit testing id construction
            // shape, not cryptographic correctness (covered by the real
            // `sha1`-backed impl under `default-impls`).
            let mut out = [0u8; 20];
            for (i, b) in self.0.iter().enumerate() {
                out[i % 20] ^= *b;
            }
            out
        }
    }

    #[test]
    fn name_id_is_deterministic() {
        let dn = b"fake-encoded-dn";
        assert_eq!(name_id::<FakeSha1>(dn), name_id::<FakeSha1>(dn));
    }

    #[test]
    fn issuer_id_differs_by_serial() {
        let dn = b"fake-encoded-dn";
        let a = issuer_id::<FakeSha1>(dn, &[1]);
        let b = issuer_id::<FakeSha1>(dn, &[2]);
        assert_ne!(a, b);
    }

    #[test]
    fn cert_id_matches_name_id_shape_on_same_bytes() {
        let bytes = b"encoded-cert";
        assert_eq!(cert_id::<FakeSha1>(bytes), name_id::<FakeSha1>(bytes));
    }
}
