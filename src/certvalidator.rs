//! The certificate validator (§4.6): checks a certificate against a
//! signing key, a trusted certificate, a CRL, or a live RTCS/OCSP responder,
//! walking chains and applying CA/KeyUsage constraints.
//!
//! Dispatch is driven by the `(subject kind, verifier kind)` table of §4.6;
//! invalid combinations are rejected with `InvalidArgument` rather than
//! silently doing the wrong check.

use crate::algorithm::read_signature_algorithm;
use crate::ber::bitstring::read_bit_string;
use crate::ber::header::{read_header, read_sequence};
use crate::certinfo::{CertFlags, CertInfo, CertKind, CertStatus, KeyUsage, RevocationStatus};
use crate::collab::{Environment, Hash, HashAlgorithm, Keyset, LookupKind, PublicKey, ResponderSession, TrustStore};
use crate::cursor::Reader;
use crate::error::{Error, ErrorKind, Result};
use crate::ids;
use crate::limits::Limits;

/// Who/what a subject is being checked against (§4.6's dispatch table).
pub enum Verifier<'a, E: Environment> {
    /// The self-signed path: check the subject against itself (§4.6.1).
    None,
    Key(&'a E::Key),
    Cert(&'a CertInfo<E::Key>),
    Crl(&'a CertInfo<E::Key>),
    Keyset(&'a E::KeysetImpl),
    Responder(&'a mut E::ResponderImpl),
}

/// The entry point described by §4.6: `check_cert_validity(subject,
/// verifier)`.
pub fn check_cert_validity<E: Environment>(
    subject: &mut CertInfo<E::Key>,
    verifier: Verifier<'_, E>,
    trust: &E::TrustImpl,
    limits: &Limits,
) -> Result<()> {
    let result = match verifier {
        Verifier::None => self_signed_path::<E>(subject, trust, limits),
        Verifier::Crl(crl) => crl_path::<E>(subject, crl),
        Verifier::Keyset(keyset) => keyset_path::<E>(subject, keyset),
        Verifier::Responder(session) => responder_path::<E>(subject, session),
        Verifier::Cert(cert) => signature_check_path::<E>(subject, Some(cert.subject_public_key.as_ref().ok_or_else(|| Error::new(ErrorKind::NotInitialised))?), Some(cert), trust, limits),
        Verifier::Key(key) => signature_check_path::<E>(subject, Some(key), None, trust, limits),
    };
    if let Err(ref e) = result {
        tracing::debug!(kind = ?subject.kind, error = %e, "certificate validation failed");
    }
    result
}

/// §4.6.1: the self-signed path.
fn self_signed_path<E: Environment>(
    subject: &mut CertInfo<E::Key>,
    trust: &E::TrustImpl,
    limits: &Limits,
) -> Result<()> {
    if !(subject.is_self_signed() || subject.chain_root_is_self_signed()) {
        return Err(Error::new(ErrorKind::InvalidArgument));
    }
    if matches!(subject.kind, CertKind::Certificate) && trust.is_trusted(subject) {
        return Ok(());
    }
    let key = subject
        .subject_public_key
        .clone()
        .ok_or_else(|| Error::new(ErrorKind::NotInitialised))?;
    signature_check_path::<E>(subject, Some(&key), None, trust, limits)
}

/// §4.6.2: check the subject (or every cert in a chain) against a CRL's
/// revocation list by matching `issuerID`.
fn crl_path<E: Environment>(subject: &mut CertInfo<E::Key>, crl: &CertInfo<E::Key>) -> Result<()> {
    if !matches!(subject.kind, CertKind::Certificate | CertKind::AttributeCert | CertKind::CertChain) {
        return Err(Error::new(ErrorKind::InvalidArgument));
    }
    if !matches!(crl.kind, CertKind::Crl) {
        return Err(Error::new(ErrorKind::InvalidArgument));
    }

    let members: Vec<&CertInfo<E::Key>> = if subject.kind.is_chain() {
        subject.chain.iter().collect()
    } else {
        vec![&*subject]
    };

    for (pos, member) in members.iter().enumerate() {
        let issuer_id = member_issuer_id::<E>(member)?;
        if crl.revocation_list.iter().any(|e| e.id == issuer_id) {
            return Err(Error::invalid(format!("certificate at chain position {pos} is revoked")));
        }
    }
    Ok(())
}

fn member_issuer_id<E: Environment>(member: &CertInfo<E::Key>) -> Result<[u8; 20]> {
    let blob = member.blob.as_ref().ok_or_else(|| Error::new(ErrorKind::NotInitialised))?;
    let issuer_range = member.issuer_dn.ok_or_else(|| Error::new(ErrorKind::NotInitialised))?;
    let serial_range = member.serial_number.ok_or_else(|| Error::new(ErrorKind::NotInitialised))?;
    let issuer_bytes = issuer_range.slice(blob.as_slice());
    let serial_bytes = serial_range.slice(blob.as_slice());
    // serial_bytes is the full INTEGER TLV; issuer_id wants the unsigned
    // magnitude, so strip the 2-byte tag+length header plus any sign byte.
    let mag = strip_integer_header(serial_bytes);
    Ok(ids::issuer_id::<E::HashImpl>(issuer_bytes, mag))
}

fn strip_integer_header(tlv: &[u8]) -> &[u8] {
    if tlv.len() < 2 {
        return tlv;
    }
    let len = tlv[1] as usize; // serials are always short-form in this core's profiles
    let body = &tlv[2..2 + len.min(tlv.len().saturating_sub(2))];
    if body.len() > 1 && body[0] == 0 {
        &body[1..]
    } else {
        body
    }
}

/// Dispatches a keyset verifier by subject kind: an `issuerID` presence
/// probe for certs/chains, or the RTCS/OCSP response paths (§4.6.3, §4.6.4).
fn keyset_path<E: Environment>(subject: &mut CertInfo<E::Key>, keyset: &E::KeysetImpl) -> Result<()> {
    match subject.kind {
        CertKind::Certificate | CertKind::AttributeCert | CertKind::CertChain => {
            let members: Vec<&CertInfo<E::Key>> =
                if subject.kind.is_chain() { subject.chain.iter().collect() } else { vec![&*subject] };
            for member in members {
                let id = member_issuer_id::<E>(member)?;
                if !keyset.check_only(LookupKind::IssuerId, &id)? {
                    return Err(Error::new(ErrorKind::Invalid { reason: "issuerID not found in keyset".into() }));
                }
            }
            Ok(())
        }
        CertKind::RtcsResponse => rtcs_response_path::<E>(subject, keyset),
        CertKind::OcspResponse => ocsp_response_path::<E>(subject, keyset),
        _ => Err(Error::new(ErrorKind::InvalidArgument)),
    }
}

/// §4.6.3: for each validity entry, look up its `certID` with
/// `check_only` semantics and set its status accordingly.
fn rtcs_response_path<E: Environment>(subject: &mut CertInfo<E::Key>, keyset: &E::KeysetImpl) -> Result<()> {
    let mut any_invalid = false;
    for entry in subject.revocation_list.iter_mut() {
        let found = keyset.check_only(LookupKind::CertId, &entry.id)?;
        entry.cert_status = Some(if found { CertStatus::Valid } else { CertStatus::NotValid });
        if !found {
            any_invalid = true;
        }
    }
    if any_invalid {
        Err(Error::new(ErrorKind::Invalid { reason: "one or more RTCS entries are not valid".into() }))
    } else {
        Ok(())
    }
}

/// §4.6.4: for each revocation entry, probe for a current cert then for
/// revocation info, per the three-way OCSP outcome.
fn ocsp_response_path<E: Environment>(subject: &mut CertInfo<E::Key>, keyset: &E::KeysetImpl) -> Result<()> {
    let mut any_revoked = false;
    for entry in subject.revocation_list.iter_mut() {
        // An OCSPv1 hash ID is irreversible; the core has no way to tell
        // one apart from a `certID` other than length/convention, so this
        // narrow core treats all-zero ids (the stub "unknown hash kind"
        // sentinel) as OCSPv1 (§4.6.4 step 1, §9.2).
        if entry.id == [0u8; 20] {
            entry.revocation_status = RevocationStatus::Unknown;
            continue;
        }
        if keyset.check_only(LookupKind::CertId, &entry.id)? {
            entry.revocation_status = RevocationStatus::NotRevoked;
            continue;
        }
        match keyset.find_by_id(LookupKind::IssuerId, &entry.id) {
            Ok(matching) => {
                if let Some(rev) = matching.revocation_list.first() {
                    entry.revocation_status = RevocationStatus::Revoked;
                    entry.revocation_time = rev.revocation_time;
                    entry.attributes = rev.attributes.clone();
                    any_revoked = true;
                } else {
                    entry.revocation_status = RevocationStatus::Unknown;
                }
            }
            Err(_) => entry.revocation_status = RevocationStatus::Unknown,
        }
    }
    if any_revoked {
        Err(Error::new(ErrorKind::Invalid { reason: "one or more certificates are revoked".into() }))
    } else {
        Ok(())
    }
}

/// §4.6.5: create an RTCS/OCSP request, attach it to a pre-created
/// session, activate (blocking), and inspect the outcome.
fn responder_path<E: Environment>(subject: &mut CertInfo<E::Key>, session: &mut E::ResponderImpl) -> Result<()> {
    if !matches!(subject.kind, CertKind::Certificate | CertKind::AttributeCert | CertKind::CertChain) {
        return Err(Error::new(ErrorKind::InvalidArgument));
    }
    let blob = subject.blob.as_ref().ok_or_else(|| Error::new(ErrorKind::NotInitialised))?;
    session.attach_request(blob.as_slice())?;
    let outcome = session.activate()?;
    let ok = matches!(outcome.cert_status, Some(CertStatus::Valid))
        || matches!(outcome.revocation_status, Some(RevocationStatus::NotRevoked));
    if ok {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::Invalid { reason: "responder session reported a non-valid status".into() }))
    }
}

/// §4.6.6: the signature-check path. `issuer_cert`, if present, supplies
/// the constraint data (KeyUsage/BasicConstraints, name chaining, validity
/// nesting); `issuer_key` is always required since it's what the signature
/// is actually verified against.
fn signature_check_path<E: Environment>(
    subject: &mut CertInfo<E::Key>,
    issuer_key: Option<&E::Key>,
    issuer_cert: Option<&CertInfo<E::Key>>,
    trust: &E::TrustImpl,
    limits: &Limits,
) -> Result<()> {
    if !matches!(subject.kind, CertKind::Certificate | CertKind::AttributeCert | CertKind::CertChain) {
        return Err(Error::new(ErrorKind::InvalidArgument));
    }
    let issuer_key = issuer_key.ok_or_else(|| Error::new(ErrorKind::NotInitialised))?;

    if let Some(issuer) = issuer_cert {
        check_issuer_constraints(subject, issuer)?;
    }

    if subject.is_self_signed() {
        // A self-signed subject verified against a supplied verifier: the
        // verifier's key must match the subject's own, and an equal-cert
        // verifier must be bitwise identical to the subject (§4.6.6).
        let subject_key = subject.subject_public_key.as_ref().ok_or_else(|| Error::new(ErrorKind::NotInitialised))?;
        if issuer_key.key_id() != subject_key.key_id() {
            return Err(Error::new(ErrorKind::Signature));
        }
        if let Some(issuer) = issuer_cert {
            let subject_blob = subject.blob.as_ref().map(|b| b.as_slice());
            let issuer_blob = issuer.blob.as_ref().map(|b| b.as_slice());
            if subject_blob != issuer_blob {
                return Err(Error::new(ErrorKind::Signature));
            }
        }
    }

    if subject.is_sig_checked() || (matches!(subject.kind, CertKind::Certificate) && trust.is_trusted(subject)) {
        return Ok(());
    }

    verify_signature::<E>(subject, issuer_key, limits)?;
    subject.flags.insert(CertFlags::SIGCHECKED);
    Ok(())
}

/// Subject-against-issuer constraint checks (§4.6.6 step 2): name
/// chaining, validity-period nesting, and KeyUsage/BasicConstraints on the
/// issuer.
fn check_issuer_constraints<K: PublicKey>(subject: &CertInfo<K>, issuer: &CertInfo<K>) -> Result<()> {
    if !subject.issuer_dn_blob.is_empty() && !issuer.subject_dn_blob.is_empty()
        && subject.issuer_dn_blob != issuer.subject_dn_blob
    {
        return Err(Error::invalid("subject's issuer DN does not chain to the verifier's subject DN"));
    }
    if subject.not_before >= 0 && issuer.not_before >= 0 && subject.not_before < issuer.not_before {
        return Err(Error::invalid("subject's validity period starts before its issuer's"));
    }
    if subject.not_after >= 0 && issuer.not_after >= 0 && subject.not_after > issuer.not_after {
        return Err(Error::invalid("subject's validity period extends past its issuer's"));
    }
    if !issuer.key_usage.contains(KeyUsage::KEY_CERT_SIGN) {
        return Err(Error::invalid("issuer's KeyUsage does not permit keyCertSign"));
    }
    if !issuer.is_ca {
        return Err(Error::invalid("issuer is not flagged as a CA"));
    }
    Ok(())
}

/// Re-extracts the TBS bytes and signature from a signed blob (the
/// `{tbsObject, algorithmIdentifier, BIT STRING signature}` wrapper of
/// §6.2) and verifies the signature against `issuer_key`.
fn verify_signature<E: Environment>(subject: &CertInfo<E::Key>, issuer_key: &E::Key, limits: &Limits) -> Result<()> {
    let blob = subject.blob.as_ref().ok_or_else(|| Error::new(ErrorKind::NotInitialised))?;
    let bytes = blob.as_slice();

    let mut reader = Reader::new(bytes);
    let outer_len = read_sequence(&mut reader, limits)?.definite()?;
    let outer_start = reader.position();
    let tbs_start = reader.position();
    let tbs_header = read_header(&mut reader, limits, true)?;
    let tbs_len = tbs_header.length.definite()?;
    reader.skip(tbs_len)?;
    let tbs_range = &bytes[tbs_start..reader.position()];

    let _sig_algo = read_signature_algorithm(&mut reader, limits)?;
    let sig = read_bit_string(&mut reader, limits, crate::tag::DEFAULT_TAG)?;

    if reader.position() - outer_start > outer_len {
        return Err(Error::bad_data("signature wrapper length mismatch"));
    }

    let digest = sha1::<E::HashImpl>(tbs_range);
    issuer_key.verify(&digest, &sig.bytes)
}

fn sha1<H: Hash>(data: &[u8]) -> [u8; 20] {
    let mut h = H::new(HashAlgorithm::Sha1);
    h.update(data);
    h.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certinfo::{Blob, SignatureLevel};
    use crate::collab::{Clock, ResponderOutcome, SessionStatus, Signer};
    use crate::limits::Limits;

    #[derive(Clone)]
    struct FakeKey {
        id: [u8; 20],
    }
    impl PublicKey for FakeKey {
        fn from_spki(spki: &[u8]) -> Result<Self> {
            Ok(FakeKey { id: sha1::<FakeHash>(spki) })
        }
        fn verify(&self, digest: &[u8], sig: &[u8]) -> Result<()> {
            if sig == digest {
                Ok(())
            } else {
                Err(Error::new(ErrorKind::Signature))
            }
        }
        fn can_sign(&self) -> bool {
            true
        }
        fn key_id(&self) -> [u8; 20] {
            self.id
        }
    }

    struct FakeHash(Vec<u8>);
    impl Hash for FakeHash {
        fn new(_algo: HashAlgorithm) -> Self {
            FakeHash(Vec::new())
        }
        fn update(&mut self, data: &[u8]) {
            self.0.extend_from_slice(data);
        }
        fn finalize(self) -> [u8; 20] {
            let mut out = [0u8; 20];
            for (i, b) in self.0.iter().enumerate() {
                out[i % 20] ^= b.wrapping_add(i as u8);
            }
            out
        }
    }

    struct FakeSigner;
    impl Signer<FakeKey> for FakeSigner {
        fn sign(&self, digest: &[u8]) -> Result<Vec<u8>> {
            Ok(digest.to_vec())
        }
        fn associated_cert(&self) -> Option<CertInfo<FakeKey>> {
            None
        }
        fn can_sign(&self) -> bool {
            true
        }
    }

    struct FakeClock(i64);
    impl Clock for FakeClock {
        fn now(&self) -> i64 {
            self.0
        }
    }

    struct FakeKeyset {
        present_issuer_ids: Vec<[u8; 20]>,
    }
    impl Keyset<FakeKey> for FakeKeyset {
        fn find_by_id(&self, _kind: LookupKind, _id: &[u8]) -> Result<CertInfo<FakeKey>> {
            Err(Error::new(ErrorKind::NotFound))
        }
        fn check_only(&self, _kind: LookupKind, id: &[u8]) -> Result<bool> {
            Ok(self.present_issuer_ids.iter().any(|x| x == id))
        }
    }

    struct FakeResponder;
    impl ResponderSession for FakeResponder {
        fn attach_request(&mut self, _request: &[u8]) -> Result<()> {
            Ok(())
        }
        fn activate(&mut self) -> Result<ResponderOutcome> {
            Ok(ResponderOutcome { cert_status: Some(CertStatus::Valid), revocation_status: None })
        }
        fn status(&self) -> SessionStatus {
            SessionStatus::Complete
        }
    }

    struct FakeTrust;
    impl TrustStore<CertInfo<FakeKey>> for FakeTrust {
        fn is_trusted(&self, _cert: &CertInfo<FakeKey>) -> bool {
            false
        }
        fn trusted_issuer(&self, _cert: &CertInfo<FakeKey>) -> Option<CertInfo<FakeKey>> {
            None
        }
    }

    struct FakeEnv;
    impl Environment for FakeEnv {
        type Key = FakeKey;
        type HashImpl = FakeHash;
        type SignerImpl = FakeSigner;
        type KeysetImpl = FakeKeyset;
        type ResponderImpl = FakeResponder;
        type ClockImpl = FakeClock;
        type TrustImpl = FakeTrust;
    }

    fn sign_self_signed_cert() -> CertInfo<FakeKey> {
        let mut info = CertInfo::<FakeKey>::new(CertKind::Certificate);
        info.subject_dn_blob = vec![0x30, 0x00];
        info.issuer_dn_blob = vec![0x30, 0x00];
        info.spki_blob = Some(vec![0x30, 0x02, 0x05, 0x00]);
        info.flags.insert(CertFlags::SELFSIGNED);
        info.key_usage = KeyUsage::KEY_CERT_SIGN | KeyUsage::CRL_SIGN | KeyUsage::DIGITAL_SIGNATURE;
        info.is_ca = true;
        let signer = FakeSigner;
        let clock = FakeClock(1_000_000_000);
        crate::signer::sign::<FakeEnv>(&mut info, Some(&signer), &clock, &Limits::default()).unwrap();
        info
    }

    #[test]
    fn scenario_8_self_signed_validates() {
        let mut cert = sign_self_signed_cert();
        let trust = FakeTrust;
        check_cert_validity::<FakeEnv>(&mut cert, Verifier::None, &trust, &Limits::default()).unwrap();
        assert!(cert.flags.contains(CertFlags::SIGCHECKED));
    }

    #[test]
    fn scenario_9_flipped_signature_byte_fails() {
        let mut cert = sign_self_signed_cert();
        // Flip the last byte, which lies inside the signature BIT STRING.
        let mut bytes = cert.blob.as_ref().unwrap().as_slice().to_vec();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        cert.blob = Some(Blob::new(bytes));
        cert.flags = CertFlags::empty(); // force re-verification
        let trust = FakeTrust;
        let err = check_cert_validity::<FakeEnv>(&mut cert, Verifier::None, &trust, &Limits::default()).unwrap_err();
        assert!(matches!(*err.kind, ErrorKind::Signature | ErrorKind::BadData { .. }));
    }

    #[test]
    fn scenario_10_crl_revocation_is_detected() {
        let cert = sign_self_signed_cert();
        let mut crl = CertInfo::<FakeKey>::new(CertKind::Crl);
        let issuer_id = member_issuer_id::<FakeEnv>(&cert).unwrap();
        let mut entry = crate::certinfo::RevocationEntry::new(issuer_id);
        entry.revocation_status = RevocationStatus::Revoked;
        crl.revocation_list.push(entry);

        let mut cert = cert;
        let err =
            check_cert_validity::<FakeEnv>(&mut cert, Verifier::Crl(&crl), &FakeTrust, &Limits::default())
                .unwrap_err();
        assert!(matches!(*err.kind, ErrorKind::Invalid { .. }));
    }

    #[test]
    fn keyset_verifier_on_a_crl_subject_is_invalid_argument() {
        let mut crl = CertInfo::<FakeKey>::new(CertKind::Crl);
        let keyset = FakeKeyset { present_issuer_ids: vec![] };
        let err = check_cert_validity::<FakeEnv>(&mut crl, Verifier::Keyset(&keyset), &FakeTrust, &Limits::default())
            .unwrap_err();
        assert!(matches!(*err.kind, ErrorKind::InvalidArgument));
    }

    #[test]
    fn responder_session_success_path() {
        let mut cert = sign_self_signed_cert();
        let mut session = FakeResponder;
        check_cert_validity::<FakeEnv>(&mut cert, Verifier::Responder(&mut session), &FakeTrust, &Limits::default())
            .unwrap();
    }
}
