//! The certificate signer (§4.5): assembles and signs a certificate object,
//! handling self-signed certs, CA-signed certs, certification requests,
//! CRMF requests with out-of-band proof-of-possession, CRLs, OCSP
//! responses, RTCS responses, and certificate chains.

use crate::algorithm::{write_signature_algorithm, SignatureAlgorithm};
use crate::ber::header::{write_constructed_header, write_sequence_header};
use crate::ber::integer::{write_integer_bytes, write_short_integer};
use crate::ber::bitstring::{write_bit_string, BitString};
use crate::ber::time::{write_generalized_time, write_utc_time};
use crate::certinfo::{CertInfo, CertKind, CertFlags, KeyUsage, SignatureLevel, Blob};
use crate::collab::{Clock, Environment, Hash, HashAlgorithm, PublicKey, Signer};
use crate::cursor::Writer;
use crate::error::{Error, ErrorKind, ErrorLocus, ErrorType, Result};
use crate::limits::Limits;
use crate::recovery;
use crate::tag::DEFAULT_TAG;

fn sha1<H: Hash>(data: &[u8]) -> [u8; 20] {
    let mut h = H::new(HashAlgorithm::Sha1);
    h.update(data);
    h.finalize()
}

/// A lightweight, non-cryptographic serial-number generator used when the
/// caller hasn't pre-populated `serial_value` (§4.5 step 4). Real
/// deployments are expected to supply their own serial (audited, perhaps
/// sequential); this exists so `sign` has a default path to exercise in
/// tests, the same spirit as the `default-impls` collaborators (§4.8).
fn allocate_serial(seed: i64) -> Vec<u8> {
    let mut state = (seed as u64) ^ 0x9E3779B97F4A7C15;
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    let mut bytes = state.to_be_bytes().to_vec();
    bytes[0] &= 0x7F; // keep strictly positive
    if bytes.iter().all(|&b| b == 0) {
        bytes[7] = 1;
    }
    bytes
}

/// Signs `info` in place per §4.5. Preconditions: `info.blob` is `None`;
/// `info`'s caller-populated fields (DN blobs, SPKI, validity span) are
/// set; if `info` is not self-signed, `signer` must be `Some` and its
/// associated cert must satisfy the relevant KeyUsage/CA constraint.
///
/// On any failure the object is left exactly as it was before the call
/// (§4.5 "Failure policy") — nothing is written to `info` until the new
/// blob and derived pointers are fully assembled.
pub fn sign<E: Environment>(
    info: &mut CertInfo<E::Key>,
    signer: Option<&E::SignerImpl>,
    clock: &E::ClockImpl,
    limits: &Limits,
) -> Result<()> {
    if info.is_signed() {
        return Err(Error::new(ErrorKind::Initialised));
    }

    let now = clock.now();
    if now < limits.min_time_value {
        tracing::warn!(now, floor = limits.min_time_value, "clock below sanity floor, refusing to sign");
        return Err(Error::invalid("clock returned a time before the sanity floor"));
    }

    resolve_issuer::<E>(info, signer)?;

    if is_pseudo_signed(info, signer.is_some()) {
        tracing::debug!(kind = ?info.kind, "signing as a pseudo-signed object");
        return sign_pseudo(info, now, limits);
    }

    let Some(signer) = signer else {
        return Err(Error::with_locus(
            ErrorKind::NotInitialised,
            ErrorLocus::SigningKey,
            ErrorType::AttributeAbsent,
        ));
    };
    if !signer.can_sign() {
        return Err(Error::with_locus(ErrorKind::Permission, ErrorLocus::SigningKey, ErrorType::Constraint));
    }

    complete_temporal_fields(info, now, limits)?;
    allocate_serial_if_needed(info, now);

    let tbs = write_tbs_body::<E>(info, limits)?;

    let (sig_algo, format_info) = signature_wrapper_kind(info.kind);
    let digest = sha1::<E::HashImpl>(&tbs);
    let signature = signer.sign(&digest)?;

    let blob = write_signature_wrapper(info, &tbs, sig_algo, format_info, &signature)?;
    let blob_len = blob.len();
    info.blob = Some(Blob::new(blob));

    recovery::recover_pointers(info, limits)?;
    finalize_flags(info);
    tracing::debug!(kind = ?info.kind, blob_len, "signed object");
    Ok(())
}

fn is_pseudo_signed<K: PublicKey>(info: &CertInfo<K>, have_signer: bool) -> bool {
    if info.kind.is_pseudo_signed_by_default() {
        return true;
    }
    // An unsigned OCSP request is pseudo-signed; a signed one goes through
    // the normal path with the OCSP wrapper (§4.5 step 2 vs step 7).
    if info.kind == CertKind::OcspRequest {
        return !have_signer;
    }
    if info.kind == CertKind::CrmfRequest {
        if let Some(key) = &info.subject_public_key {
            return !key.can_sign();
        }
    }
    false
}

/// §4.5 step 1: resolve the issuer side of the operation, reporting
/// constraint failures with the dedicated `IssuerConstraint` locus.
fn resolve_issuer<E: Environment>(
    info: &mut CertInfo<E::Key>,
    signer: Option<&E::SignerImpl>,
) -> Result<()> {
    if info.is_self_signed() {
        if info.issuer_dn_blob.is_empty() {
            info.issuer_dn_blob = info.subject_dn_blob.clone();
        }
        return Ok(());
    }

    let Some(signer) = signer else {
        return Ok(()); // pseudo-signed kinds need no issuer at all
    };
    let Some(issuer_cert) = signer.associated_cert() else {
        if matches!(info.kind, CertKind::OcspRequest | CertKind::OcspResponse) {
            return Ok(()); // OCSP may be signed by a bare key with no cert
        }
        return Err(Error::with_locus(
            ErrorKind::NotInitialised,
            ErrorLocus::Issuer,
            ErrorType::AttributeAbsent,
        ));
    };

    let required = match info.kind {
        CertKind::OcspRequest | CertKind::OcspResponse => KeyUsage::DIGITAL_SIGNATURE,
        CertKind::Crl => KeyUsage::CRL_SIGN,
        _ => KeyUsage::KEY_CERT_SIGN,
    };
    if !issuer_cert.key_usage.contains(required) {
        return Err(Error::with_locus(
            ErrorKind::Permission,
            ErrorLocus::IssuerConstraint,
            ErrorType::AttributeValue,
        ));
    }
    if matches!(info.kind, CertKind::Certificate | CertKind::AttributeCert | CertKind::Crl | CertKind::CertChain)
        && !issuer_cert.is_ca
    {
        return Err(Error::with_locus(
            ErrorKind::Permission,
            ErrorLocus::IssuerConstraint,
            ErrorType::Constraint,
        ));
    }

    info.issuer_dn_blob = issuer_cert
        .subject_dn
        .zip(issuer_cert.blob.as_ref())
        .map(|(range, blob)| range.slice(blob.as_slice()).to_vec())
        .unwrap_or(issuer_cert.subject_dn_blob.clone());

    Ok(())
}

/// §4.5 step 2: wrap the subject's fields in an outer `SEQUENCE` with no
/// cryptographic signature, for the "pseudo-signed" object kinds.
fn sign_pseudo<K: PublicKey>(info: &mut CertInfo<K>, now: i64, limits: &Limits) -> Result<()> {
    complete_temporal_fields(info, now, limits)?;

    let mut body = Writer::sink();
    write_pseudo_body(info, &mut body)?;
    let content_len = body.position();

    let mut w = Writer::new();
    write_sequence_header(&mut w, content_len)?;
    write_pseudo_body(info, &mut w)?;
    info.blob = Some(Blob::new(w.into_bytes()));

    recovery::recover_pointers(info, limits)?;
    info.flags.insert(CertFlags::SELFSIGNED);
    info.flags.insert(CertFlags::SIGCHECKED);
    Ok(())
}

fn write_pseudo_body<K: PublicKey>(info: &CertInfo<K>, w: &mut Writer) -> Result<()> {
    match info.kind {
        CertKind::PkiUser => {
            w.put_all(&info.subject_dn_blob).map_err(Error::from)?;
        }
        CertKind::RtcsRequest | CertKind::RtcsResponse | CertKind::OcspResponse | CertKind::RevocationRequest => {
            for entry in &info.revocation_list {
                w.put_all(&entry.id).map_err(Error::from)?;
                w.put_all(&entry.attributes).map_err(Error::from)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// §4.5 step 3: complete missing temporal fields.
fn complete_temporal_fields<K: PublicKey>(info: &mut CertInfo<K>, now: i64, limits: &Limits) -> Result<()> {
    if now < limits.min_time_value {
        return Err(Error::invalid("clock time below the sanity floor"));
    }
    if info.not_before < 0 {
        info.not_before = now;
    }
    if info.not_after < 0 {
        info.not_after = match info.kind {
            CertKind::OcspResponse => now, // ephemeral
            _ => info.not_before + info.validity_seconds.unwrap_or(365 * 24 * 3600),
        };
    }
    if matches!(info.kind, CertKind::Crl | CertKind::OcspResponse | CertKind::RtcsResponse) {
        for entry in info.revocation_list.iter_mut() {
            if entry.revocation_time < 0 {
                entry.revocation_time = now;
            }
        }
    }
    Ok(())
}

/// §4.5 step 4: allocate a serial number for types that require one.
fn allocate_serial_if_needed<K: PublicKey>(info: &mut CertInfo<K>, now: i64) {
    if info.kind.requires_serial_number() && info.serial_value.is_none() {
        info.serial_value = Some(allocate_serial(now));
    }
}

/// §4.5 step 6: writes the unsigned TBS body for `info`'s subject type,
/// dispatching by kind. Returns the encoded bytes.
fn write_tbs_body<E: Environment>(info: &CertInfo<E::Key>, limits: &Limits) -> Result<Vec<u8>> {
    match info.kind {
        CertKind::Certificate | CertKind::AttributeCert => write_tbs_certificate(info),
        CertKind::CertRequest => write_tbs_cert_request(info),
        CertKind::CrmfRequest => write_tbs_crmf(info),
        CertKind::Crl => write_tbs_crl(info),
        CertKind::CertChain => write_tbs_chain::<E>(info, limits),
        CertKind::OcspRequest => write_tbs_ocsp_request(info),
        other => Err(Error::invalid(format!("{other:?} has no standard-wrapper TBS body"))),
    }
}

fn write_tbs_certificate<K: PublicKey>(info: &CertInfo<K>) -> Result<Vec<u8>> {
    let serial = info.serial_value.as_deref().ok_or_else(|| {
        Error::with_locus(ErrorKind::NotInitialised, ErrorLocus::SerialNumber, ErrorType::AttributeAbsent)
    })?;
    let spki = info
        .spki_blob
        .as_deref()
        .ok_or_else(|| Error::with_locus(ErrorKind::NotInitialised, ErrorLocus::Subject, ErrorType::AttributeAbsent))?;

    let mut body = Writer::new();
    write_integer_bytes(&mut body, serial, DEFAULT_TAG).map_err(Error::from)?;
    write_signature_algorithm(&mut body, SignatureAlgorithm::Sha1WithRsa).map_err(Error::from)?;
    body.put_all(&info.issuer_dn_blob).map_err(Error::from)?;
    write_validity(&mut body, info.not_before, info.not_after)?;
    body.put_all(&info.subject_dn_blob).map_err(Error::from)?;
    body.put_all(spki).map_err(Error::from)?;

    wrap_sequence(body.into_bytes())
}

fn write_validity(w: &mut Writer, not_before: i64, not_after: i64) -> Result<()> {
    let mut body = Writer::new();
    write_time_field(&mut body, not_before)?;
    write_time_field(&mut body, not_after)?;
    let content = body.into_bytes();
    write_sequence_header(w, content.len()).map_err(Error::from)?;
    w.put_all(&content).map_err(Error::from)?;
    Ok(())
}

/// UTCTime for years it can represent (1950-2049), GeneralizedTime outside
/// that window — the ordinary X.509 convention, reached here rather than
/// specified directly by §4.5 because §4.2 leaves UTCTime's year window
/// exact and GeneralizedTime unrestricted.
fn write_time_field(w: &mut Writer, epoch_seconds: i64) -> Result<()> {
    let year = 1970 + epoch_seconds / (365 * 24 * 3600);
    if (1950..2050).contains(&year) {
        write_utc_time(w, epoch_seconds, DEFAULT_TAG).map_err(Error::from)
    } else {
        write_generalized_time(w, epoch_seconds, DEFAULT_TAG).map_err(Error::from)
    }
}

fn write_tbs_cert_request<K: PublicKey>(info: &CertInfo<K>) -> Result<Vec<u8>> {
    let spki = info
        .spki_blob
        .as_deref()
        .ok_or_else(|| Error::with_locus(ErrorKind::NotInitialised, ErrorLocus::Subject, ErrorType::AttributeAbsent))?;

    let mut body = Writer::new();
    write_short_integer(&mut body, 0, DEFAULT_TAG).map_err(Error::from)?; // version v1(0)
    body.put_all(&info.subject_dn_blob).map_err(Error::from)?;
    body.put_all(spki).map_err(Error::from)?;
    // attributes [0] IMPLICIT SET, empty — requests in this core carry no
    // extension attributes (a non-goal narrowing, §1).
    write_constructed_header(&mut body, 0, 0).map_err(Error::from)?;

    wrap_sequence(body.into_bytes())
}

fn write_tbs_crmf<K: PublicKey>(info: &CertInfo<K>) -> Result<Vec<u8>> {
    let spki = info
        .spki_blob
        .as_deref()
        .ok_or_else(|| Error::with_locus(ErrorKind::NotInitialised, ErrorLocus::Subject, ErrorType::AttributeAbsent))?;

    // CertTemplate SEQUENCE { subject [5], publicKey [6] IMPLICIT } — the
    // non-standard `[6]` tag on the key field is what the recovery walk
    // (`src/recovery.rs`) accounts for specially (§4.5 step 9).
    let mut template = Writer::new();
    write_constructed_header(&mut template, 5, info.subject_dn_blob.len()).map_err(Error::from)?;
    template.put_all(&info.subject_dn_blob).map_err(Error::from)?;
    write_constructed_header(&mut template, 6, spki.len()).map_err(Error::from)?;
    template.put_all(spki).map_err(Error::from)?;
    let template_bytes = template.into_bytes();

    let mut cert_request = Writer::new();
    write_short_integer(&mut cert_request, 0, DEFAULT_TAG).map_err(Error::from)?; // certReqId
    write_sequence_header(&mut cert_request, template_bytes.len()).map_err(Error::from)?;
    cert_request.put_all(&template_bytes).map_err(Error::from)?;
    let cert_request_bytes = wrap_sequence(cert_request.into_bytes())?;

    wrap_sequence(cert_request_bytes)
}

fn write_tbs_crl<K: PublicKey>(info: &CertInfo<K>) -> Result<Vec<u8>> {
    let mut body = Writer::new();
    write_signature_algorithm(&mut body, SignatureAlgorithm::Sha1WithRsa).map_err(Error::from)?;
    body.put_all(&info.issuer_dn_blob).map_err(Error::from)?;
    write_time_field(&mut body, info.not_before)?;
    write_time_field(&mut body, info.not_after)?;

    let mut revoked = Writer::new();
    for entry in &info.revocation_list {
        let mut rec = Writer::new();
        write_integer_bytes(&mut rec, &entry.id, DEFAULT_TAG).map_err(Error::from)?;
        write_time_field(&mut rec, entry.revocation_time)?;
        let rec_bytes = wrap_sequence(rec.into_bytes())?;
        revoked.put_all(&rec_bytes).map_err(Error::from)?;
    }
    let revoked_bytes = revoked.into_bytes();
    if !revoked_bytes.is_empty() {
        write_sequence_header(&mut body, revoked_bytes.len()).map_err(Error::from)?;
        body.put_all(&revoked_bytes).map_err(Error::from)?;
    }

    wrap_sequence(body.into_bytes())
}

/// A signed OCSP request's TBS body: just the request list's identifiers,
/// narrowed from the full RFC 2560 `TBSRequest` since the core doesn't
/// model optional requestor names or extensions (§1 narrowing).
fn write_tbs_ocsp_request<K: PublicKey>(info: &CertInfo<K>) -> Result<Vec<u8>> {
    let mut requests = Writer::new();
    for entry in &info.revocation_list {
        write_integer_bytes(&mut requests, &entry.id, DEFAULT_TAG).map_err(Error::from)?;
    }
    wrap_sequence(requests.into_bytes())
}

/// §4.5 step 5 + step 6 for a chain: the chain is copied from the signing
/// key's associated cert chain by the caller before `sign` is invoked (the
/// signer only validates that a self-signed chain ends up length 1); the
/// TBS body here is simply the concatenation of each child's own blob,
/// leaf first.
fn write_tbs_chain<E: Environment>(info: &CertInfo<E::Key>, _limits: &Limits) -> Result<Vec<u8>> {
    if info.is_self_signed() && info.chain.len() != 1 {
        return Err(Error::with_locus(ErrorKind::Invalid { reason: "self-signed chain must have exactly one member".into() }, ErrorLocus::Chain, ErrorType::Constraint));
    }
    let mut out = Vec::new();
    for child in &info.chain {
        let blob = child.blob.as_ref().ok_or_else(|| {
            Error::with_locus(ErrorKind::NotInitialised, ErrorLocus::Chain, ErrorType::AttributeAbsent)
        })?;
        out.extend_from_slice(blob.as_slice());
    }
    Ok(out)
}

fn wrap_sequence(content: Vec<u8>) -> Result<Vec<u8>> {
    let mut w = Writer::new();
    write_sequence_header(&mut w, content.len()).map_err(Error::from)?;
    w.put_all(&content).map_err(Error::from)?;
    Ok(w.into_bytes())
}

/// §4.5 step 7: which signature-wrapper variant and `formatInfo` value a
/// subject type uses.
fn signature_wrapper_kind(kind: CertKind) -> (SignatureAlgorithm, FormatInfo) {
    match kind {
        CertKind::CrmfRequest => (SignatureAlgorithm::Sha1WithRsa, FormatInfo::Crmf),
        CertKind::OcspRequest => (SignatureAlgorithm::Sha1WithRsa, FormatInfo::Ocsp),
        _ => (SignatureAlgorithm::Sha1WithRsa, FormatInfo::Standard),
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum FormatInfo {
    /// `SEQUENCE { tbsObject, algorithmIdentifier, BIT STRING signature }` (§6.2).
    Standard,
    /// CRMF's PoP-distinguishing wrapper, `formatInfo = 1` (§6.2).
    Crmf,
    /// OCSP's RFC 2560 wrapper, `formatInfo = 0 | 0x80` (§6.2).
    Ocsp,
}

/// §4.5 step 7 + step 8: writes the chosen signature wrapper around `tbs`
/// and appends extra signer-identity data for CRMF/OCSP requests when
/// `signature_level` calls for it.
fn write_signature_wrapper<K: PublicKey>(
    info: &CertInfo<K>,
    tbs: &[u8],
    sig_algo: SignatureAlgorithm,
    format_info: FormatInfo,
    signature: &[u8],
) -> Result<Vec<u8>> {
    let mut body = Writer::new();
    body.put_all(tbs).map_err(Error::from)?;
    write_signature_algorithm(&mut body, sig_algo).map_err(Error::from)?;
    let sig_bits = BitString::from_bytes(signature.to_vec());
    write_bit_string(&mut body, &sig_bits, DEFAULT_TAG).map_err(Error::from)?;

    if matches!(format_info, FormatInfo::Crmf | FormatInfo::Ocsp) && !matches!(info.signature_level, SignatureLevel::None)
    {
        let extra = extra_data_bytes(info)?;
        write_constructed_header(&mut body, 0, extra.len()).map_err(Error::from)?;
        body.put_all(&extra).map_err(Error::from)?;
    }

    let content = body.into_bytes();
    let mut w = Writer::new();
    write_sequence_header(&mut w, content.len()).map_err(Error::from)?;
    w.put_all(&content).map_err(Error::from)?;
    Ok(w.into_bytes())
}

/// §4.5 step 8: the signer cert alone, or the full chain, depending on
/// `signature_level`.
fn extra_data_bytes<K: PublicKey>(info: &CertInfo<K>) -> Result<Vec<u8>> {
    match info.signature_level {
        SignatureLevel::None => Ok(Vec::new()),
        SignatureLevel::SignerCert | SignatureLevel::All => {
            let mut out = Vec::new();
            for child in &info.chain {
                if let Some(blob) = &child.blob {
                    out.extend_from_slice(blob.as_slice());
                }
                if matches!(info.signature_level, SignatureLevel::SignerCert) {
                    break;
                }
            }
            Ok(out)
        }
    }
}

/// §4.5 step 10: `SIGCHECKED` is always set just after a successful sign;
/// `SELFSIGNED` additionally for cert requests or a chain whose root is
/// self-signed.
fn finalize_flags<K: PublicKey>(info: &mut CertInfo<K>) {
    info.flags.insert(CertFlags::SIGCHECKED);
    if info.kind.implicitly_self_signed() || (info.kind.is_chain() && info.chain_root_is_self_signed()) {
        info.flags.insert(CertFlags::SELFSIGNED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{Keyset, LookupKind, ResponderOutcome, ResponderSession, SessionStatus, TrustStore};

    #[derive(Clone)]
    struct FakeKey {
        spki: Vec<u8>,
        can_sign: bool,
    }
    impl PublicKey for FakeKey {
        fn from_spki(spki: &[u8]) -> Result<Self> {
            Ok(FakeKey { spki: spki.to_vec(), can_sign: true })
        }
        fn verify(&self, tbs: &[u8], sig: &[u8]) -> Result<()> {
            if sig == expected_signature(tbs) {
                Ok(())
            } else {
                Err(Error::new(ErrorKind::Signature))
            }
        }
        fn can_sign(&self) -> bool {
            self.can_sign
        }
        fn key_id(&self) -> [u8; 20] {
            sha1::<FakeHash>(&self.spki)
        }
    }

    fn expected_signature(tbs: &[u8]) -> Vec<u8> {
        sha1::<FakeHash>(tbs).to_vec()
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

    struct FakeSigner {
        cert: Option<CertInfo<FakeKey>>,
    }
    impl Signer<FakeKey> for FakeSigner {
        fn sign(&self, digest: &[u8]) -> Result<Vec<u8>> {
            Ok(digest.to_vec())
        }
        fn associated_cert(&self) -> Option<CertInfo<FakeKey>> {
            self.cert.clone()
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

    struct FakeKeyset;
    impl Keyset<FakeKey> for FakeKeyset {
        fn find_by_id(&self, _kind: LookupKind, _id: &[u8]) -> Result<CertInfo<FakeKey>> {
            Err(Error::new(ErrorKind::NotFound))
        }
        fn check_only(&self, _kind: LookupKind, _id: &[u8]) -> Result<bool> {
            Ok(false)
        }
    }

    struct FakeResponder;
    impl ResponderSession for FakeResponder {
        fn attach_request(&mut self, _request: &[u8]) -> Result<()> {
            Ok(())
        }
        fn activate(&mut self) -> Result<ResponderOutcome> {
            Ok(ResponderOutcome { cert_status: None, revocation_status: None })
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

    fn fresh_self_signed_cert() -> CertInfo<FakeKey> {
        let mut info = CertInfo::<FakeKey>::new(CertKind::Certificate);
        info.subject_dn_blob = vec![0x30, 0x00];
        info.issuer_dn_blob = vec![0x30, 0x00];
        info.spki_blob = Some(vec![0x30, 0x02, 0x05, 0x00]);
        info.flags.insert(CertFlags::SELFSIGNED);
        info.key_usage = KeyUsage::KEY_CERT_SIGN | KeyUsage::CRL_SIGN | KeyUsage::DIGITAL_SIGNATURE;
        info.is_ca = true;
        info
    }

    #[test]
    fn scenario_8_self_signed_cert_signs_successfully() {
        let mut info = fresh_self_signed_cert();
        let signer = FakeSigner { cert: None };
        let clock = FakeClock(1_000_000_000);
        sign::<FakeEnv>(&mut info, Some(&signer), &clock, &Limits::default()).unwrap();
        assert!(info.is_signed());
        assert!(info.flags.contains(CertFlags::SELFSIGNED));
        assert!(info.flags.contains(CertFlags::SIGCHECKED));
        assert!(info.subject_public_key.is_some());
    }

    #[test]
    fn already_signed_object_rejects_resign() {
        let mut info = fresh_self_signed_cert();
        let signer = FakeSigner { cert: None };
        let clock = FakeClock(1_000_000_000);
        sign::<FakeEnv>(&mut info, Some(&signer), &clock, &Limits::default()).unwrap();
        let err = sign::<FakeEnv>(&mut info, Some(&signer), &clock, &Limits::default()).unwrap_err();
        assert!(matches!(*err.kind, ErrorKind::Initialised));
    }

    #[test]
    fn pki_user_is_pseudo_signed() {
        let mut info = CertInfo::<FakeKey>::new(CertKind::PkiUser);
        info.subject_dn_blob = vec![0x30, 0x00];
        let clock = FakeClock(1_000_000_000);
        sign::<FakeEnv>(&mut info, None, &clock, &Limits::default()).unwrap();
        assert!(info.flags.contains(CertFlags::SELFSIGNED));
        assert!(info.flags.contains(CertFlags::SIGCHECKED));
    }

    #[test]
    fn missing_signing_key_for_ca_signed_cert_is_not_initialised() {
        let mut info = CertInfo::<FakeKey>::new(CertKind::Certificate);
        info.subject_dn_blob = vec![0x30, 0x00];
        info.issuer_dn_blob = vec![0x30, 0x00];
        info.spki_blob = Some(vec![0x30, 0x02, 0x05, 0x00]);
        let clock = FakeClock(1_000_000_000);
        let err = sign::<FakeEnv>(&mut info, None, &clock, &Limits::default()).unwrap_err();
        assert!(matches!(*err.kind, ErrorKind::NotInitialised));
    }

    #[test]
    fn clock_below_sanity_floor_is_fatal() {
        let mut info = fresh_self_signed_cert();
        let signer = FakeSigner { cert: None };
        let mut limits = Limits::default();
        limits.min_time_value = 100;
        let clock = FakeClock(1);
        let err = sign::<FakeEnv>(&mut info, Some(&signer), &clock, &limits).unwrap_err();
        assert!(matches!(*err.kind, ErrorKind::Invalid { .. }));
    }
}
