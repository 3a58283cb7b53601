//! Concrete collaborator implementations (§4.8), gated behind the
//! `default-impls` feature: enough of a real crypto/storage/clock backend
//! that the signer and validator have something genuine to drive in tests
//! and that embedders without their own provider can get started quickly.
//! This is not a general-purpose crypto library (§1 Non-goals) — one digest,
//! one signature scheme, one in-memory keyset.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};

use crate::certinfo::CertInfo;
use crate::collab::{
    Clock, Hash, HashAlgorithm, Keyset, LookupKind, PublicKey, ResponderOutcome, ResponderSession, Signer,
    SessionStatus, TrustStore,
};
use crate::error::{Error, ErrorKind, Result};

/// [`Hash`] backed by the `sha1` crate. MD5 is declined — this core has no
/// legacy-comparison use for it and pulling in a second digest crate for an
/// unused algorithm would be dead weight.
pub struct Sha1Hash(Sha1);

impl Hash for Sha1Hash {
    fn new(algo: HashAlgorithm) -> Self {
        match algo {
            HashAlgorithm::Sha1 => Sha1Hash(Sha1::new()),
            HashAlgorithm::Md5 => panic!("default-impls only supports SHA-1"),
        }
    }

    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self) -> [u8; 20] {
        self.0.finalize().into()
    }
}

/// [`PublicKey`] backed by `rsa::RsaPublicKey`, parsed from a DER-encoded
/// `SubjectPublicKeyInfo` (§3.5, §4.7).
#[derive(Clone)]
pub struct RsaVerifyingKey {
    key: RsaPublicKey,
    spki_der: Vec<u8>,
}

impl PublicKey for RsaVerifyingKey {
    fn from_spki(spki: &[u8]) -> Result<Self> {
        let key = RsaPublicKey::from_public_key_der(spki)
            .map_err(|e| Error::bad_data(format!("invalid RSA SubjectPublicKeyInfo: {e}")))?;
        Ok(RsaVerifyingKey { key, spki_der: spki.to_vec() })
    }

    fn verify(&self, digest: &[u8], sig: &[u8]) -> Result<()> {
        self.key
            .verify(Pkcs1v15Sign::new::<Sha1>(), digest, sig)
            .map_err(|_| Error::new(ErrorKind::Signature))
    }

    fn can_sign(&self) -> bool {
        true
    }

    fn key_id(&self) -> [u8; 20] {
        let mut h = Sha1::new();
        h.update(&self.spki_der);
        h.finalize().into()
    }
}

/// [`Signer`] backed by an `rsa::RsaPrivateKey` (§6.4). Carries an optional
/// associated certificate so the signer's issuer-constraint check (§4.5
/// step 1) has something to consult.
pub struct RsaSigningKey {
    private_key: RsaPrivateKey,
    cert: Option<CertInfo<RsaVerifyingKey>>,
}

impl RsaSigningKey {
    pub fn new(private_key: RsaPrivateKey, cert: Option<CertInfo<RsaVerifyingKey>>) -> Self {
        RsaSigningKey { private_key, cert }
    }
}

impl Signer<RsaVerifyingKey> for RsaSigningKey {
    fn sign(&self, digest: &[u8]) -> Result<Vec<u8>> {
        self.private_key
            .sign(Pkcs1v15Sign::new::<Sha1>(), digest)
            .map_err(|e| Error::bad_data(format!("RSA signing failed: {e}")))
    }

    fn associated_cert(&self) -> Option<CertInfo<RsaVerifyingKey>> {
        self.cert.clone()
    }

    fn can_sign(&self) -> bool {
        true
    }
}

/// An in-memory [`Keyset`] (§6.4), indexed by whichever id kind each entry
/// was inserted under. Not meant to model a real certificate store's
/// indexing strategy, just enough to drive the RTCS/OCSP response paths
/// (§4.6.3, §4.6.4) in tests and small embedders.
#[derive(Default)]
pub struct MemoryKeyset<K: PublicKey> {
    by_cert_id: HashMap<[u8; 20], CertInfo<K>>,
    by_issuer_id: HashMap<[u8; 20], CertInfo<K>>,
    by_name_id: HashMap<[u8; 20], CertInfo<K>>,
}

impl<K: PublicKey> MemoryKeyset<K> {
    pub fn new() -> Self {
        MemoryKeyset { by_cert_id: HashMap::new(), by_issuer_id: HashMap::new(), by_name_id: HashMap::new() }
    }

    pub fn insert_by_cert_id(&mut self, id: [u8; 20], info: CertInfo<K>) {
        self.by_cert_id.insert(id, info);
    }

    pub fn insert_by_issuer_id(&mut self, id: [u8; 20], info: CertInfo<K>) {
        self.by_issuer_id.insert(id, info);
    }

    pub fn insert_by_name_id(&mut self, id: [u8; 20], info: CertInfo<K>) {
        self.by_name_id.insert(id, info);
    }

    fn table(&self, kind: LookupKind) -> &HashMap<[u8; 20], CertInfo<K>> {
        match kind {
            LookupKind::CertId => &self.by_cert_id,
            LookupKind::IssuerId => &self.by_issuer_id,
            LookupKind::Name | LookupKind::Email => &self.by_name_id,
        }
    }
}

impl<K: PublicKey> Keyset<K> for MemoryKeyset<K> {
    fn find_by_id(&self, kind: LookupKind, id: &[u8]) -> Result<CertInfo<K>> {
        let mut key = [0u8; 20];
        key.copy_from_slice(&id[..20.min(id.len())]);
        self.table(kind).get(&key).cloned().ok_or_else(|| Error::new(ErrorKind::NotFound))
    }

    fn check_only(&self, kind: LookupKind, id: &[u8]) -> Result<bool> {
        let mut key = [0u8; 20];
        key.copy_from_slice(&id[..20.min(id.len())]);
        Ok(self.table(kind).contains_key(&key))
    }
}

/// [`Clock`] backed by `SystemTime` (§6.4).
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
    }
}

/// A [`ResponderSession`] that returns a pre-set outcome without doing any
/// transport — useful for embedders wiring up the validator before a real
/// RTCS/OCSP transport is available, and for tests (§6.4, §4.6.5).
pub struct StaticResponder {
    outcome: ResponderOutcome,
}

impl StaticResponder {
    pub fn new(outcome: ResponderOutcome) -> Self {
        StaticResponder { outcome }
    }
}

impl ResponderSession for StaticResponder {
    fn attach_request(&mut self, _request: &[u8]) -> Result<()> {
        Ok(())
    }

    fn activate(&mut self) -> Result<ResponderOutcome> {
        Ok(self.outcome.clone())
    }

    fn status(&self) -> SessionStatus {
        SessionStatus::Complete
    }
}

/// A trust store that trusts every certificate handed to it (§6.4). Useful
/// for tests and for embedders that do their own trust decisions upstream
/// of this crate.
pub struct AllowAllTrustStore;

impl<Cert> TrustStore<Cert> for AllowAllTrustStore {
    fn is_trusted(&self, _cert: &Cert) -> bool {
        true
    }

    fn trusted_issuer(&self, _cert: &Cert) -> Option<Cert> {
        None
    }
}

/// A trust store that trusts nothing, forcing every chain through the
/// full signature-check path (§6.4).
pub struct NoTrustStore;

impl<Cert> TrustStore<Cert> for NoTrustStore {
    fn is_trusted(&self, _cert: &Cert) -> bool {
        false
    }

    fn trusted_issuer(&self, _cert: &Cert) -> Option<Cert> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use rsa::pkcs8::EncodePublicKey;

    fn keypair(bits: usize) -> (RsaPrivateKey, RsaPublicKey) {
        let private_key = RsaPrivateKey::new(&mut OsRng, bits).unwrap();
        let public_key = RsaPublicKey::from(&private_key);
        (private_key, public_key)
    }

    #[test]
    fn sha1_hash_matches_known_vector() {
        let mut h = Sha1Hash::new(HashAlgorithm::Sha1);
        h.update(b"abc");
        let digest = h.finalize();
        let expected: [u8; 20] = [
            0xa9, 0x99, 0x3e, 0x36, 0x47, 0x06, 0x81, 0x6a, 0xba, 0x3e, 0x25, 0x71, 0x78, 0x50, 0xc2, 0x6c, 0x9c,
            0xd0, 0xd8, 0x89,
        ];
        assert_eq!(digest, expected);
    }

    #[test]
    fn rsa_sign_and_verify_roundtrip() {
        let (private_key, public_key) = keypair(1024);
        let spki_der = public_key.to_public_key_der().unwrap().as_bytes().to_vec();
        let verifying = RsaVerifyingKey::from_spki(&spki_der).unwrap();
        let signer = RsaSigningKey::new(private_key, None);

        let mut h = Sha1Hash::new(HashAlgorithm::Sha1);
        h.update(b"the quick brown fox");
        let digest = h.finalize();

        let sig = signer.sign(&digest).unwrap();
        verifying.verify(&digest, &sig).unwrap();
    }

    #[test]
    fn rsa_verify_rejects_tampered_signature() {
        let (private_key, public_key) = keypair(1024);
        let spki_der = public_key.to_public_key_der().unwrap().as_bytes().to_vec();
        let verifying = RsaVerifyingKey::from_spki(&spki_der).unwrap();
        let signer = RsaSigningKey::new(private_key, None);

        let mut h = Sha1Hash::new(HashAlgorithm::Sha1);
        h.update(b"payload");
        let digest = h.finalize();
        let mut sig = signer.sign(&digest).unwrap();
        let last = sig.len() - 1;
        sig[last] ^= 0xFF;

        assert!(verifying.verify(&digest, &sig).is_err());
    }

    #[test]
    fn memory_keyset_roundtrips_by_kind() {
        let (_, public_key) = keypair(512);
        let spki_der = public_key.to_public_key_der().unwrap().as_bytes().to_vec();
        let verifying = RsaVerifyingKey::from_spki(&spki_der).unwrap();
        let mut info = CertInfo::<RsaVerifyingKey>::new(crate::certinfo::CertKind::Certificate);
        info.subject_public_key = Some(verifying);

        let mut keyset = MemoryKeyset::new();
        let id = [7u8; 20];
        keyset.insert_by_cert_id(id, info);

        assert!(keyset.check_only(LookupKind::CertId, &id).unwrap());
        assert!(!keyset.check_only(LookupKind::IssuerId, &id).unwrap());
        assert!(keyset.find_by_id(LookupKind::CertId, &id).is_ok());
    }

    #[test]
    fn system_clock_returns_a_plausible_unix_time() {
        let clock = SystemClock;
        // Anything after 2020-01-01 and before a few centuries out is sane.
        assert!(clock.now() > 1_577_836_800);
    }
}
