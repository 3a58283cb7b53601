//! The certificate object model (§3.5): one in-memory record per
//! cryptographic object (certificate, request, CRL, OCSP/RTCS request or
//! response, chain, PKI user record).
//!
//! Raw pointers into a signed blob (issuer DN, subject DN, SPKI) are
//! reified as `{offset, len}` pairs indexing into the blob this record owns
//! exclusively (§9.1). They are
//! `None` before signing and recomputed by `src/recovery.rs` after.

use zeroize::Zeroize;

use crate::collab::PublicKey;

/// A byte range into a certificate info's owned blob (§3.5, §9.1). Invalid
/// once the blob is replaced by a fresh serialisation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BlobRange {
    pub offset: usize,
    pub len: usize,
}

impl BlobRange {
    pub fn slice<'a>(&self, blob: &'a [u8]) -> &'a [u8] {
        &blob[self.offset..self.offset + self.len]
    }
}

/// The type of cryptographic object a [`CertInfo`] represents (§3.5).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CertKind {
    Certificate,
    AttributeCert,
    CertChain,
    CertRequest,
    CrmfRequest,
    RevocationRequest,
    Crl,
    RtcsRequest,
    RtcsResponse,
    OcspRequest,
    OcspResponse,
    PkiUser,
}

impl CertKind {
    /// Types that are implicitly self-signed regardless of the `SELFSIGNED`
    /// flag (§4.6.1): a cert request or CRMF request has no issuer to speak
    /// of, it's proof-of-possession of the requester's own key.
    pub fn implicitly_self_signed(self) -> bool {
        matches!(self, CertKind::CertRequest | CertKind::CrmfRequest)
    }

    /// Types whose signing operation is "pseudo-signed" — wrapped in an
    /// outer SEQUENCE with no cryptographic signature (§4.5 step 2).
    pub fn is_pseudo_signed_by_default(self) -> bool {
        matches!(
            self,
            CertKind::RtcsRequest
                | CertKind::RtcsResponse
                | CertKind::OcspResponse
                | CertKind::PkiUser
                | CertKind::RevocationRequest
        )
    }

    pub fn requires_serial_number(self) -> bool {
        matches!(self, CertKind::Certificate | CertKind::AttributeCert)
    }

    pub fn is_chain(self) -> bool {
        matches!(self, CertKind::CertChain)
    }
}

/// Flags carried by a [`CertInfo`] (§3.5). A plain bitset over three bits —
/// small and fixed enough that pulling in a flags crate for it would be
/// overkill.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CertFlags(u8);

impl CertFlags {
    pub const SELFSIGNED: CertFlags = CertFlags(0b001);
    pub const SIGCHECKED: CertFlags = CertFlags(0b010);
    pub const DATAONLY: CertFlags = CertFlags(0b100);

    pub fn empty() -> Self {
        CertFlags(0)
    }

    pub fn contains(self, other: CertFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: CertFlags) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for CertFlags {
    type Output = CertFlags;
    fn bitor(self, rhs: CertFlags) -> CertFlags {
        CertFlags(self.0 | rhs.0)
    }
}

/// Status of a single RTCS validity-list entry (§3.5, §4.6.3).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CertStatus {
    Valid,
    NotValid,
}

/// Status of a single CRL/OCSP revocation-list entry (§3.5, §4.6.4).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RevocationStatus {
    NotRevoked,
    Revoked,
    Unknown,
}

/// KeyUsage bits relevant to the signer/validator's constraint checks
/// (§4.5 step 1, §4.6.6). A plain bitset, as with [`CertFlags`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeyUsage(u16);

impl KeyUsage {
    pub const DIGITAL_SIGNATURE: KeyUsage = KeyUsage(0b0001);
    pub const KEY_CERT_SIGN: KeyUsage = KeyUsage(0b0010);
    pub const CRL_SIGN: KeyUsage = KeyUsage(0b0100);

    pub fn empty() -> Self {
        KeyUsage(0)
    }

    pub fn contains(self, other: KeyUsage) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for KeyUsage {
    type Output = KeyUsage;
    fn bitor(self, rhs: KeyUsage) -> KeyUsage {
        KeyUsage(self.0 | rhs.0)
    }
}

/// How much of the signer's own identity to attach to a CRMF/OCSP request
/// as extra data alongside the signature (§4.5 step 8).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SignatureLevel {
    None,
    SignerCert,
    All,
}

/// One entry in a revocation/validity list (§3.5): identified by a
/// `nameID`+serial hash or a `certID` hash, carrying a status and optional
/// attributes.
#[derive(Clone, Debug)]
pub struct RevocationEntry {
    pub id: [u8; 20],
    pub revocation_status: RevocationStatus,
    pub cert_status: Option<CertStatus>,
    pub revocation_time: i64,
    pub attributes: Vec<u8>,
}

impl RevocationEntry {
    pub fn new(id: [u8; 20]) -> Self {
        RevocationEntry {
            id,
            revocation_status: RevocationStatus::Unknown,
            cert_status: None,
            revocation_time: -1,
            attributes: Vec::new(),
        }
    }
}

/// An owned, zeroising buffer for a certificate info's signed blob (§5
/// "Resource policy"): contains key material via the embedded SPKI, so it
/// is wiped on drop.
#[derive(Clone, Default)]
pub struct Blob(Vec<u8>);

impl Blob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Blob(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for Blob {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Blob({} bytes)", self.0.len())
    }
}

/// A certificate, request, CRL, OCSP/RTCS object, PKI user record, or chain
/// (§3.5). Generic over the collaborator-supplied key handle `K` so the
/// core never depends on a concrete crypto provider.
#[derive(Clone, Debug)]
pub struct CertInfo<K: PublicKey> {
    pub kind: CertKind,

    /// The currently-authoritative serialised form. `None` before signing.
    pub blob: Option<Blob>,

    pub issuer_dn: Option<BlobRange>,
    pub subject_dn: Option<BlobRange>,
    pub public_key_info: Option<BlobRange>,
    pub serial_number: Option<BlobRange>,

    /// Pre-signing DN fields, supplied by the caller; these drive the TBS
    /// writers in `src/signer.rs`. Once signed, the authoritative copies are
    /// the blob ranges above.
    pub issuer_dn_blob: Vec<u8>,
    pub subject_dn_blob: Vec<u8>,

    /// The encoded `SubjectPublicKeyInfo` supplied by the caller before
    /// signing (the signer writes these bytes verbatim into the TBS body;
    /// it never reconstructs them from `subject_public_key`, since the
    /// `PublicKey` collaborator interface is one-directional, §6.4). `None`
    /// for objects that carry no key (CRLs, OCSP/RTCS responses).
    pub spki_blob: Option<Vec<u8>>,

    pub subject_public_key: Option<K>,

    pub not_before: i64,
    pub not_after: i64,
    pub revocation_time: i64,

    pub flags: CertFlags,

    /// Leaf-first, root-last, for `CertKind::CertChain` (§3.5).
    pub chain: Vec<CertInfo<K>>,

    /// For CRL/OCSP/RTCS types (§3.5).
    pub revocation_list: Vec<RevocationEntry>,

    pub serial_value: Option<Vec<u8>>,

    /// `KeyUsage` this object asserts about itself, consulted when *this*
    /// object acts as an issuer for another sign/validate operation (§4.5
    /// step 1, §4.6.6).
    pub key_usage: KeyUsage,
    /// Whether this object's `BasicConstraints` asserts `CA:true` (§4.5
    /// step 1, §4.6.6).
    pub is_ca: bool,

    /// Validity span in seconds: certificate validity period, or CRL
    /// update interval (§4.5 step 3). `None` means the caller will supply
    /// `not_after` directly.
    pub validity_seconds: Option<i64>,

    /// How much extra identity data to attach to a CRMF/OCSP request
    /// alongside its signature (§4.5 step 8).
    pub signature_level: SignatureLevel,
}

impl<K: PublicKey> CertInfo<K> {
    pub fn new(kind: CertKind) -> Self {
        CertInfo {
            kind,
            blob: None,
            issuer_dn: None,
            subject_dn: None,
            public_key_info: None,
            serial_number: None,
            issuer_dn_blob: Vec::new(),
            subject_dn_blob: Vec::new(),
            spki_blob: None,
            subject_public_key: None,
            not_before: -1,
            not_after: -1,
            revocation_time: -1,
            flags: CertFlags::empty(),
            chain: Vec::new(),
            revocation_list: Vec::new(),
            serial_value: None,
            key_usage: KeyUsage::empty(),
            is_ca: false,
            validity_seconds: None,
            signature_level: SignatureLevel::None,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.blob.is_some()
    }

    pub fn is_self_signed(&self) -> bool {
        self.flags.contains(CertFlags::SELFSIGNED) || self.kind.implicitly_self_signed()
    }

    pub fn is_sig_checked(&self) -> bool {
        self.flags.contains(CertFlags::SIGCHECKED)
    }

    /// For a chain, true iff the root (last element) is self-signed (§4.6.1).
    pub fn chain_root_is_self_signed(&self) -> bool {
        match self.chain.last() {
            Some(root) => root.is_self_signed(),
            None => self.is_self_signed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct DummyKey;
    impl PublicKey for DummyKey {
        fn from_spki(_: &[u8]) -> crate::error::Result<Self> {
            Ok(DummyKey)
        }
        fn verify(&self, _: &[u8], _: &[u8]) -> crate::error::Result<()> {
            Ok(())
        }
        fn can_sign(&self) -> bool {
            true
        }
        fn key_id(&self) -> [u8; 20] {
            [0u8; 20]
        }
    }

    #[test]
    fn fresh_cert_info_is_unsigned() {
        let info = CertInfo::<DummyKey>::new(CertKind::Certificate);
        assert!(!info.is_signed());
        assert!(!info.is_self_signed());
    }

    #[test]
    fn cert_request_is_implicitly_self_signed() {
        let info = CertInfo::<DummyKey>::new(CertKind::CertRequest);
        assert!(info.is_self_signed());
    }

    #[test]
    fn blob_is_zeroised_on_drop() {
        // Can't observe the zeroed memory after drop directly, but this at
        // least exercises the Drop impl path without panicking.
        let blob = Blob::new(vec![1, 2, 3, 4]);
        drop(blob);
    }
}
