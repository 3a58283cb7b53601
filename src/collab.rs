//! Collaborator interfaces (§6.4): narrow traits the core consumes but does
//! not implement. Raw symmetric/asymmetric crypto primitives, keyset
//! storage, responder-session transport, and wall-clock access are all
//! external collaborators (§1) — the core only ever sees these traits.
//!
//! Concrete, optional implementations of each trait live in
//! `src/default_impls.rs` behind the `default-impls` feature (SPEC_FULL.md
//! §4.8); they exist so the signer/validator has something real to drive in
//! tests, not as a general crypto provider (an explicit non-goal, §1).

use crate::error::Result;

/// A cryptographic hash context (§6.4). SHA-1 is required (it's the only
/// digest the signer wires through, §4.5 step 7); MD5 is optional and
/// exists only for legacy `certID`-style comparisons some collaborators
/// may still want.
pub trait Hash {
    fn new(algo: HashAlgorithm) -> Self
    where
        Self: Sized;
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> [u8; 20];
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HashAlgorithm {
    Sha1,
    Md5,
}

/// An opaque handle to a key object owned by the crypto-primitives layer
/// (§3.5 "Subject public-key handle"). The core only ever compares, clones,
/// and drops these — ownership/lifetime is the collaborator's concern
/// (§9.1 "Object handles as integers with external lifetime management").
pub trait PublicKey: Clone {
    fn from_spki(spki: &[u8]) -> Result<Self>
    where
        Self: Sized;
    fn verify(&self, tbs: &[u8], sig: &[u8]) -> Result<()>;
    fn can_sign(&self) -> bool;
    fn key_id(&self) -> [u8; 20];
}

/// A handle to a private-key-backed signer (§6.4). Bundles the signing
/// operation with a reference to whatever certificate the signer's key is
/// associated with, since the signer needs that cert's KeyUsage/CA flags to
/// validate the issuer side of a sign operation (§4.5 step 1).
pub trait Signer<K: PublicKey> {
    fn sign(&self, digest: &[u8]) -> Result<Vec<u8>>;
    fn associated_cert(&self) -> Option<crate::certinfo::CertInfo<K>>;
    fn can_sign(&self) -> bool;
}

/// What kind of identifier a keyset lookup is keyed by (§6.4).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LookupKind {
    CertId,
    IssuerId,
    Name,
    Email,
}

/// A revocation/certificate-status store (§6.4). `find_by_id` returns the
/// full object; `check_only` returns only presence, used by the RTCS
/// response path (§4.6.3) which never needs the object itself.
pub trait Keyset<K: PublicKey> {
    fn find_by_id(&self, kind: LookupKind, id: &[u8]) -> Result<crate::certinfo::CertInfo<K>>;
    fn check_only(&self, kind: LookupKind, id: &[u8]) -> Result<bool>;
}

/// The outcome of activating a responder session (§6.4, §4.6.5).
#[derive(Clone, Debug)]
pub struct ResponderOutcome {
    pub cert_status: Option<CertStatus>,
    pub revocation_status: Option<RevocationStatus>,
}

/// A live RTCS/OCSP responder session (§6.4). `activate` blocks until the
/// response returns or the session's own timeout fires (§5 "Suspension
/// points") — the core prescribes no default timeout (§9.2).
pub trait ResponderSession {
    fn attach_request(&mut self, request: &[u8]) -> Result<()>;
    fn activate(&mut self) -> Result<ResponderOutcome>;
    fn status(&self) -> SessionStatus;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionStatus {
    Pending,
    Complete,
    TimedOut,
    Cancelled,
}

/// Wall-clock access (§6.4), so the signer's temporal-field completion
/// (§4.5 step 3) and the validator's validity-window checks are testable
/// without depending on `SystemTime` directly.
pub trait Clock {
    fn now(&self) -> i64;
}

/// A trust anchor store (§6.4, §4.6.1). `trusted_issuer` is used by the
/// self-signed path to find a trusted root for a chain whose root isn't
/// itself already flagged `SELFSIGNED`.
pub trait TrustStore<Cert> {
    fn is_trusted(&self, cert: &Cert) -> bool;
    fn trusted_issuer(&self, cert: &Cert) -> Option<Cert>;
}

pub use crate::certinfo::{CertStatus, RevocationStatus};

/// Bundles the collaborator set the signer and validator need, so call
/// sites carry one generic parameter instead of five (§6.4). A Rust-native
/// convenience for threading the same five traits through every
/// signer/validator entry point as a single associated-type bundle rather
/// than five loose generic parameters.
pub trait Environment {
    type Key: PublicKey;
    type HashImpl: Hash;
    type SignerImpl: Signer<Self::Key>;
    type KeysetImpl: Keyset<Self::Key>;
    type ResponderImpl: ResponderSession;
    type ClockImpl: Clock;
    type TrustImpl: TrustStore<crate::certinfo::CertInfo<Self::Key>>;
}
