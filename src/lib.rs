//! An ASN.1 BER/DER codec and an X.509-style certificate signing/validation
//! engine built on top of it.
//!
//! The crate is organised in the same layers the design separates:
//!
//! - [`cursor`] — the sticky-error byte cursor every other layer reads and
//!   writes through.
//! - [`ber`] — the primitive codec: tags, lengths, INTEGER, BIT/OCTET STRING,
//!   OBJECT IDENTIFIER, character strings, UTCTime/GeneralizedTime.
//! - [`validator`] — the encoding validator, which walks a complete object
//!   once and locates `AlgorithmIdentifier`-shaped encapsulation holes.
//! - [`charset`] — the character-set canonicaliser for the ASN.1 string
//!   lattice.
//! - [`algorithm`] — the small set of digest/key/signature algorithm
//!   identifiers the signer and validator actually speak.
//! - [`collab`] — the collaborator traits (hash, key, signer, keyset,
//!   responder session, clock, trust store) the core consumes but doesn't
//!   implement, bundled behind [`collab::Environment`].
//! - [`certinfo`] — the certificate object model.
//! - [`ids`] — `nameID`/`issuerID`/`certID` keyset-lookup identifiers.
//! - [`recovery`] — re-derives a signed object's DN/SPKI pointers from its
//!   blob.
//! - [`signer`] — assembles and signs a certificate object.
//! - [`certvalidator`] — checks a certificate against a key, a trusted cert,
//!   a CRL, or a live responder.
//! - [`default_impls`] (feature `default-impls`) — concrete collaborator
//!   implementations backed by `sha1`/`rsa`/`rand`, for embedders without
//!   their own crypto provider and for this crate's own tests.

pub mod algorithm;
pub mod ber;
pub mod certinfo;
pub mod certvalidator;
pub mod charset;
pub mod collab;
pub mod cursor;
#[cfg(feature = "default-impls")]
pub mod default_impls;
pub mod error;
pub mod ids;
pub mod limits;
pub mod recovery;
pub mod signer;
pub mod tag;
pub mod validator;

pub use certinfo::{CertInfo, CertKind};
pub use certvalidator::{check_cert_validity, Verifier};
pub use collab::Environment;
pub use error::{Error, ErrorKind, ErrorLocus, ErrorType, Result};
pub use limits::Limits;
pub use signer::sign;
pub use validator::check_object_encoding;
