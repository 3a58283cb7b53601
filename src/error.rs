//! Errors for every layer of the crate.
//!
//! The cursor layer (`src/cursor.rs`) and the primitive codec raise
//! [`DecodeError`]/[`EncodeError`], the exhaustive low-level failure kinds of
//! a single read or write. Everything above that — the validator, the
//! signer, the certificate validator — raises [`Error`], whose [`ErrorKind`]
//! is the exhaustive list from the error-handling design (§7): `BadData`,
//! `Overflow`, `NotFound`, `NotAvailable`, `Invalid`, `Signature`,
//! `Permission`, `NotInitialised`, `Initialised`, `Memory`, `Timeout`,
//! `Cancelled`, `InvalidArgument`.

use snafu::Snafu;
use std::{boxed::Box, string::String, string::ToString};

/// Low-level decode failure kinds raised by [`crate::cursor::Reader`] and the
/// primitive codec in `src/ber`.
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    #[snafu(display("unexpected end of input"))]
    Truncated,
    #[snafu(display("malformed encoding: {reason}"))]
    BadData { reason: String },
    #[snafu(display("length field too large: {reason}"))]
    Overflow { reason: String },
    #[snafu(display("nesting depth {depth} exceeds the limit of {limit}"))]
    NestingTooDeep { depth: usize, limit: usize },
    #[snafu(display("unsupported or out-of-range tag (class {class}, number {number})"))]
    UnsupportedTag { class: u8, number: u32 },
    #[snafu(display("indefinite length not permitted in this context"))]
    IndefiniteNotPermitted,
    #[snafu(display("string contains characters not permitted by its declared type"))]
    InvalidStringContent,
}

/// A decode failure. Carries a single [`DecodeErrorKind`] — once a
/// [`crate::cursor::Reader`] latches an error, every further read surfaces
/// the exact same value (§3.1), so there's nothing to accumulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub fn new(kind: DecodeErrorKind) -> Self {
        Self { kind }
    }

    pub fn bad_data(reason: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::BadData { reason: reason.into() })
    }
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for DecodeError {}

/// Low-level encode failure kinds raised by [`crate::cursor::Writer`].
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeErrorKind {
    #[snafu(display("write_at is not available on a sink writer"))]
    SinkWriteAt,
    #[snafu(display("write_at target range is out of bounds"))]
    Truncated,
    #[snafu(display("cannot encode: {reason}"))]
    BadData { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeError {
    pub kind: EncodeErrorKind,
}

impl EncodeError {
    pub fn new(kind: EncodeErrorKind) -> Self {
        Self { kind }
    }
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for EncodeError {}

/// The field a signer constraint failure is localised to (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorLocus {
    Subject,
    Issuer,
    IssuerConstraint,
    SigningKey,
    SerialNumber,
    Validity,
    Chain,
    None,
}

/// What kind of constraint problem was found at an [`ErrorLocus`] (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorType {
    AttributePresent,
    AttributeValue,
    AttributeAbsent,
    Constraint,
    IssuerConstraint,
    None,
}

/// The exhaustive top-level error kind (§7).
#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum ErrorKind {
    #[snafu(display("structural violation in encoded input: {reason}"))]
    BadData { reason: String },
    #[snafu(display("length field too large for the context"))]
    Overflow,
    #[snafu(display("identifier not found in the keyset"))]
    NotFound,
    #[snafu(display("required algorithm or capability not available"))]
    NotAvailable,
    #[snafu(display("semantic check failed: {reason}"))]
    Invalid { reason: String },
    #[snafu(display("signature verification failed"))]
    Signature,
    #[snafu(display("KeyUsage or CA flag forbids this action"))]
    Permission,
    #[snafu(display("object is missing a required field"))]
    NotInitialised,
    #[snafu(display("object is already signed"))]
    Initialised,
    #[snafu(display("allocation failure"))]
    Memory,
    #[snafu(display("responder session timed out"))]
    Timeout,
    #[snafu(display("responder session was cancelled"))]
    Cancelled,
    #[snafu(display("(subject type, verifier type) combination is not supported"))]
    InvalidArgument,
}

/// The crate's top-level error type: an [`ErrorKind`] plus, for signer
/// constraint failures, the [`ErrorLocus`]/[`ErrorType`] that localise it.
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: Box<ErrorKind>,
    pub locus: ErrorLocus,
    pub error_type: ErrorType,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind: Box::new(kind), locus: ErrorLocus::None, error_type: ErrorType::None }
    }

    pub fn with_locus(kind: ErrorKind, locus: ErrorLocus, error_type: ErrorType) -> Self {
        Self { kind: Box::new(kind), locus, error_type }
    }

    pub fn bad_data(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadData { reason: reason.into() })
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invalid { reason: reason.into() })
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for Error {}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        match &e.kind {
            DecodeErrorKind::Overflow { .. } => Self::new(ErrorKind::Overflow),
            other => Self::bad_data(other.to_string()),
        }
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Self::bad_data(e.to_string())
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;
pub type EncodeResult<T> = Result<T, EncodeError>;
pub type Result<T> = core::result::Result<T, Error>;
