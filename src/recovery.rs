//! Certificate-data recovery (§4.7): re-derives `{offset, len}` pointers
//! into a signed blob by walking its ASN.1 structure without copying data.
//! Invoked both after signing (§4.5 step 9) and on import of a
//! foreign-encoded object.
//!
//! For a standard X.509 certificate the walk is: outer `SEQUENCE` → inner
//! `SEQUENCE` → skip optional `[0]` version → skip serial → skip sigAlg →
//! capture issuerDN → skip validity → capture subjectDN → capture SPKI.
//! CRMF and PKI user records have analogous, shorter walks.

use crate::ber::header::{read_header, read_sequence};
use crate::ber::length::Length;
use crate::certinfo::{BlobRange, CertInfo, CertKind};
use crate::collab::PublicKey;
use crate::cursor::Reader;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::tag::Class;

/// Reads one complete TLV item at the cursor and returns the byte range it
/// occupies in the underlying blob (tag octet through the last content
/// byte), leaving the cursor positioned just past it.
fn capture_item(reader: &mut Reader<'_>, limits: &Limits) -> Result<BlobRange> {
    let start = reader.position();
    let header = read_header(reader, limits, true)?;
    let len = header.length.definite()?;
    reader.skip(len)?;
    Ok(BlobRange { offset: start, len: header.header_len + len })
}

/// Skips one complete TLV item without recording its range.
fn skip_item(reader: &mut Reader<'_>, limits: &Limits) -> Result<()> {
    capture_item(reader, limits).map(|_| ())
}

/// Peeks whether the next item is a context-specific constructed `[tag]`
/// (used to detect the optional version field, §4.7).
fn next_is_context_tag(reader: &Reader<'_>, tag_number: u32) -> bool {
    match reader.underlying().get(reader.position()) {
        Some(&byte) => {
            let class = (byte >> 6) & 0x03;
            let number = byte & 0x1F;
            class == Class::Context as u8 && number == tag_number as u8
        }
        None => false,
    }
}

/// Recovers `issuerDN`/`subjectDN`/`publicKeyInfo`/`serialNumber` pointers
/// for a standard X.509 certificate (§4.7).
fn recover_certificate<K: PublicKey>(info: &mut CertInfo<K>, blob: &[u8], limits: &Limits) -> Result<()> {
    let mut reader = Reader::new(blob);
    read_sequence(&mut reader, limits)?; // outer SEQUENCE
    read_sequence(&mut reader, limits)?; // TBSCertificate SEQUENCE

    if next_is_context_tag(&reader, 0) {
        skip_item(&mut reader, limits)?; // [0] version, EXPLICIT
    }
    let serial = capture_item(&mut reader, limits)?; // serialNumber INTEGER
    skip_item(&mut reader, limits)?; // signature AlgorithmIdentifier
    let issuer = capture_item(&mut reader, limits)?; // issuer Name
    skip_item(&mut reader, limits)?; // validity SEQUENCE
    let subject = capture_item(&mut reader, limits)?; // subject Name
    let spki = capture_item(&mut reader, limits)?; // SubjectPublicKeyInfo

    info.serial_number = Some(serial);
    info.issuer_dn = Some(issuer);
    info.subject_dn = Some(subject);
    info.public_key_info = Some(spki);
    Ok(())
}

/// Recovers pointers for a PKCS#10 certification request: only the subject
/// DN and the (non-standard-tagged) public-key field are meaningful (§4.7).
fn recover_cert_request<K: PublicKey>(info: &mut CertInfo<K>, blob: &[u8], limits: &Limits) -> Result<()> {
    let mut reader = Reader::new(blob);
    read_sequence(&mut reader, limits)?; // outer SEQUENCE
    read_sequence(&mut reader, limits)?; // CertificationRequestInfo SEQUENCE
    skip_item(&mut reader, limits)?; // version INTEGER
    let subject = capture_item(&mut reader, limits)?; // subject Name
    let spki = capture_item(&mut reader, limits)?; // SubjectPublicKeyInfo

    info.subject_dn = Some(subject);
    info.public_key_info = Some(spki);
    Ok(())
}

/// Recovers pointers for a CRMF request. The public-key field uses a
/// non-standard `[6]` IMPLICIT tag rather than the standard
/// `SubjectPublicKeyInfo` placement, so the walk accounts for it separately
/// (§4.5 step 9, §4.7).
fn recover_crmf_request<K: PublicKey>(info: &mut CertInfo<K>, blob: &[u8], limits: &Limits) -> Result<()> {
    let mut reader = Reader::new(blob);
    read_sequence(&mut reader, limits)?; // outer CertReqMsg-ish SEQUENCE
    read_sequence(&mut reader, limits)?; // CertRequest SEQUENCE
    skip_item(&mut reader, limits)?; // certReqId INTEGER
    read_sequence(&mut reader, limits)?; // CertTemplate SEQUENCE

    let mut subject = None;
    let mut spki = None;
    loop {
        if reader.remaining() == 0 {
            break;
        }
        let Some(&byte) = reader.underlying().get(reader.position()) else { break };
        let tag_number = byte & 0x1F;
        if (byte >> 6) & 0x03 != Class::Context as u8 {
            break;
        }
        match tag_number {
            5 => subject = Some(capture_item(&mut reader, limits)?), // [5] subject
            6 => spki = Some(capture_item(&mut reader, limits)?),    // [6] publicKey, non-standard tag
            _ => skip_item(&mut reader, limits)?,
        }
        if tag_number > 6 {
            break;
        }
    }

    info.subject_dn = subject;
    info.public_key_info = spki;
    Ok(())
}

/// Recovers the subject DN for a PKI user record; no other field is
/// recovered (§4.7).
fn recover_pki_user<K: PublicKey>(info: &mut CertInfo<K>, blob: &[u8], limits: &Limits) -> Result<()> {
    let mut reader = Reader::new(blob);
    read_sequence(&mut reader, limits)?;
    let subject = capture_item(&mut reader, limits)?;
    info.subject_dn = Some(subject);
    Ok(())
}

/// Re-derives the derived-pointer fields of `info` from its (already
/// populated) `blob`, dispatching on `info.kind` (§4.7). After recovery, if
/// the object is a certificate the public-key context is constructed from
/// the captured SPKI and returned for the caller to apply the same
/// constraints as on import.
pub fn recover_pointers<K: PublicKey>(info: &mut CertInfo<K>, limits: &Limits) -> Result<()> {
    let blob = match &info.blob {
        Some(b) => b.as_slice().to_vec(),
        None => return Err(Error::new(crate::error::ErrorKind::NotInitialised)),
    };

    match info.kind {
        CertKind::Certificate | CertKind::AttributeCert => recover_certificate(info, &blob, limits)?,
        CertKind::CertRequest => recover_cert_request(info, &blob, limits)?,
        CertKind::CrmfRequest | CertKind::RevocationRequest => recover_crmf_request(info, &blob, limits)?,
        CertKind::PkiUser => recover_pki_user(info, &blob, limits)?,
        // CRL/OCSP/RTCS/chain objects have no issuer/subject DN pointers to
        // recover in the same sense; their content is reached through the
        // revocation list / chain fields instead.
        CertKind::Crl
        | CertKind::RtcsRequest
        | CertKind::RtcsResponse
        | CertKind::OcspRequest
        | CertKind::OcspResponse
        | CertKind::CertChain => {}
    }

    if matches!(info.kind, CertKind::Certificate | CertKind::AttributeCert | CertKind::CertRequest) {
        if let Some(spki_range) = info.public_key_info {
            let blob_ref = info.blob.as_ref().unwrap();
            let spki_bytes = spki_range.slice(blob_ref.as_slice());
            let key = K::from_spki(spki_bytes)?;
            info.subject_public_key = Some(key);
        }
    }

    Ok(())
}
