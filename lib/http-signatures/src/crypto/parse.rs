//!
//! Parse cryptographic keys for use in the HTTP signature implementations
//!

use const_oid::db::rfc5912::RSA_ENCRYPTION;
use miette::Diagnostic;
use pkcs8::{Document, PrivateKeyInfo, SecretDocument, SubjectPublicKeyInfoRef};
use ring::signature::{RsaKeyPair, UnparsedPublicKey, RSA_PKCS1_2048_8192_SHA256};
use thiserror::Error;

const PKCS1_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";
const PKCS1_PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";

/// Key parsing error
#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    /// Malformed DER structure
    #[error(transparent)]
    Der(#[from] pkcs8::der::Error),

    /// Key rejected
    #[error(transparent)]
    KeyRejected(#[from] ring::error::KeyRejected),

    /// Malformed key
    #[error("Malformed key")]
    MalformedKey,

    /// Malformed PKCS#8 document
    #[error(transparent)]
    Pkcs8(#[from] pkcs8::Error),

    /// Unknown key type
    #[error("Unknown key type")]
    UnknownKeyType,
}

/// Public key usable for verifying `rsa-sha256` signatures
pub type PublicKey = UnparsedPublicKey<Vec<u8>>;

/// Parse a public key from its PEM form
///
/// Accepts SPKI (`PUBLIC KEY`) and PKCS#1 (`RSA PUBLIC KEY`) documents. Only RSA keys are supported.
#[inline]
pub fn public_key(pem: &str) -> Result<PublicKey, Error> {
    let (label, document) = Document::from_pem(pem.trim())?;
    if label == PKCS1_PUBLIC_KEY_LABEL {
        return Ok(UnparsedPublicKey::new(
            &RSA_PKCS1_2048_8192_SHA256,
            document.as_bytes().to_vec(),
        ));
    }

    let spki: SubjectPublicKeyInfoRef<'_> = document.decode_msg()?;
    if spki.algorithm.oid != RSA_ENCRYPTION {
        return Err(Error::UnknownKeyType);
    }

    let raw_bytes = spki
        .subject_public_key
        .as_bytes()
        .ok_or(Error::MalformedKey)?
        .to_vec();

    Ok(UnparsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA256, raw_bytes))
}

/// Parse a private key from its PEM form
///
/// Accepts PKCS#8 (`PRIVATE KEY`) and PKCS#1 (`RSA PRIVATE KEY`) documents. Only RSA keys are supported.
///
/// This function uses constant-time PEM decoding and zeroizes any temporary allocations.
/// Prefer it over your own decoding logic.
#[inline]
pub fn private_key(pem: &str) -> Result<RsaKeyPair, Error> {
    let (label, document) = SecretDocument::from_pem(pem.trim())?;
    if label == PKCS1_PRIVATE_KEY_LABEL {
        return Ok(RsaKeyPair::from_der(document.as_bytes())?);
    }

    let private_key_raw: PrivateKeyInfo<'_> = document.decode_msg()?;
    if private_key_raw.algorithm.oid != RSA_ENCRYPTION {
        return Err(Error::UnknownKeyType);
    }

    Ok(RsaKeyPair::from_der(private_key_raw.private_key)?)
}
