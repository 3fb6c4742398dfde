use miette::Diagnostic;
use ring::signature::UnparsedPublicKey;
use thiserror::Error;

/// Verification error
#[derive(Debug, Diagnostic, Error)]
pub enum VerifyError {
    /// Failed to decode the Base64 payload
    #[error(transparent)]
    Base64(#[from] base64_simd::Error),

    /// Verification failed
    #[error("Verification failed")]
    Verification,
}

/// Verifying key definition
///
/// Implementations have to compare in constant time
pub trait VerifyingKey {
    /// Check whether the signature is valid for the message
    fn verify(&self, msg: &[u8], signature: &[u8]) -> bool;
}

impl<B> VerifyingKey for UnparsedPublicKey<B>
where
    B: AsRef<[u8]>,
{
    #[inline]
    fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        UnparsedPublicKey::verify(self, msg, signature).is_ok()
    }
}

/// Verify that the message corresponds with the signature using the provided verifying key
#[inline]
pub fn verify<VK>(msg: &[u8], encoded_signature: &str, key: &VK) -> Result<(), VerifyError>
where
    VK: VerifyingKey + ?Sized,
{
    let signature = base64_simd::STANDARD.decode_to_vec(encoded_signature)?;
    if key.verify(msg, &signature) {
        Ok(())
    } else {
        Err(VerifyError::Verification)
    }
}
