use crate::BoxError;
use ring::{
    rand::SystemRandom,
    signature::{RsaKeyPair, RSA_PKCS1_SHA256},
};
use std::sync::Arc;

/// Signing key definition
///
/// Signing is fallible: the key handle might live somewhere we can't reach (HSM, remote signer, etc.)
pub trait SigningKey {
    /// Type the signature algorithm outputs
    type Output: AsRef<[u8]>;

    /// Sign a message
    fn sign(&self, msg: &[u8]) -> Result<Self::Output, BoxError>;
}

impl SigningKey for RsaKeyPair {
    type Output = Vec<u8>;

    #[inline]
    fn sign(&self, msg: &[u8]) -> Result<Self::Output, BoxError> {
        let mut buf = vec![0; self.public().modulus_len()];

        let rng = SystemRandom::new();
        RsaKeyPair::sign(self, &RSA_PKCS1_SHA256, &rng, msg, &mut buf)
            .map_err(|_| BoxError::from("RSA signing failed"))?;

        Ok(buf)
    }
}

impl<K> SigningKey for &K
where
    K: SigningKey + ?Sized,
{
    type Output = K::Output;

    #[inline]
    fn sign(&self, msg: &[u8]) -> Result<Self::Output, BoxError> {
        (**self).sign(msg)
    }
}

impl<K> SigningKey for Arc<K>
where
    K: SigningKey + ?Sized,
{
    type Output = K::Output;

    #[inline]
    fn sign(&self, msg: &[u8]) -> Result<Self::Output, BoxError> {
        (**self).sign(msg)
    }
}

/// Sign a message with the provided signing key and encode the returned signature in Base64
#[inline]
pub fn sign<SK>(payload: &[u8], key: &SK) -> Result<String, BoxError>
where
    SK: SigningKey + ?Sized,
{
    let signature = key.sign(payload)?;
    Ok(base64_simd::STANDARD.encode_to_string(signature))
}
