use rsa::{
    pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding},
    RsaPrivateKey,
};

/// Size of freshly generated RSA keys
pub const KEY_SIZE: usize = 2048;

/// Generation error
#[derive(Debug, miette::Diagnostic, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Pkcs8(#[from] rsa::pkcs8::Error),

    #[error(transparent)]
    Rsa(#[from] rsa::Error),

    #[error(transparent)]
    Spki(#[from] rsa::pkcs8::spki::Error),
}

/// Freshly generated key pair in PEM form
#[derive(Clone)]
pub struct KeyPair {
    /// PKCS#8 encoded private key
    pub private_key_pem: String,

    /// SPKI encoded public key
    pub public_key_pem: String,
}

/// Generate a new RSA key pair
///
/// This is CPU heavy. Call it from a blocking context.
pub fn generate() -> Result<KeyPair, Error> {
    let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), KEY_SIZE)?;
    let public_key_pem = private_key.to_public_key().to_public_key_pem(LineEnding::LF)?;
    let private_key_pem = private_key.to_pkcs8_pem(LineEnding::LF)?;

    Ok(KeyPair {
        private_key_pem: private_key_pem.as_str().to_owned(),
        public_key_pem,
    })
}
