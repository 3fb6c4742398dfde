use const_oid::db::rfc5912::RSA_ENCRYPTION;
use pkcs8::{
    der::{
        asn1::{AnyRef, BitStringRef},
        EncodePem,
    },
    spki::AlgorithmIdentifier,
    LineEnding, SubjectPublicKeyInfoRef,
};
use ring::signature::RsaKeyPair;

/// Export the public half of an RSA key pair as an SPKI PEM document (`PUBLIC KEY`)
pub fn public_key_pem(key: &RsaKeyPair) -> Result<String, pkcs8::der::Error> {
    let spki = SubjectPublicKeyInfoRef {
        algorithm: AlgorithmIdentifier {
            oid: RSA_ENCRYPTION,
            parameters: Some(AnyRef::NULL),
        },
        subject_public_key: BitStringRef::from_bytes(key.public().as_ref())?,
    };

    spki.to_pem(LineEnding::LF)
}
