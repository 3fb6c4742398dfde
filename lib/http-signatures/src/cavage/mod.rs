//!
//! Implementation of the `Signature` header scheme from draft-cavage-http-signatures
//!
//! This is the scheme ActivityPub servers speak with each other
//!

mod parse;
mod serialise;

pub mod easy;
pub mod safety_check;
pub mod signature_string;

pub use self::{
    parse::{parse, ParseError},
    serialise::serialise,
};

/// Algorithm tag we put into the `algorithm` field
///
/// The field is informational only. The algorithm is fixed by the type of the key.
pub const ALGORITHM: &str = "rsa-sha256";

/// Name of the `(request-target)` pseudo-header
pub const REQUEST_TARGET: &str = "(request-target)";

/// Structured fields of a `Signature` header
///
/// `headers` is the ordered list of signed components, `signature` the Base64 encoded signature.
/// While signing, the signature is set to `()` until it is known.
#[derive(Clone, Debug)]
pub struct SignatureHeader<'a, I, S> {
    pub key_id: &'a str,
    pub algorithm: Option<&'a str>,
    pub headers: I,
    pub signature: S,
}
