#![doc = include_str!("../README.md")]

use http::HeaderName;

pub mod cavage;
pub mod crypto;
pub mod digest;

pub use tick_tock_mock::Clock;

/// Type-erased error used at the key handle seams
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Name of the `Signature` header
pub static SIGNATURE_HEADER: HeaderName = HeaderName::from_static("signature");

/// Name of the `Digest` header
pub static DIGEST_HEADER: HeaderName = HeaderName::from_static("digest");
