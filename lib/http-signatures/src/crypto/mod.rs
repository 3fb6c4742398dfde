//!
//! Common cryptographic operations
//!

mod export;
mod sign;
mod verify;

pub mod generate;
pub mod parse;

pub use self::export::public_key_pem;
pub use self::sign::{sign, SigningKey};
pub use self::verify::{verify, VerifyError, VerifyingKey};
