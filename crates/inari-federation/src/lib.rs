#![doc = include_str!("../README.md")]

pub mod ap;
pub mod config;
pub mod fetcher;
pub mod verifier;

pub use self::{
    fetcher::{HttpKeyFetcher, KeyFetcher},
    verifier::{Accepted, Policy, Rejection, RejectionKind, VerificationOutcome, Verifier},
};
