//!
//! Checks a signature has to pass before it's worth verifying cryptographically
//!

use super::REQUEST_TARGET;
use http::{header::DATE, HeaderMap};
use miette::Diagnostic;
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Headers every signature has to cover
const REQUIRED_HEADERS: &[&str] = &[REQUEST_TARGET, "date"];

/// Headers every signature has to cover if the body digest is mandatory
const REQUIRED_DIGEST_HEADERS: &[&str] = &[REQUEST_TARGET, "date", "digest"];

#[derive(Debug, Diagnostic, Error)]
pub enum SafetyCheckError {
    #[error(transparent)]
    InvalidDateHeader(#[from] httpdate::Error),

    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::ToStrError),

    #[error("Missing date header")]
    MissingDateHeader,

    #[error("Missing required headers")]
    MissingRequiredHeaders,

    #[error("Date header is outside of the accepted clock skew ({skew:?} > {max_skew:?})")]
    ClockSkew { skew: Duration, max_skew: Duration },
}

#[inline]
fn is_subset<I>(left: &[I], right: &[I]) -> bool
where
    I: PartialEq,
{
    if left.len() <= right.len() {
        left.iter().all(|item| right.contains(item))
    } else {
        false
    }
}

/// Check whether the signed components include everything we insist on
///
/// That's `(request-target)` and `date`, plus `digest` if `require_digest` is set.
/// Names are compared case-insensitively.
pub fn check_components<'a, I>(components: I, require_digest: bool) -> Result<(), SafetyCheckError>
where
    I: IntoIterator<Item = &'a str>,
{
    let collected = components
        .into_iter()
        .map(str::to_ascii_lowercase)
        .collect::<Vec<String>>();
    let collected = collected.iter().map(String::as_str).collect::<Vec<&str>>();

    let required = if require_digest {
        REQUIRED_DIGEST_HEADERS
    } else {
        REQUIRED_HEADERS
    };

    if is_subset(required, &collected) {
        Ok(())
    } else {
        Err(SafetyCheckError::MissingRequiredHeaders)
    }
}

/// Check the `Date` header against the current time
///
/// The request is rejected if it is further than `max_skew` away from `now`, in either direction.
/// A difference of exactly `max_skew` is still accepted.
pub fn check_date(
    headers: &HeaderMap,
    now: SystemTime,
    max_skew: Duration,
) -> Result<(), SafetyCheckError> {
    let date_header = headers
        .get(DATE)
        .ok_or(SafetyCheckError::MissingDateHeader)?;
    let date = httpdate::parse_http_date(date_header.to_str()?)?;

    let skew = now
        .duration_since(date)
        .unwrap_or_else(|err| err.duration());

    if skew > max_skew {
        return Err(SafetyCheckError::ClockSkew { skew, max_skew });
    }

    Ok(())
}
