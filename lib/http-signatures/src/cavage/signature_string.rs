//!
//! Utilities for handling signature strings
//!

use super::{SignatureHeader, REQUEST_TARGET};
use http::{HeaderMap, Method, Uri};
use miette::Diagnostic;
use std::fmt::Write;
use thiserror::Error;

/// Signature string error
#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    /// Header had an invalid value (non UTF-8 value)
    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::ToStrError),

    /// Header is missing from the request
    #[error("Missing value for header `{0}`")]
    MissingHeaderValue(String),

    /// Pseudo-header other than `(request-target)`
    #[error("Unsupported pseudo-header `{0}`")]
    UnsupportedPseudoHeader(String),
}

/// Build a signature string out of the request components and the ordered list of signed names
///
/// Each name is rendered as `{name}: {value}`, the lines are joined by `\n` without a trailing new-line.
/// Headers that occur multiple times have their values joined by `", "`.
pub fn build<'a, I>(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    names: I,
) -> Result<String, Error>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut signature_string = String::new();
    for name in names {
        match name {
            REQUEST_TARGET => {
                let method = method.as_str().to_lowercase();
                let path_and_query = uri
                    .path_and_query()
                    .map_or_else(|| uri.path(), |path_and_query| path_and_query.as_str());

                let _ = writeln!(signature_string, "{REQUEST_TARGET}: {method} {path_and_query}");
            }
            pseudo if pseudo.starts_with('(') && pseudo.ends_with(')') => {
                return Err(Error::UnsupportedPseudoHeader(pseudo.to_owned()));
            }
            header => {
                let mut values = headers.get_all(header).iter().peekable();
                if values.peek().is_none() {
                    return Err(Error::MissingHeaderValue(header.to_owned()));
                }

                let _ = write!(signature_string, "{}: ", header.to_lowercase());
                for (idx, value) in values.enumerate() {
                    if idx > 0 {
                        signature_string.push_str(", ");
                    }
                    signature_string.push_str(value.to_str()?);
                }
                signature_string.push('\n');
            }
        }
    }

    // Remove the last new-line
    signature_string.pop();

    Ok(signature_string)
}

/// Construct a new signature string from a parsed signature header and an HTTP request
#[inline]
pub fn construct<'a, B, I, S>(
    request: &http::Request<B>,
    signature_header: &SignatureHeader<'_, I, S>,
) -> Result<String, Error>
where
    I: Iterator<Item = &'a str> + Clone,
{
    build(
        request.method(),
        request.uri(),
        request.headers(),
        signature_header.headers.clone(),
    )
}
