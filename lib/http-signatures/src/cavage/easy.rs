//!
//! Easy and fool-proof HTTP signature handling
//!
//! Integrates with async and offers an incredibly simplistic interface for signing outgoing requests
//!

use super::{SignatureHeader, ALGORITHM};
use crate::{crypto::SigningKey, BoxError, DIGEST_HEADER, SIGNATURE_HEADER};
use http::{
    header::{DATE, HOST},
    HeaderValue, Uri,
};
use thiserror::Error;
use tick_tock_mock::Clock;
use tracing::{debug, instrument};

/// Components every outgoing request signs, in this order
pub const SIGNED_HEADERS: &[&str] = &[super::REQUEST_TARGET, "host", "date", "digest"];

/// Easy module error
#[derive(Debug, Error)]
pub enum Error {
    /// Blocking pool communication failure
    #[error(transparent)]
    Blocking(#[from] tokio::task::JoinError),

    /// Invalid HTTP header value
    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Request URI isn't absolute
    #[error("Request URI has no authority")]
    MissingAuthority,

    /// Signature string construction failure
    #[error(transparent)]
    SignatureStringConstruction(#[from] super::signature_string::Error),

    /// Key handle failed to produce a signature
    #[error("Signing failed")]
    SigningFailed(#[source] BoxError),
}

/// Render the `Host` header value from the URI authority
///
/// Lower-cased, the port is omitted if it's the default one of the scheme
fn host(uri: &Uri) -> Result<String, Error> {
    let authority = uri.authority().ok_or(Error::MissingAuthority)?;
    let host = authority.host().to_ascii_lowercase();

    let default_port = match uri.scheme_str() {
        Some("http") => Some(80),
        Some("https") => Some(443),
        _ => None,
    };

    let host = match authority.port_u16() {
        Some(port) if Some(port) != default_port => format!("{host}:{port}"),
        _ => host,
    };

    Ok(host)
}

/// Sign an HTTP request using the provided signing key using opinionated defaults
///
/// Sets the `Host`, `Date`, `Digest` and `Signature` headers. Existing values get overwritten.
/// The date is taken from the provided clock.
#[inline]
#[instrument(skip_all, fields(key_id = %key_id))]
pub async fn sign<B, SK>(
    mut req: http::Request<B>,
    key_id: &str,
    key: SK,
    clock: &Clock,
) -> Result<http::Request<B>, Error>
where
    B: AsRef<[u8]>,
    SK: SigningKey + Send + 'static,
{
    let host_value = HeaderValue::from_str(&host(req.uri())?)?;
    let date_value = HeaderValue::from_str(&httpdate::fmt_http_date(clock.now()))?;
    let digest_value = HeaderValue::from_str(&crate::digest::digest(req.body().as_ref()))?;

    let headers = req.headers_mut();
    headers.insert(HOST, host_value);
    headers.insert(DATE, date_value);
    headers.insert(&DIGEST_HEADER, digest_value);

    let signature_string = super::signature_string::build(
        req.method(),
        req.uri(),
        req.headers(),
        SIGNED_HEADERS.iter().copied(),
    )?;

    let signature = tokio::task::spawn_blocking(move || {
        crate::crypto::sign(signature_string.as_bytes(), &key)
    })
    .await?
    .map_err(Error::SigningFailed)?;

    let signature_header = SignatureHeader {
        key_id,
        algorithm: Some(ALGORITHM),
        headers: SIGNED_HEADERS.iter().copied(),
        signature,
    };

    let signature_header_value = HeaderValue::from_str(&super::serialise(signature_header))?;
    req.headers_mut()
        .insert(&SIGNATURE_HEADER, signature_header_value);

    debug!("signed request");

    Ok(req)
}
