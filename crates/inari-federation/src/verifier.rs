//!
//! Verification of incoming signed requests
//!
//! Every stage either advances or rejects. Cheap checks run first, then the key fetch, then the RSA verification.
//!

use crate::{
    ap::{Activity, SignedPayload},
    fetcher::KeyFetcher,
};
use bytes::Bytes;
use http::{Request, StatusCode};
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, Limited};
use http_signatures::{
    cavage::{self, safety_check, signature_string},
    crypto, BoxError, Clock, DIGEST_HEADER, SIGNATURE_HEADER,
};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use std::{error::Error as StdError, fmt, time::Duration};
use tracing::{debug, instrument};
use typed_builder::TypedBuilder;
use url::Url;

/// Knobs of the verification
#[derive(Clone, Copy, Debug)]
pub struct Policy {
    /// Require a matching `Digest` header that is covered by the signature
    pub require_digest: bool,

    /// Maximum distance between the `Date` header and the current time
    pub max_clock_skew: Duration,

    /// Timeout of the actor lookup
    pub timeout: Duration,

    /// Maximum accepted body size in bytes
    pub body_limit: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            require_digest: false,
            max_clock_skew: Duration::from_secs(30),
            timeout: Duration::from_secs(10),
            body_limit: 1024 * 1024,
        }
    }
}

/// Reason a request got rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectionKind {
    /// No `Signature` header
    MissingSignatureHeader,

    /// The `Signature` header couldn't be parsed or uses an unsupported component
    MalformedSignatureHeader,

    /// The signature doesn't cover everything it has to, or a covered header is absent
    IncompleteSignedHeaders,

    /// `Date` header missing, unparseable or outside of the accepted clock skew
    StaleRequest,

    /// Body couldn't be read, exceeded the limit or isn't the expected JSON
    MalformedBody,

    /// `Digest` header doesn't match the body
    DigestMismatch,

    /// `keyId` isn't a URL
    MalformedKeyId,

    /// The key doesn't belong to the actor that authored the body
    ActorKeyMismatch,

    /// The actor document couldn't be fetched
    KeyResolutionFailed,

    /// The actor's public key couldn't be imported
    InvalidKeyMaterial,

    /// Cryptographic verification failed
    SignatureInvalid,
}

impl RejectionKind {
    /// Stable name of the rejection, used in logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingSignatureHeader => "missing-signature-header",
            Self::MalformedSignatureHeader => "malformed-signature-header",
            Self::IncompleteSignedHeaders => "incomplete-signed-headers",
            Self::StaleRequest => "stale-request",
            Self::MalformedBody => "malformed-body",
            Self::DigestMismatch => "digest-mismatch",
            Self::MalformedKeyId => "malformed-key-id",
            Self::ActorKeyMismatch => "actor-key-mismatch",
            Self::KeyResolutionFailed => "key-resolution-failed",
            Self::InvalidKeyMaterial => "invalid-key-material",
            Self::SignatureInvalid => "signature-invalid",
        }
    }

    /// Status code an HTTP server should answer with
    #[must_use]
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::DigestMismatch | Self::ActorKeyMismatch => StatusCode::FORBIDDEN,
            Self::MissingSignatureHeader
            | Self::MalformedSignatureHeader
            | Self::MalformedBody
            | Self::IncompleteSignedHeaders
            | Self::StaleRequest
            | Self::MalformedKeyId
            | Self::KeyResolutionFailed
            | Self::InvalidKeyMaterial
            | Self::SignatureInvalid => StatusCode::UNAUTHORIZED,
        }
    }

    /// Whether the rejection was caused by a dependency and a retry might succeed
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(self, Self::KeyResolutionFailed | Self::InvalidKeyMaterial)
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected request
pub struct Rejection {
    kind: RejectionKind,
    source: Option<BoxError>,
}

impl Rejection {
    fn new(kind: RejectionKind) -> Self {
        Self { kind, source: None }
    }

    fn with_source<E>(kind: RejectionKind, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    /// Reason of the rejection
    #[must_use]
    pub fn kind(&self) -> RejectionKind {
        self.kind
    }
}

impl fmt::Debug for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejection")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Some(ref source) => write!(f, "{}: {source}", self.kind),
            None => fmt::Display::fmt(&self.kind, f),
        }
    }
}

impl StdError for Rejection {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

/// Accepted request
#[derive(Debug)]
pub struct Accepted<T> {
    /// Parsed body
    pub body: T,

    /// Body as it was received
    pub raw_body: Bytes,

    /// Percent-decoded key ID
    pub key_id: Url,

    /// Actor the key belongs to
    pub actor: Url,
}

/// Result of a verification
pub type VerificationOutcome<T = Activity> = Result<Accepted<T>, Rejection>;

/// Verifier of incoming signed requests
#[derive(Clone, TypedBuilder)]
pub struct Verifier<F> {
    fetcher: F,
    #[builder(default)]
    clock: Clock,
    #[builder(default)]
    policy: Policy,
}

/// Compare two URLs after normalising them
fn same_url(left: &str, right: &Url) -> bool {
    Url::parse(left).is_ok_and(|left| left == *right)
}

impl<F> Verifier<F>
where
    F: KeyFetcher,
{
    /// Policy the verifier enforces
    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Verify a request and, on success, return its parsed body
    ///
    /// The body is consumed in the process.
    #[instrument(skip_all, fields(method = %req.method(), uri = %req.uri()))]
    pub async fn verify<T, B>(&self, req: Request<B>) -> VerificationOutcome<T>
    where
        T: DeserializeOwned + SignedPayload,
        B: HttpBody,
        B::Error: Into<BoxError>,
    {
        let result = self.verify_inner(req).await;
        match result {
            Ok(ref accepted) => debug!(key_id = %accepted.key_id, "accepted signed request"),
            Err(ref rejection) => {
                debug!(kind = %rejection.kind, source = ?rejection.source, "rejected signed request");
            }
        }

        result
    }

    async fn verify_inner<T, B>(&self, req: Request<B>) -> VerificationOutcome<T>
    where
        T: DeserializeOwned + SignedPayload,
        B: HttpBody,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();

        let header_value = parts
            .headers
            .get(&SIGNATURE_HEADER)
            .ok_or_else(|| Rejection::new(RejectionKind::MissingSignatureHeader))?;
        let header_value = header_value.to_str().map_err(|err| {
            Rejection::with_source(RejectionKind::MalformedSignatureHeader, err)
        })?;
        let signature_header = cavage::parse(header_value).map_err(|err| {
            Rejection::with_source(RejectionKind::MalformedSignatureHeader, err)
        })?;

        safety_check::check_components(signature_header.headers.clone(), self.policy.require_digest)
            .map_err(|err| Rejection::with_source(RejectionKind::IncompleteSignedHeaders, err))?;

        safety_check::check_date(&parts.headers, self.clock.now(), self.policy.max_clock_skew)
            .map_err(|err| Rejection::with_source(RejectionKind::StaleRequest, err))?;

        let raw_body = Limited::new(body, self.policy.body_limit)
            .collect()
            .await
            .map_err(|err| Rejection::with_source(RejectionKind::MalformedBody, err))?
            .to_bytes();

        match parts.headers.get(&DIGEST_HEADER) {
            Some(digest) => {
                let matches = digest
                    .to_str()
                    .is_ok_and(|digest| http_signatures::digest::matches(digest, &raw_body));
                if !matches {
                    return Err(Rejection::new(RejectionKind::DigestMismatch));
                }
            }
            None if self.policy.require_digest => {
                return Err(Rejection::with_source(
                    RejectionKind::DigestMismatch,
                    "missing digest header",
                ));
            }
            None => {}
        }

        let key_id = percent_decode_str(signature_header.key_id)
            .decode_utf8()
            .map_err(|err| Rejection::with_source(RejectionKind::MalformedKeyId, err))?;
        let key_id = Url::parse(&key_id)
            .map_err(|err| Rejection::with_source(RejectionKind::MalformedKeyId, err))?;
        let mut actor_url = key_id.clone();
        actor_url.set_fragment(None);

        let body: T = sonic_rs::from_slice(&raw_body)
            .map_err(|err| Rejection::with_source(RejectionKind::MalformedBody, err))?;
        if !same_url(body.actor(), &actor_url) {
            return Err(Rejection::with_source(
                RejectionKind::ActorKeyMismatch,
                format!("activity actor {} isn't the owner of {key_id}", body.actor()),
            ));
        }

        let actor = tokio::time::timeout(self.policy.timeout, self.fetcher.fetch(&actor_url))
            .await
            .map_err(|err| Rejection::with_source(RejectionKind::KeyResolutionFailed, err))?
            .map_err(|err| Rejection::with_source(RejectionKind::KeyResolutionFailed, err))?;

        if !same_url(&actor.id, &actor_url)
            || !same_url(&actor.public_key.id, &key_id)
            || !same_url(&actor.public_key.owner, &actor_url)
        {
            return Err(Rejection::with_source(
                RejectionKind::ActorKeyMismatch,
                "actor document doesn't belong to the key ID",
            ));
        }

        let public_key = crypto::parse::public_key(&actor.public_key.public_key_pem)
            .map_err(|err| Rejection::with_source(RejectionKind::InvalidKeyMaterial, err))?;

        let signature_string = signature_string::build(
            &parts.method,
            &parts.uri,
            &parts.headers,
            signature_header.headers.clone(),
        )
        .map_err(|err| {
            let kind = match err {
                signature_string::Error::UnsupportedPseudoHeader(..) => {
                    RejectionKind::MalformedSignatureHeader
                }
                signature_string::Error::InvalidHeaderValue(..)
                | signature_string::Error::MissingHeaderValue(..) => {
                    RejectionKind::IncompleteSignedHeaders
                }
            };

            Rejection::with_source(kind, err)
        })?;

        let encoded_signature = signature_header.signature.to_owned();
        tokio::task::spawn_blocking(move || {
            crypto::verify(signature_string.as_bytes(), &encoded_signature, &public_key)
        })
        .await
        .map_err(|err| Rejection::with_source(RejectionKind::SignatureInvalid, err))?
        .map_err(|err| Rejection::with_source(RejectionKind::SignatureInvalid, err))?;

        Ok(Accepted {
            body,
            raw_body,
            key_id,
            actor: actor_url,
        })
    }
}
