//!
//! Resolution of the actor document a signature claims to belong to
//!

use crate::ap::Actor;
use async_trait::async_trait;
use http::{header::ACCEPT, HeaderValue, Request};
use http_signatures::BoxError;
use inari_http_client::{Body, Client};
use std::future::Future;
use tracing::{debug, instrument};
use typed_builder::TypedBuilder;
use url::Url;

/// Media types an ActivityPub server answers actor lookups for
pub const ACTIVITY_JSON: &str =
    r#"application/activity+json, application/ld+json; profile="https://www.w3.org/ns/activitystreams""#;

/// Fetch the actor document that belongs to a key
///
/// Implemented for closures returning futures, which is mainly useful in tests
#[async_trait]
pub trait KeyFetcher: Send + Sync {
    /// Fetch the actor document behind the URL
    async fn fetch(&self, url: &Url) -> Result<Actor, BoxError>;
}

#[async_trait]
impl<F, Fut> KeyFetcher for F
where
    F: Fn(Url) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Actor, BoxError>> + Send + 'static,
{
    async fn fetch(&self, url: &Url) -> Result<Actor, BoxError> {
        (self)(url.clone()).await
    }
}

/// Key fetcher going over the network
#[derive(Clone, TypedBuilder)]
pub struct HttpKeyFetcher {
    client: Client,
}

#[async_trait]
impl KeyFetcher for HttpKeyFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<Actor, BoxError> {
        let request = Request::get(url.as_str())
            .header(ACCEPT, HeaderValue::from_static(ACTIVITY_JSON))
            .body(Body::empty())?;

        let response = self.client.execute(request).await?;
        if !response.status().is_success() {
            debug!(status = %response.status(), "actor lookup failed");
            return Err(format!("unexpected status code {} from {url}", response.status()).into());
        }

        Ok(response.json().await?)
    }
}
