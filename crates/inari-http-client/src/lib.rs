#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use http::HeaderValue;
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, Limited};
use http_signatures::{cavage::easy, crypto::SigningKey, Clock};
use hyper::{
    body::Bytes,
    header::{HeaderName, USER_AGENT},
    HeaderMap, Request, Response as HyperResponse, StatusCode, Uri,
};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client as HyperClient},
    rt::TokioExecutor,
};
use serde::de::DeserializeOwned;
use std::{error::Error as StdError, fmt, time::Duration};
use tower::{
    layer::util::Identity,
    util::{BoxCloneSyncService, Either},
    BoxError, Service, ServiceBuilder, ServiceExt,
};
use tower_http::{
    decompression::DecompressionLayer, follow_redirect::FollowRedirectLayer,
    map_response_body::MapResponseBodyLayer, timeout::TimeoutLayer,
};
use tracing::{debug, instrument};

mod body;

pub use self::body::Body;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, BoxError>;
type BoxService = BoxCloneSyncService<Request<Body>, HyperResponse<BoxBody>, BoxError>;
type Result<T, E = Error> = std::result::Result<T, E>;

/// Actor documents and delivery answers are small, 1MiB is plenty
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent unless configured otherwise
pub const DEFAULT_USER_AGENT: &str = concat!("inari-http-client/", env!("CARGO_PKG_VERSION"));

/// Error returned by the client
///
/// Wraps whatever failed along the way: header conversion, signing, the transport or decoding the body
#[derive(Debug)]
pub struct Error(BoxError);

impl Error {
    fn new<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self(err.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.0.as_ref())
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    body_limit: Option<usize>,
    clock: Clock,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Limit the size of response bodies, `None` disables the limit
    ///
    /// Counted while reading, `Content-Length` isn't trusted. Defaults to 1MiB
    #[must_use]
    pub fn body_limit(mut self, body_limit: Option<usize>) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// Clock used for the `Date` header of signed requests
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Header attached to every request that doesn't set it itself
    ///
    /// # Errors
    ///
    /// The name or the value isn't a valid header name or value
    pub fn default_header<K, V>(mut self, name: K, value: V) -> Result<Self>
    where
        K: TryInto<HeaderName>,
        K::Error: Into<BoxError>,
        V: TryInto<HeaderValue>,
        V::Error: Into<BoxError>,
    {
        let name = name.try_into().map_err(Error::new)?;
        let value = value.try_into().map_err(Error::new)?;
        self.headers.insert(name, value);

        Ok(self)
    }

    /// Replace the `User-Agent` header
    ///
    /// # Errors
    ///
    /// The value isn't a valid header value
    pub fn user_agent<V>(self, value: V) -> Result<Self>
    where
        V: TryInto<HeaderValue>,
        V::Error: Into<BoxError>,
    {
        self.default_header(USER_AGENT, value)
    }

    /// Time after which a request is abandoned, `None` waits forever
    ///
    /// Defaults to 30 seconds
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a client talking HTTP/1 and HTTP/2 over rustls with the system's root certificates
    ///
    /// # Errors
    ///
    /// The native root certificates couldn't be loaded
    pub fn build(self) -> Result<Client> {
        let connector = HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(Error::new)?
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .wrap_connector(HttpConnector::new());

        let transport = HyperClient::builder(TokioExecutor::new())
            .build(connector)
            .map_response(|response| response.map(|body| BoxBody::new(body.map_err(BoxError::from))));

        Ok(self.service(transport))
    }

    /// Build a client on top of an arbitrary transport service
    #[must_use]
    pub fn service<S, B>(self, transport: S) -> Client
    where
        S: Service<Request<Body>, Response = HyperResponse<B>> + Clone + Send + Sync + 'static,
        S::Error: StdError + Send + Sync + 'static,
        S::Future: Send,
        B: HttpBody + Default + Send + Sync + 'static,
        B::Data: Send + Sync,
        B::Error: Into<BoxError> + Send + Sync + 'static,
    {
        let body_limit = match self.body_limit {
            Some(limit) => Either::Right(MapResponseBodyLayer::new(move |body| {
                BoxBody::new(Limited::new(body, limit))
            })),
            None => Either::Left(MapResponseBodyLayer::new(BoxBody::new)),
        };
        let timeout = match self.timeout {
            Some(timeout) => Either::Right(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                timeout,
            )),
            None => Either::Left(Identity::new()),
        };

        let service = ServiceBuilder::new()
            .layer(body_limit)
            .layer(FollowRedirectLayer::new())
            .layer(DecompressionLayer::default())
            .layer(timeout)
            .service(transport)
            .map_err(BoxError::from);

        Client {
            clock: self.clock,
            headers: self.headers,
            service: BoxCloneSyncService::new(service),
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Self {
            body_limit: Some(DEFAULT_BODY_LIMIT),
            clock: Clock::new(),
            headers,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

/// HTTP client for federation traffic
///
/// Cheap to clone, clones share the underlying connection pool
#[derive(Clone)]
pub struct Client {
    clock: Clock,
    headers: HeaderMap,
    service: BoxService,
}

impl Client {
    /// Start configuring a client
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    fn with_default_headers(&self, mut req: Request<Body>) -> Request<Body> {
        for (name, value) in &self.headers {
            if !req.headers().contains_key(name) {
                req.headers_mut().insert(name, value.clone());
            }
        }

        req
    }

    /// Send a request as-is, apart from the default headers
    ///
    /// # Errors
    ///
    /// The transport failed or the request timed out
    pub async fn execute(&self, req: Request<Body>) -> Result<Response> {
        let req = self.with_default_headers(req);
        let inner = self.service.clone().oneshot(req).await.map_err(Error::new)?;

        Ok(Response { inner })
    }

    /// Sign the request and send it
    ///
    /// `Host`, `Date`, `Digest` and `Signature` are overwritten. The URI has to be absolute
    ///
    /// # Errors
    ///
    /// - Signing failed
    /// - Sending failed
    #[instrument(skip_all, fields(uri = %req.uri()))]
    pub async fn execute_signed<SK>(
        &self,
        req: Request<Body>,
        key_id: &str,
        key: SK,
    ) -> Result<Response>
    where
        SK: SigningKey + Send + 'static,
    {
        let req = self.with_default_headers(req);
        let req = easy::sign(req, key_id, key, &self.clock)
            .await
            .map_err(Error::new)?;

        let response = self.execute(req).await?;
        debug!(status = %response.status(), "delivered signed request");

        Ok(response)
    }

    /// Send an empty `GET` request
    ///
    /// # Errors
    ///
    /// - The URI is invalid
    /// - Sending failed
    pub async fn get<U>(&self, uri: U) -> Result<Response>
    where
        Uri: TryFrom<U>,
        <Uri as TryFrom<U>>::Error: Into<http::Error>,
    {
        let req = Request::get(uri).body(Body::empty()).map_err(Error::new)?;
        self.execute(req).await
    }
}

/// Response of a request sent through [`Client`]
#[derive(Debug)]
pub struct Response {
    inner: HyperResponse<BoxBody>,
}

impl Response {
    /// Status code of the response
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Collect the whole body
    ///
    /// # Errors
    ///
    /// Reading failed or the body exceeded the limit
    pub async fn bytes(self) -> Result<Bytes> {
        let collected = self.inner.into_body().collect().await.map_err(Error::new)?;
        Ok(collected.to_bytes())
    }

    /// Collect the body as UTF-8 text
    ///
    /// # Errors
    ///
    /// Reading failed or the body isn't valid UTF-8
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        let text = simdutf8::basic::from_utf8(&bytes).map_err(Error::new)?;

        Ok(text.to_owned())
    }

    /// Collect the body and deserialise it from JSON
    ///
    /// # Errors
    ///
    /// Reading failed or the body isn't a valid `T`
    pub async fn json<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let bytes = self.bytes().await?;
        sonic_rs::from_slice(&bytes).map_err(Error::new)
    }
}
