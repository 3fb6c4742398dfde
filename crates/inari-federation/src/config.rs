//!
//! Configuration of the signature verification and the outgoing HTTP client
//!

use crate::verifier::Policy;
use inari_http_client::ClientBuilder;
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use tokio::fs;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SignatureConfiguration {
    pub require_digest: bool,
    pub max_clock_skew_secs: u64,
    pub key_fetch_timeout_secs: u64,
    pub body_limit: usize,
}

impl Default for SignatureConfiguration {
    fn default() -> Self {
        let policy = Policy::default();

        Self {
            require_digest: policy.require_digest,
            max_clock_skew_secs: policy.max_clock_skew.as_secs(),
            key_fetch_timeout_secs: policy.timeout.as_secs(),
            body_limit: policy.body_limit,
        }
    }
}

impl From<&SignatureConfiguration> for Policy {
    fn from(config: &SignatureConfiguration) -> Self {
        Self {
            require_digest: config.require_digest,
            max_clock_skew: Duration::from_secs(config.max_clock_skew_secs),
            timeout: Duration::from_secs(config.key_fetch_timeout_secs),
            body_limit: config.body_limit,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpClientConfiguration {
    pub user_agent: Option<String>,
    pub request_timeout_secs: u64,
    pub max_response_size: usize,
}

impl Default for HttpClientConfiguration {
    fn default() -> Self {
        Self {
            user_agent: None,
            request_timeout_secs: 30,
            max_response_size: 1024 * 1024,
        }
    }
}

impl HttpClientConfiguration {
    /// Client builder with these settings applied
    pub fn client_builder(&self) -> Result<ClientBuilder, inari_http_client::Error> {
        let builder = ClientBuilder::default()
            .body_limit(Some(self.max_response_size))
            .timeout(Some(Duration::from_secs(self.request_timeout_secs)));

        match self.user_agent {
            Some(ref user_agent) => builder.user_agent(user_agent.as_str()),
            None => Ok(builder),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Configuration {
    pub http_client: HttpClientConfiguration,
    pub signatures: SignatureConfiguration,
}

impl Configuration {
    pub async fn load<P>(path: P) -> eyre::Result<Self>
    where
        P: AsRef<Path>,
    {
        let content = fs::read_to_string(path).await?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> eyre::Result<Self> {
        toml::from_str(content).map_err(eyre::Report::from)
    }

    #[must_use]
    pub fn policy(&self) -> Policy {
        Policy::from(&self.signatures)
    }
}

#[cfg(test)]
mod test {
    use super::Configuration;
    use std::time::Duration;

    #[test]
    fn empty_is_default() {
        let config = Configuration::from_toml("").unwrap();
        let policy = config.policy();

        assert!(!policy.require_digest);
        assert_eq!(policy.max_clock_skew, Duration::from_secs(30));
        assert_eq!(policy.timeout, Duration::from_secs(10));
        assert_eq!(policy.body_limit, 1024 * 1024);
        assert_eq!(config.http_client.request_timeout_secs, 30);
    }

    #[test]
    fn overrides() {
        let config = Configuration::from_toml(
            r#"
            [http-client]
            user-agent = "inari/test"

            [signatures]
            require-digest = true
            max-clock-skew-secs = 5
            "#,
        )
        .unwrap();
        let policy = config.policy();

        assert!(policy.require_digest);
        assert_eq!(policy.max_clock_skew, Duration::from_secs(5));
        assert_eq!(policy.timeout, Duration::from_secs(10));
        assert_eq!(config.http_client.user_agent.as_deref(), Some("inari/test"));
        assert!(config.http_client.client_builder().is_ok());
    }

    #[test]
    fn unknown_type() {
        assert!(Configuration::from_toml("[signatures]\nrequire-digest = \"yes\"").is_err());
    }
}
