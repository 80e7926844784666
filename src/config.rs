use std::fmt;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::HeaderValue;

use crate::ClientError;

/// Base URL of the public DEV API, used when no host override is given.
pub const DEFAULT_BASE_URL: &str = "https://dev.to/api";

/// Name of the header carrying the API key.
pub const API_KEY_HEADER: &str = "api-key";

/// Caller-supplied construction options.
///
/// Resolving these from the environment or a config file is the caller's job;
/// the client never reads either. The token is redacted from `Debug` output.
#[derive(Clone, Default)]
pub struct Options {
    /// API host override. `None` or empty falls back to [`DEFAULT_BASE_URL`].
    pub host: Option<String>,
    /// API key sent with every request. Required.
    pub token: String,
    /// Deadline applied to each request, including reading the body.
    pub timeout: Option<Duration>,
}

impl Options {
    /// Options for the default host with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Validated, immutable client configuration.
///
/// Built once from [`Options`]; every check happens here so individual calls
/// never revalidate.
#[derive(Clone, Debug)]
pub(crate) struct ClientConfig {
    base_url: String,
    token: HeaderValue,
    timeout: Option<Duration>,
}

impl ClientConfig {
    pub(crate) fn new(options: Options) -> Result<Self, ClientError> {
        let host = options
            .host
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        let parsed = Url::parse(&host).map_err(|_| ClientError::InvalidBaseUrl(host.clone()))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(host));
        }

        if options.token.trim().is_empty() {
            return Err(ClientError::InvalidToken);
        }
        let mut token =
            HeaderValue::from_str(&options.token).map_err(|_| ClientError::InvalidToken)?;
        token.set_sensitive(true);

        Ok(Self {
            base_url: host,
            token,
            timeout: options.timeout,
        })
    }

    /// The host exactly as configured.
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn token(&self) -> &HeaderValue {
        &self.token
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
