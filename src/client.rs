use reqwest::{Method, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::ClientError;
use crate::config::{ClientConfig, Options};
use crate::endpoints::{ENDPOINTS, EndpointDefinition, find_endpoint, parse_method, render_path};
use crate::pipeline::{
    apply_headers, build_url, decode_body, decode_endpoint_body, encode_body, error_from_body,
};
use crate::query::QueryParams;

/// Async client for the DEV REST API.
///
/// Holds only validated configuration and a connection pool, so a single
/// instance can be cloned or shared across tasks freely. Each call performs
/// exactly one request; nothing is retried.
#[derive(Clone, Debug)]
pub struct DevClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl DevClient {
    /// Creates a client, validating the token and host once.
    pub fn new(options: Options) -> Result<Self, ClientError> {
        let config = ClientConfig::new(options)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            config,
            http: builder.build()?,
        })
    }

    /// The host this client sends requests to, exactly as configured.
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// Returns every endpoint in the catalog.
    pub fn endpoints() -> &'static [EndpointDefinition] {
        ENDPOINTS
    }

    /// Builds a request for `path` (relative, may include a query string).
    ///
    /// A present payload is serialized to JSON as the body. Authentication is
    /// added later by [`Self::send`], never here.
    pub fn new_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&B>,
    ) -> Result<Request, ClientError> {
        let url = build_url(&self.config, path)?;
        let mut request = Request::new(method, url);
        if let Some(body) = encode_body(payload)? {
            *request.body_mut() = Some(body.into());
        }
        Ok(request)
    }

    /// Sends a request and decodes the JSON response body into `T`.
    pub async fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T, ClientError> {
        let response = self.dispatch(request).await?;
        let body = response.bytes().await?;
        decode_body(&body)
    }

    /// Sends a request and discards a successful response without decoding it.
    pub async fn send_discard(&self, request: Request) -> Result<(), ClientError> {
        self.dispatch(request).await.map(drop)
    }

    /// Calls an endpoint from the catalog by name.
    ///
    /// `path_params` replaces `{param}` segments in the endpoint path template.
    /// Missing required parameters return
    /// [`ClientError::MissingPathParameter`]. Endpoints that carry a
    /// client-side ordering are sorted before decoding into `T`.
    pub async fn call_endpoint<T, Q, B>(
        &self,
        name: &str,
        path_params: &[(&str, &str)],
        query: &Q,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: QueryParams + ?Sized,
        B: Serialize + ?Sized,
    {
        let endpoint = find_endpoint(name)?;
        let path = render_path(endpoint, path_params, query)?;
        let method = parse_method(endpoint)?;
        let request = self.new_request(method, &path, body)?;
        let response = self.dispatch(request).await?;
        let body = response.bytes().await?;
        decode_endpoint_body(endpoint, &body)
    }

    #[instrument(level = "debug", skip_all, fields(method = %request.method(), url = %request.url()))]
    async fn dispatch(&self, mut request: Request) -> Result<Response, ClientError> {
        apply_headers(&self.config, request.headers_mut());

        let response = self.http.execute(request).await?;
        let status = response.status();
        debug!(%status, "received response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await?;
        Err(error_from_body(status, &body))
    }
}
