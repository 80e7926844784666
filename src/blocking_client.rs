use reqwest::Method;
use reqwest::blocking::{Request, Response};
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

/// Blocking client for the DEV REST API.
///
/// This is the synchronous counterpart of [`crate::DevClient`].
#[derive(Clone, Debug)]
pub struct BlockingDevClient {
    config: ClientConfig,
    http: reqwest::blocking::Client,
}

impl BlockingDevClient {
    /// Creates a client, validating the token and host once.
    pub fn new(options: Options) -> Result<Self, ClientError> {
        let config = ClientConfig::new(options)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { config, http })
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
    pub fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T, ClientError> {
        let response = self.dispatch(request)?;
        let body = response.bytes()?;
        decode_body(&body)
    }

    /// Sends a request and discards a successful response without decoding it.
    pub fn send_discard(&self, request: Request) -> Result<(), ClientError> {
        self.dispatch(request).map(drop)
    }

    /// Calls an endpoint from the catalog by name, applying its client-side
    /// ordering if it has one.
    pub fn call_endpoint<T, Q, B>(
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
        let response = self.dispatch(request)?;
        let body = response.bytes()?;
        decode_endpoint_body(endpoint, &body)
    }

    #[instrument(level = "debug", skip_all, fields(method = %request.method(), url = %request.url()))]
    fn dispatch(&self, mut request: Request) -> Result<Response, ClientError> {
        apply_headers(&self.config, request.headers_mut());

        let response = self.http.execute(request)?;
        let status = response.status();
        debug!(%status, "received response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes()?;
        Err(error_from_body(status, &body))
    }
}
