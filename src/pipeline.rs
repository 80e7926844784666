//! Transport-independent steps shared by the async and blocking clients.
//!
//! Each client owns the network round trip; everything before and after it
//! (URL construction, payload encoding, header injection, status
//! classification, body decoding) lives here so both behave identically.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::articles::sort_json_by_published_desc;
use crate::config::{API_KEY_HEADER, ClientConfig};
use crate::endpoints::EndpointDefinition;
use crate::error::{ApiErrorBody, ClientError};

const APPLICATION_JSON: &str = "application/json";

/// Concatenates the configured base URL and a relative `path`.
///
/// `path` may carry a query string. Absolute URLs are rejected.
pub(crate) fn build_url(config: &ClientConfig, path: &str) -> Result<Url, ClientError> {
    if !path.starts_with('/') {
        return Err(ClientError::InvalidPath(path.to_owned()));
    }

    let full = format!("{}{path}", config.base_url().trim_end_matches('/'));
    Url::parse(&full).map_err(|_| ClientError::InvalidPath(path.to_owned()))
}

/// Serializes an optional payload into a JSON request body.
pub(crate) fn encode_body<B: Serialize + ?Sized>(
    payload: Option<&B>,
) -> Result<Option<Vec<u8>>, ClientError> {
    payload
        .map(|payload| serde_json::to_vec(payload).map_err(ClientError::Encode))
        .transpose()
}

/// Sets the JSON content headers and the API key on an outgoing request.
pub(crate) fn apply_headers(config: &ClientConfig, headers: &mut HeaderMap) {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
    headers.insert(
        HeaderName::from_static(API_KEY_HEADER),
        config.token().clone(),
    );
}

/// Builds the failure for a non-success response from its full body.
///
/// A body that is not the upstream envelope yields
/// [`ClientError::UndecodableErrorBody`] rather than being dropped.
pub(crate) fn error_from_body(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(error) => ClientError::Api { status, error },
        Err(source) => ClientError::UndecodableErrorBody {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
            source,
        },
    }
}

/// Decodes a successful response body into `T`.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(ClientError::Decode)
}

/// Decodes a successful response for `endpoint`, applying its client-side
/// ordering before the body reaches `T`.
pub(crate) fn decode_endpoint_body<T: DeserializeOwned>(
    endpoint: &EndpointDefinition,
    body: &[u8],
) -> Result<T, ClientError> {
    if !endpoint.sort_by_published {
        return decode_body(body);
    }

    let mut entries: Vec<Value> = decode_body(body)?;
    sort_json_by_published_desc(&mut entries)?;
    serde_json::from_value(Value::Array(entries)).map_err(ClientError::Decode)
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use reqwest::header::{CONTENT_TYPE, HeaderMap};
    use serde_json::Value;

    use super::{
        apply_headers, build_url, decode_body, decode_endpoint_body, encode_body, error_from_body,
    };
    use crate::ClientError;
    use crate::config::{ClientConfig, Options};
    use crate::endpoints::{GET_PUBLISHED_ARTICLES, GET_PUBLISHED_ARTICLES_SORTED, find_endpoint};

    fn config(host: &str) -> ClientConfig {
        ClientConfig::new(Options::new("secret").with_host(host)).expect("valid options")
    }

    #[test]
    fn concatenates_base_url_and_path() {
        let url = build_url(&config("https://dev.to/api"), "/articles?page=2").expect("valid path");
        assert_eq!(url.as_str(), "https://dev.to/api/articles?page=2");
    }

    #[test]
    fn tolerates_trailing_slash_on_base_url() {
        let url = build_url(&config("https://dev.to/api/"), "/listings/7").expect("valid path");
        assert_eq!(url.as_str(), "https://dev.to/api/listings/7");
    }

    #[test]
    fn rejects_absolute_and_relative_paths() {
        let config = config("https://dev.to/api");
        for path in ["https://evil.example/articles", "articles"] {
            let error = build_url(&config, path).expect_err("path must start with '/'");
            assert!(matches!(error, ClientError::InvalidPath(p) if p == path));
        }
    }

    #[test]
    fn absent_payload_has_no_body() {
        assert!(encode_body::<Value>(None).expect("nothing to encode").is_none());
    }

    #[test]
    fn sets_json_content_type_and_api_key() {
        let mut headers = HeaderMap::new();
        apply_headers(&config("https://dev.to/api"), &mut headers);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers["api-key"], "secret");
    }

    #[test]
    fn non_envelope_error_body_is_surfaced_as_decode_failure() {
        let error = error_from_body(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        match error {
            ClientError::UndecodableErrorBody { status, body, .. } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, "<html>bad gateway</html>");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_success_body_is_a_decode_error() {
        let error = decode_body::<Value>(b"not json").expect_err("invalid JSON");
        assert!(matches!(error, ClientError::Decode(_)));
    }

    const OUT_OF_ORDER: &[u8] = br#"[
        {"title": "Oldest", "published_at": "2023-01-01T00:00:00Z"},
        {"title": "Newest", "published_at": "2024-01-01T00:00:00Z"}
    ]"#;

    fn titles(entries: &[Value]) -> Vec<&str> {
        entries.iter().filter_map(|entry| entry["title"].as_str()).collect()
    }

    #[test]
    fn sorted_endpoint_orders_body_before_decoding() {
        let endpoint = find_endpoint(GET_PUBLISHED_ARTICLES_SORTED).expect("known endpoint");
        let entries: Vec<Value> = decode_endpoint_body(endpoint, OUT_OF_ORDER).expect("decodes");
        assert_eq!(titles(&entries), ["Newest", "Oldest"]);
    }

    #[test]
    fn unsorted_endpoint_keeps_server_order() {
        let endpoint = find_endpoint(GET_PUBLISHED_ARTICLES).expect("known endpoint");
        let entries: Vec<Value> = decode_endpoint_body(endpoint, OUT_OF_ORDER).expect("decodes");
        assert_eq!(titles(&entries), ["Oldest", "Newest"]);
    }

    #[test]
    fn sorted_endpoint_requires_an_array() {
        let endpoint = find_endpoint(GET_PUBLISHED_ARTICLES_SORTED).expect("known endpoint");
        let error = decode_endpoint_body::<Value>(endpoint, br#"{"id": 1}"#).expect_err("object");
        assert!(matches!(error, ClientError::Decode(_)));
    }
}
