//! Rust client library for the DEV (dev.to) REST API.
//!
//! Public API layers:
//! - [`DevClient`]/[`BlockingDevClient`]: typed article and listing operations
//!   over a shared request pipeline.
//! - [`ENDPOINTS`]: the data-driven endpoint catalog every operation goes through.
//! - [`ClientError`]: unified error type used by all clients.
//!
//! A client is built once from [`Options`]; the token and host are validated
//! there and never rechecked per call.

mod articles;
mod blocking_client;
mod client;
mod config;
mod endpoints;
mod error;
mod listings;
mod pipeline;
mod query;

/// Article resource, filters and payloads.
pub use articles::{
    Article, ArticleBody, ArticleBodySchema, ArticleQueryParams, ArticleState, FlareTag,
    Organization, User, sort_by_published_desc,
};
/// Blocking DEV API client.
pub use blocking_client::BlockingDevClient;
/// Async DEV API client.
pub use client::DevClient;
/// Construction options.
pub use config::{API_KEY_HEADER, DEFAULT_BASE_URL, Options};
/// Endpoint catalog.
pub use endpoints::{ENDPOINTS, EndpointDefinition};
/// Error type returned by all client operations.
pub use error::{ApiErrorBody, ClientError};
/// Listing resource, filters and payloads.
pub use listings::{
    Listing, ListingAction, ListingBody, ListingBodySchema, ListingCategory, ListingQueryParams,
};
/// Query-string projection.
pub use query::{QueryPairs, QueryParams, encode_query};
