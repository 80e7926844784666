use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::Method;

use crate::ClientError;
use crate::query::{QueryParams, encode_with_preset};

/// Metadata for one DEV API endpoint.
///
/// Every typed operation is a lookup in [`ENDPOINTS`] followed by the same
/// request pipeline; variants of a list endpoint differ only in this data.
#[derive(Clone, Copy, Debug)]
pub struct EndpointDefinition {
    /// Stable endpoint name (for example `getPublishedArticles`).
    pub name: &'static str,
    /// Uppercase HTTP method (for example `GET`, `POST`).
    pub method: &'static str,
    /// Path template relative to the base URL, potentially containing `{param}` placeholders.
    pub path_template: &'static str,
    /// Required path parameter names extracted from `path_template`.
    pub path_params: &'static [&'static str],
    /// Fixed query pairs emitted ahead of caller parameters.
    pub preset: &'static [(&'static str, &'static str)],
    /// Results are reordered newest `published_at` first after decoding.
    pub sort_by_published: bool,
}

impl EndpointDefinition {
    const fn new(name: &'static str, method: &'static str, path_template: &'static str) -> Self {
        Self {
            name,
            method,
            path_template,
            path_params: &[],
            preset: &[],
            sort_by_published: false,
        }
    }

    const fn params(mut self, path_params: &'static [&'static str]) -> Self {
        self.path_params = path_params;
        self
    }

    const fn preset(mut self, preset: &'static [(&'static str, &'static str)]) -> Self {
        self.preset = preset;
        self
    }

    const fn sorted(mut self) -> Self {
        self.sort_by_published = true;
        self
    }
}

pub(crate) const GET_PUBLISHED_ARTICLES: &str = "getPublishedArticles";
pub(crate) const GET_PUBLISHED_ARTICLES_SORTED: &str = "getPublishedArticlesSorted";
pub(crate) const GET_FRESH_ARTICLES: &str = "getFreshArticles";
pub(crate) const GET_RISING_ARTICLES: &str = "getRisingArticles";
pub(crate) const GET_PUBLISHED_ARTICLE_BY_ID: &str = "getPublishedArticleById";
pub(crate) const GET_PUBLISHED_ARTICLE_BY_PATH: &str = "getPublishedArticleByPath";
pub(crate) const CREATE_ARTICLE: &str = "createArticle";
pub(crate) const UPDATE_ARTICLE: &str = "updateArticle";
pub(crate) const GET_USER_ARTICLES: &str = "getUserArticles";
pub(crate) const GET_USER_PUBLISHED_ARTICLES: &str = "getUserPublishedArticles";
pub(crate) const GET_USER_UNPUBLISHED_ARTICLES: &str = "getUserUnpublishedArticles";
pub(crate) const GET_ARTICLES_WITH_VIDEO: &str = "getArticlesWithVideo";
pub(crate) const GET_PUBLISHED_LISTINGS: &str = "getPublishedListings";
pub(crate) const GET_PUBLISHED_LISTINGS_BY_CATEGORY: &str = "getPublishedListingsByCategory";
pub(crate) const GET_LISTING_BY_ID: &str = "getListingById";
pub(crate) const CREATE_LISTING: &str = "createListing";
pub(crate) const UPDATE_LISTING: &str = "updateListing";

/// All endpoints known to the client.
pub static ENDPOINTS: &[EndpointDefinition] = &[
    EndpointDefinition::new(GET_PUBLISHED_ARTICLES, "GET", "/articles"),
    EndpointDefinition::new(GET_PUBLISHED_ARTICLES_SORTED, "GET", "/articles").sorted(),
    EndpointDefinition::new(GET_FRESH_ARTICLES, "GET", "/articles").preset(&[("state", "fresh")]),
    EndpointDefinition::new(GET_RISING_ARTICLES, "GET", "/articles")
        .preset(&[("state", "rising")]),
    EndpointDefinition::new(GET_PUBLISHED_ARTICLE_BY_ID, "GET", "/articles/{id}").params(&["id"]),
    EndpointDefinition::new(
        GET_PUBLISHED_ARTICLE_BY_PATH,
        "GET",
        "/articles/{username}/{slug}",
    )
    .params(&["username", "slug"]),
    EndpointDefinition::new(CREATE_ARTICLE, "POST", "/articles"),
    EndpointDefinition::new(UPDATE_ARTICLE, "PUT", "/articles/{id}").params(&["id"]),
    EndpointDefinition::new(GET_USER_ARTICLES, "GET", "/articles/me/all"),
    EndpointDefinition::new(GET_USER_PUBLISHED_ARTICLES, "GET", "/articles/me/published"),
    EndpointDefinition::new(GET_USER_UNPUBLISHED_ARTICLES, "GET", "/articles/me/unpublished"),
    EndpointDefinition::new(GET_ARTICLES_WITH_VIDEO, "GET", "/videos"),
    EndpointDefinition::new(GET_PUBLISHED_LISTINGS, "GET", "/listings"),
    EndpointDefinition::new(
        GET_PUBLISHED_LISTINGS_BY_CATEGORY,
        "GET",
        "/listings/category/{category}",
    )
    .params(&["category"]),
    EndpointDefinition::new(GET_LISTING_BY_ID, "GET", "/listings/{id}").params(&["id"]),
    EndpointDefinition::new(CREATE_LISTING, "POST", "/listings"),
    EndpointDefinition::new(UPDATE_LISTING, "PUT", "/listings/{id}").params(&["id"]),
];

pub(crate) fn find_endpoint(name: &str) -> Result<&'static EndpointDefinition, ClientError> {
    ENDPOINTS
        .iter()
        .find(|endpoint| endpoint.name == name)
        .ok_or_else(|| ClientError::UnknownEndpoint(name.to_owned()))
}

pub(crate) fn parse_method(endpoint: &EndpointDefinition) -> Result<Method, ClientError> {
    Method::from_bytes(endpoint.method.as_bytes())
        .map_err(|_| ClientError::UnknownEndpoint(endpoint.name.to_owned()))
}

/// Renders the path template and appends the projected query string.
pub(crate) fn render_path<Q: QueryParams + ?Sized>(
    endpoint: &EndpointDefinition,
    path_params: &[(&str, &str)],
    query: &Q,
) -> Result<String, ClientError> {
    let mut rendered = endpoint.path_template.to_owned();

    for required_param in endpoint.path_params {
        let value = path_params
            .iter()
            .find(|(name, _)| name == required_param)
            .map(|(_, value)| *value)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ClientError::MissingPathParameter {
                endpoint: endpoint.name.to_owned(),
                parameter: (*required_param).to_owned(),
            })?;

        let placeholder = format!("{{{required_param}}}");
        rendered = rendered.replace(&placeholder, &encode_path_segment(value));
    }

    let query = encode_with_preset(endpoint.preset, query);
    if !query.is_empty() {
        rendered.push('?');
        rendered.push_str(&query);
    }

    Ok(rendered)
}

/// Characters escaped inside a single path segment, `/` and `%` included.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{ENDPOINTS, find_endpoint, parse_method, render_path};
    use crate::ClientError;

    #[test]
    fn endpoint_names_are_unique() {
        for (index, endpoint) in ENDPOINTS.iter().enumerate() {
            assert!(
                ENDPOINTS[index + 1..]
                    .iter()
                    .all(|other| other.name != endpoint.name),
                "duplicate endpoint {}",
                endpoint.name
            );
        }
    }

    #[test]
    fn every_method_parses_and_every_param_has_a_placeholder() {
        for endpoint in ENDPOINTS {
            parse_method(endpoint).expect("valid method");
            for param in endpoint.path_params {
                assert!(
                    endpoint.path_template.contains(&format!("{{{param}}}")),
                    "{} lacks placeholder for {param}",
                    endpoint.name
                );
            }
        }
    }

    #[test]
    fn render_path_replaces_required_path_params() {
        let endpoint = find_endpoint("getPublishedArticleByPath").expect("endpoint exists");
        let path = render_path(endpoint, &[("username", "ben"), ("slug", "hello-world-4f2")], &())
            .expect("path renders");
        assert_eq!(path, "/articles/ben/hello-world-4f2");
    }

    #[test]
    fn render_path_percent_encodes_segments() {
        let endpoint = find_endpoint("getPublishedArticleByPath").expect("endpoint exists");
        let path = render_path(endpoint, &[("username", "a b"), ("slug", "c+d/e")], &())
            .expect("path renders");
        assert_eq!(path, "/articles/a%20b/c+d%2Fe");
    }

    #[test]
    fn render_path_reports_missing_parameter() {
        let endpoint = find_endpoint("getListingById").expect("endpoint exists");
        let error = render_path(endpoint, &[], &()).expect_err("missing parameter should error");
        match error {
            ClientError::MissingPathParameter {
                endpoint,
                parameter,
            } => {
                assert_eq!(endpoint, "getListingById");
                assert_eq!(parameter, "id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn preset_is_emitted_before_caller_query() {
        let endpoint = find_endpoint("getRisingArticles").expect("endpoint exists");
        let path = render_path(endpoint, &[], &[("per_page", "5")][..]).expect("path renders");
        assert_eq!(path, "/articles?state=rising&per_page=5");
    }

    #[test]
    fn unknown_endpoint_is_reported() {
        let error = find_endpoint("deleteArticle").expect_err("not in catalog");
        assert!(matches!(error, ClientError::UnknownEndpoint(name) if name == "deleteArticle"));
    }
}
