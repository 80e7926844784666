//! The blocking client runs the same pipeline; drive it off the async runtime.

use devto_client::{ArticleQueryParams, BlockingDevClient, ClientError, Options};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread")]
async fn blocking_client_lists_sorted_articles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(header("api-key", "secret"))
        .and(query_param("tag", "golang"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "title": "Older", "published_at": "2024-01-01T00:00:00Z" },
            { "id": 2, "title": "Newer", "published_at": "2024-06-01T00:00:00Z" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let host = server.uri();
    let titles = tokio::task::spawn_blocking(move || {
        let client =
            BlockingDevClient::new(Options::new("secret").with_host(host)).expect("valid options");
        let params = ArticleQueryParams {
            tag: Some("golang".to_owned()),
            ..ArticleQueryParams::default()
        };
        client
            .get_published_articles_sorted(&params)
            .expect("articles decode")
            .into_iter()
            .map(|article| article.title)
            .collect::<Vec<_>>()
    })
    .await
    .expect("blocking task");

    assert_eq!(titles, ["Newer", "Older"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_client_surfaces_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/articles/404"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "not found", "status": 404 })),
        )
        .mount(&server)
        .await;

    let host = server.uri();
    let error = tokio::task::spawn_blocking(move || {
        let client =
            BlockingDevClient::new(Options::new("secret").with_host(host)).expect("valid options");
        client
            .get_published_article_by_id(404)
            .expect_err("missing article")
    })
    .await
    .expect("blocking task");

    match error {
        ClientError::Api { error, .. } => assert_eq!(error.error, "not found"),
        other => panic!("expected API error, got: {other}"),
    }
}

#[test]
fn blocking_client_rejects_empty_token() {
    let error = BlockingDevClient::new(Options::new("")).expect_err("empty token");
    assert!(matches!(error, ClientError::InvalidToken));
}

#[tokio::test(flavor = "multi_thread")]
async fn blocking_catalog_call_applies_sorted_ordering() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "title": "Oldest", "published_at": "2023-01-01T00:00:00Z" },
            { "id": 2, "title": "Newest", "published_at": "2024-01-01T00:00:00Z" }
        ])))
        .mount(&server)
        .await;

    let host = server.uri();
    let raw: serde_json::Value = tokio::task::spawn_blocking(move || {
        let client =
            BlockingDevClient::new(Options::new("secret").with_host(host)).expect("valid options");
        client
            .call_endpoint("getPublishedArticlesSorted", &[], &(), None::<&()>)
            .expect("sorted call")
    })
    .await
    .expect("blocking task");

    assert_eq!(raw[0]["title"], "Newest");
    assert_eq!(raw[1]["title"], "Oldest");
}
