use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::endpoints::{
    CREATE_ARTICLE, GET_ARTICLES_WITH_VIDEO, GET_FRESH_ARTICLES, GET_PUBLISHED_ARTICLE_BY_ID,
    GET_PUBLISHED_ARTICLE_BY_PATH, GET_PUBLISHED_ARTICLES, GET_PUBLISHED_ARTICLES_SORTED,
    GET_RISING_ARTICLES, GET_USER_ARTICLES, GET_USER_PUBLISHED_ARTICLES,
    GET_USER_UNPUBLISHED_ARTICLES, UPDATE_ARTICLE,
};
use crate::query::{QueryPairs, QueryParams};
use crate::{BlockingDevClient, ClientError, DevClient};

/// Author of an article or listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub user_id: Option<u32>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub github_username: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub profile_image_90: String,
}

/// Organization an article or listing was published under.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub profile_image_90: String,
}

/// Highlighted tag shown next to an article title.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlareTag {
    pub name: String,
    pub bg_color_hex: Option<String>,
    pub text_color_hex: Option<String>,
}

/// An article as returned by the API.
///
/// Timestamps are kept as the ISO-8601 strings the server sends. Fields that
/// only some routes return are optional or defaulted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub type_of: String,
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub readable_publish_date: Option<String>,
    #[serde(default)]
    pub social_image: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tag_list: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub comments_count: u32,
    #[serde(default)]
    pub positive_reactions_count: u32,
    #[serde(default)]
    pub public_reactions_count: u32,
    #[serde(default)]
    pub page_views_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub edited_at: Option<String>,
    #[serde(default)]
    pub crossposted_at: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub last_comment_at: Option<String>,
    #[serde(default)]
    pub published_timestamp: Option<String>,
    #[serde(default)]
    pub body_markdown: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub reading_time_minutes: u32,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub organization: Option<Organization>,
    #[serde(default)]
    pub flare_tag: Option<FlareTag>,
}

/// Ranking window for the article feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleState {
    Fresh,
    Rising,
    All,
}

impl ArticleState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Rising => "rising",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ArticleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleState {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fresh" => Ok(Self::Fresh),
            "rising" => Ok(Self::Rising),
            "all" => Ok(Self::All),
            _ => Err(ClientError::UnknownVariant {
                kind: "article state",
                value: value.to_owned(),
            }),
        }
    }
}

/// Filters for the article list endpoints.
///
/// Unset fields, zeros and empty strings are left out of the query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArticleQueryParams {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    /// Single tag to match.
    pub tag: Option<String>,
    /// Articles matching any of these tags.
    pub tags: Vec<String>,
    /// Articles matching none of these tags.
    pub tags_exclude: Vec<String>,
    pub username: Option<String>,
    pub state: Option<ArticleState>,
    /// Most popular articles of the last N days.
    pub top: Option<i32>,
    pub collection_id: Option<i32>,
}

impl QueryParams for ArticleQueryParams {
    fn project(&self, pairs: &mut QueryPairs) {
        pairs.int("page", self.page);
        pairs.int("per_page", self.per_page);
        pairs.text("tag", self.tag.as_deref());
        pairs.list("tags", &self.tags);
        pairs.list("tags_exclude", &self.tags_exclude);
        pairs.text("username", self.username.as_deref());
        pairs.text("state", self.state.map(ArticleState::as_str));
        pairs.int("top", self.top);
        pairs.int("collection_id", self.collection_id);
    }
}

/// Write-side fields of an article.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ArticleBody {
    pub title: String,
    pub body_markdown: String,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<u32>,
}

/// Create/update payload: `{"article": {...}}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ArticleBodySchema {
    pub article: ArticleBody,
}

/// Accepts tags either as an array or as the comma-joined string some routes return.
pub(crate) fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTags {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<RawTags>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(RawTags::List(tags)) => tags,
        Some(RawTags::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect(),
    })
}

/// Orders articles newest `published_at` first.
///
/// Timestamps are parsed rather than compared as strings, so mixed offsets
/// order correctly. Unpublished entries go last; ties keep server order.
pub fn sort_by_published_desc(articles: &mut [Article]) -> Result<(), ClientError> {
    sort_newest_first(articles, |article| article.published_at.as_deref())
}

/// Same ordering as [`sort_by_published_desc`] over raw JSON entries.
///
/// Entries without a string `published_at` go last.
pub(crate) fn sort_json_by_published_desc(entries: &mut [Value]) -> Result<(), ClientError> {
    sort_newest_first(entries, |entry| {
        entry.get("published_at").and_then(Value::as_str)
    })
}

fn sort_newest_first<E>(
    entries: &mut [E],
    published: impl Fn(&E) -> Option<&str>,
) -> Result<(), ClientError> {
    for entry in entries.iter() {
        parse_published(published(entry))?;
    }
    entries.sort_by_cached_key(|entry| Reverse(parse_published(published(entry)).ok().flatten()));
    Ok(())
}

fn parse_published(value: Option<&str>) -> Result<Option<DateTime<FixedOffset>>, ClientError> {
    value
        .map(|value| {
            DateTime::parse_from_rfc3339(value).map_err(|source| ClientError::InvalidTimestamp {
                value: value.to_owned(),
                source,
            })
        })
        .transpose()
}

impl DevClient {
    async fn list_articles(
        &self,
        name: &str,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.call_endpoint(name, &[], params, None::<&()>).await
    }

    /// `GET /articles`: published articles, filtered by `params`.
    pub async fn get_published_articles(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_PUBLISHED_ARTICLES, params).await
    }

    /// Like [`Self::get_published_articles`], newest publication first.
    ///
    /// The order is enforced locally after decoding; the server does not
    /// guarantee it.
    pub async fn get_published_articles_sorted(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_PUBLISHED_ARTICLES_SORTED, params).await
    }

    pub async fn get_fresh_articles(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_FRESH_ARTICLES, params).await
    }

    pub async fn get_rising_articles(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_RISING_ARTICLES, params).await
    }

    /// Articles of the authenticated user, published or not.
    pub async fn get_user_articles(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_USER_ARTICLES, params).await
    }

    pub async fn get_user_published_articles(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_USER_PUBLISHED_ARTICLES, params).await
    }

    pub async fn get_user_unpublished_articles(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_USER_UNPUBLISHED_ARTICLES, params).await
    }

    pub async fn get_articles_with_video(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_ARTICLES_WITH_VIDEO, params).await
    }

    /// `GET /articles/{id}`
    pub async fn get_published_article_by_id(&self, id: u32) -> Result<Article, ClientError> {
        let id = id.to_string();
        self.call_endpoint(
            GET_PUBLISHED_ARTICLE_BY_ID,
            &[("id", id.as_str())],
            &(),
            None::<&()>,
        )
        .await
    }

    /// `GET /articles/{username}/{slug}`
    pub async fn get_published_article_by_path(
        &self,
        username: &str,
        slug: &str,
    ) -> Result<Article, ClientError> {
        self.call_endpoint(
            GET_PUBLISHED_ARTICLE_BY_PATH,
            &[("username", username), ("slug", slug)],
            &(),
            None::<&()>,
        )
        .await
    }

    /// `POST /articles`
    pub async fn create_article(
        &self,
        payload: &ArticleBodySchema,
    ) -> Result<Article, ClientError> {
        self.call_endpoint(CREATE_ARTICLE, &[], &(), Some(payload))
            .await
    }

    /// `PUT /articles/{id}`
    pub async fn update_article(
        &self,
        id: u32,
        payload: &ArticleBodySchema,
    ) -> Result<Article, ClientError> {
        let id = id.to_string();
        self.call_endpoint(UPDATE_ARTICLE, &[("id", id.as_str())], &(), Some(payload))
            .await
    }
}

impl BlockingDevClient {
    fn list_articles(
        &self,
        name: &str,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.call_endpoint(name, &[], params, None::<&()>)
    }

    pub fn get_published_articles(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_PUBLISHED_ARTICLES, params)
    }

    pub fn get_published_articles_sorted(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_PUBLISHED_ARTICLES_SORTED, params)
    }

    pub fn get_fresh_articles(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_FRESH_ARTICLES, params)
    }

    pub fn get_rising_articles(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_RISING_ARTICLES, params)
    }

    pub fn get_user_articles(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_USER_ARTICLES, params)
    }

    pub fn get_user_published_articles(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_USER_PUBLISHED_ARTICLES, params)
    }

    pub fn get_user_unpublished_articles(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_USER_UNPUBLISHED_ARTICLES, params)
    }

    pub fn get_articles_with_video(
        &self,
        params: &ArticleQueryParams,
    ) -> Result<Vec<Article>, ClientError> {
        self.list_articles(GET_ARTICLES_WITH_VIDEO, params)
    }

    pub fn get_published_article_by_id(&self, id: u32) -> Result<Article, ClientError> {
        let id = id.to_string();
        self.call_endpoint(
            GET_PUBLISHED_ARTICLE_BY_ID,
            &[("id", id.as_str())],
            &(),
            None::<&()>,
        )
    }

    pub fn get_published_article_by_path(
        &self,
        username: &str,
        slug: &str,
    ) -> Result<Article, ClientError> {
        self.call_endpoint(
            GET_PUBLISHED_ARTICLE_BY_PATH,
            &[("username", username), ("slug", slug)],
            &(),
            None::<&()>,
        )
    }

    pub fn create_article(&self, payload: &ArticleBodySchema) -> Result<Article, ClientError> {
        self.call_endpoint(CREATE_ARTICLE, &[], &(), Some(payload))
    }

    pub fn update_article(
        &self,
        id: u32,
        payload: &ArticleBodySchema,
    ) -> Result<Article, ClientError> {
        let id = id.to_string();
        self.call_endpoint(UPDATE_ARTICLE, &[("id", id.as_str())], &(), Some(payload))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        Article, ArticleQueryParams, ArticleState, sort_by_published_desc,
        sort_json_by_published_desc,
    };
    use crate::ClientError;
    use crate::query::encode_query;

    fn article(id: u32, published_at: Option<&str>) -> Article {
        Article {
            id,
            published_at: published_at.map(str::to_owned),
            ..Article::default()
        }
    }

    #[test]
    fn default_params_project_to_empty_query() {
        assert_eq!(encode_query(&ArticleQueryParams::default()), "");
    }

    #[test]
    fn params_use_upstream_names() {
        let params = ArticleQueryParams {
            page: Some(1),
            per_page: Some(30),
            tag: Some("rust".to_owned()),
            tags: vec!["go".to_owned(), "python".to_owned()],
            tags_exclude: vec!["discuss".to_owned()],
            username: Some("ben".to_owned()),
            state: Some(ArticleState::Rising),
            top: Some(7),
            collection_id: Some(99),
        };
        assert_eq!(
            encode_query(&params),
            "page=1&per_page=30&tag=rust&tags=go%2Cpython&tags_exclude=discuss\
             &username=ben&state=rising&top=7&collection_id=99"
        );
    }

    #[test]
    fn tags_decode_from_array_or_joined_string() {
        let from_list: Article = serde_json::from_str(
            r#"{"id":1,"tag_list":["rust","go"],"tags":"rust, go"}"#,
        )
        .expect("list route shape");
        assert_eq!(from_list.tag_list, ["rust", "go"]);
        assert_eq!(from_list.tags, ["rust", "go"]);

        let from_show: Article = serde_json::from_str(
            r#"{"id":1,"tag_list":"rust, go","tags":["rust","go"],"published":false}"#,
        )
        .expect("show route shape");
        assert_eq!(from_show.tag_list, ["rust", "go"]);
        assert_eq!(from_show.tags.len(), 2);
        assert_eq!(from_show.published, Some(false));

        let empty: Article =
            serde_json::from_str(r#"{"id":1,"tag_list":null,"tags":""}"#).expect("empty tags");
        assert!(empty.tag_list.is_empty());
        assert!(empty.tags.is_empty());
    }

    #[test]
    fn sorts_newest_first_across_offsets() {
        let mut articles = vec![
            article(1, Some("2024-01-01T10:00:00Z")),
            article(2, None),
            article(3, Some("2024-01-01T12:30:00+02:00")),
            article(4, Some("2024-03-05T08:00:00Z")),
        ];
        sort_by_published_desc(&mut articles).expect("valid timestamps");

        let ids: Vec<u32> = articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, [4, 3, 1, 2]);
    }

    #[test]
    fn unparsable_timestamp_is_reported() {
        let mut articles = vec![article(1, Some("yesterday"))];
        let error = sort_by_published_desc(&mut articles).expect_err("bad timestamp");
        assert!(matches!(error, ClientError::InvalidTimestamp { value, .. } if value == "yesterday"));
    }

    #[test]
    fn raw_entries_sort_like_typed_articles() {
        let mut entries = vec![
            json!({ "id": 1, "published_at": "2023-05-01T00:00:00Z", "extra": true }),
            json!({ "id": 2, "published_at": null }),
            json!({ "id": 3, "published_at": "2024-05-01T00:00:00Z" }),
        ];
        sort_json_by_published_desc(&mut entries).expect("valid timestamps");

        let ids: Vec<_> = entries.iter().map(|entry| entry["id"].clone()).collect();
        assert_eq!(ids, [json!(3), json!(1), json!(2)]);
        assert_eq!(entries[1]["extra"], json!(true));
    }

    #[test]
    fn state_parses_from_lowercase_names() {
        assert_eq!("fresh".parse::<ArticleState>().expect("known"), ArticleState::Fresh);
        assert!("hot".parse::<ArticleState>().is_err());
    }
}
