use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::articles::{Organization, User, deserialize_tags};
use crate::endpoints::{
    CREATE_LISTING, GET_LISTING_BY_ID, GET_PUBLISHED_LISTINGS, GET_PUBLISHED_LISTINGS_BY_CATEGORY,
    UPDATE_LISTING,
};
use crate::query::{QueryPairs, QueryParams};
use crate::{BlockingDevClient, ClientError, DevClient};

/// Classified-listing category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingCategory {
    Cfp,
    Forhire,
    Collabs,
    Education,
    Jobs,
    Mentors,
    Products,
    Mentees,
    Forsale,
    Events,
    Misc,
}

impl ListingCategory {
    pub const ALL: [Self; 11] = [
        Self::Cfp,
        Self::Forhire,
        Self::Collabs,
        Self::Education,
        Self::Jobs,
        Self::Mentors,
        Self::Products,
        Self::Mentees,
        Self::Forsale,
        Self::Events,
        Self::Misc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cfp => "cfp",
            Self::Forhire => "forhire",
            Self::Collabs => "collabs",
            Self::Education => "education",
            Self::Jobs => "jobs",
            Self::Mentors => "mentors",
            Self::Products => "products",
            Self::Mentees => "mentees",
            Self::Forsale => "forsale",
            Self::Events => "events",
            Self::Misc => "misc",
        }
    }
}

impl fmt::Display for ListingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingCategory {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| ClientError::UnknownVariant {
                kind: "listing category",
                value: value.to_owned(),
            })
    }
}

/// State change requested alongside a listing create or update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingAction {
    /// Save without publishing.
    Draft,
    Bump,
    Publish,
    Unpublish,
}

impl FromStr for ListingAction {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(Self::Draft),
            "bump" => Ok(Self::Bump),
            "publish" => Ok(Self::Publish),
            "unpublish" => Ok(Self::Unpublish),
            _ => Err(ClientError::UnknownVariant {
                kind: "listing action",
                value: value.to_owned(),
            }),
        }
    }
}

/// A classified listing as returned by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub type_of: String,
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub body_markdown: String,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tag_list: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    pub category: ListingCategory,
    #[serde(default)]
    pub processed_html: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub organization: Option<Organization>,
}

/// Filters for the listing endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingQueryParams {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    pub category: Option<ListingCategory>,
}

impl QueryParams for ListingQueryParams {
    fn project(&self, pairs: &mut QueryPairs) {
        pairs.int("page", self.page);
        pairs.int("per_page", self.per_page);
        pairs.text("category", self.category.map(ListingCategory::as_str));
    }
}

/// Write-side fields of a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListingBody {
    pub title: String,
    pub body_markdown: String,
    pub category: ListingCategory,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_via_connect: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<u32>,
    /// `Some(ListingAction::Draft)` creates the listing unpublished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ListingAction>,
}

impl ListingBody {
    /// A listing with only the required fields set.
    pub fn new(
        title: impl Into<String>,
        body_markdown: impl Into<String>,
        category: ListingCategory,
    ) -> Self {
        Self {
            title: title.into(),
            body_markdown: body_markdown.into(),
            category,
            tags: Vec::new(),
            expires_at: None,
            contact_via_connect: None,
            location: None,
            organization_id: None,
            action: None,
        }
    }
}

/// Create/update payload: `{"listing": {...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListingBodySchema {
    pub listing: ListingBody,
}

impl DevClient {
    /// `GET /listings`
    pub async fn get_published_listings(
        &self,
        params: &ListingQueryParams,
    ) -> Result<Vec<Listing>, ClientError> {
        self.call_endpoint(GET_PUBLISHED_LISTINGS, &[], params, None::<&()>)
            .await
    }

    /// `GET /listings/category/{category}`
    pub async fn get_published_listings_by_category(
        &self,
        category: ListingCategory,
        params: &ListingQueryParams,
    ) -> Result<Vec<Listing>, ClientError> {
        self.call_endpoint(
            GET_PUBLISHED_LISTINGS_BY_CATEGORY,
            &[("category", category.as_str())],
            params,
            None::<&()>,
        )
        .await
    }

    /// `GET /listings/{id}`
    pub async fn get_listing_by_id(&self, id: u32) -> Result<Listing, ClientError> {
        let id = id.to_string();
        self.call_endpoint(GET_LISTING_BY_ID, &[("id", id.as_str())], &(), None::<&()>)
            .await
    }

    /// `POST /listings`
    pub async fn create_listing(
        &self,
        payload: &ListingBodySchema,
    ) -> Result<Listing, ClientError> {
        self.call_endpoint(CREATE_LISTING, &[], &(), Some(payload))
            .await
    }

    /// `PUT /listings/{id}`
    pub async fn update_listing(
        &self,
        id: u32,
        payload: &ListingBodySchema,
    ) -> Result<Listing, ClientError> {
        let id = id.to_string();
        self.call_endpoint(UPDATE_LISTING, &[("id", id.as_str())], &(), Some(payload))
            .await
    }
}

impl BlockingDevClient {
    pub fn get_published_listings(
        &self,
        params: &ListingQueryParams,
    ) -> Result<Vec<Listing>, ClientError> {
        self.call_endpoint(GET_PUBLISHED_LISTINGS, &[], params, None::<&()>)
    }

    pub fn get_published_listings_by_category(
        &self,
        category: ListingCategory,
        params: &ListingQueryParams,
    ) -> Result<Vec<Listing>, ClientError> {
        self.call_endpoint(
            GET_PUBLISHED_LISTINGS_BY_CATEGORY,
            &[("category", category.as_str())],
            params,
            None::<&()>,
        )
    }

    pub fn get_listing_by_id(&self, id: u32) -> Result<Listing, ClientError> {
        let id = id.to_string();
        self.call_endpoint(GET_LISTING_BY_ID, &[("id", id.as_str())], &(), None::<&()>)
    }

    pub fn create_listing(&self, payload: &ListingBodySchema) -> Result<Listing, ClientError> {
        self.call_endpoint(CREATE_LISTING, &[], &(), Some(payload))
    }

    pub fn update_listing(
        &self,
        id: u32,
        payload: &ListingBodySchema,
    ) -> Result<Listing, ClientError> {
        let id = id.to_string();
        self.call_endpoint(UPDATE_LISTING, &[("id", id.as_str())], &(), Some(payload))
    }
}
