//! Search across tickets, users, and organizations.
//!
//! The unified endpoint accepts a free-form query string; typed variants
//! derive a new query with a `type:` filter appended so the response can be
//! decoded into a single resource type. Export search is the cursor-based
//! variant for pulling result sets past the interactive endpoint's ceiling.
//!
//! # Examples
//!
//! ```ignore
//! use zenkit::{SearchCriteria, SearchOperations, SortOrder, Zendesk};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Zendesk::new("acme", "agent@example.com", "api-token")?;
//!
//!     let criteria = SearchCriteria::new("status:open priority:high")
//!         .with_sort("created_at", SortOrder::Desc)
//!         .with_per_page(50);
//!
//!     let response = client.search_tickets(criteria).await?;
//!     println!("{} matching tickets", response.count);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::Zendesk;
use crate::error::Result;
use crate::options::SortOrder;
use crate::organizations::Organization;
use crate::tickets::Ticket;
use crate::traits::SearchOperations;
use crate::users::User;

/// Interactive search returns at most this many results per page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Export search allows larger pages, capped here.
pub const MAX_EXPORT_PAGE_SIZE: u32 = 1000;

/// Resource types the search endpoint can filter on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResultType {
    Ticket,
    User,
    Organization,
    Group,
}

impl SearchResultType {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchResultType::Ticket => "ticket",
            SearchResultType::User => "user",
            SearchResultType::Organization => "organization",
            SearchResultType::Group => "group",
        }
    }
}

/// Appends a `type:` filter to a query unless one is already present.
///
/// The presence check is a plain substring match on `type:`, so a query
/// containing that text in any position is returned unchanged.
pub fn add_type_filter(query: &str, resource: SearchResultType) -> String {
    if query.contains("type:") {
        return query.to_string();
    }
    format!("{} type:{}", query, resource.as_str())
}

/// Criteria for a single search call
///
/// # Examples
///
/// ```ignore
/// let criteria = SearchCriteria::new("status:open")
///     .with_sort("updated_at", SortOrder::Asc)
///     .with_page(2)
///     .with_include(vec!["users".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    /// Free-form query expression, passed through verbatim
    pub query: String,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    /// Which page of results to return, starting from 1
    pub page: Option<u32>,
    /// Results per page; values above 100 are clamped by the service,
    /// so they are clamped here too
    pub per_page: Option<u32>,
    /// Related records to sideload into the response
    pub include: Option<Vec<String>>,
}

impl SearchCriteria {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, sort_order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = Some(sort_order);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_include(mut self, include: Vec<String>) -> Self {
        self.include = Some(include);
        self
    }

    /// Derives new criteria with a `type:` filter applied to the query.
    pub fn with_type_filter(mut self, resource: SearchResultType) -> Self {
        self.query = add_type_filter(&self.query, resource);
        self
    }

    /// Flattens the criteria into request parameters. Only fields the
    /// caller set are included; `per_page` is silently clamped to 100.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("query".to_string(), self.query.clone())];

        if let Some(ref sort_by) = self.sort_by {
            params.push(("sort_by".to_string(), sort_by.clone()));
        }

        if let Some(sort_order) = self.sort_order {
            params.push(("sort_order".to_string(), sort_order.as_str().to_string()));
        }

        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }

        if let Some(per_page) = self.per_page {
            params.push((
                "per_page".to_string(),
                per_page.min(MAX_PAGE_SIZE).to_string(),
            ));
        }

        if let Some(ref include) = self.include {
            params.push(("include".to_string(), include.join(",")));
        }

        params
    }
}

/// One page of search results
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse<T> {
    pub results: Vec<T>,
    pub count: u32,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub previous_page: Option<String>,
    /// Result statistics keyed by facet name
    #[serde(default)]
    pub facets: Option<Value>,
}

/// Criteria for the cursor-based export endpoint
#[derive(Debug, Clone, Default)]
pub struct ExportSearchCriteria {
    pub query: String,
    /// Restricts results to a single resource type via `filter[type]`
    pub filter_type: Option<SearchResultType>,
    /// Results per page; values above 1000 are clamped
    pub page_size: Option<u32>,
    /// Opaque cursor from a previous response
    pub cursor: Option<String>,
}

impl ExportSearchCriteria {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_filter_type(mut self, filter_type: SearchResultType) -> Self {
        self.filter_type = Some(filter_type);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("query".to_string(), self.query.clone())];

        if let Some(filter_type) = self.filter_type {
            params.push((
                "filter[type]".to_string(),
                filter_type.as_str().to_string(),
            ));
        }

        if let Some(page_size) = self.page_size {
            params.push((
                "page[size]".to_string(),
                page_size.min(MAX_EXPORT_PAGE_SIZE).to_string(),
            ));
        }

        if let Some(ref cursor) = self.cursor {
            params.push(("page[after]".to_string(), cursor.clone()));
        }

        params
    }
}

/// One page of export results with the cursor bookkeeping the endpoint
/// reports in two shapes depending on account plan.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportSearchResponse<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub end_of_stream: bool,
    #[serde(default)]
    pub after_cursor: Option<String>,
    #[serde(default)]
    pub after_url: Option<String>,
    #[serde(default)]
    pub links: Option<ExportLinks>,
    #[serde(default)]
    pub meta: Option<ExportMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportLinks {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportMeta {
    #[serde(default)]
    pub has_more: Option<bool>,
    #[serde(default)]
    pub after_cursor: Option<String>,
}

impl<T> ExportSearchResponse<T> {
    /// Cursor for the next page, wherever the response carried it.
    pub fn next_cursor(&self) -> Option<&str> {
        self.after_cursor
            .as_deref()
            .or_else(|| self.meta.as_ref().and_then(|m| m.after_cursor.as_deref()))
    }

    /// Whether the stream has reported its end.
    pub fn is_exhausted(&self) -> bool {
        self.end_of_stream
            || self
                .meta
                .as_ref()
                .is_some_and(|m| m.has_more == Some(false))
    }
}

impl Zendesk {
    /// Runs an export search decoding results into an arbitrary type.
    pub async fn export_search_typed<T: DeserializeOwned>(
        &self,
        criteria: ExportSearchCriteria,
    ) -> Result<ExportSearchResponse<T>> {
        let params = criteria.to_query_params();
        self.get("/search/export.json", Some(params.as_slice())).await
    }
}

#[async_trait]
impl SearchOperations for Zendesk {
    /// Searches across all resource types; results are raw JSON objects
    /// because a single response can mix tickets, users, and organizations.
    async fn search(&self, criteria: SearchCriteria) -> Result<SearchResponse<Value>> {
        let params = criteria.to_query_params();
        self.get("/search.json", Some(params.as_slice())).await
    }

    async fn search_tickets(&self, criteria: SearchCriteria) -> Result<SearchResponse<Ticket>> {
        let criteria = criteria.with_type_filter(SearchResultType::Ticket);
        let params = criteria.to_query_params();
        self.get("/search.json", Some(params.as_slice())).await
    }

    async fn search_users(&self, criteria: SearchCriteria) -> Result<SearchResponse<User>> {
        let criteria = criteria.with_type_filter(SearchResultType::User);
        let params = criteria.to_query_params();
        self.get("/search.json", Some(params.as_slice())).await
    }

    async fn search_organizations(
        &self,
        criteria: SearchCriteria,
    ) -> Result<SearchResponse<Organization>> {
        let criteria = criteria.with_type_filter(SearchResultType::Organization);
        let params = criteria.to_query_params();
        self.get("/search.json", Some(params.as_slice())).await
    }

    async fn export_search(
        &self,
        criteria: ExportSearchCriteria,
    ) -> Result<ExportSearchResponse<Value>> {
        self.export_search_typed(criteria).await
    }
}
