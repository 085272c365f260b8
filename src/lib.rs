//! # ZenKit - a Rust client for the Zendesk Support API
//!
//! ZenKit provides a typed, async API for the Zendesk ticketing platform:
//! tickets, users, organizations, unified and typed search, cursor-based
//! export, and asynchronous bulk jobs.
//!
//! ## Features
//!
//! - **Rate-limited HTTP client** - client-side throttling plus tracking of
//!   the quota headers the API reports, with backoff-and-retry on 429s
//! - **Resource operations** - tickets, users, and organizations with both
//!   offset and cursor pagination
//! - **Search** - unified, typed, and cursor-based export search
//! - **Bulk search streams** - lazy batch streams over unbounded result
//!   sets, with date-range partitioning to stay under result ceilings
//! - **Job polling** - drive bulk mutations to completion and classify
//!   per-item results
//!
//! ## Requirements
//!
//! ZenKit is an async-first library and requires an async runtime. We
//! recommend [tokio](https://tokio.rs), the most widely used async runtime
//! in the Rust ecosystem.
//!
//! ## Basic Usage
//!
//! ```ignore
//! use zenkit::{SearchCriteria, SearchOperations, Zendesk};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Zendesk::new("acme", "agent@example.com", "api-token")?;
//!
//!     let response = client
//!         .search_tickets(SearchCriteria::new("status:open priority:high"))
//!         .await?;
//!
//!     for ticket in response.results {
//!         println!("#{} {}", ticket.id, ticket.subject.unwrap_or_default());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! Streaming every match of a large query:
//!
//! ```ignore
//! use futures_util::TryStreamExt;
//! use zenkit::{SearchCriteria, Zendesk};
//!
//! # async fn run(client: Zendesk) -> Result<(), zenkit::ZendeskError> {
//! let mut stream = client.search_all_tickets(SearchCriteria::new("created>2024-01-01"), None);
//! while let Some(batch) = stream.try_next().await? {
//!     println!("fetched {} tickets", batch.len());
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod core;
mod error;
mod jobs;
mod options;
mod organizations;
mod pagination;
mod search;
mod tickets;
mod traits;
mod users;

pub use crate::auth::ApiTokenAuth;
pub use crate::config::ZendeskConfig;
pub use crate::core::{RateLimitState, SharedRateLimit, Zendesk};
pub use crate::error::{Result, ZendeskError};
pub use crate::jobs::{
    JobOutcome, JobPollOptions, JobResult, JobState, JobStatus, JobStatusResponse,
};
pub use crate::options::{CursorPaginationOptions, PaginationOptions, SortOrder};
pub use crate::organizations::{
    NewOrganization, Organization, OrganizationResponse, OrganizationUpdate, OrganizationsResponse,
};
pub use crate::pagination::{
    BatchStream, BulkSearchCriteria, DateField, DateRangePager, Page, PartitionErrorPolicy,
    ProgressObserver, SearchPager, SearchProgress,
};
pub use crate::search::{
    ExportLinks, ExportMeta, ExportSearchCriteria, ExportSearchResponse, MAX_EXPORT_PAGE_SIZE,
    MAX_PAGE_SIZE, SearchCriteria, SearchResponse, SearchResultType, add_type_filter,
};
pub use crate::tickets::{
    Count, CountResponse, CursorLinks, CursorMeta, CursorTicketsResponse, NewTicket, Ticket,
    TicketComment, TicketResponse, TicketUpdate, TicketsResponse,
};
pub use crate::traits::{
    JobOperations, OrganizationOperations, SearchOperations, TicketOperations, UserOperations,
};
pub use crate::users::{NewUser, User, UserResponse, UserUpdate, UsersResponse};
