//! Trait definitions grouping API operations by resource.
//!
//! Each domain module implements its trait on the [`Zendesk`](crate::Zendesk)
//! client, so users normally call methods on the client directly. The traits
//! serve as the map of the API surface and as seams for alternative
//! implementations in tests.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::jobs::{JobPollOptions, JobStatusResponse};
use crate::options::{CursorPaginationOptions, PaginationOptions};
use crate::organizations::{
    NewOrganization, Organization, OrganizationResponse, OrganizationUpdate, OrganizationsResponse,
};
use crate::search::{
    ExportSearchCriteria, ExportSearchResponse, SearchCriteria, SearchResponse,
};
use crate::tickets::{
    CountResponse, CursorTicketsResponse, NewTicket, Ticket, TicketResponse, TicketUpdate,
    TicketsResponse,
};
use crate::users::{NewUser, User, UserResponse, UserUpdate, UsersResponse};

/// Operations for searching across tickets, users, and organizations.
///
/// The unified `search` hits the interactive endpoint and returns mixed
/// results; the typed variants derive a `type:`-filtered query so the
/// response decodes into one resource type. `export_search` is the
/// cursor-based endpoint for result sets past the interactive ceiling.
#[async_trait]
pub trait SearchOperations {
    /// Searches across all resource types.
    async fn search(&self, criteria: SearchCriteria) -> Result<SearchResponse<Value>>;
    /// Searches tickets only.
    async fn search_tickets(&self, criteria: SearchCriteria) -> Result<SearchResponse<Ticket>>;
    /// Searches users only.
    async fn search_users(&self, criteria: SearchCriteria) -> Result<SearchResponse<User>>;
    /// Searches organizations only.
    async fn search_organizations(
        &self,
        criteria: SearchCriteria,
    ) -> Result<SearchResponse<Organization>>;
    /// Runs a cursor-based export search.
    async fn export_search(
        &self,
        criteria: ExportSearchCriteria,
    ) -> Result<ExportSearchResponse<Value>>;
}

/// Operations on the ticket resource.
#[async_trait]
pub trait TicketOperations {
    /// Lists tickets with offset pagination.
    async fn list_tickets(&self, options: PaginationOptions) -> Result<TicketsResponse>;
    /// Lists tickets with cursor pagination.
    async fn list_tickets_with_cursor(
        &self,
        options: CursorPaginationOptions,
    ) -> Result<CursorTicketsResponse>;
    /// Fetches a single ticket.
    async fn show_ticket(&self, ticket_id: u64) -> Result<TicketResponse>;
    /// Creates a ticket.
    async fn create_ticket(&self, ticket: NewTicket) -> Result<TicketResponse>;
    /// Updates a ticket.
    async fn update_ticket(&self, ticket_id: u64, ticket: TicketUpdate) -> Result<TicketResponse>;
    /// Deletes a ticket.
    async fn delete_ticket(&self, ticket_id: u64) -> Result<()>;
    /// Fetches several tickets by id in one call.
    async fn show_many_tickets(&self, ticket_ids: &[u64]) -> Result<TicketsResponse>;
    /// Returns the account's ticket count.
    async fn count_tickets(&self) -> Result<CountResponse>;
    /// Creates tickets in bulk; returns a job handle to poll.
    async fn create_many_tickets(&self, tickets: Vec<NewTicket>) -> Result<JobStatusResponse>;
    /// Updates tickets in bulk; returns a job handle to poll.
    async fn update_many_tickets(&self, tickets: Vec<TicketUpdate>) -> Result<JobStatusResponse>;
}

/// Operations on the user resource.
#[async_trait]
pub trait UserOperations {
    async fn list_users(&self, options: PaginationOptions) -> Result<UsersResponse>;
    async fn show_user(&self, user_id: u64) -> Result<UserResponse>;
    async fn create_user(&self, user: NewUser) -> Result<UserResponse>;
    async fn update_user(&self, user_id: u64, user: UserUpdate) -> Result<UserResponse>;
    async fn delete_user(&self, user_id: u64) -> Result<()>;
    async fn create_many_users(&self, users: Vec<NewUser>) -> Result<JobStatusResponse>;
}

/// Operations on the organization resource.
#[async_trait]
pub trait OrganizationOperations {
    async fn list_organizations(&self, options: PaginationOptions)
    -> Result<OrganizationsResponse>;
    async fn show_organization(&self, organization_id: u64) -> Result<OrganizationResponse>;
    async fn create_organization(
        &self,
        organization: NewOrganization,
    ) -> Result<OrganizationResponse>;
    async fn update_organization(
        &self,
        organization_id: u64,
        organization: OrganizationUpdate,
    ) -> Result<OrganizationResponse>;
    async fn delete_organization(&self, organization_id: u64) -> Result<()>;
}

/// Operations for tracking asynchronous bulk jobs.
#[async_trait]
pub trait JobOperations {
    /// Fetches the current status of a job.
    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse>;
    /// Polls a job until it completes, fails, or the timeout elapses.
    async fn wait_for_job(
        &self,
        job_id: &str,
        options: JobPollOptions,
    ) -> Result<JobStatusResponse>;
}
