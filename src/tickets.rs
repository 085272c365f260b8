//! Ticket resource operations.
//!
//! Thin wrappers over the ticket endpoints. Bulk mutations return a
//! [`JobStatusResponse`] handle immediately; the `*_and_wait` variants
//! compose them with the job poller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::Zendesk;
use crate::error::Result;
use crate::jobs::{JobPollOptions, JobStatusResponse};
use crate::options::{CursorPaginationOptions, PaginationOptions};
use crate::traits::{JobOperations, TicketOperations};

#[derive(Debug, Clone, Deserialize)]
pub struct Ticket {
    pub id: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, rename = "type")]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub requester_id: Option<u64>,
    #[serde(default)]
    pub submitter_id: Option<u64>,
    #[serde(default)]
    pub assignee_id: Option<u64>,
    #[serde(default)]
    pub organization_id: Option<u64>,
    #[serde(default)]
    pub group_id: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketComment {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

impl TicketComment {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            public: None,
        }
    }
}

/// Fields for creating a ticket
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewTicket {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<TicketComment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub ticket_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NewTicket {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }
}

/// Fields for updating a ticket. `id` is only used by bulk updates, where
/// each entry names the ticket it applies to.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<TicketComment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketsResponse {
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub previous_page: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketResponse {
    pub ticket: Ticket,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CursorTicketsResponse {
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub meta: Option<CursorMeta>,
    #[serde(default)]
    pub links: Option<CursorLinks>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CursorMeta {
    #[serde(default)]
    pub has_more: Option<bool>,
    #[serde(default)]
    pub after_cursor: Option<String>,
    #[serde(default)]
    pub before_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CursorLinks {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountResponse {
    pub count: Count,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Count {
    pub value: u64,
    #[serde(default)]
    pub refreshed_at: Option<String>,
}

#[async_trait]
impl TicketOperations for Zendesk {
    async fn list_tickets(&self, options: PaginationOptions) -> Result<TicketsResponse> {
        let params = options.to_query_params();
        self.get("/tickets.json", Some(params.as_slice())).await
    }

    async fn list_tickets_with_cursor(
        &self,
        options: CursorPaginationOptions,
    ) -> Result<CursorTicketsResponse> {
        let params = options.to_query_params();
        self.get("/tickets.json", Some(params.as_slice())).await
    }

    async fn show_ticket(&self, ticket_id: u64) -> Result<TicketResponse> {
        self.get(&format!("/tickets/{}.json", ticket_id), None).await
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<TicketResponse> {
        self.post("/tickets.json", &json!({ "ticket": ticket })).await
    }

    async fn update_ticket(&self, ticket_id: u64, ticket: TicketUpdate) -> Result<TicketResponse> {
        self.put(
            &format!("/tickets/{}.json", ticket_id),
            Some(&json!({ "ticket": ticket })),
        )
        .await
    }

    async fn delete_ticket(&self, ticket_id: u64) -> Result<()> {
        self.delete(&format!("/tickets/{}.json", ticket_id)).await
    }

    async fn show_many_tickets(&self, ticket_ids: &[u64]) -> Result<TicketsResponse> {
        let ids = ticket_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let params = vec![("ids".to_string(), ids)];
        self.get("/tickets/show_many.json", Some(params.as_slice())).await
    }

    async fn count_tickets(&self) -> Result<CountResponse> {
        self.get("/tickets/count.json", None).await
    }

    async fn create_many_tickets(&self, tickets: Vec<NewTicket>) -> Result<JobStatusResponse> {
        self.post("/tickets/create_many.json", &json!({ "tickets": tickets }))
            .await
    }

    async fn update_many_tickets(&self, tickets: Vec<TicketUpdate>) -> Result<JobStatusResponse> {
        self.put(
            "/tickets/update_many.json",
            Some(&json!({ "tickets": tickets })),
        )
        .await
    }
}

impl Zendesk {
    /// Creates tickets in bulk and polls the resulting job to completion.
    pub async fn create_many_tickets_and_wait(
        &self,
        tickets: Vec<NewTicket>,
        options: JobPollOptions,
    ) -> Result<JobStatusResponse> {
        let job = self.create_many_tickets(tickets).await?;
        self.wait_for_job(&job.job_status.id, options).await
    }

    /// Updates tickets in bulk and polls the resulting job to completion.
    pub async fn update_many_tickets_and_wait(
        &self,
        tickets: Vec<TicketUpdate>,
        options: JobPollOptions,
    ) -> Result<JobStatusResponse> {
        let job = self.update_many_tickets(tickets).await?;
        self.wait_for_job(&job.job_status.id, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ticket_skips_unset_fields() {
        let body = serde_json::to_value(NewTicket::new("Printer on fire")).unwrap();
        assert_eq!(body, json!({ "subject": "Printer on fire" }));
    }

    #[test]
    fn ticket_type_serializes_under_wire_name() {
        let mut ticket = NewTicket::new("Help");
        ticket.ticket_type = Some("question".to_string());
        ticket.comment = Some(TicketComment::new("It broke"));

        let body = serde_json::to_value(&ticket).unwrap();
        assert_eq!(body["type"], "question");
        assert_eq!(body["comment"]["body"], "It broke");
        assert!(body.get("priority").is_none());
    }

    #[test]
    fn ticket_parses_with_sparse_fields() {
        let ticket: Ticket = serde_json::from_str(r#"{ "id": 35436 }"#).unwrap();
        assert_eq!(ticket.id, 35436);
        assert!(ticket.subject.is_none());
        assert!(ticket.tags.is_empty());
    }
}
