//! Organization resource operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::Zendesk;
use crate::error::Result;
use crate::options::PaginationOptions;
use crate::traits::OrganizationOperations;

#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub id: u64,
    #[serde(default)]
    pub url: Option<String>,
    pub name: String,
    #[serde(default)]
    pub domain_names: Vec<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Fields for creating an organization
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewOrganization {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewOrganization {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationsResponse {
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub previous_page: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationResponse {
    pub organization: Organization,
}

#[async_trait]
impl OrganizationOperations for Zendesk {
    async fn list_organizations(
        &self,
        options: PaginationOptions,
    ) -> Result<OrganizationsResponse> {
        let params = options.to_query_params();
        self.get("/organizations.json", Some(params.as_slice())).await
    }

    async fn show_organization(&self, organization_id: u64) -> Result<OrganizationResponse> {
        self.get(&format!("/organizations/{}.json", organization_id), None)
            .await
    }

    async fn create_organization(
        &self,
        organization: NewOrganization,
    ) -> Result<OrganizationResponse> {
        self.post(
            "/organizations.json",
            &json!({ "organization": organization }),
        )
        .await
    }

    async fn update_organization(
        &self,
        organization_id: u64,
        organization: OrganizationUpdate,
    ) -> Result<OrganizationResponse> {
        self.put(
            &format!("/organizations/{}.json", organization_id),
            Some(&json!({ "organization": organization })),
        )
        .await
    }

    async fn delete_organization(&self, organization_id: u64) -> Result<()> {
        self.delete(&format!("/organizations/{}.json", organization_id))
            .await
    }
}
