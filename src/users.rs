//! User resource operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::Zendesk;
use crate::error::Result;
use crate::jobs::JobStatusResponse;
use crate::options::PaginationOptions;
use crate::traits::UserOperations;

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub url: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub organization_id: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Fields for creating a user
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewUser {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

impl NewUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub previous_page: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

#[async_trait]
impl UserOperations for Zendesk {
    async fn list_users(&self, options: PaginationOptions) -> Result<UsersResponse> {
        let params = options.to_query_params();
        self.get("/users.json", Some(params.as_slice())).await
    }

    async fn show_user(&self, user_id: u64) -> Result<UserResponse> {
        self.get(&format!("/users/{}.json", user_id), None).await
    }

    async fn create_user(&self, user: NewUser) -> Result<UserResponse> {
        self.post("/users.json", &json!({ "user": user })).await
    }

    async fn update_user(&self, user_id: u64, user: UserUpdate) -> Result<UserResponse> {
        self.put(
            &format!("/users/{}.json", user_id),
            Some(&json!({ "user": user })),
        )
        .await
    }

    async fn delete_user(&self, user_id: u64) -> Result<()> {
        self.delete(&format!("/users/{}.json", user_id)).await
    }

    async fn create_many_users(&self, users: Vec<NewUser>) -> Result<JobStatusResponse> {
        self.post("/users/create_many.json", &json!({ "users": users }))
            .await
    }
}
