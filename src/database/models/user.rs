use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::policy::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    #[serde(skip_serializing)]
    pub is_superuser: bool,
    // Shared secret for the passwordless token exchange; never serialized
    #[serde(skip_serializing)]
    pub confirmation_code: String,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}
