use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    /// Author username, per the read representation
    pub author: String,
    #[serde(skip_serializing)]
    pub author_id: Uuid,
    #[serde(skip_serializing)]
    pub title_id: Uuid,
    pub text: String,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}
