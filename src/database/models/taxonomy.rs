use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Category and Genre share one shape: a named, slugged taxonomy entry.
/// The slug is the external lookup key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NamedSlug {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}
