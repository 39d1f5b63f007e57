use serde::Serialize;
use uuid::Uuid;

use super::taxonomy::NamedSlug;

/// Read representation: embedded taxonomy plus the derived rating
/// (mean review score rounded to one decimal, null with no reviews).
#[derive(Debug, Clone, Serialize)]
pub struct TitleDetail {
    pub id: Uuid,
    pub name: String,
    pub year: i32,
    pub rating: Option<f64>,
    pub description: String,
    pub genre: Vec<NamedSlug>,
    pub category: Option<NamedSlug>,
}
