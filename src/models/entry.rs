use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::mood::MoodDefinition;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub collection_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    /// Mood catalog id (lowercase). Resolved through the catalog; not an
    /// enum column so pre-migration rows stay representable.
    pub mood: String,
    /// Catalog score captured at write time.
    pub mood_score: i32,
    pub mood_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    /// Mood catalog id.
    pub mood: String,

    /// Override keyword for the mood illustration. Defaults to the
    /// catalog's query for the chosen mood.
    pub mood_query: Option<String>,

    pub collection_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEntryRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: Option<String>,

    pub mood: Option<String>,
    pub mood_query: Option<String>,
    pub collection_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// Collection id, or "unorganized" for entries outside any collection.
    pub collection_id: Option<String>,
    /// "asc" or "desc" (default) by created_at.
    pub order: Option<String>,
}

/// Entry decorated with its catalog definition for display. `mood_data` is
/// None when the stored id no longer resolves; the display path tolerates
/// that, the analytics path does not.
#[derive(Debug, Serialize)]
pub struct EntryWithMood {
    #[serde(flatten)]
    pub entry: Entry,
    pub mood_data: Option<MoodDefinition>,
}

impl From<Entry> for EntryWithMood {
    fn from(entry: Entry) -> Self {
        let mood_data = crate::models::mood::lookup(&entry.mood).copied();
        Self { entry, mood_data }
    }
}
