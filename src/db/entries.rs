use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::entry::Entry;

/// Entry store adapter for the aggregation engine: all of one owner's
/// entries inside a window, oldest first. Either the full set arrives or
/// the fetch fails as a whole; the caller decides how to surface failure.
pub async fn entries_in_window(
    db: &PgPool,
    user_id: Uuid,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Vec<Entry>, sqlx::Error> {
    sqlx::query_as::<_, Entry>(
        r#"
        SELECT * FROM entries
        WHERE user_id = $1 AND created_at BETWEEN $2 AND $3
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(window_start)
    .bind(window_end)
    .fetch_all(db)
    .await
}
