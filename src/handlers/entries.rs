use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::collection::Collection;
use crate::models::entry::{
    CreateEntryRequest, Entry, EntryWithMood, ListEntriesQuery, UpdateEntryRequest,
};
use crate::models::mood;
use crate::services::pixabay;
use crate::AppState;

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateEntryRequest>,
) -> AppResult<Json<Entry>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state.rate_limiter.check_user_write(auth_user.id).await?;

    let def = mood::lookup(&body.mood)
        .ok_or_else(|| AppError::Validation(format!("Invalid mood '{}'", body.mood)))?;

    // Verify collection ownership before filing the entry under it
    if let Some(collection_id) = body.collection_id {
        sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE id = $1 AND user_id = $2",
        )
        .bind(collection_id)
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Collection not found".into()))?;
    }

    let image_query = body.mood_query.as_deref().unwrap_or(def.pixabay_query);
    let mood_image_url = pixabay::fetch_mood_image(&state.config, image_query).await;

    let entry = sqlx::query_as::<_, Entry>(
        r#"
        INSERT INTO entries (id, user_id, collection_id, title, content, mood, mood_score, mood_image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.collection_id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(def.id)
    .bind(def.score)
    .bind(&mood_image_url)
    .fetch_one(&state.db)
    .await?;

    // Publishing clears the autosaved draft
    sqlx::query("DELETE FROM drafts WHERE user_id = $1")
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    Ok(Json(entry))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListEntriesQuery>,
) -> AppResult<Json<Vec<EntryWithMood>>> {
    let ascending = matches!(query.order.as_deref(), Some("asc"));
    let order = if ascending { "ASC" } else { "DESC" };

    let entries = match query.collection_id.as_deref() {
        // Pseudo-collection for entries not filed anywhere
        Some("unorganized") => {
            sqlx::query_as::<_, Entry>(&format!(
                "SELECT * FROM entries WHERE user_id = $1 AND collection_id IS NULL ORDER BY created_at {}",
                order
            ))
            .bind(auth_user.id)
            .fetch_all(&state.db)
            .await?
        }
        Some(raw) => {
            let collection_id: Uuid = raw
                .parse()
                .map_err(|_| AppError::Validation("Invalid collection id".into()))?;
            sqlx::query_as::<_, Entry>(&format!(
                "SELECT * FROM entries WHERE user_id = $1 AND collection_id = $2 ORDER BY created_at {}",
                order
            ))
            .bind(auth_user.id)
            .bind(collection_id)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Entry>(&format!(
                "SELECT * FROM entries WHERE user_id = $1 ORDER BY created_at {}",
                order
            ))
            .bind(auth_user.id)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(entries.into_iter().map(EntryWithMood::from).collect()))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<EntryWithMood>> {
    let entry = sqlx::query_as::<_, Entry>(
        "SELECT * FROM entries WHERE id = $1 AND user_id = $2",
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Entry not found".into()))?;

    Ok(Json(entry.into()))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
    Json(body): Json<UpdateEntryRequest>,
) -> AppResult<Json<Entry>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let existing = sqlx::query_as::<_, Entry>(
        "SELECT * FROM entries WHERE id = $1 AND user_id = $2",
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Entry not found".into()))?;

    // A mood change re-validates against the catalog and refreshes the
    // illustration; everything else keeps the stored image.
    let mut new_mood: Option<&str> = None;
    let mut new_score: Option<i32> = None;
    let mut new_image: Option<String> = None;
    if let Some(mood_id) = body.mood.as_deref() {
        let def = mood::lookup(mood_id)
            .ok_or_else(|| AppError::Validation(format!("Invalid mood '{}'", mood_id)))?;
        if def.id != existing.mood {
            let image_query = body.mood_query.as_deref().unwrap_or(def.pixabay_query);
            new_image = pixabay::fetch_mood_image(&state.config, image_query).await;
        }
        new_mood = Some(def.id);
        new_score = Some(def.score);
    }

    if let Some(collection_id) = body.collection_id {
        sqlx::query_as::<_, Collection>(
            "SELECT * FROM collections WHERE id = $1 AND user_id = $2",
        )
        .bind(collection_id)
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Collection not found".into()))?;
    }

    let entry = sqlx::query_as::<_, Entry>(
        r#"
        UPDATE entries SET
            title = COALESCE($3, title),
            content = COALESCE($4, content),
            mood = COALESCE($5, mood),
            mood_score = COALESCE($6, mood_score),
            mood_image_url = COALESCE($7, mood_image_url),
            collection_id = COALESCE($8, collection_id),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(new_mood)
    .bind(new_score)
    .bind(&new_image)
    .bind(body.collection_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
        .bind(entry_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Entry not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
