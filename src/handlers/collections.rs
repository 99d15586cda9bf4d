use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::collection::{Collection, CreateCollectionRequest};
use crate::AppState;

pub async fn create_collection(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateCollectionRequest>,
) -> AppResult<Json<Collection>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state.rate_limiter.check_user_write(auth_user.id).await?;

    // Names are unique per user; surface a 409 instead of a bare DB error
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM collections WHERE user_id = $1 AND name = $2",
    )
    .bind(auth_user.id)
    .bind(&body.name)
    .fetch_one(&state.db)
    .await?;

    if existing > 0 {
        return Err(AppError::Conflict(
            "Collection with this name already exists".into(),
        ));
    }

    let collection = sqlx::query_as::<_, Collection>(
        r#"
        INSERT INTO collections (id, user_id, name, description)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.name)
    .bind(&body.description)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(collection))
}

pub async fn list_collections(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Collection>>> {
    let collections = sqlx::query_as::<_, Collection>(
        r#"
        SELECT * FROM collections
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(collections))
}

pub async fn get_collection(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(collection_id): Path<Uuid>,
) -> AppResult<Json<Collection>> {
    let collection = sqlx::query_as::<_, Collection>(
        "SELECT * FROM collections WHERE id = $1 AND user_id = $2",
    )
    .bind(collection_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Collection not found".into()))?;

    Ok(Json(collection))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(collection_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    // Entries in the collection survive and fall back to unorganized
    // (collection_id SET NULL at the schema level).
    let result = sqlx::query("DELETE FROM collections WHERE id = $1 AND user_id = $2")
        .bind(collection_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Collection not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
