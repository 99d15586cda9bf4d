use axum::{extract::State, Extension, Json};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::draft::{Draft, SaveDraftRequest};
use crate::AppState;

/// Autosave from the editor. Replaces the user's draft wholesale; partial
/// merges would resurrect text the editor already cleared.
pub async fn save_draft(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SaveDraftRequest>,
) -> AppResult<Json<Draft>> {
    let draft = sqlx::query_as::<_, Draft>(
        r#"
        INSERT INTO drafts (id, user_id, title, content, mood)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE SET
            title = $3,
            content = $4,
            mood = $5,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(&body.mood)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(draft))
}

pub async fn get_draft(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Option<Draft>>> {
    let draft = sqlx::query_as::<_, Draft>("SELECT * FROM drafts WHERE user_id = $1")
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await?;

    Ok(Json(draft))
}
