use axum::{extract::State, Json};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::AppState;

const CACHE_TTL: Duration = Duration::from_secs(86_400);
const FALLBACK_PROMPT: &str = "What's on your mind today?";

#[derive(Debug, Clone)]
pub struct CachedPrompt {
    pub text: String,
    pub fetched_at: Instant,
}

#[derive(Debug, Serialize)]
pub struct DailyPromptResponse {
    pub prompt: String,
}

/// GET /api/prompts/daily: writing prompt for the editor, refreshed once
/// a day from the advice API. Failures fall back to a static prompt and
/// are not cached, so the next request retries.
pub async fn get_daily_prompt(State(state): State<AppState>) -> Json<DailyPromptResponse> {
    {
        let cache = state.prompt_cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < CACHE_TTL {
                return Json(DailyPromptResponse {
                    prompt: cached.text.clone(),
                });
            }
        }
    }

    match fetch_prompt(&state.config.daily_prompt_url).await {
        Ok(text) => {
            let mut cache = state.prompt_cache.lock().await;
            *cache = Some(CachedPrompt {
                text: text.clone(),
                fetched_at: Instant::now(),
            });
            Json(DailyPromptResponse { prompt: text })
        }
        Err(e) => {
            tracing::warn!(error = %e, "Daily prompt fetch failed, using fallback");
            Json(DailyPromptResponse {
                prompt: FALLBACK_PROMPT.into(),
            })
        }
    }
}

async fn fetch_prompt(url: &str) -> Result<String, anyhow::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        anyhow::bail!("prompt API returned {}", response.status());
    }

    let body: serde_json::Value = response.json().await?;
    body["slip"]["advice"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("prompt API response missing slip.advice"))
}
