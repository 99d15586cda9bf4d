use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::{resolve_owner, AuthUser};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::services::analytics::{self, AnalyticsResult};
use crate::AppState;

/// Supported lookback windows. A closed set so bucket semantics stay
/// predictable; anything else is rejected at extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Period {
    #[serde(rename = "7d")]
    Days7,
    #[serde(rename = "15d")]
    Days15,
    #[default]
    #[serde(rename = "30d")]
    Days30,
}

impl Period {
    pub fn days(self) -> i64 {
        match self {
            Period::Days7 => 7,
            Period::Days15 => 15,
            Period::Days30 => 30,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub period: Period,
}

/// Stable envelope the dashboard binds to: `{success, data}` on the happy
/// path, `{success, error}` with a short human message otherwise.
#[derive(Debug, Serialize)]
pub struct AnalyticsEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<AnalyticsResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyticsEnvelope {
    fn success(data: AnalyticsResult) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// GET /api/analytics?period={7d|15d|30d}
///
/// Expected failures (missing profile, store outage) become a failure
/// envelope so the dashboard renders a placeholder instead of crashing.
/// Aggregation itself only fails on corrupted data, which propagates as a
/// hard error.
pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<AnalyticsEnvelope>> {
    let owner = match resolve_owner(&state.db, &auth_user).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            tracing::warn!(user_id = %auth_user.id, "Analytics requested for missing profile");
            return Ok(Json(AnalyticsEnvelope::failure("User not found")));
        }
        Err(e) => {
            tracing::error!(user_id = %auth_user.id, error = %e, "Analytics owner resolution failed");
            return Ok(Json(AnalyticsEnvelope::failure(
                "Journal entries are temporarily unavailable",
            )));
        }
    };

    let period_end = Utc::now();
    let period_start = period_end - Duration::days(query.period.days());

    let entries =
        match db::entries::entries_in_window(&state.db, owner.id, period_start, period_end).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(user_id = %owner.id, error = %e, "Failed to load entries for analytics");
                return Ok(Json(AnalyticsEnvelope::failure(
                    "Journal entries are temporarily unavailable",
                )));
            }
        };

    let result = analytics::aggregate(
        &entries,
        period_start,
        period_end,
        state.config.analytics_timezone(),
    )?;

    Ok(Json(AnalyticsEnvelope::success(result)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parses_supported_windows() {
        assert_eq!(serde_json::from_str::<Period>("\"7d\"").unwrap(), Period::Days7);
        assert_eq!(serde_json::from_str::<Period>("\"15d\"").unwrap(), Period::Days15);
        assert_eq!(serde_json::from_str::<Period>("\"30d\"").unwrap(), Period::Days30);
    }

    #[test]
    fn test_period_rejects_arbitrary_values() {
        assert!(serde_json::from_str::<Period>("\"90d\"").is_err());
        assert!(serde_json::from_str::<Period>("\"7\"").is_err());
    }

    #[test]
    fn test_period_defaults_to_thirty_days() {
        let query: AnalyticsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.period, Period::Days30);
        assert_eq!(query.period.days(), 30);
    }

    #[test]
    fn test_period_day_counts() {
        assert_eq!(Period::Days7.days(), 7);
        assert_eq!(Period::Days15.days(), 15);
        assert_eq!(Period::Days30.days(), 30);
    }
}
