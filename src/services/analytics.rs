use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::models::entry::Entry;
use crate::models::mood::{self, MoodDefinition, MoodTrend};

/// Aggregated mood statistics for one owner over one lookback window.
/// Field names are camelCase on the wire; the dashboard binds to them
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub stats: OverallStats,
    pub timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_entries: i64,
    /// Entries per day relative to the whole window, not just active days.
    pub daily_average: f64,
    pub average_score: f64,
    pub most_frequent_mood: Option<String>,
    pub mood_trend: Option<MoodTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub average_score: f64,
    pub entry_count: i64,
}

impl AnalyticsResult {
    fn empty() -> Self {
        Self {
            stats: OverallStats {
                total_entries: 0,
                daily_average: 0.0,
                average_score: 0.0,
                most_frequent_mood: None,
                mood_trend: None,
            },
            timeline: Vec::new(),
        }
    }
}

/// Bucket entries by calendar day and compute per-day and overall mood
/// statistics for `[period_start, period_end]` (both inclusive).
///
/// Pure and side-effect free. Day boundaries use the explicit reference
/// timezone `tz` so bucketing is deterministic across environments. Entries
/// outside the window are ignored even if passed in; the store is expected
/// to pre-filter but the engine does not assume it. The timeline is sparse:
/// days without entries produce no point.
///
/// The only failure is an entry whose mood id is absent from the catalog:
/// that is corrupted upstream data and aborts with no partial result.
pub fn aggregate(
    entries: &[Entry],
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    tz: FixedOffset,
) -> Result<AnalyticsResult, AppError> {
    let mut filtered: Vec<&Entry> = entries
        .iter()
        .filter(|e| e.created_at >= period_start && e.created_at <= period_end)
        .collect();
    filtered.sort_by_key(|e| e.created_at);

    if filtered.is_empty() {
        return Ok(AnalyticsResult::empty());
    }

    // Resolve every mood up front so a bad id fails before any stats are
    // assembled.
    let mut defs: Vec<&'static MoodDefinition> = Vec::with_capacity(filtered.len());
    for entry in &filtered {
        let def = mood::lookup(&entry.mood).ok_or_else(|| {
            AppError::DataIntegrity(format!(
                "entry {} references unknown mood '{}'",
                entry.id, entry.mood
            ))
        })?;
        defs.push(def);
    }

    // BTreeMap keeps the timeline ascending by date.
    let mut buckets: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for (entry, def) in filtered.iter().zip(&defs) {
        let day = entry.created_at.with_timezone(&tz).date_naive();
        let (count, score_sum) = buckets.entry(day).or_insert((0, 0));
        *count += 1;
        *score_sum += def.score as i64;
    }

    let timeline: Vec<TimelinePoint> = buckets
        .into_iter()
        .map(|(date, (count, score_sum))| TimelinePoint {
            date,
            average_score: round1(score_sum as f64 / count as f64),
            entry_count: count,
        })
        .collect();

    let total_entries = filtered.len() as i64;
    let total_score: i64 = defs.iter().map(|d| d.score as i64).sum();
    let average_score = round1(total_score as f64 / total_entries as f64);

    let period_days = (period_end - period_start).num_days().max(1);
    let daily_average = round1(total_entries as f64 / period_days as f64);

    // Highest count wins; ties break to the mood seen earliest in
    // timestamp order. Counts are exact integers, never rounded.
    let mut counts: HashMap<&'static str, (i64, usize)> = HashMap::new();
    for (first_seen, def) in defs.iter().enumerate() {
        let slot = counts.entry(def.id).or_insert((0, first_seen));
        slot.0 += 1;
    }
    let most_frequent_mood = counts
        .into_iter()
        .min_by_key(|&(_, (count, first_seen))| (Reverse(count), first_seen))
        .map(|(id, _)| id.to_string());

    Ok(AnalyticsResult {
        stats: OverallStats {
            total_entries,
            daily_average,
            average_score,
            most_frequent_mood,
            mood_trend: Some(MoodTrend::for_score(average_score)),
        },
        timeline,
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn entry(mood: &str, created_at: DateTime<Utc>) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            collection_id: None,
            title: "entry".into(),
            content: "body".into(),
            mood: mood.into(),
            mood_score: 0,
            mood_image_url: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_empty_input_returns_zeroed_result() {
        let result = aggregate(&[], at(2026, 3, 1, 0), at(2026, 3, 8, 0), utc()).unwrap();
        assert_eq!(result.stats.total_entries, 0);
        assert_eq!(result.stats.daily_average, 0.0);
        assert_eq!(result.stats.average_score, 0.0);
        assert_eq!(result.stats.most_frequent_mood, None);
        assert_eq!(result.stats.mood_trend, None);
        assert!(result.timeline.is_empty());
    }

    #[test]
    fn test_seven_day_window_example() {
        // Day 1 scores [6, 8], day 2 score [4] over a 7-day window.
        let entries = vec![
            entry("calm", at(2026, 3, 2, 9)),
            entry("happy", at(2026, 3, 2, 20)),
            entry("tired", at(2026, 3, 4, 12)),
        ];
        let result =
            aggregate(&entries, at(2026, 3, 1, 0), at(2026, 3, 8, 0), utc()).unwrap();

        assert_eq!(result.stats.total_entries, 3);
        assert_eq!(result.stats.average_score, 6.0);
        assert_eq!(result.stats.daily_average, 0.4); // 3 / 7 days
        assert_eq!(result.stats.mood_trend, Some(MoodTrend::Good));

        assert_eq!(result.timeline.len(), 2);
        assert_eq!(
            result.timeline[0],
            TimelinePoint {
                date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                average_score: 7.0,
                entry_count: 2,
            }
        );
        assert_eq!(
            result.timeline[1],
            TimelinePoint {
                date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
                average_score: 4.0,
                entry_count: 1,
            }
        );
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let start = at(2026, 3, 1, 0);
        let end = at(2026, 3, 8, 0);
        let entries = vec![
            entry("happy", start - Duration::seconds(1)),
            entry("happy", start),
            entry("happy", end),
            entry("happy", end + Duration::seconds(1)),
        ];
        let result = aggregate(&entries, start, end, utc()).unwrap();
        assert_eq!(result.stats.total_entries, 2);
    }

    #[test]
    fn test_bucket_counts_sum_to_total() {
        let entries = vec![
            entry("happy", at(2026, 3, 2, 8)),
            entry("sad", at(2026, 3, 2, 9)),
            entry("calm", at(2026, 3, 3, 10)),
            entry("neutral", at(2026, 3, 6, 22)),
            entry("angry", at(2026, 3, 6, 23)),
        ];
        let result =
            aggregate(&entries, at(2026, 3, 1, 0), at(2026, 3, 8, 0), utc()).unwrap();
        let bucket_sum: i64 = result.timeline.iter().map(|p| p.entry_count).sum();
        assert_eq!(bucket_sum, result.stats.total_entries);
    }

    #[test]
    fn test_timeline_strictly_ascending_without_duplicates() {
        // Deliberately out of order on input.
        let entries = vec![
            entry("happy", at(2026, 3, 6, 8)),
            entry("sad", at(2026, 3, 2, 9)),
            entry("calm", at(2026, 3, 4, 10)),
            entry("neutral", at(2026, 3, 2, 20)),
        ];
        let result =
            aggregate(&entries, at(2026, 3, 1, 0), at(2026, 3, 8, 0), utc()).unwrap();
        for pair in result.timeline.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn test_most_frequent_mood_tie_breaks_on_first_occurrence() {
        // "sad" and "happy" both occur twice; "sad" appears first.
        let entries = vec![
            entry("sad", at(2026, 3, 2, 8)),
            entry("happy", at(2026, 3, 2, 9)),
            entry("happy", at(2026, 3, 3, 10)),
            entry("sad", at(2026, 3, 4, 11)),
        ];
        let result =
            aggregate(&entries, at(2026, 3, 1, 0), at(2026, 3, 8, 0), utc()).unwrap();
        assert_eq!(result.stats.most_frequent_mood.as_deref(), Some("sad"));
    }

    #[test]
    fn test_most_frequent_mood_by_count() {
        let entries = vec![
            entry("sad", at(2026, 3, 2, 8)),
            entry("happy", at(2026, 3, 2, 9)),
            entry("happy", at(2026, 3, 3, 10)),
        ];
        let result =
            aggregate(&entries, at(2026, 3, 1, 0), at(2026, 3, 8, 0), utc()).unwrap();
        assert_eq!(result.stats.most_frequent_mood.as_deref(), Some("happy"));
    }

    #[test]
    fn test_unknown_mood_is_a_data_integrity_error() {
        let entries = vec![
            entry("happy", at(2026, 3, 2, 8)),
            entry("unknown-mood", at(2026, 3, 3, 9)),
        ];
        let err =
            aggregate(&entries, at(2026, 3, 1, 0), at(2026, 3, 8, 0), utc()).unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity(_)));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let entries = vec![
            entry("happy", at(2026, 3, 2, 8)),
            entry("sad", at(2026, 3, 4, 9)),
        ];
        let a = aggregate(&entries, at(2026, 3, 1, 0), at(2026, 3, 8, 0), utc()).unwrap();
        let b = aggregate(&entries, at(2026, 3, 1, 0), at(2026, 3, 8, 0), utc()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_day_boundary_follows_reference_timezone() {
        // 23:30 UTC lands on the next day at UTC+2.
        let e = entry("happy", Utc.with_ymd_and_hms(2026, 3, 10, 23, 30, 0).unwrap());
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let in_utc =
            aggregate(&[e.clone()], at(2026, 3, 9, 0), at(2026, 3, 12, 0), utc()).unwrap();
        assert_eq!(
            in_utc.timeline[0].date,
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
        );

        let shifted =
            aggregate(&[e], at(2026, 3, 9, 0), at(2026, 3, 12, 0), plus_two).unwrap();
        assert_eq!(
            shifted.timeline[0].date,
            NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()
        );
    }

    #[test]
    fn test_daily_average_uses_full_period_length() {
        // Six entries on a single day of a 30-day window: 6 / 30 = 0.2.
        let entries: Vec<Entry> = (8..14)
            .map(|h| entry("content", at(2026, 3, 15, h)))
            .collect();
        let result =
            aggregate(&entries, at(2026, 3, 1, 0), at(2026, 3, 31, 0), utc()).unwrap();
        assert_eq!(result.stats.daily_average, 0.2);
    }

    #[test]
    fn test_averages_round_to_one_decimal() {
        // Scores 8, 8, 3 on one day: mean 6.333... -> 6.3.
        let entries = vec![
            entry("happy", at(2026, 3, 2, 8)),
            entry("happy", at(2026, 3, 2, 9)),
            entry("anxious", at(2026, 3, 2, 10)),
        ];
        let result =
            aggregate(&entries, at(2026, 3, 1, 0), at(2026, 3, 8, 0), utc()).unwrap();
        assert_eq!(result.stats.average_score, 6.3);
        assert_eq!(result.timeline[0].average_score, 6.3);
    }
}
