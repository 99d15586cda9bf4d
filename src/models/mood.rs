use serde::Serialize;

/// Static mood catalog. Entries store the lowercase `id` as a plain TEXT
/// column; every stored id must resolve here. Resolution failures are a
/// data-integrity error, not a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Overjoyed,
    Excited,
    Happy,
    Content,
    Calm,
    Neutral,
    Tired,
    Anxious,
    Sad,
    Frustrated,
    Angry,
    Devastated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoodDefinition {
    pub id: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
    /// 1-10, higher = more positive.
    pub score: i32,
    /// Default keyword for the mood illustration lookup.
    pub pixabay_query: &'static str,
}

impl Mood {
    pub const ALL: [Mood; 12] = [
        Mood::Overjoyed,
        Mood::Excited,
        Mood::Happy,
        Mood::Content,
        Mood::Calm,
        Mood::Neutral,
        Mood::Tired,
        Mood::Anxious,
        Mood::Sad,
        Mood::Frustrated,
        Mood::Angry,
        Mood::Devastated,
    ];

    /// Case-insensitive id lookup. Returns None for ids absent from the
    /// catalog; callers decide whether that is a 422 (user input) or a
    /// data-integrity error (stored data).
    pub fn from_id(id: &str) -> Option<Mood> {
        Mood::ALL
            .into_iter()
            .find(|m| m.def().id.eq_ignore_ascii_case(id))
    }

    pub fn def(self) -> &'static MoodDefinition {
        match self {
            Mood::Overjoyed => &MoodDefinition {
                id: "overjoyed",
                label: "Overjoyed",
                emoji: "\u{1F973}",
                score: 10,
                pixabay_query: "celebration confetti",
            },
            Mood::Excited => &MoodDefinition {
                id: "excited",
                label: "Excited",
                emoji: "\u{1F929}",
                score: 9,
                pixabay_query: "fireworks sky",
            },
            Mood::Happy => &MoodDefinition {
                id: "happy",
                label: "Happy",
                emoji: "\u{1F60A}",
                score: 8,
                pixabay_query: "sunshine field",
            },
            Mood::Content => &MoodDefinition {
                id: "content",
                label: "Content",
                emoji: "\u{1F60C}",
                score: 7,
                pixabay_query: "cozy coffee",
            },
            Mood::Calm => &MoodDefinition {
                id: "calm",
                label: "Calm",
                emoji: "\u{1F9D8}",
                score: 6,
                pixabay_query: "calm lake",
            },
            Mood::Neutral => &MoodDefinition {
                id: "neutral",
                label: "Neutral",
                emoji: "\u{1F610}",
                score: 5,
                pixabay_query: "plain landscape",
            },
            Mood::Tired => &MoodDefinition {
                id: "tired",
                label: "Tired",
                emoji: "\u{1F634}",
                score: 4,
                pixabay_query: "quiet evening",
            },
            Mood::Anxious => &MoodDefinition {
                id: "anxious",
                label: "Anxious",
                emoji: "\u{1F630}",
                score: 3,
                pixabay_query: "storm clouds",
            },
            Mood::Sad => &MoodDefinition {
                id: "sad",
                label: "Sad",
                emoji: "\u{1F622}",
                score: 3,
                pixabay_query: "rain window",
            },
            Mood::Frustrated => &MoodDefinition {
                id: "frustrated",
                label: "Frustrated",
                emoji: "\u{1F624}",
                score: 2,
                pixabay_query: "tangled rope",
            },
            Mood::Angry => &MoodDefinition {
                id: "angry",
                label: "Angry",
                emoji: "\u{1F620}",
                score: 2,
                pixabay_query: "lightning storm",
            },
            Mood::Devastated => &MoodDefinition {
                id: "devastated",
                label: "Devastated",
                emoji: "\u{1F62D}",
                score: 1,
                pixabay_query: "dark clouds",
            },
        }
    }
}

/// Case-insensitive catalog lookup by stored mood id.
pub fn lookup(id: &str) -> Option<&'static MoodDefinition> {
    Mood::from_id(id).map(Mood::def)
}

/// Qualitative band for an average mood score. Boundaries are a fixed
/// table covering the full 1-10 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTrend {
    VeryLow,
    Low,
    Neutral,
    Good,
    Great,
}

impl MoodTrend {
    pub fn for_score(average_score: f64) -> Self {
        if average_score >= 8.0 {
            MoodTrend::Great
        } else if average_score >= 6.0 {
            MoodTrend::Good
        } else if average_score >= 4.0 {
            MoodTrend::Neutral
        } else if average_score >= 2.0 {
            MoodTrend::Low
        } else {
            MoodTrend::VeryLow
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MoodTrend::Great => "You've been feeling great!",
            MoodTrend::Good => "You've been doing well!",
            MoodTrend::Neutral => "You're doing okay",
            MoodTrend::Low => "Things have been tough",
            MoodTrend::VeryLow => "You've been feeling down",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup("happy").unwrap().score, 8);
        assert_eq!(lookup("HAPPY").unwrap().score, 8);
        assert_eq!(lookup("Happy").unwrap().score, 8);
    }

    #[test]
    fn test_lookup_unknown_id_is_none() {
        assert!(lookup("ecstatic").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_ids_are_unique_and_scores_in_range() {
        let mut seen = HashSet::new();
        for mood in Mood::ALL {
            let def = mood.def();
            assert!(seen.insert(def.id), "duplicate mood id {}", def.id);
            assert!((1..=10).contains(&def.score), "score out of range for {}", def.id);
            assert_eq!(def.id, def.id.to_lowercase());
        }
    }

    #[test]
    fn test_trend_band_boundaries() {
        assert_eq!(MoodTrend::for_score(10.0), MoodTrend::Great);
        assert_eq!(MoodTrend::for_score(8.0), MoodTrend::Great);
        assert_eq!(MoodTrend::for_score(7.9), MoodTrend::Good);
        assert_eq!(MoodTrend::for_score(6.0), MoodTrend::Good);
        assert_eq!(MoodTrend::for_score(5.9), MoodTrend::Neutral);
        assert_eq!(MoodTrend::for_score(4.0), MoodTrend::Neutral);
        assert_eq!(MoodTrend::for_score(3.9), MoodTrend::Low);
        assert_eq!(MoodTrend::for_score(2.0), MoodTrend::Low);
        assert_eq!(MoodTrend::for_score(1.9), MoodTrend::VeryLow);
        assert_eq!(MoodTrend::for_score(1.0), MoodTrend::VeryLow);
    }
}
