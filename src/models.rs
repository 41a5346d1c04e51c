use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Discrete mastery bands shown to the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    /// Lower bounds are inclusive: 80% and up is Advanced, 50% and up Intermediate.
    pub fn classify(mastery: f64) -> Self {
        let percent = mastery * 100.0;
        if percent >= 80.0 {
            Level::Advanced
        } else if percent >= 50.0 {
            Level::Intermediate
        } else {
            Level::Beginner
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "beginner" | "b" => Some(Level::Beginner),
            "intermediate" | "i" => Some(Level::Intermediate),
            "advanced" | "a" => Some(Level::Advanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRecord {
    pub topic: String,
    pub mastery: f64,
    pub attempts: u32,
    pub correct: u32,
    pub last_answered: Option<DateTime<Utc>>,
}

impl TopicRecord {
    pub fn new(topic: impl Into<String>, prior: f64) -> Self {
        Self {
            topic: topic.into(),
            mastery: prior,
            attempts: 0,
            correct: 0,
            last_answered: None,
        }
    }

    pub fn level(&self) -> Level {
        Level::classify(self.mastery)
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            (self.correct as f64 / self.attempts as f64) * 100.0
        }
    }
}

/// What one answer did to its topic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MasteryUpdate {
    pub mastery: f64,
    pub level: Level,
    /// Evidence-only posterior, before the learning transition
    pub evidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSummary {
    pub topic: String,
    pub mastery_percent: u32,
    pub level: Level,
    pub attempts: u32,
    /// Share of this topic's answers that were correct, rounded
    pub success_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub overall_percent: u32,
    pub overall_mastery_percent: u32,
    pub total_questions: u32,
    pub answered_correctly: u32,
    pub per_topic: Vec<TopicSummary>,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod level_tests {
        use super::*;

        #[test]
        fn classify_boundaries() {
            assert_eq!(Level::classify(0.8), Level::Advanced);
            assert_eq!(Level::classify(0.79999), Level::Intermediate);
            assert_eq!(Level::classify(0.5), Level::Intermediate);
            assert_eq!(Level::classify(0.49999), Level::Beginner);
        }

        #[test]
        fn classify_extremes() {
            assert_eq!(Level::classify(0.0), Level::Beginner);
            assert_eq!(Level::classify(1.0), Level::Advanced);
        }

        #[test]
        fn levels_are_ordered() {
            assert!(Level::Beginner < Level::Intermediate);
            assert!(Level::Intermediate < Level::Advanced);
        }

        #[test]
        fn label_returns_correct_strings() {
            assert_eq!(Level::Beginner.label(), "Beginner");
            assert_eq!(Level::Intermediate.label(), "Intermediate");
            assert_eq!(Level::Advanced.label(), "Advanced");
        }

        #[test]
        fn from_str_is_case_insensitive() {
            assert_eq!(Level::from_str("ADVANCED"), Some(Level::Advanced));
            assert_eq!(Level::from_str("i"), Some(Level::Intermediate));
            assert_eq!(Level::from_str("expert"), None);
        }
    }

    mod topic_record_tests {
        use super::*;

        #[test]
        fn new_starts_at_prior() {
            let r = TopicRecord::new("recursion", 0.3);
            assert_eq!(r.topic, "recursion");
            assert_eq!(r.mastery, 0.3);
            assert_eq!(r.attempts, 0);
            assert_eq!(r.correct, 0);
            assert!(r.last_answered.is_none());
            assert_eq!(r.level(), Level::Beginner);
        }

        #[test]
        fn success_rate_zero_attempts() {
            let r = TopicRecord::new("x", 0.3);
            assert_eq!(r.success_rate(), 0.0);
        }

        #[test]
        fn success_rate_partial() {
            let mut r = TopicRecord::new("x", 0.3);
            r.attempts = 4;
            r.correct = 3;
            assert_eq!(r.success_rate(), 75.0);
        }
    }

    mod json_output_tests {
        use super::*;

        #[test]
        fn serializes_ok_correctly() {
            let output = JsonOutput::ok("test");
            let json = serde_json::to_string(&output).unwrap();
            assert!(json.contains("\"success\":true"));
            assert!(json.contains("\"data\":\"test\""));
            assert!(json.contains("\"error\":null"));
        }

        #[test]
        fn serializes_err_correctly() {
            let output = JsonOutput::<()>::err("error");
            let json = serde_json::to_string(&output).unwrap();
            assert!(json.contains("\"success\":false"));
            assert!(json.contains("\"data\":null"));
            assert!(json.contains("\"error\":\"error\""));
        }

        #[test]
        fn level_serializes_as_variant_name() {
            let json = serde_json::to_string(&Level::Intermediate).unwrap();
            assert_eq!(json, "\"Intermediate\"");
        }
    }
}
