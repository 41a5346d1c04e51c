use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

use crate::bkt::{self, BktParameters};
use crate::error::Result;
use crate::models::{Level, MasteryUpdate, Snapshot, TopicRecord, TopicSummary};

/// Session-scoped knowledge state for a single learner.
///
/// Topic records are created lazily the first time a topic is referenced and
/// live until the store is dropped. Keys are trimmed and lowercased.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    params: BktParameters,
    topics: BTreeMap<String, TopicRecord>,
    total_questions: u32,
    answered_correctly: u32,
    overall_mastery: f64,
    started_at: DateTime<Utc>,
}

impl KnowledgeStore {
    pub fn new(params: BktParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            topics: BTreeMap::new(),
            total_questions: 0,
            answered_correctly: 0,
            overall_mastery: 0.0,
            started_at: Utc::now(),
        })
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    pub fn answered_correctly(&self) -> u32 {
        self.answered_correctly
    }

    /// Unweighted mean of every topic's mastery, 0 when there are no topics.
    pub fn overall_mastery(&self) -> f64 {
        self.overall_mastery
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn get(&self, topic: &str) -> Option<&TopicRecord> {
        self.topics.get(&normalize_key(topic))
    }

    /// Records in topic-name order.
    pub fn topics(&self) -> impl Iterator<Item = &TopicRecord> {
        self.topics.values()
    }

    /// Returns the record for `topic`, creating it at the prior if absent.
    /// Existing records are left untouched.
    pub fn ensure_topic(&mut self, topic: &str) -> &TopicRecord {
        let key = normalize_key(topic);
        if !self.topics.contains_key(&key) {
            debug!(topic = %key, prior = self.params.prior, "initializing topic");
            self.topics
                .insert(key.clone(), TopicRecord::new(key.clone(), self.params.prior));
            self.recompute_overall();
        }
        &self.topics[&key]
    }

    /// Applies one answer to `topic` and returns its new mastery and level.
    pub fn update_mastery(&mut self, topic: &str, is_correct: bool) -> MasteryUpdate {
        let key = normalize_key(topic);
        let prior = self.params.prior;
        let record = self
            .topics
            .entry(key.clone())
            .or_insert_with(|| TopicRecord::new(key.clone(), prior));

        record.attempts += 1;
        if is_correct {
            record.correct += 1;
        }

        let before = record.mastery;
        let step = bkt::step(&self.params, before, is_correct);
        record.mastery = step.mastery;
        record.last_answered = Some(Utc::now());

        let level = Level::classify(step.mastery);
        debug!(
            topic = %key,
            is_correct,
            before,
            evidence = step.evidence,
            after = step.mastery,
            level = level.label(),
            "mastery updated"
        );

        self.total_questions += 1;
        if is_correct {
            self.answered_correctly += 1;
        }
        self.recompute_overall();

        MasteryUpdate {
            mastery: step.mastery,
            level,
            evidence: step.evidence,
        }
    }

    /// Score and per-topic view, strongest topics first.
    pub fn snapshot(&self) -> Snapshot {
        let overall_percent = if self.total_questions == 0 {
            0
        } else {
            (self.answered_correctly as f64 / self.total_questions as f64 * 100.0).round() as u32
        };

        let mut ranked: Vec<&TopicRecord> = self.topics.values().collect();
        ranked.sort_by(|a, b| {
            b.mastery
                .total_cmp(&a.mastery)
                .then_with(|| a.topic.cmp(&b.topic))
        });

        let per_topic = ranked
            .into_iter()
            .map(|r| TopicSummary {
                topic: r.topic.clone(),
                mastery_percent: to_percent(r.mastery),
                level: r.level(),
                attempts: r.attempts,
                success_percent: r.success_rate().round() as u32,
            })
            .collect();

        Snapshot {
            overall_percent,
            overall_mastery_percent: to_percent(self.overall_mastery),
            total_questions: self.total_questions,
            answered_correctly: self.answered_correctly,
            per_topic,
        }
    }

    // Stochastic selection: weaker topics are more likely to come up
    pub fn recommend_topic<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&TopicRecord> {
        if self.topics.is_empty() {
            return None;
        }

        let weights: Vec<f64> = self.topics.values().map(|r| 1.0 - r.mastery).collect();
        let total_weight: f64 = weights.iter().sum();
        if total_weight <= 0.0 {
            return self.topics.values().next();
        }

        let mut random_point = rng.gen::<f64>() * total_weight;
        for (record, weight) in self.topics.values().zip(&weights) {
            random_point -= weight;
            if random_point <= 0.0 {
                return Some(record);
            }
        }

        // Rounding can leave a sliver past the last weight
        self.topics.values().last()
    }

    fn recompute_overall(&mut self) {
        self.overall_mastery = if self.topics.is_empty() {
            0.0
        } else {
            self.topics.values().map(|r| r.mastery).sum::<f64>() / self.topics.len() as f64
        };
    }
}

fn normalize_key(topic: &str) -> String {
    topic.trim().to_lowercase()
}

fn to_percent(p: f64) -> u32 {
    (p * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f64 = 1e-4;

    fn setup_store() -> KnowledgeStore {
        KnowledgeStore::new(BktParameters::new(0.3, 0.1, 0.2, 0.1).unwrap())
            .expect("valid parameters")
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn starts_empty() {
            let store = setup_store();
            assert!(store.is_empty());
            assert_eq!(store.total_questions(), 0);
            assert_eq!(store.answered_correctly(), 0);
            assert_eq!(store.overall_mastery(), 0.0);
        }

        #[test]
        fn rejects_invalid_parameters() {
            let params = BktParameters {
                slip: 0.0,
                ..BktParameters::default()
            };
            let err = KnowledgeStore::new(params).unwrap_err();
            assert!(matches!(err, Error::Configuration { name: "slip", .. }));
        }
    }

    mod ensure_topic_tests {
        use super::*;

        #[test]
        fn creates_at_prior() {
            let mut store = setup_store();
            let r = store.ensure_topic("recursion");
            assert_eq!(r.mastery, 0.3);
            assert_eq!(r.attempts, 0);
            assert_eq!(store.len(), 1);
            assert!((store.overall_mastery() - 0.3).abs() < EPS);
        }

        #[test]
        fn is_idempotent() {
            let mut store = setup_store();
            store.update_mastery("recursion", true);
            store.update_mastery("recursion", false);
            let before = store.get("recursion").unwrap().clone();

            let after = store.ensure_topic("recursion").clone();
            assert_eq!(after.attempts, before.attempts);
            assert_eq!(after.correct, before.correct);
            assert_eq!(after.mastery, before.mastery);
            assert_eq!(store.len(), 1);
        }

        #[test]
        fn keys_are_case_normalized() {
            let mut store = setup_store();
            store.ensure_topic("Recursion");
            store.ensure_topic("  recursion ");
            assert_eq!(store.len(), 1);
            assert!(store.get("RECURSION").is_some());
            assert_eq!(store.get("recursion").unwrap().topic, "recursion");
        }
    }

    mod update_tests {
        use super::*;

        #[test]
        fn first_correct_answer_scenario() {
            let mut store = setup_store();
            let update = store.update_mastery("recursion", true);
            assert!((update.evidence - 0.6585).abs() < EPS);
            assert!((update.mastery - 0.6927).abs() < EPS);
            assert_eq!(update.level, Level::Intermediate);
        }

        #[test]
        fn second_correct_answer_reaches_advanced() {
            let mut store = setup_store();
            store.update_mastery("recursion", true);
            let update = store.update_mastery("recursion", true);
            assert!(update.mastery > 0.8);
            assert_eq!(update.level, Level::Advanced);
        }

        #[test]
        fn incorrect_answer_lowers_mastery_from_prior() {
            let mut store = setup_store();
            let update = store.update_mastery("recursion", false);
            assert!(update.mastery < 0.3);
            assert_eq!(update.level, Level::Beginner);
        }

        #[test]
        fn counts_attempts_and_correct() {
            let mut store = setup_store();
            store.update_mastery("recursion", true);
            store.update_mastery("recursion", false);
            store.update_mastery("closures", true);

            let r = store.get("recursion").unwrap();
            assert_eq!(r.attempts, 2);
            assert_eq!(r.correct, 1);
            assert!(r.last_answered.is_some());
            assert_eq!(store.total_questions(), 3);
            assert_eq!(store.answered_correctly(), 2);
        }

        #[test]
        fn unanswered_topics_keep_prior() {
            let mut store = setup_store();
            store.ensure_topic("closures");
            store.update_mastery("recursion", true);
            assert_eq!(store.get("closures").unwrap().mastery, 0.3);
        }

        #[test]
        fn overall_is_plain_mean() {
            let mut store = setup_store();
            store.ensure_topic("closures");
            let update = store.update_mastery("recursion", true);
            let expected = (update.mastery + 0.3) / 2.0;
            assert!((store.overall_mastery() - expected).abs() < 1e-12);
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn empty_snapshot() {
            let store = setup_store();
            let snap = store.snapshot();
            assert_eq!(snap.overall_percent, 0);
            assert_eq!(snap.overall_mastery_percent, 0);
            assert!(snap.per_topic.is_empty());
        }

        #[test]
        fn overall_percent_is_rounded_score() {
            let mut store = setup_store();
            store.update_mastery("a1b2", true);
            store.update_mastery("a1b2", true);
            store.update_mastery("a1b2", false);
            // 2 / 3 = 66.67
            assert_eq!(store.snapshot().overall_percent, 67);
        }

        #[test]
        fn sorted_by_mastery_then_name() {
            let mut store = setup_store();
            store.ensure_topic("zeta");
            store.ensure_topic("alpha");
            store.update_mastery("middle", true);
            store.update_mastery("weak", false);

            let names: Vec<_> = store
                .snapshot()
                .per_topic
                .into_iter()
                .map(|t| t.topic)
                .collect();
            assert_eq!(names, vec!["middle", "alpha", "zeta", "weak"]);
        }

        #[test]
        fn success_percent_counts_correct_answers() {
            let mut store = setup_store();
            store.update_mastery("lifetimes", true);
            store.update_mastery("lifetimes", false);
            store.update_mastery("lifetimes", true);
            store.ensure_topic("traits");

            let snap = store.snapshot();
            let by_name = |name: &str| {
                snap.per_topic
                    .iter()
                    .find(|t| t.topic == name)
                    .map(|t| t.success_percent)
            };
            // 2 / 3 = 66.67
            assert_eq!(by_name("lifetimes"), Some(67));
            assert_eq!(by_name("traits"), Some(0));
        }

        #[test]
        fn summary_fields() {
            let mut store = setup_store();
            store.update_mastery("recursion", true);
            let snap = store.snapshot();
            let t = &snap.per_topic[0];
            assert_eq!(t.topic, "recursion");
            assert_eq!(t.mastery_percent, 69);
            assert_eq!(t.level, Level::Intermediate);
            assert_eq!(t.attempts, 1);
            assert_eq!(t.success_percent, 100);
            assert_eq!(snap.total_questions, 1);
            assert_eq!(snap.answered_correctly, 1);
        }
    }

    mod recommend_tests {
        use super::*;

        #[test]
        fn empty_store_recommends_nothing() {
            let store = setup_store();
            let mut rng = StdRng::seed_from_u64(7);
            assert!(store.recommend_topic(&mut rng).is_none());
        }

        #[test]
        fn single_topic_is_always_recommended() {
            let mut store = setup_store();
            store.ensure_topic("recursion");
            let mut rng = StdRng::seed_from_u64(7);
            for _ in 0..20 {
                assert_eq!(store.recommend_topic(&mut rng).unwrap().topic, "recursion");
            }
        }

        #[test]
        fn weaker_topic_is_favoured() {
            let mut store = setup_store();
            for _ in 0..6 {
                store.update_mastery("strong", true);
                store.update_mastery("weak", false);
            }
            let mut rng = StdRng::seed_from_u64(42);
            let weak_picks = (0..500)
                .filter(|_| store.recommend_topic(&mut rng).unwrap().topic == "weak")
                .count();
            assert!(weak_picks > 250, "weak picked {} times", weak_picks);
        }
    }

    proptest! {
        #[test]
        fn aggregates_stay_consistent(
            answers in proptest::collection::vec((0usize..4, any::<bool>()), 0..60),
        ) {
            let names = ["recursion", "closures", "ownership", "lifetimes"];
            let mut store = setup_store();
            for (idx, correct) in answers {
                let update = store.update_mastery(names[idx], correct);
                prop_assert!(update.mastery > 0.0 && update.mastery < 1.0);
                prop_assert!(update.mastery >= update.evidence);

                let mean = store.topics().map(|r| r.mastery).sum::<f64>() / store.len() as f64;
                prop_assert!((store.overall_mastery() - mean).abs() < 1e-12);
                prop_assert!(store.answered_correctly() <= store.total_questions());
                for r in store.topics() {
                    prop_assert!(r.correct <= r.attempts);
                }
            }
        }
    }
}
