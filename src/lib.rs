//! Per-topic knowledge tracking for multiple-choice quizzes.
//!
//! Answers are fed into a [`store::KnowledgeStore`], which keeps one Bayesian
//! Knowledge Tracing estimate per topic. Topics are inferred from question text
//! by [`topic::extract_topic`].

pub mod bkt;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod quiz;
pub mod store;
pub mod topic;

pub use error::{Error, Result};
