use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bkt::BktParameters;
use crate::error::{Error, Result};
use crate::models::{Level, MasteryUpdate, Snapshot};
use crate::store::KnowledgeStore;
use crate::topic::extract_topic;

pub const DEFAULT_CORRECT: &str = "A";
pub const DEFAULT_HINT: &str = "Try reviewing the information again.";
const PLACEHOLDER_LETTERS: [&str; 4] = ["A", "B", "C", "D"];
const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// A question as it arrives from the chat backend, any field possibly absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub correct: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// A fully-populated question, safe to present and grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub text: String,
    /// Option letter to option text, in letter order
    pub options: BTreeMap<String, String>,
    pub correct: String,
    pub hint: String,
    pub topic: String,
}

// Defaults substituted during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Repair {
    PlaceholderOptions,
    DefaultCorrect,
    DefaultHint,
}

impl Repair {
    pub fn as_str(&self) -> &'static str {
        match self {
            Repair::PlaceholderOptions => "placeholder_options",
            Repair::DefaultCorrect => "default_correct",
            Repair::DefaultHint => "default_hint",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized {
    pub question: Question,
    pub repairs: Vec<Repair>,
}

impl Question {
    /// Turns a raw question into a presentable one.
    ///
    /// Missing options, answer letter, or hint are replaced by defaults and
    /// listed in [`Normalized::repairs`]. A question without any text cannot
    /// be shown and is rejected with [`Error::MalformedQuestion`].
    pub fn normalize(raw: RawQuestion) -> Result<Normalized> {
        let text = raw
            .question
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .ok_or_else(|| Error::MalformedQuestion("missing question text".to_string()))?;

        let mut repairs = Vec::new();

        let options: BTreeMap<String, String> = raw
            .options
            .unwrap_or_default()
            .into_iter()
            .map(|(letter, option)| (letter.trim().to_uppercase(), option.trim().to_string()))
            .filter(|(letter, _)| !letter.is_empty())
            .collect();
        let options = if options.is_empty() {
            repairs.push(Repair::PlaceholderOptions);
            PLACEHOLDER_LETTERS
                .iter()
                .map(|l| (l.to_string(), format!("Option {}", l)))
                .collect()
        } else {
            options
        };

        let correct = match raw.correct.map(|c| c.trim().to_uppercase()) {
            Some(c) if !c.is_empty() => c,
            _ => {
                repairs.push(Repair::DefaultCorrect);
                DEFAULT_CORRECT.to_string()
            }
        };

        let hint = match raw.hint.map(|h| h.trim().to_string()) {
            Some(h) if !h.is_empty() => h,
            _ => {
                repairs.push(Repair::DefaultHint);
                DEFAULT_HINT.to_string()
            }
        };

        for repair in &repairs {
            warn!(question = %text, repair = repair.as_str(), "question repaired");
        }

        let topic = extract_topic(&text);
        Ok(Normalized {
            question: Question {
                text,
                options,
                correct,
                hint,
                topic,
            },
            repairs,
        })
    }

    pub fn is_correct(&self, choice: &str) -> bool {
        choice.trim().eq_ignore_ascii_case(&self.correct)
    }
}

/// Parses the backend's plain-text MCQ format.
///
/// ```text
/// Q: What is the capital of France?
/// A: Berlin
/// B: Madrid
/// C: Paris
/// D: London
/// CORRECT: C
/// HINT: It's known as the "City of Light"
/// ```
///
/// A question is kept only if it has text and at least one option. Fields the
/// text leaves out stay `None` and are filled in by [`Question::normalize`].
pub fn parse_mcq(text: &str) -> Vec<RawQuestion> {
    let mut questions = Vec::new();
    let mut current: Option<RawQuestion> = None;

    for line in text.replace("\r\n", "\n").lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();

        if line.starts_with("Q:") || line.starts_with("Question:") || lower.starts_with("question ")
        {
            if let Some(done) = current.take().filter(is_complete) {
                questions.push(done);
            }
            current = Some(RawQuestion {
                question: Some(after_colon(line).to_string()),
                options: Some(BTreeMap::new()),
                ..RawQuestion::default()
            });
            continue;
        }

        let Some(q) = current.as_mut() else {
            continue;
        };

        if let Some((letter, option)) = parse_option(line) {
            q.options
                .get_or_insert_with(BTreeMap::new)
                .insert(letter.to_string(), option.to_string());
        } else if ["CORRECT:", "Correct:", "ANSWER:", "Answer:"]
            .iter()
            .any(|p| line.starts_with(p))
            || lower.starts_with("correct answer")
            || lower.starts_with("the answer is")
        {
            if let Some(letter) = parse_answer_letter(after_colon(line)) {
                q.correct = Some(letter.to_string());
            }
        } else if line.starts_with("HINT:")
            || line.starts_with("Hint:")
            || lower.starts_with("hint ")
            || lower.starts_with("if wrong")
        {
            q.hint = Some(after_colon(line).to_string());
        }
    }

    if let Some(done) = current.filter(is_complete) {
        questions.push(done);
    }
    if questions.is_empty() {
        warn!("no multiple-choice questions could be parsed");
    }
    questions
}

fn is_complete(q: &RawQuestion) -> bool {
    q.question.as_deref().is_some_and(|t| !t.is_empty())
        && q.options.as_ref().is_some_and(|o| !o.is_empty())
}

// Text after the first colon, or the whole line when there is none
fn after_colon(line: &str) -> &str {
    match line.split_once(':') {
        Some((_, rest)) => rest.trim(),
        None => line,
    }
}

// "A: text", "A. text" or "(A) text"
fn parse_option(line: &str) -> Option<(char, &str)> {
    let mut chars = line.chars();
    let first = chars.next()?;
    if first == '(' {
        let letter = chars.next()?;
        if OPTION_LETTERS.contains(&letter) && chars.next()? == ')' {
            return Some((letter, line[3..].trim()));
        }
        return None;
    }
    let sep = chars.next()?;
    if OPTION_LETTERS.contains(&first) && (sep == ':' || sep == '.') {
        return Some((first, line[2..].trim()));
    }
    None
}

fn parse_answer_letter(answer: &str) -> Option<char> {
    OPTION_LETTERS
        .iter()
        .copied()
        .find(|l| answer.contains(*l))
        .or_else(|| {
            answer
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .filter(|c| OPTION_LETTERS.contains(c))
        })
}

/// Questions that survived normalization, and how many did not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseReport {
    pub questions: Vec<Normalized>,
    pub skipped: usize,
}

pub fn normalize_all(raws: impl IntoIterator<Item = RawQuestion>) -> ParseReport {
    let mut report = ParseReport {
        questions: Vec::new(),
        skipped: 0,
    };
    for raw in raws {
        match Question::normalize(raw) {
            Ok(normalized) => report.questions.push(normalized),
            Err(e) => {
                warn!(error = %e, "skipping question");
                report.skipped += 1;
            }
        }
    }
    report
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionFormat {
    Json,
    Text,
}

impl QuestionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionFormat::Json => "json",
            QuestionFormat::Text => "text",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" | "j" => Some(QuestionFormat::Json),
            "text" | "txt" | "t" | "mcq" => Some(QuestionFormat::Text),
            _ => None,
        }
    }
}

/// Reads raw questions from a JSON array or an MCQ text file.
pub fn read_questions<P: AsRef<Path>>(
    path: P,
    format: QuestionFormat,
) -> Result<Vec<RawQuestion>> {
    let contents = std::fs::read_to_string(path)?;
    match format {
        QuestionFormat::Json => Ok(serde_json::from_str(&contents)?),
        QuestionFormat::Text => Ok(parse_mcq(&contents)),
    }
}

/// One already-graded answer: the question text and whether it was right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub question: String,
    pub correct: bool,
}

pub fn read_evidence<P: AsRef<Path>>(path: P) -> Result<Vec<Evidence>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// What the learner sees after answering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOutcome {
    pub topic: String,
    pub is_correct: bool,
    pub mastery: f64,
    pub level: Level,
    pub feedback: String,
}

/// Drives one learner through a queue of questions.
///
/// Owns the session's [`KnowledgeStore`]; answers are applied one at a time.
/// Questions left unanswered contribute no evidence.
#[derive(Debug, Clone)]
pub struct QuizSession {
    store: KnowledgeStore,
    questions: Vec<Question>,
    skipped: usize,
}

impl QuizSession {
    pub fn new(params: BktParameters) -> Result<Self> {
        let store = KnowledgeStore::new(params)?;
        info!(
            prior = params.prior,
            learn_rate = params.learn_rate,
            guess = params.guess,
            slip = params.slip,
            "quiz session started"
        );
        Ok(Self {
            store,
            questions: Vec::new(),
            skipped: 0,
        })
    }

    /// Normalizes and queues questions, skipping ones that cannot be shown.
    /// Returns how many were queued.
    pub fn load(&mut self, raws: impl IntoIterator<Item = RawQuestion>) -> usize {
        let report = normalize_all(raws);
        let queued = report.questions.len();
        self.skipped += report.skipped;
        self.questions
            .extend(report.questions.into_iter().map(|n| n.question));
        queued
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn answer(&mut self, question: &Question, choice: &str) -> AnswerOutcome {
        let is_correct = question.is_correct(choice);
        let update = self.store.update_mastery(&question.topic, is_correct);
        let feedback = if is_correct {
            "Correct! Well done!".to_string()
        } else {
            format!("Incorrect. {}", question.hint)
        };

        AnswerOutcome {
            topic: question.topic.clone(),
            is_correct,
            mastery: update.mastery,
            level: update.level,
            feedback,
        }
    }

    /// Applies an answer graded elsewhere, inferring the topic from `text`.
    pub fn record(&mut self, text: &str, is_correct: bool) -> MasteryUpdate {
        let topic = extract_topic(text);
        self.store.update_mastery(&topic, is_correct)
    }

    /// Grades the queued question at `index`; None if out of range.
    pub fn answer_at(&mut self, index: usize, choice: &str) -> Option<AnswerOutcome> {
        let question = self.questions.get(index)?.clone();
        Some(self.answer(&question, choice))
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }
}
