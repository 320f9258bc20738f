//! Question definitions and the per-type answer validator.
//!
//! Game definitions are authored outside of this service and registered
//! read-only through the catalog routes; the session core only ever inspects
//! them to validate candidate answers and feed the scoring engine.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Immutable quiz definition a session is created from.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameDefinition {
    /// Join code identifying the game.
    pub id: String,
    /// Display title of the quiz.
    pub title: String,
    /// Ordered question list driven by the host.
    pub questions: Vec<Question>,
}

/// A single timed question.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Question {
    /// Stable identifier, unique within the game.
    pub id: Uuid,
    /// Prompt shown to players.
    pub text: String,
    /// Base points awarded for an instant correct answer.
    pub points: u32,
    /// Answer window in seconds.
    pub time_limit_secs: u32,
    /// Type-specific options and correct-answer set.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Question type together with its strongly-typed correct-answer shape.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// One correct option among several.
    SingleChoice {
        /// Displayed answer options.
        options: Vec<String>,
        /// Index of the correct option.
        correct: usize,
    },
    /// Several correct options; exact set equality is required.
    MultiSelect {
        /// Displayed answer options.
        options: Vec<String>,
        /// Indices of every correct option.
        correct: BTreeSet<usize>,
    },
    /// Boolean statement.
    TrueFalse {
        /// Whether the statement is true.
        correct: bool,
    },
    /// Free-form text compared case-insensitively after trimming.
    FreeText {
        /// Accepted spellings of the answer.
        accepted: Vec<String>,
    },
}

/// A player's submitted answer, tagged by shape.
///
/// `Empty` is what a client auto-submit sends when the countdown expires
/// before the player picked anything; it is always incorrect but still
/// occupies the one answer slot for the question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CandidateAnswer {
    /// Single option index (single-choice questions).
    Choice {
        /// Selected option index.
        index: usize,
    },
    /// Set of option indices (multi-select questions).
    Selection {
        /// Selected option indices.
        indices: BTreeSet<usize>,
    },
    /// Boolean pick (true/false questions).
    Boolean {
        /// Selected truth value.
        value: bool,
    },
    /// Free-text entry.
    Text {
        /// Raw text as typed; trimmed before comparison.
        value: String,
    },
    /// Nothing selected before the countdown expired.
    Empty,
}

impl Question {
    /// Decide whether `candidate` answers this question correctly.
    ///
    /// A candidate whose shape does not match the question type (including
    /// the explicit [`CandidateAnswer::Empty`]) is incorrect rather than an
    /// error: the submission is still recorded, it just scores zero.
    pub fn is_correct(&self, candidate: &CandidateAnswer) -> bool {
        match (&self.kind, candidate) {
            (QuestionKind::SingleChoice { correct, .. }, CandidateAnswer::Choice { index }) => {
                index == correct
            }
            (
                QuestionKind::MultiSelect { correct, .. },
                CandidateAnswer::Selection { indices },
            ) => indices == correct,
            (QuestionKind::TrueFalse { correct }, CandidateAnswer::Boolean { value }) => {
                value == correct
            }
            (QuestionKind::FreeText { accepted }, CandidateAnswer::Text { value }) => {
                let normalized = normalize_text(value);
                accepted
                    .iter()
                    .any(|candidate| normalize_text(candidate) == normalized)
            }
            _ => false,
        }
    }

    /// Reject malformed definitions before they enter the catalog.
    pub fn check(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("question text must not be empty".into());
        }
        if self.time_limit_secs == 0 {
            return Err("question time limit must be strictly positive".into());
        }
        match &self.kind {
            QuestionKind::SingleChoice { options, correct } => {
                if options.len() < 2 {
                    return Err("single-choice questions need at least two options".into());
                }
                if *correct >= options.len() {
                    return Err(format!(
                        "correct index {correct} is out of range for {} options",
                        options.len()
                    ));
                }
            }
            QuestionKind::MultiSelect { options, correct } => {
                if options.len() < 2 {
                    return Err("multi-select questions need at least two options".into());
                }
                if correct.is_empty() {
                    return Err("multi-select questions need at least one correct index".into());
                }
                if let Some(out_of_range) = correct.iter().find(|index| **index >= options.len()) {
                    return Err(format!(
                        "correct index {out_of_range} is out of range for {} options",
                        options.len()
                    ));
                }
            }
            QuestionKind::TrueFalse { .. } => {}
            QuestionKind::FreeText { accepted } => {
                if accepted.iter().all(|entry| entry.trim().is_empty()) {
                    return Err("free-text questions need at least one accepted answer".into());
                }
            }
        }
        Ok(())
    }
}

fn normalize_text(value: &str) -> String {
    value.trim().to_lowercase()
}
