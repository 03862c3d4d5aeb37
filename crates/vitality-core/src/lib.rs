//! # vitality-core
//!
//! Deterministic building blocks of the Vitality scoring pipeline.
//!
//! This crate owns everything that does not talk to a language model:
//! - the static questionnaires (general quiz and habits quiz)
//! - recorded answers and answer files
//! - the five personal-development metrics and their rubrics
//! - rendering answers into a prompt context block
//! - the weighted fallback scorer
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same answers always produce the same context and scores
//! 2. **No LLM calls**: Model-backed scoring lives in `vitality-runtime`
//! 3. **Total**: Scoring functions never fail, scores are always in 0..=100
//!
//! ## Example
//!
//! ```rust,ignore
//! use vitality_core::{build_context, fallback_score, AnswerSheet, Metric};
//!
//! let sheet = AnswerSheet::from_file("answers.yaml")?;
//! let context = build_context(sheet.quiz.as_slice(), sheet.habits.as_slice());
//! let focus = fallback_score(Metric::Focus, sheet.quiz.as_slice(), sheet.habits.as_slice());
//! ```

pub mod answers;
pub mod context;
pub mod fallback;
pub mod metrics;
pub mod questions;

// Re-export main types at crate root
pub use answers::{Answer, AnswerError, AnswerSet, AnswerSheet, AnswerValue};
pub use context::build_context;
pub use fallback::{fallback_score, fallback_scores, MetricWeights};
pub use metrics::{Metric, MetricScoreMap, RubricTier, ScoringCriteria};
pub use questions::{
    Question, QuestionKind, Questionnaire, HABITS_QUESTIONS, QUIZ_QUESTIONS,
    SCREEN_TIME_QUESTION_ID, WAKE_UP_QUESTION_ID,
};
