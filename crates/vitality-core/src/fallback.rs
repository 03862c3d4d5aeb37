//! Deterministic fallback scoring.
//!
//! Used whenever the model-backed path cannot produce a score. Each metric
//! has one weight table per questionnaire; answers to weighted questions are
//! turned into a 0-4 ordinal and averaged on a 0-100 scale.

use lazy_static::lazy_static;
use regex::Regex;

use crate::answers::{Answer, AnswerValue};
use crate::metrics::{Metric, MetricScoreMap};
use crate::questions::{SCREEN_TIME_QUESTION_ID, WAKE_UP_QUESTION_ID};

/// Score used when no answer carries weight for a metric.
pub const BASE_SCORE: f64 = 50.0;

/// Points per ordinal step.
const POINTS_PER_STEP: f64 = 25.0;

lazy_static! {
    /// Leading integer of a text answer ("3 hours" -> 3).
    static ref LEADING_INTEGER: Regex = Regex::new(r"^\s*([+-]?\d+)").unwrap();
}

/// Per-metric question weights, keyed by question id.
#[derive(Debug, Clone, Copy)]
pub struct MetricWeights {
    pub quiz: &'static [(u32, f64)],
    pub habits: &'static [(u32, f64)],
}

impl MetricWeights {
    pub fn for_metric(metric: Metric) -> Self {
        match metric {
            Metric::Wisdom => Self {
                quiz: &[(2, 1.5), (4, 0.5)],
                habits: &[(6, 1.0), (7, 1.5)],
            },
            Metric::Strength => Self {
                quiz: &[(1, 1.0), (3, 1.5)],
                habits: &[(2, 1.0), (4, 1.5), (5, 0.5), (8, 1.0)],
            },
            Metric::Focus => Self {
                quiz: &[(1, 0.5), (4, 1.5)],
                habits: &[(1, 0.5), (2, 1.0), (3, 1.5), (6, 1.0)],
            },
            Metric::Confidence => Self {
                quiz: &[(1, 0.5), (5, 1.5)],
                habits: &[(4, 0.5), (8, 0.5)],
            },
            Metric::Discipline => Self {
                quiz: &[(3, 0.5), (6, 1.5)],
                habits: &[(1, 1.5), (3, 1.0), (4, 1.0)],
            },
        }
    }
}

fn weight_of(table: &[(u32, f64)], question_id: u32) -> Option<f64> {
    table
        .iter()
        .find(|(id, _)| *id == question_id)
        .map(|(_, w)| *w)
}

/// Ordinal value of an answer: numbers as-is, text by its leading integer,
/// anything else 0.
fn ordinal(value: &AnswerValue) -> f64 {
    match value {
        AnswerValue::Number(n) if n.is_finite() => *n,
        AnswerValue::Number(_) => 0.0,
        AnswerValue::Text(s) => LEADING_INTEGER
            .captures(s)
            .and_then(|caps| caps[1].parse::<f64>().ok())
            .unwrap_or(0.0),
    }
}

/// Questions where a lower raw answer is the healthier one.
fn is_reversed_habit(question_id: u32) -> bool {
    question_id == WAKE_UP_QUESTION_ID || question_id == SCREEN_TIME_QUESTION_ID
}

/// Compute the deterministic score for one metric.
///
/// Pure and total: identical answers always give the identical score, which
/// is always within 0..=100.
pub fn fallback_score(metric: Metric, quiz: &[Answer], habits: &[Answer]) -> u8 {
    let weights = MetricWeights::for_metric(metric);

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for answer in quiz {
        if let Some(weight) = weight_of(weights.quiz, answer.question_id) {
            weighted_sum += ordinal(&answer.answer) * POINTS_PER_STEP * weight;
            total_weight += weight;
        }
    }

    for answer in habits {
        if let Some(weight) = weight_of(weights.habits, answer.question_id) {
            let raw = ordinal(&answer.answer);
            let value = if is_reversed_habit(answer.question_id) {
                5.0 - raw
            } else {
                raw
            };
            weighted_sum += value * POINTS_PER_STEP * weight;
            total_weight += weight;
        }
    }

    let score = if total_weight > 0.0 {
        // Round half up
        (weighted_sum / total_weight + 0.5).floor()
    } else {
        BASE_SCORE
    };

    score.clamp(0.0, 100.0) as u8
}

/// Fallback scores for every metric.
pub fn fallback_scores(quiz: &[Answer], habits: &[Answer]) -> MetricScoreMap {
    MetricScoreMap::from_fn(|metric| fallback_score(metric, quiz, habits))
}
