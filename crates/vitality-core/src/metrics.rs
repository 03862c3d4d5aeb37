//! The five personal-development metrics and their score map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A personal-development dimension scored from 0 to 100.
///
/// Variant order is the fixed scoring order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Wisdom,
    Strength,
    Focus,
    Confidence,
    Discipline,
}

/// One band of a scoring rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RubricTier {
    pub min: u8,
    pub max: u8,
    pub description: &'static str,
}

/// Three-tier rubric handed to the model with each scoring request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoringCriteria {
    pub high: RubricTier,
    pub medium: RubricTier,
    pub low: RubricTier,
}

impl ScoringCriteria {
    /// Tiers from highest to lowest, with their display names.
    pub fn tiers(&self) -> [(&'static str, &RubricTier); 3] {
        [("High", &self.high), ("Medium", &self.medium), ("Low", &self.low)]
    }
}

const fn tier(min: u8, max: u8, description: &'static str) -> RubricTier {
    RubricTier {
        min,
        max,
        description,
    }
}

impl Metric {
    /// All metrics in scoring order.
    pub const ALL: [Metric; 5] = [
        Metric::Wisdom,
        Metric::Strength,
        Metric::Focus,
        Metric::Confidence,
        Metric::Discipline,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Wisdom => "wisdom",
            Metric::Strength => "strength",
            Metric::Focus => "focus",
            Metric::Confidence => "confidence",
            Metric::Discipline => "discipline",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Metric::Wisdom => {
                "Curiosity, continuous learning and reflective habits such as reading and mindfulness."
            }
            Metric::Strength => {
                "Physical health and energy: exercise, sleep, hydration and nutrition."
            }
            Metric::Focus => {
                "Ability to concentrate on one task, resist distraction and manage screen time."
            }
            Metric::Confidence => {
                "Self-assurance in expressing opinions, energy in social settings and self-care."
            }
            Metric::Discipline => {
                "Consistency in following plans and routines, including an early and regular start to the day."
            }
        }
    }

    pub fn criteria(self) -> ScoringCriteria {
        match self {
            Metric::Wisdom => ScoringCriteria {
                high: tier(80, 100, "Learns something new daily, reads and reflects regularly"),
                medium: tier(50, 79, "Learns occasionally, some reading or reflection"),
                low: tier(0, 49, "Rarely reads, learns or reflects"),
            },
            Metric::Strength => ScoringCriteria {
                high: tier(80, 100, "Exercises most days, sleeps 7+ hours, eats and hydrates well"),
                medium: tier(50, 79, "Exercises a few times a week, mostly adequate sleep and diet"),
                low: tier(0, 49, "Little exercise, poor sleep or poor nutrition"),
            },
            Metric::Focus => ScoringCriteria {
                high: tier(80, 100, "Sustains deep work for an hour or more, low leisure screen time"),
                medium: tier(50, 79, "Focuses with some distraction, moderate screen time"),
                low: tier(0, 49, "Easily distracted, heavy leisure screen time"),
            },
            Metric::Confidence => ScoringCriteria {
                high: tier(80, 100, "Speaks up readily, high energy, takes care of self"),
                medium: tier(50, 79, "Speaks up in familiar settings, average energy"),
                low: tier(0, 49, "Avoids sharing opinions, low energy"),
            },
            Metric::Discipline => ScoringCriteria {
                high: tier(80, 100, "Reliably follows plans, wakes early, keeps routines"),
                medium: tier(50, 79, "Follows most plans, somewhat regular routine"),
                low: tier(0, 49, "Rarely follows through, irregular routine and late starts"),
            },
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Score for every metric, each in 0..=100.
///
/// The map can only be built with a value for every metric, so lookups are
/// infallible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Metric, u8>", into = "BTreeMap<Metric, u8>")]
pub struct MetricScoreMap {
    scores: BTreeMap<Metric, u8>,
}

impl MetricScoreMap {
    /// Build a map by computing each metric's score in scoring order.
    ///
    /// Values above 100 are clamped.
    pub fn from_fn(mut score: impl FnMut(Metric) -> u8) -> Self {
        let scores = Metric::ALL
            .into_iter()
            .map(|metric| (metric, score(metric).min(100)))
            .collect();
        Self { scores }
    }

    pub fn get(&self, metric: Metric) -> u8 {
        self.scores.get(&metric).copied().unwrap_or_default()
    }

    /// Overwrite one metric's score, clamping to 100.
    pub fn set(&mut self, metric: Metric, score: u8) {
        self.scores.insert(metric, score.min(100));
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, u8)> + '_ {
        self.scores.iter().map(|(m, s)| (*m, *s))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl TryFrom<BTreeMap<Metric, u8>> for MetricScoreMap {
    type Error = String;

    fn try_from(scores: BTreeMap<Metric, u8>) -> Result<Self, Self::Error> {
        if let Some(missing) = Metric::ALL.iter().find(|m| !scores.contains_key(m)) {
            return Err(format!("missing score for metric '{}'", missing));
        }
        Ok(Self::from_fn(|metric| scores[&metric]))
    }
}

impl From<MetricScoreMap> for BTreeMap<Metric, u8> {
    fn from(map: MetricScoreMap) -> Self {
        map.scores
    }
}
