//! Static questionnaire reference data.
//!
//! Both questionnaires are compiled in and read-only. Question order here is
//! the order used when rendering the context block, independent of the order
//! in which the user answered.

use serde::Serialize;

/// Habits question asking when the user wakes up. Lower answers are better.
pub const WAKE_UP_QUESTION_ID: u32 = 1;

/// Habits question asking about daily leisure screen time. Lower answers are better.
pub const SCREEN_TIME_QUESTION_ID: u32 = 3;

/// How a question is presented and what its answers look like.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Discrete rating, optionally with a label per step
    Scale {
        min: u8,
        max: u8,
        labels: &'static [&'static str],
    },

    /// Pick one option; answers are stored as the option index
    MultipleChoice { options: &'static [&'static str] },

    /// Free text
    Text,

    /// Continuous-looking range with labelled stops
    Slider {
        min: u8,
        max: u8,
        labels: &'static [&'static str],
    },
}

/// A single compiled-in question.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Question {
    pub id: u32,
    pub prompt: &'static str,
    pub kind: QuestionKind,
}

impl Question {
    /// Ordered display labels, empty when the question has none.
    pub fn labels(&self) -> &'static [&'static str] {
        match self.kind {
            QuestionKind::Scale { labels, .. } | QuestionKind::Slider { labels, .. } => labels,
            QuestionKind::MultipleChoice { options } => options,
            QuestionKind::Text => &[],
        }
    }
}

/// The two questionnaires a user fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Questionnaire {
    Quiz,
    Habits,
}

impl Questionnaire {
    /// Questions in presentation order.
    pub fn questions(self) -> &'static [Question] {
        match self {
            Questionnaire::Quiz => QUIZ_QUESTIONS,
            Questionnaire::Habits => HABITS_QUESTIONS,
        }
    }

    /// Prefix used for this questionnaire's lines in the context block.
    pub fn line_prefix(self) -> &'static str {
        match self {
            Questionnaire::Quiz => "Quiz",
            Questionnaire::Habits => "Habits",
        }
    }

    /// Look up a question by id.
    pub fn question(self, id: u32) -> Option<&'static Question> {
        self.questions().iter().find(|q| q.id == id)
    }
}

const AGREEMENT: &[&str] = &[
    "Strongly disagree",
    "Disagree",
    "Neutral",
    "Agree",
    "Strongly agree",
];

/// General wellness quiz.
pub static QUIZ_QUESTIONS: &[Question] = &[
    Question {
        id: 1,
        prompt: "How would you rate your overall energy during a typical day?",
        kind: QuestionKind::Scale {
            min: 1,
            max: 5,
            labels: &["Very low", "Low", "Moderate", "High", "Very high"],
        },
    },
    Question {
        id: 2,
        prompt: "How often do you read or learn something new?",
        kind: QuestionKind::MultipleChoice {
            options: &["Never", "Rarely", "Monthly", "Weekly", "Daily"],
        },
    },
    Question {
        id: 3,
        prompt: "How many days per week do you do physical exercise?",
        kind: QuestionKind::Slider {
            min: 0,
            max: 7,
            labels: &[],
        },
    },
    Question {
        id: 4,
        prompt: "I can stay focused on a single task for an hour without distraction.",
        kind: QuestionKind::Scale {
            min: 1,
            max: 5,
            labels: AGREEMENT,
        },
    },
    Question {
        id: 5,
        prompt: "I feel comfortable sharing my opinion in a group.",
        kind: QuestionKind::Scale {
            min: 1,
            max: 5,
            labels: AGREEMENT,
        },
    },
    Question {
        id: 6,
        prompt: "When I make a plan, I follow through on it.",
        kind: QuestionKind::Scale {
            min: 1,
            max: 5,
            labels: AGREEMENT,
        },
    },
    Question {
        id: 7,
        prompt: "What is the one area of your life you most want to improve?",
        kind: QuestionKind::Text,
    },
];

/// Daily habits quiz.
pub static HABITS_QUESTIONS: &[Question] = &[
    Question {
        id: WAKE_UP_QUESTION_ID,
        prompt: "What time do you usually wake up?",
        kind: QuestionKind::Scale {
            min: 1,
            max: 5,
            labels: &[
                "7AM or earlier",
                "Between 7 to 7:59 AM",
                "Between 8 to 8:59 AM",
                "Between 9 to 9:59 AM",
                "10AM or later",
            ],
        },
    },
    Question {
        id: 2,
        prompt: "How many hours of sleep do you get on an average night?",
        kind: QuestionKind::Scale {
            min: 1,
            max: 5,
            labels: &[
                "Less than 5 hours",
                "5 to 6 hours",
                "6 to 7 hours",
                "7 to 8 hours",
                "More than 8 hours",
            ],
        },
    },
    Question {
        id: SCREEN_TIME_QUESTION_ID,
        prompt: "How much time do you spend on screens outside of work each day?",
        kind: QuestionKind::Slider {
            min: 1,
            max: 5,
            labels: &[
                "Less than 1 hour",
                "1 to 2 hours",
                "2 to 4 hours",
                "4 to 6 hours",
                "More than 6 hours",
            ],
        },
    },
    Question {
        id: 4,
        prompt: "How often do you work out in a week?",
        kind: QuestionKind::Scale {
            min: 1,
            max: 5,
            labels: &["Never", "1 to 2 times", "3 to 4 times", "5 to 6 times", "Every day"],
        },
    },
    Question {
        id: 5,
        prompt: "How many glasses of water do you drink per day?",
        kind: QuestionKind::Scale {
            min: 1,
            max: 5,
            labels: &["1 or fewer", "2 to 3", "4 to 5", "6 to 7", "8 or more"],
        },
    },
    Question {
        id: 6,
        prompt: "How often do you meditate or practice mindfulness?",
        kind: QuestionKind::Scale {
            min: 1,
            max: 5,
            labels: &["Never", "Rarely", "A few times a month", "A few times a week", "Daily"],
        },
    },
    Question {
        id: 7,
        prompt: "How much time do you spend reading each day?",
        kind: QuestionKind::Slider {
            min: 1,
            max: 5,
            labels: &[
                "None",
                "Under 15 minutes",
                "15 to 30 minutes",
                "30 to 60 minutes",
                "Over an hour",
            ],
        },
    },
    Question {
        id: 8,
        prompt: "How would you describe your diet?",
        kind: QuestionKind::Scale {
            min: 1,
            max: 5,
            labels: &[
                "Mostly fast food",
                "Somewhat unhealthy",
                "Balanced",
                "Mostly healthy",
                "Very clean",
            ],
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_questionnaire_sizes() {
        assert_eq!(QUIZ_QUESTIONS.len(), 7);
        assert_eq!(HABITS_QUESTIONS.len(), 8);
    }

    #[test]
    fn test_question_ids_unique() {
        for questionnaire in [Questionnaire::Quiz, Questionnaire::Habits] {
            let ids: HashSet<u32> = questionnaire.questions().iter().map(|q| q.id).collect();
            assert_eq!(ids.len(), questionnaire.questions().len());
        }
    }

    #[test]
    fn test_every_habit_has_labels() {
        assert!(HABITS_QUESTIONS.iter().all(|q| q.labels().len() == 5));
    }

    #[test]
    fn test_reversed_questions_exist() {
        let wake = Questionnaire::Habits.question(WAKE_UP_QUESTION_ID).unwrap();
        assert!(wake.prompt.contains("wake up"));

        let screen = Questionnaire::Habits.question(SCREEN_TIME_QUESTION_ID).unwrap();
        assert!(screen.prompt.contains("screens"));
    }

    #[test]
    fn test_text_question_has_no_labels() {
        let q = Questionnaire::Quiz.question(7).unwrap();
        assert!(q.labels().is_empty());
    }
}
