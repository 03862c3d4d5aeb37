//! Renders both answer sets into the text block used as model context.

use crate::answers::{Answer, AnswerValue};
use crate::questions::{Question, Questionnaire};

const NO_ANSWER: &str = "[No answer]";

/// Render quiz and habits answers as one human-readable block.
///
/// Lines follow the static question order, not the answer order. Every
/// question gets a line; unanswered ones read `[No answer]`.
pub fn build_context(quiz: &[Answer], habits: &[Answer]) -> String {
    let quiz_block = render_block(Questionnaire::Quiz, quiz, |_, value| value.to_string());
    let habits_block = render_block(Questionnaire::Habits, habits, habit_display);

    format!("{}\n\n{}", quiz_block, habits_block)
}

fn render_block(
    questionnaire: Questionnaire,
    answers: &[Answer],
    display: impl Fn(&Question, &AnswerValue) -> String,
) -> String {
    questionnaire
        .questions()
        .iter()
        .map(|question| {
            let shown = answers
                .iter()
                .find(|a| a.question_id == question.id)
                .map(|a| display(question, &a.answer))
                .unwrap_or_else(|| NO_ANSWER.to_string());

            format!(
                "{} Q{}: {} — {}",
                questionnaire.line_prefix(),
                question.id,
                question.prompt,
                shown
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numeric habit answers are 1-based label positions.
fn habit_display(question: &Question, value: &AnswerValue) -> String {
    let labels = question.labels();
    match value.as_number() {
        Some(n) if !labels.is_empty() && n.is_finite() => {
            let index = (n.trunc() as i64)
                .saturating_sub(1)
                .clamp(0, labels.len() as i64 - 1);
            labels[index as usize].to_string()
        }
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::{HABITS_QUESTIONS, QUIZ_QUESTIONS};

    fn quiz_block(context: &str) -> &str {
        context.split("\n\n").next().unwrap()
    }

    fn habits_line(context: &str, id: u32) -> String {
        let prefix = format!("Habits Q{}:", id);
        context
            .lines()
            .find(|l| l.starts_with(&prefix))
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_quiz_block_has_every_question() {
        let context = build_context(&[Answer::new(1, "5")], &[]);
        let block = quiz_block(&context);
        let lines: Vec<&str> = block.lines().collect();

        assert_eq!(lines.len(), QUIZ_QUESTIONS.len());
        assert!(lines[0].starts_with("Quiz Q1: "));
        assert!(lines[0].ends_with("— 5"));
        for line in &lines[1..] {
            assert!(line.ends_with("— [No answer]"), "unexpected line: {}", line);
        }
    }

    #[test]
    fn test_habit_label_translation() {
        let context = build_context(&[], &[Answer::new(1, 3)]);
        assert!(habits_line(&context, 1).ends_with("— Between 8 to 8:59 AM"));
    }

    #[test]
    fn test_habit_label_index_is_clamped() {
        let context = build_context(&[], &[Answer::new(1, 0), Answer::new(2, 42)]);
        assert!(habits_line(&context, 1).ends_with("— 7AM or earlier"));
        assert!(habits_line(&context, 2).ends_with("— More than 8 hours"));
    }

    #[test]
    fn test_habit_label_index_extreme_values() {
        let context = build_context(&[], &[Answer::new(1, -1e19), Answer::new(2, 1e19)]);
        assert!(habits_line(&context, 1).ends_with("— 7AM or earlier"));
        assert!(habits_line(&context, 2).ends_with("— More than 8 hours"));
    }

    #[test]
    fn test_habit_text_answer_is_verbatim() {
        let context = build_context(&[], &[Answer::new(4, "twice")]);
        assert!(habits_line(&context, 4).ends_with("— twice"));
    }

    #[test]
    fn test_static_order_independent_of_answer_order() {
        let a = build_context(&[Answer::new(3, 2), Answer::new(1, 4)], &[]);
        let b = build_context(&[Answer::new(1, 4), Answer::new(3, 2)], &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_blocks_separated_by_blank_line() {
        let context = build_context(&[], &[]);
        let blocks: Vec<&str> = context.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].lines().count(), HABITS_QUESTIONS.len());
        assert!(blocks[1].starts_with("Habits Q1:"));
    }
}
