//! Prompts for metric scoring.
//!
//! Each request is a fixed system instruction plus a per-metric user prompt:
//! 1. Metric name and description
//! 2. Scoring rubric (High / Medium / Low bands)
//! 3. The shared answer context from `vitality_core::build_context`
//! 4. The output instruction

use std::fmt::Write as _;

use vitality_core::Metric;

/// System instruction sent with every scoring request.
pub const SYSTEM_PROMPT: &str = "You are a wellness assessment scorer. \
Output only an integer 0-100. Do not include words, units, punctuation or explanation.";

/// Closing instruction of every metric prompt.
pub const OUTPUT_INSTRUCTION: &str =
    "Respond with a single integer from 0 to 100 and nothing else.";

/// Build the user prompt for one metric.
pub fn metric_prompt(metric: Metric, context: &str) -> String {
    let criteria = metric.criteria();
    let mut prompt = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(prompt, "Metric: {}", metric);
    let _ = writeln!(prompt, "Description: {}", metric.description());
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Scoring criteria:");
    for (label, tier) in criteria.tiers() {
        let _ = writeln!(
            prompt,
            "- {} ({}-{}): {}",
            label, tier.min, tier.max, tier.description
        );
    }
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "User answers:");
    let _ = writeln!(prompt, "{}", context);
    let _ = writeln!(prompt);
    prompt.push_str(OUTPUT_INSTRUCTION);

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_demands_integer() {
        assert!(SYSTEM_PROMPT.contains("Output only an integer 0-100"));
    }

    #[test]
    fn test_metric_prompt_embeds_description_rubric_and_context() {
        let context = "Quiz Q1: How often do you exercise? — 3";
        let prompt = metric_prompt(Metric::Focus, context);

        assert!(prompt.contains(Metric::Focus.description()));
        for (label, tier) in Metric::Focus.criteria().tiers() {
            assert!(prompt.contains(label));
            assert!(prompt.contains(tier.description));
        }
        assert!(prompt.contains("(80-100)"));
        assert!(prompt.contains("(0-49)"));
        assert!(prompt.contains(context));
        assert!(prompt.ends_with(OUTPUT_INSTRUCTION));
    }

    #[test]
    fn test_prompts_differ_per_metric() {
        let wisdom = metric_prompt(Metric::Wisdom, "ctx");
        let strength = metric_prompt(Metric::Strength, "ctx");
        assert_ne!(wisdom, strength);
    }
}
