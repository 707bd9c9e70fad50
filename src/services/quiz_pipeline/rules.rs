//! Deterministic exam rules run after the structural checks.
//!
//! Each rule is independent; a [`RuleSet`] runs them in order and stops at
//! the first rejection.

use crate::services::quiz_pipeline::text::collapse_whitespace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Pass,
    Reject(String),
}

impl RuleOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, RuleOutcome::Pass)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub question: &'a str,
    pub choices: &'a [String],
    pub answer_index: usize,
    pub explanation: &'a str,
}

pub trait ExamRule: Send + Sync {
    fn check(&self, input: &RuleInput<'_>) -> RuleOutcome;
}

impl<F> ExamRule for F
where
    F: Fn(&RuleInput<'_>) -> RuleOutcome + Send + Sync,
{
    fn check(&self, input: &RuleInput<'_>) -> RuleOutcome {
        self(input)
    }
}

/// Misconception and myth questions are disproportionately ambiguous.
pub struct BlockMisconceptionQuestions;

impl ExamRule for BlockMisconceptionQuestions {
    fn check(&self, input: &RuleInput<'_>) -> RuleOutcome {
        let stem = collapse_whitespace(input.question).to_lowercase();
        if stem.contains("misconception") || stem.contains("myth") {
            return RuleOutcome::Reject(
                "Misconception-style questions are often ambiguous".to_string(),
            );
        }
        RuleOutcome::Pass
    }
}

pub struct RuleSet {
    rules: Vec<Box<dyn ExamRule>>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::empty().with_rule(BlockMisconceptionQuestions)
    }
}

impl RuleSet {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl ExamRule + 'static) -> Self {
        self.push(rule);
        self
    }

    pub fn push(&mut self, rule: impl ExamRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn check(&self, input: &RuleInput<'_>) -> RuleOutcome {
        if !(3..=4).contains(&input.choices.len()) {
            return RuleOutcome::Reject("Invalid structure (choices length)".to_string());
        }
        if input.answer_index >= input.choices.len() {
            return RuleOutcome::Reject("Invalid structure (answer_index range)".to_string());
        }

        self.rules
            .iter()
            .map(|rule| rule.check(input))
            .find(|outcome| !outcome.is_pass())
            .unwrap_or(RuleOutcome::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn input<'a>(question: &'a str, choices: &'a [String]) -> RuleInput<'a> {
        RuleInput {
            question,
            choices,
            answer_index: 0,
            explanation: "Because.",
        }
    }

    #[test]
    fn default_rules_block_misconception_stems() {
        let rules = RuleSet::default();
        let choices = labels(&["one", "two", "three", "four"]);

        let outcome = rules.check(&input("What is a common   MISCONCEPTION about VPNs?", &choices));
        assert!(!outcome.is_pass());

        let outcome = rules.check(&input("Which myth about firewalls is false?", &choices));
        assert!(!outcome.is_pass());

        let outcome = rules.check(&input("What does a VPN encrypt?", &choices));
        assert_eq!(outcome, RuleOutcome::Pass);
    }

    #[test]
    fn structural_precheck_rejects_bad_shapes() {
        let rules = RuleSet::empty();
        let two = labels(&["one", "two"]);
        assert!(!rules.check(&input("Q?", &two)).is_pass());

        let three = labels(&["one", "two", "three"]);
        let out_of_range = RuleInput {
            answer_index: 3,
            ..input("Q?", &three)
        };
        assert!(!rules.check(&out_of_range).is_pass());
    }

    #[test]
    fn closures_are_rules_and_run_in_order() {
        let rules = RuleSet::default()
            .with_rule(|input: &RuleInput<'_>| {
                if input.explanation.is_empty() {
                    RuleOutcome::Reject("first".to_string())
                } else {
                    RuleOutcome::Pass
                }
            })
            .with_rule(|_: &RuleInput<'_>| RuleOutcome::Reject("second".to_string()));
        assert_eq!(rules.len(), 3);

        let choices = labels(&["one", "two", "three"]);
        let empty_explanation = RuleInput {
            explanation: "",
            ..input("What is hashing?", &choices)
        };
        assert_eq!(
            rules.check(&empty_explanation),
            RuleOutcome::Reject("first".to_string())
        );
        assert_eq!(
            rules.check(&input("What is hashing?", &choices)),
            RuleOutcome::Reject("second".to_string())
        );
    }
}
