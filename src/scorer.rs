//! Contains the logic to score the learner's responses against the answer key of each block.
//!
//! Free-text answers are compared after trimming, collapsing whitespace, and ignoring case, and
//! the expected value may list alternatives separated by `|`. Letters and other fixed tokens must
//! match exactly after trimming. Multi-select blocks are scored as a group: the group is correct
//! when every expected option was selected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

use crate::{
    data::{
        Block, BlockKind, CanonicalType, GradingOptions,
        answers::{AnswerMap, choice_letter},
    },
    extractor::{Response, extract},
    numbering::Numbering,
    slots::slot_count,
};

/// The separator between alternative answers in a free-text answer key.
const ALTERNATIVE_SEPARATOR: char = '|';

/// The result of a single question number.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SlotResult {
    /// The absolute question number.
    pub number: usize,

    /// Whether the learner answered the question.
    pub answered: bool,

    /// Whether the answer is correct.
    pub correct: bool,
}

/// The score of a single block.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct BlockScore {
    /// The canonical type of the block.
    pub canonical_type: CanonicalType,

    /// The first question number of the block.
    pub start: usize,

    /// The last question number of the block.
    pub end: usize,

    /// The number of correct slots.
    pub correct_count: usize,

    /// The number of slots in the block.
    pub total_slots: usize,

    /// The result of each slot, in order.
    pub slots: Vec<SlotResult>,
}

impl BlockScore {
    /// Builds the score of a block from the results of its slots.
    fn from_slots(canonical_type: CanonicalType, start: usize, slots: Vec<SlotResult>) -> Self {
        Self {
            canonical_type,
            start,
            end: start.saturating_add(slots.len().saturating_sub(1)),
            correct_count: slots.iter().filter(|slot| slot.correct).count(),
            total_slots: slots.len(),
            slots,
        }
    }
}

/// The score of a whole test.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    /// The number of correct slots across all blocks.
    pub correct_count: usize,

    /// The number of slots across all blocks.
    pub total_slots: usize,

    /// The percentage of correct slots, rounded to the nearest integer.
    pub percentage: u32,

    /// The score of each block, in order.
    pub blocks: Vec<BlockScore>,
}

impl ScoreReport {
    /// Aggregates the scores of the given blocks.
    pub fn from_blocks(blocks: Vec<BlockScore>) -> Self {
        let correct_count = blocks.iter().map(|b| b.correct_count).sum();
        let total_slots = blocks.iter().map(|b| b.total_slots).sum();
        Self {
            correct_count,
            total_slots,
            percentage: percentage(correct_count, total_slots),
            blocks,
        }
    }

    /// Returns the result of the given question number.
    pub fn slot(&self, number: usize) -> Option<&SlotResult> {
        self.blocks
            .iter()
            .flat_map(|block| block.slots.iter())
            .find(|slot| slot.number == number)
    }
}

/// Returns the rounded percentage of correct slots. A test without slots scores zero.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 * 100.0 / total as f64).round() as u32
}

/// Normalizes free text for comparison: trims it, collapses internal whitespace, and lowercases it.
fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalizes a true/false/not given token, so that `Not Given`, `not-given`, and `NG` are equal.
fn normalize_judgement(token: &str) -> String {
    let token = token
        .to_uppercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    match token.as_str() {
        "T" => "TRUE".to_string(),
        "F" => "FALSE".to_string(),
        "Y" => "YES".to_string(),
        "N" => "NO".to_string(),
        "NG" | "NOTGIVEN" => "NOT GIVEN".to_string(),
        _ => token,
    }
}

/// Returns whether the given answer matches the expected answer of a slot of the given type.
pub fn answer_matches(canonical_type: CanonicalType, given: &str, expected: &str) -> bool {
    if canonical_type.is_free_text() {
        let given = normalize_text(given);
        return !given.is_empty()
            && expected
                .split(ALTERNATIVE_SEPARATOR)
                .map(normalize_text)
                .any(|alternative| !alternative.is_empty() && alternative == given);
    }

    if canonical_type == CanonicalType::TrueFalseNotGiven {
        let given = normalize_judgement(given);
        return !given.is_empty() && given == normalize_judgement(expected);
    }

    let given = given.trim();
    !given.is_empty() && given == expected.trim()
}

/// A trait exposing a function to score a block given the learner's answers.
pub trait BlockScorer {
    /// Scores the block starting at the given question number.
    fn score(&self, block: &Block, start: usize, answers: &AnswerMap) -> BlockScore;
}

/// A scorer that compares the learner's responses against the answer key stored in each block.
#[derive(Clone, Debug, Default)]
pub struct AnswerKeyScorer {
    /// The options used to grade the answers.
    options: GradingOptions,
}

impl AnswerKeyScorer {
    /// Creates a new scorer with the given options.
    pub fn new(options: GradingOptions) -> Self {
        Self { options }
    }

    /// Returns whether the selection of a multi-select block is correct. By default, every
    /// expected option must be among the selected ones and extra selections are ignored. An empty
    /// answer key never scores.
    fn selection_correct(&self, expected: &[String], selected: &[String]) -> bool {
        let expected: BTreeSet<String> = expected
            .iter()
            .filter(|e| !e.trim().is_empty())
            .map(|e| choice_letter(e))
            .collect();
        let selected: BTreeSet<String> = selected.iter().cloned().collect();
        if expected.is_empty() {
            return false;
        }
        if self.options.strict_multi_select {
            expected == selected
        } else {
            expected.is_subset(&selected)
        }
    }
}

impl BlockScorer for AnswerKeyScorer {
    fn score(&self, block: &Block, start: usize, answers: &AnswerMap) -> BlockScore {
        let canonical_type = block.canonical_type();
        let slots = match extract(block, start, answers) {
            Response::Selection(selected) => {
                let expected: &[String] = match &block.kind {
                    BlockKind::MultiSelect(q) => q.correct_answers.as_slice(),
                    _ => &[],
                };
                let count = slot_count(block);
                let answered = !selected.is_empty();
                let correct = self.selection_correct(expected, &selected);
                (0..count)
                    .map(|i| SlotResult {
                        number: start.saturating_add(i),
                        answered,
                        correct,
                    })
                    .collect()
            }
            Response::Slots(responses) => responses
                .iter()
                .enumerate()
                .map(|(i, response)| {
                    let correct = match (response, block.kind.expected_answer(i)) {
                        (Some(given), Some(expected)) => {
                            answer_matches(canonical_type, given, expected)
                        }
                        _ => false,
                    };
                    SlotResult {
                        number: start.saturating_add(i),
                        answered: response.is_some(),
                        correct,
                    }
                })
                .collect(),
        };
        BlockScore::from_slots(canonical_type, start, slots)
    }
}

/// Scores the block starting at the given question number with the default options.
pub fn score(block: &Block, start: usize, answers: &AnswerMap) -> BlockScore {
    AnswerKeyScorer::default().score(block, start, answers)
}

/// Scores every block of the numbering and aggregates the results.
pub fn score_test(
    numbering: &Numbering,
    answers: &AnswerMap,
    scorer: &dyn BlockScorer,
) -> ScoreReport {
    ScoreReport::from_blocks(
        numbering
            .iter()
            .map(|numbered| scorer.score(numbered.block, numbered.start, answers))
            .collect(),
    )
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{data::{answers::AnswerValue, *}, numbering::assign_numbers};

    fn multi_select(correct: &str) -> Block {
        Block::new(BlockKind::MultiSelect(MultiSelectQuestion {
            options: ["A", "B", "C", "D", "E"].map(String::from).to_vec(),
            required_answers: 2,
            correct_answers: correct.split(',').map(String::from).collect(),
        }))
    }

    /// Verifies the rounding of the percentage.
    #[test]
    fn percentages() {
        assert_eq!(0, percentage(0, 0));
        assert_eq!(67, percentage(2, 3));
        assert_eq!(33, percentage(1, 3));
        assert_eq!(100, percentage(40, 40));
        assert_eq!(63, percentage(25, 40));
    }

    /// Verifies comparing free-text answers.
    #[test]
    fn free_text() {
        let t = CanonicalType::FillInBlank;
        assert!(answer_matches(t, "  The  River ", "the river"));
        assert!(answer_matches(t, "45", "forty-five|45"));
        assert!(answer_matches(t, "forty-five", "forty-five | 45"));
        assert!(!answer_matches(t, "river bank", "river"));
        assert!(!answer_matches(t, "", "|"));
        assert!(!answer_matches(t, "x", ""));
    }

    /// Verifies comparing letters and tokens.
    #[test]
    fn structured() {
        assert!(answer_matches(CanonicalType::MultipleChoice, " B ", "B"));
        assert!(!answer_matches(CanonicalType::MultipleChoice, "b", "B"));
        assert!(!answer_matches(CanonicalType::Matching, "B|C", "B"));
        assert!(answer_matches(
            CanonicalType::TrueFalseNotGiven,
            "Not Given",
            "NOT-GIVEN"
        ));
        assert!(answer_matches(CanonicalType::TrueFalseNotGiven, "NG", "not given"));
        assert!(answer_matches(CanonicalType::TrueFalseNotGiven, "true", "TRUE"));
        assert!(!answer_matches(CanonicalType::TrueFalseNotGiven, "FALSE", "TRUE"));
    }

    /// Verifies that a superset of the expected options scores correct.
    #[test]
    fn multi_select_superset() {
        let block = multi_select("B,D");
        let answers: AnswerMap = [("q_21", vec!["B", "D", "E"])].into_iter().collect();
        let result = score(&block, 21, &answers);
        assert_eq!(2, result.correct_count);
        assert_eq!(2, result.total_slots);
        assert_eq!((21, 22), (result.start, result.end));
        assert!(result.slots.iter().all(|slot| slot.correct && slot.answered));
    }

    /// Verifies that a selection missing an expected option scores incorrect.
    #[test]
    fn multi_select_missing_option() {
        let block = multi_select("B,D");
        let answers: AnswerMap = [("q_21", vec!["B"])].into_iter().collect();
        let result = score(&block, 21, &answers);
        assert_eq!(0, result.correct_count);
        assert!(result.slots.iter().all(|slot| !slot.correct && slot.answered));

        let result = score(&block, 21, &AnswerMap::new());
        assert_eq!(0, result.correct_count);
        assert!(result.slots.iter().all(|slot| !slot.answered));
    }

    /// Verifies that indices and letters are interchangeable in multi-select blocks.
    #[test]
    fn multi_select_indices() {
        let block = multi_select("1, 3");
        let answers: AnswerMap = [("q_1", vec!["D", "B"])].into_iter().collect();
        assert_eq!(2, score(&block, 1, &answers).correct_count);
    }

    /// Verifies that strict multi-select grading requires the exact set.
    #[test]
    fn multi_select_strict() {
        let scorer = AnswerKeyScorer::new(GradingOptions {
            strict_multi_select: true,
            ..Default::default()
        });
        let block = multi_select("B,D");
        let superset: AnswerMap = [("q_1", vec!["B", "D", "E"])].into_iter().collect();
        assert_eq!(0, scorer.score(&block, 1, &superset).correct_count);
        let exact: AnswerMap = [("q_1", vec!["D", "B"])].into_iter().collect();
        assert_eq!(2, scorer.score(&block, 1, &exact).correct_count);
    }

    /// Verifies that a multi-select block without an answer key never scores.
    #[test]
    fn multi_select_without_key() {
        let block = multi_select("");
        let answers: AnswerMap = [("q_1", vec!["A"])].into_iter().collect();
        assert_eq!(0, score(&block, 1, &answers).correct_count);
    }

    /// Verifies scoring a cloze block slot by slot.
    #[test]
    fn cloze() {
        let block = Block::new(BlockKind::Cloze(PassageQuestion {
            text: "The [BLANK] flows into the [BLANK] near the [BLANK].".to_string(),
            options: vec![],
            answers: vec!["river".into(), "sea|ocean".into(), "".into()],
        }));
        let answers: AnswerMap = [("q_28_0", "River"), ("q_28_1", "ocean"), ("q_28_2", "town")]
            .into_iter()
            .collect();
        let result = score(&block, 28, &answers);
        assert_eq!(
            vec![
                SlotResult {
                    number: 28,
                    answered: true,
                    correct: true
                },
                SlotResult {
                    number: 29,
                    answered: true,
                    correct: true
                },
                SlotResult {
                    number: 30,
                    answered: true,
                    correct: false
                },
            ],
            result.slots
        );
    }

    /// Verifies scoring a whole test.
    #[test]
    fn whole_test() {
        let sections = vec![Section {
            blocks: vec![
                Block::new(BlockKind::MultipleChoice(ChoiceQuestion {
                    options: vec![],
                    correct_answer: "C".to_string(),
                })),
                Block::new(BlockKind::FillInBlank(TextQuestion {
                    correct_answer: "library".to_string(),
                })),
                multi_select("A,E"),
            ],
            ..Default::default()
        }];
        let numbering = assign_numbers(&sections);
        let answers: AnswerMap = [
            ("q_1", AnswerValue::from("C")),
            ("q_2", AnswerValue::from("Library ")),
            ("q_3", AnswerValue::from(vec!["A"])),
        ]
        .into_iter()
        .collect();
        let report = score_test(&numbering, &answers, &AnswerKeyScorer::default());
        assert_eq!(2, report.correct_count);
        assert_eq!(4, report.total_slots);
        assert_eq!(50, report.percentage);
        assert!(report.slot(2).unwrap().correct);
        assert!(!report.slot(4).unwrap().correct);
        assert!(report.slot(5).is_none());

        // Scoring is idempotent.
        assert_eq!(
            report,
            score_test(&numbering, &answers, &AnswerKeyScorer::default())
        );
    }
}
