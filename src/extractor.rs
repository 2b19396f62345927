//! Extracts the learner's responses to a block from the answer map.
//!
//! A missing key, a blank string, and a value that cannot be decoded are all treated as no answer.
//! The same extraction is used to show which questions have been answered and to score them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::{
    data::{
        Block, BlockKind, HeadingParagraph, KeyScheme,
        answers::{AnswerMap, AnswerValue, answer_key, choice_letter, decode_object, sub_answer_key},
    },
    numbering::Numbering,
    slots::slot_count,
};

/// The learner's responses to a block.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// One entry per slot of the block, with `None` for unanswered slots.
    Slots(Vec<Option<String>>),

    /// The options selected in a multi-select block, as letters.
    Selection(Vec<String>),
}

impl Response {
    /// Returns whether the learner gave no response at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Response::Slots(slots) => slots.iter().all(Option::is_none),
            Response::Selection(selected) => selected.is_empty(),
        }
    }
}

/// Returns the choices of a multi-select block stored in the given value. The choices may be a
/// list or a comma-separated string, and indices are converted to letters.
fn selected_choices(value: Option<&AnswerValue>) -> Vec<String> {
    let choices: Vec<String> = match value {
        Some(AnswerValue::List(items)) => items.clone(),
        Some(AnswerValue::Text(text)) => text.split(',').map(str::to_string).collect(),
        _ => vec![],
    };
    choices
        .iter()
        .filter(|choice| !choice.trim().is_empty())
        .map(|choice| choice_letter(choice))
        .collect()
}

/// Returns the headings chosen in a matching-headings block, keyed by paragraph ID. Values stored
/// as JSON-encoded strings are decoded. Anything else yields an empty map.
fn chosen_headings(value: Option<&AnswerValue>) -> BTreeMap<String, String> {
    match value {
        Some(AnswerValue::Map(map)) => map.clone(),
        Some(AnswerValue::Text(text)) => decode_object(text).unwrap_or_default(),
        _ => BTreeMap::new(),
    }
}

/// Returns the keys of the answer map read for the block starting at the given question number.
pub fn answer_keys(block: &Block, start: usize) -> Vec<String> {
    let count = slot_count(block);
    match block.canonical_type().key_scheme() {
        KeyScheme::PerSlot => (0..count).map(|i| answer_key(start.saturating_add(i))).collect(),
        KeyScheme::SubKeyed => (0..count).map(|i| sub_answer_key(start, i)).collect(),
        KeyScheme::HeadingMap | KeyScheme::Selection => vec![answer_key(start)],
    }
}

/// Returns the key of the answer map holding the response to the given question number, or `None`
/// if the block starting at `start` does not occupy that number.
pub fn key_for(block: &Block, start: usize, number: usize) -> Option<String> {
    let offset = number.checked_sub(start)?;
    if offset >= slot_count(block) {
        return None;
    }
    Some(match block.canonical_type().key_scheme() {
        KeyScheme::PerSlot => answer_key(number),
        KeyScheme::SubKeyed => sub_answer_key(start, offset),
        KeyScheme::HeadingMap | KeyScheme::Selection => answer_key(start),
    })
}

/// Returns the learner's responses to the block starting at the given question number.
pub fn extract(block: &Block, start: usize, answers: &AnswerMap) -> Response {
    let count = slot_count(block);
    let text = |key: String| answers.text(&key).map(str::to_string);

    match block.canonical_type().key_scheme() {
        KeyScheme::PerSlot => {
            Response::Slots((0..count).map(|i| text(answer_key(start.saturating_add(i)))).collect())
        }
        KeyScheme::SubKeyed => {
            Response::Slots((0..count).map(|i| text(sub_answer_key(start, i))).collect())
        }
        KeyScheme::HeadingMap => {
            let chosen = chosen_headings(answers.get(&answer_key(start)));
            let paragraphs: &[HeadingParagraph] = match &block.kind {
                BlockKind::MatchingHeadings(q) => q.paragraphs.as_slice(),
                _ => &[],
            };
            let mut slots: Vec<Option<String>> = paragraphs
                .iter()
                .map(|paragraph| {
                    chosen
                        .get(paragraph.id.as_str())
                        .filter(|heading| !heading.trim().is_empty())
                        .cloned()
                })
                .collect();
            // A block without paragraphs still occupies one slot.
            slots.resize(count, None);
            Response::Slots(slots)
        }
        KeyScheme::Selection => {
            Response::Selection(selected_choices(answers.get(&answer_key(start))))
        }
    }
}

/// Returns whether the question with the given absolute number, which belongs to the block
/// starting at `start`, has been answered. All the numbers of a multi-select block are answered
/// once any option is selected.
pub fn is_answered(block: &Block, start: usize, number: usize, answers: &AnswerMap) -> bool {
    let Some(offset) = number.checked_sub(start) else {
        return false;
    };
    match extract(block, start, answers) {
        Response::Slots(slots) => slots.get(offset).is_some_and(Option::is_some),
        Response::Selection(selected) => offset < slot_count(block) && !selected.is_empty(),
    }
}

/// The number of answered questions in a test.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// The number of answered questions.
    pub answered: usize,

    /// The total number of questions.
    pub total: usize,
}

/// Returns the answered flag of every question number, in order.
pub fn answered_numbers(numbering: &Numbering, answers: &AnswerMap) -> Vec<(usize, bool)> {
    numbering
        .iter()
        .flat_map(|numbered| {
            let answered: Vec<bool> = match extract(numbered.block, numbered.start, answers) {
                Response::Slots(slots) => slots.iter().map(Option::is_some).collect(),
                Response::Selection(selected) => vec![!selected.is_empty(); numbered.slot_count()],
            };
            numbered.numbers().zip(answered)
        })
        .collect()
}

/// Returns how many questions of the test have been answered.
pub fn progress(numbering: &Numbering, answers: &AnswerMap) -> Progress {
    let flags = answered_numbers(numbering, answers);
    Progress {
        answered: flags.iter().filter(|(_, answered)| *answered).count(),
        total: flags.len(),
    }
}
