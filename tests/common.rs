//! Helpers shared by the end-to-end tests to build tests and answer maps.

use marksheet::data::{answers::AnswerMap, *};

/// Returns a form-completion block with the given number of blank rows, preceded by a label row.
#[allow(dead_code)]
pub fn form_block(blank_rows: usize) -> Block {
    let mut rows = vec![FormRow {
        label: "Name".to_string(),
        ..Default::default()
    }];
    rows.extend((0..blank_rows).map(|i| FormRow {
        label: format!("Field {i}"),
        is_blank: true,
        correct_answer: format!("answer {i}"),
    }));
    Block::new(BlockKind::FormCompletion(FormQuestion { rows }))
}

/// Returns a cloze block whose text contains the given answers as blanks.
#[allow(dead_code)]
pub fn cloze_block(answers: &[&str]) -> Block {
    let text = answers
        .iter()
        .map(|_| "<p>The [BLANK] is here.</p>")
        .collect::<String>();
    Block::new(BlockKind::Cloze(PassageQuestion {
        text,
        options: vec![],
        answers: answers.iter().map(|a| a.to_string()).collect(),
    }))
}

/// Returns a matching block with the given number of left items. The expected option of item `i`
/// is the letter at position `i`.
#[allow(dead_code)]
pub fn matching_block(items: usize) -> Block {
    Block::new(BlockKind::Matching(MatchingQuestion {
        left_items: (0..items).map(|i| format!("Item {i}")).collect(),
        right_items: (0..items).map(letter).collect(),
        answers: (0..items).map(letter).collect(),
    }))
}

/// Returns a multi-select block requiring the given number of options.
#[allow(dead_code)]
pub fn multi_select_block(required_answers: usize, correct_answers: &[&str]) -> Block {
    Block::new(BlockKind::MultiSelect(MultiSelectQuestion {
        options: (0..5).map(letter).collect(),
        required_answers,
        correct_answers: correct_answers.iter().map(|a| a.to_string()).collect(),
    }))
}

/// Returns a section containing the given blocks.
#[allow(dead_code)]
pub fn section(blocks: Vec<Block>) -> Section {
    Section {
        blocks,
        ..Default::default()
    }
}

/// Returns an answer map with the given text answers.
#[allow(dead_code)]
pub fn answers(entries: &[(&str, &str)]) -> AnswerMap {
    entries.iter().copied().collect()
}

/// Returns the capital letter at the given zero-based position.
pub fn letter(index: usize) -> String {
    char::from(b'A' + index as u8).to_string()
}
