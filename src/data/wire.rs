//! Loads tests from the JSON definitions produced by the test editors.
//!
//! The definitions are loosely structured. Different editor versions store the same information
//! under different field names, and values that are usually strings are sometimes numbers, lists,
//! or objects. Loading is lenient: a missing or malformed field is read as empty, and only a
//! document that is not a JSON object is rejected. The problems this leniency hides are reported
//! by [`crate::diagnostics::lint`].

use serde_json::{Map, Value};
use ustr::Ustr;

use crate::{
    classifier::classify,
    data::{
        Block, BlockKind, CanonicalType, ChoiceQuestion, DEFAULT_REQUIRED_ANSWERS, FormQuestion,
        FormRow, HeadingParagraph, HeadingsQuestion, MAX_REQUIRED_ANSWERS, MapItem, MapQuestion,
        MatchingQuestion, MultiSelectQuestion, PassageQuestion, Section, TableQuestion, Test,
        TestKind, TextQuestion,
    },
    error::TestDefinitionError,
};

/// The fields holding the sections of a test, together with the kind of test they imply.
const SECTION_FIELDS: &[(&str, TestKind)] = &[
    ("parts", TestKind::Listening),
    ("passages", TestKind::Reading),
    ("sections", TestKind::Generic),
];

/// The fields holding the blocks of a section.
const BLOCK_FIELDS: &[&str] = &["questions", "blocks", "questionGroups"];

/// The fields holding the text of an item in a list.
const ITEM_TEXT_FIELDS: &[&str] = &["text", "label", "content", "value", "name", "title"];

/// The fields holding the expected answer of a question or an item.
const ANSWER_FIELDS: &[&str] = &["correctAnswer", "answer"];

/// The fields holding the expected answers of a block with several slots.
const ANSWERS_FIELDS: &[&str] = &["answers", "correctAnswers", "correctAnswer"];

/// The number of slot indices accepted in an answer key stored as an object. Larger indices are
/// ignored.
const MAX_ANSWER_INDEX: usize = 1000;

/// Returns a short description of the type of a JSON value, used in error messages.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}

/// Returns the string form of a scalar value.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Returns the value of the first of the given fields that is present and not null.
fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

/// Returns the first of the given fields holding a non-empty scalar, or an empty string.
fn text_field(object: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(scalar))
        .find(|text| !text.trim().is_empty())
        .unwrap_or_default()
}

/// Returns the text of an item in a list, which is either a scalar or an object with a text field.
fn item_text(value: &Value) -> String {
    match value {
        Value::Object(object) => text_field(object, ITEM_TEXT_FIELDS),
        _ => scalar(value).unwrap_or_default(),
    }
}

/// Returns the first of the given fields holding an array.
fn array_field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Returns the texts of the items in the first of the given fields holding an array.
fn list_field(object: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    array_field(object, keys).iter().map(item_text).collect()
}

/// Returns the first of the given fields holding a non-negative integer, written either as a
/// number or as a string.
fn count_field(object: &Map<String, Value>, keys: &[&str]) -> Option<usize> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(|value| match value {
            Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
}

/// Returns a single expected answer. A list of answers is read as a set of alternatives.
fn expected_value(value: &Value) -> String {
    match value {
        Value::Array(alternatives) => alternatives
            .iter()
            .filter_map(scalar)
            .collect::<Vec<_>>()
            .join("|"),
        Value::Object(object) => text_field(object, ANSWER_FIELDS),
        _ => scalar(value).unwrap_or_default(),
    }
}

/// Returns the expected answer of a question with a single slot.
fn single_expected(object: &Map<String, Value>) -> String {
    field(object, &["correctAnswer", "answer", "answers"])
        .map(expected_value)
        .unwrap_or_default()
}

/// Returns the expected answers of a block with several slots, in slot order. The answers are
/// stored either as a list, as an object keyed by zero-based slot index, or as a single string.
/// Strings are split on commas if `split_commas` is true, which is only safe when the answers are
/// letters or fixed tokens.
fn expected_answers(object: &Map<String, Value>, split_commas: bool) -> Vec<String> {
    match field(object, ANSWERS_FIELDS) {
        Some(Value::Array(answers)) => answers.iter().map(expected_value).collect(),
        Some(Value::Object(answers)) => {
            let mut indexed: Vec<(usize, String)> = answers
                .iter()
                .filter_map(|(key, value)| {
                    let index = key.trim().parse::<usize>().ok()?;
                    (index < MAX_ANSWER_INDEX).then(|| (index, expected_value(value)))
                })
                .collect();
            indexed.sort_by_key(|(index, _)| *index);
            let mut expected = vec![];
            for (index, answer) in indexed {
                if index >= expected.len() {
                    expected.resize(index + 1, String::new());
                }
                expected[index] = answer;
            }
            expected
        }
        Some(value) => match scalar(value) {
            Some(text) if split_commas => text.split(',').map(|s| s.trim().to_string()).collect(),
            Some(text) => vec![text],
            None => vec![],
        },
        None => vec![],
    }
}

/// Returns the expected answers stored on each item of a list.
fn item_answers(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            Value::Object(object) => field(object, ANSWER_FIELDS)
                .map(expected_value)
                .unwrap_or_default(),
            _ => String::new(),
        })
        .collect()
}

/// Fills the expected answers missing from `answers` with those stored on the items.
fn merge_answers(mut answers: Vec<String>, from_items: Vec<String>) -> Vec<String> {
    if answers.len() < from_items.len() {
        answers.resize(from_items.len(), String::new());
    }
    for (answer, item_answer) in answers.iter_mut().zip(from_items) {
        if answer.trim().is_empty() {
            *answer = item_answer;
        }
    }
    answers
}

/// Returns whether the object flags a form row as blank.
fn is_blank(object: &Map<String, Value>) -> bool {
    match field(object, &["isBlank", "blank"]) {
        Some(Value::Bool(blank)) => *blank,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn parse_multi_select(object: &Map<String, Value>) -> MultiSelectQuestion {
    let correct_answers = match field(object, &["correctAnswers", "correctAnswer", "answers"]) {
        Some(Value::Array(answers)) => answers.iter().filter_map(scalar).collect(),
        Some(value) => scalar(value)
            .map(|text| text.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default(),
        None => vec![],
    };
    let options = list_field(object, &["options", "choices"]);
    let most = match options.len() {
        0 => MAX_REQUIRED_ANSWERS,
        len => len.min(MAX_REQUIRED_ANSWERS),
    };
    MultiSelectQuestion {
        required_answers: count_field(object, &["requiredAnswers", "maxSelections"])
            .unwrap_or(DEFAULT_REQUIRED_ANSWERS)
            .min(most),
        options,
        correct_answers,
    }
}

fn parse_matching(object: &Map<String, Value>) -> MatchingQuestion {
    let left = array_field(object, &["leftItems", "items", "statements"]);
    let left_items: Vec<String> = left.iter().map(item_text).collect();

    // Answers keyed by the text of the left item are placed in the item's slot.
    let answers = match field(object, ANSWERS_FIELDS) {
        Some(Value::Object(by_item)) if left_items.iter().any(|i| by_item.contains_key(i)) => {
            left_items
                .iter()
                .map(|item| by_item.get(item).map(expected_value).unwrap_or_default())
                .collect()
        }
        _ => expected_answers(object, true),
    };

    MatchingQuestion {
        right_items: list_field(object, &["rightItems", "options"]),
        answers: merge_answers(answers, item_answers(left)),
        left_items,
    }
}

fn parse_headings(object: &Map<String, Value>) -> HeadingsQuestion {
    let by_paragraph = match field(object, ANSWERS_FIELDS) {
        Some(Value::Object(answers)) => Some(answers),
        _ => None,
    };

    let paragraphs = array_field(object, &["paragraphs"])
        .iter()
        .map(|paragraph| {
            let (id, label, correct_heading) = match paragraph {
                Value::Object(fields) => {
                    let id = text_field(fields, &["id", "paragraphId", "label"]);
                    let label = match text_field(fields, &["label", "title", "name"]) {
                        label if label.is_empty() => id.clone(),
                        label => label,
                    };
                    let heading = text_field(fields, &["correctHeading", "correctAnswer", "answer"]);
                    (id, label, heading)
                }
                _ => {
                    let id = scalar(paragraph).unwrap_or_default();
                    (id.clone(), id, String::new())
                }
            };
            let correct_heading = by_paragraph
                .and_then(|answers| answers.get(&id))
                .map(expected_value)
                .filter(|heading| !heading.trim().is_empty())
                .unwrap_or(correct_heading);
            HeadingParagraph {
                id: Ustr::from(id.as_str()),
                label,
                correct_heading,
            }
        })
        .collect();

    HeadingsQuestion {
        paragraphs,
        headings: list_field(object, &["headings", "options"]),
    }
}

fn parse_form(object: &Map<String, Value>) -> FormQuestion {
    let rows = array_field(object, &["rows", "fields"])
        .iter()
        .map(|row| match row {
            Value::Object(fields) => FormRow {
                label: text_field(fields, &["label", "text", "name"]),
                is_blank: is_blank(fields),
                correct_answer: single_expected(fields),
            },
            _ => FormRow {
                label: scalar(row).unwrap_or_default(),
                ..Default::default()
            },
        })
        .collect();
    FormQuestion { rows }
}

fn parse_table(object: &Map<String, Value>) -> TableQuestion {
    let rows = array_field(object, &["rows", "tableData", "data"]);
    let cells_of = |row: &Value| -> Vec<Value> {
        match row {
            Value::Array(cells) => cells.clone(),
            Value::Object(fields) => field(fields, &["cells"])
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            _ => vec![],
        }
    };
    let grid: Vec<Vec<Value>> = rows.iter().map(cells_of).collect();

    let cell_answers: Vec<String> = grid
        .iter()
        .flatten()
        .filter_map(|cell| match cell {
            Value::Object(fields) => field(fields, ANSWER_FIELDS).map(expected_value),
            _ => None,
        })
        .collect();

    TableQuestion {
        rows: grid
            .iter()
            .map(|cells| cells.iter().map(item_text).collect())
            .collect(),
        answers: merge_answers(expected_answers(object, false), cell_answers),
    }
}

fn parse_map(object: &Map<String, Value>) -> MapQuestion {
    let items = array_field(object, &["items", "labels", "locations", "markers"]);
    let answers = merge_answers(expected_answers(object, true), item_answers(items));
    MapQuestion {
        items: items
            .iter()
            .enumerate()
            .map(|(i, item)| MapItem {
                label: item_text(item),
                correct_answer: answers.get(i).cloned().unwrap_or_default(),
            })
            .collect(),
        options: list_field(object, &["options"]),
    }
}

fn parse_passage(object: &Map<String, Value>, text_keys: &[&str], split: bool) -> PassageQuestion {
    PassageQuestion {
        text: text_field(object, text_keys),
        options: list_field(object, &["options", "wordBank"]),
        answers: expected_answers(object, split),
    }
}

/// Parses a block of the given type.
fn parse_kind(canonical_type: CanonicalType, object: &Map<String, Value>) -> BlockKind {
    let choice = || ChoiceQuestion {
        options: list_field(object, &["options", "choices"]),
        correct_answer: single_expected(object),
    };
    let text = || TextQuestion {
        correct_answer: single_expected(object),
    };

    match canonical_type {
        CanonicalType::MultipleChoice => BlockKind::MultipleChoice(choice()),
        CanonicalType::TrueFalseNotGiven => BlockKind::TrueFalseNotGiven(choice()),
        CanonicalType::FillInBlank => BlockKind::FillInBlank(text()),
        CanonicalType::SentenceCompletion => BlockKind::SentenceCompletion(text()),
        CanonicalType::MultiSelect => BlockKind::MultiSelect(parse_multi_select(object)),
        CanonicalType::Matching => BlockKind::Matching(parse_matching(object)),
        CanonicalType::MatchingHeadings => BlockKind::MatchingHeadings(parse_headings(object)),
        CanonicalType::Cloze => BlockKind::Cloze(parse_passage(
            object,
            &[
                "paragraphText",
                "passageText",
                "text",
                "paragraph",
                "questionText",
            ],
            false,
        )),
        CanonicalType::ParagraphMatching => BlockKind::ParagraphMatching(parse_passage(
            object,
            &["questionText", "text"],
            true,
        )),
        CanonicalType::NotesCompletion => BlockKind::NotesCompletion(parse_passage(
            object,
            &["notesText", "notes", "text", "questionText"],
            false,
        )),
        CanonicalType::FormCompletion => BlockKind::FormCompletion(parse_form(object)),
        CanonicalType::TableCompletion => BlockKind::TableCompletion(parse_table(object)),
        CanonicalType::MapLabeling => BlockKind::MapLabeling(parse_map(object)),
    }
}

/// Parses a block. The declared type is kept as found, even when it is missing.
fn parse_block(object: &Map<String, Value>) -> Block {
    let declared_type = text_field(object, &["type", "questionType"]);
    let id = text_field(object, &["id", "_id"]);
    Block {
        id: (!id.is_empty()).then(|| Ustr::from(id.as_str())),
        question_text: text_field(object, &["questionText", "question", "prompt"]),
        kind: parse_kind(classify(&declared_type), object),
        declared_type: Some(declared_type),
    }
}

/// Parses a section. Entries of the block list that are not objects are skipped.
fn parse_section(object: &Map<String, Value>) -> Section {
    Section {
        title: text_field(object, &["title", "name"]),
        instruction: text_field(object, &["instruction", "instructions"]),
        blocks: array_field(object, BLOCK_FIELDS)
            .iter()
            .filter_map(Value::as_object)
            .map(parse_block)
            .collect(),
    }
}

/// Returns the kind of test named by an explicit type field, if any.
fn declared_kind(object: &Map<String, Value>) -> Option<TestKind> {
    match text_field(object, &["testType", "type"]).to_lowercase().trim() {
        "listening" => Some(TestKind::Listening),
        "reading" => Some(TestKind::Reading),
        _ => None,
    }
}

impl Test {
    /// Loads a test from its JSON definition.
    pub fn from_json(json: &str) -> Result<Test, TestDefinitionError> {
        let value: Value = serde_json::from_str(json).map_err(TestDefinitionError::Parse)?;
        Self::from_value(&value)
    }

    /// Loads a test from its parsed JSON definition. The sections are read from the `parts`,
    /// `passages`, or `sections` field, which also decides whether the test is a Listening or a
    /// Reading test unless the definition says so explicitly. A definition with blocks but no
    /// sections is read as a test with a single section.
    pub fn from_value(value: &Value) -> Result<Test, TestDefinitionError> {
        let Value::Object(root) = value else {
            return Err(TestDefinitionError::NotAnObject(describe(value)));
        };

        let (sections, implied_kind) = SECTION_FIELDS
            .iter()
            .find_map(|(key, kind)| {
                root.get(*key).and_then(Value::as_array).map(|sections| {
                    let sections = sections
                        .iter()
                        .filter_map(Value::as_object)
                        .map(parse_section)
                        .collect::<Vec<_>>();
                    (sections, *kind)
                })
            })
            .unwrap_or_else(|| {
                let section = parse_section(root);
                let sections = if section.blocks.is_empty() {
                    vec![]
                } else {
                    vec![Section {
                        title: String::new(),
                        ..section
                    }]
                };
                (sections, TestKind::Generic)
            });

        Ok(Test {
            kind: declared_kind(root).unwrap_or(implied_kind),
            title: text_field(root, &["title", "name"]),
            sections,
        })
    }
}
