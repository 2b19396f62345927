//! End-to-end tests of answer extraction and scoring.
//!
//! The tests simulate a test-taking session: a test is loaded, the learner's answers are written
//! to the answer map under the keys the test-taking pages use, and the map is scored.

mod common;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use indoc::indoc;
use marksheet::{
    Marksheet,
    data::{
        GradingOptions, TestKind,
        answers::{AnswerMap, sub_answer_key},
    },
    extractor::{is_answered, key_for},
    numbering::assign_numbers_from,
    scorer::{AnswerKeyScorer, BlockScorer, score, score_test},
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

use crate::common::*;

/// A Reading test with one passage covering most question types.
const READING_TEST: &str = indoc! {r#"
    {
        "title": "Academic Reading 1",
        "passages": [
            {
                "title": "The History of Glass",
                "instruction": "Read the passage and answer questions 1-9.",
                "questions": [
                    {"type": "true-false-not-given", "questionText": "Glass was first made in Egypt.",
                     "correctAnswer": "NOT GIVEN"},
                    {"type": "IELTS-Matching-Headings", "headings": ["i", "ii", "iii"],
                     "paragraphs": [{"id": "A", "correctHeading": "ii"}, {"id": "B", "correctHeading": "iii"}]},
                    {"type": "summary-completion",
                     "passageText": "<p>Sand is mixed with [BLANK] and heated in a <b>[BLANK]</b>.</p>",
                     "answers": ["soda", "furnace|kiln"]},
                    {"type": "paragraph-matching",
                     "questionText": "<li>a description of an early process ...</li><li>a reference to trade …</li>",
                     "correctAnswer": "C,F"},
                    {"type": "short-answer", "correctAnswer": "Venice"},
                    {"type": "choose-two", "requiredAnswers": 2, "correctAnswers": ["B", "D"]}
                ]
            }
        ]
    }
"#};

/// Verifies that a selection containing every expected option is correct, even with extra
/// options, and that a selection missing an option is not.
#[test]
fn multi_select_containment() {
    let block = multi_select_block(2, &["B", "D"]);

    let superset: AnswerMap = [("q_21", vec!["B", "D", "E"])].into_iter().collect();
    let result = score(&block, 21, &superset);
    assert_eq!(2, result.correct_count);
    assert_eq!(21..=22, result.start..=result.end);

    let missing: AnswerMap = [("q_21", vec!["B", "E"])].into_iter().collect();
    assert_eq!(0, score(&block, 21, &missing).correct_count);

    let strict = AnswerKeyScorer::new(GradingOptions {
        strict_multi_select: true,
        ..Default::default()
    });
    assert_eq!(0, strict.score(&block, 21, &superset).correct_count);

    let exact: AnswerMap = [("q_21", vec!["1", "3"])].into_iter().collect();
    assert_eq!(2, strict.score(&block, 21, &exact).correct_count);
}

/// Verifies that every number of a sub-keyed block reads its own key and is answered only when the
/// key holds a non-blank value.
#[test]
fn sub_key_round_trip() {
    let block = cloze_block(&["a", "b", "c"]);
    let start = 28;
    let mut answers = AnswerMap::new();
    for number in start..start + 3 {
        let key = key_for(&block, start, number);
        assert_eq!(Some(sub_answer_key(start, number - start)), key);
        assert!(!is_answered(&block, start, number, &answers));
    }

    answers.insert("q_28_1", "b");
    answers.insert("q_28_2", "  ");
    assert!(!is_answered(&block, start, 28, &answers));
    assert!(is_answered(&block, start, 29, &answers));
    assert!(!is_answered(&block, start, 30, &answers));
    assert_eq!(None, key_for(&block, start, 31));
}

/// Verifies that scoring the same answers twice gives the same report.
#[test]
fn idempotent_scoring() {
    let sections = vec![section(vec![
        form_block(2),
        matching_block(3),
        multi_select_block(2, &["A"]),
    ])];
    let numbering = assign_numbers_from(&sections, 1);
    let answers = answers(&[("q_1", "Answer 0"), ("q_3", "A"), ("q_5", "C"), ("q_6", "A")]);
    let scorer = AnswerKeyScorer::default();
    let first = score_test(&numbering, &answers, &scorer);
    let second = score_test(&numbering, &answers, &scorer);
    assert_eq!(first, second);
    assert_eq!(7, first.total_slots);
    assert_eq!(5, first.correct_count);
    assert_eq!(71, first.percentage);
}

/// Verifies grading a Reading test loaded from its JSON definition.
#[test]
fn reading_test() -> Result<()> {
    let marksheet = Marksheet::from_json(READING_TEST, GradingOptions::default())?;
    assert_eq!(TestKind::Reading, marksheet.test().kind);
    assert_eq!(10, marksheet.total_questions());
    assert!(marksheet.warnings().is_empty());

    let mut answers = AnswerMap::new();
    assert_eq!(0, marksheet.progress(&answers).answered);

    answers.insert("q_1", "Not Given");
    answers.insert(
        "q_2",
        BTreeMap::from([
            ("A".to_string(), "ii".to_string()),
            ("B".to_string(), "i".to_string()),
        ]),
    );
    answers.insert("q_4_0", " SODA ");
    answers.insert("q_4_1", "kiln");
    answers.insert("q_6_0", "C");
    answers.insert("q_8", "venice");
    answers.insert("q_9", vec!["D", "B"]);

    let progress = marksheet.progress(&answers);
    assert_eq!(9, progress.answered);
    assert_eq!(10, progress.total);
    assert!(!marksheet.is_answered(7, &answers));
    assert!(marksheet.is_answered(10, &answers));

    let report = marksheet.grade(&answers);
    let correct: Vec<_> = (1..=10)
        .map(|n| report.slot(n).is_some_and(|slot| slot.correct))
        .collect();
    assert_eq!(
        vec![true, true, false, true, true, true, false, true, true, true],
        correct
    );
    assert_eq!(8, report.correct_count);
    assert_eq!(80, report.percentage);
    Ok(())
}

/// Verifies that answers saved by the test-taking pages are restored and graded, including
/// headings stored as a JSON-encoded string.
#[test]
fn restored_answers() -> Result<()> {
    let marksheet = Marksheet::from_json(READING_TEST, GradingOptions::default())?;
    let answers = AnswerMap::from_json(indoc! {r#"
        {
            "q_1": "NG",
            "q_2": "{\"A\":\"ii\",\"B\":\"iii\"}",
            "q_9": ["1", "3"],
            "q_10": "ignored"
        }
    "#})?;
    let report = marksheet.grade(&answers);
    assert_eq!(5, report.correct_count);

    let saved = answers.to_json()?;
    assert_eq!(answers, AnswerMap::from_json(&saved)?);

    let malformed = AnswerMap::from_json(r#"{"q_2": "{not json"}"#)?;
    assert!(!marksheet.is_answered(2, &malformed));
    assert!(!marksheet.is_answered(3, &malformed));
    Ok(())
}

/// Verifies the submission of a Listening test.
#[test]
fn listening_submission() -> Result<()> {
    let marksheet = Marksheet::from_json(
        indoc! {r#"
            {
                "title": "Listening Practice 1",
                "parts": [{
                    "title": "Part 1",
                    "questions": [
                        {"type": "notes-completion",
                         "notesText": "<ul><li>Venue: (1) ______</li><li>Cost: (2) ______</li></ul>",
                         "answers": ["town hall", "£5|5 pounds"]},
                        {"type": "table-completion",
                         "rows": [["Day", "Event"], ["Monday", "[BLANK]"], ["Friday", "[BLANK]"]],
                         "answers": ["quiz", "dance"]},
                        {"type": "map-labelling", "options": ["A", "B", "C", "D"],
                         "items": [{"label": "Car park", "correctAnswer": "D"},
                                   {"label": "Toilets", "correctAnswer": "A"}]}
                    ]
                }]
            }
        "#},
        GradingOptions::default(),
    )?;
    assert_eq!(6, marksheet.total_questions());

    let answers = answers(&[
        ("q_1", "Town  Hall"),
        ("q_2", "5 pounds"),
        ("q_3", "Quiz"),
        ("q_4", "disco"),
        ("q_5", "D"),
        ("q_6", "a"),
    ]);
    let submitted_at = Utc.with_ymd_and_hms(2026, 5, 2, 14, 0, 0).unwrap();
    let submission = marksheet.submit(answers.clone(), submitted_at);
    assert_eq!(4, submission.correct_count);
    assert_eq!(6, submission.total_slots);
    assert_eq!(67, submission.percentage);
    assert!(submission.passed);
    // 4 out of 6 is 26.67 out of 40, rounded to 27.
    assert_eq!(Some(6.5), submission.band);
    assert_eq!(answers, submission.answers);
    assert_eq!(submitted_at, submission.submitted_at);
    Ok(())
}
