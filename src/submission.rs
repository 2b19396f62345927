//! Defines the record handed over to the grade-recording service when the learner submits a test.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{
    band::band_score,
    data::{GradingOptions, TestKind, answers::AnswerMap},
    scorer::ScoreReport,
};

/// The final result of a test-taking session, together with the raw answers.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// The number of correct answers.
    pub correct_count: usize,

    /// The number of questions in the test.
    pub total_slots: usize,

    /// The percentage of correct answers, rounded to the nearest integer.
    pub percentage: u32,

    /// The band score, for Listening and Reading tests.
    pub band: Option<f32>,

    /// Whether the percentage reached the passing percentage.
    pub passed: bool,

    /// The learner's answers as they were at the time of submission.
    #[ts(type = "Record<string, string | string[]>")]
    pub answers: AnswerMap,

    /// The time at which the test was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    /// Creates the submission for the given score report.
    pub fn new(
        report: &ScoreReport,
        kind: TestKind,
        options: &GradingOptions,
        answers: AnswerMap,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            correct_count: report.correct_count,
            total_slots: report.total_slots,
            percentage: report.percentage,
            band: band_score(kind, report.correct_count, report.total_slots),
            passed: report.percentage >= options.passing_percentage,
            answers,
            submitted_at,
        }
    }
}
