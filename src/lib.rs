//! Marksheet numbers the questions of IELTS-style Reading and Listening tests and reconciles the
//! learner's answers with the answer key.
//!
//! A test is made of sections (parts in Listening tests, passages in Reading tests), and each
//! section is made of question blocks. Many blocks expand into several numbered questions: a cloze
//! passage takes up one question number per blank, a matching-headings block one per paragraph,
//! and a multi-select block one per option the learner must pick. Marksheet walks the test to give
//! every block its range of absolute question numbers, reads the learner's responses from a flat
//! answer map keyed by those numbers, and scores them against the answer key stored in the blocks.
//!
//! Everything is recomputed from the test and the current answer map on every call. Nothing is
//! cached, so the same functions can be used to update the "answered" indicators after every
//! keystroke and to grade the test once it is submitted.

pub mod band;
pub mod classifier;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod extractor;
pub mod markup;
pub mod numbering;
pub mod scorer;
pub mod slots;
pub mod submission;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use data::{GradingOptions, Test, answers::AnswerMap};
use diagnostics::AuthoringWarning;
use error::TestDefinitionError;
use extractor::Progress;
use numbering::Numbering;
use scorer::{AnswerKeyScorer, ScoreReport};
use submission::Submission;

/// A test loaded for a test-taking session, together with the options used to grade it.
pub struct Marksheet {
    /// The test being taken.
    test: Test,

    /// The options used to grade the learner's answers.
    options: GradingOptions,

    /// The scorer used to grade each block.
    scorer: AnswerKeyScorer,
}

impl Marksheet {
    /// Creates a new marksheet for the given test. Problems found in the test definition are
    /// logged as warnings.
    pub fn new(test: Test, options: GradingOptions) -> Self {
        let total_questions = numbering::assign_numbers(&test.sections).total_slots();
        debug!(
            title = %test.title,
            kind = ?test.kind,
            sections = test.sections.len(),
            questions = total_questions,
            "loaded test"
        );
        for warning in diagnostics::lint(&test) {
            warn!(title = %test.title, "{warning}");
        }

        Self {
            scorer: AnswerKeyScorer::new(options.clone()),
            test,
            options,
        }
    }

    /// Creates a new marksheet from the JSON definition of a test.
    pub fn from_json(json: &str, options: GradingOptions) -> Result<Self, TestDefinitionError> {
        Ok(Self::new(Test::from_json(json)?, options))
    }

    /// Returns the test being taken.
    pub fn test(&self) -> &Test {
        &self.test
    }

    /// Returns the grading options.
    pub fn options(&self) -> &GradingOptions {
        &self.options
    }

    /// Returns the question numbers of every block in the test.
    pub fn numbering(&self) -> Numbering<'_> {
        numbering::assign_numbers(&self.test.sections)
    }

    /// Returns the number of questions in the test.
    pub fn total_questions(&self) -> usize {
        self.numbering().total_slots()
    }

    /// Returns the key of the answer map holding the response to the given question number, or
    /// `None` if the test has no such question.
    pub fn key_for(&self, number: usize) -> Option<String> {
        let numbering = self.numbering();
        let (numbered, _) = numbering.locate(number)?;
        extractor::key_for(numbered.block, numbered.start, number)
    }

    /// Returns whether the question with the given number has been answered.
    pub fn is_answered(&self, number: usize, answers: &AnswerMap) -> bool {
        let numbering = self.numbering();
        numbering.locate(number).is_some_and(|(numbered, _)| {
            extractor::is_answered(numbered.block, numbered.start, number, answers)
        })
    }

    /// Returns every question number with whether it has been answered, in order.
    pub fn answered_numbers(&self, answers: &AnswerMap) -> Vec<(usize, bool)> {
        extractor::answered_numbers(&self.numbering(), answers)
    }

    /// Returns how many questions have been answered.
    pub fn progress(&self, answers: &AnswerMap) -> Progress {
        extractor::progress(&self.numbering(), answers)
    }

    /// Scores the learner's answers.
    pub fn grade(&self, answers: &AnswerMap) -> ScoreReport {
        scorer::score_test(&self.numbering(), answers, &self.scorer)
    }

    /// Scores the learner's answers and returns the record of the submission.
    pub fn submit(&self, answers: AnswerMap, submitted_at: DateTime<Utc>) -> Submission {
        let report = self.grade(&answers);
        let submission = Submission::new(
            &report,
            self.test.kind,
            &self.options,
            answers,
            submitted_at,
        );
        debug!(
            title = %self.test.title,
            correct = submission.correct_count,
            total = submission.total_slots,
            band = ?submission.band,
            "submitted test"
        );
        submission
    }

    /// Returns the problems found in the test definition.
    pub fn warnings(&self) -> Vec<AuthoringWarning> {
        diagnostics::lint(&self.test)
    }
}
