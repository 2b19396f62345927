//! Converts raw scores into IELTS band scores.
//!
//! The published conversion tables are defined for papers of 40 questions. Raw scores of papers
//! with a different number of questions are scaled to 40 questions, rounding to the nearest
//! integer, before looking them up.

use crate::data::TestKind;

/// The number of questions of a standard Listening or Reading paper.
pub const STANDARD_PAPER_LENGTH: usize = 40;

/// The minimum raw score (out of 40) needed for each Listening band, in descending order.
const LISTENING_BANDS: &[(usize, f32)] = &[
    (39, 9.0),
    (37, 8.5),
    (35, 8.0),
    (32, 7.5),
    (30, 7.0),
    (26, 6.5),
    (23, 6.0),
    (18, 5.5),
    (16, 5.0),
    (13, 4.5),
    (10, 4.0),
    (8, 3.5),
    (6, 3.0),
    (4, 2.5),
    (2, 2.0),
    (1, 1.0),
];

/// The minimum raw score (out of 40) needed for each Academic Reading band, in descending order.
const READING_BANDS: &[(usize, f32)] = &[
    (39, 9.0),
    (37, 8.5),
    (35, 8.0),
    (33, 7.5),
    (30, 7.0),
    (27, 6.5),
    (23, 6.0),
    (19, 5.5),
    (15, 5.0),
    (13, 4.5),
    (10, 4.0),
    (8, 3.5),
    (6, 3.0),
    (4, 2.5),
    (2, 2.0),
    (1, 1.0),
];

/// Scales a raw score to a paper of 40 questions.
fn scale_to_standard(correct: usize, total: usize) -> usize {
    if total == STANDARD_PAPER_LENGTH {
        return correct.min(total);
    }
    let scaled = correct.min(total) as f64 * STANDARD_PAPER_LENGTH as f64 / total as f64;
    scaled.round() as usize
}

/// Returns the band score for the given raw score, or `None` if no band table applies to the kind
/// of test or the test has no questions.
pub fn band_score(kind: TestKind, correct: usize, total: usize) -> Option<f32> {
    let table = match kind {
        TestKind::Listening => LISTENING_BANDS,
        TestKind::Reading => READING_BANDS,
        TestKind::Generic => return None,
    };
    if total == 0 {
        return None;
    }

    let scaled = scale_to_standard(correct, total);
    Some(
        table
            .iter()
            .find(|(minimum, _)| scaled >= *minimum)
            .map_or(0.0, |(_, band)| *band),
    )
}
