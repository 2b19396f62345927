//! Reports problems in a test definition that the numbering and scoring silently work around.
//!
//! Unknown block types are treated as multiple choice, blocks without detectable blanks still take
//! up one question number, and questions without an answer key can never be scored as correct.
//! None of these stop a learner from taking the test, but all of them are most likely mistakes made
//! while authoring it.

use std::fmt;

use crate::{
    classifier::classify_known,
    data::{BlockKind, CanonicalType, Test},
    numbering::assign_numbers,
    slots::detected_slots,
};

/// A problem found in a test definition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuthoringWarning {
    /// The block's type string names no known type, so it was classified as multiple choice.
    UnknownType {
        /// The index of the section containing the block.
        section: usize,

        /// The index of the block inside the section.
        block: usize,

        /// The type string found in the test definition.
        declared_type: String,
    },

    /// The block's contents have no detectable blanks, so it was given a single question number.
    NoBlanksDetected {
        /// The index of the section containing the block.
        section: usize,

        /// The index of the block inside the section.
        block: usize,

        /// The canonical type of the block.
        canonical_type: CanonicalType,
    },

    /// The question has no expected answer.
    MissingAnswerKey {
        /// The absolute question number.
        number: usize,
    },
}

impl fmt::Display for AuthoringWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthoringWarning::UnknownType {
                section,
                block,
                declared_type,
            } => write!(
                f,
                "block {block} of section {section} has unknown type \"{declared_type}\" and is \
                 treated as multiple choice"
            ),
            AuthoringWarning::NoBlanksDetected {
                section,
                block,
                canonical_type,
            } => write!(
                f,
                "no blanks detected in {canonical_type} block {block} of section {section}; one \
                 question number is reserved for it"
            ),
            AuthoringWarning::MissingAnswerKey { number } => {
                write!(f, "question {number} has no answer key")
            }
        }
    }
}

/// Returns the problems found in the test, in question order.
pub fn lint(test: &Test) -> Vec<AuthoringWarning> {
    let mut warnings = vec![];
    for numbered in assign_numbers(&test.sections).iter() {
        let block = numbered.block;
        if let Some(declared_type) = &block.declared_type {
            if classify_known(declared_type).is_none() {
                warnings.push(AuthoringWarning::UnknownType {
                    section: numbered.section,
                    block: numbered.index,
                    declared_type: declared_type.clone(),
                });
            }
        }

        if detected_slots(block) == 0 {
            warnings.push(AuthoringWarning::NoBlanksDetected {
                section: numbered.section,
                block: numbered.index,
                canonical_type: block.canonical_type(),
            });
        }

        let missing_key: Vec<usize> = match &block.kind {
            BlockKind::MultiSelect(q) => {
                if q.correct_answers.iter().all(|a| a.trim().is_empty()) {
                    numbered.numbers().collect()
                } else {
                    vec![]
                }
            }
            kind => numbered
                .numbers()
                .filter(|number| kind.expected_answer(number - numbered.start).is_none())
                .collect(),
        };
        warnings.extend(
            missing_key
                .into_iter()
                .map(|number| AuthoringWarning::MissingAnswerKey { number }),
        );
    }
    warnings
}
