//! Counts the question numbers each block occupies.
//!
//! A block that expands into several numbered questions (a cloze passage with five blanks, a
//! matching-headings block with six paragraphs, etc.) takes up one question number per blank,
//! paragraph, or item. The count of a block depends only on its own contents.

use crate::{
    data::{Block, BlockKind, MAX_REQUIRED_ANSWERS},
    markup,
};

/// Returns the number of slots detected in the block's contents. The result is zero when a block
/// that is supposed to contain blanks has none that can be detected.
pub fn detected_slots(block: &Block) -> usize {
    match &block.kind {
        BlockKind::MultipleChoice(_)
        | BlockKind::TrueFalseNotGiven(_)
        | BlockKind::FillInBlank(_)
        | BlockKind::SentenceCompletion(_) => 1,
        BlockKind::MultiSelect(q) => q.required_answers.min(MAX_REQUIRED_ANSWERS),
        BlockKind::Matching(q) => q.left_items.len(),
        BlockKind::MatchingHeadings(q) => q.paragraphs.len(),
        BlockKind::Cloze(q) => markup::count_blank_markers(&q.text),
        BlockKind::ParagraphMatching(q) => markup::count_ellipsis_runs(&q.text),
        BlockKind::FormCompletion(q) => q.rows.iter().filter(|row| row.is_blank).count(),
        BlockKind::TableCompletion(q) => {
            let blanks: usize = q
                .rows
                .iter()
                .flatten()
                .map(|cell| markup::count_cell_blanks(cell))
                .sum();
            if blanks > 0 { blanks } else { q.rows.len() }
        }
        BlockKind::NotesCompletion(q) => {
            // Fall back to unnumbered markers for notes written with the cloze editor.
            match markup::count_numbered_blanks(&q.text) {
                0 => markup::count_blank_markers(&q.text),
                numbered => numbered,
            }
        }
        BlockKind::MapLabeling(q) => q.items.len(),
    }
}

/// Returns the number of question numbers the block occupies. Every block occupies at least one
/// question number, so that a block whose blanks cannot be detected does not vanish from the
/// numbering.
pub fn slot_count(block: &Block) -> usize {
    detected_slots(block).max(1)
}
