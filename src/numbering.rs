//! Assigns absolute question numbers to the blocks of a test.
//!
//! The numbering is a single left-to-right walk over the sections and their blocks. A running
//! counter starts at the first question number, each block takes the next `slot_count` numbers,
//! and the counter moves past them. The numbering is never stored. It is recomputed from the
//! current sections whenever it is needed, so it stays correct while a test is being edited.

use std::ops::RangeInclusive;

use crate::{
    data::{Block, Section},
    slots::slot_count,
};

/// A block together with the range of question numbers it occupies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberedBlock<'a> {
    /// The index of the section containing the block.
    pub section: usize,

    /// The index of the block inside its section.
    pub index: usize,

    /// The block itself.
    pub block: &'a Block,

    /// The first question number occupied by the block.
    pub start: usize,

    /// The last question number occupied by the block.
    pub end: usize,
}

impl NumberedBlock<'_> {
    /// Returns the number of question numbers occupied by the block.
    pub fn slot_count(&self) -> usize {
        self.end - self.start + 1
    }

    /// Returns the question numbers occupied by the block.
    pub fn numbers(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Returns whether the block occupies the given question number.
    pub fn contains(&self, number: usize) -> bool {
        self.numbers().contains(&number)
    }
}

/// The question numbers assigned to every block of a list of sections.
#[derive(Clone, Debug, PartialEq)]
pub struct Numbering<'a> {
    /// The numbered blocks, in order.
    blocks: Vec<NumberedBlock<'a>>,

    /// The number assigned to the first slot.
    first: usize,
}

impl<'a> Numbering<'a> {
    /// Returns the numbered blocks in order.
    pub fn blocks(&self) -> &[NumberedBlock<'a>] {
        &self.blocks
    }

    /// Returns an iterator over the numbered blocks.
    pub fn iter(&self) -> impl Iterator<Item = &NumberedBlock<'a>> {
        self.blocks.iter()
    }

    /// Returns the number assigned to the first slot.
    pub fn first_number(&self) -> usize {
        self.first
    }

    /// Returns the last assigned question number, or `None` if there are no blocks.
    pub fn last_number(&self) -> Option<usize> {
        self.blocks.last().map(|numbered| numbered.end)
    }

    /// Returns the total number of slots.
    pub fn total_slots(&self) -> usize {
        self.blocks.iter().map(NumberedBlock::slot_count).sum()
    }

    /// Returns the block occupying the given question number and the zero-based offset of the
    /// number inside the block.
    pub fn locate(&self, number: usize) -> Option<(&NumberedBlock<'a>, usize)> {
        // Blocks are sorted by their ranges, which do not overlap.
        let position = self.blocks.partition_point(|numbered| numbered.end < number);
        let numbered = self.blocks.get(position)?;
        numbered
            .contains(number)
            .then(|| (numbered, number - numbered.start))
    }

    /// Returns the range of question numbers covered by the given section, or `None` if the
    /// section has no blocks. Used for headers like "Questions 1-10".
    pub fn section_range(&self, section: usize) -> Option<RangeInclusive<usize>> {
        let mut blocks = self.blocks.iter().filter(|numbered| numbered.section == section);
        let first = blocks.next()?;
        let last = blocks.last().unwrap_or(first);
        Some(first.start..=last.end)
    }
}

/// Assigns question numbers to the blocks of the given sections, starting at 1.
pub fn assign_numbers(sections: &[Section]) -> Numbering<'_> {
    assign_numbers_from(sections, 1)
}

/// Assigns question numbers to the blocks of the given sections, starting at the given number.
/// Used for parts whose numbering continues from earlier parts. A first number of zero is treated
/// as 1.
pub fn assign_numbers_from(sections: &[Section], first: usize) -> Numbering<'_> {
    let first = first.max(1);
    let mut counter = first;
    let mut blocks = Vec::with_capacity(sections.iter().map(|s| s.blocks.len()).sum());

    for (section_index, section) in sections.iter().enumerate() {
        for (index, block) in section.blocks.iter().enumerate() {
            let count = slot_count(block);
            blocks.push(NumberedBlock {
                section: section_index,
                index,
                block,
                start: counter,
                end: counter.saturating_add(count - 1),
            });
            counter = counter.saturating_add(count);
        }
    }

    Numbering { blocks, first }
}
