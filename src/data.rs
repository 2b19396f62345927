//! Defines the basic data structures used by Marksheet to describe a test, its sections and the
//! question blocks inside them, as well as the options that control how answers are graded.

pub mod answers;
pub mod wire;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use ts_rs::TS;
use ustr::Ustr;

/// The number of options a multi-select block expects when the test definition does not say.
pub const DEFAULT_REQUIRED_ANSWERS: usize = 2;

/// The largest number of options a multi-select block can require, one per option letter.
pub const MAX_REQUIRED_ANSWERS: usize = 26;

/// The canonical type of a question block, after the type string found in the test definition has
/// been resolved by the classifier.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, Hash, PartialEq, Serialize, TS,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CanonicalType {
    /// A question answered by picking a single option.
    MultipleChoice,

    /// A question answered by picking several options. It occupies as many question numbers as
    /// the number of options it requires.
    MultiSelect,

    /// A short free-text answer.
    FillInBlank,

    /// A list of items, each matched to an option from a second list.
    Matching,

    /// Statements with ellipsis gaps, each filled with the letter of the paragraph that contains
    /// the information. All gaps share the same pool of paragraph letters.
    ParagraphMatching,

    /// A list of paragraphs, each paired with a heading chosen from a shared list.
    MatchingHeadings,

    /// A passage or summary with embedded `[BLANK]` markers.
    #[serde(rename = "cloze-test")]
    #[strum(serialize = "cloze-test")]
    Cloze,

    /// A sentence whose ending is completed with free text.
    SentenceCompletion,

    /// A form whose blank rows are completed with free text.
    FormCompletion,

    /// A table whose blank cells are completed with free text.
    TableCompletion,

    /// Notes with numbered gaps completed with free text.
    NotesCompletion,

    /// A map, plan or diagram whose marked locations are labeled.
    MapLabeling,

    /// A statement judged as true/false/not given (or yes/no/not given).
    TrueFalseNotGiven,
}

/// The way a block's responses are stored in the answer map.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyScheme {
    /// One `q_<number>` key per question number.
    PerSlot,

    /// One `q_<start>_<index>` key per blank, where `index` is zero-based and `start` is the
    /// first question number of the block.
    SubKeyed,

    /// A single `q_<start>` key holding a map from paragraph ID to the chosen heading.
    HeadingMap,

    /// A single `q_<start>` key holding the list of selected options.
    Selection,
}

impl CanonicalType {
    /// Returns whether the answers to this type are free text, which are compared ignoring case
    /// and extra whitespace. Answers to all other types are letters or fixed tokens.
    pub fn is_free_text(&self) -> bool {
        matches!(
            self,
            Self::FillInBlank
                | Self::SentenceCompletion
                | Self::Cloze
                | Self::FormCompletion
                | Self::TableCompletion
                | Self::NotesCompletion
        )
    }

    /// Returns how the responses to blocks of this type are keyed in the answer map.
    pub fn key_scheme(&self) -> KeyScheme {
        match self {
            Self::Cloze | Self::ParagraphMatching => KeyScheme::SubKeyed,
            Self::MatchingHeadings => KeyScheme::HeadingMap,
            Self::MultiSelect => KeyScheme::Selection,
            _ => KeyScheme::PerSlot,
        }
    }
}

/// The payload of a question answered by picking a single option or token.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChoiceQuestion {
    /// The options shown to the learner. Can be empty for true/false/not given questions.
    pub options: Vec<String>,

    /// The expected option, usually a letter.
    pub correct_answer: String,
}

/// The payload of a question answered by picking several options.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiSelectQuestion {
    /// The options shown to the learner.
    pub options: Vec<String>,

    /// The number of options the learner must pick. Each one takes up a question number.
    pub required_answers: usize,

    /// The expected options, as letters or zero-based indices.
    pub correct_answers: Vec<String>,
}

impl Default for MultiSelectQuestion {
    fn default() -> Self {
        Self {
            options: vec![],
            required_answers: DEFAULT_REQUIRED_ANSWERS,
            correct_answers: vec![],
        }
    }
}

/// The payload of a question answered with a short piece of free text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextQuestion {
    /// The expected answer. Alternative answers are separated by `|`.
    pub correct_answer: String,
}

/// The payload of a matching question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchingQuestion {
    /// The items on the left column. Each one takes up a question number.
    pub left_items: Vec<String>,

    /// The options on the right column.
    pub right_items: Vec<String>,

    /// The expected option for each left item, in order.
    pub answers: Vec<String>,
}

/// The payload of a question whose blanks are embedded in a piece of rich text. Used by cloze,
/// paragraph-matching, and notes-completion blocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PassageQuestion {
    /// The rich text containing the blank markers. It may contain HTML tags.
    pub text: String,

    /// The word bank or shared option pool, if any.
    pub options: Vec<String>,

    /// The expected answer for each blank, in order of appearance.
    pub answers: Vec<String>,
}

/// A paragraph in a matching-headings question.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadingParagraph {
    /// The ID under which the learner's chosen heading is stored.
    pub id: Ustr,

    /// The label shown to the learner, for example "Paragraph B".
    pub label: String,

    /// The expected heading.
    pub correct_heading: String,
}

/// The payload of a matching-headings question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeadingsQuestion {
    /// The paragraphs to match. Each one takes up a question number.
    pub paragraphs: Vec<HeadingParagraph>,

    /// The list of headings shared by all the paragraphs.
    pub headings: Vec<String>,
}

/// A row in a form-completion question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormRow {
    /// The label of the row.
    pub label: String,

    /// Whether the row is a blank the learner must fill in.
    pub is_blank: bool,

    /// The expected answer for blank rows. Alternative answers are separated by `|`.
    pub correct_answer: String,
}

/// The payload of a form-completion question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormQuestion {
    /// The rows of the form, blank or not.
    pub rows: Vec<FormRow>,
}

/// The payload of a table-completion question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableQuestion {
    /// The text of each cell, row by row. Blanks are marked inside the cell text.
    pub rows: Vec<Vec<String>>,

    /// The expected answer for each blank, in reading order.
    pub answers: Vec<String>,
}

/// A labelable location in a map-labeling question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapItem {
    /// The label or description of the location.
    pub label: String,

    /// The expected option for the location.
    pub correct_answer: String,
}

/// The payload of a map-labeling question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapQuestion {
    /// The locations to label. Each one takes up a question number.
    pub items: Vec<MapItem>,

    /// The options shared by all locations.
    pub options: Vec<String>,
}

/// The type-specific contents of a block. The variant determines the block's canonical type.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum BlockKind {
    MultipleChoice(ChoiceQuestion),
    MultiSelect(MultiSelectQuestion),
    FillInBlank(TextQuestion),
    Matching(MatchingQuestion),
    ParagraphMatching(PassageQuestion),
    MatchingHeadings(HeadingsQuestion),
    Cloze(PassageQuestion),
    SentenceCompletion(TextQuestion),
    FormCompletion(FormQuestion),
    TableCompletion(TableQuestion),
    NotesCompletion(PassageQuestion),
    MapLabeling(MapQuestion),
    TrueFalseNotGiven(ChoiceQuestion),
}

impl BlockKind {
    /// Returns the canonical type matching this variant.
    pub fn canonical_type(&self) -> CanonicalType {
        match self {
            Self::MultipleChoice(_) => CanonicalType::MultipleChoice,
            Self::MultiSelect(_) => CanonicalType::MultiSelect,
            Self::FillInBlank(_) => CanonicalType::FillInBlank,
            Self::Matching(_) => CanonicalType::Matching,
            Self::ParagraphMatching(_) => CanonicalType::ParagraphMatching,
            Self::MatchingHeadings(_) => CanonicalType::MatchingHeadings,
            Self::Cloze(_) => CanonicalType::Cloze,
            Self::SentenceCompletion(_) => CanonicalType::SentenceCompletion,
            Self::FormCompletion(_) => CanonicalType::FormCompletion,
            Self::TableCompletion(_) => CanonicalType::TableCompletion,
            Self::NotesCompletion(_) => CanonicalType::NotesCompletion,
            Self::MapLabeling(_) => CanonicalType::MapLabeling,
            Self::TrueFalseNotGiven(_) => CanonicalType::TrueFalseNotGiven,
        }
    }

    /// Returns the expected answer for the slot at the given zero-based offset inside the block,
    /// or `None` if the answer key is missing or blank. Multi-select blocks are graded as a group,
    /// so they have no per-slot answer.
    pub fn expected_answer(&self, slot: usize) -> Option<&str> {
        let expected = match self {
            Self::MultipleChoice(q) | Self::TrueFalseNotGiven(q) => {
                (slot == 0).then_some(q.correct_answer.as_str())
            }
            Self::FillInBlank(q) | Self::SentenceCompletion(q) => {
                (slot == 0).then_some(q.correct_answer.as_str())
            }
            Self::MultiSelect(_) => None,
            Self::Matching(q) => q.answers.get(slot).map(String::as_str),
            Self::ParagraphMatching(q) | Self::Cloze(q) | Self::NotesCompletion(q) => {
                q.answers.get(slot).map(String::as_str)
            }
            Self::MatchingHeadings(q) => q.paragraphs.get(slot).map(|p| p.correct_heading.as_str()),
            Self::FormCompletion(q) => q
                .rows
                .iter()
                .filter(|row| row.is_blank)
                .nth(slot)
                .map(|row| row.correct_answer.as_str()),
            Self::TableCompletion(q) => q.answers.get(slot).map(String::as_str),
            Self::MapLabeling(q) => q.items.get(slot).map(|item| item.correct_answer.as_str()),
        };
        expected.filter(|e| !e.trim().is_empty())
    }
}

/// A single question unit inside a section.
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct Block {
    /// The ID of the block in the test definition, if it has one.
    #[builder(default, setter(into, strip_option))]
    pub id: Option<Ustr>,

    /// The prompt shown above the block.
    #[builder(default, setter(into))]
    pub question_text: String,

    /// The type string the block was declared with in the test definition. It is `None` for
    /// blocks that were constructed directly.
    #[builder(default, setter(into, strip_option))]
    pub declared_type: Option<String>,

    /// The type-specific contents of the block.
    pub kind: BlockKind,
}

impl Block {
    /// Creates a block with the given contents and no ID or prompt.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: None,
            question_text: String::new(),
            declared_type: None,
            kind,
        }
    }

    /// Returns the canonical type of the block.
    pub fn canonical_type(&self) -> CanonicalType {
        self.kind.canonical_type()
    }
}

/// A section of a test, called a part in Listening tests and a passage in Reading tests.
#[derive(Builder, Clone, Debug, Default, PartialEq)]
pub struct Section {
    /// The title of the section.
    #[builder(default, setter(into))]
    pub title: String,

    /// The instructions shown at the top of the section.
    #[builder(default, setter(into))]
    pub instruction: String,

    /// The blocks in the section, in the order they are presented.
    #[builder(default)]
    pub blocks: Vec<Block>,
}

/// The skill assessed by a test. It decides which band table applies to the final score.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, TS)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    /// A test made of parts.
    Listening,

    /// A test made of passages.
    Reading,

    /// A test whose skill is not known. No band score is computed for it.
    #[default]
    Generic,
}

/// A complete test. It does not change during a test-taking session.
#[derive(Builder, Clone, Debug, Default, PartialEq)]
pub struct Test {
    /// The skill assessed by the test.
    #[builder(default)]
    pub kind: TestKind,

    /// The title of the test.
    #[builder(default, setter(into))]
    pub title: String,

    /// The sections of the test, in order.
    #[builder(default)]
    pub sections: Vec<Section>,
}

/// Options to control how the learner's answers are graded.
#[derive(Builder, Clone, Debug, Deserialize, PartialEq, Serialize)]
#[builder(default)]
#[serde(default, rename_all = "camelCase")]
pub struct GradingOptions {
    /// If true, a multi-select group is only correct when the selection is exactly the expected
    /// set. If false, every expected option must be selected and extra selections are ignored.
    pub strict_multi_select: bool,

    /// The minimum percentage of correct answers needed to pass the test.
    pub passing_percentage: u32,
}

impl Default for GradingOptions {
    /// Returns the default grading options.
    fn default() -> Self {
        GradingOptions {
            strict_multi_select: false,
            passing_percentage: 60,
        }
    }
}
