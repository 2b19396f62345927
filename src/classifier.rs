//! Resolves the type strings found in test definitions into canonical question types.
//!
//! Test definitions written by different versions of the editors use different names for the same
//! question type, for example `matching-headings`, `IELTS-Matching-Headings`, or
//! `matching_headings`. Names are compared after lowercasing them and removing every character that
//! is not a letter or a digit, and after dropping the exam brand some editors prepend to them.

use strum::IntoEnumIterator;

use crate::data::CanonicalType;

/// The exam brands that some editors prepend to the type name.
const BRAND_PREFIXES: &[&str] = &["ielts", "cambridge"];

/// The legacy and alternative names of the canonical types, in compact form. The canonical names
/// themselves are not listed.
const ALIASES: &[(&str, CanonicalType)] = &[
    ("mcq", CanonicalType::MultipleChoice),
    ("singlechoice", CanonicalType::MultipleChoice),
    ("multiplechoicesingle", CanonicalType::MultipleChoice),
    ("multipleselect", CanonicalType::MultiSelect),
    ("multiselection", CanonicalType::MultiSelect),
    ("multipleanswer", CanonicalType::MultiSelect),
    ("multipleanswers", CanonicalType::MultiSelect),
    ("multiplechoicemultiple", CanonicalType::MultiSelect),
    ("choosetwo", CanonicalType::MultiSelect),
    ("checkbox", CanonicalType::MultiSelect),
    ("fillintheblank", CanonicalType::FillInBlank),
    ("fillintheblanks", CanonicalType::FillInBlank),
    ("fillinblanks", CanonicalType::FillInBlank),
    ("fillblank", CanonicalType::FillInBlank),
    ("gapfill", CanonicalType::FillInBlank),
    ("shortanswer", CanonicalType::FillInBlank),
    ("shortanswerquestions", CanonicalType::FillInBlank),
    ("matchingfeatures", CanonicalType::Matching),
    ("matchingsentenceendings", CanonicalType::Matching),
    ("paragraphmatch", CanonicalType::ParagraphMatching),
    ("matchingparagraph", CanonicalType::ParagraphMatching),
    ("matchinginformation", CanonicalType::ParagraphMatching),
    ("matchingheading", CanonicalType::MatchingHeadings),
    ("headingmatching", CanonicalType::MatchingHeadings),
    ("headings", CanonicalType::MatchingHeadings),
    ("cloze", CanonicalType::Cloze),
    ("clozepassage", CanonicalType::Cloze),
    ("summarycompletion", CanonicalType::Cloze),
    ("summary", CanonicalType::Cloze),
    ("completesentence", CanonicalType::SentenceCompletion),
    ("sentenceendings", CanonicalType::SentenceCompletion),
    ("form", CanonicalType::FormCompletion),
    ("formfilling", CanonicalType::FormCompletion),
    ("table", CanonicalType::TableCompletion),
    ("notes", CanonicalType::NotesCompletion),
    ("notecompletion", CanonicalType::NotesCompletion),
    ("map", CanonicalType::MapLabeling),
    ("maplabelling", CanonicalType::MapLabeling),
    ("planlabeling", CanonicalType::MapLabeling),
    ("planlabelling", CanonicalType::MapLabeling),
    ("diagramlabeling", CanonicalType::MapLabeling),
    ("diagramlabelling", CanonicalType::MapLabeling),
    ("tfng", CanonicalType::TrueFalseNotGiven),
    ("truefalse", CanonicalType::TrueFalseNotGiven),
    ("yesnonotgiven", CanonicalType::TrueFalseNotGiven),
    ("ynng", CanonicalType::TrueFalseNotGiven),
];

/// Lowercases the name and removes every character that is not a letter or a digit.
fn compact(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns the canonical type for the given type string, or `None` if the string names no known
/// type.
pub fn classify_known(raw_type: &str) -> Option<CanonicalType> {
    let mut key = compact(raw_type);
    for prefix in BRAND_PREFIXES {
        if let Some(rest) = key.strip_prefix(prefix) {
            if !rest.is_empty() {
                key = rest.to_string();
            }
            break;
        }
    }

    CanonicalType::iter()
        .find(|canonical_type| compact(&canonical_type.to_string()) == key)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == key)
                .map(|(_, canonical_type)| *canonical_type)
        })
}

/// Returns the canonical type for the given type string. Unknown strings are classified as
/// multiple choice, which takes up a single question number.
pub fn classify(raw_type: &str) -> CanonicalType {
    classify_known(raw_type).unwrap_or(CanonicalType::MultipleChoice)
}
