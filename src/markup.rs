//! Scans the rich text of question blocks for the markers that stand for answer blanks.
//!
//! Block text comes from a rich-text editor and may contain inline HTML. Tags are removed (but
//! entities are not decoded) before scanning, so that formatting neither hides nor fabricates a
//! marker.

use regex::Regex;
use std::{borrow::Cow, sync::LazyLock};

/// An HTML tag.
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// The marker used by the cloze editor.
static BLANK_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[BLANK\]").unwrap());

/// A run of three or more dots or of ellipsis characters.
static ELLIPSIS_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\.{3,}|…)+").unwrap());

/// Any of the blank markers accepted in table cells.
static CELL_BLANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[BLANK\]|_{2,}|(?:\.{3,}|…)+").unwrap());

/// A blank preceded by its question number, as in `(3) ______` or `4. ……`. A bare number only
/// counts at the start of a line, so that amounts such as `Cost: 25 ______` are not taken for
/// question numbers.
static NUMBERED_BLANK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(?:\(\d+\)|\b\d+[.):]|^[ \t]*\d+)\s*(?:\[BLANK\]|_{2,}|(?:\.{3,}|…)+)",
    )
    .unwrap()
});

/// Removes the HTML tags from the text.
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    TAG.replace_all(text, "")
}

/// Counts the `[BLANK]` markers in the text.
pub fn count_blank_markers(text: &str) -> usize {
    BLANK_MARKER.find_iter(&strip_tags(text)).count()
}

/// Counts the ellipsis runs in the text.
pub fn count_ellipsis_runs(text: &str) -> usize {
    ELLIPSIS_RUN.find_iter(&strip_tags(text)).count()
}

/// Counts the blanks in a table cell, marked with `[BLANK]`, two or more underscores, or an
/// ellipsis run.
pub fn count_cell_blanks(text: &str) -> usize {
    CELL_BLANK.find_iter(&strip_tags(text)).count()
}

/// Counts the numbered blanks in a set of notes.
pub fn count_numbered_blanks(text: &str) -> usize {
    NUMBERED_BLANK.find_iter(&strip_tags(text)).count()
}

#[cfg(test)]
mod test {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    /// Verifies that tags are removed and entities are left alone.
    #[test]
    fn strip() {
        assert_eq!(
            "The <b> tag &amp; more",
            strip_tags("The <i>&lt;b&gt;</i> tag &amp; <span class=\"x\">more</span>")
                .replace("&lt;b&gt;", "<b>")
        );
        assert_eq!("plain", strip_tags("plain"));
    }

    /// Verifies counting blank markers, including markers wrapped in formatting.
    #[test]
    fn blank_markers() {
        assert_eq!(2, count_blank_markers("... [BLANK] ... [BLANK] ..."));
        assert_eq!(1, count_blank_markers("<p>The <strong>[BLANK]</strong> was</p>"));
        assert_eq!(0, count_blank_markers("[BL<i>A</i>NK"));
        assert_eq!(0, count_blank_markers("no blanks here"));
    }

    /// Verifies that markup between dots does not hide an ellipsis.
    #[test]
    fn ellipsis_runs() {
        assert_eq!(2, count_ellipsis_runs("It was built in ..... and moved in …"));
        assert_eq!(1, count_ellipsis_runs("<p>..<b>.</b></p>"));
        assert_eq!(1, count_ellipsis_runs("a run of mixed ...… counts once"));
        assert_eq!(0, count_ellipsis_runs("Two dots .. are not a gap."));
    }

    /// Verifies counting the blanks of a table cell.
    #[test]
    fn cell_blanks() {
        assert_eq!(1, count_cell_blanks("£ ______"));
        assert_eq!(2, count_cell_blanks("[BLANK] or ..."));
        assert_eq!(0, count_cell_blanks("Monday"));
    }

    /// Verifies counting numbered blanks in notes.
    #[test]
    fn numbered_blanks() {
        let notes = indoc! {"
            Museum opens at (1) ______
            Tickets cost 2. ........
            3 [BLANK] guided tours daily
            Closed on Mondays ______
        "};
        assert_eq!(3, count_numbered_blanks(notes));
        assert_eq!(0, count_numbered_blanks("Nothing numbered [BLANK]"));
    }

    /// Verifies that an amount in front of a gap is not taken for a question number.
    #[test]
    fn amounts_are_not_numbers() {
        assert_eq!(0, count_numbered_blanks("Cost: 25 ______"));
        assert_eq!(0, count_numbered_blanks("Guided tour: £12 [BLANK]"));
        assert_eq!(1, count_numbered_blanks("Cost: 25 ______\n(4) ______ per person"));
    }
}
