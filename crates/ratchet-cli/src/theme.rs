//! Terminal styling for `ratchetctl` output.

use colored::Colorize;

/// Width of the rule under a section title.
const RULE_WIDTH: usize = 50;

/// Column width of field names in record output.
const FIELD_WIDTH: usize = 20;

/// How a command finished. Picks the marker and color of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Records were changed.
    Done,
    /// The addressed record does not exist.
    Missing,
    /// Nothing to show.
    Empty,
    /// The command failed.
    Failed,
}

/// Styling helpers for terminal output.
pub(crate) struct Theme;

impl Theme {
    /// A section title with a rule underneath.
    pub(crate) fn section(title: &str) -> String {
        format!("{}\n{}", title.bold().cyan(), "━".repeat(RULE_WIDTH).dimmed())
    }

    /// A one-line command result.
    pub(crate) fn outcome(outcome: Outcome, text: &str) -> String {
        match outcome {
            Outcome::Done => format!("{} {text}", "✓".green()),
            Outcome::Missing => format!("{} {}", "!".yellow(), text.yellow()),
            Outcome::Empty => format!("{} {text}", "-".dimmed()),
            Outcome::Failed => format!("{} {}", "✗".red(), text.red()),
        }
    }

    /// The id line heading a record.
    pub(crate) fn record_id(id: &str) -> String {
        id.bold().to_string()
    }

    /// A field name, padded before styling so values line up.
    pub(crate) fn field(name: &str) -> String {
        format!("{name:<FIELD_WIDTH$}").dimmed().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_keeps_message_text() {
        for outcome in [
            Outcome::Done,
            Outcome::Missing,
            Outcome::Empty,
            Outcome::Failed,
        ] {
            assert!(Theme::outcome(outcome, "Removed session '+1.1'").contains("Removed session"));
        }
    }

    #[test]
    fn test_field_is_padded() {
        assert!(Theme::field("id").contains(&format!("{:<FIELD_WIDTH$}", "id")));
    }

    #[test]
    fn test_section_has_rule() {
        let section = Theme::section("Record Store");
        assert!(section.contains("Record Store"));
        assert!(section.contains(&"━".repeat(RULE_WIDTH)));
    }
}
