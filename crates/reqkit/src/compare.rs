//! Revision-to-revision comparison of a single manifest.
//!
//! The precise comparison diffs the normalized requirement sets. If either
//! side fails to parse, the comparison degrades to counting inserted and
//! deleted lines, which may over-report changes but never hides one.

use crate::requirements::parser;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::fmt;

/// Outcome of comparing two versions of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Comparison {
    /// Same normalized requirements
    Unchanged,
    /// The manifest did not exist in the old revision
    Added,
    /// Normalized requirements differ
    Changed {
        /// Tokens only in the new version
        added: Vec<String>,
        /// Tokens only in the old version
        removed: Vec<String>,
    },
    /// One side could not be parsed; line counts from a text diff
    Coarse {
        /// Lines inserted
        insertions: usize,
        /// Lines deleted
        deletions: usize,
    },
}

impl Comparison {
    /// Whether the manifest needs to be reinstalled.
    pub fn is_changed(&self) -> bool {
        match self {
            Comparison::Unchanged => false,
            Comparison::Added | Comparison::Changed { .. } => true,
            Comparison::Coarse {
                insertions,
                deletions,
            } => insertions + deletions > 0,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Unchanged => write!(f, "unchanged"),
            Comparison::Added => write!(f, "new file"),
            Comparison::Changed { added, removed } => {
                write!(f, "+{} -{} requirements", added.len(), removed.len())
            }
            Comparison::Coarse {
                insertions,
                deletions,
            } => write!(f, "+{insertions} -{deletions} lines (unparsed)"),
        }
    }
}

/// Compare the old and new content of one manifest.
///
/// `old` is `None` when the manifest does not exist in the old revision.
pub fn compare(old: Option<&str>, new: &str) -> Comparison {
    let Some(old) = old else {
        return Comparison::Added;
    };

    match (parser::requirement_set(old), parser::requirement_set(new)) {
        (Ok(old_set), Ok(new_set)) => {
            let added: Vec<String> = new_set.difference(&old_set).cloned().collect();
            let removed: Vec<String> = old_set.difference(&new_set).cloned().collect();
            if added.is_empty() && removed.is_empty() {
                Comparison::Unchanged
            } else {
                Comparison::Changed { added, removed }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("Falling back to line diff: {e}");
            coarse(old, new)
        }
    }
}

/// Count inserted and deleted lines between two texts.
pub fn coarse(old: &str, new: &str) -> Comparison {
    let diff = TextDiff::from_lines(old, new);
    let mut insertions = 0;
    let mut deletions = 0;

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => insertions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => {}
        }
    }

    Comparison::Coarse {
        insertions,
        deletions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_ignores_cosmetic_edits() {
        let old = "Django==1.8\nrequests\n";
        let new = "# reordered\nrequests   # http\n\nDjango==1.8\n";
        assert_eq!(compare(Some(old), new), Comparison::Unchanged);
        assert!(!compare(Some(old), new).is_changed());
    }

    #[test]
    fn test_vcs_url_move_is_unchanged() {
        let old = "git+https://github.com/org/lib.git@abc123#egg=lib";
        let new = "-e git+ssh://git@github.com/org/lib.git@abc123#egg=lib";
        assert_eq!(compare(Some(old), new), Comparison::Unchanged);
    }

    #[test]
    fn test_changed_lists_tokens() {
        let old = "Django==1.8\ngit+https://host/lib.git@abc#egg=lib";
        let new = "Django==1.9\ngit+https://host/lib.git@def#egg=lib";
        assert_eq!(
            compare(Some(old), new),
            Comparison::Changed {
                added: vec!["Django==1.9".to_string(), "lib==def".to_string()],
                removed: vec!["Django==1.8".to_string(), "lib==abc".to_string()],
            }
        );
    }

    #[test]
    fn test_missing_old_is_added() {
        assert_eq!(compare(None, "Django"), Comparison::Added);
        assert!(Comparison::Added.is_changed());
    }

    #[test]
    fn test_parse_failure_falls_back_to_line_diff() {
        let old = "Django==1.8\n-c constraints.txt\n";
        let new = "Django==1.9\n-c constraints.txt\n";
        let result = compare(Some(old), new);
        assert_eq!(
            result,
            Comparison::Coarse {
                insertions: 1,
                deletions: 1
            }
        );
        assert!(result.is_changed());
    }

    #[test]
    fn test_fallback_with_identical_text_is_unchanged() {
        let text = "git+https://host/lib.git#egg=lib\n";
        let result = compare(Some(text), text);
        assert_eq!(
            result,
            Comparison::Coarse {
                insertions: 0,
                deletions: 0
            }
        );
        assert!(!result.is_changed());
    }

    #[test]
    fn test_display() {
        assert_eq!(Comparison::Unchanged.to_string(), "unchanged");
        assert_eq!(
            Comparison::Coarse {
                insertions: 2,
                deletions: 1
            }
            .to_string(),
            "+2 -1 lines (unparsed)"
        );
    }
}
