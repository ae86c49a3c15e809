//! Locating hunks and stageable lines in a unified diff.
//!
//! All positions are 0-based indices into the patch split on `'\n'`, so
//! the header lines (`diff --git`, `index`, `---`, `+++`) occupy the first
//! indices and the first `@@` line marks the end of the header block.

/// Split patch text into lines. A trailing newline does not produce a
/// final empty line.
pub(crate) fn patch_lines(patch: &str) -> Vec<&str> {
    patch.split_terminator('\n').collect()
}

/// Hunk and stageable line positions within a patch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPatch {
    /// Indices of `@@` hunk header lines, ascending
    pub hunk_starts: Vec<usize>,
    /// Indices of `+` and `-` lines at or after the first hunk header, ascending
    pub stageable_lines: Vec<usize>,
    /// Total number of lines in the patch
    pub line_count: usize,
}

/// Scan a patch for hunk headers and stageable lines.
///
/// Never fails: input without any `@@` line yields empty sequences.
///
/// # Examples
///
/// ```
/// use git_picker::parse_patch;
///
/// let patch = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-old\n+new\n";
/// let parsed = parse_patch(patch);
/// assert_eq!(parsed.hunk_starts, vec![2]);
/// assert_eq!(parsed.stageable_lines, vec![3, 4]);
/// ```
#[must_use]
pub fn parse_patch(patch: &str) -> ParsedPatch {
    let lines = patch_lines(patch);
    let mut parsed = ParsedPatch {
        line_count: lines.len(),
        ..ParsedPatch::default()
    };
    let mut past_first_header = false;

    for (index, line) in lines.iter().enumerate() {
        if line.starts_with("@@") {
            parsed.hunk_starts.push(index);
            past_first_header = true;
        } else if past_first_header && (line.starts_with('+') || line.starts_with('-')) {
            parsed.stageable_lines.push(index);
        }
    }

    parsed
}

impl ParsedPatch {
    /// Index of the first stageable line at or after `current`, falling back
    /// to the last stageable line. `None` if nothing is stageable.
    #[must_use]
    pub fn next_stageable_line(&self, current: usize) -> Option<usize> {
        self.stageable_lines
            .iter()
            .copied()
            .find(|&index| index >= current)
            .or_else(|| self.stageable_lines.last().copied())
    }

    /// Header index of the hunk containing `line`, moved by `offset` hunks
    /// and clamped to the available hunks.
    ///
    /// A line past the last hunk selects the last hunk, and a line in the
    /// header block selects the first.
    #[must_use]
    pub fn hunk_containing_line(&self, line: usize, offset: isize) -> Option<usize> {
        let last = self.hunk_starts.len().checked_sub(1)?;
        if line >= self.line_count {
            return self.hunk_starts.get(last).copied();
        }

        let Some(position) = self.hunk_starts.iter().rposition(|&start| start <= line) else {
            return self.hunk_starts.first().copied();
        };
        let position = position.saturating_add_signed(offset).min(last);

        self.hunk_starts.get(position).copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use similar_asserts::assert_eq;

    const SIMPLE_DIFF: &str = "diff --git a/filename b/filename
index dcd3485..1ba5540 100644
--- a/filename
+++ b/filename
@@ -1,6 +1,6 @@
 apple
 pear
 plum
-orange
-lime
+grape
+kiwi
 ...
";

    const TWO_HUNKS: &str = "diff --git a/filename b/filename
index e48a11c..b2ab81b 100644
--- a/filename
+++ b/filename
@@ -1,3 +1,3 @@
 apple
-grape
+orange
 ...
@@ -8,3 +8,5 @@ grape
 ...
+pear
+lemon
 ...
";

    #[test]
    fn parse_single_hunk_positions() {
        let parsed = parse_patch(SIMPLE_DIFF);
        assert_eq!(parsed.hunk_starts, vec![4]);
        assert_eq!(parsed.stageable_lines, vec![8, 9, 10, 11]);
        assert_eq!(parsed.line_count, 13);
    }

    #[test]
    fn header_markers_are_not_stageable() {
        // `---` and `+++` precede the first hunk header
        let parsed = parse_patch(TWO_HUNKS);
        assert_eq!(parsed.hunk_starts, vec![4, 9]);
        assert_eq!(parsed.stageable_lines, vec![6, 7, 11, 12]);
    }

    #[test]
    fn non_diff_input_is_empty() {
        assert_eq!(parse_patch(""), ParsedPatch::default());

        let parsed = parse_patch("just some text\n-with a dash\n");
        assert!(parsed.hunk_starts.is_empty());
        assert!(parsed.stageable_lines.is_empty());
    }

    #[test]
    fn next_stageable_line_includes_current() {
        let parsed = parse_patch(TWO_HUNKS);
        assert_eq!(parsed.next_stageable_line(0), Some(6));
        assert_eq!(parsed.next_stageable_line(7), Some(7));
        assert_eq!(parsed.next_stageable_line(8), Some(11));
        // Past the end falls back to the last stageable line
        assert_eq!(parsed.next_stageable_line(100), Some(12));
        assert_eq!(parse_patch("").next_stageable_line(0), None);
    }

    #[test]
    fn hunk_containing_line_with_offsets() {
        let parsed = parse_patch(TWO_HUNKS);
        assert_eq!(parsed.hunk_containing_line(6, 0), Some(4));
        assert_eq!(parsed.hunk_containing_line(11, 0), Some(9));
        assert_eq!(parsed.hunk_containing_line(6, 1), Some(9));
        assert_eq!(parsed.hunk_containing_line(11, -1), Some(4));
        // Clamped at both ends
        assert_eq!(parsed.hunk_containing_line(6, -3), Some(4));
        assert_eq!(parsed.hunk_containing_line(11, 5), Some(9));
        // Header block and past-the-end positions
        assert_eq!(parsed.hunk_containing_line(1, 0), Some(4));
        assert_eq!(parsed.hunk_containing_line(1, 1), Some(4));
        assert_eq!(parsed.hunk_containing_line(50, -1), Some(9));
        assert_eq!(parse_patch("").hunk_containing_line(0, 0), None);
    }

    fn diff_line() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z ]{0,8}".prop_map(|s| format!(" {s}")),
            "[a-z ]{0,8}".prop_map(|s| format!("+{s}")),
            "[a-z ]{0,8}".prop_map(|s| format!("-{s}")),
            Just("@@ -1,2 +1,2 @@".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn positions_are_ascending_and_classified(lines in prop::collection::vec(diff_line(), 0..40)) {
            let patch = lines.join("\n");
            let parsed = parse_patch(&patch);

            prop_assert!(parsed.hunk_starts.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(parsed.stageable_lines.windows(2).all(|w| w[0] < w[1]));

            for &start in &parsed.hunk_starts {
                prop_assert!(lines[start].starts_with("@@"));
            }
            for &index in &parsed.stageable_lines {
                prop_assert!(index > parsed.hunk_starts[0]);
                prop_assert!(lines[index].starts_with('+') || lines[index].starts_with('-'));
            }
        }
    }
}
