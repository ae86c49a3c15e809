use super::header::HunkHeader;
use super::parser::patch_lines;
use super::{PatchError, header_length, push_lines};
use std::borrow::Cow;
use tracing::debug;

/// Result of searching the hunk start positions around a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkBound {
    /// A hunk header at this patch line index
    Found(usize),
    /// No earlier hunk exists; use the first hunk
    FirstHunk,
    /// No later hunk exists; the range runs to the end of the patch
    EndOfFile,
}

impl HunkBound {
    fn resolve(self, hunk_starts: &[usize], line_count: usize) -> Option<usize> {
        match self {
            HunkBound::Found(index) => Some(index),
            HunkBound::FirstHunk => hunk_starts.first().copied(),
            HunkBound::EndOfFile => Some(line_count),
        }
    }
}

/// Greatest hunk start strictly before `line`
#[must_use]
pub fn previous_hunk_start(hunk_starts: &[usize], line: usize) -> HunkBound {
    hunk_starts
        .iter()
        .rev()
        .copied()
        .find(|&start| start < line)
        .map_or(HunkBound::FirstHunk, HunkBound::Found)
}

/// Smallest hunk start strictly after `line`
#[must_use]
pub fn next_hunk_start(hunk_starts: &[usize], line: usize) -> HunkBound {
    hunk_starts
        .iter()
        .copied()
        .find(|&start| start > line)
        .map_or(HunkBound::EndOfFile, HunkBound::Found)
}

/// Build a patch containing only the hunk around `current_line`.
///
/// `hunk_starts` are the header indices from [`parse_patch`](super::parse_patch).
/// A line in the header block selects the first hunk.
///
/// # Errors
///
/// [`PatchError::CantFindHunks`] if the patch has no hunk header, and
/// [`PatchError::CantFindHunk`] if `hunk_starts` does not describe this patch.
pub fn modify_patch_for_hunk(
    patch: &str,
    hunk_starts: &[usize],
    current_line: usize,
) -> Result<String, PatchError> {
    let lines = patch_lines(patch);
    let header_len = header_length(&lines)?;

    let start = previous_hunk_start(hunk_starts, current_line)
        .resolve(hunk_starts, lines.len())
        .ok_or(PatchError::CantFindHunks)?;
    let end = next_hunk_start(hunk_starts, current_line.max(start))
        .resolve(hunk_starts, lines.len())
        .ok_or(PatchError::CantFindHunks)?;

    let stale = || PatchError::CantFindHunk { line: current_line };
    if end > lines.len() || !lines.get(start).is_some_and(|l| l.starts_with("@@")) {
        return Err(stale());
    }

    debug!(start, end, current_line, "isolating hunk");

    let mut output = String::new();
    push_lines(&mut output, &lines[..header_len]);
    push_lines(&mut output, &lines[start..end]);
    Ok(output)
}

/// Build a patch that stages only the change at `line_number`.
///
/// Other removals in the same hunk become context and other additions are
/// dropped, so the rest of the hunk stays unstaged. The header block is
/// copied unchanged and only the new-side count of the hunk header moves.
///
/// # Examples
///
/// ```
/// use git_picker::modify_patch_for_line;
///
/// let patch = "--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n-one\n-two\n+ONE\n+TWO\n";
/// let staged = modify_patch_for_line(patch, 5).unwrap();
/// assert_eq!(staged, "--- a/f\n+++ b/f\n@@ -1,2 +1,3 @@\n one\n two\n+ONE\n");
/// ```
///
/// # Errors
///
/// - [`PatchError::CantFindHunks`] if the patch has no hunk header
/// - [`PatchError::CantFindHunk`] if `line_number` is not inside a hunk
/// - [`PatchError::HeaderArithmetic`] if the hunk header cannot be rewritten
pub fn modify_patch_for_line(patch: &str, line_number: usize) -> Result<String, PatchError> {
    let lines = patch_lines(patch);
    let header_len = header_length(&lines)?;

    let hunk_start = lines
        .get(..=line_number)
        .and_then(|before| before.iter().rposition(|line| line.starts_with("@@")))
        .ok_or(PatchError::CantFindHunk { line: line_number })?;

    let (body, line_changes) = rewrite_hunk_body(&lines, hunk_start, line_number);
    let header = updated_header(lines[hunk_start], line_changes)?;

    debug!(hunk_start, line_number, line_changes, %header, "staging single line");

    let mut output = String::new();
    push_lines(&mut output, &lines[..header_len]);
    output.push_str(&header);
    output.push('\n');
    push_lines(&mut output, &body);
    Ok(output)
}

/// Rewrite the body of the hunk starting at `hunk_start`, keeping only the
/// change at `line_number`. Returns the new body and the net change in
/// new-side line count.
fn rewrite_hunk_body<'a>(
    lines: &[&'a str],
    hunk_start: usize,
    line_number: usize,
) -> (Vec<Cow<'a, str>>, i64) {
    let mut body = Vec::new();
    let mut line_changes = 0i64;
    let mut dropped_addition = false;

    for (index, &line) in lines.iter().enumerate().skip(hunk_start + 1) {
        if line.starts_with("@@") {
            break;
        }

        if index != line_number {
            if let Some(content) = line.strip_prefix('-') {
                // Still present on the new side
                body.push(Cow::Owned(format!(" {content}")));
                line_changes += 1;
                dropped_addition = false;
                continue;
            }
            if line.starts_with('+') {
                line_changes -= 1;
                dropped_addition = true;
                continue;
            }
            if line.starts_with('\\') && dropped_addition {
                // The marker belonged to the addition we just dropped
                dropped_addition = false;
                continue;
            }
        }

        dropped_addition = false;
        body.push(Cow::Borrowed(line));
    }

    (body, line_changes)
}

/// Adjust the new-side count of a hunk header by `line_changes`
fn updated_header(line: &str, line_changes: i64) -> Result<String, PatchError> {
    let arithmetic_error = || PatchError::HeaderArithmetic {
        header: line.to_string(),
    };

    let mut header = HunkHeader::parse(line).ok_or_else(arithmetic_error)?;
    if line_changes == 0 {
        return Ok(line.to_string());
    }

    let count = i64::from(header.new.len()) + line_changes;
    header.new.count = Some(u32::try_from(count).map_err(|_| arithmetic_error())?);
    Ok(header.to_string())
}
