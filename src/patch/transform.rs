//! Rewriting a patch for an arbitrary selection of lines.
//!
//! Unlike [`modify_patch_for_line`](super::modify_patch_for_line), this can
//! select many lines across several hunks, and can produce the reversed
//! patch used to unstage lines from the index. Hunk headers are rebuilt
//! from the rewritten bodies, and later hunks are shifted by the net line
//! change of earlier ones.

use super::header::{HunkHeader, HunkRange};
use super::parser::{parse_patch, patch_lines};
use super::{PatchError, push_lines};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// How a selection of lines is turned into a patch
#[derive(Debug, Clone, Default)]
pub struct TransformOptions<'a> {
    /// Build the reverse patch (for unstaging from the index)
    pub reverse: bool,
    /// Keep the original header block instead of a minimal `---`/`+++` pair
    pub keep_original_header: bool,
    /// File name used for the minimal header
    pub filename: &'a str,
}

/// Build a patch containing only the changes at `line_indices`.
///
/// Hunks without a selected line are left out. Returns an empty string when
/// nothing would change, which callers should treat as "nothing to apply".
///
/// # Errors
///
/// - [`PatchError::CantFindHunks`] if the patch has no hunk header
/// - [`PatchError::HeaderArithmetic`] if a selected hunk's header is malformed
pub fn modify_patch_for_lines(
    patch: &str,
    line_indices: &[usize],
    options: &TransformOptions<'_>,
) -> Result<String, PatchError> {
    let selected: BTreeSet<usize> = line_indices.iter().copied().collect();
    transform_selected(patch, |index| selected.contains(&index), options)
}

/// Build a patch for the inclusive line range `first..=last`.
///
/// # Errors
///
/// See [`modify_patch_for_lines`].
pub fn modify_patch_for_range(
    patch: &str,
    first: usize,
    last: usize,
    options: &TransformOptions<'_>,
) -> Result<String, PatchError> {
    let range = first..=last;
    transform_selected(patch, |index| range.contains(&index), options)
}

fn transform_selected(
    patch: &str,
    is_selected: impl Fn(usize) -> bool,
    options: &TransformOptions<'_>,
) -> Result<String, PatchError> {
    let lines = patch_lines(patch);
    let parsed = parse_patch(patch);
    let first_hunk = *parsed
        .hunk_starts
        .first()
        .ok_or(PatchError::CantFindHunks)?;

    let mut offset = 0i64;
    let mut hunks = String::new();

    for (position, &start) in parsed.hunk_starts.iter().enumerate() {
        let end = parsed
            .hunk_starts
            .get(position + 1)
            .copied()
            .unwrap_or(lines.len());
        if !(start..end).any(&is_selected) {
            continue;
        }

        let header = HunkHeader::parse(lines[start]).ok_or_else(|| PatchError::HeaderArithmetic {
            header: lines[start].to_string(),
        })?;
        let body = transformed_body(&lines[start + 1..end], start + 1, &is_selected, options.reverse);

        let Some(new_header) = updated_header(&header, &body, &mut offset, options.reverse)? else {
            trace!(start, "hunk has no remaining changes");
            continue;
        };

        debug!(start, header = %new_header, "rewrote hunk");
        hunks.push_str(&new_header.to_string());
        hunks.push('\n');
        push_lines(&mut hunks, &body);
    }

    if hunks.is_empty() {
        return Ok(String::new());
    }

    let mut output = String::new();
    if options.keep_original_header {
        push_lines(&mut output, &lines[..first_hunk]);
    } else {
        output.push_str(&format!(
            "--- a/{0}\n+++ b/{0}\n",
            options.filename
        ));
    }
    output.push_str(&hunks);
    Ok(output)
}

fn transformed_prefix(prefix: char, reverse: bool, is_selected: bool) -> char {
    match (reverse, prefix) {
        (true, '+') if !is_selected => ' ',
        (true, '+') => '-',
        (true, '-') => '+',
        (false, '-') if !is_selected => ' ',
        _ => prefix,
    }
}

/// Rewrite hunk body lines, `first_index` being the patch index of `body[0]`
fn transformed_body(
    body: &[&str],
    first_index: usize,
    is_selected: impl Fn(usize) -> bool,
    reverse: bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut skipped_marker = None;

    for (offset, line) in body.iter().enumerate() {
        let index = first_index + offset;
        let mut chars = line.chars();
        let Some(prefix) = chars.next() else {
            break;
        };
        let content = chars.as_str();

        let selected = is_selected(index);
        let prefix = transformed_prefix(prefix, reverse, selected);

        if selected || prefix == ' ' || (prefix == '\\' && skipped_marker != Some(index)) {
            lines.push(format!("{prefix}{content}"));
            continue;
        }

        if prefix == '+' {
            // A following "\ No newline" marker belongs to this dropped addition
            skipped_marker = Some(index + 1);
        }
    }

    lines
}

/// Header for a rewritten hunk body, or `None` if the body has no changes.
/// Advances `offset` by the hunk's net change in line count.
fn updated_header(
    original: &HunkHeader,
    body: &[String],
    offset: &mut i64,
    reverse: bool,
) -> Result<Option<HunkHeader>, PatchError> {
    let count = |prefixes: &[char]| {
        body.iter()
            .filter(|line| line.starts_with(prefixes))
            .count()
    };
    let change_count = count(&['+', '-']);
    let old_len = count(&[' ', '-']);
    let new_len = count(&['+', ' ']);

    if change_count == 0 {
        return Ok(None);
    }

    let arithmetic_error = || PatchError::HeaderArithmetic {
        header: original.to_string(),
    };
    let to_u32 = |value: i64| u32::try_from(value).map_err(|_| arithmetic_error());
    let to_i64 = |value: usize| i64::try_from(value).map_err(|_| arithmetic_error());

    let old_start = if reverse {
        original.new.start
    } else {
        original.old.start
    };

    // Going from or to an empty side moves the start by one
    let start_adjustment = if old_len == 0 {
        1
    } else if new_len == 0 {
        -1
    } else {
        0
    };
    let new_start = i64::from(old_start) + *offset + start_adjustment;

    *offset += to_i64(new_len)? - to_i64(old_len)?;

    Ok(Some(HunkHeader {
        old: HunkRange {
            start: old_start,
            count: Some(to_u32(to_i64(old_len)?)?),
        },
        new: HunkRange {
            start: to_u32(new_start)?,
            count: Some(to_u32(to_i64(new_len)?)?),
        },
        heading: original.heading.clone(),
    }))
}
