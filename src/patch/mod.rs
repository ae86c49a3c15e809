//! Unified diff parsing and rewriting for partial staging.
//!
//! [`parse_patch`] finds where hunks and changed lines sit in a diff. The
//! modifiers then rewrite the diff into a smaller patch that `git apply`
//! accepts unmodified: a single hunk ([`modify_patch_for_hunk`]), a single
//! line ([`modify_patch_for_line`]), or an arbitrary selection of lines,
//! staged or unstaged ([`modify_patch_for_lines`]).

use error_set::error_set;

pub mod header;
pub mod modifier;
pub mod parser;
pub mod transform;

pub use header::{HunkHeader, HunkRange};
pub use modifier::{HunkBound, modify_patch_for_hunk, modify_patch_for_line};
pub use parser::{ParsedPatch, parse_patch};
pub use transform::{TransformOptions, modify_patch_for_lines, modify_patch_for_range};

error_set! {
    /// Errors from rewriting a patch
    PatchError := {
        /// The patch contains no `@@` hunk header at all
        #[display("Could not find any hunks in this patch")]
        CantFindHunks,
        /// The requested line lies outside every hunk
        #[display("Could not find a hunk containing line {line}")]
        CantFindHunk { line: usize },
        /// A hunk header could not be parsed or its new count would be invalid
        #[display("Could not update hunk header '{header}'")]
        HeaderArithmetic { header: String },
    }
}

/// Number of lines before the first hunk header
pub(crate) fn header_length(lines: &[&str]) -> Result<usize, PatchError> {
    lines
        .iter()
        .position(|line| line.starts_with("@@"))
        .ok_or(PatchError::CantFindHunks)
}

/// Append each line followed by a newline
pub(crate) fn push_lines<S: AsRef<str>>(output: &mut String, lines: &[S]) {
    for line in lines {
        output.push_str(line.as_ref());
        output.push('\n');
    }
}
