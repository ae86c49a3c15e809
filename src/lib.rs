//! Line-level change selection for git front ends.
//!
//! Two independent engines that turn text into text:
//!
//! - [`patch`] parses a unified diff and rewrites it into a smaller patch
//!   selecting one line, one hunk, or any set of lines, ready for
//!   `git apply --cached`.
//! - [`conflict`] finds merge-conflict regions in a file and resolves the
//!   focused one to the side the user picks, with undo.
//!
//! Neither talks to git. Callers apply the returned patches and write the
//! resolved content themselves.

use error_set::error_set;

pub mod conflict;
pub mod patch;

pub use conflict::{Conflict, ConflictError, ConflictSelectionState, Selection, find_conflicts};
pub use patch::{
    HunkBound, HunkHeader, ParsedPatch, PatchError, TransformOptions, modify_patch_for_hunk,
    modify_patch_for_line, modify_patch_for_lines, modify_patch_for_range, parse_patch,
};

error_set! {
    /// Top-level error for git-picker operations
    PickerError := {
        #[display("No conflict numbered {number} in {path}")]
        NoSuchConflict { number: usize, path: String },
        PatchError(PatchError),
        ConflictError(ConflictError),
        IoError(std::io::Error),
    }
}
