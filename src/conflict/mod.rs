//! Merge-conflict detection and resolution.
//!
//! [`find_conflicts`] locates conflict regions in file content, and
//! [`ConflictSelectionState`] tracks which region the user is looking at
//! and which side they want to keep, with an undo history of the file's
//! content across partial resolutions.

use error_set::error_set;

pub mod scanner;
pub mod selection;
pub mod state;

pub use scanner::{Conflict, find_conflicts};
pub use selection::Selection;
pub use state::ConflictSelectionState;

error_set! {
    /// Errors from resolving conflicts in a file on disk
    ConflictError := {
        /// Reading the conflicted file failed
        IoError(std::io::Error),
    }
}
