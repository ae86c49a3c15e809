use super::ConflictError;
use super::scanner::{Conflict, find_conflicts};
use super::selection::Selection;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Navigation and resolution state for one conflicted file.
///
/// Owned by a single editing session. `contents` is a stack of full-file
/// snapshots whose top is the current content; conflicts are rescanned
/// from it after every change.
#[derive(Debug, Default)]
pub struct ConflictSelectionState {
    path: PathBuf,
    contents: Vec<String>,
    conflicts: Vec<Conflict>,
    conflict_index: usize,
    selection_index: usize,
}

impl ConflictSelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or continue) a session on `path` with `content`.
    ///
    /// Passing the current path and content again is a no-op, so the undo
    /// history and the user's position survive a refresh.
    pub fn set_content(&mut self, content: impl Into<String>, path: impl AsRef<Path>) {
        let content = content.into();
        let path = path.as_ref();
        if self.path == path && self.contents.last() == Some(&content) {
            return;
        }

        debug!(path = %path.display(), "loading conflicted file");
        self.path = path.to_path_buf();
        self.contents = vec![content];
        self.conflict_index = 0;
        self.selection_index = 0;
        self.rescan();
    }

    /// Record new content after a partial resolve. Undoable.
    pub fn push_content(&mut self, content: impl Into<String>) {
        self.contents.push(content.into());
        self.rescan();
    }

    /// Restore the previous snapshot. Returns `false` when there is nothing
    /// to undo.
    pub fn undo(&mut self) -> bool {
        if self.contents.len() <= 1 {
            return false;
        }

        self.contents.pop();
        debug!(remaining = self.contents.len(), "undid conflict resolution");
        self.rescan();
        true
    }

    /// End the session
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The current content snapshot
    #[must_use]
    pub fn get_content(&self) -> &str {
        self.contents.last().map_or("", String::as_str)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn active(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }

    #[must_use]
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    #[must_use]
    pub fn no_conflicts(&self) -> bool {
        self.conflicts.is_empty()
    }

    #[must_use]
    pub fn conflict_index(&self) -> usize {
        self.conflict_index
    }

    /// The conflict the user is focused on
    #[must_use]
    pub fn current_conflict(&self) -> Option<&Conflict> {
        self.conflicts.get(self.conflict_index)
    }

    /// Line index of the `=======` separator of the focused conflict
    #[must_use]
    pub fn conflict_target_line(&self) -> Option<usize> {
        self.current_conflict().map(|conflict| conflict.target)
    }

    pub fn select_next_conflict(&mut self) {
        self.set_conflict_index(self.conflict_index + 1);
    }

    pub fn select_prev_conflict(&mut self) {
        self.set_conflict_index(self.conflict_index.saturating_sub(1));
    }

    pub fn select_next_conflict_hunk(&mut self) {
        self.set_selection_index(self.selection_index + 1);
    }

    pub fn select_prev_conflict_hunk(&mut self) {
        self.set_selection_index(self.selection_index.saturating_sub(1));
    }

    /// Selections available for the focused conflict
    #[must_use]
    pub fn available_selections(&self) -> &'static [Selection] {
        self.current_conflict()
            .map(Selection::available)
            .unwrap_or_default()
    }

    /// The selected region of the focused conflict, `Top` if nothing is focused
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.available_selections()
            .get(self.selection_index)
            .copied()
            .unwrap_or(Selection::Top)
    }

    /// 1-based line number where the selected region starts, `1` if nothing
    /// is focused
    #[must_use]
    pub fn get_selected_line(&self) -> usize {
        self.current_conflict()
            .map_or(1, |conflict| self.selection().bounds(conflict).0 + 1)
    }

    /// Content of the file on disk with the focused conflict resolved to
    /// `selection`. Returns `Ok(None)` when no conflict is focused.
    ///
    /// # Errors
    ///
    /// [`ConflictError::IoError`] if the file cannot be read.
    pub fn content_after_conflict_resolve(
        &self,
        selection: Selection,
    ) -> Result<Option<String>, ConflictError> {
        let Some(conflict) = self.current_conflict().copied() else {
            return Ok(None);
        };

        let mut reader = BufReader::new(File::open(&self.path)?);
        let mut content = String::new();
        let mut line = String::new();
        let mut index = 0;

        while reader.read_line(&mut line)? > 0 {
            if selection.is_index_to_keep(&conflict, index) {
                content.push_str(&line);
            }
            line.clear();
            index += 1;
        }

        debug!(%selection, start = conflict.start, end = conflict.end, "resolved conflict");
        Ok(Some(content))
    }

    fn rescan(&mut self) {
        self.conflicts = find_conflicts(self.get_content());
        self.set_conflict_index(self.conflict_index);
        debug!(conflicts = self.conflicts.len(), "rescanned conflicts");
    }

    fn set_conflict_index(&mut self, index: usize) {
        self.conflict_index = match self.conflicts.len() {
            0 => 0,
            len => index.min(len - 1),
        };
        self.set_selection_index(self.selection_index);
    }

    fn set_selection_index(&mut self, index: usize) {
        self.selection_index = match self.available_selections().len() {
            0 => 0,
            len => index.min(len - 1),
        };
    }
}
