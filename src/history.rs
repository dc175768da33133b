//! Undo/Redo history for project file snapshots.
//!
//! Project snapshots are immutable and share unchanged collections, so the
//! history stores whole snapshots instead of inverse commands. Undoing an
//! action means going back to the snapshot that preceded it.

use crate::state::ProjectFiles;

/// Configuration for the history stack
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Maximum number of snapshots to keep
    pub max_history: usize,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            max_history: crate::constants::DEFAULT_MAX_HISTORY,
        }
    }
}

/// One recorded step: the snapshot before the action and its description.
#[derive(Debug, Clone)]
struct Entry {
    label: String,
    snapshot: ProjectFiles,
}

/// The undo/redo history stack.
///
/// When an action is recorded, the snapshot it replaced goes onto the undo
/// stack and the redo stack is cleared. Undo and redo swap the current
/// snapshot with the top of the respective stack.
#[derive(Debug, Clone, Default)]
pub struct ProjectHistory {
    undo_stack: Vec<Entry>,
    redo_stack: Vec<Entry>,
    options: HistoryOptions,
}

impl ProjectHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: HistoryOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Record that `label` replaced `previous`.
    /// This clears the redo stack.
    pub fn record(&mut self, label: impl Into<String>, previous: ProjectFiles) {
        let label = label.into();
        log::debug!("History: recorded '{}'", label);
        self.undo_stack.push(Entry {
            label,
            snapshot: previous,
        });
        self.redo_stack.clear();

        if self.undo_stack.len() > self.options.max_history {
            let excess = self.undo_stack.len() - self.options.max_history;
            self.undo_stack.drain(..excess);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Step back. `current` is kept for redo and the previous snapshot is
    /// returned, or None if there is nothing to undo.
    pub fn undo(&mut self, current: &ProjectFiles) -> Option<ProjectFiles> {
        let entry = self.undo_stack.pop()?;
        log::debug!("History: undo '{}'", entry.label);
        self.redo_stack.push(Entry {
            label: entry.label,
            snapshot: current.clone(),
        });
        Some(entry.snapshot)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &ProjectFiles) -> Option<ProjectFiles> {
        let entry = self.redo_stack.pop()?;
        log::debug!("History: redo '{}'", entry.label);
        self.undo_stack.push(Entry {
            label: entry.label,
            snapshot: current.clone(),
        });
        Some(entry.snapshot)
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.label.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.label.as_str())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("History cleared");
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawFile;

    fn step(files: &ProjectFiles, name: &str) -> ProjectFiles {
        files.from_added_local_files(&[RawFile::new(name, 1)])
    }

    #[test]
    fn test_undo_redo() {
        let mut history = ProjectHistory::new();
        let empty = ProjectFiles::new();
        let one = step(&empty, "a.nii");
        history.record("Add a.nii", empty.clone());

        assert!(history.can_undo());
        assert_eq!(history.undo_description(), Some("Add a.nii"));

        let undone = history.undo(&one).unwrap();
        assert_eq!(undone, empty);
        assert!(!history.can_undo());
        assert_eq!(history.redo_description(), Some("Add a.nii"));

        let redone = history.redo(&undone).unwrap();
        assert_eq!(redone, one);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = ProjectHistory::new();
        let empty = ProjectFiles::new();
        let one = step(&empty, "a.nii");
        history.record("Add a.nii", empty.clone());
        history.undo(&one);
        assert!(history.can_redo());

        history.record("Add b.nii", empty);
        assert!(!history.can_redo());
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_max_history() {
        let mut history = ProjectHistory::with_options(HistoryOptions { max_history: 3 });
        let mut files = ProjectFiles::new();
        for i in 0..5 {
            let next = step(&files, &format!("{}.nii", i));
            history.record(format!("Add {}", i), files);
            files = next;
        }

        assert_eq!(history.undo_count(), 3);
        assert_eq!(history.undo_description(), Some("Add 4"));
        // the oldest steps are gone
        let mut current = files;
        while let Some(previous) = history.undo(&current) {
            current = previous;
        }
        assert_eq!(current.local_volumes().len(), 2);
    }

    #[test]
    fn test_empty() {
        let mut history = ProjectHistory::new();
        assert!(history.undo(&ProjectFiles::new()).is_none());
        assert!(history.redo(&ProjectFiles::new()).is_none());
        history.clear();
        assert_eq!(history.redo_count(), 0);
    }
}
