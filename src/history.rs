//! Bounded undo/redo over full-row-sequence snapshots. Snapshots are deep
//! copies: mutating the live sequence never reaches back into a stored one.

use crate::models::TxRow;

pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Default)]
pub struct History {
    undo: Vec<Vec<TxRow>>,
    redo: Vec<Vec<TxRow>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the pre-edit state. Evicts the oldest snapshot past capacity
    /// and invalidates any redo branch.
    pub fn push_snapshot(&mut self, rows: &[TxRow]) {
        self.undo.push(rows.to_vec());
        if self.undo.len() > HISTORY_CAPACITY {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    /// Swap the current sequence for the most recent snapshot. Returns
    /// false (leaving `current` untouched) when there is nothing to undo.
    pub fn undo(&mut self, current: &mut Vec<TxRow>) -> bool {
        let Some(snapshot) = self.undo.pop() else {
            return false;
        };
        self.redo.push(current.clone());
        if self.redo.len() > HISTORY_CAPACITY {
            self.redo.remove(0);
        }
        *current = snapshot;
        true
    }

    pub fn redo(&mut self, current: &mut Vec<TxRow>) -> bool {
        let Some(snapshot) = self.redo.pop() else {
            return false;
        };
        self.undo.push(current.clone());
        if self.undo.len() > HISTORY_CAPACITY {
            self.undo.remove(0);
        }
        *current = snapshot;
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(note: &str) -> Vec<TxRow> {
        vec![TxRow {
            note: note.to_string(),
            ..TxRow::default()
        }]
    }

    #[test]
    fn test_undo_restores_snapshot() {
        let mut history = History::new();
        let mut current = rows("v1");
        history.push_snapshot(&current);
        current[0].note = "v2".to_string();

        assert!(history.undo(&mut current));
        assert_eq!(current[0].note, "v1");
    }

    #[test]
    fn test_redo_restores_undone_state() {
        let mut history = History::new();
        let mut current = rows("v1");
        history.push_snapshot(&current);
        current[0].note = "v2".to_string();

        history.undo(&mut current);
        assert!(history.redo(&mut current));
        assert_eq!(current[0].note, "v2");
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = History::new();
        let mut current = rows("v1");
        assert!(!history.undo(&mut current));
        assert!(!history.redo(&mut current));
        assert_eq!(current[0].note, "v1");
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = History::new();
        let mut current = rows("v1");
        history.push_snapshot(&current);
        current[0].note = "v2".to_string();
        history.undo(&mut current);
        assert!(history.can_redo());

        history.push_snapshot(&current);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_bound_evicts_oldest() {
        let mut history = History::new();
        let mut current = rows("v0");
        for i in 1..=(HISTORY_CAPACITY + 5) {
            history.push_snapshot(&current);
            current[0].note = format!("v{i}");
        }
        // only the last HISTORY_CAPACITY snapshots survive
        let mut undone = 0;
        while history.undo(&mut current) {
            undone += 1;
        }
        assert_eq!(undone, HISTORY_CAPACITY);
        assert_eq!(current[0].note, "v5"); // oldest surviving snapshot
    }

    #[test]
    fn test_snapshot_is_a_deep_copy() {
        let mut history = History::new();
        let mut current = rows("v1");
        history.push_snapshot(&current);
        // mutate both the row and the sequence shape afterwards
        current[0].note = "mutated".to_string();
        current.push(TxRow::default());

        history.undo(&mut current);
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].note, "v1");
    }

    #[test]
    fn test_undo_redo_round_trip_exact() {
        let mut history = History::new();
        let mut current = vec![
            TxRow {
                note: "a".to_string(),
                ..TxRow::default()
            },
            TxRow {
                note: "b".to_string(),
                ..TxRow::default()
            },
        ];
        let before = current.clone();
        history.push_snapshot(&current);
        current[1].note = "edited".to_string();
        let after = current.clone();

        history.undo(&mut current);
        assert_eq!(current, before);
        history.redo(&mut current);
        assert_eq!(current, after);
    }
}
