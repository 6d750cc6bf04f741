//! The one owner of mutable review state: rows, override map, ignored set,
//! history, filters, sort. Every mutation in the engine goes through here,
//! synchronously, one at a time; everything read-side is recomputed from
//! current state on demand.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::editor::{self, EditScope, EditTarget, MergeMode};
use crate::history::History;
use crate::issues::{self, Issue, IssueKind};
use crate::models::{OverrideMap, TxRow};
use crate::pipeline::{self, FilterField, Filters, SortDir};
use crate::summary::{self, CurrencySummary};

/// How long a jumped-to row stays highlighted before the single pending
/// clear fires. Re-triggering a jump reschedules it.
pub const HIGHLIGHT_CLEAR_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct Highlight {
    pub signature: String,
    pub expires_at: Instant,
}

pub struct ReviewSession {
    rows: Vec<TxRow>,
    pub overrides: OverrideMap,
    pub ignored: BTreeSet<String>,
    pub filters: Filters,
    pub sort: SortDir,
    history: History,
    highlight: Option<Highlight>,
}

impl ReviewSession {
    pub fn new(rows: Vec<TxRow>, overrides: OverrideMap, ignored: BTreeSet<String>) -> Self {
        Self {
            rows,
            overrides,
            ignored,
            filters: Filters::default(),
            sort: SortDir::Ascending,
            history: History::new(),
            highlight: None,
        }
    }

    pub fn rows(&self) -> &[TxRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&TxRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn effective(&self, index: usize) -> Option<TxRow> {
        self.rows.get(index).map(|r| r.effective(&self.overrides))
    }

    /// Indices of the rows the user currently sees, filtered and sorted.
    pub fn visible(&self) -> Vec<usize> {
        pipeline::view_indices(&self.rows, &self.overrides, &self.filters, self.sort)
    }

    /// The filtered effective rows themselves, in view order (feeds the
    /// summary and the export surface).
    pub fn visible_effective(&self) -> Vec<TxRow> {
        self.visible()
            .into_iter()
            .map(|i| self.rows[i].effective(&self.overrides))
            .collect()
    }

    pub fn option_counts(&self, field: FilterField) -> Vec<(String, usize)> {
        pipeline::option_counts(&self.rows, &self.overrides, field)
    }

    // -- issues -------------------------------------------------------------

    pub fn issues(&self) -> Vec<Issue> {
        issues::compute_issues(&self.rows, &self.overrides, &self.ignored)
    }

    pub fn pending_issue_count(&self) -> usize {
        issues::pending_count(&self.issues())
    }

    /// Export is gated on every issue being resolved or ignored.
    pub fn export_allowed(&self) -> bool {
        self.pending_issue_count() == 0
    }

    pub fn rename_issue(&mut self, kind: IssueKind, key: &str, new_value: &str) {
        issues::rename_issue(&mut self.overrides, kind, key, new_value);
    }

    pub fn toggle_ignore(&mut self, kind: IssueKind, key: &str) {
        issues::toggle_ignore(&mut self.ignored, kind, key);
    }

    pub fn ignore_all_pending(&mut self) {
        let issues = self.issues();
        issues::ignore_all_pending(&mut self.ignored, &issues);
    }

    // -- editing ------------------------------------------------------------

    pub fn edit_target(&self, row_index: usize, field: editor::RowField) -> Option<EditTarget> {
        EditTarget::new(&self.rows, row_index, field)
    }

    /// Apply one scoped edit; returns rows touched (zero = scope
    /// unavailable, nothing changed).
    pub fn apply_edit(
        &mut self,
        target: &EditTarget,
        scope: EditScope,
        new_value: &str,
        merge: MergeMode,
    ) -> usize {
        editor::apply_edit(
            &mut self.rows,
            &mut self.history,
            &mut self.overrides,
            target,
            scope,
            new_value,
            merge,
            &self.filters,
        )
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.rows)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.rows)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // -- summary ------------------------------------------------------------

    /// Rollup over the filtered set (never the windowed slice).
    pub fn summary(&self) -> Vec<CurrencySummary> {
        summary::summarize(&self.visible_effective())
    }

    // -- jump & highlight ---------------------------------------------------

    /// Locate a signature in the current view; if the active filters hide
    /// it, widen by clearing them and look again. On a hit the row is
    /// highlighted with a fresh clear deadline (replacing any pending one).
    pub fn jump_to_signature(&mut self, signature: &str, now: Instant) -> Option<usize> {
        let signature = signature.trim();
        if signature.is_empty() {
            return None;
        }
        let mut pos = pipeline::locate_signature(&self.rows, &self.visible(), signature);
        if pos.is_none() && !self.filters.is_empty() {
            self.filters.clear();
            pos = pipeline::locate_signature(&self.rows, &self.visible(), signature);
        }
        if pos.is_some() {
            self.highlight = Some(Highlight {
                signature: signature.to_string(),
                expires_at: now + HIGHLIGHT_CLEAR_DELAY,
            });
        }
        pos
    }

    pub fn highlight(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    /// Fire the pending highlight clear once its deadline passes.
    pub fn tick_highlight(&mut self, now: Instant) {
        if self
            .highlight
            .as_ref()
            .is_some_and(|h| now >= h.expires_at)
        {
            self.highlight = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::RowField;
    use crate::issues::IssueStatus;
    use crate::models::TRADE_BUY;

    const S1: &str = "4fYNw3dojWmQ4dXtSGE9epjRGy9pFSx62YypT7avPYvp";
    const S2: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    fn row(ts: &str, tx_type: &str, signer: &str, sig: Option<&str>) -> TxRow {
        let mut r = TxRow {
            timestamp: ts.to_string(),
            tx_type: tx_type.to_string(),
            inflow_amount: "1".to_string(),
            inflow_currency: "SOL".to_string(),
            market: "Jupiter".to_string(),
            ..TxRow::default()
        };
        r.extra.insert("signer".to_string(), signer.to_string());
        if let Some(s) = sig {
            r.extra.insert("signature".to_string(), s.to_string());
        }
        r
    }

    fn session() -> ReviewSession {
        ReviewSession::new(
            vec![
                row("2025-03-01 09:00:00", "Trade", S1, Some(S1)),
                row("2025-03-02 09:00:00", "Trade", S1, None),
                row("2025-03-03 09:00:00", "Trade", S1, None),
                row("2025-03-04 09:00:00", "Trade", S2, Some(S2)),
            ],
            OverrideMap::default(),
            BTreeSet::new(),
        )
    }

    #[test]
    fn test_by_signer_bulk_edit_scenario() {
        let mut s = session();
        let target = s.edit_target(0, RowField::Type).unwrap();
        let n = s.apply_edit(&target, EditScope::BySigner, "Income", MergeMode::Replace);
        assert_eq!(n, 3);
        assert_eq!(s.row(0).unwrap().tx_type, "Income");
        assert_eq!(s.row(1).unwrap().tx_type, "Income");
        assert_eq!(s.row(2).unwrap().tx_type, "Income");
        assert_eq!(s.row(3).unwrap().tx_type, "Trade");
    }

    #[test]
    fn test_undo_redo_and_invalidation() {
        let mut s = session();
        let target = s.edit_target(0, RowField::Note).unwrap();
        s.apply_edit(&target, EditScope::One, "first", MergeMode::Replace);
        let target = s.edit_target(1, RowField::Note).unwrap();
        s.apply_edit(&target, EditScope::One, "second", MergeMode::Replace);

        assert!(s.undo());
        assert_eq!(s.row(1).unwrap().note, "");
        assert!(s.can_redo());

        // a fresh edit invalidates redo
        let target = s.edit_target(2, RowField::Note).unwrap();
        s.apply_edit(&target, EditScope::One, "third", MergeMode::Replace);
        assert!(!s.can_redo());
        assert!(!s.redo());
    }

    #[test]
    fn test_visible_follows_filters_and_sort() {
        let mut s = session();
        assert_eq!(s.visible(), vec![0, 1, 2, 3]);
        s.sort = SortDir::Descending;
        assert_eq!(s.visible(), vec![3, 2, 1, 0]);

        s.filters.toggle(FilterField::Type, "Trade");
        let target = s.edit_target(0, RowField::Type).unwrap();
        s.apply_edit(&target, EditScope::One, "Income", MergeMode::Replace);
        // row 0 no longer passes the Trade filter
        assert_eq!(s.visible(), vec![3, 2, 1]);
    }

    #[test]
    fn test_summary_respects_filters() {
        let mut s = session();
        let summary = s.summary();
        let sol = summary.iter().find(|c| c.currency == "SOL").unwrap();
        let buy = sol.types.iter().find(|t| t.type_label == TRADE_BUY).unwrap();
        assert_eq!(buy.count, 4);

        s.filters.toggle(FilterField::Type, "NoSuchType");
        assert!(s.summary().is_empty());
    }

    #[test]
    fn test_export_gate_follows_pending_issues() {
        let mut rows = vec![row("2025-03-01 09:00:00", "Trade", S1, None)];
        rows[0].inflow_currency = "SPL-7xKq".to_string();
        let mut s = ReviewSession::new(rows, OverrideMap::default(), BTreeSet::new());
        assert!(!s.export_allowed());

        s.rename_issue(IssueKind::UnknownToken, "SPL-7xKq", "bonk");
        assert!(s.export_allowed());
        let issue = &s.issues()[0];
        assert_eq!(issue.status, IssueStatus::Renamed);
        assert_eq!(issue.proposed_name.as_deref(), Some("BONK"));
    }

    #[test]
    fn test_ignore_all_then_none_pending() {
        let mut rows = vec![row("2025-03-01 09:00:00", "Trade", S1, None)];
        rows[0].inflow_currency = "UNKNOWN".to_string();
        rows[0].market = "UNKNOWN".to_string();
        let mut s = ReviewSession::new(rows, OverrideMap::default(), BTreeSet::new());
        assert_eq!(s.pending_issue_count(), 2);
        s.ignore_all_pending();
        assert_eq!(s.pending_issue_count(), 0);
        assert!(s.export_allowed());
    }

    #[test]
    fn test_jump_widens_filters_when_hidden() {
        let mut s = session();
        s.filters.toggle(FilterField::Type, "NoSuchType");
        assert!(s.visible().is_empty());

        let now = Instant::now();
        let pos = s.jump_to_signature(S2, now);
        // filters were cleared to find it; S2's row sorts last ascending
        assert_eq!(pos, Some(3));
        assert!(s.filters.is_empty());
        assert_eq!(s.highlight().unwrap().signature, S2);
    }

    #[test]
    fn test_jump_miss_leaves_state_alone() {
        let mut s = session();
        let pos = s.jump_to_signature("not a signature", Instant::now());
        assert_eq!(pos, None);
        assert!(s.highlight().is_none());
    }

    #[test]
    fn test_highlight_clears_after_deadline_and_reschedules() {
        let mut s = session();
        let now = Instant::now();
        s.jump_to_signature(S1, now);
        s.tick_highlight(now + Duration::from_millis(100));
        assert!(s.highlight().is_some());

        // re-trigger replaces the pending clear rather than stacking one
        s.jump_to_signature(S2, now + Duration::from_secs(2));
        s.tick_highlight(now + HIGHLIGHT_CLEAR_DELAY);
        assert!(s.highlight().is_some());
        s.tick_highlight(now + Duration::from_secs(2) + HIGHLIGHT_CLEAR_DELAY);
        assert!(s.highlight().is_none());
    }
}
