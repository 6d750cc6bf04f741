//! Read-side pipeline: categorical filters and timestamp sort over the
//! effective rows, plus the windowed-rendering math that keeps large row
//! sets interactive. Everything here is a pure recomputation from current
//! state — no cached sequences, no stored flags.

use std::collections::{BTreeMap, BTreeSet};

use crate::extract::extract_signature;
use crate::fmt::parse_timestamp;
use crate::models::{OverrideMap, TxRow};

// ---------------------------------------------------------------------------
// Filters & sort
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FilterField {
    Type,
    InflowCurrency,
    OutflowCurrency,
    Market,
}

impl FilterField {
    pub const ALL: &'static [FilterField] = &[
        FilterField::Type,
        FilterField::InflowCurrency,
        FilterField::OutflowCurrency,
        FilterField::Market,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FilterField::Type => "type",
            FilterField::InflowCurrency => "in",
            FilterField::OutflowCurrency => "out",
            FilterField::Market => "market",
        }
    }

    pub fn value<'a>(&self, row: &'a TxRow) -> &'a str {
        match self {
            FilterField::Type => &row.tx_type,
            FilterField::InflowCurrency => &row.inflow_currency,
            FilterField::OutflowCurrency => &row.outflow_currency,
            FilterField::Market => &row.market,
        }
    }
}

/// Accepted-value sets per filterable field. An absent or empty set places
/// no restriction on that field; a row passes iff every restricted field's
/// effective value is in the set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    accepted: BTreeMap<FilterField, BTreeSet<String>>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.accepted.values().all(BTreeSet::is_empty)
    }

    pub fn clear(&mut self) {
        self.accepted.clear();
    }

    pub fn accepted(&self, field: FilterField) -> Option<&BTreeSet<String>> {
        self.accepted.get(&field).filter(|s| !s.is_empty())
    }

    pub fn is_accepted(&self, field: FilterField, value: &str) -> bool {
        self.accepted(field).is_some_and(|s| s.contains(value))
    }

    /// Flip one accepted value in or out; a set emptied by the flip is
    /// dropped so the field goes back to unrestricted.
    pub fn toggle(&mut self, field: FilterField, value: &str) {
        let set = self.accepted.entry(field).or_default();
        if !set.remove(value) {
            set.insert(value.to_string());
        }
        if set.is_empty() {
            self.accepted.remove(&field);
        }
    }

    /// The one visibility predicate: evaluated over the effective row, by
    /// the pipeline and by the by-visible bulk edit scope alike.
    pub fn matches(&self, effective: &TxRow) -> bool {
        self.accepted
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .all(|(field, set)| set.contains(field.value(effective)))
    }

    /// Short status-line description, e.g. `type=Trade,Fee | market=Orca`.
    pub fn describe(&self) -> String {
        self.accepted
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(field, set)| {
                let values: Vec<&str> = set.iter().map(String::as_str).collect();
                format!("{}={}", field.label(), values.join(","))
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Ascending,
    Descending,
}

impl SortDir {
    pub fn toggled(self) -> SortDir {
        match self {
            SortDir::Ascending => SortDir::Descending,
            SortDir::Descending => SortDir::Ascending,
        }
    }
}

/// Indices of the rows the user currently sees: filtered over effective
/// rows, then sorted by parsed timestamp (stable, so same-instant rows keep
/// their upstream order).
pub fn view_indices(
    rows: &[TxRow],
    overrides: &OverrideMap,
    filters: &Filters,
    sort: SortDir,
) -> Vec<usize> {
    let mut indices: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| filters.is_empty() || filters.matches(&row.effective(overrides)))
        .map(|(i, _)| i)
        .collect();
    indices.sort_by_key(|&i| parse_timestamp(&rows[i].timestamp));
    if sort == SortDir::Descending {
        indices.reverse();
    }
    indices
}

/// Occurrence counts of each distinct non-blank effective value of `field`
/// across *all* rows (pre-filter), for rendering filter pickers. Sorted by
/// descending count, ties by value.
pub fn option_counts(
    rows: &[TxRow],
    overrides: &OverrideMap,
    field: FilterField,
) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in rows {
        let value = field.value(&row.effective(overrides)).trim().to_string();
        if !value.is_empty() {
            *counts.entry(value).or_default() += 1;
        }
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Position of a signature within a view order, if present.
pub fn locate_signature(rows: &[TxRow], order: &[usize], signature: &str) -> Option<usize> {
    order
        .iter()
        .position(|&i| extract_signature(&rows[i]) == Some(signature))
}

// ---------------------------------------------------------------------------
// Virtualization
// ---------------------------------------------------------------------------

/// Rows materialized beyond the viewport edge, in each direction.
pub const OVERSCAN: usize = 5;

/// Re-measure threshold: row height observations within one unit of the
/// current value are noise, not a relayout.
pub const ROW_HEIGHT_TOLERANCE: f64 = 1.0;

/// Scroll-driven window calculation. Units are whatever the renderer
/// measures in — pixels for a canvas, lines for a terminal — as long as
/// scroll offset, viewport height and row height agree.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub row_height: f64,
}

/// The materialized index range plus the spacer extents that preserve total
/// scroll length on either side of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    pub lead: f64,
    pub trail: f64,
}

impl Window {
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

impl Viewport {
    pub fn new(row_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_offset: 0.0,
            viewport_height,
            row_height: row_height.max(1.0),
        }
    }

    /// Adopt a measured row height when it drifts past the tolerance.
    /// Returns whether the height changed (the caller should recompute its
    /// window if so).
    pub fn observe_row_height(&mut self, measured: f64) -> bool {
        if measured > 0.0 && (measured - self.row_height).abs() > ROW_HEIGHT_TOLERANCE {
            self.row_height = measured;
            true
        } else {
            false
        }
    }

    pub fn max_scroll(&self, total: usize) -> f64 {
        (total as f64 * self.row_height - self.viewport_height).max(0.0)
    }

    pub fn clamp_scroll(&mut self, total: usize) {
        self.scroll_offset = self.scroll_offset.max(0.0).min(self.max_scroll(total));
    }

    /// Scroll offset that centers `index` in the viewport.
    pub fn center_on(&self, index: usize) -> f64 {
        (index as f64 * self.row_height - self.viewport_height / 2.0).max(0.0)
    }

    pub fn window(&self, total: usize) -> Option<Window> {
        if total == 0 {
            return None;
        }
        let first_visible = (self.scroll_offset / self.row_height).floor() as usize;
        let last_visible =
            ((self.scroll_offset + self.viewport_height) / self.row_height).ceil() as usize;
        let start = first_visible.saturating_sub(OVERSCAN);
        let end = (last_visible + OVERSCAN).min(total - 1);
        Some(Window {
            start,
            end,
            lead: start as f64 * self.row_height,
            trail: (total - 1 - end) as f64 * self.row_height,
        })
    }

    /// Nudge the scroll offset so `index` sits fully inside the viewport
    /// (used by keyboard selection in the browser).
    pub fn ensure_visible(&mut self, index: usize, total: usize) {
        let top = index as f64 * self.row_height;
        let bottom = top + self.row_height;
        if top < self.scroll_offset {
            self.scroll_offset = top;
        } else if bottom > self.scroll_offset + self.viewport_height {
            self.scroll_offset = bottom - self.viewport_height;
        }
        self.clamp_scroll(total);
    }
}
