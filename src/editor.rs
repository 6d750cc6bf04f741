//! Scoped bulk-edit resolver: extends one edited row/field to every row a
//! chosen scope matches, snapshots history first, and applies the value
//! with an optional text-merge mode. A scope whose anchor field is missing
//! on the target degrades to a no-op — no partial mutation, no wasted
//! snapshot.

use crate::extract::{
    extract_program_address, extract_recipient, extract_sender, extract_signature, extract_signer,
};
use crate::history::History;
use crate::models::{OverrideMap, TxRow};
use crate::pipeline::Filters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditScope {
    One,
    BySigner,
    BySignature,
    ByMarket,
    ByRecipient,
    BySender,
    ByProgramId,
    ByVisible,
}

impl EditScope {
    pub const ALL: &'static [EditScope] = &[
        EditScope::One,
        EditScope::BySigner,
        EditScope::BySignature,
        EditScope::ByMarket,
        EditScope::ByRecipient,
        EditScope::BySender,
        EditScope::ByProgramId,
        EditScope::ByVisible,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EditScope::One => "this row only",
            EditScope::BySigner => "same signer",
            EditScope::BySignature => "same signature",
            EditScope::ByMarket => "same market",
            EditScope::ByRecipient => "same recipient",
            EditScope::BySender => "same sender",
            EditScope::ByProgramId => "same program",
            EditScope::ByVisible => "all visible rows",
        }
    }

    /// Whether this scope's anchor field can be derived from the target
    /// row. The UI disables unavailable scopes; the resolver re-checks
    /// anyway.
    pub fn available(&self, target_row: &TxRow) -> bool {
        match self {
            EditScope::One | EditScope::ByMarket | EditScope::ByVisible => true,
            EditScope::BySigner => extract_signer(target_row).is_some(),
            EditScope::BySignature => extract_signature(target_row).is_some(),
            EditScope::ByRecipient => extract_recipient(target_row).is_some(),
            EditScope::BySender => extract_sender(target_row).is_some(),
            EditScope::ByProgramId => extract_program_address(target_row).is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    #[default]
    Replace,
    Prefix,
    Suffix,
}

impl MergeMode {
    pub const ALL: &'static [MergeMode] = &[MergeMode::Replace, MergeMode::Prefix, MergeMode::Suffix];

    pub fn label(&self) -> &'static str {
        match self {
            MergeMode::Replace => "replace",
            MergeMode::Prefix => "prefix",
            MergeMode::Suffix => "suffix",
        }
    }

    fn merge(&self, old: &str, new: &str) -> String {
        match self {
            MergeMode::Replace => new.to_string(),
            MergeMode::Prefix => format!("{new}{old}"),
            MergeMode::Suffix => format!("{old}{new}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Timestamp,
    Type,
    InflowAmount,
    InflowCurrency,
    OutflowAmount,
    OutflowCurrency,
    FeeAmount,
    FeeCurrency,
    Market,
    Note,
}

impl RowField {
    pub const ALL: &'static [RowField] = &[
        RowField::Timestamp,
        RowField::Type,
        RowField::InflowAmount,
        RowField::InflowCurrency,
        RowField::OutflowAmount,
        RowField::OutflowCurrency,
        RowField::FeeAmount,
        RowField::FeeCurrency,
        RowField::Market,
        RowField::Note,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RowField::Timestamp => "timestamp",
            RowField::Type => "type",
            RowField::InflowAmount => "inflow amount",
            RowField::InflowCurrency => "inflow currency",
            RowField::OutflowAmount => "outflow amount",
            RowField::OutflowCurrency => "outflow currency",
            RowField::FeeAmount => "fee amount",
            RowField::FeeCurrency => "fee currency",
            RowField::Market => "market",
            RowField::Note => "note",
        }
    }

    /// Only free text takes prefix/suffix merges; everything else is
    /// replace-only and the UI must not offer more.
    pub fn is_free_text(&self) -> bool {
        matches!(self, RowField::Note)
    }

    pub fn get<'a>(&self, row: &'a TxRow) -> &'a str {
        match self {
            RowField::Timestamp => &row.timestamp,
            RowField::Type => &row.tx_type,
            RowField::InflowAmount => &row.inflow_amount,
            RowField::InflowCurrency => &row.inflow_currency,
            RowField::OutflowAmount => &row.outflow_amount,
            RowField::OutflowCurrency => &row.outflow_currency,
            RowField::FeeAmount => &row.fee_amount,
            RowField::FeeCurrency => &row.fee_currency,
            RowField::Market => &row.market,
            RowField::Note => &row.note,
        }
    }

    pub fn set(&self, row: &mut TxRow, value: String) {
        match self {
            RowField::Timestamp => row.timestamp = value,
            RowField::Type => row.tx_type = value,
            RowField::InflowAmount => row.inflow_amount = value,
            RowField::InflowCurrency => row.inflow_currency = value,
            RowField::OutflowAmount => row.outflow_amount = value,
            RowField::OutflowCurrency => row.outflow_currency = value,
            RowField::FeeAmount => row.fee_amount = value,
            RowField::FeeCurrency => row.fee_currency = value,
            RowField::Market => row.market = value,
            RowField::Note => row.note = value,
        }
    }
}

/// The row/field being edited. Transient, built when the user opens an
/// edit and dropped on apply or cancel. Scope anchors (signer, signature,
/// market and so on) are re-derived from the live row at resolve time, so
/// the target itself only needs to pin the row and field down.
#[derive(Debug, Clone)]
pub struct EditTarget {
    pub row_index: usize,
    pub field: RowField,
    pub label: String,
}

impl EditTarget {
    pub fn new(rows: &[TxRow], row_index: usize, field: RowField) -> Option<Self> {
        rows.get(row_index)?;
        Some(Self {
            row_index,
            field,
            label: format!("{} @ row {}", field.label(), row_index + 1),
        })
    }
}

fn match_indices(
    rows: &[TxRow],
    target: &EditTarget,
    scope: EditScope,
    overrides: &OverrideMap,
    filters: &Filters,
) -> Vec<usize> {
    let Some(target_row) = rows.get(target.row_index) else {
        return Vec::new();
    };
    if !scope.available(target_row) {
        return Vec::new();
    }

    let by_extractor = |anchor: Option<&str>, extract: &dyn Fn(&TxRow) -> Option<String>| {
        let Some(anchor) = anchor.map(str::trim).filter(|a| !a.is_empty()) else {
            return Vec::new();
        };
        rows.iter()
            .enumerate()
            .filter(|(_, row)| extract(row).as_deref().map(str::trim) == Some(anchor))
            .map(|(i, _)| i)
            .collect()
    };

    match scope {
        EditScope::One => vec![target.row_index],
        EditScope::BySigner => by_extractor(extract_signer(target_row), &|r| {
            extract_signer(r).map(str::to_string)
        }),
        EditScope::BySignature => by_extractor(extract_signature(target_row), &|r| {
            extract_signature(r).map(str::to_string)
        }),
        EditScope::ByRecipient => by_extractor(extract_recipient(target_row), &|r| {
            extract_recipient(r).map(str::to_string)
        }),
        EditScope::BySender => by_extractor(extract_sender(target_row), &|r| {
            extract_sender(r).map(str::to_string)
        }),
        EditScope::ByProgramId => by_extractor(extract_program_address(target_row), &|r| {
            extract_program_address(r).map(str::to_string)
        }),
        EditScope::ByMarket => {
            let anchor = target_row.market.trim().to_string();
            rows.iter()
                .enumerate()
                .filter(|(_, row)| row.market.trim() == anchor)
                .map(|(i, _)| i)
                .collect()
        }
        EditScope::ByVisible => rows
            .iter()
            .enumerate()
            .filter(|(_, row)| filters.is_empty() || filters.matches(&row.effective(overrides)))
            .map(|(i, _)| i)
            .collect(),
    }
}

/// Apply one edit across its scope. Returns the number of rows mutated;
/// zero means the scope could not be resolved and nothing changed (history
/// included). Editing the market field with the by-market scope also
/// upserts the old label into the override map so future rows carrying it
/// are corrected prospectively.
pub fn apply_edit(
    rows: &mut Vec<TxRow>,
    history: &mut History,
    overrides: &mut OverrideMap,
    target: &EditTarget,
    scope: EditScope,
    new_value: &str,
    merge: MergeMode,
    filters: &Filters,
) -> usize {
    let matched = match_indices(rows, target, scope, overrides, filters);
    if matched.is_empty() {
        return 0;
    }

    let original_market = rows
        .get(target.row_index)
        .map(|r| r.market.trim().to_string())
        .unwrap_or_default();

    history.push_snapshot(rows);
    for &i in &matched {
        let old = target.field.get(&rows[i]).to_string();
        target.field.set(&mut rows[i], merge.merge(&old, new_value));
    }

    if target.field == RowField::Market && scope == EditScope::ByMarket {
        let value = new_value.trim();
        if !original_market.is_empty() && !value.is_empty() {
            overrides.markets.insert(original_market, value.to_string());
        }
    }

    matched.len()
}
