//! Override & issue tracking. Issues are derived on every pass from
//! (rows, override map, ignored set) — nothing here stores a status flag
//! that could drift from the map it should reflect.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::extract::{extract_signature, is_base58_address};
use crate::models::{is_known_market, OverrideMap, TxRow, UNKNOWN_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueKind {
    UnknownToken,
    UnknownMarket,
}

impl IssueKind {
    /// Composite identifier used by the ignored set, stable across renames.
    pub fn ignore_id(&self, key: &str) -> String {
        match self {
            IssueKind::UnknownToken => format!("symbol:{key}"),
            IssueKind::UnknownMarket => format!("market:{key}"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::UnknownToken => "token",
            IssueKind::UnknownMarket => "market",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStatus {
    Pending,
    Renamed,
    Ignored,
}

impl IssueStatus {
    pub fn label(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::Renamed => "renamed",
            IssueStatus::Ignored => "ignored",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Issue {
    pub kind: IssueKind,
    pub key: String,
    pub occurrences: usize,
    pub signatures: Vec<String>,
    pub status: IssueStatus,
    pub proposed_name: Option<String>,
}

fn placeholder_symbol_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Mint-derived placeholder the classifier emits for unresolved tokens.
    RE.get_or_init(|| Regex::new(r"^SPL-[1-9A-HJ-NP-Za-km-z]{4}$").unwrap())
}

/// A currency token the user still has to name: the classifier's synthetic
/// placeholder code, or the literal unknown marker.
pub fn is_placeholder_symbol(symbol: &str) -> bool {
    let s = symbol.trim();
    s == UNKNOWN_MARKER || placeholder_symbol_re().is_match(s)
}

/// A market label the user still has to name: not on the known-venues list,
/// and either a raw address or the literal unknown marker.
pub fn is_unknown_market(market: &str) -> bool {
    let m = market.trim();
    if m.is_empty() || is_known_market(m) {
        return false;
    }
    m == UNKNOWN_MARKER || is_base58_address(m)
}

/// Scan every row for unresolved tokens and markets, aggregate occurrence
/// counts and signatures per distinct raw key, and attach the current
/// resolution status. Pending issues sort first (by descending count, ties
/// by key), then the rest by descending count.
pub fn compute_issues(
    rows: &[TxRow],
    overrides: &OverrideMap,
    ignored: &BTreeSet<String>,
) -> Vec<Issue> {
    use std::collections::BTreeMap;

    let mut found: BTreeMap<(IssueKind, String), (usize, Vec<String>)> = BTreeMap::new();
    let mut record = |kind: IssueKind, key: &str, sig: Option<&str>| {
        let entry = found.entry((kind, key.to_string())).or_default();
        entry.0 += 1;
        if let Some(sig) = sig {
            if !entry.1.iter().any(|s| s == sig) {
                entry.1.push(sig.to_string());
            }
        }
    };

    for row in rows {
        let sig = extract_signature(row);
        for currency in [&row.inflow_currency, &row.outflow_currency] {
            let c = currency.trim();
            if !c.is_empty() && is_placeholder_symbol(c) {
                record(IssueKind::UnknownToken, c, sig);
            }
        }
        let m = row.market.trim();
        if is_unknown_market(m) {
            record(IssueKind::UnknownMarket, m, sig);
        }
    }

    let mut issues: Vec<Issue> = found
        .into_iter()
        .map(|((kind, key), (occurrences, signatures))| {
            let proposed = match kind {
                IssueKind::UnknownToken => overrides.symbols.get(&key),
                IssueKind::UnknownMarket => overrides.markets.get(&key),
            };
            let status = if let Some(_name) = proposed {
                IssueStatus::Renamed
            } else if ignored.contains(&kind.ignore_id(&key)) {
                IssueStatus::Ignored
            } else {
                IssueStatus::Pending
            };
            Issue {
                kind,
                key,
                occurrences,
                signatures,
                status,
                proposed_name: proposed.cloned(),
            }
        })
        .collect();

    issues.sort_by(|a, b| {
        let a_key = (a.status != IssueStatus::Pending, std::cmp::Reverse(a.occurrences));
        let b_key = (b.status != IssueStatus::Pending, std::cmp::Reverse(b.occurrences));
        a_key.cmp(&b_key).then_with(|| a.key.cmp(&b.key))
    });
    issues
}

/// Upsert a correction. Blank values are rejected as a no-op. Token
/// corrections are forced to uppercase; market casing is kept as typed.
pub fn rename_issue(overrides: &mut OverrideMap, kind: IssueKind, key: &str, new_value: &str) {
    let value = new_value.trim();
    if value.is_empty() {
        return;
    }
    match kind {
        IssueKind::UnknownToken => {
            overrides
                .symbols
                .insert(key.to_string(), value.to_uppercase());
        }
        IssueKind::UnknownMarket => {
            overrides.markets.insert(key.to_string(), value.to_string());
        }
    }
}

pub fn toggle_ignore(ignored: &mut BTreeSet<String>, kind: IssueKind, key: &str) {
    let id = kind.ignore_id(key);
    if !ignored.remove(&id) {
        ignored.insert(id);
    }
}

pub fn ignore_all_pending(ignored: &mut BTreeSet<String>, issues: &[Issue]) {
    for issue in issues.iter().filter(|i| i.status == IssueStatus::Pending) {
        ignored.insert(issue.kind.ignore_id(&issue.key));
    }
}

pub fn pending_count(issues: &[Issue]) -> usize {
    issues
        .iter()
        .filter(|i| i.status == IssueStatus::Pending)
        .count()
}
