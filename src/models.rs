use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Literal marker the classifier emits when it could not resolve a token
/// symbol or market label.
pub const UNKNOWN_MARKER: &str = "UNKNOWN";

/// Venue labels the classifier resolves on its own. A market field outside
/// this list that still looks like a raw address needs user attention.
pub const KNOWN_MARKETS: &[&str] = &[
    "Jupiter",
    "Raydium",
    "Orca",
    "Phoenix",
    "Meteora",
    "Lifinity",
    "Pump.fun",
    "OpenBook",
    "Wallet",
];

pub fn is_known_market(label: &str) -> bool {
    KNOWN_MARKETS
        .iter()
        .any(|m| m.eq_ignore_ascii_case(label.trim()))
}

/// Canonical transaction categories, in report order. The row field itself
/// stays a string — upstream classifiers have emitted labels outside this
/// set and the summary must still order them (alphabetically, at the end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxType {
    Deposit,
    Withdrawal,
    Trade,
    Staking,
    Airdrop,
    Income,
    Expense,
    Fee,
}

pub const TRADE_BUY: &str = "Trade (buy)";
pub const TRADE_SELL: &str = "Trade (sell)";

impl TxType {
    pub const ALL: &'static [TxType] = &[
        TxType::Deposit,
        TxType::Withdrawal,
        TxType::Trade,
        TxType::Staking,
        TxType::Airdrop,
        TxType::Income,
        TxType::Expense,
        TxType::Fee,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TxType::Deposit => "Deposit",
            TxType::Withdrawal => "Withdrawal",
            TxType::Trade => "Trade",
            TxType::Staking => "Staking",
            TxType::Airdrop => "Airdrop",
            TxType::Income => "Income",
            TxType::Expense => "Expense",
            TxType::Fee => "Fee",
        }
    }
}

/// Report ordering for type labels: the canonical set in declaration order
/// with the trade split inserted in place of Trade, unrecognized labels
/// after, alphabetically.
pub fn type_order_key(label: &str) -> (usize, String) {
    let mut rank = 0usize;
    for t in TxType::ALL {
        if *t == TxType::Trade {
            if label.eq_ignore_ascii_case(TRADE_BUY) {
                return (rank, String::new());
            }
            rank += 1;
            if label.eq_ignore_ascii_case(TRADE_SELL) {
                return (rank, String::new());
            }
            rank += 1;
        } else {
            if label.eq_ignore_ascii_case(t.label()) {
                return (rank, String::new());
            }
            rank += 1;
        }
    }
    (usize::MAX, label.to_lowercase())
}

/// One classified ledger line, exactly as the classification layer hands it
/// over. All value fields are loose strings; parsing happens at read sites
/// and never fails hard. Raw per-transaction fields (signature, signer,
/// counterparties, program id) ride along in `extra` under whatever key
/// spelling the upstream version used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxRow {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, rename = "type")]
    pub tx_type: String,
    #[serde(default)]
    pub inflow_amount: String,
    #[serde(default)]
    pub inflow_currency: String,
    #[serde(default)]
    pub outflow_amount: String,
    #[serde(default)]
    pub outflow_currency: String,
    #[serde(default)]
    pub fee_amount: String,
    #[serde(default)]
    pub fee_currency: String,
    #[serde(default)]
    pub market: String,
    #[serde(default)]
    pub note: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl TxRow {
    /// Projection of this row through the override map: currency and market
    /// fields substituted, everything else untouched. Never persisted —
    /// always recomputed, so clearing a map entry un-corrects.
    pub fn effective(&self, overrides: &OverrideMap) -> TxRow {
        let mut row = self.clone();
        row.inflow_currency = overrides.symbol(&self.inflow_currency).to_string();
        row.outflow_currency = overrides.symbol(&self.outflow_currency).to_string();
        row.fee_currency = overrides.symbol(&self.fee_currency).to_string();
        row.market = overrides.market(&self.market).to_string();
        row
    }
}

/// User corrections for raw currency tokens and market labels. Symbol
/// values are normalized to uppercase on insert; market casing is kept as
/// typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideMap {
    #[serde(default)]
    pub symbols: BTreeMap<String, String>,
    #[serde(default)]
    pub markets: BTreeMap<String, String>,
}

impl OverrideMap {
    pub fn symbol<'a>(&'a self, raw: &'a str) -> &'a str {
        self.symbols.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn market<'a>(&'a self, raw: &'a str) -> &'a str {
        self.markets.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.markets.is_empty()
    }
}
