//! Rollup of the filtered effective rows by currency and normalized type,
//! with a per-market breakdown inside each currency. The generic trade
//! category is split by which side of the row the currency sat on.

use std::collections::BTreeMap;

use crate::fmt::parse_amount;
use crate::models::{type_order_key, TxRow, TRADE_BUY, TRADE_SELL};

#[derive(Debug, Clone, PartialEq)]
pub struct TypeTotal {
    pub type_label: String,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketBreakdown {
    pub market: String,
    pub types: Vec<TypeTotal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencySummary {
    pub currency: String,
    pub types: Vec<TypeTotal>,
    pub markets: Vec<MarketBreakdown>,
}

#[derive(Default)]
struct Accum {
    types: BTreeMap<String, (f64, usize)>,
    markets: BTreeMap<String, BTreeMap<String, (f64, usize)>>,
}

fn split_type_label(tx_type: &str, inflow_side: bool) -> String {
    let t = tx_type.trim();
    if t.eq_ignore_ascii_case("trade") {
        if inflow_side { TRADE_BUY } else { TRADE_SELL }.to_string()
    } else {
        t.to_string()
    }
}

fn sorted_totals(types: BTreeMap<String, (f64, usize)>) -> Vec<TypeTotal> {
    let mut out: Vec<TypeTotal> = types
        .into_iter()
        .filter(|(_, (total, _))| *total != 0.0)
        .map(|(type_label, (total, count))| TypeTotal {
            type_label,
            total,
            count,
        })
        .collect();
    out.sort_by_key(|t| type_order_key(&t.type_label));
    out
}

/// Aggregate the given effective rows (the caller passes the *filtered*
/// set, never the windowed slice). Currencies come out alphabetically;
/// types follow the canonical order with the trade split in place; net-zero
/// type totals are omitted.
pub fn summarize(effective: &[TxRow]) -> Vec<CurrencySummary> {
    let mut by_currency: BTreeMap<String, Accum> = BTreeMap::new();

    for row in effective {
        let market = row.market.trim().to_string();
        let sides = [
            (&row.inflow_currency, parse_amount(&row.inflow_amount), true),
            (&row.outflow_currency, -parse_amount(&row.outflow_amount), false),
        ];
        for (currency, amount, inflow_side) in sides {
            let currency = currency.trim();
            if currency.is_empty() {
                continue;
            }
            let label = split_type_label(&row.tx_type, inflow_side);
            let accum = by_currency.entry(currency.to_string()).or_default();
            let t = accum.types.entry(label.clone()).or_default();
            t.0 += amount;
            t.1 += 1;
            let m = accum
                .markets
                .entry(market.clone())
                .or_default()
                .entry(label)
                .or_default();
            m.0 += amount;
            m.1 += 1;
        }
    }

    by_currency
        .into_iter()
        .map(|(currency, accum)| {
            let markets = accum
                .markets
                .into_iter()
                .map(|(market, types)| MarketBreakdown {
                    market,
                    types: sorted_totals(types),
                })
                .filter(|m| !m.types.is_empty())
                .collect();
            CurrencySummary {
                currency,
                types: sorted_totals(accum.types),
                markets,
            }
        })
        .filter(|c| !c.types.is_empty())
        .collect()
}
