use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::fmt::TIMESTAMP_FORMAT;
use crate::models::TxRow;
use crate::store::save_rows;

const TOKENS: &[&str] = &["SOL", "USDC", "JUP", "BONK", "RAY"];

/// Mints the classifier failed to resolve, shown as placeholder symbols.
const PLACEHOLDERS: &[&str] = &["SPL-7xKq", "SPL-9mPw", "SPL-2aZd"];

const MARKETS: &[&str] = &["Jupiter", "Raydium", "Orca", "Phoenix"];

/// Raw program addresses the classifier could not name.
const UNKNOWN_MARKETS: &[&str] = &[
    "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4",
    "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8",
];

const WALLETS: &[&str] = &[
    "4fYNw3dojWmQ4dXtSGE9epjRGy9pFSx62YypT7avPYvp",
    "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
    "7VHUFJHWu2CuExkJcJrzhQPJ2oygupTWkL2A2For4BmE",
];

const BASE58: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn random_signature(rng: &mut impl Rng) -> String {
    (0..88)
        .map(|_| BASE58[rng.gen_range(0..BASE58.len())] as char)
        .collect()
}

pub fn run(output: &str, count: usize) -> Result<()> {
    let mut rng = rand::thread_rng();
    // 2025-01-01 09:00:00 UTC
    let start = DateTime::<Utc>::from_timestamp(1_735_722_000, 0).unwrap_or_default();

    let mut rows = Vec::with_capacity(count);
    for i in 0..count {
        let ts = start + Duration::minutes(i as i64 * 90 + rng.gen_range(0..60));
        let signer = WALLETS.choose(&mut rng).copied().unwrap_or(WALLETS[0]);
        let signature = random_signature(&mut rng);

        let roll: u8 = rng.gen_range(0..10);
        let mut row = TxRow {
            timestamp: ts.format(TIMESTAMP_FORMAT).to_string(),
            ..TxRow::default()
        };
        row.extra.insert("signer".to_string(), signer.to_string());
        row.extra.insert("signature".to_string(), signature);

        match roll {
            // trades, some against tokens the classifier could not name
            0..=4 => {
                row.tx_type = "Trade".to_string();
                let buy = *TOKENS.choose(&mut rng).unwrap_or(&"SOL");
                let sell = if rng.gen_bool(0.25) {
                    PLACEHOLDERS.choose(&mut rng).copied().unwrap_or(PLACEHOLDERS[0])
                } else {
                    *TOKENS.choose(&mut rng).unwrap_or(&"USDC")
                };
                row.inflow_amount = format!("{:.4}", rng.gen_range(0.5..2500.0));
                row.inflow_currency = buy.to_string();
                row.outflow_amount = format!("{:.4}", rng.gen_range(0.5..2500.0));
                row.outflow_currency = sell.to_string();
                row.market = if rng.gen_bool(0.2) {
                    UNKNOWN_MARKETS.choose(&mut rng).copied().unwrap_or(UNKNOWN_MARKETS[0]).to_string()
                } else {
                    MARKETS.choose(&mut rng).copied().unwrap_or(MARKETS[0]).to_string()
                };
            }
            5..=6 => {
                row.tx_type = "Deposit".to_string();
                row.inflow_amount = format!("{:.4}", rng.gen_range(1.0..500.0));
                row.inflow_currency = TOKENS.choose(&mut rng).copied().unwrap_or("SOL").to_string();
                row.market = "Wallet".to_string();
                let sender = WALLETS.choose(&mut rng).copied().unwrap_or(WALLETS[1]);
                row.extra.insert("sender".to_string(), sender.to_string());
            }
            7..=8 => {
                row.tx_type = "Withdrawal".to_string();
                row.outflow_amount = format!("{:.4}", rng.gen_range(1.0..500.0));
                row.outflow_currency = TOKENS.choose(&mut rng).copied().unwrap_or("USDC").to_string();
                row.market = if rng.gen_bool(0.1) { "UNKNOWN" } else { "Wallet" }.to_string();
                let recipient = WALLETS.choose(&mut rng).copied().unwrap_or(WALLETS[2]);
                row.extra.insert("recipient".to_string(), recipient.to_string());
            }
            _ => {
                row.tx_type = "Fee".to_string();
                row.outflow_amount = format!("{:.6}", rng.gen_range(0.000005..0.01));
                row.outflow_currency = "SOL".to_string();
                row.market = MARKETS.choose(&mut rng).copied().unwrap_or(MARKETS[0]).to_string();
            }
        }
        if rng.gen_bool(0.3) {
            row.note = format!("batch {}", i / 10);
        }
        rows.push(row);
    }

    save_rows(Path::new(output), &rows)?;
    println!("Wrote {count} sample row(s) to {output}");
    println!("Try: walter review {output}");
    Ok(())
}
