use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::amount;
use crate::store;
use crate::summary::summarize;

pub fn run(file: &str, store_path: &Path) -> Result<()> {
    let rows = store::load_rows(Path::new(file))?;
    let persisted = store::load_store(store_path);
    let effective: Vec<_> = rows.iter().map(|r| r.effective(&persisted.overrides)).collect();
    let rollup = summarize(&effective);

    if rollup.is_empty() {
        println!("No transactions to summarize.");
        return Ok(());
    }

    for currency in &rollup {
        println!();
        println!("{}", currency.currency.bold());

        let mut table = Table::new();
        table.set_header(vec!["Type", "Rows", "Net"]);
        for t in &currency.types {
            table.add_row(vec![
                Cell::new(&t.type_label),
                Cell::new(t.count),
                Cell::new(amount(t.total)),
            ]);
        }
        println!("{table}");

        for market in &currency.markets {
            println!("  {}", market.market.dimmed());
            for t in &market.types {
                println!(
                    "    {:<24} {:>5}  {}",
                    t.type_label,
                    t.count,
                    amount(t.total)
                );
            }
        }
    }
    Ok(())
}
