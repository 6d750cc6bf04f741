use std::path::Path;

use colored::Colorize;

use crate::error::{Result, WalterError};
use crate::extract::extract_signature;
use crate::issues;
use crate::store;

const HEADER: &[&str] = &[
    "Timestamp",
    "Type",
    "Inflow Amount",
    "Inflow Currency",
    "Outflow Amount",
    "Outflow Currency",
    "Market",
    "Note",
    "Signature",
];

pub fn run(file: &str, output: &str, force: bool, store_path: &Path) -> Result<()> {
    let rows = store::load_rows(Path::new(file))?;
    let persisted = store::load_store(store_path);

    let all = issues::compute_issues(&rows, &persisted.overrides, &persisted.ignored);
    let pending = issues::pending_count(&all);
    if pending > 0 && !force {
        return Err(WalterError::Other(format!(
            "{pending} pending issue(s) remain. Resolve them with `walter issues`, or pass --force."
        )));
    }
    if pending > 0 {
        println!(
            "{}",
            format!("Exporting with {pending} unresolved issue(s).").yellow()
        );
    }

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(HEADER)?;
    for row in &rows {
        let eff = row.effective(&persisted.overrides);
        let signature = extract_signature(row).unwrap_or("");
        writer.write_record([
            eff.timestamp.as_str(),
            eff.tx_type.as_str(),
            eff.inflow_amount.as_str(),
            eff.inflow_currency.as_str(),
            eff.outflow_amount.as_str(),
            eff.outflow_currency.as_str(),
            eff.market.as_str(),
            eff.note.as_str(),
            signature,
        ])?;
    }
    writer.flush()?;

    println!("Wrote {} row(s) to {}", rows.len(), output);
    Ok(())
}
