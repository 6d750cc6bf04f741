use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::shorten;
use crate::issues::{self, Issue, IssueKind, IssueStatus};
use crate::store;

pub fn list(file: &str, store_path: &Path) -> Result<()> {
    let rows = store::load_rows(Path::new(file))?;
    let persisted = store::load_store(store_path);
    let all = issues::compute_issues(&rows, &persisted.overrides, &persisted.ignored);

    if all.is_empty() {
        println!("No unknown tokens or markets. Ready to export.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Kind", "Key", "Rows", "Status", "Replacement", "Example"]);
    for issue in &all {
        table.add_row(vec![
            Cell::new(issue.kind.label()),
            Cell::new(&issue.key),
            Cell::new(issue.occurrences),
            Cell::new(status_cell(issue)),
            Cell::new(issue.proposed_name.as_deref().unwrap_or("-")),
            Cell::new(
                issue
                    .signatures
                    .first()
                    .map(|s| shorten(s))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }
    println!("{table}");

    let pending = issues::pending_count(&all);
    if pending > 0 {
        println!(
            "{}",
            format!("{pending} pending issue(s) block export. Rename or ignore them.").yellow()
        );
    }
    Ok(())
}

fn status_cell(issue: &Issue) -> String {
    match issue.status {
        IssueStatus::Pending => issue.status.label().yellow().to_string(),
        IssueStatus::Renamed => issue.status.label().green().to_string(),
        IssueStatus::Ignored => issue.status.label().dimmed().to_string(),
    }
}

pub fn rename(file: &str, store_path: &Path, kind: IssueKind, key: &str, value: &str) -> Result<()> {
    let _ = store::load_rows(Path::new(file))?;
    let mut persisted = store::load_store(store_path);
    issues::rename_issue(&mut persisted.overrides, kind, key, value);
    store::save_store(store_path, &persisted)?;
    println!("{} {} -> {}", kind.label(), key, value);
    Ok(())
}

pub fn ignore(file: &str, store_path: &Path, kind: IssueKind, key: &str) -> Result<()> {
    let _ = store::load_rows(Path::new(file))?;
    let mut persisted = store::load_store(store_path);
    issues::toggle_ignore(&mut persisted.ignored, kind, key);
    let ignored = persisted.ignored.contains(&kind.ignore_id(key));
    store::save_store(store_path, &persisted)?;
    if ignored {
        println!("Ignored {} {}", kind.label(), key);
    } else {
        println!("Un-ignored {} {}", kind.label(), key);
    }
    Ok(())
}

pub fn ignore_all(file: &str, store_path: &Path) -> Result<()> {
    let rows = store::load_rows(Path::new(file))?;
    let mut persisted = store::load_store(store_path);
    let all = issues::compute_issues(&rows, &persisted.overrides, &persisted.ignored);
    let pending = issues::pending_count(&all);
    issues::ignore_all_pending(&mut persisted.ignored, &all);
    store::save_store(store_path, &persisted)?;
    println!("Ignored {pending} pending issue(s)");
    Ok(())
}
