use std::path::Path;

use crate::browser::ReviewBrowser;
use crate::error::Result;
use crate::session::ReviewSession;
use crate::store::{self, OverrideStore};

pub fn run(file: &str, store_path: &Path) -> Result<()> {
    let rows = store::load_rows(Path::new(file))?;
    let persisted = store::load_store(store_path);
    let session = ReviewSession::new(rows, persisted.overrides, persisted.ignored);

    let mut browser = ReviewBrowser::new(session);
    browser.run()?;

    // Row edits go back into the row file; overrides and the ignored set
    // persist separately so they apply to future imports too.
    let session = browser.into_session();
    store::save_rows(Path::new(file), session.rows())?;
    store::save_store(
        store_path,
        &OverrideStore {
            overrides: session.overrides,
            ignored: session.ignored,
        },
    )?;
    Ok(())
}
