//! Fetch command: read a content file the way `/api/code` does.

use anyhow::Result;

use crate::cli::common::{content_store, format_json};
use crate::config::LabConfig;

/// Print the endpoint's JSON body. Fails (non-zero exit) on anything but
/// a 200.
pub fn fetch_file(path: &str, html: bool, pretty: bool, config: &LabConfig) -> Result<()> {
    let store = content_store(config)?;
    match store.fetch_source_file(Some(path), html) {
        Ok(file) => {
            println!("{}", format_json(&file, pretty)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", format_json(&err.to_json(), pretty)?);
            Err(anyhow::anyhow!("{} ({})", err, err.status()))
        }
    }
}
