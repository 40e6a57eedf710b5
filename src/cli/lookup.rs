//! Lookup command: print a curriculum category, topic or example.

use anyhow::Result;

use crate::cli::common::{format_json, load_curriculum};
use crate::config::LabConfig;

pub fn lookup(
    category: &str,
    topic: Option<&str>,
    example: Option<&str>,
    config: &LabConfig,
) -> Result<()> {
    let curriculum = load_curriculum(config)?;
    let value = curriculum.lookup(category, topic, example)?;
    println!("{}", format_json(&value, true)?);
    Ok(())
}
