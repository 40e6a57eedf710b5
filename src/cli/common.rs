//! Common utilities shared across CLI commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::LabConfig;
use crate::content::{ContentStore, Curriculum};

/// Load the curriculum named by the config. A missing file is an empty
/// curriculum.
pub fn load_curriculum(config: &LabConfig) -> Result<Curriculum> {
    let path = config.content.curriculum_path();
    Curriculum::load_or_empty(&path).with_context(|| format!("loading {}", path.display()))
}

/// Content store over the configured root.
pub fn content_store(config: &LabConfig) -> Result<ContentStore> {
    let curriculum = load_curriculum(config)?;
    Ok(ContentStore::from_config(&config.content, Arc::new(curriculum)))
}

/// Serialize `value` as compact or pretty JSON.
pub fn format_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_json() {
        let value = json!({ "content": "a" });
        assert_eq!(format_json(&value, false).unwrap(), r#"{"content":"a"}"#);
        assert_eq!(format_json(&value, true).unwrap(), "{\n  \"content\": \"a\"\n}");
    }

    #[test]
    fn test_missing_curriculum_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LabConfig::default();
        config.content.root = dir.path().to_path_buf();
        assert!(load_curriculum(&config).unwrap().categories.is_empty());
    }
}
