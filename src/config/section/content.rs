//! `[content]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [content]
//! root = "lib"                        # Files served by /api/code
//! curriculum = "curriculum.json"      # Relative to root
//! guide_markers = ["DEPLOYMENT GUIDES", "GETTING STARTED"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Content served to the lab page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory that file requests are confined to.
    pub root: PathBuf,

    /// Curriculum file, relative to `root`.
    pub curriculum: PathBuf,

    /// Path fragments of guide files that may not exist yet.
    /// Missing files under these get placeholder content instead of a 404.
    pub guide_markers: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            curriculum: PathBuf::from("curriculum.json"),
            guide_markers: vec!["DEPLOYMENT GUIDES".into(), "GETTING STARTED".into()],
        }
    }
}

impl ContentConfig {
    pub const ROOT: FieldPath = FieldPath::new("content.root");
    pub const CURRICULUM: FieldPath = FieldPath::new("content.curriculum");
    pub const GUIDE_MARKERS: FieldPath = FieldPath::new("content.guide_markers");

    /// Curriculum file under `root`.
    pub fn curriculum_path(&self) -> PathBuf {
        self.root.join(&self.curriculum)
    }

    /// Resolve `root` against the project root.
    pub fn normalize(&mut self, project_root: &Path) {
        self.root = crate::utils::path::normalize_path(&project_root.join(&self.root));
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.curriculum.is_absolute() {
            diag.error_with_hint(
                Self::CURRICULUM,
                format!("must be relative to content.root: {}", self.curriculum.display()),
                "e.g. curriculum = \"curriculum.json\"",
            );
        }
        if self.guide_markers.iter().any(|m| m.trim().is_empty()) {
            diag.error(Self::GUIDE_MARKERS, "empty marker would match every path");
        }
        if !self.root.is_dir() {
            diag.warn(
                Self::ROOT,
                format!("{} is not a directory, file requests will 404", self.root.display()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_content_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.content.root, PathBuf::from("."));
        assert_eq!(config.content.curriculum, PathBuf::from("curriculum.json"));
        assert_eq!(config.content.guide_markers.len(), 2);
    }

    #[test]
    fn test_custom_markers() {
        let config = test_parse_config("[content]\nroot = \"lib\"\nguide_markers = [\"DRAFTS\"]");
        assert_eq!(config.content.root, PathBuf::from("lib"));
        assert_eq!(config.content.guide_markers, ["DRAFTS"]);
        assert_eq!(config.content.curriculum_path(), PathBuf::from("lib/curriculum.json"));
    }

    #[test]
    fn test_validate() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = ContentConfig::default();
        content.normalize(dir.path());

        let mut diag = ConfigDiagnostics::new();
        content.validate(&mut diag);
        assert!(!diag.has_errors());
        assert!(diag.warnings().is_empty());

        content.curriculum = dir.path().join("c.json");
        content.guide_markers.push("  ".into());
        content.root = dir.path().join("missing");
        let mut diag = ConfigDiagnostics::new();
        content.validate(&mut diag);
        assert_eq!(diag.errors().len(), 2);
        assert_eq!(diag.warnings().len(), 1);
    }
}
