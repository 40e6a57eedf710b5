//! Source file retrieval for the code viewer.
//!
//! | Outcome                        | Status | Body                                   |
//! |--------------------------------|--------|----------------------------------------|
//! | file read                      | 200    | `{ content }`                          |
//! | missing guide file             | 200    | `{ content, isPlaceholder: true }`     |
//! | no `path`                      | 400    | `{ error }`                            |
//! | path leaves the content root   | 403    | `{ error }`                            |
//! | missing file                   | 404    | `{ error, filePath, hint }`            |
//! | anything else                  | 500    | `{ error }`                            |

use std::path::PathBuf;
use std::sync::Arc;
use std::{fs, io};

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use super::curriculum::Curriculum;
use super::{markdown, placeholder};
use crate::config::ContentConfig;

const NOT_FOUND_HINT: &str = "This file may not have been created yet. \
     Please check if the file path is correct or if the content is available \
     in the lesson instructions.";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("File path is required")]
    MissingPath,

    #[error("Invalid file path")]
    InvalidPath,

    #[error("File not found")]
    NotFound { path: String },

    #[error("{0}")]
    Io(#[from] io::Error),
}

impl SourceError {
    pub const fn status(&self) -> u16 {
        match self {
            Self::MissingPath => 400,
            Self::InvalidPath => 403,
            Self::NotFound { .. } => 404,
            Self::Io(_) => 500,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::NotFound { path } => json!({
                "error": self.to_string(),
                "filePath": path,
                "hint": NOT_FOUND_HINT,
            }),
            _ => json!({ "error": self.to_string() }),
        }
    }
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub content: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_placeholder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl SourceFile {
    fn with_html(mut self, path: &str) -> Self {
        let html = if self.is_placeholder {
            markdown::render(&self.content)
        } else {
            markdown::render_file(path, &self.content)
        };
        self.html = Some(html);
        self
    }
}

/// Read-only view of the content root.
pub struct ContentStore {
    root: PathBuf,
    guide_markers: Vec<String>,
    curriculum: Arc<Curriculum>,
}

impl ContentStore {
    pub fn new(root: PathBuf, guide_markers: Vec<String>, curriculum: Arc<Curriculum>) -> Self {
        Self {
            root,
            guide_markers,
            curriculum,
        }
    }

    pub fn from_config(content: &ContentConfig, curriculum: Arc<Curriculum>) -> Self {
        Self::new(
            content.root.clone(),
            content.guide_markers.clone(),
            curriculum,
        )
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    fn is_guide(&self, path: &str) -> bool {
        self.guide_markers.iter().any(|m| path.contains(m.as_str()))
    }

    /// Fetch `path` (relative to the content root). `with_html` also renders
    /// the content to HTML.
    pub fn fetch_source_file(
        &self,
        path: Option<&str>,
        with_html: bool,
    ) -> Result<SourceFile, SourceError> {
        let path = path.filter(|p| !p.is_empty()).ok_or(SourceError::MissingPath)?;
        let full = crate::utils::path::confine(&self.root, path).ok_or(SourceError::InvalidPath)?;

        let file = if full.exists() {
            SourceFile {
                content: fs::read_to_string(&full)?,
                is_placeholder: false,
                html: None,
            }
        } else if self.is_guide(path) {
            crate::debug!("content"; "placeholder for {}", path);
            let example = self.curriculum.find_example_by_file(path);
            SourceFile {
                content: placeholder::render(path, example),
                is_placeholder: true,
                html: None,
            }
        } else {
            return Err(SourceError::NotFound {
                path: path.to_string(),
            });
        };

        Ok(if with_html { file.with_html(path) } else { file })
    }
}
