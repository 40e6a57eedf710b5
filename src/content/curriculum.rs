//! Curriculum tree: categories → topics → examples → code files.
//!
//! Loaded once from `curriculum.json` and shared as `Arc<Curriculum>`.
//! Every level is sorted by its `order` field at load time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurriculumError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid curriculum in `{0}`")]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// Failed curriculum lookup. Display text is the 404 message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Category not found: {0}")]
    Category(String),
    #[error("Topic not found: {0}")]
    Topic(String),
    #[error("Example not found: {0}")]
    Example(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFile {
    pub name: String,
    /// Relative to the content root.
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub files: Vec<CodeFile>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub execution_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub order: u32,
}

/// Category without its topic tree, for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub icon: &'a str,
    pub topic_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Curriculum {
    /// Parse curriculum JSON and sort every level by `order`.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut curriculum: Self = serde_json::from_str(text)?;
        curriculum.sort();
        Ok(curriculum)
    }

    pub fn load(path: &Path) -> Result<Self, CurriculumError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CurriculumError::Io(path.to_path_buf(), e))?;
        Self::from_json(&text).map_err(|e| CurriculumError::Parse(path.to_path_buf(), e))
    }

    /// Load `path`, or an empty curriculum when the file does not exist.
    pub fn load_or_empty(path: &Path) -> Result<Self, CurriculumError> {
        if !path.exists() {
            crate::debug!("content"; "no curriculum at {}", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn sort(&mut self) {
        self.categories.sort_by_key(|c| c.order);
        for category in &mut self.categories {
            category.topics.sort_by_key(|t| t.order);
            for topic in &mut category.topics {
                topic.examples.sort_by_key(|e| e.order);
                for example in &mut topic.examples {
                    example.files.sort_by_key(|f| f.order);
                }
            }
        }
    }

    pub fn summaries(&self) -> Vec<CategorySummary<'_>> {
        self.categories
            .iter()
            .map(|c| CategorySummary {
                id: &c.id,
                title: &c.title,
                description: &c.description,
                icon: &c.icon,
                topic_count: c.topics.len(),
            })
            .collect()
    }

    pub fn get_category(&self, category_id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    pub fn get_topic(&self, category_id: &str, topic_id: &str) -> Option<&Topic> {
        self.get_category(category_id)?
            .topics
            .iter()
            .find(|t| t.id == topic_id)
    }

    pub fn get_example(
        &self,
        category_id: &str,
        topic_id: &str,
        example_id: &str,
    ) -> Option<&Example> {
        self.get_topic(category_id, topic_id)?
            .examples
            .iter()
            .find(|e| e.id == example_id)
    }

    /// Like the `get_*` lookups, but says which level was missing.
    pub fn lookup(
        &self,
        category_id: &str,
        topic_id: Option<&str>,
        example_id: Option<&str>,
    ) -> Result<serde_json::Value, LookupError> {
        let category = self
            .get_category(category_id)
            .ok_or_else(|| LookupError::Category(category_id.to_string()))?;
        let Some(topic_id) = topic_id else {
            return Ok(to_value(category));
        };

        let topic = category
            .topics
            .iter()
            .find(|t| t.id == topic_id)
            .ok_or_else(|| LookupError::Topic(topic_id.to_string()))?;
        let Some(example_id) = example_id else {
            return Ok(to_value(topic));
        };

        topic
            .examples
            .iter()
            .find(|e| e.id == example_id)
            .map(to_value)
            .ok_or_else(|| LookupError::Example(example_id.to_string()))
    }

    /// First example that lists `file_path` among its files.
    pub fn find_example_by_file(&self, file_path: &str) -> Option<&Example> {
        self.categories
            .iter()
            .flat_map(|c| &c.topics)
            .flat_map(|t| &t.examples)
            .find(|e| e.files.iter().any(|f| f.file_path == file_path))
    }
}

fn to_value<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "categories": [
            {
                "id": "javascript",
                "title": "JavaScript",
                "description": "Make pages interactive",
                "icon": "⚡",
                "order": 2,
                "topics": []
            },
            {
                "id": "getting-started",
                "title": "Getting Started",
                "description": "Set up your environment",
                "icon": "🚀",
                "order": 0,
                "topics": [
                    {
                        "id": "setup",
                        "title": "Development Environment Setup",
                        "order": 1,
                        "examples": [
                            {
                                "id": "install-git",
                                "title": "Step 2: Install Git",
                                "order": 2,
                                "files": []
                            },
                            {
                                "id": "install-nodejs",
                                "title": "Step 1: Install Node.js and npm",
                                "learningObjectives": ["Download and install Node.js"],
                                "files": [
                                    {
                                        "name": "README.md",
                                        "filePath": "GETTING STARTED/1. Install Node.js.txt",
                                        "order": 1
                                    }
                                ],
                                "steps": ["Visit nodejs.org"],
                                "executionSteps": ["node --version"],
                                "expectedOutput": "Node.js version displayed",
                                "order": 1
                            }
                        ]
                    }
                ]
            }
        ]
    }"#;

    fn sample() -> Curriculum {
        Curriculum::from_json(SAMPLE).unwrap()
    }

    #[test]
    fn test_sorted_by_order() {
        let c = sample();
        assert_eq!(c.categories[0].id, "getting-started");
        assert_eq!(c.categories[0].topics[0].examples[0].id, "install-nodejs");
    }

    #[test]
    fn test_get_helpers() {
        let c = sample();
        assert_eq!(c.get_category("javascript").unwrap().title, "JavaScript");
        assert!(c.get_category("rust").is_none());
        assert!(c.get_topic("getting-started", "setup").is_some());
        assert!(c.get_topic("javascript", "setup").is_none());

        let example = c
            .get_example("getting-started", "setup", "install-nodejs")
            .unwrap();
        assert_eq!(example.execution_steps, ["node --version"]);
        assert!(c.get_example("getting-started", "setup", "nope").is_none());
    }

    #[test]
    fn test_lookup_reports_missing_level() {
        let c = sample();
        assert_eq!(
            c.lookup("nope", None, None),
            Err(LookupError::Category("nope".into()))
        );
        assert_eq!(
            c.lookup("getting-started", Some("x"), None),
            Err(LookupError::Topic("x".into()))
        );
        assert_eq!(
            c.lookup("getting-started", Some("setup"), Some("y")).unwrap_err().to_string(),
            "Example not found: y"
        );

        let example = c
            .lookup("getting-started", Some("setup"), Some("install-nodejs"))
            .unwrap();
        assert_eq!(example["learningObjectives"][0], "Download and install Node.js");
    }

    #[test]
    fn test_find_example_by_file() {
        let c = sample();
        let example = c
            .find_example_by_file("GETTING STARTED/1. Install Node.js.txt")
            .unwrap();
        assert_eq!(example.id, "install-nodejs");
        assert!(c.find_example_by_file("other.txt").is_none());
    }

    #[test]
    fn test_summaries() {
        let c = sample();
        let summaries = c.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].topic_count, 1);
        let json = serde_json::to_value(&summaries).unwrap();
        assert_eq!(json[1]["topicCount"], 0);
    }

    #[test]
    fn test_load_or_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curriculum.json");
        assert_eq!(Curriculum::load_or_empty(&path).unwrap(), Curriculum::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Curriculum::load_or_empty(&path),
            Err(CurriculumError::Parse(..))
        ));

        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(Curriculum::load(&path).unwrap().categories.len(), 2);
    }
}
