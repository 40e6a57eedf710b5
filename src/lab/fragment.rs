//! Source buffers for the four editable fragments.
//!
//! The fragment set is a fixed record rather than an open map, so "all four
//! fragments are present" holds by construction.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language tag of an editable fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lang {
    #[default]
    #[serde(rename = "html")]
    Markup,
    #[serde(rename = "css")]
    Style,
    #[serde(rename = "js")]
    Script,
    #[serde(rename = "ts")]
    TypedScript,
}

impl Lang {
    /// All tags in editor tab order.
    pub const ALL: [Lang; 4] = [Lang::Markup, Lang::Style, Lang::Script, Lang::TypedScript];

    /// Wire tag used in URLs and JSON.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Style => "css",
            Self::Script => "js",
            Self::TypedScript => "ts",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" | "markup" => Ok(Self::Markup),
            "css" | "style" => Ok(Self::Style),
            "js" | "script" | "javascript" => Ok(Self::Script),
            "ts" | "typed-script" | "typescript" => Ok(Self::TypedScript),
            other => Err(format!("unknown fragment `{other}` (expected html, css, js or ts)")),
        }
    }
}

const DEFAULT_MARKUP: &str = r#"<!-- You can update the markup freely -->
<main class="stage">
  <h1>Hello learner 👋</h1>
  <p>Start editing HTML/CSS/JS/TS and run it instantly.</p>
  <button class="cta">Run the code!</button>
</main>"#;

const DEFAULT_STYLE: &str = r#":root {
  font-family: "Inter", system-ui, -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
}

body {
  margin: 0;
  background: linear-gradient(135deg, #0f172a, #1e293b);
  color: #fff;
}

.stage {
  min-height: 100vh;
  display: flex;
  flex-direction: column;
  align-items: center;
  justify-content: center;
  gap: 1.5rem;
}

.cta {
  padding: 0.75rem 1.5rem;
  border-radius: 999px;
  background: #22d3ee;
  color: #0f172a;
  font-weight: 700;
  border: none;
  cursor: pointer;
}"#;

const DEFAULT_SCRIPT: &str = r#"const button = document.querySelector(".cta");

if (button) {
  button.addEventListener("click", () => {
    console.log("🚀 Code executed successfully!");
  });
}"#;

const DEFAULT_TYPED_SCRIPT: &str = r#"type Mood = "motivated" | "curious" | "confident";

const learnerMood: Mood = "motivated";

const encourage = (mood: Mood): string => {
  return mood === "motivated"
    ? "Amazing energy! Keep building."
    : mood === "curious"
      ? "Curiosity builds expertise."
      : "You're on track, trust the process.";
};

console.log(encourage(learnerMood));"#;

/// The four source fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentSet {
    pub markup: String,
    pub style: String,
    pub script: String,
    pub typed_script: String,
}

impl FragmentSet {
    /// All four fragments empty.
    pub fn empty() -> Self {
        Self {
            markup: String::new(),
            style: String::new(),
            script: String::new(),
            typed_script: String::new(),
        }
    }

    /// Built-in sample content.
    pub fn samples() -> Self {
        Self {
            markup: DEFAULT_MARKUP.to_string(),
            style: DEFAULT_STYLE.to_string(),
            script: DEFAULT_SCRIPT.to_string(),
            typed_script: DEFAULT_TYPED_SCRIPT.to_string(),
        }
    }

    /// Whether the typed-script fragment has anything to compile.
    pub fn has_typed_script(&self) -> bool {
        !self.typed_script.trim().is_empty()
    }
}

impl Default for FragmentSet {
    fn default() -> Self {
        Self::samples()
    }
}

impl Index<Lang> for FragmentSet {
    type Output = String;

    fn index(&self, lang: Lang) -> &String {
        match lang {
            Lang::Markup => &self.markup,
            Lang::Style => &self.style,
            Lang::Script => &self.script,
            Lang::TypedScript => &self.typed_script,
        }
    }
}

impl IndexMut<Lang> for FragmentSet {
    fn index_mut(&mut self, lang: Lang) -> &mut String {
        match lang {
            Lang::Markup => &mut self.markup,
            Lang::Style => &mut self.style,
            Lang::Script => &mut self.script,
            Lang::TypedScript => &mut self.typed_script,
        }
    }
}

/// Editable buffers plus the tab the editor is bound to.
#[derive(Debug, Clone, Default)]
pub struct SourceBuffers {
    fragments: FragmentSet,
    active: Lang,
}

impl SourceBuffers {
    #[cfg(test)]
    pub fn new(fragments: FragmentSet) -> Self {
        Self {
            fragments,
            active: Lang::default(),
        }
    }

    pub fn get(&self, lang: Lang) -> &str {
        &self.fragments[lang]
    }

    /// Replace the buffer for `lang`. Any text is accepted.
    pub fn set(&mut self, lang: Lang, text: impl Into<String>) {
        self.fragments[lang] = text.into();
    }

    /// Restore the built-in samples for every tag.
    pub fn reset_all(&mut self) {
        self.fragments = FragmentSet::samples();
    }

    pub fn active(&self) -> Lang {
        self.active
    }

    pub fn select(&mut self, lang: Lang) {
        self.active = lang;
    }

    pub fn fragments(&self) -> &FragmentSet {
        &self.fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_roundtrip_leaves_others() {
        for lang in Lang::ALL {
            let mut buffers = SourceBuffers::default();
            let before = buffers.fragments().clone();

            buffers.set(lang, "<x>\u{0}odd text");
            assert_eq!(buffers.get(lang), "<x>\u{0}odd text");

            for other in Lang::ALL.into_iter().filter(|l| *l != lang) {
                assert_eq!(buffers.get(other), before[other]);
            }
        }
    }

    #[test]
    fn test_empty_text_accepted() {
        let mut buffers = SourceBuffers::default();
        buffers.set(Lang::TypedScript, "");
        assert_eq!(buffers.get(Lang::TypedScript), "");
        assert!(!buffers.fragments().has_typed_script());
    }

    #[test]
    fn test_reset_restores_samples() {
        let mut buffers = SourceBuffers::new(FragmentSet::empty());
        buffers.set(Lang::Style, "body { color: red }");
        buffers.reset_all();
        assert_eq!(buffers.fragments(), &FragmentSet::samples());
    }

    #[test]
    fn test_select_changes_only_active() {
        let mut buffers = SourceBuffers::default();
        assert_eq!(buffers.active(), Lang::Markup);
        buffers.select(Lang::TypedScript);
        assert_eq!(buffers.active(), Lang::TypedScript);
        assert_eq!(buffers.fragments(), &FragmentSet::samples());
    }

    #[test]
    fn test_lang_parse() {
        assert_eq!("html".parse::<Lang>().unwrap(), Lang::Markup);
        assert_eq!("typed-script".parse::<Lang>().unwrap(), Lang::TypedScript);
        assert_eq!("JS".parse::<Lang>().unwrap(), Lang::Script);
        assert!("rust".parse::<Lang>().is_err());
    }

    #[test]
    fn test_lang_serde_uses_wire_tags() {
        assert_eq!(serde_json::to_string(&Lang::TypedScript).unwrap(), "\"ts\"");
        for lang in Lang::ALL {
            assert_eq!(lang.to_string(), lang.tag());
        }
    }
}
