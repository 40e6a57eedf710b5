//! `[sandbox]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [sandbox]
//! flags = ["allow-scripts"]   # iframe sandbox tokens, mirrored in the CSP header
//! target = "es2017"           # TypeScript output target
//! max_log_entries = 1000      # Output Log cap per run (oldest dropped)
//! title = "Practice Lab"      # <title> of the sandboxed document
//! ```
//!
//! The preview runs learner code, so the flags are restricted. Navigation,
//! popups and form submission are never allowed, and `allow-same-origin`
//! together with `allow-scripts` would let the document remove its own
//! sandbox.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::lab::transpile::{DEFAULT_TARGET, TypeScript};

/// Sandbox tokens the lab understands.
const KNOWN_FLAGS: &[&str] = &[
    "allow-downloads",
    "allow-forms",
    "allow-modals",
    "allow-orientation-lock",
    "allow-pointer-lock",
    "allow-popups",
    "allow-popups-to-escape-sandbox",
    "allow-presentation",
    "allow-same-origin",
    "allow-scripts",
    "allow-top-navigation",
    "allow-top-navigation-by-user-activation",
    "allow-top-navigation-to-custom-protocols",
];

/// Prefixes that are always rejected.
const FORBIDDEN_PREFIXES: &[&str] = &["allow-top-navigation", "allow-popups", "allow-forms"];

/// Sandboxed document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub flags: Vec<String>,
    pub target: String,
    pub max_log_entries: usize,
    pub title: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            flags: vec!["allow-scripts".into()],
            target: DEFAULT_TARGET.into(),
            max_log_entries: crate::lab::output::DEFAULT_MAX_LOG_ENTRIES,
            title: "Practice Lab".into(),
        }
    }
}

impl SandboxConfig {
    pub const FLAGS: FieldPath = FieldPath::new("sandbox.flags");
    pub const TARGET: FieldPath = FieldPath::new("sandbox.target");
    pub const MAX_LOG_ENTRIES: FieldPath = FieldPath::new("sandbox.max_log_entries");

    /// Value of the iframe `sandbox` attribute.
    pub fn attribute(&self) -> String {
        self.flags.join(" ")
    }

    /// `Content-Security-Policy` value for sandboxed documents.
    pub fn csp(&self) -> String {
        let attribute = self.attribute();
        if attribute.is_empty() {
            "sandbox".to_string()
        } else {
            format!("sandbox {attribute}")
        }
    }

    fn has(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for flag in &self.flags {
            if !KNOWN_FLAGS.contains(&flag.as_str()) {
                diag.error(Self::FLAGS, format!("unknown sandbox flag `{flag}`"));
            } else if FORBIDDEN_PREFIXES.iter().any(|p| flag.starts_with(p)) {
                diag.error(Self::FLAGS, format!("`{flag}` is not permitted"));
            }
        }
        if self.has("allow-same-origin") && self.has("allow-scripts") {
            diag.error_with_hint(
                Self::FLAGS,
                "`allow-same-origin` cannot be combined with `allow-scripts`",
                "messages reach the lab without allow-same-origin",
            );
        }
        if !self.has("allow-scripts") {
            diag.warn(Self::FLAGS, "without allow-scripts nothing will run");
        }

        if let Err(e) = TypeScript::new(&self.target) {
            diag.error_with_hint(
                Self::TARGET,
                format!("invalid target `{}`: {e}", self.target),
                "e.g. es2017, es2020, esnext",
            );
        }

        if self.max_log_entries == 0 {
            diag.error(Self::MAX_LOG_ENTRIES, "must be at least 1");
        }
    }
}
