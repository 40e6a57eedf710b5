//! Embedded static resources for the lab page.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Lab page shell, script and stylesheet
//!
//! `lab.js` and `lab.css` are minified by `build.rs` and included from
//! `OUT_DIR`.

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};
    use crate::utils::html::escape;

    /// Variables for lab.html.
    pub struct LabPageVars<'a> {
        pub title: &'a str,
        pub version: &'a str,
        pub ws_port: u16,
        /// Value of the preview iframe's `sandbox` attribute.
        pub sandbox: &'a str,
    }

    impl TemplateVars for LabPageVars<'_> {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__TITLE__", &escape(self.title))
                .replace("__VERSION__", &escape(self.version))
                .replace("__WS_PORT__", &self.ws_port.to_string())
                .replace("__SANDBOX__", &escape(self.sandbox))
        }
    }

    /// Lab page shell.
    pub const LAB_HTML: Template<LabPageVars<'static>> =
        Template::new(include_str!("serve/lab.html"));

    /// Lab page script: editor tabs, fragment sync, run controls and the
    /// relay client.
    pub const LAB_JS: &str = include_str!(concat!(env!("OUT_DIR"), "/lab.min.js"));

    /// Lab page stylesheet.
    pub const LAB_CSS: &str = include_str!(concat!(env!("OUT_DIR"), "/lab.min.css"));
}

#[cfg(test)]
mod tests {
    use super::serve::*;

    #[test]
    fn test_lab_page_vars() {
        let html = LAB_HTML.render(&LabPageVars {
            title: "Lab <1>",
            version: "0.1.0",
            ws_port: 35729,
            sandbox: "allow-scripts",
        });
        assert!(html.contains("Lab &lt;1&gt;"));
        assert!(html.contains(r#"data-ws-port="35729""#));
        assert!(html.contains(r#"data-sandbox="allow-scripts""#));
        assert!(!html.contains("__TITLE__"));
        assert!(!html.contains("__WS_PORT__"));
        assert!(!html.contains("__SANDBOX__"));
        assert!(!html.contains("__VERSION__"));
    }

    #[test]
    fn test_assets_embedded() {
        assert!(!LAB_JS.is_empty());
        assert!(!LAB_CSS.is_empty());
    }
}
