//! Assembly of the self-contained document executed in the sandbox.
//!
//! Layout:
//!
//! ```text
//! <head>  <style>{style}</style>
//! <body>  {markup}
//!         <script>{preamble}</script>      console.log + window.onerror → parent
//!         <script>try { {script} } catch (err) { → parent }</script>
//! ```
//!
//! Every message posted to the parent carries [`CHANNEL_TAG`] as `source`,
//! which is how the lab page tells our traffic apart from anything else
//! arriving on its `message` listener.

use std::fmt;

/// Namespace tag on every message the sandbox posts.
pub const CHANNEL_TAG: &str = "practice-playground";

pub const DEFAULT_TITLE: &str = "Practice Playground";

/// Console and error forwarding installed before the learner's script.
const PREAMBLE: &str = r#"
      const sendMessage = (message) => {
        parent.postMessage(Object.assign({ source: "__CHANNEL_TAG__" }, message), "*");
      };

      const originalLog = console.log;
      console.log = (...args) => {
        sendMessage({ type: "log", message: args.map(String).join(" ") });
        originalLog.apply(console, args);
      };

      window.onerror = (message, source, lineno, colno) => {
        sendMessage({
          type: "error",
          message: message + " (line " + lineno + ", col " + colno + ")"
        });
      };
"#;

/// A fully assembled document. Built fresh for every run.
#[derive(Clone, PartialEq, Eq)]
pub struct ExecutionDocument {
    html: String,
    fingerprint: String,
}

impl ExecutionDocument {
    fn new(html: String) -> Self {
        let fingerprint = hex::encode(&blake3::hash(html.as_bytes()).as_bytes()[..8]);
        Self { html, fingerprint }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    /// Short content hash, used as the HTTP entity tag.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl fmt::Debug for ExecutionDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionDocument")
            .field("len", &self.html.len())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Join the JS fragment and the compiled TS output into one script body.
pub fn combine_scripts(script: &str, compiled_typed_script: &str) -> String {
    format!("{script}\n{compiled_typed_script}").trim().to_string()
}

/// Assemble a document with the default title.
#[cfg(test)]
pub fn assemble(markup: &str, style: &str, compiled_script: &str) -> ExecutionDocument {
    assemble_titled(DEFAULT_TITLE, markup, style, compiled_script)
}

/// Assemble a document. Pure: equal inputs give byte-identical output.
pub fn assemble_titled(
    title: &str,
    markup: &str,
    style: &str,
    compiled_script: &str,
) -> ExecutionDocument {
    let title = crate::utils::html::escape(title);
    let preamble = PREAMBLE.replace("__CHANNEL_TAG__", CHANNEL_TAG);
    let script = guard_script_body(compiled_script);

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <title>{title}</title>
    <style>{style}</style>
  </head>
  <body>
    {markup}
    <script>{preamble}    </script>
    <script>
      try {{
        {script}
      }} catch (err) {{
        parent.postMessage({{
          source: "{CHANNEL_TAG}",
          type: "error",
          message: (err && err.message) || String(err)
        }}, "*");
      }}
    </script>
  </body>
</html>"#
    );

    ExecutionDocument::new(html)
}

/// Keep the learner's script from closing its own `<script>` element.
///
/// `<\/script` means the same thing inside string, template and regex
/// literals, so the rewrite does not change what the script does.
fn guard_script_body(script: &str) -> std::borrow::Cow<'_, str> {
    if !script.to_ascii_lowercase().contains("</script") {
        return std::borrow::Cow::Borrowed(script);
    }

    let mut out = String::with_capacity(script.len() + 8);
    let mut rest = script;
    while let Some(pos) = rest.to_ascii_lowercase().find("</script") {
        out.push_str(&rest[..pos]);
        out.push_str("<\\/");
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    std::borrow::Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_is_deterministic() {
        let a = assemble("<p>hi</p>", "p { color: red }", "console.log(1)");
        let b = assemble("<p>hi</p>", "p { color: red }", "console.log(1)");
        assert_eq!(a.as_str(), b.as_str());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_different_input_changes_fingerprint() {
        let a = assemble("<p>hi</p>", "", "");
        let b = assemble("<p>ho</p>", "", "");
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_layout_order() {
        let doc = assemble("<button id=\"b\">Go</button>", ".x{}", "run()");
        let html = doc.as_str();

        let style = html.find("<style>.x{}</style>").unwrap();
        let markup = html.find("<button id=\"b\">Go</button>").unwrap();
        let preamble = html.find("console.log = ").unwrap();
        let onerror = html.find("window.onerror").unwrap();
        let user = html.find("run()").unwrap();

        assert!(style < markup);
        assert!(markup < preamble);
        assert!(preamble < onerror);
        assert!(onerror < user);
    }

    #[test]
    fn test_every_post_is_tagged() {
        let doc = assemble("", "", "");
        let html = doc.as_str();
        assert!(!html.contains("__CHANNEL_TAG__"));
        assert_eq!(
            html.matches(&format!("source: \"{CHANNEL_TAG}\"")).count(),
            2,
            "preamble helper and catch block"
        );
        assert!(html.contains("type: \"log\""));
        assert!(html.contains("\" (line \" + lineno + \", col \" + colno + \")\""));
    }

    #[test]
    fn test_user_script_inside_try() {
        let doc = assemble("", "", "throw new Error('x')");
        let html = doc.as_str();
        let try_pos = html.find("try {").unwrap();
        let user = html.find("throw new Error('x')").unwrap();
        let catch_pos = html.find("} catch (err) {").unwrap();
        assert!(try_pos < user && user < catch_pos);
    }

    #[test]
    fn test_closing_script_tag_is_neutralised() {
        let doc = assemble("", "", "const s = \"</script><b>\"; const t = '</SCRIPT>';");
        let html = doc.as_str();
        assert!(html.contains(r#"const s = "<\/script><b>";"#));
        assert!(html.contains(r"const t = '<\/SCRIPT>';"));
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn test_combine_scripts() {
        assert_eq!(combine_scripts("", ""), "");
        assert_eq!(combine_scripts("a()", ""), "a()");
        assert_eq!(combine_scripts("", "b()\n"), "b()");
        assert_eq!(combine_scripts("a()", "b()"), "a()\nb()");
    }

    #[test]
    fn test_title_escaped() {
        let doc = assemble_titled("<Lab>", "", "", "");
        assert!(doc.as_str().contains("<title>&lt;Lab&gt;</title>"));
    }
}
