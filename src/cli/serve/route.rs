//! URL routing for the lab server.
//!
//! | Route                                   | Method |
//! |-----------------------------------------|--------|
//! | `/`                                     | GET    |
//! | `/lab.js`, `/lab.css`                   | GET    |
//! | `/sandbox/{run}`                        | GET    |
//! | `/api/code?path=P[&format=html]`        | GET    |
//! | `/api/curriculum[/{cat}[/{topic}[/{example}]]]` | GET |
//! | `/api/lab`                              | GET    |
//! | `/api/lab/fragments/{lang}`             | PUT    |
//! | `/api/lab/select/{lang}`                | POST   |
//! | `/api/lab/run`, `/api/lab/reset`        | POST   |

use percent_encoding::percent_decode_str;
use tiny_http::Method;
use url::Url;

use crate::lab::RunId;

/// A parsed request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Page,
    Script,
    Stylesheet,
    /// `None` when the run segment is not a number.
    Sandbox(Option<RunId>),
    Code {
        path: Option<String>,
        html: bool,
    },
    Curriculum(Vec<String>),
    Snapshot,
    Fragment(String),
    Select(String),
    Run,
    Reset,
    NotFound,
}

impl Route {
    /// Parse a raw request URL (path plus optional query).
    pub fn parse(raw: &str) -> Self {
        let Ok(url) = Url::parse("http://lab.local").and_then(|base| base.join(raw)) else {
            return Self::NotFound;
        };
        let segments: Vec<String> = url
            .path_segments()
            .map(|s| s.filter(|s| !s.is_empty()).map(decode).collect())
            .unwrap_or_default();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        match segments.as_slice() {
            [] => Self::Page,
            ["lab.js"] => Self::Script,
            ["lab.css"] => Self::Stylesheet,
            ["sandbox", run] => Self::Sandbox(run.parse().ok().map(RunId)),
            ["api", "code"] => {
                let mut path = None;
                let mut html = false;
                for (key, value) in url.query_pairs() {
                    match &*key {
                        "path" => path = Some(value.into_owned()),
                        "format" => html = value == "html",
                        _ => {}
                    }
                }
                Self::Code { path, html }
            }
            ["api", "curriculum", rest @ ..] if rest.len() <= 3 => {
                Self::Curriculum(rest.iter().map(|s| s.to_string()).collect())
            }
            ["api", "lab"] => Self::Snapshot,
            ["api", "lab", "fragments", lang] => Self::Fragment(lang.to_string()),
            ["api", "lab", "select", lang] => Self::Select(lang.to_string()),
            ["api", "lab", "run"] => Self::Run,
            ["api", "lab", "reset"] => Self::Reset,
            _ => Self::NotFound,
        }
    }

    /// Method this route answers to.
    pub fn method(&self) -> Method {
        match self {
            Self::Fragment(_) => Method::Put,
            Self::Select(_) | Self::Run | Self::Reset => Method::Post,
            _ => Method::Get,
        }
    }

    /// Whether `method` is accepted. GET routes also answer HEAD.
    pub fn allows(&self, method: &Method) -> bool {
        let expected = self.method();
        *method == expected || (expected == Method::Get && *method == Method::Head)
    }
}

fn decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}
