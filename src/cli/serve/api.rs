//! Request handlers.
//!
//! [`dispatch`] maps a request onto the lab and the content store and
//! returns the [`Reply`] to send. It never touches the socket, so every
//! route is testable without a server.

use std::sync::Arc;

use serde_json::json;
use tiny_http::Method;

use super::response::Reply;
use super::route::Route;
use crate::config::LabConfig;
use crate::content::ContentStore;
use crate::embed::serve::{LAB_CSS, LAB_HTML, LAB_JS, LabPageVars};
use crate::lab::{Lab, Lang, Lookup, RunId, RunOutcome};
use crate::utils::mime::types::{CSS, HTML, JAVASCRIPT};
use crate::utils::origin::OriginPolicy;

/// Everything a request handler can reach.
pub struct ServeState {
    pub lab: Arc<Lab>,
    pub content: ContentStore,
    page: String,
    csp: String,
    pub origin: OriginPolicy,
}

impl ServeState {
    pub fn new(
        lab: Arc<Lab>,
        content: ContentStore,
        config: &LabConfig,
        origin: OriginPolicy,
        ws_port: u16,
    ) -> Self {
        let sandbox = config.sandbox.attribute();
        let page = LAB_HTML.render(&LabPageVars {
            title: &config.sandbox.title,
            version: env!("CARGO_PKG_VERSION"),
            ws_port,
            sandbox: &sandbox,
        });
        Self {
            lab,
            content,
            page,
            csp: config.sandbox.csp(),
            origin,
        }
    }
}

/// Refuse state-changing requests sent by another site's page.
///
/// `origin` and `fetch_site` are the `Origin` and `Sec-Fetch-Site` headers.
pub fn guard(
    state: &ServeState,
    method: &Method,
    origin: Option<&str>,
    fetch_site: Option<&str>,
) -> Option<Reply> {
    if matches!(method, Method::Get | Method::Head)
        || state.origin.allows_request(origin, fetch_site)
    {
        return None;
    }
    crate::debug!("serve"; "refused {} from origin {}", method, origin.unwrap_or("-"));
    Some(Reply::error(403, "Cross-origin request refused"))
}

/// Answer one request. `body` is the request body of PUT requests.
pub fn dispatch(state: &ServeState, method: &Method, url: &str, body: &str) -> Reply {
    let route = Route::parse(url);
    if route == Route::NotFound {
        return Reply::not_found();
    }
    if !route.allows(method) {
        return Reply::method_not_allowed(&route.method());
    }

    match route {
        Route::Page => Reply::new(200, HTML, state.page.as_str()),
        Route::Script => Reply::new(200, JAVASCRIPT, LAB_JS),
        Route::Stylesheet => Reply::new(200, CSS, LAB_CSS),
        Route::Sandbox(run) => sandbox_document(state, run),
        Route::Code { path, html } => source_file(state, path.as_deref(), html),
        Route::Curriculum(ids) => curriculum(state, &ids),
        Route::Snapshot => Reply::json(200, &state.lab.snapshot()),
        Route::Fragment(tag) => with_lang(&tag, |lang| {
            state.lab.set_fragment(lang, body);
            Reply::no_content()
        }),
        Route::Select(tag) => with_lang(&tag, |lang| {
            state.lab.select(lang);
            Reply::no_content()
        }),
        Route::Run => match state.lab.run() {
            RunOutcome::Started(run) => Reply::json(200, &json!({ "run": run })),
            RunOutcome::Rejected(err) => Reply::error(422, &err.to_string()),
        },
        Route::Reset => {
            state.lab.reset();
            Reply::json(200, &state.lab.snapshot())
        }
        Route::NotFound => Reply::not_found(),
    }
}

fn with_lang(tag: &str, f: impl FnOnce(Lang) -> Reply) -> Reply {
    match tag.parse::<Lang>() {
        Ok(lang) => f(lang),
        Err(message) => Reply::error(404, &message),
    }
}

/// The live document, with its sandbox mirrored into a CSP header so the
/// restriction holds even when the document is opened directly.
fn sandbox_document(state: &ServeState, run: Option<RunId>) -> Reply {
    let Some(run) = run else {
        return Reply::not_found();
    };
    match state.lab.host().document_for(run) {
        Lookup::Live(doc) => Reply::new(200, HTML, doc.as_str())
            .with_header("Content-Security-Policy", state.csp.as_str())
            .with_header("ETag", format!("\"{}\"", doc.fingerprint()))
            .with_header("Cache-Control", "no-store"),
        Lookup::Superseded => Reply::text(410, "410 Gone: run superseded"),
        Lookup::Empty => Reply::not_found(),
    }
}

fn source_file(state: &ServeState, path: Option<&str>, html: bool) -> Reply {
    match state.content.fetch_source_file(path, html) {
        Ok(file) => Reply::json(200, &file),
        Err(err) => {
            if err.status() >= 500 {
                crate::log!("error"; "reading {}: {}", path.unwrap_or_default(), err);
            }
            Reply::json(err.status(), &err.to_json())
        }
    }
}

fn curriculum(state: &ServeState, ids: &[String]) -> Reply {
    let curriculum = state.content.curriculum();
    let Some((category, rest)) = ids.split_first() else {
        return Reply::json(200, &curriculum.summaries());
    };
    let topic = rest.first().map(String::as_str);
    let example = rest.get(1).map(String::as_str);
    match curriculum.lookup(category, topic, example) {
        Ok(value) => Reply::json(200, &value),
        Err(err) => Reply::error(404, &err.to_string()),
    }
}
