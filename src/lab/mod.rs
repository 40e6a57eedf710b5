//! Practice lab: run HTML/CSS/JS/TS snippets in a sandboxed preview.
//!
//! # Architecture
//!
//! ```text
//! SourceBuffers ─run─> RunController ─compile─> Transpiler (oxc)
//!                          │ assemble
//!                          v
//!                      FrameHost ──Loaded──> EventBus ──> relay ──> lab page <iframe sandbox>
//!                          ^                                              │ postMessage
//!                          └──────── deliver(Envelope) <── relay <────────┘
//! ```
//!
//! # Modules
//!
//! - `fragment` - The four editable fragments and the active tab
//! - `transpile` - Background-loaded TypeScript transpiler
//! - `document` - Assembly of the sandboxed document and its preamble
//! - `host` - Execution host trait and the iframe-backed implementation
//! - `channel` - Inbound message filtering and the lab event bus
//! - `controller` - Run orchestration, output log and error slot
//! - `output` - Output of the current run

pub mod channel;
pub mod controller;
pub mod document;
pub mod error;
pub mod fragment;
pub mod host;
pub mod output;
pub mod transpile;

pub use channel::{Envelope, EventBus, LabEvent, Subscription};
pub use controller::{Delivery, RunController, RunOutcome};
pub use document::ExecutionDocument;
pub use error::LabError;
pub use fragment::{FragmentSet, Lang, SourceBuffers};
pub use host::{ExecutionHost, FrameHost, Lookup, RunId};
pub use transpile::Transpiler;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::config::SandboxConfig;

/// Serializable view of the lab for the page and the API.
#[derive(Debug, Clone, Serialize)]
pub struct LabSnapshot {
    pub fragments: FragmentSet,
    pub active: Lang,
    pub logs: Vec<String>,
    /// Log entries dropped past the retention cap.
    pub dropped: usize,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub run: RunId,
    pub transpiler: &'static str,
}

struct Session {
    buffers: SourceBuffers,
    controller: RunController,
}

/// One practice lab: buffers, controller and host, shared by all requests.
///
/// All mutation goes through one lock, so requests and relayed channel
/// frames are applied one at a time in arrival order.
pub struct Lab {
    session: Mutex<Session>,
    host: Arc<FrameHost>,
    events: EventBus,
}

impl Lab {
    /// Build a lab from config and start loading the transpiler.
    pub fn from_config(sandbox: &SandboxConfig) -> Self {
        let transpiler = Transpiler::spawn(&sandbox.target);
        Self::with_transpiler(transpiler, &sandbox.title, sandbox.max_log_entries)
    }

    pub fn with_transpiler(transpiler: Transpiler, title: &str, max_log_entries: usize) -> Self {
        let events = EventBus::new();
        let host = Arc::new(FrameHost::new(events.clone()));
        let controller = RunController::new(
            transpiler,
            Arc::clone(&host) as Arc<dyn ExecutionHost>,
            events.clone(),
            max_log_entries,
        )
        .with_title(title);

        Self {
            session: Mutex::new(Session {
                buffers: SourceBuffers::default(),
                controller,
            }),
            host,
            events,
        }
    }

    pub fn host(&self) -> &FrameHost {
        &self.host
    }

    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    pub fn set_fragment(&self, lang: Lang, text: impl Into<String>) {
        self.session.lock().buffers.set(lang, text);
    }

    pub fn fragment(&self, lang: Lang) -> String {
        self.session.lock().buffers.get(lang).to_string()
    }

    pub fn select(&self, lang: Lang) {
        self.session.lock().buffers.select(lang);
    }

    pub fn run(&self) -> RunOutcome {
        let mut session = self.session.lock();
        let Session {
            buffers,
            controller,
        } = &mut *session;
        controller.run(buffers.fragments())
    }

    /// Restore sample fragments and clear all output.
    pub fn reset(&self) {
        let mut session = self.session.lock();
        session.buffers.reset_all();
        session.controller.clear();
    }

    /// Apply a frame relayed from the lab page.
    pub fn deliver(&self, envelope: &Envelope) -> Delivery {
        self.session.lock().controller.deliver(envelope)
    }

    pub fn snapshot(&self) -> LabSnapshot {
        let session = self.session.lock();
        let controller = &session.controller;
        LabSnapshot {
            fragments: session.buffers.fragments().clone(),
            active: session.buffers.active(),
            logs: controller.output().logs().map(str::to_string).collect(),
            dropped: controller.output().dropped(),
            error: controller.output().error().map(str::to_string),
            notice: controller.notice().map(str::to_string),
            run: controller.current_run(),
            transpiler: controller.transpiler().state().name(),
        }
    }
}
