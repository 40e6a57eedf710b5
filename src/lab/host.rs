//! Isolated execution host.
//!
//! The host never patches a running document. `write` swaps in a new
//! document under a new run id; the lab page reacts to the `Loaded` event
//! by replacing its sandboxed `<iframe>` element, which tears down the old
//! browsing context together with its timers and listeners.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::channel::{EventBus, LabEvent};
use super::document::ExecutionDocument;

/// Identifier of one written document. `RunId(0)` means nothing was written.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl RunId {
    pub const NONE: RunId = RunId(0);
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Surface that executes assembled documents in isolation.
pub trait ExecutionHost: Send + Sync {
    /// Replace whatever is running with `document`.
    fn write(&self, document: ExecutionDocument) -> RunId;

    /// The live document, if any.
    fn current(&self) -> Option<(RunId, ExecutionDocument)>;
}

/// Host backed by a sandboxed iframe in the lab page.
pub struct FrameHost {
    next: AtomicU64,
    current: RwLock<Option<(RunId, ExecutionDocument)>>,
    events: EventBus,
}

impl FrameHost {
    pub fn new(events: EventBus) -> Self {
        Self {
            next: AtomicU64::new(1),
            current: RwLock::new(None),
            events,
        }
    }

    /// Document for `run`, only while that run is still live.
    pub fn document_for(&self, run: RunId) -> Lookup {
        match &*self.current.read() {
            Some((live, doc)) if *live == run => Lookup::Live(doc.clone()),
            Some(_) => Lookup::Superseded,
            None => Lookup::Empty,
        }
    }
}

/// Result of [`FrameHost::document_for`].
#[derive(Debug)]
pub enum Lookup {
    Live(ExecutionDocument),
    Superseded,
    Empty,
}

impl ExecutionHost for FrameHost {
    fn write(&self, document: ExecutionDocument) -> RunId {
        let run = RunId(self.next.fetch_add(1, Ordering::SeqCst));
        crate::debug!("host"; "run {} written ({})", run, document.fingerprint());
        *self.current.write() = Some((run, document));
        self.events.publish(LabEvent::Loaded(run));
        run
    }

    fn current(&self) -> Option<(RunId, ExecutionDocument)> {
        self.current.read().clone()
    }
}
