//! Run controller.
//!
//! ```text
//! Idle ──run()──> typed-script present and transpiler not ready? ──yes──> notice, Idle
//!                        │ no
//!                        v
//!                 compile typed-script ──TranspileError──> notice, Idle
//!                        │
//!                        v
//!                 assemble → clear output → host.write → Idle
//! ```
//!
//! Rejected runs leave the previous output untouched and write nothing.
//! The output is cleared before the new document is written, so nothing
//! from the previous run is visible once the new one starts reporting.

use std::sync::Arc;

use super::channel::{ChannelEvent, Envelope, EventBus, LabEvent};
use super::document::{DEFAULT_TITLE, assemble_titled, combine_scripts};
use super::error::LabError;
use super::fragment::FragmentSet;
use super::host::{ExecutionHost, RunId};
use super::output::RunOutput;
use super::transpile::{LoadState, Transpiler};

/// What happened to a run request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Started(RunId),
    Rejected(LabError),
}

/// What happened to an inbound channel frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Applied(ChannelEvent),
    /// Not ours (no tag, unknown type).
    Ignored,
    /// Produced by a run that has since been replaced.
    Stale(RunId),
}

/// Orchestrates runs and owns their output.
pub struct RunController {
    transpiler: Transpiler,
    host: Arc<dyn ExecutionHost>,
    events: EventBus,
    title: String,
    current: RunId,
    output: RunOutput,
    notice: Option<String>,
}

impl RunController {
    pub fn new(
        transpiler: Transpiler,
        host: Arc<dyn ExecutionHost>,
        events: EventBus,
        max_log_entries: usize,
    ) -> Self {
        Self {
            transpiler,
            host,
            events,
            title: DEFAULT_TITLE.to_string(),
            current: RunId::NONE,
            output: RunOutput::new(max_log_entries),
            notice: None,
        }
    }

    /// Title of assembled documents.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Compile, assemble and write `fragments` to the host. The whole state
    /// machine runs inside this call; the controller is idle again on return.
    pub fn run(&mut self, fragments: &FragmentSet) -> RunOutcome {
        match self.prepare(fragments) {
            Ok(document) => {
                self.notice = None;
                self.output.clear();
                self.events.publish(LabEvent::Cleared);
                let run = self.host.write(document);
                self.current = run;
                crate::debug!("lab"; "run {} started", run);
                RunOutcome::Started(run)
            }
            Err(err) => {
                crate::debug!("lab"; "run rejected: {}", err);
                let message = err.to_string();
                self.notice = Some(message.clone());
                self.events.publish(LabEvent::Rejected(message));
                RunOutcome::Rejected(err)
            }
        }
    }

    fn prepare(&self, fragments: &FragmentSet) -> Result<super::ExecutionDocument, LabError> {
        if fragments.has_typed_script() && !self.transpiler.is_ready() {
            return Err(match self.transpiler.state() {
                LoadState::Failed(reason) => LabError::TranspilerUnavailable(reason),
                _ => LabError::TranspilerNotReady,
            });
        }
        let compiled = if fragments.has_typed_script() {
            self.transpiler.compile(&fragments.typed_script)?
        } else {
            String::new()
        };
        let script = combine_scripts(&fragments.script, &compiled);
        Ok(assemble_titled(
            &self.title,
            &fragments.markup,
            &fragments.style,
            &script,
        ))
    }

    /// Apply a relayed channel frame.
    pub fn deliver(&mut self, envelope: &Envelope) -> Delivery {
        let Some(event) = envelope.event() else {
            return Delivery::Ignored;
        };
        if envelope.run == RunId::NONE || envelope.run != self.current {
            crate::debug!("lab"; "dropping message from stale run {}", envelope.run);
            return Delivery::Stale(envelope.run);
        }

        let run = self.current;
        match &event {
            ChannelEvent::Log(message) => {
                self.output.push_log(message.clone());
                self.events.publish(LabEvent::Log {
                    run,
                    message: message.clone(),
                });
            }
            ChannelEvent::Error(message) => {
                self.output.set_error(message.clone());
                self.events.publish(LabEvent::Error {
                    run,
                    message: message.clone(),
                });
            }
        }
        Delivery::Applied(event)
    }

    /// Clear output and notice, as part of a lab reset.
    pub fn clear(&mut self) {
        self.output.clear();
        self.notice = None;
        self.events.publish(LabEvent::Cleared);
    }

    pub fn current_run(&self) -> RunId {
        self.current
    }

    pub fn output(&self) -> &RunOutput {
        &self.output
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn transpiler(&self) -> &Transpiler {
        &self.transpiler
    }
}
