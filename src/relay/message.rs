//! Relay Message Protocol
//!
//! JSON messages pushed from the server to lab pages.
//!
//! # Message Types
//!
//! - `connected`: Connection established
//! - `clear`: Output was cleared
//! - `load`: A new run was written, replace the preview
//! - `log` / `error`: Output reported by the live run
//! - `notice`: A run request was rejected

use serde::Serialize;

use crate::lab::{LabEvent, RunId};

/// Message sent over the relay WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RelayMessage {
    Connected {
        /// Server version for compatibility check
        version: String,
    },
    Clear,
    Load {
        run: RunId,
    },
    Log {
        run: RunId,
        message: String,
    },
    Error {
        run: RunId,
        message: String,
    },
    Notice {
        message: String,
    },
}

impl RelayMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<LabEvent> for RelayMessage {
    fn from(event: LabEvent) -> Self {
        match event {
            LabEvent::Cleared => Self::Clear,
            LabEvent::Loaded(run) => Self::Load { run },
            LabEvent::Log { run, message } => Self::Log { run, message },
            LabEvent::Error { run, message } => Self::Error { run, message },
            LabEvent::Rejected(message) => Self::Notice { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn wire(msg: RelayMessage) -> Value {
        serde_json::from_str(&msg.to_json()).unwrap()
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(wire(RelayMessage::Clear), json!({ "type": "clear" }));
        assert_eq!(
            wire(LabEvent::Loaded(RunId(4)).into()),
            json!({ "type": "load", "run": 4 })
        );
        assert_eq!(
            wire(
                LabEvent::Log {
                    run: RunId(4),
                    message: "clicked".into()
                }
                .into()
            ),
            json!({ "type": "log", "run": 4, "message": "clicked" })
        );
        assert_eq!(
            wire(LabEvent::Rejected("still loading".into()).into()),
            json!({ "type": "notice", "message": "still loading" })
        );
    }

    #[test]
    fn test_connected_carries_version() {
        let value = wire(RelayMessage::connected());
        assert_eq!(value["type"], "connected");
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    }
}
