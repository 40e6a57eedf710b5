//! Execution channel: sandbox → controller messages, and the event bus that
//! fans lab events out to subscribers (the WebSocket relay).
//!
//! # Inbound frame
//!
//! The lab page relays every `message` event it receives as
//!
//! ```json
//! { "run": 3, "data": { "source": "practice-playground", "type": "log", "message": "hi" } }
//! ```
//!
//! where `run` is the run id of the iframe that was live when the message
//! arrived. Frames without the channel tag, with an unknown `type`, or with
//! a non-string `message` are ignored.

use std::sync::Arc;

use crossbeam::channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;

use super::document::CHANNEL_TAG;
use super::host::RunId;

/// Something the sandboxed document reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Log(String),
    Error(String),
}

impl ChannelEvent {
    /// Interpret a message object posted by the sandbox.
    pub fn from_posted(data: &Value) -> Option<Self> {
        if data.get("source").and_then(Value::as_str) != Some(CHANNEL_TAG) {
            return None;
        }
        let message = data.get("message").and_then(Value::as_str)?.to_string();
        match data.get("type").and_then(Value::as_str)? {
            "log" => Some(Self::Log(message)),
            "error" => Some(Self::Error(message)),
            _ => None,
        }
    }
}

/// A relayed frame: the run that produced it and the raw posted object.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub run: RunId,
    pub data: Value,
}

impl Envelope {
    /// Parse a relayed frame. Returns `None` for anything malformed.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }

    /// Decode the posted object, if it is ours.
    pub fn event(&self) -> Option<ChannelEvent> {
        ChannelEvent::from_posted(&self.data)
    }
}

/// Event published by the lab for its subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabEvent {
    /// Output was cleared for a new run.
    Cleared,
    /// A new document was written to the host.
    Loaded(RunId),
    /// A console line from `run`.
    Log { run: RunId, message: String },
    /// A runtime error from `run`.
    Error { run: RunId, message: String },
    /// A run request was rejected before reaching the host.
    Rejected(String),
}

struct BusInner {
    next_id: u64,
    subscribers: Vec<(u64, Sender<LabEvent>)>,
}

/// Broadcast bus for [`LabEvent`]s.
///
/// Subscribers get their own queue, so each one sees events in publish
/// order.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BusInner {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Subscribe until the returned handle is dropped.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = unbounded();
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, tx));
        Subscription {
            id,
            rx,
            bus: Arc::clone(&self.inner),
        }
    }

    pub fn publish(&self, event: LabEvent) {
        let mut inner = self.inner.lock();
        inner
            .subscribers
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Live subscription to an [`EventBus`]. Unsubscribes on drop.
pub struct Subscription {
    id: u64,
    rx: Receiver<LabEvent>,
    bus: Arc<Mutex<BusInner>>,
}

impl Subscription {
    pub fn receiver(&self) -> &Receiver<LabEvent> {
        &self.rx
    }

    /// Drain everything currently queued.
    pub fn drain(&self) -> Vec<LabEvent> {
        self.rx.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.lock().subscribers.retain(|(id, _)| *id != self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_and_error_recognised() {
        let log = json!({ "source": CHANNEL_TAG, "type": "log", "message": "hi" });
        let err = json!({
            "source": CHANNEL_TAG,
            "type": "error",
            "message": "boom (line 1, col 2)",
        });
        assert_eq!(ChannelEvent::from_posted(&log), Some(ChannelEvent::Log("hi".into())));
        assert_eq!(
            ChannelEvent::from_posted(&err),
            Some(ChannelEvent::Error("boom (line 1, col 2)".into()))
        );
    }

    #[test]
    fn test_foreign_messages_ignored() {
        for data in [
            json!({ "type": "log", "message": "no tag" }),
            json!({ "source": "devtools", "type": "log", "message": "x" }),
            json!({ "source": CHANNEL_TAG, "type": "warn", "message": "x" }),
            json!({ "source": CHANNEL_TAG, "type": "log", "message": 42 }),
            json!({ "source": CHANNEL_TAG, "type": "log" }),
            json!("plain string"),
        ] {
            assert_eq!(ChannelEvent::from_posted(&data), None, "{data}");
        }
    }

    #[test]
    fn test_envelope_parse() {
        let frame = format!(
            r#"{{"run":7,"data":{{"source":"{CHANNEL_TAG}","type":"log","message":"a b"}}}}"#
        );
        let env = Envelope::parse(&frame).unwrap();
        assert_eq!(env.run, RunId(7));
        assert_eq!(env.event(), Some(ChannelEvent::Log("a b".into())));

        assert!(Envelope::parse("not json").is_none());
        assert!(Envelope::parse(r#"{"data":{}}"#).is_none());
    }

    #[test]
    fn test_bus_order_and_unsubscribe() {
        let bus = EventBus::new();
        let sub = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(LabEvent::Cleared);
        bus.publish(LabEvent::Loaded(RunId(1)));
        assert_eq!(sub.drain(), [LabEvent::Cleared, LabEvent::Loaded(RunId(1))]);

        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(LabEvent::Cleared);
    }

    #[test]
    fn test_each_subscriber_gets_every_event() {
        let bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.publish(LabEvent::Rejected("nope".into()));
        assert_eq!(a.drain().len(), 1);
        assert_eq!(b.drain().len(), 1);
    }
}
