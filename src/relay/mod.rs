//! Execution channel relay.
//!
//! The sandboxed iframe can only talk to its parent page, so the lab page
//! relays what it receives over a WebSocket, stamped with the run id of the
//! iframe that sent it. The same socket carries lab events back to every
//! open page.
//!
//! - `server` - Listener binding and the acceptor thread
//! - `actor` - Client registry, broadcast and the frame reader
//! - `message` - JSON messages pushed to pages

mod actor;
mod message;
mod server;

pub use message::RelayMessage;
pub use server::bind;

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use tokio::sync::mpsc;

use crate::lab::{Lab, LabEvent, Subscription};
use crate::utils::origin::OriginPolicy;
use actor::RelayActor;

/// Channel buffer size for the actor mailbox
const CHANNEL_BUFFER: usize = 256;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Messages to the relay actor
pub enum RelayMsg {
    /// Accepted stream awaiting handshake
    AddClient(TcpStream),
    /// Lab event to broadcast
    Event(LabEvent),
    Shutdown,
}

/// Run the relay until `shutdown_rx` fires. Handshakes from pages outside
/// `origin` are refused.
pub async fn run(
    listener: TcpListener,
    lab: Arc<Lab>,
    origin: OriginPolicy,
    shutdown_rx: Receiver<()>,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<RelayMsg>(CHANNEL_BUFFER);

    spawn_forwarder(lab.subscribe(), tx.clone());
    server::spawn_acceptor(listener, tx.clone())?;
    let handle = tokio::spawn(RelayActor::new(rx, lab, origin).run());

    loop {
        if shutdown_rx.try_recv().is_ok() {
            crate::debug!("relay"; "shutdown signal received");
            break;
        }
        tokio::time::sleep(SHUTDOWN_POLL).await;
    }

    let _ = tx.send(RelayMsg::Shutdown).await;
    let _ = tokio::time::timeout(Duration::from_millis(500), handle).await;
    Ok(())
}

/// Move lab events into the actor mailbox. The subscription is dropped,
/// and so unsubscribed, once the actor stops.
fn spawn_forwarder(subscription: Subscription, tx: mpsc::Sender<RelayMsg>) {
    std::thread::spawn(move || {
        loop {
            match subscription.receiver().recv_timeout(SHUTDOWN_POLL) {
                Ok(event) => {
                    if tx.blocking_send(RelayMsg::Event(event)).is_err() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) if tx.is_closed() => break,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    });
}
