//! WebSocket listener for the relay.
//!
//! Accepted streams are handed to the relay actor, which does the
//! handshake.

use std::net::TcpListener;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use super::RelayMsg;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Bind the relay listener on localhost, trying following ports when
/// `base_port` is taken. Returns the listener and its actual port.
pub fn bind(base_port: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(("127.0.0.1", port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                if offset > 0 {
                    crate::log!(
                        "relay"; "port {} in use, using {} instead", base_port, actual_port
                    );
                }
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind relay after {} attempts: {}",
        MAX_PORT_RETRIES,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Accept connections on a background thread until the actor goes away.
pub fn spawn_acceptor(listener: TcpListener, tx: mpsc::Sender<RelayMsg>) -> Result<()> {
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("relay"; "client connected: {}", addr);
                    // Handshake runs in blocking mode
                    let _ = stream.set_nonblocking(false);
                    if tx.blocking_send(RelayMsg::AddClient(stream)).is_err() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if tx.is_closed() {
                        break;
                    }
                    std::thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    crate::log!("relay"; "accept error: {}", e);
                    std::thread::sleep(ACCEPT_POLL);
                }
            }
        }
        crate::debug!("relay"; "acceptor stopped");
    });

    Ok(())
}
