//! Relay Actor - Bidirectional Communication
//!
//! ```text
//! EventBus --[LabEvent]--> forwarder --> RelayActor --[broadcast]--> lab pages
//!                                                                      |
//! Lab::deliver <---[Envelope]--- reader thread <------[{run, data}]----+
//! ```

use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Message;

use super::{RelayMessage, RelayMsg};
use crate::lab::{Delivery, Envelope, Lab};
use crate::utils::origin::OriginPolicy;

const READ_POLL: Duration = Duration::from_millis(50);

/// Frames taken from one client per poll.
const MAX_FRAMES_PER_POLL: usize = 64;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Relay Actor - owns the page connections
pub struct RelayActor {
    rx: mpsc::Receiver<RelayMsg>,
    clients: Clients,
    lab: Arc<Lab>,
    origin: OriginPolicy,
}

impl RelayActor {
    pub fn new(rx: mpsc::Receiver<RelayMsg>, lab: Arc<Lab>, origin: OriginPolicy) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            lab,
            origin,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients = Arc::clone(&self.clients);
        let lab = Arc::clone(&self.lab);
        std::thread::spawn(move || client_reader_loop(clients, lab));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                RelayMsg::AddClient(stream) => self.add_client(stream),
                RelayMsg::Event(event) => {
                    let text = RelayMessage::from(event).to_json();
                    self.broadcast(Message::Text(text.into()));
                }
                RelayMsg::Shutdown => {
                    crate::debug!("relay"; "shutting down");
                    for mut ws in self.clients.lock().drain(..) {
                        let _ = ws.close(None);
                    }
                    break;
                }
            }
        }
    }

    fn add_client(&self, stream: TcpStream) {
        let origin = self.origin;
        let check_origin = |request: &Request, response: Response| {
            let header = request
                .headers()
                .get("origin")
                .and_then(|v| v.to_str().ok());
            if origin.allows(header) {
                return Ok(response);
            }
            crate::debug!("relay"; "refused handshake from origin {}", header.unwrap_or("-"));
            let mut refused = ErrorResponse::new(Some("origin not allowed".to_string()));
            *refused.status_mut() = StatusCode::FORBIDDEN;
            Err(refused)
        };

        match tungstenite::accept_hdr(stream, check_origin) {
            Ok(mut ws) => {
                let _ = ws.get_ref().set_nonblocking(true);

                let connected = RelayMessage::connected();
                if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
                    crate::log!("relay"; "failed to send connected message: {}", e);
                    return;
                }

                let mut clients = self.clients.lock();
                crate::debug!("relay"; "client connected (total: {})", clients.len() + 1);
                clients.push(ws);
            }
            Err(e) => crate::debug!("relay"; "handshake failed: {}", e),
        }
    }

    fn broadcast(&self, msg: Message) {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            return;
        }
        clients.retain_mut(|ws| match ws.send(msg.clone()) {
            Ok(_) => true,
            // Queued in the write buffer, flushed on the next send.
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                true
            }
            Err(e) => {
                crate::debug!("relay"; "client disconnected: {}", e);
                false
            }
        });
    }
}

/// Poll every client for relayed frames and hand them to the lab.
///
/// Exits once the actor has dropped its handle to `clients`.
fn client_reader_loop(clients: Clients, lab: Arc<Lab>) {
    while Arc::strong_count(&clients) > 1 {
        std::thread::sleep(READ_POLL);
        for text in read_pending(&clients) {
            apply_frame(&lab, &text);
        }
    }
}

/// Take up to [`MAX_FRAMES_PER_POLL`] text frames from each client and
/// drop clients that closed. The lock is released before anything is
/// applied.
fn read_pending(clients: &Mutex<Vec<WebSocket<TcpStream>>>) -> Vec<String> {
    let mut guard = clients.lock();
    let before = guard.len();
    let mut frames = Vec::new();

    guard.retain_mut(|ws| {
        for _ in 0..MAX_FRAMES_PER_POLL {
            match ws.read() {
                Ok(Message::Text(text)) => frames.push(text.to_string()),
                Ok(Message::Close(_)) => return false,
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref e))
                    if e.kind() == std::io::ErrorKind::WouldBlock =>
                {
                    return true;
                }
                Err(_) => return false,
            }
        }
        true
    });

    if guard.len() < before {
        crate::debug!("relay"; "client left (total: {})", guard.len());
    }
    frames
}

fn apply_frame(lab: &Lab, text: &str) {
    let Some(envelope) = Envelope::parse(text) else {
        crate::debug!("relay"; "malformed frame ignored");
        return;
    };
    match lab.deliver(&envelope) {
        Delivery::Stale(run) => crate::debug!("relay"; "dropped frame from stale run {}", run),
        Delivery::Ignored | Delivery::Applied(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use tungstenite::protocol::Role;

    /// A connected server/client pair without an HTTP handshake.
    fn socket_pair() -> (WebSocket<TcpStream>, WebSocket<TcpStream>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        server.set_nonblocking(true).unwrap();
        (
            WebSocket::from_raw_socket(server, Role::Server, None),
            WebSocket::from_raw_socket(client, Role::Client, None),
        )
    }

    #[test]
    fn test_read_pending_caps_each_poll() {
        let (server, mut client) = socket_pair();
        let clients = Mutex::new(vec![server]);

        for i in 0..MAX_FRAMES_PER_POLL + 10 {
            client.send(Message::Text(i.to_string().into())).unwrap();
        }
        std::thread::sleep(Duration::from_millis(100));

        let first = read_pending(&clients);
        assert_eq!(first.len(), MAX_FRAMES_PER_POLL);
        assert_eq!(first[0], "0");
        assert!(!clients.is_locked());

        let second = read_pending(&clients);
        assert_eq!(second.len(), 10);
        assert!(read_pending(&clients).is_empty());
        assert_eq!(clients.lock().len(), 1);
    }

    #[test]
    fn test_read_pending_drops_closed_client() {
        let (server, mut client) = socket_pair();
        let clients = Mutex::new(vec![server]);

        client.send(Message::Text("last".into())).unwrap();
        client.close(None).unwrap();
        client.flush().ok();
        std::thread::sleep(Duration::from_millis(100));

        assert_eq!(read_pending(&clients), ["last"]);
        assert!(clients.lock().is_empty());
    }
}
