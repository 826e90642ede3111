//! Registry of connected viewers
//!
//! Every WebSocket connection is a viewer: it receives the full match state
//! after each applied command, and may also send commands of its own. The
//! registry hands out ids, enforces the viewer cap and keeps the outbound
//! queue of each connection so the broadcaster can reach it.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// One connected viewer and the queue that feeds its socket
///
/// Each viewer keeps:
/// - Connection metadata (id, address, connect time)
/// - A bounded outbound queue drained by its writer task
#[derive(Debug)]
pub struct Client {
    /// Unique id assigned by the server
    pub id: u32,
    /// Remote address, used for logging
    pub addr: SocketAddr,
    /// When the WebSocket handshake completed
    pub connected_at: Instant,
    /// Queue drained by the connection's writer task
    pub sender: mpsc::Sender<Message>,
}

impl Client {
    /// Creates a viewer record stamped with the current time
    pub fn new(id: u32, addr: SocketAddr, sender: mpsc::Sender<Message>) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            sender,
        }
    }

    /// How long the viewer has been connected
    pub fn connected_for(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Tracks all viewers and enforces the server's capacity
///
/// The registry is shared behind a lock between the acceptor, the main loop
/// and the outbound sender. Ids are never reused within one server run.
pub struct ClientManager {
    clients: HashMap<u32, Client>,
    next_client_id: u32,
    max_clients: usize,
}

impl ClientManager {
    /// Creates an empty registry; ids start from 1
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Registers a viewer, returning `None` when the server is full
    ///
    /// The caller keeps the receiving half of `sender` and is expected to
    /// close the connection when registration is refused.
    pub fn add_client(&mut self, addr: SocketAddr, sender: mpsc::Sender<Message>) -> Option<u32> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Viewer {} connected from {}", client_id, addr);
        self.clients
            .insert(client_id, Client::new(client_id, addr, sender));

        Some(client_id)
    }

    /// Unregisters a viewer and drops its outbound queue
    ///
    /// Both a disconnect and a stalled queue end up here, so the second call
    /// for the same id is routine. Returns false if the viewer was already gone.
    pub fn remove_client(&mut self, client_id: &u32) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!(
                "Viewer {} from {} disconnected after {:.1}s",
                client.id,
                client.addr,
                client.connected_for().as_secs_f32()
            );
            true
        } else {
            false
        }
    }

    /// Outbound queue of a single viewer, if still registered
    pub fn sender(&self, client_id: u32) -> Option<mpsc::Sender<Message>> {
        self.clients.get(&client_id).map(|client| client.sender.clone())
    }

    /// Outbound queues of every viewer, for fan-out
    pub fn senders(&self) -> Vec<(u32, mpsc::Sender<Message>)> {
        self.clients
            .iter()
            .map(|(id, client)| (*id, client.sender.clone()))
            .collect()
    }

    /// Number of registered viewers
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
