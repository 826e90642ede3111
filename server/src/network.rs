//! Server network layer: WebSocket connections and the command loop
//!
//! Connection tasks never touch match state. They forward text frames to the
//! main loop over a channel, and the main loop owns the [`Dispatcher`], so
//! commands are applied one at a time in arrival order. Outgoing state goes
//! through a dedicated sender task that fans it out to each viewer's queue.

use crate::client_manager::ClientManager;
use crate::dispatcher::Dispatcher;
use crate::error::ServerError;
use crate::utils::get_timestamp;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use scoreboard_shared::{Rejection, RuleConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Frames buffered per viewer; a viewer whose queue is full gets dropped
const CLIENT_QUEUE_SIZE: usize = 256;

/// Messages sent from connection tasks to the main loop
#[derive(Debug)]
pub enum ServerMessage {
    ClientConnected { client_id: u32 },
    PayloadReceived { client_id: u32, payload: String },
    ClientDisconnected { client_id: u32 },
}

/// Messages sent from the main loop to the sender task
#[derive(Debug)]
pub enum OutboundMessage {
    SendTo { client_id: u32, payload: String },
    Broadcast { payload: String },
}

/// Scoreboard server owning the match state and all viewer connections
pub struct Server {
    listener: Arc<TcpListener>,
    clients: Arc<RwLock<ClientManager>>,
    dispatcher: Dispatcher,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    outbound_tx: mpsc::UnboundedSender<OutboundMessage>,
    outbound_rx: mpsc::UnboundedReceiver<OutboundMessage>,
}

impl Server {
    /// Binds the listener and prepares an empty viewer registry
    ///
    /// Nothing is accepted until [`Server::run`] is called, so tests can bind
    /// port 0 and read the real address first.
    pub async fn new(
        addr: &str,
        max_clients: usize,
        rules: RuleConfig,
    ) -> Result<Self, ServerError> {
        let listener = Arc::new(TcpListener::bind(addr).await?);
        info!("Scoreboard listening on ws://{}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            clients: Arc::new(RwLock::new(ClientManager::new(max_clients))),
            dispatcher: Dispatcher::new(rules),
            server_tx,
            server_rx,
            outbound_tx,
            outbound_rx,
        })
    }

    /// Address actually bound, useful when listening on port 0
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Spawns task that accepts TCP connections and upgrades them
    async fn spawn_connection_acceptor(&self) {
        let listener = Arc::clone(&self.listener);
        let clients = Arc::clone(&self.clients);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        let clients = Arc::clone(&clients);
                        let server_tx = server_tx.clone();

                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, addr, clients, server_tx).await
                            {
                                warn!("Connection from {} ended with error: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that delivers outgoing frames to viewer queues
    async fn spawn_outbound_sender(&mut self) {
        let clients = Arc::clone(&self.clients);
        let mut outbound_rx =
            std::mem::replace(&mut self.outbound_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                deliver_outbound(&clients, message).await;
            }
        });
    }

    fn queue(&self, message: OutboundMessage) {
        if let Err(e) = self.outbound_tx.send(message) {
            error!("Failed to queue outbound message: {}", e);
        }
    }

    /// Sends the current state to a single viewer
    fn send_state(&self, client_id: u32) -> Result<(), ServerError> {
        let payload = self.dispatcher.state_json()?;
        self.queue(OutboundMessage::SendTo { client_id, payload });
        Ok(())
    }

    /// Queues the current state for every registered viewer
    fn broadcast_state(&self) -> Result<(), ServerError> {
        let payload = self.dispatcher.state_json()?;
        self.queue(OutboundMessage::Broadcast { payload });
        Ok(())
    }

    /// Applies a viewer's command and broadcasts if it changed the match
    fn handle_payload(&mut self, client_id: u32, payload: &str) -> Result<(), ServerError> {
        match self.dispatcher.handle_message(payload, get_timestamp()) {
            Ok(()) => {
                let state = self.dispatcher.state();
                debug!(
                    "Viewer {} command applied: {}-{} (sets {}-{})",
                    client_id, state.points_a, state.points_b, state.sets_a, state.sets_b
                );
                self.broadcast_state()
            }
            Err(Rejection::Malformed(reason)) => {
                warn!("Dropping malformed payload from viewer {}: {}", client_id, reason);
                Ok(())
            }
            Err(rejection) => {
                debug!("Viewer {} command rejected: {}", client_id, rejection);
                Ok(())
            }
        }
    }

    /// Main server loop; runs until the process is stopped
    ///
    /// Spawns the acceptor and the outbound sender, then applies connection
    /// events one at a time. A viewer that connects gets the current state;
    /// every applied command is followed by a broadcast to all viewers.
    pub async fn run(&mut self) -> Result<(), ServerError> {
        self.spawn_connection_acceptor().await;
        self.spawn_outbound_sender().await;

        info!("Server started successfully");

        while let Some(message) = self.server_rx.recv().await {
            match message {
                ServerMessage::ClientConnected { client_id } => {
                    self.send_state(client_id)?;
                }
                ServerMessage::PayloadReceived { client_id, payload } => {
                    self.handle_payload(client_id, &payload)?;
                }
                ServerMessage::ClientDisconnected { client_id } => {
                    let mut clients = self.clients.write().await;
                    clients.remove_client(&client_id);
                }
            }
        }

        info!("Server shutting down");
        Ok(())
    }
}

/// Hands one outbound message to the viewer queues it addresses
///
/// Never waits on a viewer. Queues that are full or closed get their viewer
/// unregistered, so one stalled connection cannot hold back the others.
async fn deliver_outbound(clients: &RwLock<ClientManager>, message: OutboundMessage) {
    let (targets, payload) = match message {
        OutboundMessage::SendTo { client_id, payload } => {
            let sender = clients.read().await.sender(client_id);
            (sender.map(|s| vec![(client_id, s)]).unwrap_or_default(), payload)
        }
        OutboundMessage::Broadcast { payload } => (clients.read().await.senders(), payload),
    };

    let mut dropped = Vec::new();
    for (client_id, sender) in targets {
        match sender.try_send(Message::Text(payload.clone())) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Viewer {} is not reading, dropping it", client_id);
                dropped.push(client_id);
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Viewer {} went away before delivery", client_id);
                dropped.push(client_id);
            }
        }
    }

    if !dropped.is_empty() {
        let mut clients = clients.write().await;
        for client_id in dropped {
            clients.remove_client(&client_id);
        }
    }
}

/// Drives a single WebSocket connection until it closes
///
/// After the handshake the viewer is registered, or sent a close frame when
/// the server is full. Its writer task drains the outbound queue while this
/// task forwards text frames to the main loop. Other frame types are ignored.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    clients: Arc<RwLock<ClientManager>>,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) -> Result<(), ServerError> {
    let websocket = accept_async(stream).await?;
    let (mut sink, mut source) = websocket.split();
    let (sender, mut receiver) = mpsc::channel::<Message>(CLIENT_QUEUE_SIZE);

    let client_id = {
        let mut clients = clients.write().await;
        clients.add_client(addr, sender)
    };

    let Some(client_id) = client_id else {
        warn!("Rejecting viewer from {}: server full", addr);
        sink.send(Message::Close(None)).await?;
        return Ok(());
    };

    if server_tx
        .send(ServerMessage::ClientConnected { client_id })
        .is_err()
    {
        clients.write().await.remove_client(&client_id);
        return Ok(());
    }

    let writer = tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            if let Err(e) = sink.send(message).await {
                debug!("Write to viewer {} failed: {}", client_id, e);
                break;
            }
        }
    });

    while let Some(frame) = source.next().await {
        match frame {
            Ok(Message::Text(payload)) => {
                if server_tx
                    .send(ServerMessage::PayloadReceived { client_id, payload })
                    .is_err()
                {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Read from viewer {} failed: {}", client_id, e);
                break;
            }
        }
    }

    let _ = server_tx.send(ServerMessage::ClientDisconnected { client_id });
    writer.abort();
    Ok(())
}
