use crate::rendering::Renderer;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use scoreboard_shared::{Command, MatchState};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// WebSocket connection to a scoreboard server
pub struct Client {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Client {
    pub async fn connect(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let (stream, _) = connect_async(url).await?;
        info!("Connected to {}", url);
        Ok(Client { stream })
    }

    pub async fn send_command(&mut self, command: &Command) -> Result<(), Box<dyn std::error::Error>> {
        let payload = command.to_json()?;
        debug!("Sending {}", payload);
        self.stream.send(Message::Text(payload)).await?;
        Ok(())
    }

    /// Waits for the next state frame; `None` once the server hangs up
    pub async fn next_state(&mut self) -> Result<Option<MatchState>, Box<dyn std::error::Error>> {
        while let Some(frame) = self.stream.next().await {
            match frame? {
                Message::Text(payload) => match serde_json::from_str::<MatchState>(&payload) {
                    Ok(state) => return Ok(Some(state)),
                    Err(e) => warn!("Ignoring unreadable state: {}", e),
                },
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }

        Ok(None)
    }

    /// Sends one command and waits up to `wait` for the resulting broadcast
    ///
    /// The server ignores commands that break the rules without replying,
    /// so `Ok(None)` means the command was not applied.
    pub async fn execute(
        &mut self,
        command: &Command,
        wait: Duration,
    ) -> Result<Option<MatchState>, Box<dyn std::error::Error>> {
        // The server greets every connection with the current state
        self.next_state().await?;

        self.send_command(command).await?;

        match timeout(wait, self.next_state()).await {
            Ok(state) => state,
            Err(_) => Ok(None),
        }
    }

    /// Prints every state the server pushes until the connection closes
    pub async fn watch(&mut self, renderer: &Renderer) -> Result<(), Box<dyn std::error::Error>> {
        while let Some(state) = self.next_state().await? {
            print!("{}", renderer.render(&state));
        }

        info!("Server closed the connection");
        Ok(())
    }

    pub async fn close(mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.close(None).await?;
        Ok(())
    }
}
