//! TCP transport speaking line-delimited JSON.
//!
//! Each connection starts with one JOIN line:
//! `{"type":"JOIN","payload":{"user_id":"..","gym_id":".."}}`.
//! A rejected JOIN gets a single `ERROR` line and the socket is closed.
//! Once joined, every further line is handed to the session verbatim and
//! every outbound event is written back as one JSON object per line. The
//! socket closes when the session's outbound stream ends.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time;
use tracing::{debug, info, warn};

use combat_runtime::{
    CombatSetup, InboundMessage, OutboundEvent, RuntimeError, SessionBuilder, SessionParts,
};

use crate::fixtures::World;

/// Handshake message type.
pub const JOIN: &str = "JOIN";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("socket error")]
    Io(#[from] io::Error),

    #[error("failed to encode outbound event")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct JoinPayload {
    user_id: String,
    gym_id: String,
}

/// Accepts connections and bridges each one to a combat session.
#[derive(Clone)]
pub struct Transport {
    builder: SessionBuilder,
    world: Arc<World>,
    join_timeout: Duration,
}

impl Transport {
    pub fn new(builder: SessionBuilder, world: Arc<World>, join_timeout: Duration) -> Self {
        Self {
            builder,
            world,
            join_timeout,
        }
    }

    /// Serves until `shutdown` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> io::Result<()> {
        tokio::pin!(shutdown);
        info!(target: "combat::transport", addr = %listener.local_addr()?, "listening");

        loop {
            let accepted = tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => {
                    debug!(target: "combat::transport", %peer, "connection accepted");
                    let transport = self.clone();
                    tokio::spawn(async move {
                        if let Err(error) = transport.handle_connection(stream).await {
                            debug!(target: "combat::transport", %peer, %error, "connection failed");
                        }
                    });
                }
                Err(error) => {
                    warn!(target: "combat::transport", %error, "accept failed");
                }
            }
        }

        info!(target: "combat::transport", "transport stopped");
        Ok(())
    }

    async fn handle_connection(&self, stream: TcpStream) -> Result<(), TransportError> {
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();

        let setup = match self.handshake(&mut lines).await {
            Ok(setup) => setup,
            Err(code) => return reject(&mut write, code).await,
        };

        let session = match self.builder.spawn(setup) {
            Ok(session) => session,
            Err(error) => {
                debug!(target: "combat::transport", %error, "session rejected");
                return reject(&mut write, spawn_rejection_code(&error)).await;
            }
        };

        let SessionParts {
            handle,
            inbound,
            mut outbound,
            task,
        } = session.into_parts();

        let writer_handle = handle.clone();
        let writer = tokio::spawn(async move {
            while let Some(event) = outbound.recv().await {
                if let Err(error) = write_event(&mut write, &event).await {
                    debug!(target: "combat::transport", %error, "write failed");
                    writer_handle.close_transport();
                    break;
                }
            }
            let _ = write.shutdown().await;
        });

        loop {
            let line = tokio::select! {
                _ = handle.closed() => break,
                line = lines.next_line() => line,
            };

            match line {
                Ok(Some(line)) => {
                    if inbound.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    debug!(target: "combat::transport", %error, "read failed");
                    break;
                }
            }
        }

        drop(inbound);
        if let Err(error) = writer.await {
            warn!(target: "combat::transport", %error, "writer task failed");
        }
        match task.join().await {
            Ok(reason) => info!(
                target: "combat::transport",
                gym_id = handle.gym_id(),
                user_id = handle.user_id(),
                %reason,
                "connection closed"
            ),
            Err(error) => warn!(target: "combat::transport", %error, "session task failed"),
        }

        Ok(())
    }

    /// Reads and validates the JOIN line. Errors are reason codes.
    async fn handshake(
        &self,
        lines: &mut Lines<BufReader<OwnedReadHalf>>,
    ) -> Result<CombatSetup, &'static str> {
        let line = match time::timeout(self.join_timeout, lines.next_line()).await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) | Ok(Err(_)) => return Err("INVALID_JOIN"),
            Err(_) => return Err("JOIN_TIMEOUT"),
        };

        let message = InboundMessage::parse(&line).map_err(|_| "INVALID_JOIN")?;
        if message.kind != JOIN {
            return Err("INVALID_JOIN");
        }
        let payload = message.payload.ok_or("INVALID_JOIN")?;
        let JoinPayload { user_id, gym_id } =
            serde_json::from_value(payload).map_err(|_| "INVALID_JOIN")?;

        let registry = self.builder.registry();
        if registry.includes(&gym_id) {
            return Err("GYM_ALREADY_IN_COMBAT");
        }
        if registry.includes_user(&user_id) {
            return Err("USER_ALREADY_IN_COMBAT");
        }

        self.world
            .challenge(&user_id, &gym_id)
            .map_err(|rejection| rejection.code())
    }
}

fn spawn_rejection_code(error: &RuntimeError) -> &'static str {
    match error {
        RuntimeError::CombatInProgress { .. } => "GYM_ALREADY_IN_COMBAT",
        RuntimeError::UserInCombat { .. } => "USER_ALREADY_IN_COMBAT",
        RuntimeError::CreatureBusy(_) => "LOOMIE_BUSY",
        RuntimeError::Setup(_) => "INVALID_COMBAT",
        _ => "SERVER_ERROR",
    }
}

async fn write_event(write: &mut OwnedWriteHalf, event: &OutboundEvent) -> Result<(), TransportError> {
    let mut line = event.to_json()?;
    line.push('\n');
    write.write_all(line.as_bytes()).await?;
    Ok(())
}

async fn reject(write: &mut OwnedWriteHalf, code: &str) -> Result<(), TransportError> {
    debug!(target: "combat::transport", code, "join rejected");
    write_event(write, &OutboundEvent::error(code)).await?;
    write.shutdown().await?;
    Ok(())
}
