//! # Map-Serving Collaborator
//!
//! A narrow TCP front end: accept a connection, read one [`protocol::Frame`],
//! and if it's a `RequestMap`, generate a map and hand it back as JSON inside
//! a `MapData` frame. The generation core itself (see [`crate::generation`])
//! stays synchronous; only this I/O boundary is async.

pub mod protocol;

use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::generation::{generate_map, GenerationParams, GeneratorKind};
use crate::{limits, MapError, MapResult};
use protocol::{read_frame, write_frame, MessageType};

/// One request payload for a `RequestMap` frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapRequest {
    pub kind: GeneratorKind,
    pub params: GenerationParams,
}

/// Bookkeeping for one connected client. The serving collaborator's only
/// piece of shared mutable state (spec §5); guarded by a plain mutex since
/// the generation core itself needs no synchronisation at all.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub addr: SocketAddr,
}

pub struct DungeonServer {
    listener: TcpListener,
    clients: Arc<Mutex<Vec<ClientHandle>>>,
}

impl DungeonServer {
    pub async fn bind(port: u16) -> MapResult<Self> {
        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr).await?;
        info!("dungeonforge listening on {addr}");
        Ok(Self {
            listener,
            clients: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn local_addr(&self) -> MapResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections forever, handling each on its own task. A
    /// per-client I/O error tears down only that client (spec §7).
    pub async fn run(self) -> MapResult<()> {
        loop {
            let (stream, addr) = self.listener.accept().await?;
            let clients = Arc::clone(&self.clients);
            clients.lock().await.push(ClientHandle { addr });
            tokio::spawn(async move {
                if let Err(err) = handle_client(stream, addr).await {
                    warn!("client {addr} disconnected: {err}");
                }
                clients.lock().await.retain(|c| c.addr != addr);
            });
        }
    }
}

async fn handle_client(mut stream: TcpStream, addr: SocketAddr) -> MapResult<()> {
    info!("client connected: {addr}");
    loop {
        let frame = match read_frame(&mut stream).await {
            Ok(frame) => frame,
            Err(MapError::Io(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("client {addr} closed the connection");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        match frame.message_type {
            MessageType::RequestMap => {
                let response = handle_request_map(&frame.payload);
                match response {
                    Ok(body) => write_frame(&mut stream, MessageType::MapData, &body).await?,
                    Err(err) => {
                        error!("generation failed for {addr}: {err}");
                        let body = err.to_string().into_bytes();
                        write_frame(&mut stream, MessageType::Error, &body).await?;
                    }
                }
            }
            other => {
                warn!("client {addr} sent unsupported message type {other:?} for this core");
                let body = b"unsupported in this build".to_vec();
                write_frame(&mut stream, MessageType::Error, &body).await?;
            }
        }
    }
}

fn handle_request_map(payload: &[u8]) -> MapResult<Vec<u8>> {
    let request: MapRequest = serde_json::from_slice(payload)?;
    let grid = generate_map(request.kind, &request.params)?;
    let body = serde_json::to_vec(&grid)?;
    Ok(body)
}

/// Default bind port, from the generator base's `limits` module.
pub fn default_port() -> u16 {
    limits::DEFAULT_PORT
}

/// Builds a [`MapRequest`] for the CLI's `genmap` command.
pub fn build_request(kind: GeneratorKind, width: u32, height: u32, min_rooms: u32, max_rooms: u32, seed: Option<u64>) -> MapRequest {
    let mut params = GenerationParams::new(width, height).with_room_bounds(min_rooms, max_rooms);
    if let Some(seed) = seed {
        params = params.with_seed(seed);
    }
    MapRequest { kind, params }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips_through_json() {
        let request = build_request(GeneratorKind::Passage, 30, 30, 5, 8, Some(42));
        let encoded = serde_json::to_vec(&request).unwrap();
        let decoded: MapRequest = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded.params.seed, Some(42));
        assert_eq!(decoded.kind, GeneratorKind::Passage);
    }

    #[tokio::test]
    async fn server_binds_to_an_ephemeral_port() {
        let server = DungeonServer::bind(0).await.unwrap();
        let addr = server.local_addr().unwrap();
        assert!(addr.port() > 0);
    }
}
