//! # Wire Envelope
//!
//! The raw TCP framing the serving collaborator speaks: one `MessageType`
//! byte, a four-byte little-endian payload length, then the payload itself.

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::limits;
use crate::{MapError, MapResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    RequestMap = 1,
    MapData = 2,
    PlayerMove = 3,
    PlayerJoin = 4,
    PlayerLeave = 5,
    Error = 255,
}

impl MessageType {
    pub fn from_byte(byte: u8) -> MapResult<Self> {
        match byte {
            1 => Ok(MessageType::RequestMap),
            2 => Ok(MessageType::MapData),
            3 => Ok(MessageType::PlayerMove),
            4 => Ok(MessageType::PlayerJoin),
            5 => Ok(MessageType::PlayerLeave),
            255 => Ok(MessageType::Error),
            other => Err(MapError::Protocol(format!("unknown message type byte {other}"))),
        }
    }
}

/// One decoded wire frame: its type byte and payload.
pub struct Frame {
    pub message_type: MessageType,
    pub payload: Vec<u8>,
}

/// Reads one frame from an async stream, enforcing the `MAX_PAYLOAD_BYTES`
/// cap before allocating the payload buffer.
pub async fn read_frame<R>(stream: &mut R) -> MapResult<Frame>
where
    R: AsyncReadExt + Unpin,
{
    let mut type_byte = [0u8; 1];
    stream.read_exact(&mut type_byte).await?;
    let message_type = MessageType::from_byte(type_byte[0])?;

    let mut len_bytes = [0u8; 4];
    stream.read_exact(&mut len_bytes).await?;
    let len = u32::from_le_bytes(len_bytes);
    if len > limits::MAX_PAYLOAD_BYTES {
        return Err(MapError::Protocol(format!(
            "payload length {len} exceeds max {}",
            limits::MAX_PAYLOAD_BYTES
        )));
    }

    let mut payload = vec![0u8; len as usize];
    stream.read_exact(&mut payload).await?;
    Ok(Frame { message_type, payload })
}

/// Writes one frame to an async stream.
pub async fn write_frame<W>(stream: &mut W, message_type: MessageType, payload: &[u8]) -> MapResult<()>
where
    W: AsyncWriteExt + Unpin,
{
    if payload.len() as u32 > limits::MAX_PAYLOAD_BYTES {
        return Err(MapError::Protocol(format!(
            "payload length {} exceeds max {}",
            payload.len(),
            limits::MAX_PAYLOAD_BYTES
        )));
    }
    stream.write_all(&[message_type as u8]).await?;
    stream.write_all(&(payload.len() as u32).to_le_bytes()).await?;
    stream.write_all(payload).await?;
    stream.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn round_trips_a_frame() {
        let mut buf = Vec::new();
        write_frame(&mut buf, MessageType::MapData, b"hello").await.unwrap();

        let mut cursor = Cursor::new(buf);
        let frame = read_frame(&mut cursor).await.unwrap();
        assert_eq!(frame.message_type, MessageType::MapData);
        assert_eq!(frame.payload, b"hello");
    }

    #[tokio::test]
    async fn rejects_unknown_message_type() {
        let mut buf = vec![200u8, 0, 0, 0, 0];
        let mut cursor = Cursor::new(&mut buf);
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, MapError::Protocol(_)));
    }

    #[tokio::test]
    async fn rejects_oversized_declared_length() {
        let mut buf = Vec::new();
        buf.push(MessageType::RequestMap as u8);
        buf.extend_from_slice(&(limits::MAX_PAYLOAD_BYTES + 1).to_le_bytes());
        let mut cursor = Cursor::new(buf);
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, MapError::Protocol(_)));
    }
}
