use serde::{Deserialize, Serialize};

use super::messages::{MessageType, SyncMessage};

/// Maximum message payload size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024; // 64 KiB

#[derive(Debug)]
pub enum ProtocolError {
    EmptyMessage,
    UnknownMessageType(u8),
    PayloadTooLarge(usize),
    SerializeError(String),
    DeserializeError(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty message"),
            Self::UnknownMessageType(b) => write!(f, "unknown message type: 0x{b:02x}"),
            Self::PayloadTooLarge(size) => {
                write!(
                    f,
                    "payload too large: {size} bytes (max {MAX_MESSAGE_SIZE})"
                )
            },
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Encode a serializable payload with a 1-byte type prefix.
///
/// Payloads are written as MessagePack maps: snapshot structs skip absent
/// optional fields, which the positional array encoding cannot express.
pub fn encode_message<T: Serialize>(
    msg_type: MessageType,
    payload: &T,
) -> Result<Vec<u8>, ProtocolError> {
    let payload_bytes = rmp_serde::to_vec_named(payload)
        .map_err(|e| ProtocolError::SerializeError(e.to_string()))?;
    let total = 1 + payload_bytes.len();
    if total > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(total));
    }
    let mut buf = Vec::with_capacity(total);
    buf.push(msg_type as u8);
    buf.extend_from_slice(&payload_bytes);
    Ok(buf)
}

/// Encode a `SyncMessage` to wire format.
pub fn encode_sync_message(msg: &SyncMessage) -> Result<Vec<u8>, ProtocolError> {
    match msg {
        SyncMessage::Snapshot(m) => encode_message(MessageType::Snapshot, m),
        SyncMessage::ShortSnapshot(m) => encode_message(MessageType::ShortSnapshot, m),
        SyncMessage::Override(m) => encode_message(MessageType::Override, m),
        SyncMessage::Outcomes(m) => encode_message(MessageType::Outcomes, m),
    }
}

/// Extract the message type byte from raw wire data.
pub fn decode_message_type(data: &[u8]) -> Result<MessageType, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    MessageType::from_byte(data[0]).ok_or(ProtocolError::UnknownMessageType(data[0]))
}

/// Decode a MessagePack payload (bytes after the type prefix).
pub fn decode_payload<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::EmptyMessage);
    }
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(data.len()));
    }
    rmp_serde::from_slice(&data[1..]).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
}

/// Decode raw wire data into a `SyncMessage`.
pub fn decode_sync_message(data: &[u8]) -> Result<SyncMessage, ProtocolError> {
    match decode_message_type(data)? {
        MessageType::Snapshot => Ok(SyncMessage::Snapshot(decode_payload(data)?)),
        MessageType::ShortSnapshot => Ok(SyncMessage::ShortSnapshot(decode_payload(data)?)),
        MessageType::Override => Ok(SyncMessage::Override(decode_payload(data)?)),
        MessageType::Outcomes => Ok(SyncMessage::Outcomes(decode_payload(data)?)),
    }
}
