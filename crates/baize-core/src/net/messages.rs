use serde::{Deserialize, Serialize};

use crate::outcome::{BallId, OutcomeLog};
use crate::snapshot::{BallOverride, ShortSnapshot, TableSnapshot};

/// Sync message type discriminator (first byte on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    Snapshot = 0x01,
    ShortSnapshot = 0x02,
    Override = 0x03,
    Outcomes = 0x04,
}

impl MessageType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(Self::Snapshot),
            0x02 => Some(Self::ShortSnapshot),
            0x03 => Some(Self::Override),
            0x04 => Some(Self::Outcomes),
            _ => None,
        }
    }
}

/// Authoritative correction for a single ball, blended over `duration` seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideMsg {
    pub ball: BallId,
    pub target: BallOverride,
    pub duration: f64,
}

/// Outcome log of a finished (or in-progress) shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomesMsg {
    pub shot: u32,
    pub log: OutcomeLog,
}

/// Everything the recording, replay, and network layers exchange about table state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncMessage {
    Snapshot(TableSnapshot),
    ShortSnapshot(ShortSnapshot),
    Override(OverrideMsg),
    Outcomes(OutcomesMsg),
}

impl SyncMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Snapshot(_) => MessageType::Snapshot,
            Self::ShortSnapshot(_) => MessageType::ShortSnapshot,
            Self::Override(_) => MessageType::Override,
            Self::Outcomes(_) => MessageType::Outcomes,
        }
    }
}
