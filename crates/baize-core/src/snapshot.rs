use serde::{Deserialize, Serialize};

use crate::math::Vec3;
use crate::outcome::BallId;
use crate::state::BallState;

/// Serialized kinematic state of one ball.
///
/// `vel`, `rvel` and `state` are optional: a restore that omits them leaves
/// the ball at rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub id: BallId,
    pub pos: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vel: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rvel: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<BallState>,
}

impl BallSnapshot {
    /// Position-only snapshot.
    pub fn at(id: BallId, pos: Vec3) -> Self {
        Self {
            id,
            pos,
            vel: None,
            rvel: None,
            state: None,
        }
    }
}

/// Full table snapshot, balls in id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub balls: Vec<BallSnapshot>,
}

impl TableSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Compact snapshot: `[x0, y0, x1, y1, ...]` in ball-id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortSnapshot(pub Vec<f64>);

impl ShortSnapshot {
    /// Number of balls described.
    pub fn ball_count(&self) -> usize {
        self.0.len() / 2
    }

    /// `(x, y)` of the ball at `index`, if present.
    pub fn position(&self, index: usize) -> Option<(f64, f64)> {
        let x = *self.0.get(index * 2)?;
        let y = *self.0.get(index * 2 + 1)?;
        Some((x, y))
    }
}

/// Authoritative correction for one ball, pushed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallOverride {
    pub pos: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vel: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rvel: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<BallState>,
}

impl BallOverride {
    /// Position-only correction.
    pub fn at(pos: Vec3) -> Self {
        Self {
            pos,
            vel: None,
            rvel: None,
            state: None,
        }
    }
}
