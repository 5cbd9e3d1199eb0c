use serde::{Deserialize, Serialize};

/// Discrete motion state of a ball.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallState {
    #[default]
    Stationary,
    Rolling,
    Sliding,
    Falling,
    InPocket,
}

impl BallState {
    /// True for every state except `Falling` and `InPocket`.
    pub fn on_table(self) -> bool {
        !matches!(self, Self::Falling | Self::InPocket)
    }

    /// True while the ball is rolling, sliding, or dropping into a pocket.
    pub fn in_motion(self) -> bool {
        matches!(self, Self::Rolling | Self::Sliding | Self::Falling)
    }
}
