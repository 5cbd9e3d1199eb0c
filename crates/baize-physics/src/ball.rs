use serde::{Deserialize, Serialize};

use baize_core::math::{Vec3, passes_through_zero};
use baize_core::{BallId, BallOverride, BallSnapshot, BallState};

use crate::constants::{Physics, ROLL_TRANSITION, SPIN_STOP_THRESHOLD};
use crate::kinematics::{self, Delta};
use crate::layout::TableLayout;

/// Remaining position correction from an authoritative override, applied a
/// fraction per tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Blend {
    pub pos_error: Vec3,
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    pub pos: Vec3,
    pub vel: Vec3,
    pub rvel: Vec3,
    pub state: BallState,
    /// Pocket index while falling.
    pub pocket: Option<usize>,
    /// Display label (colour or number) for logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    blend: Option<Blend>,
}

impl Ball {
    pub fn new(id: BallId, pos: Vec3) -> Self {
        Self {
            id,
            pos: pos.fround(),
            vel: Vec3::ZERO,
            rvel: Vec3::ZERO,
            state: BallState::Stationary,
            pocket: None,
            label: None,
            blend: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn on_table(&self) -> bool {
        self.state.on_table()
    }

    pub fn in_motion(&self) -> bool {
        self.state.in_motion()
    }

    pub fn blend(&self) -> Option<&Blend> {
        self.blend.as_ref()
    }

    /// Where the ball would be after `t` at its current velocity.
    pub fn future_position(&self, t: f64) -> Vec3 {
        self.pos + self.vel * t
    }

    /// Give the ball velocity and spin, leaving it sliding (or stationary
    /// when both are zero).
    pub fn set_motion(&mut self, vel: Vec3, rvel: Vec3) {
        self.vel = vel;
        self.rvel = rvel;
        self.state = if vel.is_zero() && rvel.is_zero() {
            BallState::Stationary
        } else {
            BallState::Sliding
        };
    }

    pub fn set_stationary(&mut self) {
        self.vel = Vec3::ZERO;
        self.rvel = Vec3::ZERO;
        self.state = BallState::Stationary;
    }

    /// Final state after dropping into a pocket.
    pub fn settle_in_pocket(&mut self) {
        self.vel = Vec3::ZERO;
        self.rvel = Vec3::ZERO;
        self.state = BallState::InPocket;
        self.pocket = None;
        self.blend = None;
        tracing::debug!(ball = self.id, depth = self.pos.z, "Ball settled in pocket");
    }

    /// Contact-point slip is small enough for natural roll.
    pub fn is_rolling(&self, p: &Physics) -> bool {
        !self.vel.is_zero()
            && !self.rvel.is_zero()
            && kinematics::surface_velocity_full(&self.vel, &self.rvel, p).length()
                < ROLL_TRANSITION
    }

    /// Advance position and velocity by `t` (no collision handling).
    pub fn update(&mut self, t: f64, p: &Physics, layout: &TableLayout) {
        self.update_position(t);
        if self.state == BallState::Falling {
            let index = self.pocket.or_else(|| layout.nearest_pocket(&self.pos));
            match index.and_then(|i| layout.pockets.get(i)) {
                Some(pocket) => pocket.update_fall(self, t, p),
                None => self.settle_in_pocket(),
            }
        } else {
            self.update_velocity(t, p);
        }
    }

    fn update_position(&mut self, t: f64) {
        self.pos += self.vel * t;
        if self.state == BallState::Falling {
            return;
        }
        if let Some(blend) = self.blend.as_mut() {
            let fraction = if blend.remaining <= t {
                1.0
            } else {
                t / blend.remaining
            };
            let dp = blend.pos_error * fraction;
            self.pos += dp;
            blend.pos_error -= dp;
            blend.remaining -= t;
            if blend.remaining <= 0.0 {
                self.blend = None;
            }
        }
    }

    fn update_velocity(&mut self, t: f64, p: &Physics) {
        if !self.in_motion() {
            return;
        }
        let delta = if self.is_rolling(p) {
            self.state = BallState::Rolling;
            self.rvel = kinematics::force_roll(&self.vel, &self.rvel, p);
            kinematics::rolling(&self.rvel, p)
        } else {
            self.state = BallState::Sliding;
            kinematics::sliding(&self.vel, &self.rvel, p)
        };
        self.add_delta(delta.scaled(t));
    }

    /// Apply a friction step, stopping the ball instead of letting friction
    /// reverse its motion.
    fn add_delta(&mut self, delta: Delta) {
        let v_stops = passes_through_zero(&self.vel, &delta.v);
        let w_stops = passes_through_zero(&self.rvel, &delta.w);
        let halts = if self.state == BallState::Rolling {
            v_stops || w_stops
        } else {
            v_stops && w_stops
        };
        if !halts {
            self.vel += delta.v;
            self.rvel += delta.w;
            return;
        }
        if self.rvel.z.abs() < SPIN_STOP_THRESHOLD {
            self.set_stationary();
            return;
        }
        // Translation is spent; the remaining english keeps decaying in place.
        let wz = self.rvel.z + delta.w.z;
        self.vel = Vec3::ZERO;
        if wz * self.rvel.z <= 0.0 {
            self.set_stationary();
        } else {
            self.rvel = Vec3::new(0.0, 0.0, wz);
        }
    }

    /// Round dynamic state to `f32` precision.
    pub fn fround(&mut self) {
        self.pos = self.pos.fround();
        self.vel = self.vel.fround();
        self.rvel = self.rvel.fround();
        if let Some(blend) = self.blend.as_mut() {
            blend.pos_error = blend.pos_error.fround();
        }
    }

    pub fn snapshot(&self) -> BallSnapshot {
        BallSnapshot {
            id: self.id,
            pos: self.pos,
            vel: Some(self.vel),
            rvel: Some(self.rvel),
            state: Some(self.state),
        }
    }

    /// Load state from a snapshot entry. Missing velocity and spin mean zero;
    /// a missing state is inferred from them.
    pub fn restore(&mut self, snap: &BallSnapshot) {
        self.pos = snap.pos;
        self.vel = snap.vel.unwrap_or(Vec3::ZERO);
        self.rvel = snap.rvel.unwrap_or(Vec3::ZERO);
        self.state = snap.state.unwrap_or_else(|| {
            if self.vel.is_zero() && self.rvel.is_zero() {
                BallState::Stationary
            } else {
                BallState::Sliding
            }
        });
        self.pocket = None;
        self.blend = None;
        self.fround();
    }

    /// Steer the ball toward an authoritative state.
    ///
    /// Velocity, spin and state apply at once. Position snaps when
    /// `duration` is zero, otherwise the error is worked off over `duration`
    /// seconds of simulation. Fields left out of the override keep their
    /// current values.
    pub fn apply_override(&mut self, target: &BallOverride, duration: f64) {
        if let Some(vel) = target.vel {
            self.vel = vel;
        }
        if let Some(rvel) = target.rvel {
            self.rvel = rvel;
        }
        self.state = match target.state {
            Some(state) => state,
            None if self.vel.is_zero() && self.rvel.is_zero() => BallState::Stationary,
            None if self.in_motion() => self.state,
            None => BallState::Sliding,
        };
        match self.state {
            BallState::InPocket => {
                self.pos = target.pos;
                self.settle_in_pocket();
                return;
            },
            BallState::Stationary => {
                self.vel = Vec3::ZERO;
                self.rvel = Vec3::ZERO;
                self.pocket = None;
            },
            BallState::Falling => {},
            _ => self.pocket = None,
        }
        if duration <= 0.0 {
            self.pos = target.pos;
            self.blend = None;
        } else {
            self.blend = Some(Blend {
                pos_error: target.pos - self.pos,
                remaining: duration,
            });
        }
        self.fround();
    }
}
