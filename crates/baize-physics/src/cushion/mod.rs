//! Ball-cushion impulse models and their application to the four straight
//! cushions of a table.

pub mod han;
pub mod mathaven;

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use baize_core::BallState;
use baize_core::math::Vec3;

use crate::ball::Ball;
use crate::constants::Physics;
use crate::error::PhysicsError;
use crate::kinematics::Delta;
use crate::layout::TableLayout;

/// Which cushion impulse model the table uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CushionModel {
    /// Closed-form grip/slip selection.
    #[default]
    Han,
    /// Closed form, blending grip and slip for check-side english.
    HanBlend,
    /// Iterative impulse integration.
    Mathaven,
}

impl CushionModel {
    /// Velocity and spin change for a ball striking a cushion whose inward
    /// normal is +X.
    pub fn bounce(self, v: &Vec3, w: &Vec3, p: &Physics) -> Result<Delta, PhysicsError> {
        match self {
            Self::Han => Ok(han::bounce(v, w, p)),
            Self::HanBlend => Ok(han::bounce_blend(v, w, p)),
            Self::Mathaven => mathaven::bounce(v, w, p),
        }
    }
}

/// Rotate the ball's motion into the cushion frame, apply the model, and
/// rotate the resulting delta back.
pub fn rotate_apply_unrotate(
    theta: f64,
    v: &Vec3,
    w: &Vec3,
    model: CushionModel,
    p: &Physics,
) -> Result<Delta, PhysicsError> {
    let v_local = v.rotate_z(theta);
    let w_local = w.rotate_z(theta);
    Ok(model.bounce(&v_local, &w_local, p)?.rotate_z(-theta))
}

/// Rotation taking each cushion's inward normal onto +X.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Edge {
    PosX,
    NegX,
    PosY,
    NegY,
}

impl Edge {
    fn angle(self) -> f64 {
        match self {
            Self::PosX => 0.0,
            Self::NegX => PI,
            Self::PosY => -PI / 2.0,
            Self::NegY => PI / 2.0,
        }
    }
}

/// The straight cushion (if any) the ball will reach within `t`.
fn struck_edge(ball: &Ball, t: f64, layout: &TableLayout) -> Option<Edge> {
    let future = ball.future_position(t);
    let v = ball.vel;
    if future.x > layout.table_x && v.x > 0.0 && layout.short_cushion_at(future.y) {
        return Some(Edge::PosX);
    }
    if future.x < -layout.table_x && v.x < 0.0 && layout.short_cushion_at(future.y) {
        return Some(Edge::NegX);
    }
    if future.y > layout.table_y && v.y > 0.0 && layout.long_cushion_at(future.x) {
        return Some(Edge::PosY);
    }
    if future.y < -layout.table_y && v.y < 0.0 && layout.long_cushion_at(future.x) {
        return Some(Edge::NegY);
    }
    None
}

/// Bounce the ball off whichever straight cushion it is about to cross.
///
/// Returns the incident normal speed when a bounce happened.
pub fn bounce_any(
    ball: &mut Ball,
    t: f64,
    layout: &TableLayout,
    model: CushionModel,
    p: &Physics,
) -> Result<Option<f64>, PhysicsError> {
    let Some(edge) = struck_edge(ball, t, layout) else {
        return Ok(None);
    };
    let theta = edge.angle();
    let incident = ball.vel.rotate_z(theta).x;
    let delta = rotate_apply_unrotate(theta, &ball.vel, &ball.rvel, model, p)?;
    ball.vel += delta.v;
    ball.rvel += delta.w;
    ball.state = BallState::Sliding;
    Ok(Some(incident.abs()))
}
