use serde::{Deserialize, Serialize};

use baize_core::BallState;
use baize_core::math::Vec3;

use crate::ball::Ball;
use crate::constants::Physics;
use crate::layout::TableLayout;

/// Rounded cushion end at a pocket mouth, modelled as a fixed cylinder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Knuckle {
    pub centre: Vec3,
    pub radius: f64,
}

impl Knuckle {
    pub fn new(centre: Vec3, radius: f64) -> Self {
        Self { centre, radius }
    }

    /// Outward normal from the knuckle toward the ball.
    fn normal(&self, pos: &Vec3) -> Vec3 {
        (*pos - self.centre).with_z(0.0).normalize()
    }

    /// True if the ball will touch the knuckle within `t` while moving toward it.
    pub fn will_bounce(&self, ball: &Ball, t: f64, p: &Physics) -> bool {
        let future = ball.future_position(t).with_z(0.0);
        future.distance_to(&self.centre) < p.radius() + self.radius
            && ball.vel.dot(&self.normal(&ball.pos)) < 0.0
    }

    /// Reflect the normal velocity with cushion restitution and halve the spin.
    ///
    /// Returns the incident normal speed.
    pub fn bounce(&self, ball: &mut Ball, p: &Physics) -> f64 {
        let n = self.normal(&ball.pos);
        let vn = ball.vel.dot(&n);
        ball.vel -= n * ((1.0 + p.cushion_restitution()) * vn);
        ball.rvel *= 0.5;
        ball.state = BallState::Sliding;
        vn.abs()
    }
}

/// Bounce the ball off the first knuckle it is about to hit.
pub fn bounce_any(ball: &mut Ball, t: f64, layout: &TableLayout, p: &Physics) -> Option<f64> {
    let knuckle = layout
        .knuckles
        .iter()
        .find(|k| k.will_bounce(ball, t, p))?;
    Some(knuckle.bounce(ball, p))
}
