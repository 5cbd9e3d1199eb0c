use serde::{Deserialize, Serialize};

use baize_core::BallState;
use baize_core::math::{Vec3, fround, up_cross};

use crate::ball::Ball;
use crate::constants::Physics;
use crate::layout::TableLayout;

/// Depth below the cloth at which a potted ball comes to rest.
///
/// Staggered by id so balls in the same pocket do not sit at the same height.
pub fn resting_depth(id: usize, radius: f64) -> f64 {
    fround(-3.0 * radius - radius * id as f64 / 4.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    pub centre: Vec3,
    pub radius: f64,
}

impl Pocket {
    pub fn new(centre: Vec3, radius: f64) -> Self {
        Self { centre, radius }
    }

    /// True if a ball centre at `pos` is over the pocket opening.
    pub fn captures(&self, pos: &Vec3) -> bool {
        pos.with_z(0.0).distance_to(&self.centre) < self.radius
    }

    /// Start the ball falling into this pocket.
    ///
    /// Returns the ball's speed at capture.
    pub fn capture(&self, index: usize, ball: &mut Ball, t: f64, p: &Physics) -> f64 {
        ball.vel.z = -p.gravity() * t;
        ball.state = BallState::Falling;
        ball.pocket = Some(index);
        ball.vel.length()
    }

    /// One tick of a ball dropping inside this pocket. The ball's position
    /// has already been integrated.
    pub fn update_fall(&self, ball: &mut Ball, t: f64, p: &Physics) {
        let g = p.gravity();
        let r = p.radius();
        ball.vel.z -= g * t;

        let flat = ball.pos.with_z(0.0);
        if flat.distance_to(&self.centre) > self.radius - r {
            let to_centre = (self.centre - flat).with_z(0.0).normalize();
            // Still above the rim: the pocket wall pushes the ball inward.
            if ball.pos.z > -r / 2.0 {
                ball.vel += to_centre * (7.0 * r * g * t);
                ball.rvel += up_cross(&to_centre) * (7.0 * g * t);
            }
            if ball.vel.with_z(0.0).dot(&to_centre) < 0.0 {
                let speed = ball.vel.length_xy() / 2.0;
                ball.vel.x = to_centre.x * speed;
                ball.vel.y = to_centre.y * speed;
            }
        }

        let depth = resting_depth(ball.id, r);
        if ball.pos.z < depth {
            ball.pos.z = depth;
            ball.settle_in_pocket();
        }
    }
}

/// Capture the ball in the first pocket its next position falls into.
///
/// Returns the capture speed when the ball was potted.
pub fn pocket_any(ball: &mut Ball, t: f64, layout: &TableLayout, p: &Physics) -> Option<f64> {
    if !ball.state.on_table() || !ball.state.in_motion() {
        return None;
    }
    let future = ball.future_position(t);
    let (index, pocket) = layout
        .pockets
        .iter()
        .enumerate()
        .find(|(_, pocket)| pocket.captures(&future))?;
    Some(pocket.capture(index, ball, t, p))
}
