//! Friction models for a ball in contact with the cloth.
//!
//! Each model returns a rate of change (per second) of linear and angular
//! velocity. The caller scales by the timestep.

use baize_core::math::{Vec3, norm, sign, up_cross};

use crate::constants::Physics;

/// Change in linear (`v`) and angular (`w`) velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Delta {
    pub v: Vec3,
    pub w: Vec3,
}

impl Delta {
    pub fn scaled(&self, t: f64) -> Self {
        Self {
            v: self.v * t,
            w: self.w * t,
        }
    }

    /// Rotate both components about the vertical axis.
    pub fn rotate_z(&self, theta: f64) -> Self {
        Self {
            v: self.v.rotate_z(theta),
            w: self.w.rotate_z(theta),
        }
    }
}

/// Velocity of the cloth contact point, vertical component included.
pub fn surface_velocity_full(v: &Vec3, w: &Vec3, physics: &Physics) -> Vec3 {
    *v + up_cross(w) * physics.radius()
}

/// Velocity of the cloth contact point in the table plane.
pub fn surface_velocity(v: &Vec3, w: &Vec3, physics: &Physics) -> Vec3 {
    surface_velocity_full(v, w, physics).with_z(0.0)
}

/// Deceleration of the english (spin about Z), independent of roll or slide.
fn spin_decay(w: &Vec3, physics: &Physics) -> f64 {
    let r = physics.radius();
    -(5.0 / 2.0) * (physics.mz() / (physics.mass() * r * r)) * sign(w.z)
}

/// Sliding friction: decelerates along the contact slip and drives the
/// spin toward natural roll.
pub fn sliding(v: &Vec3, w: &Vec3, physics: &Physics) -> Delta {
    let mu_g = physics.mu_slide() * physics.gravity();
    let va = surface_velocity(v, w, physics);
    let dv = norm(&va) * -mu_g;
    let mut dw = norm(&up_cross(&va)) * ((5.0 / 2.0) * mu_g / physics.radius());
    dw.z = spin_decay(w, physics);
    Delta { v: dv, w: dw }
}

/// Rolling resistance for a ball already in natural roll.
pub fn rolling(w: &Vec3, physics: &Physics) -> Delta {
    let r = physics.radius();
    let m = physics.mass();
    let wz = spin_decay(w, physics);
    let mag = Vec3::new(w.x, w.y, 0.0).length();
    if mag == 0.0 {
        return Delta {
            v: Vec3::ZERO,
            w: Vec3::new(0.0, 0.0, wz),
        };
    }
    let k = ((5.0 / 7.0) * physics.mxy()) / (m * r) / mag;
    let kw = ((5.0 / 7.0) * physics.mxy()) / (m * r * r) / mag;
    Delta {
        v: Vec3::new(-k * w.y, k * w.x, 0.0),
        w: Vec3::new(-kw * w.x, -kw * w.y, wz),
    }
}

/// Spin for natural roll at velocity `v`, keeping the existing english.
pub fn force_roll(v: &Vec3, w: &Vec3, physics: &Physics) -> Vec3 {
    (up_cross(v) / physics.radius()).with_z(w.z)
}
