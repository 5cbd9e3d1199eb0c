//! Closed-form cushion impulse (Han 2005).
//!
//! All functions work in the canonical frame where +X points into the
//! cushion. Velocities and spins are rotated in and out by the caller.

use baize_core::math::{Vec3, atan2, cos, sign, sin, sqrt};

use crate::constants::Physics;
use crate::kinematics::Delta;

/// Slip velocity of the cushion contact point, and normal approach speed.
fn contact_slip(v: &Vec3, w: &Vec3, p: &Physics) -> (f64, f64, f64) {
    let r = p.radius();
    let (sin_a, cos_a) = (p.sin_a(), p.cos_a());
    let sx = v.x * sin_a - v.z * cos_a + r * w.y;
    let sy = -v.y - r * w.z * cos_a + r * w.x * sin_a;
    let c = v.x * cos_a;
    (sx, sy, c)
}

fn a_coeff(p: &Physics) -> f64 {
    7.0 / (2.0 * p.mass())
}

fn b_coeff(p: &Physics) -> f64 {
    1.0 / p.mass()
}

/// True when friction is strong enough to stop the contact slip entirely.
pub fn is_grip(v: &Vec3, w: &Vec3, p: &Physics) -> bool {
    let (sx, sy, c) = contact_slip(v, w, p);
    let pzs = sqrt(sx * sx + sy * sy) / a_coeff(p);
    let pze = p.mu_cushion() * ((1.0 + p.cushion_restitution()) * c) / b_coeff(p);
    pzs <= pze
}

/// Convert an impulse (in the cushion frame) into velocity and spin changes.
fn impulse_to_delta(px: f64, py: f64, pz: f64, p: &Physics) -> Delta {
    let m = p.mass();
    let k = p.radius() / p.inertia();
    let (sin_a, cos_a) = (p.sin_a(), p.cos_a());
    Delta {
        v: Vec3::new(px / m, py / m, 0.0),
        w: Vec3::new(
            k * (-py * sin_a),
            k * (px * sin_a - pz * cos_a),
            k * (py * cos_a),
        ),
    }
}

/// Rolling contact: the impulse stops slip at the cushion nose.
pub fn grip(v: &Vec3, w: &Vec3, p: &Physics) -> Delta {
    let (sx, sy, c) = contact_slip(v, w, p);
    let (sin_a, cos_a) = (p.sin_a(), p.cos_a());
    let a = a_coeff(p);
    let e = p.cushion_restitution();
    let normal = (1.0 + e) * c / b_coeff(p);
    let px = -(sx / a) * sin_a - normal * cos_a;
    let py = sy / a;
    let pz = (sx / a) * cos_a - normal * sin_a;
    impulse_to_delta(px, py, pz, p)
}

/// Speed-dependent cushion friction.
fn mu_at(v: &Vec3) -> f64 {
    0.471 - 0.241 * atan2(v.y.abs(), v.x)
}

/// Speed-dependent cushion restitution.
fn restitution_at(v: &Vec3) -> f64 {
    (0.39 + 0.257 * v.x - 0.044 * v.x * v.x).clamp(0.0, 1.0)
}

/// Sliding contact: friction acts against the slip direction.
pub fn slip(v: &Vec3, w: &Vec3, p: &Physics) -> Delta {
    let (sx, sy, c) = contact_slip(v, w, p);
    let (sin_a, cos_a) = (p.sin_a(), p.cos_a());
    let phi = atan2(sy, sx);
    let (cos_phi, sin_phi) = (cos(phi), sin(phi));
    let mu = mu_at(v);
    let normal = (1.0 + restitution_at(v)) * c / b_coeff(p);
    let px = -mu * normal * cos_phi * sin_a - normal * cos_a;
    let py = mu * normal * sin_phi;
    let pz = mu * normal * cos_phi * cos_a - normal * sin_a;
    impulse_to_delta(px, py, pz, p)
}

/// Pick grip or slip by comparing the impulse needed to stop slip with the
/// friction limit.
pub fn bounce(v: &Vec3, w: &Vec3, p: &Physics) -> Delta {
    if is_grip(v, w, p) {
        grip(v, w, p)
    } else {
        slip(v, w, p)
    }
}

/// Blend grip and slip by the cosine of the incident angle when the english
/// works against the direction of travel along the rail.
pub fn bounce_blend(v: &Vec3, w: &Vec3, p: &Physics) -> Delta {
    if sign(v.y) != sign(w.z) {
        return bounce(v, w, p);
    }
    let factor = cos(atan2(v.y, v.x));
    let g = grip(v, w, p);
    let s = slip(v, w, p);
    Delta {
        v: s.v.lerp(&g.v, factor),
        w: s.w.lerp(&g.w, factor),
    }
}
