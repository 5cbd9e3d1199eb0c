//! Ball-ball contact detection and the throw (friction) collision model.

use baize_core::BallState;
use baize_core::math::{Vec3, exp, sqrt};

use crate::ball::Ball;
use crate::constants::Physics;

/// True if both balls are on the table, at least one is moving, and their
/// positions after `t` are closer than two radii.
pub fn will_collide(a: &Ball, b: &Ball, t: f64, p: &Physics) -> bool {
    if !a.on_table() || !b.on_table() || (!a.in_motion() && !b.in_motion()) {
        return false;
    }
    let d = p.contact_distance();
    a.future_position(t).distance_squared_to(&b.future_position(t)) < d * d
}

/// Time offset at which the centres are exactly `2R` apart along the
/// current relative velocity. Zero when the balls already overlap.
pub fn contact_time(a: &Ball, b: &Ball, p: &Physics) -> f64 {
    let d = a.pos - b.pos;
    let rv = a.vel - b.vel;
    let qa = rv.dot(&rv);
    if qa == 0.0 {
        return 0.0;
    }
    let contact = p.contact_distance();
    let qb = 2.0 * d.dot(&rv);
    let qc = d.dot(&d) - contact * contact;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        // Fall back to the separation along the ray.
        return ((d.length() - contact) / sqrt(qa)).max(0.0);
    }
    ((-qb - sqrt(disc)) / (2.0 * qa)).max(0.0)
}

/// Ball centres at the moment of contact.
pub fn contact_positions(a: &Ball, b: &Ball, p: &Physics) -> (Vec3, Vec3) {
    let tau = contact_time(a, b, p);
    (a.future_position(tau), b.future_position(tau))
}

/// Ball-ball friction coefficient as a function of contact slip speed.
pub fn dynamic_friction(slip: f64) -> f64 {
    0.009951 + 0.108 * exp(-1.088 * slip)
}

/// Resolve a collision between `a` and `b`, applying normal and tangential
/// impulses to both. Returns the incident normal speed.
pub fn collide(a: &mut Ball, b: &mut Ball, p: &Physics) -> f64 {
    let (ca, cb) = contact_positions(a, b, p);
    let mut n = (cb - ca).normalize();
    if n.is_zero() {
        n = (b.pos - a.pos).normalize();
    }
    let t_hat = Vec3::new(-n.y, n.x, 0.0);
    let r = p.radius();

    // Relative velocity of the contact points.
    let vp = a.vel - b.vel + a.rvel.cross(&n) * r - n.cross(&b.rvel) * r;
    let vn = n.dot(&vp);
    let slip = vp - n * vn;
    let slip_speed = slip.length();

    let jn = vn * (1.0 + p.ball_restitution()) / 2.0;
    let jt = if slip_speed > 0.0 {
        let mu = dynamic_friction(slip_speed);
        (mu * jn.abs() / slip_speed).min(1.0 / 7.0) * -t_hat.dot(&slip)
    } else {
        0.0
    };

    let impulse = n * -jn + t_hat * jt;
    a.vel += impulse;
    b.vel -= impulse;
    let dw = n.cross(&(t_hat * jt)) * (5.0 / (2.0 * r));
    a.rvel += dw;
    b.rvel += dw;

    a.state = BallState::Sliding;
    b.state = BallState::Sliding;
    vn.abs()
}
