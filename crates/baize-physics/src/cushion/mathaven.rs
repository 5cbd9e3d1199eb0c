//! Iterative cushion impulse (Mathavan et al. 2010).
//!
//! The solver integrates the normal impulse in small steps through a
//! compression phase and a restitution phase, tracking slip at both the
//! cushion and the cloth contact points. It works in its own frame where
//! +Y points into the cushion.

use std::f64::consts::PI;

use baize_core::math::{Vec3, atan2, cos, fround, sin, sqrt};

use crate::constants::Physics;
use crate::error::PhysicsError;
use crate::kinematics::Delta;

const MIN_IMPULSE_STEP: f64 = 0.001;

#[derive(Debug, Clone)]
pub struct Mathaven {
    pub vx: f64,
    pub vy: f64,
    pub wx: f64,
    pub wy: f64,
    pub wz: f64,
    mass: f64,
    radius: f64,
    mu_s: f64,
    mu_w: f64,
    ee: f64,
    sin_a: f64,
    cos_a: f64,
    steps: u32,
    work: f64,
    taken: u32,
}

/// Wrap an angle into `[0, 2π)`.
fn wrap_angle(a: f64) -> f64 {
    if a < 0.0 { a + 2.0 * PI } else { a }
}

impl Mathaven {
    pub fn new(p: &Physics) -> Self {
        let cfg = p.config();
        Self {
            vx: 0.0,
            vy: 0.0,
            wx: 0.0,
            wy: 0.0,
            wz: 0.0,
            mass: cfg.mass,
            radius: cfg.radius,
            mu_s: cfg.mathaven_mu_s,
            mu_w: cfg.mathaven_mu_w,
            ee: cfg.mathaven_ee,
            sin_a: p.sin_a(),
            cos_a: p.cos_a(),
            steps: cfg.mathaven_steps.max(1),
            work: 0.0,
            taken: 0,
        }
    }

    /// Run both phases from the given velocity and spin.
    pub fn solve(&mut self, v: (f64, f64), w: (f64, f64, f64)) -> Result<(), PhysicsError> {
        (self.vx, self.vy) = v;
        (self.wx, self.wy, self.wz) = w;
        self.work = 0.0;
        self.taken = 0;
        self.compression()?;
        self.restitution()
    }

    fn compression(&mut self) -> Result<(), PhysicsError> {
        let n = f64::from(self.steps);
        while self.vy > 0.0 {
            let dp = (self.mass * self.vy / n).max(MIN_IMPULSE_STEP);
            self.update_single_step(dp)?;
        }
        Ok(())
    }

    fn restitution(&mut self) -> Result<(), PhysicsError> {
        let n = f64::from(self.steps);
        let target = self.ee * self.ee * self.work;
        let dp = (target / n).max(MIN_IMPULSE_STEP);
        self.work = 0.0;
        while self.work < target {
            self.update_single_step(dp)?;
        }
        Ok(())
    }

    fn update_single_step(&mut self, dp: f64) -> Result<(), PhysicsError> {
        self.taken += 1;
        if self.taken > 10 * self.steps {
            return Err(PhysicsError::CushionSolutionNotFound { steps: self.taken });
        }
        let r = self.radius;
        let (sin_a, cos_a) = (self.sin_a, self.cos_a);

        // Slip at the cushion nose (I) and at the cloth (C).
        let vx_i = self.vx + self.wy * r * sin_a - self.wz * r * cos_a;
        let vy_i = -self.vy * sin_a + self.wx * r;
        let vx_c = self.vx - self.wy * r;
        let vy_c = self.vy + self.wx * r;
        let phi = wrap_angle(atan2(vy_i, vx_i));
        let phi_c = wrap_angle(atan2(vy_c, vx_c));
        let (sin_phi, cos_phi) = (sin(phi), cos(phi));
        let (sin_phi_c, cos_phi_c) = (sin(phi_c), cos(phi_c));

        let table = self.mu_s * (sin_a + self.mu_w * sin_phi * cos_a);
        let m = self.mass;
        self.vx -= (1.0 / m) * (self.mu_w * cos_phi + table * cos_phi_c) * dp;
        self.vy -= (1.0 / m)
            * (cos_a - self.mu_w * sin_a * sin_phi + table * sin_phi_c)
            * dp;

        let k = 5.0 / (2.0 * m * r);
        self.wx += -k * (self.mu_w * sin_phi + table * sin_phi_c) * dp;
        self.wy += -k * (self.mu_w * cos_phi * sin_a - table * cos_phi_c) * dp;
        self.wz += k * (self.mu_w * cos_phi * cos_a) * dp;

        self.work += dp * self.vy.abs();

        self.vx = fround(self.vx);
        self.vy = fround(self.vy);
        self.wx = fround(self.wx);
        self.wy = fround(self.wy);
        self.wz = fround(self.wz);
        Ok(())
    }

    pub fn steps_taken(&self) -> u32 {
        self.taken
    }

    /// Outgoing speed in the solver frame.
    pub fn speed(&self) -> f64 {
        sqrt(self.vx * self.vx + self.vy * self.vy)
    }
}

/// Cushion bounce in the canonical frame (+X into the cushion), returning the
/// change in velocity and spin.
pub fn bounce(v: &Vec3, w: &Vec3, p: &Physics) -> Result<Delta, PhysicsError> {
    // Canonical +X maps to solver +Y.
    let mut solver = Mathaven::new(p);
    solver.solve((-v.y, v.x), (-w.y, w.x, w.z))?;
    let v_out = Vec3::new(solver.vy, -solver.vx, v.z);
    let w_out = Vec3::new(solver.wy, -solver.wx, solver.wz);
    Ok(Delta {
        v: v_out - *v,
        w: w_out - *w,
    })
}
