use serde::{Deserialize, Serialize};

use baize_core::math::{asin, cos, fround, sqrt};

/// Ball radius in metres (52.5 mm ball).
pub const BALL_RADIUS: f64 = 0.02625;
/// Ball mass in kilograms.
pub const BALL_MASS: f64 = 0.1406;
/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.8;
/// Rolling resistance coefficient.
pub const MU_ROLL: f64 = 0.00985;
/// Ball-cloth sliding friction coefficient.
pub const MU_SLIDE: f64 = 0.16;
/// Ball-cushion friction coefficient (closed-form cushion model).
pub const MU_CUSHION: f64 = 0.85;
/// Effective contact radius for spin about the vertical axis (m).
pub const RHO: f64 = 0.034;
/// Ball-cushion coefficient of restitution.
pub const CUSHION_RESTITUTION: f64 = 0.86;
/// Ball-ball coefficient of restitution.
pub const BALL_RESTITUTION: f64 = 0.99;
/// Ball-cloth sliding friction used by the iterative cushion solver.
pub const MATHAVEN_MU_S: f64 = 0.212;
/// Ball-cushion sliding friction used by the iterative cushion solver.
pub const MATHAVEN_MU_W: f64 = 0.14;
/// Ball-cushion restitution used by the iterative cushion solver.
pub const MATHAVEN_EE: f64 = 0.98;
/// Nominal impulse steps per phase of the iterative cushion solver.
pub const MATHAVEN_STEPS: u32 = 100;
/// Contact-point slip speed below which a sliding ball starts rolling (m/s).
pub const ROLL_TRANSITION: f64 = 0.05;
/// Residual english below which a halting ball is stopped outright (rad/s).
pub const SPIN_STOP_THRESHOLD: f64 = 0.01;

/// Base physical constants, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub radius: f64,
    pub mass: f64,
    pub gravity: f64,
    pub mu_roll: f64,
    pub mu_slide: f64,
    pub mu_cushion: f64,
    pub rho: f64,
    pub cushion_restitution: f64,
    pub ball_restitution: f64,
    pub mathaven_mu_s: f64,
    pub mathaven_mu_w: f64,
    pub mathaven_ee: f64,
    pub mathaven_steps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            mass: BALL_MASS,
            gravity: GRAVITY,
            mu_roll: MU_ROLL,
            mu_slide: MU_SLIDE,
            mu_cushion: MU_CUSHION,
            rho: RHO,
            cushion_restitution: CUSHION_RESTITUTION,
            ball_restitution: BALL_RESTITUTION,
            mathaven_mu_s: MATHAVEN_MU_S,
            mathaven_mu_w: MATHAVEN_MU_W,
            mathaven_ee: MATHAVEN_EE,
            mathaven_steps: MATHAVEN_STEPS,
        }
    }
}

/// Physical constants plus the values derived from them.
///
/// Derived values are recomputed by every setter, so they never go stale.
#[derive(Debug, Clone, PartialEq)]
pub struct Physics {
    base: PhysicsConfig,
    inertia: f64,
    mz: f64,
    mxy: f64,
    sin_a: f64,
    cos_a: f64,
}

impl Default for Physics {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl Physics {
    pub fn new(base: PhysicsConfig) -> Self {
        let mut physics = Self {
            base,
            inertia: 0.0,
            mz: 0.0,
            mxy: 0.0,
            sin_a: 0.0,
            cos_a: 0.0,
        };
        physics.refresh();
        physics
    }

    /// Recompute derived constants from the base set.
    fn refresh(&mut self) {
        let PhysicsConfig {
            radius: r,
            mass: m,
            gravity: g,
            mu_roll: mu,
            rho,
            ..
        } = self.base;
        self.inertia = fround((2.0 / 5.0) * m * r * r);
        self.mz = fround(((mu * m * g * 2.0) / 3.0) * rho);
        self.mxy = fround((7.0 / (5.0 * sqrt(2.0))) * r * mu * m * g);
        // Cushion nose sits at 7R/5 above the cloth.
        let theta_a = asin(fround((7.0 / 5.0) * r - r) / r);
        self.sin_a = fround(theta_a.sin());
        self.cos_a = cos(theta_a);
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.base
    }

    pub fn radius(&self) -> f64 {
        self.base.radius
    }

    pub fn mass(&self) -> f64 {
        self.base.mass
    }

    pub fn gravity(&self) -> f64 {
        self.base.gravity
    }

    pub fn mu_roll(&self) -> f64 {
        self.base.mu_roll
    }

    pub fn mu_slide(&self) -> f64 {
        self.base.mu_slide
    }

    pub fn mu_cushion(&self) -> f64 {
        self.base.mu_cushion
    }

    pub fn rho(&self) -> f64 {
        self.base.rho
    }

    pub fn cushion_restitution(&self) -> f64 {
        self.base.cushion_restitution
    }

    pub fn ball_restitution(&self) -> f64 {
        self.base.ball_restitution
    }

    /// Moment of inertia of a solid ball, `2/5 m R²`.
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Friction torque opposing spin about the vertical axis.
    pub fn mz(&self) -> f64 {
        self.mz
    }

    /// Rolling-resistance torque about the in-plane axes.
    pub fn mxy(&self) -> f64 {
        self.mxy
    }

    /// Sine of the cushion contact angle above the ball equator.
    pub fn sin_a(&self) -> f64 {
        self.sin_a
    }

    /// Cosine of the cushion contact angle above the ball equator.
    pub fn cos_a(&self) -> f64 {
        self.cos_a
    }

    /// `2R`, the centre distance at which two balls touch.
    pub fn contact_distance(&self) -> f64 {
        2.0 * self.base.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.base.radius = radius;
        self.refresh();
    }

    pub fn set_mass(&mut self, mass: f64) {
        self.base.mass = mass;
        self.refresh();
    }

    pub fn set_gravity(&mut self, gravity: f64) {
        self.base.gravity = gravity;
        self.refresh();
    }

    pub fn set_mu_roll(&mut self, mu: f64) {
        self.base.mu_roll = mu;
        self.refresh();
    }

    pub fn set_mu_slide(&mut self, mu: f64) {
        self.base.mu_slide = mu;
        self.refresh();
    }

    pub fn set_mu_cushion(&mut self, mu: f64) {
        self.base.mu_cushion = mu;
        self.refresh();
    }

    pub fn set_rho(&mut self, rho: f64) {
        self.base.rho = rho;
        self.refresh();
    }

    pub fn set_cushion_restitution(&mut self, e: f64) {
        self.base.cushion_restitution = e;
        self.refresh();
    }

    pub fn set_ball_restitution(&mut self, e: f64) {
        self.base.ball_restitution = e;
        self.refresh();
    }
}
