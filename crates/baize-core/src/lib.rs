pub mod math;
pub mod net;
pub mod outcome;
pub mod snapshot;
pub mod state;

pub use math::Vec3;
pub use outcome::{BallId, CUE_BALL, Outcome, OutcomeLog, OutcomeType};
pub use snapshot::{BallOverride, BallSnapshot, ShortSnapshot, TableSnapshot};
pub use state::BallState;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::math::Vec3;

    /// Assert two vectors agree component-wise within `tol`.
    pub fn assert_vec_close(actual: Vec3, expected: Vec3, tol: f64) {
        let d = actual - expected;
        assert!(
            d.x.abs() <= tol && d.y.abs() <= tol && d.z.abs() <= tol,
            "vectors differ by more than {tol}: actual={actual:?} expected={expected:?}"
        );
    }

    /// Kinetic energy per unit mass of a solid sphere: `v²/2 + (2/5)R²ω²/2`.
    pub fn specific_kinetic_energy(vel: Vec3, rvel: Vec3, radius: f64) -> f64 {
        0.5 * vel.length_squared() + 0.5 * 0.4 * radius * radius * rvel.length_squared()
    }

    /// Assert the energy after an event does not exceed the energy before it
    /// (with a small relative allowance for `f32` rounding).
    pub fn assert_no_energy_gain(before: f64, after: f64) {
        assert!(
            after <= before * (1.0 + 1e-5) + 1e-12,
            "energy increased: before={before} after={after}"
        );
    }
}
