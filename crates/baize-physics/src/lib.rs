//! Deterministic billiards physics.
//!
//! Two instances fed the same inputs produce bit-identical tables: dynamic
//! state is rounded to `f32` after every step and all transcendental
//! functions go through `baize_core::math`.

pub mod ball;
pub mod collision;
pub mod config;
pub mod constants;
pub mod cushion;
pub mod error;
pub mod kinematics;
pub mod knuckle;
pub mod layout;
pub mod pocket;
pub mod rack;
pub mod table;

pub use ball::Ball;
pub use config::SimConfig;
pub use constants::{Physics, PhysicsConfig};
pub use cushion::CushionModel;
pub use error::PhysicsError;
pub use layout::{LayoutKind, TableLayout};
pub use table::Table;
