//! Deterministic vector math.
//!
//! Two independently running simulations (authoritative host and predicting
//! client) must land on identical bits. Every transcendental result is
//! rounded to `f32` precision through [`fround`], and the simulation rounds
//! every stored field the same way after each tick.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Round a value to the nearest `f32`, returned as `f64`.
#[inline]
pub fn fround(x: f64) -> f64 {
    x as f32 as f64
}

/// `f32`-rounded square root.
#[inline]
pub fn sqrt(x: f64) -> f64 {
    fround(x.sqrt())
}

/// `f32`-rounded sine.
#[inline]
pub fn sin(x: f64) -> f64 {
    fround(x.sin())
}

/// `f32`-rounded cosine.
#[inline]
pub fn cos(x: f64) -> f64 {
    fround(x.cos())
}

/// `f32`-rounded arcsine.
#[inline]
pub fn asin(x: f64) -> f64 {
    fround(x.asin())
}

/// `f32`-rounded two-argument arctangent.
#[inline]
pub fn atan2(y: f64, x: f64) -> f64 {
    fround(y.atan2(x))
}

/// `f32`-rounded natural exponential.
#[inline]
pub fn exp(x: f64) -> f64 {
    fround(x.exp())
}

/// Sign of `x`: -1, 0 or 1. Unlike [`f64::signum`], zero maps to zero.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// A 3D vector used for positions, velocities, and spin.
///
/// Table coordinates: X along the length, Y along the width, Z up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit vertical axis.
    pub const UP: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn length(&self) -> f64 {
        sqrt(self.length_squared())
    }

    pub fn distance_squared_to(&self, other: &Self) -> f64 {
        (*self - *other).length_squared()
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        (*self - *other).length()
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len == 0.0 { Self::ZERO } else { *self / len }
    }

    /// Linear interpolation toward `other`.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        *self + (*other - *self) * t
    }

    pub fn with_z(&self, z: f64) -> Self {
        Self::new(self.x, self.y, z)
    }

    /// Horizontal length (ignores Z).
    pub fn length_xy(&self) -> f64 {
        sqrt(self.x * self.x + self.y * self.y)
    }

    /// Rotate about the vertical axis by `theta` radians.
    pub fn rotate_z(&self, theta: f64) -> Self {
        let (s, c) = (sin(theta), cos(theta));
        Self {
            x: self.x * c - self.y * s,
            y: self.x * s + self.y * c,
            z: self.z,
        }
    }

    /// Round every component to `f32` precision.
    pub fn fround(&self) -> Self {
        Self::new(fround(self.x), fround(self.y), fround(self.z))
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

/// `ẑ × v`: the in-plane perpendicular used for roll and contact-point velocity.
pub fn up_cross(v: &Vec3) -> Vec3 {
    Vec3::UP.cross(v)
}

/// Normalized copy, zero stays zero.
pub fn norm(v: &Vec3) -> Vec3 {
    v.normalize()
}

/// Whether applying `dv` to `v` would reverse or cancel it.
pub fn passes_through_zero(v: &Vec3, dv: &Vec3) -> bool {
    (*v + *dv).dot(v) <= 0.0
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl MulAssign<f64> for Vec3 {
    fn mul_assign(&mut self, scalar: f64) {
        self.x *= scalar;
        self.y *= scalar;
        self.z *= scalar;
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, scalar: f64) -> Self {
        Self::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fround_matches_f32_cast() {
        let x = 0.1_f64;
        assert_eq!(fround(x), 0.1_f32 as f64);
        assert_ne!(fround(x), x);
        assert_eq!(fround(fround(x)), fround(x));
    }

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(3.5), 1.0);
        assert_eq!(sign(-0.001), -1.0);
    }

    #[test]
    fn cross_product_of_axes() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(&y), Vec3::UP);
        assert_eq!(up_cross(&x), y);
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
        let n = Vec3::new(3.0, 4.0, 0.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = Vec3::new(0.0, 1.0, 0.5).rotate_z(-std::f64::consts::FRAC_PI_2);
        assert!((v.x - 1.0).abs() < 1e-6);
        assert!(v.y.abs() < 1e-6);
        assert_eq!(v.z, 0.5);
    }

    #[test]
    fn passes_through_zero_detects_reversal() {
        let v = Vec3::new(1.0, 0.0, 0.0);
        assert!(passes_through_zero(&v, &Vec3::new(-1.5, 0.0, 0.0)));
        assert!(!passes_through_zero(&v, &Vec3::new(-0.5, 0.0, 0.0)));
        assert!(passes_through_zero(&Vec3::ZERO, &Vec3::ZERO));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rotation_preserves_length(
                x in -10.0f64..10.0,
                y in -10.0f64..10.0,
                theta in -7.0f64..7.0,
            ) {
                let v = Vec3::new(x, y, 0.0);
                let r = v.rotate_z(theta);
                prop_assert!((r.length() - v.length()).abs() < 1e-4 * (1.0 + v.length()));
            }

            #[test]
            fn fround_is_idempotent(x in -1e6f64..1e6) {
                prop_assert_eq!(fround(fround(x)), fround(x));
            }
        }
    }
}
