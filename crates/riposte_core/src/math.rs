//! 2-D math shared by the physics and transform tables.
//!
//! `Vec2` is the canonical representation of positions and velocities in
//! the simulation state; it is `Pod` so that world fingerprints can
//! reinterpret its components as integer words.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 2-D vector - position, velocity, half-extents.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
}

impl Vec2 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// All-ones vector.
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// Creates a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Creates a vector with both components set to `v`.
    #[inline]
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_ops() {
        let mut v = Vec2::new(1.0, -2.0);
        v += Vec2::new(0.5, 0.5) * 2.0;
        assert_eq!(v, Vec2::new(2.0, -1.0));
        assert_eq!(v - Vec2::ONE, Vec2::new(1.0, -2.0));
    }

    #[test]
    fn test_splat() {
        assert_eq!(Vec2::splat(0.25), Vec2::new(0.25, 0.25));
    }
}
