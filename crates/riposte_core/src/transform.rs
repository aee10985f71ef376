//! Renderer-facing transform component.
//!
//! The simulation's source of truth is the physics body table; the
//! transform is a mirror refreshed once per presentation frame so the
//! renderer never reads physics state mid-step.

use crate::ecs::{mask, Component, ComponentMask};
use crate::math::Vec2;

/// Position, scale and rotation as the renderer consumes them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// World-space position in meters.
    pub position: Vec2,
    /// Per-axis scale.
    pub scale: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl Component for Transform {
    const MASK: ComponentMask = mask::TRANSFORM;
}
