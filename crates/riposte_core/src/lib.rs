//! # RIPOSTE Core
//!
//! Entity/component bookkeeping and 2-D math for the deterministic
//! fighting-game simulation. This crate carries no game logic:
//!
//! - A dense entity table mapping entity indices to component bitmasks
//! - Per-type component storages that support whole-table value copies
//!   (the rollback core clones entire worlds at validation boundaries)
//! - `Vec2` and the renderer-facing `Transform` component
//!
//! ## Determinism Rules
//!
//! 1. Entity indices are allocated densely and never recycled within a
//!    match, so ascending-index iteration is a stable order
//! 2. Component storages are plain value arrays; copying a world never
//!    aliases the donor
//! 3. No hashing, no pointer-keyed containers anywhere in the state

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ecs;
pub mod math;
pub mod transform;

pub use ecs::{mask, Component, ComponentMask, ComponentStorage, Entity, EntityManager, INVALID_ENTITY};
pub use math::Vec2;
pub use transform::Transform;
