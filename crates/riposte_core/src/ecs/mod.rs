//! # Entity Component System
//!
//! Bookkeeping only: entities are dense indices carrying a bitmask of
//! component kinds; the data itself lives in per-type
//! [`ComponentStorage`] tables owned by whoever needs them (the rollback
//! core owns one set per world copy).
//!
//! ## Design Rules
//!
//! - Entity indices are never recycled within a match; iteration in
//!   ascending index order is part of the determinism contract
//! - The entity table is shared by every world copy, component storages
//!   are per-copy

mod component;
mod entity;
mod storage;

pub use component::{mask, Component, ComponentMask};
pub use entity::{Entity, EntityManager, INVALID_ENTITY};
pub use storage::ComponentStorage;
