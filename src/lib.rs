//! # RIPOSTE
//!
//! Deterministic rollback simulation core for a two-player 2-D fighting
//! game: fixed-step physics, an edge-triggered player state machine,
//! ephemeral attack hitboxes and a confirmed/speculative world pair that
//! re-simulates whenever inputs arrive for frames older than the local
//! present.
//!
//! This facade re-exports the engine crates; the heavy lifting lives in
//! [`riposte_core`] (entity/component plumbing) and [`riposte_sim`]
//! (the simulation itself).

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub use riposte_core::{
    mask as core_mask, Component, ComponentMask, ComponentStorage, Entity, EntityManager,
    Transform, Vec2, INVALID_ENTITY,
};
pub use riposte_sim::{
    constants, mask, Attack, AttackManager, Body, BodyType, BoxCollider, DesyncError, Frame,
    InputRing, InputTrace, PadInput, PhysicsState, PhysicsWorld, PlayerCharacter, PlayerManager,
    PlayerNumber, PlayerState, RollbackManager, TriggerListener, INVALID_PLAYER, MAX_PLAYERS,
};
