//! # RIPOSTE Simulation
//!
//! The deterministic rollback core of a two-player 2-D fighting game.
//!
//! ## Architecture
//!
//! ```text
//!            set_player_input / validate_frame / confirm_frame
//!                              │
//!                    ┌─────────▼─────────┐
//!                    │  RollbackManager  │  input rings, frame counters,
//!                    │                   │  created-entity log
//!                    │  ┌─────────────┐  │
//!                    │  │  confirmed  │  │  last validated state
//!                    │  └─────────────┘  │
//!                    │  ┌─────────────┐  │  deep-copied from confirmed,
//!                    │  │   current   │  │  replayed every presentation
//!                    │  └─────────────┘  │  frame
//!                    └─────────┬─────────┘
//!                              │ per replayed frame:
//!                              │ attacks → players → physics
//!                              ▼
//!                  transforms read by the renderer
//! ```
//!
//! ## Determinism Rules
//!
//! 1. Fixed 50 Hz step; every quantity is a function of the shared
//!    initial state and the per-frame input bytes
//! 2. Ascending entity order everywhere, trigger dispatch inline and
//!    sequential, floating-point evaluation order fixed
//! 3. Peers at the same validated frame must produce bit-identical
//!    physics fingerprints; a mismatch is a desync and ends the match

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod attack;
pub mod constants;
pub mod error;
pub mod input;
pub mod physics;
pub mod player;
pub mod replay;
pub mod rollback;

/// Component kind bits used by the simulation: the core engine bits
/// re-exported, plus the game-level kinds stacked on `OTHER_BASE`.
pub mod mask {
    pub use riposte_core::mask::{BODY, BOX_COLLIDER, TRANSFORM};

    use riposte_core::mask::OTHER_BASE;
    use riposte_core::ComponentMask;

    /// Player character (state machine component).
    pub const PLAYER: ComponentMask = OTHER_BASE;
    /// Short-lived attack hitbox.
    pub const ATTACK: ComponentMask = OTHER_BASE << 1;
    /// Tombstone: logically removed, hard-destroyed at the next
    /// validation pass.
    pub const DESTROYED: ComponentMask = OTHER_BASE << 2;
}

pub use attack::{Attack, AttackManager};
pub use constants::{Frame, PlayerNumber, INVALID_PLAYER, MAX_PLAYERS};
pub use error::DesyncError;
pub use input::{InputRing, PadInput};
pub use physics::{Body, BodyType, BoxCollider, PhysicsWorld, TriggerListener};
pub use player::{PlayerCharacter, PlayerManager, PlayerState};
pub use replay::InputTrace;
pub use rollback::{PhysicsState, RollbackManager};
