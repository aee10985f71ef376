//! Simulation error types.
//!
//! The core has exactly one recoverable-looking failure: a physics
//! fingerprint mismatch against the server's authoritative state.
//! Everything else in the error taxonomy is either a programmer error
//! (fatal assert) or a transient skip (logged and ignored).

use thiserror::Error;

use crate::constants::{Frame, PlayerNumber};
use crate::rollback::PhysicsState;

/// The locally simulated state diverged from the server's.
///
/// Fatal at the match layer: the session cannot be repaired, only torn
/// down and resynchronized from scratch.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error(
    "physics state diverged for player {player} at frame {frame}: \
     server {server:#010x}, local {local:#010x}"
)]
pub struct DesyncError {
    /// Player slot whose fingerprint diverged.
    pub player: PlayerNumber,
    /// Frame that was being confirmed.
    pub frame: Frame,
    /// Fingerprint reported by the server.
    pub server: PhysicsState,
    /// Fingerprint computed locally.
    pub local: PhysicsState,
}
