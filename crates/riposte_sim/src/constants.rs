//! Authoritative simulation constants.
//!
//! Every value here is part of the determinism contract: peers compare
//! physics fingerprints bit-exactly, so all of these must match across
//! builds. Tuning happens here and nowhere else.

use riposte_core::Vec2;

/// Player slot index, `0..MAX_PLAYERS`.
pub type PlayerNumber = u8;

/// Sentinel for an unpopulated player slot.
pub const INVALID_PLAYER: PlayerNumber = PlayerNumber::MAX;

/// Simulation frame number. Frame 0 is the shared initial state.
pub type Frame = u32;

/// Maximum number of players in a match.
pub const MAX_PLAYERS: usize = 2;

/// Fixed simulation period in seconds (50 Hz).
pub const FIXED_PERIOD: f32 = 0.02;

/// Input ring depth per player: 5 seconds of frames at 50 Hz.
pub const WINDOW_BUFFER_SIZE: usize = 250;

/// Delay before the match starts, in milliseconds. Owned by the match
/// lifecycle controller; kept here so both sides agree on it.
pub const START_DELAY_MS: u64 = 3000;

/// Initial player health.
pub const PLAYER_HEALTH: i16 = 5;

/// Horizontal walk speed in meters per second.
pub const PLAYER_SPEED: f32 = 2.0;

/// Sustained upward speed while the jump boost is active.
pub const PLAYER_JUMP_SPEED: f32 = 3.0;

/// Duration of the jump boost in seconds.
pub const PLAYER_JUMP_FLY_TIME: f32 = 0.4;

/// Horizontal dash speed in meters per second.
pub const PLAYER_DASH_SPEED: f32 = 10.0;

/// Duration of a dash in seconds.
pub const PLAYER_DASH_TIME: f32 = 0.2;

/// Duration of the stun inflicted by a dash collision, in seconds.
pub const PLAYER_STUN_LENGTH: f32 = 2.0;

/// Lifetime of an attack hitbox in seconds.
pub const ATTACK_PERIOD: f32 = 0.75;

/// Attack hitbox edge length (half-extent is half of this).
pub const ATTACK_SCALE: f32 = 0.2;

/// Player collider half-extent on both axes.
pub const PLAYER_BOX_HALF_EXTENT: f32 = 0.25;

/// Invincibility window granted when a player is hit, in seconds.
pub const PLAYER_INVINCIBILITY_PERIOD: f32 = 1.5;

/// Maximum release-to-press gap that still counts as a double tap.
pub const TIME_TO_DOUBLE_CLICK: f32 = 0.25;

/// Gravitational acceleration.
pub const GRAVITY: Vec2 = Vec2::new(0.0, -9.81);

/// Y coordinate of the ground plane.
pub const GROUND_LEVEL: f32 = -2.0;

/// Horizontal distance a hit player is thrown toward the world origin.
pub const RESPAWN_DISTANCE: f32 = 4.0;

/// Initial player positions by slot.
pub const SPAWN_POSITIONS: [Vec2; MAX_PLAYERS] = [Vec2::new(-0.75, -1.0), Vec2::new(0.75, -1.0)];

/// Initial player rotations in degrees by slot.
pub const SPAWN_ROTATIONS: [f32; MAX_PLAYERS] = [0.0, 180.0];
