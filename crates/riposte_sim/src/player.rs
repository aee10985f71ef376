//! Per-player character state machine.
//!
//! Driven purely by the input byte and edge tracking: transitions fire
//! on press edges (bit set now, clear last tick) and the dash double-tap
//! is detected with per-direction release timers. The machine mutates a
//! working copy of the player's body and writes both back at the end of
//! the tick, so mid-tick ordering inside one player never leaks.
//!
//! State dispatch per tick, in priority order:
//!
//! ```text
//! Idle  : ResolveIdle; CanJump → CanDash → CanMove → CanAttack
//! Move  : ResolveMove → CanDash → CanJump → CanAttack
//! Jump  : ResolveJump → CanDash
//! Attack: ResolveAttack
//! Dash  : ResolveDash
//! Stun  : ResolveStun
//! Spawn : ResolveSpawn
//! ```
//!
//! The first step that reports a transition ends the chain.

use riposte_core::{ComponentStorage, Entity, EntityManager, Vec2, INVALID_ENTITY};

use crate::constants::{
    PlayerNumber, ATTACK_PERIOD, GRAVITY, GROUND_LEVEL, INVALID_PLAYER, MAX_PLAYERS,
    PLAYER_DASH_SPEED, PLAYER_DASH_TIME, PLAYER_HEALTH, PLAYER_JUMP_FLY_TIME, PLAYER_JUMP_SPEED,
    PLAYER_SPEED, PLAYER_STUN_LENGTH, RESPAWN_DISTANCE, TIME_TO_DOUBLE_CLICK,
};
use crate::input::PadInput;
use crate::mask;
use crate::physics::Body;
use crate::rollback::PlayerContext;

/// Behavioral state of a player character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    /// Unpopulated slot; the machine never leaves this state.
    #[default]
    Invalid,
    /// Standing still.
    Idle,
    /// Walking left or right.
    Move,
    /// Airborne (boost phase and fall).
    Jump,
    /// Attack hitbox out.
    Attack,
    /// Double-tap burst of horizontal speed.
    Dash,
    /// Stunned after a dash collision.
    Stun,
    /// Was hit; being thrown back toward the origin.
    Spawn,
}

/// Player character component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerCharacter {
    /// Owning player slot.
    pub player_number: PlayerNumber,
    /// Remaining health.
    pub health: i16,
    /// Input byte for the frame being simulated.
    pub input: PadInput,
    /// Current machine state.
    pub state: PlayerState,
    /// Seconds spent in the current state.
    pub state_time: f32,
    /// Seconds of hit invincibility left.
    pub invincibility_time: f32,
    /// Seconds since `LEFT` was last released.
    pub double_click_time_left: f32,
    /// Seconds since `RIGHT` was last released.
    pub double_click_time_right: f32,
    /// `LEFT` bit as of the previous tick.
    pub old_left_pressed: bool,
    /// `RIGHT` bit as of the previous tick.
    pub old_right_pressed: bool,
    /// Facing, updated whenever a direction is held.
    pub facing_right: bool,
}

impl Default for PlayerCharacter {
    fn default() -> Self {
        Self {
            player_number: INVALID_PLAYER,
            health: PLAYER_HEALTH,
            input: PadInput::NONE,
            state: PlayerState::Invalid,
            state_time: 0.0,
            invincibility_time: 0.0,
            // Start outside the window so the first press never dashes.
            double_click_time_left: TIME_TO_DOUBLE_CLICK + 1.0,
            double_click_time_right: TIME_TO_DOUBLE_CLICK + 1.0,
            old_left_pressed: false,
            old_right_pressed: false,
            facing_right: true,
        }
    }
}

impl riposte_core::Component for PlayerCharacter {
    const MASK: riposte_core::ComponentMask = mask::PLAYER;
}

/// Player component table plus the per-tick state machine.
#[derive(Clone, Default)]
pub struct PlayerManager {
    players: ComponentStorage<PlayerCharacter>,
}

impl PlayerManager {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a default (invalid-state) player component.
    pub fn add(&mut self, entities: &mut EntityManager, entity: Entity) {
        entities.add_components(entity, mask::PLAYER);
        self.players.set(entity, PlayerCharacter::default());
    }

    /// Returns a copy of the entity's player component, if present.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<PlayerCharacter> {
        self.players.get(entity).copied()
    }

    /// Mutable access for input injection and collision responses.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut PlayerCharacter> {
        self.players.get_mut(entity)
    }

    /// Overwrites the entity's player component.
    pub fn set(&mut self, entity: Entity, player: PlayerCharacter) {
        self.players.set(entity, player);
    }

    /// Replaces this table with a value copy of `other`.
    pub fn copy_from(&mut self, other: &Self) {
        self.players.copy_from(&other.players);
    }

    /// Runs one machine tick for every populated player slot.
    pub fn fixed_update(&mut self, dt: f32, ctx: &mut PlayerContext<'_>) {
        for slot in 0..MAX_PLAYERS {
            let entity = ctx.player_entities[slot];
            if entity == INVALID_ENTITY || !ctx.entities.has_components(entity, mask::PLAYER) {
                continue;
            }
            let Some(mut body) = ctx.physics.body(entity) else {
                continue;
            };
            let Some(mut player) = self.get(entity) else {
                continue;
            };

            update_double_click_timers(dt, &mut player);
            if player.invincibility_time > 0.0 {
                player.invincibility_time -= dt;
            }

            dispatch(dt, &mut player, &mut body, ctx);

            player.old_left_pressed = player.input.left();
            player.old_right_pressed = player.input.right();

            ctx.physics.set_body(entity, body);
            self.set(entity, player);
        }
    }
}

fn dispatch(dt: f32, player: &mut PlayerCharacter, body: &mut Body, ctx: &mut PlayerContext<'_>) {
    // The chains short-circuit: the first step that transitions wins.
    match player.state {
        PlayerState::Invalid => {}
        PlayerState::Idle => {
            resolve_idle(body);
            let _ = can_jump(player, body)
                || can_dash(player, body)
                || can_move(player, body)
                || can_attack(player, body, ctx);
        }
        PlayerState::Move => {
            let _ = resolve_move(player, body)
                || can_dash(player, body)
                || can_jump(player, body)
                || can_attack(player, body, ctx);
        }
        PlayerState::Jump => {
            let _ = resolve_jump(dt, player, body) || can_dash(player, body);
        }
        PlayerState::Attack => resolve_attack(dt, player, body),
        PlayerState::Dash => {
            let _ = resolve_dash(dt, player, body);
        }
        PlayerState::Stun => resolve_stun(dt, player, body),
        PlayerState::Spawn => resolve_spawn(player, body),
    }
}

/// Release edges reset the matching timer; both timers then age by `dt`,
/// so a timer reads exactly `dt` on the tick after the release.
fn update_double_click_timers(dt: f32, player: &mut PlayerCharacter) {
    if player.old_right_pressed && !player.input.right() {
        player.double_click_time_right = 0.0;
    }
    if player.old_left_pressed && !player.input.left() {
        player.double_click_time_left = 0.0;
    }
    player.double_click_time_right += dt;
    player.double_click_time_left += dt;
}

/// Sets horizontal velocity from the held directions and updates facing.
fn apply_move(player: &mut PlayerCharacter, body: &mut Body) {
    let horizontal = (if player.input.left() { -PLAYER_SPEED } else { 0.0 })
        + (if player.input.right() { PLAYER_SPEED } else { 0.0 });
    body.velocity.x = horizontal;
    if horizontal > 0.0 {
        player.facing_right = true;
    } else if horizontal < 0.0 {
        player.facing_right = false;
    }
}

fn can_jump(player: &mut PlayerCharacter, body: &mut Body) -> bool {
    if player.input.up() {
        player.state = PlayerState::Jump;
        player.state_time = 0.0;
        // Gravity stays inert until the character first leaves the
        // ground; from here on it always applies.
        body.affected_by_gravity = true;
        return true;
    }
    false
}

fn can_dash(player: &mut PlayerCharacter, body: &mut Body) -> bool {
    let left_tap = player.input.left()
        && !player.old_left_pressed
        && player.double_click_time_left <= TIME_TO_DOUBLE_CLICK;
    let right_tap = player.input.right()
        && !player.old_right_pressed
        && player.double_click_time_right <= TIME_TO_DOUBLE_CLICK;
    if left_tap || right_tap {
        let direction = (if player.input.left() { -1.0 } else { 0.0 })
            + (if player.input.right() { 1.0 } else { 0.0 });
        player.state = PlayerState::Dash;
        player.state_time = 0.0;
        body.velocity = Vec2::new(PLAYER_DASH_SPEED * direction, 0.0);
        return true;
    }
    false
}

fn can_move(player: &mut PlayerCharacter, body: &mut Body) -> bool {
    apply_move(player, body);
    if body.velocity.x != 0.0 {
        player.state = PlayerState::Move;
        return true;
    }
    false
}

fn can_attack(player: &mut PlayerCharacter, body: &Body, ctx: &mut PlayerContext<'_>) -> bool {
    if player.input.attack() {
        player.state = PlayerState::Attack;
        player.state_time = 0.0;
        let reach = if player.facing_right { 0.5 } else { -0.5 };
        ctx.spawn_attack(
            player.player_number,
            body.position + Vec2::new(reach, 0.0),
        );
        return true;
    }
    false
}

fn resolve_idle(body: &mut Body) {
    body.velocity.x = 0.0;
}

fn resolve_move(player: &mut PlayerCharacter, body: &mut Body) -> bool {
    apply_move(player, body);
    if body.velocity.x == 0.0 {
        player.state = PlayerState::Idle;
        return true;
    }
    false
}

fn resolve_jump(dt: f32, player: &mut PlayerCharacter, body: &mut Body) -> bool {
    player.state_time += dt;
    apply_move(player, body);
    if player.state_time <= PLAYER_JUMP_FLY_TIME {
        // Counteract the gravity applied later this tick to hold a
        // sustained ascent for the whole boost window.
        body.velocity.y = PLAYER_JUMP_SPEED - GRAVITY.y * dt;
    }
    if player.state_time > PLAYER_JUMP_FLY_TIME && body.position.y <= GROUND_LEVEL {
        if !can_move(player, body) {
            player.state = PlayerState::Idle;
        }
        return true;
    }
    false
}

fn resolve_dash(dt: f32, player: &mut PlayerCharacter, body: &mut Body) -> bool {
    player.state_time += dt;
    if player.state_time >= PLAYER_DASH_TIME {
        if !can_move(player, body) {
            player.state = PlayerState::Idle;
        }
        return true;
    }
    false
}

fn resolve_attack(dt: f32, player: &mut PlayerCharacter, body: &mut Body) {
    apply_move(player, body);
    if player.state_time < ATTACK_PERIOD {
        player.state_time += dt;
    } else if !can_move(player, body) {
        player.state = PlayerState::Idle;
    }
}

fn resolve_stun(dt: f32, player: &mut PlayerCharacter, body: &mut Body) {
    body.velocity.x = 0.0;
    player.state_time += dt;
    if player.state_time >= PLAYER_STUN_LENGTH && !can_move(player, body) {
        player.state = PlayerState::Idle;
    }
}

fn resolve_spawn(player: &mut PlayerCharacter, body: &mut Body) {
    // Thrown back toward the world origin.
    if body.position.x > 0.0 {
        body.position.x -= RESPAWN_DISTANCE;
    } else {
        body.position.x += RESPAWN_DISTANCE;
    }
    if !can_move(player, body) {
        player.state = PlayerState::Idle;
    }
}
