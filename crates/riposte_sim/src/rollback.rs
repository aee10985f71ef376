//! Two-world rollback orchestration.
//!
//! The manager owns a *confirmed* world (the last fully validated
//! state) and a *current* world (the speculative present). Every
//! presentation frame the current world is thrown away, reset to the
//! confirmed world and re-simulated from the buffered inputs - which may
//! include predictions past what the remote player actually sent.
//! Validation replays the same way but promotes the result to the
//! confirmed world and garbage-collects tombstoned entities.
//!
//! Per replayed frame the step order is fixed: inputs are injected,
//! then attacks, players and physics update in that order. The manager
//! itself is the trigger listener of the current physics world, which is
//! where hits and body-vs-body shoving are resolved.
//!
//! Systems never hold a back-pointer to their owner; they borrow
//! capability views ([`EntityReaper`], [`PlayerContext`]) scoped to the
//! frame being stepped.

use riposte_core::{ComponentStorage, Entity, EntityManager, Transform, Vec2, INVALID_ENTITY};

use crate::attack::{Attack, AttackManager};
use crate::constants::{
    Frame, PlayerNumber, ATTACK_PERIOD, ATTACK_SCALE, FIXED_PERIOD, MAX_PLAYERS,
    PLAYER_BOX_HALF_EXTENT, PLAYER_INVINCIBILITY_PERIOD,
};
use crate::error::DesyncError;
use crate::input::{InputRing, PadInput};
use crate::mask;
use crate::physics::{Body, BoxCollider, PhysicsWorld, TriggerListener};
use crate::player::{PlayerCharacter, PlayerManager, PlayerState};

/// Physics fingerprint: the player body's kinematic fields reinterpreted
/// as `u32` words and summed with wrapping arithmetic. Peers at the same
/// validated frame must agree bit-exactly.
pub type PhysicsState = u32;

/// An entity spawned since the last validation, and when.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CreatedEntity {
    pub(crate) entity: Entity,
    pub(crate) created_frame: Frame,
}

/// One full copy of the simulated state (everything that rolls back).
#[derive(Clone, Default)]
struct WorldState {
    physics: PhysicsWorld,
    players: PlayerManager,
    attacks: AttackManager,
}

impl WorldState {
    fn copy_from(&mut self, other: &Self) {
        self.attacks.copy_from(&other.attacks);
        self.physics.copy_from(&other.physics);
        self.players.copy_from(&other.players);
    }
}

/// Destroy capability handed to the attack system while it steps.
///
/// Entities spawned inside the current rollback window are destroyed
/// outright (the next replay recreates them if needed); anything older
/// is tombstoned and garbage-collected at the next validation.
pub struct EntityReaper<'a> {
    pub(crate) entities: &'a mut EntityManager,
    created: &'a [CreatedEntity],
}

impl<'a> EntityReaper<'a> {
    pub(crate) fn new(entities: &'a mut EntityManager, created: &'a [CreatedEntity]) -> Self {
        Self { entities, created }
    }

    /// Destroys an expired or consumed attack hitbox.
    pub fn destroy_attack_box(&mut self, entity: Entity) {
        destroy_in(self.entities, self.created, entity);
    }
}

/// World view handed to the player state machine while it steps.
///
/// Bundles the mutable halves of the current world the machine needs:
/// bodies to steer and the spawn capability for attack hitboxes.
pub struct PlayerContext<'a> {
    pub(crate) entities: &'a mut EntityManager,
    pub(crate) physics: &'a mut PhysicsWorld,
    pub(crate) attacks: &'a mut AttackManager,
    pub(crate) transforms: &'a mut ComponentStorage<Transform>,
    pub(crate) created: &'a mut Vec<CreatedEntity>,
    pub(crate) tested_frame: Frame,
    pub(crate) player_entities: &'a [Entity; MAX_PLAYERS],
}

impl<'a> PlayerContext<'a> {
    pub(crate) fn new(
        entities: &'a mut EntityManager,
        physics: &'a mut PhysicsWorld,
        attacks: &'a mut AttackManager,
        transforms: &'a mut ComponentStorage<Transform>,
        created: &'a mut Vec<CreatedEntity>,
        tested_frame: Frame,
        player_entities: &'a [Entity; MAX_PLAYERS],
    ) -> Self {
        Self {
            entities,
            physics,
            attacks,
            transforms,
            created,
            tested_frame,
            player_entities,
        }
    }

    /// Spawns an attack hitbox in the current world and logs the
    /// creation against the frame being simulated.
    pub(crate) fn spawn_attack(&mut self, owner: PlayerNumber, position: Vec2) -> Entity {
        let entity = self.entities.create_entity();
        self.install_attack(owner, entity, position);
        entity
    }

    pub(crate) fn install_attack(&mut self, owner: PlayerNumber, entity: Entity, position: Vec2) {
        self.created.push(CreatedEntity {
            entity,
            created_frame: self.tested_frame,
        });

        self.attacks.add(self.entities, entity);
        self.attacks.set(
            entity,
            Attack {
                remaining_time: ATTACK_PERIOD,
                owner,
            },
        );

        self.physics.add_body(self.entities, entity);
        self.physics.set_body(
            entity,
            Body {
                position,
                ..Body::default()
            },
        );
        self.physics.add_box(self.entities, entity);
        self.physics.set_box(
            entity,
            BoxCollider {
                extents: Vec2::splat(ATTACK_SCALE * 0.5),
                is_trigger: true,
            },
        );

        self.entities.add_components(entity, mask::TRANSFORM);
        self.transforms.set(
            entity,
            Transform {
                position,
                scale: Vec2::splat(ATTACK_SCALE),
                rotation: 0.0,
            },
        );
    }
}

/// Trigger listener of the current world: hits and player shoving.
struct ContactResponder<'a> {
    players: &'a mut PlayerManager,
    attacks: &'a mut AttackManager,
    created: &'a [CreatedEntity],
}

impl<'a> ContactResponder<'a> {
    fn new(
        players: &'a mut PlayerManager,
        attacks: &'a mut AttackManager,
        created: &'a [CreatedEntity],
    ) -> Self {
        Self {
            players,
            attacks,
            created,
        }
    }

    fn player_hit_by_attack(
        &mut self,
        entities: &mut EntityManager,
        player_entity: Entity,
        attack_entity: Entity,
    ) {
        let Some(attack) = self.attacks.get(attack_entity) else {
            return;
        };
        let Some(mut player) = self.players.get(player_entity) else {
            return;
        };
        if player.player_number == attack.owner {
            return;
        }
        destroy_in(entities, self.created, attack_entity);
        if player.invincibility_time <= 0.0 {
            tracing::debug!(player = player.player_number, "player hit by attack");
            player.state = PlayerState::Spawn;
            player.state_time = 0.0;
            player.invincibility_time = PLAYER_INVINCIBILITY_PERIOD;
        }
        self.players.set(player_entity, player);
    }

    /// Splits the smaller-axis overlap evenly between the two bodies,
    /// kills the velocity components pointing into each other, and
    /// stuns anyone who was dashing.
    #[allow(clippy::float_cmp)] // side selection uses the exact overlap identity
    fn separate_players(&mut self, physics: &mut PhysicsWorld, first: Entity, second: Entity) {
        let (Some(mut first_body), Some(first_box)) =
            (physics.body(first), physics.box_collider(first))
        else {
            return;
        };
        let (Some(mut second_body), Some(second_box)) =
            (physics.body(second), physics.box_collider(second))
        else {
            return;
        };

        let first_max = first_body.position + first_box.extents;
        let first_min = first_body.position - first_box.extents;
        let second_max = second_body.position + second_box.extents;
        let second_min = second_body.position - second_box.extents;

        let overlap_y = (first_max.y - second_min.y).min(second_max.y - first_min.y);
        let overlap_x = (first_max.x - second_min.x).min(second_max.x - first_min.x);

        if overlap_y <= overlap_x {
            let half = overlap_y / 2.0;
            if overlap_y == first_max.y - second_min.y {
                // First body is the lower one.
                first_body.position.y -= half;
                second_body.position.y += half;
                if first_body.velocity.y > 0.0 {
                    first_body.velocity.y = 0.0;
                }
                if second_body.velocity.y < 0.0 {
                    second_body.velocity.y = 0.0;
                }
            } else {
                first_body.position.y += half;
                second_body.position.y -= half;
                if first_body.velocity.y < 0.0 {
                    first_body.velocity.y = 0.0;
                }
                if second_body.velocity.y > 0.0 {
                    second_body.velocity.y = 0.0;
                }
            }
        } else {
            let half = overlap_x / 2.0;
            if overlap_x == first_max.x - second_min.x {
                // First body is the left one.
                first_body.position.x -= half;
                second_body.position.x += half;
                if first_body.velocity.x > 0.0 {
                    first_body.velocity.x = 0.0;
                }
                if second_body.velocity.x < 0.0 {
                    second_body.velocity.x = 0.0;
                }
            } else {
                first_body.position.x += half;
                second_body.position.x -= half;
                if first_body.velocity.x < 0.0 {
                    first_body.velocity.x = 0.0;
                }
                if second_body.velocity.x > 0.0 {
                    second_body.velocity.x = 0.0;
                }
            }
        }

        physics.set_body(first, first_body);
        physics.set_body(second, second_body);

        for entity in [first, second] {
            if let Some(player) = self.players.get_mut(entity) {
                if player.state == PlayerState::Dash {
                    player.state = PlayerState::Stun;
                    player.state_time = 0.0;
                }
            }
        }
    }
}

impl TriggerListener for ContactResponder<'_> {
    fn on_trigger(
        &mut self,
        entities: &mut EntityManager,
        physics: &mut PhysicsWorld,
        entity_a: Entity,
        entity_b: Entity,
    ) {
        if entities.has_components(entity_a, mask::PLAYER)
            && entities.has_components(entity_b, mask::ATTACK)
        {
            self.player_hit_by_attack(entities, entity_a, entity_b);
        }
        if entities.has_components(entity_b, mask::PLAYER)
            && entities.has_components(entity_a, mask::ATTACK)
        {
            self.player_hit_by_attack(entities, entity_b, entity_a);
        }
        if entities.has_components(entity_a, mask::PLAYER)
            && entities.has_components(entity_b, mask::PLAYER)
        {
            self.separate_players(physics, entity_a, entity_b);
        }
    }
}

fn destroy_in(entities: &mut EntityManager, created: &[CreatedEntity], entity: Entity) {
    // Entities born inside the rollback window need no tombstone; a
    // replay from the confirmed world recreates them from scratch.
    if created.iter().any(|c| c.entity == entity) {
        entities.destroy(entity);
    } else {
        entities.add_components(entity, mask::DESTROYED);
    }
}

/// The rollback orchestrator. See the module docs for the life cycle.
pub struct RollbackManager {
    entities: EntityManager,
    player_entities: [Entity; MAX_PLAYERS],
    current: WorldState,
    confirmed: WorldState,
    transforms: ComponentStorage<Transform>,
    inputs: [InputRing; MAX_PLAYERS],
    last_received_frame: [Frame; MAX_PLAYERS],
    created_entities: Vec<CreatedEntity>,
    current_frame: Frame,
    last_validate_frame: Frame,
    tested_frame: Frame,
}

impl RollbackManager {
    /// Creates a manager at frame 0 with no players spawned.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: EntityManager::new(),
            player_entities: [INVALID_ENTITY; MAX_PLAYERS],
            current: WorldState::default(),
            confirmed: WorldState::default(),
            transforms: ComponentStorage::new(),
            inputs: std::array::from_fn(|_| InputRing::new()),
            last_received_frame: [0; MAX_PLAYERS],
            created_entities: Vec::new(),
            current_frame: 0,
            last_validate_frame: 0,
            tested_frame: 0,
        }
    }

    /// Allocates a fresh entity index.
    pub fn create_entity(&mut self) -> Entity {
        self.entities.create_entity()
    }

    /// Read access to the entity table (masks, counts).
    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// The local present: the newest frame any input has named.
    #[must_use]
    pub fn current_frame(&self) -> Frame {
        self.current_frame
    }

    /// The newest frame whose simulation is fully confirmed.
    #[must_use]
    pub fn last_validate_frame(&self) -> Frame {
        self.last_validate_frame
    }

    /// The newest frame for which this player's real input has arrived.
    #[must_use]
    pub fn last_received_frame(&self, player: PlayerNumber) -> Frame {
        self.last_received_frame[player as usize]
    }

    /// Entity mapped to the player slot ([`INVALID_ENTITY`] if unset).
    #[must_use]
    pub fn entity_of_player(&self, player: PlayerNumber) -> Entity {
        self.player_entities[player as usize]
    }

    /// The input sample buffered for `frame`.
    ///
    /// # Panics
    ///
    /// Panics if the frame is in the future or has left the rollback
    /// window; both are programmer errors.
    #[must_use]
    pub fn input_at_frame(&self, player: PlayerNumber, frame: Frame) -> PadInput {
        assert!(
            frame <= self.current_frame,
            "input for future frame {frame} requested (current frame {})",
            self.current_frame
        );
        let offset = (self.current_frame - frame) as usize;
        self.inputs[player as usize].sample(offset)
    }

    /// Buffers an input sample for `(player, frame)`.
    ///
    /// A frame newer than the current one advances the local present
    /// (aging every ring); a frame newer than the player's watermark
    /// also rewrites the predicted slots above it, on the assumption the
    /// newest known input holds.
    pub fn set_player_input(&mut self, player: PlayerNumber, input: PadInput, frame: Frame) {
        if self.current_frame < frame {
            self.start_new_frame(frame);
        }
        let offset = (self.current_frame - frame) as usize;
        self.inputs[player as usize].set(offset, input);
        if self.last_received_frame[player as usize] < frame {
            self.last_received_frame[player as usize] = frame;
            self.inputs[player as usize].backfill_newest(offset, input);
        }
    }

    /// Advances the local present to `new_frame` (no-op if not newer).
    pub fn start_new_frame(&mut self, new_frame: Frame) {
        if new_frame <= self.current_frame {
            return;
        }
        let delta = (new_frame - self.current_frame) as usize;
        for ring in &mut self.inputs {
            ring.shift_right(delta);
        }
        self.current_frame = new_frame;
    }

    /// Rebuilds the current world: rolls back to the confirmed state,
    /// replays every frame up to the present from the buffered inputs,
    /// then mirrors body poses into the transforms for the renderer.
    pub fn simulate_to_current_frame(&mut self) {
        let current_frame = self.current_frame;
        let last_validate_frame = self.last_validate_frame;

        self.destroy_entities_created_after(last_validate_frame);
        self.created_entities.clear();
        self.clear_destroyed_flags();
        self.current.copy_from(&self.confirmed);

        self.replay_frames(last_validate_frame, current_frame);
        self.refresh_transforms();
    }

    /// Replays through `frame` and promotes the result to the confirmed
    /// world, garbage-collecting every tombstoned entity.
    ///
    /// # Panics
    ///
    /// Panics if any player's inputs have not arrived through `frame`;
    /// validating on predictions is a programmer error.
    pub fn validate_frame(&mut self, frame: Frame) {
        for slot in 0..MAX_PLAYERS {
            assert!(
                self.last_received_frame[slot] >= frame,
                "cannot validate frame {frame}: player {slot} inputs only received through {}",
                self.last_received_frame[slot]
            );
        }
        let last_validate_frame = self.last_validate_frame;

        self.destroy_entities_created_after(last_validate_frame);
        self.created_entities.clear();
        self.clear_destroyed_flags();
        self.current.copy_from(&self.confirmed);

        self.replay_frames(last_validate_frame, frame);

        self.reap_tombstones();
        self.confirmed.copy_from(&self.current);
        self.last_validate_frame = frame;
        self.created_entities.clear();
    }

    /// Validates through `frame`, then checks every player's physics
    /// fingerprint against the server's authoritative values.
    ///
    /// # Errors
    ///
    /// Returns [`DesyncError`] on the first mismatching player; the
    /// match cannot continue past a desync.
    pub fn confirm_frame(
        &mut self,
        frame: Frame,
        server_states: &[PhysicsState; MAX_PLAYERS],
    ) -> Result<(), DesyncError> {
        self.validate_frame(frame);
        for slot in 0..MAX_PLAYERS {
            let player = slot as PlayerNumber;
            let local = self.confirmed_physics_state(player);
            let server = server_states[slot];
            if server != local {
                return Err(DesyncError {
                    player,
                    frame,
                    server,
                    local,
                });
            }
        }
        Ok(())
    }

    /// Fingerprint of the player's confirmed body: position, velocity,
    /// rotation and angular velocity as wrapping-summed `u32` words.
    ///
    /// # Panics
    ///
    /// Panics if the player slot has no body in the confirmed world.
    #[must_use]
    pub fn confirmed_physics_state(&self, player: PlayerNumber) -> PhysicsState {
        let entity = self.player_entities[player as usize];
        let Some(body) = self.confirmed.physics.body(entity) else {
            panic!("physics fingerprint requested for unmapped player {player}");
        };
        let words: [f32; 6] = [
            body.position.x,
            body.position.y,
            body.velocity.x,
            body.velocity.y,
            body.rotation,
            body.angular_velocity,
        ];
        bytemuck::cast::<[f32; 6], [u32; 6]>(words)
            .iter()
            .fold(0u32, |state, word| state.wrapping_add(*word))
    }

    /// Installs a player in *both* worlds. Players live for the whole
    /// match and never enter the created-entity log.
    pub fn spawn_player(
        &mut self,
        player: PlayerNumber,
        entity: Entity,
        position: Vec2,
        rotation: f32,
    ) {
        let body = Body {
            position,
            rotation,
            ..Body::default()
        };
        let collider = BoxCollider {
            extents: Vec2::splat(PLAYER_BOX_HALF_EXTENT),
            is_trigger: false,
        };
        let character = PlayerCharacter {
            player_number: player,
            state: PlayerState::Idle,
            ..PlayerCharacter::default()
        };

        for world in [&mut self.current, &mut self.confirmed] {
            world.players.add(&mut self.entities, entity);
            world.players.set(entity, character);
            world.physics.add_body(&mut self.entities, entity);
            world.physics.set_body(entity, body);
            world.physics.add_box(&mut self.entities, entity);
            world.physics.set_box(entity, collider);
        }

        self.entities.add_components(entity, mask::TRANSFORM);
        self.transforms.set(
            entity,
            Transform {
                position,
                scale: Vec2::ONE,
                rotation,
            },
        );
        self.player_entities[player as usize] = entity;
    }

    /// Installs an attack hitbox in the current world only and logs the
    /// creation; the next validation either promotes or discards it.
    pub fn spawn_attack(&mut self, player: PlayerNumber, entity: Entity, position: Vec2) {
        let Self {
            entities,
            current,
            created_entities,
            transforms,
            player_entities,
            tested_frame,
            ..
        } = self;
        let WorldState {
            physics, attacks, ..
        } = current;
        let mut ctx = PlayerContext::new(
            entities,
            physics,
            attacks,
            transforms,
            created_entities,
            *tested_frame,
            player_entities,
        );
        ctx.install_attack(player, entity, position);
    }

    /// Destroys an entity: outright if it was spawned inside the
    /// rollback window, by tombstone otherwise.
    pub fn destroy_entity(&mut self, entity: Entity) {
        destroy_in(&mut self.entities, &self.created_entities, entity);
    }

    /// Player component in the current (presentation) world.
    #[must_use]
    pub fn current_player(&self, player: PlayerNumber) -> Option<PlayerCharacter> {
        self.current.players.get(self.player_entities[player as usize])
    }

    /// Player body in the current (presentation) world.
    #[must_use]
    pub fn current_player_body(&self, player: PlayerNumber) -> Option<Body> {
        self.current.physics.body(self.player_entities[player as usize])
    }

    /// Player body in the confirmed world.
    #[must_use]
    pub fn confirmed_player_body(&self, player: PlayerNumber) -> Option<Body> {
        self.confirmed.physics.body(self.player_entities[player as usize])
    }

    /// Any entity's body in the current world.
    #[must_use]
    pub fn current_body(&self, entity: Entity) -> Option<Body> {
        self.current.physics.body(entity)
    }

    /// Any entity's attack component in the current world.
    #[must_use]
    pub fn current_attack(&self, entity: Entity) -> Option<Attack> {
        self.current.attacks.get(entity)
    }

    /// Renderer-facing transform of an entity.
    #[must_use]
    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        self.transforms.get(entity).copied()
    }

    fn destroy_entities_created_after(&mut self, frame: Frame) {
        let Self {
            entities,
            created_entities,
            ..
        } = self;
        for created in created_entities.iter() {
            if created.created_frame > frame {
                entities.destroy(created.entity);
            }
        }
    }

    fn clear_destroyed_flags(&mut self) {
        for entity in 0..self.entities.entity_count() {
            if self.entities.has_components(entity, mask::DESTROYED) {
                self.entities.remove_components(entity, mask::DESTROYED);
            }
        }
    }

    fn reap_tombstones(&mut self) {
        for entity in 0..self.entities.entity_count() {
            if self.entities.has_components(entity, mask::DESTROYED) {
                self.entities.destroy(entity);
            }
        }
    }

    fn replay_frames(&mut self, from_exclusive: Frame, to_inclusive: Frame) {
        for frame in (from_exclusive + 1)..=to_inclusive {
            self.tested_frame = frame;

            for slot in 0..MAX_PLAYERS {
                let player = slot as PlayerNumber;
                let entity = self.player_entities[slot];
                if entity == INVALID_ENTITY
                    || !self.entities.has_components(entity, mask::PLAYER)
                {
                    tracing::warn!(player, frame, "no entity mapped for player slot, skipping");
                    continue;
                }
                let input = self.input_at_frame(player, frame);
                if let Some(character) = self.current.players.get_mut(entity) {
                    character.input = input;
                }
            }

            let Self {
                entities,
                current,
                created_entities,
                transforms,
                player_entities,
                ..
            } = self;
            let WorldState {
                physics,
                players,
                attacks,
            } = current;

            {
                let mut reaper = EntityReaper::new(entities, created_entities);
                attacks.fixed_update(FIXED_PERIOD, &mut reaper);
            }
            {
                let mut ctx = PlayerContext::new(
                    entities,
                    physics,
                    attacks,
                    transforms,
                    created_entities,
                    frame,
                    player_entities,
                );
                players.fixed_update(FIXED_PERIOD, &mut ctx);
            }
            {
                let mut responder = ContactResponder::new(players, attacks, created_entities);
                physics.fixed_update(FIXED_PERIOD, entities, &mut responder);
            }
        }
    }

    fn refresh_transforms(&mut self) {
        let Self {
            entities,
            current,
            transforms,
            ..
        } = self;
        for entity in 0..entities.entity_count() {
            if !entities.has_components(entity, mask::BODY | mask::TRANSFORM) {
                continue;
            }
            let Some(body) = current.physics.body(entity) else {
                continue;
            };
            if let Some(transform) = transforms.get_mut(entity) {
                transform.position = body.position;
                transform.rotation = body.rotation;
            }
        }
    }
}

impl Default for RollbackManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SPAWN_POSITIONS, SPAWN_ROTATIONS};

    fn test_match() -> RollbackManager {
        let mut rollback = RollbackManager::new();
        for slot in 0..MAX_PLAYERS {
            let entity = rollback.create_entity();
            rollback.spawn_player(
                slot as PlayerNumber,
                entity,
                SPAWN_POSITIONS[slot],
                SPAWN_ROTATIONS[slot],
            );
        }
        rollback
    }

    fn tick(rollback: &mut RollbackManager, inputs: [PadInput; MAX_PLAYERS]) {
        let frame = rollback.current_frame() + 1;
        for (slot, input) in inputs.iter().enumerate() {
            rollback.set_player_input(slot as PlayerNumber, *input, frame);
        }
        rollback.simulate_to_current_frame();
    }

    #[test]
    fn test_missing_inputs_are_predicted_from_last_known() {
        let mut rollback = test_match();
        rollback.set_player_input(0, PadInput::new(PadInput::RIGHT), 1);
        rollback.set_player_input(0, PadInput::new(PadInput::LEFT), 4);

        // Frames 2 and 3 were never received: the frame-1 sample holds.
        assert_eq!(rollback.input_at_frame(0, 1), PadInput::new(PadInput::RIGHT));
        assert_eq!(rollback.input_at_frame(0, 2), PadInput::new(PadInput::RIGHT));
        assert_eq!(rollback.input_at_frame(0, 3), PadInput::new(PadInput::RIGHT));
        assert_eq!(rollback.input_at_frame(0, 4), PadInput::new(PadInput::LEFT));
    }

    #[test]
    fn test_late_input_rewrites_old_slot_without_backfill() {
        let mut rollback = test_match();
        rollback.set_player_input(0, PadInput::new(PadInput::RIGHT), 5);
        rollback.set_player_input(0, PadInput::new(PadInput::UP), 2);

        assert_eq!(rollback.input_at_frame(0, 2), PadInput::new(PadInput::UP));
        // Newer slots keep their values: the watermark never moves back.
        assert_eq!(rollback.input_at_frame(0, 3), PadInput::NONE);
        assert_eq!(rollback.input_at_frame(0, 5), PadInput::new(PadInput::RIGHT));
        assert_eq!(rollback.last_received_frame(0), 5);
    }

    #[test]
    fn test_speculative_attack_is_rolled_back_and_respawned() {
        let mut rollback = test_match();
        tick(
            &mut rollback,
            [PadInput::new(PadInput::ATTACK), PadInput::NONE],
        );

        // Entities 0 and 1 are the players; the hitbox came after.
        let first_hitbox = 2;
        assert!(rollback.entities().has_components(first_hitbox, mask::ATTACK));

        // Re-simulating rolls the speculative spawn back and replays it
        // onto a fresh index (entity indices are never recycled).
        rollback.simulate_to_current_frame();
        assert_eq!(rollback.entities().mask(first_hitbox), 0);
        assert!(rollback.entities().has_components(3, mask::ATTACK));
    }

    #[test]
    fn test_validation_promotes_attack_to_confirmed_world() {
        let mut rollback = test_match();
        tick(
            &mut rollback,
            [PadInput::new(PadInput::ATTACK), PadInput::NONE],
        );
        rollback.validate_frame(1);

        // Validation discarded the speculative hitbox (entity 2) and
        // replayed the frame, spawning the confirmed one on entity 3.
        // Re-simulating no longer touches it.
        rollback.simulate_to_current_frame();
        assert_eq!(rollback.entities().mask(2), 0);
        assert!(rollback.entities().has_components(3, mask::ATTACK));
        assert!(rollback.current_attack(3).is_some());
        assert_eq!(rollback.last_validate_frame(), 1);
    }

    #[test]
    fn test_spawn_attack_installs_into_current_world_only() {
        let mut rollback = test_match();
        let hitbox = rollback.create_entity();
        let position = Vec2::new(-0.25, -1.0);
        rollback.spawn_attack(0, hitbox, position);

        assert!(rollback.entities().has_components(
            hitbox,
            mask::ATTACK | mask::BODY | mask::BOX_COLLIDER | mask::TRANSFORM
        ));

        let attack = rollback.current_attack(hitbox).unwrap();
        assert_eq!(attack.owner, 0);
        assert_eq!(attack.remaining_time, ATTACK_PERIOD);
        assert_eq!(rollback.current_body(hitbox).unwrap().position, position);
        let collider = rollback.current.physics.box_collider(hitbox).unwrap();
        assert_eq!(collider.extents, Vec2::splat(ATTACK_SCALE * 0.5));

        let transform = rollback.transform(hitbox).unwrap();
        assert_eq!(transform.position, position);
        assert_eq!(transform.scale, Vec2::splat(ATTACK_SCALE));

        // The confirmed world has never heard of the hitbox; the next
        // validation decides whether it survives.
        assert!(rollback.confirmed.attacks.get(hitbox).is_none());
        assert!(rollback.confirmed.physics.body(hitbox).is_none());

        // The creation is logged against the frame being simulated.
        assert_eq!(
            rollback.created_entities,
            vec![CreatedEntity {
                entity: hitbox,
                created_frame: rollback.tested_frame,
            }]
        );
    }

    #[test]
    fn test_destroy_entity_outside_window_is_deferred() {
        let mut rollback = test_match();
        let bystander = rollback.create_entity();
        let entities = rollback.entities();
        assert_eq!(entities.mask(bystander), 0);

        rollback.destroy_entity(bystander);
        assert!(rollback
            .entities()
            .has_components(bystander, mask::DESTROYED));
    }

    #[test]
    fn test_confirm_frame_agrees_between_identical_peers() {
        let mut local = test_match();
        let mut remote = test_match();
        let script = [
            [PadInput::new(PadInput::RIGHT), PadInput::new(PadInput::UP)],
            [PadInput::new(PadInput::RIGHT), PadInput::NONE],
            [PadInput::NONE, PadInput::new(PadInput::LEFT)],
        ];
        for peer in [&mut local, &mut remote] {
            for inputs in script {
                tick(peer, inputs);
            }
        }

        // Remote validates first so its confirmed world is at frame 3.
        remote.validate_frame(3);
        let states = [
            remote.confirmed_physics_state(0),
            remote.confirmed_physics_state(1),
        ];
        assert!(local.confirm_frame(3, &states).is_ok());
    }

    #[test]
    fn test_confirm_frame_detects_divergence() {
        let mut local = test_match();
        tick(&mut local, [PadInput::new(PadInput::RIGHT), PadInput::NONE]);

        let mut states = [0; MAX_PLAYERS];
        local.validate_frame(1);
        states[0] = local.confirmed_physics_state(0);
        states[1] = local.confirmed_physics_state(1).wrapping_add(1);

        let err = local.confirm_frame(1, &states).unwrap_err();
        assert_eq!(err.player, 1);
        assert_eq!(err.frame, 1);
    }

    #[test]
    #[should_panic(expected = "cannot validate")]
    fn test_validating_without_inputs_is_fatal() {
        let mut rollback = test_match();
        rollback.set_player_input(0, PadInput::NONE, 3);
        // Player 1 never sent anything past frame 0.
        rollback.validate_frame(3);
    }
}
