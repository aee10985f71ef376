//! Attack hitbox lifetimes.
//!
//! An attack is a short-lived trigger box owned by the player that
//! spawned it. The manager only counts lifetimes down; contact effects
//! live in the rollback manager's trigger listener.

use riposte_core::{ComponentStorage, Entity, EntityManager};

use crate::constants::{PlayerNumber, INVALID_PLAYER};
use crate::mask;
use crate::rollback::EntityReaper;

/// Remaining lifetime and ownership of one attack hitbox.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attack {
    /// Seconds until the hitbox expires.
    pub remaining_time: f32,
    /// Player that spawned the hitbox; it never hits its owner.
    pub owner: PlayerNumber,
}

impl Default for Attack {
    fn default() -> Self {
        Self {
            remaining_time: 0.0,
            owner: INVALID_PLAYER,
        }
    }
}

impl riposte_core::Component for Attack {
    const MASK: riposte_core::ComponentMask = mask::ATTACK;
}

/// Attack component table for one world copy.
#[derive(Clone, Default)]
pub struct AttackManager {
    attacks: ComponentStorage<Attack>,
}

impl AttackManager {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a default attack component to the entity.
    pub fn add(&mut self, entities: &mut EntityManager, entity: Entity) {
        entities.add_components(entity, mask::ATTACK);
        self.attacks.set(entity, Attack::default());
    }

    /// Returns a copy of the entity's attack component, if present.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<Attack> {
        self.attacks.get(entity).copied()
    }

    /// Overwrites the entity's attack component.
    pub fn set(&mut self, entity: Entity, attack: Attack) {
        self.attacks.set(entity, attack);
    }

    /// Replaces this table with a value copy of `other`.
    pub fn copy_from(&mut self, other: &Self) {
        self.attacks.copy_from(&other.attacks);
    }

    /// Counts all live hitboxes down by `dt` and reaps the ones whose
    /// lifetime reaches zero this tick.
    pub fn fixed_update(&mut self, dt: f32, reaper: &mut EntityReaper<'_>) {
        for entity in 0..reaper.entities.entity_count() {
            if !reaper.entities.has_components(entity, mask::ATTACK)
                || reaper.entities.has_components(entity, mask::DESTROYED)
            {
                continue;
            }
            let Some(mut attack) = self.get(entity) else {
                continue;
            };
            attack.remaining_time -= dt;
            if attack.remaining_time <= 0.0 {
                reaper.destroy_attack_box(entity);
            } else {
                self.set(entity, attack);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollback::CreatedEntity;

    #[test]
    fn test_lifetime_counts_down() {
        let mut entities = EntityManager::new();
        let mut created: Vec<CreatedEntity> = Vec::new();
        let mut attacks = AttackManager::new();

        let entity = entities.create_entity();
        attacks.add(&mut entities, entity);
        attacks.set(
            entity,
            Attack {
                remaining_time: 0.05,
                owner: 0,
            },
        );

        let mut reaper = EntityReaper::new(&mut entities, &mut created);
        attacks.fixed_update(0.02, &mut reaper);
        let remaining = attacks.get(entity).unwrap().remaining_time;
        assert!((remaining - 0.03).abs() < 1e-6);
        assert!(!entities.has_components(entity, mask::DESTROYED));
    }

    #[test]
    fn test_expiry_tombstones_on_the_crossing_tick() {
        let mut entities = EntityManager::new();
        let mut created: Vec<CreatedEntity> = Vec::new();
        let mut attacks = AttackManager::new();

        let entity = entities.create_entity();
        attacks.add(&mut entities, entity);
        attacks.set(
            entity,
            Attack {
                remaining_time: 0.04,
                owner: 0,
            },
        );

        for _ in 0..2 {
            let mut reaper = EntityReaper::new(&mut entities, &mut created);
            attacks.fixed_update(0.02, &mut reaper);
        }
        // 0.04 - 2 * 0.02 reaches zero on the second tick.
        assert!(entities.has_components(entity, mask::DESTROYED));
    }

    #[test]
    fn test_tombstoned_hitboxes_are_skipped() {
        let mut entities = EntityManager::new();
        let mut created: Vec<CreatedEntity> = Vec::new();
        let mut attacks = AttackManager::new();

        let entity = entities.create_entity();
        attacks.add(&mut entities, entity);
        attacks.set(
            entity,
            Attack {
                remaining_time: 0.5,
                owner: 0,
            },
        );
        entities.add_components(entity, mask::DESTROYED);

        let mut reaper = EntityReaper::new(&mut entities, &mut created);
        attacks.fixed_update(0.02, &mut reaper);
        let remaining = attacks.get(entity).unwrap().remaining_time;
        assert!((remaining - 0.5).abs() < f32::EPSILON);
    }
}
