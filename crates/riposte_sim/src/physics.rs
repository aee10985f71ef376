//! Discrete 2-D physics over the entity table.
//!
//! One fixed step is, in strict order: integrate, collide, gravity,
//! ground clamp. Gravity is applied *after* collisions but *before* the
//! ground clamp so a body landing during the collide phase has its
//! downward velocity zeroed on the same tick instead of sinking for one
//! frame.
//!
//! Collision detection is the O(n²) sweep over ordered entity pairs
//! `(a, b)` with `a < b`; every overlap fires the trigger listener
//! immediately, and listener mutations are visible to later pairs. This
//! ordering is part of the determinism contract.

use riposte_core::{ComponentStorage, Entity, EntityManager, Vec2};

use crate::constants::{GRAVITY, GROUND_LEVEL};
use crate::mask;

/// How a body responds to integration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BodyType {
    /// Immovable; velocities are zeroed every step.
    Static,
    /// Integrated, not pushed by anything.
    Kinematic,
    /// Integrated and subject to collision response.
    #[default]
    Dynamic,
}

/// A rigid body: pose, velocities and integration flags.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// World-space position in meters.
    pub position: Vec2,
    /// Linear velocity in meters per second.
    pub velocity: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Angular velocity in degrees per second.
    pub angular_velocity: f32,
    /// Whether gravity and the ground clamp apply to this body.
    pub affected_by_gravity: bool,
    /// Integration behavior.
    pub body_type: BodyType,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            affected_by_gravity: false,
            body_type: BodyType::Dynamic,
        }
    }
}

impl riposte_core::Component for Body {
    const MASK: riposte_core::ComponentMask = mask::BODY;
}

/// Axis-aligned box collider.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxCollider {
    /// Half-widths on each axis.
    pub extents: Vec2,
    /// Whether contacts only fire triggers (no solid response). Every
    /// collider in this game is a trigger; responses happen in the
    /// listener.
    pub is_trigger: bool,
}

impl riposte_core::Component for BoxCollider {
    const MASK: riposte_core::ComponentMask = mask::BOX_COLLIDER;
}

/// The single trigger sink of a physics world.
///
/// Receives overlapping pairs in ascending `(a, b)` order, `a < b`, and
/// may mutate any body or component state; later pairs observe those
/// mutations.
pub trait TriggerListener {
    /// Called once per overlapping pair during the collide phase.
    fn on_trigger(
        &mut self,
        entities: &mut EntityManager,
        physics: &mut PhysicsWorld,
        entity_a: Entity,
        entity_b: Entity,
    );
}

/// Closed-inequality AABB overlap test: touching edges count as contact.
fn aabb_overlap(pos1: Vec2, ext1: Vec2, pos2: Vec2, ext2: Vec2) -> bool {
    pos1.x - ext1.x <= pos2.x + ext2.x
        && pos1.y - ext1.y <= pos2.y + ext2.y
        && pos1.x + ext1.x >= pos2.x - ext2.x
        && pos1.y + ext1.y >= pos2.y - ext2.y
}

/// Body and collider tables plus the per-step pipeline.
#[derive(Clone, Default)]
pub struct PhysicsWorld {
    bodies: ComponentStorage<Body>,
    boxes: ComponentStorage<BoxCollider>,
}

impl PhysicsWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a default body to the entity.
    pub fn add_body(&mut self, entities: &mut EntityManager, entity: Entity) {
        entities.add_components(entity, mask::BODY);
        self.bodies.set(entity, Body::default());
    }

    /// Attaches a default box collider to the entity.
    pub fn add_box(&mut self, entities: &mut EntityManager, entity: Entity) {
        entities.add_components(entity, mask::BOX_COLLIDER);
        self.boxes.set(entity, BoxCollider::default());
    }

    /// Returns a copy of the entity's body, if it has one.
    #[must_use]
    pub fn body(&self, entity: Entity) -> Option<Body> {
        self.bodies.get(entity).copied()
    }

    /// Overwrites the entity's body.
    pub fn set_body(&mut self, entity: Entity, body: Body) {
        self.bodies.set(entity, body);
    }

    /// Returns a copy of the entity's box collider, if it has one.
    #[must_use]
    pub fn box_collider(&self, entity: Entity) -> Option<BoxCollider> {
        self.boxes.get(entity).copied()
    }

    /// Overwrites the entity's box collider.
    pub fn set_box(&mut self, entity: Entity, collider: BoxCollider) {
        self.boxes.set(entity, collider);
    }

    /// Replaces this world's tables with a value copy of `other`.
    pub fn copy_from(&mut self, other: &Self) {
        self.bodies.copy_from(&other.bodies);
        self.boxes.copy_from(&other.boxes);
    }

    /// Advances the world one fixed step.
    pub fn fixed_update(
        &mut self,
        dt: f32,
        entities: &mut EntityManager,
        listener: &mut dyn TriggerListener,
    ) {
        self.integrate(dt, entities);
        self.resolve_collisions(entities, listener);
        self.apply_gravity(dt, entities);
        self.clamp_to_ground(entities);
    }

    fn integrate(&mut self, dt: f32, entities: &EntityManager) {
        for entity in 0..entities.entity_count() {
            if !entities.has_components(entity, mask::BODY)
                || entities.has_components(entity, mask::DESTROYED)
            {
                continue;
            }
            let Some(body) = self.bodies.get_mut(entity) else {
                continue;
            };
            match body.body_type {
                BodyType::Dynamic | BodyType::Kinematic => {
                    body.position += body.velocity * dt;
                    body.rotation += body.angular_velocity * dt;
                }
                BodyType::Static => {
                    body.velocity = Vec2::ZERO;
                    body.angular_velocity = 0.0;
                }
            }
        }
    }

    fn resolve_collisions(&mut self, entities: &mut EntityManager, listener: &mut dyn TriggerListener) {
        let collidable = mask::BODY | mask::BOX_COLLIDER;
        for first in 0..entities.entity_count() {
            for second in first + 1..entities.entity_count() {
                // Both masks are re-read per pair: the listener may have
                // tombstoned either entity while handling an earlier pair.
                if !entities.has_components(first, collidable)
                    || entities.has_components(first, mask::DESTROYED)
                {
                    break;
                }
                if !entities.has_components(second, collidable)
                    || entities.has_components(second, mask::DESTROYED)
                {
                    continue;
                }
                let (Some(body1), Some(box1)) = (self.body(first), self.box_collider(first))
                else {
                    break;
                };
                let (Some(body2), Some(box2)) = (self.body(second), self.box_collider(second))
                else {
                    continue;
                };
                if aabb_overlap(body1.position, box1.extents, body2.position, box2.extents) {
                    listener.on_trigger(entities, self, first, second);
                }
            }
        }
    }

    fn apply_gravity(&mut self, dt: f32, entities: &EntityManager) {
        for entity in 0..entities.entity_count() {
            if !entities.has_components(entity, mask::BODY)
                || entities.has_components(entity, mask::DESTROYED)
            {
                continue;
            }
            let Some(body) = self.bodies.get_mut(entity) else {
                continue;
            };
            if body.affected_by_gravity {
                body.velocity += GRAVITY * dt;
            }
        }
    }

    fn clamp_to_ground(&mut self, entities: &EntityManager) {
        for entity in 0..entities.entity_count() {
            if !entities.has_components(entity, mask::BODY)
                || entities.has_components(entity, mask::DESTROYED)
            {
                continue;
            }
            let Some(body) = self.bodies.get_mut(entity) else {
                continue;
            };
            if body.affected_by_gravity && body.position.y <= GROUND_LEVEL {
                body.position.y = GROUND_LEVEL;
                body.velocity.y = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullListener;

    impl TriggerListener for NullListener {
        fn on_trigger(
            &mut self,
            _entities: &mut EntityManager,
            _physics: &mut PhysicsWorld,
            _a: Entity,
            _b: Entity,
        ) {
        }
    }

    /// Records pairs and tombstones the second entity of the first pair.
    struct RecordingListener {
        pairs: Vec<(Entity, Entity)>,
    }

    impl TriggerListener for RecordingListener {
        fn on_trigger(
            &mut self,
            entities: &mut EntityManager,
            _physics: &mut PhysicsWorld,
            a: Entity,
            b: Entity,
        ) {
            if self.pairs.is_empty() {
                entities.add_components(b, mask::DESTROYED);
            }
            self.pairs.push((a, b));
        }
    }

    fn spawn_box(
        entities: &mut EntityManager,
        physics: &mut PhysicsWorld,
        position: Vec2,
    ) -> Entity {
        let entity = entities.create_entity();
        physics.add_body(entities, entity);
        physics.add_box(entities, entity);
        physics.set_body(
            entity,
            Body {
                position,
                ..Body::default()
            },
        );
        physics.set_box(
            entity,
            BoxCollider {
                extents: Vec2::splat(0.5),
                is_trigger: true,
            },
        );
        entity
    }

    #[test]
    fn test_integration_moves_dynamic_bodies() {
        let mut entities = EntityManager::new();
        let mut physics = PhysicsWorld::new();
        let e = spawn_box(&mut entities, &mut physics, Vec2::ZERO);
        let mut body = physics.body(e).unwrap();
        body.velocity = Vec2::new(1.0, -2.0);
        body.angular_velocity = 90.0;
        physics.set_body(e, body);

        physics.fixed_update(0.5, &mut entities, &mut NullListener);

        let body = physics.body(e).unwrap();
        assert_eq!(body.position, Vec2::new(0.5, -1.0));
        assert_eq!(body.rotation, 45.0);
    }

    #[test]
    fn test_static_bodies_lose_velocity() {
        let mut entities = EntityManager::new();
        let mut physics = PhysicsWorld::new();
        let e = spawn_box(&mut entities, &mut physics, Vec2::ZERO);
        let mut body = physics.body(e).unwrap();
        body.body_type = BodyType::Static;
        body.velocity = Vec2::new(3.0, 3.0);
        body.angular_velocity = 10.0;
        physics.set_body(e, body);

        physics.fixed_update(0.02, &mut entities, &mut NullListener);

        let body = physics.body(e).unwrap();
        assert_eq!(body.position, Vec2::ZERO);
        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(body.angular_velocity, 0.0);
    }

    #[test]
    fn test_ground_clamp_zeroes_fall_on_landing_tick() {
        let mut entities = EntityManager::new();
        let mut physics = PhysicsWorld::new();
        let e = spawn_box(&mut entities, &mut physics, Vec2::new(0.0, GROUND_LEVEL + 0.01));
        let mut body = physics.body(e).unwrap();
        body.affected_by_gravity = true;
        body.velocity = Vec2::new(0.0, -5.0);
        physics.set_body(e, body);

        physics.fixed_update(0.02, &mut entities, &mut NullListener);

        let body = physics.body(e).unwrap();
        assert_eq!(body.position.y, GROUND_LEVEL);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_gravity_only_touches_flagged_bodies() {
        let mut entities = EntityManager::new();
        let mut physics = PhysicsWorld::new();
        let inert = spawn_box(&mut entities, &mut physics, Vec2::ZERO);
        let falling = spawn_box(&mut entities, &mut physics, Vec2::new(10.0, 0.0));
        let mut body = physics.body(falling).unwrap();
        body.affected_by_gravity = true;
        physics.set_body(falling, body);

        physics.fixed_update(0.02, &mut entities, &mut NullListener);

        assert_eq!(physics.body(inert).unwrap().velocity, Vec2::ZERO);
        let vy = physics.body(falling).unwrap().velocity.y;
        assert!((vy - GRAVITY.y * 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_triggers_fire_in_ascending_pair_order() {
        let mut entities = EntityManager::new();
        let mut physics = PhysicsWorld::new();
        // Three overlapping boxes at the origin.
        let a = spawn_box(&mut entities, &mut physics, Vec2::ZERO);
        let b = spawn_box(&mut entities, &mut physics, Vec2::new(0.25, 0.0));
        let c = spawn_box(&mut entities, &mut physics, Vec2::new(0.5, 0.0));

        let mut listener = RecordingListener { pairs: Vec::new() };
        physics.fixed_update(0.02, &mut entities, &mut listener);

        // (a, b) fires first and tombstones b; pairs with b are gone,
        // (a, c) still fires.
        assert_eq!(listener.pairs, vec![(a, b), (a, c)]);
    }

    #[test]
    fn test_touching_edges_collide() {
        assert!(aabb_overlap(
            Vec2::ZERO,
            Vec2::splat(0.5),
            Vec2::new(1.0, 0.0),
            Vec2::splat(0.5),
        ));
        assert!(!aabb_overlap(
            Vec2::ZERO,
            Vec2::splat(0.5),
            Vec2::new(1.01, 0.0),
            Vec2::splat(0.5),
        ));
    }
}
