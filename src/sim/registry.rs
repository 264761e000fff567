//! Entity registry: sole owner of the live track entities
//!
//! Iteration order is insertion order. Entities emitted mid-tick (alien
//! missiles) are held back in a pending list until [`EntityRegistry::commit_pending`]
//! so they are never collision-tested in the tick that created them.

use glam::Vec3;

use super::entity::{EntityId, EntityKind, WorldEntity};
use super::state::GameEvent;
use crate::approach;
use crate::consts::*;

/// Magnet pull applied to pickups this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetPull {
    /// Point pickups ease toward
    pub target: Vec3,
    /// Blend factor for this tick (rate × dt)
    pub blend: f32,
}

/// Per-tick displacement for everything on the track
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion {
    /// Forward travel shared by every entity (effective speed × scaled dt)
    pub world_step: f32,
    /// Extra forward travel for missiles (pursuit speed × unscaled dt)
    pub missile_step: f32,
    pub magnet: Option<MagnetPull>,
}

/// Ordered collection of live world entities
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    entities: Vec<WorldEntity>,
    pending: Vec<WorldEntity>,
    next_id: EntityId,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert an entity immediately
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec3) -> EntityId {
        let id = self.next_entity_id();
        self.entities.push(WorldEntity::new(id, kind, pos));
        id
    }

    /// Insert an entity at the end of the current tick
    pub fn queue(&mut self, kind: EntityKind, pos: Vec3) -> EntityId {
        let id = self.next_entity_id();
        self.pending.push(WorldEntity::new(id, kind, pos));
        id
    }

    /// Move queued entities into the live set
    pub fn commit_pending(&mut self) {
        self.entities.append(&mut self.pending);
    }

    /// Drop everything (IDs keep counting up)
    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldEntity> {
        self.entities.iter()
    }

    /// Active entities, for collaborators
    pub fn active(&self) -> impl Iterator<Item = &WorldEntity> {
        self.entities.iter().filter(|e| e.active)
    }

    pub fn get(&self, id: EntityId) -> Option<&WorldEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut WorldEntity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Deactivate an entity; returns false if it was missing or already inactive
    pub fn deactivate(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(entity) if entity.active => {
                entity.active = false;
                true
            }
            _ => false,
        }
    }

    /// Deactivate every active entity matching `pred`, returning how many changed
    pub fn deactivate_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&WorldEntity) -> bool,
    {
        let mut count = 0;
        for entity in self.entities.iter_mut().filter(|e| e.active) {
            if pred(entity) {
                entity.active = false;
                count += 1;
            }
        }
        count
    }

    /// Advance every entity by one tick of motion.
    ///
    /// Pickups within the magnet radius ease toward the player; aliens past
    /// the trigger depth fire their one missile (queued, not yet live).
    pub fn advance(&mut self, motion: &Motion, events: &mut Vec<GameEvent>) {
        let mut launches: Vec<Vec3> = Vec::new();

        for entity in self.entities.iter_mut() {
            entity.prev_z = entity.pos.z;
            if !entity.active {
                continue;
            }

            if let Some(pull) = motion.magnet {
                if entity.kind.is_pickup() {
                    let dx = entity.pos.x - pull.target.x;
                    let dz = entity.pos.z - pull.target.z;
                    if (dx * dx + dz * dz).sqrt() < MAGNET_RADIUS {
                        entity.pos.x = approach(entity.pos.x, pull.target.x, pull.blend);
                        entity.pos.y = approach(entity.pos.y, pull.target.y, pull.blend);
                        entity.pos.z = approach(entity.pos.z, pull.target.z, pull.blend);
                    }
                }
            }

            let mut step = motion.world_step;
            if entity.kind == EntityKind::Missile {
                step += motion.missile_step;
            }
            entity.pos.z += step;

            if let EntityKind::Alien { has_fired } = &mut entity.kind {
                if !*has_fired && entity.pos.z > ALIEN_FIRE_DEPTH {
                    *has_fired = true;
                    launches.push(entity.pos);
                }
            }
        }

        for origin in launches {
            let pos = Vec3::new(origin.x, EntityKind::Missile.spawn_height(), origin.z + 2.0);
            let id = self.queue(EntityKind::Missile, pos);
            events.push(GameEvent::AlienFired {
                missile: id,
                position: origin,
            });
        }
    }

    /// Compact out deactivated entities and anything behind the camera
    pub fn prune(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| e.active && !e.is_behind_camera());
        before - self.entities.len()
    }

    /// Keep only entities closer than `depth` ahead of the player (depth is negative Z)
    pub fn retain_nearer_than(&mut self, depth: f32) {
        self.entities.retain(|e| e.pos.z > depth);
    }

    /// Deepest (most negative Z) active non-missile entity, if any
    pub fn frontier_z(&self) -> Option<f32> {
        self.entities
            .iter()
            .filter(|e| e.active && e.kind != EntityKind::Missile)
            .map(|e| e.pos.z)
            .reduce(f32::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::PowerUpKind;
    use proptest::prelude::*;

    fn step(world_step: f32) -> Motion {
        Motion {
            world_step,
            ..Default::default()
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let mut registry = EntityRegistry::new();
        let a = registry.spawn(EntityKind::Obstacle, Vec3::ZERO);
        let b = registry.queue(EntityKind::Missile, Vec3::ZERO);
        registry.clear();
        let c = registry.spawn(EntityKind::Gem { points: 50 }, Vec3::ZERO);
        assert!(a != b && b != c && a != c);
    }

    #[test]
    fn test_missiles_outrun_the_world() {
        let mut registry = EntityRegistry::new();
        let obstacle = registry.spawn(EntityKind::Obstacle, Vec3::new(0.0, 0.8, -50.0));
        let missile = registry.spawn(EntityKind::Missile, Vec3::new(0.0, 1.0, -50.0));
        let motion = Motion {
            world_step: 1.0,
            missile_step: 2.0,
            magnet: None,
        };
        registry.advance(&motion, &mut Vec::new());
        assert_eq!(registry.get(obstacle).unwrap().pos.z, -49.0);
        assert_eq!(registry.get(missile).unwrap().pos.z, -47.0);
        assert_eq!(registry.get(missile).unwrap().prev_z, -50.0);
    }

    #[test]
    fn test_alien_fires_exactly_once() {
        let mut registry = EntityRegistry::new();
        registry.spawn(
            EntityKind::Alien { has_fired: false },
            Vec3::new(2.2, 1.75, ALIEN_FIRE_DEPTH - 0.5),
        );
        let mut events = Vec::new();

        registry.advance(&step(1.0), &mut events);
        assert_eq!(events.len(), 1);
        // Missile is held back until the end of the tick
        assert_eq!(registry.len(), 1);
        registry.commit_pending();
        assert_eq!(registry.len(), 2);

        let missile = registry
            .iter()
            .find(|e| e.kind == EntityKind::Missile)
            .unwrap();
        assert_eq!(missile.pos.x, 2.2);
        assert!((missile.pos.z - (ALIEN_FIRE_DEPTH + 2.5)).abs() < 1e-4);

        for _ in 0..10 {
            registry.advance(&step(1.0), &mut events);
            registry.commit_pending();
        }
        assert_eq!(events.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_magnet_pulls_only_nearby_pickups() {
        let mut registry = EntityRegistry::new();
        let near_gem = registry.spawn(EntityKind::Gem { points: 50 }, Vec3::new(4.4, 1.2, -5.0));
        let far_gem = registry.spawn(EntityKind::Gem { points: 50 }, Vec3::new(4.4, 1.2, -40.0));
        let rock = registry.spawn(EntityKind::Obstacle, Vec3::new(4.4, 0.8, -5.0));
        let boost = registry.spawn(
            EntityKind::PowerUp(PowerUpKind::Speed),
            Vec3::new(-2.2, 1.5, -3.0),
        );
        let motion = Motion {
            world_step: 0.0,
            missile_step: 0.0,
            magnet: Some(MagnetPull {
                target: Vec3::new(0.0, 0.5, 0.0),
                blend: 0.5,
            }),
        };
        registry.advance(&motion, &mut Vec::new());

        assert!((registry.get(near_gem).unwrap().pos.x - 2.2).abs() < 1e-4);
        assert_eq!(registry.get(far_gem).unwrap().pos.x, 4.4);
        assert_eq!(registry.get(rock).unwrap().pos.x, 4.4);
        assert!((registry.get(boost).unwrap().pos.x + 1.1).abs() < 1e-4);
    }

    #[test]
    fn test_prune_removes_inactive_and_passed() {
        let mut registry = EntityRegistry::new();
        let gone = registry.spawn(EntityKind::Obstacle, Vec3::new(0.0, 0.8, REMOVE_DISTANCE + 0.1));
        let hit = registry.spawn(EntityKind::Obstacle, Vec3::new(0.0, 0.8, -1.0));
        let kept = registry.spawn(EntityKind::Obstacle, Vec3::new(0.0, 0.8, -30.0));
        assert!(registry.deactivate(hit));
        assert!(!registry.deactivate(hit));

        assert_eq!(registry.prune(), 2);
        assert!(registry.get(gone).is_none());
        assert!(registry.get(hit).is_none());
        assert!(registry.get(kept).is_some());
    }

    #[test]
    fn test_frontier_ignores_missiles() {
        let mut registry = EntityRegistry::new();
        assert_eq!(registry.frontier_z(), None);
        registry.spawn(EntityKind::Gem { points: 50 }, Vec3::new(0.0, 1.2, -60.0));
        registry.spawn(EntityKind::Missile, Vec3::new(0.0, 1.0, -100.0));
        assert_eq!(registry.frontier_z(), Some(-60.0));
    }

    #[test]
    fn test_deactivate_where_counts_changes() {
        let mut registry = EntityRegistry::new();
        for z in [-5.0, -10.0, -15.0] {
            registry.spawn(EntityKind::Obstacle, Vec3::new(0.0, 0.8, z));
        }
        registry.spawn(EntityKind::Gem { points: 50 }, Vec3::new(0.0, 1.2, -7.0));
        assert_eq!(registry.deactivate_where(|e| e.kind.is_damage_source()), 3);
        assert_eq!(registry.deactivate_where(|e| e.kind.is_damage_source()), 0);
        assert_eq!(registry.active().count(), 1);
    }

    proptest! {
        #[test]
        fn prop_nothing_survives_past_removal_depth(
            depths in proptest::collection::vec(-150.0f32..40.0, 0..32),
            world_step in 0.0f32..10.0,
        ) {
            let mut registry = EntityRegistry::new();
            for z in depths {
                registry.spawn(EntityKind::Obstacle, Vec3::new(0.0, 0.8, z));
            }
            registry.advance(&step(world_step), &mut Vec::new());
            registry.prune();
            prop_assert!(registry.iter().all(|e| e.pos.z <= REMOVE_DISTANCE));
        }
    }
}
