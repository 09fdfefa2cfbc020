//! Entity registry
//!
//! Balls and everything else live in two separate vectors, so draw and
//! update passes can treat balls specially. A slab maps each [`EntityId`]
//! to its (list, index) slot; removal is a `swap_remove` that patches the
//! slot of the entity moved into the gap.

use glam::Vec2;
use slab::Slab;

use super::brick::BrickEntity;
use super::entity::{Blueprint, Entity, EntityId, EntityKind, EntityType};
use super::physics::PhysicsWorld;
use crate::physics_to_pixels;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    General,
    Balls,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    list: ListKind,
    index: usize,
}

#[derive(Debug, Default)]
pub struct EntityStore {
    slots: Slab<Slot>,
    entities: Vec<Entity>,
    balls: Vec<Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the entity and its body. The body's back-reference points at
    /// the returned id.
    pub fn spawn(&mut self, world: &mut PhysicsWorld, blueprint: Blueprint) -> EntityId {
        let list = match blueprint.kind {
            EntityKind::Ball(_) => ListKind::Balls,
            _ => ListKind::General,
        };
        let vec = match list {
            ListKind::General => &mut self.entities,
            ListKind::Balls => &mut self.balls,
        };

        let entry = self.slots.vacant_entry();
        let id = EntityId(entry.key());
        let body = world.create_body(Some(id), &blueprint.body);
        entry.insert(Slot {
            list,
            index: vec.len(),
        });
        vec.push(Entity {
            id,
            kind: blueprint.kind,
            body,
            position: physics_to_pixels(blueprint.body.position),
            angle: blueprint.body.rotation.to_degrees(),
        });
        id
    }

    /// Destroy the entity's body, then release the entity.
    /// `None` if the id is not (or no longer) live.
    pub fn despawn(&mut self, world: &mut PhysicsWorld, id: EntityId) -> Option<Entity> {
        let slot = *self.slots.get(id.0)?;
        let body = self.list(slot.list).get(slot.index)?.body;
        world.remove_body(&body);
        self.slots.remove(id.0);

        let vec = self.list_mut(slot.list);
        let entity = vec.swap_remove(slot.index);
        let moved = vec.get(slot.index).map(|e| e.id);
        if let Some(moved_slot) = moved.and_then(|id| self.slots.get_mut(id.0)) {
            moved_slot.index = slot.index;
        }
        Some(entity)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.slots.contains(id.0)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = self.slots.get(id.0)?;
        self.list(slot.list).get(slot.index)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = *self.slots.get(id.0)?;
        self.list_mut(slot.list).get_mut(slot.index)
    }

    pub fn entity_type(&self, id: EntityId) -> Option<EntityType> {
        self.get(id).map(Entity::entity_type)
    }

    /// Non-ball entities
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn balls(&self) -> &[Entity] {
        &self.balls
    }

    pub fn balls_mut(&mut self) -> &mut [Entity] {
        &mut self.balls
    }

    pub fn ball_count(&self) -> usize {
        self.balls.len()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn bricks(&self) -> impl Iterator<Item = (&Entity, &BrickEntity)> {
        self.entities
            .iter()
            .filter_map(|e| e.as_brick().map(|brick| (e, brick)))
    }

    pub fn brick_count(&self) -> usize {
        self.bricks().count()
    }

    /// Position of a live entity's body (pixels)
    pub fn position(&self, world: &PhysicsWorld, id: EntityId) -> Option<Vec2> {
        self.get(id)
            .map(|e| physics_to_pixels(world.body_position(&e.body).0))
    }

    /// Destroy every non-ball entity; balls carry over to the next layout
    pub fn clear_non_balls(&mut self, world: &mut PhysicsWorld) -> usize {
        let ids: Vec<EntityId> = self.entities.iter().map(|e| e.id).collect();
        ids.into_iter()
            .filter(|&id| self.despawn(world, id).is_some())
            .count()
    }

    /// Destroy everything
    pub fn clear(&mut self, world: &mut PhysicsWorld) {
        self.clear_non_balls(world);
        let ids: Vec<EntityId> = self.balls.iter().map(|e| e.id).collect();
        for id in ids {
            self.despawn(world, id);
        }
    }

    fn list(&self, list: ListKind) -> &Vec<Entity> {
        match list {
            ListKind::General => &self.entities,
            ListKind::Balls => &self.balls,
        }
    }

    fn list_mut(&mut self, list: ListKind) -> &mut Vec<Entity> {
        match list {
            ListKind::General => &mut self.entities,
            ListKind::Balls => &mut self.balls,
        }
    }
}

/// Entities condemned during contact resolution, destroyed afterwards.
/// Each id appears at most once.
#[derive(Debug, Default)]
pub struct DeadEntityList {
    ids: Vec<EntityId>,
}

impl DeadEntityList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `id` was already listed
    pub fn push(&mut self, id: EntityId) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Take the listed ids, leaving the list empty
    pub fn take(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.ids)
    }
}
