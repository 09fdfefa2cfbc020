//! Entity model
//!
//! Every gameplay object is an [`Entity`]: a kind-specific payload, the
//! physics body it owns, and the last position/angle read back from the world
//! for drawing. The kind is a closed enum, so an entity without a type cannot
//! exist.

use std::fmt;

use glam::Vec2;

use super::ball::BallEntity;
use super::brick::BrickEntity;
use super::paddle::PaddleEntity;
use super::physics::{BodyDesc, PhysicsBody, PhysicsWorld, ShapeDesc};
use crate::render::{Canvas, Sprite};
use crate::{physics_to_pixels, pixels_to_physics};

/// Stable handle of a live entity. Stored in its body's back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    /// Encode for a body's `user_data`; zero is reserved for "no entity"
    pub fn to_user_data(self) -> u128 {
        self.0 as u128 + 1
    }

    pub fn from_user_data(data: u128) -> Option<Self> {
        data.checked_sub(1).map(|raw| EntityId(raw as usize))
    }

    pub fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type tag used by contact classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Ball,
    Paddle,
    Brick,
    Ground,
}

/// Kind-specific entity state
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Brick(BrickEntity),
    Paddle(PaddleEntity),
    Ball(BallEntity),
    /// Bottom screen edge; touching it costs a ball
    Ground,
}

impl EntityKind {
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityKind::Brick(_) => EntityType::Brick,
            EntityKind::Paddle(_) => EntityType::Paddle,
            EntityKind::Ball(_) => EntityType::Ball,
            EntityKind::Ground => EntityType::Ground,
        }
    }
}

/// Everything needed to spawn an entity
#[derive(Debug, Clone)]
pub struct Blueprint {
    pub kind: EntityKind,
    pub body: BodyDesc,
}

impl Blueprint {
    /// Bottom edge of a playfield `width` pixels wide
    pub fn ground(width: f32) -> Self {
        Self {
            kind: EntityKind::Ground,
            body: BodyDesc::fixed(ShapeDesc::Segment {
                a: Vec2::ZERO,
                b: pixels_to_physics(Vec2::new(width, 0.0)),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub body: PhysicsBody,
    /// Last drawn position (pixels)
    pub position: Vec2,
    /// Last drawn orientation (degrees)
    pub angle: f32,
}

impl Entity {
    pub fn entity_type(&self) -> EntityType {
        self.kind.entity_type()
    }

    /// Sprite for the current state; `None` for invisible entities
    pub fn sprite(&self) -> Option<Sprite> {
        match &self.kind {
            EntityKind::Brick(brick) => Some(brick.sprite()),
            EntityKind::Paddle(_) => Some(Sprite::Paddle),
            EntityKind::Ball(_) => Some(Sprite::Ball),
            EntityKind::Ground => None,
        }
    }

    /// Sync position/angle from the body, then blit the sprite
    pub fn draw(&mut self, world: &PhysicsWorld, canvas: &mut dyn Canvas) {
        let (pos, rotation) = world.body_position(&self.body);
        self.position = physics_to_pixels(pos);
        self.angle = rotation.to_degrees();

        if let Some(sprite) = self.sprite() {
            canvas.blit(sprite, self.position, self.angle, Vec2::ONE);
        }
    }

    pub fn as_brick(&self) -> Option<&BrickEntity> {
        match &self.kind {
            EntityKind::Brick(brick) => Some(brick),
            _ => None,
        }
    }

    pub fn as_ball(&self) -> Option<&BallEntity> {
        match &self.kind {
            EntityKind::Ball(ball) => Some(ball),
            _ => None,
        }
    }

    pub fn as_paddle(&self) -> Option<&PaddleEntity> {
        match &self.kind {
            EntityKind::Paddle(paddle) => Some(paddle),
            _ => None,
        }
    }
}
