//! Brick durability
//!
//! A brick degrades Red → Orange → Yellow → removed, one step per ball hit.
//! Every hit scores, including the one that removes it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Blueprint, EntityKind};
use super::physics::{BodyDesc, ColliderMaterial, ShapeDesc};
use crate::consts::{BRICK_HEIGHT, BRICK_HIT_SCORE, BRICK_WIDTH};
use crate::pixels_to_physics;
use crate::render::Sprite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrickColour {
    Red,
    Orange,
    Yellow,
}

impl BrickColour {
    /// Level-file colour code: 0 red, 1 orange, 2 yellow
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(BrickColour::Red),
            1 => Some(BrickColour::Orange),
            2 => Some(BrickColour::Yellow),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            BrickColour::Red => 0,
            BrickColour::Orange => 1,
            BrickColour::Yellow => 2,
        }
    }

    /// Colour after one more hit, `None` once the brick is used up
    pub fn degraded(self) -> Option<Self> {
        match self {
            BrickColour::Red => Some(BrickColour::Orange),
            BrickColour::Orange => Some(BrickColour::Yellow),
            BrickColour::Yellow => None,
        }
    }

    /// Hits left before removal
    pub fn hits_remaining(self) -> u32 {
        3 - u32::from(self.code())
    }

    pub fn sprite(self) -> Sprite {
        match self {
            BrickColour::Red => Sprite::RedBrick,
            BrickColour::Orange => Sprite::OrangeBrick,
            BrickColour::Yellow => Sprite::YellowBrick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrickEntity {
    pub colour: BrickColour,
}

impl BrickEntity {
    pub fn new(colour: BrickColour) -> Self {
        Self { colour }
    }

    /// Apply one ball hit. Adds to `score` and returns true when the brick
    /// should be removed; otherwise the brick now shows its degraded colour.
    pub fn handle_collision(&mut self, score: &mut u64) -> bool {
        *score += BRICK_HIT_SCORE;
        match self.colour.degraded() {
            Some(next) => {
                self.colour = next;
                false
            }
            None => true,
        }
    }

    pub fn sprite(&self) -> Sprite {
        self.colour.sprite()
    }

    /// Kinematic brick centred at `centre` (pixels)
    pub fn blueprint(colour: BrickColour, centre: Vec2) -> Blueprint {
        let half = pixels_to_physics(Vec2::new(BRICK_WIDTH, BRICK_HEIGHT) * 0.5);
        Blueprint {
            kind: EntityKind::Brick(BrickEntity::new(colour)),
            body: BodyDesc::kinematic(ShapeDesc::Cuboid {
                half_width: half.x,
                half_height: half.y,
            })
            .with_position(pixels_to_physics(centre))
            .with_material(ColliderMaterial {
                restitution: 0.0,
                friction: 0.1,
                ..ColliderMaterial::default()
            }),
        }
    }
}
