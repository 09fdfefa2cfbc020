//! Contact classification
//!
//! Turns a pair of typed entities into the gameplay interaction it means.
//! Fixture order in a contact is arbitrary, so the pair is normalised first:
//! if the first entity is a ball it is swapped to the second position. Only
//! pairs with a ball second are meaningful; everything else is ignored.

use super::entity::{EntityId, EntityType};

/// A meaningful ball contact, ball always last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPair {
    BrickBall { brick: EntityId, ball: EntityId },
    PaddleBall { paddle: EntityId, ball: EntityId },
    GroundBall { ground: EntityId, ball: EntityId },
}

impl ContactPair {
    pub fn ball(&self) -> EntityId {
        match *self {
            ContactPair::BrickBall { ball, .. }
            | ContactPair::PaddleBall { ball, .. }
            | ContactPair::GroundBall { ball, .. } => ball,
        }
    }
}

/// Swap so that a ball, if first, ends up second
pub fn normalise(
    a: (EntityId, EntityType),
    b: (EntityId, EntityType),
) -> ((EntityId, EntityType), (EntityId, EntityType)) {
    if a.1 == EntityType::Ball { (b, a) } else { (a, b) }
}

/// Classify a contact between two entities
pub fn classify(a: (EntityId, EntityType), b: (EntityId, EntityType)) -> Option<ContactPair> {
    let ((other, other_type), (ball, ball_type)) = normalise(a, b);
    if ball_type != EntityType::Ball {
        return None;
    }
    match other_type {
        EntityType::Brick => Some(ContactPair::BrickBall { brick: other, ball }),
        EntityType::Paddle => Some(ContactPair::PaddleBall { paddle: other, ball }),
        EntityType::Ground => Some(ContactPair::GroundBall { ground: other, ball }),
        // Balls pass through each other's bookkeeping untouched
        EntityType::Ball => None,
    }
}
