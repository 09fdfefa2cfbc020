//! Ball
//!
//! The ball is a dynamic, frictionless, perfectly elastic circle with gravity
//! switched off. Game logic sets its velocity on launch and paddle hits; after
//! each step its speed is pulled back to the cruise speed so solver losses
//! never accumulate.

use glam::Vec2;

use super::entity::{Blueprint, EntityKind};
use super::physics::{BodyDesc, ColliderMaterial, PhysicsBody, PhysicsWorld, ShapeDesc};
use crate::consts::{BALL_RADIUS, PTM_RATIO};
use crate::{deg_to_vec, pixels_to_physics};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallEntity {
    /// Speed held while in flight (pixels/s)
    pub cruise_speed: f32,
}

impl BallEntity {
    pub fn new(cruise_speed: f32) -> Self {
        Self { cruise_speed }
    }

    /// Send the ball off at `degrees` with `speed` pixels/s
    pub fn kick(&mut self, world: &mut PhysicsWorld, body: &PhysicsBody, degrees: f32, speed: f32) {
        self.cruise_speed = speed;
        world.set_velocity(body, pixels_to_physics(deg_to_vec(degrees) * speed));
    }

    pub fn stop(&self, world: &mut PhysicsWorld, body: &PhysicsBody) {
        world.set_velocity(body, Vec2::ZERO);
    }

    /// Rescale the current velocity to the cruise speed. A ball at rest
    /// stays at rest.
    pub fn sustain(&self, world: &mut PhysicsWorld, body: &PhysicsBody) {
        let velocity = world.velocity(body);
        let current = velocity.length();
        let target = self.cruise_speed / PTM_RATIO;
        if current > 1e-4 && (current - target).abs() > 1e-4 {
            world.set_velocity(body, velocity * (target / current));
        }
    }

    /// Dynamic ball centred at `centre` (pixels), initially at rest
    pub fn blueprint(centre: Vec2, cruise_speed: f32) -> Blueprint {
        Blueprint {
            kind: EntityKind::Ball(BallEntity::new(cruise_speed)),
            body: BodyDesc::dynamic(ShapeDesc::Ball {
                radius: BALL_RADIUS / PTM_RATIO,
            })
            .with_position(pixels_to_physics(centre))
            .with_gravity_scale(0.0)
            .with_fixed_rotation(true)
            .with_ccd(true)
            .with_material(ColliderMaterial::bouncy()),
        }
    }
}
