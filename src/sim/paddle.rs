//! Player paddle
//!
//! The paddle is kinematic and follows the cursor. Where a ball strikes it
//! steers the rebound: hits right of centre send the ball further right,
//! hits left of centre further left.

use glam::Vec2;

use super::ball::BallEntity;
use super::entity::{Blueprint, EntityKind};
use super::physics::{BodyDesc, ColliderMaterial, PhysicsBody, PhysicsWorld, ShapeDesc};
use crate::consts::{MIN_BOUNCE_ANGLE_DEG, PADDLE_HEIGHT, PADDLE_MAX_DEFLECTION_DEG, PADDLE_WIDTH};
use crate::{deg_to_vec, physics_to_pixels, pixels_to_physics, vec_to_deg};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleEntity {
    /// Half the paddle width (pixels)
    pub half_width: f32,
}

impl Default for PaddleEntity {
    fn default() -> Self {
        Self {
            half_width: PADDLE_WIDTH * 0.5,
        }
    }
}

impl PaddleEntity {
    /// Rebound velocity for a ball hitting `offset` pixels right of centre.
    ///
    /// The result always points upward, keeps at least `min_speed`, and is
    /// rotated toward the struck side by up to [`PADDLE_MAX_DEFLECTION_DEG`].
    pub fn deflect(&self, offset: f32, velocity: Vec2, min_speed: f32) -> Vec2 {
        let t = (offset / self.half_width).clamp(-1.0, 1.0);
        let speed = velocity.length().max(min_speed);

        // Contact may be reported before or after the solver flipped vy
        let rebound = Vec2::new(velocity.x, velocity.y.abs());
        let base = if rebound.length_squared() > f32::EPSILON {
            vec_to_deg(rebound)
        } else {
            90.0
        };

        let angle = (base - t * PADDLE_MAX_DEFLECTION_DEG)
            .clamp(MIN_BOUNCE_ANGLE_DEG, 180.0 - MIN_BOUNCE_ANGLE_DEG);
        deg_to_vec(angle) * speed
    }

    /// Steer `ball` off this paddle
    pub fn handle_collision(
        &self,
        world: &mut PhysicsWorld,
        paddle_body: &PhysicsBody,
        ball: &mut BallEntity,
        ball_body: &PhysicsBody,
    ) {
        let (paddle_pos, _) = world.body_position(paddle_body);
        let (ball_pos, _) = world.body_position(ball_body);
        let offset = physics_to_pixels(ball_pos - paddle_pos).x;

        let velocity = physics_to_pixels(world.velocity(ball_body));
        let out = self.deflect(offset, velocity, ball.cruise_speed);
        ball.cruise_speed = ball.cruise_speed.max(out.length());
        world.set_velocity(ball_body, pixels_to_physics(out));
    }

    /// Kinematic paddle centred at `centre` (pixels)
    pub fn blueprint(centre: Vec2) -> Blueprint {
        let paddle = PaddleEntity::default();
        let half = pixels_to_physics(Vec2::new(paddle.half_width, PADDLE_HEIGHT * 0.5));
        Blueprint {
            kind: EntityKind::Paddle(paddle),
            body: BodyDesc::kinematic(ShapeDesc::Cuboid {
                half_width: half.x,
                half_height: half.y,
            })
            .with_position(pixels_to_physics(centre))
            .with_fixed_rotation(true)
            .with_material(ColliderMaterial {
                friction: 0.0,
                ..ColliderMaterial::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn centre_hit_keeps_vertical_rebound() {
        let paddle = PaddleEntity::default();
        let out = paddle.deflect(0.0, Vec2::new(0.0, -300.0), 0.0);
        assert!(out.x.abs() < 1e-3);
        assert!((out.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn right_side_hit_sends_ball_right() {
        let paddle = PaddleEntity::default();
        let out = paddle.deflect(32.0, Vec2::new(0.0, -300.0), 0.0);
        assert!(out.x > 0.0);
        assert!(out.y > 0.0);
        assert!((vec_to_deg(out) - 67.5).abs() < 1e-3);
    }

    #[test]
    fn tip_hit_is_clamped_above_horizontal() {
        let paddle = PaddleEntity::default();
        // Already shallow and struck at the far left tip
        let out = paddle.deflect(-500.0, Vec2::new(-300.0, -20.0), 0.0);
        let angle = vec_to_deg(out);
        assert!((angle - (180.0 - MIN_BOUNCE_ANGLE_DEG)).abs() < 1e-3, "angle = {angle}");
    }

    #[test]
    fn slow_ball_is_brought_up_to_speed() {
        let paddle = PaddleEntity::default();
        let out = paddle.deflect(0.0, Vec2::new(0.0, -10.0), 512.0);
        assert!((out.length() - 512.0).abs() < 1e-2);
    }

    proptest! {
        #[test]
        fn deflection_leans_toward_struck_side(
            offset in -64.0f32..64.0,
            incoming in 30.0f32..150.0,
            speed in 100.0f32..1000.0,
        ) {
            prop_assume!(offset.abs() > 1.0);
            let paddle = PaddleEntity::default();
            let velocity = deg_to_vec(incoming) * speed;
            let out = paddle.deflect(offset, velocity, 0.0);
            let out_deg = vec_to_deg(out);

            prop_assert!(out.y > 0.0);
            prop_assert!(out.length() >= speed - 1e-2);
            if offset > 0.0 {
                prop_assert!(out_deg <= incoming + 1e-3);
            } else {
                prop_assert!(out_deg >= incoming - 1e-3);
            }
        }
    }
}
