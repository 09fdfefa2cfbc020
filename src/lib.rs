//! Brick Breaker - a breakout-style arcade game core
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (physics world, entities, contact resolution, game state)
//! - `render`: Draw-call seam consumed by whatever renders the game
//! - `settings`: Data-driven tuning and visual preferences

pub mod render;
pub mod settings;
pub mod sim;

pub use render::{Canvas, DrawCommand, DrawList, Sprite};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest wall-clock delta accepted per frame (prevents spiral of death)
    pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;

    /// Solver iterations per step
    pub const VELOCITY_ITERATIONS: usize = 8;
    pub const POSITION_ITERATIONS: usize = 3;

    /// Pixels per physics metre
    pub const PTM_RATIO: f32 = 32.0;

    /// Playfield dimensions (pixels, y up)
    pub const SCREEN_WIDTH: f32 = 1920.0;
    pub const SCREEN_HEIGHT: f32 = 1080.0;

    /// Brick sprite size (pixels)
    pub const BRICK_WIDTH: f32 = 64.0;
    pub const BRICK_HEIGHT: f32 = 32.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 128.0;
    pub const PADDLE_HEIGHT: f32 = 32.0;
    /// Paddle centre height above the bottom edge
    pub const PADDLE_Y: f32 = 30.0;
    /// Largest rotation applied to a ball hitting the very tip of the paddle
    pub const PADDLE_MAX_DEFLECTION_DEG: f32 = 45.0;
    /// Outgoing balls never leave flatter than this (degrees above horizontal)
    pub const MIN_BOUNCE_ANGLE_DEG: f32 = 15.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 16.0;
    /// Ball centre height while attached to the paddle
    pub const ATTACHED_BALL_Y: f32 = 64.0;
    /// Launch speed (pixels/s)
    pub const BALL_LAUNCH_SPEED: f32 = 512.0;
    /// Launch direction is 90° ± this many degrees
    pub const LAUNCH_SPREAD_DEG: f32 = 5.0;

    /// Player lives at the start of a game
    pub const STARTING_LIVES: u32 = 3;
    /// Points awarded per brick hit
    pub const BRICK_HIT_SCORE: u64 = 1;

    /// Debris particles spawned per brick hit
    pub const DEBRIS_BURST: usize = 10;
    /// Debris lifetime in seconds
    pub const DEBRIS_TTL: f32 = 0.3;
    /// Number of debris sprite variants
    pub const DEBRIS_VARIANTS: u8 = 3;

    /// Shared power-up cooldown (seconds)
    pub const POWER_COOLDOWN: f32 = 5.0;

    /// Screen shake strengths
    pub const SHAKE_BRICK_HIT: f32 = 10.0;
    pub const SHAKE_LAUNCH: f32 = 20.0;
    pub const SHAKE_LIFE_LOST: f32 = 40.0;
}

/// Convert a pixel-space vector to physics units
#[inline]
pub fn pixels_to_physics(v: Vec2) -> Vec2 {
    v / consts::PTM_RATIO
}

/// Convert a physics-space vector to pixels
#[inline]
pub fn physics_to_pixels(v: Vec2) -> Vec2 {
    v * consts::PTM_RATIO
}

/// Unit vector pointing at `degrees` (0° = +x, 90° = straight up)
#[inline]
pub fn deg_to_vec(degrees: f32) -> Vec2 {
    let r = degrees.to_radians();
    Vec2::new(r.cos(), r.sin())
}

/// Direction of a vector in degrees, [-180, 180]
#[inline]
pub fn vec_to_deg(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_conversion_round_trips_through_scale() {
        let px = Vec2::new(960.0, 64.0);
        let m = pixels_to_physics(px);
        assert!((m.x - 30.0).abs() < 1e-5);
        assert!((m.y - 2.0).abs() < 1e-5);
        assert!((physics_to_pixels(m) - px).length() < 1e-3);
    }

    #[test]
    fn ninety_degrees_points_up() {
        let up = deg_to_vec(90.0);
        assert!(up.x.abs() < 1e-6);
        assert!((up.y - 1.0).abs() < 1e-6);
        assert!((vec_to_deg(up) - 90.0).abs() < 1e-4);
    }
}
