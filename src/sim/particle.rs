//! Debris particles
//!
//! Purely cosmetic. A brick hit throws a burst of spinning debris that eases
//! from its starting speed/scale to a target speed/scale over a short life.

use glam::Vec2;
use rand::Rng;

use crate::consts::{DEBRIS_TTL, DEBRIS_VARIANTS};
use crate::deg_to_vec;
use crate::render::{Canvas, Sprite};

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    /// Orientation (degrees)
    pub angle: f32,
    /// Unit travel direction
    pub direction: Vec2,
    /// Spin (degrees per second)
    pub rotation_speed: f32,
    pub starting_speed: f32,
    pub target_speed: f32,
    pub starting_scale: f32,
    pub target_scale: f32,
    /// Total lifetime (seconds)
    pub ttl: f32,
    pub age: f32,
    pub sprite: Sprite,
}

impl Particle {
    /// Random piece of brick debris at `pos` (pixels)
    pub fn debris(rng: &mut impl Rng, pos: Vec2) -> Self {
        Self {
            pos,
            angle: rng.random_range(0..360) as f32,
            direction: deg_to_vec(rng.random_range(0..360) as f32),
            rotation_speed: (rng.random_range(0..1000) as f32 / 100.0 - 5.0).to_degrees(),
            starting_speed: rng.random_range(0..200) as f32,
            target_speed: rng.random_range(0..200) as f32,
            starting_scale: rng.random_range(0..100) as f32 / 200.0 + 0.1,
            target_scale: rng.random_range(0..100) as f32 / 1000.0 + 0.05,
            ttl: DEBRIS_TTL,
            age: 0.0,
            sprite: Sprite::Debris(rng.random_range(0..DEBRIS_VARIANTS)),
        }
    }

    /// Fraction of life used, 0..=1
    pub fn progress(&self) -> f32 {
        if self.ttl <= 0.0 {
            1.0
        } else {
            (self.age / self.ttl).clamp(0.0, 1.0)
        }
    }

    pub fn speed(&self) -> f32 {
        self.starting_speed + (self.target_speed - self.starting_speed) * self.progress()
    }

    pub fn scale(&self) -> f32 {
        self.starting_scale + (self.target_scale - self.starting_scale) * self.progress()
    }

    /// Advance by `dt`; returns false once the particle has expired
    pub fn update(&mut self, dt: f32) -> bool {
        self.pos += self.direction * self.speed() * dt;
        self.angle = (self.angle + self.rotation_speed * dt).rem_euclid(360.0);
        self.age += dt;
        self.age < self.ttl
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.blit(self.sprite, self.pos, self.angle, Vec2::splat(self.scale()));
    }
}

/// Push up to `count` debris particles without exceeding `cap` in total
pub fn spawn_debris(
    particles: &mut Vec<Particle>,
    rng: &mut impl Rng,
    pos: Vec2,
    count: usize,
    cap: usize,
) -> usize {
    let room = cap.saturating_sub(particles.len());
    let n = count.min(room);
    particles.extend((0..n).map(|_| Particle::debris(rng, pos)));
    n
}
