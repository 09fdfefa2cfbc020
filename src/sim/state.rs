//! Game state and controller
//!
//! [`Game`] owns the physics world, the entity store and the contact
//! collector, plus the player-facing state: phase, lives, score, whether the
//! ball rides the paddle, and the cosmetic extras (particles, screen shake).
//! Per-frame stepping and contact resolution live in `tick.rs`.

use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::BallEntity;
use super::brick::BrickEntity;
use super::clock::FrameClock;
use super::contact::ContactCollector;
use super::entity::{Blueprint, EntityId, EntityKind};
use super::level::Level;
use super::paddle::PaddleEntity;
use super::particle::Particle;
use super::physics::{
    BodyDesc, ColliderMaterial, PhysicsBody, PhysicsConfig, PhysicsWorld, ShapeDesc,
};
use super::store::EntityStore;
use crate::consts::*;
use crate::render::{Canvas, Sprite};
use crate::settings::Settings;
use crate::{physics_to_pixels, pixels_to_physics};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen; a click starts a new game
    Start,
    /// Active gameplay
    Playing,
}

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// "1": spawn extra balls
    Multiball,
    /// "2": speed every ball up
    SpeedUp,
    Escape,
}

/// Input delivered by the windowing layer, once per event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor x in playfield pixels
    CursorMoved { x: f32 },
    MouseClicked,
    KeyPressed(Key),
}

pub struct Game {
    pub settings: Settings,
    pub(crate) world: PhysicsWorld,
    pub(crate) store: EntityStore,
    pub(crate) collector: Arc<ContactCollector>,
    pub phase: GamePhase,
    /// Ball sits on the paddle waiting for launch
    pub ball_attached: bool,
    pub lives: u32,
    pub score: u64,
    pub(crate) paddle: Option<EntityId>,
    /// Left/top/right walls; solid but owned by no entity
    pub(crate) edges: Option<PhysicsBody>,
    pub(crate) level: Level,
    pub(crate) cursor_x: f32,
    pub(crate) rng: Pcg32,
    pub particles: Vec<Particle>,
    /// Seconds until the next power-up may fire
    pub power_cooldown: f32,
    /// Strongest pending shake trigger (pixels), decays every tick
    pub screen_shake: f32,
    pub(crate) clock: FrameClock,
    pub time_ticks: u64,
    pub quit_requested: bool,
}

impl Game {
    /// Build the playfield for `level` with a single ball on the paddle
    pub fn new(settings: Settings, level: Level, seed: u64) -> Self {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let collector = Arc::new(ContactCollector::new());
        world.set_contact_listener(collector.clone());
        let clock = FrameClock::new(world.config().dt, MAX_FRAME_DT);

        let mut game = Self {
            lives: settings.starting_lives,
            settings,
            world,
            store: EntityStore::new(),
            collector,
            phase: GamePhase::Start,
            ball_attached: true,
            score: 0,
            paddle: None,
            edges: None,
            level: Level::empty(),
            cursor_x: SCREEN_WIDTH * 0.5,
            rng: Pcg32::seed_from_u64(seed),
            particles: Vec::new(),
            power_cooldown: 0.0,
            screen_shake: 0.0,
            clock,
            time_ticks: 0,
            quit_requested: false,
        };

        game.edges = Some(game.create_screen_edges());
        game.load_level(level);
        game.store.spawn(
            &mut game.world,
            BallEntity::blueprint(
                Vec2::new(game.cursor_x, ATTACHED_BALL_Y),
                game.settings.launch_speed,
            ),
        );

        log::info!(
            "Game ready: {} bricks, {} lives, seed {seed}",
            game.store.brick_count(),
            game.lives
        );
        game
    }

    fn create_screen_edges(&mut self) -> PhysicsBody {
        let (w, h) = (SCREEN_WIDTH, SCREEN_HEIGHT);
        let segment = |a: Vec2, b: Vec2| ShapeDesc::Segment {
            a: pixels_to_physics(a),
            b: pixels_to_physics(b),
        };

        let edges = self
            .world
            .create_body(None, &BodyDesc::fixed(segment(Vec2::ZERO, Vec2::new(0.0, h))));
        for shape in [
            segment(Vec2::new(0.0, h), Vec2::new(w, h)),
            segment(Vec2::new(w, h), Vec2::new(w, 0.0)),
        ] {
            self.world
                .attach_collider(edges.body_handle, &shape, ColliderMaterial::default());
        }
        edges
    }

    /// Replace the playfield: every non-ball entity is destroyed, then the
    /// ground, paddle and the level's bricks are created.
    pub fn load_level(&mut self, level: Level) {
        let cleared = self.store.clear_non_balls(&mut self.world);

        self.store
            .spawn(&mut self.world, Blueprint::ground(SCREEN_WIDTH));
        self.paddle = Some(self.store.spawn(
            &mut self.world,
            PaddleEntity::blueprint(Vec2::new(self.cursor_x, PADDLE_Y)),
        ));
        for brick in &level.bricks {
            let centre = Vec2::new(brick.x as f32, brick.y as f32);
            self.store
                .spawn(&mut self.world, BrickEntity::blueprint(brick.colour, centre));
        }

        log::info!(
            "Level loaded: {} bricks ({cleared} old entities cleared)",
            level.bricks.len()
        );
        self.level = level;
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::CursorMoved { x } => {
                let half = PADDLE_WIDTH * 0.5;
                self.cursor_x = x.clamp(half, SCREEN_WIDTH - half);
            }
            InputEvent::MouseClicked => match self.phase {
                GamePhase::Start => self.start_game(),
                GamePhase::Playing => {
                    self.launch_ball();
                }
            },
            InputEvent::KeyPressed(Key::Multiball) => {
                self.multiball();
            }
            InputEvent::KeyPressed(Key::SpeedUp) => {
                self.speed_up();
            }
            InputEvent::KeyPressed(Key::Escape) => self.quit_requested = true,
        }
    }

    /// Advance by one rendered frame; returns the number of fixed ticks run
    pub fn update(&mut self, frame_seconds: f32) -> u32 {
        super::tick::update(self, frame_seconds)
    }

    /// Start → Playing with a fresh copy of the level, full lives and zero score
    pub fn start_game(&mut self) {
        self.phase = GamePhase::Playing;
        self.lives = self.settings.starting_lives;
        self.score = 0;
        self.power_cooldown = 0.0;
        self.particles.clear();

        let level = std::mem::take(&mut self.level);
        self.load_level(level);

        let extra: Vec<EntityId> = self.store.balls().iter().skip(1).map(|e| e.id).collect();
        for id in extra {
            self.store.despawn(&mut self.world, id);
        }
        if let Some(ball) = self.store.balls().first().map(|e| e.id) {
            self.reattach(ball);
        }

        log::info!("Game started: {} lives", self.lives);
    }

    /// Fire the attached ball upward. Returns false if there is nothing to launch.
    pub fn launch_ball(&mut self) -> bool {
        if self.phase != GamePhase::Playing || !self.ball_attached {
            return false;
        }
        assert_eq!(
            self.store.ball_count(),
            1,
            "an attached ball must be the only ball"
        );

        self.ball_attached = false;
        self.shake(SHAKE_LAUNCH);

        let spread = self.settings.launch_spread_deg;
        let angle = 90.0
            + if spread > 0.0 {
                self.rng.random_range(-spread..=spread)
            } else {
                0.0
            };
        let speed = self.settings.launch_speed;
        let ball = self.store.balls()[0].id;
        self.kick_ball(ball, angle, speed);

        log::debug!("Launched at {angle:.1}°");
        true
    }

    fn power_ready(&self) -> bool {
        self.phase == GamePhase::Playing && !self.ball_attached && self.power_cooldown <= 0.0
    }

    /// Spawn extra balls at the first ball's position. Returns how many were added.
    pub fn multiball(&mut self) -> usize {
        if !self.power_ready() {
            return 0;
        }
        let Some((origin, speed)) = self.store.balls().first().map(|e| {
            (
                physics_to_pixels(self.world.body_position(&e.body).0),
                e.as_ball().map_or(self.settings.launch_speed, |b| b.cruise_speed),
            )
        }) else {
            return 0;
        };

        let count = self.settings.multiball_count;
        for _ in 0..count {
            let id = self
                .store
                .spawn(&mut self.world, BallEntity::blueprint(origin, speed));
            let angle = 90.0 + self.rng.random_range(-45.0f32..=45.0);
            self.kick_ball(id, angle, speed);
        }

        self.power_cooldown = self.settings.power_cooldown;
        log::debug!("Multiball: {} balls in play", self.store.ball_count());
        count
    }

    /// Raise every ball's cruise speed. Returns false while on cooldown.
    pub fn speed_up(&mut self) -> bool {
        if !self.power_ready() {
            return false;
        }
        let factor = self.settings.speed_up_factor;
        for entity in self.store.balls_mut() {
            if let EntityKind::Ball(ball) = &mut entity.kind {
                ball.cruise_speed *= factor;
            }
        }

        self.power_cooldown = self.settings.power_cooldown;
        log::debug!("Speed-up x{factor}");
        true
    }

    pub(crate) fn kick_ball(&mut self, id: EntityId, degrees: f32, speed: f32) {
        if let Some(entity) = self.store.get_mut(id) {
            let body = entity.body;
            if let EntityKind::Ball(ball) = &mut entity.kind {
                ball.kick(&mut self.world, &body, degrees, speed);
            }
        }
    }

    /// Put `ball` back on the paddle, at rest
    pub(crate) fn reattach(&mut self, ball: EntityId) {
        self.ball_attached = true;
        if let Some(entity) = self.store.get(ball) {
            let pos = pixels_to_physics(Vec2::new(self.cursor_x, ATTACHED_BALL_Y));
            self.world.set_transform(&entity.body, pos, 0.0);
            self.world.set_velocity(&entity.body, Vec2::ZERO);
        }
    }

    /// Keep the attached ball glued above the paddle
    pub(crate) fn hold_attached_ball(&mut self) {
        assert_eq!(
            self.store.ball_count(),
            1,
            "an attached ball must be the only ball"
        );
        let ball = self.store.balls()[0].id;
        self.reattach(ball);
    }

    pub(crate) fn shake(&mut self, strength: f32) {
        if self.settings.effective_screen_shake() {
            self.screen_shake = self.screen_shake.max(strength);
        }
    }

    pub(crate) fn paddle_body(&self) -> Option<PhysicsBody> {
        self.paddle
            .and_then(|id| self.store.get(id))
            .map(|e| e.body)
    }

    pub fn draw(&mut self, canvas: &mut dyn Canvas) {
        match self.phase {
            GamePhase::Start => {
                let centre = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT) * 0.5;
                canvas.blit(Sprite::Logo, centre, 0.0, Vec2::ONE);
            }
            GamePhase::Playing => {
                for entity in self.store.entities_mut() {
                    entity.draw(&self.world, canvas);
                }
                for ball in self.store.balls_mut() {
                    ball.draw(&self.world, canvas);
                }
                for particle in &self.particles {
                    particle.draw(canvas);
                }

                canvas.text(
                    Vec2::new(20.0, SCREEN_HEIGHT - 40.0),
                    &format!("Lives: {}", self.lives),
                );
                canvas.text(
                    Vec2::new(20.0, SCREEN_HEIGHT - 80.0),
                    &format!("Score: {}", self.score),
                );
            }
        }
    }

    /// Destroy every entity, then the remaining bodies. Safe to call twice.
    pub fn shutdown(&mut self) {
        let entities = self.store.len();
        self.store.clear(&mut self.world);
        if let Some(edges) = self.edges.take() {
            self.world.remove_body(&edges);
        }
        self.particles.clear();
        self.paddle = None;
        log::info!(
            "Shutdown: {entities} entities destroyed, {} bodies left",
            self.world.body_count()
        );
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Collector receiving this game's contacts
    pub fn contacts(&self) -> &ContactCollector {
        &self.collector
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn paddle_id(&self) -> Option<EntityId> {
        self.paddle
    }

    pub fn cursor_x(&self) -> f32 {
        self.cursor_x
    }

    pub fn brick_count(&self) -> usize {
        self.store.brick_count()
    }

    pub fn ball_count(&self) -> usize {
        self.store.ball_count()
    }

    /// Ball centre positions (pixels)
    pub fn ball_positions(&self) -> Vec<Vec2> {
        self.store
            .balls()
            .iter()
            .filter_map(|e| self.store.position(&self.world, e.id))
            .collect()
    }
}
