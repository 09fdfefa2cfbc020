//! Fixed timestep simulation tick
//!
//! One tick: age the cosmetic state, step the physics world, then resolve
//! the contacts collected during that step. Entities condemned while
//! resolving go on a [`DeadEntityList`] and are destroyed only after every
//! contact has been looked at, so nothing is removed from a collection that
//! is still being scanned.

use glam::Vec2;

use super::collision::{ContactPair, classify};
use super::contact::Contact;
use super::entity::{EntityId, EntityKind};
use super::particle::spawn_debris;
use super::state::{Game, GamePhase};
use super::store::DeadEntityList;
use crate::consts::*;
use crate::{physics_to_pixels, pixels_to_physics};

/// What one batch of contacts did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub bricks_hit: u32,
    pub bricks_destroyed: u32,
    pub paddle_hits: u32,
    /// Extra balls that fell out
    pub balls_lost: u32,
    pub lives_lost: u32,
}

/// Advance by one rendered frame of `frame_seconds`.
/// Returns the number of fixed ticks that ran.
pub fn update(game: &mut Game, frame_seconds: f32) -> u32 {
    // Paddle follows the cursor; the kinematic target is reached next step
    if let Some(paddle) = game.paddle_body() {
        let target = pixels_to_physics(Vec2::new(game.cursor_x, PADDLE_Y));
        game.world.set_kinematic_position(&paddle, target, 0.0);
    }

    if game.ball_attached {
        game.hold_attached_ball();
    }

    let steps = game.clock.advance(frame_seconds);
    for _ in 0..steps {
        tick(game);
    }
    steps
}

/// Advance the game by one fixed timestep
pub fn tick(game: &mut Game) -> ResolveStats {
    let dt = game.clock.dt();
    game.time_ticks += 1;

    game.particles.retain_mut(|p| p.update(dt));
    game.power_cooldown = (game.power_cooldown - dt).max(0.0);
    game.screen_shake *= 0.9; // Fast decay
    if game.screen_shake < 0.5 {
        game.screen_shake = 0.0;
    }

    game.world.step();

    let contacts = game.collector.drain();
    let mut dead = DeadEntityList::new();
    let stats = resolve_contacts(game, &contacts, &mut dead);
    sweep_dead(game, &mut dead);

    if !game.ball_attached {
        for entity in game.store.balls() {
            if let Some(ball) = entity.as_ball() {
                ball.sustain(&mut game.world, &entity.body);
            }
        }
    }

    stats
}

/// Apply the gameplay effect of each contact, in arrival order.
///
/// A brick reacts to at most one hit per batch. A ball already marked dead,
/// or already handled against the ground in this batch, is not looked at
/// again. Contacts naming a body with no entity are ignored.
pub fn resolve_contacts(
    game: &mut Game,
    contacts: &[Contact],
    dead: &mut DeadEntityList,
) -> ResolveStats {
    let mut stats = ResolveStats::default();
    let mut active_balls = game.store.ball_count();
    let mut bricks_hit: Vec<EntityId> = Vec::new();
    let mut grounded: Vec<EntityId> = Vec::new();

    for contact in contacts {
        let (Some(a), Some(b)) = (
            game.world.collider_owner(contact.fixture_a),
            game.world.collider_owner(contact.fixture_b),
        ) else {
            continue;
        };
        let (Some(type_a), Some(type_b)) = (game.store.entity_type(a), game.store.entity_type(b))
        else {
            continue;
        };
        let Some(pair) = classify((a, type_a), (b, type_b)) else {
            continue;
        };
        if dead.contains(pair.ball()) {
            continue;
        }

        match pair {
            ContactPair::BrickBall { brick, .. } => {
                if dead.contains(brick) || bricks_hit.contains(&brick) {
                    continue;
                }
                bricks_hit.push(brick);
                hit_brick(game, brick, dead, &mut stats);
            }
            ContactPair::PaddleBall { paddle, ball } => {
                deflect_off_paddle(game, paddle, ball);
                stats.paddle_hits += 1;
            }
            ContactPair::GroundBall { ball, .. } => {
                if grounded.contains(&ball) {
                    continue;
                }
                grounded.push(ball);

                if active_balls > 1 {
                    dead.push(ball);
                    active_balls -= 1;
                    stats.balls_lost += 1;
                    log::debug!("Ball {ball} lost, {active_balls} left");
                } else {
                    lose_life(game, ball);
                    stats.lives_lost += 1;
                }
            }
        }
    }

    stats
}

/// Destroy everything on the dead list: body first, then the entity.
/// Returns how many entities were destroyed.
pub fn sweep_dead(game: &mut Game, dead: &mut DeadEntityList) -> usize {
    dead.take()
        .into_iter()
        .filter(|&id| game.store.despawn(&mut game.world, id).is_some())
        .count()
}

fn hit_brick(game: &mut Game, brick: EntityId, dead: &mut DeadEntityList, stats: &mut ResolveStats) {
    let Some(body) = game.store.get(brick).map(|e| e.body) else {
        return;
    };

    let pos = physics_to_pixels(game.world.body_position(&body).0);
    let cap = game.settings.max_particles();
    spawn_debris(&mut game.particles, &mut game.rng, pos, DEBRIS_BURST, cap);
    game.shake(SHAKE_BRICK_HIT);

    let destroyed = match game.store.get_mut(brick).map(|e| &mut e.kind) {
        Some(EntityKind::Brick(state)) => state.handle_collision(&mut game.score),
        _ => return,
    };
    stats.bricks_hit += 1;

    if destroyed {
        dead.push(brick);
        stats.bricks_destroyed += 1;
        log::debug!("Brick {brick} destroyed, score {}", game.score);
    }
}

fn deflect_off_paddle(game: &mut Game, paddle: EntityId, ball: EntityId) {
    let Some((paddle_state, paddle_body)) = game
        .store
        .get(paddle)
        .and_then(|e| e.as_paddle().map(|p| (*p, e.body)))
    else {
        return;
    };
    let Some(entity) = game.store.get_mut(ball) else {
        return;
    };
    let ball_body = entity.body;
    if let EntityKind::Ball(state) = &mut entity.kind {
        paddle_state.handle_collision(&mut game.world, &paddle_body, state, &ball_body);
    }
}

/// The last ball fell out: it goes back on the paddle and a life is spent
fn lose_life(game: &mut Game, ball: EntityId) {
    game.lives = game.lives.saturating_sub(1);
    game.shake(SHAKE_LIFE_LOST);
    game.reattach(ball);

    if game.lives < 1 {
        game.phase = GamePhase::Start;
        log::info!("Game over, final score {}", game.score);
    } else {
        log::info!("Ball lost, {} lives left", game.lives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::brick::BrickColour;
    use crate::sim::entity::EntityType;
    use crate::sim::level::{BrickPlacement, Level};
    use crate::sim::state::InputEvent;
    use rapier2d::prelude::ColliderHandle;

    fn level_of(bricks: &[(BrickColour, i32, i32)]) -> Level {
        Level {
            bricks: bricks
                .iter()
                .map(|&(colour, x, y)| BrickPlacement { colour, x, y })
                .collect(),
        }
    }

    fn one_red() -> Level {
        level_of(&[(BrickColour::Red, 960, 700)])
    }

    fn launched_with(settings: Settings, level: Level) -> Game {
        let mut game = Game::new(settings, level, 7);
        game.start_game();
        assert!(game.launch_ball());
        game
    }

    fn launched(level: Level) -> Game {
        launched_with(Settings::default(), level)
    }

    fn fixture(game: &Game, id: EntityId) -> ColliderHandle {
        game.store().get(id).unwrap().body.collider_handle
    }

    fn touch(game: &Game, a: EntityId, b: EntityId) -> Contact {
        Contact::new(fixture(game, a), fixture(game, b))
    }

    fn first_of(game: &Game, wanted: EntityType) -> EntityId {
        game.store()
            .entities()
            .iter()
            .chain(game.store().balls())
            .find(|e| e.entity_type() == wanted)
            .map(|e| e.id)
            .unwrap()
    }

    fn ball_ids(game: &Game) -> Vec<EntityId> {
        game.store().balls().iter().map(|e| e.id).collect()
    }

    fn colour_of(game: &Game, brick: EntityId) -> Option<BrickColour> {
        game.store().get(brick).and_then(|e| e.as_brick()).map(|b| b.colour)
    }

    fn resolve(game: &mut Game, contacts: &[Contact]) -> (ResolveStats, usize) {
        let mut dead = DeadEntityList::new();
        let stats = resolve_contacts(game, contacts, &mut dead);
        let swept = sweep_dead(game, &mut dead);
        (stats, swept)
    }

    #[test]
    fn test_brick_hit_degrades_and_scores() {
        let mut game = launched(one_red());
        let brick = first_of(&game, EntityType::Brick);
        let ball = first_of(&game, EntityType::Ball);

        let contact = touch(&game, brick, ball);
        let (stats, swept) = resolve(&mut game, &[contact]);

        assert_eq!(colour_of(&game, brick), Some(BrickColour::Orange));
        assert_eq!(game.score, 1);
        assert_eq!(game.particles.len(), DEBRIS_BURST);
        assert_eq!(stats.bricks_hit, 1);
        assert_eq!(swept, 0);
        assert_eq!(game.screen_shake, SHAKE_LAUNCH.max(SHAKE_BRICK_HIT));
    }

    #[test]
    fn test_contact_order_is_normalised() {
        let mut game = launched(one_red());
        let brick = first_of(&game, EntityType::Brick);
        let ball = first_of(&game, EntityType::Ball);

        let contact = touch(&game, ball, brick);
        resolve(&mut game, &[contact]);
        assert_eq!(colour_of(&game, brick), Some(BrickColour::Orange));
        assert_eq!(game.score, 1);
    }

    /// Ball `offset` pixels right of the paddle centre, falling at launch speed
    fn falling_onto_paddle(offset: f32) -> (Game, EntityId, EntityId) {
        let mut game = launched(Level::empty());
        let paddle = game.paddle_id().unwrap();
        let ball = first_of(&game, EntityType::Ball);

        let paddle_body = game.store().get(paddle).unwrap().body;
        let centre = physics_to_pixels(game.world().body_position(&paddle_body).0);
        let body = game.store().get(ball).unwrap().body;
        let at = Vec2::new(centre.x + offset, centre.y + PADDLE_HEIGHT * 0.5 + BALL_RADIUS);
        game.world.set_transform(&body, pixels_to_physics(at), 0.0);
        game.kick_ball(ball, 270.0, BALL_LAUNCH_SPEED);
        (game, paddle, ball)
    }

    fn ball_velocity(game: &Game, ball: EntityId) -> Vec2 {
        let body = game.store().get(ball).unwrap().body;
        physics_to_pixels(game.world().velocity(&body))
    }

    #[test]
    fn test_paddle_hit_biases_rebound() {
        let (mut game, paddle, ball) = falling_onto_paddle(40.0);

        let contact = touch(&game, paddle, ball);
        let (stats, swept) = resolve(&mut game, &[contact]);

        assert_eq!(stats.paddle_hits, 1);
        assert_eq!(swept, 0);
        let cruise = game.store().get(ball).unwrap().as_ball().unwrap().cruise_speed;
        let v = ball_velocity(&game, ball);
        assert!(v.x > 0.0, "v = {v}");
        assert!(v.y > 0.0, "v = {v}");
        assert!(v.length() >= cruise - 1e-2, "|v| = {}", v.length());
    }

    #[test]
    fn test_paddle_hit_ball_first_mirrors() {
        let (mut game, paddle, ball) = falling_onto_paddle(-40.0);

        let contact = touch(&game, ball, paddle);
        let (stats, _) = resolve(&mut game, &[contact]);

        assert_eq!(stats.paddle_hits, 1);
        let v = ball_velocity(&game, ball);
        assert!(v.x < 0.0, "v = {v}");
        assert!(v.y > 0.0, "v = {v}");
        assert!(v.length() >= BALL_LAUNCH_SPEED - 1e-2);
        assert_eq!(game.lives, STARTING_LIVES);
    }

    #[test]
    fn test_brick_removed_on_third_hit_across_ticks() {
        let mut game = launched(one_red());
        let brick = first_of(&game, EntityType::Brick);
        let ball = first_of(&game, EntityType::Ball);
        let bodies = game.world().body_count();
        let body = game.store().get(brick).unwrap().body;

        for _ in 0..2 {
            let contact = touch(&game, brick, ball);
            let (_, swept) = resolve(&mut game, &[contact]);
            assert_eq!(swept, 0);
        }
        assert_eq!(colour_of(&game, brick), Some(BrickColour::Yellow));

        let contact = touch(&game, brick, ball);
        let (stats, swept) = resolve(&mut game, &[contact]);
        assert_eq!(stats.bricks_destroyed, 1);
        assert_eq!(swept, 1);
        assert_eq!(game.score, 3);
        assert_eq!(game.brick_count(), 0);
        assert!(!game.store().contains(brick));
        assert_eq!(game.world().body_count(), bodies - 1);
        assert!(!game.world().contains_body(&body));
    }

    #[test]
    fn test_brick_hit_once_per_batch() {
        let mut game = launched(one_red());
        let brick = first_of(&game, EntityType::Brick);
        let ball = first_of(&game, EntityType::Ball);

        let contact = touch(&game, brick, ball);
        let (stats, _) = resolve(&mut game, &[contact, contact]);
        assert_eq!(stats.bricks_hit, 1);
        assert_eq!(colour_of(&game, brick), Some(BrickColour::Orange));
        assert_eq!(game.score, 1);
    }

    #[test]
    fn test_destroyed_brick_swept_exactly_once() {
        let mut settings = Settings::default();
        settings.multiball_count = 1;
        let mut game = launched_with(settings, level_of(&[(BrickColour::Yellow, 960, 700)]));
        game.multiball();
        let brick = first_of(&game, EntityType::Brick);
        let balls = ball_ids(&game);
        assert_eq!(balls.len(), 2);

        let mut dead = DeadEntityList::new();
        let contacts = [touch(&game, brick, balls[0]), touch(&game, balls[1], brick)];
        let stats = resolve_contacts(&mut game, &contacts, &mut dead);
        assert_eq!(stats.bricks_hit, 1);
        assert_eq!(dead.len(), 1);
        assert_eq!(game.score, 1);

        assert_eq!(sweep_dead(&mut game, &mut dead), 1);
        assert_eq!(sweep_dead(&mut game, &mut dead), 0);
        assert_eq!(game.brick_count(), 0);
    }

    #[test]
    fn test_extra_ball_on_ground_is_removed() {
        let mut game = launched(Level::empty());
        assert_eq!(game.multiball(), 4);
        let ground = first_of(&game, EntityType::Ground);
        let balls = ball_ids(&game);

        let contact = touch(&game, ground, balls[2]);
        let (stats, swept) = resolve(&mut game, &[contact]);
        assert_eq!(stats.balls_lost, 1);
        assert_eq!(swept, 1);
        assert_eq!(game.ball_count(), 4);
        assert!(!game.store().contains(balls[2]));
        assert_eq!(game.lives, 3);
        assert!(!game.ball_attached);
    }

    #[test]
    fn test_last_ball_on_ground_costs_life() {
        let mut game = launched(Level::empty());
        let ground = first_of(&game, EntityType::Ground);
        let ball = first_of(&game, EntityType::Ball);

        let contact = touch(&game, ball, ground);
        let (stats, swept) = resolve(&mut game, &[contact]);
        assert_eq!(stats.lives_lost, 1);
        assert_eq!(swept, 0);
        assert_eq!(game.lives, 2);
        assert!(game.ball_attached);
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.screen_shake, SHAKE_LIFE_LOST);

        let body = game.store().get(ball).unwrap().body;
        assert_eq!(game.world().velocity(&body), Vec2::ZERO);
        let pos = physics_to_pixels(game.world().body_position(&body).0);
        assert!((pos - Vec2::new(game.cursor_x(), ATTACHED_BALL_Y)).length() < 1e-3);
    }

    #[test]
    fn test_simultaneous_ground_contacts_keep_one_ball() {
        let mut settings = Settings::default();
        settings.multiball_count = 1;
        let mut game = launched_with(settings, Level::empty());
        game.multiball();
        let ground = first_of(&game, EntityType::Ground);
        let balls = ball_ids(&game);

        let contacts = [
            touch(&game, ground, balls[0]),
            touch(&game, ground, balls[0]),
            touch(&game, balls[1], ground),
        ];
        let (stats, swept) = resolve(&mut game, &contacts);

        assert_eq!(stats.balls_lost, 1);
        assert_eq!(stats.lives_lost, 1);
        assert_eq!(swept, 1);
        assert_eq!(game.lives, 2);
        // The ball that triggered the life loss is the one kept
        assert_eq!(ball_ids(&game), vec![balls[1]]);
        assert!(game.ball_attached);

        // The attached invariant holds on the next frame
        game.update(SIM_DT);
        assert_eq!(game.ball_count(), 1);
    }

    #[test]
    fn test_game_over_returns_to_start() {
        let mut game = launched(one_red());
        game.lives = 1;
        let ground = first_of(&game, EntityType::Ground);
        let ball = first_of(&game, EntityType::Ball);

        let contact = touch(&game, ground, ball);
        resolve(&mut game, &[contact]);
        assert_eq!(game.lives, 0);
        assert_eq!(game.phase, GamePhase::Start);
        assert!(game.ball_attached);

        // A click starts a fresh game
        game.handle_input(InputEvent::MouseClicked);
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.lives, 3);
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_unowned_and_non_ball_contacts_ignored() {
        let mut game = launched(one_red());
        let brick = first_of(&game, EntityType::Brick);
        let ball = first_of(&game, EntityType::Ball);
        let ground = first_of(&game, EntityType::Ground);
        let wall = game.edges.unwrap().collider_handle;

        let contacts = [
            Contact::new(wall, fixture(&game, ball)),
            touch(&game, ground, brick),
        ];
        let (stats, swept) = resolve(&mut game, &contacts);
        assert_eq!(stats, ResolveStats::default());
        assert_eq!(swept, 0);
        assert_eq!(game.score, 0);
        assert_eq!(game.lives, 3);
    }

    #[test]
    fn test_stale_contact_after_removal_ignored() {
        let mut game = launched(level_of(&[(BrickColour::Yellow, 960, 700)]));
        let brick = first_of(&game, EntityType::Brick);
        let ball = first_of(&game, EntityType::Ball);
        let contact = touch(&game, brick, ball);

        resolve(&mut game, &[contact]);
        assert_eq!(game.brick_count(), 0);

        let (stats, _) = resolve(&mut game, &[contact]);
        assert_eq!(stats.bricks_hit, 0);
        assert_eq!(game.score, 1);
    }

    #[test]
    fn test_particles_respect_settings() {
        let mut settings = Settings::default();
        settings.particles = false;
        let mut game = launched_with(settings, one_red());
        let brick = first_of(&game, EntityType::Brick);
        let ball = first_of(&game, EntityType::Ball);

        let contact = touch(&game, brick, ball);
        resolve(&mut game, &[contact]);
        assert!(game.particles.is_empty());
        assert_eq!(game.score, 1);
    }

    #[test]
    fn test_tick_consumes_collected_contacts() {
        let mut game = launched(one_red());
        let brick = first_of(&game, EntityType::Brick);
        let ball = first_of(&game, EntityType::Ball);

        use crate::sim::contact::ContactListener;
        game.contacts().begin_contact(touch(&game, brick, ball));
        let stats = tick(&mut game);

        assert_eq!(stats.bricks_hit, 1);
        assert!(game.contacts().is_empty());
        // Nothing left over for the next tick
        assert_eq!(tick(&mut game).bricks_hit, 0);
        assert_eq!(game.score, 1);
    }

    #[test]
    fn test_ball_breaks_brick_in_simulation() {
        let mut game = launched(level_of(&[(BrickColour::Red, 960, 400)]));
        let brick = first_of(&game, EntityType::Brick);

        // One second: up to the brick and partway back down
        for _ in 0..60 {
            game.update(SIM_DT);
        }

        assert_eq!(game.score, 1);
        assert_eq!(colour_of(&game, brick), Some(BrickColour::Orange));
        // Came back down at cruise speed
        let body = game.store().balls()[0].body;
        let v = physics_to_pixels(game.world().velocity(&body));
        assert!(v.y < 0.0);
        assert!((v.length() - BALL_LAUNCH_SPEED).abs() < 1.0);
    }

    #[test]
    fn test_ball_falls_through_ground_in_simulation() {
        let mut game = launched(Level::empty());
        let ball = first_of(&game, EntityType::Ball);
        let body = game.store().get(ball).unwrap().body;

        // Away from the paddle, heading straight down
        game.world
            .set_transform(&body, pixels_to_physics(Vec2::new(300.0, 100.0)), 0.0);
        game.kick_ball(ball, 270.0, BALL_LAUNCH_SPEED);

        for _ in 0..30 {
            game.update(SIM_DT);
        }

        assert_eq!(game.lives, 2);
        assert!(game.ball_attached);
        let pos = game.ball_positions()[0];
        assert!((pos - Vec2::new(game.cursor_x(), ATTACHED_BALL_Y)).length() < 1.0);
    }

    #[test]
    fn test_paddle_follows_cursor() {
        let mut game = Game::new(Settings::default(), Level::empty(), 7);
        game.handle_input(InputEvent::CursorMoved { x: 400.0 });
        game.update(SIM_DT);

        let paddle = game.store().get(game.paddle_id().unwrap()).unwrap().body;
        let pos = physics_to_pixels(game.world().body_position(&paddle).0);
        assert!((pos.x - 400.0).abs() < 1e-2, "paddle x = {}", pos.x);
        assert!((game.ball_positions()[0].x - 400.0).abs() < 1e-2);
    }

    #[test]
    fn test_cooldown_and_shake_decay_per_tick() {
        let mut game = launched(Level::empty());
        game.power_cooldown = 1.0;
        assert!(game.screen_shake > 0.0);

        for _ in 0..30 {
            tick(&mut game);
        }
        assert!((game.power_cooldown - 0.5).abs() < 1e-3);

        for _ in 0..60 {
            tick(&mut game);
        }
        assert_eq!(game.power_cooldown, 0.0);
        assert_eq!(game.screen_shake, 0.0);
    }

    #[test]
    #[should_panic(expected = "an attached ball must be the only ball")]
    fn test_attached_with_many_balls_is_rejected() {
        let mut game = launched(Level::empty());
        game.multiball();
        game.ball_attached = true;
        game.update(SIM_DT);
    }

    #[test]
    fn test_determinism() {
        // Two games with the same seed and inputs end up identical
        let mut game1 = Game::new(Settings::default(), Level::classic(), 99999);
        let mut game2 = Game::new(Settings::default(), Level::classic(), 99999);

        let inputs = [
            InputEvent::MouseClicked,
            InputEvent::CursorMoved { x: 900.0 },
            InputEvent::MouseClicked,
        ];
        for input in inputs {
            game1.handle_input(input);
            game2.handle_input(input);
        }
        for _ in 0..240 {
            game1.update(SIM_DT);
            game2.update(SIM_DT);
        }

        assert_eq!(game1.time_ticks, game2.time_ticks);
        assert_eq!(game1.score, game2.score);
        assert_eq!(game1.brick_count(), game2.brick_count());
        assert_eq!(game1.ball_positions(), game2.ball_positions());
    }
}
