//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Entities are only created or destroyed outside the physics step
//! - No rendering or platform dependencies

pub mod ball;
pub mod brick;
pub mod clock;
pub mod collision;
pub mod contact;
pub mod entity;
pub mod level;
pub mod paddle;
pub mod particle;
pub mod physics;
pub mod state;
pub mod store;
pub mod tick;

pub use ball::BallEntity;
pub use brick::{BrickColour, BrickEntity};
pub use clock::FrameClock;
pub use collision::{ContactPair, classify};
pub use contact::{Contact, ContactCollector, ContactListener};
pub use entity::{Blueprint, Entity, EntityId, EntityKind, EntityType};
pub use level::{BrickPlacement, Level, LevelError};
pub use paddle::PaddleEntity;
pub use particle::Particle;
pub use physics::{BodyDesc, BodyType, ColliderMaterial, PhysicsBody, PhysicsConfig, PhysicsWorld, ShapeDesc};
pub use state::{Game, GamePhase, InputEvent, Key};
pub use store::{DeadEntityList, EntityStore};
pub use tick::{ResolveStats, resolve_contacts, sweep_dead, tick, update};
