//! Physics world adapter
//!
//! Wraps the rapier2d boilerplate behind a small API: bodies and fixtures go
//! in, positions/velocities and contacts come out. Everything here is in
//! physics units (metres); callers convert with [`crate::pixels_to_physics`].
//!
//! The back-reference from a body to its game entity is an [`EntityId`]
//! stored in the body's `user_data`. Zero means "no entity", which is how the
//! side and top screen edges stay solid without being gameplay-significant.

use std::num::NonZeroUsize;
use std::sync::Arc;

use glam::Vec2;
use rapier2d::prelude::*;

use super::contact::{Contact, ContactListener};
use super::entity::EntityId;
use crate::consts::{POSITION_ITERATIONS, SIM_DT, VELOCITY_ITERATIONS};

fn to_na(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn from_na(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// World-wide simulation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    pub gravity: Vec2,
    /// Step length in seconds
    pub dt: f32,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    /// Let idle bodies fall asleep
    pub allow_sleeping: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            // Everything moves by assigned velocity, never by forces
            gravity: Vec2::ZERO,
            dt: SIM_DT,
            velocity_iterations: VELOCITY_ITERATIONS,
            position_iterations: POSITION_ITERATIONS,
            allow_sleeping: true,
        }
    }
}

/// How the simulation treats a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Solver-integrated; used for the ball so contacts produce a bounce
    Dynamic,
    /// Never moves (ground and screen edges)
    Fixed,
    /// Moved by game logic through target positions (bricks, paddle)
    KinematicPositionBased,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
            BodyType::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
        }
    }
}

/// Collision shape of a fixture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
    /// Two-sided line segment in body-local coordinates
    Segment { a: Vec2, b: Vec2 },
}

impl ShapeDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ShapeDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ShapeDesc::Cuboid {
                half_width,
                half_height,
            } => ColliderBuilder::cuboid(half_width, half_height),
            ShapeDesc::Segment { a, b } => {
                ColliderBuilder::segment(point![a.x, a.y], point![b.x, b.y])
            }
        }
    }
}

/// Surface properties of a fixture
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub restitution_combine: CoefficientCombineRule,
    pub friction: f32,
    pub friction_combine: CoefficientCombineRule,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            restitution_combine: CoefficientCombineRule::Average,
            friction: 0.1,
            friction_combine: CoefficientCombineRule::Average,
            density: 1.0,
        }
    }
}

impl ColliderMaterial {
    /// Perfectly elastic and frictionless, whatever it touches
    pub fn bouncy() -> Self {
        Self {
            restitution: 1.0,
            restitution_combine: CoefficientCombineRule::Max,
            friction: 0.0,
            friction_combine: CoefficientCombineRule::Min,
            density: 1.0,
        }
    }
}

/// Description of a body and its primary fixture
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    pub ccd: bool,
    pub shape: ShapeDesc,
    pub material: ColliderMaterial,
}

impl BodyDesc {
    fn with_type(body_type: BodyType, shape: ShapeDesc) -> Self {
        Self {
            body_type,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            fixed_rotation: false,
            ccd: false,
            shape,
            material: ColliderMaterial::default(),
        }
    }

    pub fn dynamic(shape: ShapeDesc) -> Self {
        Self::with_type(BodyType::Dynamic, shape)
    }

    pub fn fixed(shape: ShapeDesc) -> Self {
        let mut desc = Self::with_type(BodyType::Fixed, shape);
        desc.gravity_scale = 0.0;
        desc.fixed_rotation = true;
        desc
    }

    pub fn kinematic(shape: ShapeDesc) -> Self {
        let mut desc = Self::with_type(BodyType::KinematicPositionBased, shape);
        desc.gravity_scale = 0.0;
        desc
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }

    pub fn with_material(mut self, material: ColliderMaterial) -> Self {
        self.material = material;
        self
    }
}

/// Handle pair owned by an entity: its body and primary fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

// ---------------------------------------------------------------------------
// Listener bridge
// ---------------------------------------------------------------------------

/// Forwards rapier's "collision started" events to the registered listener.
/// Runs inside `step()`, so it must do nothing but hand the record over.
struct ListenerBridge<'a> {
    listener: Option<&'a dyn ContactListener>,
}

impl EventHandler for ListenerBridge<'_> {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let (CollisionEvent::Started(h1, h2, _), Some(listener)) = (event, self.listener) {
            listener.begin_contact(Contact::new(h1, h2));
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// The simulated world. Owned by the game controller.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    listener: Option<Arc<dyn ContactListener>>,
    steps: u64,
}

impl PhysicsWorld {
    pub fn new(config: PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters {
            dt: config.dt,
            ..IntegrationParameters::default()
        };
        if let Some(iterations) = NonZeroUsize::new(config.velocity_iterations) {
            integration_parameters.num_solver_iterations = iterations;
        }
        integration_parameters.num_internal_pgs_iterations = config.position_iterations;

        Self {
            config,
            gravity: to_na(config.gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            listener: None,
            steps: 0,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Register the object that receives contacts during `step()`.
    /// Replaces any previously registered listener.
    pub fn set_contact_listener(&mut self, listener: Arc<dyn ContactListener>) {
        self.listener = Some(listener);
    }

    /// Create a body with its primary fixture.
    /// `owner` becomes the body's back-reference; `None` leaves it blank.
    pub fn create_body(&mut self, owner: Option<EntityId>, desc: &BodyDesc) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(to_na(desc.position))
            .rotation(desc.rotation)
            .linvel(to_na(desc.velocity))
            .gravity_scale(desc.gravity_scale)
            .locked_axes(if desc.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .ccd_enabled(desc.ccd)
            .can_sleep(self.config.allow_sleeping)
            .user_data(owner.map_or(0, EntityId::to_user_data))
            .build();

        let body_handle = self.bodies.insert(rb);
        let collider_handle = self.attach_collider(body_handle, &desc.shape, desc.material);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Add another fixture to an existing body
    pub fn attach_collider(
        &mut self,
        body_handle: RigidBodyHandle,
        shape: &ShapeDesc,
        material: ColliderMaterial,
    ) -> ColliderHandle {
        let collider = shape
            .build_collider()
            .restitution(material.restitution)
            .restitution_combine_rule(material.restitution_combine)
            .friction(material.friction)
            .friction_combine_rule(material.friction_combine)
            .density(material.density)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        self.colliders
            .insert_with_parent(collider, body_handle, &mut self.bodies)
    }

    /// Remove a body and all of its fixtures. Returns false if it was already gone.
    pub fn remove_body(&mut self, body: &PhysicsBody) -> bool {
        self.bodies
            .remove(
                body.body_handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Advance the simulation by one fixed step.
    /// New contacts are handed to the registered listener while this runs.
    pub fn step(&mut self) {
        let bridge = ListenerBridge {
            listener: self.listener.as_deref(),
        };

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &bridge,
        );
        self.steps += 1;
    }

    /// Number of completed steps
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Resolve a fixture to the entity owning its body
    pub fn collider_owner(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body = self.bodies.get(collider.parent()?)?;
        EntityId::from_user_data(body.user_data)
    }

    /// Teleport a body (ignores continuity; used for the attached ball)
    pub fn set_transform(&mut self, body: &PhysicsBody, pos: Vec2, rotation: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_position(Isometry::new(to_na(pos), rotation), true);
        }
    }

    /// Target position for a kinematic body, reached during the next step
    pub fn set_kinematic_position(&mut self, body: &PhysicsBody, pos: Vec2, rotation: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_next_kinematic_position(Isometry::new(to_na(pos), rotation));
        }
    }

    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(to_na(vel), true);
        }
    }

    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| from_na(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    /// Current position and rotation (radians)
    pub fn body_position(&self, body: &PhysicsBody) -> (Vec2, f32) {
        self.bodies
            .get(body.body_handle)
            .map(|rb| (from_na(rb.translation()), rb.rotation().angle()))
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    pub fn contains_body(&self, body: &PhysicsBody) -> bool {
        self.bodies.contains(body.body_handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}
