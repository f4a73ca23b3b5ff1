//! Rigid body records owned by the physics world

use crate::error::{PhysicsError, Result};
use crate::physics::collision::Shape;
use glam::Vec2;
use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Generation-counted handle to a body; stale handles never alias a new body
    pub struct BodyId;
}

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BodyType {
    /// Infinite mass, never moves
    Static,
    /// Moves with its velocity, ignores forces and gravity
    Kinematic,
    /// Fully simulated
    #[default]
    Dynamic,
}

/// Opaque back-reference to whatever owns the body; never dereferenced by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct UserTag(pub u64);

/// Layer/mask pair deciding which bodies may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub layer: u32,
    pub mask: u32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: 1,
            mask: u32::MAX,
        }
    }
}

impl CollisionFilter {
    pub fn new(layer: u32, mask: u32) -> Self {
        Self { layer, mask }
    }

    /// Both sides must accept the other's layer
    pub fn interacts_with(&self, other: &CollisionFilter) -> bool {
        (self.layer & other.mask) != 0 && (other.layer & self.mask) != 0
    }
}

/// Position and rotation of a body
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    /// Angle in radians
    pub rotation: f32,
}

impl Pose {
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
        }
    }

    /// Linear blend; `alpha = 0` gives `self`, `alpha = 1` gives `other`
    pub fn lerp(&self, other: &Pose, alpha: f32) -> Pose {
        Pose {
            position: self.position.lerp(other.position, alpha),
            rotation: self.rotation + (other.rotation - self.rotation) * alpha,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

/// Everything needed to create a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub shape: Shape,
    pub pose: Pose,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    /// Ignored for static and kinematic bodies
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub gravity_scale: f32,
    pub filter: CollisionFilter,
    pub is_sensor: bool,
    #[serde(skip)]
    pub user_tag: Option<UserTag>,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            shape: Shape::default(),
            pose: Pose::default(),
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: 1.0,
            restitution: 0.0,
            friction: 0.5,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: 1.0,
            filter: CollisionFilter::default(),
            is_sensor: false,
            user_tag: None,
        }
    }
}

impl BodyDesc {
    /// Create a dynamic body descriptor with the given shape and mass
    pub fn dynamic(shape: Shape, mass: f32) -> Self {
        Self {
            shape,
            mass,
            ..Default::default()
        }
    }

    /// Create a kinematic body descriptor (moves, ignores forces)
    pub fn kinematic(shape: Shape) -> Self {
        Self {
            body_type: BodyType::Kinematic,
            shape,
            ..Default::default()
        }
    }

    /// Create a static body descriptor (never moves)
    pub fn fixed(shape: Shape) -> Self {
        Self {
            body_type: BodyType::Static,
            shape,
            ..Default::default()
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.pose.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.pose.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, linear_velocity: Vec2) -> Self {
        self.linear_velocity = linear_velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Derive the mass from the shape area
    pub fn with_density(mut self, density: f32) -> Self {
        self.mass = density * self.shape.area();
        self
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn with_gravity_scale(mut self, gravity_scale: f32) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }

    pub fn with_filter(mut self, layer: u32, mask: u32) -> Self {
        self.filter = CollisionFilter::new(layer, mask);
        self
    }

    pub fn as_sensor(mut self) -> Self {
        self.is_sensor = true;
        self
    }

    pub fn with_user_tag(mut self, tag: UserTag) -> Self {
        self.user_tag = Some(tag);
        self
    }

    /// Check mass, material and shape before a body is inserted
    pub fn validate(&self) -> Result<()> {
        self.shape.validate()?;
        if self.body_type == BodyType::Dynamic && !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(PhysicsError::InvalidBodySpec(format!(
                "dynamic body mass must be positive, got {}",
                self.mass
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(PhysicsError::InvalidBodySpec(format!(
                "restitution must be in [0, 1], got {}",
                self.restitution
            )));
        }
        if !(self.friction.is_finite() && self.friction >= 0.0) {
            return Err(PhysicsError::InvalidBodySpec(format!(
                "friction must be non-negative, got {}",
                self.friction
            )));
        }
        if !(self.pose.is_finite()
            && self.linear_velocity.is_finite()
            && self.angular_velocity.is_finite())
        {
            return Err(PhysicsError::InvalidBodySpec(
                "initial pose and velocity must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Simulation record for one rigid body
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub(crate) body_type: BodyType,
    pub(crate) shape: Shape,
    pub(crate) pose: Pose,
    pub(crate) linear_velocity: Vec2,
    pub(crate) angular_velocity: f32,
    pub(crate) mass: f32,
    pub(crate) inverse_mass: f32,
    pub(crate) restitution: f32,
    pub(crate) friction: f32,
    pub(crate) linear_damping: f32,
    pub(crate) angular_damping: f32,
    pub(crate) gravity_scale: f32,
    pub(crate) filter: CollisionFilter,
    pub(crate) is_sensor: bool,
    pub(crate) user_tag: Option<UserTag>,
    /// Force accumulated since the last step, applied over one step
    pub(crate) pending_force: Vec2,
    /// Impulse accumulated since the last step, applied instantly
    pub(crate) pending_impulse: Vec2,
}

impl Body {
    /// Build a body from a validated descriptor
    pub(crate) fn from_desc(desc: &BodyDesc) -> Result<Self> {
        desc.validate()?;

        // Only dynamic bodies carry mass; the others behave as infinitely heavy
        let (mass, inverse_mass) = match desc.body_type {
            BodyType::Dynamic => (desc.mass, 1.0 / desc.mass),
            BodyType::Static | BodyType::Kinematic => (f32::INFINITY, 0.0),
        };
        let (linear_velocity, angular_velocity) = match desc.body_type {
            BodyType::Static => (Vec2::ZERO, 0.0),
            _ => (desc.linear_velocity, desc.angular_velocity),
        };

        Ok(Self {
            body_type: desc.body_type,
            shape: desc.shape,
            pose: desc.pose,
            linear_velocity,
            angular_velocity,
            mass,
            inverse_mass,
            restitution: desc.restitution,
            friction: desc.friction,
            linear_damping: desc.linear_damping.max(0.0),
            angular_damping: desc.angular_damping.max(0.0),
            gravity_scale: desc.gravity_scale,
            filter: desc.filter,
            is_sensor: desc.is_sensor,
            user_tag: desc.user_tag,
            pending_force: Vec2::ZERO,
            pending_impulse: Vec2::ZERO,
        })
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn position(&self) -> Vec2 {
        self.pose.position
    }

    pub fn rotation(&self) -> f32 {
        self.pose.rotation
    }

    pub fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Mass in kilograms; infinite for static and kinematic bodies
    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn filter(&self) -> CollisionFilter {
        self.filter
    }

    pub fn is_sensor(&self) -> bool {
        self.is_sensor
    }

    pub fn user_tag(&self) -> Option<UserTag> {
        self.user_tag
    }

    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// Dynamic and kinematic bodies integrate their velocity
    pub fn is_moving(&self) -> bool {
        self.body_type != BodyType::Static
    }

    /// Accumulate a force for the next step; only dynamic bodies respond
    pub(crate) fn add_force(&mut self, force: Vec2) {
        if self.is_dynamic() {
            self.pending_force += force;
        }
    }

    pub(crate) fn add_impulse(&mut self, impulse: Vec2) {
        if self.is_dynamic() {
            self.pending_impulse += impulse;
        }
    }

    /// Static bodies keep a zero velocity
    pub(crate) fn set_velocity(&mut self, linear: Vec2, angular: f32) {
        if self.is_moving() {
            self.linear_velocity = linear;
            self.angular_velocity = angular;
        }
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Gravity, pending forces and damping for one step
    pub(crate) fn integrate_forces(&mut self, gravity: Vec2, dt: f32) {
        if self.is_dynamic() {
            let acceleration = gravity * self.gravity_scale + self.pending_force * self.inverse_mass;
            self.linear_velocity += acceleration * dt + self.pending_impulse * self.inverse_mass;

            let linear_damping_factor = (1.0 - self.linear_damping * dt).max(0.0);
            let angular_damping_factor = (1.0 - self.angular_damping * dt).max(0.0);
            self.linear_velocity *= linear_damping_factor;
            self.angular_velocity *= angular_damping_factor;
        }
        self.pending_force = Vec2::ZERO;
        self.pending_impulse = Vec2::ZERO;
    }

    /// Advance the pose by the current velocity
    pub(crate) fn integrate_position(&mut self, dt: f32) {
        if self.is_moving() {
            self.pose.position += self.linear_velocity * dt;
            self.pose.rotation += self.angular_velocity * dt;
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.pose.is_finite() && self.linear_velocity.is_finite() && self.angular_velocity.is_finite()
    }
}
