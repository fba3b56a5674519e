//! Physics world capability consumed by the terrain.
//!
//! The terrain never talks to a physics engine directly. It creates and
//! removes body/collider pairs and asks point/region questions through
//! [`PhysicsWorld`]. Two backends ship with the crate:
//!
//! - [`AabbWorld`]: in-memory boxes in a slot map, used headless and in tests
//! - `RapierTerrainWorld`: `bevy_rapier2d` system parameter, enabled with the
//!   `rapier2d` feature
//!
//! ```toml
//! bevy_quad_terrain = { version = "...", features = ["rapier2d"] }
//! ```

mod aabb;

#[cfg(feature = "rapier2d")]
pub mod rapier;

use std::fmt::Debug;
use std::hash::Hash;

pub use aabb::{AabbBody, AabbHandle, AabbWorld};
use bevy::math::{Rect, Vec2};
use bitflags::bitflags;

use crate::error::PhysicsWorldError;

bitflags! {
  /// Collision layers a part belongs to or collides with.
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
  pub struct CollisionLayers: u32 {
    /// Static terrain parts.
    const TERRAIN = 1 << 0;
    /// Characters and other actors standing on terrain.
    const ACTOR = 1 << 1;
    /// Projectiles that may damage terrain.
    const PROJECTILE = 1 << 2;
    /// Loose debris.
    const DEBRIS = 1 << 3;
  }
}

/// Membership and filter tags attached to a created part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CollisionGroupTags {
  /// Layers this part belongs to.
  pub memberships: CollisionLayers,
  /// Layers this part collides with.
  pub filters: CollisionLayers,
}

impl CollisionGroupTags {
  /// Tags used for terrain parts: terrain membership, collides with all.
  pub const TERRAIN: Self = Self {
    memberships: CollisionLayers::TERRAIN,
    filters: CollisionLayers::all(),
  };
}

impl Default for CollisionGroupTags {
  fn default() -> Self {
    Self::TERRAIN
  }
}

/// Description of a fixed rectangular body/collider pair in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartDesc {
  pub center: Vec2,
  pub half_extents: Vec2,
  pub groups: CollisionGroupTags,
  /// Sensors report overlaps but are not solid.
  pub sensor: bool,
}

impl PartDesc {
  /// A solid terrain box.
  pub fn terrain(center: Vec2, half_extents: Vec2) -> Self {
    Self {
      center,
      half_extents,
      groups: CollisionGroupTags::TERRAIN,
      sensor: false,
    }
  }
}

/// Identifier of a body/collider pair.
///
/// Implementations use generational identifiers so a removed handle is never
/// confused with a later one that reuses its slot.
pub trait PartHandle: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> PartHandle for T where T: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

/// Operations the terrain needs from a physics engine.
///
/// Calls happen between physics steps, never during one.
pub trait PhysicsWorld {
  /// Handle of one body/collider pair.
  type Handle: PartHandle;

  /// Creates a fixed body with a box collider.
  fn create_part(&mut self, desc: PartDesc) -> Result<Self::Handle, PhysicsWorldError>;

  /// Removes a body and its collider.
  fn remove_part(&mut self, handle: Self::Handle) -> Result<(), PhysicsWorldError>;

  /// Parts whose body position lies inside `rect`.
  fn parts_in_rect(&self, rect: Rect) -> Vec<Self::Handle>;

  /// Parts whose body position lies inside the circle.
  fn parts_in_circle(&self, center: Vec2, radius: f32) -> Vec<Self::Handle>;

  /// True if `point` is inside any non-sensor collider.
  fn intersects_solid_point(&self, point: Vec2) -> bool;
}
