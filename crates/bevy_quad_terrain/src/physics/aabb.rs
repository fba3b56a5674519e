//! In-memory physics backend made of axis-aligned boxes.

use bevy::math::{Rect, Vec2};
use bevy::prelude::Resource;
use slotmap::{SlotMap, new_key_type};

use super::{CollisionGroupTags, PartDesc, PhysicsWorld};
use crate::error::PhysicsWorldError;

new_key_type! {
  /// Generational handle into an [`AabbWorld`].
  pub struct AabbHandle;
}

/// A fixed box stored by [`AabbWorld`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AabbBody {
  pub center: Vec2,
  pub half_extents: Vec2,
  pub groups: CollisionGroupTags,
  pub sensor: bool,
}

impl AabbBody {
  /// World-space bounds of the collider.
  #[inline]
  pub fn bounds(&self) -> Rect {
    Rect::from_center_half_size(self.center, self.half_extents)
  }
}

/// Box-only physics world.
///
/// Bodies never move, so "body position" is the box center. Point tests
/// include the box edges.
#[derive(Resource, Debug, Default)]
pub struct AabbWorld {
  bodies: SlotMap<AabbHandle, AabbBody>,
}

impl AabbWorld {
  pub fn new() -> Self {
    Self::default()
  }

  /// Looks up a body.
  pub fn get(&self, handle: AabbHandle) -> Option<&AabbBody> {
    self.bodies.get(handle)
  }

  /// Number of live bodies.
  pub fn len(&self) -> usize {
    self.bodies.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bodies.is_empty()
  }

  /// Iterates all live bodies.
  pub fn iter(&self) -> impl Iterator<Item = (AabbHandle, &AabbBody)> {
    self.bodies.iter()
  }
}

impl PhysicsWorld for AabbWorld {
  type Handle = AabbHandle;

  fn create_part(&mut self, desc: PartDesc) -> Result<AabbHandle, PhysicsWorldError> {
    if !(desc.half_extents.x > 0.0 && desc.half_extents.y > 0.0) || !desc.center.is_finite() {
      return Err(PhysicsWorldError::Rejected(format!(
        "degenerate box at {} with half extents {}",
        desc.center, desc.half_extents
      )));
    }
    Ok(self.bodies.insert(AabbBody {
      center: desc.center,
      half_extents: desc.half_extents,
      groups: desc.groups,
      sensor: desc.sensor,
    }))
  }

  fn remove_part(&mut self, handle: AabbHandle) -> Result<(), PhysicsWorldError> {
    self
      .bodies
      .remove(handle)
      .map(|_| ())
      .ok_or_else(|| PhysicsWorldError::UnknownHandle(format!("{handle:?}")))
  }

  fn parts_in_rect(&self, rect: Rect) -> Vec<AabbHandle> {
    self
      .bodies
      .iter()
      .filter(|(_, body)| rect.contains(body.center))
      .map(|(handle, _)| handle)
      .collect()
  }

  fn parts_in_circle(&self, center: Vec2, radius: f32) -> Vec<AabbHandle> {
    let radius_sq = radius * radius;
    self
      .bodies
      .iter()
      .filter(|(_, body)| body.center.distance_squared(center) <= radius_sq)
      .map(|(handle, _)| handle)
      .collect()
  }

  fn intersects_solid_point(&self, point: Vec2) -> bool {
    self
      .bodies
      .values()
      .any(|body| !body.sensor && body.bounds().contains(point))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn removed_handles_are_not_reused() {
    let mut world = AabbWorld::new();
    let first = world
      .create_part(PartDesc::terrain(Vec2::ZERO, Vec2::ONE))
      .unwrap();
    world.remove_part(first).unwrap();
    let second = world
      .create_part(PartDesc::terrain(Vec2::ZERO, Vec2::ONE))
      .unwrap();

    assert_ne!(first, second);
    assert!(world.get(first).is_none());
    assert!(matches!(
      world.remove_part(first),
      Err(PhysicsWorldError::UnknownHandle(_))
    ));
  }

  #[test]
  fn sensors_are_not_solid() {
    let mut world = AabbWorld::new();
    let mut desc = PartDesc::terrain(Vec2::new(5.0, 5.0), Vec2::splat(2.0));
    desc.sensor = true;
    world.create_part(desc).unwrap();

    assert!(!world.intersects_solid_point(Vec2::new(5.0, 5.0)));
    assert_eq!(world.parts_in_circle(Vec2::new(5.0, 5.0), 1.0).len(), 1);
  }

  #[test]
  fn region_queries_use_body_position() {
    let mut world = AabbWorld::new();
    let a = world
      .create_part(PartDesc::terrain(Vec2::new(0.0, 0.0), Vec2::splat(10.0)))
      .unwrap();
    let b = world
      .create_part(PartDesc::terrain(Vec2::new(30.0, 0.0), Vec2::splat(1.0)))
      .unwrap();

    let rect = Rect::new(-1.0, -1.0, 1.0, 1.0);
    assert_eq!(world.parts_in_rect(rect), vec![a]);
    assert_eq!(world.parts_in_circle(Vec2::new(29.0, 0.0), 2.0), vec![b]);
    assert!(world.intersects_solid_point(Vec2::new(9.5, -9.5)));
    assert!(!world.intersects_solid_point(Vec2::new(20.0, 0.0)));
  }

  #[test]
  fn degenerate_boxes_are_rejected() {
    let mut world = AabbWorld::new();
    let result = world.create_part(PartDesc::terrain(Vec2::ZERO, Vec2::new(0.0, 1.0)));
    assert!(matches!(result, Err(PhysicsWorldError::Rejected(_))));
    assert!(world.is_empty());
  }
}
