//! Rapier2d backend for terrain parts.
//!
//! Each part is a fixed rigid body entity with a cuboid collider. The entity
//! id doubles as the part handle. Spawns and despawns go through `Commands`,
//! so the Rapier context only sees them after the next physics sync; region
//! queries answer from [`RapierPartIndex`] and stay exact in between.

use std::collections::HashMap;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use super::{CollisionLayers, PartDesc, PhysicsWorld};
use crate::error::PhysicsWorldError;

/// Marker component for terrain collider entities.
#[derive(Component, Debug, Clone, Copy)]
pub struct TerrainCollider {
  pub half_extents: Vec2,
}

/// Body positions of live terrain parts, keyed by entity.
#[derive(Resource, Default, Debug)]
pub struct RapierPartIndex {
  pub positions: HashMap<Entity, Vec2>,
}

/// [`PhysicsWorld`] over the default Rapier context.
#[derive(SystemParam)]
pub struct RapierTerrainWorld<'w, 's> {
  commands: Commands<'w, 's>,
  context: ReadRapierContext<'w, 's>,
  index: ResMut<'w, RapierPartIndex>,
}

fn group(layers: CollisionLayers) -> Group {
  Group::from_bits_truncate(layers.bits())
}

impl PhysicsWorld for RapierTerrainWorld<'_, '_> {
  type Handle = Entity;

  fn create_part(&mut self, desc: PartDesc) -> Result<Entity, PhysicsWorldError> {
    if !(desc.half_extents.x > 0.0 && desc.half_extents.y > 0.0) {
      return Err(PhysicsWorldError::Rejected(format!(
        "degenerate cuboid with half extents {}",
        desc.half_extents
      )));
    }

    let mut entity = self.commands.spawn((
      RigidBody::Fixed,
      Collider::cuboid(desc.half_extents.x, desc.half_extents.y),
      CollisionGroups::new(group(desc.groups.memberships), group(desc.groups.filters)),
      Transform::from_translation(desc.center.extend(0.0)),
      TerrainCollider {
        half_extents: desc.half_extents,
      },
    ));
    if desc.sensor {
      entity.insert(Sensor);
    }
    let id = entity.id();
    self.index.positions.insert(id, desc.center);
    Ok(id)
  }

  fn remove_part(&mut self, handle: Entity) -> Result<(), PhysicsWorldError> {
    if self.index.positions.remove(&handle).is_none() {
      return Err(PhysicsWorldError::UnknownHandle(format!("{handle:?}")));
    }
    self.commands.entity(handle).despawn();
    Ok(())
  }

  fn parts_in_rect(&self, rect: Rect) -> Vec<Entity> {
    self
      .index
      .positions
      .iter()
      .filter(|(_, pos)| rect.contains(**pos))
      .map(|(entity, _)| *entity)
      .collect()
  }

  fn parts_in_circle(&self, center: Vec2, radius: f32) -> Vec<Entity> {
    let radius_sq = radius * radius;
    self
      .index
      .positions
      .iter()
      .filter(|(_, pos)| pos.distance_squared(center) <= radius_sq)
      .map(|(entity, _)| *entity)
      .collect()
  }

  fn intersects_solid_point(&self, point: Vec2) -> bool {
    let Ok(context) = self.context.single() else {
      warn!("No Rapier context available for point query");
      return false;
    };
    let mut hit = false;
    context.intersect_point(point, QueryFilter::default().exclude_sensors(), |_| {
      hit = true;
      false
    });
    hit
  }
}
