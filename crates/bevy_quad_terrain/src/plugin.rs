//! Bevy plugin wiring terrain surfaces into an app.
//!
//! Terrains are entities with a [`Terrain`] component. Gameplay code requests
//! damage with a [`CarveTerrain`] message and hears about destroyed parts
//! through [`TerrainPartsDestroyed`]. Systems run in `Update`, chained:
//! 1. Rebuild parts for newly added terrains
//! 2. Apply carve requests
//! 3. Upload dirty rasters to their textures

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::config::TerrainConfig;
#[cfg(not(feature = "rapier2d"))]
use crate::physics::{AabbHandle, AabbWorld};
#[cfg(feature = "rapier2d")]
use crate::physics::rapier::{RapierPartIndex, RapierTerrainWorld};
use crate::primitives::Raster;
use crate::render::{create_texture, upload_to_handle};
use crate::terrain::{RasterTransform, TerrainSurface};

/// Part handle of the active physics backend.
#[cfg(not(feature = "rapier2d"))]
pub type TerrainHandle = AabbHandle;

/// Part handle of the active physics backend.
#[cfg(feature = "rapier2d")]
pub type TerrainHandle = Entity;

/// Texture handles for a terrain's raster layers.
#[derive(Clone, Debug, Default)]
pub struct TerrainTextures {
  pub foreground: Option<Handle<Image>>,
  pub background: Option<Handle<Image>>,
}

/// A destructible terrain entity.
#[derive(Component, Debug)]
pub struct Terrain {
  pub surface: TerrainSurface<TerrainHandle>,
  pub textures: TerrainTextures,
}

impl Terrain {
  pub fn new(surface: TerrainSurface<TerrainHandle>, textures: TerrainTextures) -> Self {
    Self { surface, textures }
  }
}

/// Request to carve a circular hole into a terrain.
#[derive(Message, Clone, Copy, Debug)]
pub struct CarveTerrain {
  pub terrain: Entity,
  /// Impact point in world space.
  pub point: Vec2,
  /// Radius in world units.
  pub radius: f32,
}

/// Emitted when a recompute removed terrain parts.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainPartsDestroyed {
  pub terrain: Entity,
  pub count: usize,
}

/// Command spawning a [`Terrain`] from raster layers.
///
/// Uses the plugin's [`TerrainConfig`] unless one is given, and creates
/// textures when an image asset store is present.
pub struct SpawnTerrain {
  foreground: Raster,
  background: Option<Raster>,
  transform: RasterTransform,
  config: Option<TerrainConfig>,
}

impl SpawnTerrain {
  pub fn new(foreground: Raster, transform: RasterTransform) -> Self {
    Self {
      foreground,
      background: None,
      transform,
      config: None,
    }
  }

  /// Adds a cosmetic background layer.
  pub fn with_background(mut self, background: Raster) -> Self {
    self.background = Some(background);
    self
  }

  /// Overrides the plugin configuration for this terrain.
  pub fn with_config(mut self, config: TerrainConfig) -> Self {
    self.config = Some(config);
    self
  }
}

impl bevy::ecs::system::Command for SpawnTerrain {
  fn apply(self, world: &mut World) {
    let config = self.config.unwrap_or_else(|| {
      world
        .get_resource::<TerrainConfig>()
        .cloned()
        .unwrap_or_default()
    });

    let textures = match world.get_resource_mut::<Assets<Image>>() {
      Some(mut images) => TerrainTextures {
        foreground: Some(create_texture(&mut images, &self.foreground)),
        background: self
          .background
          .as_ref()
          .map(|raster| create_texture(&mut images, raster)),
      },
      None => TerrainTextures::default(),
    };

    let mut surface = TerrainSurface::new(self.foreground, self.transform, config);
    if let Some(background) = self.background {
      surface = match surface.with_background(background) {
        Ok(surface) => surface,
        Err(e) => {
          warn!("Not spawning terrain: {e}");
          return;
        }
      };
    }

    let entity = world.spawn(Terrain::new(surface, textures)).id();
    info!("Spawned terrain {entity}");
  }
}

/// Plugin for destructible quad-collision terrain.
#[derive(Default)]
pub struct QuadTerrainPlugin {
  pub config: TerrainConfig,
}

impl QuadTerrainPlugin {
  pub fn new(config: TerrainConfig) -> Self {
    Self { config }
  }
}

impl Plugin for QuadTerrainPlugin {
  fn build(&self, app: &mut App) {
    app
      .insert_resource(self.config.clone())
      .add_message::<CarveTerrain>()
      .add_message::<TerrainPartsDestroyed>()
      .add_systems(
        Update,
        (
          rebuild_added_terrains,
          apply_carve_requests,
          upload_dirty_terrains,
        )
          .chain(),
      );

    #[cfg(not(feature = "rapier2d"))]
    app.init_resource::<AabbWorld>();
    #[cfg(feature = "rapier2d")]
    app.init_resource::<RapierPartIndex>();
  }
}

/// System: builds physics parts for terrains spawned since the last run.
fn rebuild_added_terrains(
  mut terrains: Query<(Entity, &mut Terrain), Added<Terrain>>,
  #[cfg(not(feature = "rapier2d"))] mut physics: ResMut<AabbWorld>,
  #[cfg(feature = "rapier2d")] mut physics: RapierTerrainWorld,
) {
  #[cfg(not(feature = "rapier2d"))]
  let physics: &mut AabbWorld = &mut physics;
  #[cfg(feature = "rapier2d")]
  let physics: &mut RapierTerrainWorld = &mut physics;

  for (entity, mut terrain) in terrains.iter_mut() {
    if let Err(e) = terrain.surface.rebuild(physics) {
      warn!("Failed to build terrain {entity}: {e}");
    }
  }
}

/// System: applies queued carve requests.
fn apply_carve_requests(
  mut requests: MessageReader<CarveTerrain>,
  mut destroyed: MessageWriter<TerrainPartsDestroyed>,
  mut terrains: Query<&mut Terrain>,
  #[cfg(not(feature = "rapier2d"))] mut physics: ResMut<AabbWorld>,
  #[cfg(feature = "rapier2d")] mut physics: RapierTerrainWorld,
) {
  #[cfg(not(feature = "rapier2d"))]
  let physics: &mut AabbWorld = &mut physics;
  #[cfg(feature = "rapier2d")]
  let physics: &mut RapierTerrainWorld = &mut physics;

  for request in requests.read() {
    let Ok(mut terrain) = terrains.get_mut(request.terrain) else {
      warn!("Carve request for missing terrain {}", request.terrain);
      continue;
    };
    match terrain
      .surface
      .carve_damage(physics, request.point, request.radius)
    {
      Ok(report) => {
        let count = report.recompute.removed.len();
        if count > 0 {
          destroyed.write(TerrainPartsDestroyed {
            terrain: request.terrain,
            count,
          });
        }
      }
      Err(e) => warn!("Carve at {} rejected: {e}", request.point),
    }
  }
}

/// System: uploads changed rasters to their textures.
fn upload_dirty_terrains(
  mut terrains: Query<(Entity, &mut Terrain)>,
  images: Option<ResMut<Assets<Image>>>,
) {
  let Some(mut images) = images else {
    return;
  };

  for (entity, mut terrain) in terrains.iter_mut() {
    if !terrain.surface.take_dirty() {
      continue;
    }
    let terrain = terrain.into_inner();
    if let Some(handle) = &terrain.textures.foreground
      && let Err(e) = upload_to_handle(&mut images, handle, terrain.surface.foreground())
    {
      warn!("Foreground upload for terrain {entity} failed: {e}");
    }
    let background = terrain.textures.background.as_ref();
    if let (Some(handle), Some(raster)) = (background, terrain.surface.background())
      && let Err(e) = upload_to_handle(&mut images, handle, raster)
    {
      warn!("Background upload for terrain {entity} failed: {e}");
    }
  }
}
