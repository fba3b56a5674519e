//! Quad Terrain - destructible raster terrain with quad collision for Bevy.
//!
//! A terrain sprite's alpha channel is traced into sparse boundary points and
//! decomposed into axis-aligned quads, one fixed physics body per quad.
//! Circular damage carves the raster and swaps only the parts inside the
//! damaged window.

pub mod collision;
pub mod config;
pub mod error;
pub mod physics;
pub mod plugin;
pub mod primitives;
pub mod render;
pub mod terrain;

pub use collision::{
  AlphaGrid, BoundaryTrace, EntryRule, LeafFilter, MIN_CELL_SIZE, Quad, TracerConfig,
  decompose_quads, sample_alpha, trace_boundaries,
};
pub use config::{LeafPolicy, TerrainConfig};
pub use error::{PhysicsWorldError, TerrainError};
#[cfg(feature = "rapier2d")]
pub use physics::rapier::{RapierPartIndex, RapierTerrainWorld, TerrainCollider};
pub use physics::{
  AabbBody, AabbHandle, AabbWorld, CollisionGroupTags, CollisionLayers, PartDesc, PartHandle,
  PhysicsWorld,
};
pub use plugin::{
  CarveTerrain, QuadTerrainPlugin, SpawnTerrain, Terrain, TerrainHandle, TerrainPartsDestroyed,
  TerrainTextures,
};
pub use primitives::{PixelRect, Raster, Rgba, Surface};
pub use render::{create_texture, upload_raster, upload_to_handle};
pub use terrain::{
  DamageCallback, DamageListenerRegistry, DamageReport, PartKey, PhysicsPart, RasterTransform,
  RecomputeReport, SupportQuery, TerrainSurface, carve_layer, damage_window, fill_disc,
};
