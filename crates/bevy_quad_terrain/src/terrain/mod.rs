//! Destructible terrain surface.
//!
//! [`TerrainSurface`] owns the raster layers and the physics parts built from
//! them. It is the only writer of either: damage carves the raster, then the
//! affected window is re-traced and its parts are swapped in the physics
//! world.
//!
//! # Recompute
//!
//! For a window the surface:
//! 1. Selects parts whose body position lies in the window, growing the window
//!    over their quads until no new part is selected (optional)
//! 2. Samples, traces and decomposes the window into quads
//! 3. Removes the selected parts, firing their damage listeners
//! 4. Creates one part per quad
//!
//! Steps 1 and 2 never touch the physics world, so a bad window fails before
//! anything is removed.

mod damage;
mod listeners;
mod support;

use std::collections::HashMap;

use bevy::log::{debug, info, warn};
use bevy::math::{IVec2, Rect, Vec2};
use slotmap::{SlotMap, new_key_type};

pub use damage::{DamageReport, carve_layer, damage_window, fill_disc};
pub use listeners::{DamageCallback, DamageListenerRegistry};
pub use support::SupportQuery;

use crate::collision::{Quad, decompose_quads, sample_alpha, trace_boundaries};
use crate::config::TerrainConfig;
use crate::error::TerrainError;
use crate::physics::{PartDesc, PartHandle, PhysicsWorld};
use crate::primitives::{PixelRect, Raster};

/// Placement of a raster in the world.
///
/// Pixel space is y-down with row 0 at the top. World space is y-up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterTransform {
  /// World position of the raster's top-left corner.
  pub origin: Vec2,
  /// World units per pixel.
  pub pixel_size: f32,
}

impl Default for RasterTransform {
  fn default() -> Self {
    Self {
      origin: Vec2::ZERO,
      pixel_size: 1.0,
    }
  }
}

impl RasterTransform {
  pub fn new(origin: Vec2, pixel_size: f32) -> Self {
    Self { origin, pixel_size }
  }

  /// Converts a (fractional) pixel position to world space.
  #[inline]
  pub fn pixel_to_world(&self, pixel: Vec2) -> Vec2 {
    self.origin + Vec2::new(pixel.x, -pixel.y) * self.pixel_size
  }

  /// Converts a world position to (fractional) pixel space.
  #[inline]
  pub fn world_to_pixel(&self, world: Vec2) -> Vec2 {
    Vec2::new(world.x - self.origin.x, self.origin.y - world.y) / self.pixel_size
  }

  /// World-space rectangle covered by a pixel rectangle.
  pub fn rect_to_world(&self, rect: PixelRect) -> Rect {
    Rect::from_corners(
      self.pixel_to_world(Vec2::new(rect.x as f32, rect.y as f32)),
      self.pixel_to_world(Vec2::new(rect.right() as f32, rect.bottom() as f32)),
    )
  }

  /// Body position and half extents of the collider backing `quad`.
  pub fn quad_to_world(&self, quad: Quad) -> (Vec2, Vec2) {
    let center = self.pixel_to_world(quad.center());
    let half_extents = Vec2::new(quad.width as f32, quad.height as f32) * self.pixel_size * 0.5;
    (center, half_extents)
  }
}

new_key_type! {
  /// Slot of a [`PhysicsPart`] inside its surface.
  pub struct PartKey;
}

/// One physics body/collider pair and the quad it was built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsPart<H> {
  pub handle: H,
  pub quad: Quad,
  /// World-space body position.
  pub center: Vec2,
}

/// Outcome of one [`TerrainSurface::recompute_window`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct RecomputeReport<H> {
  /// Window that was actually traced, after growth over removed parts.
  pub window: PixelRect,
  pub boundary_points: usize,
  pub quads: Vec<Quad>,
  pub removed: Vec<H>,
  pub created: Vec<H>,
  pub listeners_fired: usize,
}

/// Raster terrain and the physics parts approximating its solid area.
#[derive(Debug)]
pub struct TerrainSurface<H: PartHandle> {
  foreground: Raster,
  background: Option<Raster>,
  transform: RasterTransform,
  config: TerrainConfig,
  parts: SlotMap<PartKey, PhysicsPart<H>>,
  by_handle: HashMap<H, PartKey>,
  listeners: DamageListenerRegistry<H>,
  solid_bounds: PixelRect,
  dirty: bool,
}

impl<H: PartHandle> TerrainSurface<H> {
  /// Creates a surface with no physics parts. Call [`Self::rebuild`] to
  /// populate them.
  pub fn new(foreground: Raster, transform: RasterTransform, config: TerrainConfig) -> Self {
    Self {
      foreground,
      background: None,
      transform,
      config,
      parts: SlotMap::with_key(),
      by_handle: HashMap::new(),
      listeners: DamageListenerRegistry::default(),
      solid_bounds: PixelRect::default(),
      dirty: true,
    }
  }

  /// Adds a cosmetic background layer. It must match the foreground size.
  pub fn with_background(mut self, background: Raster) -> Result<Self, TerrainError> {
    if background.bounds() != self.foreground.bounds() {
      return Err(TerrainError::InvalidWindow {
        window: background.bounds(),
        raster: self.foreground.bounds(),
      });
    }
    self.background = Some(background);
    Ok(self)
  }

  /// Recomputes every part, one tile at a time.
  ///
  /// Returns the number of parts created.
  pub fn rebuild<P>(&mut self, physics: &mut P) -> Result<usize, TerrainError>
  where
    P: PhysicsWorld<Handle = H>,
  {
    let bounds = self.foreground.bounds();
    if bounds.is_empty() {
      return Ok(0);
    }
    let tile = match self.config.tile_size {
      0 => bounds.width.max(bounds.height),
      size => size,
    };

    let mut created = 0;
    for y in (0..bounds.height).step_by(tile as usize) {
      for x in (0..bounds.width).step_by(tile as usize) {
        let window = PixelRect::new(x, y, tile, tile).clamped(bounds.width, bounds.height);
        created += self.recompute_window(physics, window)?.created.len();
      }
    }
    info!(
      "Rebuilt terrain {}x{}: {} parts",
      bounds.width,
      bounds.height,
      self.parts.len()
    );
    Ok(created)
  }

  /// Replaces the parts covering `window` with parts traced from the raster.
  ///
  /// Fails with [`TerrainError::InvalidWindow`] before any change when the
  /// window is empty or leaves the raster. A physics failure aborts midway:
  /// parts removed so far stay removed and parts created so far stay tracked.
  pub fn recompute_window<P>(
    &mut self,
    physics: &mut P,
    window: PixelRect,
  ) -> Result<RecomputeReport<H>, TerrainError>
  where
    P: PhysicsWorld<Handle = H>,
  {
    self.foreground.check_window(window)?;
    let (window, selected) = self.select_parts(physics, window);

    let grid = sample_alpha(&self.foreground, window)?;
    let trace = trace_boundaries(&grid, &self.config.tracer());
    let quads = if !trace.has_solid() {
      Vec::new()
    } else if trace.points.is_empty() {
      vec![trace.bounds]
    } else {
      decompose_quads(
        &trace.points,
        window,
        self.config.min_cell_size,
        self.config.leaf_filter(&grid),
      )
    };
    self.solid_bounds = self.solid_bounds.union(&trace.bounds);

    let mut removed = Vec::with_capacity(selected.len());
    let mut listeners_fired = 0;
    for key in selected {
      let Some(part) = self.parts.get(key) else {
        continue;
      };
      let handle = part.handle;
      physics.remove_part(handle)?;
      self.parts.remove(key);
      self.by_handle.remove(&handle);
      if self.listeners.fire(handle) {
        listeners_fired += 1;
      }
      removed.push(handle);
    }

    let mut created = Vec::with_capacity(quads.len());
    for quad in &quads {
      let (center, half_extents) = self.transform.quad_to_world(*quad);
      let handle = physics.create_part(PartDesc::terrain(center, half_extents))?;
      let key = self.parts.insert(PhysicsPart {
        handle,
        quad: *quad,
        center,
      });
      self.by_handle.insert(handle, key);
      created.push(handle);
    }

    debug!(
      "Recomputed window {:?}: {} boundary points, {} removed, {} created",
      window,
      trace.points.len(),
      removed.len(),
      created.len()
    );

    Ok(RecomputeReport {
      window,
      boundary_points: trace.points.len(),
      quads,
      removed,
      created,
      listeners_fired,
    })
  }

  /// Parts whose body lies in `window`, and the window grown to cover them.
  fn select_parts<P>(&self, physics: &P, window: PixelRect) -> (PixelRect, Vec<PartKey>)
  where
    P: PhysicsWorld<Handle = H>,
  {
    let bounds = self.foreground.bounds();
    let mut window = window;
    loop {
      let selected: Vec<PartKey> = physics
        .parts_in_rect(self.transform.rect_to_world(window))
        .into_iter()
        .filter_map(|handle| self.by_handle.get(&handle).copied())
        .collect();
      if !self.config.expand_to_removed_parts {
        return (window, selected);
      }

      let grown = selected
        .iter()
        .filter_map(|key| self.parts.get(*key))
        .fold(window, |acc, part| acc.union(&part.quad))
        .clamped(bounds.width, bounds.height);
      if grown == window {
        return (window, selected);
      }
      window = grown;
    }
  }

  /// Registers a callback fired once when the part behind `handle` is
  /// destroyed by a recompute.
  ///
  /// Returns false, dropping the callback, if `handle` is not a live part of
  /// this surface.
  pub fn register_damage_listener(&mut self, handle: H, callback: DamageCallback) -> bool {
    if !self.by_handle.contains_key(&handle) {
      warn!("Ignoring damage listener for unknown terrain part {handle:?}");
      return false;
    }
    self.listeners.register(handle, callback);
    true
  }

  /// True if `world` is inside a solid collider.
  ///
  /// Points outside the traced solid bounds are rejected without asking the
  /// physics world.
  pub fn point_is_solid<P>(&self, physics: &P, world: Vec2) -> bool
  where
    P: PhysicsWorld<Handle = H>,
  {
    let pixel = self.transform.world_to_pixel(world);
    if !self.solid_bounds.contains_f32(pixel) {
      return false;
    }
    physics.intersects_solid_point(world)
  }

  /// Handle of the part whose quad covers `world`.
  pub fn part_at(&self, world: Vec2) -> Option<H> {
    let pixel = self.transform.world_to_pixel(world);
    self
      .parts
      .values()
      .find(|part| part.quad.contains_f32(pixel))
      .map(|part| part.handle)
  }

  /// Converts a world position to the pixel containing it.
  pub fn world_to_pixel(&self, world: Vec2) -> IVec2 {
    self.transform.world_to_pixel(world).floor().as_ivec2()
  }

  pub fn parts(&self) -> impl Iterator<Item = &PhysicsPart<H>> {
    self.parts.values()
  }

  pub fn part_count(&self) -> usize {
    self.parts.len()
  }

  /// Quads of all live parts.
  pub fn quads(&self) -> Vec<Quad> {
    self.parts.values().map(|part| part.quad).collect()
  }

  /// Number of pending damage listeners.
  pub fn listener_count(&self) -> usize {
    self.listeners.len()
  }

  pub fn foreground(&self) -> &Raster {
    &self.foreground
  }

  pub fn background(&self) -> Option<&Raster> {
    self.background.as_ref()
  }

  pub fn transform(&self) -> RasterTransform {
    self.transform
  }

  pub fn config(&self) -> &TerrainConfig {
    &self.config
  }

  /// Union of every traced solid bounding box. Never shrinks.
  pub fn solid_bounds(&self) -> PixelRect {
    self.solid_bounds
  }

  /// Returns whether the rasters changed since the last call, clearing the
  /// flag.
  pub fn take_dirty(&mut self) -> bool {
    std::mem::take(&mut self.dirty)
  }
}
