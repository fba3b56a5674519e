//! Circular damage carved into raster layers.
//!
//! Carving paints a marker disc, then diffs the window against a snapshot
//! taken before painting: every pixel whose channel sum changed becomes fully
//! transparent. The diff, not the disc geometry, decides what was removed.

use bevy::log::{debug, warn};
use bevy::math::{IVec2, Vec2};

use super::{RecomputeReport, TerrainSurface};
use crate::error::TerrainError;
use crate::physics::{PartHandle, PhysicsWorld};
use crate::primitives::{PixelRect, Raster, Rgba};

/// Outcome of [`TerrainSurface::carve_damage`].
#[derive(Clone, Debug, PartialEq)]
pub struct DamageReport<H> {
  /// Impact center in pixel space.
  pub center: IVec2,
  /// Damage radius in pixels.
  pub radius: f32,
  /// Foreground pixels cleared.
  pub carved: usize,
  /// Background pixels cleared.
  pub scorched: usize,
  pub recompute: RecomputeReport<H>,
}

/// Window that may change when carving a disc of `radius` at `center`.
///
/// Spans `3 x radius` plus `margin` on each side, clamped to the raster.
pub fn damage_window(center: IVec2, radius: f32, margin: u32, raster: PixelRect) -> PixelRect {
  let half = (radius * 1.5).ceil() as i64 + margin as i64;
  let (cx, cy) = (center.x as i64, center.y as i64);
  PixelRect::from_signed_bounds(
    cx - half,
    cy - half,
    cx + half,
    cy + half,
    raster.width,
    raster.height,
  )
}

/// Paints every pixel of `window` within `radius` of `center`.
///
/// Returns the number of pixels painted.
pub fn fill_disc(
  raster: &mut Raster,
  window: PixelRect,
  center: IVec2,
  radius: f32,
  color: Rgba,
) -> usize {
  let window = window.clamped(raster.width(), raster.height());
  let radius_sq = radius * radius;
  let mut painted = 0;
  for y in window.y..window.bottom() {
    for x in window.x..window.right() {
      let d = Vec2::new(x as f32 - center.x as f32, y as f32 - center.y as f32);
      if d.length_squared() <= radius_sq && raster.set(x, y, color) {
        painted += 1;
      }
    }
  }
  painted
}

/// Carves a disc into one layer using the snapshot diff.
///
/// Returns the number of pixels made transparent.
pub fn carve_layer(
  raster: &mut Raster,
  window: PixelRect,
  center: IVec2,
  radius: f32,
  marker: Rgba,
) -> Result<usize, TerrainError> {
  let before = raster.read_window(window)?;
  fill_disc(raster, window, center, radius, marker);
  let mut after = raster.read_window(window)?;

  let mut cleared = 0;
  for (old, new) in before.iter().zip(after.iter_mut()) {
    if old.channel_sum() != new.channel_sum() {
      *new = new.with_alpha(0);
      cleared += 1;
    }
  }
  raster.write_window(window, &after)?;
  Ok(cleared)
}

impl<H: PartHandle> TerrainSurface<H> {
  /// Carves a hole of `radius` world units at `point` and resyncs the
  /// physics parts around it.
  ///
  /// The background layer, when present, gets a smaller scorch disc. Only the
  /// damage window is recomputed, never the whole terrain.
  pub fn carve_damage<P>(
    &mut self,
    physics: &mut P,
    point: Vec2,
    radius: f32,
  ) -> Result<DamageReport<H>, TerrainError>
  where
    P: PhysicsWorld<Handle = H>,
  {
    let bounds = self.foreground.bounds();
    let pixel = self.transform.world_to_pixel(point);
    let radius = radius / self.transform.pixel_size;
    if !bounds.contains_f32(pixel) || !radius.is_finite() || radius <= 0.0 {
      return Err(TerrainError::InvalidWindow {
        window: PixelRect::default(),
        raster: bounds,
      });
    }

    let center = pixel.floor().as_ivec2();
    let window = damage_window(center, radius, self.config.damage_margin, bounds);
    let marker = self.config.carve_color;
    let carved = carve_layer(&mut self.foreground, window, center, radius, marker)?;
    let scorched = match (self.background.as_mut(), self.config.scorch_radius(radius)) {
      (Some(background), Some(scorch)) => carve_layer(background, window, center, scorch, marker)?,
      (Some(_), None) => {
        warn!(
          "Skipping background scorch: scorch_divisor {} is not positive",
          self.config.scorch_divisor
        );
        0
      }
      (None, _) => 0,
    };
    self.dirty = true;
    debug!(
      "Carved r={radius} at {center}: {carved} foreground, {scorched} background pixels"
    );

    let recompute = self.recompute_window(physics, window)?;
    Ok(DamageReport {
      center,
      radius,
      carved,
      scorched,
      recompute,
    })
  }
}
