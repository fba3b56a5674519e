//! Sparse boundary tracing over an alpha grid.
//!
//! The tracer walks the grid in row-major order keeping one "inside a solid
//! run" flag per column and one per row. Flipping those flags emits boundary
//! points. The result is a scattering of pixels near the solid/empty outline,
//! not a closed contour: no ordering or adjacency between points is implied.

use bevy::math::UVec2;
use serde::Deserialize;

use super::sampler::AlphaGrid;
use crate::primitives::PixelRect;

/// When a solid sample counts as entering solid.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryRule {
  /// Enter unless both the column and the row flag are set. Emits a point at
  /// every solid pixel below or beside empty space, so flat ground yields a
  /// full row of points.
  #[default]
  NotBothMarked,
  /// Enter only while neither flag is set. Much sparser: flat ground yields a
  /// diagonal staircase of points starting at the window's top-left.
  NeitherMarked,
}

impl EntryRule {
  #[inline]
  fn enters(self, column: bool, row: bool) -> bool {
    match self {
      Self::NotBothMarked => !(column && row),
      Self::NeitherMarked => !column && !row,
    }
  }
}

/// Tunables for boundary tracing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TracerConfig {
  /// Alpha strictly above this counts as solid.
  pub solidity_threshold: u8,
  /// Solid-entry points whose window-relative x or y is at most this value
  /// are not emitted. Keeps the window's left and top edges from producing a
  /// line of spurious points.
  pub edge_suppression: u32,
  pub entry_rule: EntryRule,
}

impl Default for TracerConfig {
  fn default() -> Self {
    Self {
      solidity_threshold: 5,
      edge_suppression: 1,
      entry_rule: EntryRule::NotBothMarked,
    }
  }
}

/// Output of [`trace_boundaries`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundaryTrace {
  /// Pixels where solid/empty state changed during the scan.
  pub points: Vec<UVec2>,
  /// Tight box around every solid sample, in absolute raster coordinates.
  /// Zero-sized (at the window origin) when the window has no solid pixel.
  pub bounds: PixelRect,
}

impl BoundaryTrace {
  /// True if the traced window contained at least one solid sample.
  #[inline]
  pub fn has_solid(&self) -> bool {
    !self.bounds.is_empty()
  }
}

/// Extracts boundary points and the solid bounding box from `grid`.
///
/// - Solid sample (`alpha > solidity_threshold`) whose flags pass the
///   [`EntryRule`]: entering solid. Both flags are set and the point is
///   emitted unless it sits within `edge_suppression` of the window's left or
///   top edge. Suppressed entries still set the flags.
/// - Empty sample (`alpha == 0`) while its column or row flag is set: leaving
///   solid. The point is emitted and both flags are cleared.
/// - Samples with `0 < alpha <= solidity_threshold` change nothing.
///
/// A fully transparent window and a fully opaque window both produce no
/// points; only the bounding box tells them apart.
pub fn trace_boundaries(grid: &AlphaGrid, config: &TracerConfig) -> BoundaryTrace {
  let window = grid.window();
  let mut columns = vec![false; window.width as usize];
  let mut rows = vec![false; window.height as usize];
  let mut points = Vec::new();
  let mut solid_min: Option<UVec2> = None;
  let mut solid_max = UVec2::ZERO;

  for (p, alpha) in grid.iter() {
    let local = p - UVec2::new(window.x, window.y);
    let col = local.x as usize;
    let row = local.y as usize;

    if alpha > config.solidity_threshold {
      solid_min = Some(solid_min.map_or(p, |m| m.min(p)));
      solid_max = solid_max.max(p);

      if config.entry_rule.enters(columns[col], rows[row]) {
        if local.x > config.edge_suppression && local.y > config.edge_suppression {
          points.push(p);
        }
        columns[col] = true;
        rows[row] = true;
      }
    } else if alpha == 0 && (columns[col] || rows[row]) {
      points.push(p);
      columns[col] = false;
      rows[row] = false;
    }
  }

  let bounds = match solid_min {
    Some(min) => PixelRect::new(
      min.x,
      min.y,
      solid_max.x - min.x + 1,
      solid_max.y - min.y + 1,
    ),
    None => PixelRect::new(window.x, window.y, 0, 0),
  };

  BoundaryTrace { points, bounds }
}
