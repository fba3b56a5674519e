//! Recursive quad decomposition guided by sparse boundary points.
//!
//! Unlike a dense occupancy quadtree, subdivision is driven only by where
//! boundary points are: a rectangle with no boundary point strictly inside it
//! is treated as uniform and kept whole. The output over-approximates the
//! solid area with axis-aligned rectangles, trading minimality for speed.

use bevy::math::UVec2;

use super::sampler::AlphaGrid;
use crate::primitives::PixelRect;

/// A rectangle backing one terrain collider, in raster pixel space.
pub type Quad = PixelRect;

/// Default minimum cell edge in pixels.
pub const MIN_CELL_SIZE: u32 = 4;

/// Decides whether a non-subdivided child rectangle is kept.
#[derive(Clone, Copy, Debug)]
pub enum LeafFilter<'a> {
  /// Keep the leaf if any point of the parent's interested set lies inside it
  /// (edges included). Does not look at pixels, so it can drop uniform solid
  /// leaves and keep uniform empty ones that touch a boundary point.
  ParentBoundary,
  /// Keep the leaf if it contains at least one sample above `threshold`.
  SolidSample {
    grid: &'a AlphaGrid,
    threshold: u8,
  },
}

impl LeafFilter<'_> {
  fn keeps(&self, leaf: PixelRect, parent_points: &[UVec2]) -> bool {
    match self {
      Self::ParentBoundary => parent_points.iter().any(|p| leaf.contains_closed(*p)),
      Self::SolidSample { grid, threshold } => grid.any_solid(leaf, *threshold),
    }
  }
}

enum Cell {
  Leaf(PixelRect),
  Split(Vec<Quad>),
}

/// Splits `rect` into quads approximating the solid area inside it.
///
/// Recursion stops when either edge drops below `min_cell_size` or when no
/// boundary point lies strictly inside the current rectangle. Each split is
/// at the rounded midpoint and children are visited as (left, top),
/// (right, top), (left, bottom), (right, bottom). Only the top-level rectangle
/// escapes `filter`: if it never splits, it is returned as the single quad.
///
/// Output order carries no meaning. `rect` must have non-zero area.
pub fn decompose_quads(
  points: &[UVec2],
  rect: PixelRect,
  min_cell_size: u32,
  filter: LeafFilter<'_>,
) -> Vec<Quad> {
  debug_assert!(!rect.is_empty(), "decompose_quads called with empty rect");
  // A cell narrower than 2 would split into a zero-width child.
  let min_cell_size = min_cell_size.max(2);
  match decompose_cell(points, rect, min_cell_size, &filter) {
    Cell::Leaf(leaf) => vec![leaf],
    Cell::Split(quads) => quads,
  }
}

fn decompose_cell(
  points: &[UVec2],
  rect: PixelRect,
  min_cell_size: u32,
  filter: &LeafFilter<'_>,
) -> Cell {
  if rect.width < min_cell_size || rect.height < min_cell_size {
    return Cell::Leaf(rect);
  }

  let interested: Vec<UVec2> = points
    .iter()
    .copied()
    .filter(|p| rect.contains_strictly(*p))
    .collect();
  if interested.is_empty() {
    return Cell::Leaf(rect);
  }

  let mut quads = Vec::new();
  for child in quadrants(rect) {
    match decompose_cell(&interested, child, min_cell_size, filter) {
      Cell::Split(inner) => quads.extend(inner),
      Cell::Leaf(leaf) => {
        if filter.keeps(leaf, &interested) {
          quads.push(leaf);
        }
      }
    }
  }
  Cell::Split(quads)
}

/// Four children split at the rounded midpoint.
fn quadrants(rect: PixelRect) -> [PixelRect; 4] {
  let left_w = rect.width.div_ceil(2);
  let top_h = rect.height.div_ceil(2);
  let right_w = rect.width - left_w;
  let bottom_h = rect.height - top_h;
  let mid_x = rect.x + left_w;
  let mid_y = rect.y + top_h;
  [
    PixelRect::new(rect.x, rect.y, left_w, top_h),
    PixelRect::new(mid_x, rect.y, right_w, top_h),
    PixelRect::new(rect.x, mid_y, left_w, bottom_h),
    PixelRect::new(mid_x, mid_y, right_w, bottom_h),
  ]
}
