//! Ground lookup for entities walking over terrain parts.

use bevy::log::debug;
use bevy::math::IVec2;

use super::TerrainSurface;
use crate::collision::Quad;
use crate::physics::PartHandle;

/// Result of [`TerrainSurface::query_nearest_support`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SupportQuery {
  /// Top surface point of the chosen quad, in pixel space. `None` means the
  /// entity fell.
  pub support: Option<IVec2>,
  /// Quads in the search range whose top was outside the height tolerance.
  pub rejected: Vec<Quad>,
}

impl SupportQuery {
  /// True when no quad can support the entity.
  #[inline]
  pub fn fell(&self) -> bool {
    self.support.is_none()
  }
}

impl<H: PartHandle> TerrainSurface<H> {
  /// Finds ground for an entity column at `point` stepping toward
  /// `direction` (-1, 0 or 1).
  ///
  /// Candidates are part quads overlapping `search_width` columns centered on
  /// `point.x + direction`. Among those whose top edge is within
  /// `max_height_diff` rows of `point.y`, the one horizontally closest to the
  /// target column wins, ties going to the smaller height difference. All
  /// coordinates are pixels.
  pub fn query_nearest_support(
    &self,
    point: IVec2,
    search_width: u32,
    max_height_diff: u32,
    direction: i32,
  ) -> SupportQuery {
    let target = point.x as i64 + direction.signum() as i64;
    let half = search_width as i64 / 2;
    let (lo, hi) = (target - half, target + half);

    let mut best: Option<((i64, i64), IVec2)> = None;
    let mut rejected = Vec::new();
    for part in self.parts.values() {
      let quad = part.quad;
      let left = quad.x as i64;
      let right = quad.right() as i64 - 1;
      if right < lo || left > hi {
        continue;
      }

      let dy = (quad.y as i64 - point.y as i64).abs();
      if dy > max_height_diff as i64 {
        rejected.push(quad);
        continue;
      }

      let x = target.clamp(left, right);
      let key = ((x - target).abs(), dy);
      if best.is_none_or(|(best_key, _)| key < best_key) {
        best = Some((key, IVec2::new(x as i32, quad.y as i32)));
      }
    }

    if !rejected.is_empty() {
      debug!(
        "Support query at {point}: {} quads outside height tolerance {max_height_diff}",
        rejected.len()
      );
    }

    SupportQuery {
      support: best.map(|(_, support)| support),
      rejected,
    }
  }
}
