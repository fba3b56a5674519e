//! Alpha sampling over a raster window.

use bevy::math::UVec2;

use crate::error::TerrainError;
use crate::primitives::{PixelRect, Raster};

/// Per-pixel alpha values for one raster window.
///
/// Lookups use absolute raster coordinates, not window-local ones. Built
/// fresh for each trace and dropped afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaGrid {
  window: PixelRect,
  alphas: Box<[u8]>,
}

impl AlphaGrid {
  /// Builds a grid from row-major alpha values covering `window`.
  ///
  /// Returns `None` if the value count does not match the window area.
  pub fn from_alphas(window: PixelRect, alphas: Vec<u8>) -> Option<Self> {
    if alphas.len() as u64 != window.area() {
      return None;
    }
    Some(Self {
      window,
      alphas: alphas.into_boxed_slice(),
    })
  }

  /// The window this grid covers.
  #[inline]
  pub fn window(&self) -> PixelRect {
    self.window
  }

  /// Alpha at absolute raster position `p`, or `None` outside the window.
  #[inline]
  pub fn get(&self, p: UVec2) -> Option<u8> {
    if !self.window.contains(p) {
      return None;
    }
    let local_x = (p.x - self.window.x) as usize;
    let local_y = (p.y - self.window.y) as usize;
    Some(self.alphas[local_y * self.window.width as usize + local_x])
  }

  /// Iterates `(position, alpha)` in row-major order.
  pub fn iter(&self) -> impl Iterator<Item = (UVec2, u8)> + '_ {
    let window = self.window;
    let width = window.width.max(1) as usize;
    self.alphas.iter().enumerate().map(move |(i, &alpha)| {
      let x = window.x + (i % width) as u32;
      let y = window.y + (i / width) as u32;
      (UVec2::new(x, y), alpha)
    })
  }

  /// Returns true if any sample inside `rect` has alpha above `threshold`.
  ///
  /// Only the part of `rect` overlapping the grid window is examined.
  pub fn any_solid(&self, rect: PixelRect, threshold: u8) -> bool {
    let x0 = rect.x.max(self.window.x);
    let y0 = rect.y.max(self.window.y);
    let x1 = rect.right().min(self.window.right());
    let y1 = rect.bottom().min(self.window.bottom());
    (y0..y1).any(|y| {
      (x0..x1).any(|x| {
        self
          .get(UVec2::new(x, y))
          .is_some_and(|alpha| alpha > threshold)
      })
    })
  }
}

/// Samples the alpha channel of `window`.
///
/// The window must lie inside the raster; callers clamp before sampling.
pub fn sample_alpha(raster: &Raster, window: PixelRect) -> Result<AlphaGrid, TerrainError> {
  let pixels = raster.read_window(window)?;
  Ok(AlphaGrid {
    window,
    alphas: pixels.iter().map(|p| p.a).collect(),
  })
}
