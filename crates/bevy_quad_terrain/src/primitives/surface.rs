//! Row-major pixel buffers for terrain layers.
//!
//! A [`Surface`] is a generic 2D buffer that can hold any element type. The
//! terrain keeps its foreground and background layers as [`Raster`]s.
//!
//! # Coordinate System
//!
//! Surfaces use image coordinates:
//! - **X+** is to the right
//! - **Y+** is downward
//! - **(0, 0)** is the top-left corner
//!
//! Data is stored in row-major order where row 0 is the top of the surface,
//! the same layout as `bevy::image::Image` data.

use std::ops::{Index, IndexMut};

use super::{PixelRect, Rgba};
use crate::error::TerrainError;

/// Row-major 2D buffer, indexed `y * width + x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface<T> {
  data: Box<[T]>,
  width: u32,
  height: u32,
}

/// An RGBA terrain layer.
pub type Raster = Surface<Rgba>;

impl<T: Clone + Default> Surface<T> {
  /// Surface of `T::default()`. For rasters that is transparent black.
  pub fn new(width: u32, height: u32) -> Self {
    Self::filled(width, height, T::default())
  }
}

impl<T: Clone> Surface<T> {
  pub fn filled(width: u32, height: u32, value: T) -> Self {
    let cells = width as usize * height as usize;
    Self {
      data: vec![value; cells].into(),
      width,
      height,
    }
  }

  /// Wraps existing row-major data.
  ///
  /// Returns `None` if `data.len()` does not equal `width * height`.
  pub fn from_vec(width: u32, height: u32, data: Vec<T>) -> Option<Self> {
    (data.len() == width as usize * height as usize).then(|| Self {
      data: data.into_boxed_slice(),
      width,
      height,
    })
  }

  /// Copies a rectangular window out of the surface, row-major.
  pub fn read_window(&self, window: PixelRect) -> Result<Vec<T>, TerrainError> {
    self.check_window(window)?;
    let mut out = Vec::with_capacity(window.area() as usize);
    for y in window.y..window.bottom() {
      out.extend_from_slice(&self.data[self.row_span(y, window)]);
    }
    Ok(out)
  }

  /// Writes a row-major window back at the window's offset.
  pub fn write_window(&mut self, window: PixelRect, pixels: &[T]) -> Result<(), TerrainError> {
    self.check_window(window)?;
    if pixels.len() as u64 != window.area() {
      return Err(TerrainError::InvalidWindow {
        window,
        raster: self.bounds(),
      });
    }
    let rows = pixels.chunks_exact(window.width as usize);
    for (y, row) in (window.y..window.bottom()).zip(rows) {
      let span = self.row_span(y, window);
      self.data[span].clone_from_slice(row);
    }
    Ok(())
  }
}

impl<T> Surface<T> {
  #[inline]
  pub fn width(&self) -> u32 {
    self.width
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.height
  }

  /// The rectangle covering the whole surface.
  #[inline]
  pub fn bounds(&self) -> PixelRect {
    PixelRect::full(self.width, self.height)
  }

  #[inline]
  fn offset(&self, x: u32, y: u32) -> usize {
    y as usize * self.width as usize + x as usize
  }

  /// Data range of row `y` clipped to the columns of `window`.
  #[inline]
  fn row_span(&self, y: u32, window: PixelRect) -> std::ops::Range<usize> {
    let start = self.offset(window.x, y);
    start..start + window.width as usize
  }

  /// Rejects windows with zero area or reaching past the surface bounds.
  pub fn check_window(&self, window: PixelRect) -> Result<(), TerrainError> {
    if window.is_empty() || !self.bounds().contains_rect(&window) {
      return Err(TerrainError::InvalidWindow {
        window,
        raster: self.bounds(),
      });
    }
    Ok(())
  }

  /// Element at (x, y), or `None` outside the surface.
  #[inline]
  pub fn get(&self, x: u32, y: u32) -> Option<&T> {
    (x < self.width && y < self.height).then(|| &self.data[self.offset(x, y)])
  }

  /// Writes the element at (x, y). Returns false, changing nothing, outside
  /// the surface.
  #[inline]
  pub fn set(&mut self, x: u32, y: u32, value: T) -> bool {
    if x >= self.width || y >= self.height {
      return false;
    }
    let i = self.offset(x, y);
    self.data[i] = value;
    true
  }

  #[inline]
  pub fn as_slice(&self) -> &[T] {
    &self.data
  }
}

impl Raster {
  /// Flattens the raster into RGBA8 bytes (for texture upload).
  pub fn to_rgba8(&self) -> Vec<u8> {
    self
      .data
      .iter()
      .flat_map(|p| [p.r, p.g, p.b, p.a])
      .collect()
  }

  /// Builds a raster from tightly packed RGBA8 bytes.
  pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
    if bytes.len() != (width as usize) * (height as usize) * 4 {
      return None;
    }
    let pixels = bytes
      .chunks_exact(4)
      .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
      .collect();
    Self::from_vec(width, height, pixels)
  }
}

impl<T> Index<(u32, u32)> for Surface<T> {
  type Output = T;

  #[inline]
  fn index(&self, (x, y): (u32, u32)) -> &T {
    &self.data[self.offset(x, y)]
  }
}

impl<T> IndexMut<(u32, u32)> for Surface<T> {
  #[inline]
  fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut T {
    let i = self.offset(x, y);
    &mut self.data[i]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn window_round_trip_preserves_surroundings() {
    let mut raster = Raster::filled(8, 8, Rgba::rgb(10, 20, 30));
    let window = PixelRect::new(2, 3, 3, 2);

    let mut pixels = raster.read_window(window).unwrap();
    assert_eq!(pixels.len(), 6);
    for p in &mut pixels {
      *p = Rgba::TRANSPARENT;
    }
    raster.write_window(window, &pixels).unwrap();

    assert_eq!(raster[(2, 3)], Rgba::TRANSPARENT);
    assert_eq!(raster[(4, 4)], Rgba::TRANSPARENT);
    assert_eq!(raster[(5, 3)], Rgba::rgb(10, 20, 30));
    assert_eq!(raster[(2, 5)], Rgba::rgb(10, 20, 30));
  }

  #[test]
  fn out_of_bounds_window_is_rejected() {
    let raster = Raster::new(8, 8);
    assert!(matches!(
      raster.read_window(PixelRect::new(6, 6, 4, 4)),
      Err(TerrainError::InvalidWindow { .. })
    ));
    assert!(matches!(
      raster.read_window(PixelRect::new(1, 1, 0, 4)),
      Err(TerrainError::InvalidWindow { .. })
    ));
  }

  #[test]
  fn window_overflowing_u32_is_rejected() {
    let mut raster = Raster::new(8, 8);
    let window = PixelRect::new(u32::MAX - 3, 0, 8, 8);
    assert!(matches!(
      raster.read_window(window),
      Err(TerrainError::InvalidWindow { .. })
    ));
    assert!(matches!(
      raster.write_window(window, &[Rgba::MAGENTA; 64]),
      Err(TerrainError::InvalidWindow { .. })
    ));
  }

  #[test]
  fn mismatched_write_length_is_rejected() {
    let mut raster = Raster::new(4, 4);
    let result = raster.write_window(PixelRect::new(0, 0, 2, 2), &[Rgba::MAGENTA; 3]);
    assert!(result.is_err());
  }

  #[test]
  fn rgba8_bytes_round_trip() {
    let mut raster = Raster::new(2, 1);
    raster.set(1, 0, Rgba::new(1, 2, 3, 4));
    let bytes = raster.to_rgba8();
    assert_eq!(bytes, vec![0, 0, 0, 0, 1, 2, 3, 4]);
    assert_eq!(Raster::from_rgba8(2, 1, &bytes), Some(raster));
  }
}
