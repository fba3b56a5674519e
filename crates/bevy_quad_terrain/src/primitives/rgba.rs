//! RGBA pixel type for terrain rasters.

/// One terrain pixel, laid out like an `Rgba8UnormSrgb` texel.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

impl Rgba {
  #[inline]
  pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
    Self { r, g, b, a }
  }

  /// Fully opaque color.
  #[inline]
  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b, a: 255 }
  }

  /// Sum of all four channels.
  ///
  /// Used to diff raster snapshots; two pixels with equal sums are treated as
  /// unchanged.
  #[inline]
  pub const fn channel_sum(self) -> u16 {
    self.r as u16 + self.g as u16 + self.b as u16 + self.a as u16
  }

  /// Same color with the given alpha.
  #[inline]
  pub const fn with_alpha(self, a: u8) -> Self {
    Self { a, ..self }
  }

  /// Empty pixel: never solid.
  pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

  /// Opaque magenta, the default carve marker.
  pub const MAGENTA: Self = Self::rgb(255, 0, 255);
}
