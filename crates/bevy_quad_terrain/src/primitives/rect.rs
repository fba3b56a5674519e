use bevy::math::{UVec2, Vec2};

/// A rectangular region in raster pixel space.
///
/// Half-open: covers columns `x..x + width` and rows `y..y + height`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
  pub x: u32,
  pub y: u32,
  pub width: u32,
  pub height: u32,
}

impl PixelRect {
  /// Creates a new rectangle.
  #[inline]
  pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
    Self {
      x,
      y,
      width,
      height,
    }
  }

  /// Creates a rectangle covering an entire surface.
  #[inline]
  pub fn full(surface_width: u32, surface_height: u32) -> Self {
    Self::new(0, 0, surface_width, surface_height)
  }

  /// Builds the rectangle spanning `min..max` on both axes from signed
  /// coordinates, clamped to `0..bound_width` and `0..bound_height`.
  pub fn from_signed_bounds(
    min_x: i64,
    min_y: i64,
    max_x: i64,
    max_y: i64,
    bound_width: u32,
    bound_height: u32,
  ) -> Self {
    let x0 = min_x.clamp(0, bound_width as i64);
    let y0 = min_y.clamp(0, bound_height as i64);
    let x1 = max_x.clamp(x0, bound_width as i64);
    let y1 = max_y.clamp(y0, bound_height as i64);
    Self::new(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32)
  }

  /// Exclusive right edge, saturating at `u32::MAX`.
  #[inline]
  pub const fn right(&self) -> u32 {
    self.x.saturating_add(self.width)
  }

  /// Exclusive bottom edge, saturating at `u32::MAX`.
  #[inline]
  pub const fn bottom(&self) -> u32 {
    self.y.saturating_add(self.height)
  }

  /// Number of pixels covered.
  #[inline]
  pub const fn area(&self) -> u64 {
    self.width as u64 * self.height as u64
  }

  /// Returns true if the rectangle covers no pixels.
  #[inline]
  pub const fn is_empty(&self) -> bool {
    self.width == 0 || self.height == 0
  }

  /// Geometric center in (fractional) pixel coordinates.
  #[inline]
  pub fn center(&self) -> Vec2 {
    Vec2::new(
      self.x as f32 + self.width as f32 / 2.0,
      self.y as f32 + self.height as f32 / 2.0,
    )
  }

  /// Half-open pixel containment.
  #[inline]
  pub fn contains(&self, p: UVec2) -> bool {
    p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
  }

  /// Half-open containment for fractional coordinates.
  #[inline]
  pub fn contains_f32(&self, p: Vec2) -> bool {
    p.x >= self.x as f32
      && p.x < self.right() as f32
      && p.y >= self.y as f32
      && p.y < self.bottom() as f32
  }

  /// Containment excluding all four edge lines.
  #[inline]
  pub fn contains_strictly(&self, p: UVec2) -> bool {
    p.x > self.x && p.x < self.right() && p.y > self.y && p.y < self.bottom()
  }

  /// Containment including all four edge lines (the far edges too).
  #[inline]
  pub fn contains_closed(&self, p: UVec2) -> bool {
    p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
  }

  /// Returns true if `other` lies entirely within this rectangle.
  ///
  /// Edges are compared in `u64`, so a rectangle reaching past `u32::MAX` is
  /// never contained.
  #[inline]
  pub fn contains_rect(&self, other: &Self) -> bool {
    let far = |r: &Self| (r.x as u64 + r.width as u64, r.y as u64 + r.height as u64);
    let (right, bottom) = far(self);
    let (other_right, other_bottom) = far(other);
    other.x >= self.x && other.y >= self.y && other_right <= right && other_bottom <= bottom
  }

  /// Smallest rectangle covering both. Empty rectangles are ignored.
  pub fn union(&self, other: &Self) -> Self {
    if self.is_empty() {
      return *other;
    }
    if other.is_empty() {
      return *self;
    }
    let x = self.x.min(other.x);
    let y = self.y.min(other.y);
    let right = self.right().max(other.right());
    let bottom = self.bottom().max(other.bottom());
    Self::new(x, y, right - x, bottom - y)
  }

  /// Clamps this rect to fit within the given bounds.
  pub fn clamped(&self, bound_width: u32, bound_height: u32) -> Self {
    let x = self.x.min(bound_width);
    let y = self.y.min(bound_height);
    let max_w = bound_width.saturating_sub(x);
    let max_h = bound_height.saturating_sub(y);
    Self {
      x,
      y,
      width: self.width.min(max_w),
      height: self.height.min(max_h),
    }
  }
}
