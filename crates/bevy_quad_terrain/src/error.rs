//! Error types for terrain operations.

use thiserror::Error;

use crate::primitives::PixelRect;

/// Error raised by a terrain operation.
///
/// Every variant is raised before the raster is mutated, except
/// [`TerrainError::PhysicsWorld`] during a recompute: parts removed before the
/// failure stay removed.
#[derive(Debug, Error)]
pub enum TerrainError {
  /// Zero-area window, or a window (or impact point) outside the raster.
  #[error("invalid window {window:?} for raster bounds {raster:?}")]
  InvalidWindow { window: PixelRect, raster: PixelRect },
  /// The backing image for a raster layer is not available.
  #[error("raster backing storage is unavailable")]
  MissingRenderContext,
  /// The physics world refused to create or remove a part.
  #[error("physics world failure: {0}")]
  PhysicsWorld(#[from] PhysicsWorldError),
}

/// Error reported by a [`crate::physics::PhysicsWorld`] backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhysicsWorldError {
  /// The handle does not refer to a live body/collider pair.
  #[error("unknown body/collider handle {0}")]
  UnknownHandle(String),
  /// The backend rejected the request.
  #[error("request rejected: {0}")]
  Rejected(String),
}
