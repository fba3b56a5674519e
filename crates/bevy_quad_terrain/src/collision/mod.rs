//! Collision geometry extraction for raster terrain.
//!
//! This module turns a raster window into axis-aligned collision quads.
//!
//! # Architecture
//!
//! The pipeline runs synchronously over one window at a time:
//! 1. [`sample_alpha`] copies the window's alpha channel into an [`AlphaGrid`]
//! 2. [`trace_boundaries`] scans the grid for solid/empty transitions,
//!    producing sparse boundary points and the solid bounding box
//! 3. [`decompose_quads`] recursively splits the window around those points
//!
//! # Usage
//!
//! ```ignore
//! let grid = sample_alpha(&raster, window)?;
//! let trace = trace_boundaries(&grid, &TracerConfig::default());
//! let quads = decompose_quads(
//!     &trace.points,
//!     window,
//!     MIN_CELL_SIZE,
//!     LeafFilter::SolidSample { grid: &grid, threshold: 5 },
//! );
//! ```

mod quads;
mod sampler;
mod tracer;

pub use quads::{LeafFilter, MIN_CELL_SIZE, Quad, decompose_quads};
pub use sampler::{AlphaGrid, sample_alpha};
pub use tracer::{BoundaryTrace, EntryRule, TracerConfig, trace_boundaries};
