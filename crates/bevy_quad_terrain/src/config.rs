//! Terrain tuning loaded from TOML.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Deserializer, de};

use crate::collision::{AlphaGrid, EntryRule, LeafFilter, MIN_CELL_SIZE, TracerConfig};
use crate::primitives::Rgba;

/// How the decomposer decides whether a non-subdivided leaf is solid.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeafPolicy {
  /// Keep a leaf only when a boundary point of its parent lies inside it.
  ParentBoundary,
  /// Keep a leaf when it holds at least one solid pixel.
  #[default]
  SolidSample,
}

/// Configuration for boundary tracing, decomposition and damage.
#[derive(Resource, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
  /// Alpha strictly above this is solid. Default: 5
  pub solidity_threshold: u8,
  /// Solid-entry points within this many pixels of a window's left or top
  /// edge are dropped. Default: 1
  pub edge_suppression: u32,
  /// Which tracker state makes a solid pixel a boundary entry.
  /// Default: `not_both_marked`
  pub entry_rule: EntryRule,
  /// Cells with an edge below this stop subdividing. Default: 4
  pub min_cell_size: u32,
  /// Leaf inclusion policy. Default: `solid_sample`
  pub leaf_policy: LeafPolicy,
  /// Tile edge used when rebuilding the whole raster. Default: 32
  pub tile_size: u32,
  /// Extra pixels around the `3 x radius` damage window. Default: 2
  pub damage_margin: u32,
  /// Background scorch radius is `radius / scorch_divisor`. Must be positive.
  /// Default: 3
  #[serde(deserialize_with = "deserialize_positive")]
  pub scorch_divisor: f32,
  /// Marker painted into the disc before diffing. Default: `#ff00ff`
  #[serde(deserialize_with = "deserialize_hex_color")]
  pub carve_color: Rgba,
  /// Grow a recompute window until it covers every part it removes.
  /// Default: true
  pub expand_to_removed_parts: bool,
}

impl Default for TerrainConfig {
  fn default() -> Self {
    Self {
      solidity_threshold: 5,
      edge_suppression: 1,
      entry_rule: EntryRule::NotBothMarked,
      min_cell_size: MIN_CELL_SIZE,
      leaf_policy: LeafPolicy::SolidSample,
      tile_size: 32,
      damage_margin: 2,
      scorch_divisor: 3.0,
      carve_color: Rgba::MAGENTA,
      expand_to_removed_parts: true,
    }
  }
}

impl TerrainConfig {
  /// Sets the leaf policy.
  pub fn with_leaf_policy(mut self, policy: LeafPolicy) -> Self {
    self.leaf_policy = policy;
    self
  }

  /// Sets the boundary entry rule.
  pub fn with_entry_rule(mut self, rule: EntryRule) -> Self {
    self.entry_rule = rule;
    self
  }

  /// Sets the rebuild tile size.
  pub fn with_tile_size(mut self, tile_size: u32) -> Self {
    self.tile_size = tile_size;
    self
  }

  /// Enables or disables window expansion over removed parts.
  pub fn with_expansion(mut self, enabled: bool) -> Self {
    self.expand_to_removed_parts = enabled;
    self
  }

  /// Tracer settings derived from this config.
  pub fn tracer(&self) -> TracerConfig {
    TracerConfig {
      solidity_threshold: self.solidity_threshold,
      edge_suppression: self.edge_suppression,
      entry_rule: self.entry_rule,
    }
  }

  /// Background scorch radius for a carve of `radius`, or `None` when
  /// `scorch_divisor` is not a positive number.
  pub fn scorch_radius(&self, radius: f32) -> Option<f32> {
    let divisor = self.scorch_divisor;
    (divisor.is_finite() && divisor > 0.0).then(|| radius / divisor)
  }

  /// Leaf filter for a decomposition over `grid`.
  pub fn leaf_filter<'a>(&self, grid: &'a AlphaGrid) -> LeafFilter<'a> {
    match self.leaf_policy {
      LeafPolicy::ParentBoundary => LeafFilter::ParentBoundary,
      LeafPolicy::SolidSample => LeafFilter::SolidSample {
        grid,
        threshold: self.solidity_threshold,
      },
    }
  }

  /// Parses a config from TOML. Missing keys take their defaults.
  pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(contents)
  }

  /// Loads a config file, falling back to defaults when it is missing or
  /// malformed.
  pub fn load(path: &Path) -> Self {
    match std::fs::read_to_string(path) {
      Ok(contents) => match Self::from_toml_str(&contents) {
        Ok(config) => {
          info!("Loaded terrain config from {}", path.display());
          config
        }
        Err(e) => {
          warn!("Failed to parse terrain config: {e}, using defaults");
          Self::default()
        }
      },
      Err(e) => {
        warn!("Failed to read terrain config: {e}, using defaults");
        Self::default()
      }
    }
  }
}

fn deserialize_positive<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
  D: Deserializer<'de>,
{
  let value = f32::deserialize(deserializer)?;
  if !value.is_finite() || value <= 0.0 {
    return Err(de::Error::custom(format!("expected a positive number, got {value}")));
  }
  Ok(value)
}

fn deserialize_hex_color<'de, D>(deserializer: D) -> Result<Rgba, D::Error>
where
  D: Deserializer<'de>,
{
  let s: String = Deserialize::deserialize(deserializer)?;
  let s = s.trim_start_matches('#');
  if !s.is_ascii() || (s.len() != 6 && s.len() != 8) {
    return Err(de::Error::custom("hex color must be 6 or 8 characters"));
  }
  let channel = |i: usize| -> Result<u8, D::Error> {
    u8::from_str_radix(&s[i..i + 2], 16).map_err(de::Error::custom)
  };
  let a = if s.len() == 8 { channel(6)? } else { 255 };
  Ok(Rgba::new(channel(0)?, channel(2)?, channel(4)?, a))
}
