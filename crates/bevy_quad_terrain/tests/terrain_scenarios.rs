//! Scenario tests for carving, resync and support queries.
//!
//! Run: cargo test -p bevy_quad_terrain --test terrain_scenarios

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use bevy::math::{IVec2, UVec2, Vec2};
use bevy_quad_terrain::{
  AabbHandle, AabbWorld, LeafPolicy, PhysicsWorld, PixelRect, Quad, Raster, RasterTransform, Rgba,
  TerrainConfig, TerrainError, TerrainSurface,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DIRT: Rgba = Rgba::rgb(120, 90, 60);

fn opaque_square(config: TerrainConfig) -> (TerrainSurface<AabbHandle>, AabbWorld) {
  let mut surface = TerrainSurface::new(
    Raster::filled(64, 64, DIRT),
    RasterTransform::default(),
    config,
  );
  let mut physics = AabbWorld::new();
  surface.rebuild(&mut physics).unwrap();
  (surface, physics)
}

/// World position of a pixel for the default transform.
fn world(x: f32, y: f32) -> Vec2 {
  Vec2::new(x, -y)
}

fn as_set(quads: &[Quad]) -> HashSet<Quad> {
  quads.iter().copied().collect()
}

/// Distance from `p` to the closest point of the closed quad.
fn distance_to_quad(quad: &Quad, p: Vec2) -> f32 {
  let dx = (quad.x as f32 - p.x).max(p.x - quad.right() as f32).max(0.0);
  let dy = (quad.y as f32 - p.y).max(p.y - quad.bottom() as f32).max(0.0);
  Vec2::new(dx, dy).length()
}

#[test]
fn rebuild_tiles_opaque_square() {
  let (surface, physics) = opaque_square(TerrainConfig::default());
  assert_eq!(
    as_set(&surface.quads()),
    as_set(&[
      PixelRect::new(0, 0, 32, 32),
      PixelRect::new(32, 0, 32, 32),
      PixelRect::new(0, 32, 32, 32),
      PixelRect::new(32, 32, 32, 32),
    ])
  );
  assert_eq!(physics.len(), 4);
}

#[test]
fn carve_at_center_keeps_corners_and_clears_hole() {
  let (mut surface, mut physics) = opaque_square(TerrainConfig::default());
  let report = surface
    .carve_damage(&mut physics, world(32.0, 32.0), 10.0)
    .unwrap();

  assert_eq!(report.center, IVec2::new(32, 32));
  // Every tile part had its body inside the damage window, so the window
  // grew to cover all of them.
  assert_eq!(report.recompute.window, PixelRect::new(0, 0, 64, 64));
  assert_eq!(report.recompute.removed.len(), 4);

  let quads = surface.quads();
  for corner in [(0, 0), (63, 0), (0, 63), (63, 63)] {
    let corner = UVec2::new(corner.0, corner.1);
    assert!(
      quads.iter().any(|q| q.contains(corner)),
      "no quad near corner {corner}"
    );
  }

  // Leaves along the rim may reach into the hole by up to one cell.
  let center = Vec2::new(32.0, 32.0);
  let margin = (10 - surface.config().min_cell_size) as f32;
  for quad in &quads {
    assert!(distance_to_quad(quad, center) > margin, "{quad:?} covers the hole");
  }

  assert!(!surface.point_is_solid(&physics, world(32.0, 32.0)));
  for p in [(44.0, 32.0), (32.0, 44.0), (20.0, 32.0), (32.0, 20.0)] {
    assert!(
      surface.point_is_solid(&physics, world(p.0, p.1)),
      "{p:?} should still be solid"
    );
  }
  assert_eq!(physics.len(), surface.part_count());
}

#[test]
fn parent_boundary_policy_keeps_hole_covered() {
  let config = TerrainConfig::default().with_leaf_policy(LeafPolicy::ParentBoundary);
  let (mut surface, mut physics) = opaque_square(config);
  surface
    .carve_damage(&mut physics, world(32.0, 32.0), 10.0)
    .unwrap();

  // Leaves are kept by proximity to boundary points, not by solidity.
  assert!(surface.point_is_solid(&physics, world(32.0, 32.0)));
  assert!(!surface.quads().iter().any(|q| q.contains(UVec2::ZERO)));
}

#[test]
fn carve_fires_listener_exactly_once() {
  let (mut surface, mut physics) = opaque_square(TerrainConfig::default());
  let handle = surface.part_at(world(40.0, 40.0)).unwrap();

  let fired = Arc::new(AtomicU32::new(0));
  let counter = fired.clone();
  assert!(surface.register_damage_listener(
    handle,
    Box::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
    })
  ));

  let report = surface
    .carve_damage(&mut physics, world(32.0, 32.0), 10.0)
    .unwrap();
  assert_eq!(report.recompute.listeners_fired, 1);
  assert!(report.recompute.removed.contains(&handle));

  surface
    .carve_damage(&mut physics, world(32.0, 32.0), 10.0)
    .unwrap();
  assert_eq!(fired.load(Ordering::SeqCst), 1);
  assert_eq!(surface.listener_count(), 0);
}

#[test]
fn recompute_removes_every_part_in_window() {
  let (mut surface, mut physics) = opaque_square(TerrainConfig::default());
  surface
    .carve_damage(&mut physics, world(32.0, 32.0), 10.0)
    .unwrap();

  let window = PixelRect::new(0, 0, 32, 32);
  let inside: Vec<AabbHandle> = surface
    .parts()
    .filter(|part| {
      let c = Vec2::new(part.center.x, -part.center.y);
      c.x >= 0.0 && c.x <= 32.0 && c.y >= 0.0 && c.y <= 32.0
    })
    .map(|part| part.handle)
    .collect();
  assert!(!inside.is_empty());

  let report = surface.recompute_window(&mut physics, window).unwrap();
  for handle in inside {
    assert!(report.removed.contains(&handle));
    assert!(physics.get(handle).is_none());
  }
}

#[test]
fn recompute_twice_yields_equal_quads() {
  let (mut surface, mut physics) = opaque_square(TerrainConfig::default());
  let damage = surface
    .carve_damage(&mut physics, world(32.0, 32.0), 10.0)
    .unwrap();

  for window in [damage.recompute.window, PixelRect::new(32, 0, 32, 32)] {
    let first = surface.recompute_window(&mut physics, window).unwrap();
    let second = surface.recompute_window(&mut physics, window).unwrap();
    assert_eq!(as_set(&first.quads), as_set(&second.quads));
    assert_eq!(first.window, second.window);
  }
}

#[test]
fn carve_outside_raster_is_rejected() {
  let (mut surface, mut physics) = opaque_square(TerrainConfig::default());
  let before = as_set(&surface.quads());

  for (point, radius) in [(world(70.0, 10.0), 5.0), (world(10.0, 10.0), 0.0)] {
    let result = surface.carve_damage(&mut physics, point, radius);
    assert!(matches!(result, Err(TerrainError::InvalidWindow { .. })));
  }
  assert_eq!(as_set(&surface.quads()), before);
  assert!(surface.foreground().as_slice().iter().all(|p| p.a == 255));
}

#[test]
fn background_gets_smaller_scorch() {
  let mut surface = TerrainSurface::new(
    Raster::filled(64, 64, DIRT),
    RasterTransform::default(),
    TerrainConfig::default(),
  )
  .with_background(Raster::filled(64, 64, Rgba::rgb(40, 30, 20)))
  .unwrap();
  let mut physics = AabbWorld::new();
  surface.rebuild(&mut physics).unwrap();

  let report = surface
    .carve_damage(&mut physics, world(32.0, 32.0), 9.0)
    .unwrap();
  assert!(report.scorched > 0 && report.scorched < report.carved);

  let background = surface.background().unwrap();
  let foreground = surface.foreground();
  assert_eq!(background[(32, 32)].a, 0);
  assert_eq!(background[(37, 32)].a, 255);
  assert_eq!(foreground[(37, 32)].a, 0);
  assert!(surface.take_dirty());
  assert!(!surface.take_dirty());
}

#[test]
fn scaled_transform_carves_in_pixels() {
  let mut surface = TerrainSurface::new(
    Raster::filled(64, 64, DIRT),
    RasterTransform::new(Vec2::new(-32.0, 32.0), 0.5),
    TerrainConfig::default(),
  );
  let mut physics = AabbWorld::new();
  surface.rebuild(&mut physics).unwrap();

  // World (-16, 16) is pixel (32, 32); 5 world units are 10 pixels.
  let report = surface
    .carve_damage(&mut physics, Vec2::new(-16.0, 16.0), 5.0)
    .unwrap();
  assert_eq!(report.center, IVec2::new(32, 32));
  assert_eq!(report.radius, 10.0);
  assert!(!surface.point_is_solid(&physics, Vec2::new(-16.0, 16.0)));
  assert!(surface.point_is_solid(&physics, Vec2::new(-31.5, 31.5)));
}

#[test]
fn gap_in_floor_makes_entity_fall() {
  let mut raster = Raster::filled(96, 64, Rgba::TRANSPARENT);
  for y in 48..64 {
    for x in (0..32).chain(64..96) {
      raster.set(x, y, DIRT);
    }
  }
  let mut surface = TerrainSurface::new(raster, RasterTransform::default(), TerrainConfig::default());
  let mut physics = AabbWorld::new();
  surface.rebuild(&mut physics).unwrap();
  assert_eq!(surface.part_count(), 4);

  let over_gap = surface.query_nearest_support(IVec2::new(48, 47), 16, 4, 1);
  assert!(over_gap.fell());
  assert!(over_gap.support.is_none());

  let on_floor = surface.query_nearest_support(IVec2::new(70, 47), 16, 4, -1);
  assert_eq!(on_floor.support, Some(IVec2::new(69, 48)));
}

#[test]
fn random_windows_recompute_idempotently() {
  let mut rng = StdRng::seed_from_u64(0x5eed);
  let (width, height) = (48u32, 40u32);

  for _ in 0..8 {
    let mut raster = Raster::filled(width, height, Rgba::TRANSPARENT);
    for _ in 0..6 {
      let cx = rng.gen_range(0..width) as i32;
      let cy = rng.gen_range(0..height) as i32;
      let r = rng.gen_range(2..12);
      let alpha = rng.gen_range(0..=255u8);
      for y in 0..height as i32 {
        for x in 0..width as i32 {
          if (x - cx).pow(2) + (y - cy).pow(2) <= r * r {
            raster.set(x as u32, y as u32, DIRT.with_alpha(alpha));
          }
        }
      }
    }

    let config = TerrainConfig::default()
      .with_expansion(false)
      .with_tile_size(16);
    let mut surface = TerrainSurface::new(raster, RasterTransform::default(), config);
    let mut physics = AabbWorld::new();
    surface.rebuild(&mut physics).unwrap();

    for _ in 0..10 {
      let x = rng.gen_range(0..width);
      let y = rng.gen_range(0..height);
      let window = PixelRect::new(
        x,
        y,
        rng.gen_range(1..=width - x),
        rng.gen_range(1..=height - y),
      );

      let first = surface.recompute_window(&mut physics, window).unwrap();
      let second = surface.recompute_window(&mut physics, window).unwrap();
      assert_eq!(as_set(&first.quads), as_set(&second.quads), "{window:?}");
      for quad in &second.quads {
        assert!(quad.width > 0 && quad.height > 0, "{quad:?}");
        assert!(window.contains_rect(quad), "{quad:?} leaves {window:?}");
      }
    }
    assert_eq!(physics.len(), surface.part_count());
  }
}

#[test]
fn physics_world_sees_every_part() {
  let (surface, physics) = opaque_square(TerrainConfig::default());
  for part in surface.parts() {
    let body = physics.get(part.handle).unwrap();
    assert_eq!(body.center, part.center);
    assert!(!body.sensor);
  }
  assert_eq!(
    physics
      .parts_in_circle(Vec2::new(16.0, -16.0), 1.0)
      .len(),
    1
  );
}
