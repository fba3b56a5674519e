//! Texture creation and upload for terrain rasters.

use bevy::asset::RenderAssetUsages;
use bevy::image::ImageSampler;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::error::TerrainError;
use crate::primitives::Raster;

/// Creates an RGBA8 texture holding `raster`, with nearest-neighbor sampling.
pub fn create_texture(images: &mut Assets<Image>, raster: &Raster) -> Handle<Image> {
  let size = Extent3d {
    width: raster.width(),
    height: raster.height(),
    depth_or_array_layers: 1,
  };

  let mut image = Image::new_fill(
    size,
    TextureDimension::D2,
    &[0, 0, 0, 0],
    TextureFormat::Rgba8UnormSrgb,
    RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
  );
  image.sampler = ImageSampler::nearest();
  image.data = Some(raster.to_rgba8());

  images.add(image)
}

/// Copies raster pixels into an existing texture of the same size.
pub fn upload_raster(raster: &Raster, image: &mut Image) -> Result<(), TerrainError> {
  let bytes = raster.to_rgba8();
  match image.data {
    Some(ref mut data) if data.len() == bytes.len() => {
      data.copy_from_slice(&bytes);
      Ok(())
    }
    _ => Err(TerrainError::MissingRenderContext),
  }
}

/// Uploads `raster` to the texture behind `handle`.
pub fn upload_to_handle(
  images: &mut Assets<Image>,
  handle: &Handle<Image>,
  raster: &Raster,
) -> Result<(), TerrainError> {
  let image = images
    .get_mut(handle)
    .ok_or(TerrainError::MissingRenderContext)?;
  upload_raster(raster, image)
}
