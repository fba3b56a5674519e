mod rect;
mod rgba;
mod surface;

pub use rect::PixelRect;
pub use rgba::Rgba;
pub use surface::{Raster, Surface};
