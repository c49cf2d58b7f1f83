pub mod palette;
pub mod texture;

pub use palette::{Palette, Rgba, TRANSPARENT, TRANSPARENT_INDEX};
pub use texture::{FilterMode, Texture, TextureBuilder, TextureInfo, WrapMode};
