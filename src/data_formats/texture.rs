use serde::Serialize;

use crate::data_formats::palette::{Palette, Rgba, TRANSPARENT};
use crate::OutputWriter;

#[derive(Serialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
	#[default]
	Repeat,
	Clamp,
}

#[derive(Serialize, Default, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
	#[default]
	Bilinear,
	Point,
}

/// A decoded RGBA texture, rows top to bottom.
#[derive(Clone, PartialEq, Eq)]
pub struct Texture {
	pub width: u32,
	pub height: u32,
	pub pixels: Vec<Rgba>,
	pub has_transparency: bool,
	pub wrap_mode: WrapMode,
	pub filter_mode: FilterMode,
	pub generate_mips: bool,
}

impl Texture {
	/// Stand-in for textures that could not be loaded.
	pub fn placeholder() -> Self {
		Self {
			width: 1,
			height: 1,
			pixels: vec![[0, 0, 0, 255]],
			has_transparency: false,
			wrap_mode: WrapMode::Repeat,
			filter_mode: FilterMode::Bilinear,
			generate_mips: true,
		}
	}

	pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
		if x >= self.width || y >= self.height {
			return None;
		}
		self.pixels
			.get(y as usize * self.width as usize + x as usize)
			.copied()
	}

	pub fn as_bytes(&self) -> &[u8] {
		self.pixels.as_flattened()
	}

	pub fn info(&self) -> TextureInfo {
		TextureInfo {
			width: self.width,
			height: self.height,
			has_transparency: self.has_transparency,
			wrap_mode: self.wrap_mode,
			filter_mode: self.filter_mode,
			generate_mips: self.generate_mips,
		}
	}

	pub fn save_as(&self, name: &str, output: &mut OutputWriter) -> std::io::Result<()> {
		output.write_png(name, self.width, self.height, self.as_bytes())
	}
}

impl std::fmt::Debug for Texture {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Texture")
			.field("width", &self.width)
			.field("height", &self.height)
			.field("has_transparency", &self.has_transparency)
			.field("wrap_mode", &self.wrap_mode)
			.finish()
	}
}

/// Texture metadata without the pixels, for reports.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureInfo {
	pub width: u32,
	pub height: u32,
	pub has_transparency: bool,
	pub wrap_mode: WrapMode,
	pub filter_mode: FilterMode,
	pub generate_mips: bool,
}

/// Pixel buffer under construction. Starts fully transparent black, so anything a truncated
/// file never reaches stays that way.
pub struct TextureBuilder {
	width: u32,
	height: u32,
	pixels: Vec<Rgba>,
	has_transparency: bool,
}

impl TextureBuilder {
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			width,
			height,
			pixels: vec![TRANSPARENT; width as usize * height as usize],
			has_transparency: false,
		}
	}

	/// Colour for a palette index. Seeing the sentinel marks the texture as transparent,
	/// whether or not the pixel ends up inside the image.
	pub fn resolve(&mut self, palette: &Palette, index: u8) -> Rgba {
		palette.lookup(index).unwrap_or_else(|| {
			self.has_transparency = true;
			TRANSPARENT
		})
	}

	/// Writes a pixel, ignoring coordinates outside the image.
	pub fn put(&mut self, x: u32, y: u32, colour: Rgba) {
		if x < self.width && y < self.height {
			self.pixels[y as usize * self.width as usize + x as usize] = colour;
		}
	}

	/// Row-major pixel slots, for formats that fill the image linearly.
	pub fn pixels_mut(&mut self) -> &mut [Rgba] {
		&mut self.pixels
	}

	pub fn finish(self) -> Texture {
		Texture {
			width: self.width,
			height: self.height,
			pixels: self.pixels,
			has_transparency: self.has_transparency,
			wrap_mode: if self.has_transparency {
				WrapMode::Clamp
			} else {
				WrapMode::Repeat
			},
			filter_mode: FilterMode::Bilinear,
			generate_mips: true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_clips_and_tracks_transparency() {
		let palette = Palette::from_rgb(&[[10, 20, 30]]);
		let mut builder = TextureBuilder::new(2, 2);
		let colour = builder.resolve(&palette, 0);
		builder.put(1, 1, colour);
		builder.put(2, 0, colour);
		builder.put(0, 5, colour);
		let texture = builder.finish();

		assert_eq!(texture.pixels.len(), 4);
		assert_eq!(texture.pixel(1, 1), Some([10, 20, 30, 255]));
		assert_eq!(texture.pixel(0, 0), Some(TRANSPARENT));
		assert_eq!(texture.pixel(2, 0), None);
		assert!(!texture.has_transparency);
		assert_eq!(texture.wrap_mode, WrapMode::Repeat);
		assert!(texture.generate_mips);

		let mut builder = TextureBuilder::new(1, 1);
		assert_eq!(builder.resolve(&palette, 0xFF), TRANSPARENT);
		let texture = builder.finish();
		assert!(texture.has_transparency);
		assert_eq!(texture.wrap_mode, WrapMode::Clamp);
	}

	#[test]
	fn placeholder_is_opaque_black() {
		let texture = Texture::placeholder();
		assert_eq!((texture.width, texture.height), (1, 1));
		assert_eq!(texture.as_bytes(), [0, 0, 0, 255]);
		assert!(!texture.has_transparency);
		assert_eq!(texture.wrap_mode, WrapMode::Repeat);
	}

	#[test]
	fn info_serialises() {
		let json = serde_json::to_string(&Texture::placeholder().info()).unwrap();
		assert_eq!(
			json,
			r#"{"width":1,"height":1,"has_transparency":false,"wrap_mode":"repeat","filter_mode":"bilinear","generate_mips":true}"#
		);
	}
}
