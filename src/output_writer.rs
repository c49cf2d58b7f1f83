use std::{
	fs,
	io::{self, BufWriter},
	path::{Path, PathBuf},
};

use serde::Serialize;

#[derive(Clone)]
pub struct OutputWriter {
	path: PathBuf,
}
impl OutputWriter {
	/// Output directory for an asset directory, `<output_root>/<last component of assets>`.
	pub fn get_output_path(output_root: impl AsRef<Path>, assets: impl AsRef<Path>) -> PathBuf {
		let assets = assets.as_ref();
		match assets.file_name() {
			Some(name) => output_root.as_ref().join(name),
			None => output_root.as_ref().to_path_buf(),
		}
	}

	pub fn new(path: impl AsRef<Path>, create_output_dir: bool) -> io::Result<Self> {
		let mut output_path = path.as_ref().to_path_buf();
		if create_output_dir {
			fs::create_dir_all(&output_path)?;
		}
		output_path.push("_");
		Ok(OutputWriter { path: output_path })
	}

	pub fn dir(&self) -> &Path {
		self.path.parent().unwrap_or(Path::new(""))
	}

	fn set_output_path(&mut self, asset_name: &str, ext: &str) -> &Path {
		let ext = ext.trim_start_matches('.');
		self.path.set_file_name(asset_name);
		self.path.set_extension(ext);
		&self.path
	}

	pub fn write(&mut self, asset_name: &str, ext: &str, data: impl AsRef<[u8]>) -> io::Result<()> {
		fs::write(self.set_output_path(asset_name, ext), data)
	}

	pub fn write_json(&mut self, asset_name: &str, value: &impl Serialize) -> io::Result<()> {
		let json = serde_json::to_string_pretty(value)?;
		self.write(asset_name, "json", json)
	}

	/// Writes 8-bit RGBA pixels as a PNG.
	pub fn write_png(
		&mut self, asset_name: &str, width: u32, height: u32, pixels: impl AsRef<[u8]>,
	) -> io::Result<()> {
		save_png(self.set_output_path(asset_name, "png"), pixels.as_ref(), width, height)
	}
}

fn save_png(path: &Path, data: &[u8], width: u32, height: u32) -> io::Result<()> {
	let mut encoder = png::Encoder::new(BufWriter::new(fs::File::create(path)?), width, height);
	encoder.set_color(png::ColorType::Rgba);
	encoder.set_depth(png::BitDepth::Eight);
	let mut writer = encoder.write_header().map_err(io::Error::other)?;
	writer.write_image_data(data).map_err(io::Error::other)?;
	writer.finish().map_err(io::Error::other)
}
