pub mod cbk;
pub mod map;
pub mod vqm;

pub use cbk::Codebook;
pub use map::decode_map;
pub use vqm::{BlockToken, VqmHeader, decode_vqm};

use serde::Serialize;
use thiserror::Error;

use crate::Reader;
use crate::data_formats::{Palette, Texture};
use crate::vfs::FileSystem;

/// Largest pixel count a header may ask for. Guards the pixel buffer allocation against
/// corrupt headers, the formats themselves have no limit.
pub const MAX_PIXELS: u64 = 1 << 26;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TextureFormat {
	/// Raw palette indices.
	Map,
	/// 4x4 blocks referencing a codebook.
	Vqm,
}

impl TextureFormat {
	pub fn from_filename(name: &str) -> Option<Self> {
		let (_, ext) = name.rsplit_once('.')?;
		if ext.eq_ignore_ascii_case("map") {
			Some(Self::Map)
		} else if ext.eq_ignore_ascii_case("vqm") {
			Some(Self::Vqm)
		} else {
			None
		}
	}

	pub fn extension(self) -> &'static str {
		match self {
			Self::Map => "map",
			Self::Vqm => "vqm",
		}
	}

	pub fn decode(
		self, data: &[u8], fs: &impl FileSystem, palette: &Palette,
	) -> Result<Decoded, DecodeError> {
		match self {
			Self::Map => decode_map(data, palette),
			Self::Vqm => decode_vqm(data, fs, palette),
		}
	}
}

/// A decoded texture plus whatever went wrong on the way.
#[derive(Debug)]
pub struct Decoded {
	pub texture: Texture,
	pub diagnostics: Vec<Diagnostic>,
}

/// Problems that degrade a texture without stopping it from loading.
#[derive(Error, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
	#[error("texture {name} not found")]
	MissingAsset { name: String },
	#[error("codebook {name} not found")]
	MissingCodebook { name: String },
	#[error("stream ended after {written} of {expected} units")]
	TruncatedStream { written: usize, expected: usize },
	#[error("codebook record {index} is past the end of the codebook")]
	CodebookRecordOutOfRange { index: u16 },
	#[error("texture {name} has a malformed header: {reason}")]
	MalformedHeader { name: String, reason: String },
}

/// Files that cannot be decoded at all.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
	#[error("header needs {needed} bytes but the file has {available}")]
	TruncatedHeader { needed: usize, available: usize },
	#[error("invalid dimensions {width}x{height}")]
	InvalidDimensions { width: i32, height: i32 },
	#[error("{width}x{height} is more than {MAX_PIXELS} pixels")]
	TooLarge { width: u32, height: u32 },
}

/// Reads the `i32 width, i32 height` pair both formats start with.
fn read_dimensions(reader: &mut Reader, header_len: usize) -> Result<(u32, u32), DecodeError> {
	let available = reader.remaining_len();
	let truncated = || DecodeError::TruncatedHeader {
		needed: header_len,
		available,
	};
	if available < header_len {
		return Err(truncated());
	}
	let width = reader.try_i32().ok_or_else(truncated)?;
	let height = reader.try_i32().ok_or_else(truncated)?;
	let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
		return Err(DecodeError::InvalidDimensions { width, height });
	};
	if u64::from(w) * u64::from(h) > MAX_PIXELS {
		return Err(DecodeError::TooLarge {
			width: w,
			height: h,
		});
	}
	Ok((w, h))
}

#[cfg(test)]
pub(crate) mod test_data {
	use crate::data_formats::Palette;

	/// Palette where index `i` is `[i, 255 - i, i / 2]`.
	pub fn gradient_palette() -> Palette {
		let colours: Vec<[u8; 3]> = (0..=255u8).map(|i| [i, 255 - i, i / 2]).collect();
		Palette::from_rgb(&colours)
	}

	pub fn colour(index: u8) -> [u8; 4] {
		[index, 255 - index, index / 2, 255]
	}

	pub fn map_file(width: i32, height: i32, indices: &[u8]) -> Vec<u8> {
		let mut data = Vec::new();
		data.extend_from_slice(&width.to_le_bytes());
		data.extend_from_slice(&height.to_le_bytes());
		data.extend_from_slice(indices);
		data
	}

	pub fn vqm_file(width: i32, height: i32, codebook: &str, tokens: &[u16]) -> Vec<u8> {
		let mut data = Vec::new();
		data.extend_from_slice(&width.to_le_bytes());
		data.extend_from_slice(&height.to_le_bytes());
		let mut name = [0u8; 12];
		name[..codebook.len()].copy_from_slice(codebook.as_bytes());
		data.extend_from_slice(&name);
		data.extend_from_slice(&0x1234i32.to_le_bytes());
		for token in tokens {
			data.extend_from_slice(&token.to_le_bytes());
		}
		data
	}

	pub fn cbk_file(records: &[[u8; 16]]) -> Vec<u8> {
		let mut data = vec![0xCC; 4];
		for record in records {
			data.extend_from_slice(record);
		}
		data
	}
}
