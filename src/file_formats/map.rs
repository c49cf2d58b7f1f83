//! MAP textures: `i32 width, i32 height`, then one palette index per pixel, row by row.

use crate::Reader;
use crate::data_formats::{Palette, TextureBuilder};
use crate::file_formats::{DecodeError, Decoded, Diagnostic, read_dimensions};

const HEADER_LEN: usize = 8;

pub fn decode_map(data: &[u8], palette: &Palette) -> Result<Decoded, DecodeError> {
	let mut reader = Reader::new(data);
	let (width, height) = read_dimensions(&mut reader, HEADER_LEN)?;

	let mut builder = TextureBuilder::new(width, height);
	let indices = reader.remaining_slice();
	let expected = width as usize * height as usize;

	// a short file just stops early, the remaining pixels keep their initial value
	let written = expected.min(indices.len());
	for (i, &index) in indices[..written].iter().enumerate() {
		let colour = builder.resolve(palette, index);
		builder.pixels_mut()[i] = colour;
	}

	let mut diagnostics = Vec::new();
	if written < expected {
		log::warn!("map stream ended after {written} of {expected} pixels");
		diagnostics.push(Diagnostic::TruncatedStream { written, expected });
	} else if indices.len() > expected {
		log::trace!("ignoring {} trailing bytes", indices.len() - expected);
	}

	let texture = builder.finish();
	log::debug!(
		"decoded map {width}x{height} (transparent: {})",
		texture.has_transparency
	);
	Ok(Decoded {
		texture,
		diagnostics,
	})
}
