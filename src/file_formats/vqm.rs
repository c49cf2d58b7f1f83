//! VQM textures are vector quantised: the image is cut into 4x4 blocks, and each block is one
//! 16-bit token naming either a patch in a separate codebook (CBK) file or a flat colour.
//!
//! ```text
//! i32      width
//! i32      height
//! char[12] codebook filename
//! i32      unknown
//! u16[]    one token per block, left to right then top to bottom
//! ```
//!
//! Widths and heights need not be multiples of 4, blocks hanging over the edge are clipped.

use std::collections::BTreeSet;

use crate::Reader;
use crate::data_formats::{Palette, TextureBuilder};
use crate::file_formats::{Codebook, DecodeError, Decoded, Diagnostic, read_dimensions};
use crate::vfs::{FileSystem, normalize_name};

const HEADER_LEN: usize = 24;
const BLOCK_SIZE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VqmHeader {
	pub width: u32,
	pub height: u32,
	/// Normalised name of the codebook file.
	pub codebook: String,
	pub unk1: i32,
}

impl VqmHeader {
	pub fn parse(reader: &mut Reader) -> Result<Self, DecodeError> {
		let (width, height) = read_dimensions(reader, HEADER_LEN)?;
		// the length was checked above, only unprintable names can fail here
		let codebook = reader.try_cstr(12).map(normalize_name).unwrap_or_default();
		let unk1 = reader.try_i32().unwrap_or_default();
		Ok(Self {
			width,
			height,
			codebook,
			unk1,
		})
	}

	/// Blocks needed to cover the whole image.
	pub fn block_count(&self) -> usize {
		self.width.div_ceil(BLOCK_SIZE) as usize * self.height.div_ceil(BLOCK_SIZE) as usize
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockToken {
	/// Index of a codebook record.
	CodebookReference(u16),
	/// One palette index for the whole block.
	FlatFill(u8),
}

impl BlockToken {
	const FLAT_FILL_BIT: u16 = 0x8000;

	pub fn from_raw(token: u16) -> Self {
		if token & Self::FLAT_FILL_BIT == 0 {
			Self::CodebookReference(token)
		} else {
			// bits 8-14 are not part of the index
			Self::FlatFill(token as u8)
		}
	}
}

pub fn decode_vqm(
	data: &[u8], fs: &impl FileSystem, palette: &Palette,
) -> Result<Decoded, DecodeError> {
	let mut reader = Reader::new(data);
	let header = VqmHeader::parse(&mut reader)?;
	let mut diagnostics = Vec::new();

	let codebook_data = load_codebook(fs, &header.codebook);
	if codebook_data.is_none() {
		diagnostics.push(Diagnostic::MissingCodebook {
			name: header.codebook.clone(),
		});
	}
	let codebook = codebook_data.as_deref().map(Codebook::parse);

	let mut builder = TextureBuilder::new(header.width, header.height);
	let mut missing_records = BTreeSet::new();
	let mut blocks = 0;
	let (mut x, mut y) = (0, 0);

	while y < header.height {
		let Some(token) = reader.try_u16() else {
			log::warn!(
				"vqm stream ended after {blocks} of {} blocks",
				header.block_count()
			);
			diagnostics.push(Diagnostic::TruncatedStream {
				written: blocks,
				expected: header.block_count(),
			});
			break;
		};

		match BlockToken::from_raw(token) {
			BlockToken::CodebookReference(index) => {
				match codebook.as_ref().map(|codebook| codebook.record(index)) {
					Some(Some(record)) => {
						for (i, &palette_index) in record.iter().enumerate() {
							let colour = builder.resolve(palette, palette_index);
							let (sx, sy) = (i as u32 % BLOCK_SIZE, i as u32 / BLOCK_SIZE);
							builder.put(x + sx, y + sy, colour);
						}
					}
					Some(None) => {
						missing_records.insert(index);
					}
					// no codebook, nothing to draw
					None => {}
				}
			}
			BlockToken::FlatFill(palette_index) => {
				let colour = builder.resolve(palette, palette_index);
				for sy in 0..BLOCK_SIZE {
					for sx in 0..BLOCK_SIZE {
						builder.put(x + sx, y + sy, colour);
					}
				}
			}
		}
		blocks += 1;

		x += BLOCK_SIZE;
		if x >= header.width {
			x = 0;
			y += BLOCK_SIZE;
		}
	}

	if !missing_records.is_empty() {
		log::warn!(
			"{} codebook records referenced past the end of {}",
			missing_records.len(),
			header.codebook
		);
	}
	diagnostics.extend(
		missing_records
			.into_iter()
			.map(|index| Diagnostic::CodebookRecordOutOfRange { index }),
	);

	let texture = builder.finish();
	log::debug!(
		"decoded vqm {}x{} with {} ({blocks} blocks, transparent: {})",
		header.width,
		header.height,
		header.codebook,
		texture.has_transparency
	);
	Ok(Decoded {
		texture,
		diagnostics,
	})
}

fn load_codebook(fs: &impl FileSystem, name: &str) -> Option<Vec<u8>> {
	if !fs.exists(name) {
		log::warn!("CBK file not found: {name}");
		return None;
	}
	match fs.open(name) {
		Ok(data) => Some(data),
		Err(e) => {
			log::warn!("failed to read CBK file {name}: {e}");
			None
		}
	}
}
