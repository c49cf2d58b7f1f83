use crate::Reader;

pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Palette index that marks a transparent pixel instead of a colour.
pub const TRANSPARENT_INDEX: u8 = 0xFF;

/// 256 colour slots, the last of which is never used as a colour.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette {
	colours: [[u8; 3]; 256],
}

impl Palette {
	/// Builds a palette from up to 256 colours, unset slots are black.
	pub fn from_rgb(colours: &[[u8; 3]]) -> Self {
		let mut result = Self {
			colours: [[0; 3]; 256],
		};
		for (slot, colour) in result.colours.iter_mut().zip(colours) {
			*slot = *colour;
		}
		result
	}

	/// ACT palettes are 256 packed RGB triples. Some writers drop the unused last entry or
	/// append a small footer, both are accepted.
	pub fn parse_act(reader: &mut Reader) -> Option<Self> {
		const USABLE_BYTES: usize = 255 * 3;
		if reader.remaining_len() < USABLE_BYTES {
			return None;
		}
		let data = reader.try_slice(reader.remaining_len().min(256 * 3))?;
		let colours: Vec<[u8; 3]> = data
			.chunks_exact(3)
			.map(|rgb| [rgb[0], rgb[1], rgb[2]])
			.collect();
		// anything past the colours is footer
		reader.set_position(reader.len());
		Some(Self::from_rgb(&colours))
	}

	/// Opaque colour for `index`, or `None` for the transparency sentinel.
	pub fn lookup(&self, index: u8) -> Option<Rgba> {
		if index == TRANSPARENT_INDEX {
			return None;
		}
		let [r, g, b] = self.colours[index as usize];
		Some([r, g, b, 255])
	}
}

impl std::fmt::Debug for Palette {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Palette")
			.field("first", &self.colours[0])
			.field("last_usable", &self.colours[254])
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sentinel_is_never_a_colour() {
		let palette = Palette::from_rgb(&[[0xAB; 3]; 256]);
		assert_eq!(palette.lookup(0), Some([0xAB, 0xAB, 0xAB, 255]));
		assert_eq!(palette.lookup(254), Some([0xAB, 0xAB, 0xAB, 255]));
		assert_eq!(palette.lookup(TRANSPARENT_INDEX), None);
	}

	#[test]
	fn parses_act() {
		let data: Vec<u8> = (0..=255u8).flat_map(|i| [i, i / 2, 255 - i]).collect();
		let palette = Palette::parse_act(&mut Reader::new(&data)).unwrap();
		assert_eq!(palette.lookup(0), Some([0, 0, 255, 255]));
		assert_eq!(palette.lookup(10), Some([10, 5, 245, 255]));

		// trailing footer ignored, and a file without the unused last slot is fine
		let mut with_footer = data.clone();
		with_footer.extend_from_slice(&[0x01, 0x00, 0xFF, 0xFF]);
		assert_eq!(
			Palette::parse_act(&mut Reader::new(&with_footer)),
			Some(palette.clone())
		);
		let short = Palette::parse_act(&mut Reader::new(&data[..255 * 3])).unwrap();
		assert_eq!(short.lookup(254), palette.lookup(254));

		assert_eq!(Palette::parse_act(&mut Reader::new(&data[..300])), None);
	}
}
