/// A codebook of 4x4 palette index patches shared by VQM textures.
pub struct Codebook<'a> {
	records: &'a [u8],
}

impl<'a> Codebook<'a> {
	const HEADER_LEN: usize = 4;
	pub const RECORD_LEN: usize = 16;

	pub fn parse(data: &'a [u8]) -> Self {
		let records = data.get(Self::HEADER_LEN..).unwrap_or_default();
		Self { records }
	}

	pub fn len(&self) -> usize {
		self.records.len() / Self::RECORD_LEN
	}
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Row-major 4x4 palette indices of record `index`.
	pub fn record(&self, index: u16) -> Option<&'a [u8; 16]> {
		let start = index as usize * Self::RECORD_LEN;
		self.records
			.get(start..start + Self::RECORD_LEN)?
			.try_into()
			.ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::file_formats::test_data::cbk_file;

	#[test]
	fn records_follow_the_header() {
		let mut second = [0u8; 16];
		second[15] = 0xFF;
		let data = cbk_file(&[[1; 16], second]);
		let codebook = Codebook::parse(&data);

		assert_eq!(codebook.len(), 2);
		assert_eq!(codebook.record(0), Some(&[1; 16]));
		assert_eq!(codebook.record(1), Some(&second));
		assert_eq!(codebook.record(2), None);
	}

	#[test]
	fn partial_records_are_unusable() {
		let mut data = cbk_file(&[[3; 16]]);
		data.extend_from_slice(&[4; 10]);
		let codebook = Codebook::parse(&data);
		assert_eq!(codebook.len(), 1);
		assert_eq!(codebook.record(1), None);

		assert!(Codebook::parse(&[0u8, 0]).is_empty());
	}
}
