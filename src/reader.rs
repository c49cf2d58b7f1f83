use std::io;

/// Little-endian cursor over an in-memory asset file.
#[derive(Clone)]
pub struct Reader<'buf> {
	reader: io::Cursor<&'buf [u8]>,
}

pub trait Readable: Sized {
	type Buffer: AsMut<[u8]> + Default;
	fn convert_little(buf: Self::Buffer) -> Self;
}

impl<'buf> Reader<'buf> {
	pub fn new(buf: &'buf [u8]) -> Reader<'buf> {
		Reader {
			reader: io::Cursor::new(buf),
		}
	}

	pub fn buf(&self) -> &'buf [u8] {
		self.reader.get_ref()
	}
	pub fn remaining_buf(&self) -> &'buf [u8] {
		&self.buf()[self.position().min(self.len())..]
	}

	pub fn len(&self) -> usize {
		self.buf().len()
	}
	pub fn remaining_len(&self) -> usize {
		self.len().saturating_sub(self.position())
	}
	pub fn is_empty(&self) -> bool {
		self.remaining_len() == 0
	}

	pub fn position(&self) -> usize {
		self.reader.position() as usize
	}
	pub fn set_position(&mut self, pos: usize) {
		self.reader.set_position(pos as u64)
	}

	pub fn try_get<T: Readable>(&mut self) -> Option<T> {
		let mut buffer = T::Buffer::default();
		let bytes = buffer.as_mut();
		bytes.copy_from_slice(self.try_slice(bytes.len())?);
		Some(T::convert_little(buffer))
	}

	#[must_use]
	pub fn try_skip(&mut self, len: usize) -> Option<()> {
		let end_pos = self.position().checked_add(len)?;
		if end_pos <= self.len() {
			self.set_position(end_pos);
			Some(())
		} else {
			None
		}
	}

	pub fn try_slice(&mut self, size: usize) -> Option<&'buf [u8]> {
		let pos = self.position();
		self.try_skip(size)?;
		Some(&self.buf()[pos..pos + size])
	}
	pub fn remaining_slice(&mut self) -> &'buf [u8] {
		let rest = self.remaining_buf();
		self.set_position(self.len());
		rest
	}

	/// Reads a fixed-size name field, cut at the first NUL or space.
	/// Anything after the terminator is padding and ignored.
	pub fn try_cstr(&mut self, size: usize) -> Option<&'buf str> {
		let buf = self.try_slice(size)?;
		let end = buf
			.iter()
			.position(|&c| c == 0 || c == b' ')
			.unwrap_or(buf.len());
		let buf = &buf[..end];
		if !buf.iter().all(|&c| matches!(c, b'!'..=b'~')) {
			return None;
		}
		std::str::from_utf8(buf).ok()
	}

	pub fn try_u8(&mut self) -> Option<u8> {
		self.try_get()
	}
	pub fn try_u16(&mut self) -> Option<u16> {
		self.try_get()
	}
	pub fn try_i32(&mut self) -> Option<i32> {
		self.try_get()
	}
}

macro_rules! make_readable {
	($name:ident, $size:expr) => {
		impl Readable for $name {
			type Buffer = [u8; $size];
			fn convert_little(bytes: Self::Buffer) -> Self {
				$name::from_le_bytes(bytes)
			}
		}
	};
}

make_readable!(u8, 1);
make_readable!(u16, 2);
make_readable!(i32, 4);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_little_endian() {
		let data = [0x34u8, 0x12, 0xFE, 0xFF, 0xFF, 0xFF, 0x07];
		let mut reader = Reader::new(&data);
		assert_eq!(reader.try_u16(), Some(0x1234));
		assert_eq!(reader.try_i32(), Some(-2));
		assert_eq!(reader.remaining_len(), 1);
		assert_eq!(reader.try_u16(), None, "short read should fail");
		assert_eq!(reader.try_u8(), Some(7));
		assert!(reader.is_empty());
	}

	#[test]
	fn cstr_stops_at_terminator() {
		let mut reader = Reader::new(b"TEX.CBK\0\x7f\x01ab");
		assert_eq!(reader.try_cstr(12), Some("TEX.CBK"));
		assert!(reader.is_empty());

		let mut reader = Reader::new(b"A.CBK       ");
		assert_eq!(reader.try_cstr(12), Some("A.CBK"));

		let mut reader = Reader::new(b"BAD\x01NAME\0\0\0\0");
		assert_eq!(reader.try_cstr(12), None);

		let mut reader = Reader::new(b"SHORT");
		assert_eq!(reader.try_cstr(12), None);
	}
}
