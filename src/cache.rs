//! Decoded textures, memoised by normalised file name for as long as the cache lives.
//!
//! Each name gets a slot whose lock is held while the texture is decoded, so concurrent requests
//! for the same texture run a single decode and all receive the same [`Arc`]. Files that are
//! missing or cannot be decoded are answered with a placeholder and never stored, so they are
//! looked up again next time.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::data_formats::{Palette, Texture};
use crate::file_formats::{DecodeError, Decoded, Diagnostic, TextureFormat};
use crate::vfs::{FileSystem, normalize_name};

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "status", content = "diagnostics", rename_all = "snake_case")]
pub enum LoadStatus {
	Complete,
	/// Decoded, but parts of the image could not be filled in.
	Degraded(Vec<Diagnostic>),
	/// Nothing could be decoded, the texture is the placeholder.
	Placeholder(Diagnostic),
}

#[derive(Clone, Debug)]
pub struct TextureLoad {
	pub texture: Arc<Texture>,
	pub status: LoadStatus,
}

impl TextureLoad {
	pub fn is_placeholder(&self) -> bool {
		matches!(self.status, LoadStatus::Placeholder(_))
	}

	pub fn diagnostics(&self) -> &[Diagnostic] {
		match &self.status {
			LoadStatus::Complete => &[],
			LoadStatus::Degraded(diagnostics) => diagnostics,
			LoadStatus::Placeholder(diagnostic) => std::slice::from_ref(diagnostic),
		}
	}
}

type Slot = Arc<Mutex<Option<TextureLoad>>>;

pub struct TextureCache<F> {
	fs: F,
	entries: Mutex<HashMap<String, Slot>>,
	placeholder: Arc<Texture>,
}

impl<F: FileSystem> TextureCache<F> {
	pub fn new(fs: F) -> Self {
		Self {
			fs,
			entries: Mutex::default(),
			placeholder: Arc::new(Texture::placeholder()),
		}
	}

	pub fn fs(&self) -> &F {
		&self.fs
	}

	/// Number of decoded textures.
	pub fn len(&self) -> usize {
		let slots: Vec<Slot> = self.entries.lock().values().cloned().collect();
		slots.iter().filter(|slot| slot.lock().is_some()).count()
	}
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn contains(&self, name: &str) -> bool {
		self.cached(&normalize_name(name)).is_some()
	}

	pub fn get(&self, name: &str) -> Option<Arc<Texture>> {
		self.cached(&normalize_name(name)).map(|load| load.texture)
	}

	pub fn placeholder(&self) -> &Arc<Texture> {
		&self.placeholder
	}

	fn cached(&self, key: &str) -> Option<TextureLoad> {
		let slot = self.entries.lock().get(key).cloned()?;
		slot.lock().clone()
	}

	/// Loads a texture by file name. Names without a `.map` or `.vqm` extension are tried as
	/// `<name>.vqm` first, then `<name>.map`.
	pub fn load(&self, name: &str, palette: &Palette) -> TextureLoad {
		if let Some(format) = TextureFormat::from_filename(name) {
			return self.get_or_decode(name, format, palette);
		}
		for format in [TextureFormat::Vqm, TextureFormat::Map] {
			let full_name = format!("{name}.{}", format.extension());
			if self.contains(&full_name) || self.fs.exists(&full_name) {
				return self.get_or_decode(&full_name, format, palette);
			}
		}
		self.missing(&normalize_name(name))
	}

	pub fn get_or_decode(&self, name: &str, format: TextureFormat, palette: &Palette) -> TextureLoad {
		self.get_or_decode_with(name, palette, |data, fs, palette| {
			format.decode(data, fs, palette)
		})
	}

	/// Returns the cached texture for `name`, or reads the file and runs `decode` on it.
	pub fn get_or_decode_with(
		&self, name: &str, palette: &Palette,
		decode: impl FnOnce(&[u8], &F, &Palette) -> Result<Decoded, DecodeError>,
	) -> TextureLoad {
		let key = normalize_name(name);
		if let Some(load) = self.cached(&key) {
			log::trace!("texture cache hit: {key}");
			return load;
		}

		if !self.fs.exists(&key) {
			return self.missing(&key);
		}

		let slot = Slot::clone(self.entries.lock().entry(key.clone()).or_default());
		let mut stored = slot.lock();
		// another caller may have decoded it while this one waited for the slot
		if let Some(load) = stored.as_ref() {
			return load.clone();
		}

		let decoded = match self.read_and_decode(&key, palette, decode) {
			Ok(decoded) => decoded,
			Err(load) => {
				self.forget(&key, &slot);
				return load;
			}
		};

		log::debug!(
			"decoded {key} ({} diagnostics)",
			decoded.diagnostics.len()
		);
		let status = if decoded.diagnostics.is_empty() {
			LoadStatus::Complete
		} else {
			LoadStatus::Degraded(decoded.diagnostics)
		};
		let load = TextureLoad {
			texture: Arc::new(decoded.texture),
			status,
		};
		*stored = Some(load.clone());
		// a failed load this caller waited behind may have dropped the slot from the map
		self.entries
			.lock()
			.entry(key)
			.or_insert_with(|| Slot::clone(&slot));
		load
	}

	fn read_and_decode(
		&self, key: &str, palette: &Palette,
		decode: impl FnOnce(&[u8], &F, &Palette) -> Result<Decoded, DecodeError>,
	) -> Result<Decoded, TextureLoad> {
		let data = self.fs.open(key).map_err(|e| {
			log::warn!("failed to read texture {key}: {e}");
			self.missing(key)
		})?;
		decode(&data, &self.fs, palette).map_err(|e| {
			log::warn!("failed to decode texture {key}: {e}");
			self.placeholder_load(Diagnostic::MalformedHeader {
				name: key.to_owned(),
				reason: e.to_string(),
			})
		})
	}

	/// Drops an empty slot so failed names do not stay in the map.
	fn forget(&self, key: &str, slot: &Slot) {
		let mut entries = self.entries.lock();
		if entries.get(key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
			entries.remove(key);
		}
	}

	fn missing(&self, key: &str) -> TextureLoad {
		log::warn!("texture not found: {key}");
		self.placeholder_load(Diagnostic::MissingAsset {
			name: key.to_owned(),
		})
	}

	fn placeholder_load(&self, diagnostic: Diagnostic) -> TextureLoad {
		TextureLoad {
			texture: Arc::clone(&self.placeholder),
			status: LoadStatus::Placeholder(diagnostic),
		}
	}
}
