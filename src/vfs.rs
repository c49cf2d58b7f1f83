//! Case-insensitive access to the game's asset files.
//!
//! Asset files refer to each other by bare file name (a VQM names its codebook, a mission names
//! its palette), so every lookup goes through [`normalize_name`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};

use parking_lot::RwLock;

/// Lower-cased final path component with padding stripped.
pub fn normalize_name(name: &str) -> String {
	let name = name.trim_matches(|c: char| c == '\0' || c.is_whitespace());
	let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
	name.to_ascii_lowercase()
}

pub trait FileSystem {
	fn exists(&self, name: &str) -> bool;
	/// Reads the whole file. The returned buffer is the only handle, dropping it closes the file.
	fn open(&self, name: &str) -> io::Result<Vec<u8>>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
	fn exists(&self, name: &str) -> bool {
		(**self).exists(name)
	}
	fn open(&self, name: &str) -> io::Result<Vec<u8>> {
		(**self).open(name)
	}
}
impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
	fn exists(&self, name: &str) -> bool {
		(**self).exists(name)
	}
	fn open(&self, name: &str) -> io::Result<Vec<u8>> {
		(**self).open(name)
	}
}

fn not_found(name: &str) -> io::Error {
	io::Error::new(io::ErrorKind::NotFound, format!("{name} not found"))
}

/// Every file below a directory, indexed by normalised file name.
pub struct DirectoryFs {
	files: HashMap<String, PathBuf>,
}

impl DirectoryFs {
	pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
		let root = root.as_ref();
		let mut files = HashMap::new();
		index_dir(root, &mut files)?;
		log::debug!("indexed {} files below {}", files.len(), root.display());
		Ok(Self { files })
	}

	/// All indexed names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.files.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	pub fn path_of(&self, name: &str) -> Option<&Path> {
		self.files.get(&normalize_name(name)).map(PathBuf::as_path)
	}
}

fn index_dir(dir: &Path, files: &mut HashMap<String, PathBuf>) -> io::Result<()> {
	let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
	entries.sort_by_key(|entry| entry.path());
	for entry in entries {
		let path = entry.path();
		if entry.file_type()?.is_dir() {
			index_dir(&path, files)?;
			continue;
		}
		let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
			continue;
		};
		let name = normalize_name(name);
		if let Some(existing) = files.get(&name) {
			log::debug!(
				"ignoring {} (shadowed by {})",
				path.display(),
				existing.display()
			);
		} else {
			files.insert(name, path);
		}
	}
	Ok(())
}

impl FileSystem for DirectoryFs {
	fn exists(&self, name: &str) -> bool {
		self.path_of(name).is_some()
	}
	fn open(&self, name: &str) -> io::Result<Vec<u8>> {
		let path = self.path_of(name).ok_or_else(|| not_found(name))?;
		fs::read(path)
	}
}

/// In-memory files. Files can be added or removed through a shared reference.
#[derive(Default)]
pub struct MemoryFs {
	files: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl MemoryFs {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, name: &str, data: impl Into<Arc<[u8]>>) {
		self.files.write().insert(normalize_name(name), data.into());
	}
	pub fn remove(&self, name: &str) -> bool {
		self.files.write().remove(&normalize_name(name)).is_some()
	}
	pub fn len(&self) -> usize {
		self.files.read().len()
	}
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl FileSystem for MemoryFs {
	fn exists(&self, name: &str) -> bool {
		self.files.read().contains_key(&normalize_name(name))
	}
	fn open(&self, name: &str) -> io::Result<Vec<u8>> {
		let files = self.files.read();
		let data = files.get(&normalize_name(name)).ok_or_else(|| not_found(name))?;
		Ok(data.to_vec())
	}
}
