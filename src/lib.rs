pub mod cache;
pub mod data_formats;
pub mod file_formats;
pub mod level;
pub mod output_writer;
pub mod reader;
pub mod vfs;

pub use cache::{LoadStatus, TextureCache, TextureLoad};
pub use data_formats::{Palette, Texture};
pub use file_formats::{DecodeError, Decoded, Diagnostic, TextureFormat};
pub use output_writer::OutputWriter;
pub use reader::Reader;
