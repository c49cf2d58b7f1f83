use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use i76_parse::data_formats::TextureInfo;
use i76_parse::vfs::{DirectoryFs, FileSystem};
use i76_parse::{LoadStatus, OutputWriter, Palette, Reader, Texture, TextureCache, TextureFormat};

/// Converts MAP and VQM textures to PNG.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	/// Directory holding the game's asset files
	#[arg(long, default_value = "assets")]
	assets: PathBuf,

	/// ACT palette used to colour the textures
	#[arg(long)]
	palette: String,

	/// Directory the PNGs are written to
	#[arg(long, default_value = "output")]
	output: PathBuf,

	/// Skip writing textures.json
	#[arg(long)]
	no_manifest: bool,

	/// Textures to convert, every .map and .vqm file if empty
	textures: Vec<String>,
}

#[derive(Serialize)]
struct ManifestEntry<'a> {
	name: &'a str,
	format: Option<TextureFormat>,
	texture: TextureInfo,
	#[serde(flatten)]
	status: &'a LoadStatus,
}

fn output_name(name: &str) -> String {
	name.replace('.', "_")
}

/// Writes one texture as PNG. Failures are logged and the run carries on with the next texture.
fn write_texture(name: &str, texture: &Texture, output: &mut OutputWriter) -> bool {
	if texture.pixels.is_empty() {
		log::warn!("skipping {name}: texture has no pixels");
		return false;
	}
	match texture.save_as(&output_name(name), output) {
		Ok(()) => true,
		Err(e) => {
			log::error!("failed to write {name}: {e}");
			false
		}
	}
}

fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();
	let start_time = Instant::now();

	let vfs = DirectoryFs::new(&args.assets)
		.with_context(|| format!("failed to read {}", args.assets.display()))?;

	let palette_data = vfs
		.open(&args.palette)
		.with_context(|| format!("failed to open palette {}", args.palette))?;
	let palette = Palette::parse_act(&mut Reader::new(&palette_data))
		.with_context(|| format!("{} is not an ACT palette", args.palette))?;

	let names: Vec<String> = if args.textures.is_empty() {
		vfs.names()
			.into_iter()
			.filter(|name| TextureFormat::from_filename(name).is_some())
			.map(str::to_owned)
			.collect()
	} else {
		args.textures.clone()
	};

	let mut output = OutputWriter::new(
		OutputWriter::get_output_path(&args.output, &args.assets),
		true,
	)
	.context("failed to create output directory")?;

	let cache = TextureCache::new(&vfs);
	let mut loads = Vec::with_capacity(names.len());
	let mut converted = 0;
	for name in &names {
		println!("  Converting {name}...");
		let load = cache.load(name, &palette);
		if let LoadStatus::Placeholder(reason) = &load.status {
			log::warn!("failed to convert {name}: {reason}");
		} else if write_texture(name, &load.texture, &mut output) {
			converted += 1;
		}
		loads.push(load);
	}

	if !args.no_manifest {
		let manifest: Vec<ManifestEntry> = names
			.iter()
			.zip(&loads)
			.map(|(name, load)| ManifestEntry {
				name,
				format: TextureFormat::from_filename(name),
				texture: load.texture.info(),
				status: &load.status,
			})
			.collect();
		output
			.write_json("textures", &manifest)
			.context("failed to write manifest")?;
	}

	println!(
		"converted {converted} of {} textures to {} in {:.2?}",
		names.len(),
		output.dir().display(),
		start_time.elapsed()
	);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_arguments() {
		let args = Args::parse_from(["i76-parse", "--palette", "t01.act", "a.map", "b"]);
		assert_eq!(args.assets, PathBuf::from("assets"));
		assert_eq!(args.palette, "t01.act");
		assert_eq!(args.textures, ["a.map", "b"]);
		assert!(!args.no_manifest);

		assert!(Args::try_parse_from(["i76-parse"]).is_err(), "palette is required");
	}

	#[test]
	fn output_names_keep_the_format() {
		assert_eq!(output_name("r2ayr_51.vqm"), "r2ayr_51_vqm");
		assert_eq!(output_name("r2ayr_51.map"), "r2ayr_51_map");
	}

	#[test]
	fn empty_textures_are_skipped() {
		let dir = tempfile::tempdir().unwrap();
		let mut output = OutputWriter::new(dir.path(), false).unwrap();
		let empty = Texture {
			width: 0,
			height: 0,
			pixels: Vec::new(),
			..Texture::placeholder()
		};

		assert!(!write_texture("empty.map", &empty, &mut output));
		assert!(!dir.path().join("empty_map.png").exists());

		assert!(write_texture("dot.map", &Texture::placeholder(), &mut output));
		assert!(dir.path().join("dot_map.png").exists());
	}

	#[test]
	fn manifest_entry_layout() {
		let status = LoadStatus::Complete;
		let entry = ManifestEntry {
			name: "a.map",
			format: Some(TextureFormat::Map),
			texture: Texture::placeholder().info(),
			status: &status,
		};
		let json = serde_json::to_value(&entry).unwrap();
		assert_eq!(json["format"], "map");
		assert_eq!(json["status"], "complete");
		assert_eq!(json["texture"]["width"], 1);
	}
}
