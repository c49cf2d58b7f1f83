//! The textures and palette colours a level needs before its terrain and roads can be built.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::cache::TextureCache;
use crate::data_formats::{FilterMode, Palette, Rgba, Texture};
use crate::file_formats::{Diagnostic, TextureFormat};
use crate::vfs::FileSystem;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoadSegmentType {
	PavedHighway,
	DirtTrack,
	RiverBed,
	FourLaneHighway,
}

impl RoadSegmentType {
	pub fn texture_name(self) -> &'static str {
		match self {
			Self::PavedHighway | Self::FourLaneHighway => "r2ayr_51",
			Self::DirtTrack => "r2dnr_37",
			Self::RiverBed => "r2wnr_39",
		}
	}
}

/// Scene colours taken from fixed palette slots.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneColours {
	pub light: Rgba,
	pub background: Rgba,
	pub fog: Rgba,
	pub ambient: Rgba,
}

impl SceneColours {
	pub fn from_palette(palette: &Palette) -> Self {
		let colour = |index| palette.lookup(index).unwrap_or([0, 0, 0, 255]);
		Self {
			light: colour(176),
			background: colour(239),
			fog: colour(239),
			ambient: colour(247),
		}
	}
}

pub struct LevelTextures {
	pub surface: Arc<Texture>,
	/// The terrain surface is sampled without filtering.
	pub surface_filter: FilterMode,
	/// World units covered by one repeat of the surface texture.
	pub surface_tile_size: [f32; 2],
	/// Handed on to the sky renderer, which loads it itself.
	pub sky_texture: String,
	pub roads: HashMap<RoadSegmentType, Arc<Texture>>,
	pub colours: SceneColours,
	pub diagnostics: Vec<Diagnostic>,
}

impl LevelTextures {
	pub fn load<F: FileSystem>(
		cache: &TextureCache<F>, palette: &Palette, surface_name: &str, sky_name: &str,
		roads: impl IntoIterator<Item = RoadSegmentType>,
	) -> Self {
		let mut diagnostics = Vec::new();

		let surface = cache.get_or_decode(surface_name, TextureFormat::Map, palette);
		diagnostics.extend_from_slice(surface.diagnostics());
		let surface_tile_size = [
			surface.texture.width as f32 / 10.0,
			surface.texture.height as f32 / 10.0,
		];

		// several segment types share a texture, report its problems once
		let mut by_name: HashMap<&str, Arc<Texture>> = HashMap::new();
		let mut road_textures = HashMap::new();
		for segment in roads {
			let name = segment.texture_name();
			let texture = by_name.entry(name).or_insert_with(|| {
				let road = cache.load(name, palette);
				diagnostics.extend_from_slice(road.diagnostics());
				road.texture
			});
			road_textures.insert(segment, Arc::clone(texture));
		}

		Self {
			surface: surface.texture,
			surface_filter: FilterMode::Point,
			surface_tile_size,
			sky_texture: sky_name.to_ascii_lowercase(),
			roads: road_textures,
			colours: SceneColours::from_palette(palette),
			diagnostics,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::file_formats::test_data::{cbk_file, colour, gradient_palette, map_file, vqm_file};
	use crate::vfs::MemoryFs;

	#[test]
	fn road_texture_names() {
		assert_eq!(RoadSegmentType::PavedHighway.texture_name(), "r2ayr_51");
		assert_eq!(RoadSegmentType::FourLaneHighway.texture_name(), "r2ayr_51");
		assert_eq!(RoadSegmentType::DirtTrack.texture_name(), "r2dnr_37");
		assert_eq!(RoadSegmentType::RiverBed.texture_name(), "r2wnr_39");
	}

	#[test]
	fn loads_level_textures() {
		let palette = gradient_palette();
		let fs = MemoryFs::new();
		fs.insert("t01.map", map_file(20, 10, &[4; 200]));
		fs.insert("r2ayr_51.vqm", vqm_file(4, 4, "r2.cbk", &[0x8011]));
		fs.insert("r2dnr_37.map", map_file(1, 1, &[12]));
		let cache = TextureCache::new(fs);

		let level = LevelTextures::load(
			&cache,
			&palette,
			"T01.MAP",
			"SKY01.MAP",
			[
				RoadSegmentType::PavedHighway,
				RoadSegmentType::FourLaneHighway,
				RoadSegmentType::DirtTrack,
				RoadSegmentType::RiverBed,
			],
		);

		assert_eq!(level.surface.pixel(0, 0), Some(colour(4)));
		assert_eq!(level.surface_filter, FilterMode::Point);
		assert_eq!(level.surface_tile_size, [2.0, 1.0]);
		assert_eq!(level.sky_texture, "sky01.map");

		let paved = &level.roads[&RoadSegmentType::PavedHighway];
		assert!(Arc::ptr_eq(
			paved,
			&level.roads[&RoadSegmentType::FourLaneHighway]
		));
		assert_eq!(paved.pixel(0, 0), Some(colour(0x11)));
		assert_eq!(
			level.roads[&RoadSegmentType::DirtTrack].pixel(0, 0),
			Some(colour(12))
		);
		assert!(Arc::ptr_eq(
			&level.roads[&RoadSegmentType::RiverBed],
			cache.placeholder()
		));

		// the vqm has no codebook and the river bed texture is missing
		assert_eq!(
			level.diagnostics,
			[
				Diagnostic::MissingCodebook {
					name: "r2.cbk".into()
				},
				Diagnostic::MissingAsset {
					name: "r2wnr_39".into()
				},
			]
		);
		assert_eq!(level.colours.light, colour(176));
		assert_eq!(level.colours.fog, colour(239));
		assert_eq!(level.colours.ambient, colour(247));

		// the cached codebook-less texture is reused on a second level load
		cache.fs().insert("r2.cbk", cbk_file(&[]));
		let again = LevelTextures::load(&cache, &palette, "t01.map", "sky", [
			RoadSegmentType::PavedHighway,
		]);
		assert!(Arc::ptr_eq(&again.surface, &level.surface));
		assert!(Arc::ptr_eq(
			&again.roads[&RoadSegmentType::PavedHighway],
			paved
		));
	}
}
