use std::collections::HashSet;
use std::path::{Path, PathBuf};

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde::Serialize;
use tracing::info;

use super::detect::{checked_by_allow_list, detect_engine, DetectionInput};
use super::grid::{build_tile_grid, check_map_extent, TileGrid};
use super::objects::place_all;
use super::overlay::{decode_plane, resolve_overlays};
use super::store::ObjectStore;
use super::title::{resolve_title, TitleInput, TitleSources};
use super::types::{EngineVariant, GameObject, ObjectId, ObjectKind, Rect, Tile};
use crate::codec::{Format5, PackCodec};
use crate::error::{Error, Result};
use crate::ini::IniFile;

/// Caller-controlled decode settings
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// `Unspecified` runs detection; anything else is stored as-is
    pub engine: EngineVariant,
    /// Where the map came from; its extension feeds detection and titles
    pub file_name: Option<PathBuf>,
    /// Type keys known to exist in the legacy game
    pub legacy_allow_list: Option<HashSet<String>>,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(mut self, engine: EngineVariant) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_name = Some(path.into());
        self
    }

    pub fn with_legacy_allow_list<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.legacy_allow_list = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// A fully decoded map
#[derive(Debug, Clone)]
pub struct MapDocument {
    ini: IniFile,
    file_name: Option<PathBuf>,
    full_size: Rect,
    local_size: Rect,
    theater: String,
    grid: TileGrid,
    objects: ObjectStore,
    engine: EngineVariant,
}

impl MapDocument {
    /// Read and decode a map file. The path doubles as the file-name hint
    /// unless `options` already carries one.
    pub fn open(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mut options = options.clone();
        if options.file_name.is_none() {
            options.file_name = Some(path.to_path_buf());
        }
        Self::decode(IniFile::from_bytes(&data), &options)
    }

    pub fn decode(ini: IniFile, options: &DecodeOptions) -> Result<Self> {
        Self::decode_with(ini, options, &Format5)
    }

    /// Decode with a caller-supplied pack codec.
    pub fn decode_with(ini: IniFile, options: &DecodeOptions, codec: &dyn PackCodec) -> Result<Self> {
        let map = ini.require_section("Map")?;
        let full_size = read_rect(map.require("Size")?, "Size")?;
        let local_size = read_rect(map.require("LocalSize")?, "LocalSize")?;
        let theater = map.get("Theater").unwrap_or_default().to_string();

        if full_size.width <= 0 || full_size.height <= 0 {
            return Err(Error::config(
                "Map",
                "Size",
                format!("unusable size {}x{}", full_size.width, full_size.height),
            ));
        }
        let (width, height) = (full_size.width as u32, full_size.height as u32);
        check_map_extent(width, height)?;

        let mut grid = build_tile_grid(&read_pack(&ini, "IsoMapPack5")?, width, height, codec)?;

        let ids = decode_plane(&read_pack(&ini, "OverlayPack")?, codec, "OverlayPack")?;
        let values = decode_plane(&read_pack(&ini, "OverlayDataPack")?, codec, "OverlayDataPack")?;
        let mut objects = ObjectStore::new();
        resolve_overlays(&mut grid, &mut objects, &ids, &values)?;

        place_all(&ini, &mut grid, &mut objects)?;

        let mut doc = Self {
            ini,
            file_name: options.file_name.clone(),
            full_size,
            local_size,
            theater,
            grid,
            objects,
            engine: options.engine,
        };

        if doc.engine == EngineVariant::Unspecified {
            doc.engine = doc.detect_engine(options.legacy_allow_list.as_ref());
        }
        info!(engine = %doc.engine, theater = %doc.theater, objects = doc.objects.len(), "map decoded");
        Ok(doc)
    }

    /// Run the detection cascade over this document.
    pub fn detect_engine(&self, legacy_allow_list: Option<&HashSet<String>>) -> EngineVariant {
        let names = ObjectKind::ALL
            .into_iter()
            .flat_map(|kind| self.objects.of_kind(kind))
            .filter(|o| checked_by_allow_list(o))
            .filter_map(GameObject::name);

        detect_engine(DetectionInput {
            required_addon: self.ini.read_bool("Basic", "RequiredAddon", false),
            theater: &self.theater,
            object_names: names,
            max_tile_num: self.grid.max_tile_num(),
            file_name: self.file_name.as_deref(),
            legacy_allow_list,
        })
    }

    /// Display title, looked up in the game's tables where the map is official.
    pub fn title(&self, sources: &dyn TitleSources) -> Result<String> {
        let input = TitleInput {
            official: self.ini.read_bool("Basic", "Official", false),
            multiplayer_only: self.ini.read_bool("Basic", "MultiplayerOnly", false),
            name: self.ini.read_string("Basic", "Name"),
            file_name: self.file_name.as_deref(),
            engine: self.engine,
        };
        resolve_title(&input, sources)
    }

    pub fn ini(&self) -> &IniFile {
        &self.ini
    }

    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    pub fn full_size(&self) -> Rect {
        self.full_size
    }

    pub fn local_size(&self) -> Rect {
        self.local_size
    }

    pub fn theater(&self) -> &str {
        &self.theater
    }

    pub fn engine(&self) -> EngineVariant {
        self.engine
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn tile(&self, rx: i32, ry: i32) -> Result<&Tile> {
        self.grid.tile(rx, ry)
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    /// One kind's objects in declaration order
    pub fn of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &GameObject> + '_ {
        self.objects.of_kind(kind)
    }

    /// Smudges, terrain, structures, infantry, units, then aircraft
    pub fn all_objects(&self) -> Vec<&GameObject> {
        [
            ObjectKind::Smudge,
            ObjectKind::Terrain,
            ObjectKind::Structure,
            ObjectKind::Infantry,
            ObjectKind::Unit,
            ObjectKind::Aircraft,
        ]
        .into_iter()
        .flat_map(|kind| self.objects.of_kind(kind))
        .collect()
    }

    pub fn summary(&self) -> MapSummary {
        let count = |kind: ObjectKind| self.objects.count(kind);
        MapSummary {
            name: self.ini.read_string("Basic", "Name").map(str::to_string),
            theater: self.theater.clone(),
            engine: self.engine,
            full_size: self.full_size,
            local_size: self.local_size,
            tiles: self.grid.len(),
            max_tile_num: self.grid.max_tile_num(),
            objects: ObjectCounts {
                terrain: count(ObjectKind::Terrain),
                smudge: count(ObjectKind::Smudge),
                structures: count(ObjectKind::Structure),
                infantry: count(ObjectKind::Infantry),
                units: count(ObjectKind::Unit),
                aircraft: count(ObjectKind::Aircraft),
                overlays: count(ObjectKind::Overlay),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectCounts {
    pub terrain: usize,
    pub smudge: usize,
    pub structures: usize,
    pub infantry: usize,
    pub units: usize,
    pub aircraft: usize,
    pub overlays: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub theater: String,
    pub engine: EngineVariant,
    pub full_size: Rect,
    pub local_size: Rect,
    pub tiles: usize,
    pub max_tile_num: Option<i16>,
    pub objects: ObjectCounts,
}

fn read_rect(value: &str, key: &str) -> Result<Rect> {
    value
        .parse()
        .map_err(|e: Error| Error::config("Map", key, e.to_string()))
}

/// Base64 of a pack section's values, concatenated in declaration order
fn read_pack(ini: &IniFile, section: &str) -> Result<Vec<u8>> {
    let encoded = ini.require_section(section)?.concatenated_values();
    BASE64_STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| Error::CorruptStream(format!("[{section}] base64: {e}")))
}
