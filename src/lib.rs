//! Red Alert 2 / Yuri's Revenge map decoding
//!
//! Reads the INI-style map format: the compressed isometric tile pack, the
//! overlay planes and the object sections, and works out which engine a map
//! was made for.

pub mod codec;
pub mod error;
pub mod ini;
pub mod map;

pub use error::{Error, Result};
pub use codec::{Format5, PackCodec};
pub use ini::{IniFile, IniSection};
pub use map::{
    DecodeOptions, MapDocument, MapSummary,
    EngineVariant, GameObject, ObjectId, ObjectKind, OwnedObject, Rect, Tile, TileGrid,
    GameMode, PktEntry, PktSource, PktTable, TitleSources,
};
