//! Map decoding: tile grid, overlays, objects and engine detection.

pub mod detect;
pub mod document;
pub mod grid;
pub mod objects;
pub mod overlay;
pub mod store;
pub mod title;
pub mod types;

pub use detect::{detect_engine, DetectionInput};
pub use document::{DecodeOptions, MapDocument, MapSummary, ObjectCounts};
pub use grid::{build_tile_grid, cell_to_storage, storage_to_cell, TileGrid};
pub use store::ObjectStore;
pub use title::{resolve_title, sanitize_file_name, GameMode, PktEntry, PktSource, PktTable, TitleSources};
pub use types::{EngineVariant, GameObject, ObjectId, ObjectKind, OwnedObject, Rect, Tile};
