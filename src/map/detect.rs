//! Red Alert 2 / Yuri's Revenge classification.
//!
//! Maps carry no explicit engine tag, so the variant is guessed by an ordered
//! cascade; the first rule that decides wins.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use super::types::{EngineVariant, GameObject, ObjectKind};

/// Theaters that only exist in the expansion
pub const EXPANSION_THEATERS: [&str; 3] = ["lunar", "newurban", "desert"];

/// Highest tile-art id a legacy map can use, per theater
pub const LEGACY_TILE_CEILINGS: [(&str, i16); 3] =
    [("temperate", 838), ("urban", 1077), ("snow", 798)];

/// File extension only the expansion's editor writes, matched case-sensitively
pub const EXPANSION_EXTENSION: &str = "yrm";

/// Everything the cascade looks at
#[derive(Debug, Clone)]
pub struct DetectionInput<'a, I> {
    pub required_addon: bool,
    pub theater: &'a str,
    /// Type keys of every placed non-overlay object
    pub object_names: I,
    pub max_tile_num: Option<i16>,
    pub file_name: Option<&'a Path>,
    pub legacy_allow_list: Option<&'a HashSet<String>>,
}

pub fn detect_engine<'a, I>(input: DetectionInput<'a, I>) -> EngineVariant
where
    I: IntoIterator<Item = &'a str>,
{
    if input.required_addon {
        debug!("RequiredAddon set");
        return EngineVariant::Expansion;
    }

    let theater = input.theater.to_ascii_lowercase();
    if EXPANSION_THEATERS.contains(&theater.as_str()) {
        debug!(%theater, "expansion-only theater");
        return EngineVariant::Expansion;
    }

    if !all_objects_legacy(input.object_names, input.legacy_allow_list) {
        debug!("object not in legacy allow-list");
        return EngineVariant::Expansion;
    }

    if let Some(&(_, ceiling)) = LEGACY_TILE_CEILINGS.iter().find(|(t, _)| *t == theater) {
        let max = input.max_tile_num.unwrap_or(i16::MIN);
        debug!(%theater, max, ceiling, "tile ceiling check");
        return if max > ceiling {
            EngineVariant::Expansion
        } else {
            EngineVariant::Legacy
        };
    }

    let expansion_ext = input
        .file_name
        .and_then(Path::extension)
        .is_some_and(|ext| ext == EXPANSION_EXTENSION);
    if expansion_ext {
        EngineVariant::Expansion
    } else {
        EngineVariant::Legacy
    }
}

/// Whether every name is in `allow_list`.
///
/// Without an allow-list there is nothing to compare against and every map
/// counts as legacy here; the tile and extension rules then decide.
pub fn all_objects_legacy<'a, I>(names: I, allow_list: Option<&HashSet<String>>) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    match allow_list {
        Some(list) => names.into_iter().all(|n| list.contains(n)),
        None => true,
    }
}

/// Object kinds whose type keys feed the allow-list check
pub fn checked_by_allow_list(object: &GameObject) -> bool {
    object.kind() != ObjectKind::Overlay
}
