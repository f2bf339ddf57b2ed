//! Human-readable map titles.
//!
//! The tables involved (mission list, multiplayer `.pkt` metadata, the string
//! table) live in game archives this crate does not read; callers hand them in
//! through [`TitleSources`].

use std::path::Path;

use bitflags::bitflags;
use indexmap::IndexMap;
use tracing::debug;

use super::types::EngineVariant;
use crate::error::{Error, Result};

bitflags! {
    /// Game modes a multiplayer map supports
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GameMode: u32 {
        const STANDARD = 1;
        const MEATGRIND = 1 << 1;
        const NAVAL_WAR = 1 << 2;
        const NUKE_WAR = 1 << 3;
        const AIR_WAR = 1 << 4;
        const MEGAWEALTH = 1 << 5;
        const DUEL = 1 << 6;
        const COOPERATIVE = 1 << 7;
    }
}

impl GameMode {
    /// Parse the comma-separated mode list of a `.pkt` entry
    /// (`standard,megawealth`). Unknown names are skipped.
    pub fn from_pkt_list(list: &str) -> Self {
        list.split(',')
            .map(|s| s.trim().to_ascii_lowercase())
            .fold(Self::empty(), |acc, name| {
                acc | match name.as_str() {
                    "standard" => Self::STANDARD,
                    "meatgrind" => Self::MEATGRIND,
                    "navalwar" => Self::NAVAL_WAR,
                    "nukewar" => Self::NUKE_WAR,
                    "airwar" => Self::AIR_WAR,
                    "megawealth" => Self::MEGAWEALTH,
                    "duel" => Self::DUEL,
                    "cooperative" => Self::COOPERATIVE,
                    _ => Self::empty(),
                }
            })
    }
}

/// One map entry of a `.pkt` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PktEntry {
    /// String-table label
    pub description: String,
    pub game_modes: GameMode,
}

pub type PktTable = IndexMap<String, PktEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PktSource<'a> {
    /// `missions.pkt`
    Legacy,
    /// `missionsmd.pkt`
    Expansion,
    /// Table packed inside a `.mmx` / `.yro` container
    Embedded(&'a Path),
}

impl PktSource<'_> {
    fn describe(&self) -> String {
        match self {
            Self::Legacy => "missions.pkt".into(),
            Self::Expansion => "missionsmd.pkt".into(),
            Self::Embedded(path) => format!("{}.pkt", file_stem(Some(path))),
        }
    }
}

/// Lookups title resolution needs from the game's data files.
pub trait TitleSources {
    /// UI-name label of a campaign map (`mission.ini` / `missionmd.ini`),
    /// keyed by the map's file name.
    fn mission_label(&self, engine: EngineVariant, map_file: &str) -> Option<String>;

    fn pkt_table(&self, source: PktSource<'_>) -> Option<&PktTable>;

    /// String-table text (`ra2.csf` / `ra2md.csf`) for a lowercase label
    fn string(&self, engine: EngineVariant, label: &str) -> Option<String>;
}

/// Map-side facts title resolution reads
#[derive(Debug, Clone, Copy)]
pub struct TitleInput<'a> {
    pub official: bool,
    pub multiplayer_only: bool,
    /// `Basic.Name`
    pub name: Option<&'a str>,
    pub file_name: Option<&'a Path>,
    pub engine: EngineVariant,
}

pub fn resolve_title(input: &TitleInput<'_>, sources: &dyn TitleSources) -> Result<String> {
    let stem = file_stem(input.file_name);
    if !input.official {
        return Ok(input.name.map_or_else(|| stem.clone(), str::to_string));
    }

    let file = input
        .file_name
        .and_then(Path::file_name)
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = input
        .file_name
        .and_then(Path::extension)
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut expansion = input.engine.is_expansion();
    let mut modes = None;

    let label = if !input.multiplayer_only {
        let table = if expansion { "missionmd.ini" } else { "mission.ini" };
        sources
            .mission_label(input.engine, &file)
            .ok_or_else(|| Error::config(table, &file, "no mission entry"))?
    } else {
        let custom = matches!(ext.as_str(), "mmx" | "yro");
        let mut source = match (custom, input.file_name) {
            (true, Some(path)) => {
                expansion |= ext == "yro";
                PktSource::Embedded(path)
            }
            _ if expansion => PktSource::Expansion,
            _ => PktSource::Legacy,
        };
        let mut table = sources
            .pkt_table(source)
            .ok_or_else(|| Error::config(&source.describe(), "*", "table unavailable"))?;

        let first_entry = if custom {
            table.keys().next().cloned()
        } else {
            None
        };

        // Multiplayer .map files without expansion objects may still be
        // listed only in the expansion table.
        if !custom && !expansion && ext == "map" && !table.contains_key(&stem) {
            if let Some(yr) = sources.pkt_table(PktSource::Expansion) {
                if yr.contains_key(&stem) {
                    debug!(%stem, "found in expansion pkt table");
                    expansion = true;
                    source = PktSource::Expansion;
                    table = yr;
                }
            }
        }

        let entry_name = first_entry.unwrap_or_else(|| stem.clone());
        let entry = table
            .get(&entry_name)
            .ok_or_else(|| Error::config(&source.describe(), &entry_name, "no map entry"))?;
        modes = Some(entry.game_modes);
        entry.description.clone()
    };

    let mut title = String::new();
    if !label.is_empty() {
        let label = label.to_ascii_lowercase();
        let engine = if expansion {
            EngineVariant::Expansion
        } else {
            EngineVariant::Legacy
        };
        let csf = if expansion { "ra2md.csf" } else { "ra2.csf" };
        title = sources
            .string(engine, &label)
            .ok_or_else(|| Error::config(csf, &label, "no string entry"))?;
        if let Some(cut) = title.find(" (") {
            title.truncate(cut);
        }
        if let Some(modes) = modes {
            append_mode_suffixes(&mut title, modes);
        }
    }

    let title = sanitize_file_name(&title);
    debug!(%title, "map title");
    Ok(title)
}

fn append_mode_suffixes(title: &mut String, modes: GameMode) {
    if modes.contains(GameMode::STANDARD) {
        return;
    }
    if modes.contains(GameMode::MEGAWEALTH) {
        title.push_str(" (Megawealth)");
    }
    if modes.contains(GameMode::DUEL) {
        title.push_str(" (Land Rush)");
    }
    if modes.contains(GameMode::NAVAL_WAR) {
        title.push_str(" (Naval War)");
    }
}

fn is_invalid_file_char(c: char) -> bool {
    c.is_ascii_control() || matches!(c, '"' | '<' | '>' | '|' | ':' | '*' | '?' | '\\' | '/')
}

/// Collapse every run of characters that cannot appear in a file name to `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if is_invalid_file_char(c) {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

fn file_stem(path: Option<&Path>) -> String {
    path.and_then(Path::file_stem)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
