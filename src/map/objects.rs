//! Object sections (`[Terrain]`, `[Smudge]`, `[Structures]`, ...).
//!
//! All six share one parser; a [`SectionLayout`] says which comma-separated
//! field holds what.

use std::str::FromStr;

use tracing::{debug, info};

use super::grid::TileGrid;
use super::store::ObjectStore;
use super::types::{GameObject, ObjectKind, OwnedObject};
use crate::error::{Error, Result};
use crate::ini::{IniFile, IniSection};

/// `[Terrain]` keys encode the cell as `rx + 1000 * ry`
pub const TERRAIN_POS_STRIDE: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    /// Cell packed into the entry key
    Key,
    /// Cell in two value fields
    Fields { rx: usize, ry: usize },
}

/// How the non-position fields become an object
#[derive(Debug, Clone, Copy)]
pub enum ObjectFields {
    /// Type key only
    Plain(fn(String) -> GameObject),
    /// House-owned: owner, health and facing field indices
    Owned {
        owner: usize,
        health: usize,
        direction: usize,
        make: fn(OwnedObject) -> GameObject,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct SectionLayout {
    pub section: &'static str,
    pub kind: ObjectKind,
    /// Field holding the type key
    pub name: usize,
    pub position: PositionSource,
    pub fields: ObjectFields,
}

fn terrain(name: String) -> GameObject {
    GameObject::Terrain { name }
}

fn smudge(name: String) -> GameObject {
    GameObject::Smudge { name }
}

const fn owned_layout(
    section: &'static str,
    kind: ObjectKind,
    direction: usize,
    make: fn(OwnedObject) -> GameObject,
) -> SectionLayout {
    SectionLayout {
        section,
        kind,
        name: 1,
        position: PositionSource::Fields { rx: 3, ry: 4 },
        fields: ObjectFields::Owned { owner: 0, health: 2, direction, make },
    }
}

pub const TERRAIN: SectionLayout = SectionLayout {
    section: "Terrain",
    kind: ObjectKind::Terrain,
    name: 0,
    position: PositionSource::Key,
    fields: ObjectFields::Plain(terrain),
};

pub const SMUDGE: SectionLayout = SectionLayout {
    section: "Smudge",
    kind: ObjectKind::Smudge,
    name: 0,
    position: PositionSource::Fields { rx: 1, ry: 2 },
    fields: ObjectFields::Plain(smudge),
};

pub const STRUCTURES: SectionLayout =
    owned_layout("Structures", ObjectKind::Structure, 5, GameObject::Structure);
// sub-cell and mission fields sit between position and facing
pub const INFANTRY: SectionLayout =
    owned_layout("Infantry", ObjectKind::Infantry, 7, GameObject::Infantry);
pub const UNITS: SectionLayout = owned_layout("Units", ObjectKind::Unit, 5, GameObject::Unit);
pub const AIRCRAFT: SectionLayout =
    owned_layout("Aircraft", ObjectKind::Aircraft, 5, GameObject::Aircraft);

/// Sections in the order they are placed
pub const PLACEMENT_ORDER: [SectionLayout; 6] =
    [STRUCTURES, TERRAIN, SMUDGE, INFANTRY, UNITS, AIRCRAFT];

impl SectionLayout {
    /// Smallest number of value fields an entry needs
    pub fn min_fields(&self) -> usize {
        let mut max = self.name;
        if let PositionSource::Fields { rx, ry } = self.position {
            max = max.max(rx).max(ry);
        }
        if let ObjectFields::Owned { owner, health, direction, .. } = self.fields {
            max = max.max(owner).max(health).max(direction);
        }
        max + 1
    }
}

/// One parsed entry, before placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub rx: i32,
    pub ry: i32,
    pub object: GameObject,
}

/// Parse one `key=value` line of `layout`'s section.
pub fn parse_entry(layout: &SectionLayout, key: &str, value: &str) -> Result<ParsedEntry> {
    let malformed = |reason: String| Error::malformed(layout.section, key, reason);

    let fields: Vec<&str> = match layout.position {
        PositionSource::Key => vec![value.trim()],
        PositionSource::Fields { .. } => value.split(',').map(str::trim).collect(),
    };
    if fields.len() < layout.min_fields() {
        return Err(malformed(format!(
            "{} fields, need at least {}",
            fields.len(),
            layout.min_fields()
        )));
    }

    let int_field = |idx: usize, what: &str| -> Result<i32> {
        parse_int(fields[idx])
            .ok_or_else(|| malformed(format!("{what} '{}' is not an integer", fields[idx])))
    };
    let short_field = |idx: usize, what: &str| -> Result<i16> {
        parse_int(fields[idx])
            .ok_or_else(|| malformed(format!("{what} '{}' is not a 16-bit integer", fields[idx])))
    };

    let (rx, ry) = match layout.position {
        PositionSource::Key => {
            let pos: i32 = parse_int(key.trim())
                .ok_or_else(|| malformed(format!("position '{key}' is not an integer")))?;
            (pos % TERRAIN_POS_STRIDE, pos / TERRAIN_POS_STRIDE)
        }
        PositionSource::Fields { rx, ry } => (int_field(rx, "x")?, int_field(ry, "y")?),
    };

    let name = fields[layout.name];

    let object = match layout.fields {
        ObjectFields::Plain(make) => make(name.to_string()),
        ObjectFields::Owned { owner, health, direction, make } => make(OwnedObject {
            owner: fields[owner].to_string(),
            name: name.to_string(),
            health: short_field(health, "health")?,
            direction: short_field(direction, "direction")?,
        }),
    };

    Ok(ParsedEntry { rx, ry, object })
}

fn parse_int<T: FromStr>(s: &str) -> Option<T> {
    s.parse().ok()
}

/// Place every entry of one section. An absent section places nothing.
pub fn place_section(
    ini: &IniFile,
    layout: &SectionLayout,
    grid: &mut TileGrid,
    store: &mut ObjectStore,
) -> Result<usize> {
    let Some(section) = ini.section(layout.section) else {
        debug!(section = layout.section, "section absent");
        return Ok(0);
    };
    place_entries(section, layout, grid, store)
}

fn place_entries(
    section: &IniSection,
    layout: &SectionLayout,
    grid: &mut TileGrid,
    store: &mut ObjectStore,
) -> Result<usize> {
    info!(section = layout.section, entries = section.len(), "reading objects");

    // Parse the whole section first so a bad entry leaves the grid untouched.
    let parsed = section
        .entries()
        .map(|(key, value)| parse_entry(layout, key, value))
        .collect::<Result<Vec<_>>>()?;
    for entry in &parsed {
        grid.index_of(entry.rx, entry.ry)?;
    }

    let count = parsed.len();
    for entry in parsed {
        store.place(grid, entry.rx, entry.ry, entry.object)?;
    }
    Ok(count)
}

/// Place all six object sections in [`PLACEMENT_ORDER`].
pub fn place_all(ini: &IniFile, grid: &mut TileGrid, store: &mut ObjectStore) -> Result<()> {
    for layout in &PLACEMENT_ORDER {
        place_section(ini, layout, grid, store)?;
    }
    Ok(())
}
