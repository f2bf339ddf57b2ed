use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// Index of an object in the document's object arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// One map cell.
///
/// `rx`/`ry` are the cell coordinates used by the map's text sections;
/// `dx`/`dy` are the diamond storage coordinates (the grid row is `dy / 2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub dx: u16,
    pub dy: u16,
    pub rx: u16,
    pub ry: u16,
    pub tile_num: i16,
    pub subtile: u8,
    pub z: u8,
    objects: Vec<ObjectId>,
}

impl Tile {
    pub fn new(dx: u16, dy: u16, rx: u16, ry: u16, tile_num: i16, subtile: u8, z: u8) -> Self {
        Self {
            dx,
            dy,
            rx,
            ry,
            tile_num,
            subtile,
            z,
            objects: Vec::new(),
        }
    }

    /// Attached objects in attachment order
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    pub(crate) fn add_object(&mut self, id: ObjectId) {
        self.objects.push(id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Terrain,
    Smudge,
    Structure,
    Infantry,
    Unit,
    Aircraft,
    Overlay,
}

impl ObjectKind {
    pub const COUNT: usize = 7;

    pub const ALL: [ObjectKind; Self::COUNT] = [
        Self::Terrain,
        Self::Smudge,
        Self::Structure,
        Self::Infantry,
        Self::Unit,
        Self::Aircraft,
        Self::Overlay,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn is_owned(self) -> bool {
        matches!(
            self,
            Self::Structure | Self::Infantry | Self::Unit | Self::Aircraft
        )
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Terrain => "terrain",
            Self::Smudge => "smudge",
            Self::Structure => "structure",
            Self::Infantry => "infantry",
            Self::Unit => "unit",
            Self::Aircraft => "aircraft",
            Self::Overlay => "overlay",
        };
        f.pad(name)
    }
}

/// Fields shared by the house-owned object kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedObject {
    pub owner: String,
    pub name: String,
    /// Health, 0..=256 in stock maps
    pub health: i16,
    pub direction: i16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameObject {
    Terrain { name: String },
    Smudge { name: String },
    Structure(OwnedObject),
    Infantry(OwnedObject),
    Unit(OwnedObject),
    Aircraft(OwnedObject),
    Overlay { id: u8, value: u8 },
}

impl GameObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Terrain { .. } => ObjectKind::Terrain,
            Self::Smudge { .. } => ObjectKind::Smudge,
            Self::Structure(_) => ObjectKind::Structure,
            Self::Infantry(_) => ObjectKind::Infantry,
            Self::Unit(_) => ObjectKind::Unit,
            Self::Aircraft(_) => ObjectKind::Aircraft,
            Self::Overlay { .. } => ObjectKind::Overlay,
        }
    }

    /// Type key (e.g. `GAPOWR`); overlays have none
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Terrain { name } | Self::Smudge { name } => Some(name),
            Self::Structure(o) | Self::Infantry(o) | Self::Unit(o) | Self::Aircraft(o) => {
                Some(&o.name)
            }
            Self::Overlay { .. } => None,
        }
    }

    pub fn owned(&self) -> Option<&OwnedObject> {
        match self {
            Self::Structure(o) | Self::Infantry(o) | Self::Unit(o) | Self::Aircraft(o) => Some(o),
            _ => None,
        }
    }
}

/// `left,top,width,height` as written in `[Map]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FromStr for Rect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(Error::CorruptStream(format!(
                "expected 4 comma-separated values, got {}",
                parts.len()
            )));
        }
        let mut values = [0i32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| Error::CorruptStream(format!("'{part}' is not an integer")))?;
        }
        Ok(Self {
            x: values[0],
            y: values[1],
            width: values[2],
            height: values[3],
        })
    }
}

/// Game engine a map was made for.
///
/// `Legacy` is Red Alert 2, `Expansion` is Yuri's Revenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineVariant {
    /// Not known yet; as an option it means "detect"
    #[default]
    Unspecified,
    Legacy,
    Expansion,
}

impl EngineVariant {
    pub fn is_expansion(self) -> bool {
        self == Self::Expansion
    }
}

impl fmt::Display for EngineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unspecified => "unspecified",
            Self::Legacy => "legacy",
            Self::Expansion => "expansion",
        };
        f.pad(name)
    }
}
