//! Diamond tile grid and the cell ↔ storage coordinate transform.
//!
//! A map declared `width` cells wide is stored as `2 * width - 1` columns by
//! `height` rows. Cell `(rx, ry)` lands at column `dx = rx - ry + width - 1`
//! and row `dy / 2` where `dy = rx + ry - width - 1`. `dx` and `dy` always
//! share parity, so every storage slot holds exactly one cell.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, info};

use super::overlay::OVERLAY_PLANE_STRIDE;
use super::types::Tile;
use crate::codec::PackCodec;
use crate::error::{Error, Result};

/// Bytes per IsoMapPack5 record
pub const CELL_RECORD_SIZE: usize = 11;
/// Trailing end-of-pack marker the destination buffer leaves room for
pub const PACK_END_MARKER_SIZE: usize = 4;

/// `(rx, ry)` → `(dx, dy)`
pub fn cell_to_storage(rx: i32, ry: i32, width: i32) -> (i32, i32) {
    (rx - ry + width - 1, rx + ry - width - 1)
}

/// `(dx, dy)` → `(rx, ry)`; exact inverse of [`cell_to_storage`]
pub fn storage_to_cell(dx: i32, dy: i32, width: i32) -> (i32, i32) {
    ((dx + dy + 2) / 2, (dy - dx) / 2 + width)
}

/// One decompressed IsoMapPack5 record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRecord {
    pub rx: u16,
    pub ry: u16,
    pub tile_num: i16,
    pub subtile: u8,
    pub z: u8,
}

impl CellRecord {
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let rx = reader.read_u16::<LittleEndian>()?;
        let ry = reader.read_u16::<LittleEndian>()?;
        let tile_num = reader.read_i16::<LittleEndian>()?;
        reader.read_i16::<LittleEndian>()?;
        let subtile = reader.read_u8()?;
        let z = reader.read_u8()?;
        reader.read_u8()?;
        Ok(Self { rx, ry, tile_num, subtile, z })
    }
}

/// Flat row-major tile storage
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Declared width in cells
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Storage columns, `2 * width - 1`
    pub fn columns(&self) -> usize {
        storage_columns(self.width)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Flat index of cell `(rx, ry)`, or `OutOfBounds`.
    pub fn index_of(&self, rx: i32, ry: i32) -> Result<usize> {
        slot_index(rx, ry, self.width, self.height)
    }

    pub fn tile(&self, rx: i32, ry: i32) -> Result<&Tile> {
        let idx = self.index_of(rx, ry)?;
        Ok(&self.tiles[idx])
    }

    pub(crate) fn tile_mut(&mut self, rx: i32, ry: i32) -> Result<&mut Tile> {
        let idx = self.index_of(rx, ry)?;
        Ok(&mut self.tiles[idx])
    }

    /// Tile at storage column `dx`, row `row`
    pub fn at_storage(&self, dx: usize, row: usize) -> Option<&Tile> {
        if dx >= self.columns() {
            return None;
        }
        self.tiles.get(row * self.columns() + dx)
    }

    /// All tiles, row-major by storage coordinates
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn max_tile_num(&self) -> Option<i16> {
        self.tiles.iter().map(|t| t.tile_num).max()
    }
}

fn storage_columns(width: u32) -> usize {
    (width as usize * 2).saturating_sub(1)
}

fn slot_index(rx: i32, ry: i32, width: u32, height: u32) -> Result<usize> {
    let (dx, dy) = cell_to_storage(rx, ry, width as i32);
    let columns = storage_columns(width);
    // dy must be checked before halving: -1 / 2 truncates to row 0
    if dx < 0 || dx as usize >= columns || dy < 0 || (dy / 2) as u32 >= height {
        return Err(Error::OutOfBounds { rx, ry, width, height });
    }
    Ok((dy / 2) as usize * columns + dx as usize)
}

/// Reject sizes whose cells cannot all be addressed by the 512-wide overlay
/// planes. Cell coordinates run up to `width + height - 1`.
pub fn check_map_extent(width: u32, height: u32) -> Result<()> {
    let stride = OVERLAY_PLANE_STRIDE as u64;
    if width == 0 || height == 0 || width as u64 + height as u64 > stride {
        return Err(Error::config(
            "Map",
            "Size",
            format!("{width}x{height} does not fit a {stride}x{stride} cell area"),
        ));
    }
    Ok(())
}

/// Decompress an IsoMapPack5 blob and lay every record into the grid.
pub fn build_tile_grid(
    pack: &[u8],
    width: u32,
    height: u32,
    codec: &dyn PackCodec,
) -> Result<TileGrid> {
    check_map_extent(width, height)?;
    info!(width, height, "reading tiles");

    let cells = storage_columns(width) * height as usize;
    let record_bytes = cells * CELL_RECORD_SIZE;
    let mut buf = vec![0u8; record_bytes + PACK_END_MARKER_SIZE];
    let written = codec.decode(pack, &mut buf, None)?;
    if written != record_bytes && written != record_bytes + PACK_END_MARKER_SIZE {
        return Err(Error::size_mismatch(
            "IsoMapPack5",
            record_bytes + PACK_END_MARKER_SIZE,
            written,
        ));
    }

    let mut slots: Vec<Option<Tile>> = vec![None; cells];
    let mut reader = Cursor::new(&buf[..record_bytes]);
    for _ in 0..cells {
        let rec = CellRecord::read(&mut reader)?;
        let (rx, ry) = (rec.rx as i32, rec.ry as i32);
        let idx = slot_index(rx, ry, width, height)?;
        if slots[idx].is_some() {
            return Err(Error::CorruptStream(format!("cell ({rx}, {ry}) appears twice")));
        }
        let (dx, dy) = cell_to_storage(rx, ry, width as i32);
        slots[idx] = Some(Tile::new(
            dx as u16,
            dy as u16,
            rec.rx,
            rec.ry,
            rec.tile_num,
            rec.subtile,
            rec.z,
        ));
    }

    // `cells` distinct records into `cells` slots: every slot is filled.
    let tiles: Vec<Tile> = slots.into_iter().flatten().collect();
    debug!(tiles = tiles.len(), "tile grid complete");

    Ok(TileGrid { width, height, tiles })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::codec::writer::{format5_pack, BinaryWriter};
    use crate::codec::VARIANT_LZO;

    /// Every cell of a `width` x `height` map, in storage order
    pub fn all_cells(width: u32, height: u32) -> Vec<(u16, u16)> {
        let w = width as i32;
        let mut cells = Vec::new();
        for row in 0..height as i32 {
            for dx in 0..(2 * w - 1) {
                let dy = if dx % 2 == 0 { 2 * row } else { 2 * row + 1 };
                let (rx, ry) = storage_to_cell(dx, dy, w);
                cells.push((rx as u16, ry as u16));
            }
        }
        cells
    }

    /// Raw (uncompressed) records for `cells`, tile number from `tile_num`
    pub fn cell_records(cells: &[(u16, u16)], tile_num: impl Fn(u16, u16) -> i16) -> Vec<u8> {
        let mut w = BinaryWriter::new();
        for &(rx, ry) in cells {
            w.write_cell(rx, ry, tile_num(rx, ry), (rx % 4) as u8, 0);
        }
        w.into_vec()
    }

    /// Full, well-formed IsoMapPack5 (records in reverse storage order)
    pub fn terrain_pack(width: u32, height: u32, tile_num: impl Fn(u16, u16) -> i16) -> Vec<u8> {
        let mut cells = all_cells(width, height);
        cells.reverse();
        let mut raw = cell_records(&cells, tile_num);
        raw.extend_from_slice(&[0; PACK_END_MARKER_SIZE]);
        format5_pack(&raw, VARIANT_LZO)
    }

    pub fn grid(width: u32, height: u32) -> TileGrid {
        build_tile_grid(&terrain_pack(width, height, |_, _| 0), width, height, &crate::codec::Format5)
            .unwrap()
    }
}
