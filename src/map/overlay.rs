use tracing::{debug, info};

use super::grid::TileGrid;
use super::store::ObjectStore;
use super::types::GameObject;
use crate::codec::{PackCodec, VARIANT_FORMAT80};
use crate::error::{Error, Result};

/// Both overlay planes address a fixed 512 x 512 cell area.
pub const OVERLAY_PLANE_SIZE: usize = 1 << 18;
pub const OVERLAY_PLANE_STRIDE: usize = 512;
/// Id-plane byte meaning "no overlay on this cell"
pub const NO_OVERLAY: u8 = 0xFF;

/// Decompress one overlay plane; it must fill the plane exactly.
pub fn decode_plane(pack: &[u8], codec: &dyn PackCodec, what: &'static str) -> Result<Vec<u8>> {
    let mut plane = vec![0u8; OVERLAY_PLANE_SIZE];
    let written = codec.decode(pack, &mut plane, Some(VARIANT_FORMAT80))?;
    if written != OVERLAY_PLANE_SIZE {
        return Err(Error::size_mismatch(what, OVERLAY_PLANE_SIZE, written));
    }
    Ok(plane)
}

/// Plane offset of cell `(rx, ry)`. The planes ignore the map's real width.
pub fn plane_index(rx: u16, ry: u16) -> usize {
    rx as usize + OVERLAY_PLANE_STRIDE * ry as usize
}

/// Create an overlay object for every tile whose id-plane byte is set.
/// Tiles are visited column by column: storage `dx` outer, row inner.
pub fn resolve_overlays(
    grid: &mut TileGrid,
    store: &mut ObjectStore,
    ids: &[u8],
    values: &[u8],
) -> Result<usize> {
    info!("reading overlay");

    let (width, height) = (grid.width(), grid.height());
    let rows = height as usize;
    let cells: Vec<(u16, u16)> = (0..grid.columns())
        .flat_map(|dx| (0..rows).map(move |row| (dx, row)))
        .filter_map(|(dx, row)| grid.at_storage(dx, row))
        .map(|t| (t.rx, t.ry))
        .collect();
    let mut placed = 0;

    for (rx, ry) in cells {
        let idx = plane_index(rx, ry);
        let (Some(&id), Some(&value)) = (ids.get(idx), values.get(idx)) else {
            return Err(Error::OutOfBounds {
                rx: rx as i32,
                ry: ry as i32,
                width,
                height,
            });
        };
        if id == NO_OVERLAY {
            continue;
        }
        store.place(grid, rx as i32, ry as i32, GameObject::Overlay { id, value })?;
        placed += 1;
    }

    debug!(placed, "overlay objects placed");
    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::writer::format5_pack;
    use crate::codec::Format5;
    use crate::map::grid::test_support::{all_cells, grid};
    use crate::map::types::ObjectKind;

    #[test]
    fn test_sentinel_skips_cell() {
        let mut grid = grid(4, 3);
        let mut store = ObjectStore::new();
        let mut ids = vec![NO_OVERLAY; OVERLAY_PLANE_SIZE];
        let mut values = vec![0u8; OVERLAY_PLANE_SIZE];

        let with_overlay = [(4u16, 1u16), (3, 3), (5, 4)];
        for (n, &(rx, ry)) in with_overlay.iter().enumerate() {
            ids[plane_index(rx, ry)] = n as u8;
            values[plane_index(rx, ry)] = 10 + n as u8;
        }

        let placed = resolve_overlays(&mut grid, &mut store, &ids, &values).unwrap();
        assert_eq!(placed, 3);

        for (rx, ry) in all_cells(4, 3) {
            let tile = grid.tile(rx as i32, ry as i32).unwrap();
            let expected = usize::from(with_overlay.contains(&(rx, ry)));
            assert_eq!(tile.objects().len(), expected, "cell ({rx}, {ry})");
        }

        let tile = grid.tile(5, 4).unwrap();
        let obj = store.get(tile.objects()[0]).unwrap();
        assert_eq!(obj, &GameObject::Overlay { id: 2, value: 12 });
    }

    #[test]
    fn test_collection_follows_storage_order() {
        let mut grid = grid(3, 3);
        let mut store = ObjectStore::new();
        let ids = vec![0u8; OVERLAY_PLANE_SIZE];
        let values: Vec<u8> = (0..OVERLAY_PLANE_SIZE).map(|i| (i % 200) as u8).collect();

        resolve_overlays(&mut grid, &mut store, &ids, &values).unwrap();
        assert_eq!(store.count(ObjectKind::Overlay), grid.len());

        let mut expected = Vec::new();
        for dx in 0..grid.columns() {
            for row in 0..3 {
                let t = grid.at_storage(dx, row).unwrap();
                expected.push(values[plane_index(t.rx, t.ry)]);
            }
        }
        let got: Vec<u8> = store
            .of_kind(ObjectKind::Overlay)
            .map(|o| match o {
                GameObject::Overlay { value, .. } => *value,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_columns_before_rows() {
        let mut grid = grid(4, 2);
        let mut store = ObjectStore::new();
        let mut ids = vec![NO_OVERLAY; OVERLAY_PLANE_SIZE];
        let values = vec![0u8; OVERLAY_PLANE_SIZE];

        // row 0 at a high column, then row 1 at column 0
        let late = grid.at_storage(6, 0).unwrap();
        let early = grid.at_storage(0, 1).unwrap();
        ids[plane_index(late.rx, late.ry)] = 1;
        ids[plane_index(early.rx, early.ry)] = 2;

        resolve_overlays(&mut grid, &mut store, &ids, &values).unwrap();
        let order: Vec<u8> = store
            .of_kind(ObjectKind::Overlay)
            .map(|o| match o {
                GameObject::Overlay { id, .. } => *id,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn test_decode_plane() {
        let mut raw = vec![NO_OVERLAY; OVERLAY_PLANE_SIZE];
        raw[plane_index(7, 9)] = 0x1A;
        let plane = decode_plane(&format5_pack(&raw, VARIANT_FORMAT80), &Format5, "OverlayPack")
            .unwrap();
        assert_eq!(plane, raw);
    }

    #[test]
    fn test_short_plane() {
        let raw = vec![NO_OVERLAY; 4096];
        let err = decode_plane(&format5_pack(&raw, VARIANT_FORMAT80), &Format5, "OverlayPack")
            .unwrap_err();
        assert!(matches!(err, Error::CorruptStream(_)), "{err}");
    }

    #[test]
    fn test_short_planes_are_out_of_bounds() {
        let mut grid = grid(3, 3);
        let mut store = ObjectStore::new();
        let err = resolve_overlays(&mut grid, &mut store, &[0; 8], &[0; 8]).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { .. }));
    }
}
