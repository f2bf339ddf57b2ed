use super::grid::TileGrid;
use super::types::{GameObject, ObjectId, ObjectKind};
use crate::error::Result;

/// Object arena plus per-kind collections in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    objects: Vec<GameObject>,
    by_kind: [Vec<ObjectId>; ObjectKind::COUNT],
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id.0)
    }

    pub fn ids(&self, kind: ObjectKind) -> &[ObjectId] {
        &self.by_kind[kind.index()]
    }

    pub fn of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &GameObject> + '_ {
        self.ids(kind).iter().map(move |id| &self.objects[id.0])
    }

    pub fn count(&self, kind: ObjectKind) -> usize {
        self.ids(kind).len()
    }

    fn push(&mut self, object: GameObject) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.by_kind[object.kind().index()].push(id);
        self.objects.push(object);
        id
    }

    /// Attach `object` to cell `(rx, ry)` and append it to its kind's collection.
    /// Nothing is stored if the cell is off the grid.
    pub fn place(
        &mut self,
        grid: &mut TileGrid,
        rx: i32,
        ry: i32,
        object: GameObject,
    ) -> Result<ObjectId> {
        let tile = grid.tile_mut(rx, ry)?;
        let id = self.push(object);
        tile.add_object(id);
        Ok(id)
    }
}
