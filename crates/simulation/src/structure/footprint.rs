use super::Structure;
use crate::grid::{Koord, TileGrid};
use crate::ids::StructureId;

impl Structure {
    /// Rebuilds the cached list of cells this logical building occupies.
    ///
    /// Multi-tile buildings scan their bounding box; a cell counts when a
    /// fragment of the same descriptor stands there and the cell is not
    /// being cleared. Holes in the layout are simply skipped.
    pub fn recompute_footprint(&mut self, grid: &TileGrid) {
        self.footprint.clear();
        let desc = self.tile.desc();
        let size = desc.size_for_layout(self.tile.layout());
        if size == Koord::new(1, 1) {
            self.footprint.push(self.pos.xy());
            return;
        }

        let start = self.pos.xy() - self.tile.offset();
        for y in start.y..start.y + size.y {
            for x in start.x..start.x + size.x {
                let k = Koord::new(x, y);
                let Some(plan) = grid.lookup(k) else {
                    continue;
                };
                let same_building = plan
                    .find_structure_fragment()
                    .is_some_and(|f| f.tile.same_desc(&self.tile));
                if same_building && !plan.being_deleted {
                    self.footprint.push(k);
                }
            }
        }
    }

    /// The structure standing on the first image-bearing tile of this
    /// building's layout, or this structure when none is found.
    pub fn first_tile(&self, grid: &TileGrid) -> StructureId {
        let desc = self.tile.desc();
        let layout = self.tile.layout();
        let origin = self.pos.xy() - self.tile.offset();
        for x in 0..desc.x(layout) {
            for y in 0..desc.y(layout) {
                let Some(expected) = self.tile.sibling(layout, x, y) else {
                    continue;
                };
                if !expected.has_image() {
                    continue;
                }
                let found = grid
                    .lookup(origin + Koord::new(x, y))
                    .and_then(|plan| plan.find_structure_fragment())
                    .filter(|f| f.tile == expected);
                if let Some(fragment) = found {
                    return fragment.structure;
                }
            }
        }
        self.id
    }

    pub fn is_same_building(&self, other: &Structure, grid: &TileGrid) -> bool {
        self.tile.same_desc(&other.tile) && self.first_tile(grid) == other.first_tile(grid)
    }
}
