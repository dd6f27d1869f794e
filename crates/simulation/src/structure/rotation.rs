use rand::Rng;

use super::{Structure, StructureEnv};
use crate::grid::Koord;
use crate::structure_catalog::BuildingType;

/// Layout successor for a quarter turn of descriptors with more than four
/// layouts.
const LAYOUT_ROTATE: [u8; 16] = [1, 8, 5, 10, 3, 12, 7, 14, 9, 0, 13, 2, 11, 4, 15, 6];

/// Whether a rotated world can still be saved and reloaded faithfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RotationHazard {
    None,
    NoSaveWarning,
    NoSave,
}

impl Structure {
    /// Quarter turn with the map. `map_height` is the height before the
    /// turn; `world_rotation` the rotation counter after it.
    ///
    /// The tile is swapped without aging: construction start is kept.
    pub fn rotate90(
        &mut self,
        map_height: usize,
        world_rotation: u8,
        env: &StructureEnv,
        rng: &mut impl Rng,
    ) -> RotationHazard {
        self.pos = self.pos.rotate90(map_height);

        let desc = self.tile.desc();
        let layouts = desc.layouts;
        if layouts <= 1 && desc.size.x * desc.size.y <= 1 {
            return RotationHazard::None;
        }

        let old_layout = self.tile.layout();
        let offset = self.tile.offset();
        let layout = if desc.building_type == BuildingType::Unknown || layouts <= 4 {
            (old_layout & 4) + ((old_layout + 3) % layouts & 3)
        } else {
            LAYOUT_ROTATE.get(usize::from(old_layout)).copied().unwrap_or(0) % layouts
        };

        let new_offset = if !desc.can_rotate && layouts == 1 {
            if world_rotation & 1 == 0 {
                Koord::new(desc.size.x - 1 - offset.x, desc.size.y - 1 - offset.y)
            } else {
                offset
            }
        } else {
            Koord::new(desc.y(old_layout) - 1 - offset.y, offset.x)
        };

        let fits = desc.x(layout) > new_offset.x && desc.y(layout) > new_offset.y;
        let Some(new_tile) = fits
            .then(|| self.tile.sibling(layout, new_offset.x, new_offset.y))
            .flatten()
        else {
            return RotationHazard::NoSave;
        };

        let building_type = desc.building_type;
        let construction_start = self.construction_start;
        let purchase_time = self.purchase_time;
        self.set_tile(new_tile, false, env, rng);
        self.construction_start = construction_start;
        self.purchase_time = purchase_time;

        if building_type != BuildingType::Dock && !self.tile.has_image() {
            if self.is_factory() {
                return RotationHazard::NoSave;
            }
            if new_offset != Koord::ORIGIN {
                return RotationHazard::NoSaveWarning;
            }
        }
        RotationHazard::None
    }
}
