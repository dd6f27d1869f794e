use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{CAPACITY_UNSPECIFIED, PRICE_MAGIC};
use crate::grid::Koord;

// ---------------------------------------------------------------------------
// Building categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BuildingType {
    #[default]
    Unknown,
    Residential,
    Commercial,
    Industrial,
    Townhall,
    Monument,
    Headquarters,
    AttractionCity,
    AttractionLand,
    Factory,
    Stop,
    Dock,
    Depot,
}

impl BuildingType {
    pub fn is_city_building(self) -> bool {
        matches!(
            self,
            BuildingType::Residential | BuildingType::Commercial | BuildingType::Industrial
        )
    }

    pub fn is_attraction(self) -> bool {
        matches!(
            self,
            BuildingType::AttractionCity | BuildingType::AttractionLand
        )
    }

    /// Whether structures of this type join a city's building list.
    pub fn connects_with_town(self) -> bool {
        self.is_city_building()
            || matches!(self, BuildingType::Townhall | BuildingType::AttractionCity)
    }
}

/// What a factory does with goods. Only end consumers attract visitors by
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FactorySector {
    #[default]
    Producer,
    Manufacturer,
    EndConsumer,
    PowerPlant,
}

// ---------------------------------------------------------------------------
// Descriptor definition (builder + JSON shape)
// ---------------------------------------------------------------------------

/// Author-facing definition of a building type. Class proportions are given
/// as per-class weights and accumulated by [`BuildingDef::build`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingDef {
    pub name: String,
    pub building_type: BuildingType,
    pub level: u16,
    pub size_x: i16,
    pub size_y: i16,
    pub layouts: u8,
    pub population_and_visitor_demand_capacity: u16,
    pub employment_capacity: u16,
    pub mail_demand_and_production_capacity: u16,
    pub class_proportions: Vec<u16>,
    pub class_proportions_jobs: Vec<u16>,
    pub animation_time: u32,
    pub phases: u16,
    pub no_construction_pit: bool,
    pub can_rotate: bool,
    pub maintenance: i64,
    pub intro_date: u16,
    pub retire_date: u16,
    pub allowed_climates: u16,
    pub allowed_regions: u16,
    pub connected_with_town: Option<bool>,
    /// Tile indices that carry no image (holes in the layout).
    pub tiles_without_image: Vec<u16>,
}

impl Default for BuildingDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            building_type: BuildingType::Unknown,
            level: 1,
            size_x: 1,
            size_y: 1,
            layouts: 1,
            population_and_visitor_demand_capacity: CAPACITY_UNSPECIFIED,
            employment_capacity: CAPACITY_UNSPECIFIED,
            mail_demand_and_production_capacity: CAPACITY_UNSPECIFIED,
            class_proportions: Vec::new(),
            class_proportions_jobs: Vec::new(),
            animation_time: 300,
            phases: 1,
            no_construction_pit: false,
            can_rotate: true,
            maintenance: PRICE_MAGIC,
            intro_date: 0,
            retire_date: 0,
            allowed_climates: u16::MAX,
            allowed_regions: u16::MAX,
            connected_with_town: None,
            tiles_without_image: Vec::new(),
        }
    }
}

impl BuildingDef {
    pub fn new(name: impl Into<String>, building_type: BuildingType, level: u16) -> Self {
        Self {
            name: name.into(),
            building_type,
            level,
            ..Default::default()
        }
    }

    pub fn size(mut self, x: i16, y: i16) -> Self {
        self.size_x = x;
        self.size_y = y;
        self
    }

    pub fn layouts(mut self, layouts: u8) -> Self {
        self.layouts = layouts;
        self
    }

    pub fn capacities(mut self, people: u16, jobs: u16, mail: u16) -> Self {
        self.population_and_visitor_demand_capacity = people;
        self.employment_capacity = jobs;
        self.mail_demand_and_production_capacity = mail;
        self
    }

    pub fn class_weights(mut self, weights: &[u16]) -> Self {
        self.class_proportions = weights.to_vec();
        self
    }

    pub fn job_class_weights(mut self, weights: &[u16]) -> Self {
        self.class_proportions_jobs = weights.to_vec();
        self
    }

    pub fn animation(mut self, phases: u16, animation_time: u32) -> Self {
        self.phases = phases;
        self.animation_time = animation_time;
        self
    }

    pub fn no_construction_pit(mut self) -> Self {
        self.no_construction_pit = true;
        self
    }

    pub fn fixed_orientation(mut self) -> Self {
        self.can_rotate = false;
        self
    }

    pub fn maintenance(mut self, maintenance: i64) -> Self {
        self.maintenance = maintenance;
        self
    }

    pub fn available(mut self, intro_date: u16, retire_date: u16) -> Self {
        self.intro_date = intro_date;
        self.retire_date = retire_date;
        self
    }

    pub fn climates(mut self, mask: u16) -> Self {
        self.allowed_climates = mask;
        self
    }

    pub fn regions(mut self, mask: u16) -> Self {
        self.allowed_regions = mask;
        self
    }

    pub fn without_image(mut self, tile_index: u16) -> Self {
        self.tiles_without_image.push(tile_index);
        self
    }

    pub fn build(self) -> BuildingDesc {
        let size = Koord::new(self.size_x.max(1), self.size_y.max(1));
        let layouts = self.layouts.max(1);
        let phases = self.phases.max(1);
        let per_layout = (size.x * size.y) as u16;

        let mut tiles = Vec::with_capacity(usize::from(per_layout) * usize::from(layouts));
        for layout in 0..layouts {
            let dims = size_for_layout(size, layout);
            for y in 0..dims.y {
                for x in 0..dims.x {
                    let index = u16::from(layout) * per_layout + (y * dims.x + x) as u16;
                    let has_image = !self.tiles_without_image.contains(&index);
                    tiles.push(BuildingTileDesc {
                        index,
                        layout,
                        offset: Koord::new(x, y),
                        phases: if has_image { phases } else { 1 },
                        has_image,
                    });
                }
            }
        }

        BuildingDesc {
            connected_with_town: self
                .connected_with_town
                .unwrap_or_else(|| self.building_type.connects_with_town()),
            name: self.name,
            building_type: self.building_type,
            level: self.level,
            size,
            layouts,
            population_and_visitor_demand_capacity: self.population_and_visitor_demand_capacity,
            employment_capacity: self.employment_capacity,
            mail_demand_and_production_capacity: self.mail_demand_and_production_capacity,
            class_proportions: accumulate(&self.class_proportions),
            class_proportions_jobs: accumulate(&self.class_proportions_jobs),
            animation_time: self.animation_time,
            no_construction_pit: self.no_construction_pit,
            can_rotate: self.can_rotate,
            maintenance: self.maintenance,
            intro_date: self.intro_date,
            retire_date: self.retire_date,
            allowed_climates: self.allowed_climates,
            allowed_regions: self.allowed_regions,
            tiles,
        }
    }
}

fn accumulate(weights: &[u16]) -> Vec<u32> {
    weights
        .iter()
        .scan(0u32, |sum, w| {
            *sum += u32::from(*w);
            Some(*sum)
        })
        .collect()
}

fn size_for_layout(size: Koord, layout: u8) -> Koord {
    if layout & 1 == 1 {
        Koord::new(size.y, size.x)
    } else {
        size
    }
}

// ---------------------------------------------------------------------------
// Immutable descriptors
// ---------------------------------------------------------------------------

/// One tile of a (possibly multi-tile) building type in one layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingTileDesc {
    pub index: u16,
    pub layout: u8,
    pub offset: Koord,
    pub phases: u16,
    pub has_image: bool,
}

#[derive(Debug, Clone)]
pub struct BuildingDesc {
    pub name: String,
    pub building_type: BuildingType,
    pub level: u16,
    /// Footprint in layout 0; odd layouts swap the axes.
    pub size: Koord,
    pub layouts: u8,
    pub population_and_visitor_demand_capacity: u16,
    pub employment_capacity: u16,
    pub mail_demand_and_production_capacity: u16,
    /// Cumulative passenger class proportions.
    pub class_proportions: Vec<u32>,
    /// Cumulative commuter class proportions.
    pub class_proportions_jobs: Vec<u32>,
    pub animation_time: u32,
    pub no_construction_pit: bool,
    pub can_rotate: bool,
    pub maintenance: i64,
    pub intro_date: u16,
    pub retire_date: u16,
    pub allowed_climates: u16,
    pub allowed_regions: u16,
    pub connected_with_town: bool,
    pub tiles: Vec<BuildingTileDesc>,
}

impl BuildingDesc {
    pub fn size_for_layout(&self, layout: u8) -> Koord {
        size_for_layout(self.size, layout)
    }

    pub fn x(&self, layout: u8) -> i16 {
        self.size_for_layout(layout).x
    }

    pub fn y(&self, layout: u8) -> i16 {
        self.size_for_layout(layout).y
    }

    pub fn is_single_tile(&self) -> bool {
        self.size == Koord::new(1, 1)
    }

    pub fn is_factory(&self) -> bool {
        self.building_type == BuildingType::Factory
    }

    pub fn is_monument(&self) -> bool {
        self.building_type == BuildingType::Monument
    }

    pub fn is_attraction(&self) -> bool {
        self.building_type.is_attraction()
    }

    /// Index of the tile at `(x, y)` within `layout`, if that cell exists.
    pub fn tile_index(&self, layout: u8, x: i16, y: i16) -> Option<u16> {
        if layout >= self.layouts {
            return None;
        }
        let dims = self.size_for_layout(layout);
        if x < 0 || y < 0 || x >= dims.x || y >= dims.y {
            return None;
        }
        let per_layout = (self.size.x * self.size.y) as u16;
        Some(u16::from(layout) * per_layout + (y * dims.x + x) as u16)
    }

    pub fn class_proportion(&self, class: u8) -> u32 {
        cumulative_at(&self.class_proportions, class)
    }

    pub fn class_proportions_sum(&self) -> u32 {
        self.class_proportions.last().copied().unwrap_or(0)
    }

    pub fn class_proportion_jobs(&self, class: u8) -> u32 {
        cumulative_at(&self.class_proportions_jobs, class)
    }

    pub fn class_proportions_sum_jobs(&self) -> u32 {
        self.class_proportions_jobs.last().copied().unwrap_or(0)
    }

    pub fn is_available(&self, timeline_year_month: u16) -> bool {
        timeline_year_month == 0
            || (self.intro_date <= timeline_year_month
                && (self.retire_date == 0 || timeline_year_month < self.retire_date))
    }

    pub fn allows_climate(&self, climate: u8) -> bool {
        climate == crate::config::ANY_CLIMATE
            || (climate < 16 && self.allowed_climates & (1 << climate) != 0)
    }

    pub fn allows_region(&self, region: u8) -> bool {
        region == crate::config::ANY_REGION
            || (region < 16 && self.allowed_regions & (1 << region) != 0)
    }
}

fn cumulative_at(cumulative: &[u32], class: u8) -> u32 {
    cumulative
        .get(usize::from(class))
        .or(cumulative.last())
        .copied()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tile references
// ---------------------------------------------------------------------------

/// Shared reference to one tile of a catalog descriptor.
#[derive(Debug, Clone)]
pub struct TileRef {
    desc: Arc<BuildingDesc>,
    index: u16,
}

impl TileRef {
    /// Returns `None` when `index` is not a tile of `desc`.
    pub fn new(desc: Arc<BuildingDesc>, index: u16) -> Option<Self> {
        (usize::from(index) < desc.tiles.len()).then_some(Self { desc, index })
    }

    pub fn desc(&self) -> &BuildingDesc {
        &self.desc
    }

    pub fn desc_arc(&self) -> &Arc<BuildingDesc> {
        &self.desc
    }

    pub fn tile(&self) -> &BuildingTileDesc {
        &self.desc.tiles[usize::from(self.index)]
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn layout(&self) -> u8 {
        self.tile().layout
    }

    pub fn offset(&self) -> Koord {
        self.tile().offset
    }

    pub fn phases(&self) -> u16 {
        self.tile().phases
    }

    pub fn has_image(&self) -> bool {
        self.tile().has_image
    }

    /// Both tiles belong to the same descriptor instance.
    pub fn same_desc(&self, other: &TileRef) -> bool {
        Arc::ptr_eq(&self.desc, &other.desc)
    }

    /// Sibling tile of the same descriptor at `(x, y)` in `layout`.
    pub fn sibling(&self, layout: u8, x: i16, y: i16) -> Option<TileRef> {
        let index = self.desc.tile_index(layout, x, y)?;
        TileRef::new(Arc::clone(&self.desc), index)
    }
}

impl PartialEq for TileRef {
    fn eq(&self, other: &Self) -> bool {
        self.same_desc(other) && self.index == other.index
    }
}

impl Eq for TileRef {}
