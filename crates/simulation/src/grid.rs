//! Spatial lookup consumed by the structure lifecycle.
//!
//! [`TileGrid`] stores, per map cell, which structure fragment stands on it,
//! which city owns the cell, whether the cell is being cleared, and the
//! climate/region used when replacing unknown descriptors on load.

use std::ops::{Add, Sub};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{GRID_HEIGHT, GRID_WIDTH};
use crate::ids::{CityId, StructureId};
use crate::structure_catalog::TileRef;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct Koord {
    pub x: i16,
    pub y: i16,
}

impl Koord {
    pub const ORIGIN: Koord = Koord { x: 0, y: 0 };

    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

impl Add for Koord {
    type Output = Koord;
    fn add(self, rhs: Koord) -> Koord {
        Koord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Koord {
    type Output = Koord;
    fn sub(self, rhs: Koord) -> Koord {
        Koord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Map position including height level.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct Koord3d {
    pub x: i16,
    pub y: i16,
    pub z: i8,
}

impl Koord3d {
    pub const fn new(x: i16, y: i16, z: i8) -> Self {
        Self { x, y, z }
    }

    pub fn xy(self) -> Koord {
        Koord::new(self.x, self.y)
    }

    /// Quarter turn of the map: `x' = map_height - 1 - y`, `y' = x`.
    pub fn rotate90(self, map_height: usize) -> Self {
        Self::new(map_height as i16 - 1 - self.y, self.x, self.z)
    }
}

impl Add<Koord> for Koord3d {
    type Output = Koord3d;
    fn add(self, rhs: Koord) -> Koord3d {
        Koord3d::new(self.x + rhs.x, self.y + rhs.y, self.z)
    }
}

impl Sub<Koord> for Koord3d {
    type Output = Koord3d;
    fn sub(self, rhs: Koord) -> Koord3d {
        Koord3d::new(self.x - rhs.x, self.y - rhs.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// The part of a structure standing on one cell.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub structure: StructureId,
    pub tile: TileRef,
}

#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub fragment: Option<Fragment>,
    pub city: Option<CityId>,
    pub being_deleted: bool,
    pub climate: u8,
    pub region: u8,
}

impl Plan {
    pub fn find_structure_fragment(&self) -> Option<&Fragment> {
        self.fragment.as_ref()
    }
}

#[derive(Resource, Debug, Clone)]
pub struct TileGrid {
    pub cells: Vec<Plan>,
    pub width: usize,
    pub height: usize,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![Plan::default(); width * height],
            width,
            height,
        }
    }

    #[inline]
    fn index(&self, k: Koord) -> Option<usize> {
        if k.x < 0 || k.y < 0 {
            return None;
        }
        let (x, y) = (k.x as usize, k.y as usize);
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    #[inline]
    pub fn in_bounds(&self, k: Koord) -> bool {
        self.index(k).is_some()
    }

    pub fn lookup(&self, k: Koord) -> Option<&Plan> {
        self.index(k).map(|i| &self.cells[i])
    }

    pub fn lookup_mut(&mut self, k: Koord) -> Option<&mut Plan> {
        self.index(k).map(move |i| &mut self.cells[i])
    }

    pub fn place_fragment(&mut self, k: Koord, fragment: Fragment) {
        if let Some(plan) = self.lookup_mut(k) {
            plan.fragment = Some(fragment);
        }
    }

    /// Clears the cell only if it still holds `structure`.
    pub fn clear_fragment(&mut self, k: Koord, structure: StructureId) {
        if let Some(plan) = self.lookup_mut(k) {
            if plan
                .fragment
                .as_ref()
                .is_some_and(|f| f.structure == structure)
            {
                plan.fragment = None;
            }
        }
    }

    pub fn city_at(&self, k: Koord) -> Option<CityId> {
        self.lookup(k).and_then(|p| p.city)
    }

    pub fn set_city(&mut self, k: Koord, city: Option<CityId>) {
        if let Some(plan) = self.lookup_mut(k) {
            plan.city = city;
        }
    }

    /// Assigns `city` to every cell in the half-open rectangle `[min, max)`.
    pub fn claim_area(&mut self, min: Koord, max: Koord, city: CityId) {
        for y in min.y..max.y {
            for x in min.x..max.x {
                self.set_city(Koord::new(x, y), Some(city));
            }
        }
    }

    /// Drops every cell claim held by `city`.
    pub fn release_city(&mut self, city: CityId) {
        for plan in &mut self.cells {
            if plan.city == Some(city) {
                plan.city = None;
            }
        }
    }

    pub fn set_being_deleted(&mut self, k: Koord, flag: bool) {
        if let Some(plan) = self.lookup_mut(k) {
            plan.being_deleted = flag;
        }
    }

    pub fn climate_at(&self, k: Koord) -> u8 {
        self.lookup(k).map_or(0, |p| p.climate)
    }

    pub fn region_at(&self, k: Koord) -> u8 {
        self.lookup(k).map_or(0, |p| p.region)
    }

    /// Quarter turn of the whole map, matching [`Koord3d::rotate90`].
    pub fn rotate90(&mut self) {
        let (w, h) = (self.width, self.height);
        let mut rotated = vec![Plan::default(); w * h];
        for y in 0..h {
            for x in 0..w {
                let nx = h - 1 - y;
                let ny = x;
                rotated[ny * h + nx] = std::mem::take(&mut self.cells[y * w + x]);
            }
        }
        self.cells = rotated;
        self.width = h;
        self.height = w;
    }
}
