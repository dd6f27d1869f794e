//! Compile-time constants shared by the structure lifecycle.

/// Capacity value on a descriptor meaning "derive from level".
pub const CAPACITY_UNSPECIFIED: u16 = 65535;

/// Ticks a freshly placed structure shows its construction pit.
/// Completion happens on the first step strictly after this many ticks.
pub const CONSTRUCTION_DURATION_TICKS: i64 = 5000;

/// Descriptor maintenance value meaning "use `maint_building * level`".
pub const PRICE_MAGIC: i64 = 2_147_483_647;

/// Residential visitor demand is population divided by this.
pub const RESIDENTIAL_VISITOR_DIVISOR: u16 = 20;

/// Stored in yearly percentage snapshots when nothing was generated.
pub const PERCENT_UNSET: u16 = 65535;

/// Reference length of a tile, in meters, for monthly figure scaling.
pub const BASE_METERS_PER_TILE: i64 = 1000;

/// Reference month length (as a power of two) for monthly figure scaling.
pub const BASE_BITS_PER_MONTH: u32 = 18;

/// Climate index meaning "any climate" in catalog queries.
pub const ANY_CLIMATE: u8 = 8;

/// Region index meaning "any region" in catalog queries.
pub const ANY_REGION: u8 = 0xFF;

/// Default map dimensions for a fresh `TileGrid`.
pub const GRID_WIDTH: usize = 128;
pub const GRID_HEIGHT: usize = 128;
