//! Building descriptor catalog: immutable per-type metadata the structure
//! lifecycle reads capacities, animation and layouts from.

mod catalog;
mod types;

pub use catalog::{CatalogFile, StructureCatalog};
pub use types::{
    BuildingDef, BuildingDesc, BuildingTileDesc, BuildingType, FactorySector, TileRef,
};
