//! Stable handles for structures and the registries they bind to.

use serde::{Deserialize, Serialize};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
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
        pub struct $name(pub $inner);
    };
}

handle!(
    /// One tile-sized structure instance owned by the `StructureStore`.
    StructureId(u32)
);
handle!(CityId(u32));
handle!(FactoryId(u32));
handle!(
    /// Player or public authority paying maintenance.
    OwnerId(u8)
);

impl OwnerId {
    pub const PUBLIC: OwnerId = OwnerId(1);
}
