// ---------------------------------------------------------------------------
// Schema version triple
// ---------------------------------------------------------------------------

use std::fmt;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Version a structure record was written under.
///
/// `base` packs the base game version as `major * 1000 + minor`, so
/// 99.14 is `99_014`. `extended` and `revision` track the extended
/// format independently of the base version; each field gate checks
/// whichever axis introduced its field.
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
    Encode,
    Decode,
)]
pub struct SchemaVersion {
    pub base: u32,
    pub extended: u16,
    pub revision: u16,
}

/// Schema written by this build.
///
/// 122.0 / ext 15.0 stores the exact construction start, the complete
/// demand figures including population and the factory a tile belongs to.
pub const CURRENT_SCHEMA: SchemaVersion = SchemaVersion::new(122, 0, 15, 0);

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32, extended: u16, revision: u16) -> Self {
        Self {
            base: major * 1000 + minor,
            extended,
            revision,
        }
    }

    pub fn base_at_least(self, major: u32, minor: u32) -> bool {
        self.base >= major * 1000 + minor
    }

    pub fn base_less(self, major: u32, minor: u32) -> bool {
        !self.base_at_least(major, minor)
    }

    /// `extended == ext && revision >= rev`, or any later extended version.
    pub fn extended_at_least(self, ext: u16, rev: u16) -> bool {
        self.extended > ext || (self.extended == ext && self.revision >= rev)
    }

    /// True if any axis of `self` is ahead of `other`.
    pub fn is_newer_than(self, other: SchemaVersion) -> bool {
        self.base > other.base
            || self.extended > other.extended
            || (self.extended == other.extended && self.revision > other.revision)
    }
}

impl Default for SchemaVersion {
    /// Unversioned data: the oldest schema.
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} ext {}.{}",
            self.base / 1000,
            self.base % 1000,
            self.extended,
            self.revision
        )
    }
}
