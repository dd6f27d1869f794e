// ---------------------------------------------------------------------------
// StructureSaveData: the top-level save payload
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::structure_record::SaveStructure;
use super::version::SchemaVersion;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct StructureSaveData {
    /// Schema every record in `structures` was written under.
    #[serde(default)]
    pub version: SchemaVersion,
    pub structures: Vec<SaveStructure>,
    /// Saveable resources keyed by `Saveable::SAVE_KEY`.
    #[serde(default)]
    pub extensions: BTreeMap<String, Vec<u8>>,
}
