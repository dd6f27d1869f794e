//! Persistence for the structure store: versioned records, migration of
//! older schemas, descriptor resolution on load and the file envelope.

mod atomic_write;
pub mod collect_stage;
pub mod descriptor_resolver;
mod exclusive_load;
mod exclusive_save;
pub mod field_gates;
pub mod file_header;
pub mod restore_stage;
pub mod save_error;
pub mod save_migrate;
mod save_migrate_registry;
mod save_plugin;
pub mod save_types;
pub mod serialization;
pub mod structure_codec;

pub use exclusive_load::{
    load_world_from_bytes, load_world_from_file, reset_structures, LoadReport,
};
pub use exclusive_save::{build_save_data, save_world_to_bytes, save_world_to_file};
pub use save_error::SaveError;
pub use save_plugin::{LoadStructuresEvent, SaveLoadOutcome, SavePlugin, SaveStructuresEvent};
