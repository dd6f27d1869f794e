// ---------------------------------------------------------------------------
// Save structs and schema versions
// ---------------------------------------------------------------------------

mod save_data;
mod structure_record;
mod version;

pub use save_data::*;
pub use structure_record::*;
pub use version::*;
