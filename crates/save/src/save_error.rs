// ---------------------------------------------------------------------------
// SaveError: what can abort a structure save or load
// ---------------------------------------------------------------------------

use std::fmt;

use crate::save_types::SchemaVersion;

/// Errors that abort a save or a load.
///
/// Missing descriptors are not errors: the affected structures are dropped
/// and listed in `MissingAssets` while the rest of the save loads.
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    /// The record payload did not decode as bitcode.
    Decode(String),
    /// Written by a newer schema than this build migrates.
    VersionMismatch {
        expected_max: SchemaVersion,
        found: SchemaVersion,
    },
    /// The world carries the nosave flag, e.g. after a rotation that could
    /// not be applied to every structure.
    Unsaveable(String),
    /// Header, checksum or record layout is damaged.
    Corrupted(String),
    /// A resource the structure world needs is not in the ECS world.
    MissingResource(String),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "Structure file I/O failed: {e}"),
            SaveError::Decode(msg) => write!(f, "Structure records unreadable: {msg}"),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Save schema {found} is newer than the supported {expected_max}"
            ),
            SaveError::Unsaveable(msg) => write!(f, "World cannot be saved: {msg}"),
            SaveError::Corrupted(msg) => write!(f, "Corrupted structure save: {msg}"),
            SaveError::MissingResource(name) => write!(f, "Structure world lacks {name}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_mismatch_names_both_schemas() {
        let err = SaveError::VersionMismatch {
            expected_max: SchemaVersion::new(122, 0, 15, 0),
            found: SchemaVersion::new(123, 2, 16, 1),
        };
        let msg = err.to_string();
        assert!(msg.contains("123.2 ext 16.1"), "got: {msg}");
        assert!(msg.contains("122.0 ext 15.0"), "got: {msg}");
    }

    #[test]
    fn test_nosave_refusal_message() {
        let msg = SaveError::Unsaveable("rotation left a structure off-grid".into()).to_string();
        assert!(msg.starts_with("World cannot be saved"), "got: {msg}");
    }

    #[test]
    fn test_missing_file_keeps_io_source() {
        let err: SaveError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "structures.bin").into();
        assert!(matches!(err, SaveError::Io(_)));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("structures.bin"));
    }

    #[test]
    fn test_bitcode_failure_maps_to_decode() {
        let err: SaveError = bitcode::decode::<u64>(&[])
            .map(|_| ())
            .expect_err("empty buffer holds no u64")
            .into();
        assert!(matches!(err, SaveError::Decode(_)));
        assert!(err.to_string().starts_with("Structure records unreadable"));
    }
}
