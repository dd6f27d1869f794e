use super::fixtures::{empty_world, populated_world};
use crate::file_header::HEADER_SIZE;
use crate::{build_save_data, load_world_from_bytes, save_world_to_bytes, SaveError};

#[test]
fn test_compressed_and_plain_files_load_the_same_world() {
    let (mut source, _) = populated_world();
    let plain = save_world_to_bytes(source.world_mut(), false).unwrap();
    let compressed = save_world_to_bytes(source.world_mut(), true).unwrap();

    let (mut a, _, _) = empty_world();
    let (mut b, _, _) = empty_world();
    load_world_from_bytes(a.world_mut(), &plain).unwrap();
    load_world_from_bytes(b.world_mut(), &compressed).unwrap();

    assert_eq!(
        build_save_data(a.world_mut()).unwrap(),
        build_save_data(b.world_mut()).unwrap()
    );
}

#[test]
fn test_damaged_payload_is_rejected_before_touching_world() {
    let (mut source, ids) = populated_world();
    let mut bytes = save_world_to_bytes(source.world_mut(), false).unwrap();
    bytes[HEADER_SIZE + 3] ^= 0xFF;

    let err = load_world_from_bytes(source.world_mut(), &bytes).unwrap_err();
    assert!(matches!(err, SaveError::Corrupted(_)), "got: {err}");
    assert_eq!(source.store().len(), ids.len());
}

#[test]
fn test_truncated_file_is_rejected() {
    let (mut source, _) = populated_world();
    let bytes = save_world_to_bytes(source.world_mut(), true).unwrap();

    let (mut target, _, _) = empty_world();
    assert!(load_world_from_bytes(target.world_mut(), &bytes[..HEADER_SIZE - 4]).is_err());
    assert!(load_world_from_bytes(target.world_mut(), &bytes[..bytes.len() - 8]).is_err());
    assert!(target.store().is_empty());
}

#[test]
fn test_save_file_is_written_atomically() {
    let path = std::env::temp_dir().join("structure_envelope_file.sav");
    let (mut source, ids) = populated_world();
    let written = crate::save_world_to_file(source.world_mut(), &path, true).unwrap();
    assert_eq!(std::fs::metadata(&path).map(|m| m.len() as usize).ok(), Some(written));

    let (mut target, _, _) = empty_world();
    let report = crate::load_world_from_file(target.world_mut(), &path).unwrap();
    assert_eq!(report.restore.restored, ids.len());
    let _ = std::fs::remove_file(&path);
}
