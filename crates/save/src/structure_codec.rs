// ---------------------------------------------------------------------------
// Structure save codec: bitcode payload inside the file envelope
// ---------------------------------------------------------------------------

use std::borrow::Cow;

use bevy::prelude::*;

use crate::file_header::{
    decompress_payload, unwrap_header, wrap_with_header, wrap_with_header_compressed,
    UnwrapResult,
};
use crate::save_error::SaveError;
use crate::save_types::StructureSaveData;

impl StructureSaveData {
    pub fn encode(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SaveError> {
        Ok(bitcode::decode(bytes)?)
    }
}

/// Encoded save with header, LZ4-compressed when `compress` is set.
pub fn encode_file(save: &StructureSaveData, compress: bool) -> Vec<u8> {
    let encoded = save.encode();
    if compress {
        wrap_with_header_compressed(&encoded)
    } else {
        wrap_with_header(&encoded)
    }
}

/// Validates the envelope and decodes the payload. Headerless buffers are
/// decoded as raw bitcode.
pub fn decode_file(bytes: &[u8]) -> Result<StructureSaveData, SaveError> {
    let payload: Cow<'_, [u8]> = match unwrap_header(bytes).map_err(SaveError::Corrupted)? {
        UnwrapResult::WithHeader { header, payload } => {
            debug!(
                "Structure save header: format v{}, flags {:#X}, timestamp {}, \
                 data size {}, checksum {:#010X}",
                header.format_version,
                header.flags,
                header.timestamp,
                header.uncompressed_size,
                header.checksum,
            );
            if header.is_compressed() {
                let data = decompress_payload(payload).map_err(SaveError::Corrupted)?;
                if data.len() != header.uncompressed_size as usize {
                    return Err(SaveError::Corrupted(format!(
                        "payload is {} bytes, header says {}",
                        data.len(),
                        header.uncompressed_size
                    )));
                }
                Cow::Owned(data)
            } else {
                Cow::Borrowed(payload)
            }
        }
        UnwrapResult::Headerless(payload) => {
            info!("Loading headerless structure save");
            Cow::Borrowed(payload)
        }
    };
    StructureSaveData::decode(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save_types::{SaveStructure, CURRENT_SCHEMA};

    fn sample() -> StructureSaveData {
        let mut save = StructureSaveData {
            version: CURRENT_SCHEMA,
            structures: (0..50)
                .map(|i| SaveStructure {
                    desc_name: "Cottage".into(),
                    x: i,
                    y: 2 * i,
                    construction_start: Some(i64::from(i) * 1000),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        save.extensions
            .insert("world_clock".into(), vec![1, 2, 3, 4]);
        save
    }

    #[test]
    fn test_plain_and_compressed_files_decode_identically() {
        let save = sample();
        let plain = decode_file(&encode_file(&save, false)).unwrap();
        let compressed = decode_file(&encode_file(&save, true)).unwrap();
        assert_eq!(plain, save);
        assert_eq!(compressed, save);
    }

    #[test]
    fn test_headerless_payload_decodes() {
        let save = sample();
        assert_eq!(decode_file(&save.encode()).unwrap(), save);
    }

    #[test]
    fn test_flipped_payload_byte_is_corrupted() {
        let mut bytes = encode_file(&sample(), true);
        let last = bytes.len() - 1;
        bytes[last] ^= 0x55;
        assert!(matches!(
            decode_file(&bytes),
            Err(SaveError::Corrupted(_))
        ));
    }

    #[test]
    fn test_truncated_headerless_payload_fails_to_decode() {
        let bytes = sample().encode();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(decode_file(truncated).is_err());
    }
}
