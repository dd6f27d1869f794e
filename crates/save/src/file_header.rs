// ---------------------------------------------------------------------------
// file_header – Structure save header with magic bytes, flags and checksum
// ---------------------------------------------------------------------------
//
// Header format (28 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "STRC"
//   [4..8]   Format version (u32)
//   [8..12]  Flags (u32: bit 0 = LZ4-compressed payload)
//   [12..20] Timestamp (Unix epoch, u64)
//   [20..24] Uncompressed payload size (u32)
//   [24..28] xxHash32 checksum of the stored payload (everything after the header)
//
// On save: encode -> optionally compress -> prepend header
// On load: check magic -> validate checksum -> strip header -> decompress
// Headerless: if the first 4 bytes are not the magic, the buffer is raw bitcode.

use xxhash_rust::xxh32::xxh32;

/// Magic bytes identifying a structure save.
pub const MAGIC: [u8; 4] = *b"STRC";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 28;

/// Version of the header layout itself, distinct from the record schema.
pub const HEADER_FORMAT_VERSION: u32 = 1;

/// Payload is LZ4 block data with a prepended size.
pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub timestamp: u64,
    pub uncompressed_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    /// Header for `payload` as stored; `uncompressed_size` is the size
    /// before compression.
    fn new(payload: &[u8], flags: u32, uncompressed_size: usize) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            format_version: HEADER_FORMAT_VERSION,
            flags,
            timestamp,
            uncompressed_size: u32::try_from(uncompressed_size).unwrap_or(u32::MAX),
            checksum: xxh32(payload, XXHASH_SEED),
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.format_version.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        out.extend_from_slice(&self.checksum.to_le_bytes());
    }
}

fn wrap(payload: &[u8], flags: u32, uncompressed_size: usize) -> Vec<u8> {
    let header = FileHeader::new(payload, flags, uncompressed_size);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    header.write(&mut out);
    out.extend_from_slice(payload);
    out
}

/// `[header] ++ data`, uncompressed.
pub fn wrap_with_header(data: &[u8]) -> Vec<u8> {
    wrap(data, 0, data.len())
}

/// `[header] ++ lz4(data)`.
pub fn wrap_with_header_compressed(data: &[u8]) -> Vec<u8> {
    let compressed = lz4_flex::compress_prepend_size(data);
    wrap(&compressed, FLAG_COMPRESSED, data.len())
}

/// Inverse of the compression applied by [`wrap_with_header_compressed`].
pub fn decompress_payload(payload: &[u8]) -> Result<Vec<u8>, String> {
    lz4_flex::decompress_size_prepended(payload)
        .map_err(|e| format!("LZ4 decompression failed: {e}"))
}

/// Result of unwrapping a save's bytes.
pub enum UnwrapResult<'a> {
    /// A valid header; the stored payload follows.
    WithHeader {
        header: FileHeader,
        payload: &'a [u8],
    },
    /// No header; the entire buffer is the payload.
    Headerless(&'a [u8]),
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

/// Parse and validate the header.
///
/// # Errors
///
/// Returns an error if:
/// - The magic is present but the buffer is shorter than a header
/// - The header format version is from a newer build
/// - The checksum does not match the payload
pub fn unwrap_header(bytes: &[u8]) -> Result<UnwrapResult<'_>, String> {
    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC {
        return Ok(UnwrapResult::Headerless(bytes));
    }

    if bytes.len() < HEADER_SIZE {
        return Err(format!(
            "save has STRC magic bytes but is too short ({} bytes, \
             need at least {} for header)",
            bytes.len(),
            HEADER_SIZE
        ));
    }

    let format_version = le_u32(bytes, 4);
    let flags = le_u32(bytes, 8);
    let mut ts = [0u8; 8];
    ts.copy_from_slice(&bytes[12..20]);
    let timestamp = u64::from_le_bytes(ts);
    let uncompressed_size = le_u32(bytes, 20);
    let checksum = le_u32(bytes, 24);

    if format_version > HEADER_FORMAT_VERSION {
        return Err(format!(
            "save uses header format version {}, but this build only supports \
             up to version {}",
            format_version, HEADER_FORMAT_VERSION,
        ));
    }

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != checksum {
        return Err(format!(
            "checksum mismatch (expected {:#010X}, got {:#010X})",
            checksum, computed,
        ));
    }

    Ok(UnwrapResult::WithHeader {
        header: FileHeader {
            format_version,
            flags,
            timestamp,
            uncompressed_size,
            checksum,
        },
        payload,
    })
}
