use std::io::{self, Read, Seek, SeekFrom};

/// Reads exactly `len` bytes from `reader` starting at the byte `offset`.
///
/// # Errors
///
/// Returns an `io::Error` if the seek fails or fewer than `len` bytes are available.
pub fn read_at<T: Read + Seek>(reader: &mut T, offset: u64, len: usize) -> io::Result<Vec<u8>> {
    let mut buffer = vec![0; len];

    reader.seek(SeekFrom::Start(offset))?;
    reader.read_exact(&mut buffer).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("Failed to read {len} bytes at offset {offset}: {err}"),
        )
    })?;

    Ok(buffer)
}

/// Extracts a little-endian 32-bit unsigned integer from a buffer at a given offset.
///
/// # Panics
///
/// Panics if the slice does not contain enough bytes starting from the offset.
pub fn u32_at(buffer: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    ])
}

/// Extracts a little-endian 16-bit unsigned integer from a buffer at a given offset.
///
/// # Panics
///
/// Panics if the slice does not contain enough bytes starting from the offset.
pub fn u16_at(buffer: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
}
