//! CRC32C hashing utilities.
//!
//! CRC32C (Castagnoli) guards raw payload blobs inside container formats.

/// Compute CRC32C hash of a byte slice.
///
/// Uses hardware acceleration when available (SSE4.2 on x86).
#[inline]
pub fn hash_bytes(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hash() {
        assert_eq!(hash_bytes(&[]), 0);
    }

    #[test]
    fn test_known_hash() {
        // RFC 3720 check value for "123456789"
        assert_eq!(hash_bytes(b"123456789"), 0xE306_9283);
    }
}
