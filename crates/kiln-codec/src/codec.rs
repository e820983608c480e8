//! The contract shared by every format codec.

use std::fs::{self, File};
use std::path::Path;

use kiln_common::Endian;
use memmap2::Mmap;

use crate::{Error, ReaderSession, SessionOptions, WriterSession};

/// Memory-map the file at `path` and hand its bytes to `body`.
///
/// The mapping is released when this returns, on success or failure.
pub fn with_mapped_file<T, E>(
    path: impl AsRef<Path>,
    body: impl FnOnce(&[u8]) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<std::io::Error>,
{
    let file = File::open(path)?;
    // SAFETY: the map is read-only and dropped before returning; callers
    // must not truncate the file concurrently.
    let mmap = unsafe { Mmap::map(&file)? };
    body(&mmap)
}

/// A binary asset format built on reader and writer sessions.
///
/// Implementors describe the layout after the signature; the provided
/// methods handle signature checks, session setup and file access.
pub trait Codec: Sized {
    /// Magic bytes at offset 0.
    const SIGNATURE: &'static [u8];

    /// Byte order of the format.
    const ENDIAN: Endian = Endian::Little;

    /// Format-level error; must absorb core and I/O errors.
    type Error: From<Error> + From<std::io::Error>;

    /// Options used to start a read session. Version-dependent settings can
    /// be changed on the session once the header has been read.
    fn read_options() -> SessionOptions {
        SessionOptions::default().with_endian(Self::ENDIAN)
    }

    /// Options used to encode this value.
    fn session_options(&self) -> SessionOptions;

    /// Decode everything after the signature.
    fn read_body(r: &mut ReaderSession<'_>) -> Result<Self, Self::Error>;

    /// Encode everything after the signature. The session is finalized by
    /// the caller.
    fn write_body(&self, w: &mut WriterSession) -> Result<(), Self::Error>;

    /// Whether `data` starts with this format's signature.
    fn matches(data: &[u8]) -> bool {
        data.starts_with(Self::SIGNATURE)
    }

    /// Decode a complete file from memory.
    fn decode(data: &[u8]) -> Result<Self, Self::Error> {
        let options = Self::read_options();
        let mut session = ReaderSession::new(data, &options);
        session.expect_signature(Self::SIGNATURE)?;

        tracing::debug!(
            signature = %String::from_utf8_lossy(Self::SIGNATURE),
            bytes = data.len(),
            "decoding"
        );
        let value = Self::read_body(&mut session)?;
        tracing::debug!(jumps = session.jumps(), "decoded");
        Ok(value)
    }

    /// Encode to a complete file in memory.
    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        let mut session = WriterSession::new(self.session_options());
        session.write_signature(Self::SIGNATURE);
        self.write_body(&mut session)?;
        Ok(session.finish()?)
    }

    /// Decode a file from disk (memory-mapped for zero-copy).
    fn open<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error> {
        with_mapped_file(path, Self::decode)
    }

    /// Encode and write to disk.
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Self::Error> {
        let bytes = self.encode()?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{read_block, reserve_block, write_block_body};
    use crate::Result;

    #[derive(Debug, PartialEq)]
    struct Tiny {
        label: String,
        values: Vec<u32>,
    }

    impl Codec for Tiny {
        const SIGNATURE: &'static [u8] = b"TINY";
        type Error = Error;

        fn session_options(&self) -> SessionOptions {
            SessionOptions::default().with_alignment(8)
        }

        fn read_body(r: &mut ReaderSession<'_>) -> Result<Self> {
            let label = r.read_string()?;
            let values = read_block(r)?;
            Ok(Self { label, values })
        }

        fn write_body(&self, w: &mut WriterSession) -> Result<()> {
            w.write_string(&self.label)?;
            let block = reserve_block(w, self.values.len())?;
            write_block_body(w, block, &self.values, 4)
        }
    }

    fn sample() -> Tiny {
        Tiny {
            label: "tiny".into(),
            values: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_round_trip_in_memory() {
        let bytes = sample().encode().unwrap();
        assert!(Tiny::matches(&bytes));
        assert_eq!(bytes.len() % 8, 0);
        assert_eq!(Tiny::decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.tiny");

        sample().save(&path).unwrap();
        assert_eq!(Tiny::open(&path).unwrap(), sample());
    }

    #[test]
    fn test_signature_checked_first() {
        let mut bytes = sample().encode().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            Tiny::decode(&bytes),
            Err(Error::SignatureMismatch { .. })
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Tiny::open(dir.path().join("absent.tiny")),
            Err(Error::Io(_))
        ));
    }
}
