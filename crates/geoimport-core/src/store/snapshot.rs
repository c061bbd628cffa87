// crates/geoimport-core/src/store/snapshot.rs
//! Binary snapshots of a [`MemoryStore`], so consecutive CLI runs upsert
//! into the previous state instead of starting empty.

use super::MemoryStore;
use crate::error::{ImportError, Result};
use crate::loader::common_io;
use bincode::Options;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "compact")]
use flate2::{write::GzEncoder, Compression};

/// Upper bound accepted when decoding a snapshot.
const SNAPSHOT_LIMIT: u64 = 4 * 1024 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub enum CompressionMode {
    Gzip,
    None,
}

impl CompressionMode {
    /// Gzip when the `compact` feature is on.
    pub fn preferred() -> Self {
        if cfg!(feature = "compact") {
            CompressionMode::Gzip
        } else {
            CompressionMode::None
        }
    }
}

impl MemoryStore {
    /// Writes the store to `path` (gzip-compressed when `compact` is on).
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        write_generic(path.as_ref(), self, CompressionMode::preferred())
    }

    /// Loads a snapshot written by [`MemoryStore::save_as`].
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = common_io::open_stream(path.as_ref())?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Loads `path` if it exists, otherwise returns an empty store.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::new())
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        bincode::DefaultOptions::new()
            .with_limit(SNAPSHOT_LIMIT)
            .allow_trailing_bytes()
            .deserialize(data)
            .map_err(ImportError::Bincode)
    }
}

/// Writes any serializable value to disk, optionally gzip-compressed.
fn write_generic<T: serde::Serialize>(
    path: &Path,
    value: &T,
    compression: CompressionMode,
) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder: Box<dyn Write> = match compression {
        CompressionMode::Gzip => {
            #[cfg(feature = "compact")]
            {
                Box::new(GzEncoder::new(writer, Compression::default()))
            }
            #[cfg(not(feature = "compact"))]
            {
                return Err(ImportError::InvalidData(
                    "Gzip requested but 'compact' disabled".into(),
                ));
            }
        }
        CompressionMode::None => Box::new(writer),
    };

    bincode::DefaultOptions::new()
        .serialize_into(&mut encoder, value)
        .map_err(ImportError::Bincode)?;
    encoder.flush()?;
    Ok(())
}
