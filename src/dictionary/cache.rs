//! Compiled dictionary cache.
//!
//! Parsing a large text dictionary and building its trie dominates start-up
//! time. A cache file stores the built [`Dictionary`] bincode-encoded behind a
//! small header, and is memory-mapped on load.
//!
//! Layout: `magic: u32 | version: u32 | bincode(Dictionary)`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use memmap2::MmapOptions;
use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::error::{QieError, Result};

/// "QIDC"
const CACHE_MAGIC: u32 = 0x5149_4443;
const CACHE_VERSION: u32 = 1;
const HEADER_LEN: usize = 8;

#[derive(Debug, Serialize, Deserialize)]
struct CacheHeader {
    magic: u32,
    version: u32,
}

impl Dictionary {
    /// Write this dictionary to a cache file.
    pub fn save_cache<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| QieError::cache(format!("Failed to create {}: {e}", path.display())))?;
        let mut writer = BufWriter::new(file);

        let header = CacheHeader {
            magic: CACHE_MAGIC,
            version: CACHE_VERSION,
        };
        bincode::serialize_into(&mut writer, &header)
            .map_err(|e| QieError::cache(format!("Failed to write header: {e}")))?;
        bincode::serialize_into(&mut writer, self)
            .map_err(|e| QieError::cache(format!("Failed to write dictionary: {e}")))?;
        writer.flush()?;

        log::info!("Wrote dictionary cache with {} words to {}", self.len(), path.display());
        Ok(())
    }

    /// Load a dictionary from a cache file written by [`Dictionary::save_cache`].
    pub fn load_cache<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| QieError::cache(format!("Failed to open {}: {e}", path.display())))?;

        let mmap = unsafe {
            MmapOptions::new()
                .map(&file)
                .map_err(|e| QieError::cache(format!("Failed to mmap {}: {e}", path.display())))?
        };

        if mmap.len() < HEADER_LEN {
            return Err(QieError::cache("File too small"));
        }

        let header: CacheHeader = bincode::deserialize(&mmap[..HEADER_LEN])
            .map_err(|e| QieError::cache(format!("Failed to read header: {e}")))?;
        if header.magic != CACHE_MAGIC {
            return Err(QieError::cache("Invalid cache magic number"));
        }
        if header.version != CACHE_VERSION {
            return Err(QieError::cache(format!(
                "Unsupported cache version {} (expected {})",
                header.version, CACHE_VERSION
            )));
        }

        let dictionary: Dictionary = bincode::deserialize(&mmap[HEADER_LEN..])
            .map_err(|e| QieError::cache(format!("Failed to decode dictionary: {e}")))?;

        log::info!(
            "Loaded {} words from dictionary cache {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryBuilder;
    use tempfile::TempDir;

    #[test]
    fn test_cache_roundtrip_preserves_lookups() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dict.cache");

        let mut builder = DictionaryBuilder::new();
        builder.add_word("长江", 6052).unwrap();
        builder.add_word("长江大桥", 2914).unwrap();
        let dict = builder.build();
        dict.save_cache(&path).unwrap();

        let loaded = Dictionary::load_cache(&path).unwrap();
        assert_eq!(loaded.get("长江大桥"), Some(2914));
        assert!(loaded.contains_prefix("长江大"));
        assert_eq!(loaded.total_freq(), dict.total_freq());
        assert_eq!(loaded.max_word_len(), 4);
    }

    #[test]
    fn test_bad_magic() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bogus.cache");
        std::fs::write(&path, b"not a dictionary cache").unwrap();

        let err = Dictionary::load_cache(&path).unwrap_err();
        assert!(matches!(err, QieError::Cache(_)));
    }

    #[test]
    fn test_truncated_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("short.cache");
        std::fs::write(&path, b"QI").unwrap();

        assert!(matches!(
            Dictionary::load_cache(&path),
            Err(QieError::Cache(_))
        ));
    }
}
