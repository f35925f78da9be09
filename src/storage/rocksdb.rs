//! RocksDB-backed key-value store.
//!
//! The snapshot adapter only ever touches a single key, so this store
//! uses the default column family with a small, local-workload
//! configuration.

use crate::error::{ChirpError, Result};
use crate::storage::SnapshotStore;
use rocksdb::{Options, DB};
use std::path::Path;
use tracing::trace;

/// Configuration for the RocksDB store.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Maximum number of open files.
    pub max_open_files: i32,
    /// Number of log files to keep.
    pub keep_log_file_num: usize,
    /// Maximum WAL size in bytes.
    pub max_wal_size: u64,
    /// Write buffer size in bytes.
    pub write_buffer_size: usize,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            max_open_files: 64,
            keep_log_file_num: 2,
            max_wal_size: 8 * 1024 * 1024,     // 8MB
            write_buffer_size: 8 * 1024 * 1024, // 8MB
        }
    }
}

impl RocksDbConfig {
    /// Builds RocksDB options from this configuration.
    pub fn build_options(&self) -> Options {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_max_open_files(self.max_open_files);
        opts.set_keep_log_file_num(self.keep_log_file_num);
        opts.set_max_total_wal_size(self.max_wal_size);
        opts.increase_parallelism(num_cpus::get() as i32);
        opts.set_write_buffer_size(self.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }
}

/// Durable key-value store backed by RocksDB.
pub struct RocksDbStore {
    db: DB,
}

impl RocksDbStore {
    /// Opens (creating if missing) a database at the given path.
    pub fn open(db_path: impl AsRef<Path>, config: &RocksDbConfig) -> Result<Self> {
        let opts = config.build_options();
        let db = DB::open(&opts, db_path.as_ref())
            .map_err(|e| ChirpError::storage(format!("Failed to open RocksDB: {}", e)))?;
        Ok(Self { db })
    }
}

impl SnapshotStore for RocksDbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.db.get(key.as_bytes()) {
            Ok(Some(bytes)) => {
                trace!(key, value_bytes = bytes.len(), "db_get: found record");
                Ok(Some(bytes))
            }
            Ok(None) => {
                trace!(key, "db_get: key not found");
                Ok(None)
            }
            Err(e) => Err(ChirpError::storage(format!("Failed to read: {}", e))),
        }
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        trace!(key, value_bytes = value.len(), "db_put: storing value");
        self.db
            .put(key.as_bytes(), value)
            .map_err(|e| ChirpError::storage(format!("Failed to write: {}", e)))
    }
}
