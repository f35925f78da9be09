//! Storage abstractions.
//!
//! The persistence adapter writes the full state snapshot as one value
//! under one key, so the storage interface is a minimal byte-oriented
//! key-value store. Two implementations are provided:
//!
//! - `memory`: in-memory store for tests and embedding
//! - `rocksdb`: durable store for the CLI

pub mod memory;
pub mod rocksdb;

use crate::error::Result;

pub use memory::MemoryStore;
pub use rocksdb::{RocksDbConfig, RocksDbStore};

/// A byte-oriented key-value store the snapshot adapter writes through.
pub trait SnapshotStore {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: &[u8]) -> Result<()>;
}
