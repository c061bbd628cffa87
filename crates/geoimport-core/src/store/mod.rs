// crates/geoimport-core/src/store/mod.rs
//! Reference implementation of the storage contract.

mod memory;
mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::CompressionMode;
