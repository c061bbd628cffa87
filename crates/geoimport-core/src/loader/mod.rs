// crates/geoimport-core/src/loader/mod.rs

//! # Data Loader
//!
//! Handles the physical layer (I/O, decompression, remote freshness) and
//! hands tab-separated records to the importers.

pub mod common_io;
pub mod freshness;
pub mod remote;
pub mod source;

pub use freshness::{FreshnessGate, RemoteMeta};
pub use remote::{Offline, RemoteSource};
pub use source::{LineSource, Records};

#[cfg(feature = "fetch")]
pub use remote::HttpSource;
