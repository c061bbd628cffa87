// crates/geoimport-core/src/lib.rs

pub mod common;
pub mod config;
pub mod error;
pub mod hooks;
pub mod importer; // Per-kind state machines
pub mod index;
pub mod loader; // Line source, gzip, freshness
pub mod model;
pub mod pipeline; // The orchestrator
pub mod plugin;
pub mod resolve;
pub mod store;
pub mod text;
pub mod traits;

// Re-exports
pub use crate::common::{DbStats, Outcome, SkipReason, StageReport};
pub use crate::config::{CountryMode, ImportConfig, MetroRule, SourceFile, SourceKey};
pub use crate::error::{ImportError, Result};
pub use crate::hooks::{HookError, HookName, HookRegistry, HookResult, Plugin};
pub use crate::index::ReferenceIndex;
pub use crate::loader::{FreshnessGate, LineSource, Offline, RemoteMeta, RemoteSource};
pub use crate::pipeline::{Pipeline, PipelineReport, Stage};
pub use crate::plugin::load_plugins;
pub use crate::resolve::{HierarchyResolver, ParentKey};
pub use crate::store::{CompressionMode, MemoryStore};
pub use crate::traits::{EntityStore, ScanFilter};

#[cfg(feature = "fetch")]
pub use crate::loader::HttpSource;

// Export the Model Types
pub use model::{
    AlternateName, City, Country, District, Entity, Fields, GeoId, GeoPoint, Identity,
    NaturalKey, OwnerRef, PlaceKind, PostalCode, Region, Subregion,
};
