//! geoimport-rs
//! ============
//!
//! Workspace host for [`geoimport_core`]. Re-exports the core crate so the
//! demos under `demos/` can `use geoimport_rs::prelude::*`.

pub use geoimport_core::*;

pub mod prelude {
    pub use geoimport_core::{
        load_plugins, EntityStore, HookError, HookName, HookRegistry, HookResult, ImportConfig,
        ImportError, MemoryStore, Pipeline, PipelineReport, PlaceKind, Plugin, Result, Stage,
    };
}
