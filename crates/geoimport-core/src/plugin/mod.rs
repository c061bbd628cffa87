// crates/geoimport-core/src/plugin/mod.rs

//! # Built-in plugins
//!
//! Resolves configured plugin names and registers them, in order, into a
//! [`HookRegistry`]. Library users can register their own [`Plugin`]s
//! alongside these.
//!
//! [`Plugin`]: crate::hooks::Plugin

mod postal_code_ca;
mod reset_cache;

pub use postal_code_ca::PostalCodeCa;
pub use reset_cache::{ResetAction, ResetCache};

use crate::config::ImportConfig;
use crate::error::{ImportError, Result};
use crate::hooks::{HookRegistry, Plugin};
use std::sync::Arc;

pub const BUILTIN: [&str; 2] = [PostalCodeCa::NAME, ResetCache::NAME];

/// Instantiates one built-in plugin by name.
pub fn builtin(name: &str, config: &ImportConfig) -> Result<Arc<dyn Plugin>> {
    match name {
        PostalCodeCa::NAME => Ok(Arc::new(PostalCodeCa)),
        ResetCache::NAME => Ok(Arc::new(ResetCache::new(config.reset_chance))),
        other => Err(ImportError::Config(format!(
            "unknown plugin '{other}' (available: {})",
            BUILTIN.join(", ")
        ))),
    }
}

/// Builds a registry from `names`, in the given order.
pub fn load_plugins<S: AsRef<str>>(names: &[S], config: &ImportConfig) -> Result<HookRegistry> {
    let mut registry = HookRegistry::new();
    for name in names {
        let plugin = builtin(name.as_ref().trim(), config)?;
        tracing::debug!(plugin = plugin.name(), hooks = ?plugin.hooks(), "plugin registered");
        registry.register(plugin);
    }
    Ok(registry)
}
