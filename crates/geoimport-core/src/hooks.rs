// crates/geoimport-core/src/hooks.rs
//! Per-stage plugin hooks.
//!
//! A plugin declares the hooks it implements through [`Plugin::hooks`];
//! the registry files it under each of them once, at registration time.
//! Invocation follows registration order and stops at the first skip.

use crate::common::{Outcome, SkipReason};
use crate::error::{ImportError, Result};
use crate::model::{Entity, Fields, PlaceKind};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookName {
    CountryPre,
    CountryPost,
    RegionPre,
    RegionPost,
    SubregionPre,
    SubregionPost,
    CityPre,
    CityPost,
    DistrictPre,
    DistrictPost,
    AltNamePre,
    AltNamePost,
    PostalCodePre,
    PostalCodePost,
}

impl HookName {
    pub const ALL: [HookName; 14] = [
        HookName::CountryPre,
        HookName::CountryPost,
        HookName::RegionPre,
        HookName::RegionPost,
        HookName::SubregionPre,
        HookName::SubregionPost,
        HookName::CityPre,
        HookName::CityPost,
        HookName::DistrictPre,
        HookName::DistrictPost,
        HookName::AltNamePre,
        HookName::AltNamePost,
        HookName::PostalCodePre,
        HookName::PostalCodePost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookName::CountryPre => "country_pre",
            HookName::CountryPost => "country_post",
            HookName::RegionPre => "region_pre",
            HookName::RegionPost => "region_post",
            HookName::SubregionPre => "subregion_pre",
            HookName::SubregionPost => "subregion_post",
            HookName::CityPre => "city_pre",
            HookName::CityPost => "city_post",
            HookName::DistrictPre => "district_pre",
            HookName::DistrictPost => "district_post",
            HookName::AltNamePre => "alt_name_pre",
            HookName::AltNamePost => "alt_name_post",
            HookName::PostalCodePre => "postal_code_pre",
            HookName::PostalCodePost => "postal_code_post",
        }
    }

    /// The `(pre, post)` pair of an entity kind.
    pub fn pair(kind: PlaceKind) -> (HookName, HookName) {
        match kind {
            PlaceKind::Country => (HookName::CountryPre, HookName::CountryPost),
            PlaceKind::Region => (HookName::RegionPre, HookName::RegionPost),
            PlaceKind::Subregion => (HookName::SubregionPre, HookName::SubregionPost),
            PlaceKind::City => (HookName::CityPre, HookName::CityPost),
            PlaceKind::District => (HookName::DistrictPre, HookName::DistrictPost),
            PlaceKind::AlternateName => (HookName::AltNamePre, HookName::AltNamePost),
            PlaceKind::PostalCode => (HookName::PostalCodePre, HookName::PostalCodePost),
        }
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a hook may signal besides success.
#[derive(Debug, Error)]
pub enum HookError {
    /// Drop the current record, optionally saying why.
    #[error("skip")]
    Skip(Option<String>),
    /// Abort the run.
    #[error("{0}")]
    Fatal(String),
}

impl HookError {
    pub fn skip(reason: impl Into<String>) -> Self {
        HookError::Skip(Some(reason.into()))
    }
}

pub type HookResult = std::result::Result<(), HookError>;

/// A per-record customization.
///
/// Only the hooks returned by [`Plugin::hooks`] are ever invoked.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Hooks this plugin implements.
    fn hooks(&self) -> &[HookName];

    /// Runs before PARSE with the raw fields, which it may rewrite.
    fn pre(&self, _hook: HookName, _fields: &mut Fields) -> HookResult {
        Ok(())
    }

    /// Runs after RESOLVE with the built entity and the raw fields.
    fn post(&self, _hook: HookName, _entity: &mut Entity, _fields: &Fields) -> HookResult {
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: BTreeMap<HookName, Vec<Arc<dyn Plugin>>>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (hook, plugins) in &self.hooks {
            let names: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
            map.entry(&hook.as_str(), &names);
        }
        map.finish()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files `plugin` under every hook it declares, after the plugins
    /// already registered there.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        for hook in plugin.hooks() {
            let slot = self.hooks.entry(*hook).or_default();
            if !slot.iter().any(|p| Arc::ptr_eq(p, &plugin)) {
                slot.push(Arc::clone(&plugin));
            }
        }
    }

    pub fn len(&self, hook: HookName) -> usize {
        self.hooks.get(&hook).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.values().all(Vec::is_empty)
    }

    fn plugins(&self, hook: HookName) -> &[Arc<dyn Plugin>] {
        self.hooks.get(&hook).map_or(&[][..], Vec::as_slice)
    }

    pub fn run_pre(&self, hook: HookName, fields: &mut Fields) -> Result<Outcome<()>> {
        for plugin in self.plugins(hook) {
            if let Err(e) = plugin.pre(hook, fields) {
                return settle(hook, plugin.as_ref(), e);
            }
        }
        Ok(Outcome::Ok(()))
    }

    pub fn run_post(
        &self,
        hook: HookName,
        entity: &mut Entity,
        fields: &Fields,
    ) -> Result<Outcome<()>> {
        for plugin in self.plugins(hook) {
            if let Err(e) = plugin.post(hook, entity, fields) {
                return settle(hook, plugin.as_ref(), e);
            }
        }
        Ok(Outcome::Ok(()))
    }
}

fn settle(hook: HookName, plugin: &dyn Plugin, err: HookError) -> Result<Outcome<()>> {
    match err {
        HookError::Skip(reason) => Ok(Outcome::Skip(SkipReason::Hook(reason))),
        HookError::Fatal(message) => Err(ImportError::Hook {
            hook: hook.as_str().to_owned(),
            plugin: plugin.name().to_owned(),
            message,
        }),
    }
}
