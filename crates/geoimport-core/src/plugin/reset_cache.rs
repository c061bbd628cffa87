// crates/geoimport-core/src/plugin/reset_cache.rs
use crate::hooks::{HookName, HookResult, Plugin};
use crate::model::{Entity, Fields};
use std::fmt;
use std::sync::Arc;

pub type ResetAction = Arc<dyn Fn() + Send + Sync>;

/// Runs a housekeeping callback on a tiny random fraction of committed
/// cities and districts.
pub struct ResetCache {
    chance: f64,
    action: ResetAction,
}

impl ResetCache {
    pub const NAME: &'static str = "reset_cache";

    /// `chance` is clamped to `[0, 1]`. The default action only logs.
    pub fn new(chance: f64) -> Self {
        Self::with_action(
            chance,
            Arc::new(|| tracing::debug!("reset_cache: housekeeping triggered")),
        )
    }

    pub fn with_action(chance: f64, action: ResetAction) -> Self {
        Self {
            chance: if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) },
            action,
        }
    }

    pub fn chance(&self) -> f64 {
        self.chance
    }
}

impl fmt::Debug for ResetCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetCache")
            .field("chance", &self.chance)
            .finish_non_exhaustive()
    }
}

impl Plugin for ResetCache {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn hooks(&self) -> &[HookName] {
        &[HookName::CityPost, HookName::DistrictPost]
    }

    fn post(&self, _hook: HookName, _entity: &mut Entity, _fields: &Fields) -> HookResult {
        if rand::random::<f64>() < self.chance {
            (self.action)();
        }
        Ok(())
    }
}
