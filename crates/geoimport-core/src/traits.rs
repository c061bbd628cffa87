// crates/geoimport-core/src/traits.rs
use crate::common::DbStats;
use crate::error::Result;
use crate::model::{Entity, GeoId, Identity, NaturalKey, PlaceKind};

/// Which persisted rows a bulk scan (and therefore a reference index)
/// covers.
///
/// An index built with one filter must be rebuilt before it is used with
/// another; see [`crate::index::ReferenceIndex::ensure`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilter {
    /// Keep only rows whose population is strictly greater.
    pub population_above: Option<u64>,
}

impl ScanFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn population_above(floor: u64) -> Self {
        Self {
            population_above: Some(floor),
        }
    }

    pub fn matches(&self, id: &Identity) -> bool {
        self.population_above
            .map_or(true, |floor| id.population > floor)
    }
}

/// Storage contract expected by the pipeline.
///
/// The pipeline needs no multi-record atomicity: each upsert is final once
/// it returns.
pub trait EntityStore {
    /// Look up a stored entity by its natural key.
    fn find_by_natural_key(&self, key: &NaturalKey) -> Option<Identity>;

    /// Look up a stored entity by its external GeoID.
    fn find_by_geo_id(&self, kind: PlaceKind, geo_id: GeoId) -> Option<Identity>;

    /// Insert, or update in place when the GeoID (then the natural key)
    /// already exists. The storage-assigned primary key is preserved.
    fn upsert(&mut self, entity: Entity) -> Result<Identity>;

    /// Minimal identity records of every stored entity of `kind` matching
    /// `filter`, in insertion order.
    fn bulk_scan(&self, kind: PlaceKind, filter: &ScanFilter) -> Vec<Identity>;

    /// Delete one entity. Only the legacy TLD country mode uses this.
    fn remove(&mut self, kind: PlaceKind, geo_id: GeoId) -> Result<bool>;

    fn stats(&self) -> DbStats;
}
