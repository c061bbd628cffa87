// crates/geoimport-core/src/store/memory.rs
use crate::common::DbStats;
use crate::error::{ImportError, Result};
use crate::model::{Entity, GeoId, Identity, NaturalKey, PlaceKind};
use crate::traits::{EntityStore, ScanFilter};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Rows of one kind plus their lookup indexes.
///
/// Primary keys are monotonic, so iterating `rows` yields insertion order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Table {
    rows: BTreeMap<u64, Entity>,
    by_geo: HashMap<GeoId, u64>,
    by_key: HashMap<NaturalKey, u64>,
}

impl Table {
    fn existing_pk(&self, entity: &Entity) -> Option<u64> {
        entity
            .geo_id()
            .and_then(|id| self.by_geo.get(&id).copied())
            .or_else(|| self.by_key.get(&entity.natural_key()).copied())
    }

    fn unindex(&mut self, pk: u64) -> Option<Entity> {
        let old = self.rows.remove(&pk)?;
        if let Some(id) = old.geo_id() {
            if self.by_geo.get(&id) == Some(&pk) {
                self.by_geo.remove(&id);
            }
        }
        let key = old.natural_key();
        if self.by_key.get(&key) == Some(&pk) {
            self.by_key.remove(&key);
        }
        Some(old)
    }

    fn insert(&mut self, entity: Entity) {
        let pk = entity.pk();
        if let Some(id) = entity.geo_id() {
            self.by_geo.insert(id, pk);
        }
        self.by_key.insert(entity.natural_key(), pk);
        self.rows.insert(pk, entity);
    }
}

/// In-process entity store.
///
/// Used by the CLI (persisted between runs as a snapshot, see
/// [`MemoryStore::save_as`]) and by the test-suite.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    tables: BTreeMap<PlaceKind, Table>,
    next_pk: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: PlaceKind) -> Option<&Table> {
        self.tables.get(&kind)
    }

    /// Full entity by GeoID.
    pub fn get(&self, kind: PlaceKind, geo_id: GeoId) -> Option<&Entity> {
        let table = self.table(kind)?;
        let pk = table.by_geo.get(&geo_id)?;
        table.rows.get(pk)
    }

    /// Full entity by natural key.
    pub fn get_by_key(&self, key: &NaturalKey) -> Option<&Entity> {
        let table = self.table(key.kind())?;
        let pk = match key {
            NaturalKey::Geo(_, id) => table.by_geo.get(id)?,
            _ => table.by_key.get(key)?,
        };
        table.rows.get(pk)
    }

    /// Every stored entity of `kind`, in insertion order.
    pub fn entities(&self, kind: PlaceKind) -> impl Iterator<Item = &Entity> + '_ {
        self.table(kind).into_iter().flat_map(|t| t.rows.values())
    }

    pub fn count(&self, kind: PlaceKind) -> usize {
        self.table(kind).map_or(0, |t| t.rows.len())
    }
}

impl EntityStore for MemoryStore {
    fn find_by_natural_key(&self, key: &NaturalKey) -> Option<Identity> {
        self.get_by_key(key).map(Entity::identity)
    }

    fn find_by_geo_id(&self, kind: PlaceKind, geo_id: GeoId) -> Option<Identity> {
        self.get(kind, geo_id).map(Entity::identity)
    }

    fn upsert(&mut self, mut entity: Entity) -> Result<Identity> {
        let table = self.tables.entry(entity.kind()).or_default();

        let pk = match table.existing_pk(&entity) {
            Some(pk) => {
                table.unindex(pk);
                pk
            }
            None => {
                self.next_pk = self
                    .next_pk
                    .checked_add(1)
                    .ok_or_else(|| ImportError::InvalidData("primary key space exhausted".into()))?;
                self.next_pk
            }
        };

        entity.set_pk(pk);
        let identity = entity.identity();
        table.insert(entity);
        Ok(identity)
    }

    fn bulk_scan(&self, kind: PlaceKind, filter: &ScanFilter) -> Vec<Identity> {
        self.entities(kind)
            .map(Entity::identity)
            .filter(|id| filter.matches(id))
            .collect()
    }

    fn remove(&mut self, kind: PlaceKind, geo_id: GeoId) -> Result<bool> {
        let Some(table) = self.tables.get_mut(&kind) else {
            return Ok(false);
        };
        match table.by_geo.get(&geo_id).copied() {
            Some(pk) => Ok(table.unindex(pk).is_some()),
            None => Ok(false),
        }
    }

    fn stats(&self) -> DbStats {
        DbStats {
            countries: self.count(PlaceKind::Country),
            regions: self.count(PlaceKind::Region),
            subregions: self.count(PlaceKind::Subregion),
            cities: self.count(PlaceKind::City),
            districts: self.count(PlaceKind::District),
            alt_names: self.count(PlaceKind::AlternateName),
            postal_codes: self.count(PlaceKind::PostalCode),
        }
    }
}
