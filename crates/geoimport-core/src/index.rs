// crates/geoimport-core/src/index.rs
//! In-memory lookup maps over already-persisted entities.
//!
//! Each kind gets one entry, built by a single [`EntityStore::bulk_scan`]
//! and reused until the caller asks for a different [`ScanFilter`] or
//! invalidates it after writing new rows of that kind.

use crate::model::{GeoId, Identity, PlaceKind};
use crate::traits::{EntityStore, ScanFilter};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
struct IndexEntry {
    filter: ScanFilter,
    /// Scan order is preserved; the maps point into this vector.
    ordered: Vec<Identity>,
    by_code: HashMap<String, usize>,
    by_geo: HashMap<GeoId, usize>,
    by_country: HashMap<GeoId, Vec<usize>>,
}

impl IndexEntry {
    fn build(rows: Vec<Identity>, filter: ScanFilter) -> Self {
        let mut entry = IndexEntry {
            filter,
            ordered: rows,
            ..Default::default()
        };
        for (i, id) in entry.ordered.iter().enumerate() {
            // First-seen wins on duplicate keys.
            if let Some(code) = &id.code {
                entry.by_code.entry(code.clone()).or_insert(i);
            }
            if let Some(geo) = id.geo_id {
                entry.by_geo.entry(geo).or_insert(i);
            }
            if let Some(country) = id.country {
                entry.by_country.entry(country).or_default().push(i);
            }
        }
        entry
    }
}

/// Natural-key maps for every kind a stage resolves against.
///
/// Keys: Country by 2-letter code, Region by `"{country}.{admin1}"`,
/// Subregion by `"{country}.{admin1}.{admin2}"`, every kind by GeoID.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    entries: HashMap<PlaceKind, IndexEntry>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the entry for `kind` unless one already exists with the same
    /// filter. Returns the number of indexed rows.
    pub fn ensure<S>(&mut self, store: &S, kind: PlaceKind, filter: &ScanFilter) -> usize
    where
        S: EntityStore + ?Sized,
    {
        if let Some(entry) = self.entries.get(&kind) {
            if entry.filter == *filter {
                return entry.ordered.len();
            }
            debug!(%kind, "filter scope changed, rebuilding index");
        }

        let rows = store.bulk_scan(kind, filter);
        let entry = IndexEntry::build(rows, filter.clone());
        let len = entry.ordered.len();
        debug!(%kind, rows = len, "reference index built");
        self.entries.insert(kind, entry);
        len
    }

    /// Drops the entry so the next [`ensure`](Self::ensure) rescans.
    pub fn invalidate(&mut self, kind: PlaceKind) {
        self.entries.remove(&kind);
    }

    pub fn len(&self, kind: PlaceKind) -> usize {
        self.entries.get(&kind).map_or(0, |e| e.ordered.len())
    }

    /// Lookup by natural code. Missing entries and keys are `None`.
    pub fn lookup(&self, kind: PlaceKind, code: &str) -> Option<&Identity> {
        let entry = self.entries.get(&kind)?;
        entry.by_code.get(code).map(|&i| &entry.ordered[i])
    }

    pub fn lookup_geo(&self, kind: PlaceKind, geo_id: GeoId) -> Option<&Identity> {
        let entry = self.entries.get(&kind)?;
        entry.by_geo.get(&geo_id).map(|&i| &entry.ordered[i])
    }

    /// Every indexed identity of `kind`, in scan order.
    pub fn candidates(&self, kind: PlaceKind) -> &[Identity] {
        self.entries
            .get(&kind)
            .map_or(&[][..], |e| e.ordered.as_slice())
    }

    /// Indexed identities of `kind` belonging to `country`, in scan order.
    pub fn candidates_in(
        &self,
        kind: PlaceKind,
        country: GeoId,
    ) -> impl Iterator<Item = &Identity> + '_ {
        self.entries.get(&kind).into_iter().flat_map(move |e| {
            e.by_country
                .get(&country)
                .into_iter()
                .flatten()
                .map(move |&i| &e.ordered[i])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{City, Country, Entity, GeoPoint, Region};
    use crate::store::MemoryStore;

    fn seed() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .upsert(Entity::Country(Country {
                pk: 0,
                geo_id: 1,
                code: "FR".into(),
                code3: "FRA".into(),
                name: "France".into(),
                ascii_name: "France".into(),
                slug: "france".into(),
                population: 1,
                continent: "EU".into(),
                tld: "fr".into(),
                capital: None,
                currency: None,
                phone: None,
                languages: vec![],
            }))
            .unwrap();
        store
            .upsert(Entity::Region(Region {
                pk: 0,
                geo_id: 10,
                code: "FR.A8".into(),
                name: "Ile-de-France".into(),
                ascii_name: "Ile-de-France".into(),
                slug: "ile-de-france".into(),
                country: 1,
            }))
            .unwrap();
        for (geo_id, population) in [(100, 2_000_000), (101, 50_000)] {
            store
                .upsert(Entity::City(City {
                    pk: 0,
                    geo_id,
                    name: format!("c{geo_id}"),
                    ascii_name: format!("c{geo_id}"),
                    slug: format!("c{geo_id}"),
                    location: GeoPoint::new(48.0, 2.0),
                    population,
                    elevation: None,
                    feature_code: "PPL".into(),
                    timezone: String::new(),
                    country: 1,
                    region: Some(10),
                    subregion: None,
                }))
                .unwrap();
        }
        store
    }

    #[test]
    fn lookup_by_code_and_geo_id() {
        let store = seed();
        let mut index = ReferenceIndex::new();
        index.ensure(&store, PlaceKind::Country, &ScanFilter::all());
        index.ensure(&store, PlaceKind::Region, &ScanFilter::all());

        assert_eq!(index.lookup(PlaceKind::Country, "FR").unwrap().geo_id, Some(1));
        assert_eq!(index.lookup(PlaceKind::Region, "FR.A8").unwrap().geo_id, Some(10));
        assert!(index.lookup(PlaceKind::Region, "FR.11").is_none());
        assert!(index.lookup_geo(PlaceKind::Region, 10).is_some());
        // Unbuilt kinds answer not-found.
        assert!(index.lookup_geo(PlaceKind::City, 100).is_none());
    }

    #[test]
    fn same_filter_reuses_entry() {
        let mut store = seed();
        let mut index = ReferenceIndex::new();
        assert_eq!(index.ensure(&store, PlaceKind::City, &ScanFilter::all()), 2);

        store.remove(PlaceKind::City, 101).unwrap();
        // Still the cached scan.
        assert_eq!(index.ensure(&store, PlaceKind::City, &ScanFilter::all()), 2);

        index.invalidate(PlaceKind::City);
        assert_eq!(index.ensure(&store, PlaceKind::City, &ScanFilter::all()), 1);
    }

    #[test]
    fn changed_filter_rebuilds() {
        let store = seed();
        let mut index = ReferenceIndex::new();
        index.ensure(&store, PlaceKind::City, &ScanFilter::all());
        let n = index.ensure(&store, PlaceKind::City, &ScanFilter::population_above(100_000));
        assert_eq!(n, 1);
        assert_eq!(index.candidates(PlaceKind::City)[0].geo_id, Some(100));
        assert_eq!(index.candidates_in(PlaceKind::City, 1).count(), 1);
        assert_eq!(index.candidates_in(PlaceKind::City, 2).count(), 0);
    }
}
