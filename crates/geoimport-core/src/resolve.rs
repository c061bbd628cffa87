// crates/geoimport-core/src/resolve.rs
//! Parent resolution: composite keys first, geography only on request.

use crate::index::ReferenceIndex;
use crate::model::{GeoId, GeoPoint, Identity, PlaceKind};
use crate::text::equals_folded;

/// One candidate parent key, e.g. `(Subregion, "FR.A8.16")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentKey {
    pub kind: PlaceKind,
    pub code: String,
}

impl ParentKey {
    pub fn new(kind: PlaceKind, code: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
        }
    }
}

/// Administrative parent keys of a record, most specific first.
///
/// Empty admin codes contribute no key; an admin2 without admin1 cannot
/// form a subregion code.
///
/// ```rust
/// use geoimport_core::model::PlaceKind;
/// use geoimport_core::resolve::admin_keys;
///
/// let keys = admin_keys("FR", "A8", "16");
/// assert_eq!(keys[0].kind, PlaceKind::Subregion);
/// assert_eq!(keys[0].code, "FR.A8.16");
/// assert_eq!(keys[1].code, "FR.A8");
/// ```
pub fn admin_keys(country: &str, admin1: &str, admin2: &str) -> Vec<ParentKey> {
    let mut keys = Vec::with_capacity(2);
    if country.is_empty() || admin1.is_empty() {
        return keys;
    }
    if !admin2.is_empty() {
        keys.push(ParentKey::new(
            PlaceKind::Subregion,
            format!("{country}.{admin1}.{admin2}"),
        ));
    }
    keys.push(ParentKey::new(PlaceKind::Region, format!("{country}.{admin1}")));
    keys
}

/// Read-only view over a built [`ReferenceIndex`].
#[derive(Clone, Copy)]
pub struct HierarchyResolver<'a> {
    index: &'a ReferenceIndex,
}

impl<'a> HierarchyResolver<'a> {
    pub fn new(index: &'a ReferenceIndex) -> Self {
        Self { index }
    }

    /// First key that hits the index, or `None`. Never consults geography.
    pub fn resolve_parent(&self, keys: &[ParentKey]) -> Option<&'a Identity> {
        keys.iter()
            .find_map(|key| self.index.lookup(key.kind, &key.code))
    }

    /// Nearest indexed `kind` with population strictly above
    /// `population_floor`, optionally restricted to one country.
    ///
    /// Distances are haversine great-circle kilometres. Ties keep the
    /// candidate seen first.
    pub fn resolve_nearest(
        &self,
        target: &GeoPoint,
        kind: PlaceKind,
        population_floor: u64,
        country: Option<GeoId>,
    ) -> Option<(&'a Identity, f64)> {
        let pool: Box<dyn Iterator<Item = &'a Identity> + 'a> = match country {
            Some(c) => Box::new(self.index.candidates_in(kind, c)),
            None => Box::new(self.index.candidates(kind).iter()),
        };

        let mut best: Option<(&'a Identity, f64)> = None;
        for candidate in pool.filter(|c| c.population > population_floor) {
            let Some(location) = candidate.location else {
                continue;
            };
            let d = target.distance_km(&location);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((candidate, d)),
            }
        }
        best
    }

    /// Highest-population indexed `kind` whose name folds equal to `name`.
    /// Ties keep the candidate seen first.
    pub fn resolve_named_max_population(
        &self,
        kind: PlaceKind,
        name: &str,
        country: Option<GeoId>,
    ) -> Option<&'a Identity> {
        let mut best: Option<&'a Identity> = None;
        for candidate in self.index.candidates(kind) {
            if country.is_some() && candidate.country != country {
                continue;
            }
            if !equals_folded(&candidate.name, name) {
                continue;
            }
            match best {
                Some(b) if candidate.population <= b.population => {}
                _ => best = Some(candidate),
            }
        }
        best
    }
}
