// crates/geoimport-core/src/model/domain.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable numeric identifier assigned by GeoNames.
pub type GeoId = u64;

/// Mean earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.009;

/// Every entity kind the pipeline writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    Country,
    Region,
    Subregion,
    City,
    District,
    AlternateName,
    PostalCode,
}

impl PlaceKind {
    /// Kinds an alternate name may belong to, in lookup order.
    pub const PLACES: [PlaceKind; 5] = [
        PlaceKind::Country,
        PlaceKind::Region,
        PlaceKind::Subregion,
        PlaceKind::City,
        PlaceKind::District,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceKind::Country => "country",
            PlaceKind::Region => "region",
            PlaceKind::Subregion => "subregion",
            PlaceKind::City => "city",
            PlaceKind::District => "district",
            PlaceKind::AlternateName => "alt_name",
            PlaceKind::PostalCode => "postal_code",
        }
    }
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in kilometres (haversine, spherical earth).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_KM * c
    }
}

/// A Country entry. Root of the hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// Storage-assigned primary key (0 until stored).
    pub pk: u64,
    pub geo_id: GeoId,
    pub code: String,  // e.g. "FR"
    pub code3: String, // e.g. "FRA"
    pub name: String,
    pub ascii_name: String,
    pub slug: String,
    pub population: u64,
    pub continent: String,
    /// Top-level domain without the leading dot.
    pub tld: String,
    pub capital: Option<String>,
    pub currency: Option<String>,
    pub phone: Option<String>,
    pub languages: Vec<String>,
}

/// Admin level 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub pk: u64,
    pub geo_id: GeoId,
    /// Composite code, e.g. "FR.A8".
    pub code: String,
    pub name: String,
    pub ascii_name: String,
    pub slug: String,
    pub country: GeoId,
}

/// Admin level 2.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subregion {
    pub pk: u64,
    pub geo_id: GeoId,
    /// Composite code, e.g. "FR.A8.16".
    pub code: String,
    pub name: String,
    pub ascii_name: String,
    pub slug: String,
    pub region: GeoId,
    pub country: GeoId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub pk: u64,
    pub geo_id: GeoId,
    pub name: String,
    pub ascii_name: String,
    pub slug: String,
    pub location: GeoPoint,
    pub population: u64,
    pub elevation: Option<i32>,
    pub feature_code: String,
    pub timezone: String,
    pub country: GeoId,
    /// Immediate parent links; both may be missing.
    pub region: Option<GeoId>,
    pub subregion: Option<GeoId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub pk: u64,
    pub geo_id: GeoId,
    pub name: String,
    pub ascii_name: String,
    pub slug: String,
    pub location: GeoPoint,
    pub population: u64,
    pub city: GeoId,
    pub country: GeoId,
}

/// Polymorphic owner of an [`AlternateName`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    pub kind: PlaceKind,
    pub geo_id: GeoId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlternateName {
    pub pk: u64,
    /// GeoNames' alternateNameId.
    pub geo_id: GeoId,
    pub owner: OwnerRef,
    /// Lower-cased language code, `und` when the source has none.
    pub language: String,
    pub name: String,
    pub is_preferred: bool,
    pub is_short: bool,
    pub is_colloquial: bool,
    pub is_historic: bool,
}

/// Postal code row. Upstream has no GeoID for these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostalCode {
    pub pk: u64,
    pub country: GeoId,
    pub code: String,
    pub name: String,
    pub region_name: String,
    pub subregion_name: String,
    pub district_name: String,
    pub location: Option<GeoPoint>,
    pub region: Option<GeoId>,
    pub subregion: Option<GeoId>,
}

/// Upsert match key within a kind's declared scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NaturalKey {
    Country(String),
    Region { country: GeoId, code: String },
    Subregion { region: GeoId, code: String },
    Geo(PlaceKind, GeoId),
    PostalCode { country: GeoId, code: String },
}

impl NaturalKey {
    pub fn kind(&self) -> PlaceKind {
        match self {
            NaturalKey::Country(_) => PlaceKind::Country,
            NaturalKey::Region { .. } => PlaceKind::Region,
            NaturalKey::Subregion { .. } => PlaceKind::Subregion,
            NaturalKey::Geo(kind, _) => *kind,
            NaturalKey::PostalCode { .. } => PlaceKind::PostalCode,
        }
    }
}

/// Lightweight record used for foreign-key assignment and
/// nearest-neighbour search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub kind: PlaceKind,
    pub pk: u64,
    pub geo_id: Option<GeoId>,
    /// Country code2, composite admin code or postal code.
    pub code: Option<String>,
    pub name: String,
    pub country: Option<GeoId>,
    pub region: Option<GeoId>,
    pub subregion: Option<GeoId>,
    pub location: Option<GeoPoint>,
    pub population: u64,
}

/// Any entity the pipeline can write, as handed to post-hooks and the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Country(Country),
    Region(Region),
    Subregion(Subregion),
    City(City),
    District(District),
    AlternateName(AlternateName),
    PostalCode(PostalCode),
}

impl Entity {
    pub fn kind(&self) -> PlaceKind {
        match self {
            Entity::Country(_) => PlaceKind::Country,
            Entity::Region(_) => PlaceKind::Region,
            Entity::Subregion(_) => PlaceKind::Subregion,
            Entity::City(_) => PlaceKind::City,
            Entity::District(_) => PlaceKind::District,
            Entity::AlternateName(_) => PlaceKind::AlternateName,
            Entity::PostalCode(_) => PlaceKind::PostalCode,
        }
    }

    pub fn geo_id(&self) -> Option<GeoId> {
        match self {
            Entity::Country(c) => Some(c.geo_id),
            Entity::Region(r) => Some(r.geo_id),
            Entity::Subregion(s) => Some(s.geo_id),
            Entity::City(c) => Some(c.geo_id),
            Entity::District(d) => Some(d.geo_id),
            Entity::AlternateName(a) => Some(a.geo_id),
            Entity::PostalCode(_) => None,
        }
    }

    pub fn natural_key(&self) -> NaturalKey {
        match self {
            Entity::Country(c) => NaturalKey::Country(c.code.clone()),
            Entity::Region(r) => NaturalKey::Region {
                country: r.country,
                code: r.code.clone(),
            },
            Entity::Subregion(s) => NaturalKey::Subregion {
                region: s.region,
                code: s.code.clone(),
            },
            Entity::City(c) => NaturalKey::Geo(PlaceKind::City, c.geo_id),
            Entity::District(d) => NaturalKey::Geo(PlaceKind::District, d.geo_id),
            Entity::AlternateName(a) => NaturalKey::Geo(PlaceKind::AlternateName, a.geo_id),
            Entity::PostalCode(p) => NaturalKey::PostalCode {
                country: p.country,
                code: p.code.clone(),
            },
        }
    }

    pub fn pk(&self) -> u64 {
        match self {
            Entity::Country(c) => c.pk,
            Entity::Region(r) => r.pk,
            Entity::Subregion(s) => s.pk,
            Entity::City(c) => c.pk,
            Entity::District(d) => d.pk,
            Entity::AlternateName(a) => a.pk,
            Entity::PostalCode(p) => p.pk,
        }
    }

    pub fn set_pk(&mut self, pk: u64) {
        match self {
            Entity::Country(c) => c.pk = pk,
            Entity::Region(r) => r.pk = pk,
            Entity::Subregion(s) => s.pk = pk,
            Entity::City(c) => c.pk = pk,
            Entity::District(d) => d.pk = pk,
            Entity::AlternateName(a) => a.pk = pk,
            Entity::PostalCode(p) => p.pk = pk,
        }
    }

    /// Display name used in log lines.
    pub fn name(&self) -> &str {
        match self {
            Entity::Country(c) => &c.name,
            Entity::Region(r) => &r.name,
            Entity::Subregion(s) => &s.name,
            Entity::City(c) => &c.name,
            Entity::District(d) => &d.name,
            Entity::AlternateName(a) => &a.name,
            Entity::PostalCode(p) => &p.code,
        }
    }

    pub fn identity(&self) -> Identity {
        let base = Identity {
            kind: self.kind(),
            pk: self.pk(),
            geo_id: self.geo_id(),
            code: None,
            name: self.name().to_owned(),
            country: None,
            region: None,
            subregion: None,
            location: None,
            population: 0,
        };
        match self {
            Entity::Country(c) => Identity {
                code: Some(c.code.clone()),
                country: Some(c.geo_id),
                population: c.population,
                ..base
            },
            Entity::Region(r) => Identity {
                code: Some(r.code.clone()),
                country: Some(r.country),
                region: Some(r.geo_id),
                ..base
            },
            Entity::Subregion(s) => Identity {
                code: Some(s.code.clone()),
                country: Some(s.country),
                region: Some(s.region),
                subregion: Some(s.geo_id),
                ..base
            },
            Entity::City(c) => Identity {
                country: Some(c.country),
                region: c.region,
                subregion: c.subregion,
                location: Some(c.location),
                population: c.population,
                ..base
            },
            Entity::District(d) => Identity {
                country: Some(d.country),
                location: Some(d.location),
                population: d.population,
                ..base
            },
            Entity::AlternateName(_) => base,
            Entity::PostalCode(p) => Identity {
                code: Some(p.code.clone()),
                country: Some(p.country),
                region: p.region,
                subregion: p.subregion,
                location: p.location,
                ..base
            },
        }
    }
}
