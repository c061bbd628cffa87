// crates/geoimport-core/src/importer/postal_code.rs
use super::{country_of, RecordImporter};
use crate::common::Outcome;
use crate::config::ImportConfig;
use crate::index::ReferenceIndex;
use crate::model::raw::postal_code as col;
use crate::model::{convert, Entity, Fields, GeoId, GeoPoint, PlaceKind, PostalCode};
use crate::resolve::{admin_keys, HierarchyResolver};
use crate::try_outcome;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct PostalRow {
    pub country_code: String,
    pub code: String,
    pub name: String,
    pub region_name: String,
    pub admin1: String,
    pub subregion_name: String,
    pub admin2: String,
    pub district_name: String,
    pub location: Option<GeoPoint>,
}

/// Postal export → [`PostalCode`].
///
/// Region and subregion links are optional: admin codes first, then the
/// admin links of the nearest large City when the row has a location.
pub struct PostalCodeImporter<'a> {
    config: &'a ImportConfig,
}

impl<'a> PostalCodeImporter<'a> {
    pub fn new(config: &'a ImportConfig) -> Self {
        Self { config }
    }

    fn admin_links(&self, row: &PostalRow, country: GeoId, index: &ReferenceIndex) -> (Option<GeoId>, Option<GeoId>) {
        let resolver = HierarchyResolver::new(index);
        let keys = admin_keys(&row.country_code, &row.admin1, &row.admin2);
        if let Some(parent) = resolver.resolve_parent(&keys) {
            return match parent.kind {
                PlaceKind::Subregion => (parent.region, parent.geo_id),
                _ => (parent.geo_id, None),
            };
        }

        let Some(location) = row.location else {
            return (None, None);
        };
        let floor = self.config.postal_population_floor;
        match resolver.resolve_nearest(&location, PlaceKind::City, floor, Some(country)) {
            Some((city, km)) => {
                warn!(
                    code = %row.code,
                    country = %row.country_code,
                    city = %city.name,
                    distance_km = km,
                    "postal code region taken from nearest city"
                );
                (city.region, city.subregion)
            }
            None => (None, None),
        }
    }
}

impl RecordImporter for PostalCodeImporter<'_> {
    type Parsed = PostalRow;

    fn kind(&self) -> PlaceKind {
        PlaceKind::PostalCode
    }

    fn select(&self, fields: &Fields) -> Outcome<()> {
        let cc = fields.get(col::COUNTRY_CODE);
        if self.config.accepts_postal_country(cc) {
            Outcome::Ok(())
        } else {
            Outcome::filtered(format!("postal codes of '{cc}' not selected"))
        }
    }

    fn parse(&self, fields: &Fields) -> Outcome<PostalRow> {
        let country_code = fields.get(col::COUNTRY_CODE);
        if country_code.is_empty() {
            return Outcome::missing("postal_code: empty country code");
        }
        let code = fields.get(col::CODE);
        if code.is_empty() {
            return Outcome::missing(format!("postal_code ({country_code}): empty code"));
        }
        let location = try_outcome!(convert::opt_point(fields, col::LATITUDE, col::LONGITUDE, "postal_code"));

        Outcome::Ok(PostalRow {
            country_code: country_code.to_owned(),
            code: code.to_owned(),
            name: fields.get(col::PLACE_NAME).to_owned(),
            region_name: fields.get(col::ADMIN1_NAME).to_owned(),
            admin1: fields.get(col::ADMIN1_CODE).to_owned(),
            subregion_name: fields.get(col::ADMIN2_NAME).to_owned(),
            admin2: fields.get(col::ADMIN2_CODE).to_owned(),
            district_name: fields.get(col::ADMIN3_NAME).to_owned(),
            location,
        })
    }

    fn resolve(&mut self, row: PostalRow, _fields: &Fields, index: &ReferenceIndex) -> Outcome<Entity> {
        let country = try_outcome!(country_of(index, &row.country_code, "postal_code"));
        let (region, subregion) = self.admin_links(&row, country, index);

        Outcome::Ok(Entity::PostalCode(PostalCode {
            pk: 0,
            country,
            code: row.code,
            name: row.name,
            region_name: row.region_name,
            subregion_name: row.subregion_name,
            district_name: row.district_name,
            location: row.location,
            region,
            subregion,
        }))
    }
}
