// crates/geoimport-core/src/importer/city.rs
use super::{country_of, RecordImporter};
use crate::common::Outcome;
use crate::config::ImportConfig;
use crate::index::ReferenceIndex;
use crate::model::raw::geoname as col;
use crate::model::{convert, City, Entity, Fields, GeoId, GeoPoint, PlaceKind};
use crate::resolve::{admin_keys, HierarchyResolver};
use crate::text;
use crate::try_outcome;
use tracing::warn;

/// A parsed line of a geoname dump, shared by cities and districts.
#[derive(Debug, Clone, PartialEq)]
pub struct GeonameRow {
    pub geo_id: GeoId,
    pub name: String,
    pub ascii_name: String,
    pub location: GeoPoint,
    pub population: u64,
    pub elevation: Option<i32>,
    pub feature_code: String,
    pub country_code: String,
    pub admin1: String,
    pub admin2: String,
    pub timezone: String,
}

pub(crate) fn parse_geoname(fields: &Fields, what: &str) -> Outcome<GeonameRow> {
    let geo_id = try_outcome!(convert::geo_id(fields, col::GEONAME_ID, what));
    let country_code = fields.get(col::COUNTRY_CODE);
    if country_code.is_empty() {
        return Outcome::missing(format!("{what} {geo_id}: empty country code"));
    }
    let name = fields.get(col::NAME);
    if name.is_empty() {
        return Outcome::invalid(format!("{what} {geo_id}: empty name"));
    }
    let location = try_outcome!(convert::point(fields, col::LATITUDE, col::LONGITUDE, what));
    let population = try_outcome!(convert::count(fields, col::POPULATION, what));
    let elevation = try_outcome!(convert::opt_int(fields, col::ELEVATION, what));

    Outcome::Ok(GeonameRow {
        geo_id,
        name: name.to_owned(),
        ascii_name: text::ascii_name(fields.get(col::ASCII_NAME), name),
        location,
        population,
        elevation,
        feature_code: fields.get(col::FEATURE_CODE).to_owned(),
        country_code: country_code.to_owned(),
        admin1: fields.get(col::ADMIN1).to_owned(),
        admin2: fields.get(col::ADMIN2).to_owned(),
        timezone: fields.get(col::TIMEZONE).to_owned(),
    })
}

/// True when the line belongs to a metro area whose members are districts.
pub(crate) fn is_metro_member(config: &ImportConfig, fields: &Fields) -> bool {
    let feature_code = fields.get(col::FEATURE_CODE);
    config
        .metro_rule(fields.get(col::COUNTRY_CODE), fields.get(col::ADMIN2))
        .is_some_and(|rule| rule.capital_code != feature_code && config.is_city_type(feature_code))
}

/// City dump → [`City`]. District lines of the same file are left to
/// [`super::DistrictImporter`].
pub struct CityImporter<'a> {
    config: &'a ImportConfig,
}

impl<'a> CityImporter<'a> {
    pub fn new(config: &'a ImportConfig) -> Self {
        Self { config }
    }
}

impl RecordImporter for CityImporter<'_> {
    type Parsed = GeonameRow;

    fn kind(&self) -> PlaceKind {
        PlaceKind::City
    }

    fn select(&self, fields: &Fields) -> Outcome<()> {
        let feature_code = fields.get(col::FEATURE_CODE);
        if !self.config.is_city_type(feature_code) {
            return Outcome::filtered(format!("feature code '{feature_code}' is not a city"));
        }
        if is_metro_member(self.config, fields) {
            return Outcome::filtered("metro area member, imported as district");
        }
        Outcome::Ok(())
    }

    fn parse(&self, fields: &Fields) -> Outcome<GeonameRow> {
        parse_geoname(fields, "city")
    }

    fn resolve(&mut self, row: GeonameRow, _fields: &Fields, index: &ReferenceIndex) -> Outcome<Entity> {
        let country = try_outcome!(country_of(index, &row.country_code, "city"));

        let keys = admin_keys(&row.country_code, &row.admin1, &row.admin2);
        let (region, subregion) = match HierarchyResolver::new(index).resolve_parent(&keys) {
            Some(parent) if parent.kind == PlaceKind::Subregion => (parent.region, parent.geo_id),
            Some(parent) => (parent.geo_id, None),
            None if self.config.skip_cities_with_empty_regions => {
                return Outcome::unresolved(format!(
                    "city {} ({}): no region for {}.{}",
                    row.name, row.geo_id, row.country_code, row.admin1
                ));
            }
            None => {
                warn!(
                    geo_id = row.geo_id,
                    name = %row.name,
                    admin1 = %row.admin1,
                    admin2 = %row.admin2,
                    "city has no resolvable region"
                );
                (None, None)
            }
        };

        Outcome::Ok(Entity::City(City {
            pk: 0,
            geo_id: row.geo_id,
            slug: text::slugify(&row.name),
            name: row.name,
            ascii_name: row.ascii_name,
            location: row.location,
            population: row.population,
            elevation: row.elevation,
            feature_code: row.feature_code,
            timezone: row.timezone,
            country,
            region,
            subregion,
        }))
    }
}
