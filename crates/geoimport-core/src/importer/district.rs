// crates/geoimport-core/src/importer/district.rs
use super::city::{is_metro_member, parse_geoname, GeonameRow};
use super::{country_of, HierarchyMap, RecordImporter};
use crate::common::Outcome;
use crate::config::ImportConfig;
use crate::index::ReferenceIndex;
use crate::model::raw::geoname as col;
use crate::model::{District, Entity, Fields, GeoId, PlaceKind};
use crate::resolve::HierarchyResolver;
use crate::text;
use crate::try_outcome;
use tracing::{debug, warn};

/// City dump → [`District`].
///
/// The parent City comes from hierarchy.txt when it declares one that is
/// a stored City. Otherwise metro members attach to their metro city and
/// everything else to the nearest City above the population floor in the
/// same country. A district is only dropped when all of that fails.
pub struct DistrictImporter<'a> {
    config: &'a ImportConfig,
    hierarchy: &'a HierarchyMap,
}

impl<'a> DistrictImporter<'a> {
    pub fn new(config: &'a ImportConfig, hierarchy: &'a HierarchyMap) -> Self {
        Self { config, hierarchy }
    }

    fn declared_city(&self, geo_id: GeoId, index: &ReferenceIndex) -> Option<GeoId> {
        self.hierarchy
            .parents_of(geo_id)
            .iter()
            .copied()
            .find(|parent| index.lookup_geo(PlaceKind::City, *parent).is_some())
    }

    fn fallback_city(&self, row: &GeonameRow, country: GeoId, index: &ReferenceIndex) -> Option<GeoId> {
        let resolver = HierarchyResolver::new(index);

        if let Some(rule) = self.config.metro_rule(&row.country_code, &row.admin2) {
            if let Some(city) =
                resolver.resolve_named_max_population(PlaceKind::City, &rule.city_name, Some(country))
            {
                debug!(geo_id = row.geo_id, city = %city.name, "district attached to metro city");
                return city.geo_id;
            }
        }

        let floor = self.config.district_population_floor;
        let (city, km) =
            resolver.resolve_nearest(&row.location, PlaceKind::City, floor, Some(country))?;
        warn!(
            geo_id = row.geo_id,
            name = %row.name,
            city = %city.name,
            distance_km = km,
            "district parent resolved by nearest city"
        );
        city.geo_id
    }
}

impl RecordImporter for DistrictImporter<'_> {
    type Parsed = GeonameRow;

    fn kind(&self) -> PlaceKind {
        PlaceKind::District
    }

    fn select(&self, fields: &Fields) -> Outcome<()> {
        let feature_code = fields.get(col::FEATURE_CODE);
        if self.config.is_district_type(feature_code) || is_metro_member(self.config, fields) {
            Outcome::Ok(())
        } else {
            Outcome::filtered(format!("feature code '{feature_code}' is not a district"))
        }
    }

    fn parse(&self, fields: &Fields) -> Outcome<GeonameRow> {
        parse_geoname(fields, "district")
    }

    fn resolve(&mut self, row: GeonameRow, _fields: &Fields, index: &ReferenceIndex) -> Outcome<Entity> {
        let country = try_outcome!(country_of(index, &row.country_code, "district"));

        let city = match self.declared_city(row.geo_id, index) {
            Some(city) => city,
            None => match self.fallback_city(&row, country, index) {
                Some(city) => city,
                None => {
                    return Outcome::unresolved(format!(
                        "district {} ({}): no city above {} inhabitants in {}",
                        row.name, row.geo_id, self.config.district_population_floor, row.country_code
                    ))
                }
            },
        };

        Outcome::Ok(Entity::District(District {
            pk: 0,
            geo_id: row.geo_id,
            slug: text::slugify(&row.name),
            name: row.name,
            ascii_name: row.ascii_name,
            location: row.location,
            population: row.population,
            city,
            country,
        }))
    }
}
