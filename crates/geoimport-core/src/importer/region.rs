// crates/geoimport-core/src/importer/region.rs
//! admin1CodesASCII.txt → [`Region`], admin2Codes.txt → [`Subregion`].
//!
//! Both files share one layout: `code, name, ascii name, geonameid`, where
//! the code is composite (`FR.A8`, `FR.A8.16`).

use super::{country_of, synthetic_geo_id, RecordImporter};
use crate::common::Outcome;
use crate::index::ReferenceIndex;
use crate::model::raw::admin as col;
use crate::model::{convert, Entity, Fields, GeoId, PlaceKind, Region, Subregion};
use crate::text;
use crate::try_outcome;

/// Fields common to both admin levels.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminRow {
    pub geo_id: GeoId,
    pub code: String,
    /// Code segments: country, admin1 and (for subregions) admin2.
    pub parts: Vec<String>,
    pub name: String,
    pub ascii_name: String,
}

fn parse_admin(fields: &Fields, segments: usize, what: &str) -> Outcome<AdminRow> {
    let code = fields.get(col::CODE);
    let parts: Vec<String> = code.split('.').map(str::to_owned).collect();
    if parts.len() != segments || parts.iter().any(String::is_empty) {
        return Outcome::missing(format!("{what}: malformed code '{code}'"));
    }

    let geo_id = if fields.get(col::GEONAME_ID).is_empty() {
        synthetic_geo_id(code)
    } else {
        try_outcome!(convert::geo_id(fields, col::GEONAME_ID, what))
    };

    let name = fields.get(col::NAME);
    if name.is_empty() {
        return Outcome::invalid(format!("{what} {code}: empty name"));
    }

    Outcome::Ok(AdminRow {
        geo_id,
        code: code.to_owned(),
        parts,
        name: name.to_owned(),
        ascii_name: text::ascii_name(fields.get(col::ASCII_NAME), name),
    })
}

#[derive(Debug, Default)]
pub struct RegionImporter;

impl RegionImporter {
    pub fn new() -> Self {
        Self
    }
}

impl RecordImporter for RegionImporter {
    type Parsed = AdminRow;

    fn kind(&self) -> PlaceKind {
        PlaceKind::Region
    }

    fn parse(&self, fields: &Fields) -> Outcome<AdminRow> {
        parse_admin(fields, 2, "region")
    }

    fn resolve(&mut self, row: AdminRow, _fields: &Fields, index: &ReferenceIndex) -> Outcome<Entity> {
        let country = try_outcome!(country_of(index, &row.parts[0], "region"));
        Outcome::Ok(Entity::Region(Region {
            pk: 0,
            geo_id: row.geo_id,
            slug: text::slugify(&row.name),
            code: row.code,
            name: row.name,
            ascii_name: row.ascii_name,
            country,
        }))
    }
}

#[derive(Debug, Default)]
pub struct SubregionImporter;

impl SubregionImporter {
    pub fn new() -> Self {
        Self
    }
}

impl RecordImporter for SubregionImporter {
    type Parsed = AdminRow;

    fn kind(&self) -> PlaceKind {
        PlaceKind::Subregion
    }

    fn parse(&self, fields: &Fields) -> Outcome<AdminRow> {
        parse_admin(fields, 3, "subregion")
    }

    fn resolve(&mut self, row: AdminRow, _fields: &Fields, index: &ReferenceIndex) -> Outcome<Entity> {
        let region_code = format!("{}.{}", row.parts[0], row.parts[1]);
        let Some(region) = index.lookup(PlaceKind::Region, &region_code) else {
            return Outcome::unresolved(format!(
                "subregion {}: unknown region '{region_code}'",
                row.code
            ));
        };
        let (Some(region_id), Some(country)) = (region.geo_id, region.country) else {
            return Outcome::unresolved(format!("subregion {}: incomplete region", row.code));
        };

        Outcome::Ok(Entity::Subregion(Subregion {
            pk: 0,
            geo_id: row.geo_id,
            slug: text::slugify(&row.name),
            code: row.code,
            name: row.name,
            ascii_name: row.ascii_name,
            region: region_id,
            country,
        }))
    }
}
