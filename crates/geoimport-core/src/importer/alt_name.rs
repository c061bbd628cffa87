// crates/geoimport-core/src/importer/alt_name.rs
use super::RecordImporter;
use crate::common::Outcome;
use crate::config::{ImportConfig, UNDETERMINED};
use crate::index::ReferenceIndex;
use crate::model::raw::alt_name as col;
use crate::model::{convert, AlternateName, Entity, Fields, GeoId, OwnerRef, PlaceKind};
use crate::text;
use crate::try_outcome;

#[derive(Debug, Clone, PartialEq)]
pub struct AltNameRow {
    pub geo_id: GeoId,
    pub owner: GeoId,
    pub language: String,
    pub name: String,
}

/// alternateNames.txt → [`AlternateName`], restricted to configured
/// locales and to owners already stored.
pub struct AltNameImporter<'a> {
    config: &'a ImportConfig,
}

impl<'a> AltNameImporter<'a> {
    pub fn new(config: &'a ImportConfig) -> Self {
        Self { config }
    }
}

/// Lower-cased language code, `und` when the column is empty.
fn language_of(fields: &Fields) -> String {
    let raw = fields.get(col::LANGUAGE);
    if raw.is_empty() {
        UNDETERMINED.to_owned()
    } else {
        raw.to_lowercase()
    }
}

impl RecordImporter for AltNameImporter<'_> {
    type Parsed = AltNameRow;

    fn kind(&self) -> PlaceKind {
        PlaceKind::AlternateName
    }

    fn parse(&self, fields: &Fields) -> Outcome<AltNameRow> {
        let language = language_of(fields);
        if !self.config.accepts_locale(&language) {
            return Outcome::filtered(format!("language '{language}' not configured"));
        }

        let geo_id = try_outcome!(convert::geo_id(fields, col::NAME_ID, "alt_name"));
        let owner = try_outcome!(convert::geo_id(fields, col::GEONAME_ID, "alt_name owner"));

        let name = fields.get(col::NAME);
        if name.is_empty() {
            return Outcome::invalid(format!("alt_name {geo_id}: empty name"));
        }
        if !self.config.include_numeric_alt_names && text::is_numeric_name(name) {
            return Outcome::filtered(format!("alt_name {geo_id}: numeric name"));
        }

        Outcome::Ok(AltNameRow {
            geo_id,
            owner,
            language,
            name: name.to_owned(),
        })
    }

    fn resolve(&mut self, row: AltNameRow, fields: &Fields, index: &ReferenceIndex) -> Outcome<Entity> {
        let Some(kind) = PlaceKind::PLACES
            .into_iter()
            .find(|kind| index.lookup_geo(*kind, row.owner).is_some())
        else {
            return Outcome::filtered(format!("alt_name {}: unknown owner {}", row.geo_id, row.owner));
        };

        Outcome::Ok(Entity::AlternateName(AlternateName {
            pk: 0,
            geo_id: row.geo_id,
            owner: OwnerRef {
                kind,
                geo_id: row.owner,
            },
            language: row.language,
            name: row.name,
            is_preferred: convert::flag(fields, col::IS_PREFERRED),
            is_short: convert::flag(fields, col::IS_SHORT),
            is_colloquial: convert::flag(fields, col::IS_COLLOQUIAL),
            is_historic: convert::flag(fields, col::IS_HISTORIC),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SkipReason;

    fn row(lang: &str, name: &str) -> Fields {
        Fields::from_line(&format!("1\t2988507\t{lang}\t{name}\t1\t\t\t"))
    }

    #[test]
    fn locale_gate() {
        let cfg = ImportConfig::default();
        let imp = AltNameImporter::new(&cfg);

        assert!(imp.parse(&row("en", "Paris")).is_ok());
        assert!(imp.parse(&row("EN", "Paris")).is_ok());
        match imp.parse(&row("", "Paris")) {
            Outcome::Ok(r) => assert_eq!(r.language, "und"),
            other => panic!("unexpected {other:?}"),
        }
        for lang in ["fr", "zzz-invalid", "link"] {
            assert!(matches!(
                imp.parse(&row(lang, "Paris")),
                Outcome::Skip(SkipReason::Filtered(_))
            ));
        }
    }

    #[test]
    fn numeric_names_follow_config() {
        let cfg = ImportConfig::default();
        assert!(AltNameImporter::new(&cfg).parse(&row("en", "75000")).is_ok());

        let cfg = ImportConfig {
            include_numeric_alt_names: false,
            ..ImportConfig::default()
        };
        assert!(!AltNameImporter::new(&cfg).parse(&row("en", "75000")).is_ok());
    }

    #[test]
    fn unknown_owner_is_filtered() {
        let cfg = ImportConfig::default();
        let mut imp = AltNameImporter::new(&cfg);
        let f = row("en", "Paris");
        let parsed = match imp.parse(&f) {
            Outcome::Ok(r) => r,
            other => panic!("unexpected {other:?}"),
        };
        assert!(matches!(
            imp.resolve(parsed, &f, &ReferenceIndex::new()),
            Outcome::Skip(SkipReason::Filtered(_))
        ));
    }
}
