// crates/geoimport-core/src/importer/country.rs
use super::RecordImporter;
use crate::common::Outcome;
use crate::config::{CountryMode, ImportConfig};
use crate::error::Result;
use crate::index::ReferenceIndex;
use crate::model::raw::country as col;
use crate::model::{convert, Country, Entity, Fields, GeoId, Identity, PlaceKind};
use crate::try_outcome;
use crate::text;
use crate::traits::EntityStore;
use std::collections::HashMap;
use tracing::warn;

/// countryInfo.txt → [`Country`].
pub struct CountryImporter<'a> {
    config: &'a ImportConfig,
    /// Legacy TLD mode: TLD → (GeoID, population) of the current holder.
    tld_owners: HashMap<String, (GeoId, u64)>,
}

impl<'a> CountryImporter<'a> {
    pub fn new(config: &'a ImportConfig) -> Self {
        Self {
            config,
            tld_owners: HashMap::new(),
        }
    }

    fn parse_country(&self, fields: &Fields) -> Outcome<Country> {
        let code = fields.get(col::CODE);
        if code.is_empty() {
            return Outcome::missing("country: empty code");
        }
        if self.config.is_obsolete_country(code) {
            return Outcome::filtered(format!("country {code} no longer exists"));
        }
        let geo_id = try_outcome!(convert::geo_id(fields, col::GEONAME_ID, "country"));
        let population = try_outcome!(convert::count(fields, col::POPULATION, "country population"));

        let name = fields.get(col::NAME).to_owned();
        let languages = fields
            .get(col::LANGUAGES)
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect();

        Outcome::Ok(Country {
            pk: 0,
            geo_id,
            code: code.to_owned(),
            code3: fields.get(col::CODE3).to_owned(),
            ascii_name: text::ascii_name("", &name),
            slug: text::slugify(&name),
            name,
            population,
            continent: fields.get(col::CONTINENT).to_owned(),
            tld: fields.get(col::TLD).trim_start_matches('.').to_owned(),
            capital: convert::opt_str(fields, col::CAPITAL),
            currency: convert::opt_str(fields, col::CURRENCY_CODE),
            phone: convert::opt_str(fields, col::PHONE),
            languages,
        })
    }

    /// Keeps the more populous of two countries sharing a TLD.
    fn commit_by_tld<S>(&mut self, store: &mut S, country: Country) -> Result<Outcome<Identity>>
    where
        S: EntityStore + ?Sized,
    {
        if country.tld.is_empty() {
            return store.upsert(Entity::Country(country)).map(Outcome::Ok);
        }
        if let Some(&(holder, population)) = self.tld_owners.get(&country.tld) {
            if holder != country.geo_id {
                if country.population <= population {
                    return Ok(Outcome::filtered(format!(
                        "country {}: tld .{} already held by a larger country",
                        country.code, country.tld
                    )));
                }
                warn!(tld = %country.tld, winner = %country.code, "replacing smaller country sharing a tld");
                store.remove(PlaceKind::Country, holder)?;
            }
        }
        self.tld_owners
            .insert(country.tld.clone(), (country.geo_id, country.population));
        store.upsert(Entity::Country(country)).map(Outcome::Ok)
    }
}

impl RecordImporter for CountryImporter<'_> {
    type Parsed = Country;

    fn kind(&self) -> PlaceKind {
        PlaceKind::Country
    }

    fn parse(&self, fields: &Fields) -> Outcome<Country> {
        self.parse_country(fields)
    }

    fn resolve(&mut self, parsed: Country, _fields: &Fields, _index: &ReferenceIndex) -> Outcome<Entity> {
        Outcome::Ok(Entity::Country(parsed))
    }

    fn commit<S>(&mut self, store: &mut S, entity: Entity) -> Result<Outcome<Identity>>
    where
        S: EntityStore + ?Sized,
    {
        match (self.config.country_mode, entity) {
            (CountryMode::LegacyTld, Entity::Country(c)) => self.commit_by_tld(store, c),
            (_, entity) => store.upsert(entity).map(Outcome::Ok),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const FRANCE: &str = "FR\tFRA\t250\tFR\tFrance\tParis\t547030\t66987244\tEU\t.fr\tEUR\tEuro\t33\t#####\t^(\\d{5})$\tfr-FR,frp,br\t3017382\tCH,DE\t";

    #[test]
    fn parses_country_info_row() {
        let cfg = ImportConfig::default();
        let imp = CountryImporter::new(&cfg);
        let c = match imp.parse(&Fields::from_line(FRANCE)) {
            Outcome::Ok(c) => c,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(c.code, "FR");
        assert_eq!(c.code3, "FRA");
        assert_eq!(c.geo_id, 3017382);
        assert_eq!(c.population, 66_987_244);
        assert_eq!(c.tld, "fr");
        assert_eq!(c.slug, "france");
        assert_eq!(c.languages, vec!["fr-FR", "frp", "br"]);
        assert_eq!(c.capital.as_deref(), Some("Paris"));
    }

    #[test]
    fn obsolete_codes_are_filtered() {
        let cfg = ImportConfig::default();
        let imp = CountryImporter::new(&cfg);
        let line = "CS\tSCG\t891\tYI\tSerbia and Montenegro\tBelgrade\t102350\t10829175\tEU\t.cs\tRSD\tDinar\t381\t#####\t^(\\d{5})$\tcu,hu,sq,sr\t8505033\tAL,HU,MK,RO,HR,BA,BG\t";
        assert!(matches!(
            imp.parse(&Fields::from_line(line)),
            Outcome::Skip(crate::common::SkipReason::Filtered(_))
        ));
    }

    #[test]
    fn legacy_tld_mode_keeps_larger_country() {
        let cfg = ImportConfig {
            country_mode: CountryMode::LegacyTld,
            ..ImportConfig::default()
        };
        let mut imp = CountryImporter::new(&cfg);
        let mut store = MemoryStore::new();

        let small = "GB\tGBR\t826\tUK\tSmallland\t\t1\t1000\tEU\t.uk\t\t\t\t\t\t\t1\t\t";
        let large = "UK\tUKK\t000\tUK\tLargeland\t\t1\t9000\tEU\t.uk\t\t\t\t\t\t\t2\t\t";
        let tiny = "XU\tXUK\t000\tXU\tTinyland\t\t1\t10\tEU\t.uk\t\t\t\t\t\t\t3\t\t";

        for line in [small, large, tiny] {
            let c = match imp.parse(&Fields::from_line(line)) {
                Outcome::Ok(c) => c,
                other => panic!("unexpected {other:?}"),
            };
            imp.commit(&mut store, Entity::Country(c)).unwrap();
        }

        assert_eq!(store.count(PlaceKind::Country), 1);
        assert!(store.get(PlaceKind::Country, 2).is_some());
    }
}
