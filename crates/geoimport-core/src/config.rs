// crates/geoimport-core/src/config.rs
//! Explicit pipeline configuration, built once and passed by reference.

use crate::error::{ImportError, Result};
use crate::loader::LineSource;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DUMP_URL: &str = "https://download.geonames.org/export/dump/";
pub const ZIP_URL: &str = "https://download.geonames.org/export/zip/";

/// Sentinel language for alternate names without one.
pub const UNDETERMINED: &str = "und";

/// A named input file of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKey {
    Country,
    Region,
    Subregion,
    City,
    Hierarchy,
    AltName,
    PostalCode,
}

impl SourceKey {
    pub const ALL: [SourceKey; 7] = [
        SourceKey::Country,
        SourceKey::Region,
        SourceKey::Subregion,
        SourceKey::City,
        SourceKey::Hierarchy,
        SourceKey::AltName,
        SourceKey::PostalCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKey::Country => "country",
            SourceKey::Region => "region",
            SourceKey::Subregion => "subregion",
            SourceKey::City => "city",
            SourceKey::Hierarchy => "hierarchy",
            SourceKey::AltName => "alt_name",
            SourceKey::PostalCode => "postal_code",
        }
    }

    fn default_file(&self) -> SourceFile {
        let (filename, base) = match self {
            SourceKey::Country => ("countryInfo.txt", DUMP_URL),
            SourceKey::Region => ("admin1CodesASCII.txt", DUMP_URL),
            SourceKey::Subregion => ("admin2Codes.txt", DUMP_URL),
            SourceKey::City => ("cities5000.txt", DUMP_URL),
            SourceKey::Hierarchy => ("hierarchy.txt", DUMP_URL),
            SourceKey::AltName => ("alternateNames.txt", DUMP_URL),
            SourceKey::PostalCode => ("allCountries.txt", ZIP_URL),
        };
        SourceFile {
            filename: filename.to_owned(),
            urls: vec![format!("{base}{{filename}}")],
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local filename and candidate download URLs of a source.
///
/// URLs may contain a `{filename}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub filename: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

impl SourceFile {
    pub fn urls(&self) -> Vec<String> {
        self.urls
            .iter()
            .map(|u| u.replace("{filename}", &self.filename))
            .collect()
    }
}

/// Metropolitan sub-units imported as districts of one named city
/// (Greater London boroughs: admin2 `GLA` in `GB`, city `London`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetroRule {
    pub country: String,
    pub admin2: String,
    pub city_name: String,
    /// Feature code that stays a city even inside the metro area.
    #[serde(default = "default_capital_code")]
    pub capital_code: String,
}

fn default_capital_code() -> String {
    "PPLC".to_owned()
}

/// How countries are matched on re-import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountryMode {
    #[default]
    Code,
    /// Countries sharing a TLD collapse into the most populous one.
    LegacyTld,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub data_dir: PathBuf,
    pub files: BTreeMap<SourceKey, SourceFile>,
    pub locales: BTreeSet<String>,
    /// Country codes whose postal codes are imported; `ALL` for every one.
    pub postal_countries: BTreeSet<String>,
    pub city_types: Vec<String>,
    pub district_types: Vec<String>,
    pub metro_districts: Vec<MetroRule>,
    pub district_population_floor: u64,
    pub postal_population_floor: u64,
    pub skip_cities_with_empty_regions: bool,
    pub no_longer_existent_country_codes: Vec<String>,
    pub include_numeric_alt_names: bool,
    pub country_mode: CountryMode,
    /// Built-in plugin names, registered in this order.
    pub plugins: Vec<String>,
    /// Probability of the `reset_cache` plugin firing per record.
    pub reset_chance: f64,
    pub force: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            files: SourceKey::ALL
                .iter()
                .map(|k| (*k, k.default_file()))
                .collect(),
            locales: ["en", UNDETERMINED].iter().map(|s| s.to_string()).collect(),
            postal_countries: ["ALL".to_owned()].into_iter().collect(),
            city_types: strings(&["PPL", "PPLA", "PPLC", "PPLA2", "PPLA3", "PPLA4", "PPLG"]),
            district_types: strings(&["PPLX"]),
            metro_districts: vec![MetroRule {
                country: "GB".into(),
                admin2: "GLA".into(),
                city_name: "London".into(),
                capital_code: default_capital_code(),
            }],
            district_population_floor: 100_000,
            postal_population_floor: 125_000,
            skip_cities_with_empty_regions: false,
            no_longer_existent_country_codes: strings(&["CS", "AN"]),
            include_numeric_alt_names: true,
            country_mode: CountryMode::Code,
            plugins: Vec::new(),
            reset_chance: 0.000_002,
            force: false,
        }
    }
}

impl ImportConfig {
    /// Reads a JSON configuration file; omitted keys keep their defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ImportError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let cfg: ImportConfig = serde_json::from_str(&text)?;
        cfg.normalized()
    }

    /// Case-folds code sets, restores default source entries the user did
    /// not override, and validates.
    pub fn normalized(mut self) -> Result<Self> {
        for key in SourceKey::ALL {
            self.files.entry(key).or_insert_with(|| key.default_file());
        }
        self.locales = self
            .locales
            .iter()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        self.postal_countries = self
            .postal_countries
            .iter()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.locales.is_empty() {
            return Err(ImportError::Config("at least one locale is required".into()));
        }
        if !(0.0..=1.0).contains(&self.reset_chance) {
            return Err(ImportError::Config(format!(
                "reset_chance must be within [0, 1], got {}",
                self.reset_chance
            )));
        }
        for (key, file) in &self.files {
            if file.filename.is_empty() {
                return Err(ImportError::Config(format!("empty filename for source '{key}'")));
            }
        }
        Ok(())
    }

    pub fn source_file(&self, key: SourceKey) -> SourceFile {
        self.files
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.default_file())
    }

    pub fn source_path(&self, key: SourceKey) -> PathBuf {
        self.data_dir.join(self.source_file(key).filename)
    }

    pub fn source(&self, key: SourceKey) -> LineSource {
        LineSource::new(key.as_str(), self.source_path(key))
    }

    /// Language admission for alternate names (`language` already folded).
    pub fn accepts_locale(&self, language: &str) -> bool {
        self.locales.contains(language)
    }

    pub fn accepts_postal_country(&self, code: &str) -> bool {
        self.postal_countries.contains("ALL") || self.postal_countries.contains(code)
    }

    pub fn is_city_type(&self, feature_code: &str) -> bool {
        self.city_types.iter().any(|t| t == feature_code)
    }

    pub fn is_district_type(&self, feature_code: &str) -> bool {
        self.district_types.iter().any(|t| t == feature_code)
    }

    pub fn is_obsolete_country(&self, code: &str) -> bool {
        self.no_longer_existent_country_codes.iter().any(|c| c == code)
    }

    pub fn metro_rule(&self, country: &str, admin2: &str) -> Option<&MetroRule> {
        if admin2.is_empty() {
            return None;
        }
        self.metro_districts
            .iter()
            .find(|r| r.country == country && r.admin2 == admin2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_source() {
        let cfg = ImportConfig::default();
        for key in SourceKey::ALL {
            assert!(cfg.files.contains_key(&key));
        }
        assert_eq!(
            cfg.source_file(SourceKey::Country).urls(),
            vec!["https://download.geonames.org/export/dump/countryInfo.txt".to_string()]
        );
    }

    #[test]
    fn json_overrides_merge_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geoimport.json");
        std::fs::write(
            &path,
            r#"{
                "locales": ["EN", " fr ", "und"],
                "postal_countries": ["fr", "be"],
                "files": { "city": { "filename": "cities15000.txt" } },
                "district_population_floor": 150000
            }"#,
        )
        .unwrap();

        let cfg = ImportConfig::load_from_path(&path).unwrap();
        assert!(cfg.accepts_locale("en"));
        assert!(cfg.accepts_locale("fr"));
        assert!(cfg.accepts_postal_country("BE"));
        assert!(!cfg.accepts_postal_country("DE"));
        assert_eq!(cfg.source_file(SourceKey::City).filename, "cities15000.txt");
        assert_eq!(cfg.source_file(SourceKey::Region).filename, "admin1CodesASCII.txt");
        assert_eq!(cfg.district_population_floor, 150_000);
        assert_eq!(cfg.postal_population_floor, 125_000);
    }

    #[test]
    fn empty_locale_set_is_rejected() {
        let cfg = ImportConfig {
            locales: BTreeSet::new(),
            ..ImportConfig::default()
        };
        assert!(matches!(cfg.normalized(), Err(ImportError::Config(_))));
    }

    #[test]
    fn metro_rule_matches_country_and_admin2() {
        let cfg = ImportConfig::default();
        assert!(cfg.metro_rule("GB", "GLA").is_some());
        assert!(cfg.metro_rule("GB", "").is_none());
        assert!(cfg.metro_rule("FR", "GLA").is_none());
    }
}
