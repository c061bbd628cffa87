// crates/geoimport-core/src/model/raw.rs
//! Raw tab-separated records and the GeoNames column layout of each file.
//!
//! NOTE: these layouts mirror the external dataset's published schema.

/// One parsed line: trimmed, tab-separated fields.
///
/// Pre-hooks receive this mutably and may rewrite fields before parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<String>);

impl Fields {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Splits a line on tabs and trims every field.
    pub fn from_line(line: &str) -> Self {
        Self(line.split('\t').map(|f| f.trim().to_owned()).collect())
    }

    /// Field at `idx`, or `""` when the line is shorter.
    pub fn get(&self, idx: usize) -> &str {
        self.0.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Replaces field `idx`, padding short lines with empty fields.
    pub fn set(&mut self, idx: usize, value: impl Into<String>) {
        if self.0.len() <= idx {
            self.0.resize(idx + 1, String::new());
        }
        self.0[idx] = value.into();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for Fields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// countryInfo.txt
pub mod country {
    pub const CODE: usize = 0;
    pub const CODE3: usize = 1;
    pub const NAME: usize = 4;
    pub const CAPITAL: usize = 5;
    pub const POPULATION: usize = 7;
    pub const CONTINENT: usize = 8;
    pub const TLD: usize = 9;
    pub const CURRENCY_CODE: usize = 10;
    pub const PHONE: usize = 12;
    pub const LANGUAGES: usize = 15;
    pub const GEONAME_ID: usize = 16;
}

/// admin1CodesASCII.txt and admin2Codes.txt
pub mod admin {
    pub const CODE: usize = 0;
    pub const NAME: usize = 1;
    pub const ASCII_NAME: usize = 2;
    pub const GEONAME_ID: usize = 3;
}

/// cities5000.txt and the other geoname dumps (cities + districts)
pub mod geoname {
    pub const GEONAME_ID: usize = 0;
    pub const NAME: usize = 1;
    pub const ASCII_NAME: usize = 2;
    pub const LATITUDE: usize = 4;
    pub const LONGITUDE: usize = 5;
    pub const FEATURE_CLASS: usize = 6;
    pub const FEATURE_CODE: usize = 7;
    pub const COUNTRY_CODE: usize = 8;
    pub const ADMIN1: usize = 10;
    pub const ADMIN2: usize = 11;
    pub const ADMIN3: usize = 12;
    pub const ADMIN4: usize = 13;
    pub const POPULATION: usize = 14;
    pub const ELEVATION: usize = 15;
    pub const TIMEZONE: usize = 17;
}

/// hierarchy.txt
pub mod hierarchy {
    pub const PARENT: usize = 0;
    pub const CHILD: usize = 1;
    pub const TYPE: usize = 2;
}

/// alternateNames.txt
pub mod alt_name {
    pub const NAME_ID: usize = 0;
    pub const GEONAME_ID: usize = 1;
    pub const LANGUAGE: usize = 2;
    pub const NAME: usize = 3;
    pub const IS_PREFERRED: usize = 4;
    pub const IS_SHORT: usize = 5;
    pub const IS_COLLOQUIAL: usize = 6;
    pub const IS_HISTORIC: usize = 7;
}

/// allCountries.txt from the postal code export
pub mod postal_code {
    pub const COUNTRY_CODE: usize = 0;
    pub const CODE: usize = 1;
    pub const PLACE_NAME: usize = 2;
    pub const ADMIN1_NAME: usize = 3;
    pub const ADMIN1_CODE: usize = 4;
    pub const ADMIN2_NAME: usize = 5;
    pub const ADMIN2_CODE: usize = 6;
    pub const ADMIN3_NAME: usize = 7;
    pub const LATITUDE: usize = 9;
    pub const LONGITUDE: usize = 10;
}
