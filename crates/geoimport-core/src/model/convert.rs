// crates/geoimport-core/src/model/convert.rs
//! Typed field conversion used by the PARSE step of every importer.
//!
//! Each helper returns an [`Outcome`] so a bad numeric field rejects the
//! record instead of the run.

use crate::common::Outcome;
use crate::model::domain::{GeoId, GeoPoint};
use crate::model::raw::Fields;

/// Parses a GeoID column. Absence is a per-line identity failure.
pub fn geo_id(fields: &Fields, idx: usize, what: &str) -> Outcome<GeoId> {
    let raw = fields.get(idx);
    match raw.parse::<GeoId>() {
        Ok(id) => Outcome::Ok(id),
        Err(_) if raw.is_empty() => Outcome::missing(format!("{what}: empty geoname id")),
        Err(_) => Outcome::missing(format!("{what}: bad geoname id '{raw}'")),
    }
}

/// Parses a population-like counter. Empty means zero.
pub fn count(fields: &Fields, idx: usize, what: &str) -> Outcome<u64> {
    let raw = fields.get(idx);
    if raw.is_empty() {
        return Outcome::Ok(0);
    }
    match raw.parse::<u64>() {
        Ok(v) => Outcome::Ok(v),
        Err(_) => Outcome::invalid(format!("{what}: bad integer '{raw}'")),
    }
}

/// Parses an optional signed integer (elevation).
pub fn opt_int(fields: &Fields, idx: usize, what: &str) -> Outcome<Option<i32>> {
    let raw = fields.get(idx);
    if raw.is_empty() {
        return Outcome::Ok(None);
    }
    match raw.parse::<i32>() {
        Ok(v) => Outcome::Ok(Some(v)),
        Err(_) => Outcome::invalid(format!("{what}: bad integer '{raw}'")),
    }
}

/// Parses a mandatory coordinate pair.
pub fn point(fields: &Fields, lat_idx: usize, lng_idx: usize, what: &str) -> Outcome<GeoPoint> {
    match opt_point(fields, lat_idx, lng_idx, what) {
        Outcome::Ok(Some(p)) => Outcome::Ok(p),
        Outcome::Ok(None) => Outcome::invalid(format!("{what}: missing location")),
        Outcome::Skip(r) => Outcome::Skip(r),
    }
}

/// Parses an optional coordinate pair; both columns empty means `None`.
pub fn opt_point(
    fields: &Fields,
    lat_idx: usize,
    lng_idx: usize,
    what: &str,
) -> Outcome<Option<GeoPoint>> {
    let (lat, lng) = (fields.get(lat_idx), fields.get(lng_idx));
    if lat.is_empty() && lng.is_empty() {
        return Outcome::Ok(None);
    }
    match (lat.parse::<f64>(), lng.parse::<f64>()) {
        (Ok(lat), Ok(lng)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) => {
            Outcome::Ok(Some(GeoPoint::new(lat, lng)))
        }
        _ => Outcome::invalid(format!("{what}: invalid location ({lat}, {lng})")),
    }
}

/// GeoNames boolean flags are `1` or empty.
pub fn flag(fields: &Fields, idx: usize) -> bool {
    matches!(fields.get(idx), "1" | "true" | "True")
}

/// Empty strings become `None`.
pub fn opt_str(fields: &Fields, idx: usize) -> Option<String> {
    let raw = fields.get(idx);
    (!raw.is_empty()).then(|| raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SkipReason;

    #[test]
    fn empty_population_is_zero() {
        let f = Fields::from_line("x\t");
        assert_eq!(count(&f, 1, "city"), Outcome::Ok(0));
    }

    #[test]
    fn garbage_population_rejects_record() {
        let f = Fields::from_line("x\tmany");
        assert!(matches!(
            count(&f, 1, "city"),
            Outcome::Skip(SkipReason::InvalidField(_))
        ));
    }

    #[test]
    fn missing_geo_id_is_identity_failure() {
        let f = Fields::from_line("\tParis");
        assert!(matches!(
            geo_id(&f, 0, "city"),
            Outcome::Skip(SkipReason::MissingIdentity(_))
        ));
    }

    #[test]
    fn out_of_range_latitude_is_invalid() {
        let f = Fields::from_line("95.0\t2.0");
        assert!(!point(&f, 0, 1, "city").is_ok());
    }

    #[test]
    fn empty_optional_point_is_none() {
        let f = Fields::from_line("\t");
        assert_eq!(opt_point(&f, 0, 1, "pc"), Outcome::Ok(None));
    }

    #[test]
    fn flags() {
        let f = Fields::from_line("1\t\t0");
        assert!(flag(&f, 0));
        assert!(!flag(&f, 1));
        assert!(!flag(&f, 2));
    }
}
