// crates/geoimport-core/src/model/mod.rs
pub mod convert;
pub mod domain;
pub mod raw;

pub use domain::{
    AlternateName, City, Country, District, Entity, GeoId, GeoPoint, Identity, NaturalKey,
    OwnerRef, PlaceKind, PostalCode, Region, Subregion, EARTH_RADIUS_KM,
};
pub use raw::Fields;
