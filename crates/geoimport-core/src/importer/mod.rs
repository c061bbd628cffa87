// crates/geoimport-core/src/importer/mod.rs

//! # Entity importers
//!
//! Every kind runs the same per-record state machine:
//!
//! `READ → PRE_HOOK → PARSE → RESOLVE_FKS → POST_HOOK → UPSERT`
//!
//! Each step yields `Result<Outcome<_>>`: a skip drops only the current
//! record, an `Err` aborts the stage. The kind-specific parts live behind
//! [`RecordImporter`].

mod alt_name;
mod city;
mod country;
mod district;
mod hierarchy;
mod postal_code;
mod region;

pub use alt_name::AltNameImporter;
pub use city::CityImporter;
pub use country::CountryImporter;
pub use district::DistrictImporter;
pub use hierarchy::HierarchyMap;
pub use postal_code::PostalCodeImporter;
pub use region::{RegionImporter, SubregionImporter};

use crate::common::{Outcome, SkipReason, StageReport};
use crate::error::Result;
use crate::hooks::{HookName, HookRegistry};
use crate::index::ReferenceIndex;
use crate::loader::LineSource;
use crate::model::{Entity, Fields, GeoId, Identity, PlaceKind};
use crate::ok_or_skip;
use crate::traits::EntityStore;
use tracing::{debug, info, warn};

/// Kind-specific steps of the import state machine.
pub trait RecordImporter {
    /// Typed result of PARSE, consumed by RESOLVE_FKS.
    type Parsed;

    fn kind(&self) -> PlaceKind;

    /// Stage name used in logs and reports.
    fn stage(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Row selection (feature code, postal country). Runs after PRE_HOOK,
    /// so a hook that rewrites those columns changes what is selected.
    fn select(&self, _fields: &Fields) -> Outcome<()> {
        Outcome::Ok(())
    }

    fn parse(&self, fields: &Fields) -> Outcome<Self::Parsed>;

    fn resolve(
        &mut self,
        parsed: Self::Parsed,
        fields: &Fields,
        index: &ReferenceIndex,
    ) -> Outcome<Entity>;

    /// UPSERT. Importers with extra merge rules override this.
    fn commit<S>(&mut self, store: &mut S, entity: Entity) -> Result<Outcome<Identity>>
    where
        S: EntityStore + ?Sized,
    {
        store.upsert(entity).map(Outcome::Ok)
    }
}

/// Drives one importer over one source file.
pub fn run_stage<I, S>(
    importer: &mut I,
    source: &LineSource,
    store: &mut S,
    hooks: &HookRegistry,
    index: &ReferenceIndex,
) -> Result<StageReport>
where
    I: RecordImporter,
    S: EntityStore + ?Sized,
{
    let stage = importer.stage();
    let mut report = StageReport::new(stage);
    info!(stage, file = %source.path().display(), "stage started");

    let mut records = source.records()?;
    while let Some(fields) = records.next() {
        let mut fields = fields?;
        report.read += 1;

        match process(importer, &mut fields, store, hooks, index)? {
            Outcome::Ok(identity) => {
                report.committed += 1;
                debug!(stage, pk = identity.pk, geo_id = ?identity.geo_id, name = %identity.name, "committed");
            }
            Outcome::Skip(reason) => {
                log_skip(stage, records.line_no(), &reason);
                report.record_skip(&reason);
            }
        }
    }

    info!(
        stage,
        read = report.read,
        committed = report.committed,
        skipped = report.skipped,
        filtered = report.filtered,
        "stage finished"
    );
    Ok(report)
}

fn process<I, S>(
    importer: &mut I,
    fields: &mut Fields,
    store: &mut S,
    hooks: &HookRegistry,
    index: &ReferenceIndex,
) -> Result<Outcome<Identity>>
where
    I: RecordImporter,
    S: EntityStore + ?Sized,
{
    let (pre, post) = HookName::pair(importer.kind());

    ok_or_skip!(hooks.run_pre(pre, fields)?);
    ok_or_skip!(importer.select(fields));
    let parsed = ok_or_skip!(importer.parse(fields));
    let mut entity = ok_or_skip!(importer.resolve(parsed, fields, index));
    ok_or_skip!(hooks.run_post(post, &mut entity, fields)?);
    importer.commit(store, entity)
}

fn log_skip(stage: &str, line: usize, reason: &SkipReason) {
    if reason.is_filtered() {
        debug!(stage, line, %reason, "record filtered");
    } else {
        warn!(stage, line, %reason, "record skipped");
    }
}

/// Resolves a country code against the index, as every kind below
/// Country must.
pub(crate) fn country_of(index: &ReferenceIndex, code: &str, what: &str) -> Outcome<GeoId> {
    match index
        .lookup(PlaceKind::Country, code)
        .and_then(|c| c.geo_id)
    {
        Some(id) => Outcome::Ok(id),
        None => Outcome::unresolved(format!("{what}: unknown country '{code}'")),
    }
}

/// Deterministic GeoID for admin rows the dump lists without one.
///
/// FNV-1a over the composite code with the top bit set, so it never
/// collides with a GeoNames-assigned id.
pub(crate) fn synthetic_geo_id(code: &str) -> GeoId {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let hash = code
        .bytes()
        .fold(OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(PRIME));
    hash | (1 << 63)
}
