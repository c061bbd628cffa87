// crates/geoimport-core/src/pipeline.rs

//! # Orchestrator
//!
//! Runs the importers in dependency order:
//! Country → Region → Subregion → City (+ District) → AlternateName →
//! PostalCode.
//!
//! Each stage first asks the Freshness Gate whether its source changed.
//! A stage that fails stops the run; rows committed by earlier stages stay.

use crate::common::StageReport;
use crate::config::{ImportConfig, SourceKey};
use crate::error::{ImportError, Result};
use crate::hooks::HookRegistry;
use crate::importer::{
    run_stage, AltNameImporter, CityImporter, CountryImporter, DistrictImporter, HierarchyMap,
    PostalCodeImporter, RegionImporter, SubregionImporter,
};
use crate::index::ReferenceIndex;
use crate::loader::{FreshnessGate, Offline, RemoteSource};
use crate::model::PlaceKind;
use crate::traits::{EntityStore, ScanFilter};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Country,
    Region,
    Subregion,
    City,
    District,
    AltName,
    PostalCode,
}

impl Stage {
    /// Every stage, in run order.
    pub const ALL: [Stage; 7] = [
        Stage::Country,
        Stage::Region,
        Stage::Subregion,
        Stage::City,
        Stage::District,
        Stage::AltName,
        Stage::PostalCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Country => "country",
            Stage::Region => "region",
            Stage::Subregion => "subregion",
            Stage::City => "city",
            Stage::District => "district",
            Stage::AltName => "alt_name",
            Stage::PostalCode => "postal_code",
        }
    }

    /// The file this stage reads. Districts come from the city dump.
    pub fn source_key(&self) -> SourceKey {
        match self {
            Stage::Country => SourceKey::Country,
            Stage::Region => SourceKey::Region,
            Stage::Subregion => SourceKey::Subregion,
            Stage::City | Stage::District => SourceKey::City,
            Stage::AltName => SourceKey::AltName,
            Stage::PostalCode => SourceKey::PostalCode,
        }
    }

    /// Kind written by the stage.
    pub fn kind(&self) -> PlaceKind {
        match self {
            Stage::Country => PlaceKind::Country,
            Stage::Region => PlaceKind::Region,
            Stage::Subregion => PlaceKind::Subregion,
            Stage::City => PlaceKind::City,
            Stage::District => PlaceKind::District,
            Stage::AltName => PlaceKind::AlternateName,
            Stage::PostalCode => PlaceKind::PostalCode,
        }
    }

    /// Parses a comma-separated list; `all` selects every stage. Selecting
    /// `city` implies `district`. The result is in run order.
    pub fn parse_list(list: &str) -> Result<Vec<Stage>> {
        let mut stages = Vec::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if item.eq_ignore_ascii_case("all") {
                return Ok(Stage::ALL.to_vec());
            }
            stages.push(item.parse::<Stage>()?);
        }
        if stages.is_empty() {
            return Err(ImportError::Config("no stage selected".into()));
        }
        Ok(Stage::normalize(&stages))
    }

    /// Sorts into run order, removes duplicates and adds `district` after
    /// `city`.
    pub fn normalize(stages: &[Stage]) -> Vec<Stage> {
        let mut out: Vec<Stage> = stages.to_vec();
        if out.contains(&Stage::City) {
            out.push(Stage::District);
        }
        out.sort();
        out.dedup();
        out
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ImportError::Config(format!("unknown stage '{s}'")))
    }
}

/// Outcome of a run: which stages ran, with their counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<StageReport>,
    /// Stages whose source was judged unchanged.
    pub up_to_date: Vec<String>,
}

impl PipelineReport {
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == name)
    }

    pub fn committed(&self) -> usize {
        self.stages.iter().map(|s| s.committed).sum()
    }
}

/// Sequences the importers over one store.
pub struct Pipeline<'a> {
    config: &'a ImportConfig,
    hooks: &'a HookRegistry,
    remote: Box<dyn RemoteSource + 'a>,
    gate: FreshnessGate,
    index: ReferenceIndex,
    /// Per-source decision, made at most once per run.
    decisions: HashMap<SourceKey, bool>,
    hierarchy: Option<HierarchyMap>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ImportConfig, hooks: &'a HookRegistry) -> Self {
        Self {
            config,
            hooks,
            remote: Box::new(Offline),
            gate: FreshnessGate::new(config.force),
            index: ReferenceIndex::new(),
            decisions: HashMap::new(),
            hierarchy: None,
        }
    }

    /// Replaces the default offline remote (e.g. with `HttpSource`).
    pub fn with_remote(mut self, remote: impl RemoteSource + 'a) -> Self {
        self.remote = Box::new(remote);
        self
    }

    /// Runs every stage.
    pub fn run_all<S>(&mut self, store: &mut S) -> Result<PipelineReport>
    where
        S: EntityStore + ?Sized,
    {
        self.run(store, &Stage::ALL)
    }

    /// Runs the selected stages in dependency order.
    pub fn run<S>(&mut self, store: &mut S, stages: &[Stage]) -> Result<PipelineReport>
    where
        S: EntityStore + ?Sized,
    {
        self.config.validate()?;
        let mut report = PipelineReport::default();

        for stage in Stage::normalize(stages) {
            if !self.source_changed(stage.source_key())? {
                info!(%stage, "source unchanged, stage skipped");
                report.up_to_date.push(stage.as_str().to_owned());
                continue;
            }
            let stage_report = self.run_one(store, stage)?;
            // Later stages must see what this one wrote.
            self.index.invalidate(stage.kind());
            report.stages.push(stage_report);
        }

        let stats = store.stats();
        info!(
            countries = stats.countries,
            regions = stats.regions,
            subregions = stats.subregions,
            cities = stats.cities,
            districts = stats.districts,
            alt_names = stats.alt_names,
            postal_codes = stats.postal_codes,
            "import finished"
        );
        Ok(report)
    }

    fn run_one<S>(&mut self, store: &mut S, stage: Stage) -> Result<StageReport>
    where
        S: EntityStore + ?Sized,
    {
        let all = ScanFilter::all();
        let source = self.config.source(stage.source_key());
        let cfg = self.config;
        let hooks = self.hooks;

        match stage {
            Stage::Country => {
                run_stage(&mut CountryImporter::new(cfg), &source, store, hooks, &self.index)
            }
            Stage::Region => {
                self.index.ensure(&*store, PlaceKind::Country, &all);
                run_stage(&mut RegionImporter::new(), &source, store, hooks, &self.index)
            }
            Stage::Subregion => {
                self.index.ensure(&*store, PlaceKind::Region, &all);
                run_stage(&mut SubregionImporter::new(), &source, store, hooks, &self.index)
            }
            Stage::City => {
                for kind in [PlaceKind::Country, PlaceKind::Region, PlaceKind::Subregion] {
                    self.index.ensure(&*store, kind, &all);
                }
                run_stage(&mut CityImporter::new(cfg), &source, store, hooks, &self.index)
            }
            Stage::District => {
                self.index.ensure(&*store, PlaceKind::Country, &all);
                self.index.ensure(&*store, PlaceKind::City, &all);
                if self.hierarchy.is_none() {
                    self.prepare_local(SourceKey::Hierarchy)?;
                    self.hierarchy = Some(HierarchyMap::load(&cfg.source(SourceKey::Hierarchy))?);
                }
                let hierarchy = self.hierarchy.as_ref().ok_or_else(|| {
                    ImportError::InvalidData("hierarchy map not loaded".into())
                })?;
                let mut importer = DistrictImporter::new(cfg, hierarchy);
                run_stage(&mut importer, &source, store, hooks, &self.index)
            }
            Stage::AltName => {
                for kind in PlaceKind::PLACES {
                    self.index.ensure(&*store, kind, &all);
                }
                run_stage(&mut AltNameImporter::new(cfg), &source, store, hooks, &self.index)
            }
            Stage::PostalCode => {
                for kind in [PlaceKind::Country, PlaceKind::Region, PlaceKind::Subregion] {
                    self.index.ensure(&*store, kind, &all);
                }
                let large = ScanFilter::population_above(cfg.postal_population_floor);
                self.index.ensure(&*store, PlaceKind::City, &large);
                run_stage(&mut PostalCodeImporter::new(cfg), &source, store, hooks, &self.index)
            }
        }
    }

    /// Freshness decision for `key`, cached for the rest of the run.
    ///
    /// With remote metadata the gate compares size and mtime and a stale
    /// file is fetched. Without it the local file is assumed current, so
    /// only `force` re-imports it.
    fn source_changed(&mut self, key: SourceKey) -> Result<bool> {
        if let Some(&decision) = self.decisions.get(&key) {
            return Ok(decision);
        }

        let file = self.config.source_file(key);
        let path = self.config.source_path(key);
        let decision = match self.remote.probe(&file)? {
            Some(meta) => {
                let stale = self.gate.is_stale_against(&path, &meta);
                if stale {
                    info!(source = %key, url_count = file.urls().len(), "fetching");
                    self.remote.fetch(&file, &path)?;
                }
                stale
            }
            None => {
                if !path.is_file() {
                    return Err(ImportError::NotFound(format!(
                        "source '{key}': {}",
                        path.display()
                    )));
                }
                if !self.gate.force() {
                    info!(source = %key, "no remote metadata, assuming file is up to date");
                }
                self.gate.force()
            }
        };

        self.decisions.insert(key, decision);
        Ok(decision)
    }

    /// Makes sure an auxiliary source exists locally, fetching it if stale.
    fn prepare_local(&mut self, key: SourceKey) -> Result<()> {
        let _ = self.source_changed(key)?;
        let source = self.config.source(key);
        if source.exists() {
            Ok(())
        } else {
            Err(ImportError::NotFound(format!(
                "source '{key}': {}",
                source.path().display()
            )))
        }
    }
}
