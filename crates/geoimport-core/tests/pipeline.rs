// crates/geoimport-core/tests/pipeline.rs
//! End-to-end runs of the pipeline over small GeoNames-shaped fixtures.

use geoimport_core::model::{Entity, EARTH_RADIUS_KM};
use geoimport_core::{
    load_plugins, EntityStore, Fields, GeoId, HookError, HookName, HookRegistry, HookResult,
    ImportConfig, ImportError, MemoryStore, Pipeline, PlaceKind, Plugin, RemoteMeta,
    RemoteSource, SourceFile, Stage,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const FR: GeoId = 3017382;
const BE: GeoId = 2802361;
const DE: GeoId = 2921044;
const CA: GeoId = 6251999;

fn km(d: f64) -> f64 {
    d / (EARTH_RADIUS_KM * std::f64::consts::PI / 180.0)
}

fn country(code: &str, code3: &str, name: &str, population: u64, geo_id: GeoId) -> String {
    format!(
        "{code}\t{code3}\t000\t{code}\t{name}\t\t0\t{population}\tEU\t.{}\t\t\t\t\t\t\t{geo_id}\t\t",
        code.to_lowercase()
    )
}

fn admin(code: &str, name: &str, geo_id: GeoId) -> String {
    format!("{code}\t{name}\t{name}\t{geo_id}")
}

#[allow(clippy::too_many_arguments)]
fn geoname(
    id: GeoId,
    name: &str,
    at: (f64, f64),
    feature: &str,
    cc: &str,
    admin1: &str,
    admin2: &str,
    population: u64,
) -> String {
    format!(
        "{id}\t{name}\t{name}\t\t{}\t{}\tP\t{feature}\t{cc}\t\t{admin1}\t{admin2}\t\t\t{population}\t\t\tEurope/Paris\t2024-01-01",
        at.0, at.1
    )
}

fn lines(rows: &[String]) -> String {
    let mut out = rows.join("\n");
    out.push('\n');
    out
}

/// District at (46, 3); candidate cities straight north of it.
const DISTRICT_AT: (f64, f64) = (46.0, 3.0);

fn city_rows(dual_population: u64) -> Vec<String> {
    vec![
        "# geonameid\tname\tasciiname".to_string(),
        geoname(100, "Dual", (45.0, 1.0), "PPLA", "FR", "05", "003", dual_population),
        geoname(150, "Fifty", (46.0 + km(50.0), 3.0), "PPL", "FR", "11", "", 200_000),
        geoname(112, "Twelve", (46.0 + km(12.0), 3.0), "PPL", "FR", "11", "", 200_000),
        geoname(105, "Five", (46.0 + km(5.0), 3.0), "PPL", "FR", "11", "", 200_000),
        geoname(200, "Brussels", (50.85, 4.35), "PPLC", "BE", "01", "", 1_000_000),
        geoname(300, "Berlin", (52.52, 13.41), "PPLC", "DE", "01", "", 3_400_000),
        geoname(400, "Hamlet", (46.2, 3.1), "PPLH", "FR", "11", "", 10),
        geoname(900, "Quartier", DISTRICT_AT, "PPLX", "FR", "11", "", 0),
    ]
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let f = Fixture { dir };
        f.write(
            "countryInfo.txt",
            &lines(&[
                "# ISO\tISO3\tISO-Numeric\tfips\tCountry".to_string(),
                country("FR", "FRA", "France", 66_987_244, FR),
                country("BE", "BEL", "Belgium", 11_422_068, BE),
                country("DE", "DEU", "Germany", 82_927_922, DE),
                country("CA", "CAN", "Canada", 37_058_856, CA),
            ]),
        );
        f.write(
            "admin1CodesASCII.txt",
            &lines(&[
                admin("FR.05", "Cinq", 5005),
                admin("FR.11", "Onze", 5011),
                admin("BE.01", "Un", 6001),
                admin("DE.01", "Eins", 7001),
                admin("CA.01", "Alberta", 5883102),
            ]),
        );
        f.write("admin2Codes.txt", &lines(&[admin("FR.05.003", "Trois", 5003)]));
        f.write("cities5000.txt", &lines(&city_rows(50_000)));
        // Declared parent of the district is not a stored city.
        f.write("hierarchy.txt", "999999\t900\tADM\n");
        f.write(
            "alternateNames.txt",
            &lines(&[
                "1\t100\ten\tDual EN\t1\t\t\t".to_string(),
                "2\t100\tfr\tDual FR\t\t\t\t".to_string(),
                "3\t100\tzzz-invalid\tDual Z\t\t\t\t".to_string(),
                "4\t100\t\tDual UND\t\t\t\t".to_string(),
                "5\t424242\ten\tOrphan\t\t\t\t".to_string(),
            ]),
        );
        f.write(
            "allCountries.txt",
            &lines(&[
                "FR\t05003\tDual\tCinq\t05\tTrois\t003\t\t\t45.0\t1.0\t6".to_string(),
                "CA\tT5A\tEdmonton\tAlberta\tAB\t\t\t\t\t53.58\t-113.39\t6".to_string(),
            ]),
        );
        f
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) {
        fs::write(self.path(name), content).unwrap();
    }

    fn config(&self) -> ImportConfig {
        ImportConfig {
            data_dir: self.dir.path().to_path_buf(),
            force: true,
            ..ImportConfig::default()
        }
    }
}

fn run(config: &ImportConfig, hooks: &HookRegistry, store: &mut MemoryStore) {
    Pipeline::new(config, hooks).run_all(store).unwrap();
}

fn city(store: &MemoryStore, geo_id: GeoId) -> geoimport_core::City {
    match store.get(PlaceKind::City, geo_id) {
        Some(Entity::City(c)) => c.clone(),
        other => panic!("city {geo_id}: {other:?}"),
    }
}

fn snapshot(store: &MemoryStore) -> Vec<Entity> {
    [
        PlaceKind::Country,
        PlaceKind::Region,
        PlaceKind::Subregion,
        PlaceKind::City,
        PlaceKind::District,
        PlaceKind::AlternateName,
        PlaceKind::PostalCode,
    ]
    .into_iter()
    .flat_map(|kind| store.entities(kind).cloned().collect::<Vec<_>>())
    .collect()
}

#[test]
fn full_run_populates_every_kind() {
    let fx = Fixture::new();
    let mut store = MemoryStore::new();
    let report = Pipeline::new(&fx.config(), &HookRegistry::new())
        .run_all(&mut store)
        .unwrap();

    let stats = store.stats();
    assert_eq!(stats.countries, 4);
    assert_eq!(stats.regions, 5);
    assert_eq!(stats.subregions, 1);
    assert_eq!(stats.cities, 6);
    assert_eq!(stats.districts, 1);
    assert_eq!(stats.alt_names, 2);
    assert_eq!(stats.postal_codes, 2);

    let cities = report.stage("city").unwrap();
    assert_eq!(cities.read, 8);
    assert_eq!(cities.committed, 6);
    assert_eq!(cities.filtered, 2);
    assert!(report.up_to_date.is_empty());
}

#[test]
fn second_run_is_idempotent() {
    let fx = Fixture::new();
    let config = fx.config();
    let hooks = HookRegistry::new();
    let mut store = MemoryStore::new();

    run(&config, &hooks, &mut store);
    let first = snapshot(&store);
    run(&config, &hooks, &mut store);
    let second = snapshot(&store);

    assert_eq!(first.len(), second.len());
    assert_eq!(first, second);
}

#[test]
fn reimport_updates_city_in_place() {
    let fx = Fixture::new();
    let config = fx.config();
    let hooks = HookRegistry::new();
    let mut store = MemoryStore::new();
    run(&config, &hooks, &mut store);
    let before = city(&store, 100);

    fx.write("cities5000.txt", &lines(&city_rows(75_000)));
    Pipeline::new(&config, &hooks)
        .run(&mut store, &[Stage::City])
        .unwrap();

    let after = city(&store, 100);
    assert_eq!(after.population, 75_000);
    assert_eq!(after.pk, before.pk);
    assert_eq!(store.entities(PlaceKind::City).filter(|e| e.geo_id() == Some(100)).count(), 1);
    assert_eq!(store.stats().cities, 6);
}

#[test]
fn subregion_link_beats_region_link() {
    let fx = Fixture::new();
    let mut store = MemoryStore::new();
    run(&fx.config(), &HookRegistry::new(), &mut store);

    let dual = city(&store, 100);
    assert_eq!(dual.subregion, Some(5003));
    assert_eq!(dual.region, Some(5005));

    // Region-only cities get no subregion.
    let five = city(&store, 105);
    assert_eq!(five.region, Some(5011));
    assert_eq!(five.subregion, None);
}

#[test]
fn district_without_declared_city_takes_nearest() {
    let fx = Fixture::new();
    let mut store = MemoryStore::new();
    run(&fx.config(), &HookRegistry::new(), &mut store);

    match store.get(PlaceKind::District, 900) {
        Some(Entity::District(d)) => {
            assert_eq!(d.city, 105);
            assert_eq!(d.country, FR);
        }
        other => panic!("district: {other:?}"),
    }
}

#[test]
fn district_floor_excludes_small_cities() {
    let fx = Fixture::new();
    let config = ImportConfig {
        district_population_floor: 200_000,
        ..fx.config()
    };
    let mut store = MemoryStore::new();
    let report = Pipeline::new(&config, &HookRegistry::new())
        .run_all(&mut store)
        .unwrap();

    // Every French candidate sits exactly on the floor.
    assert_eq!(store.stats().districts, 0);
    assert_eq!(report.stage("district").unwrap().skipped, 1);
}

#[test]
fn alternate_names_follow_locales() {
    let fx = Fixture::new();
    let mut store = MemoryStore::new();
    run(&fx.config(), &HookRegistry::new(), &mut store);

    let mut langs: Vec<String> = store
        .entities(PlaceKind::AlternateName)
        .map(|e| match e {
            Entity::AlternateName(a) => {
                assert_eq!(a.owner.kind, PlaceKind::City);
                assert_eq!(a.owner.geo_id, 100);
                a.language.clone()
            }
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    langs.sort();
    assert_eq!(langs, vec!["en", "und"]);
}

/// Drops admin rows and cities outside an allow-list of countries.
struct AllowCountries(&'static [&'static str]);

impl Plugin for AllowCountries {
    fn name(&self) -> &str {
        "allow_countries"
    }

    fn hooks(&self) -> &[HookName] {
        &[HookName::RegionPre, HookName::CityPre]
    }

    fn pre(&self, hook: HookName, fields: &mut Fields) -> HookResult {
        let cc = match hook {
            HookName::RegionPre => fields.get(0).split('.').next().unwrap_or(""),
            _ => fields.get(8),
        };
        if self.0.contains(&cc) {
            Ok(())
        } else {
            Err(HookError::skip(format!("{cc} not allowed")))
        }
    }
}

#[test]
fn pre_hook_skip_keeps_other_countries_out() {
    let fx = Fixture::new();
    let mut hooks = HookRegistry::new();
    hooks.register(Arc::new(AllowCountries(&["FR", "BE"])));

    let mut store = MemoryStore::new();
    let report = Pipeline::new(&fx.config(), &hooks)
        .run_all(&mut store)
        .unwrap();

    let allowed = [FR, BE];
    for kind in [PlaceKind::Region, PlaceKind::City] {
        for id in store.bulk_scan(kind, &Default::default()) {
            assert!(allowed.contains(&id.country.unwrap()), "{kind} {:?}", id.geo_id);
        }
    }
    assert_eq!(store.stats().regions, 3);
    assert_eq!(store.stats().cities, 5);
    assert_eq!(report.stage("region").unwrap().skipped, 2);
    // Countries themselves are not hooked.
    assert_eq!(store.stats().countries, 4);
}

struct Explode;

impl Plugin for Explode {
    fn name(&self) -> &str {
        "explode"
    }

    fn hooks(&self) -> &[HookName] {
        &[HookName::SubregionPost]
    }

    fn post(&self, _hook: HookName, _entity: &mut Entity, _fields: &Fields) -> HookResult {
        Err(HookError::Fatal("database went away".into()))
    }
}

#[test]
fn fatal_hook_stops_run_but_keeps_earlier_stages() {
    let fx = Fixture::new();
    let mut hooks = HookRegistry::new();
    hooks.register(Arc::new(Explode));

    let mut store = MemoryStore::new();
    let err = Pipeline::new(&fx.config(), &hooks)
        .run_all(&mut store)
        .unwrap_err();

    assert!(matches!(err, ImportError::Hook { .. }));
    assert_eq!(store.stats().countries, 4);
    assert_eq!(store.stats().regions, 5);
    assert_eq!(store.stats().subregions, 0);
    assert_eq!(store.stats().cities, 0);
}

#[test]
fn missing_source_is_fatal_for_the_stage() {
    let fx = Fixture::new();
    fs::remove_file(fx.path("admin2Codes.txt")).unwrap();

    let mut store = MemoryStore::new();
    let err = Pipeline::new(&fx.config(), &HookRegistry::new())
        .run_all(&mut store)
        .unwrap_err();

    assert!(matches!(err, ImportError::NotFound(_)));
    assert_eq!(store.stats().regions, 5);
    assert_eq!(store.stats().subregions, 0);
}

#[test]
fn regions_with_same_admin1_code_are_scoped_per_country() {
    let fx = Fixture::new();
    let mut store = MemoryStore::new();
    run(&fx.config(), &HookRegistry::new(), &mut store);

    let ones: Vec<_> = store
        .bulk_scan(PlaceKind::Region, &Default::default())
        .into_iter()
        .filter(|r| r.code.as_deref().is_some_and(|c| c.ends_with(".01")))
        .collect();
    assert_eq!(ones.len(), 3);

    // The same composite code stored under two countries stays two rows.
    let mut store = MemoryStore::new();
    for country in [FR, BE] {
        store
            .upsert(Entity::Region(geoimport_core::Region {
                pk: 0,
                geo_id: country + 1,
                code: "XX.01".into(),
                name: "Same".into(),
                ascii_name: "Same".into(),
                slug: "same".into(),
                country,
            }))
            .unwrap();
    }
    assert_eq!(store.stats().regions, 2);
}

#[test]
fn postal_codes_resolve_admin_links() {
    let fx = Fixture::new();
    let config = fx.config();
    let mut store = MemoryStore::new();
    run(&config, &HookRegistry::new(), &mut store);

    let pcs: HashMap<String, (Option<GeoId>, Option<GeoId>)> = store
        .entities(PlaceKind::PostalCode)
        .filter_map(|e| match e {
            Entity::PostalCode(p) => Some((p.code.clone(), (p.region, p.subregion))),
            _ => None,
        })
        .collect();
    assert_eq!(pcs["05003"], (Some(5005), Some(5003)));
    // "AB" is not a GeoNames admin1 code and Canada has no large city here.
    assert_eq!(pcs["T5A"], (None, None));

    // The Canadian plugin maps AB to 01.
    let hooks = load_plugins(&["postal_code_ca"][..], &config).unwrap();
    Pipeline::new(&config, &hooks)
        .run(&mut store, &[Stage::PostalCode])
        .unwrap();
    let t5a = store
        .entities(PlaceKind::PostalCode)
        .find_map(|e| match e {
            Entity::PostalCode(p) if p.code == "T5A" => Some(p.region),
            _ => None,
        })
        .unwrap();
    assert_eq!(t5a, Some(5883102));
    assert_eq!(store.stats().postal_codes, 2);
}

#[test]
fn postal_country_selection() {
    let fx = Fixture::new();
    let config = ImportConfig {
        postal_countries: ["FR".to_string()].into_iter().collect(),
        ..fx.config()
    };
    let mut store = MemoryStore::new();
    let report = Pipeline::new(&config, &HookRegistry::new())
        .run_all(&mut store)
        .unwrap();
    assert_eq!(store.stats().postal_codes, 1);
    assert_eq!(report.stage("postal_code").unwrap().filtered, 1);
}

#[test]
fn offline_without_force_leaves_store_untouched() {
    let fx = Fixture::new();
    let config = ImportConfig {
        force: false,
        ..fx.config()
    };
    let mut store = MemoryStore::new();
    let report = Pipeline::new(&config, &HookRegistry::new())
        .run_all(&mut store)
        .unwrap();

    assert!(report.stages.is_empty());
    assert_eq!(report.up_to_date.len(), Stage::ALL.len());
    assert_eq!(store.stats(), Default::default());
}

/// Remote side with fixed metadata for some files; records fetches.
struct FakeRemote {
    metas: HashMap<String, RemoteMeta>,
    fetched: Rc<RefCell<Vec<String>>>,
}

impl RemoteSource for FakeRemote {
    fn probe(&self, file: &SourceFile) -> geoimport_core::Result<Option<RemoteMeta>> {
        Ok(self.metas.get(&file.filename).copied())
    }

    fn fetch(&self, file: &SourceFile, _dest: &Path) -> geoimport_core::Result<()> {
        self.fetched.borrow_mut().push(file.filename.clone());
        Ok(())
    }
}

fn local_meta(path: &Path) -> RemoteMeta {
    let meta = fs::metadata(path).unwrap();
    RemoteMeta {
        size: meta.len(),
        modified: meta.modified().unwrap(),
    }
}

#[test]
fn freshness_gate_decides_per_source() {
    let fx = Fixture::new();
    let config = ImportConfig {
        force: false,
        ..fx.config()
    };
    let hooks = HookRegistry::new();
    let same = local_meta(&fx.path("countryInfo.txt"));

    // Same size and mtime: not stale, nothing fetched or imported.
    let fetched = Rc::new(RefCell::new(Vec::new()));
    let remote = FakeRemote {
        metas: HashMap::from([("countryInfo.txt".to_string(), same)]),
        fetched: Rc::clone(&fetched),
    };
    let mut store = MemoryStore::new();
    let report = Pipeline::new(&config, &hooks)
        .with_remote(remote)
        .run(&mut store, &[Stage::Country])
        .unwrap();
    assert_eq!(report.up_to_date, vec!["country"]);
    assert!(fetched.borrow().is_empty());
    assert_eq!(store.stats().countries, 0);

    // Remote one second newer: stale, fetched, imported.
    let newer = RemoteMeta {
        modified: same.modified + Duration::from_secs(1),
        ..same
    };
    let remote = FakeRemote {
        metas: HashMap::from([("countryInfo.txt".to_string(), newer)]),
        fetched: Rc::clone(&fetched),
    };
    let report = Pipeline::new(&config, &hooks)
        .with_remote(remote)
        .run(&mut store, &[Stage::Country])
        .unwrap();
    assert_eq!(*fetched.borrow(), vec!["countryInfo.txt"]);
    assert_eq!(report.stage("country").unwrap().committed, 4);
    assert_eq!(store.stats().countries, 4);
}

#[test]
fn city_and_district_share_one_freshness_decision() {
    let fx = Fixture::new();
    let hooks = HookRegistry::new();
    let mut store = MemoryStore::new();
    run(&fx.config(), &hooks, &mut store);

    let fetched = Rc::new(RefCell::new(Vec::new()));
    let stale = RemoteMeta {
        size: 1,
        ..local_meta(&fx.path("cities5000.txt"))
    };
    let remote = FakeRemote {
        metas: HashMap::from([("cities5000.txt".to_string(), stale)]),
        fetched: Rc::clone(&fetched),
    };
    let config = ImportConfig {
        force: false,
        ..fx.config()
    };
    let report = Pipeline::new(&config, &hooks)
        .with_remote(remote)
        .run(&mut store, &[Stage::City])
        .unwrap();

    assert_eq!(*fetched.borrow(), vec!["cities5000.txt"]);
    assert!(report.stage("city").is_some());
    assert!(report.stage("district").is_some());
}

/// Counts every `city_pre` call and promotes historic places to `PPL`.
struct PromoteHistoric {
    calls: Arc<AtomicUsize>,
}

impl Plugin for PromoteHistoric {
    fn name(&self) -> &str {
        "promote_historic"
    }

    fn hooks(&self) -> &[HookName] {
        &[HookName::CityPre]
    }

    fn pre(&self, _hook: HookName, fields: &mut Fields) -> HookResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if fields.get(7) == "PPLH" {
            fields.set(7, "PPL");
        }
        Ok(())
    }
}

#[test]
fn pre_hook_runs_before_selection_and_can_reclassify() {
    let fx = Fixture::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut hooks = HookRegistry::new();
    hooks.register(Arc::new(PromoteHistoric {
        calls: Arc::clone(&calls),
    }));

    let mut store = MemoryStore::new();
    let report = Pipeline::new(&fx.config(), &hooks)
        .run(
            &mut store,
            &[Stage::Country, Stage::Region, Stage::Subregion, Stage::City],
        )
        .unwrap();

    let cities = report.stage("city").unwrap();
    // Every row of the file reaches the hook, not only selected ones.
    assert_eq!(calls.load(Ordering::SeqCst), cities.read);
    assert_eq!(cities.read, 8);
    assert_eq!(cities.committed, 7);
    assert_eq!(cities.filtered, 1);

    let hamlet = city(&store, 400);
    assert_eq!(hamlet.feature_code, "PPL");
    assert_eq!(hamlet.region, Some(5011));
}

/// Drops one country code in `country_post`.
struct DropCountry(&'static str);

impl Plugin for DropCountry {
    fn name(&self) -> &str {
        "drop_country"
    }

    fn hooks(&self) -> &[HookName] {
        &[HookName::CountryPost]
    }

    fn post(&self, _hook: HookName, entity: &mut Entity, _fields: &Fields) -> HookResult {
        match entity {
            Entity::Country(c) if c.code == self.0 => Err(HookError::skip("dropped")),
            _ => Ok(()),
        }
    }
}

/// Upper-cases country names, counting its calls.
struct ShoutNames {
    calls: Arc<AtomicUsize>,
}

impl Plugin for ShoutNames {
    fn name(&self) -> &str {
        "shout_names"
    }

    fn hooks(&self) -> &[HookName] {
        &[HookName::CountryPost]
    }

    fn post(&self, _hook: HookName, entity: &mut Entity, _fields: &Fields) -> HookResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Entity::Country(c) = entity {
            c.name = c.name.to_uppercase();
        }
        Ok(())
    }
}

#[test]
fn post_hook_skip_discards_entity_and_edits_are_stored() {
    let fx = Fixture::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut hooks = HookRegistry::new();
    hooks.register(Arc::new(DropCountry("DE")));
    hooks.register(Arc::new(ShoutNames {
        calls: Arc::clone(&calls),
    }));

    let mut store = MemoryStore::new();
    let report = Pipeline::new(&fx.config(), &hooks)
        .run(&mut store, &[Stage::Country])
        .unwrap();

    assert_eq!(store.stats().countries, 3);
    assert!(store.get(PlaceKind::Country, DE).is_none());
    assert_eq!(report.stage("country").unwrap().skipped, 1);
    // The skipped record never reached the second hook.
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    match store.get(PlaceKind::Country, FR) {
        Some(Entity::Country(c)) => assert_eq!(c.name, "FRANCE"),
        other => panic!("france: {other:?}"),
    }
}

#[test]
fn missing_hierarchy_stops_district_stage_after_cities() {
    let fx = Fixture::new();
    fs::remove_file(fx.path("hierarchy.txt")).unwrap();

    let mut store = MemoryStore::new();
    let err = Pipeline::new(&fx.config(), &HookRegistry::new())
        .run_all(&mut store)
        .unwrap_err();

    assert!(matches!(err, ImportError::NotFound(_)));
    assert_eq!(store.stats().cities, 6);
    assert_eq!(store.stats().districts, 0);
}
