//! Basic import example for geoimport-rs
//!
//! This example demonstrates how to:
//! - Point an `ImportConfig` at a directory of GeoNames files
//! - Register a custom plugin that skips records
//! - Run the pipeline into a `MemoryStore` and read the report
//! - Re-run it and observe that nothing is duplicated

use geoimport_rs::model::Fields;
use geoimport_rs::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Keeps only French and Belgian admin rows and cities.
struct OnlyFrBe;

impl Plugin for OnlyFrBe {
    fn name(&self) -> &str {
        "only_fr_be"
    }

    fn hooks(&self) -> &[HookName] {
        &[HookName::RegionPre, HookName::CityPre]
    }

    fn pre(&self, hook: HookName, fields: &mut Fields) -> HookResult {
        let cc = match hook {
            HookName::RegionPre => fields.get(0).split('.').next().unwrap_or(""),
            _ => fields.get(8),
        };
        if cc == "FR" || cc == "BE" {
            Ok(())
        } else {
            Err(HookError::skip(format!("country {cc} not wanted")))
        }
    }
}

fn write_dataset(dir: &Path) -> std::io::Result<()> {
    fs::write(
        dir.join("countryInfo.txt"),
        "# ISO\tISO3\tISO-Numeric\tfips\tCountry\tCapital\tArea\tPopulation\tContinent\ttld\n\
         FR\tFRA\t250\tFR\tFrance\tParis\t547030\t66987244\tEU\t.fr\tEUR\tEuro\t33\t\t\tfr-FR\t3017382\t\t\n\
         BE\tBEL\t056\tBE\tBelgium\tBrussels\t30510\t11422068\tEU\t.be\tEUR\tEuro\t32\t\t\tnl-BE,fr-BE\t2802361\t\t\n\
         DE\tDEU\t276\tGM\tGermany\tBerlin\t357021\t82927922\tEU\t.de\tEUR\tEuro\t49\t\t\tde\t2921044\t\t\n",
    )?;
    fs::write(
        dir.join("admin1CodesASCII.txt"),
        "FR.11\tÎle-de-France\tIle-de-France\t3012874\n\
         BE.BRU\tBrussels Capital\tBrussels Capital\t2800867\n\
         DE.16\tBerlin\tBerlin\t2950157\n",
    )?;
    fs::write(dir.join("admin2Codes.txt"), "FR.11.75\tParis\tParis\t2968815\n")?;
    fs::write(
        dir.join("cities5000.txt"),
        "2988507\tParis\tParis\t\t48.85341\t2.3488\tP\tPPLC\tFR\t\t11\t75\t\t\t2138551\t\t42\tEurope/Paris\t2024-01-01\n\
         2800866\tBrussels\tBrussels\t\t50.85045\t4.34878\tP\tPPLC\tBE\t\tBRU\t\t\t\t1019022\t\t28\tEurope/Brussels\t2024-01-01\n\
         2950159\tBerlin\tBerlin\t\t52.52437\t13.41053\tP\tPPLC\tDE\t\t16\t\t\t\t3426354\t\t74\tEurope/Berlin\t2024-01-01\n\
         6618607\tParis 01 Louvre\tParis 01 Louvre\t\t48.8592\t2.3417\tP\tPPLX\tFR\t\t11\t75\t\t\t17614\t\t\tEurope/Paris\t2024-01-01\n",
    )?;
    fs::write(dir.join("hierarchy.txt"), "2988507\t6618607\tADM\n")?;
    fs::write(
        dir.join("alternateNames.txt"),
        "1\t2988507\ten\tParis\t1\t\t\t\n\
         2\t2988507\tfr\tParis\t1\t\t\t\n\
         3\t2800866\t\tBruxelles-Brussel\t\t\t\t\n",
    )?;
    fs::write(
        dir.join("allCountries.txt"),
        "FR\t75001\tParis 01\tÎle-de-France\t11\tParis\t75\tParis\t751\t48.8592\t2.3417\t5\n",
    )?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();
    println!("=== geoimport-rs Basic Import Example ===\n");

    let dir = tempfile::tempdir()?;
    write_dataset(dir.path())?;

    // No remote metadata is available offline, so force the import.
    let config = ImportConfig {
        data_dir: dir.path().to_path_buf(),
        force: true,
        ..ImportConfig::default()
    };

    let mut hooks = HookRegistry::new();
    hooks.register(Arc::new(OnlyFrBe));

    let mut store = MemoryStore::new();
    let report = Pipeline::new(&config, &hooks).run_all(&mut store)?;

    println!("--- Stage report ---");
    for stage in &report.stages {
        println!(
            "{:<12} read {:>3}  committed {:>3}  skipped {:>3}  filtered {:>3}",
            stage.stage, stage.read, stage.committed, stage.skipped, stage.filtered
        );
    }

    let first = store.stats();
    println!("\n--- Store after first run ---\n{first:#?}");

    // A second run converges to the same state.
    Pipeline::new(&config, &hooks).run_all(&mut store)?;
    let second = store.stats();
    println!("\nSecond run identical: {}", first == second);

    Ok(())
}
