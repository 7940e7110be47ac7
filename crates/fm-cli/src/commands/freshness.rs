use anyhow::{Context, Result};
use chrono::Utc;
use fm_fetch::StagingFetcher;
use fm_freshness::{entity_folder_exists, evaluate_all};
use fm_registry::EntityResolver;
use fm_schemas::{Component, EntityKey, EntityLayout};

use super::{build_registry, load_settings, overrides, GlobalArgs};

/// One line per component plus what the staging inbox could supply; read-only.
pub fn run(
    global: &GlobalArgs,
    ticker: &str,
    cik: Option<String>,
    scrip: Option<String>,
) -> Result<()> {
    let settings = load_settings(global)?.settings;
    let resolver = EntityResolver::new(build_registry(&settings)?);

    let key = EntityKey::new(ticker).with_context(|| format!("invalid ticker '{ticker}'"))?;
    let entity = resolver.resolve(&key, &overrides(cik, scrip))?;
    let layout = EntityLayout::new(&settings.paths.data_dir);

    println!("ticker={} jurisdiction={}", entity.ticker, entity.jurisdiction);
    println!("folder_exists={}", entity_folder_exists(&layout, &entity.ticker));
    let staged = StagingFetcher::new(&settings.paths.staging_dir).staged_components(&entity.ticker);
    println!(
        "staged={}",
        staged.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(",")
    );

    let evaluated = evaluate_all(
        &layout,
        &entity.ticker,
        entity.jurisdiction,
        &Component::ALL,
        &settings.freshness,
        Utc::now(),
    );
    for (component, outcome) in evaluated {
        match outcome {
            Ok(fr) => println!("{fr}"),
            Err(e) => println!("{component}: ERROR ({e})"),
        }
    }
    Ok(())
}
