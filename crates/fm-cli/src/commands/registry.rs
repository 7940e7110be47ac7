use anyhow::{Context, Result};
use fm_registry::EntityRegistry;
use fm_schemas::{EntityKey, Jurisdiction};

use super::{build_registry, load_settings, overrides, GlobalArgs};

pub fn list(global: &GlobalArgs) -> Result<()> {
    let settings = load_settings(global)?.settings;
    print_registry(&*build_registry(&settings)?);
    Ok(())
}

/// Registration only lives for this invocation; the listing shows the effect.
pub fn add(
    global: &GlobalArgs,
    ticker: &str,
    jurisdiction: &str,
    cik: Option<String>,
    scrip: Option<String>,
) -> Result<()> {
    let settings = load_settings(global)?.settings;
    let registry = build_registry(&settings)?;

    let key = EntityKey::new(ticker).with_context(|| format!("invalid ticker '{ticker}'"))?;
    let jurisdiction = Jurisdiction::parse(jurisdiction)
        .with_context(|| format!("invalid --jurisdiction '{jurisdiction}'"))?;
    let entry = registry.register(key, jurisdiction, overrides(cik, scrip))?;
    println!(
        "registered=true ticker={} jurisdiction={}",
        entry.ticker, entry.jurisdiction
    );
    print_registry(&registry);
    Ok(())
}

fn print_registry(registry: &EntityRegistry) {
    for e in registry.list() {
        let id = e
            .identifiers
            .for_jurisdiction(e.jurisdiction)
            .unwrap_or("-");
        println!("{}\t{}\t{}", e.ticker, e.jurisdiction, id);
    }
}
