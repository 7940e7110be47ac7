use anyhow::{bail, Context, Result};
use fm_reconcile::{Checklist, ReconcileRequest, ReconcileResult};

use super::{build_engine, build_registry, load_settings, overrides, GlobalArgs};

pub struct ReconcileArgs {
    pub ticker: String,
    pub cik: Option<String>,
    pub scrip: Option<String>,
    pub force: bool,
    pub components: Option<String>,
    pub include_unstructured: bool,
    pub json: bool,
}

pub fn run(global: &GlobalArgs, args: ReconcileArgs) -> Result<()> {
    let loaded = load_settings(global)?;
    let engine = build_engine(&loaded, build_registry(&loaded.settings)?);

    let checklist = match &args.components {
        Some(list) => Checklist::parse(list, args.include_unstructured)
            .with_context(|| format!("invalid --components '{list}'"))?,
        None if !args.include_unstructured => {
            Checklist::new(fm_schemas::Component::STRUCTURED.to_vec(), false)?
        }
        None => Checklist::default(),
    };
    if checklist.is_empty() {
        bail!("nothing to reconcile: empty component list and --no-unstructured");
    }

    let req = ReconcileRequest::new(args.ticker)
        .with_checklist(checklist)
        .with_overrides(overrides(args.cik, args.scrip))
        .force(args.force);
    let result = engine.reconcile(&req);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    if !result.success() {
        bail!("reconciliation failed for {}", result.ticker);
    }
    Ok(())
}

fn print_summary(r: &ReconcileResult) {
    println!("run_id={}", r.run_id);
    println!("config_hash={}", r.config_hash.as_deref().unwrap_or("none"));
    println!("ticker={}", r.ticker);
    println!(
        "jurisdiction={}",
        r.jurisdiction.map(|j| j.as_str()).unwrap_or("UNKNOWN")
    );
    println!("mode={}", r.mode.map(|m| m.as_str()).unwrap_or("none"));
    println!("folder_existed={}", r.folder_existed);
    for fr in &r.freshness {
        println!("check {fr}");
    }
    println!("updated={}", join(&r.components_updated));
    println!("indexed={}", join(&r.components_indexed));
    if let Some(s) = &r.index_summary {
        println!("index_entries={}", s.total_entries());
    }
    for e in &r.errors {
        println!("error={e}");
    }
    println!("success={}", r.success());
}

fn join(components: &[fm_schemas::Component]) -> String {
    components
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
