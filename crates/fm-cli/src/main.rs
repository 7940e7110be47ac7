use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::GlobalArgs;

#[derive(Parser)]
#[command(name = "fm")]
#[command(about = "finmirror control plane CLI", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring one entity's mirror and vector index up to date
    Reconcile {
        /// Entity ticker (case-insensitive)
        ticker: String,

        /// CIK override (US entities)
        #[arg(long)]
        cik: Option<String>,

        /// BSE scrip code override (Indian entities)
        #[arg(long)]
        scrip: Option<String>,

        /// Refetch every checklisted component regardless of freshness
        #[arg(long)]
        force: bool,

        /// Comma-separated structured components (default: all)
        #[arg(long)]
        components: Option<String>,

        /// Skip the filing document
        #[arg(long = "no-unstructured")]
        no_unstructured: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print per-component freshness without fetching anything
    Freshness {
        ticker: String,

        #[arg(long)]
        cik: Option<String>,

        #[arg(long)]
        scrip: Option<String>,
    },

    /// Inspect or extend the entity registry
    Registry {
        #[command(subcommand)]
        cmd: RegistryCmd,
    },

    /// Print the config hash + canonical JSON for the given layered config files
    ConfigHash {
        /// Paths in merge order (base first)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum RegistryCmd {
    /// List registered entities
    List,

    /// Validate and register an entity for this invocation, then list
    Add {
        ticker: String,

        /// us | india
        #[arg(long)]
        jurisdiction: String,

        #[arg(long)]
        cik: Option<String>,

        #[arg(long)]
        scrip: Option<String>,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Reconcile {
            ticker,
            cik,
            scrip,
            force,
            components,
            no_unstructured,
            json,
        } => commands::reconcile::run(
            &cli.global,
            commands::reconcile::ReconcileArgs {
                ticker,
                cik,
                scrip,
                force,
                components,
                include_unstructured: !no_unstructured,
                json,
            },
        ),

        Commands::Freshness { ticker, cik, scrip } => {
            commands::freshness::run(&cli.global, &ticker, cik, scrip)
        }

        Commands::Registry { cmd } => match cmd {
            RegistryCmd::List => commands::registry::list(&cli.global),
            RegistryCmd::Add {
                ticker,
                jurisdiction,
                cik,
                scrip,
            } => commands::registry::add(&cli.global, &ticker, &jurisdiction, cik, scrip),
        },

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = fm_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.fingerprint.hash);
            for (i, layer) in loaded.layers.iter().enumerate() {
                println!("layer[{i}]={layer}");
            }
            println!("{}", loaded.fingerprint.canonical_json);
            Ok(())
        }
    }
}

/// Logs go to stderr; stdout carries command output only.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
