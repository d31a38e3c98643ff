//! Streamdex CLI
//!
//! Loads a snapshot JSON file, builds the derived views and prints the
//! date-tree breakdown.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use streamdex::{config::parse_granularity_list, Catalog, Config, DateTree, StreamId, TreeChild};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "streamdex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build derived views over a stream archive snapshot")]
struct Cli {
    /// Path to the snapshot JSON file
    snapshot: PathBuf,

    /// Config file path (default: standard locations)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Granularity sequence, coarsest first (e.g. "year,month,day")
    #[arg(short, long)]
    granularities: Option<String>,

    /// Only show streams from this channel
    #[arg(short, long)]
    channel: Option<String>,

    /// Show newest buckets first
    #[arg(long)]
    newest_first: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_logging(&config);

    let granularities = match &cli.granularities {
        Some(raw) => parse_granularity_list(raw)
            .with_context(|| format!("invalid granularity list: {:?}", raw))?,
        None => config.index.granularities.clone(),
    };

    tracing::info!("Streamdex v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Loading snapshot from {:?}", cli.snapshot);

    let json = std::fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("failed to read snapshot {:?}", cli.snapshot))?;
    let raw = streamdex::RawSnapshot::from_json(&json)?;
    let catalog = Catalog::build_with_granularities(raw, &granularities)?;

    tracing::info!("{}", catalog.stats());

    let tree = match &cli.channel {
        Some(channel) => catalog.by_date_for_channel(channel),
        None => catalog.by_date().clone(),
    };
    let tree = tree.invert(cli.newest_first, |&sid| catalog.published_at(sid));

    print_tree(&catalog, &tree, 0);

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("streamdex={}", config.logging.level)),
    );

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Print one tree level per indentation step, stream titles at the bottom
fn print_tree(catalog: &Catalog, tree: &DateTree<StreamId>, depth: usize) {
    let indent = "  ".repeat(depth);
    let granularity = tree.granularity();

    for (key, child) in tree.entries() {
        match child {
            TreeChild::Branch(subtree) => {
                println!(
                    "{}{} ({} streams)",
                    indent,
                    granularity.label(key.as_datetime()),
                    subtree.total_entries()
                );
                print_tree(catalog, subtree, depth + 1);
            }
            TreeChild::Leaves(stream_ids) => {
                println!("{}{}", indent, granularity.label(key.as_datetime()));
                for &sid in stream_ids {
                    let stream = catalog.stream(sid);
                    println!(
                        "{}  [{}] {} ({} clips)",
                        indent,
                        stream.channel,
                        stream.title,
                        stream.clips.len()
                    );
                }
            }
        }
    }
}
