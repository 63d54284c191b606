//! Batch job computing park walking accessibility and publishing it as a
//! new output generation.
//!
//! ```bash
//! parkaccess --config parkaccess.toml
//! parkaccess --config parkaccess.toml --output /srv/parkaccess --workers 8
//! ```

mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use parkaccess_core::prelude::*;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::RunConfig;

#[derive(Parser, Debug)]
#[command(name = "parkaccess", version, about = "Park walking accessibility pipeline")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "parkaccess.toml")]
    config: PathBuf,

    /// Output directory, overrides `output_dir` from the config file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker threads, overrides `pipeline.workers`
    #[arg(short, long)]
    workers: Option<usize>,

    /// Walking time budget in seconds, overrides `pipeline.time_budget_s`
    #[arg(long)]
    budget: Option<f64>,

    /// Compute everything but do not publish a generation
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = RunConfig::load(&args.config)?;
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(workers) = args.workers {
        config.pipeline.workers = Some(workers);
    }
    if let Some(budget) = args.budget {
        config.pipeline.time_budget_s = budget;
    }

    let started = chrono::Utc::now();
    let inputs = load_inputs(&config.inputs, &config.pipeline).context("Failed to load inputs")?;
    let output = run_pipeline(&inputs, &config.pipeline).context("Pipeline run failed")?;
    let artifacts = render_artifacts(&inputs, &output).context("Failed to render outputs")?;

    info!(
        "Graph has {} nodes and {} edges, {} of {} neighborhoods underserved",
        output.graph_nodes,
        output.graph_edges,
        output.summary.underserved_count,
        output.summary.total_neighborhoods,
    );

    if args.dry_run {
        info!("Dry run, nothing published");
    } else {
        let generation = publish_generation(&config.output_dir, &artifacts, started)
            .context("Failed to publish generation")?;
        info!("Generation {} is live at {}", generation.id, generation.path.display());
    }

    println!("{}", serde_json::to_string_pretty(&output.summary)?);
    Ok(())
}
