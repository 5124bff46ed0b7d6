use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use cleartile_core::harmonize::HarmonizationPolicy;
use cleartile_core::io::{GridResampler, ManifestSource, TiffRaster};
use cleartile_core::pipeline::{run_mosaic_reported, PipelineConfig};

use crate::progress::BarReporter;
use crate::summary::{print_output_summary, print_pipeline_summary};

#[derive(Args)]
pub struct RunArgs {
    /// Acquisition manifest (TOML)
    pub manifest: PathBuf,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Suffix of the output file names
    #[arg(long)]
    pub name: Option<String>,

    /// Hard seams instead of feathered blending
    #[arg(long)]
    pub no_feather: bool,

    /// Skip radiometric harmonization
    #[arg(long)]
    pub no_harmonize: bool,

    /// Use the experimental stratified harmonization policy
    #[arg(long)]
    pub stratified: bool,

    /// Maximum days between an acquisition and the reference
    #[arg(long)]
    pub max_days: Option<i64>,

    /// Stop once the average quality reaches this percentage
    #[arg(long)]
    pub ideal: Option<f64>,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str::<PipelineConfig>(&contents).context("Invalid pipeline config")?
    } else {
        PipelineConfig::default()
    };
    apply_args(&mut config, args);
    config.validate().context("Invalid pipeline config")?;

    print_pipeline_summary(&config);

    let source = ManifestSource::new(&config.manifest);
    let reporter = Arc::new(BarReporter::new()?);
    let output = run_mosaic_reported(
        &config,
        &source,
        &TiffRaster,
        &GridResampler,
        reporter.clone(),
    )
    .with_context(|| format!("Mosaic from {} failed", config.manifest.display()))?;
    reporter.finish();

    print_output_summary(&output);
    Ok(())
}

fn apply_args(config: &mut PipelineConfig, args: &RunArgs) {
    config.manifest = args.manifest.clone();
    if let Some(ref dir) = args.output {
        config.output_dir = dir.clone();
    }
    if let Some(ref name) = args.name {
        config.name = name.clone();
    }
    let mosaic = &mut config.mosaic;
    if args.no_feather {
        mosaic.blend.feather = false;
    }
    if args.no_harmonize {
        mosaic.harmonization.enabled = false;
    }
    if args.stratified {
        mosaic.harmonization.policy = HarmonizationPolicy::Stratified;
    }
    if let Some(days) = args.max_days {
        mosaic.compositor.max_days = days;
    }
    if let Some(ideal) = args.ideal {
        mosaic.compositor.ideal_percent = ideal;
    }
}
