use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use cleartile_core::io::{GridResampler, ManifestSource, MetadataSource, TiffRaster};
use cleartile_core::pipeline::{rank_manifest, PipelineConfig};

#[derive(Args)]
pub struct RankArgs {
    /// Acquisition manifest (TOML)
    pub manifest: PathBuf,

    /// Pipeline config file (TOML); only the quality and ranking sections are used
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &RankArgs) -> Result<()> {
    let config = match args.config {
        Some(ref path) => PipelineConfig::load(path)
            .with_context(|| format!("Invalid pipeline config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let acquisitions = ManifestSource::new(&args.manifest)
        .acquisitions()
        .with_context(|| format!("Invalid manifest {}", args.manifest.display()))?;

    let ranking = rank_manifest(&acquisitions, &config.mosaic, &TiffRaster, &GridResampler)?;

    println!("{:>4}  {:<32} {:>9} {:>7}", "#", "Acquisition", "Invalid", "Days");
    for (position, entry) in ranking.entries.iter().enumerate() {
        let acq = &acquisitions[entry.source_index];
        let marker = if position == 0 { " (reference)" } else { "" };
        println!(
            "{:>4}  {:<32} {:>8.2}% {:>7.1}{}",
            position,
            acq.id,
            acq.invalid_percentage,
            entry.days(),
            marker
        );
    }
    Ok(())
}
