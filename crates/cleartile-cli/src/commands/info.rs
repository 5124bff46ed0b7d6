use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use cleartile_core::io::{ManifestSource, MetadataSource};

#[derive(Args)]
pub struct InfoArgs {
    /// Acquisition manifest (TOML)
    pub manifest: PathBuf,

    /// Do not check that raster files exist
    #[arg(long)]
    pub no_file_check: bool,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let mut source = ManifestSource::new(&args.manifest);
    if args.no_file_check {
        source = source.without_file_check();
    }
    let acquisitions = source
        .acquisitions()
        .with_context(|| format!("Invalid manifest {}", args.manifest.display()))?;

    println!("Manifest:      {}", args.manifest.display());
    println!("Acquisitions:  {}", acquisitions.len());
    if let Some(tile) = acquisitions.iter().find_map(|a| a.tile.as_deref()) {
        println!("Tile:          {}", tile);
    }
    println!();

    for acq in &acquisitions {
        println!("{}", acq.id);
        println!("  Timestamp:   {}", acq.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
        println!("  Invalid:     {:.2}%", acq.invalid_percentage);
        println!("  SCL:         {}", acq.paths.scl.display());
        println!("  Aerosol:     {}", acq.paths.aerosol.display());
        println!("  Blue:        {}", acq.paths.blue.display());
        for (band, path) in acq.paths.bands.iter() {
            println!("  {:<13}{}", format!("{band}:"), path.display());
        }
    }

    Ok(())
}
