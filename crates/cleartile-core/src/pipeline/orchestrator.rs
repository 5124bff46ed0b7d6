use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::acquisition::Acquisition;
use crate::band::{Band, BandTable};
use crate::blend::{blend_band, finish_band, smooth_tracking, FeatherWeights};
use crate::composite::{composite, ScoredAcquisition};
use crate::error::{MosaicError, Result};
use crate::harmonize::harmonize;
use crate::io::manifest::ensure_single_tile;
use crate::io::raster::{from_f32, to_f32};
use crate::io::{MetadataSource, RasterSource, Resampler};
use crate::quality::assess::{assess_quality, assess_scalar};
use crate::ranking::{rank_acquisitions, rank_by_time, Ranking};

use super::config::{MosaicConfig, PipelineConfig};
use super::helpers::{coarsen_layers, fit_reflectance, load_band, load_layers};
use super::types::{MosaicOutput, NoOpReporter, PipelineStage, ProgressReporter};

fn rank(
    acquisitions: &[Acquisition],
    config: &MosaicConfig,
    raster: &dyn RasterSource,
    resampler: &dyn Resampler,
    reporter: &dyn ProgressReporter,
) -> Result<Ranking> {
    if acquisitions.len() == 1 {
        return Ok(rank_by_time(acquisitions, 0));
    }
    let factor = config.ranking.coarse_factor;
    let coarse_params = config.quality.coarse(factor);
    let mut scored = 0;
    rank_acquisitions(acquisitions, &config.ranking, |i| {
        let layers = load_layers(&acquisitions[i], raster, resampler)?;
        let coarse = coarsen_layers(&layers, factor, resampler)?;
        let score = assess_scalar(&coarse, &coarse_params, factor as f32)?;
        scored += 1;
        reporter.advance(scored);
        Ok(score)
    })
}

/// Select the reference and rank `acquisitions` the way a mosaic build does.
pub fn rank_manifest(
    acquisitions: &[Acquisition],
    config: &MosaicConfig,
    raster: &dyn RasterSource,
    resampler: &dyn Resampler,
) -> Result<Ranking> {
    config.validate()?;
    if acquisitions.is_empty() {
        return Err(MosaicError::EmptySequence);
    }
    rank(acquisitions, config, raster, resampler, &NoOpReporter)
}

/// Build a mosaic in memory from validated acquisitions.
///
/// Every per-acquisition error aborts the build.
pub fn build_mosaic(
    acquisitions: &[Acquisition],
    config: &MosaicConfig,
    raster: &dyn RasterSource,
    resampler: &dyn Resampler,
    reporter: &dyn ProgressReporter,
) -> Result<MosaicOutput> {
    config.validate()?;

    reporter.begin_stage(PipelineStage::Validating, Some(acquisitions.len()));
    if acquisitions.is_empty() {
        return Err(MosaicError::EmptySequence);
    }
    ensure_single_tile(acquisitions)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Ranking, None);
    let ranking = rank(acquisitions, config, raster, resampler, reporter)?;
    reporter.finish_stage();
    let source_of = |position: usize| ranking.entries[position].source_index;
    let reference = &acquisitions[source_of(0)];

    let candidates = (ranking.len() - 1).min(config.compositor.max_search_images);
    reporter.begin_stage(PipelineStage::Compositing, Some(candidates));
    let mut scanned = 0;
    let outcome = composite(
        &ranking,
        |ranked| {
            let layers = load_layers(&acquisitions[ranked.source_index], raster, resampler)?;
            let quality = assess_quality(&layers, &config.quality)?;
            ScoredAcquisition::new(layers.scl, layers.band_a, quality)
        },
        &config.compositor,
        &config.quality,
        |_| {
            scanned += 1;
            reporter.advance(scanned);
        },
    )?;
    reporter.finish_stage();

    let multi = outcome.is_multi_source();
    let working_shape = outcome.tracking.dim();

    let harmonization = if multi && config.harmonization.enabled {
        reporter.begin_stage(PipelineStage::Harmonizing, Some(outcome.contributions.len()));
        let corrections = harmonize(
            &outcome,
            |position, band| {
                load_band(
                    &acquisitions[source_of(position)],
                    band,
                    working_shape,
                    raster,
                    resampler,
                )
            },
            &config.harmonization,
        )?;
        reporter.finish_stage();
        Some(corrections)
    } else {
        None
    };

    let output_shape = raster.dimensions(&reference.paths.bands.b04)?;
    let mut tracking = resampler.resample_categorical(&outcome.tracking, output_shape)?;
    let scl = resampler.resample_categorical(&outcome.scl, output_shape)?;

    if multi && config.blend.filter_tracking {
        reporter.begin_stage(PipelineStage::Filtering, None);
        tracking = smooth_tracking(&tracking, &config.blend);
        reporter.finish_stage();
    }

    let weights = if multi && config.blend.feather {
        reporter.begin_stage(PipelineStage::Feathering, Some(outcome.processed_indices.len()));
        let weights = FeatherWeights::compute(
            &tracking,
            &outcome.processed_indices,
            config.blend.feather_distance,
        );
        reporter.finish_stage();
        Some(weights)
    } else {
        None
    };

    if !multi {
        info!(reference = %reference.id, "Single acquisition selected, passing reference through");
    }
    reporter.begin_stage(PipelineStage::Blending, Some(Band::ALL.len()));
    let mut blended_bands = 0;
    let bands = BandTable::try_from_fn(|band| {
        let output = if multi {
            let blended = blend_band(
                &tracking,
                &outcome.processed_indices,
                band,
                harmonization.as_ref(),
                weights.as_ref(),
                |position| {
                    load_band(
                        &acquisitions[source_of(position)],
                        band,
                        output_shape,
                        raster,
                        resampler,
                    )
                },
            )?;
            finish_band(&blended, config.blend.noise_reduction)
        } else {
            let raw = raster.read(reference.paths.bands.get(band))?;
            if raw.dim() == output_shape {
                raw
            } else {
                from_f32(&fit_reflectance(&to_f32(&raw), output_shape, resampler)?)
            }
        };
        blended_bands += 1;
        reporter.advance(blended_bands);
        Ok::<_, MosaicError>(output)
    })?;
    reporter.finish_stage();

    let accepted_ids = outcome
        .processed_indices
        .iter()
        .map(|&position| acquisitions[source_of(position)].id.clone())
        .collect();
    info!(
        quality = outcome.average_quality,
        accepted = outcome.processed_indices.len(),
        termination = %outcome.termination,
        "Mosaic complete"
    );

    Ok(MosaicOutput {
        tracking,
        scl,
        bands,
        quality: outcome.quality,
        reference_id: reference.id.clone(),
        accepted_ids,
        processed_indices: outcome.processed_indices,
        initial_quality: outcome.initial_average,
        average_quality: outcome.average_quality,
        scanned: outcome.scanned,
        termination: outcome.termination,
        harmonized: harmonization.is_some(),
        feathered: weights.is_some(),
        written: Vec::new(),
    })
}

/// Write the tracking array, the classification mosaic and every band.
pub fn write_outputs(
    output: &MosaicOutput,
    config: &PipelineConfig,
    raster: &dyn RasterSource,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(2 + Band::ALL.len());

    let path = config.output_path("tracking");
    raster.write_u8(&output.tracking, &path)?;
    written.push(path);

    let path = config.output_path("scl");
    raster.write_u8(&output.scl, &path)?;
    written.push(path);

    for (band, data) in output.bands.iter() {
        let path = config.output_path(band.name());
        raster.write_u16(data, &path)?;
        written.push(path);
    }
    info!(files = written.len(), dir = %config.output_dir.display(), "Wrote mosaic");
    Ok(written)
}

/// Run the full pipeline with a thread-safe progress reporter.
pub fn run_mosaic_reported(
    config: &PipelineConfig,
    source: &dyn MetadataSource,
    raster: &dyn RasterSource,
    resampler: &dyn Resampler,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<MosaicOutput> {
    config.validate()?;
    let acquisitions = source.acquisitions()?;
    let mut output = build_mosaic(
        &acquisitions,
        &config.mosaic,
        raster,
        resampler,
        reporter.as_ref(),
    )?;

    reporter.begin_stage(PipelineStage::Writing, Some(2 + Band::ALL.len()));
    output.written = write_outputs(&output, config, raster)?;
    reporter.finish_stage();
    Ok(output)
}

/// Run the full pipeline.
pub fn run_mosaic(
    config: &PipelineConfig,
    source: &dyn MetadataSource,
    raster: &dyn RasterSource,
    resampler: &dyn Resampler,
) -> Result<MosaicOutput> {
    run_mosaic_reported(config, source, raster, resampler, Arc::new(NoOpReporter))
}
