use tracing::{debug, info};

use crate::quality::QualityParams;
use crate::ranking::{RankedAcquisition, Ranking};
use crate::error::{MosaicError, Result};

use super::tracking::{CompositeOutcome, Decision, ScoredAcquisition, TrackingCompositor};
use super::CompositorConfig;

/// Run the greedy selection over a ranking.
///
/// `load` produces the scored layers of a ranked acquisition and is called
/// once per scanned position, in ranked order. `on_decision` observes every
/// evaluated candidate, accepted or not.
pub fn composite<L, P>(
    ranking: &Ranking,
    mut load: L,
    config: &CompositorConfig,
    params: &QualityParams,
    mut on_decision: P,
) -> Result<CompositeOutcome>
where
    L: FnMut(&RankedAcquisition) -> Result<ScoredAcquisition>,
    P: FnMut(&Decision),
{
    let reference = ranking.get(0).ok_or(MosaicError::EmptySequence)?;
    let mut compositor =
        TrackingCompositor::new(load(reference)?, config.clone(), params.clone());
    info!(
        quality = compositor.average_quality(),
        "Reference quality"
    );

    let mut position = 1;
    loop {
        let next = ranking.get(position);
        if let Some(reason) = compositor.next_termination(next) {
            info!(%reason, scanned = compositor.scanned(), "Compositing finished");
            compositor.terminate(reason);
            break;
        }
        let Some(next) = next else { break };

        let candidate = load(next)?;
        let decision = compositor.evaluate(position, &candidate)?;
        debug!(
            position,
            changed = decision.changed_pixels(),
            improvement = decision.improvement(),
            threshold = decision.threshold,
            "Evaluated candidate"
        );
        on_decision(&decision);
        if decision.accepted {
            info!(
                quality = decision.merged_average,
                days = next.days(),
                "Updating tracking array"
            );
        }
        compositor.apply(decision, candidate)?;
        position += 1;
    }

    Ok(compositor.finish())
}
