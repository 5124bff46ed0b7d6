use ndarray::{Array2, Zip};
use tracing::debug;

use crate::acquisition::TrackingArray;
use crate::morphology::distance::distance_to_true;

/// Normalized blend weights, one field per accepted acquisition.
///
/// At every pixel the weights of all acquisitions sum to 1.
#[derive(Clone, Debug)]
pub struct FeatherWeights {
    pub indices: Vec<usize>,
    pub weights: Vec<Array2<f32>>,
}

impl FeatherWeights {
    /// Build weights that fade linearly from 1 at an acquisition's region
    /// to 0 at `distance` pixels outside it.
    pub fn compute(tracking: &TrackingArray, indices: &[usize], distance: f32) -> Self {
        let mut weights: Vec<Array2<f32>> = indices
            .iter()
            .map(|&index| {
                let value = index as u8;
                let owned = tracking.mapv(|t| t == value);
                if distance <= 0.0 {
                    return owned.mapv(|o| if o { 1.0 } else { 0.0 });
                }
                distance_to_true(&owned).mapv(|d| (1.0 - d / distance).max(0.0))
            })
            .collect();

        let mut total = Array2::<f32>::zeros(tracking.dim());
        for w in &weights {
            total += w;
        }
        for w in &mut weights {
            Zip::from(w).and(&total).for_each(|v, &t| {
                *v = if t > 0.0 { *v / t } else { 0.0 };
            });
        }
        debug!(acquisitions = indices.len(), distance, "Computed feather weights");

        Self {
            indices: indices.to_vec(),
            weights,
        }
    }

    pub fn weight(&self, index: usize) -> Option<&Array2<f32>> {
        self.indices
            .iter()
            .position(|&i| i == index)
            .map(|p| &self.weights[p])
    }

    /// Per-pixel sum of all weights.
    pub fn coverage(&self) -> Array2<f32> {
        let dim = self.weights.first().map(|w| w.dim()).unwrap_or((0, 0));
        let mut total = Array2::<f32>::zeros(dim);
        for w in &self.weights {
            total += w;
        }
        total
    }
}
