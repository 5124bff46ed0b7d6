use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::scene::SceneClass;

/// Scene classes a harmonization sample may draw from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassSet {
    /// Vegetation, bare ground and unclassified.
    Land,
    LandAndWater,
    All,
}

impl ClassSet {
    pub fn contains(self, class: SceneClass) -> bool {
        match self {
            Self::Land => class.is_land(),
            Self::LandAndWater => class.is_land() || class == SceneClass::Water,
            Self::All => true,
        }
    }
}

impl std::fmt::Display for ClassSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Land => write!(f, "land"),
            Self::LandAndWater => write!(f, "land+water"),
            Self::All => write!(f, "all"),
        }
    }
}

/// One rung of the sample-widening ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplePolicy {
    pub classes: ClassSet,
    pub min_quality: u8,
}

impl SamplePolicy {
    pub fn mask(&self, scl: &Array2<u8>, quality: &Array2<u8>) -> Array2<bool> {
        Zip::from(scl).and(quality).map_collect(|&s, &q| {
            q >= self.min_quality && self.classes.contains(SceneClass::from_code(s))
        })
    }
}

/// Rungs in the order they are tried, narrowest first.
///
/// Land from quality 10 down to 7, then land and water down to 5, then every
/// class down to 0.
pub fn sample_ladder() -> Vec<SamplePolicy> {
    let rungs = [(ClassSet::Land, 7u8), (ClassSet::LandAndWater, 5), (ClassSet::All, 0)];
    rungs
        .into_iter()
        .flat_map(|(classes, floor)| {
            (floor..=10)
                .rev()
                .map(move |min_quality| SamplePolicy {
                    classes,
                    min_quality,
                })
        })
        .collect()
}

/// Walk the ladder until a rung selects at least `min_pixels` pixels.
///
/// Falls back to the widest rung when none does.
pub fn select_sample(
    scl: &Array2<u8>,
    quality: &Array2<u8>,
    min_pixels: usize,
) -> (SamplePolicy, Array2<bool>) {
    let ladder = sample_ladder();
    for policy in &ladder {
        let mask = policy.mask(scl, quality);
        if mask.iter().filter(|&&m| m).count() >= min_pixels {
            return (*policy, mask);
        }
    }
    let widest = SamplePolicy {
        classes: ClassSet::All,
        min_quality: 0,
    };
    (widest, widest.mask(scl, quality))
}
