use serde::{Deserialize, Serialize};

/// Scene classification (SCL) classes of a Level-2A product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SceneClass {
    NoData = 0,
    SaturatedDefective = 1,
    DarkFeatureShadow = 2,
    CloudShadow = 3,
    Vegetation = 4,
    NotVegetated = 5,
    Water = 6,
    Unclassified = 7,
    CloudMediumProbability = 8,
    CloudHighProbability = 9,
    ThinCirrus = 10,
    SnowIce = 11,
}

impl SceneClass {
    pub const ALL: [SceneClass; 12] = [
        Self::NoData,
        Self::SaturatedDefective,
        Self::DarkFeatureShadow,
        Self::CloudShadow,
        Self::Vegetation,
        Self::NotVegetated,
        Self::Water,
        Self::Unclassified,
        Self::CloudMediumProbability,
        Self::CloudHighProbability,
        Self::ThinCirrus,
        Self::SnowIce,
    ];

    /// Decode a raw SCL value. Codes outside the enumeration are nodata.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::SaturatedDefective,
            2 => Self::DarkFeatureShadow,
            3 => Self::CloudShadow,
            4 => Self::Vegetation,
            5 => Self::NotVegetated,
            6 => Self::Water,
            7 => Self::Unclassified,
            8 => Self::CloudMediumProbability,
            9 => Self::CloudHighProbability,
            10 => Self::ThinCirrus,
            11 => Self::SnowIce,
            _ => Self::NoData,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Vegetation, bare ground or unclassified surface.
    pub fn is_land(self) -> bool {
        matches!(
            self,
            Self::Vegetation | Self::NotVegetated | Self::Unclassified
        )
    }

    /// Classes counted towards an acquisition's invalid percentage.
    pub fn is_contaminated(self) -> bool {
        matches!(
            self,
            Self::NoData
                | Self::SaturatedDefective
                | Self::DarkFeatureShadow
                | Self::CloudShadow
                | Self::CloudMediumProbability
                | Self::CloudHighProbability
                | Self::ThinCirrus
                | Self::SnowIce
        )
    }
}

impl std::fmt::Display for SceneClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoData => write!(f, "No Data"),
            Self::SaturatedDefective => write!(f, "Saturated / Defective"),
            Self::DarkFeatureShadow => write!(f, "Dark Feature / Shadow"),
            Self::CloudShadow => write!(f, "Cloud Shadow"),
            Self::Vegetation => write!(f, "Vegetation"),
            Self::NotVegetated => write!(f, "Not Vegetated"),
            Self::Water => write!(f, "Water"),
            Self::Unclassified => write!(f, "Unclassified"),
            Self::CloudMediumProbability => write!(f, "Cloud (medium)"),
            Self::CloudHighProbability => write!(f, "Cloud (high)"),
            Self::ThinCirrus => write!(f, "Thin Cirrus"),
            Self::SnowIce => write!(f, "Snow / Ice"),
        }
    }
}

/// Land-cover strata used by stratified harmonization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stratum {
    Vegetation,
    NonVegetation,
    Unclassified,
    Water,
}

impl Stratum {
    pub const ALL: [Stratum; 4] = [
        Self::Vegetation,
        Self::NonVegetation,
        Self::Unclassified,
        Self::Water,
    ];

    pub fn class(self) -> SceneClass {
        match self {
            Self::Vegetation => SceneClass::Vegetation,
            Self::NonVegetation => SceneClass::NotVegetated,
            Self::Unclassified => SceneClass::Unclassified,
            Self::Water => SceneClass::Water,
        }
    }

    /// Stratum of a raw SCL code, if it belongs to one.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.class().code() == code)
    }
}

impl std::fmt::Display for Stratum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vegetation => write!(f, "vegetation"),
            Self::NonVegetation => write!(f, "non-vegetation"),
            Self::Unclassified => write!(f, "unclassified"),
            Self::Water => write!(f, "water"),
        }
    }
}

/// One value per [`Stratum`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StratumTable<T> {
    pub vegetation: T,
    pub non_vegetation: T,
    pub unclassified: T,
    pub water: T,
}

impl<T> StratumTable<T> {
    pub fn from_fn(mut f: impl FnMut(Stratum) -> T) -> Self {
        Self {
            vegetation: f(Stratum::Vegetation),
            non_vegetation: f(Stratum::NonVegetation),
            unclassified: f(Stratum::Unclassified),
            water: f(Stratum::Water),
        }
    }

    pub fn get(&self, stratum: Stratum) -> &T {
        match stratum {
            Stratum::Vegetation => &self.vegetation,
            Stratum::NonVegetation => &self.non_vegetation,
            Stratum::Unclassified => &self.unclassified,
            Stratum::Water => &self.water,
        }
    }

    pub fn get_mut(&mut self, stratum: Stratum) -> &mut T {
        match stratum {
            Stratum::Vegetation => &mut self.vegetation,
            Stratum::NonVegetation => &mut self.non_vegetation,
            Stratum::Unclassified => &mut self.unclassified,
            Stratum::Water => &mut self.water,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stratum, &T)> {
        Stratum::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}
