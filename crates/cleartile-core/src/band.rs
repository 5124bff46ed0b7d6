use serde::{Deserialize, Serialize};

/// Spectral bands carried through harmonization and blending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    B02,
    B03,
    B04,
    B08,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::B02, Band::B03, Band::B04, Band::B08];

    pub fn name(self) -> &'static str {
        match self {
            Band::B02 => "B02",
            Band::B03 => "B03",
            Band::B04 => "B04",
            Band::B08 => "B08",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per [`Band`], addressed by field so every band is always present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BandTable<T> {
    pub b02: T,
    pub b03: T,
    pub b04: T,
    pub b08: T,
}

impl<T> BandTable<T> {
    /// Build a table by evaluating `f` for every band.
    pub fn from_fn(mut f: impl FnMut(Band) -> T) -> Self {
        Self {
            b02: f(Band::B02),
            b03: f(Band::B03),
            b04: f(Band::B04),
            b08: f(Band::B08),
        }
    }

    /// Fallible variant of [`BandTable::from_fn`]; stops at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(Band) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            b02: f(Band::B02)?,
            b03: f(Band::B03)?,
            b04: f(Band::B04)?,
            b08: f(Band::B08)?,
        })
    }

    pub fn get(&self, band: Band) -> &T {
        match band {
            Band::B02 => &self.b02,
            Band::B03 => &self.b03,
            Band::B04 => &self.b04,
            Band::B08 => &self.b08,
        }
    }

    pub fn get_mut(&mut self, band: Band) -> &mut T {
        match band {
            Band::B02 => &mut self.b02,
            Band::B03 => &mut self.b03,
            Band::B04 => &mut self.b04,
            Band::B08 => &mut self.b08,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Band, &T) -> U) -> BandTable<U> {
        BandTable::from_fn(|band| f(band, self.get(band)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Band, &T)> {
        Band::ALL.into_iter().map(move |band| (band, self.get(band)))
    }
}
