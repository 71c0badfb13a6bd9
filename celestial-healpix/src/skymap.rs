//! Multi-resolution probability sky maps.
//!
//! A [`SkyMap`] is a set of disjoint nested ranges, each carrying a
//! probability density per steradian. The ranges need not be single tiles
//! and need not cover the sphere. Probability of a range is
//! `probdensity · area`.
//!
//! The `level` credible region is built by ranking ranges by decreasing
//! density and accumulating probability. Ranges of equal density are
//! accumulated together, so a tie is either entirely inside the region or
//! entirely outside it.

use tracing::debug;

use crate::coverage::CoverageSet;
use crate::errors::{HealpixError, HealpixResult};
use crate::range::NestedRange;
use crate::tile::Tile;

/// Relative slack when comparing accumulated probability to a level, so a
/// normalized map reaches `1.0` despite rounding.
const LEVEL_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkyMapPixel {
    pub range: NestedRange,
    /// Probability per steradian.
    pub probdensity: f64,
}

impl SkyMapPixel {
    pub fn new(range: NestedRange, probdensity: f64) -> Self {
        Self { range, probdensity }
    }

    #[inline]
    pub fn probability(&self) -> f64 {
        self.probdensity * self.range.area()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<SkyMapPixel>", into = "Vec<SkyMapPixel>"))]
pub struct SkyMap {
    pixels: Vec<SkyMapPixel>,
}

impl SkyMap {
    /// Sorts the pixels by range and validates them.
    ///
    /// # Errors
    /// [`HealpixError::InvalidSkyMap`] if a density is negative or not
    /// finite, or two ranges overlap.
    pub fn new(mut pixels: Vec<SkyMapPixel>) -> HealpixResult<Self> {
        if let Some(bad) = pixels
            .iter()
            .find(|p| !p.probdensity.is_finite() || p.probdensity < 0.0)
        {
            return Err(HealpixError::invalid_sky_map(format!(
                "density {} at {} is not a finite non-negative number",
                bad.probdensity, bad.range
            )));
        }
        pixels.sort_by_key(|p| p.range);
        if let Some(pair) = pixels.windows(2).find(|w| w[0].range.overlaps(&w[1].range)) {
            return Err(HealpixError::invalid_sky_map(format!(
                "ranges {} and {} overlap",
                pair[0].range, pair[1].range
            )));
        }
        Ok(Self { pixels })
    }

    /// Builds from `(uniq, probdensity)` rows, the usual multi-order map
    /// file layout.
    pub fn from_uniq_rows<I>(rows: I) -> HealpixResult<Self>
    where
        I: IntoIterator<Item = (u64, f64)>,
    {
        let pixels = rows
            .into_iter()
            .map(|(uniq, probdensity)| {
                Tile::from_uniq(uniq).map(|tile| SkyMapPixel::new(tile.range(), probdensity))
            })
            .collect::<HealpixResult<Vec<_>>>()?;
        Self::new(pixels)
    }

    /// Pixels ordered by range.
    #[inline]
    pub fn pixels(&self) -> &[SkyMapPixel] {
        &self.pixels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// The region where the map is defined.
    pub fn coverage(&self) -> CoverageSet {
        CoverageSet::from_ranges(self.pixels.iter().map(|p| p.range))
    }

    pub fn total_probability(&self) -> f64 {
        self.pixels.iter().map(SkyMapPixel::probability).sum()
    }

    /// Rescales densities so the map integrates to 1.
    ///
    /// # Errors
    /// [`HealpixError::InvalidSkyMap`] if the map carries no probability.
    pub fn normalize(&mut self) -> HealpixResult<()> {
        let total = self.total_probability();
        if total <= 0.0 {
            return Err(HealpixError::invalid_sky_map(
                "cannot normalize a map with zero total probability",
            ));
        }
        for pixel in &mut self.pixels {
            pixel.probdensity /= total;
        }
        Ok(())
    }

    /// Lowest density whose cumulative probability, accumulated by
    /// decreasing density, stays within `level`.
    ///
    /// `None` if even the densest pixels alone exceed `level`.
    ///
    /// # Errors
    /// [`HealpixError::InvalidSkyMap`] unless `0 < level <= 1`.
    pub fn min_probdensity(&self, level: f64) -> HealpixResult<Option<f64>> {
        if !(level > 0.0 && level <= 1.0) {
            return Err(HealpixError::invalid_sky_map(format!(
                "credible level {} outside (0, 1]",
                level
            )));
        }
        let mut ranked: Vec<&SkyMapPixel> = self.pixels.iter().collect();
        ranked.sort_by(|a, b| b.probdensity.total_cmp(&a.probdensity));

        let mut threshold = None;
        let mut cumulative = 0.0;
        for group in ranked.chunk_by(|a, b| a.probdensity == b.probdensity) {
            cumulative += group.iter().map(|p| p.probability()).sum::<f64>();
            if cumulative > level * (1.0 + LEVEL_TOLERANCE) {
                break;
            }
            threshold = Some(group[0].probdensity);
        }
        debug!(level, ?threshold, cumulative, "credible region threshold");
        Ok(threshold)
    }

    /// Pixels at or above [`min_probdensity`](Self::min_probdensity).
    pub fn credible_region(&self, level: f64) -> HealpixResult<CoverageSet> {
        let Some(threshold) = self.min_probdensity(level)? else {
            return Ok(CoverageSet::new());
        };
        Ok(CoverageSet::from_ranges(
            self.pixels
                .iter()
                .filter(|p| p.probdensity >= threshold)
                .map(|p| p.range),
        ))
    }

    /// Probability enclosed by `coverage`.
    pub fn probability_in(&self, coverage: &CoverageSet) -> f64 {
        self.pixels
            .iter()
            .map(|p| {
                let shared = coverage.overlap_len(&p.range);
                p.probdensity * p.range.area() * (shared as f64 / p.range.len() as f64)
            })
            .sum()
    }
}

impl TryFrom<Vec<SkyMapPixel>> for SkyMap {
    type Error = HealpixError;

    fn try_from(pixels: Vec<SkyMapPixel>) -> Result<Self, Self::Error> {
        Self::new(pixels)
    }
}

impl From<SkyMap> for Vec<SkyMapPixel> {
    fn from(map: SkyMap) -> Self {
        map.pixels
    }
}
