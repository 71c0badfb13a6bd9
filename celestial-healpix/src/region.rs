//! Identified sky regions and point-in-region joins.
//!
//! A [`Region`] pairs a [`CoverageSet`] with the id of whatever owns it: a
//! survey field, an instrument footprint, a credible region. The joins here
//! are the in-memory form of the range-containment queries a store runs
//! against a tile table.

use tracing::debug;

use crate::coverage::CoverageSet;
use crate::errors::HealpixResult;
use crate::point::Point;
use crate::raster::PolygonRasterizer;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region<K> {
    id: K,
    coverage: CoverageSet,
}

impl<K> Region<K> {
    pub fn from_coverage(id: K, coverage: CoverageSet) -> Self {
        Self { id, coverage }
    }

    pub fn from_polygon<R>(id: K, rasterizer: &R, vertices: &[Point]) -> HealpixResult<Self>
    where
        R: PolygonRasterizer + ?Sized,
    {
        Ok(Self::from_coverage(
            id,
            CoverageSet::from_polygon(rasterizer, vertices)?,
        ))
    }

    #[inline]
    pub fn id(&self) -> &K {
        &self.id
    }

    #[inline]
    pub fn coverage(&self) -> &CoverageSet {
        &self.coverage
    }

    #[inline]
    pub fn contains(&self, point: &Point) -> bool {
        self.coverage.contains_point(point)
    }

    pub fn count_contained(&self, points: &[Point]) -> usize {
        points.iter().filter(|p| self.contains(p)).count()
    }
}

/// Number of `points` inside each region, largest count first, ties broken
/// by id. Regions containing no point are left out, as in an inner join.
pub fn crossmatch_counts<K>(regions: &[Region<K>], points: &[Point]) -> Vec<(K, usize)>
where
    K: Clone + Ord,
{
    let mut nested: Vec<u64> = points.iter().map(Point::nested).collect();
    nested.sort_unstable();

    let mut counts: Vec<(K, usize)> = regions
        .iter()
        .filter_map(|region| {
            let count: usize = region
                .coverage
                .iter()
                .map(|range| {
                    let start = nested.partition_point(|&n| n < range.lo());
                    let end = nested.partition_point(|&n| n < range.hi());
                    end - start
                })
                .sum();
            (count > 0).then(|| (region.id.clone(), count))
        })
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    debug!(
        regions = regions.len(),
        points = points.len(),
        matched = counts.len(),
        "crossmatched points against regions"
    );
    counts
}

/// Ids of the regions sharing at least one pixel with `coverage`, in input
/// order.
pub fn regions_overlapping<'a, K>(regions: &'a [Region<K>], coverage: &CoverageSet) -> Vec<&'a K> {
    regions
        .iter()
        .filter(|region| region.coverage.overlaps(coverage))
        .map(|region| &region.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::NestedRange;
    use crate::tile::Tile;

    fn region(id: &'static str, ranges: &[(u64, u64)]) -> Region<&'static str> {
        Region::from_coverage(
            id,
            CoverageSet::from_ranges(ranges.iter().map(|&(lo, hi)| NestedRange::new(lo, hi).unwrap())),
        )
    }

    fn points() -> Vec<Point> {
        [(10.0, 10.0), (10.0, -10.0), (100.0, 40.0), (200.0, -60.0), (300.0, 5.0)]
            .iter()
            .map(|&(lon, lat)| Point::new(lon, lat).unwrap())
            .collect()
    }

    fn base_range(pixel: u64) -> (u64, u64) {
        let tile = Tile::from_level_pixel(0, pixel).unwrap();
        (tile.lo(), tile.hi())
    }

    fn base_of(point: &Point) -> u64 {
        point.nested() >> 58
    }

    #[test]
    fn test_count_contained() {
        let pts = points();
        let home = base_of(&pts[0]);
        let r = region("a", &[base_range(home)]);
        let expected = pts.iter().filter(|p| base_of(p) == home).count();
        assert_eq!(r.count_contained(&pts), expected);
        assert!(r.contains(&pts[0]));
    }

    #[test]
    fn test_crossmatch_counts_sorted_desc() {
        let pts = points();
        let all_sky = region("all", &[(0, crate::constants::NPIX)]);
        let one = region("one", &[base_range(base_of(&pts[2]))]);
        let none = region("none", &[(0, 1)]);

        let counts = crossmatch_counts(&[one.clone(), none, all_sky.clone()], &pts);
        assert_eq!(counts[0], ("all", pts.len()));
        assert_eq!(counts[1].0, "one");
        assert_eq!(counts.len(), 2);

        for (id, count) in &counts {
            let r = if *id == "all" { &all_sky } else { &one };
            assert_eq!(*count, r.count_contained(&pts));
        }
    }

    #[test]
    fn test_crossmatch_ties_by_id() {
        let pts = points();
        let b = region("b", &[(0, crate::constants::NPIX)]);
        let a = region("a", &[(0, crate::constants::NPIX)]);
        let counts = crossmatch_counts(&[b, a], &pts);
        assert_eq!(counts, vec![("a", 5), ("b", 5)]);
    }

    #[test]
    fn test_regions_overlapping() {
        let regions = [region("x", &[(0, 4)]), region("y", &[(8, 16)]), region("z", &[(3, 9)])];
        let probe = CoverageSet::from_ranges([NestedRange::new(2, 5).unwrap()]);
        assert_eq!(regions_overlapping(&regions, &probe), vec![&"x", &"z"]);
    }
}
