use celestial_healpix::constants::{npix_at, width_at};
use celestial_healpix::index::{range_to_uniq, uniq_of, uniq_to_range};
use celestial_healpix::point::{decode, encode};
use celestial_healpix::{
    angular_separation_deg, within, CoverageSet, NestedRange, Point, Tile, MAX_DEPTH, NPIX,
};
use proptest::prelude::*;

/// Ranges packed into a small window so that overlaps and adjacency are
/// common, mixed with ranges anywhere on the sphere.
fn arb_range() -> impl Strategy<Value = NestedRange> {
    prop_oneof![
        3 => (0u64..2_000, 1u64..64).prop_map(|(lo, len)| NestedRange::new(lo, lo + len).unwrap()),
        1 => (0u64..NPIX - 1, 1u64..1 << 40).prop_map(|(lo, len)| {
            NestedRange::new(lo, (lo + len).min(NPIX)).unwrap()
        }),
    ]
}

fn arb_coverage() -> impl Strategy<Value = CoverageSet> {
    prop::collection::vec(arb_range(), 0..24).prop_map(CoverageSet::from_ranges)
}

fn arb_point() -> impl Strategy<Value = Point> {
    (0.0f64..360.0, -90.0f64..=90.0).prop_map(|(lon, lat)| Point::new(lon, lat).unwrap())
}

fn assert_canonical(coverage: &CoverageSet) {
    for range in coverage.iter() {
        assert!(range.lo() < range.hi());
        assert!(range.hi() <= NPIX);
    }
    for pair in coverage.ranges().windows(2) {
        // sorted, disjoint and not touching
        assert!(pair[0].hi() < pair[1].lo(), "{} then {}", pair[0], pair[1]);
    }
}

proptest! {
    #[test]
    fn uniq_round_trip(level in 0u8..=MAX_DEPTH, seed in any::<u64>()) {
        let pixel = seed % npix_at(level);
        let uniq = uniq_of(level, pixel).unwrap();
        let (lo, hi) = uniq_to_range(uniq).unwrap();
        prop_assert_eq!(hi - lo, width_at(level));
        prop_assert_eq!(lo % (hi - lo), 0);
        prop_assert_eq!(range_to_uniq(lo, hi).unwrap(), uniq);
    }

    #[test]
    fn non_power_of_four_widths_rejected(lo in 0u64..1 << 50, width in 2u64..1 << 20) {
        prop_assume!(!(width.is_power_of_two() && width.trailing_zeros() % 2 == 0));
        prop_assert!(range_to_uniq(lo, lo + width).is_err());
    }

    #[test]
    fn from_ranges_is_canonical(ranges in prop::collection::vec(arb_range(), 0..32)) {
        let coverage = CoverageSet::from_ranges(ranges.clone());
        assert_canonical(&coverage);
        for range in &ranges {
            prop_assert!(coverage.contains_range(range));
        }
    }

    #[test]
    fn from_ranges_is_idempotent(coverage in arb_coverage()) {
        let again = CoverageSet::from_ranges(coverage.ranges().to_vec());
        prop_assert_eq!(again, coverage);
    }

    #[test]
    fn union_is_commutative(a in arb_coverage(), b in arb_coverage()) {
        let ab = a.union(&b);
        prop_assert_eq!(&ab, &b.union(&a));
        assert_canonical(&ab);

        let flat = CoverageSet::from_ranges(a.iter().chain(b.iter()).copied());
        prop_assert_eq!(ab, flat);
    }

    #[test]
    fn union_area_is_subadditive(a in arb_coverage(), b in arb_coverage()) {
        let union = a.union(&b);
        let sum = a.pixel_count() + b.pixel_count();
        prop_assert!(union.pixel_count() <= sum);
        prop_assert_eq!(union.pixel_count() == sum, !a.overlaps(&b));

        let area_sum = a.total_area() + b.total_area();
        prop_assert!(union.total_area() <= area_sum * (1.0 + 1e-12));
    }

    #[test]
    fn containment_matches_members(coverage in arb_coverage(), probe in 0u64..2_100) {
        let expected = coverage.iter().any(|r| r.contains_index(probe));
        prop_assert_eq!(coverage.contains_index(probe), expected);
    }

    #[test]
    fn tile_decomposition_round_trips(coverage in arb_coverage()) {
        let tiles = coverage.to_tiles();
        for tile in &tiles {
            prop_assert_eq!(Tile::new(tile.lo(), tile.hi()).unwrap(), *tile);
        }
        prop_assert_eq!(CoverageSet::from_tiles(tiles), coverage.clone());
        prop_assert_eq!(CoverageSet::from_uniqs(coverage.to_uniqs()).unwrap(), coverage);
    }

    #[test]
    fn proximity_is_symmetric(a in arb_point(), b in arb_point(), radius in 0.0f64..179.0) {
        prop_assert_eq!(within(&a, &b, radius), within(&b, &a, radius));
    }

    #[test]
    fn proximity_agrees_with_separation(a in arb_point(), b in arb_point(), radius in 0.0f64..179.0) {
        let separation = angular_separation_deg(&a, &b);
        prop_assume!((separation - radius).abs() > 1e-4);
        prop_assert_eq!(within(&a, &b, radius), separation < radius);
    }

    #[test]
    fn every_ancestor_tile_contains_point(point in arb_point(), level in 0u8..=MAX_DEPTH) {
        let pixel = point.nested() >> (2 * (MAX_DEPTH - level) as u32);
        let tile = Tile::from_level_pixel(level, pixel).unwrap();
        prop_assert!(tile.contains(&point));
        if let Some(parent) = tile.parent() {
            prop_assert!(parent.contains(&point));
        }
    }

    #[test]
    fn decode_is_inverse_of_encode(point in arb_point()) {
        let nested = encode(point.lon(), point.lat()).unwrap();
        prop_assert_eq!(nested, point.nested());
        let (lon, lat) = decode(nested).unwrap();
        prop_assert_eq!(encode(lon, lat).unwrap(), nested);
    }
}
