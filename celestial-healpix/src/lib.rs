//! HEALPix multi-order coverage for indexing sky data in relational stores.
//!
//! Every position and region is expressed at one fixed depth,
//! [`MAX_DEPTH`] = 29. A point becomes a single depth-29 nested index; a
//! coarser pixel becomes the contiguous block of depth-29 indices it covers,
//! stored as a half-open integer range. With that convention "pixel contains
//! point" is an integer range test and "regions intersect" is range overlap,
//! both of which an `int8range` column with an SP-GiST index answers directly.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`index`] | UNIQ ⇔ `(level, pixel)` ⇔ nested range arithmetic |
//! | [`point`] | [`Point`]: lon/lat with cached Cartesian vector and nested index |
//! | [`range`] | [`NestedRange`], the `[lo,hi)` storage unit |
//! | [`tile`] | [`Tile`], a range that is exactly one hierarchical pixel |
//! | [`coverage`] | [`CoverageSet`], sorted disjoint merged ranges and their set algebra |
//! | [`raster`] | [`PolygonRasterizer`] seam and the `cdshealpix`-backed [`CdsRasterizer`] |
//! | [`proximity`] | [`within`], bounding-box prefilter, pair matching |
//! | [`region`] | [`Region`] and point-in-region crossmatch |
//! | [`skymap`] | [`SkyMap`] probability maps and credible regions |
//! | [`schema`] | Column configuration and DDL/predicate rendering |
//! | [`trig`] | [`TrigFunction`] with per-dialect SQL rendering |
//!
//! # Quick Start
//!
//! ```
//! use celestial_healpix::{CoverageSet, Point, Tile};
//!
//! let point = Point::new(83.633, -5.375).unwrap();
//! let base = Tile::from_level_pixel(0, point.nested() >> 58).unwrap();
//! assert!(base.contains(&point));
//!
//! let field = CoverageSet::from_tiles(base.children().unwrap());
//! assert_eq!(field.len(), 1);
//! assert!(field.contains_point(&point));
//! assert!((field.total_area() - base.area()).abs() < 1e-15);
//! ```
//!
//! # Features
//!
//! - **`serde`**: `Serialize`/`Deserialize` on the value types.
//! - **`cli`**: the `healpix` binary for decoding, encoding, merging and
//!   rasterizing from the command line.

pub mod constants;
pub mod coverage;
pub mod errors;
pub mod index;
pub mod point;
pub mod proximity;
pub mod range;
pub mod raster;
pub mod region;
pub mod schema;
pub mod skymap;
pub mod tile;
pub mod trig;

pub use constants::{MAX_DEPTH, NPIX, PIXEL_AREA};
pub use coverage::CoverageSet;
pub use errors::{HealpixError, HealpixResult};
pub use index::{range_to_uniq, uniq_to_range, UniqIndex};
pub use point::{encode, to_cartesian, LonLat, Point};
pub use proximity::{angular_separation_deg, match_within, within, BoundingBox};
pub use range::NestedRange;
pub use raster::{CdsRasterizer, PolygonRasterizer};
pub use region::{crossmatch_counts, Region};
pub use skymap::{SkyMap, SkyMapPixel};
pub use schema::{within_predicate_sql, ColumnSpec, PointColumns, TileColumn};
pub use tile::Tile;
pub use trig::{SqlDialect, TrigFunction};
