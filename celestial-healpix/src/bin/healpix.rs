use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use celestial_core::constants::SQ_DEG_PER_SR;
use celestial_healpix::{
    angular_separation_deg, CdsRasterizer, CoverageSet, NestedRange, Point, Tile, UniqIndex,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Parser)]
#[command(name = "healpix")]
#[command(about = "HEALPix UNIQ, nested-range and coverage utilities")]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Log debug events to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a UNIQ integer into level, pixel and nested range
    Uniq { uniq: u64 },
    /// Encode a position as a depth-29 nested index
    Encode {
        /// Longitude in degrees
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        /// Latitude in degrees
        #[arg(allow_negative_numbers = true)]
        lat: f64,
    },
    /// Merge `[lo,hi)` rows from one or more files
    Union {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Rasterize a polygon given as `lon,lat` vertices
    Polygon {
        #[arg(required = true, num_args = 3.., allow_hyphen_values = true)]
        vertices: Vec<String>,
        /// Finest rasterization depth
        #[arg(long, default_value_t = CdsRasterizer::DEFAULT_DEPTH)]
        depth: u8,
        /// Also test great-circle edge extrema (approximate on meridian edges)
        #[arg(long)]
        exact: bool,
        /// Print the minimal UNIQ tile list instead of merged ranges
        #[arg(long)]
        tiles: bool,
    },
    /// Test whether two positions lie within a radius of each other
    Within {
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        /// Match radius in degrees
        #[arg(long)]
        radius: f64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Uniq { uniq } => {
            let index = UniqIndex::from_uniq(uniq)?;
            print_tiles(&[Tile::from_index(index)], cli.format)?;
        }
        Commands::Encode { lon, lat } => {
            let point = Point::new(lon, lat)?;
            print_point(&point, cli.format)?;
        }
        Commands::Union { files } => {
            let mut parts = Vec::with_capacity(files.len());
            for path in &files {
                parts.push(read_coverage(path)?);
            }
            let merged = CoverageSet::union_all(&parts);
            print_coverage(&merged, cli.format)?;
        }
        Commands::Polygon {
            vertices,
            depth,
            exact,
            tiles,
        } => {
            let vertices = vertices
                .iter()
                .map(|v| parse_vertex(v))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let rasterizer = CdsRasterizer::new(depth, exact)?;
            let coverage = CoverageSet::from_polygon(&rasterizer, &vertices)?;
            if tiles {
                print_tiles(&coverage.to_tiles(), cli.format)?;
            } else {
                print_coverage(&coverage, cli.format)?;
            }
        }
        Commands::Within {
            lon1,
            lat1,
            lon2,
            lat2,
            radius,
        } => {
            let a = Point::new(lon1, lat1)?;
            let b = Point::new(lon2, lat2)?;
            print_within(&a, &b, radius, cli.format)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_coverage(path: &Path) -> anyhow::Result<CoverageSet> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let mut ranges = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let range: NestedRange = line
            .parse()
            .with_context(|| format!("{}:{}", path.display(), n + 1))?;
        ranges.push(range);
    }
    tracing::debug!(path = %path.display(), rows = ranges.len(), "read coverage rows");
    Ok(CoverageSet::from_ranges(ranges))
}

fn parse_vertex(s: &str) -> anyhow::Result<Point> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("Cannot parse vertex '{}': expected lon,lat", s))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .with_context(|| format!("Cannot parse longitude in '{}'", s))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("Cannot parse latitude in '{}'", s))?;
    Ok(Point::new(lon, lat)?)
}

#[derive(serde::Serialize)]
struct TileRow {
    uniq: u64,
    level: u8,
    pixel: u64,
    range: NestedRange,
    area_sr: f64,
}

fn print_tiles(tiles: &[Tile], format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<TileRow> = tiles
        .iter()
        .map(|t| TileRow {
            uniq: t.uniq(),
            level: t.level(),
            pixel: t.pixel(),
            range: t.range(),
            area_sr: t.area(),
        })
        .collect();

    match format {
        OutputFormat::Table => {
            for (i, row) in rows.iter().enumerate() {
                println!(
                    "{:4}: uniq={:>20} level={:2} pixel={:>20} range={} area={:.6e} sr",
                    i + 1,
                    row.uniq,
                    row.level,
                    row.pixel,
                    row.range,
                    row.area_sr
                );
            }
            println!("\nTotal tiles: {}", rows.len());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Csv => {
            println!("uniq,level,pixel,lo,hi,area_sr");
            for row in &rows {
                println!(
                    "{},{},{},{},{},{}",
                    row.uniq,
                    row.level,
                    row.pixel,
                    row.range.lo(),
                    row.range.hi(),
                    row.area_sr
                );
            }
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct CoverageSummary<'a> {
    ranges: &'a CoverageSet,
    area_sr: f64,
    area_deg2: f64,
    sky_fraction: f64,
}

fn print_coverage(coverage: &CoverageSet, format: OutputFormat) -> anyhow::Result<()> {
    let area_sr = coverage.total_area();
    match format {
        OutputFormat::Table => {
            for literal in coverage.to_range_literals() {
                println!("{}", literal);
            }
            if coverage.is_empty() {
                println!("Coverage is empty.");
            } else {
                println!(
                    "\nRanges: {}  Area: {:.6} sr ({:.4} deg²)  Sky fraction: {:.6e}",
                    coverage.len(),
                    area_sr,
                    area_sr * SQ_DEG_PER_SR,
                    coverage.sky_fraction()
                );
            }
        }
        OutputFormat::Json => {
            let summary = CoverageSummary {
                ranges: coverage,
                area_sr,
                area_deg2: area_sr * SQ_DEG_PER_SR,
                sky_fraction: coverage.sky_fraction(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Csv => {
            println!("lo,hi,area_sr");
            for range in coverage {
                println!("{},{},{}", range.lo(), range.hi(), range.area());
            }
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct PointRow {
    lon: f64,
    lat: f64,
    nested: u64,
    x: f64,
    y: f64,
    z: f64,
}

fn print_point(point: &Point, format: OutputFormat) -> anyhow::Result<()> {
    let v = point.cartesian();
    let row = PointRow {
        lon: point.lon(),
        lat: point.lat(),
        nested: point.nested(),
        x: v.x,
        y: v.y,
        z: v.z,
    };
    match format {
        OutputFormat::Table => println!(
            "lon={:.9}° lat={:+.9}° nested={} xyz=({:.12}, {:.12}, {:.12})",
            row.lon, row.lat, row.nested, row.x, row.y, row.z
        ),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&row)?),
        OutputFormat::Csv => {
            println!("lon,lat,nested,x,y,z");
            println!(
                "{},{},{},{},{},{}",
                row.lon, row.lat, row.nested, row.x, row.y, row.z
            );
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct WithinRow {
    radius_deg: f64,
    separation_deg: f64,
    within: bool,
}

fn print_within(a: &Point, b: &Point, radius: f64, format: OutputFormat) -> anyhow::Result<()> {
    let row = WithinRow {
        radius_deg: radius,
        separation_deg: angular_separation_deg(a, b),
        within: a.within(b, radius),
    };
    match format {
        OutputFormat::Table => println!(
            "within={} separation={:.9}° radius={}°",
            row.within, row.separation_deg, row.radius_deg
        ),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&row)?),
        OutputFormat::Csv => {
            println!("radius_deg,separation_deg,within");
            println!("{},{},{}", row.radius_deg, row.separation_deg, row.within);
        }
    }
    Ok(())
}
