//! Relational storage layout for tiles and points.
//!
//! Nothing here talks to a database. These types describe the columns a
//! store needs and render the DDL and predicates for them, so an ORM or a
//! migration tool can take the text as is.
//!
//! Tiles live in an `INT8RANGE` column under an SP-GiST index, which serves
//! both `&&` (overlap) and `@>` (containment). Points store their lon/lat
//! plus the derived Cartesian components and depth-29 nested index; the
//! derived columns carry the indexes.

use crate::errors::{HealpixError, HealpixResult};
use crate::point::Point;
use crate::trig::{SqlDialect, TrigFunction};

/// Name and nullability of one column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSpec {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub nullable: bool,
}

impl ColumnSpec {
    /// A `NOT NULL` column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn definition(&self, sql_type: &str) -> String {
        if self.nullable {
            format!("{} {}", self.name, sql_type)
        } else {
            format!("{} {} NOT NULL", self.name, sql_type)
        }
    }

    fn validate(&self) -> HealpixResult<()> {
        validate_identifier(&self.name)
    }
}

fn validate_identifier(name: &str) -> HealpixResult<()> {
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(HealpixError::parse(name, "not a plain SQL identifier"))
    }
}

fn create_table(table: &str, columns: &[String]) -> HealpixResult<String> {
    validate_identifier(table)?;
    let mut sql = format!("CREATE TABLE {} (id BIGINT PRIMARY KEY", table);
    for column in columns {
        sql.push_str(", ");
        sql.push_str(column);
    }
    sql.push(')');
    Ok(sql)
}

/// A tile stored as `INT8RANGE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileColumn {
    pub column: ColumnSpec,
}

impl TileColumn {
    pub const SQL_TYPE: &'static str = "INT8RANGE";

    pub fn new(column: ColumnSpec) -> Self {
        Self { column }
    }

    pub fn name(&self) -> &str {
        &self.column.name
    }

    pub fn create_table_sql(&self, table: &str) -> HealpixResult<String> {
        self.column.validate()?;
        create_table(table, &[self.column.definition(Self::SQL_TYPE)])
    }

    pub fn create_index_sql(&self, table: &str) -> HealpixResult<String> {
        validate_identifier(table)?;
        self.column.validate()?;
        Ok(format!(
            "CREATE INDEX ix_{table}_{col} ON {table} USING spgist ({col})",
            table = table,
            col = self.name()
        ))
    }

    /// `tile @> point.nested`.
    pub fn contains_point_sql(&self, alias: &str, points: &PointColumns, point_alias: &str) -> String {
        format!(
            "{}.{} @> {}.{}",
            alias,
            self.name(),
            point_alias,
            points.nested.name
        )
    }

    pub fn overlaps_sql(&self, alias: &str, other: &TileColumn, other_alias: &str) -> String {
        format!("{}.{} && {}.{}", alias, self.name(), other_alias, other.name())
    }
}

impl Default for TileColumn {
    fn default() -> Self {
        Self::new(ColumnSpec::new("hpx"))
    }
}

/// Column layout for a stored point.
///
/// Names default to `lon`, `lat`, `x`, `y`, `z` and `nested`. Nullability
/// is per column; a nullable position should make its derived columns
/// nullable too, which [`PointColumns::nullable`] does in one step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointColumns {
    pub lon: ColumnSpec,
    pub lat: ColumnSpec,
    pub x: ColumnSpec,
    pub y: ColumnSpec,
    pub z: ColumnSpec,
    pub nested: ColumnSpec,
}

impl Default for PointColumns {
    fn default() -> Self {
        Self {
            lon: ColumnSpec::new("lon"),
            lat: ColumnSpec::new("lat"),
            x: ColumnSpec::new("x"),
            y: ColumnSpec::new("y"),
            z: ColumnSpec::new("z"),
            nested: ColumnSpec::new("nested"),
        }
    }
}

impl PointColumns {
    /// Custom axis names, e.g. `("ra", "dec")`.
    pub fn with_axes(lon: impl Into<String>, lat: impl Into<String>) -> Self {
        Self {
            lon: ColumnSpec::new(lon),
            lat: ColumnSpec::new(lat),
            ..Self::default()
        }
    }

    /// Sets nullability on every column.
    pub fn nullable(mut self, nullable: bool) -> Self {
        for column in self.columns_mut() {
            column.nullable = nullable;
        }
        self
    }

    fn columns(&self) -> [&ColumnSpec; 6] {
        [&self.lon, &self.lat, &self.x, &self.y, &self.z, &self.nested]
    }

    fn columns_mut(&mut self) -> [&mut ColumnSpec; 6] {
        [
            &mut self.lon,
            &mut self.lat,
            &mut self.x,
            &mut self.y,
            &mut self.z,
            &mut self.nested,
        ]
    }

    pub fn column_definitions(&self) -> Vec<String> {
        let [lon, lat, x, y, z, nested] = self.columns();
        vec![
            lon.definition("DOUBLE PRECISION"),
            lat.definition("DOUBLE PRECISION"),
            x.definition("DOUBLE PRECISION"),
            y.definition("DOUBLE PRECISION"),
            z.definition("DOUBLE PRECISION"),
            nested.definition("BIGINT"),
        ]
    }

    fn validate(&self) -> HealpixResult<()> {
        self.columns().into_iter().try_for_each(ColumnSpec::validate)
    }

    pub fn create_table_sql(&self, table: &str) -> HealpixResult<String> {
        self.validate()?;
        create_table(table, &self.column_definitions())
    }

    /// A composite index on the Cartesian components for the proximity
    /// prefilter and a B-tree on the nested index for tile joins.
    pub fn create_index_sql(&self, table: &str) -> HealpixResult<Vec<String>> {
        validate_identifier(table)?;
        self.validate()?;
        Ok(vec![
            format!(
                "CREATE INDEX ix_{t}_point ON {t} ({}, {}, {})",
                self.x.name,
                self.y.name,
                self.z.name,
                t = table
            ),
            format!(
                "CREATE INDEX ix_{t}_{n} ON {t} ({n})",
                t = table,
                n = self.nested.name
            ),
        ])
    }

    /// Insert statement storing `point` with its derived columns.
    pub fn insert_sql(&self, table: &str, point: &Point) -> HealpixResult<String> {
        validate_identifier(table)?;
        self.validate()?;
        let names: Vec<&str> = self.columns().into_iter().map(|c| c.name.as_str()).collect();
        let v = point.cartesian();
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({}, {}, {}, {}, {}, {})",
            table,
            names.join(", "),
            point.lon(),
            point.lat(),
            v.x,
            v.y,
            v.z,
            point.nested()
        ))
    }
}

/// SQL form of [`within`](crate::proximity::within) between two aliased
/// point tables: the bounding-box terms first so the planner can use the
/// `(x, y, z)` index, then the dot product. From 90° up the box no longer
/// prunes anything and is left out.
pub fn within_predicate_sql(
    left: &PointColumns,
    left_alias: &str,
    right: &PointColumns,
    right_alias: &str,
    radius_deg: f64,
    dialect: SqlDialect,
) -> String {
    let radius = format!("{}", radius_deg);
    let sin_radius = TrigFunction::Sind.to_sql(&radius, dialect);
    let cos_radius = TrigFunction::Cosd.to_sql(&radius, dialect);
    let axes = [(&left.x, &right.x), (&left.y, &right.y), (&left.z, &right.z)];

    let mut terms: Vec<String> = Vec::new();
    if radius_deg < 90.0 {
        terms.extend(axes.iter().map(|(l, r)| {
            format!(
                "{la}.{l} BETWEEN {ra}.{r} - 2 * {s} AND {ra}.{r} + 2 * {s}",
                la = left_alias,
                l = l.name,
                ra = right_alias,
                r = r.name,
                s = sin_radius
            )
        }));
    }
    let dot: Vec<String> = axes
        .iter()
        .map(|(l, r)| format!("{}.{} * {}.{}", left_alias, l.name, right_alias, r.name))
        .collect();
    terms.push(format!("{} >= {}", dot.join(" + "), cos_radius));
    terms.join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_definition() {
        assert_eq!(ColumnSpec::new("hpx").definition("INT8RANGE"), "hpx INT8RANGE NOT NULL");
        assert_eq!(
            ColumnSpec::new("hpx").nullable(true).definition("INT8RANGE"),
            "hpx INT8RANGE"
        );
    }

    #[test]
    fn test_tile_table() {
        let tiles = TileColumn::default();
        assert_eq!(
            tiles.create_table_sql("fieldtile").unwrap(),
            "CREATE TABLE fieldtile (id BIGINT PRIMARY KEY, hpx INT8RANGE NOT NULL)"
        );
        assert_eq!(
            tiles.create_index_sql("fieldtile").unwrap(),
            "CREATE INDEX ix_fieldtile_hpx ON fieldtile USING spgist (hpx)"
        );
        assert_eq!(tiles.overlaps_sql("a", &tiles, "b"), "a.hpx && b.hpx");
        assert_eq!(
            tiles.contains_point_sql("f", &PointColumns::default(), "g"),
            "f.hpx @> g.nested"
        );
    }

    #[test]
    fn test_point_table() {
        let columns = PointColumns::with_axes("ra", "dec").nullable(true);
        let sql = columns.create_table_sql("galaxy").unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE galaxy (id BIGINT PRIMARY KEY, ra DOUBLE PRECISION, \
             dec DOUBLE PRECISION, x DOUBLE PRECISION, y DOUBLE PRECISION, \
             z DOUBLE PRECISION, nested BIGINT)"
        );
        assert_eq!(
            columns.create_index_sql("galaxy").unwrap(),
            vec![
                "CREATE INDEX ix_galaxy_point ON galaxy (x, y, z)",
                "CREATE INDEX ix_galaxy_nested ON galaxy (nested)",
            ]
        );
        assert!(PointColumns::default()
            .create_table_sql("galaxy")
            .unwrap()
            .contains("lon DOUBLE PRECISION NOT NULL"));
    }

    #[test]
    fn test_identifiers_validated() {
        let tiles = TileColumn::default();
        assert!(tiles.create_table_sql("bad name").is_err());
        assert!(tiles.create_table_sql("1abc").is_err());
        assert!(TileColumn::new(ColumnSpec::new("x;drop")).create_table_sql("t").is_err());
        assert!(PointColumns::with_axes("", "dec").create_table_sql("t").is_err());
    }

    #[test]
    fn test_insert_uses_derived_values() {
        let point = Point::new(0.0, 90.0).unwrap();
        let sql = PointColumns::default().insert_sql("galaxy", &point).unwrap();
        assert!(sql.starts_with("INSERT INTO galaxy (lon, lat, x, y, z, nested) VALUES (0, 90, "));
        assert!(sql.ends_with(&format!(", 1, {})", point.nested())));
    }

    #[test]
    fn test_within_predicate_postgres() {
        let cols = PointColumns::default();
        let sql = within_predicate_sql(&cols, "a", &cols, "b", 0.5, SqlDialect::Postgres);
        assert_eq!(
            sql,
            "a.x BETWEEN b.x - 2 * sind(0.5) AND b.x + 2 * sind(0.5) AND \
             a.y BETWEEN b.y - 2 * sind(0.5) AND b.y + 2 * sind(0.5) AND \
             a.z BETWEEN b.z - 2 * sind(0.5) AND b.z + 2 * sind(0.5) AND \
             a.x * b.x + a.y * b.y + a.z * b.z >= cosd(0.5)"
        );
    }

    #[test]
    fn test_within_predicate_generic() {
        let cols = PointColumns::default();
        let sql = within_predicate_sql(&cols, "a", &cols, "b", 1.0, SqlDialect::Generic);
        assert!(sql.contains("2 * sin((1) * pi() / 180.0)"));
        assert!(sql.ends_with(">= cos((1) * pi() / 180.0)"));
    }

    #[test]
    fn test_within_predicate_wide_radius_has_no_box() {
        let cols = PointColumns::default();
        let sql = within_predicate_sql(&cols, "a", &cols, "b", 120.0, SqlDialect::Postgres);
        assert_eq!(sql, "a.x * b.x + a.y * b.y + a.z * b.z >= cosd(120)");
    }
}
