//! Trigonometric functions as evaluated in Rust and rendered into SQL.
//!
//! PostgreSQL has native degree variants (`sind`, `cosd`, `tand`). Other
//! engines get the argument converted to radians inline.

use std::fmt;
use std::str::FromStr;

use celestial_core::constants::DEG_TO_RAD;

use crate::errors::HealpixError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SqlDialect {
    #[default]
    Postgres,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrigFunction {
    Sin,
    Cos,
    Tan,
    /// Sine of an angle in degrees.
    Sind,
    Cosd,
    Tand,
}

impl TrigFunction {
    pub const ALL: [Self; 6] = [
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Sind,
        Self::Cosd,
        Self::Tand,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Sind => "sind",
            Self::Cosd => "cosd",
            Self::Tand => "tand",
        }
    }

    #[inline]
    pub fn is_degrees(self) -> bool {
        matches!(self, Self::Sind | Self::Cosd | Self::Tand)
    }

    /// The radian function with the same shape.
    pub fn radians(self) -> Self {
        match self {
            Self::Sind => Self::Sin,
            Self::Cosd => Self::Cos,
            Self::Tand => Self::Tan,
            other => other,
        }
    }

    pub fn degrees(self) -> Self {
        match self {
            Self::Sin => Self::Sind,
            Self::Cos => Self::Cosd,
            Self::Tan => Self::Tand,
            other => other,
        }
    }

    pub fn eval(self, x: f64) -> f64 {
        let x = if self.is_degrees() { x * DEG_TO_RAD } else { x };
        match self.radians() {
            Self::Sin => libm::sin(x),
            Self::Cos => libm::cos(x),
            _ => libm::tan(x),
        }
    }

    /// Applies the function to the SQL expression `arg`.
    pub fn to_sql(self, arg: &str, dialect: SqlDialect) -> String {
        if !self.is_degrees() || dialect == SqlDialect::Postgres {
            return format!("{}({})", self.name(), arg);
        }
        format!("{}(({}) * pi() / 180.0)", self.radians().name(), arg)
    }
}

impl fmt::Display for TrigFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrigFunction {
    type Err = HealpixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| HealpixError::parse(s, "unknown trigonometric function"))
    }
}
