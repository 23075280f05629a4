//! Cost shapes mapping a preference rank to a matching cost.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Function from 0-based preference rank to cost.
///
/// Every shape is strictly increasing in rank, and `Square` and `Exponential`
/// never fall below `Linear` from rank 1 onward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum CostShape {
    /// `rank`
    #[default]
    Linear,

    /// `rank²`
    Square,

    /// `e^rank`
    Exponential,
}

impl CostShape {
    pub const ALL: [CostShape; 3] = [CostShape::Linear, CostShape::Square, CostShape::Exponential];

    /// Cost of the preference at 0-based `rank`.
    ///
    /// ```
    /// use affectation_core::CostShape;
    ///
    /// assert_eq!(CostShape::Linear.cost(3), 3.0);
    /// assert_eq!(CostShape::Square.cost(3), 9.0);
    /// assert_eq!(CostShape::Exponential.cost(0), 1.0);
    /// ```
    pub fn cost(self, rank: usize) -> f64 {
        let r = rank as f64;
        match self {
            CostShape::Linear => r,
            CostShape::Square => r * r,
            CostShape::Exponential => r.exp(),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CostShape::Linear => "linear",
            CostShape::Square => "square",
            CostShape::Exponential => "exp",
        }
    }
}

impl fmt::Display for CostShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CostShape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" | "linéaire" | "lineaire" => Ok(CostShape::Linear),
            "square" | "carré" | "carre" => Ok(CostShape::Square),
            "exp" | "exponential" => Ok(CostShape::Exponential),
            _ => Err(ConfigError::UnknownCostShape(s.to_string())),
        }
    }
}

impl TryFrom<String> for CostShape {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CostShape> for String {
    fn from(shape: CostShape) -> Self {
        shape.name().to_string()
    }
}
