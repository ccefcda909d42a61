use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Units of measurement for volume.
///
/// Each unit maps to a fixed millilitre factor. `OZ` uses the rounded
/// bartender approximation of 29 ml rather than the exact fluid ounce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Unit {
    L,
    DL,
    CL,
    ML,
    TBSP,
    TSP,
    OZ,
}

impl Unit {
    /// Every representable unit, largest first.
    pub const ALL: [Unit; 7] = [
        Unit::L,
        Unit::DL,
        Unit::CL,
        Unit::OZ,
        Unit::TBSP,
        Unit::TSP,
        Unit::ML,
    ];

    /// Size of one of this unit in millilitres.
    pub const fn millilitres(self) -> u32 {
        match self {
            Self::L => 1000,
            Self::DL => 100,
            Self::CL => 10,
            Self::ML => 1,
            Self::TBSP => 15,
            Self::TSP => 5,
            Self::OZ => 29,
        }
    }

    /// Canonical name, as stored in the unit columns.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::DL => "DL",
            Self::CL => "CL",
            Self::ML => "ML",
            Self::TBSP => "TBSP",
            Self::TSP => "TSP",
            Self::OZ => "OZ",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("TBPS") {
            // Older databases spelled tablespoon this way.
            return Ok(Self::TBSP);
        }
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TypeError::UnknownUnit(s.to_string()))
    }
}
