use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skim_core::errors::{ErrorInfo, SkimError};
use skim_core::Variation;

/// The single variation a job runs with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Systematic {
    /// No shift.
    #[default]
    Nominal,
    /// Energy-scale shift of one uncertainty source (`JEC<source>Up|Down`).
    Jec {
        /// Uncertainty source name, e.g. `Total`.
        source: String,
        /// Shift direction.
        variation: Variation,
    },
    /// Resolution scale-factor shift (`JERUp|Down`).
    Jer(Variation),
}

impl Systematic {
    /// Whether this is the nominal job.
    pub fn is_nominal(&self) -> bool {
        matches!(self, Systematic::Nominal)
    }

    /// Source and direction of an energy-scale shift.
    pub fn jec(&self) -> Option<(&str, Variation)> {
        match self {
            Systematic::Jec { source, variation } => Some((source.as_str(), *variation)),
            _ => None,
        }
    }

    /// Direction of a resolution shift.
    pub fn jer(&self) -> Option<Variation> {
        match self {
            Systematic::Jer(variation) => Some(*variation),
            _ => None,
        }
    }
}

fn unknown(name: &str) -> SkimError {
    SkimError::Config(
        ErrorInfo::new("unknown-systematic", format!("cannot interpret systematic {name:?}"))
            .with_context("systematic", name)
            .with_hint("use JEC<source>Up, JEC<source>Down, JERUp or JERDown"),
    )
}

impl FromStr for Systematic {
    type Err = SkimError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name.is_empty() || name.eq_ignore_ascii_case("nominal") {
            return Ok(Systematic::Nominal);
        }
        let (stem, variation) = if let Some(stem) = name.strip_suffix("Up") {
            (stem, Variation::Up)
        } else if let Some(stem) = name.strip_suffix("Down") {
            (stem, Variation::Down)
        } else {
            return Err(unknown(name));
        };
        if stem == "JER" {
            return Ok(Systematic::Jer(variation));
        }
        match stem.strip_prefix("JEC") {
            Some(source) if !source.is_empty() => Ok(Systematic::Jec {
                source: source.to_owned(),
                variation,
            }),
            _ => Err(unknown(name)),
        }
    }
}

impl TryFrom<String> for Systematic {
    type Error = SkimError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Systematic> for String {
    fn from(value: Systematic) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Systematic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = |variation: &Variation| match variation {
            Variation::Up => "Up",
            Variation::Down => "Down",
        };
        match self {
            Systematic::Nominal => write!(f, "nominal"),
            Systematic::Jec { source, variation } => write!(f, "JEC{source}{}", direction(variation)),
            Systematic::Jer(variation) => write!(f, "JER{}", direction(variation)),
        }
    }
}
