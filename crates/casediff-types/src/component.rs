use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A simulated physical domain with its own configuration document.
///
/// Ordering follows the dashboard's tab order (atmosphere first, ocean last),
/// which is also the order used by availability summaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    /// Atmosphere (`atm_in`).
    Atm,
    /// Land (`lnd_in`).
    Lnd,
    /// Sea ice (`ice_in`).
    Ice,
    /// Ocean: MOM parameter files plus `input.nml`.
    Ocn,
}

impl Component {
    /// Every component, in display order.
    pub const ALL: [Component; 4] = [Self::Atm, Self::Lnd, Self::Ice, Self::Ocn];

    /// The short tag used in catalog documents.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Atm => "atm",
            Self::Lnd => "lnd",
            Self::Ice => "ice",
            Self::Ocn => "ocn",
        }
    }

    /// Human-readable name for selector labels.
    pub fn label(self) -> &'static str {
        match self {
            Self::Atm => "Atmosphere",
            Self::Lnd => "Land",
            Self::Ice => "Sea Ice",
            Self::Ocn => "Ocean",
        }
    }

    /// Returns `true` for the component whose documents use the
    /// override/base/nested composite form.
    pub fn is_composite(self) -> bool {
        matches!(self, Self::Ocn)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Component {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "atm" => Ok(Self::Atm),
            "lnd" => Ok(Self::Lnd),
            "ice" => Ok(Self::Ice),
            "ocn" => Ok(Self::Ocn),
            other => Err(TypeError::UnknownComponent(other.to_string())),
        }
    }
}
