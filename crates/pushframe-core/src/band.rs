use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Color filter band of one framelet.
///
/// The declaration order is the acquisition order inside an exposure
/// triplet: blue rows come first, then green, then red.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Band {
    Blue,
    Green,
    Red,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown filter band {0:?}")]
pub struct BandParseError(pub String);

impl Band {
    /// Bands in acquisition order.
    pub const ALL: [Band; 3] = [Band::Blue, Band::Green, Band::Red];

    /// Position of this band's framelet inside an exposure triplet.
    #[inline]
    pub fn triplet_offset(self) -> usize {
        match self {
            Band::Blue => 0,
            Band::Green => 1,
            Band::Red => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Band::Blue => "BLUE",
            Band::Green => "GREEN",
            Band::Red => "RED",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Band {
    type Err = BandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BLUE" => Ok(Band::Blue),
            "GREEN" => Ok(Band::Green),
            "RED" => Ok(Band::Red),
            _ => Err(BandParseError(s.to_string())),
        }
    }
}
