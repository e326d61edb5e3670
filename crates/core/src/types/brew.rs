//! Brew methods offered at checkin.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a brew method id is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown brew method: {0}")]
pub struct BrewMethodError(pub String);

/// The fixed set of brew methods a checkin can record.
///
/// Serialized using the kebab-case ids the remote store uses
/// (`"pour-over"`, `"french-press"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrewMethod {
    Espresso,
    PourOver,
    FrenchPress,
    ColdBrew,
    #[serde(rename = "aeropress")]
    AeroPress,
    Chemex,
}

impl BrewMethod {
    /// Every brew method, in menu order.
    pub const ALL: [Self; 6] = [
        Self::Espresso,
        Self::PourOver,
        Self::FrenchPress,
        Self::ColdBrew,
        Self::AeroPress,
        Self::Chemex,
    ];

    /// Wire id of the method.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Espresso => "espresso",
            Self::PourOver => "pour-over",
            Self::FrenchPress => "french-press",
            Self::ColdBrew => "cold-brew",
            Self::AeroPress => "aeropress",
            Self::Chemex => "chemex",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Espresso => "Espresso",
            Self::PourOver => "Pour Over",
            Self::FrenchPress => "French Press",
            Self::ColdBrew => "Cold Brew",
            Self::AeroPress => "AeroPress",
            Self::Chemex => "Chemex",
        }
    }

    /// Short tasting description shown next to the method.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Espresso => "Rich & intense",
            Self::PourOver => "Clean & nuanced",
            Self::FrenchPress => "Full-bodied",
            Self::ColdBrew => "Smooth & sweet",
            Self::AeroPress => "Versatile & quick",
            Self::Chemex => "Bright & clear",
        }
    }
}

impl fmt::Display for BrewMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for BrewMethod {
    type Err = BrewMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.id() == s)
            .ok_or_else(|| BrewMethodError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_ids() {
        assert_eq!("pour-over".parse::<BrewMethod>().unwrap(), BrewMethod::PourOver);
        assert_eq!("aeropress".parse::<BrewMethod>().unwrap(), BrewMethod::AeroPress);
        assert!("drip".parse::<BrewMethod>().is_err());
    }

    #[test]
    fn test_serde_matches_display() {
        for method in BrewMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{method}\""));
        }
    }
}
