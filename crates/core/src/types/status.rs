//! Navigation tabs, ordering steps and favorite kinds.

use serde::{Deserialize, Serialize};

/// Bottom-navigation tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MainTab {
    #[default]
    Map,
    Scan,
    History,
    Profile,
}

impl std::fmt::Display for MainTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Map => write!(f, "map"),
            Self::Scan => write!(f, "scan"),
            Self::History => write!(f, "history"),
            Self::Profile => write!(f, "profile"),
        }
    }
}

impl std::str::FromStr for MainTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "map" => Ok(Self::Map),
            "scan" => Ok(Self::Scan),
            "history" => Ok(Self::History),
            "profile" => Ok(Self::Profile),
            _ => Err(format!("invalid tab: {s}")),
        }
    }
}

/// Visible step of an active ordering flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowStep {
    /// Waiting for a café code to be scanned.
    Scan,
    /// Café known, choosing one of its beans.
    BeanSelect,
    /// Bean chosen, recording brew method, rating and note.
    BrewOrder,
}

impl std::fmt::Display for FlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan => write!(f, "scan"),
            Self::BeanSelect => write!(f, "bean-select"),
            Self::BrewOrder => write!(f, "brew-order"),
        }
    }
}

/// What a favorite points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteKind {
    Cafe,
    Bean,
}

impl std::fmt::Display for FavoriteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cafe => write!(f, "cafe"),
            Self::Bean => write!(f, "bean"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_tab_round_trips_through_str() {
        for tab in [MainTab::Map, MainTab::Scan, MainTab::History, MainTab::Profile] {
            assert_eq!(tab.to_string().parse::<MainTab>(), Ok(tab));
        }
        assert!("settings".parse::<MainTab>().is_err());
        assert_eq!(MainTab::default(), MainTab::Map);
    }

    #[test]
    fn test_flow_step_display() {
        assert_eq!(FlowStep::BeanSelect.to_string(), "bean-select");
        assert_eq!(FlowStep::BrewOrder.to_string(), "brew-order");
    }
}
