//! Ordering flow state machine: scan → bean-select → brew-order.
//!
//! Each state carries exactly the ids its step needs, so "bean-select has a
//! café" and "brew-order has a café and a bean" cannot be violated.

use thiserror::Error;

use coffee_compass_core::{BeanId, CafeId, FlowStep};

use crate::scan::ScanError;

/// A transition was requested from a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("cannot {action} while ordering flow is {state}")]
    InvalidTransition { action: &'static str, state: String },
}

/// Current ordering session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrderingFlow {
    #[default]
    Inactive,
    /// Waiting for a scan; holds the last scan failure for inline display.
    Scan { error: Option<ScanError> },
    BeanSelect { cafe_id: CafeId },
    BrewOrder { cafe_id: CafeId, bean_id: BeanId },
}

impl OrderingFlow {
    /// Enter the scan step from any state, dropping any ids.
    pub fn start(&mut self) {
        *self = Self::Scan { error: None };
    }

    /// Record a scanned café. Ignored outside the scan step.
    ///
    /// Returns whether a transition happened.
    pub fn scan_complete(&mut self, cafe_id: CafeId) -> bool {
        if !matches!(self, Self::Scan { .. }) {
            return false;
        }
        *self = Self::BeanSelect { cafe_id };
        true
    }

    /// Keep the scan step and remember why the scan failed.
    ///
    /// Returns whether the error was recorded.
    pub fn scan_failed(&mut self, error: ScanError) -> bool {
        match self {
            Self::Scan { error: slot } => {
                *slot = Some(error);
                true
            }
            _ => false,
        }
    }

    /// Choose a bean for the scanned café.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidTransition`] outside the bean-select step.
    pub fn select_bean(&mut self, bean_id: BeanId) -> Result<(), FlowError> {
        match std::mem::take(self) {
            Self::BeanSelect { cafe_id } => {
                *self = Self::BrewOrder { cafe_id, bean_id };
                Ok(())
            }
            other => {
                let err = other.invalid("select a bean");
                *self = other;
                Err(err)
            }
        }
    }

    /// Leave the flow from any state.
    pub fn cancel(&mut self) {
        *self = Self::Inactive;
    }

    /// Step back one screen.
    pub fn back(&mut self) {
        *self = match std::mem::take(self) {
            Self::Inactive | Self::Scan { .. } => Self::Inactive,
            Self::BeanSelect { .. } => Self::Scan { error: None },
            Self::BrewOrder { cafe_id, .. } => Self::BeanSelect { cafe_id },
        };
    }

    /// The café and bean an order would be recorded for.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidTransition`] outside the brew-order step.
    pub fn order_target(&self) -> Result<(CafeId, BeanId), FlowError> {
        match self {
            Self::BrewOrder { cafe_id, bean_id } => Ok((cafe_id.clone(), bean_id.clone())),
            _ => Err(self.invalid("complete an order")),
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Inactive)
    }

    /// Visible step, `None` when inactive.
    #[must_use]
    pub const fn step(&self) -> Option<FlowStep> {
        match self {
            Self::Inactive => None,
            Self::Scan { .. } => Some(FlowStep::Scan),
            Self::BeanSelect { .. } => Some(FlowStep::BeanSelect),
            Self::BrewOrder { .. } => Some(FlowStep::BrewOrder),
        }
    }

    #[must_use]
    pub const fn scanned_cafe_id(&self) -> Option<&CafeId> {
        match self {
            Self::BeanSelect { cafe_id } | Self::BrewOrder { cafe_id, .. } => Some(cafe_id),
            Self::Inactive | Self::Scan { .. } => None,
        }
    }

    #[must_use]
    pub const fn selected_bean_id(&self) -> Option<&BeanId> {
        match self {
            Self::BrewOrder { bean_id, .. } => Some(bean_id),
            _ => None,
        }
    }

    /// Last scan failure while on the scan step.
    #[must_use]
    pub const fn scan_error(&self) -> Option<&ScanError> {
        match self {
            Self::Scan { error } => error.as_ref(),
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        let state = self
            .step()
            .map_or_else(|| "inactive".to_string(), |step| step.to_string());
        FlowError::InvalidTransition { action, state }
    }
}
