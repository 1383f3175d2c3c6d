//! Credit-load ceiling granted for the next term, by previous term average.

use crate::domain::model::TermSummary;
use crate::utils::error::{Result, TranscriptError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};

/// Averages up to `upper` (inclusive or not) earn `credits`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntitlementTier {
    pub upper: f64,
    #[serde(default = "default_inclusive")]
    pub inclusive: bool,
    pub credits: u32,
}

fn default_inclusive() -> bool {
    true
}

impl EntitlementTier {
    fn admits(&self, average: f64) -> bool {
        if self.inclusive {
            average <= self.upper
        } else {
            average < self.upper
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementPolicy {
    /// Granted when there is no previous average (first term).
    pub baseline: u32,
    /// Checked in order, first admitting tier wins.
    pub tiers: Vec<EntitlementTier>,
    /// Granted above the last tier.
    pub ceiling: u32,
}

impl Default for EntitlementPolicy {
    fn default() -> Self {
        Self {
            baseline: 0,
            tiers: vec![
                EntitlementTier {
                    upper: 2.0,
                    inclusive: false,
                    credits: 15,
                },
                EntitlementTier {
                    upper: 2.5,
                    inclusive: true,
                    credits: 18,
                },
                EntitlementTier {
                    upper: 3.0,
                    inclusive: true,
                    credits: 20,
                },
            ],
            ceiling: 24,
        }
    }
}

impl EntitlementPolicy {
    pub fn entitlement(&self, previous_average: Option<f64>) -> u32 {
        let Some(average) = previous_average else {
            return self.baseline;
        };

        self.tiers
            .iter()
            .find(|tier| tier.admits(average))
            .map(|tier| tier.credits)
            .unwrap_or(self.ceiling)
    }

    /// Fills `entitlement` / `credit_entitlement_next_term` along terms that
    /// are already in chronological order.
    pub fn apply(&self, terms: &mut [TermSummary]) {
        let mut previous_average = None;
        for term in terms.iter_mut() {
            term.entitlement = self.entitlement(previous_average);
            term.credit_entitlement_next_term = self.entitlement(term.term_average);
            previous_average = term.term_average;
        }
    }

    /// Ceiling for the term following the last one in `terms`.
    pub fn next_term(&self, terms: &[TermSummary]) -> u32 {
        self.entitlement(terms.last().and_then(|t| t.term_average))
    }
}

impl Validate for EntitlementPolicy {
    fn validate(&self) -> Result<()> {
        let mut last_upper = f64::NEG_INFINITY;
        let mut last_credits = 0;

        for (i, tier) in self.tiers.iter().enumerate() {
            let field = format!("policy.entitlement_tiers[{}]", i);
            if !tier.upper.is_finite() || tier.upper < last_upper {
                return Err(TranscriptError::ConfigValidationError {
                    field,
                    message: "tier bounds must be finite and ascending".to_string(),
                });
            }
            if tier.credits < last_credits {
                return Err(TranscriptError::ConfigValidationError {
                    field,
                    message: "tier credits must not decrease as averages rise".to_string(),
                });
            }
            last_upper = tier.upper;
            last_credits = tier.credits;
        }

        if self.ceiling < last_credits {
            return Err(TranscriptError::ConfigValidationError {
                field: "policy.entitlement_ceiling".to_string(),
                message: format!(
                    "ceiling {} is below the last tier ({})",
                    self.ceiling, last_credits
                ),
            });
        }

        Ok(())
    }
}
