use serde::{Deserialize, Serialize};

/// Fallback rate used when no live quote is available.
pub const DEFAULT_AED_PER_EUR: f64 = 4.0;

/// Quoted as "1 EUR = rate AED".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRate(f64);

impl ExchangeRate {
    /// Accepts a positive, finite quote and falls back to the default otherwise.
    pub fn new(aed_per_eur: f64) -> Self {
        if aed_per_eur.is_finite() && aed_per_eur > 0.0 {
            Self(aed_per_eur)
        } else {
            Self(DEFAULT_AED_PER_EUR)
        }
    }

    pub fn aed_per_eur(self) -> f64 {
        self.0
    }

    pub fn to_eur(self, aed_amount: f64) -> f64 {
        to_eur(aed_amount, self.0)
    }

    pub fn to_aed(self, eur_amount: f64) -> f64 {
        to_aed(eur_amount, self.0)
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self(DEFAULT_AED_PER_EUR)
    }
}

impl From<f64> for ExchangeRate {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// `rate` must be positive; callers own validation.
pub fn to_eur(aed_amount: f64, rate: f64) -> f64 {
    aed_amount / rate
}

pub fn to_aed(eur_amount: f64, rate: f64) -> f64 {
    eur_amount * rate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_in_both_directions() {
        assert_eq!(to_eur(50_000.0, 4.0), 12_500.0);
        assert_eq!(to_aed(12_500.0, 4.0), 50_000.0);
    }

    #[test]
    fn invalid_quotes_fall_back_to_default() {
        assert_eq!(ExchangeRate::new(0.0).aed_per_eur(), DEFAULT_AED_PER_EUR);
        assert_eq!(ExchangeRate::new(-3.9).aed_per_eur(), DEFAULT_AED_PER_EUR);
        assert_eq!(ExchangeRate::new(f64::NAN).aed_per_eur(), DEFAULT_AED_PER_EUR);
        assert_eq!(ExchangeRate::new(4.02).aed_per_eur(), 4.02);
    }
}
