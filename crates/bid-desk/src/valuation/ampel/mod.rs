mod rules;

pub use rules::{AmpelRule, AMPEL_RULES, FALLBACK_RULE, LOSS_TOLERANCE};

use serde::{Deserialize, Serialize};

use super::consensus::Consensus;
use super::costs::CostBreakdown;
use crate::damage::SeverityLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmpelColor {
    Green,
    Yellow,
    Red,
}

impl AmpelColor {
    pub const fn label(self) -> &'static str {
        match self {
            AmpelColor::Green => "green",
            AmpelColor::Yellow => "yellow",
            AmpelColor::Red => "red",
        }
    }
}

/// Traffic-light verdict with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmpelStatus {
    pub color: AmpelColor,
    pub label: String,
    pub reason: String,
    pub rule: u8,
}

impl From<&AmpelRule> for AmpelStatus {
    fn from(rule: &AmpelRule) -> Self {
        Self {
            color: rule.color,
            label: rule.label.to_string(),
            reason: rule.reason.to_string(),
            rule: rule.id,
        }
    }
}

/// Inputs the decision table reads.
#[derive(Debug, Clone, PartialEq)]
pub struct AmpelSignals {
    pub profit: f64,
    pub profit_pct: f64,
    pub target_profit_pct: f64,
    pub severity: Option<SeverityLevel>,
    pub consensus: Consensus,
}

impl AmpelSignals {
    pub fn new(
        costs: &CostBreakdown,
        consensus: &Consensus,
        severity: Option<SeverityLevel>,
    ) -> Self {
        Self {
            profit: costs.profit,
            profit_pct: costs.profit_pct,
            target_profit_pct: costs.target_profit_pct,
            severity,
            consensus: consensus.clone(),
        }
    }

    pub(crate) fn beats_target(&self) -> bool {
        self.profit_pct > self.target_profit_pct
    }
}

/// Returns the first matching rule's verdict, or the manual-review fallback.
pub fn decide(signals: &AmpelSignals) -> AmpelStatus {
    AMPEL_RULES
        .iter()
        .find(|rule| (rule.applies)(signals))
        .unwrap_or(&FALLBACK_RULE)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::domain::Recommendation;

    fn signals(profit: f64, profit_pct: f64) -> AmpelSignals {
        AmpelSignals {
            profit,
            profit_pct,
            target_profit_pct: 35.0,
            severity: None,
            consensus: Consensus::default(),
        }
    }

    fn consensus(green: usize, orange: usize, red: usize) -> Consensus {
        let dominant = [
            (Recommendation::Green, green),
            (Recommendation::Orange, orange),
            (Recommendation::Red, red),
        ]
        .into_iter()
        .fold((None, 0), |(best, max), (color, count)| {
            if count > max {
                (Some(color), count)
            } else {
                (best, max)
            }
        })
        .0;
        Consensus {
            green,
            orange,
            red,
            total: green + orange + red,
            dominant,
        }
    }

    #[test]
    fn rule_ids_are_in_table_order() {
        let ids: Vec<u8> = AMPEL_RULES.iter().map(|rule| rule.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(FALLBACK_RULE.id, 9);
    }

    #[test]
    fn loss_beats_every_other_rule() {
        let mut input = signals(-600.0, -4.0);
        input.severity = Some(SeverityLevel::High);
        input.consensus = consensus(0, 0, 3);

        let status = decide(&input);
        assert_eq!(status.color, AmpelColor::Red);
        assert_eq!(status.reason, "Negatives Ergebnis");
        assert_eq!(status.rule, 1);
    }

    #[test]
    fn loss_of_exactly_tolerance_is_not_negative_result() {
        let status = decide(&signals(-500.0, -3.0));
        assert_eq!(status.rule, 4);
        assert_eq!(status.label, "Vorsicht");
    }

    #[test]
    fn heavy_damage_and_two_red_votes_is_high_risk() {
        let mut input = signals(4_000.0, 40.0);
        input.severity = Some(SeverityLevel::High);
        input.consensus = consensus(1, 0, 2);

        let status = decide(&input);
        assert_eq!(status.label, "Hohes Risiko");
        assert_eq!(status.rule, 2);
    }

    #[test]
    fn red_majority_is_not_recommended() {
        let mut input = signals(4_000.0, 40.0);
        input.consensus = consensus(1, 0, 2);

        let status = decide(&input);
        assert_eq!(status.color, AmpelColor::Red);
        assert_eq!(status.reason, "Mehrere Mechaniker raten ab");
    }

    #[test]
    fn single_red_vote_does_not_block() {
        let mut input = signals(4_000.0, 40.0);
        input.consensus = consensus(0, 0, 1);

        let status = decide(&input);
        assert_eq!(status.color, AmpelColor::Green);
        assert_eq!(status.rule, 7);
    }

    #[test]
    fn marginal_profit_is_caution() {
        let status = decide(&signals(1_000.0, 35.0));
        assert_eq!(status.color, AmpelColor::Yellow);
        assert_eq!(status.reason, "Grenzwertiger Profit");
    }

    #[test]
    fn heavy_damage_with_good_profit_needs_review() {
        let mut input = signals(6_000.0, 45.0);
        input.severity = Some(SeverityLevel::High);

        let status = decide(&input);
        assert_eq!(status.label, "Prüfen");
        assert_eq!(status.reason, "Hoher Schaden aber guter Profit");
    }

    #[test]
    fn orange_majority_is_uncertain() {
        let mut input = signals(6_000.0, 45.0);
        input.consensus = consensus(1, 2, 0);

        let status = decide(&input);
        assert_eq!(status.label, "Unsicher");
        assert_eq!(status.rule, 6);
    }

    #[test]
    fn good_profit_with_medium_damage_is_recommended() {
        let mut input = signals(6_000.0, 45.0);
        input.severity = Some(SeverityLevel::Medium);
        input.consensus = consensus(2, 0, 0);

        let status = decide(&input);
        assert_eq!(status.color, AmpelColor::Green);
        assert_eq!(status.reason, "Guter Profit, akzeptabler Schaden");
    }

    #[test]
    fn non_finite_profit_falls_through_to_manual_review() {
        let status = decide(&signals(f64::NAN, f64::NAN));
        assert_eq!(status.rule, 9);
        assert_eq!(status.reason, "Bitte manuell bewerten");
    }
}
