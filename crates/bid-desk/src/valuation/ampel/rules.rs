use super::{AmpelColor, AmpelSignals};
use crate::damage::SeverityLevel;
use crate::valuation::domain::Recommendation;

/// Profit below this (EUR) is a hard stop.
pub const LOSS_TOLERANCE: f64 = -500.0;

/// One row of the decision table.
#[derive(Debug, Clone, Copy)]
pub struct AmpelRule {
    pub id: u8,
    pub applies: fn(&AmpelSignals) -> bool,
    pub color: AmpelColor,
    pub label: &'static str,
    pub reason: &'static str,
}

/// Evaluated top to bottom, first match wins. Order is part of the policy.
pub const AMPEL_RULES: [AmpelRule; 8] = [
    AmpelRule {
        id: 1,
        applies: negative_result,
        color: AmpelColor::Red,
        label: "Nicht empfohlen",
        reason: "Negatives Ergebnis",
    },
    AmpelRule {
        id: 2,
        applies: heavy_damage_with_mechanic_objections,
        color: AmpelColor::Red,
        label: "Hohes Risiko",
        reason: "Hoher Schaden, mehrere Mechaniker raten ab",
    },
    AmpelRule {
        id: 3,
        applies: mechanics_advise_against,
        color: AmpelColor::Red,
        label: "Nicht empfohlen",
        reason: "Mehrere Mechaniker raten ab",
    },
    AmpelRule {
        id: 4,
        applies: marginal_profit,
        color: AmpelColor::Yellow,
        label: "Vorsicht",
        reason: "Grenzwertiger Profit",
    },
    AmpelRule {
        id: 5,
        applies: heavy_damage_with_good_profit,
        color: AmpelColor::Yellow,
        label: "Prüfen",
        reason: "Hoher Schaden aber guter Profit",
    },
    AmpelRule {
        id: 6,
        applies: mechanics_uncertain,
        color: AmpelColor::Yellow,
        label: "Unsicher",
        reason: "Mechaniker sind unsicher",
    },
    AmpelRule {
        id: 7,
        applies: good_profit_acceptable_damage,
        color: AmpelColor::Green,
        label: "Empfohlen",
        reason: "Guter Profit, akzeptabler Schaden",
    },
    AmpelRule {
        id: 8,
        applies: good_profit_mechanics_agree,
        color: AmpelColor::Green,
        label: "Empfohlen",
        reason: "Guter Profit, Mechaniker empfehlen",
    },
];

pub const FALLBACK_RULE: AmpelRule = AmpelRule {
    id: 9,
    applies: always,
    color: AmpelColor::Yellow,
    label: "Prüfen",
    reason: "Bitte manuell bewerten",
};

fn negative_result(signals: &AmpelSignals) -> bool {
    signals.profit < LOSS_TOLERANCE
}

fn heavy_damage_with_mechanic_objections(signals: &AmpelSignals) -> bool {
    signals.severity == Some(SeverityLevel::High) && signals.consensus.red >= 2
}

fn mechanics_advise_against(signals: &AmpelSignals) -> bool {
    signals.consensus.dominant == Some(Recommendation::Red) && signals.consensus.red >= 2
}

fn marginal_profit(signals: &AmpelSignals) -> bool {
    signals.profit >= LOSS_TOLERANCE && signals.profit_pct <= signals.target_profit_pct
}

fn heavy_damage_with_good_profit(signals: &AmpelSignals) -> bool {
    signals.severity == Some(SeverityLevel::High) && signals.beats_target()
}

fn mechanics_uncertain(signals: &AmpelSignals) -> bool {
    signals.consensus.dominant == Some(Recommendation::Orange)
}

fn good_profit_acceptable_damage(signals: &AmpelSignals) -> bool {
    signals.beats_target() && signals.severity != Some(SeverityLevel::High)
}

fn good_profit_mechanics_agree(signals: &AmpelSignals) -> bool {
    signals.beats_target() && signals.consensus.dominant == Some(Recommendation::Green)
}

fn always(_: &AmpelSignals) -> bool {
    true
}
