//! Deterministic cross-check of the describer's own severity score.
//!
//! Technical severity counts what the report enumerates (parts, risk flags,
//! roadworthiness); economic severity bands the AED total mid value. The
//! combined score is the larger of the two.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::report::{DamageReport, Roadworthiness, SeverityLevel};

pub const DEFAULT_BAND_LIMITS_AED: [f64; 5] = [2_000.0, 5_000.0, 10_000.0, 20_000.0, 40_000.0];

const REPLACED_PART_WEIGHT: f64 = 1.0;
const SAFETY_CRITICAL_PART_WEIGHT: f64 = 2.5;
const INSPECTED_PART_WEIGHT: f64 = 0.5;
const CRITICAL_FLAG_WEIGHT: f64 = 2.0;
const OTHER_FLAG_WEIGHT: f64 = 0.5;
const NOT_ROADWORTHY_WEIGHT: f64 = 3.0;
const MAX_SEVERITY: f64 = 10.0;

// Matched at word starts, so German compounds need their own stems.
const SAFETY_CRITICAL_PARTS: &[&str] = &[
    "airbag",
    "fahrerairbag",
    "beifahrerairbag",
    "seitenairbag",
    "brems",
    "brake",
    "lenk",
    "steering",
    "rahmen",
    "hilfsrahmen",
    "frame",
    "chassis",
    "achs",
    "vorderachs",
    "hinterachs",
    "axle",
    "fahrwerk",
    "suspension",
    "querlenker",
    "gurt",
    "sicherheitsgurt",
    "seatbelt",
    "kraftstoff",
    "fuel tank",
    "fuel line",
];

const CRITICAL_FLAGS: &[&str] = &[
    "airbag",
    "rahmen",
    "frame",
    "struktur",
    "structural",
    "wasserschaden",
    "flood",
    "überschwemm",
    "brandschaden",
    "fire",
    "motorschaden",
    "engine damage",
    "engine failure",
    "getriebe",
    "gearbox",
    "totalschaden",
    "total loss",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownStatus {
    Scored,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub technical_severity: f64,
    pub economic_severity: f64,
    pub combined_severity: f64,
    pub level: Option<SeverityLevel>,
    /// Describer's self-reported 1-10 score.
    pub ai_severity_score: u8,
    /// `combined_severity - ai_severity_score`.
    pub deviation: f64,
    pub status: BreakdownStatus,
    pub signals: Vec<String>,
}

impl SeverityBreakdown {
    fn unknown(ai_severity_score: u8) -> Self {
        Self {
            ai_severity_score,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSeverityBands(String);

impl fmt::Display for InvalidSeverityBands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "severity bands must be ascending positive AED limits, got `{}`",
            self.0
        )
    }
}

impl std::error::Error for InvalidSeverityBands {}

/// Ascending AED limits for the economic score.
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityBands {
    limits_aed: Vec<f64>,
}

impl SeverityBands {
    pub fn new(limits_aed: Vec<f64>) -> Result<Self, InvalidSeverityBands> {
        let valid = !limits_aed.is_empty()
            && limits_aed.iter().all(|limit| limit.is_finite() && *limit > 0.0)
            && limits_aed.windows(2).all(|pair| pair[0] < pair[1]);
        if !valid {
            return Err(InvalidSeverityBands(format!("{limits_aed:?}")));
        }
        Ok(Self { limits_aed })
    }

    pub fn limits_aed(&self) -> &[f64] {
        &self.limits_aed
    }

    pub fn score(&self, cost_aed: f64) -> f64 {
        if !cost_aed.is_finite() || cost_aed <= 0.0 {
            return 0.0;
        }
        let band_count = self.limits_aed.len() as f64 + 1.0;
        match self.limits_aed.iter().position(|limit| cost_aed <= *limit) {
            Some(index) => round1(MAX_SEVERITY * (index as f64 + 1.0) / band_count),
            None => MAX_SEVERITY,
        }
    }
}

impl Default for SeverityBands {
    fn default() -> Self {
        Self {
            limits_aed: DEFAULT_BAND_LIMITS_AED.to_vec(),
        }
    }
}

impl FromStr for SeverityBands {
    type Err = InvalidSeverityBands;

    /// Comma-separated list such as `2000,5000,10000`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let limits = raw
            .split(',')
            .map(|part| part.trim().replace('_', "").parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| InvalidSeverityBands(raw.to_string()))?;
        Self::new(limits).map_err(|_| InvalidSeverityBands(raw.to_string()))
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    keywords.iter().any(|keyword| {
        lowered.match_indices(keyword).any(|(index, _)| {
            lowered[..index]
                .chars()
                .next_back()
                .map_or(true, |previous| !previous.is_alphanumeric())
        })
    })
}

#[derive(Debug, Clone, Default)]
pub struct SeverityReconciler {
    bands: SeverityBands,
}

impl SeverityReconciler {
    pub fn new(bands: SeverityBands) -> Self {
        Self { bands }
    }

    /// Returns a copy of `report` with `severity_breakdown` attached.
    pub fn reconcile(&self, report: &DamageReport) -> DamageReport {
        let mut reconciled = report.clone();
        reconciled.severity_breakdown = Some(self.breakdown(report));
        reconciled
    }

    pub fn breakdown(&self, report: &DamageReport) -> SeverityBreakdown {
        let mut signals = Vec::new();
        let mut technical = 0.0;

        for part in &report.parts_to_replace {
            let confidence = part.confidence.clamp(0.0, 1.0);
            if mentions_any(&part.part_name, SAFETY_CRITICAL_PARTS) {
                technical += SAFETY_CRITICAL_PART_WEIGHT * confidence;
                signals.push(format!("replace safety-critical: {}", part.part_name));
            } else {
                technical += REPLACED_PART_WEIGHT * confidence;
                signals.push(format!("replace: {}", part.part_name));
            }
        }

        for part in &report.parts_to_inspect {
            technical += INSPECTED_PART_WEIGHT * part.confidence.clamp(0.0, 1.0);
            signals.push(format!("inspect: {}", part.part_name));
        }

        for flag in &report.risk_flags {
            if mentions_any(flag, CRITICAL_FLAGS) {
                technical += CRITICAL_FLAG_WEIGHT;
                signals.push(format!("critical flag: {flag}"));
            } else {
                technical += OTHER_FLAG_WEIGHT;
                signals.push(format!("flag: {flag}"));
            }
        }

        if report.roadworthy == Roadworthiness::No {
            technical += NOT_ROADWORTHY_WEIGHT;
            signals.push("not roadworthy".to_string());
        }

        let cost_mid = report.cost_aed.total_range.mid;
        let economic = self.bands.score(cost_mid);
        if economic > 0.0 {
            signals.push(format!("repair cost: {cost_mid:.0} AED"));
        }

        if signals.is_empty() {
            return SeverityBreakdown::unknown(report.severity_score);
        }

        let technical = round1(technical.clamp(0.0, MAX_SEVERITY));
        let combined = technical.max(economic);

        SeverityBreakdown {
            technical_severity: technical,
            economic_severity: economic,
            combined_severity: combined,
            level: Some(SeverityLevel::from_score(combined)),
            ai_severity_score: report.severity_score,
            deviation: round1(combined - f64::from(report.severity_score)),
            status: BreakdownStatus::Scored,
            signals,
        }
    }
}
