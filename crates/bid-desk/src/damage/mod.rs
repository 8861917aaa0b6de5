//! Turns the damage describer's free-form answer into a [`DamageReport`].
//!
//! The pipeline is repair ([`repair`]), normalization ([`normalizer`]) and
//! severity reconciliation ([`severity`]). Only the first two can fail.

pub(crate) mod aliases;
pub mod describer;
pub mod normalizer;
pub mod repair;
pub mod report;
pub mod severity;

use tracing::{debug, info};

use crate::valuation::ExchangeRate;

pub use describer::{DamageDescriber, DescriberError, DescriberImage, DescriberRequest};
pub use normalizer::normalize_value;
pub use repair::repair_and_parse;
pub use report::{
    AedCostEstimate, CostRange, DamageReport, EurCostEstimate, LaborHoursEstimate, LaborLineItem,
    PartInspection, PartReplacement, Roadworthiness, SeverityLevel,
};
pub use severity::{
    BreakdownStatus, InvalidSeverityBands, SeverityBands, SeverityBreakdown, SeverityReconciler,
};

#[derive(Debug, thiserror::Error)]
pub enum DamageReportError {
    #[error("describer returned an empty response")]
    EmptyResponse,
    #[error("describer response contains no JSON object")]
    NoJsonFound,
    #[error("describer response is not valid JSON after repair: {source}")]
    UnparsableJson {
        #[source]
        source: serde_json::Error,
    },
}

impl DamageReportError {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EmptyResponse => "empty_response",
            Self::NoJsonFound => "no_json_found",
            Self::UnparsableJson { .. } => "unparsable_json",
        }
    }
}

/// Repair and normalize, without reconciliation.
pub fn normalize_response(raw: &str, rate: ExchangeRate) -> Result<DamageReport, DamageReportError> {
    let value = repair_and_parse(raw)?;
    normalize_value(&value, rate)
}

/// Full pipeline for one completed describer call.
pub fn analyze_response(
    raw: &str,
    rate: ExchangeRate,
    reconciler: &SeverityReconciler,
) -> Result<DamageReport, DamageReportError> {
    let report = normalize_response(raw, rate).inspect_err(|error| {
        debug!(kind = error.kind(), "damage response rejected");
    })?;
    let report = reconciler.reconcile(&report);

    if let Some(breakdown) = &report.severity_breakdown {
        info!(
            component = %report.component,
            ai_score = report.severity_score,
            combined = breakdown.combined_severity,
            deviation = breakdown.deviation,
            "damage report reconciled"
        );
    }
    Ok(report)
}
