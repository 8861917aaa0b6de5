use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::{info, warn};

use super::domain::{QuoteRequest, ReviewSubmission, SubmissionError, VehicleSubmission};
use super::repository::{RepositoryError, VehicleRepository};
use crate::config::ValuationConfig;
use crate::damage::{
    analyze_response, DamageDescriber, DamageReport, DamageReportError, DescriberError,
    DescriberImage, DescriberRequest, SeverityReconciler,
};
use crate::valuation::{
    evaluate_vehicle, export::write_evaluations_csv, ExchangeRate, MechanicReview, Vehicle,
    VehicleEvaluation, VehicleId,
};

/// Service composing the repository, the valuation settings and the damage pipeline.
pub struct VehicleDeskService<R> {
    repository: Arc<R>,
    valuation: Arc<ValuationConfig>,
    reconciler: Arc<SeverityReconciler>,
}

static VEHICLE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static REVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_vehicle_id() -> VehicleId {
    let id = VEHICLE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    VehicleId(format!("veh-{id:06}"))
}

fn next_review_id() -> String {
    let id = REVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("rev-{id:06}")
}

impl<R> VehicleDeskService<R>
where
    R: VehicleRepository + 'static,
{
    pub fn new(repository: Arc<R>, valuation: ValuationConfig) -> Self {
        let reconciler = SeverityReconciler::new(valuation.severity_bands.clone());
        Self {
            repository,
            valuation: Arc::new(valuation),
            reconciler: Arc::new(reconciler),
        }
    }

    /// Register a new vehicle, returning the stored record.
    pub fn register(&self, submission: VehicleSubmission) -> Result<Vehicle, DeskServiceError> {
        submission.validate()?;
        let vehicle = submission.into_vehicle(next_vehicle_id());
        let stored = self.repository.insert(vehicle)?;
        info!(vehicle_id = %stored.id, title = %stored.title, "vehicle registered");
        Ok(stored)
    }

    pub fn get(&self, id: &VehicleId) -> Result<Vehicle, DeskServiceError> {
        let vehicle = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(vehicle)
    }

    /// Append a mechanic review. Multiple reviews per mechanic are kept.
    pub fn add_review(
        &self,
        id: &VehicleId,
        submission: ReviewSubmission,
    ) -> Result<MechanicReview, DeskServiceError> {
        submission.validate()?;
        let mut vehicle = self.get(id)?;

        let review = submission.into_review(next_review_id());
        vehicle.updated_at = Utc::now();
        vehicle.updated_by = Some(review.mechanic_id.clone());
        vehicle.reviews.push(review.clone());
        self.repository.update(vehicle)?;

        info!(vehicle_id = %id, mechanic_id = %review.mechanic_id, "review recorded");
        Ok(review)
    }

    pub fn evaluate(&self, id: &VehicleId) -> Result<VehicleEvaluation, DeskServiceError> {
        let vehicle = self.get(id)?;
        Ok(self.evaluate_record(&vehicle))
    }

    /// Evaluations for every stored vehicle, ordered by id.
    pub fn evaluate_all(&self) -> Result<Vec<VehicleEvaluation>, DeskServiceError> {
        let mut vehicles = self.repository.list()?;
        vehicles.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(vehicles
            .iter()
            .map(|vehicle| self.evaluate_record(vehicle))
            .collect())
    }

    fn evaluate_record(&self, vehicle: &Vehicle) -> VehicleEvaluation {
        evaluate_vehicle(vehicle, &self.valuation.settings, self.valuation.exchange_rate)
    }

    /// Evaluate an unsaved vehicle with optional one-off settings and rate.
    pub fn quote(&self, request: &QuoteRequest) -> VehicleEvaluation {
        let settings = request
            .settings
            .as_ref()
            .unwrap_or(&self.valuation.settings);
        let rate = self.rate_or_default(request.exchange_rate);
        evaluate_vehicle(&request.vehicle, settings, rate)
    }

    fn rate_or_default(&self, rate: Option<f64>) -> ExchangeRate {
        rate.map(ExchangeRate::new)
            .unwrap_or(self.valuation.exchange_rate)
    }

    /// Run the damage pipeline on raw describer text without touching storage.
    pub fn analyze(
        &self,
        raw_response: &str,
        rate: Option<f64>,
    ) -> Result<DamageReport, DamageReportError> {
        analyze_response(raw_response, self.rate_or_default(rate), &self.reconciler)
    }

    /// Replace the vehicle's damage report wholesale. A rejected response leaves the record untouched.
    pub fn ingest_damage_report(
        &self,
        id: &VehicleId,
        raw_response: &str,
    ) -> Result<DamageReport, DeskServiceError> {
        let mut vehicle = self.get(id)?;

        let report = self.analyze(raw_response, None).inspect_err(|error| {
            warn!(vehicle_id = %id, kind = error.kind(), "damage report rejected");
        })?;

        vehicle.ai_damage_report = Some(report.clone());
        vehicle.updated_at = Utc::now();
        self.repository.update(vehicle)?;

        info!(
            vehicle_id = %id,
            severity = report.severity.label(),
            estimated_repair_cost = report.estimated_repair_cost,
            "damage report stored"
        );
        Ok(report)
    }

    /// Ask the describer about the given photos and ingest its answer.
    pub fn request_damage_analysis(
        &self,
        id: &VehicleId,
        describer: &dyn DamageDescriber,
        images: Vec<DescriberImage>,
    ) -> Result<DamageReport, DeskServiceError> {
        if images.is_empty() {
            return Err(DescriberError::NoImages.into());
        }
        // fail fast before spending a describer call on an unknown vehicle
        self.get(id)?;

        let request = DescriberRequest::new(images);
        let raw_response = describer.describe(&request)?;
        self.ingest_damage_report(id, &raw_response)
    }

    /// Write all evaluations as CSV, returning the number of rows.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize, DeskServiceError> {
        let evaluations = self.evaluate_all()?;
        write_evaluations_csv(writer, &evaluations)?;
        Ok(evaluations.len())
    }
}

/// Error raised by the desk service.
#[derive(Debug, thiserror::Error)]
pub enum DeskServiceError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Damage(#[from] DamageReportError),
    #[error(transparent)]
    Describer(#[from] DescriberError),
    #[error("csv export failed: {0}")]
    Export(#[from] csv::Error),
}

impl DeskServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Submission(_) | Self::Damage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            Self::Describer(DescriberError::NoImages) => StatusCode::BAD_REQUEST,
            Self::Describer(_) => StatusCode::BAD_GATEWAY,
            Self::Repository(RepositoryError::Unavailable(_)) | Self::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
