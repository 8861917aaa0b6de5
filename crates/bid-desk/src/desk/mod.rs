//! Vehicle desk: registration, mechanic reviews, evaluation and damage-report
//! ingestion over a pluggable repository, plus the HTTP router.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    DamageIngestRequest, NormalizeRequest, QuoteRequest, ReviewSubmission, SubmissionError,
    VehicleSubmission,
};
pub use repository::{RepositoryError, VehicleRepository};
pub use router::desk_router;
pub use service::{DeskServiceError, VehicleDeskService};
