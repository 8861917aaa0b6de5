use crate::valuation::{Vehicle, VehicleId};

/// Storage abstraction so the service module can be exercised in isolation.
/// Updates are last-write-wins on the whole record.
pub trait VehicleRepository: Send + Sync {
    fn insert(&self, vehicle: Vehicle) -> Result<Vehicle, RepositoryError>;
    fn update(&self, vehicle: Vehicle) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &VehicleId) -> Result<Option<Vehicle>, RepositoryError>;
    fn list(&self) -> Result<Vec<Vehicle>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("vehicle already exists")]
    Conflict,
    #[error("vehicle not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
