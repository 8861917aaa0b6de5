use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::config::ValuationConfig;
use crate::damage::{DamageDescriber, DescriberError, DescriberImage, DescriberRequest};
use crate::desk::{
    desk_router, RepositoryError, ReviewSubmission, VehicleDeskService, VehicleRepository,
    VehicleSubmission,
};
use crate::valuation::{Vehicle, VehicleId};

pub(super) const DESCRIBER_RESPONSE: &str =
    include_str!("../../../tests/fixtures/describer_response.txt");

/// 50 000 AED bid against a 15 000 EUR resale price: a clear loss.
pub(super) fn patrol_submission() -> VehicleSubmission {
    VehicleSubmission {
        title: "Nissan Patrol 2019".to_string(),
        start_bid: Some(50_000.0),
        market_price_de: Some(15_000.0),
        created_by: Some("buyer-1".to_string()),
        ..VehicleSubmission::default()
    }
}

/// 16 000 AED bid against 15 000 EUR: roughly 40% profit.
pub(super) fn bargain_submission() -> VehicleSubmission {
    VehicleSubmission {
        title: "Toyota Hilux 2018".to_string(),
        start_bid: Some(16_000.0),
        market_price_de: Some(15_000.0),
        ..VehicleSubmission::default()
    }
}

pub(super) fn review(mechanic_id: &str, recommendation: &str, estimate: f64) -> ReviewSubmission {
    ReviewSubmission {
        mechanic_id: mechanic_id.to_string(),
        recommendation: Some(recommendation.to_string()),
        repair_estimate: estimate,
        risk: None,
        comment: String::new(),
    }
}

pub(super) fn photo() -> DescriberImage {
    DescriberImage {
        media_type: "image/jpeg".to_string(),
        data: "aGVsbG8=".to_string(),
    }
}

pub(super) fn build_service() -> (VehicleDeskService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = VehicleDeskService::new(repository.clone(), ValuationConfig::default());
    (service, repository)
}

pub(super) fn router_with_service(service: VehicleDeskService<MemoryRepository>) -> axum::Router {
    desk_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) vehicles: Arc<Mutex<HashMap<VehicleId, Vehicle>>>,
}

impl VehicleRepository for MemoryRepository {
    fn insert(&self, vehicle: Vehicle) -> Result<Vehicle, RepositoryError> {
        let mut guard = self.vehicles.lock().expect("repository mutex poisoned");
        if guard.contains_key(&vehicle.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(vehicle.id.clone(), vehicle.clone());
        Ok(vehicle)
    }

    fn update(&self, vehicle: Vehicle) -> Result<(), RepositoryError> {
        let mut guard = self.vehicles.lock().expect("repository mutex poisoned");
        guard.insert(vehicle.id.clone(), vehicle);
        Ok(())
    }

    fn fetch(&self, id: &VehicleId) -> Result<Option<Vehicle>, RepositoryError> {
        let guard = self.vehicles.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        let guard = self.vehicles.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl VehicleRepository for UnavailableRepository {
    fn insert(&self, _vehicle: Vehicle) -> Result<Vehicle, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _vehicle: Vehicle) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &VehicleId) -> Result<Option<Vehicle>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Replays a canned answer and counts calls.
pub(super) struct ScriptedDescriber {
    answer: Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedDescriber {
    pub(super) fn answering(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn failing(reason: &str) -> Self {
        Self {
            answer: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DamageDescriber for ScriptedDescriber {
    fn describe(&self, request: &DescriberRequest) -> Result<String, DescriberError> {
        assert!(!request.images.is_empty(), "describer called without images");
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .map_err(DescriberError::Unavailable)
    }
}

pub(super) fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
