use bid_desk::desk::{RepositoryError, VehicleRepository};
use bid_desk::valuation::{Vehicle, VehicleId};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryVehicleRepository {
    vehicles: Arc<Mutex<HashMap<VehicleId, Vehicle>>>,
}

impl InMemoryVehicleRepository {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<VehicleId, Vehicle>>, RepositoryError> {
        self.vehicles
            .lock()
            .map_err(|_| RepositoryError::Unavailable("vehicle store poisoned".to_string()))
    }

    /// Seeds records as-is, keeping their ids.
    pub(crate) fn with_vehicles(vehicles: Vec<Vehicle>) -> Self {
        let map = vehicles
            .into_iter()
            .map(|vehicle| (vehicle.id.clone(), vehicle))
            .collect();
        Self {
            vehicles: Arc::new(Mutex::new(map)),
        }
    }
}

impl VehicleRepository for InMemoryVehicleRepository {
    fn insert(&self, vehicle: Vehicle) -> Result<Vehicle, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&vehicle.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(vehicle.id.clone(), vehicle.clone());
        Ok(vehicle)
    }

    fn update(&self, vehicle: Vehicle) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&vehicle.id) {
            guard.insert(vehicle.id.clone(), vehicle);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &VehicleId) -> Result<Option<Vehicle>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        Ok(self.lock()?.values().cloned().collect())
    }
}

/// Reads a file, or stdin when no path (or `-`) is given.
pub(crate) fn read_input(path: Option<&Path>) -> std::io::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VehicleInput {
    Many(Vec<Vehicle>),
    One(Box<Vehicle>),
}

/// Accepts a single vehicle object or an array. Records without an id get a positional one.
pub(crate) fn parse_vehicles(raw: &str) -> Result<Vec<Vehicle>, serde_json::Error> {
    let vehicles = match serde_json::from_str::<VehicleInput>(raw)? {
        VehicleInput::Many(vehicles) => vehicles,
        VehicleInput::One(vehicle) => vec![*vehicle],
    };

    Ok(vehicles
        .into_iter()
        .enumerate()
        .map(|(index, mut vehicle)| {
            if vehicle.id.0.trim().is_empty() {
                vehicle.id = VehicleId(format!("input-{:03}", index + 1));
            }
            vehicle
        })
        .collect())
}
