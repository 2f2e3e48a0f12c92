use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::nomination::domain::{
    FactorWeights, NewNomination, NominationId, NominationRecord, VendorCostSubmission, VendorId,
};
use crate::workflows::nomination::fields::FieldUpdate;
use crate::workflows::nomination::repository::{NominationRepository, RepositoryError};
use crate::workflows::nomination::{nomination_router, NominationService};

pub(super) fn weights(cost: f64, development: f64, lead_time: f64) -> FactorWeights {
    FactorWeights {
        cost_weight: cost,
        development_cost_weight: development,
        lead_time_weight: lead_time,
    }
}

pub(super) fn new_nomination(vendors: &[&str]) -> NewNomination {
    NewNomination {
        project_reference: "PRJ-2041".to_string(),
        bom_item: Some("BRKT-118 mounting bracket".to_string()),
        vendors: vendors.iter().map(|vendor| VendorId::from(*vendor)).collect(),
        baseline: None,
    }
}

/// Cost update in presentation naming; `None` leaves the field out.
pub(super) fn quote(net_price: f64, development: f64, lead_time: Option<f64>) -> FieldUpdate {
    let update = FieldUpdate::new()
        .with("netPricePerUnit", net_price)
        .with("developmentCost", development);
    match lead_time {
        Some(days) => update.with("leadTimeDays", days),
        None => update,
    }
}

pub(super) fn submission(
    vendor: &str,
    net_price: f64,
    development: f64,
    lead_time: f64,
) -> VendorCostSubmission {
    let mut submission = VendorCostSubmission::new(VendorId::from(vendor));
    submission.components.net_price_per_unit = Some(net_price);
    submission.components.development_cost = Some(development);
    submission.components.lead_time_days = Some(lead_time);
    submission
}

pub(super) fn build_service() -> (NominationService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = NominationService::new(repository.clone(), FactorWeights::default());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<NominationId, NominationRecord>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: &NominationId) -> NominationRecord {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("record present")
    }
}

impl NominationRepository for MemoryRepository {
    fn insert(&self, record: NominationRecord) -> Result<NominationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &NominationId) -> Result<Option<NominationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn replace(
        &self,
        record: NominationRecord,
        expected_revision: u64,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let current = guard.get(&record.id).ok_or(RepositoryError::NotFound)?;
        if current.revision != expected_revision {
            return Err(RepositoryError::StaleRevision {
                expected: expected_revision,
                found: current.revision,
            });
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn delete(&self, id: &NominationId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

/// Accepts inserts and reads but loses every write race.
#[derive(Default, Clone)]
pub(super) struct ConflictRepository {
    inner: MemoryRepository,
}

impl NominationRepository for ConflictRepository {
    fn insert(&self, record: NominationRecord) -> Result<NominationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: &NominationId) -> Result<Option<NominationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn replace(
        &self,
        _record: NominationRecord,
        expected_revision: u64,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::StaleRevision {
            expected: expected_revision,
            found: expected_revision + 1,
        })
    }

    fn delete(&self, id: &NominationId) -> Result<(), RepositoryError> {
        self.inner.delete(id)
    }
}

pub(super) struct UnavailableRepository;

impl NominationRepository for UnavailableRepository {
    fn insert(&self, _record: NominationRecord) -> Result<NominationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &NominationId) -> Result<Option<NominationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn replace(
        &self,
        _record: NominationRecord,
        _expected_revision: u64,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &NominationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn nomination_router_with_service(
    service: NominationService<MemoryRepository>,
) -> axum::Router {
    nomination_router(Arc::new(service))
}
