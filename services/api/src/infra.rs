use metrics_exporter_prometheus::PrometheusHandle;
use nomination_engine::workflows::nomination::{
    NominationId, NominationRecord, NominationRepository, RepositoryError,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNominationRepository {
    records: Arc<Mutex<HashMap<NominationId, NominationRecord>>>,
}

impl NominationRepository for InMemoryNominationRepository {
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
        let found = guard
            .get(&record.id)
            .map(|current| current.revision)
            .ok_or(RepositoryError::NotFound)?;
        if found != expected_revision {
            return Err(RepositoryError::StaleRevision {
                expected: expected_revision,
                found,
            });
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn delete(&self, id: &NominationId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.remove(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }
}

impl InMemoryNominationRepository {
    pub(crate) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}
