use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::capability::CapabilityMatrix;
use super::domain::{
    BulkCostUpdate, CostComponentBaseline, FactorWeights, NewNomination, NominationId,
    NominationRecord, NominationStatus, VendorCostSubmission, VendorId, VendorRating,
    WeightWarning,
};
use super::fields::{FieldDefect, FieldSet, FieldUpdate};
use super::ranking::RankingEngine;
use super::repository::{NominationRepository, RepositoryError};

/// Service composing the field registry, ranking engine, and nomination repository.
pub struct NominationService<R> {
    repository: Arc<R>,
    default_weights: FactorWeights,
}

static NOMINATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_nomination_id() -> NominationId {
    let id = NOMINATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    NominationId(format!("nom-{id:06}"))
}

impl<R> NominationService<R>
where
    R: NominationRepository + 'static,
{
    pub fn new(repository: Arc<R>, default_weights: FactorWeights) -> Self {
        Self {
            repository,
            default_weights,
        }
    }

    /// Open a nomination with an empty submission and rating for every invited vendor.
    pub fn create(
        &self,
        request: NewNomination,
    ) -> Result<NominationRecord, NominationServiceError> {
        let project_reference = request.project_reference.trim().to_string();
        if project_reference.is_empty() {
            return Err(NominationServiceError::MissingProjectReference);
        }

        let mut seen = HashSet::new();
        for vendor_id in &request.vendors {
            if !seen.insert(vendor_id) {
                return Err(NominationServiceError::DuplicateVendor(vendor_id.clone()));
            }
        }

        let now = Utc::now();
        let mut baseline = CostComponentBaseline::with_weights(self.default_weights);
        if let Some(patch) = &request.baseline {
            baseline = patch_baseline(&baseline, patch, now)?;
        }

        let mut record = NominationRecord {
            id: next_nomination_id(),
            project_reference,
            bom_item: request.bom_item.map(|item| item.trim().to_string()),
            status: NominationStatus::Open,
            baseline,
            submissions: request
                .vendors
                .iter()
                .cloned()
                .map(VendorCostSubmission::new)
                .collect(),
            ratings: request
                .vendors
                .iter()
                .cloned()
                .map(|vendor_id| (vendor_id, VendorRating::default()))
                .collect::<BTreeMap<_, _>>(),
            created_at: now,
            updated_at: now,
            revision: 1,
        };
        RankingEngine::new(record.baseline.weights).recompute(&mut record.submissions);

        let stored = self.repository.insert(record)?;
        info!(
            nomination = %stored.id,
            vendors = stored.submissions.len(),
            "nomination opened"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &NominationId) -> Result<NominationRecord, NominationServiceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| NominationServiceError::NotFound(id.clone()))
    }

    /// Remove the nomination along with its baseline, submissions and ratings.
    pub fn delete(&self, id: &NominationId) -> Result<(), NominationServiceError> {
        self.get(id)?;
        self.repository.delete(id)?;
        info!(nomination = %id, "nomination deleted");
        Ok(())
    }

    /// Mark the nomination complete; later writes are refused.
    pub fn complete(&self, id: &NominationId) -> Result<NominationRecord, NominationServiceError> {
        let mut record = self.load_open(id)?;
        let expected = record.revision;
        record.status = NominationStatus::Completed;
        let stored = self.commit(record, expected, Utc::now())?;
        info!(nomination = %id, "nomination completed");
        Ok(stored)
    }

    pub fn update_baseline(
        &self,
        id: &NominationId,
        patch: &FieldUpdate,
    ) -> Result<NominationRanking, NominationServiceError> {
        let mut record = self.load_open(id)?;
        let expected = record.revision;
        let now = Utc::now();
        record.baseline = patch_baseline(&record.baseline, patch, now)?;
        let stored = self.commit(record, expected, now)?;
        Ok(NominationRanking::from_record(&stored))
    }

    /// Create or patch one vendor's submission. Unknown vendors are added to the nomination.
    pub fn upsert_submission(
        &self,
        id: &NominationId,
        vendor_id: &VendorId,
        update: &FieldUpdate,
    ) -> Result<NominationRanking, NominationServiceError> {
        let mut record = self.load_open(id)?;
        let expected = record.revision;
        let now = Utc::now();

        let index = match record.submission_index(vendor_id) {
            Some(index) => index,
            None => {
                debug!(nomination = %id, vendor = %vendor_id, "adding vendor to nomination");
                record
                    .submissions
                    .push(VendorCostSubmission::new(vendor_id.clone()));
                record
                    .ratings
                    .entry(vendor_id.clone())
                    .or_default();
                record.submissions.len() - 1
            }
        };

        record.submissions[index] = patch_submission(&record.submissions[index], update, now)?;
        let stored = self.commit(record, expected, now)?;
        Ok(NominationRanking::from_record(&stored))
    }

    pub fn remove_submission(
        &self,
        id: &NominationId,
        vendor_id: &VendorId,
    ) -> Result<NominationRanking, NominationServiceError> {
        let mut record = self.load_open(id)?;
        let expected = record.revision;
        let index = record
            .submission_index(vendor_id)
            .ok_or_else(|| NominationServiceError::UnknownVendor {
                nomination_id: id.clone(),
                vendor_id: vendor_id.clone(),
            })?;

        record.submissions.remove(index);
        record.ratings.remove(vendor_id);
        let stored = self.commit(record, expected, Utc::now())?;
        info!(nomination = %id, vendor = %vendor_id, "vendor removed from nomination");
        Ok(NominationRanking::from_record(&stored))
    }

    /// Apply every vendor entry and the optional baseline patch, or none of them.
    pub fn bulk_update_cost_data(
        &self,
        id: &NominationId,
        request: &BulkCostUpdate,
    ) -> Result<NominationRanking, NominationServiceError> {
        let mut record = self.load_open(id)?;
        let expected = record.revision;
        let now = Utc::now();

        if let Some(patch) = &request.base_data {
            record.baseline = patch_baseline(&record.baseline, patch, now)?;
        }

        for entry in &request.vendor_cost_data {
            if let Some(target) = &entry.nomination_id {
                if target != id {
                    return Err(NominationServiceError::ForeignNomination {
                        vendor_id: entry.vendor_id.clone(),
                        expected: id.clone(),
                        found: target.clone(),
                    });
                }
            }

            let index = record.submission_index(&entry.vendor_id).ok_or_else(|| {
                NominationServiceError::UnknownVendor {
                    nomination_id: id.clone(),
                    vendor_id: entry.vendor_id.clone(),
                }
            })?;

            record.submissions[index] =
                patch_submission(&record.submissions[index], &entry.fields, now)?;
        }

        let stored = self.commit(record, expected, now)?;
        info!(
            nomination = %id,
            entries = request.vendor_cost_data.len(),
            baseline = request.base_data.is_some(),
            "bulk cost update applied"
        );
        Ok(NominationRanking::from_record(&stored))
    }

    pub fn ranked_results(
        &self,
        id: &NominationId,
    ) -> Result<NominationRanking, NominationServiceError> {
        let record = self.get(id)?;
        Ok(NominationRanking::from_record(&record))
    }

    pub fn update_vendor_rating(
        &self,
        id: &NominationId,
        vendor_id: &VendorId,
        update: &FieldUpdate,
    ) -> Result<VendorRating, NominationServiceError> {
        let mut record = self.load_open(id)?;
        let expected = record.revision;
        if record.submission_index(vendor_id).is_none() {
            return Err(NominationServiceError::UnknownVendor {
                nomination_id: id.clone(),
                vendor_id: vendor_id.clone(),
            });
        }

        let mapped = FieldSet::VendorRating.registry().map(update);
        let current = record.ratings.get(vendor_id).cloned().unwrap_or_default();
        let rating = current
            .patched(&mapped)
            .map_err(|defects| NominationServiceError::InvalidFields {
                scope: format!("vendor {vendor_id} rating"),
                defects,
            })?;
        record.ratings.insert(vendor_id.clone(), rating.clone());

        let now = mapped.updated_at().unwrap_or_else(Utc::now);
        self.commit(record, expected, now)?;
        Ok(rating)
    }

    pub fn capability_data(
        &self,
        id: &NominationId,
    ) -> Result<CapabilityMatrix, NominationServiceError> {
        let record = self.get(id)?;
        Ok(CapabilityMatrix::build(&record))
    }

    fn load_open(&self, id: &NominationId) -> Result<NominationRecord, NominationServiceError> {
        let record = self.get(id)?;
        if !record.is_open() {
            return Err(NominationServiceError::Closed(id.clone()));
        }
        Ok(record)
    }

    fn commit(
        &self,
        mut record: NominationRecord,
        expected_revision: u64,
        now: DateTime<Utc>,
    ) -> Result<NominationRecord, NominationServiceError> {
        RankingEngine::new(record.baseline.weights).recompute(&mut record.submissions);

        for warning in record.baseline.weights.warnings() {
            warn!(nomination = %record.id, "{}", warning.summary());
        }

        record.revision = expected_revision + 1;
        record.updated_at = now;
        self.repository.replace(record.clone(), expected_revision)?;
        Ok(record)
    }
}

fn patch_baseline(
    baseline: &CostComponentBaseline,
    patch: &FieldUpdate,
    now: DateTime<Utc>,
) -> Result<CostComponentBaseline, NominationServiceError> {
    let mapped = FieldSet::Baseline.registry().map_at(patch, now);
    baseline
        .patched(&mapped)
        .map_err(|defects| NominationServiceError::InvalidFields {
            scope: "baseline".to_string(),
            defects,
        })
}

fn patch_submission(
    submission: &VendorCostSubmission,
    update: &FieldUpdate,
    now: DateTime<Utc>,
) -> Result<VendorCostSubmission, NominationServiceError> {
    let mapped = FieldSet::CostCompetency.registry().map_at(update, now);
    submission
        .patched(&mapped)
        .map_err(|defects| NominationServiceError::InvalidFields {
            scope: format!("vendor {}", submission.vendor_id),
            defects,
        })
}

/// Ranked view of a nomination: best overall rank first, unranked vendors last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NominationRanking {
    pub nomination_id: NominationId,
    pub status: NominationStatus,
    pub weights: FactorWeights,
    pub warnings: Vec<WeightWarning>,
    pub vendors: Vec<VendorCostSubmission>,
}

impl NominationRanking {
    pub fn from_record(record: &NominationRecord) -> Self {
        let mut vendors = record.submissions.clone();
        vendors.sort_by_key(|submission| {
            (
                submission.ranking.overall_rank.is_none(),
                submission.ranking.overall_rank,
            )
        });

        Self {
            nomination_id: record.id.clone(),
            status: record.status,
            weights: record.baseline.weights,
            warnings: record.baseline.weights.warnings(),
            vendors,
        }
    }

    pub fn vendor(&self, vendor_id: &VendorId) -> Option<&VendorCostSubmission> {
        self.vendors
            .iter()
            .find(|submission| &submission.vendor_id == vendor_id)
    }
}

/// Error raised by the nomination service.
#[derive(Debug, thiserror::Error)]
pub enum NominationServiceError {
    #[error("nomination {0} not found")]
    NotFound(NominationId),
    #[error("nomination {0} is completed and no longer accepts updates")]
    Closed(NominationId),
    #[error("vendor {vendor_id} is not part of nomination {nomination_id}")]
    UnknownVendor {
        nomination_id: NominationId,
        vendor_id: VendorId,
    },
    #[error("entry for vendor {vendor_id} targets nomination {found}, expected {expected}")]
    ForeignNomination {
        vendor_id: VendorId,
        expected: NominationId,
        found: NominationId,
    },
    #[error("vendor {0} is listed more than once")]
    DuplicateVendor(VendorId),
    #[error("project reference is required")]
    MissingProjectReference,
    #[error("{} invalid field(s) in {scope}", defects.len())]
    InvalidFields {
        scope: String,
        defects: Vec<FieldDefect>,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
