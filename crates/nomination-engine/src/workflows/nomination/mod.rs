//! Vendor nomination workflow: cost submissions, factor-weighted ranking and capability data.
//!
//! A nomination is stored as one aggregate (baseline, submissions, ratings). Every write
//! recomputes the ranks of all submissions and commits the aggregate in a single repository
//! call, so readers only ever observe fully ranked states.

pub mod capability;
pub mod domain;
pub mod fields;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use capability::{
    CapabilityCell, CapabilityCriterion, CapabilityMatrix, CapabilityRow, VendorCapabilitySummary,
};
pub use domain::{
    BulkCostUpdate, CostComponentBaseline, CostComponents, FactorWeights, NewNomination,
    NominationId, NominationRecord, NominationStatus, RankDimension, RankedResult,
    VendorCostEntry, VendorCostSubmission, VendorId, VendorRating, WeightWarning,
};
pub use fields::{
    map_cost_competency_fields, map_vendor_rating_fields, validate_fields, DefectKind, FieldDefect,
    FieldSet, FieldUpdate, FieldValidation, FieldValue, MappedFields,
};
pub use ranking::RankingEngine;
pub use repository::{NominationRepository, RepositoryError};
pub use router::nomination_router;
pub use service::{NominationRanking, NominationService, NominationServiceError};
