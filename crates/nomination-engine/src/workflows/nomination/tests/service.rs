use super::common::*;
use std::sync::Arc;

use serde_json::json;

use crate::workflows::nomination::domain::{
    BulkCostUpdate, FactorWeights, NominationId, NominationStatus, VendorCostEntry, VendorId,
    WeightWarning,
};
use crate::workflows::nomination::fields::{DefectKind, FieldUpdate};
use crate::workflows::nomination::repository::RepositoryError;
use crate::workflows::nomination::{NominationService, NominationServiceError};

fn entry(vendor: &str, fields: FieldUpdate) -> VendorCostEntry {
    VendorCostEntry {
        vendor_id: VendorId::from(vendor),
        nomination_id: None,
        fields,
    }
}

fn two_vendor_bulk() -> BulkCostUpdate {
    BulkCostUpdate {
        vendor_cost_data: vec![
            entry("vendor-a", quote(100.0, 50.0, Some(10.0))),
            entry("vendor-b", quote(90.0, 60.0, Some(5.0))),
        ],
        base_data: None,
    }
}

#[test]
fn create_opens_empty_submissions_per_vendor() {
    let (service, repository) = build_service();

    let record = service
        .create(new_nomination(&["vendor-a", "vendor-b"]))
        .expect("nomination created");

    assert!(record.id.0.starts_with("nom-"));
    assert_eq!(record.status, NominationStatus::Open);
    assert_eq!(record.baseline.weights, FactorWeights::default());
    assert_eq!(
        record.vendor_ids().cloned().collect::<Vec<_>>(),
        vec![VendorId::from("vendor-a"), VendorId::from("vendor-b")]
    );
    assert_eq!(record.ratings.len(), 2);
    assert!(record
        .submissions
        .iter()
        .all(|submission| submission.ranking.overall_rank.is_none()));
    assert_eq!(repository.stored(&record.id), record);
}

#[test]
fn create_rejects_duplicate_vendors() {
    let (service, repository) = build_service();

    match service.create(new_nomination(&["vendor-a", "vendor-a"])) {
        Err(NominationServiceError::DuplicateVendor(vendor)) => {
            assert_eq!(vendor, VendorId::from("vendor-a"));
        }
        other => panic!("expected duplicate vendor error, got {other:?}"),
    }
    assert!(repository.records.lock().expect("lock").is_empty());
}

#[test]
fn create_requires_project_reference() {
    let (service, _) = build_service();
    let mut request = new_nomination(&["vendor-a"]);
    request.project_reference = "   ".to_string();

    assert!(matches!(
        service.create(request),
        Err(NominationServiceError::MissingProjectReference)
    ));
}

#[test]
fn create_applies_baseline_patch() {
    let (service, _) = build_service();
    let mut request = new_nomination(&["vendor-a"]);
    request.baseline = Some(
        FieldUpdate::new()
            .with("costWeight", 60)
            .with("developmentCostWeight", 20)
            .with("netPricePerUnit", 95.5),
    );

    let record = service.create(request).expect("nomination created");

    assert_eq!(record.baseline.weights.cost_weight, 60.0);
    assert_eq!(record.baseline.weights.development_cost_weight, 20.0);
    assert_eq!(record.baseline.weights.lead_time_weight, 20.0);
    assert_eq!(record.baseline.targets.net_price_per_unit, Some(95.5));
}

#[test]
fn bulk_update_ranks_every_vendor_and_persists() {
    let (service, repository) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a", "vendor-b"]))
        .expect("nomination created");

    let ranking = service
        .bulk_update_cost_data(&record.id, &two_vendor_bulk())
        .expect("bulk update applies");

    assert_eq!(ranking.vendors[0].vendor_id, VendorId::from("vendor-b"));
    assert_eq!(ranking.vendors[0].ranking.overall_rank, Some(1));
    assert_eq!(ranking.vendors[1].ranking.overall_rank, Some(2));
    assert!(ranking.warnings.is_empty());

    let stored = repository.stored(&record.id);
    assert_eq!(stored.revision, record.revision + 1);
    let vendor_a = stored
        .submission(&VendorId::from("vendor-a"))
        .expect("vendor a stored");
    assert_eq!(vendor_a.components.net_price_per_unit, Some(100.0));
    assert_eq!(vendor_a.ranking.total_score, Some(170.0));
    assert!(vendor_a.updated_at.is_some());
}

#[test]
fn bulk_update_with_foreign_entry_persists_nothing() {
    let (service, repository) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a", "vendor-b"]))
        .expect("nomination created");
    let mut request = two_vendor_bulk();
    request.vendor_cost_data[1].nomination_id = Some(NominationId("nom-other".to_string()));
    request.base_data = Some(FieldUpdate::new().with("costWeight", 70));

    match service.bulk_update_cost_data(&record.id, &request) {
        Err(NominationServiceError::ForeignNomination {
            vendor_id, found, ..
        }) => {
            assert_eq!(vendor_id, VendorId::from("vendor-b"));
            assert_eq!(found, NominationId("nom-other".to_string()));
        }
        other => panic!("expected foreign nomination error, got {other:?}"),
    }

    assert_eq!(repository.stored(&record.id), record);
}

#[test]
fn bulk_update_with_unknown_vendor_persists_nothing() {
    let (service, repository) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a"]))
        .expect("nomination created");
    let request = BulkCostUpdate {
        vendor_cost_data: vec![
            entry("vendor-a", quote(100.0, 50.0, Some(10.0))),
            entry("vendor-x", quote(80.0, 40.0, Some(4.0))),
        ],
        base_data: None,
    };

    assert!(matches!(
        service.bulk_update_cost_data(&record.id, &request),
        Err(NominationServiceError::UnknownVendor { .. })
    ));
    assert_eq!(repository.stored(&record.id), record);
}

#[test]
fn bulk_update_rejects_uncoercible_percentages() {
    let (service, repository) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a"]))
        .expect("nomination created");
    let request = BulkCostUpdate {
        vendor_cost_data: vec![entry(
            "vendor-a",
            quote(100.0, 50.0, None).with("financialRiskPercentage", "moderate"),
        )],
        base_data: None,
    };

    match service.bulk_update_cost_data(&record.id, &request) {
        Err(NominationServiceError::InvalidFields { defects, .. }) => {
            assert_eq!(defects.len(), 1);
            assert_eq!(defects[0].field, "financial_risk_percentage");
        }
        other => panic!("expected invalid fields, got {other:?}"),
    }
    assert_eq!(repository.stored(&record.id), record);
}

#[test]
fn negative_costs_are_rejected() {
    let (service, _) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a"]))
        .expect("nomination created");

    let result = service.upsert_submission(
        &record.id,
        &VendorId::from("vendor-a"),
        &FieldUpdate::new().with("processCost", -4.0),
    );

    match result {
        Err(NominationServiceError::InvalidFields { defects, .. }) => {
            assert_eq!(defects[0].problem, DefectKind::Negative);
        }
        other => panic!("expected negative defect, got {other:?}"),
    }
}

#[test]
fn baseline_weights_reorder_vendors() {
    let (service, _) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a", "vendor-b"]))
        .expect("nomination created");
    service
        .bulk_update_cost_data(&record.id, &two_vendor_bulk())
        .expect("bulk update applies");

    let ranking = service
        .update_baseline(
            &record.id,
            &FieldUpdate::new()
                .with("costWeight", 0)
                .with("developmentCostWeight", 100)
                .with("leadTimeWeight", 0),
        )
        .expect("baseline updated");

    assert_eq!(ranking.vendors[0].vendor_id, VendorId::from("vendor-a"));
    assert_eq!(ranking.vendors[0].ranking.overall_rank, Some(1));
}

#[test]
fn baseline_reports_weights_off_one_hundred() {
    let (service, repository) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a"]))
        .expect("nomination created");

    let ranking = service
        .update_baseline(&record.id, &FieldUpdate::new().with("leadTimeWeight", 0))
        .expect("baseline updated");

    assert_eq!(
        ranking.warnings,
        vec![WeightWarning::SumNotHundred { total: 80.0 }]
    );
    assert_eq!(repository.stored(&record.id).baseline.weights.lead_time_weight, 0.0);
}

#[test]
fn baseline_rejects_weights_out_of_range() {
    let (service, repository) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a"]))
        .expect("nomination created");

    let result = service.update_baseline(&record.id, &FieldUpdate::new().with("costWeight", 140));

    assert!(matches!(
        result,
        Err(NominationServiceError::InvalidFields { .. })
    ));
    assert_eq!(repository.stored(&record.id), record);
}

#[test]
fn upsert_adds_new_vendor_and_ranks_it() {
    let (service, repository) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a"]))
        .expect("nomination created");

    service
        .upsert_submission(
            &record.id,
            &VendorId::from("vendor-a"),
            &quote(100.0, 50.0, Some(10.0)),
        )
        .expect("first quote");
    let ranking = service
        .upsert_submission(
            &record.id,
            &VendorId::from("vendor-c"),
            &quote(80.0, 45.0, Some(8.0)),
        )
        .expect("late vendor quote");

    assert_eq!(ranking.vendors.len(), 2);
    assert_eq!(ranking.vendors[0].vendor_id, VendorId::from("vendor-c"));
    let stored = repository.stored(&record.id);
    assert!(stored.ratings.contains_key(&VendorId::from("vendor-c")));
}

#[test]
fn partial_updates_keep_unmentioned_fields() {
    let (service, repository) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a"]))
        .expect("nomination created");
    let vendor = VendorId::from("vendor-a");

    service
        .upsert_submission(&record.id, &vendor, &quote(100.0, 50.0, Some(10.0)))
        .expect("quote");
    service
        .upsert_submission(
            &record.id,
            &vendor,
            &FieldUpdate::new()
                .with("paymentTerms", "45 days")
                .with("leadTimeDays", serde_json::Value::Null),
        )
        .expect("terms");

    let stored = repository.stored(&record.id);
    let submission = stored.submission(&vendor).expect("submission");
    assert_eq!(submission.components.net_price_per_unit, Some(100.0));
    assert_eq!(submission.components.lead_time_days, Some(10.0));
    assert_eq!(submission.components.payment_terms.as_deref(), Some("45 days"));
}

#[test]
fn remove_submission_reranks_remaining_vendors() {
    let (service, repository) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a", "vendor-b"]))
        .expect("nomination created");
    service
        .bulk_update_cost_data(&record.id, &two_vendor_bulk())
        .expect("bulk update applies");

    let ranking = service
        .remove_submission(&record.id, &VendorId::from("vendor-b"))
        .expect("vendor removed");

    assert_eq!(ranking.vendors.len(), 1);
    assert_eq!(ranking.vendors[0].ranking.rank_cost, Some(1));
    assert_eq!(ranking.vendors[0].ranking.overall_rank, Some(1));
    let stored = repository.stored(&record.id);
    assert!(!stored.ratings.contains_key(&VendorId::from("vendor-b")));
}

#[test]
fn remove_unknown_vendor_is_referential_error() {
    let (service, _) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a"]))
        .expect("nomination created");

    assert!(matches!(
        service.remove_submission(&record.id, &VendorId::from("vendor-q")),
        Err(NominationServiceError::UnknownVendor { .. })
    ));
}

#[test]
fn ranked_results_put_unranked_vendors_last() {
    let (service, _) = build_service();
    let record = service
        .create(new_nomination(&["vendor-silent", "vendor-a", "vendor-b"]))
        .expect("nomination created");
    service
        .bulk_update_cost_data(&record.id, &two_vendor_bulk())
        .expect("bulk update applies");

    let ranking = service.ranked_results(&record.id).expect("ranking");
    let order: Vec<&str> = ranking
        .vendors
        .iter()
        .map(|submission| submission.vendor_id.0.as_str())
        .collect();

    assert_eq!(order, vec!["vendor-b", "vendor-a", "vendor-silent"]);
    assert!(ranking.vendor(&VendorId::from("vendor-silent")).is_some());
}

#[test]
fn completed_nominations_refuse_writes_but_allow_reads() {
    let (service, _) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a"]))
        .expect("nomination created");

    let completed = service.complete(&record.id).expect("completed");
    assert_eq!(completed.status, NominationStatus::Completed);

    match service.upsert_submission(
        &record.id,
        &VendorId::from("vendor-a"),
        &quote(1.0, 1.0, None),
    ) {
        Err(NominationServiceError::Closed(id)) => assert_eq!(id, record.id),
        other => panic!("expected closed error, got {other:?}"),
    }
    assert!(matches!(
        service.complete(&record.id),
        Err(NominationServiceError::Closed(_))
    ));
    assert!(service.ranked_results(&record.id).is_ok());
    assert!(service.capability_data(&record.id).is_ok());
}

#[test]
fn vendor_rating_updates_are_stored() {
    let (service, repository) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a"]))
        .expect("nomination created");
    let update: FieldUpdate = serde_json::from_value(json!({
        "qualityScore": 88,
        "onTimeDeliveryPercentage": "97.5",
        "defectCount": 2,
        "isApproved": "yes",
        "remarks": " audited in March "
    }))
    .expect("object payload");

    let rating = service
        .update_vendor_rating(&record.id, &VendorId::from("vendor-a"), &update)
        .expect("rating stored");

    assert_eq!(rating.quality_score, Some(88.0));
    assert_eq!(rating.on_time_delivery_percentage, Some(97.5));
    assert_eq!(rating.defect_count, Some(2));
    assert_eq!(rating.approved, Some(true));
    assert_eq!(rating.remarks.as_deref(), Some("audited in March"));
    assert!(rating.updated_at.is_some());

    let stored = repository.stored(&record.id);
    assert_eq!(stored.ratings.get(&VendorId::from("vendor-a")), Some(&rating));
}

#[test]
fn vendor_rating_rejects_unknown_vendor() {
    let (service, _) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a"]))
        .expect("nomination created");

    assert!(matches!(
        service.update_vendor_rating(
            &record.id,
            &VendorId::from("vendor-z"),
            &FieldUpdate::new().with("qualityScore", 70),
        ),
        Err(NominationServiceError::UnknownVendor { .. })
    ));
}

#[test]
fn delete_cascades_and_then_reports_not_found() {
    let (service, repository) = build_service();
    let record = service
        .create(new_nomination(&["vendor-a"]))
        .expect("nomination created");

    service.delete(&record.id).expect("deleted");

    assert!(repository.records.lock().expect("lock").is_empty());
    assert!(matches!(
        service.get(&record.id),
        Err(NominationServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.delete(&record.id),
        Err(NominationServiceError::NotFound(_))
    ));
}

#[test]
fn concurrent_write_surfaces_stale_revision() {
    let service = NominationService::new(
        Arc::new(ConflictRepository::default()),
        FactorWeights::default(),
    );
    let record = service
        .create(new_nomination(&["vendor-a", "vendor-b"]))
        .expect("nomination created");

    match service.bulk_update_cost_data(&record.id, &two_vendor_bulk()) {
        Err(NominationServiceError::Repository(RepositoryError::StaleRevision {
            expected,
            found,
        })) => {
            assert_eq!(expected, record.revision);
            assert_eq!(found, record.revision + 1);
        }
        other => panic!("expected stale revision, got {other:?}"),
    }
    assert_eq!(
        service.get(&record.id).expect("still readable").revision,
        record.revision
    );
}

#[test]
fn repository_outage_propagates_unchanged() {
    let service = NominationService::new(Arc::new(UnavailableRepository), FactorWeights::default());

    assert!(matches!(
        service.ranked_results(&NominationId("nom-000001".to_string())),
        Err(NominationServiceError::Repository(
            RepositoryError::Unavailable(_)
        ))
    ));
}
