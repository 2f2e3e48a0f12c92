use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Coercion, FieldUpdate, FieldValidation, FieldValue, MappedFields};
use super::{ID_FIELD, UPDATED_AT_FIELD};

/// One known field: its presentation name, its storage name, and how values are coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub external: &'static str,
    pub internal: &'static str,
    pub coercion: Coercion,
}

const fn field(external: &'static str, internal: &'static str, coercion: Coercion) -> FieldSpec {
    FieldSpec {
        external,
        internal,
        coercion,
    }
}

const VENDOR_RATING_FIELDS: &[FieldSpec] = &[
    field("qualityScore", "quality_score", Coercion::Passthrough),
    field("deliveryScore", "delivery_score", Coercion::Passthrough),
    field(
        "technicalCapabilityScore",
        "technical_capability_score",
        Coercion::Passthrough,
    ),
    field(
        "financialStabilityScore",
        "financial_stability_score",
        Coercion::Passthrough,
    ),
    field(
        "onTimeDeliveryPercentage",
        "on_time_delivery_percentage",
        Coercion::Percentage,
    ),
    field(
        "rejectionPercentage",
        "rejection_percentage",
        Coercion::Percentage,
    ),
    field("defectCount", "defect_count", Coercion::Count),
    field(
        "nonconformanceCount",
        "nonconformance_count",
        Coercion::Count,
    ),
    field("remarks", "remarks", Coercion::Passthrough),
    field("isApproved", "approved", Coercion::Passthrough),
];

const COST_COMPETENCY_FIELDS: &[FieldSpec] = &[
    field("rawMaterialCost", "raw_material_cost", Coercion::Passthrough),
    field("processCost", "process_cost", Coercion::Passthrough),
    field("overheadsProfit", "overheads_profit", Coercion::Passthrough),
    field(
        "packingForwardingCost",
        "packing_forwarding_cost",
        Coercion::Passthrough,
    ),
    field("paymentTerms", "payment_terms", Coercion::Passthrough),
    field("netPricePerUnit", "net_price_per_unit", Coercion::Passthrough),
    field("developmentCost", "development_cost", Coercion::Passthrough),
    field(
        "financialRiskPercentage",
        "financial_risk_percentage",
        Coercion::Percentage,
    ),
    field("leadTimeDays", "lead_time_days", Coercion::Passthrough),
];

const WEIGHT_FIELDS: &[FieldSpec] = &[
    field("costWeight", "cost_weight", Coercion::Passthrough),
    field(
        "developmentCostWeight",
        "development_cost_weight",
        Coercion::Passthrough,
    ),
    field("leadTimeWeight", "lead_time_weight", Coercion::Passthrough),
];

const VENDOR_RATING_GROUPS: &[&[FieldSpec]] = &[VENDOR_RATING_FIELDS];
const COST_COMPETENCY_GROUPS: &[&[FieldSpec]] = &[COST_COMPETENCY_FIELDS];
const BASELINE_GROUPS: &[&[FieldSpec]] = &[COST_COMPETENCY_FIELDS, WEIGHT_FIELDS];

/// Families of fields accepted by the nomination endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSet {
    VendorRating,
    CostCompetency,
    Baseline,
}

impl FieldSet {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "vendor_rating" => Some(Self::VendorRating),
            "cost_competency" => Some(Self::CostCompetency),
            "baseline" => Some(Self::Baseline),
            _ => None,
        }
    }

    pub const fn registry(self) -> FieldRegistry {
        match self {
            FieldSet::VendorRating => FieldRegistry {
                groups: VENDOR_RATING_GROUPS,
            },
            FieldSet::CostCompetency => FieldRegistry {
                groups: COST_COMPETENCY_GROUPS,
            },
            FieldSet::Baseline => FieldRegistry {
                groups: BASELINE_GROUPS,
            },
        }
    }
}

/// Bidirectional lookup between presentation and storage field names.
#[derive(Debug, Clone, Copy)]
pub struct FieldRegistry {
    groups: &'static [&'static [FieldSpec]],
}

impl FieldRegistry {
    pub fn specs(&self) -> impl Iterator<Item = &'static FieldSpec> {
        let groups = self.groups;
        groups.iter().flat_map(|group| group.iter())
    }

    /// Resolves a key by presentation name first, then by storage name.
    pub fn resolve(&self, key: &str) -> Option<&'static FieldSpec> {
        self.specs()
            .find(|spec| spec.external == key)
            .or_else(|| self.specs().find(|spec| spec.internal == key))
    }

    pub fn map(&self, update: &FieldUpdate) -> MappedFields {
        self.map_at(update, Utc::now())
    }

    /// Translates an update into storage fields; the first alias to claim a storage key wins.
    pub fn map_at(&self, update: &FieldUpdate, now: DateTime<Utc>) -> MappedFields {
        let mut db_fields = BTreeMap::new();

        for (key, value) in update.iter() {
            let Some(spec) = self.resolve(key) else {
                continue;
            };

            if let Entry::Vacant(slot) = db_fields.entry(spec.internal.to_string()) {
                slot.insert(spec.coercion.apply(value));
            }
        }

        db_fields.insert(UPDATED_AT_FIELD.to_string(), FieldValue::Timestamp(now));

        MappedFields {
            db_fields,
            original_fields: update.clone(),
        }
    }

    /// Lists keys, other than `id`, that match neither naming convention.
    pub fn validate(&self, update: &FieldUpdate) -> FieldValidation {
        let invalid_fields: Vec<String> = update
            .keys()
            .filter(|key| *key != ID_FIELD)
            .filter(|key| self.resolve(key).is_none())
            .map(str::to_string)
            .collect();

        FieldValidation {
            valid: invalid_fields.is_empty(),
            invalid_fields,
        }
    }
}
