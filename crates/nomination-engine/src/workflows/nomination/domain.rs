use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fields::{FieldDefect, FieldReader, FieldUpdate, MappedFields};
use crate::config::RankingConfig;

/// Identifier wrapper for sourcing nominations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NominationId(pub String);

impl fmt::Display for NominationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for invited vendors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VendorId(pub String);

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VendorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NominationStatus {
    Open,
    Completed,
}

impl NominationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            NominationStatus::Open => "open",
            NominationStatus::Completed => "completed",
        }
    }
}

/// Dimensions vendors are ranked on; lower raw values rank better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankDimension {
    Cost,
    DevelopmentCost,
    LeadTime,
}

impl RankDimension {
    pub const fn ordered() -> [Self; 3] {
        [Self::Cost, Self::DevelopmentCost, Self::LeadTime]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cost => "Net price",
            Self::DevelopmentCost => "Development cost",
            Self::LeadTime => "Lead time",
        }
    }

    pub fn value_of(self, components: &CostComponents) -> Option<f64> {
        let value = match self {
            Self::Cost => components.net_price_per_unit,
            Self::DevelopmentCost => components.development_cost,
            Self::LeadTime => components.lead_time_days,
        };
        value.filter(|value| value.is_finite())
    }
}

/// Percent weights blending the three ranked dimensions into the overall rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub cost_weight: f64,
    pub development_cost_weight: f64,
    pub lead_time_weight: f64,
}

impl FactorWeights {
    pub fn weight_for(&self, dimension: RankDimension) -> f64 {
        match dimension {
            RankDimension::Cost => self.cost_weight,
            RankDimension::DevelopmentCost => self.development_cost_weight,
            RankDimension::LeadTime => self.lead_time_weight,
        }
    }

    pub fn total(&self) -> f64 {
        self.cost_weight + self.development_cost_weight + self.lead_time_weight
    }

    /// Advisory findings; weights are stored as given and never rescaled.
    pub fn warnings(&self) -> Vec<WeightWarning> {
        let total = self.total();
        if total <= 0.0 {
            vec![WeightWarning::AllZero]
        } else if (total - 100.0).abs() > 1e-6 {
            vec![WeightWarning::SumNotHundred { total }]
        } else {
            Vec::new()
        }
    }
}

impl From<&RankingConfig> for FactorWeights {
    fn from(config: &RankingConfig) -> Self {
        Self {
            cost_weight: config.cost_weight,
            development_cost_weight: config.development_cost_weight,
            lead_time_weight: config.lead_time_weight,
        }
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self::from(&RankingConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum WeightWarning {
    SumNotHundred { total: f64 },
    AllZero,
}

impl WeightWarning {
    pub fn summary(&self) -> String {
        match self {
            WeightWarning::SumNotHundred { total } => {
                format!("factor weights sum to {total:.2} instead of 100")
            }
            WeightWarning::AllZero => "all factor weights are zero; no overall rank".to_string(),
        }
    }
}

/// Cost breakdown shared by the buyer's baseline and each vendor's submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostComponents {
    pub raw_material_cost: Option<f64>,
    pub process_cost: Option<f64>,
    pub overheads_profit: Option<f64>,
    pub packing_forwarding_cost: Option<f64>,
    pub payment_terms: Option<String>,
    pub net_price_per_unit: Option<f64>,
    pub development_cost: Option<f64>,
    pub financial_risk_percentage: Option<f64>,
    pub lead_time_days: Option<f64>,
}

impl CostComponents {
    fn read(&mut self, reader: &mut FieldReader<'_>) {
        reader.non_negative("raw_material_cost", &mut self.raw_material_cost);
        reader.non_negative("process_cost", &mut self.process_cost);
        reader.non_negative("overheads_profit", &mut self.overheads_profit);
        reader.non_negative("packing_forwarding_cost", &mut self.packing_forwarding_cost);
        reader.text("payment_terms", &mut self.payment_terms);
        reader.non_negative("net_price_per_unit", &mut self.net_price_per_unit);
        reader.non_negative("development_cost", &mut self.development_cost);
        reader.bounded(
            "financial_risk_percentage",
            0.0,
            100.0,
            &mut self.financial_risk_percentage,
        );
        reader.non_negative("lead_time_days", &mut self.lead_time_days);
    }

    /// Sum of the itemised cost lines, when at least one is present.
    pub fn itemised_total(&self) -> Option<f64> {
        let lines = [
            self.raw_material_cost,
            self.process_cost,
            self.overheads_profit,
            self.packing_forwarding_cost,
        ];
        if lines.iter().all(Option::is_none) {
            return None;
        }
        Some(lines.iter().flatten().sum())
    }
}

/// The buyer's reference values and factor weights for a nomination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostComponentBaseline {
    #[serde(flatten)]
    pub targets: CostComponents,
    pub weights: FactorWeights,
}

impl CostComponentBaseline {
    pub fn with_weights(weights: FactorWeights) -> Self {
        Self {
            targets: CostComponents::default(),
            weights,
        }
    }

    /// Returns the patched baseline, leaving `self` untouched when any field is rejected.
    pub fn patched(&self, mapped: &MappedFields) -> Result<Self, Vec<FieldDefect>> {
        let mut next = self.clone();
        let mut reader = FieldReader::new(mapped);
        next.targets.read(&mut reader);

        let mut cost = None;
        let mut development = None;
        let mut lead_time = None;
        reader.bounded("cost_weight", 0.0, 100.0, &mut cost);
        reader.bounded("development_cost_weight", 0.0, 100.0, &mut development);
        reader.bounded("lead_time_weight", 0.0, 100.0, &mut lead_time);
        reader.finish()?;

        if let Some(weight) = cost {
            next.weights.cost_weight = weight;
        }
        if let Some(weight) = development {
            next.weights.development_cost_weight = weight;
        }
        if let Some(weight) = lead_time {
            next.weights.lead_time_weight = weight;
        }
        Ok(next)
    }
}

/// Derived ranking cached on each submission; recomputed for the whole nomination on change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub cost_competency_score: Option<f64>,
    pub rank_cost: Option<u32>,
    pub rank_development_cost: Option<u32>,
    pub rank_lead_time: Option<u32>,
    pub total_score: Option<f64>,
    pub overall_rank: Option<u32>,
}

impl RankedResult {
    pub fn rank_for(&self, dimension: RankDimension) -> Option<u32> {
        match dimension {
            RankDimension::Cost => self.rank_cost,
            RankDimension::DevelopmentCost => self.rank_development_cost,
            RankDimension::LeadTime => self.rank_lead_time,
        }
    }
}

/// One vendor's quote for a nomination, keyed by (nomination, vendor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorCostSubmission {
    pub vendor_id: VendorId,
    #[serde(flatten)]
    pub components: CostComponents,
    #[serde(flatten)]
    pub ranking: RankedResult,
    pub updated_at: Option<DateTime<Utc>>,
}

impl VendorCostSubmission {
    pub fn new(vendor_id: VendorId) -> Self {
        Self {
            vendor_id,
            components: CostComponents::default(),
            ranking: RankedResult::default(),
            updated_at: None,
        }
    }

    /// Returns the patched submission, leaving `self` untouched when any field is rejected.
    pub fn patched(&self, mapped: &MappedFields) -> Result<Self, Vec<FieldDefect>> {
        let mut next = self.clone();
        let mut reader = FieldReader::new(mapped);
        next.components.read(&mut reader);
        reader.finish()?;
        next.updated_at = mapped.updated_at().or(next.updated_at);
        Ok(next)
    }
}

/// Supplier-evaluation data captured alongside a vendor's cost submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorRating {
    pub quality_score: Option<f64>,
    pub delivery_score: Option<f64>,
    pub technical_capability_score: Option<f64>,
    pub financial_stability_score: Option<f64>,
    pub on_time_delivery_percentage: Option<f64>,
    pub rejection_percentage: Option<f64>,
    pub defect_count: Option<i64>,
    pub nonconformance_count: Option<i64>,
    pub remarks: Option<String>,
    pub approved: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl VendorRating {
    pub fn patched(&self, mapped: &MappedFields) -> Result<Self, Vec<FieldDefect>> {
        let mut next = self.clone();
        let mut reader = FieldReader::new(mapped);
        reader.bounded("quality_score", 0.0, 100.0, &mut next.quality_score);
        reader.bounded("delivery_score", 0.0, 100.0, &mut next.delivery_score);
        reader.bounded(
            "technical_capability_score",
            0.0,
            100.0,
            &mut next.technical_capability_score,
        );
        reader.bounded(
            "financial_stability_score",
            0.0,
            100.0,
            &mut next.financial_stability_score,
        );
        reader.bounded(
            "on_time_delivery_percentage",
            0.0,
            100.0,
            &mut next.on_time_delivery_percentage,
        );
        reader.bounded(
            "rejection_percentage",
            0.0,
            100.0,
            &mut next.rejection_percentage,
        );
        reader.count("defect_count", &mut next.defect_count);
        reader.count("nonconformance_count", &mut next.nonconformance_count);
        reader.text("remarks", &mut next.remarks);
        reader.flag("approved", &mut next.approved);
        reader.finish()?;
        next.updated_at = mapped.updated_at().or(next.updated_at);
        Ok(next)
    }
}

/// Aggregate persisted per nomination: baseline, submissions in invitation order, ratings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NominationRecord {
    pub id: NominationId,
    pub project_reference: String,
    pub bom_item: Option<String>,
    pub status: NominationStatus,
    pub baseline: CostComponentBaseline,
    pub submissions: Vec<VendorCostSubmission>,
    pub ratings: BTreeMap<VendorId, VendorRating>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: u64,
}

impl NominationRecord {
    pub fn submission(&self, vendor_id: &VendorId) -> Option<&VendorCostSubmission> {
        self.submissions
            .iter()
            .find(|submission| &submission.vendor_id == vendor_id)
    }

    pub(crate) fn submission_index(&self, vendor_id: &VendorId) -> Option<usize> {
        self.submissions
            .iter()
            .position(|submission| &submission.vendor_id == vendor_id)
    }

    pub fn vendor_ids(&self) -> impl Iterator<Item = &VendorId> {
        self.submissions.iter().map(|submission| &submission.vendor_id)
    }

    pub fn is_open(&self) -> bool {
        self.status == NominationStatus::Open
    }
}

/// Request body for opening a nomination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewNomination {
    pub project_reference: String,
    #[serde(default)]
    pub bom_item: Option<String>,
    #[serde(default)]
    pub vendors: Vec<VendorId>,
    #[serde(default)]
    pub baseline: Option<FieldUpdate>,
}

/// One vendor's slice of a bulk cost update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorCostEntry {
    #[serde(alias = "vendor_id")]
    pub vendor_id: VendorId,
    #[serde(default, alias = "nomination_id")]
    pub nomination_id: Option<NominationId>,
    pub fields: FieldUpdate,
}

/// Batch of vendor updates and an optional baseline patch, applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCostUpdate {
    #[serde(default, alias = "vendor_cost_data")]
    pub vendor_cost_data: Vec<VendorCostEntry>,
    #[serde(default, alias = "base_data")]
    pub base_data: Option<FieldUpdate>,
}
