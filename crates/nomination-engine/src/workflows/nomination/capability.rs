use serde::{Deserialize, Serialize};

use super::domain::{NominationId, NominationRecord, VendorId, VendorRating};
use super::ranking::{competition_rank, RankOrder};

/// Supplier-evaluation criteria scored 0–100; higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityCriterion {
    Quality,
    Delivery,
    TechnicalCapability,
    FinancialStability,
    OnTimeDelivery,
}

impl CapabilityCriterion {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Quality,
            Self::Delivery,
            Self::TechnicalCapability,
            Self::FinancialStability,
            Self::OnTimeDelivery,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Quality => "Quality",
            Self::Delivery => "Delivery",
            Self::TechnicalCapability => "Technical capability",
            Self::FinancialStability => "Financial stability",
            Self::OnTimeDelivery => "On-time delivery",
        }
    }

    pub fn score_of(self, rating: &VendorRating) -> Option<f64> {
        let score = match self {
            Self::Quality => rating.quality_score,
            Self::Delivery => rating.delivery_score,
            Self::TechnicalCapability => rating.technical_capability_score,
            Self::FinancialStability => rating.financial_stability_score,
            Self::OnTimeDelivery => rating.on_time_delivery_percentage,
        };
        score.filter(|score| score.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityCell {
    pub vendor_id: VendorId,
    pub score: Option<f64>,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityRow {
    pub criterion: CapabilityCriterion,
    pub criterion_label: &'static str,
    pub cells: Vec<CapabilityCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorCapabilitySummary {
    pub vendor_id: VendorId,
    pub aggregate_score: Option<f64>,
    pub overall_rank: Option<u32>,
    pub approved: Option<bool>,
    pub defect_count: Option<i64>,
    pub nonconformance_count: Option<i64>,
}

/// Per-criterion vendor-score matrix with per-vendor aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityMatrix {
    pub nomination_id: NominationId,
    pub criteria: Vec<CapabilityRow>,
    pub vendors: Vec<VendorCapabilitySummary>,
}

impl CapabilityMatrix {
    pub fn build(record: &NominationRecord) -> Self {
        let empty = VendorRating::default();
        let ratings: Vec<(&VendorId, &VendorRating)> = record
            .vendor_ids()
            .map(|vendor_id| (vendor_id, record.ratings.get(vendor_id).unwrap_or(&empty)))
            .collect();

        let criteria = CapabilityCriterion::ordered()
            .into_iter()
            .map(|criterion| {
                let scores: Vec<Option<f64>> = ratings
                    .iter()
                    .map(|(_, rating)| criterion.score_of(rating))
                    .collect();
                let ranks = competition_rank(&scores, RankOrder::Descending);
                let cells = ratings
                    .iter()
                    .zip(scores.iter().zip(ranks))
                    .map(|((vendor_id, _), (score, rank))| CapabilityCell {
                        vendor_id: (*vendor_id).clone(),
                        score: *score,
                        rank,
                    })
                    .collect();

                CapabilityRow {
                    criterion,
                    criterion_label: criterion.label(),
                    cells,
                }
            })
            .collect();

        let aggregates: Vec<Option<f64>> = ratings
            .iter()
            .map(|(_, rating)| aggregate_score(rating))
            .collect();
        let overall = competition_rank(&aggregates, RankOrder::Descending);

        let vendors = ratings
            .iter()
            .zip(aggregates.iter().zip(overall))
            .map(
                |((vendor_id, rating), (aggregate, overall_rank))| VendorCapabilitySummary {
                    vendor_id: (*vendor_id).clone(),
                    aggregate_score: *aggregate,
                    overall_rank,
                    approved: rating.approved,
                    defect_count: rating.defect_count,
                    nonconformance_count: rating.nonconformance_count,
                },
            )
            .collect();

        Self {
            nomination_id: record.id.clone(),
            criteria,
            vendors,
        }
    }
}

fn aggregate_score(rating: &VendorRating) -> Option<f64> {
    let scores: Vec<f64> = CapabilityCriterion::ordered()
        .into_iter()
        .filter_map(|criterion| criterion.score_of(rating))
        .collect();
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}
