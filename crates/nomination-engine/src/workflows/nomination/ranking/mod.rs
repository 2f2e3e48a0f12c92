mod rank;
mod score;

pub use rank::{competition_rank, RankOrder};

use super::domain::{FactorWeights, RankDimension, RankedResult, VendorCostSubmission};
use score::{competency_score, relative_standing, round_to_cents, weighted_composite};

/// Stateless ranker that applies a nomination's factor weights to its submissions.
///
/// Ranking is a property of the whole vendor set: every call ranks all submissions together.
#[derive(Debug, Clone, Copy)]
pub struct RankingEngine {
    weights: FactorWeights,
}

impl RankingEngine {
    pub fn new(weights: FactorWeights) -> Self {
        Self { weights }
    }

    /// Computes one result per submission, in input order.
    pub fn score(&self, submissions: &[VendorCostSubmission]) -> Vec<RankedResult> {
        if submissions.is_empty() {
            return Vec::new();
        }

        let dimensions = RankDimension::ordered();
        let columns: Vec<DimensionColumn> = dimensions
            .iter()
            .map(|dimension| DimensionColumn::build(*dimension, submissions))
            .collect();

        let mut composites = Vec::with_capacity(submissions.len());
        let mut results: Vec<RankedResult> = (0..submissions.len())
            .map(|row| {
                let ranks: Vec<(RankDimension, Option<u32>)> = columns
                    .iter()
                    .map(|column| (column.dimension, column.ranks[row]))
                    .collect();
                let standings: Vec<(RankDimension, Option<f64>)> = columns
                    .iter()
                    .map(|column| (column.dimension, column.standing(row)))
                    .collect();
                let composite = weighted_composite(&ranks, &self.weights);
                composites.push(composite);

                let mut result = RankedResult {
                    cost_competency_score: competency_score(&standings, &self.weights),
                    total_score: composite.map(round_to_cents),
                    ..RankedResult::default()
                };
                for (dimension, rank) in ranks {
                    match dimension {
                        RankDimension::Cost => result.rank_cost = rank,
                        RankDimension::DevelopmentCost => result.rank_development_cost = rank,
                        RankDimension::LeadTime => result.rank_lead_time = rank,
                    }
                }
                result
            })
            .collect();

        // Overall rank uses the unrounded composite so near-equal blends are not merged.
        for (result, overall) in results
            .iter_mut()
            .zip(competition_rank(&composites, RankOrder::Ascending))
        {
            result.overall_rank = overall;
        }

        results
    }

    /// Writes fresh results onto every submission.
    pub fn recompute(&self, submissions: &mut [VendorCostSubmission]) {
        let results = self.score(submissions);
        for (submission, result) in submissions.iter_mut().zip(results) {
            submission.ranking = result;
        }
    }
}

struct DimensionColumn {
    dimension: RankDimension,
    values: Vec<Option<f64>>,
    ranks: Vec<Option<u32>>,
    best: Option<f64>,
}

impl DimensionColumn {
    fn build(dimension: RankDimension, submissions: &[VendorCostSubmission]) -> Self {
        let values: Vec<Option<f64>> = submissions
            .iter()
            .map(|submission| dimension.value_of(&submission.components))
            .collect();
        let ranks = competition_rank(&values, RankOrder::Ascending);
        let best = values
            .iter()
            .flatten()
            .copied()
            .fold(None, |best: Option<f64>, value| {
                Some(best.map_or(value, |best| best.min(value)))
            });

        Self {
            dimension,
            values,
            ranks,
            best,
        }
    }

    fn standing(&self, row: usize) -> Option<f64> {
        let value = self.values[row]?;
        let best = self.best?;
        Some(relative_standing(value, best))
    }
}
