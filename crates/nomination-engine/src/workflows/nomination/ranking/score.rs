use super::super::domain::{FactorWeights, RankDimension};

const FULL_STANDING: f64 = 100.0;

/// Weighted rank sum on the percentage scale: `Σ(rank·w) · 100 / Σ(w)` over present
/// dimensions only. With complete data and weights summing to 100 this is exactly
/// `Σ(rank·w)`. Missing dimensions are excluded rather than zero-filled.
pub(crate) fn weighted_composite(
    ranks: &[(RankDimension, Option<u32>)],
    weights: &FactorWeights,
) -> Option<f64> {
    let (weighted, total_weight) = ranks
        .iter()
        .filter_map(|(dimension, rank)| rank.map(|rank| (rank, weights.weight_for(*dimension))))
        .fold((0.0, 0.0), |(weighted, total), (rank, weight)| {
            (weighted + rank as f64 * weight, total + weight)
        });

    if total_weight > 0.0 {
        Some(weighted * FULL_STANDING / total_weight)
    } else {
        None
    }
}

/// Standing of a value against the best (lowest) value in the nomination, from 0 to 100.
pub(crate) fn relative_standing(value: f64, best: f64) -> f64 {
    if value <= 0.0 {
        return FULL_STANDING;
    }
    (best / value * FULL_STANDING).clamp(0.0, FULL_STANDING)
}

/// Blends per-dimension standings with the factor weights into the cost competency score.
pub(crate) fn competency_score(
    standings: &[(RankDimension, Option<f64>)],
    weights: &FactorWeights,
) -> Option<f64> {
    let (weighted, total_weight) = standings
        .iter()
        .filter_map(|(dimension, standing)| {
            standing.map(|standing| (standing, weights.weight_for(*dimension)))
        })
        .fold((0.0, 0.0), |(weighted, total), (standing, weight)| {
            (weighted + standing * weight, total + weight)
        });

    if total_weight > 0.0 {
        Some(round_to_cents(weighted / total_weight))
    } else {
        None
    }
}

pub(crate) fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
