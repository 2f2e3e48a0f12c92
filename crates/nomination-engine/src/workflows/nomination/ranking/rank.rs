use std::cmp::Ordering;

/// Values closer than this are treated as ties.
pub(crate) const TIE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Lower values rank first.
    Ascending,
    /// Higher values rank first.
    Descending,
}

/// Standard competition ranking ("1224"): tied values share the best position and the next
/// distinct value skips the positions the tie consumed.
///
/// Missing and non-finite values receive no rank. Ties keep their input order, so identical
/// input always produces identical output.
pub fn competition_rank(values: &[Option<f64>], order: RankOrder) -> Vec<Option<u32>> {
    let mut ranked: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            value
                .filter(|value| value.is_finite())
                .map(|value| (index, value))
        })
        .collect();

    ranked.sort_by(|(_, left), (_, right)| {
        let ordering = left.partial_cmp(right).unwrap_or(Ordering::Equal);
        match order {
            RankOrder::Ascending => ordering,
            RankOrder::Descending => ordering.reverse(),
        }
    });

    let mut ranks = vec![None; values.len()];
    let mut current = 0u32;
    // Ties are measured against the first value of the group, not the previous one.
    let mut anchor: Option<f64> = None;

    for (position, (index, value)) in ranked.into_iter().enumerate() {
        let tied = anchor
            .map(|anchor| (anchor - value).abs() <= TIE_TOLERANCE)
            .unwrap_or(false);
        if !tied {
            current = position as u32 + 1;
            anchor = Some(value);
        }
        ranks[index] = Some(current);
    }

    ranks
}
