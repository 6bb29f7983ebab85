//! Midranks with tie grouping.
//!
//! Shared by Mann-Whitney, the Wilcoxon signed-rank test and the seasonal
//! Mann-Kendall variance. Values closer than [`TIE_TOLERANCE`] are treated
//! as equal.

/// Absolute tolerance under which two values form a tie.
pub const TIE_TOLERANCE: f64 = 1e-12;

/// Ranks of an ascending slice together with its tie blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// 1-based midrank of each position in the sorted input.
    pub ranks: Vec<f64>,
    /// Size of every tied block (blocks of size 1 are omitted).
    pub ties: Vec<usize>,
}

impl Ranking {
    /// Σ (t³ − t) over tie blocks; the variance correction used by the
    /// rank-sum and signed-rank normal approximations.
    pub fn tie_term(&self) -> f64 {
        self.ties
            .iter()
            .map(|&t| {
                let t = t as f64;
                t * t * t - t
            })
            .sum()
    }

    /// True if any two values were tied.
    pub fn has_ties(&self) -> bool {
        !self.ties.is_empty()
    }
}

/// Assigns midranks to `sorted`, which must be in ascending order.
///
/// Every block of equal values gets the average of the ranks it occupies:
/// positions i..j (0-based, exclusive end) receive (i + 1 + j) / 2.
///
/// # Examples
///
/// ```
/// use lakestat::rank::midrank;
///
/// let r = midrank(&[1.0, 2.0, 2.0, 5.0]);
/// assert_eq!(r.ranks, vec![1.0, 2.5, 2.5, 4.0]);
/// assert_eq!(r.ties, vec![2]);
/// ```
pub fn midrank(sorted: &[f64]) -> Ranking {
    let n = sorted.len();
    let mut ranks = vec![0.0; n];
    let mut ties = Vec::new();
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && (sorted[j] - sorted[i]).abs() < TIE_TOLERANCE {
            j += 1;
        }
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for rank in ranks.iter_mut().take(j).skip(i) {
            *rank = avg_rank;
        }
        if j - i > 1 {
            ties.push(j - i);
        }
        i = j;
    }
    Ranking { ranks, ties }
}

/// Ranks `values` in their original order.
///
/// Returns the midrank of each input position, plus the tie blocks.
pub fn rank_unsorted(values: &[f64]) -> Ranking {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();
    let sorted_ranking = midrank(&sorted);

    let mut ranks = vec![0.0; values.len()];
    for (pos, &orig) in order.iter().enumerate() {
        ranks[orig] = sorted_ranking.ranks[pos];
    }
    Ranking {
        ranks,
        ties: sorted_ranking.ties,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_ties() {
        let r = midrank(&[0.5, 1.0, 7.0]);
        assert_eq!(r.ranks, vec![1.0, 2.0, 3.0]);
        assert!(!r.has_ties());
        assert_eq!(r.tie_term(), 0.0);
    }

    #[test]
    fn all_tied() {
        let r = midrank(&[4.0; 5]);
        assert_eq!(r.ranks, vec![3.0; 5]);
        assert_eq!(r.ties, vec![5]);
        assert_eq!(r.tie_term(), 120.0);
    }

    #[test]
    fn near_equal_values_tie() {
        let r = midrank(&[1.0, 1.0 + 1e-14, 2.0]);
        assert_eq!(r.ranks, vec![1.5, 1.5, 3.0]);
    }

    #[test]
    fn unsorted_positions() {
        let r = rank_unsorted(&[30.0, 10.0, 20.0, 10.0]);
        assert_eq!(r.ranks, vec![4.0, 1.5, 3.0, 1.5]);
        assert_eq!(r.ties, vec![2]);
    }

    #[test]
    fn empty() {
        let r = midrank(&[]);
        assert!(r.ranks.is_empty());
        assert!(r.ties.is_empty());
    }

    #[test]
    fn large_input_rank_sum() {
        let n = 5000;
        let data: Vec<f64> = (0..n).map(|i| (i / 3) as f64).collect();
        let r = midrank(&data);
        let sum: f64 = r.ranks.iter().sum();
        let expected = (n * (n + 1) / 2) as f64;
        assert!((sum - expected).abs() < 1e-6);
    }
}
