//! Binary searches over ordered sequences, used to resolve a coordinate into
//! a bin index along one grid axis.

/// Returns the index of the first element of `sorted` that is not less than
/// `value`, or `sorted.len()` if there is none.
///
/// `sorted` must be ordered ascending.
#[must_use]
pub fn lower_bound<T: PartialOrd>(sorted: &[T], value: &T) -> usize {
    let mut first = 0;
    let mut len = sorted.len();

    while len > 0 {
        let half = len >> 1;
        let middle = first + half;
        if sorted[middle] < *value {
            first = middle + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }
    first
}

/// Returns the index of the first element of `sorted` that is greater than
/// `value`, or `sorted.len()` if there is none.
///
/// `sorted` must be ordered ascending.
#[must_use]
pub fn upper_bound<T: PartialOrd>(sorted: &[T], value: &T) -> usize {
    let mut first = 0;
    let mut len = sorted.len();

    while len > 0 {
        let half = len >> 1;
        let middle = first + half;
        if *value < sorted[middle] {
            len = half;
        } else {
            first = middle + 1;
            len -= half + 1;
        }
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    fn lower_bound_scan(edges: &[f64], value: f64) -> usize {
        edges.iter().position(|&e| e >= value).unwrap_or(edges.len())
    }

    fn upper_bound_scan(edges: &[f64], value: f64) -> usize {
        edges.iter().position(|&e| e > value).unwrap_or(edges.len())
    }

    fn random_edges(rng: &mut Pcg64, n: usize) -> Vec<f64> {
        let mut edges = Vec::with_capacity(n);
        let mut x = rng.random_range(-50.0..50.0);
        for _ in 0..n {
            edges.push(x);
            x += rng.random_range(0.01..3.0);
        }
        edges
    }

    #[test]
    fn empty_sequence() {
        let edges: [f64; 0] = [];
        assert_eq!(lower_bound(&edges, &1.0), 0);
        assert_eq!(upper_bound(&edges, &1.0), 0);
    }

    #[test]
    fn exact_edges_and_outside_values() {
        let edges = [-2.0, 0.0, 1.5, 4.0];
        assert_eq!(lower_bound(&edges, &-3.0), 0);
        assert_eq!(upper_bound(&edges, &-3.0), 0);
        assert_eq!(lower_bound(&edges, &0.0), 1);
        assert_eq!(upper_bound(&edges, &0.0), 2);
        assert_eq!(lower_bound(&edges, &4.0), 3);
        assert_eq!(upper_bound(&edges, &4.0), 4);
        assert_eq!(lower_bound(&edges, &10.0), 4);
        assert_eq!(upper_bound(&edges, &10.0), 4);
    }

    #[test]
    fn matches_linear_scan_on_random_sequences() {
        let mut rng = Pcg64::seed_from_u64(0x5eed);
        for n in [1, 2, 3, 7, 16, 33, 100] {
            let edges = random_edges(&mut rng, n);
            let lo = edges[0] - 1.0;
            let hi = edges[n - 1] + 1.0;

            // Dense queries, every edge, and every edge twice (duplicates).
            let mut queries: Vec<f64> = (0..=2000)
                .map(|i| lo + (hi - lo) * f64::from(i) / 2000.0)
                .collect();
            queries.extend(edges.iter().copied());
            queries.extend(edges.iter().copied());

            for value in queries {
                assert_eq!(
                    lower_bound(&edges, &value),
                    lower_bound_scan(&edges, value),
                    "lower_bound n={n} value={value}"
                );
                assert_eq!(
                    upper_bound(&edges, &value),
                    upper_bound_scan(&edges, value),
                    "upper_bound n={n} value={value}"
                );
            }
        }
    }

    #[test]
    fn works_for_integer_sequences_with_repeats() {
        let values = [1, 3, 3, 3, 8, 9];
        assert_eq!(lower_bound(&values, &3), 1);
        assert_eq!(upper_bound(&values, &3), 4);
        assert_eq!(lower_bound(&values, &9), 5);
        assert_eq!(upper_bound(&values, &9), 6);
    }
}
