//! Combination helpers used to expand fixture matrices.
//!
//! All results are deterministic: index order within a result, and
//! lexicographic order by index across results.

use odata_payload::{Error, Result};

/// Lazy iterator over the ordered `k`-subsets of `0..n`, as index vectors.
#[derive(Clone, Debug)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    /// # Errors
    /// [`Error::InvalidArgument`] when `k > n`.
    pub fn new(n: usize, k: usize) -> Result<Self> {
        if k > n {
            return Err(Error::invalid_argument(
                "k",
                format!("combination length {k} exceeds the {n} available items"),
            ));
        }
        Ok(Self::within(n, k))
    }

    fn within(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: false,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        let k = self.indices.len();
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] < self.n - k + i {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }
        Some(current)
    }
}

fn pick<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}

/// Every ordered `k`-subset of `items`.
///
/// `k == 0` yields exactly one empty combination.
///
/// # Errors
/// [`Error::InvalidArgument`] when `k` exceeds `items.len()`.
pub fn combinations<T: Clone>(items: &[T], k: usize) -> Result<Vec<Vec<T>>> {
    Ok(Combinations::new(items.len(), k)?
        .map(|indices| pick(items, &indices))
        .collect())
}

fn arrange(
    n: usize,
    k: usize,
    prefix: &mut Vec<usize>,
    used: &mut [bool],
    out: &mut Vec<Vec<usize>>,
) {
    if prefix.len() == k {
        out.push(prefix.clone());
        return;
    }
    for i in 0..n {
        if used[i] {
            continue;
        }
        used[i] = true;
        prefix.push(i);
        arrange(n, k, prefix, used, out);
        prefix.pop();
        used[i] = false;
    }
}

/// Every arrangement of `k` distinct items drawn from `items`.
///
/// # Errors
/// [`Error::InvalidArgument`] when `k` exceeds `items.len()`.
pub fn variations<T: Clone>(items: &[T], k: usize) -> Result<Vec<Vec<T>>> {
    if k > items.len() {
        return Err(Error::invalid_argument(
            "k",
            format!(
                "variation length {k} exceeds the {} available items",
                items.len()
            ),
        ));
    }
    let mut out = Vec::new();
    let mut used = vec![false; items.len()];
    arrange(items.len(), k, &mut Vec::with_capacity(k), &mut used, &mut out);
    Ok(out.iter().map(|indices| pick(items, indices)).collect())
}

/// Every ordering of `items`.
#[must_use]
pub fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    let mut out = Vec::new();
    let mut used = vec![false; items.len()];
    arrange(items.len(), items.len(), &mut Vec::new(), &mut used, &mut out);
    out.iter().map(|indices| pick(items, indices)).collect()
}

/// Combinations of every length from 0 to `items.len()`, shortest first.
#[must_use]
pub fn subsets<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    (0..=items.len())
        .flat_map(|k| Combinations::within(items.len(), k))
        .map(|indices| pick(items, &indices))
        .collect()
}

/// Combinations over the concatenated values of every column.
///
/// Lengths run from 0 to the total number of values, shortest first, and
/// enumeration stops after `max_count` results.
#[must_use]
pub fn column_combinations<T: Clone>(columns: &[Vec<T>], max_count: usize) -> Vec<Vec<T>> {
    let values: Vec<T> = columns.iter().flatten().cloned().collect();
    (0..=values.len())
        .flat_map(|k| Combinations::within(values.len(), k))
        .take(max_count)
        .map(|indices| pick(&values, &indices))
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_combinations_in_index_order() {
        let result = combinations(&['a', 'b', 'c'], 2).unwrap();
        assert_eq!(result, vec![vec!['a', 'b'], vec!['a', 'c'], vec!['b', 'c']]);
    }

    #[test]
    fn test_zero_length_yields_one_empty_combination() {
        let result = combinations(&[1, 2, 3], 0).unwrap();
        assert_eq!(result, vec![Vec::<i32>::new()]);

        let empty: [u8; 0] = [];
        assert_eq!(combinations(&empty, 0).unwrap(), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_length_beyond_items_is_rejected() {
        let err = combinations(&[1, 2], 3).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "k", .. }));
        assert!(Combinations::new(0, 1).is_err());
    }

    #[test]
    fn test_full_length_is_single_combination() {
        assert_eq!(combinations(&[1, 2, 3], 3).unwrap(), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_iterator_is_lazy() {
        let mut iter = Combinations::new(30, 15).unwrap();
        assert_eq!(iter.next(), Some((0..15).collect()));
        assert_eq!(iter.next().map(|c| c[14]), Some(15));
    }

    #[test]
    fn test_variations_and_permutations() {
        let result = variations(&[1, 2, 3], 2).unwrap();
        assert_eq!(
            result,
            vec![
                vec![1, 2],
                vec![1, 3],
                vec![2, 1],
                vec![2, 3],
                vec![3, 1],
                vec![3, 2],
            ]
        );
        assert!(variations(&[1], 2).is_err());
        assert_eq!(permutations(&[1, 2, 3]).len(), 6);
        assert_eq!(permutations::<u8>(&[]), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_subsets_shortest_first() {
        let result = subsets(&[1, 2]);
        assert_eq!(result, vec![vec![], vec![1], vec![2], vec![1, 2]]);
    }

    #[test]
    fn test_column_combinations_stop_at_cap() {
        let columns = vec![vec![1, 2], vec![3]];
        let all = column_combinations(&columns, usize::MAX);
        assert_eq!(all.len(), 8);
        assert_eq!(all[0], Vec::<i32>::new());
        assert_eq!(all[7], vec![1, 2, 3]);

        let capped = column_combinations(&columns, 3);
        assert_eq!(capped, vec![vec![], vec![1], vec![2]]);
        assert!(column_combinations(&columns, 0).is_empty());
    }
}
