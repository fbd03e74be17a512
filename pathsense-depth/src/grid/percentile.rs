use num::Float;

/// Percentile-10 of `values`, reordering the slice in place.
///
/// Returns the element that would sit at index `floor(0.1 * n)` of a sorted
/// copy, or `None` for an empty slice.
pub fn percentile10<T: Float>(values: &mut [T]) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    let k = ((values.len() as f64 * 0.1) as usize).min(values.len() - 1);
    Some(kth_smallest(values, k))
}

/// Quickselect with a median-of-three pivot, average O(n).
///
/// Iterative so the depth of the search never depends on the input.
/// `k` must be a valid index into `values`.
pub fn kth_smallest<T: PartialOrd + Copy>(values: &mut [T], k: usize) -> T {
    let mut lo = 0;
    let mut hi = values.len() - 1;

    loop {
        if lo == hi {
            return values[lo];
        }

        // Median of three ends up at `hi` and becomes the pivot.
        let mid = lo + (hi - lo) / 2;
        if values[mid] < values[lo] {
            values.swap(lo, mid);
        }
        if values[hi] < values[lo] {
            values.swap(lo, hi);
        }
        if values[mid] < values[hi] {
            values.swap(mid, hi);
        }
        let pivot = values[hi];

        let mut i = lo;
        for j in lo..hi {
            if values[j] <= pivot {
                values.swap(i, j);
                i += 1;
            }
        }
        values.swap(i, hi);

        if k == i {
            return values[i];
        } else if k < i {
            hi = i - 1;
        } else {
            lo = i + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_reference(values: &[f32]) -> f32 {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        sorted[(values.len() as f64 * 0.1) as usize]
    }

    #[test]
    fn single_element() {
        assert_eq!(percentile10(&mut [3.5f32]), Some(3.5));
    }

    #[test]
    fn empty_slice() {
        assert_eq!(percentile10::<f32>(&mut []), None);
    }

    #[test]
    fn matches_sorted_index_for_every_length() {
        // Deterministic scramble with duplicates.
        for n in 1..=200usize {
            let values: Vec<f32> = (0..n)
                .map(|i| ((i * 37 + 11) % 23) as f32 * 0.25 + (i % 3) as f32)
                .collect();
            let expected = sorted_reference(&values);
            let mut scratch = values.clone();
            assert_eq!(percentile10(&mut scratch), Some(expected), "n = {n}");
        }
    }

    #[test]
    fn kth_smallest_handles_sorted_and_reversed_input() {
        let mut ascending: Vec<f32> = (0..50).map(|i| i as f32).collect();
        assert_eq!(kth_smallest(&mut ascending, 7), 7.0);
        let mut descending: Vec<f32> = (0..50).rev().map(|i| i as f32).collect();
        assert_eq!(kth_smallest(&mut descending, 49), 49.0);
        let mut constant = vec![2.0f32; 33];
        assert_eq!(kth_smallest(&mut constant, 16), 2.0);
    }
}
