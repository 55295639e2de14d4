//! Batch partitioning helpers for the parallel driver.

use std::num::NonZeroUsize;
use std::ops::Range;

/// Resolve a requested thread count against the batch size.
///
/// `0` means "use the host's detected parallelism"; the result is clamped
/// to `len` so no thread is handed an empty range.
pub fn resolve_threads(requested: usize, len: usize) -> usize {
    let threads = if requested == 0 {
        std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    } else {
        requested
    };
    threads.min(len).max(1)
}

/// Split `[0, len)` into `num_threads` contiguous near-equal ranges.
///
/// Every chunk holds `len / num_threads` indices except the last, which
/// absorbs the remainder. Requires `0 < num_threads <= len`.
pub fn split_ranges(len: usize, num_threads: usize) -> Vec<Range<usize>> {
    debug_assert!(num_threads > 0 && num_threads <= len);

    let chunk = len / num_threads;
    (0..num_threads)
        .map(|ix| {
            let start = ix * chunk;
            let end = if ix == num_threads - 1 {
                len
            } else {
                start + chunk
            };
            start..end
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ranges_with_remainder() {
        let ranges = split_ranges(10, 3);
        assert_eq!(ranges, vec![0..3, 3..6, 6..10]);
    }

    #[test]
    fn test_split_ranges_covers_every_index_once() {
        for threads in 1..=7 {
            let ranges = split_ranges(7, threads);
            assert_eq!(ranges.len(), threads);

            let mut seen = vec![0u32; 7];
            for range in &ranges {
                for ix in range.clone() {
                    seen[ix] += 1;
                }
            }
            assert!(seen.iter().all(|&count| count == 1), "threads={threads}");
        }
    }

    #[test]
    fn test_split_ranges_exact_division() {
        let ranges = split_ranges(8, 4);
        assert_eq!(ranges, vec![0..2, 2..4, 4..6, 6..8]);
    }

    #[test]
    fn test_resolve_threads() {
        assert_eq!(resolve_threads(1, 100), 1);
        assert_eq!(resolve_threads(4, 100), 4);
        // Clamped so no thread is given zero work.
        assert_eq!(resolve_threads(16, 3), 3);
        // Auto-detection never resolves to zero.
        assert!(resolve_threads(0, 100) >= 1);
        assert!(resolve_threads(0, 2) <= 2);
    }
}
