//! Batch planning: split the requested page window into bounded batches.
//!
//! The download endpoint caps how many pages it serves per request, so a
//! window of `total` pages becomes `ceil(total / limit)` contiguous batches.
//! Batch positions are *local*: 1-based offsets into the requested window,
//! which is exactly what goes on the wire (the endpoint counts pages into
//! the window, it does not take absolute document page ids).
//!
//! [`BatchPlan`] is a plain iterator derived purely from `(range, limit)`.
//! Cloning it restarts the sequence; nothing about it depends on what has
//! already been fetched.

use crate::error::KrameriusError;
use serde::Serialize;

/// An inclusive, closed interval of document page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    /// First page, 1-based.
    pub start: u32,
    /// Last page, inclusive. Always `>= start`.
    pub end: u32,
}

impl PageRange {
    /// Create a range, validating `1 <= start <= end`.
    pub fn new(start: u32, end: u32) -> Result<Self, KrameriusError> {
        if start < 1 || end < start {
            return Err(KrameriusError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of pages in the range.
    pub fn total_pages(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// One contiguous sub-window of at most `limit` pages.
///
/// `first_page`/`last_page` are local positions within the requested
/// window, starting at 1, as sent to the download endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    /// 0-based position of this batch in the plan.
    pub index: usize,
    /// First local page of the batch, 1-based.
    pub first_page: u32,
    /// Last local page of the batch, inclusive.
    pub last_page: u32,
}

impl Batch {
    /// Number of pages in this batch.
    pub fn page_count(&self) -> u32 {
        self.last_page - self.first_page + 1
    }
}

/// Iterator over the batches covering a page window.
///
/// A pure function of its inputs: iterating, cloning, or re-creating a plan
/// with the same `(range, limit)` always yields the identical sequence.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    total: u32,
    limit: u32,
    next_index: usize,
}

impl BatchPlan {
    /// Plan batches for `range` with at most `limit` pages per batch.
    ///
    /// The limit must be positive; the config builder guarantees that for
    /// library callers, but the check is repeated here since the plan is
    /// usable standalone.
    pub fn new(range: PageRange, limit: u32) -> Result<Self, KrameriusError> {
        if limit == 0 {
            return Err(KrameriusError::InvalidConfig(
                "Batch limit must be >= 1".into(),
            ));
        }
        // PageRange::new enforces end >= start, so total >= 1 here.
        Ok(Self {
            total: range.total_pages(),
            limit,
            next_index: 0,
        })
    }

    /// Total number of batches this plan yields.
    pub fn batch_count(&self) -> usize {
        (self.total as usize).div_ceil(self.limit as usize)
    }

    /// Total pages in the planned window.
    pub fn total_pages(&self) -> u32 {
        self.total
    }
}

impl Iterator for BatchPlan {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.next_index >= self.batch_count() {
            return None;
        }
        let x = self.next_index as u32;
        let first_page = 1 + x * self.limit;
        let last_page = ((x + 1) * self.limit).min(self.total);
        let batch = Batch {
            index: self.next_index,
            first_page,
            last_page,
        };
        self.next_index += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.batch_count() - self.next_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchPlan {}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(start: u32, end: u32, limit: u32) -> Vec<Batch> {
        BatchPlan::new(PageRange::new(start, end).unwrap(), limit)
            .unwrap()
            .collect()
    }

    #[test]
    fn range_rejects_reversed_bounds() {
        assert!(matches!(
            PageRange::new(47, 12),
            Err(KrameriusError::InvalidRange { start: 47, end: 12 })
        ));
    }

    #[test]
    fn range_rejects_page_zero() {
        assert!(PageRange::new(0, 5).is_err());
    }

    #[test]
    fn single_page_range() {
        let batches = plan(7, 7, 20);
        assert_eq!(
            batches,
            vec![Batch {
                index: 0,
                first_page: 1,
                last_page: 1
            }]
        );
    }

    #[test]
    fn forty_five_pages_limit_twenty() {
        // 45 pages with limit 20 split as [1-20], [21-40], [41-45].
        let batches = plan(1, 45, 20);
        let windows: Vec<(u32, u32)> = batches.iter().map(|b| (b.first_page, b.last_page)).collect();
        assert_eq!(windows, vec![(1, 20), (21, 40), (41, 45)]);
    }

    #[test]
    fn local_numbering_ignores_absolute_start() {
        // The wire positions count pages into the window, so a window
        // starting at page 12 still plans from local page 1.
        let batches = plan(12, 47, 20);
        let windows: Vec<(u32, u32)> = batches.iter().map(|b| (b.first_page, b.last_page)).collect();
        assert_eq!(windows, vec![(1, 20), (21, 36)]);
    }

    #[test]
    fn batches_cover_the_window_exactly() {
        // Union of batch windows is [1, total] with no gaps or overlaps,
        // and count matches ceil(total / limit), across a grid of inputs.
        for total in 1u32..=60 {
            for limit in 1u32..=25 {
                let batches = plan(1, total, limit);
                let expected_count = (total as usize).div_ceil(limit as usize);
                assert_eq!(batches.len(), expected_count, "total={total} limit={limit}");

                assert_eq!(batches[0].first_page, 1);
                assert_eq!(batches.last().unwrap().last_page, total);
                for pair in batches.windows(2) {
                    assert_eq!(
                        pair[0].last_page + 1,
                        pair[1].first_page,
                        "gap/overlap at total={total} limit={limit}"
                    );
                }

                // Every batch except the last is exactly `limit` pages; the
                // last is whatever remains, between 1 and limit.
                for b in &batches[..batches.len() - 1] {
                    assert_eq!(b.page_count(), limit);
                }
                let last = batches.last().unwrap().page_count();
                assert!(last >= 1 && last <= limit);
            }
        }
    }

    #[test]
    fn planning_is_idempotent() {
        let range = PageRange::new(3, 91).unwrap();
        let a: Vec<Batch> = BatchPlan::new(range, 7).unwrap().collect();
        let b: Vec<Batch> = BatchPlan::new(range, 7).unwrap().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn cloning_restarts_the_sequence() {
        let mut plan = BatchPlan::new(PageRange::new(1, 45).unwrap(), 20).unwrap();
        plan.next();
        plan.next();
        let restarted = BatchPlan::new(PageRange::new(1, 45).unwrap(), 20).unwrap();
        assert_eq!(restarted.collect::<Vec<_>>().len(), 3);
        // The partially consumed iterator keeps its own position.
        assert_eq!(plan.next().map(|b| b.first_page), Some(41));
    }

    #[test]
    fn exact_size_iterator_len() {
        let plan = BatchPlan::new(PageRange::new(1, 100).unwrap(), 20).unwrap();
        assert_eq!(plan.len(), 5);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let range = PageRange::new(1, 10).unwrap();
        assert!(matches!(
            BatchPlan::new(range, 0),
            Err(KrameriusError::InvalidConfig(_))
        ));
    }
}
