use crate::{Result, WaymarkError};
use std::ops::Range;

/// One contiguous window of records processed and checkpointed together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchWindow {
    /// 1-based batch number, derived from the global record index
    pub number: usize,
    /// First global index (inclusive)
    pub start: usize,
    /// Last global index (exclusive)
    pub end: usize,
}

impl BatchWindow {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Partition of `total` records into fixed-size batches
///
/// Batch numbers always come from the global index, so a resumed run lines
/// up with the batches of a run started from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    total: usize,
    batch_size: usize,
}

impl BatchPlan {
    /// Creates a plan; a zero batch size is rejected
    pub fn new(total: usize, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(WaymarkError::InvalidBatchSize(batch_size));
        }
        Ok(Self { total, batch_size })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_count(&self) -> usize {
        self.total.div_ceil(self.batch_size)
    }

    /// Batch number of the record at `global_index`
    pub fn batch_number(&self, global_index: usize) -> usize {
        global_index / self.batch_size + 1
    }

    /// Window of a batch, clamped to the record count
    pub fn window(&self, number: usize) -> BatchWindow {
        let start = (number.saturating_sub(1) * self.batch_size).min(self.total);
        let end = (start + self.batch_size).min(self.total);
        BatchWindow { number, start, end }
    }

    /// Windows covering `[resume_offset, total)`
    ///
    /// An offset inside a batch yields a short first window that ends at that
    /// batch's boundary.
    pub fn windows_from(&self, resume_offset: usize) -> Vec<BatchWindow> {
        let mut windows = Vec::new();
        let mut start = resume_offset;
        while start < self.total {
            let number = self.batch_number(start);
            let end = (number * self.batch_size).min(self.total);
            windows.push(BatchWindow { number, start, end });
            start = end;
        }
        windows
    }

    pub fn windows(&self) -> Vec<BatchWindow> {
        self.windows_from(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twelve_records_in_fives() {
        let plan = BatchPlan::new(12, 5).unwrap();
        let windows = plan.windows();

        assert_eq!(plan.batch_count(), 3);
        assert_eq!(
            windows,
            vec![
                BatchWindow { number: 1, start: 0, end: 5 },
                BatchWindow { number: 2, start: 5, end: 10 },
                BatchWindow { number: 3, start: 10, end: 12 },
            ]
        );
        assert_eq!(windows[2].len(), 2);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(matches!(
            BatchPlan::new(10, 0),
            Err(WaymarkError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn test_empty_plan() {
        let plan = BatchPlan::new(0, 5).unwrap();
        assert_eq!(plan.batch_count(), 0);
        assert!(plan.windows().is_empty());
    }

    #[test]
    fn test_resume_on_boundary_matches_fresh_numbers() {
        let plan = BatchPlan::new(12, 5).unwrap();
        let fresh = plan.windows();
        let resumed = plan.windows_from(5);

        assert_eq!(resumed, fresh[1..].to_vec());
    }

    #[test]
    fn test_resume_inside_batch_finishes_that_batch_first() {
        let plan = BatchPlan::new(12, 5).unwrap();
        let resumed = plan.windows_from(7);

        assert_eq!(resumed[0], BatchWindow { number: 2, start: 7, end: 10 });
        assert_eq!(resumed[1], BatchWindow { number: 3, start: 10, end: 12 });
    }

    #[test]
    fn test_resume_past_end() {
        let plan = BatchPlan::new(12, 5).unwrap();
        assert!(plan.windows_from(12).is_empty());
        assert!(plan.windows_from(40).is_empty());
    }

    #[test]
    fn test_window_by_number() {
        let plan = BatchPlan::new(12, 5).unwrap();
        assert_eq!(plan.window(3).range(), 10..12);
        assert_eq!(plan.batch_number(9), 2);
        assert_eq!(plan.batch_number(10), 3);
    }
}
