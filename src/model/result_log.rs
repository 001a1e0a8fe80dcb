use crate::model::BatchResult;
use std::collections::BTreeSet;

/// Every [`BatchResult`] of a run, kept in record order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultLog {
    results: Vec<BatchResult>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a log from results restored off disk
    ///
    /// Duplicates of a record index keep the last occurrence.
    pub fn from_results(results: Vec<BatchResult>) -> Self {
        let mut log = Self::new();
        for result in results {
            log.push(result);
        }
        log
    }

    /// Appends a result, replacing an earlier result for the same record
    pub fn push(&mut self, result: BatchResult) {
        match self
            .results
            .binary_search_by_key(&result.record_index, |r| r.record_index)
        {
            Ok(pos) => self.results[pos] = result,
            Err(pos) => self.results.insert(pos, result),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchResult> {
        self.results.iter()
    }

    pub fn as_slice(&self) -> &[BatchResult] {
        &self.results
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn fail_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    /// Results belonging to one batch
    pub fn for_batch(&self, batch_number: usize) -> Vec<&BatchResult> {
        self.results
            .iter()
            .filter(|r| r.batch_number == batch_number)
            .collect()
    }

    /// Batch numbers present in the log, ascending
    pub fn batch_numbers(&self) -> Vec<usize> {
        self.results
            .iter()
            .map(|r| r.batch_number)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &BatchResult> {
        self.results.iter().filter(|r| !r.success)
    }
}
