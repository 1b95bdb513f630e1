//! Parallel classification of a candidate list.
//!
//! Candidates are independent, so they are mapped over a dedicated rayon pool.
//! Results are collected by index: the report lists outcomes in input order
//! whatever order the workers finish in.

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;
use transient_core::{VettingError, VettingResult};

use crate::classify::{
    Candidate, ClassificationRecord, Classifier, Outcome, Rejection, RejectionReason,
};
use crate::client::CatalogClient;

/// Default worker count: every core but one, at least one.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

fn resolve_threads(threads: usize) -> usize {
    if threads == 0 {
        default_threads()
    } else {
        threads
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected_star: usize,
    pub rejected_qso: usize,
    pub rejected_star_and_qso: usize,
}

impl BatchSummary {
    fn tally(outcomes: &[Outcome]) -> Self {
        let mut summary = BatchSummary {
            total: outcomes.len(),
            ..BatchSummary::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Accepted(_) => summary.accepted += 1,
                Outcome::Rejected(r) => match r.reason {
                    RejectionReason::Star => summary.rejected_star += 1,
                    RejectionReason::Qso => summary.rejected_qso += 1,
                    RejectionReason::StarAndQso => summary.rejected_star_and_qso += 1,
                },
            }
        }
        summary
    }

    pub fn rejected(&self) -> usize {
        self.rejected_star + self.rejected_qso + self.rejected_star_and_qso
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    /// One outcome per input candidate, in input order.
    pub outcomes: Vec<Outcome>,
}

impl BatchReport {
    pub fn accepted(&self) -> impl Iterator<Item = &ClassificationRecord> {
        self.outcomes.iter().filter_map(Outcome::accepted)
    }

    pub fn rejected(&self) -> impl Iterator<Item = &Rejection> {
        self.outcomes.iter().filter_map(Outcome::rejection)
    }
}

pub struct BatchRunner {
    pool: rayon::ThreadPool,
}

impl BatchRunner {
    /// Pool with [`default_threads`] workers.
    pub fn new() -> VettingResult<Self> {
        Self::with_threads(0)
    }

    /// Pool with `threads` workers; `0` picks [`default_threads`].
    ///
    /// # Errors
    /// `ConfigurationError` if the pool cannot be built.
    pub fn with_threads(threads: usize) -> VettingResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(resolve_threads(threads))
            .thread_name(|i| format!("vetting-worker-{}", i))
            .build()
            .map_err(|e| VettingError::configuration("worker pool", &e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Classifies every candidate.
    ///
    /// # Errors
    /// `InvalidPosition` if any candidate has out-of-range coordinates; no
    /// partial report is returned. Candidates read through
    /// [`load_candidates`](crate::candidates::load_candidates) are already
    /// checked, so only hand-built lists can hit this. Catalog failures never
    /// fail the batch.
    pub fn run<C: CatalogClient>(
        &self,
        classifier: &Classifier<C>,
        candidates: &[Candidate],
    ) -> VettingResult<BatchReport> {
        info!(
            candidates = candidates.len(),
            threads = self.threads(),
            "classifying candidates"
        );

        let outcomes: Vec<Outcome> = self.pool.install(|| {
            candidates
                .par_iter()
                .map(|candidate| classifier.classify(candidate))
                .collect::<VettingResult<Vec<_>>>()
        })?;

        let summary = BatchSummary::tally(&outcomes);
        info!(
            total = summary.total,
            accepted = summary.accepted,
            rejected = summary.rejected(),
            "classification finished"
        );
        Ok(BatchReport { summary, outcomes })
    }
}
