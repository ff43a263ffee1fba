//! Bounded-concurrency analysis of a whole template source.
//!
//! The calling thread acts as coordinator: it pulls templates from the
//! source, hands them to a [`WorkerPool`], merges finished results into the
//! [`RunResult`] and reports progress. Workers never touch shared state.

pub mod job;
pub mod pool;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::catalog::FieldCodeCatalog;
use crate::error::{AnalysisError, SourceError};
use crate::extractor::TextExtractor;
use crate::progress::{ProgressListener, ProgressTracker};
use crate::result::{RunResult, TemplateAnalysis};
use crate::source::{Template, TemplateSource};

pub use job::{Job, JobResult};
pub use pool::WorkerPool;

pub const DEFAULT_WORKER_COUNT: usize = 8;

/// When new templates are handed to the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Refill a worker slot as soon as it frees up.
    #[default]
    Rolling,
    /// Dispatch fixed batches of `worker_count` templates; the next batch
    /// starts only after the whole previous batch has been reported.
    Lockstep,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Rolling => write!(f, "rolling"),
            DispatchMode::Lockstep => write!(f, "lockstep"),
        }
    }
}

/// Cooperative cancellation flag shared between a run and its controller.
///
/// Checked before each dispatch (rolling) or before each batch (lockstep).
/// Templates already handed to a worker always finish.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub worker_count: usize,
    pub dispatch: DispatchMode,
    pub cancellation: Option<CancellationToken>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            dispatch: DispatchMode::default(),
            cancellation: None,
        }
    }
}

impl RunOptions {
    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Self::default()
        }
    }

    pub fn dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map(CancellationToken::is_cancelled)
            .unwrap_or(false)
    }
}

/// Worker count actually used: the requested count, clamped to what the
/// extractor can serve and to the amount of work available.
fn effective_worker_count(
    requested: usize,
    extractor_limit: Option<usize>,
    total: usize,
) -> usize {
    let mut count = requested;
    if let Some(limit) = extractor_limit {
        if limit < count {
            warn!(
                "Extractor allows at most {} concurrent calls; reducing workers from {}",
                limit, count
            );
            count = limit;
        }
    }
    count.min(total).max(1)
}

/// Analyses every template in `source` and returns the per-template counts in
/// source order.
///
/// Progress is reported in source order: template `i` is announced only once
/// every template before it has finished. The first extraction failure
/// aborts the run: nothing further is dispatched, in-flight templates finish
/// but are discarded, and no further progress is reported. A failure on
/// template `k` therefore never shows progress past `k - 1`, whatever the
/// worker count.
pub fn run_analysis(
    source: &mut dyn TemplateSource,
    catalog: &FieldCodeCatalog,
    extractor: &dyn TextExtractor,
    options: &RunOptions,
    listener: &dyn ProgressListener,
) -> Result<RunResult, AnalysisError> {
    if options.worker_count == 0 {
        return Err(AnalysisError::InvalidWorkerCount);
    }

    let description = source.describe();
    let total = source.total_count()?;
    let worker_count =
        effective_worker_count(options.worker_count, extractor.max_concurrency(), total);

    info!(
        "Analysing {} templates from {} with {} workers ({} dispatch, {} field codes)",
        total,
        description,
        worker_count,
        options.dispatch,
        catalog.len()
    );

    let mut progress = ProgressTracker::new(total, listener);
    progress.start();

    let mut templates = source.templates()?;

    let analyses = thread::scope(|scope| -> Result<Vec<TemplateAnalysis>, AnalysisError> {
        let pool = WorkerPool::spawn(scope, worker_count, catalog, extractor)?;
        let mut coordinator = Coordinator::new(total, worker_count, options, &mut progress);
        coordinator.drive(&pool, &mut templates);
        pool.wait();
        coordinator.finish()
    })?;

    let mut result = RunResult::new();
    for analysis in analyses {
        result.insert(analysis)?;
    }

    info!("Analysed {} templates", result.len());
    Ok(result)
}

/// Dispatch/collect state of one run.
struct Coordinator<'a, 'l> {
    total: usize,
    worker_count: usize,
    options: &'a RunOptions,
    progress: &'a mut ProgressTracker<'l>,
    delivered: usize,
    in_flight: usize,
    exhausted: bool,
    cancelled: bool,
    failure: Option<AnalysisError>,
    /// Finished templates waiting for an earlier one, keyed by source index.
    pending: BTreeMap<usize, TemplateAnalysis>,
    /// Reported templates; `analyses.len()` is the next index to announce.
    analyses: Vec<TemplateAnalysis>,
}

impl<'a, 'l> Coordinator<'a, 'l> {
    fn new(
        total: usize,
        worker_count: usize,
        options: &'a RunOptions,
        progress: &'a mut ProgressTracker<'l>,
    ) -> Self {
        Self {
            total,
            worker_count,
            options,
            progress,
            delivered: 0,
            in_flight: 0,
            exhausted: false,
            cancelled: false,
            failure: None,
            pending: BTreeMap::new(),
            analyses: Vec::with_capacity(total),
        }
    }

    fn halted(&self) -> bool {
        self.exhausted || self.cancelled || self.failure.is_some()
    }

    fn may_dispatch(&self) -> bool {
        match self.options.dispatch {
            DispatchMode::Rolling => self.in_flight < self.worker_count,
            DispatchMode::Lockstep => self.in_flight == 0,
        }
    }

    fn drive(
        &mut self,
        pool: &WorkerPool<'_>,
        templates: &mut dyn Iterator<Item = Result<Template, SourceError>>,
    ) {
        loop {
            if !self.halted() && self.may_dispatch() {
                self.fill(pool, templates);
            }

            if self.in_flight == 0 {
                break;
            }

            match pool.recv_result() {
                Some(result) => {
                    self.in_flight -= 1;
                    self.collect(result);
                }
                None => {
                    self.fail(AnalysisError::WorkerFailed(
                        "result channel closed".to_string(),
                    ));
                    break;
                }
            }
        }
    }

    /// Hands out templates until every worker is busy or the source stops.
    fn fill(
        &mut self,
        pool: &WorkerPool<'_>,
        templates: &mut dyn Iterator<Item = Result<Template, SourceError>>,
    ) {
        if self.options.dispatch == DispatchMode::Lockstep && self.check_cancelled() {
            return;
        }

        while self.in_flight < self.worker_count && !self.halted() {
            if self.options.dispatch == DispatchMode::Rolling && self.check_cancelled() {
                return;
            }

            match templates.next() {
                None => self.exhausted = true,
                Some(Err(e)) => self.fail(e.into()),
                Some(Ok(template)) => {
                    self.delivered += 1;
                    if self.delivered > self.total {
                        self.fail(AnalysisError::SourceCountMismatch {
                            declared: self.total,
                            delivered: self.delivered,
                        });
                        return;
                    }

                    let job = Job::new(self.delivered - 1, template);
                    match pool.submit(job) {
                        Ok(()) => self.in_flight += 1,
                        Err(e) => self.fail(e),
                    }
                }
            }
        }
    }

    fn check_cancelled(&mut self) -> bool {
        if !self.cancelled && self.options.is_cancelled() {
            info!(
                "Cancellation requested; waiting for {} in-flight templates",
                self.in_flight
            );
            self.cancelled = true;
        }
        self.cancelled
    }

    fn collect(&mut self, result: JobResult) {
        let index = result.index;
        match result.into_analysis() {
            Ok(analysis) => {
                if self.failure.is_some() {
                    debug!("Discarding result for '{}' after failure", analysis.name);
                    return;
                }
                self.pending.insert(index, analysis);
                self.report_ready();
            }
            Err((template, source)) => {
                self.fail(AnalysisError::ExtractionFailure { template, source });
            }
        }
    }

    /// Announces every finished template that no longer waits on an earlier
    /// one.
    fn report_ready(&mut self) {
        while let Some(analysis) = self.pending.remove(&self.analyses.len()) {
            self.analyses.push(analysis);
            self.progress.template_completed();
        }
    }

    fn fail(&mut self, error: AnalysisError) {
        if self.failure.is_none() {
            warn!("Aborting analysis: {}", error);
            self.failure = Some(error);
        } else {
            debug!("Ignoring further failure: {}", error);
        }
    }

    fn finish(mut self) -> Result<Vec<TemplateAnalysis>, AnalysisError> {
        if let Some(error) = self.failure.take() {
            return Err(error);
        }

        if self.cancelled {
            return Err(AnalysisError::Cancelled {
                completed: self.progress.completed(),
                total: self.total,
            });
        }

        if self.delivered != self.total {
            return Err(AnalysisError::SourceCountMismatch {
                declared: self.total,
                delivered: self.delivered,
            });
        }

        Ok(self.analyses)
    }
}
