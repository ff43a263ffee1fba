use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, Scope, ScopedJoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error, info};
use tracing::info_span;

use crate::catalog::FieldCodeCatalog;
use crate::error::{AnalysisError, ExtractionError};
use crate::extractor::TextExtractor;
use crate::matcher::{analyse_text, FieldCodeCount};
use crate::scheduler::job::{Job, JobResult};

/// Fixed set of worker threads living inside a [`thread::scope`].
///
/// Each worker handles one template at a time, so the number of workers is
/// the hard limit on concurrent extractions.
pub struct WorkerPool<'scope> {
    job_sender: Sender<Job>,
    result_receiver: Receiver<JobResult>,
    workers: Vec<ScopedJoinHandle<'scope, ()>>,
}

impl<'scope> WorkerPool<'scope> {
    pub fn spawn<'env>(
        scope: &'scope Scope<'scope, 'env>,
        worker_count: usize,
        catalog: &'scope FieldCodeCatalog,
        extractor: &'scope dyn TextExtractor,
    ) -> Result<Self, AnalysisError> {
        if worker_count == 0 {
            return Err(AnalysisError::InvalidWorkerCount);
        }

        let (job_sender, job_receiver) = bounded::<Job>(worker_count);
        let (result_sender, result_receiver) = bounded::<JobResult>(worker_count);

        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let job_rx = job_receiver.clone();
            let result_tx = result_sender.clone();

            let handle = thread::Builder::new()
                .name(format!("template-worker-{}", worker_id))
                .spawn_scoped(scope, move || {
                    run_worker(worker_id, job_rx, result_tx, catalog, extractor);
                })
                .map_err(|e| AnalysisError::WorkerFailed(format!("failed to spawn worker: {}", e)))?;

            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Ok(Self {
            job_sender,
            result_receiver,
            workers,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn submit(&self, job: Job) -> Result<(), AnalysisError> {
        self.job_sender
            .send(job)
            .map_err(|_| AnalysisError::WorkerFailed("job channel closed".to_string()))
    }

    /// Blocks until a worker reports. `None` once every worker is gone.
    pub fn recv_result(&self) -> Option<JobResult> {
        self.result_receiver.recv().ok()
    }

    /// Closes the job channel and joins every worker.
    pub fn wait(self) {
        drop(self.job_sender);

        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        debug!("All workers have stopped");
    }
}

fn run_worker(
    worker_id: usize,
    job_receiver: Receiver<Job>,
    result_sender: Sender<JobResult>,
    catalog: &FieldCodeCatalog,
    extractor: &dyn TextExtractor,
) {
    debug!("Worker {} started", worker_id);

    for job in job_receiver.iter() {
        debug!(
            "Worker {} processing template #{}: {}",
            worker_id, job.index, job.template.name
        );

        let result = analyse_job(&job, catalog, extractor);

        if let Err(e) = result_sender.send(result) {
            error!("Worker {} failed to send result: {}", worker_id, e);
            break;
        }
    }

    debug!("Worker {} stopped", worker_id);
}

/// Extracts and matches one template. A panicking extractor is reported as
/// a failure of that template instead of taking the worker down.
fn analyse_job(job: &Job, catalog: &FieldCodeCatalog, extractor: &dyn TextExtractor) -> JobResult {
    let _span = info_span!("template", index = job.index, name = %job.template.name).entered();

    let outcome = panic::catch_unwind(AssertUnwindSafe(
        || -> Result<Vec<FieldCodeCount>, ExtractionError> {
            let text = {
                let _step = info_span!("extract_text").entered();
                extractor.extract_text(&job.template.content)?
            };
            let _step = info_span!("match_field_codes").entered();
            Ok(analyse_text(&text, catalog))
        },
    ));

    match outcome {
        Ok(Ok(counts)) => JobResult::success(job, counts),
        Ok(Err(e)) => JobResult::failure(job, e),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            JobResult::failure(
                job,
                ExtractionError::TextExtraction(format!("extractor panicked: {}", message)),
            )
        }
    }
}
