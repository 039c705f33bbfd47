// THEORY:
// The `parallel_pipeline` runs many classification requests at once. A
// dispatcher task round-robins incoming tasks over a fixed set of worker tasks;
// each worker validates its request and then runs the two independent stages
// of the engine (color aggregation and the group stage) as two blocking tasks
// side by side, over the same shared, immutable grid. The result travels back
// on a oneshot channel.
//
// The engine has no time bound of its own. The pool imposes one per request,
// scaled by the pixel count. A request that overruns it reports `TimedOut`;
// its blocking work is left to finish and is discarded. Whatever happens, a
// caller receives either a complete result or an error, never a partial one.

use crate::config::EngineConfig;
use crate::core_modules::color_aggregator;
use crate::core_modules::grid_classifier::{self, ClassificationResult};
use crate::core_modules::palette::PaletteIndex;
use crate::core_modules::pixel_grid::PixelGrid;
use crate::error::{ClassifyError, Result};
use crate::pipeline::ClassifyRequest;
use futures::future::join_all;
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};

/// Everything one request needs, shareable across tasks.
#[derive(Debug, Clone)]
pub struct ClassifyJob {
    pub request: ClassifyRequest,
    pub grid: Arc<PixelGrid>,
    pub palette: Arc<PaletteIndex>,
}

impl ClassifyJob {
    pub fn new(
        request: ClassifyRequest,
        grid: impl Into<Arc<PixelGrid>>,
        palette: impl Into<Arc<PaletteIndex>>,
    ) -> Self {
        Self {
            request,
            grid: grid.into(),
            palette: palette.into(),
        }
    }
}

pub struct ClassifyTask {
    pub job: ClassifyJob,
    pub job_id: u64,
    pub result_sender: oneshot::Sender<Result<ClassificationResult>>,
}

pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<ClassifyTask>,
    dispatcher: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns the dispatcher and `config.worker_count` workers on the current
    /// tokio runtime.
    pub fn new(config: EngineConfig) -> Self {
        let worker_count = config.worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<ClassifyTask>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<ClassifyTask>())
            .unzip();

        let dispatcher = tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                if let Err(mpsc::error::SendError(task)) = worker_senders[worker_idx].send(task) {
                    let _ = task.result_sender.send(Err(ClassifyError::WorkerUnavailable));
                }
                worker_idx = (worker_idx + 1) % worker_count;
            }
        });

        let workers = worker_receivers
            .into_iter()
            .enumerate()
            .map(|(worker_id, mut worker_receiver)| {
                let worker_config = config.clone();
                tokio::spawn(async move {
                    while let Some(task) = worker_receiver.recv().await {
                        debug!("worker {} picked up job {}", worker_id, task.job_id);
                        let outcome = Self::run_job(&worker_config, task.job).await;
                        let _ = task.result_sender.send(outcome);
                    }
                })
            })
            .collect();

        info!("worker pool started with {} workers", worker_count);

        Self {
            task_sender,
            dispatcher,
            workers,
        }
    }

    async fn run_job(config: &EngineConfig, job: ClassifyJob) -> Result<ClassificationResult> {
        let ClassifyJob {
            request,
            grid,
            palette,
        } = job;

        request.validate(config)?;
        request.check_grid(&grid)?;

        let pixels = grid.pixel_count();
        let limit = config.time_limit(pixels);
        let mode = request.numbering_mode;

        let stages = async {
            let color_stage = tokio::task::spawn_blocking({
                let grid = Arc::clone(&grid);
                let palette = Arc::clone(&palette);
                move || color_aggregator::aggregate(&grid, &palette)
            });
            let group_stage = tokio::task::spawn_blocking({
                let grid = Arc::clone(&grid);
                move || grid_classifier::group_stage(&grid, mode)
            });

            let (colors, groups) = tokio::join!(color_stage, group_stage);
            let color_stats = stage_outcome("color", colors)?;
            let (group_numbers, group_stats) = stage_outcome("group", groups)?;

            Ok::<_, ClassifyError>(ClassificationResult::assemble(
                Arc::clone(&grid),
                Arc::clone(&palette),
                mode,
                group_numbers,
                color_stats,
                group_stats,
            ))
        };

        let result = tokio::time::timeout(limit, stages)
            .await
            .map_err(|_| ClassifyError::TimedOut {
                pixels,
                limit_ms: limit.as_millis(),
            })??;

        request.note_color_count(result.color_stats().len());
        Ok(result.with_processing_params(request.width_bound, request.color_count_hint))
    }

    pub async fn submit(&self, job: ClassifyJob, job_id: u64) -> Result<ClassificationResult> {
        let (result_sender, result_receiver) = oneshot::channel();

        self.task_sender
            .send(ClassifyTask {
                job,
                job_id,
                result_sender,
            })
            .map_err(|_| ClassifyError::WorkerUnavailable)?;

        result_receiver
            .await
            .map_err(|_| ClassifyError::WorkerUnavailable)?
    }

    /// Closes the queue and waits for every worker to drain.
    pub async fn shutdown(self) {
        drop(self.task_sender);
        let _ = self.dispatcher.await;
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Unwraps a blocking stage. A panic inside the stage becomes `StagePanicked`.
fn stage_outcome<T>(
    stage: &'static str,
    joined: std::result::Result<Result<T>, JoinError>,
) -> Result<T> {
    joined.map_err(|_| ClassifyError::StagePanicked { stage })?
}

/// Async front end over a [`WorkerPool`].
pub struct ParallelPipeline {
    config: EngineConfig,
    worker_pool: WorkerPool,
    job_counter: AtomicU64,
}

impl ParallelPipeline {
    pub fn new(config: EngineConfig) -> Self {
        let worker_pool = WorkerPool::new(config.clone());
        Self {
            config,
            worker_pool,
            job_counter: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn process(&self, job: ClassifyJob) -> Result<ClassificationResult> {
        let job_id = self.job_counter.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();
        let (width, height) = (job.grid.width(), job.grid.height());

        let outcome = self.worker_pool.submit(job, job_id).await;
        match &outcome {
            Ok(result) => info!(
                "job {}: {}x{} grid, {} groups in {:?}",
                job_id,
                width,
                height,
                result.group_count(),
                started.elapsed()
            ),
            Err(err) => error!("job {}: {}", job_id, err),
        }
        outcome
    }

    /// Runs every job concurrently. Results come back in submission order.
    pub async fn process_batch(&self, jobs: Vec<ClassifyJob>) -> Vec<Result<ClassificationResult>> {
        join_all(jobs.into_iter().map(|job| self.process(job))).await
    }

    pub async fn shutdown(self) {
        self.worker_pool.shutdown().await;
    }
}
