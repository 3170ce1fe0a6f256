//! Sequential batch runner.
//!
//! The orchestrator owns the task list and is its only writer. Readers take
//! snapshots, either directly or through a `watch` subscription that is
//! refreshed after every mutation. Tasks run one at a time in list order;
//! the engine work for each task runs on the blocking pool.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use super::cancel::{BatchHandle, StopReason};
use super::config::OrchestratorConfig;
use super::error::{BatchError, TaskError};
use super::events::{ErrorEvent, ErrorReporter, NoopReporter};
use super::loader::ImageLoader;
use super::params::{BatchImage, OperationParams};
use super::task::{ImageId, ProcessTask, ProcessType, TaskId, TaskStatus};
use crate::decode::decode_image;
use crate::encode::{encode, EncodedImage, OutputSettings, SurfaceBytes};
use crate::raster::Raster;
use crate::transform::{crop, resize_proportional};

/// Progress after decoding the source.
const PROGRESS_DECODED: u8 = 25;
/// Progress after the geometry stage.
const PROGRESS_TRANSFORMED: u8 = 50;
/// Progress after the final encode.
const PROGRESS_ENCODED: u8 = 75;

/// What subscribers see.
#[derive(Debug, Clone, Default)]
pub struct BatchState {
    pub tasks: Vec<ProcessTask>,
    pub is_processing: bool,
}

/// Outcome counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Set when a pause or cancel ended the run early.
    pub stop_reason: Option<StopReason>,
}

/// Why a task left the happy path.
enum Interrupt {
    Failed(TaskError),
    Cancelled,
    Batch(BatchError),
}

impl From<TaskError> for Interrupt {
    fn from(error: TaskError) -> Self {
        Interrupt::Failed(error)
    }
}

pub struct Orchestrator {
    loader: Arc<dyn ImageLoader>,
    reporter: Arc<dyn ErrorReporter>,
    config: OrchestratorConfig,
    handle: BatchHandle,
    tasks: Vec<ProcessTask>,
    /// Operation of the most recent `build_batch`.
    active_type: Option<ProcessType>,
    is_processing: bool,
    state: watch::Sender<BatchState>,
}

impl Orchestrator {
    pub fn new(loader: Arc<dyn ImageLoader>, config: OrchestratorConfig) -> Self {
        let (state, _) = watch::channel(BatchState::default());
        Self {
            loader,
            reporter: Arc::new(NoopReporter),
            config,
            handle: BatchHandle::new(),
            tasks: Vec::new(),
            active_type: None,
            is_processing: false,
            state,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Handle for pausing or cancelling from another task.
    ///
    /// A request made while no run is active is held until the next run,
    /// which stops before its first task. Every run consumes the pending
    /// request when it ends. Use [`Orchestrator::cancel`] to drop the list
    /// right away while idle.
    pub fn handle(&self) -> BatchHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BatchState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Vec<ProcessTask> {
        self.tasks.clone()
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    /// Rebuild the task list with one task per image for `params` and
    /// return those tasks.
    ///
    /// Completed tasks for the same image and operation are kept as they are.
    /// Any other existing task for the pair is rebuilt as pending with fresh
    /// parameters under its old id. Completed tasks of the other operation
    /// stay in the list behind the new ones, so switching operations back and
    /// forth does not redo finished work. Everything else is dropped,
    /// including every task for an image not in `images`.
    pub fn build_batch(
        &mut self,
        images: &[BatchImage],
        params: &OperationParams,
        output: &OutputSettings,
    ) -> Vec<ProcessTask> {
        let process_type = params.process_type();
        let wanted: HashSet<&ImageId> = images.iter().map(|image| &image.id).collect();
        let mut existing: HashMap<ImageId, ProcessTask> = HashMap::new();
        let mut other_completed = Vec::new();
        for task in self.tasks.drain(..) {
            if task.process_type == process_type {
                existing.insert(task.image_id.clone(), task);
            } else if task.status == TaskStatus::Completed && wanted.contains(&task.image_id) {
                other_completed.push(task);
            }
        }

        let mut seen = HashSet::new();
        let mut reused = 0;
        let mut tasks = Vec::with_capacity(images.len());
        for image in images {
            if !seen.insert(&image.id) {
                continue;
            }
            let task = match existing.remove(&image.id) {
                Some(task) if task.status == TaskStatus::Completed => {
                    reused += 1;
                    task
                }
                Some(task) => ProcessTask {
                    id: task.id,
                    ..params.task_for(image, output)
                },
                None => params.task_for(image, output),
            };
            tasks.push(task);
        }

        info!(
            process_type = %process_type,
            tasks = tasks.len(),
            reused,
            kept_other = other_completed.len(),
            "built batch"
        );
        let batch = tasks.clone();
        tasks.extend(other_completed);
        self.tasks = tasks;
        self.active_type = Some(process_type);
        self.publish();
        batch
    }

    /// Process every pending or failed task in list order.
    ///
    /// Task failures are recorded and reported without stopping the run. A
    /// failure of the run loop itself is reported once and returned; tasks
    /// completed before it keep their results.
    pub async fn run(&mut self) -> Result<RunSummary, BatchError> {
        self.run_selected(|task: &ProcessTask| {
            matches!(task.status, TaskStatus::Pending | TaskStatus::Failed)
        })
        .await
    }

    /// Re-run only the tasks that are currently failed.
    pub async fn retry_failed(&mut self) -> Result<RunSummary, BatchError> {
        self.run_selected(|task: &ProcessTask| task.status == TaskStatus::Failed)
            .await
    }

    /// Results of every completed task of the current operation, in list
    /// order.
    pub fn completed_results(&self) -> Vec<(ImageId, Arc<EncodedImage>)> {
        self.tasks
            .iter()
            .filter(|task| Some(task.process_type) == self.active_type)
            .filter(|task| task.status == TaskStatus::Completed)
            .filter_map(|task| {
                task.result
                    .as_ref()
                    .map(|result| (task.image_id.clone(), Arc::clone(result)))
            })
            .collect()
    }

    /// Drop every task that references `image_id`. Returns how many went.
    pub fn invalidate_image(&mut self, image_id: &ImageId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| &task.image_id != image_id);
        let removed = before - self.tasks.len();
        if removed > 0 {
            debug!(image_id = %image_id, removed, "invalidated tasks");
            self.publish();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.publish();
    }

    /// Cancel while no run is active.
    ///
    /// Pending tasks are published as cancelled, then the list is cleared
    /// and any stop request held by the handle is dropped. Returns how many
    /// tasks were cancelled.
    pub fn cancel(&mut self) -> usize {
        let mut cancelled = 0;
        for task in &mut self.tasks {
            if task.status == TaskStatus::Pending && task.transition(TaskStatus::Cancelled).is_ok() {
                cancelled += 1;
            }
        }
        info!(cancelled, "batch cancelled while idle");
        self.publish();
        self.tasks.clear();
        self.handle.reset();
        self.publish();
        cancelled
    }

    #[instrument(skip_all, fields(total = self.tasks.len()))]
    async fn run_selected(
        &mut self,
        select: fn(&ProcessTask) -> bool,
    ) -> Result<RunSummary, BatchError> {
        let queue: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|task| select(task))
            .map(|task| task.id)
            .collect();

        info!(queued = queue.len(), "starting batch run");
        self.is_processing = true;
        self.publish();

        let mut summary = RunSummary::default();
        let result = AssertUnwindSafe(self.drain_queue(&queue, &mut summary))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(BatchError::Worker(panic_message(panic.as_ref()))));
        self.is_processing = false;
        self.handle.reset();

        if let Err(error) = result {
            error!(%error, "batch run aborted");
            self.fail_in_flight(&error);
            self.reporter.report(ErrorEvent::batch_failed(&error));
            self.publish();
            return Err(error);
        }

        if summary.stop_reason == Some(StopReason::Cancelled) {
            // Final statuses first, then the cleared list
            self.publish();
            self.tasks.clear();
        }
        self.publish();

        if summary.failed > 0 {
            warn!(
                completed = summary.completed,
                failed = summary.failed,
                cancelled = summary.cancelled,
                "batch run finished with failures"
            );
        } else {
            info!(
                completed = summary.completed,
                cancelled = summary.cancelled,
                stop_reason = ?summary.stop_reason,
                "batch run finished"
            );
        }
        Ok(summary)
    }

    async fn drain_queue(
        &mut self,
        queue: &[TaskId],
        summary: &mut RunSummary,
    ) -> Result<(), BatchError> {
        let delay = self.config.inter_task_delay();

        for (position, &task_id) in queue.iter().enumerate() {
            if position > 0 && !delay.is_zero() {
                sleep(delay).await;
            }

            if let Some(reason) = self.handle.stop_requested() {
                summary.stop_reason = Some(reason);
                if reason == StopReason::Cancelled {
                    summary.cancelled += self.cancel_pending(&queue[position..])?;
                }
                info!(?reason, remaining = queue.len() - position, "batch run stopped");
                return Ok(());
            }

            let idx = self.index_of(task_id)?;
            if self.tasks[idx].status == TaskStatus::Failed {
                self.tasks[idx].transition(TaskStatus::Pending)?;
            }
            if self.tasks[idx].status != TaskStatus::Pending {
                continue;
            }

            self.tasks[idx].transition(TaskStatus::Processing)?;
            debug!(
                task_id = %task_id,
                image_id = %self.tasks[idx].image_id,
                process_type = %self.tasks[idx].process_type,
                "processing task"
            );
            self.publish();

            match self.execute(idx).await {
                Ok(encoded) => {
                    self.tasks[idx].complete(encoded)?;
                    summary.completed += 1;
                }
                Err(Interrupt::Failed(task_error)) => {
                    warn!(
                        task_id = %task_id,
                        image_id = %self.tasks[idx].image_id,
                        kind = task_error.category(),
                        error = %task_error,
                        "task failed"
                    );
                    let event = ErrorEvent::task_failed(&self.tasks[idx], &task_error);
                    self.tasks[idx].fail(task_error.to_string())?;
                    self.reporter.report(event);
                    summary.failed += 1;
                }
                Err(Interrupt::Cancelled) => {
                    debug!(task_id = %task_id, "task cancelled in flight");
                    self.tasks[idx].transition(TaskStatus::Cancelled)?;
                    summary.cancelled += 1;
                }
                Err(Interrupt::Batch(batch_error)) => {
                    self.tasks[idx].fail(batch_error.to_string())?;
                    return Err(batch_error);
                }
            }
            self.publish();
        }

        // A stop requested while the last task was in flight
        if summary.stop_reason.is_none() {
            summary.stop_reason = self.handle.stop_requested();
        }
        Ok(())
    }

    /// Load, decode, transform and encode one task.
    async fn execute(&mut self, idx: usize) -> Result<EncodedImage, Interrupt> {
        let task = self.tasks[idx].clone();
        let output = task.output_settings.clone();
        let loader = Arc::clone(&self.loader);

        let bytes = loader.load(&task.image_id).await?;
        self.checkpoint()?;

        let raster = run_blocking(move || decode_image(bytes.as_slice())).await?;
        self.advance(idx, PROGRESS_DECODED);
        self.checkpoint()?;

        let surface = run_blocking(move || apply_operation(&raster, &task)).await?;
        self.advance(idx, PROGRESS_TRANSFORMED);
        self.checkpoint()?;

        let encoded = run_blocking(move || encode(&surface, &output)).await?;
        self.advance(idx, PROGRESS_ENCODED);
        self.checkpoint()?;

        Ok(encoded)
    }

    /// Mark not-yet-started tasks in `remaining` as cancelled.
    fn cancel_pending(&mut self, remaining: &[TaskId]) -> Result<usize, BatchError> {
        let mut cancelled = 0;
        for &task_id in remaining {
            let idx = self.index_of(task_id)?;
            if self.tasks[idx].status == TaskStatus::Pending {
                self.tasks[idx].transition(TaskStatus::Cancelled)?;
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }

    /// Fail whatever a panic left in `processing`.
    fn fail_in_flight(&mut self, error: &BatchError) {
        for task in &mut self.tasks {
            if task.status == TaskStatus::Processing {
                if let Err(transition) = task.fail(error.to_string()) {
                    warn!(task_id = %task.id, error = %transition, "could not fail in-flight task");
                }
            }
        }
    }

    fn checkpoint(&self) -> Result<(), Interrupt> {
        match self.handle.stop_requested() {
            Some(StopReason::Cancelled) => Err(Interrupt::Cancelled),
            _ => Ok(()),
        }
    }

    fn advance(&mut self, idx: usize, progress: u8) {
        self.tasks[idx].advance(progress);
        self.publish();
    }

    fn index_of(&self, task_id: TaskId) -> Result<usize, BatchError> {
        self.tasks
            .iter()
            .position(|task| task.id == task_id)
            .ok_or(BatchError::TaskMissing(task_id))
    }

    fn publish(&self) {
        self.state.send_replace(BatchState {
            tasks: self.tasks.clone(),
            is_processing: self.is_processing,
        });
    }
}

/// Run a synchronous engine step on the blocking pool.
async fn run_blocking<T, E, F>(job: F) -> Result<T, Interrupt>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<TaskError> + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(result) => result.map_err(|e| Interrupt::Failed(e.into())),
        Err(join_error) => Err(Interrupt::Batch(BatchError::Worker(join_error.to_string()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned());
    match detail {
        Some(detail) => format!("run loop panicked: {detail}"),
        None => "run loop panicked".to_string(),
    }
}

/// The geometry stage for one task.
fn apply_operation(raster: &Raster, task: &ProcessTask) -> Result<SurfaceBytes, TaskError> {
    match task.process_type {
        ProcessType::Crop => {
            let params = task.crop_params.ok_or(TaskError::MissingParams("crop"))?;
            Ok(crop(raster, &params.geometry, params.resize_target)?)
        }
        ProcessType::Resize => {
            let settings = task
                .resize_settings
                .ok_or(TaskError::MissingParams("resize"))?;
            settings.validate()?;
            Ok(resize_proportional(raster, settings.scale_factor)?)
        }
    }
}
