//! Batch orchestration: one task per image, run sequentially.
//!
//! A batch is built from a set of [`BatchImage`]s and an [`OperationParams`],
//! then executed by [`Orchestrator::run`]. Each task goes through
//!
//! ```text
//! pending -> processing -> completed | failed | cancelled
//! ```
//!
//! with `failed -> pending` on retry. Failures stay on their task and are
//! reported through an [`ErrorReporter`]; the rest of the batch keeps going.
//! Pausing and cancelling go through a [`BatchHandle`].

mod cancel;
mod config;
mod error;
mod events;
mod loader;
mod orchestrator;
mod params;
mod task;

pub use cancel::{BatchHandle, StopReason};
pub use config::OrchestratorConfig;
pub use error::{BatchError, TaskError};
pub use events::{ErrorEvent, ErrorReporter, NoopReporter, PROCESSING_CATEGORY};
pub use loader::{ImageLoader, MemoryImageStore};
pub use orchestrator::{BatchState, Orchestrator, RunSummary};
pub use params::{effective_crop, effective_scale, BatchImage, OperationParams};
pub use task::{CropParams, ImageId, ProcessTask, ProcessType, TaskId, TaskStatus};
