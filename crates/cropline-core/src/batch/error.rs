//! Error types for batch execution.
//!
//! [`TaskError`] is recorded on a single task and never stops the run.
//! [`BatchError`] is not attributable to one task and ends the run.

use thiserror::Error;

use super::task::{TaskId, TaskStatus};
use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::transform::TransformError;

/// Per-task failure.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The loader could not supply bytes for the image.
    #[error("Failed to load image: {0}")]
    Load(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// A task was built without the parameters its process type needs.
    #[error("Task has no {0} parameters")]
    MissingParams(&'static str),
}

impl TaskError {
    /// Short machine-readable kind, carried in error event details.
    pub fn category(&self) -> &'static str {
        match self {
            TaskError::Load(_) => "load",
            TaskError::Decode(_) => "decode",
            TaskError::Transform(TransformError::InvalidGeometry(_)) => "invalid_geometry",
            TaskError::Transform(TransformError::InvalidScaleFactor(_)) => "invalid_scale_factor",
            TaskError::Transform(TransformError::SurfaceAllocation { .. }) => "surface_allocation",
            TaskError::Transform(TransformError::Intermediate(_)) | TaskError::Encode(_) => {
                "encode"
            }
            TaskError::MissingParams(_) => "invalid_task",
        }
    }
}

/// Failure of the run loop itself.
#[derive(Debug, Error)]
pub enum BatchError {
    /// A blocking worker or the run loop itself panicked.
    #[error("Processing worker failed: {0}")]
    Worker(String),

    #[error("Task {task_id} cannot move from {from} to {to}")]
    InvalidTransition {
        task_id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    /// The task vanished from the list mid-run.
    #[error("Task {0} is no longer in the batch")]
    TaskMissing(TaskId),
}
