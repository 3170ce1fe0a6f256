//! Task identity, lifecycle states and the per-task record.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BatchError;
use crate::encode::{EncodedImage, OutputSettings};
use crate::transform::{CropGeometry, ProportionalResizeSettings, ResizeTarget};

/// Reference to an image owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ImageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unique task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which engine pipeline a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessType {
    Crop,
    Resize,
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProcessType::Crop => "crop",
            ProcessType::Resize => "resize",
        })
    }
}

/// Task lifecycle.
///
/// ```text
/// pending -> processing -> completed | failed | cancelled
/// pending -> cancelled
/// failed  -> pending        (explicit retry only)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Pending or processing.
    pub fn is_live(self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Processing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Cancelled)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Processing, Cancelled)
                | (Failed, Pending)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        })
    }
}

/// Effective crop parameters for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropParams {
    pub geometry: CropGeometry,
    #[serde(default)]
    pub resize_target: Option<ResizeTarget>,
}

/// One (image, operation) unit tracked by the orchestrator.
///
/// Readers get clones; only the orchestrator mutates tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessTask {
    pub id: TaskId,
    pub image_id: ImageId,
    pub process_type: ProcessType,
    pub status: TaskStatus,
    /// 0 to 100, non-decreasing while processing.
    pub progress: u8,
    pub crop_params: Option<CropParams>,
    pub resize_settings: Option<ProportionalResizeSettings>,
    pub output_settings: OutputSettings,
    /// Set iff `status == Failed`.
    pub error: Option<String>,
    /// Set iff `status == Completed`.
    pub result: Option<Arc<EncodedImage>>,
}

impl ProcessTask {
    pub fn crop(image_id: ImageId, params: CropParams, output_settings: OutputSettings) -> Self {
        Self::new(image_id, ProcessType::Crop, Some(params), None, output_settings)
    }

    pub fn resize(
        image_id: ImageId,
        settings: ProportionalResizeSettings,
        output_settings: OutputSettings,
    ) -> Self {
        Self::new(image_id, ProcessType::Resize, None, Some(settings), output_settings)
    }

    fn new(
        image_id: ImageId,
        process_type: ProcessType,
        crop_params: Option<CropParams>,
        resize_settings: Option<ProportionalResizeSettings>,
        output_settings: OutputSettings,
    ) -> Self {
        Self {
            id: TaskId::new(),
            image_id,
            process_type,
            status: TaskStatus::Pending,
            progress: 0,
            crop_params,
            resize_settings,
            output_settings,
            error: None,
            result: None,
        }
    }

    /// Move to `next`, clearing fields that only belong to other states.
    pub(crate) fn transition(&mut self, next: TaskStatus) -> Result<(), BatchError> {
        if !self.status.can_transition_to(next) {
            return Err(BatchError::InvalidTransition {
                task_id: self.id,
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        match next {
            TaskStatus::Pending | TaskStatus::Processing => {
                self.progress = 0;
                self.error = None;
                self.result = None;
            }
            TaskStatus::Cancelled => self.result = None,
            TaskStatus::Completed | TaskStatus::Failed => {}
        }
        Ok(())
    }

    /// Raise progress; lower values are ignored.
    pub(crate) fn advance(&mut self, progress: u8) {
        self.progress = self.progress.max(progress.min(100));
    }

    pub(crate) fn complete(&mut self, result: EncodedImage) -> Result<(), BatchError> {
        self.transition(TaskStatus::Completed)?;
        self.progress = 100;
        self.result = Some(Arc::new(result));
        Ok(())
    }

    pub(crate) fn fail(&mut self, message: String) -> Result<(), BatchError> {
        self.transition(TaskStatus::Failed)?;
        self.error = Some(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::OutputFormat;
    use TaskStatus::*;

    const ALL: [TaskStatus; 5] = [Pending, Processing, Completed, Failed, Cancelled];

    fn task() -> ProcessTask {
        ProcessTask::resize(
            ImageId::from("img-1"),
            ProportionalResizeSettings::default(),
            OutputSettings::default(),
        )
    }

    #[test]
    fn test_transition_table() {
        let allowed = [
            (Pending, Processing),
            (Pending, Cancelled),
            (Processing, Completed),
            (Processing, Failed),
            (Processing, Cancelled),
            (Failed, Pending),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_stay_put() {
        for from in [Completed, Cancelled] {
            assert!(ALL.iter().all(|&to| !from.can_transition_to(to)));
        }
    }

    #[test]
    fn test_live_and_terminal_are_disjoint() {
        for status in ALL {
            assert_ne!(status.is_live(), status.is_terminal());
        }
    }

    #[test]
    fn test_new_task_is_pending() {
        let task = task();
        assert_eq!(task.status, Pending);
        assert_eq!(task.progress, 0);
        assert!(task.error.is_none());
        assert!(task.result.is_none());
        assert_eq!(task.process_type, ProcessType::Resize);
    }

    #[test]
    fn test_task_ids_are_unique() {
        assert_ne!(task().id, task().id);
    }

    #[test]
    fn test_complete_sets_result_and_progress() {
        let mut task = task();
        task.transition(Processing).unwrap();
        task.advance(50);
        task.complete(EncodedImage {
            bytes: vec![1, 2, 3],
            format: OutputFormat::Png,
            width: 1,
            height: 1,
        })
        .unwrap();

        assert_eq!(task.status, Completed);
        assert_eq!(task.progress, 100);
        assert_eq!(task.result.as_ref().map(|r| r.len()), Some(3));
    }

    #[test]
    fn test_fail_then_retry_clears_error() {
        let mut task = task();
        task.transition(Processing).unwrap();
        task.fail("bad bytes".to_string()).unwrap();
        assert_eq!(task.error.as_deref(), Some("bad bytes"));

        task.transition(Pending).unwrap();
        assert!(task.error.is_none());
        assert_eq!(task.progress, 0);
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        let mut task = task();
        assert!(matches!(
            task.transition(Completed),
            Err(BatchError::InvalidTransition { from: Pending, to: Completed, .. })
        ));
        assert_eq!(task.status, Pending);
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut task = task();
        task.transition(Processing).unwrap();
        task.advance(75);
        task.advance(25);
        assert_eq!(task.progress, 75);
        task.advance(250);
        assert_eq!(task.progress, 100);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Processing).unwrap(), "\"processing\"");
        assert_eq!(serde_json::to_string(&ProcessType::Crop).unwrap(), "\"crop\"");
    }
}
