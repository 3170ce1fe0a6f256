//! Error events surfaced to the host while a batch runs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::error::{BatchError, TaskError};
use super::task::ProcessTask;

/// Category attached to every event raised by the orchestrator.
pub const PROCESSING_CATEGORY: &str = "processing";

/// One reported failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    pub id: String,
    pub category: &'static str,
    pub message: String,
    pub details: Value,
    pub timestamp: DateTime<Utc>,
}

impl ErrorEvent {
    fn new(message: String, details: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category: PROCESSING_CATEGORY,
            message,
            details,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn task_failed(task: &ProcessTask, error: &TaskError) -> Self {
        Self::new(
            format!("Failed to process {}: {}", task.image_id, error),
            json!({
                "taskId": task.id,
                "imageId": task.image_id,
                "processType": task.process_type,
                "kind": error.category(),
            }),
        )
    }

    pub(crate) fn batch_failed(error: &BatchError) -> Self {
        Self::new(
            format!("Batch processing stopped: {error}"),
            json!({ "kind": "batch" }),
        )
    }
}

/// Receives error events. Closures taking an [`ErrorEvent`] implement it.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, event: ErrorEvent);
}

impl<F> ErrorReporter for F
where
    F: Fn(ErrorEvent) + Send + Sync,
{
    fn report(&self, event: ErrorEvent) {
        self(event)
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report(&self, _event: ErrorEvent) {}
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::batch::task::ImageId;
    use crate::decode::DecodeError;
    use crate::encode::OutputSettings;
    use crate::transform::ProportionalResizeSettings;

    #[test]
    fn test_task_event_carries_context() {
        let task = ProcessTask::resize(
            ImageId::from("photo-3"),
            ProportionalResizeSettings::default(),
            OutputSettings::default(),
        );
        let error = TaskError::from(DecodeError::InvalidFormat);

        let event = ErrorEvent::task_failed(&task, &error);
        assert_eq!(event.category, "processing");
        assert!(event.message.contains("photo-3"));
        assert_eq!(event.details["imageId"], "photo-3");
        assert_eq!(event.details["kind"], "decode");
        assert_eq!(event.details["processType"], "resize");
        assert_eq!(event.details["taskId"], task.id.to_string());
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let event = ErrorEvent::batch_failed(&BatchError::Worker("boom".into()));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["category"], "processing");
        assert!(value["timestamp"].is_string());
        assert!(value["message"].as_str().unwrap().contains("boom"));
    }

    #[test]
    fn test_closure_reporter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = move |event: ErrorEvent| sink.lock().unwrap().push(event.message);

        reporter.report(ErrorEvent::batch_failed(&BatchError::Worker("x".into())));
        NoopReporter.report(ErrorEvent::batch_failed(&BatchError::Worker("y".into())));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
