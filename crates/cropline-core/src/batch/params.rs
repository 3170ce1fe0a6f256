//! Batch inputs and the saved-or-default parameter resolution.

use serde::{Deserialize, Serialize};

use super::task::{CropParams, ImageId, ProcessTask, ProcessType};
use crate::encode::OutputSettings;
use crate::transform::{CropGeometry, ProportionalResizeSettings, ResizeTarget};

/// An image offered to a batch, with whatever the user saved for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchImage {
    pub id: ImageId,
    #[serde(default)]
    pub saved_crop: Option<CropGeometry>,
    #[serde(default)]
    pub scale_override: Option<f64>,
}

impl BatchImage {
    pub fn new(id: impl Into<ImageId>) -> Self {
        Self {
            id: id.into(),
            saved_crop: None,
            scale_override: None,
        }
    }

    pub fn with_saved_crop(mut self, geometry: CropGeometry) -> Self {
        self.saved_crop = Some(geometry);
        self
    }

    pub fn with_scale_override(mut self, scale_factor: f64) -> Self {
        self.scale_override = Some(scale_factor);
        self
    }
}

/// Batch-wide operation and its defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OperationParams {
    #[serde(rename_all = "camelCase")]
    Crop {
        default_geometry: CropGeometry,
        #[serde(default)]
        resize_target: Option<ResizeTarget>,
    },
    #[serde(rename_all = "camelCase")]
    Resize {
        default_settings: ProportionalResizeSettings,
    },
}

impl OperationParams {
    pub fn process_type(&self) -> ProcessType {
        match self {
            OperationParams::Crop { .. } => ProcessType::Crop,
            OperationParams::Resize { .. } => ProcessType::Resize,
        }
    }

    /// Fresh pending task for `image` with its effective parameters.
    pub(crate) fn task_for(&self, image: &BatchImage, output: &OutputSettings) -> ProcessTask {
        match self {
            OperationParams::Crop {
                default_geometry,
                resize_target,
            } => ProcessTask::crop(
                image.id.clone(),
                CropParams {
                    geometry: effective_crop(image, default_geometry),
                    resize_target: *resize_target,
                },
                output.clone(),
            ),
            OperationParams::Resize { default_settings } => ProcessTask::resize(
                image.id.clone(),
                effective_scale(image, default_settings),
                output.clone(),
            ),
        }
    }
}

/// The image's saved crop, or the batch default.
pub fn effective_crop(image: &BatchImage, default: &CropGeometry) -> CropGeometry {
    image.saved_crop.unwrap_or(*default)
}

/// The image's scale override, or the batch default.
pub fn effective_scale(
    image: &BatchImage,
    default: &ProportionalResizeSettings,
) -> ProportionalResizeSettings {
    match image.scale_override {
        Some(scale_factor) => ProportionalResizeSettings::new(scale_factor),
        None => *default,
    }
}
