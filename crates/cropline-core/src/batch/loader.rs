//! Source image supply for the orchestrator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::error::TaskError;
use super::task::ImageId;

/// Supplies the encoded bytes of an image on demand.
///
/// Decoding happens in the orchestrator's blocking worker, so loaders only
/// fetch bytes.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, id: &ImageId) -> Result<Arc<Vec<u8>>, TaskError>;
}

/// In-memory loader keyed by image id.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageStore {
    images: Arc<RwLock<HashMap<ImageId, Arc<Vec<u8>>>>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: impl Into<ImageId>, bytes: Vec<u8>) {
        if let Ok(mut images) = self.images.write() {
            images.insert(id.into(), Arc::new(bytes));
        }
    }

    pub fn remove(&self, id: &ImageId) -> bool {
        self.images
            .write()
            .map(|mut images| images.remove(id).is_some())
            .unwrap_or(false)
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.images
            .read()
            .map(|images| images.contains_key(id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.images.read().map(|images| images.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageLoader for MemoryImageStore {
    async fn load(&self, id: &ImageId) -> Result<Arc<Vec<u8>>, TaskError> {
        let images = self
            .images
            .read()
            .map_err(|_| TaskError::Load("image store lock poisoned".to_string()))?;
        images
            .get(id)
            .cloned()
            .ok_or_else(|| TaskError::Load(format!("image {id} not found")))
    }
}
