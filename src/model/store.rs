use super::loader::{load_artifacts, ArtifactLocator};
use super::ArtifactPair;
use crate::error::PredictError;
use std::sync::{Arc, RwLock};

/// Hands out artifact pairs, either freshly loaded per call or cached after
/// the first successful load.
pub struct ArtifactStore {
    locator: ArtifactLocator,
    // None when every call reloads from disk
    cache: Option<RwLock<Option<Arc<ArtifactPair>>>>,
}

impl ArtifactStore {
    pub fn new(locator: ArtifactLocator, cache: bool) -> Self {
        Self {
            locator,
            cache: cache.then(|| RwLock::new(None)),
        }
    }

    pub fn locator(&self) -> &ArtifactLocator {
        &self.locator
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    pub fn load(&self) -> Result<Arc<ArtifactPair>, PredictError> {
        let Some(cache) = &self.cache else {
            return load_artifacts(&self.locator).map(Arc::new);
        };

        if let Some(pair) = cache.read().unwrap_or_else(|e| e.into_inner()).as_ref() {
            return Ok(Arc::clone(pair));
        }

        let mut slot = cache.write().unwrap_or_else(|e| e.into_inner());
        if let Some(pair) = slot.as_ref() {
            return Ok(Arc::clone(pair));
        }
        let pair = Arc::new(load_artifacts(&self.locator)?);
        *slot = Some(Arc::clone(&pair));
        Ok(pair)
    }
}
