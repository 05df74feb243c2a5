use std::sync::Arc;

use crate::domain::thali_recognition::ports::{ItemDetector, ThaliStore};

/// Application service holding the outbound adapters used by the recognition
/// pipeline. Cloning is cheap; adapters are shared.
pub struct Service<D, TS>
where
    D: ItemDetector,
    TS: ThaliStore,
{
    pub(crate) item_detector: Arc<D>,
    pub(crate) thali_store: Arc<TS>,
}

impl<D, TS> Service<D, TS>
where
    D: ItemDetector,
    TS: ThaliStore,
{
    pub fn new(item_detector: D, thali_store: TS) -> Self {
        Self {
            item_detector: Arc::new(item_detector),
            thali_store: Arc::new(thali_store),
        }
    }
}

impl<D, TS> Clone for Service<D, TS>
where
    D: ItemDetector,
    TS: ThaliStore,
{
    fn clone(&self) -> Self {
        Self {
            item_detector: Arc::clone(&self.item_detector),
            thali_store: Arc::clone(&self.thali_store),
        }
    }
}
