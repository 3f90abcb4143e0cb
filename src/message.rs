use crate::store::CacheStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Requests understood by the cache owner, e.g. `{"action":"clearCache"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ClearCache,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
}

pub async fn handle<C: CacheStore + ?Sized>(request: &Request, cache: &C) -> Response {
    match request {
        Request::ClearCache => match cache.remove().await {
            Ok(()) => {
                info!("Cache cleared");
                Response { success: true }
            }
            Err(e) => {
                warn!("Error clearing cache: {e}");
                Response { success: false }
            }
        },
    }
}
