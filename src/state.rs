use std::sync::Arc;

use crate::config::AuthConfig;
use crate::features::catalog::storage::CatalogStorage;
use crate::media::MediaStore;

/// 聚合的应用共享状态（只读，按请求克隆）
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<CatalogStorage>,
    pub media: Arc<MediaStore>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(storage: CatalogStorage, media: MediaStore, auth: AuthConfig) -> Self {
        Self {
            storage: Arc::new(storage),
            media: Arc::new(media),
            auth: Arc::new(auth),
        }
    }
}
