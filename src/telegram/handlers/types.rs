//! Handler types and dependencies

use std::sync::Arc;

use crate::core::config::DownloadSettings;
use crate::download::source::DownloadSource;
use crate::telegram::cache::UrlCache;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub source: Arc<dyn DownloadSource>,
    pub url_cache: Arc<UrlCache>,
    pub settings: DownloadSettings,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(source: Arc<dyn DownloadSource>, url_cache: Arc<UrlCache>, settings: DownloadSettings) -> Self {
        Self {
            source,
            url_cache,
            settings,
        }
    }
}
