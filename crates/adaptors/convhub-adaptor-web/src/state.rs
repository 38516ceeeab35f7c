//! Shared state for the web UI handlers

use crate::server::WebUiConfig;
use crate::views::{ResultPreview, Views};
use convhub_client::{
    AppController, ChatBackend, DocumentExtractor, GfmRenderer, MarkdownRenderer,
    RawTextExtractor,
};
use convhub_core::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Web UI state
pub struct WebState<B> {
    /// Application state controller
    pub controller: AppController<B>,
    /// Preview tab and the live mind map
    pub preview: Arc<Mutex<ResultPreview>>,
    /// Compiled templates
    pub views: Arc<Views>,
    /// Upload decoder
    pub extractor: Arc<dyn DocumentExtractor>,
    /// Markdown tab renderer
    pub renderer: Arc<dyn MarkdownRenderer>,
    /// Server settings
    pub config: Arc<WebUiConfig>,
}

impl<B> Clone for WebState<B> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            preview: self.preview.clone(),
            views: self.views.clone(),
            extractor: self.extractor.clone(),
            renderer: self.renderer.clone(),
            config: self.config.clone(),
        }
    }
}

impl<B: ChatBackend> WebState<B> {
    /// Create state with the default extractor and renderer
    pub fn new(controller: AppController<B>, config: Arc<WebUiConfig>) -> Result<Self> {
        Ok(Self {
            controller,
            preview: Arc::new(Mutex::new(ResultPreview::default())),
            views: Arc::new(Views::new()?),
            extractor: Arc::new(RawTextExtractor),
            renderer: Arc::new(GfmRenderer),
            config,
        })
    }

    /// Lock the preview state
    pub fn preview(&self) -> MutexGuard<'_, ResultPreview> {
        self.preview.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
