//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::ReportService;
use crate::config::Settings;
use crate::domain::TreeBuilder;
use crate::infrastructure::json::JsonDocumentLoader;
use crate::infrastructure::traits::{DocumentLoader, FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Document loader
    pub loader: Arc<dyn DocumentLoader>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let loader = Arc::new(
            JsonDocumentLoader::new(fs).with_extensions(settings.document_extensions.clone()),
        );

        Self {
            settings: Arc::new(settings),
            loader,
        }
    }

    /// Report service configured from the settings.
    pub fn report_service(&self) -> ReportService {
        let builder = TreeBuilder::new().with_root_label(self.settings.root_label.clone());
        ReportService::new(self.loader.clone(), builder)
    }
}
