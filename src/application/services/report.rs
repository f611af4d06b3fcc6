//! Report loading service
//!
//! Loads a document, builds its tree and hands out immutable report snapshots.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{tags, Dataset, DomainError, Node, SearchEngine, TreeBuilder};
use crate::infrastructure::traits::DocumentLoader;

/// Document-level attributes shown alongside the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    pub patient_name: Option<String>,
    pub patient_id: Option<String>,
    pub modality: Option<String>,
    pub sop_class_uid: Option<String>,
    pub sop_instance_uid: Option<String>,
}

impl DocumentInfo {
    pub fn from_dataset(document: &Dataset) -> Self {
        let read = |tag| document.string(tag).map(|s| s.trim().to_string());
        Self {
            patient_name: read(tags::PATIENT_NAME),
            patient_id: read(tags::PATIENT_ID),
            modality: read(tags::MODALITY),
            sop_class_uid: read(tags::SOP_CLASS_UID),
            sop_instance_uid: read(tags::SOP_INSTANCE_UID),
        }
    }
}

/// Snapshot of one loaded document. Reloading produces a new snapshot.
#[derive(Debug, Clone)]
pub struct Report {
    pub source: PathBuf,
    pub info: DocumentInfo,
    pub root: Node,
}

impl Report {
    pub fn search(&self) -> SearchEngine<'_> {
        SearchEngine::new(&self.root)
    }
}

/// Classification of a file found by `scan`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Report { nodes: usize },
    NotStructuredReport,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub outcome: ScanOutcome,
}

/// Service for turning documents into report trees.
pub struct ReportService {
    loader: Arc<dyn DocumentLoader>,
    builder: TreeBuilder,
}

impl ReportService {
    pub fn new(loader: Arc<dyn DocumentLoader>, builder: TreeBuilder) -> Self {
        Self { loader, builder }
    }

    /// Load and build the report at `path`.
    ///
    /// # Errors
    /// Load failures from the document loader, and
    /// `DomainError::NotStructuredReport` for documents without a content tree.
    #[instrument(level = "debug", skip(self))]
    pub fn open(&self, path: &Path) -> ApplicationResult<Report> {
        let document = self.loader.load(path)?;
        let root = self.builder.build(&document)?;
        info!(
            "loaded report {} ({} nodes)",
            path.display(),
            root.node_count()
        );
        Ok(Report {
            source: path.to_path_buf(),
            info: DocumentInfo::from_dataset(&document),
            root,
        })
    }

    /// Walk `dir` and classify every document the loader accepts.
    /// Entries are sorted by path.
    #[instrument(level = "debug", skip(self))]
    pub fn scan(&self, dir: &Path) -> ApplicationResult<Vec<ScanEntry>> {
        if !dir.is_dir() {
            return Err(ApplicationError::DocumentNotFound(dir.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::OperationFailed {
                context: format!("scan {}", dir.display()),
                source: Box::new(e),
            })?;
            if !entry.file_type().is_file() || !self.loader.accepts(entry.path()) {
                continue;
            }

            let outcome = match self.open(entry.path()) {
                Ok(report) => ScanOutcome::Report {
                    nodes: report.root.node_count(),
                },
                Err(ApplicationError::Domain(DomainError::NotStructuredReport)) => {
                    ScanOutcome::NotStructuredReport
                }
                Err(e) => {
                    warn!("skipping {}: {}", entry.path().display(), e);
                    ScanOutcome::Failed(e.to_string())
                }
            };
            entries.push(ScanEntry {
                path: entry.path().to_path_buf(),
                outcome,
            });
        }
        debug!("scan found {} documents", entries.len());
        Ok(entries)
    }
}
