//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (DocumentLoader, FileSystem)
//! but are themselves concrete structs, not traits.

mod report;

pub use report::{DocumentInfo, Report, ReportService, ScanEntry, ScanOutcome};
