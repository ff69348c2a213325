//! Incident report domain: model and submission drafts.

pub mod draft;
pub mod model;

pub use draft::{ReportDraft, TargetMode};
pub use model::{Report, ReportImage, ReportStatus, ReportTarget};
