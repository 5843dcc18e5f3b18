//! Deployment outcome reporting.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::archive::Archive;
use crate::types::DeploymentResult;

/// What happened to a deploy invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DeployOutcome {
    /// The user declined the rapid deploy confirmation; nothing was sent.
    NotAttempted { reason: String },
    /// The pipeline ran and produced a classified result.
    Completed(DeployReport),
}

impl DeployOutcome {
    pub fn result(&self) -> Option<DeploymentResult> {
        match self {
            DeployOutcome::NotAttempted { .. } => None,
            DeployOutcome::Completed(report) => Some(report.result),
        }
    }

    pub fn report(&self) -> Option<&DeployReport> {
        match self {
            DeployOutcome::NotAttempted { .. } => None,
            DeployOutcome::Completed(report) => Some(report),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result().is_some_and(|r| r.is_success())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeployReport {
    /// Empty when no configuration could be loaded
    pub app_name: String,
    pub result: DeploymentResult,
    /// Upstream or local cause of a failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Remote state was cleared during this run
    pub cleared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveSummary>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Size and digest of the uploaded archive, kept after the buffer is released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    pub file_count: usize,
    pub size_bytes: usize,
    pub digest: String,
}

impl From<&Archive> for ArchiveSummary {
    fn from(archive: &Archive) -> Self {
        Self {
            file_count: archive.file_count(),
            size_bytes: archive.len(),
            digest: archive.digest(),
        }
    }
}

/// Accumulates what a run has done so far.
#[derive(Debug)]
pub(crate) struct RunProgress {
    app_name: String,
    started_at: DateTime<Utc>,
    cleared: bool,
    archive: Option<ArchiveSummary>,
}

impl RunProgress {
    pub(crate) fn start(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            started_at: Utc::now(),
            cleared: false,
            archive: None,
        }
    }

    pub(crate) fn set_app_name(&mut self, app_name: impl Into<String>) {
        self.app_name = app_name.into();
    }

    pub(crate) fn mark_cleared(&mut self) {
        self.cleared = true;
    }

    pub(crate) fn record_archive(&mut self, archive: &Archive) {
        self.archive = Some(ArchiveSummary::from(archive));
    }

    pub(crate) fn finish(self, result: DeploymentResult, message: Option<String>) -> DeployOutcome {
        DeployOutcome::Completed(DeployReport {
            app_name: self.app_name,
            result,
            message,
            cleared: self.cleared,
            archive: self.archive,
            started_at: self.started_at,
            finished_at: Utc::now(),
        })
    }

    pub(crate) fn fail(self, result: DeploymentResult, message: impl Into<String>) -> DeployOutcome {
        self.finish(result, Some(message.into()))
    }
}
