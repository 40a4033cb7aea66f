use std::path::PathBuf;

use thiserror::Error;

use crate::model::RecordKind;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("malformed {kind} record #{index}: {reason}")]
    MalformedRecord {
        kind: RecordKind,
        index: usize,
        reason: String,
    },

    #[error("missing file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("article {article_id} references unknown text revision {text_id}")]
    IntegrityViolation { article_id: u64, text_id: u64 },

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedRecord { .. } => "malformed_record",
            Self::MissingFile(_) => "missing_file",
            Self::IntegrityViolation { .. } => "integrity_violation",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }

    pub(crate) fn malformed(kind: RecordKind, index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            kind,
            index,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
