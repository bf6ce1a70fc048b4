//! Case workflow engine.
//!
//! Every mutation loads the case, applies the change together with its
//! status-history and activity-log entries, commits the new log entries to
//! the audit ledger and writes any notifications, all in one transaction.
//! A case id that does not resolve is a silent no-op.

mod engine;

pub use engine::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("Audit ledger error: {0}")]
    Audit(#[from] crate::audit::AuditError),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
