//! Medtour Core Library
//!
//! Case coordination engine for medical tourism: intake, hospital
//! assignment, visa and travel processing, treatment, payments, closure.
//!
//! # Architecture
//!
//! ```text
//!  Presentation layer (host app, via UniFFI)
//!          │  Actor + operation
//!          ▼
//!  ┌───────────────────────────┐      ┌─────────────────────────┐
//!  │     WorkflowEngine        │─────▶│  medtour-assist         │
//!  │  status / docs / payments │      │  canned auto-replies    │
//!  └─────────────┬─────────────┘      └─────────────────────────┘
//!                │ one transaction per mutation
//!        ┌───────┼──────────────┬──────────────────┐
//!        ▼       ▼              ▼                  ▼
//!     cases   audit ledger   notifications     registry
//!     (JSON   (Merkle leaf   (status change,   (hospitals,
//!     trails)  per entry)     assignment)       users)
//!                │
//!                ▼
//!     stats over AppSnapshot · payment / audit-trail exports
//! ```
//!
//! # Modules
//!
//! - [`models`]: Case aggregate, statuses, documents, payments, users
//! - [`policy`]: Document upload permissions and optional transition rules
//! - [`workflow`]: Mutating case operations
//! - [`registry`]: Hospital and user administration
//! - [`notify`]: In-app notifications
//! - [`audit`]: Merkle tree over activity entries
//! - [`stats`]: Role-scoped lists, dashboard counts, search
//! - [`export`]: Payment ledger and audit trail exports
//! - [`db`]: SQLite persistence

pub mod audit;
pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod notify;
pub mod policy;
pub mod registry;
pub mod stats;
pub mod workflow;

pub use audit::{AuditLedger, LeafCommit, LedgerStats};
pub use config::EngineConfig;
pub use db::{AppSnapshot, Database};
pub use models::{
    Actor, Case, CasePatch, CaseStatus, DocumentType, NewCase, NewDocument, NewPayment,
    PaymentPatch, Role,
};
pub use registry::Registry;
pub use workflow::WorkflowEngine;

uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use models::{ClientInfo, HospitalContact, Notification, PaymentStatus, PaymentType, Priority, User};
use registry::NewHospital;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MedtourError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for MedtourError {
    fn from(e: db::DbError) -> Self {
        MedtourError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for MedtourError {
    fn from(e: serde_json::Error) -> Self {
        MedtourError::SerializationError(e.to_string())
    }
}

impl From<audit::AuditError> for MedtourError {
    fn from(e: audit::AuditError) -> Self {
        match e {
            audit::AuditError::NodeNotFound(hash) => MedtourError::NotFound(hash),
            other => MedtourError::DatabaseError(other.to_string()),
        }
    }
}

impl From<workflow::WorkflowError> for MedtourError {
    fn from(e: workflow::WorkflowError) -> Self {
        match e {
            workflow::WorkflowError::Validation(msg) => MedtourError::InvalidInput(msg),
            workflow::WorkflowError::Database(e) => e.into(),
            workflow::WorkflowError::Audit(e) => e.into(),
        }
    }
}

impl From<registry::RegistryError> for MedtourError {
    fn from(e: registry::RegistryError) -> Self {
        match e {
            registry::RegistryError::Database(e) => e.into(),
            registry::RegistryError::Credential(msg) => MedtourError::InvalidInput(msg),
            other => MedtourError::Conflict(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for MedtourError {
    fn from(e: config::ConfigError) -> Self {
        MedtourError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for MedtourError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        MedtourError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn parse_role(raw: &str) -> Result<Role, MedtourError> {
    Role::from_str_opt(raw).ok_or_else(|| MedtourError::InvalidInput(format!("Unknown role: {}", raw)))
}

fn parse_status(raw: &str) -> Result<CaseStatus, MedtourError> {
    raw.parse()
        .map_err(|e: models::UnknownStatus| MedtourError::InvalidInput(e.to_string()))
}

fn parse_document_type(raw: &str) -> Result<DocumentType, MedtourError> {
    raw.parse()
        .map_err(|e: models::UnknownDocumentType| MedtourError::InvalidInput(e.to_string()))
}

fn parse_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, MedtourError> {
    serde_json::from_str(json).map_err(|e| MedtourError::InvalidInput(format!("Invalid {}: {}", what, e)))
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<MedtourCore>, MedtourError> {
    let db = Database::open(&path)?;
    Ok(MedtourCore::wrap(db, EngineConfig::default()))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<MedtourCore>, MedtourError> {
    let db = Database::open_in_memory()?;
    Ok(MedtourCore::wrap(db, EngineConfig::default()))
}

/// Open the database named by `MEDTOUR_DB_PATH` (or `.env`), with logging
/// filtered by `MEDTOUR_LOG`.
#[uniffi::export]
pub fn open_database_from_env() -> Result<Arc<MedtourCore>, MedtourError> {
    let config = EngineConfig::from_env()?;
    config::init_logging(&config.log_filter);
    let db = Database::open(&config.database_path)?;
    Ok(MedtourCore::wrap(db, config))
}

/// Install the log subscriber. Safe to call more than once.
#[uniffi::export]
pub fn init_logging(filter: String) {
    config::init_logging(&filter);
}

// =========================================================================
// Stateless helpers (exported to FFI)
// =========================================================================

/// Display label for a raw status; unknown values come back unchanged.
#[uniffi::export]
pub fn label_for_status(status: String, university: bool) -> String {
    models::status_label(&status, university)
}

/// Tone name ("new", "progress", ...) for a raw status.
#[uniffi::export]
pub fn tone_for_status(status: String) -> String {
    models::status_tone(&status).as_str().to_string()
}

/// Position on the main flow, -1 for branch or unknown statuses.
#[uniffi::export]
pub fn flow_order(status: String) -> i32 {
    models::order_of(&status)
}

/// Document types `role` may upload at `status`, excluding `uploaded`.
#[uniffi::export]
pub fn allowed_document_types(
    role: String,
    status: String,
    uploaded: Vec<String>,
) -> Result<Vec<String>, MedtourError> {
    let role = parse_role(&role)?;
    let status = parse_status(&status)?;
    let uploaded = uploaded
        .iter()
        .map(|t| parse_document_type(t))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(policy::available_document_types(role, status, &uploaded)
        .into_iter()
        .map(|t| t.as_str().to_string())
        .collect())
}

#[uniffi::export]
pub fn required_document_types(role: String, status: String) -> Result<Vec<String>, MedtourError> {
    let role = parse_role(&role)?;
    let status = parse_status(&status)?;
    Ok(policy::required_documents(role, status)
        .into_iter()
        .map(|t| t.as_str().to_string())
        .collect())
}

/// Statuses `role` would normally move a case in `status` to. Advisory only;
/// `update_status` accepts any target.
#[uniffi::export]
pub fn suggested_next_statuses(role: String, status: String) -> Result<Vec<String>, MedtourError> {
    let role = parse_role(&role)?;
    let status = parse_status(&status)?;
    Ok(policy::TransitionPolicy::new()
        .allowed_targets(role, status)
        .into_iter()
        .map(|s| s.as_str().to_string())
        .collect())
}

/// Automated reply for a client quick-reply message.
#[uniffi::export]
pub fn auto_reply(status: String, message: String) -> String {
    medtour_assist::respond(&status, &message).to_string()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe engine handle for FFI. Calls are serialized on the lock.
#[derive(uniffi::Object)]
pub struct MedtourCore {
    db: Arc<Mutex<Database>>,
    config: EngineConfig,
}

impl MedtourCore {
    fn wrap(db: Database, config: EngineConfig) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
        })
    }
}

#[uniffi::export]
impl MedtourCore {
    // =========================================================================
    // Case Workflow
    // =========================================================================

    pub fn create_case(&self, data: FfiNewCase, actor: FfiActor) -> Result<FfiCase, MedtourError> {
        let actor = actor.try_into()?;
        let data = data.try_into()?;
        let db = self.db.lock()?;
        let engine = WorkflowEngine::with_config(&db, self.config.clone());
        Ok(engine.create_case(data, &actor)?.into())
    }

    pub fn get_case(&self, case_id: String) -> Result<Option<FfiCase>, MedtourError> {
        let db = self.db.lock()?;
        Ok(db.get_case(&case_id)?.map(Into::into))
    }

    /// Cases the user may see, newest activity first.
    pub fn list_cases_for_user(&self, user_id: String) -> Result<Vec<FfiCase>, MedtourError> {
        let db = self.db.lock()?;
        let snapshot = db.snapshot()?;
        let user = snapshot
            .user(&user_id)
            .ok_or_else(|| MedtourError::NotFound(user_id.clone()))?;
        Ok(stats::cases_for(user, &snapshot)
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Document types `role` may still upload to this case.
    pub fn allowed_document_types_for_case(
        &self,
        case_id: String,
        role: String,
    ) -> Result<Vec<String>, MedtourError> {
        let role = parse_role(&role)?;
        let db = self.db.lock()?;
        let case = db
            .get_case(&case_id)?
            .ok_or_else(|| MedtourError::NotFound(case_id.clone()))?;
        Ok(policy::available_document_types(role, case.status, &case.uploaded_types())
            .into_iter()
            .map(|t| t.as_str().to_string())
            .collect())
    }

    pub fn update_status(
        &self,
        case_id: String,
        status: String,
        note: Option<String>,
        actor: FfiActor,
    ) -> Result<Option<FfiCase>, MedtourError> {
        let actor = actor.try_into()?;
        let status = parse_status(&status)?;
        let db = self.db.lock()?;
        let engine = WorkflowEngine::with_config(&db, self.config.clone());
        Ok(engine
            .update_status(&case_id, status, note, &actor)?
            .map(Into::into))
    }

    /// Merge a JSON `CasePatch`. Unknown fields are rejected.
    pub fn update_case_data(
        &self,
        case_id: String,
        patch_json: String,
    ) -> Result<Option<FfiCase>, MedtourError> {
        let db = self.db.lock()?;
        let engine = WorkflowEngine::with_config(&db, self.config.clone());
        Ok(engine
            .update_case_data_json(&case_id, &patch_json)?
            .map(Into::into))
    }

    pub fn add_document(
        &self,
        case_id: String,
        document: FfiNewDocument,
        actor: FfiActor,
    ) -> Result<Option<FfiCase>, MedtourError> {
        let actor = actor.try_into()?;
        let document = document.try_into()?;
        let db = self.db.lock()?;
        let engine = WorkflowEngine::with_config(&db, self.config.clone());
        Ok(engine
            .add_document(&case_id, document, &actor)?
            .map(Into::into))
    }

    pub fn remove_document(
        &self,
        case_id: String,
        document_id: String,
        actor: FfiActor,
    ) -> Result<Option<FfiCase>, MedtourError> {
        let actor = actor.try_into()?;
        let db = self.db.lock()?;
        let engine = WorkflowEngine::with_config(&db, self.config.clone());
        Ok(engine
            .remove_document(&case_id, &document_id, &actor)?
            .map(Into::into))
    }

    pub fn add_comment(
        &self,
        case_id: String,
        message: String,
        is_preset: bool,
        actor: FfiActor,
    ) -> Result<Option<FfiCase>, MedtourError> {
        let actor: Actor = actor.try_into()?;
        let posted = {
            let db = self.db.lock()?;
            WorkflowEngine::with_config(&db, self.config.clone())
                .post_comment(&case_id, &message, is_preset, &actor)?
        };
        if posted.is_none() || !WorkflowEngine::wants_auto_reply(is_preset, &actor) {
            return Ok(posted.map(Into::into));
        }

        // Other callers keep the store while the reply is pending
        if !self.config.auto_reply_delay.is_zero() {
            std::thread::sleep(self.config.auto_reply_delay);
        }

        let db = self.db.lock()?;
        let replied = WorkflowEngine::with_config(&db, self.config.clone())
            .post_auto_reply(&case_id, &message)?;
        Ok(replied.or(posted).map(Into::into))
    }

    pub fn assign_hospital(
        &self,
        case_id: String,
        hospital_id: String,
        actor: FfiActor,
    ) -> Result<Option<FfiCase>, MedtourError> {
        let actor = actor.try_into()?;
        let db = self.db.lock()?;
        let engine = WorkflowEngine::with_config(&db, self.config.clone());
        Ok(engine
            .assign_hospital(&case_id, &hospital_id, &actor)?
            .map(Into::into))
    }

    pub fn add_payment(
        &self,
        case_id: String,
        payment: FfiNewPayment,
        actor: FfiActor,
    ) -> Result<Option<FfiCase>, MedtourError> {
        let actor = actor.try_into()?;
        let payment: NewPayment = payment.try_into()?;
        if !(payment.amount > 0.0) {
            return Err(MedtourError::InvalidInput(
                "Payment amount must be greater than zero".into(),
            ));
        }
        let db = self.db.lock()?;
        let engine = WorkflowEngine::with_config(&db, self.config.clone());
        Ok(engine
            .add_payment(&case_id, payment, &actor)?
            .map(Into::into))
    }

    /// Apply a JSON `PaymentPatch` to one payment.
    pub fn update_payment(
        &self,
        case_id: String,
        payment_id: String,
        patch_json: String,
        actor: FfiActor,
    ) -> Result<Option<FfiCase>, MedtourError> {
        let actor = actor.try_into()?;
        let patch: PaymentPatch = parse_json("payment patch", &patch_json)?;
        if patch.amount.is_some_and(|amount| !(amount > 0.0)) {
            return Err(MedtourError::InvalidInput(
                "Payment amount must be greater than zero".into(),
            ));
        }
        let db = self.db.lock()?;
        let engine = WorkflowEngine::with_config(&db, self.config.clone());
        Ok(engine
            .update_payment(&case_id, &payment_id, patch, &actor)?
            .map(Into::into))
    }

    pub fn delete_payment(
        &self,
        case_id: String,
        payment_id: String,
        actor: FfiActor,
    ) -> Result<Option<FfiCase>, MedtourError> {
        let actor = actor.try_into()?;
        let db = self.db.lock()?;
        let engine = WorkflowEngine::with_config(&db, self.config.clone());
        Ok(engine
            .delete_payment(&case_id, &payment_id, &actor)?
            .map(Into::into))
    }

    pub fn accept_case(
        &self,
        case_id: String,
        actor: FfiActor,
        note: Option<String>,
    ) -> Result<Option<FfiCase>, MedtourError> {
        let actor = actor.try_into()?;
        let db = self.db.lock()?;
        let engine = WorkflowEngine::with_config(&db, self.config.clone());
        Ok(engine.accept_case(&case_id, &actor, note)?.map(Into::into))
    }

    pub fn reject_case(
        &self,
        case_id: String,
        actor: FfiActor,
        reason: String,
    ) -> Result<Option<FfiCase>, MedtourError> {
        let actor = actor.try_into()?;
        let db = self.db.lock()?;
        let engine = WorkflowEngine::with_config(&db, self.config.clone());
        Ok(engine.reject_case(&case_id, &actor, &reason)?.map(Into::into))
    }

    // =========================================================================
    // Registry
    // =========================================================================

    pub fn create_hospital(&self, data: FfiNewHospital) -> Result<FfiHospital, MedtourError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).create_hospital(data.into())?.into())
    }

    pub fn list_hospitals(&self) -> Result<Vec<FfiHospital>, MedtourError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db)
            .list_hospitals()?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Apply a JSON `HospitalPatch`.
    pub fn update_hospital(
        &self,
        hospital_id: String,
        patch_json: String,
    ) -> Result<Option<FfiHospital>, MedtourError> {
        let patch = parse_json("hospital patch", &patch_json)?;
        let db = self.db.lock()?;
        Ok(Registry::new(&db)
            .update_hospital(&hospital_id, patch)?
            .map(Into::into))
    }

    pub fn delete_hospital(&self, hospital_id: String) -> Result<bool, MedtourError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).delete_hospital(&hospital_id)?)
    }

    pub fn create_user(&self, data: FfiNewUser) -> Result<FfiUser, MedtourError> {
        let data = data.try_into()?;
        let db = self.db.lock()?;
        Ok(Registry::new(&db).create_user(data)?.into())
    }

    pub fn list_users(&self) -> Result<Vec<FfiUser>, MedtourError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db)
            .list_users()?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Apply a JSON `UserPatch`.
    pub fn update_user(
        &self,
        user_id: String,
        patch_json: String,
    ) -> Result<Option<FfiUser>, MedtourError> {
        let patch = parse_json("user patch", &patch_json)?;
        let db = self.db.lock()?;
        Ok(Registry::new(&db).update_user(&user_id, patch)?.map(Into::into))
    }

    pub fn change_password(&self, user_id: String, new_password: String) -> Result<bool, MedtourError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).change_password(&user_id, &new_password)?)
    }

    pub fn verify_credentials(
        &self,
        username: String,
        password: String,
    ) -> Result<Option<FfiUser>, MedtourError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db)
            .verify_credentials(&username, &password)?
            .map(Into::into))
    }

    pub fn delete_user(&self, user_id: String, acting_user_id: String) -> Result<bool, MedtourError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).delete_user(&user_id, &acting_user_id)?)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub fn list_notifications(&self, user_id: String) -> Result<Vec<FfiNotification>, MedtourError> {
        let db = self.db.lock()?;
        Ok(notify::Notifier::new(&db)
            .list_for_user(&user_id)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub fn unread_notification_count(&self, user_id: String) -> Result<u32, MedtourError> {
        let db = self.db.lock()?;
        Ok(notify::Notifier::new(&db).unread_count(&user_id)?)
    }

    pub fn mark_notification_read(&self, notification_id: String) -> Result<bool, MedtourError> {
        let db = self.db.lock()?;
        Ok(notify::Notifier::new(&db).mark_read(&notification_id)?)
    }

    pub fn mark_all_notifications_read(&self, user_id: String) -> Result<u32, MedtourError> {
        let db = self.db.lock()?;
        Ok(notify::Notifier::new(&db).mark_all_read(&user_id)?)
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    pub fn dashboard_stats(&self, user_id: String) -> Result<FfiDashboardStats, MedtourError> {
        let db = self.db.lock()?;
        let snapshot = db.snapshot()?;
        let user = snapshot
            .user(&user_id)
            .ok_or_else(|| MedtourError::NotFound(user_id.clone()))?;
        let stats = stats::DashboardStats::compute(stats::cases_for(user, &snapshot));
        Ok(stats.into())
    }

    pub fn search_cases(&self, user_id: String, query: String) -> Result<Vec<FfiCase>, MedtourError> {
        let db = self.db.lock()?;
        let snapshot = db.snapshot()?;
        let user = snapshot
            .user(&user_id)
            .ok_or_else(|| MedtourError::NotFound(user_id.clone()))?;
        let visible = stats::cases_for(user, &snapshot);
        Ok(stats::search_cases(&visible, &query)
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    // =========================================================================
    // Audit Ledger & Exports
    // =========================================================================

    pub fn ledger_stats(&self) -> Result<FfiLedgerStats, MedtourError> {
        let db = self.db.lock()?;
        Ok(AuditLedger::new(&db).stats()?.into())
    }

    pub fn export_payments_json(&self) -> Result<String, MedtourError> {
        let db = self.db.lock()?;
        Ok(export::PaymentExporter::new(&db).export_all()?.to_json()?)
    }

    pub fn export_payments_csv(&self) -> Result<String, MedtourError> {
        let db = self.db.lock()?;
        Ok(export::PaymentExporter::new(&db).export_all()?.to_csv())
    }

    /// Status history and activity for one case with inclusion proofs.
    pub fn export_case_audit_json(&self, case_id: String) -> Result<Option<String>, MedtourError> {
        let db = self.db.lock()?;
        export::AuditTrailExporter::new(&db)
            .export_case(&case_id)?
            .map(|trail| trail.to_json().map_err(MedtourError::from))
            .transpose()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe acting identity.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiActor {
    pub id: String,
    pub name: String,
    pub role: String,
}

impl TryFrom<FfiActor> for Actor {
    type Error = MedtourError;

    fn try_from(actor: FfiActor) -> Result<Self, Self::Error> {
        Ok(Actor::new(actor.id, actor.name, parse_role(&actor.role)?))
    }
}

/// FFI-safe case creation request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewCase {
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub passport_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub medical_condition: Option<String>,
    pub priority: Option<String>,
    pub client_user_id: Option<String>,
    pub assigned_university: Option<String>,
}

impl TryFrom<FfiNewCase> for NewCase {
    type Error = MedtourError;

    fn try_from(data: FfiNewCase) -> Result<Self, Self::Error> {
        let priority = match data.priority.as_deref() {
            Some(raw) => Priority::from_str_opt(raw)
                .ok_or_else(|| MedtourError::InvalidInput(format!("Unknown priority: {}", raw)))?,
            None => Priority::Medium,
        };
        Ok(NewCase {
            client_info: ClientInfo {
                full_name: data.full_name,
                date_of_birth: data.date_of_birth,
                gender: data.gender,
                nationality: data.nationality,
                passport_number: data.passport_number,
                email: data.email,
                phone: data.phone,
                address: None,
                medical_condition: data.medical_condition,
            },
            attender_info: None,
            priority,
            client_user_id: data.client_user_id,
            assigned_university: data.assigned_university,
        })
    }
}

/// FFI-safe case view. `detail_json` carries the full record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCase {
    pub id: String,
    pub status: String,
    pub status_label: String,
    pub status_tone: String,
    pub progress_percent: u8,
    pub priority: String,
    pub patient_name: String,
    pub created_by: String,
    pub client_user_id: Option<String>,
    pub assigned_hospital: Option<String>,
    pub document_count: u32,
    pub payment_count: u32,
    pub comment_count: u32,
    pub history_count: u32,
    pub activity_count: u32,
    pub created_at: String,
    pub updated_at: String,
    pub detail_json: String,
}

impl From<Case> for FfiCase {
    fn from(case: Case) -> Self {
        Self {
            detail_json: serde_json::to_string(&case).unwrap_or_default(),
            id: case.id.clone(),
            status: case.status.as_str().to_string(),
            status_label: case.status_label().to_string(),
            status_tone: case.status.tone().as_str().to_string(),
            progress_percent: case.status.progress_percent(),
            priority: case.priority.as_str().to_string(),
            patient_name: case.patient_name().to_string(),
            created_by: case.created_by.clone(),
            client_user_id: case.client_user_id.clone(),
            assigned_hospital: case.assigned_hospital.clone(),
            document_count: case.documents.len() as u32,
            payment_count: case.payments.len() as u32,
            comment_count: case.comments.len() as u32,
            history_count: case.status_history.len() as u32,
            activity_count: case.activity_log.len() as u32,
            created_at: case.created_at,
            updated_at: case.updated_at,
        }
    }
}

/// FFI-safe document upload.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewDocument {
    pub doc_type: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub extracted_text: Option<String>,
}

impl TryFrom<FfiNewDocument> for NewDocument {
    type Error = MedtourError;

    fn try_from(doc: FfiNewDocument) -> Result<Self, Self::Error> {
        Ok(NewDocument {
            doc_type: parse_document_type(&doc.doc_type)?,
            name: doc.name,
            size: doc.size,
            mime_type: doc.mime_type,
            extracted_text: doc.extracted_text,
        })
    }
}

/// FFI-safe payment entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPayment {
    pub payment_type: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub method: String,
    pub reference: String,
    pub date: String,
    pub processed_by: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<FfiNewPayment> for NewPayment {
    type Error = MedtourError;

    fn try_from(p: FfiNewPayment) -> Result<Self, Self::Error> {
        let payment_type = PaymentType::from_str_opt(&p.payment_type).ok_or_else(|| {
            MedtourError::InvalidInput(format!("Unknown payment type: {}", p.payment_type))
        })?;
        let status = PaymentStatus::from_str_opt(&p.status)
            .ok_or_else(|| MedtourError::InvalidInput(format!("Unknown payment status: {}", p.status)))?;
        Ok(NewPayment {
            payment_type,
            amount: p.amount,
            currency: p.currency,
            status,
            method: p.method,
            reference: p.reference,
            date: p.date,
            processed_by: p.processed_by,
            notes: p.notes,
        })
    }
}

/// FFI-safe hospital creation request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewHospital {
    pub name: String,
    pub location: String,
    pub bed_capacity: u32,
    pub specialties: Vec<String>,
    pub accreditation: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<FfiNewHospital> for NewHospital {
    fn from(h: FfiNewHospital) -> Self {
        NewHospital {
            name: h.name,
            location: h.location,
            bed_capacity: h.bed_capacity,
            specialties: h.specialties,
            accreditation: h.accreditation,
            contact: HospitalContact {
                contact_person: h.contact_person,
                email: h.email,
                phone: h.phone,
            },
        }
    }
}

/// FFI-safe hospital.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHospital {
    pub id: String,
    pub name: String,
    pub location: String,
    pub bed_capacity: u32,
    pub available_beds: u32,
    pub specialties: Vec<String>,
    pub accreditation: Option<String>,
}

impl From<models::Hospital> for FfiHospital {
    fn from(h: models::Hospital) -> Self {
        Self {
            id: h.id,
            name: h.name,
            location: h.location,
            bed_capacity: h.bed_capacity,
            available_beds: h.available_beds,
            specialties: h.specialties,
            accreditation: h.accreditation,
        }
    }
}

/// FFI-safe account creation request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewUser {
    pub username: String,
    pub password: String,
    pub role: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hospital_ids: Vec<String>,
}

impl TryFrom<FfiNewUser> for models::NewUser {
    type Error = MedtourError;

    fn try_from(u: FfiNewUser) -> Result<Self, Self::Error> {
        Ok(models::NewUser {
            role: parse_role(&u.role)?,
            username: u.username,
            password: u.password,
            full_name: u.full_name,
            email: u.email,
            phone: u.phone,
            hospital_ids: u.hospital_ids,
        })
    }
}

/// FFI-safe user. Never carries the credential.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUser {
    pub id: String,
    pub username: String,
    pub role: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub must_change_password: bool,
    pub hospital_ids: Vec<String>,
}

impl From<User> for FfiUser {
    fn from(u: User) -> Self {
        Self {
            must_change_password: u.must_change_password(),
            id: u.id,
            username: u.username,
            role: u.role.as_str().to_string(),
            full_name: u.full_name,
            email: u.email,
            phone: u.phone,
            hospital_ids: u.hospital_ids,
        }
    }
}

/// FFI-safe notification.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub read: bool,
    pub created_at: String,
    pub link: Option<String>,
    pub case_id: Option<String>,
}

impl From<Notification> for FfiNotification {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            title: n.title,
            message: n.message,
            kind: n.kind.as_str().to_string(),
            read: n.read,
            created_at: n.created_at,
            link: n.link,
            case_id: n.case_id,
        }
    }
}

/// FFI-safe amount per currency.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCurrencyTotal {
    pub currency: String,
    pub amount: f64,
}

/// FFI-safe count per key (status or tone).
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCount {
    pub key: String,
    pub count: u32,
}

/// FFI-safe dashboard counters.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboardStats {
    pub total: u32,
    pub active: u32,
    pub closed: u32,
    pub urgent: u32,
    pub high_priority: u32,
    pub by_tone: Vec<FfiCount>,
    pub by_status: Vec<FfiCount>,
    pub pending_payments: Vec<FfiCurrencyTotal>,
    pub completed_payments: Vec<FfiCurrencyTotal>,
}

impl From<stats::DashboardStats> for FfiDashboardStats {
    fn from(s: stats::DashboardStats) -> Self {
        let totals = |map: std::collections::BTreeMap<String, f64>| {
            map.into_iter()
                .map(|(currency, amount)| FfiCurrencyTotal { currency, amount })
                .collect()
        };
        Self {
            active: s.active(),
            total: s.total,
            closed: s.closed,
            urgent: s.urgent,
            high_priority: s.high_priority,
            by_tone: s
                .by_tone
                .into_iter()
                .map(|(tone, count)| FfiCount {
                    key: tone.as_str().to_string(),
                    count,
                })
                .collect(),
            by_status: s
                .by_status
                .into_iter()
                .map(|(key, count)| FfiCount { key, count })
                .collect(),
            pending_payments: totals(s.pending_payments),
            completed_payments: totals(s.completed_payments),
        }
    }
}

/// FFI-safe ledger statistics.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLedgerStats {
    pub root_hash: Option<String>,
    pub height: u32,
    pub leaf_count: u32,
}

impl From<LedgerStats> for FfiLedgerStats {
    fn from(stats: LedgerStats) -> Self {
        Self {
            root_hash: stats.root_hash,
            height: stats.height,
            leaf_count: stats.leaf_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> FfiActor {
        FfiActor {
            id: "agent_1".into(),
            name: "Alice Agent".into(),
            role: "agent".into(),
        }
    }

    fn new_case(name: &str) -> FfiNewCase {
        FfiNewCase {
            full_name: name.into(),
            date_of_birth: None,
            gender: None,
            nationality: Some("Kenya".into()),
            passport_number: None,
            email: None,
            phone: None,
            medical_condition: Some("Cardiac".into()),
            priority: Some("high".into()),
            client_user_id: None,
            assigned_university: None,
        }
    }

    #[test]
    fn test_case_round_trip_through_facade() {
        let core = open_database_in_memory().unwrap();
        let created = core.create_case(new_case("Jane Doe"), agent()).unwrap();

        assert_eq!(created.status, "new");
        assert_eq!(created.priority, "high");
        assert_eq!(created.history_count, 1);

        let updated = core
            .update_status(created.id.clone(), "case_agent_review".into(), None, agent())
            .unwrap()
            .unwrap();
        assert_eq!(updated.activity_count, 2);

        let full: Case = serde_json::from_str(&updated.detail_json).unwrap();
        assert_eq!(full.status, CaseStatus::CaseAgentReview);
        assert_eq!(core.ledger_stats().unwrap().leaf_count, 2);
    }

    #[test]
    fn test_bad_input_is_rejected() {
        let core = open_database_in_memory().unwrap();
        let mut actor = agent();
        actor.role = "pilot".into();
        assert!(matches!(
            core.create_case(new_case("Jane Doe"), actor),
            Err(MedtourError::InvalidInput(_))
        ));

        let case = core.create_case(new_case("Jane Doe"), agent()).unwrap();
        let payment = FfiNewPayment {
            payment_type: "visa".into(),
            amount: 0.0,
            currency: "USD".into(),
            status: "pending".into(),
            method: "bank".into(),
            reference: "TX".into(),
            date: "2024-01-01".into(),
            processed_by: None,
            notes: None,
        };
        assert!(matches!(
            core.add_payment(case.id.clone(), payment, agent()),
            Err(MedtourError::InvalidInput(_))
        ));
        assert!(matches!(
            core.reject_case(case.id, agent(), "".into()),
            Err(MedtourError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_registry_conflicts_surface() {
        let core = open_database_in_memory().unwrap();
        let hospital = core
            .create_hospital(FfiNewHospital {
                name: "Apollo".into(),
                location: "Chennai".into(),
                bed_capacity: 50,
                specialties: vec!["cardiology".into()],
                accreditation: Some("JCI".into()),
                contact_person: None,
                email: None,
                phone: None,
            })
            .unwrap();
        let case = core.create_case(new_case("Jane Doe"), agent()).unwrap();
        core.assign_hospital(case.id, hospital.id.clone(), agent())
            .unwrap();

        let err = core.delete_hospital(hospital.id).unwrap_err();
        assert!(matches!(err, MedtourError::Conflict(ref m) if m.contains("1 assigned case")));
    }

    #[test]
    fn test_auto_reply_delay_does_not_hold_the_store() {
        use std::time::{Duration, Instant};

        let config = EngineConfig {
            auto_reply_delay: Duration::from_millis(600),
            ..Default::default()
        };
        let core = MedtourCore::wrap(Database::open_in_memory().unwrap(), config);
        let mut data = new_case("Jane Doe");
        data.client_user_id = Some("client_1".into());
        let case = core.create_case(data, agent()).unwrap();

        let client = FfiActor {
            id: "client_1".into(),
            name: "Jane Doe".into(),
            role: "client".into(),
        };
        let commenter = {
            let core = Arc::clone(&core);
            let case_id = case.id.clone();
            std::thread::spawn(move || {
                let started = Instant::now();
                let updated = core
                    .add_comment(case_id, "Any update on my case?".into(), true, client)
                    .unwrap()
                    .unwrap();
                (updated, started.elapsed())
            })
        };

        std::thread::sleep(Duration::from_millis(100));
        let started = Instant::now();
        core.list_hospitals().unwrap();
        let waited = started.elapsed();

        let (updated, comment_took) = commenter.join().unwrap();
        assert!(waited < Duration::from_millis(300), "reader waited {:?}", waited);
        assert!(comment_took >= Duration::from_millis(600));
        assert_eq!(updated.comment_count, 2);

        // Reply is posted under the system persona
        let full: Case = serde_json::from_str(&updated.detail_json).unwrap();
        assert_eq!(full.comments[1].author_id, "system");
    }

    #[test]
    fn test_case_document_choices_skip_uploads() {
        let core = open_database_in_memory().unwrap();
        let case = core.create_case(new_case("Jane Doe"), agent()).unwrap();

        let before = core
            .allowed_document_types_for_case(case.id.clone(), "agent".into())
            .unwrap();
        assert_eq!(before.len(), 7);

        core.add_document(
            case.id.clone(),
            FfiNewDocument {
                doc_type: "passport".into(),
                name: "passport.pdf".into(),
                size: 1024,
                mime_type: "application/pdf".into(),
                extracted_text: None,
            },
            agent(),
        )
        .unwrap();

        let after = core
            .allowed_document_types_for_case(case.id, "agent".into())
            .unwrap();
        assert_eq!(after.len(), 6);
        assert!(!after.contains(&"passport".to_string()));
        assert!(matches!(
            core.allowed_document_types_for_case("case_missing".into(), "agent".into()),
            Err(MedtourError::NotFound(_))
        ));
    }

    #[test]
    fn test_stateless_helpers() {
        assert_eq!(label_for_status("mystery".into(), false), "mystery");
        assert_eq!(tone_for_status("mystery".into()), "neutral");
        assert_eq!(flow_order("new".into()), 0);
        assert_eq!(flow_order("case_rejected".into()), -1);
        assert!(allowed_document_types("client".into(), "new".into(), vec![])
            .unwrap()
            .is_empty());
        assert_eq!(
            required_document_types("agent".into(), "new".into()).unwrap().len(),
            7
        );
        assert!(!auto_reply("new".into(), "thanks".into()).is_empty());
        assert_eq!(
            suggested_next_statuses("agent".into(), "new".into()).unwrap(),
            vec!["case_agent_review".to_string()]
        );
        assert!(suggested_next_statuses("client".into(), "new".into())
            .unwrap()
            .is_empty());
    }
}
