//! The case aggregate and its append-only audit trails.

use serde::{Deserialize, Serialize};

use super::document::Document;
use super::payment::PaymentRecord;
use super::status::CaseStatus;
use super::user::{Actor, Role};
use super::{new_id, timestamp_now};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

/// Patient identity and contact details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientInfo {
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub passport_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Condition the patient is travelling for
    pub medical_condition: Option<String>,
}

/// Guardian / companion travelling with the patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AttenderInfo {
    pub full_name: String,
    pub relationship: Option<String>,
    pub passport_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Hospital's proposed treatment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreatmentPlan {
    pub summary: String,
    pub doctor_name: Option<String>,
    pub estimated_cost: Option<f64>,
    pub currency: Option<String>,
    pub estimated_duration_days: Option<u32>,
    pub approved_by_client: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisaStatus {
    #[default]
    NotStarted,
    DocumentsPending,
    Applied,
    Approved,
    Rejected,
}

/// Medical visa progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VisaInfo {
    pub status: VisaStatus,
    pub application_number: Option<String>,
    pub applied_at: Option<String>,
    pub approved_at: Option<String>,
    pub expiry_date: Option<String>,
    pub rejection_reason: Option<String>,
}

/// One status change. Never edited once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusHistoryEntry {
    pub status: CaseStatus,
    pub timestamp: String,
    pub changed_by: String,
    pub changed_by_name: String,
    pub note: Option<String>,
}

impl StatusHistoryEntry {
    pub fn new(status: CaseStatus, actor: &Actor, note: Option<String>) -> Self {
        Self {
            status,
            timestamp: timestamp_now(),
            changed_by: actor.id.clone(),
            changed_by_name: actor.name.clone(),
            note,
        }
    }
}

/// One state-affecting action. Never edited once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityLogEntry {
    /// Unique entry ID (`log_` prefix)
    pub id: String,
    pub case_id: String,
    pub actor_id: String,
    pub actor_name: String,
    pub actor_role: Role,
    /// Short action label (e.g., "Status Updated")
    pub action: String,
    pub details: String,
    pub timestamp: String,
}

impl ActivityLogEntry {
    pub fn new(case_id: &str, actor: &Actor, action: &str, details: String) -> Self {
        Self {
            id: new_id("log"),
            case_id: case_id.to_string(),
            actor_id: actor.id.clone(),
            actor_name: actor.name.clone(),
            actor_role: actor.role,
            action: action.to_string(),
            details,
            timestamp: timestamp_now(),
        }
    }

    /// Serialize for ledger hashing.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A message on the case conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    /// Unique comment ID (`comment_` prefix)
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_role: Role,
    pub message: String,
    pub timestamp: String,
    /// Client quick-reply that triggers an automated answer
    #[serde(default)]
    pub is_preset: bool,
}

impl Comment {
    pub fn new(actor: &Actor, message: String, is_preset: bool) -> Self {
        Self {
            id: new_id("comment"),
            author_id: actor.id.clone(),
            author_name: actor.name.clone(),
            author_role: actor.role,
            message,
            timestamp: timestamp_now(),
            is_preset,
        }
    }
}

/// One patient's coordination record from intake to closure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    /// Unique case ID (`case_` prefix)
    pub id: String,
    pub status: CaseStatus,
    pub priority: Priority,
    pub client_info: ClientInfo,
    pub attender_info: Option<AttenderInfo>,
    /// Agent who opened the case
    pub created_by: String,
    /// Client account the case belongs to
    pub client_user_id: Option<String>,
    pub assigned_hospital: Option<String>,
    /// Set when the case is routed to a university instead of a hospital
    pub assigned_university: Option<String>,
    pub treatment_plan: Option<TreatmentPlan>,
    pub visa: VisaInfo,
    pub documents: Vec<Document>,
    pub payments: Vec<PaymentRecord>,
    pub comments: Vec<Comment>,
    pub status_history: Vec<StatusHistoryEntry>,
    pub activity_log: Vec<ActivityLogEntry>,
    pub created_at: String,
    pub updated_at: String,
}

/// Details supplied when opening a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NewCase {
    pub client_info: ClientInfo,
    #[serde(default)]
    pub attender_info: Option<AttenderInfo>,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub client_user_id: Option<String>,
    #[serde(default)]
    pub assigned_university: Option<String>,
}

fn default_priority() -> Priority {
    Priority::Medium
}

impl NewCase {
    pub fn for_patient(full_name: impl Into<String>) -> Self {
        Self {
            client_info: ClientInfo {
                full_name: full_name.into(),
                ..Default::default()
            },
            attender_info: None,
            priority: default_priority(),
            client_user_id: None,
            assigned_university: None,
        }
    }
}

impl Case {
    /// Open a new case in `new` status with its first history and log entries.
    pub fn open(data: NewCase, actor: &Actor) -> Self {
        let id = new_id("case");
        let now = timestamp_now();
        let created = ActivityLogEntry::new(
            &id,
            actor,
            "Case Created",
            format!("Case created for {}", data.client_info.full_name),
        );

        Self {
            id,
            status: CaseStatus::New,
            priority: data.priority,
            client_info: data.client_info,
            attender_info: data.attender_info,
            created_by: actor.id.clone(),
            client_user_id: data.client_user_id,
            assigned_hospital: None,
            assigned_university: data.assigned_university,
            treatment_plan: None,
            visa: VisaInfo::default(),
            documents: Vec::new(),
            payments: Vec::new(),
            comments: Vec::new(),
            status_history: vec![StatusHistoryEntry::new(
                CaseStatus::New,
                actor,
                Some("Case created".into()),
            )],
            activity_log: vec![created],
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Label for the current status, honouring university routing.
    pub fn status_label(&self) -> &'static str {
        self.status.label(self.assigned_university.is_some())
    }

    pub fn patient_name(&self) -> &str {
        &self.client_info.full_name
    }

    pub fn uploaded_types(&self) -> Vec<super::DocumentType> {
        self.documents.iter().map(|d| d.doc_type).collect()
    }

    /// Append a log entry and return a copy of it.
    pub fn log(&mut self, actor: &Actor, action: &str, details: String) -> ActivityLogEntry {
        let entry = ActivityLogEntry::new(&self.id, actor, action, details);
        self.activity_log.push(entry.clone());
        entry
    }

    /// Set a new status and record it in the history.
    pub fn record_status(&mut self, status: CaseStatus, actor: &Actor, note: Option<String>) {
        self.status_history
            .push(StatusHistoryEntry::new(status, actor, note));
        self.status = status;
    }

    /// Bump the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = timestamp_now();
    }
}

/// Typed partial update for [`crate::workflow::WorkflowEngine::update_case_data`].
///
/// Audit entries can only be appended, never replaced. Documents, payments,
/// comments and hospital assignment have their own operations and are not
/// patchable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CasePatch {
    #[serde(default)]
    pub status: Option<CaseStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
    #[serde(default)]
    pub attender_info: Option<AttenderInfo>,
    #[serde(default)]
    pub client_user_id: Option<String>,
    #[serde(default)]
    pub assigned_university: Option<String>,
    #[serde(default)]
    pub treatment_plan: Option<TreatmentPlan>,
    #[serde(default)]
    pub visa: Option<VisaInfo>,
    #[serde(default)]
    pub append_status_history: Vec<StatusHistoryEntry>,
    #[serde(default)]
    pub append_activity: Vec<ActivityLogEntry>,
}

impl CasePatch {
    /// Merge set fields into the case. Returns the appended log entries.
    pub fn apply(self, case: &mut Case) -> Vec<ActivityLogEntry> {
        if let Some(status) = self.status {
            case.status = status;
        }
        if let Some(priority) = self.priority {
            case.priority = priority;
        }
        if let Some(client_info) = self.client_info {
            case.client_info = client_info;
        }
        if self.attender_info.is_some() {
            case.attender_info = self.attender_info;
        }
        if self.client_user_id.is_some() {
            case.client_user_id = self.client_user_id;
        }
        if self.assigned_university.is_some() {
            case.assigned_university = self.assigned_university;
        }
        if self.treatment_plan.is_some() {
            case.treatment_plan = self.treatment_plan;
        }
        if let Some(visa) = self.visa {
            case.visa = visa;
        }
        case.status_history.extend(self.append_status_history);
        case.activity_log.extend(self.append_activity.iter().cloned());
        self.append_activity
    }
}
