use crate::audit::AuditLedger;
use crate::config::EngineConfig;
use crate::db::{Database, DbError};
use crate::models::{
    format_amount, new_id, timestamp_now, ActivityLogEntry, Actor, Case, CasePatch, CaseStatus,
    Comment, Document, NewCase, NewDocument, NewPayment, PaymentPatch, PaymentRecord, Role,
    StatusHistoryEntry,
};
use crate::notify::Notifier;

use super::{WorkflowError, WorkflowResult};

/// What a mutation changed, beyond the case row itself.
#[derive(Default)]
struct Mutation {
    entries: Vec<ActivityLogEntry>,
    notice: Option<Notice>,
}

impl Mutation {
    fn logged(entry: ActivityLogEntry) -> Self {
        Self {
            entries: vec![entry],
            notice: None,
        }
    }
}

enum Notice {
    StatusChanged { previous: CaseStatus, actor: Actor },
    HospitalAssigned { hospital_id: String, actor: Actor },
}

pub struct WorkflowEngine<'a> {
    db: &'a Database,
    config: EngineConfig,
}

impl<'a> WorkflowEngine<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self::with_config(db, EngineConfig::default())
    }

    pub fn with_config(db: &'a Database, config: EngineConfig) -> Self {
        Self { db, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open a case in `new` status.
    pub fn create_case(&self, data: NewCase, actor: &Actor) -> WorkflowResult<Case> {
        let case = Case::open(data, actor);

        let tx = self.db.begin()?;
        self.db.insert_case(&case)?;
        let ledger = AuditLedger::new(self.db);
        for entry in &case.activity_log {
            ledger.commit_entry(entry)?;
        }
        tx.commit().map_err(DbError::from)?;

        tracing::info!(case_id = %case.id, actor = %actor.id, "case created");
        Ok(case)
    }

    pub fn get_case(&self, case_id: &str) -> WorkflowResult<Option<Case>> {
        Ok(self.db.get_case(case_id)?)
    }

    pub fn list_cases(&self) -> WorkflowResult<Vec<Case>> {
        Ok(self.db.list_cases()?)
    }

    /// Move a case to `status`. Any status may follow any other.
    pub fn update_status(
        &self,
        case_id: &str,
        status: CaseStatus,
        note: Option<String>,
        actor: &Actor,
    ) -> WorkflowResult<Option<Case>> {
        self.mutate(case_id, "update_status", |case| {
            let previous = case.status;
            let university = case.assigned_university.is_some();
            let note = note.filter(|n| !n.is_empty());
            let mut details = format!(
                "{} → {}",
                previous.label(university),
                status.label(university)
            );
            if let Some(note) = note.as_deref() {
                details.push_str(": ");
                details.push_str(note);
            }

            case.record_status(status, actor, note);
            let entry = case.log(actor, "Status Updated", details);
            tracing::info!(case_id = %case.id, from = %previous, to = %status, "status updated");

            Ok(Some(Mutation {
                entries: vec![entry],
                notice: Some(Notice::StatusChanged {
                    previous,
                    actor: actor.clone(),
                }),
            }))
        })
    }

    /// Merge a typed patch. Writes no activity entry of its own; entries the
    /// patch appends are still committed to the audit ledger. Appended
    /// activity must belong to this case and appended history must not
    /// predate the existing history.
    pub fn update_case_data(&self, case_id: &str, patch: CasePatch) -> WorkflowResult<Option<Case>> {
        self.mutate(case_id, "update_case_data", |case| {
            if let Some(entry) = patch.append_activity.iter().find(|e| e.case_id != case.id) {
                return Err(WorkflowError::Validation(format!(
                    "Activity entry {} belongs to case {}",
                    entry.id, entry.case_id
                )));
            }
            let mut latest = case.status_history.last().map(|h| h.timestamp.clone());
            for entry in &patch.append_status_history {
                if latest.as_deref().is_some_and(|t| entry.timestamp.as_str() < t) {
                    return Err(WorkflowError::Validation(format!(
                        "Status history entry at {} predates the case history",
                        entry.timestamp
                    )));
                }
                latest = Some(entry.timestamp.clone());
            }

            let entries = patch.apply(case);
            Ok(Some(Mutation {
                entries,
                notice: None,
            }))
        })
    }

    /// [`WorkflowEngine::update_case_data`] from a JSON patch. Unknown
    /// fields are rejected.
    pub fn update_case_data_json(&self, case_id: &str, patch_json: &str) -> WorkflowResult<Option<Case>> {
        let patch: CasePatch = serde_json::from_str(patch_json)
            .map_err(|e| WorkflowError::Validation(format!("Invalid case patch: {}", e)))?;
        self.update_case_data(case_id, patch)
    }

    pub fn add_document(
        &self,
        case_id: &str,
        upload: NewDocument,
        actor: &Actor,
    ) -> WorkflowResult<Option<Case>> {
        self.mutate(case_id, "add_document", |case| {
            let document = Document {
                id: new_id("doc"),
                doc_type: upload.doc_type,
                name: upload.name,
                uploaded_by: actor.id.clone(),
                uploaded_by_name: actor.name.clone(),
                uploaded_at: timestamp_now(),
                size: upload.size,
                mime_type: upload.mime_type,
                extracted_text: upload.extracted_text,
            };
            let details = format!("{} ({})", document.name, document.doc_type);
            case.documents.push(document);
            Ok(Some(Mutation::logged(case.log(actor, "Document Uploaded", details))))
        })
    }

    pub fn remove_document(
        &self,
        case_id: &str,
        document_id: &str,
        actor: &Actor,
    ) -> WorkflowResult<Option<Case>> {
        self.mutate(case_id, "remove_document", |case| {
            let Some(index) = case.documents.iter().position(|d| d.id == document_id) else {
                tracing::warn!(case_id = %case.id, document_id, "remove_document on unknown document");
                return Ok(None);
            };
            let removed = case.documents.remove(index);
            let details = format!("{} ({})", removed.name, removed.doc_type);
            Ok(Some(Mutation::logged(case.log(actor, "Document Removed", details))))
        })
    }

    /// Post a message on the case thread. A preset quick reply from a client
    /// is answered straight away; callers that want the configured delay use
    /// [`WorkflowEngine::post_comment`] and [`WorkflowEngine::post_auto_reply`].
    pub fn add_comment(
        &self,
        case_id: &str,
        message: &str,
        is_preset: bool,
        actor: &Actor,
    ) -> WorkflowResult<Option<Case>> {
        let updated = self.post_comment(case_id, message, is_preset, actor)?;
        if updated.is_none() || !Self::wants_auto_reply(is_preset, actor) {
            return Ok(updated);
        }
        self.post_auto_reply(case_id, message)
    }

    /// Append a comment only. No log entry.
    pub fn post_comment(
        &self,
        case_id: &str,
        message: &str,
        is_preset: bool,
        actor: &Actor,
    ) -> WorkflowResult<Option<Case>> {
        self.mutate(case_id, "add_comment", |case| {
            case.comments
                .push(Comment::new(actor, message.to_string(), is_preset));
            Ok(Some(Mutation::default()))
        })
    }

    /// Whether a comment gets an automated answer.
    pub fn wants_auto_reply(is_preset: bool, actor: &Actor) -> bool {
        is_preset && actor.role == Role::Client
    }

    /// Answer `message` as the system persona, picking the reply for the
    /// case's current status.
    pub fn post_auto_reply(&self, case_id: &str, message: &str) -> WorkflowResult<Option<Case>> {
        let persona = &self.config.system_persona;
        self.mutate(case_id, "auto_reply", |case| {
            let reply = medtour_assist::respond(case.status.as_str(), message);
            case.comments
                .push(Comment::new(persona, reply.to_string(), false));
            Ok(Some(Mutation::default()))
        })
    }

    /// Hand a case to a hospital and move it to `assigned_to_hospital`.
    pub fn assign_hospital(
        &self,
        case_id: &str,
        hospital_id: &str,
        actor: &Actor,
    ) -> WorkflowResult<Option<Case>> {
        let hospital_name = self
            .db
            .get_hospital(hospital_id)?
            .map(|h| h.name)
            .unwrap_or_else(|| hospital_id.to_string());

        self.mutate(case_id, "assign_hospital", |case| {
            case.assigned_hospital = Some(hospital_id.to_string());
            case.record_status(
                CaseStatus::AssignedToHospital,
                actor,
                Some(format!("Assigned to {}", hospital_name)),
            );
            let entry = case.log(
                actor,
                "Hospital Assigned",
                format!("Case assigned to {}", hospital_name),
            );
            tracing::info!(case_id = %case.id, hospital_id, "hospital assigned");

            Ok(Some(Mutation {
                entries: vec![entry],
                notice: Some(Notice::HospitalAssigned {
                    hospital_id: hospital_id.to_string(),
                    actor: actor.clone(),
                }),
            }))
        })
    }

    pub fn add_payment(
        &self,
        case_id: &str,
        payment: NewPayment,
        actor: &Actor,
    ) -> WorkflowResult<Option<Case>> {
        self.mutate(case_id, "add_payment", |case| {
            let record = payment.into_record(new_id("payment"));
            let details = payment_details(&record);
            case.payments.push(record);
            Ok(Some(Mutation::logged(case.log(actor, "Payment Added", details))))
        })
    }

    pub fn update_payment(
        &self,
        case_id: &str,
        payment_id: &str,
        patch: PaymentPatch,
        actor: &Actor,
    ) -> WorkflowResult<Option<Case>> {
        self.mutate(case_id, "update_payment", |case| {
            let Some(record) = case.payments.iter_mut().find(|p| p.id == payment_id) else {
                tracing::warn!(case_id = %case.id, payment_id, "update_payment on unknown payment");
                return Ok(None);
            };
            patch.apply(record);
            let details = payment_details(record);
            Ok(Some(Mutation::logged(case.log(actor, "Payment Updated", details))))
        })
    }

    pub fn delete_payment(
        &self,
        case_id: &str,
        payment_id: &str,
        actor: &Actor,
    ) -> WorkflowResult<Option<Case>> {
        self.mutate(case_id, "delete_payment", |case| {
            let Some(index) = case.payments.iter().position(|p| p.id == payment_id) else {
                tracing::warn!(case_id = %case.id, payment_id, "delete_payment on unknown payment");
                return Ok(None);
            };
            let removed = case.payments.remove(index);
            let details = payment_details(&removed);
            Ok(Some(Mutation::logged(case.log(actor, "Payment Deleted", details))))
        })
    }

    /// Hospital accepts the case.
    pub fn accept_case(
        &self,
        case_id: &str,
        actor: &Actor,
        note: Option<String>,
    ) -> WorkflowResult<Option<Case>> {
        let details = match note.as_deref().filter(|n| !n.is_empty()) {
            Some(note) => format!("Case accepted: {}", note),
            None => "Case accepted".to_string(),
        };
        let patch = CasePatch {
            status: Some(CaseStatus::CaseAccepted),
            append_status_history: vec![StatusHistoryEntry::new(
                CaseStatus::CaseAccepted,
                actor,
                note,
            )],
            append_activity: vec![ActivityLogEntry::new(case_id, actor, "Case Accepted", details)],
            ..Default::default()
        };
        self.update_case_data(case_id, patch)
    }

    /// Hospital declines the case. A reason is required.
    pub fn reject_case(&self, case_id: &str, actor: &Actor, reason: &str) -> WorkflowResult<Option<Case>> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::Validation(
                "A reason is required to reject a case".into(),
            ));
        }

        let patch = CasePatch {
            status: Some(CaseStatus::CaseRejected),
            append_status_history: vec![StatusHistoryEntry::new(
                CaseStatus::CaseRejected,
                actor,
                Some(reason.to_string()),
            )],
            append_activity: vec![ActivityLogEntry::new(
                case_id,
                actor,
                "Case Rejected",
                format!("Case rejected: {}", reason),
            )],
            ..Default::default()
        };
        self.update_case_data(case_id, patch)
    }

    /// Load, change and persist one case atomically. `change` returning
    /// `Ok(None)` leaves the record untouched.
    fn mutate<F>(&self, case_id: &str, operation: &str, change: F) -> WorkflowResult<Option<Case>>
    where
        F: FnOnce(&mut Case) -> WorkflowResult<Option<Mutation>>,
    {
        let tx = self.db.begin()?;

        let Some(mut case) = self.db.get_case(case_id)? else {
            tracing::warn!(case_id, operation, "case not found");
            return Ok(None);
        };

        let Some(mutation) = change(&mut case)? else {
            return Ok(None);
        };
        case.touch();
        self.db.update_case(&case)?;

        let ledger = AuditLedger::new(self.db);
        for entry in &mutation.entries {
            ledger.commit_entry(entry)?;
        }

        let notifier = Notifier::new(self.db);
        match &mutation.notice {
            Some(Notice::StatusChanged { previous, actor }) => {
                notifier.status_changed(&case, *previous, actor)?;
            }
            Some(Notice::HospitalAssigned { hospital_id, actor }) => {
                notifier.hospital_assigned(&case, hospital_id, actor)?;
            }
            None => {}
        }

        tx.commit().map_err(DbError::from)?;
        Ok(Some(case))
    }
}

fn payment_details(record: &PaymentRecord) -> String {
    format!(
        "{} payment of {} ({})",
        record.payment_type.as_str(),
        format_amount(record.amount, &record.currency),
        record.status.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DocumentType, Hospital, PaymentStatus, PaymentType, Role, User,
    };

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn agent() -> Actor {
        Actor::new("agent_1", "Alice Agent", Role::Agent)
    }

    fn client() -> Actor {
        Actor::new("client_1", "Jane Doe", Role::Client)
    }

    fn hospital_user() -> Actor {
        Actor::new("hospital_user_1", "Dr. Rao", Role::Hospital)
    }

    fn new_payment(amount: f64) -> NewPayment {
        NewPayment {
            payment_type: PaymentType::Visa,
            amount,
            currency: "USD".into(),
            status: PaymentStatus::Pending,
            method: "bank".into(),
            reference: "TX1".into(),
            date: "2024-01-01".into(),
            processed_by: None,
            notes: None,
        }
    }

    fn open_case(engine: &WorkflowEngine<'_>) -> Case {
        let mut data = NewCase::for_patient("Jane Doe");
        data.client_user_id = Some("client_1".into());
        engine.create_case(data, &agent()).unwrap()
    }

    #[test]
    fn test_create_case_persists_and_commits() {
        let db = setup_db();
        let engine = WorkflowEngine::new(&db);

        let case = open_case(&engine);

        assert_eq!(engine.get_case(&case.id).unwrap().unwrap(), case);
        assert_eq!(AuditLedger::new(&db).stats().unwrap().leaf_count, 1);
    }

    #[test]
    fn test_update_status_records_everything() {
        let db = setup_db();
        let engine = WorkflowEngine::new(&db);
        let case = open_case(&engine);

        let updated = engine
            .update_status(&case.id, CaseStatus::CaseAgentReview, Some("docs ok".into()), &agent())
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, CaseStatus::CaseAgentReview);
        assert_eq!(updated.status_history.len(), 2);
        assert_eq!(updated.activity_log.len(), 2);
        let entry = &updated.activity_log[1];
        assert_eq!(entry.action, "Status Updated");
        assert_eq!(
            entry.details,
            format!(
                "{} → {}: docs ok",
                CaseStatus::New.label(false),
                CaseStatus::CaseAgentReview.label(false)
            )
        );
        assert!(updated.updated_at >= case.updated_at);

        // Agent acted, so only the client hears about it
        let notifier = Notifier::new(&db);
        assert_eq!(notifier.unread_count("client_1").unwrap(), 1);
        assert_eq!(notifier.unread_count("agent_1").unwrap(), 0);
        assert_eq!(AuditLedger::new(&db).stats().unwrap().leaf_count, 2);
    }

    #[test]
    fn test_missing_case_is_noop() {
        let db = setup_db();
        let engine = WorkflowEngine::new(&db);

        let result = engine
            .update_status("case_missing", CaseStatus::CaseClosed, None, &agent())
            .unwrap();
        assert!(result.is_none());
        assert!(engine
            .add_payment("case_missing", new_payment(10.0), &agent())
            .unwrap()
            .is_none());
        assert_eq!(AuditLedger::new(&db).stats().unwrap().leaf_count, 0);
    }

    #[test]
    fn test_documents_add_and_remove() {
        let db = setup_db();
        let engine = WorkflowEngine::new(&db);
        let case = open_case(&engine);

        let upload = NewDocument {
            doc_type: DocumentType::Passport,
            name: "passport.pdf".into(),
            size: 2048,
            mime_type: "application/pdf".into(),
            extracted_text: None,
        };
        let updated = engine.add_document(&case.id, upload, &agent()).unwrap().unwrap();
        assert_eq!(updated.documents.len(), 1);
        assert_eq!(updated.documents[0].uploaded_by, "agent_1");
        assert_eq!(updated.activity_log.last().unwrap().action, "Document Uploaded");

        // Unknown document id changes nothing
        assert!(engine.remove_document(&case.id, "doc_missing", &agent()).unwrap().is_none());
        assert_eq!(engine.get_case(&case.id).unwrap().unwrap().activity_log.len(), 2);

        let doc_id = updated.documents[0].id.clone();
        let updated = engine.remove_document(&case.id, &doc_id, &agent()).unwrap().unwrap();
        assert!(updated.documents.is_empty());
        assert_eq!(updated.activity_log.len(), 3);
        assert_eq!(updated.activity_log[2].action, "Document Removed");
    }

    #[test]
    fn test_client_preset_gets_auto_reply() {
        let db = setup_db();
        let engine = WorkflowEngine::new(&db);
        let case = open_case(&engine);

        let updated = engine
            .add_comment(&case.id, "Any update on my case?", true, &client())
            .unwrap()
            .unwrap();

        assert_eq!(updated.comments.len(), 2);
        let reply = &updated.comments[1];
        assert_eq!(reply.author_id, "system");
        assert_eq!(reply.author_name, "Care Coordinator");
        assert_eq!(
            reply.message,
            medtour_assist::respond("new", "Any update on my case?")
        );
        // Comments are not activity
        assert_eq!(updated.activity_log.len(), 1);
    }

    #[test]
    fn test_non_preset_or_staff_comment_has_no_reply() {
        let db = setup_db();
        let engine = WorkflowEngine::new(&db);
        let case = open_case(&engine);

        engine.add_comment(&case.id, "Free text", false, &client()).unwrap();
        let updated = engine
            .add_comment(&case.id, "Any update?", true, &agent())
            .unwrap()
            .unwrap();
        assert_eq!(updated.comments.len(), 2);
        assert!(updated.comments.iter().all(|c| c.author_id != "system"));
    }

    #[test]
    fn test_assign_hospital_notifies_affiliated_users() {
        let db = setup_db();
        let hospital = Hospital::new("Apollo".into(), "Chennai".into(), 100);
        db.insert_hospital(&hospital).unwrap();
        db.insert_user(&User {
            id: "hospital_user_1".into(),
            username: "apollo".into(),
            credential_hash: "x".into(),
            role: Role::Hospital,
            full_name: "Dr. Rao".into(),
            email: None,
            phone: None,
            password_changed: true,
            hospital_ids: vec![hospital.id.clone()],
            created_at: timestamp_now(),
        })
        .unwrap();

        let engine = WorkflowEngine::new(&db);
        let case = open_case(&engine);
        let updated = engine
            .assign_hospital(&case.id, &hospital.id, &agent())
            .unwrap()
            .unwrap();

        assert_eq!(updated.assigned_hospital.as_deref(), Some(hospital.id.as_str()));
        assert_eq!(updated.status, CaseStatus::AssignedToHospital);
        assert_eq!(updated.activity_log[1].details, "Case assigned to Apollo");

        let inbox = Notifier::new(&db).list_for_user("hospital_user_1").unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].case_id.as_deref(), Some(case.id.as_str()));
    }

    #[test]
    fn test_payment_lifecycle() {
        let db = setup_db();
        let engine = WorkflowEngine::new(&db);
        let case = open_case(&engine);

        let updated = engine.add_payment(&case.id, new_payment(500.0), &agent()).unwrap().unwrap();
        let payment_id = updated.payments[0].id.clone();
        assert!(payment_id.starts_with("payment_"));
        assert_eq!(updated.activity_log[1].details, "visa payment of 500.00 USD (pending)");

        let patch = PaymentPatch {
            status: Some(PaymentStatus::Completed),
            ..Default::default()
        };
        let updated = engine
            .update_payment(&case.id, &payment_id, patch.clone(), &agent())
            .unwrap()
            .unwrap();
        assert_eq!(updated.payments[0].status, PaymentStatus::Completed);
        assert_eq!(updated.status, CaseStatus::New);

        assert!(engine
            .update_payment(&case.id, "payment_missing", patch, &agent())
            .unwrap()
            .is_none());

        let updated = engine.delete_payment(&case.id, &payment_id, &agent()).unwrap().unwrap();
        assert!(updated.payments.is_empty());
        let actions: Vec<&str> = updated.activity_log.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(
            actions,
            vec!["Case Created", "Payment Added", "Payment Updated", "Payment Deleted"]
        );
    }

    #[test]
    fn test_update_case_data_does_not_log() {
        let db = setup_db();
        let engine = WorkflowEngine::new(&db);
        let case = open_case(&engine);

        let updated = engine
            .update_case_data_json(&case.id, r#"{"priority":"urgent"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(updated.priority, crate::models::Priority::Urgent);
        assert_eq!(updated.activity_log.len(), 1);
        assert_eq!(updated.status_history.len(), 1);

        let err = engine
            .update_case_data_json(&case.id, r#"{"documents":[]}"#)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn test_empty_note_is_dropped() {
        let db = setup_db();
        let engine = WorkflowEngine::new(&db);
        let case = open_case(&engine);

        let updated = engine
            .update_status(&case.id, CaseStatus::CaseAgentReview, Some(String::new()), &agent())
            .unwrap()
            .unwrap();

        assert_eq!(updated.status_history[1].note, None);
        assert!(!updated.activity_log[1].details.ends_with(": "));
    }

    #[test]
    fn test_patch_entries_must_belong_to_case() {
        let db = setup_db();
        let engine = WorkflowEngine::new(&db);
        let case = open_case(&engine);
        let other = open_case(&engine);

        let patch = CasePatch {
            append_activity: vec![ActivityLogEntry::new(
                &other.id,
                &agent(),
                "Case Accepted",
                "Case accepted".into(),
            )],
            ..Default::default()
        };
        let err = engine.update_case_data(&case.id, patch).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        // Neither case nor the ledger moved
        assert_eq!(engine.get_case(&case.id).unwrap().unwrap(), case);
        let ledger = AuditLedger::new(&db);
        assert_eq!(ledger.entries_for_case(&case.id).unwrap().len(), 1);
        assert_eq!(ledger.entries_for_case(&other.id).unwrap().len(), 1);
        assert_eq!(ledger.stats().unwrap().leaf_count, 2);
    }

    #[test]
    fn test_patch_history_cannot_be_backdated() {
        let db = setup_db();
        let engine = WorkflowEngine::new(&db);
        let case = open_case(&engine);

        let mut entry = StatusHistoryEntry::new(CaseStatus::CaseAccepted, &hospital_user(), None);
        entry.timestamp = "2000-01-01T00:00:00.000000Z".into();
        let patch = CasePatch {
            append_status_history: vec![entry],
            ..Default::default()
        };

        let err = engine.update_case_data(&case.id, patch).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(engine.get_case(&case.id).unwrap().unwrap().status_history.len(), 1);
    }

    #[test]
    fn test_accept_and_reject() {
        let db = setup_db();
        let engine = WorkflowEngine::new(&db);
        let case = open_case(&engine);

        let accepted = engine
            .accept_case(&case.id, &hospital_user(), Some("Surgery feasible".into()))
            .unwrap()
            .unwrap();
        assert_eq!(accepted.status, CaseStatus::CaseAccepted);
        assert_eq!(accepted.status_history.len(), 2);
        assert_eq!(accepted.activity_log[1].action, "Case Accepted");
        assert_eq!(AuditLedger::new(&db).stats().unwrap().leaf_count, 2);

        let err = engine.reject_case(&case.id, &hospital_user(), "  ").unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(engine.get_case(&case.id).unwrap().unwrap().status, CaseStatus::CaseAccepted);

        let rejected = engine
            .reject_case(&case.id, &hospital_user(), "No capacity")
            .unwrap()
            .unwrap();
        assert_eq!(rejected.status, CaseStatus::CaseRejected);
        assert_eq!(rejected.status_history[2].note.as_deref(), Some("No capacity"));
    }
}
