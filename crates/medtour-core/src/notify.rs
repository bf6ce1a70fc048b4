//! In-app notifications and the ones workflow transitions produce.

use crate::db::{Database, DbResult};
use crate::models::{Actor, Case, CaseStatus, Notification, NotificationKind};

pub struct Notifier<'a> {
    db: &'a Database,
}

impl<'a> Notifier<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Store a notification for one user.
    pub fn notify(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        kind: NotificationKind,
        link: Option<String>,
        case_id: Option<String>,
    ) -> DbResult<Notification> {
        let mut notification =
            Notification::new(user_id.to_string(), title.to_string(), message.to_string(), kind);
        notification.link = link;
        notification.case_id = case_id;
        self.db.insert_notification(&notification)?;
        Ok(notification)
    }

    pub fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Notification>> {
        self.db.list_notifications_for_user(user_id)
    }

    pub fn unread_count(&self, user_id: &str) -> DbResult<u32> {
        self.db.unread_notification_count(user_id)
    }

    pub fn mark_read(&self, notification_id: &str) -> DbResult<bool> {
        let updated = self.db.mark_notification_read(notification_id)?;
        if !updated {
            tracing::warn!(notification_id, "mark_read on unknown notification");
        }
        Ok(updated)
    }

    pub fn mark_all_read(&self, user_id: &str) -> DbResult<u32> {
        self.db.mark_all_notifications_read(user_id)
    }

    /// Tell the case's agent and client account about a status change.
    /// The actor is never notified of their own change.
    pub(crate) fn status_changed(
        &self,
        case: &Case,
        previous: CaseStatus,
        actor: &Actor,
    ) -> DbResult<Vec<Notification>> {
        let university = case.assigned_university.is_some();
        let message = format!(
            "Case for {} moved from {} to {}",
            case.patient_name(),
            previous.label(university),
            case.status_label()
        );
        let kind = match case.status.tone() {
            crate::models::StatusTone::Success => NotificationKind::Success,
            crate::models::StatusTone::Error => NotificationKind::Error,
            _ => NotificationKind::Info,
        };

        let mut recipients: Vec<&str> = vec![case.created_by.as_str()];
        if let Some(client) = case.client_user_id.as_deref() {
            recipients.push(client);
        }
        recipients.retain(|id| *id != actor.id);
        recipients.dedup();

        recipients
            .into_iter()
            .map(|user_id| self.store_for_case(user_id, "Case status updated", &message, kind, case))
            .collect()
    }

    /// Tell users affiliated with the hospital that a case is waiting on them.
    pub(crate) fn hospital_assigned(
        &self,
        case: &Case,
        hospital_id: &str,
        actor: &Actor,
    ) -> DbResult<Vec<Notification>> {
        let message = format!("Case for {} is awaiting your review", case.patient_name());

        self.db
            .list_users_for_hospital(hospital_id)?
            .iter()
            .filter(|user| user.id != actor.id)
            .map(|user| {
                self.store_for_case(&user.id, "New case assigned", &message, NotificationKind::Info, case)
            })
            .collect()
    }

    fn store_for_case(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        kind: NotificationKind,
        case: &Case,
    ) -> DbResult<Notification> {
        let notification =
            Notification::new(user_id.to_string(), title.to_string(), message.to_string(), kind)
                .for_case(&case.id);
        self.db.insert_notification(&notification)?;
        Ok(notification)
    }
}
