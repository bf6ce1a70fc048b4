//! Notification database operations.

use rusqlite::{params, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Notification, NotificationKind};

impl Database {
    pub fn insert_notification(&self, notification: &Notification) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO notifications (
                id, user_id, title, message, kind, read, created_at, link, case_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                notification.id,
                notification.user_id,
                notification.title,
                notification.message,
                notification.kind.as_str(),
                notification.read,
                notification.created_at,
                notification.link,
                notification.case_id,
            ],
        )?;
        Ok(())
    }

    /// A user's notifications, newest first.
    pub fn list_notifications_for_user(&self, user_id: &str) -> DbResult<Vec<Notification>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, title, message, kind, read, created_at, link, case_id
            FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;
        let rows = stmt.query_map([user_id], read_notification_row)?;

        let mut notifications = Vec::new();
        for row in rows {
            let (mut notification, kind) = row?;
            notification.kind = NotificationKind::from_str_opt(&kind)
                .ok_or_else(|| DbError::Constraint(format!("Unknown notification kind: {}", kind)))?;
            notifications.push(notification);
        }
        Ok(notifications)
    }

    /// Every notification in the store, oldest first.
    pub fn list_all_notifications(&self) -> DbResult<Vec<Notification>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, title, message, kind, read, created_at, link, case_id
            FROM notifications
            ORDER BY rowid
            "#,
        )?;
        let rows = stmt.query_map([], read_notification_row)?;

        let mut notifications = Vec::new();
        for row in rows {
            let (mut notification, kind) = row?;
            notification.kind = NotificationKind::from_str_opt(&kind)
                .ok_or_else(|| DbError::Constraint(format!("Unknown notification kind: {}", kind)))?;
            notifications.push(notification);
        }
        Ok(notifications)
    }

    pub fn unread_notification_count(&self, user_id: &str) -> DbResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND read = 0",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    pub fn mark_notification_read(&self, notification_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE notifications SET read = 1 WHERE id = ?",
            [notification_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Returns how many notifications changed.
    pub fn mark_all_notifications_read(&self, user_id: &str) -> DbResult<u32> {
        let rows_affected = self.conn.execute(
            "UPDATE notifications SET read = 1 WHERE user_id = ? AND read = 0",
            [user_id],
        )?;
        Ok(rows_affected as u32)
    }
}

fn read_notification_row(row: &Row<'_>) -> rusqlite::Result<(Notification, String)> {
    Ok((
        Notification {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            message: row.get(3)?,
            kind: NotificationKind::Info,
            read: row.get(5)?,
            created_at: row.get(6)?,
            link: row.get(7)?,
            case_id: row.get(8)?,
        },
        row.get(4)?,
    ))
}
