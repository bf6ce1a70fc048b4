//! In-app notifications.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "info" => Some(NotificationKind::Info),
            "success" => Some(NotificationKind::Success),
            "warning" => Some(NotificationKind::Warning),
            "error" => Some(NotificationKind::Error),
            _ => None,
        }
    }
}

/// A message shown to one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    /// Unique notification ID (`notif_` prefix)
    pub id: String,
    /// Recipient
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: String,
    /// In-app deep link (e.g., "/cases/case_123")
    pub link: Option<String>,
    pub case_id: Option<String>,
}

impl Notification {
    pub fn new(user_id: String, title: String, message: String, kind: NotificationKind) -> Self {
        Self {
            id: super::new_id("notif"),
            user_id,
            title,
            message,
            kind,
            read: false,
            created_at: super::timestamp_now(),
            link: None,
            case_id: None,
        }
    }

    /// Attach the case this notification is about.
    pub fn for_case(mut self, case_id: &str) -> Self {
        self.link = Some(format!("/cases/{}", case_id));
        self.case_id = Some(case_id.to_string());
        self
    }
}
