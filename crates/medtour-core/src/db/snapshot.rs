//! Whole-store reads for dashboards and exports.

use serde::{Deserialize, Serialize};

use super::{Database, DbResult};
use crate::models::{Case, Hospital, Notification, User};

/// Everything the store holds at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppSnapshot {
    pub cases: Vec<Case>,
    pub hospitals: Vec<Hospital>,
    pub users: Vec<User>,
    pub notifications: Vec<Notification>,
}

impl AppSnapshot {
    pub fn case(&self, case_id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == case_id)
    }

    pub fn hospital(&self, hospital_id: &str) -> Option<&Hospital> {
        self.hospitals.iter().find(|h| h.id == hospital_id)
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }
}

impl Database {
    /// Read every collection inside one read transaction.
    pub fn snapshot(&self) -> DbResult<AppSnapshot> {
        let tx = self.begin()?;
        let snapshot = AppSnapshot {
            cases: self.list_cases()?,
            hospitals: self.list_hospitals()?,
            users: self.list_users()?,
            notifications: self.list_all_notifications()?,
        };
        tx.commit()?;
        Ok(snapshot)
    }
}
