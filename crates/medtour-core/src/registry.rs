//! Hospital and user administration.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{
    new_id, timestamp_now, Hospital, HospitalContact, HospitalPatch, NewUser, User, UserPatch,
};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("{0}")]
    Referenced(String),

    #[error("You cannot {0} your own account")]
    SelfAction(&'static str),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Password hashing failed: {0}")]
    Credential(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Fields for a new hospital.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NewHospital {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub bed_capacity: u32,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub accreditation: Option<String>,
    #[serde(default)]
    pub contact: HospitalContact,
}

pub struct Registry<'a> {
    db: &'a Database,
}

impl<'a> Registry<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // ---------------------------------------------------------------------
    // Hospitals
    // ---------------------------------------------------------------------

    pub fn create_hospital(&self, data: NewHospital) -> RegistryResult<Hospital> {
        let mut hospital = Hospital::new(data.name, data.location, data.bed_capacity);
        hospital.specialties = data.specialties;
        hospital.accreditation = data.accreditation;
        hospital.contact = data.contact;

        self.db.insert_hospital(&hospital)?;
        tracing::info!(hospital_id = %hospital.id, name = %hospital.name, "hospital created");
        Ok(hospital)
    }

    pub fn get_hospital(&self, hospital_id: &str) -> RegistryResult<Option<Hospital>> {
        Ok(self.db.get_hospital(hospital_id)?)
    }

    pub fn list_hospitals(&self) -> RegistryResult<Vec<Hospital>> {
        Ok(self.db.list_hospitals()?)
    }

    pub fn update_hospital(
        &self,
        hospital_id: &str,
        patch: HospitalPatch,
    ) -> RegistryResult<Option<Hospital>> {
        let Some(mut hospital) = self.db.get_hospital(hospital_id)? else {
            tracing::warn!(hospital_id, "update_hospital on unknown hospital");
            return Ok(None);
        };
        patch.apply(&mut hospital);
        hospital.updated_at = timestamp_now();
        self.db.update_hospital(&hospital)?;
        Ok(Some(hospital))
    }

    /// Delete a hospital no case or user refers to.
    pub fn delete_hospital(&self, hospital_id: &str) -> RegistryResult<bool> {
        let tx = self.db.begin()?;

        if self.db.get_hospital(hospital_id)?.is_none() {
            tracing::warn!(hospital_id, "delete_hospital on unknown hospital");
            return Ok(false);
        }

        let cases = self.db.count_cases_for_hospital(hospital_id)?;
        if cases > 0 {
            return Err(RegistryError::Referenced(format!(
                "Cannot delete hospital with {} assigned case(s)",
                cases
            )));
        }

        let users = self.db.count_users_for_hospital(hospital_id)?;
        if users > 0 {
            return Err(RegistryError::Referenced(format!(
                "Cannot delete hospital with {} associated user(s)",
                users
            )));
        }

        let deleted = self.db.delete_hospital(hospital_id)?;
        tx.commit().map_err(DbError::from)?;
        tracing::info!(hospital_id, "hospital deleted");
        Ok(deleted)
    }

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    pub fn create_user(&self, data: NewUser) -> RegistryResult<User> {
        if self.db.get_user_by_username(&data.username)?.is_some() {
            return Err(RegistryError::DuplicateUsername(data.username));
        }

        let user = User {
            id: new_id("user"),
            username: data.username,
            credential_hash: credential_hash(&data.password)?,
            role: data.role,
            full_name: data.full_name,
            email: data.email,
            phone: data.phone,
            password_changed: false,
            hospital_ids: data.hospital_ids,
            created_at: timestamp_now(),
        };
        self.db.insert_user(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub fn get_user(&self, user_id: &str) -> RegistryResult<Option<User>> {
        Ok(self.db.get_user(user_id)?)
    }

    pub fn list_users(&self) -> RegistryResult<Vec<User>> {
        Ok(self.db.list_users()?)
    }

    pub fn update_user(&self, user_id: &str, patch: UserPatch) -> RegistryResult<Option<User>> {
        let Some(mut user) = self.db.get_user(user_id)? else {
            tracing::warn!(user_id, "update_user on unknown user");
            return Ok(None);
        };
        patch.apply(&mut user);
        self.db.update_user(&user)?;
        Ok(Some(user))
    }

    /// Replace a password and clear the must-change flag.
    pub fn change_password(&self, user_id: &str, new_password: &str) -> RegistryResult<bool> {
        let changed = self
            .db
            .set_user_credential(user_id, &credential_hash(new_password)?)?;
        if !changed {
            tracing::warn!(user_id, "change_password on unknown user");
        }
        Ok(changed)
    }

    /// The matching user, if the username exists and the password is right.
    pub fn verify_credentials(&self, username: &str, password: &str) -> RegistryResult<Option<User>> {
        Ok(self
            .db
            .get_user_by_username(username)?
            .filter(|user| credential_matches(password, &user.credential_hash)))
    }

    /// Delete a user. Nobody may delete themselves, and users who own
    /// cases stay.
    pub fn delete_user(&self, user_id: &str, acting_user_id: &str) -> RegistryResult<bool> {
        if user_id == acting_user_id {
            return Err(RegistryError::SelfAction("delete"));
        }

        let tx = self.db.begin()?;

        if self.db.get_user(user_id)?.is_none() {
            tracing::warn!(user_id, "delete_user on unknown user");
            return Ok(false);
        }

        let cases = self.db.count_cases_for_user(user_id)?;
        if cases > 0 {
            return Err(RegistryError::Referenced(format!(
                "Cannot delete user with {} associated case(s)",
                cases
            )));
        }

        let deleted = self.db.delete_user(user_id)?;
        tx.commit().map_err(DbError::from)?;
        tracing::info!(user_id, "user deleted");
        Ok(deleted)
    }
}

/// Stored credential form of a password: a salted Argon2id PHC string.
pub fn credential_hash(password: &str) -> RegistryResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RegistryError::Credential(e.to_string()))
}

/// Check a password against a stored credential. Unparseable credentials
/// never match.
pub fn credential_matches(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored credential is not a PHC string");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, Case, NewCase, Role};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.into(),
            password: "initial-pass".into(),
            role,
            full_name: format!("{} name", username),
            email: None,
            phone: None,
            hospital_ids: vec![],
        }
    }

    #[test]
    fn test_hospital_crud() {
        let db = setup_db();
        let registry = Registry::new(&db);

        let hospital = registry
            .create_hospital(NewHospital {
                name: "Apollo".into(),
                location: "Chennai".into(),
                bed_capacity: 100,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(registry.list_hospitals().unwrap().len(), 1);

        let updated = registry
            .update_hospital(
                &hospital.id,
                HospitalPatch {
                    available_beds: Some(40),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.available_beds, 40);
        assert!(registry
            .update_hospital("hospital_missing", HospitalPatch::default())
            .unwrap()
            .is_none());

        assert!(registry.delete_hospital(&hospital.id).unwrap());
        assert!(!registry.delete_hospital(&hospital.id).unwrap());
    }

    #[test]
    fn test_delete_hospital_with_cases_fails() {
        let db = setup_db();
        let registry = Registry::new(&db);
        let hospital = registry
            .create_hospital(NewHospital {
                name: "Apollo".into(),
                location: "Chennai".into(),
                ..Default::default()
            })
            .unwrap();

        let mut case = Case::open(
            NewCase::for_patient("Jane Doe"),
            &Actor::new("agent_1", "Alice", Role::Agent),
        );
        case.assigned_hospital = Some(hospital.id.clone());
        db.insert_case(&case).unwrap();

        let err = registry.delete_hospital(&hospital.id).unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete hospital with 1 assigned case(s)");
        assert_eq!(registry.get_hospital(&hospital.id).unwrap().unwrap(), hospital);
    }

    #[test]
    fn test_delete_hospital_with_users_fails() {
        let db = setup_db();
        let registry = Registry::new(&db);
        let hospital = registry
            .create_hospital(NewHospital {
                name: "Apollo".into(),
                location: "Chennai".into(),
                ..Default::default()
            })
            .unwrap();

        let mut data = new_user("apollo_desk", Role::Hospital);
        data.hospital_ids = vec![hospital.id.clone()];
        registry.create_user(data).unwrap();

        let err = registry.delete_hospital(&hospital.id).unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete hospital with 1 associated user(s)");
    }

    #[test]
    fn test_duplicate_username_ignores_case() {
        let db = setup_db();
        let registry = Registry::new(&db);
        registry.create_user(new_user("agent1", Role::Agent)).unwrap();

        let err = registry.create_user(new_user("AGENT1", Role::Agent)).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateUsername(_)));
    }

    #[test]
    fn test_credentials_and_password_change() {
        let db = setup_db();
        let registry = Registry::new(&db);
        let user = registry.create_user(new_user("client1", Role::Client)).unwrap();

        assert!(user.must_change_password());
        assert_ne!(user.credential_hash, "initial-pass");
        assert!(registry.verify_credentials("Client1", "initial-pass").unwrap().is_some());
        assert!(registry.verify_credentials("client1", "wrong").unwrap().is_none());

        assert!(registry.change_password(&user.id, "new-pass").unwrap());
        let reloaded = registry.get_user(&user.id).unwrap().unwrap();
        assert!(!reloaded.must_change_password());
        assert!(registry.verify_credentials("client1", "new-pass").unwrap().is_some());
        assert!(!registry.change_password("user_missing", "x").unwrap());
    }

    #[test]
    fn test_credentials_are_salted() {
        let first = credential_hash("same-pass").unwrap();
        let second = credential_hash("same-pass").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(credential_matches("same-pass", &first));
        assert!(credential_matches("same-pass", &second));
        assert!(!credential_matches("other-pass", &first));
        assert!(!credential_matches("same-pass", "not-a-phc-string"));
    }

    #[test]
    fn test_delete_user_guards() {
        let db = setup_db();
        let registry = Registry::new(&db);
        let admin = registry.create_user(new_user("admin", Role::Admin)).unwrap();
        let agent = registry.create_user(new_user("agent1", Role::Agent)).unwrap();
        let spare = registry.create_user(new_user("spare", Role::Finance)).unwrap();

        let err = registry.delete_user(&admin.id, &admin.id).unwrap_err();
        assert_eq!(err.to_string(), "You cannot delete your own account");

        let case = Case::open(NewCase::for_patient("Jane Doe"), &agent.as_actor());
        db.insert_case(&case).unwrap();
        let err = registry.delete_user(&agent.id, &admin.id).unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete user with 1 associated case(s)");

        assert!(registry.delete_user(&spare.id, &admin.id).unwrap());
        assert!(!registry.delete_user(&spare.id, &admin.id).unwrap());
        assert_eq!(registry.list_users().unwrap().len(), 2);
    }

    #[test]
    fn test_update_user_profile() {
        let db = setup_db();
        let registry = Registry::new(&db);
        let user = registry.create_user(new_user("agent1", Role::Agent)).unwrap();

        let updated = registry
            .update_user(
                &user.id,
                UserPatch {
                    email: Some("a@example.org".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.email.as_deref(), Some("a@example.org"));
        assert_eq!(updated.full_name, user.full_name);
    }
}
