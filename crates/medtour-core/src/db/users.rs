//! User account database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Role, User};

const USER_COLUMNS: &str = r#"
    id, username, credential_hash, role, full_name, email, phone,
    password_changed, hospital_ids, created_at
"#;

impl Database {
    pub fn insert_user(&self, user: &User) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO users (
                id, username, credential_hash, role, full_name, email, phone,
                password_changed, hospital_ids, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                user.id,
                user.username,
                user.credential_hash,
                user.role.as_str(),
                user.full_name,
                user.email,
                user.phone,
                user.password_changed,
                serde_json::to_string(&user.hospital_ids)?,
                user.created_at,
            ],
        )?;
        Ok(())
    }

    /// Update profile fields. Credentials go through [`Database::set_user_credential`].
    pub fn update_user(&self, user: &User) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE users SET
                role = ?2,
                full_name = ?3,
                email = ?4,
                phone = ?5,
                hospital_ids = ?6
            WHERE id = ?1
            "#,
            params![
                user.id,
                user.role.as_str(),
                user.full_name,
                user.email,
                user.phone,
                serde_json::to_string(&user.hospital_ids)?,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Replace the stored credential and mark the password as changed.
    pub fn set_user_credential(&self, user_id: &str, credential_hash: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE users SET credential_hash = ?2, password_changed = 1 WHERE id = ?1",
            params![user_id, credential_hash],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn get_user(&self, user_id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        self.conn
            .query_row(&sql, [user_id], read_user_row)
            .optional()?
            .map(UserRow::into_user)
            .transpose()
    }

    /// Look up by login name, ignoring case.
    pub fn get_user_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE username = ? COLLATE NOCASE",
            USER_COLUMNS
        );
        self.conn
            .query_row(&sql, [username], read_user_row)
            .optional()?
            .map(UserRow::into_user)
            .transpose()
    }

    pub fn list_users(&self) -> DbResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        self.collect_users(&sql, [])
    }

    /// Users whose affiliation list contains the hospital.
    pub fn list_users_for_hospital(&self, hospital_id: &str) -> DbResult<Vec<User>> {
        let sql = format!(
            r#"
            SELECT {} FROM users
            WHERE EXISTS (
                SELECT 1 FROM json_each(users.hospital_ids) WHERE json_each.value = ?
            )
            ORDER BY username
            "#,
            USER_COLUMNS
        );
        self.collect_users(&sql, [hospital_id])
    }

    pub fn delete_user(&self, user_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM users WHERE id = ?", [user_id])?;
        Ok(rows_affected > 0)
    }

    fn collect_users<P: rusqlite::Params>(&self, sql: &str, params: P) -> DbResult<Vec<User>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, read_user_row)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?.into_user()?);
        }
        Ok(users)
    }
}

struct UserRow {
    id: String,
    username: String,
    credential_hash: String,
    role: String,
    full_name: String,
    email: Option<String>,
    phone: Option<String>,
    password_changed: bool,
    hospital_ids: String,
    created_at: String,
}

fn read_user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        credential_hash: row.get(2)?,
        role: row.get(3)?,
        full_name: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
        password_changed: row.get(7)?,
        hospital_ids: row.get(8)?,
        created_at: row.get(9)?,
    })
}

impl UserRow {
    fn into_user(self) -> DbResult<User> {
        let role = Role::from_str_opt(&self.role)
            .ok_or_else(|| DbError::Constraint(format!("Unknown role: {}", self.role)))?;
        Ok(User {
            id: self.id,
            username: self.username,
            credential_hash: self.credential_hash,
            role,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            password_changed: self.password_changed,
            hospital_ids: serde_json::from_str(&self.hospital_ids)?,
            created_at: self.created_at,
        })
    }
}
