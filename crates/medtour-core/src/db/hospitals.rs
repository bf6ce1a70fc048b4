//! Hospital database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::Hospital;

const HOSPITAL_COLUMNS: &str = r#"
    id, name, location, bed_capacity, available_beds, specialties,
    accreditation, contact, created_at, updated_at
"#;

impl Database {
    pub fn insert_hospital(&self, hospital: &Hospital) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO hospitals (
                id, name, location, bed_capacity, available_beds, specialties,
                accreditation, contact, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                hospital.id,
                hospital.name,
                hospital.location,
                hospital.bed_capacity,
                hospital.available_beds,
                serde_json::to_string(&hospital.specialties)?,
                hospital.accreditation,
                serde_json::to_string(&hospital.contact)?,
                hospital.created_at,
                hospital.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn update_hospital(&self, hospital: &Hospital) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE hospitals SET
                name = ?2,
                location = ?3,
                bed_capacity = ?4,
                available_beds = ?5,
                specialties = ?6,
                accreditation = ?7,
                contact = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
            params![
                hospital.id,
                hospital.name,
                hospital.location,
                hospital.bed_capacity,
                hospital.available_beds,
                serde_json::to_string(&hospital.specialties)?,
                hospital.accreditation,
                serde_json::to_string(&hospital.contact)?,
                hospital.updated_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn get_hospital(&self, hospital_id: &str) -> DbResult<Option<Hospital>> {
        let sql = format!("SELECT {} FROM hospitals WHERE id = ?", HOSPITAL_COLUMNS);
        self.conn
            .query_row(&sql, [hospital_id], read_hospital_row)
            .optional()?
            .map(HospitalRow::into_hospital)
            .transpose()
    }

    /// List hospitals alphabetically.
    pub fn list_hospitals(&self) -> DbResult<Vec<Hospital>> {
        let sql = format!("SELECT {} FROM hospitals ORDER BY name", HOSPITAL_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], read_hospital_row)?;

        let mut hospitals = Vec::new();
        for row in rows {
            hospitals.push(row?.into_hospital()?);
        }
        Ok(hospitals)
    }

    pub fn delete_hospital(&self, hospital_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM hospitals WHERE id = ?", [hospital_id])?;
        Ok(rows_affected > 0)
    }

    /// Number of users whose affiliation list contains the hospital.
    pub fn count_users_for_hospital(&self, hospital_id: &str) -> DbResult<u32> {
        let count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM users
            WHERE EXISTS (
                SELECT 1 FROM json_each(users.hospital_ids) WHERE json_each.value = ?
            )
            "#,
            [hospital_id],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }
}

struct HospitalRow {
    id: String,
    name: String,
    location: String,
    bed_capacity: u32,
    available_beds: u32,
    specialties: String,
    accreditation: Option<String>,
    contact: String,
    created_at: String,
    updated_at: String,
}

fn read_hospital_row(row: &Row<'_>) -> rusqlite::Result<HospitalRow> {
    Ok(HospitalRow {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        bed_capacity: row.get(3)?,
        available_beds: row.get(4)?,
        specialties: row.get(5)?,
        accreditation: row.get(6)?,
        contact: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl HospitalRow {
    fn into_hospital(self) -> DbResult<Hospital> {
        Ok(Hospital {
            id: self.id,
            name: self.name,
            location: self.location,
            bed_capacity: self.bed_capacity,
            available_beds: self.available_beds,
            specialties: serde_json::from_str(&self.specialties)?,
            accreditation: self.accreditation,
            contact: serde_json::from_str(&self.contact)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn make_hospital(name: &str) -> Hospital {
        let mut hospital = Hospital::new(name.into(), "Chennai".into(), 120);
        hospital.specialties = vec!["cardiology".into()];
        hospital.contact.email = Some("desk@example.org".into());
        hospital
    }

    #[test]
    fn test_insert_and_get_hospital() {
        let db = setup_db();
        let hospital = make_hospital("Apollo");

        db.insert_hospital(&hospital).unwrap();

        let retrieved = db.get_hospital(&hospital.id).unwrap().unwrap();
        assert_eq!(retrieved, hospital);
    }

    #[test]
    fn test_update_and_delete_hospital() {
        let db = setup_db();
        let mut hospital = make_hospital("Apollo");
        db.insert_hospital(&hospital).unwrap();

        hospital.available_beds = 80;
        assert!(db.update_hospital(&hospital).unwrap());
        assert_eq!(db.get_hospital(&hospital.id).unwrap().unwrap().available_beds, 80);

        assert!(db.delete_hospital(&hospital.id).unwrap());
        assert!(!db.delete_hospital(&hospital.id).unwrap());
        assert!(db.get_hospital(&hospital.id).unwrap().is_none());
    }

    #[test]
    fn test_list_sorted_by_name() {
        let db = setup_db();
        db.insert_hospital(&make_hospital("Fortis")).unwrap();
        db.insert_hospital(&make_hospital("Apollo")).unwrap();

        let names: Vec<String> = db.list_hospitals().unwrap().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["Apollo", "Fortis"]);
    }

    #[test]
    fn test_count_users_for_hospital() {
        let db = setup_db();
        db.conn()
            .execute_batch(
                r#"
                INSERT INTO users (id, username, credential_hash, role, full_name, hospital_ids)
                VALUES ('u1', 'h1', 'x', 'hospital', 'H One', '["hospital_a","hospital_b"]');
                INSERT INTO users (id, username, credential_hash, role, full_name, hospital_ids)
                VALUES ('u2', 'h2', 'x', 'hospital', 'H Two', '["hospital_b"]');
                "#,
            )
            .unwrap();

        assert_eq!(db.count_users_for_hospital("hospital_a").unwrap(), 1);
        assert_eq!(db.count_users_for_hospital("hospital_b").unwrap(), 2);
        assert_eq!(db.count_users_for_hospital("hospital_c").unwrap(), 0);
    }
}
