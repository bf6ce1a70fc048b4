//! Case database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Case, CaseStatus, Priority};

const CASE_COLUMNS: &str = r#"
    id, status, priority, created_by, client_user_id, assigned_hospital,
    assigned_university, client_info, attender_info, treatment_plan, visa,
    documents, payments, comments, status_history, activity_log,
    created_at, updated_at
"#;

impl Database {
    /// Insert a new case.
    pub fn insert_case(&self, case: &Case) -> DbResult<()> {
        let row = CaseRow::try_from(case)?;

        self.conn.execute(
            r#"
            INSERT INTO cases (
                id, status, priority, patient_name, created_by, client_user_id,
                assigned_hospital, assigned_university, client_info, attender_info,
                treatment_plan, visa, documents, payments, comments,
                status_history, activity_log, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
            params![
                row.id,
                row.status,
                row.priority,
                case.patient_name(),
                row.created_by,
                row.client_user_id,
                row.assigned_hospital,
                row.assigned_university,
                row.client_info,
                row.attender_info,
                row.treatment_plan,
                row.visa,
                row.documents,
                row.payments,
                row.comments,
                row.status_history,
                row.activity_log,
                row.created_at,
                row.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Overwrite an existing case with its new state (last write wins).
    pub fn update_case(&self, case: &Case) -> DbResult<bool> {
        let row = CaseRow::try_from(case)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE cases SET
                status = ?2,
                priority = ?3,
                patient_name = ?4,
                client_user_id = ?5,
                assigned_hospital = ?6,
                assigned_university = ?7,
                client_info = ?8,
                attender_info = ?9,
                treatment_plan = ?10,
                visa = ?11,
                documents = ?12,
                payments = ?13,
                comments = ?14,
                status_history = ?15,
                activity_log = ?16,
                updated_at = ?17
            WHERE id = ?1
            "#,
            params![
                row.id,
                row.status,
                row.priority,
                case.patient_name(),
                row.client_user_id,
                row.assigned_hospital,
                row.assigned_university,
                row.client_info,
                row.attender_info,
                row.treatment_plan,
                row.visa,
                row.documents,
                row.payments,
                row.comments,
                row.status_history,
                row.activity_log,
                row.updated_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a case by ID.
    pub fn get_case(&self, case_id: &str) -> DbResult<Option<Case>> {
        let sql = format!("SELECT {} FROM cases WHERE id = ?", CASE_COLUMNS);
        self.conn
            .query_row(&sql, [case_id], read_case_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List all cases, most recently updated first.
    pub fn list_cases(&self) -> DbResult<Vec<Case>> {
        let sql = format!("SELECT {} FROM cases ORDER BY updated_at DESC", CASE_COLUMNS);
        self.collect_cases(&sql, [])
    }

    /// List cases in a given status.
    pub fn list_cases_by_status(&self, status: CaseStatus) -> DbResult<Vec<Case>> {
        let sql = format!(
            "SELECT {} FROM cases WHERE status = ? ORDER BY updated_at DESC",
            CASE_COLUMNS
        );
        self.collect_cases(&sql, [status.as_str()])
    }

    /// List cases assigned to a hospital.
    pub fn list_cases_for_hospital(&self, hospital_id: &str) -> DbResult<Vec<Case>> {
        let sql = format!(
            "SELECT {} FROM cases WHERE assigned_hospital = ? ORDER BY updated_at DESC",
            CASE_COLUMNS
        );
        self.collect_cases(&sql, [hospital_id])
    }

    /// Number of cases assigned to a hospital.
    pub fn count_cases_for_hospital(&self, hospital_id: &str) -> DbResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM cases WHERE assigned_hospital = ?",
            [hospital_id],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    /// Number of cases a user opened or owns as client.
    pub fn count_cases_for_user(&self, user_id: &str) -> DbResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM cases WHERE created_by = ?1 OR client_user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    fn collect_cases<P: rusqlite::Params>(&self, sql: &str, params: P) -> DbResult<Vec<Case>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, read_case_row)?;

        let mut cases = Vec::new();
        for row in rows {
            cases.push(row?.try_into()?);
        }
        Ok(cases)
    }
}

fn read_case_row(row: &Row<'_>) -> rusqlite::Result<CaseRow> {
    Ok(CaseRow {
        id: row.get(0)?,
        status: row.get(1)?,
        priority: row.get(2)?,
        created_by: row.get(3)?,
        client_user_id: row.get(4)?,
        assigned_hospital: row.get(5)?,
        assigned_university: row.get(6)?,
        client_info: row.get(7)?,
        attender_info: row.get(8)?,
        treatment_plan: row.get(9)?,
        visa: row.get(10)?,
        documents: row.get(11)?,
        payments: row.get(12)?,
        comments: row.get(13)?,
        status_history: row.get(14)?,
        activity_log: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

/// Intermediate row struct for database mapping.
struct CaseRow {
    id: String,
    status: String,
    priority: String,
    created_by: String,
    client_user_id: Option<String>,
    assigned_hospital: Option<String>,
    assigned_university: Option<String>,
    client_info: String,
    attender_info: Option<String>,
    treatment_plan: Option<String>,
    visa: String,
    documents: String,
    payments: String,
    comments: String,
    status_history: String,
    activity_log: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<&Case> for CaseRow {
    type Error = DbError;

    fn try_from(case: &Case) -> Result<Self, Self::Error> {
        Ok(CaseRow {
            id: case.id.clone(),
            status: case.status.as_str().to_string(),
            priority: case.priority.as_str().to_string(),
            created_by: case.created_by.clone(),
            client_user_id: case.client_user_id.clone(),
            assigned_hospital: case.assigned_hospital.clone(),
            assigned_university: case.assigned_university.clone(),
            client_info: serde_json::to_string(&case.client_info)?,
            attender_info: case
                .attender_info
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            treatment_plan: case
                .treatment_plan
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            visa: serde_json::to_string(&case.visa)?,
            documents: serde_json::to_string(&case.documents)?,
            payments: serde_json::to_string(&case.payments)?,
            comments: serde_json::to_string(&case.comments)?,
            status_history: serde_json::to_string(&case.status_history)?,
            activity_log: serde_json::to_string(&case.activity_log)?,
            created_at: case.created_at.clone(),
            updated_at: case.updated_at.clone(),
        })
    }
}

impl TryFrom<CaseRow> for Case {
    type Error = DbError;

    fn try_from(row: CaseRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<CaseStatus>()
            .map_err(|e| DbError::Constraint(e.to_string()))?;
        let priority = Priority::from_str_opt(&row.priority)
            .ok_or_else(|| DbError::Constraint(format!("Unknown priority: {}", row.priority)))?;

        Ok(Case {
            id: row.id,
            status,
            priority,
            client_info: serde_json::from_str(&row.client_info)?,
            attender_info: row
                .attender_info
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            created_by: row.created_by,
            client_user_id: row.client_user_id,
            assigned_hospital: row.assigned_hospital,
            assigned_university: row.assigned_university,
            treatment_plan: row
                .treatment_plan
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            visa: serde_json::from_str(&row.visa)?,
            documents: serde_json::from_str(&row.documents)?,
            payments: serde_json::from_str(&row.payments)?,
            comments: serde_json::from_str(&row.comments)?,
            status_history: serde_json::from_str(&row.status_history)?,
            activity_log: serde_json::from_str(&row.activity_log)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
