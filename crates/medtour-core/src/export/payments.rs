//! Payment ledger export for the finance desk.

use serde::{Deserialize, Serialize};

use super::escape_csv;
use crate::db::{Database, DbResult};
use crate::models::{Case, PaymentRecord, PaymentStatus};

const CSV_HEADER: &str =
    "case_id,patient_name,payment_id,payment_type,amount,currency,status,method,reference,date,processed_by\n";

/// One payment with the case it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub case_id: String,
    pub patient_name: String,
    pub hospital_id: Option<String>,
    #[serde(flatten)]
    pub payment: PaymentRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLedgerExport {
    pub exported_at: String,
    pub rows: Vec<PaymentRow>,
}

impl PaymentLedgerExport {
    pub fn from_cases<'c, I>(cases: I) -> Self
    where
        I: IntoIterator<Item = &'c Case>,
    {
        let rows = cases
            .into_iter()
            .flat_map(|case| {
                case.payments.iter().map(move |payment| PaymentRow {
                    case_id: case.id.clone(),
                    patient_name: case.patient_name().to_string(),
                    hospital_id: case.assigned_hospital.clone(),
                    payment: payment.clone(),
                })
            })
            .collect();

        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            rows,
        }
    }

    /// Sum of amounts in `status` for one currency.
    pub fn total(&self, currency: &str, status: PaymentStatus) -> f64 {
        self.rows
            .iter()
            .filter(|r| r.payment.currency == currency && r.payment.status == status)
            .map(|r| r.payment.amount)
            .sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);

        for row in &self.rows {
            let p = &row.payment;
            csv.push_str(&format!(
                "{},{},{},{},{:.2},{},{},{},{},{},{}\n",
                escape_csv(&row.case_id),
                escape_csv(&row.patient_name),
                escape_csv(&p.id),
                p.payment_type.as_str(),
                p.amount,
                escape_csv(&p.currency),
                p.status.as_str(),
                escape_csv(&p.method),
                escape_csv(&p.reference),
                escape_csv(&p.date),
                escape_csv(p.processed_by.as_deref().unwrap_or("")),
            ));
        }

        csv
    }
}

pub struct PaymentExporter<'a> {
    db: &'a Database,
}

impl<'a> PaymentExporter<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Every payment on every case.
    pub fn export_all(&self) -> DbResult<PaymentLedgerExport> {
        let cases = self.db.list_cases()?;
        Ok(PaymentLedgerExport::from_cases(&cases))
    }

    /// Payments on one case. `None` when the case does not exist.
    pub fn export_case(&self, case_id: &str) -> DbResult<Option<PaymentLedgerExport>> {
        Ok(self
            .db
            .get_case(case_id)?
            .map(|case| PaymentLedgerExport::from_cases([&case])))
    }
}
