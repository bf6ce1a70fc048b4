//! Payment records tracked on a case.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Visa,
    Treatment,
    Travel,
    Other,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Visa => "visa",
            PaymentType::Treatment => "treatment",
            PaymentType::Travel => "travel",
            PaymentType::Other => "other",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "visa" => Some(PaymentType::Visa),
            "treatment" => Some(PaymentType::Treatment),
            "travel" => Some(PaymentType::Travel),
            "other" => Some(PaymentType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// A single payment on a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    /// Unique payment ID (`payment_` prefix)
    pub id: String,
    pub payment_type: PaymentType,
    pub amount: f64,
    /// ISO currency code (e.g., "USD")
    pub currency: String,
    pub status: PaymentStatus,
    /// Payment method (e.g., "bank", "card", "cash")
    pub method: String,
    /// Bank/processor reference
    pub reference: String,
    /// Payment date (YYYY-MM-DD)
    pub date: String,
    /// Finance user who processed it
    pub processed_by: Option<String>,
    pub notes: Option<String>,
}

/// New payment details, without an ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NewPayment {
    pub payment_type: PaymentType,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub method: String,
    pub reference: String,
    pub date: String,
    #[serde(default)]
    pub processed_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewPayment {
    pub fn into_record(self, id: String) -> PaymentRecord {
        PaymentRecord {
            id,
            payment_type: self.payment_type,
            amount: self.amount,
            currency: self.currency,
            status: self.status,
            method: self.method,
            reference: self.reference,
            date: self.date,
            processed_by: self.processed_by,
            notes: self.notes,
        }
    }
}

/// Field-level update for an existing payment. `None` leaves a field alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PaymentPatch {
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub processed_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PaymentPatch {
    /// Apply set fields onto a record.
    pub fn apply(self, record: &mut PaymentRecord) {
        if let Some(payment_type) = self.payment_type {
            record.payment_type = payment_type;
        }
        if let Some(amount) = self.amount {
            record.amount = amount;
        }
        if let Some(currency) = self.currency {
            record.currency = currency;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(method) = self.method {
            record.method = method;
        }
        if let Some(reference) = self.reference {
            record.reference = reference;
        }
        if let Some(date) = self.date {
            record.date = date;
        }
        if self.processed_by.is_some() {
            record.processed_by = self.processed_by;
        }
        if self.notes.is_some() {
            record.notes = self.notes;
        }
    }
}

/// Render an amount with its currency for log lines and exports.
pub fn format_amount(amount: f64, currency: &str) -> String {
    format!("{:.2} {}", amount, currency)
}
