//! Case documents and the document-type catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of document attached to a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    // Initial intake
    Passport,
    PatientPhoto,
    MedicalReports,
    PreviousPrescriptions,
    DiagnosticImages,
    AttenderPassport,
    AttenderPhoto,
    // Travel
    VisaCopy,
    FlightTickets,
    TravelInsurance,
    AccommodationBooking,
    InvitationLetter,
    // Financial
    PaymentReceipt,
    Invoice,
    CreditPaymentProof,
    BankStatement,
    VisaFeeReceipt,
    // Treatment
    TreatmentPlan,
    CostEstimate,
    LabResults,
    Prescription,
    // Discharge
    DischargeSummary,
    FinalMedicalReport,
    MedicinePrescription,
    FollowUpPlan,
    FitnessToFly,
}

/// Grouping used by the upload permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Initial,
    Travel,
    Financial,
    Treatment,
    Discharge,
}

impl DocumentCategory {
    pub const ALL: [DocumentCategory; 5] = [
        DocumentCategory::Initial,
        DocumentCategory::Travel,
        DocumentCategory::Financial,
        DocumentCategory::Treatment,
        DocumentCategory::Discharge,
    ];

    /// Types in this category. A type may appear in more than one.
    pub fn types(&self) -> &'static [DocumentType] {
        use DocumentType::*;

        match self {
            DocumentCategory::Initial => &[
                Passport,
                PatientPhoto,
                MedicalReports,
                PreviousPrescriptions,
                DiagnosticImages,
                AttenderPassport,
                AttenderPhoto,
            ],
            DocumentCategory::Travel => &[
                VisaCopy,
                FlightTickets,
                TravelInsurance,
                AccommodationBooking,
                InvitationLetter,
            ],
            DocumentCategory::Financial => &[
                PaymentReceipt,
                Invoice,
                CreditPaymentProof,
                BankStatement,
                VisaFeeReceipt,
            ],
            DocumentCategory::Treatment => &[
                MedicalReports,
                TreatmentPlan,
                CostEstimate,
                LabResults,
                Prescription,
            ],
            DocumentCategory::Discharge => &[
                DischargeSummary,
                FinalMedicalReport,
                MedicinePrescription,
                FollowUpPlan,
                FitnessToFly,
            ],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentCategory::Initial => "Initial Documents",
            DocumentCategory::Travel => "Travel Documents",
            DocumentCategory::Financial => "Financial Documents",
            DocumentCategory::Treatment => "Treatment Documents",
            DocumentCategory::Discharge => "Discharge Documents",
        }
    }
}

impl DocumentType {
    pub const ALL: [DocumentType; 26] = [
        DocumentType::Passport,
        DocumentType::PatientPhoto,
        DocumentType::MedicalReports,
        DocumentType::PreviousPrescriptions,
        DocumentType::DiagnosticImages,
        DocumentType::AttenderPassport,
        DocumentType::AttenderPhoto,
        DocumentType::VisaCopy,
        DocumentType::FlightTickets,
        DocumentType::TravelInsurance,
        DocumentType::AccommodationBooking,
        DocumentType::InvitationLetter,
        DocumentType::PaymentReceipt,
        DocumentType::Invoice,
        DocumentType::CreditPaymentProof,
        DocumentType::BankStatement,
        DocumentType::VisaFeeReceipt,
        DocumentType::TreatmentPlan,
        DocumentType::CostEstimate,
        DocumentType::LabResults,
        DocumentType::Prescription,
        DocumentType::DischargeSummary,
        DocumentType::FinalMedicalReport,
        DocumentType::MedicinePrescription,
        DocumentType::FollowUpPlan,
        DocumentType::FitnessToFly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Passport => "passport",
            DocumentType::PatientPhoto => "patient_photo",
            DocumentType::MedicalReports => "medical_reports",
            DocumentType::PreviousPrescriptions => "previous_prescriptions",
            DocumentType::DiagnosticImages => "diagnostic_images",
            DocumentType::AttenderPassport => "attender_passport",
            DocumentType::AttenderPhoto => "attender_photo",
            DocumentType::VisaCopy => "visa_copy",
            DocumentType::FlightTickets => "flight_tickets",
            DocumentType::TravelInsurance => "travel_insurance",
            DocumentType::AccommodationBooking => "accommodation_booking",
            DocumentType::InvitationLetter => "invitation_letter",
            DocumentType::PaymentReceipt => "payment_receipt",
            DocumentType::Invoice => "invoice",
            DocumentType::CreditPaymentProof => "credit_payment_proof",
            DocumentType::BankStatement => "bank_statement",
            DocumentType::VisaFeeReceipt => "visa_fee_receipt",
            DocumentType::TreatmentPlan => "treatment_plan",
            DocumentType::CostEstimate => "cost_estimate",
            DocumentType::LabResults => "lab_results",
            DocumentType::Prescription => "prescription",
            DocumentType::DischargeSummary => "discharge_summary",
            DocumentType::FinalMedicalReport => "final_medical_report",
            DocumentType::MedicinePrescription => "medicine_prescription",
            DocumentType::FollowUpPlan => "follow_up_plan",
            DocumentType::FitnessToFly => "fitness_to_fly",
        }
    }

    /// Categories this type belongs to.
    pub fn categories(&self) -> Vec<DocumentCategory> {
        DocumentCategory::ALL
            .into_iter()
            .filter(|category| category.types().contains(self))
            .collect()
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for document type strings outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown document type: {0}")]
pub struct UnknownDocumentType(pub String);

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownDocumentType(s.to_string()))
    }
}

/// A file attached to a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique document ID (`doc_` prefix)
    pub id: String,
    pub doc_type: DocumentType,
    /// Original file name
    pub name: String,
    pub uploaded_by: String,
    pub uploaded_by_name: String,
    pub uploaded_at: String,
    /// Size in bytes
    pub size: u64,
    pub mime_type: String,
    /// Text pulled out of the file, if any
    pub extracted_text: Option<String>,
}

/// Upload request for [`crate::workflow::WorkflowEngine::add_document`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NewDocument {
    pub doc_type: DocumentType,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    #[serde(default)]
    pub extracted_text: Option<String>,
}
