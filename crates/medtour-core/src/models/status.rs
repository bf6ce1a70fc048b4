//! Case status lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every stage a case can be in.
///
/// Stored and serialized as snake_case strings. Most statuses sit on the
/// linear [`STATUS_FLOW`]; the rest are branch markers (rejections, visa
/// retries, extra payment/document checkpoints) that a case can visit
/// without being on the happy path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    New,
    CaseAgentReview,
    AdminReview,
    AssignedToHospital,
    HospitalReview,
    CaseAccepted,
    CaseRejected,
    TreatmentPlanUploaded,
    VisaProcessingDocuments,
    VisaProcessingPayments,
    VisaApplied,
    VisaApproved,
    VisaCopyUploaded,
    VisaRejected,
    VisaReapply,
    VisaTerminate,
    PassTravelDocumentation,
    TravelBooked,
    PatientArrived,
    FrroRegistration,
    Admission,
    TreatmentInProgress,
    FinalReportMedicine,
    DischargeProcess,
    CreditPaymentUpload,
    InvoiceUploaded,
    FinalPayment,
    PatientDeparted,
    CaseClosed,
}

/// Canonical happy-path order.
pub const STATUS_FLOW: [CaseStatus; 22] = [
    CaseStatus::New,
    CaseStatus::CaseAgentReview,
    CaseStatus::AdminReview,
    CaseStatus::AssignedToHospital,
    CaseStatus::HospitalReview,
    CaseStatus::CaseAccepted,
    CaseStatus::TreatmentPlanUploaded,
    CaseStatus::VisaProcessingDocuments,
    CaseStatus::VisaProcessingPayments,
    CaseStatus::VisaApplied,
    CaseStatus::VisaApproved,
    CaseStatus::PassTravelDocumentation,
    CaseStatus::TravelBooked,
    CaseStatus::PatientArrived,
    CaseStatus::FrroRegistration,
    CaseStatus::Admission,
    CaseStatus::TreatmentInProgress,
    CaseStatus::FinalReportMedicine,
    CaseStatus::DischargeProcess,
    CaseStatus::FinalPayment,
    CaseStatus::PatientDeparted,
    CaseStatus::CaseClosed,
];

/// Semantic severity used by dashboards to colour a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    New,
    Progress,
    Pending,
    Success,
    Error,
    Neutral,
}

impl StatusTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTone::New => "new",
            StatusTone::Progress => "progress",
            StatusTone::Pending => "pending",
            StatusTone::Success => "success",
            StatusTone::Error => "error",
            StatusTone::Neutral => "neutral",
        }
    }
}

impl CaseStatus {
    /// All statuses in declaration order.
    pub const ALL: [CaseStatus; 29] = [
        CaseStatus::New,
        CaseStatus::CaseAgentReview,
        CaseStatus::AdminReview,
        CaseStatus::AssignedToHospital,
        CaseStatus::HospitalReview,
        CaseStatus::CaseAccepted,
        CaseStatus::CaseRejected,
        CaseStatus::TreatmentPlanUploaded,
        CaseStatus::VisaProcessingDocuments,
        CaseStatus::VisaProcessingPayments,
        CaseStatus::VisaApplied,
        CaseStatus::VisaApproved,
        CaseStatus::VisaCopyUploaded,
        CaseStatus::VisaRejected,
        CaseStatus::VisaReapply,
        CaseStatus::VisaTerminate,
        CaseStatus::PassTravelDocumentation,
        CaseStatus::TravelBooked,
        CaseStatus::PatientArrived,
        CaseStatus::FrroRegistration,
        CaseStatus::Admission,
        CaseStatus::TreatmentInProgress,
        CaseStatus::FinalReportMedicine,
        CaseStatus::DischargeProcess,
        CaseStatus::CreditPaymentUpload,
        CaseStatus::InvoiceUploaded,
        CaseStatus::FinalPayment,
        CaseStatus::PatientDeparted,
        CaseStatus::CaseClosed,
    ];

    /// Storage/wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::New => "new",
            CaseStatus::CaseAgentReview => "case_agent_review",
            CaseStatus::AdminReview => "admin_review",
            CaseStatus::AssignedToHospital => "assigned_to_hospital",
            CaseStatus::HospitalReview => "hospital_review",
            CaseStatus::CaseAccepted => "case_accepted",
            CaseStatus::CaseRejected => "case_rejected",
            CaseStatus::TreatmentPlanUploaded => "treatment_plan_uploaded",
            CaseStatus::VisaProcessingDocuments => "visa_processing_documents",
            CaseStatus::VisaProcessingPayments => "visa_processing_payments",
            CaseStatus::VisaApplied => "visa_applied",
            CaseStatus::VisaApproved => "visa_approved",
            CaseStatus::VisaCopyUploaded => "visa_copy_uploaded",
            CaseStatus::VisaRejected => "visa_rejected",
            CaseStatus::VisaReapply => "visa_reapply",
            CaseStatus::VisaTerminate => "visa_terminate",
            CaseStatus::PassTravelDocumentation => "pass_travel_documentation",
            CaseStatus::TravelBooked => "travel_booked",
            CaseStatus::PatientArrived => "patient_arrived",
            CaseStatus::FrroRegistration => "frro_registration",
            CaseStatus::Admission => "admission",
            CaseStatus::TreatmentInProgress => "treatment_in_progress",
            CaseStatus::FinalReportMedicine => "final_report_medicine",
            CaseStatus::DischargeProcess => "discharge_process",
            CaseStatus::CreditPaymentUpload => "credit_payment_upload",
            CaseStatus::InvoiceUploaded => "invoice_uploaded",
            CaseStatus::FinalPayment => "final_payment",
            CaseStatus::PatientDeparted => "patient_departed",
            CaseStatus::CaseClosed => "case_closed",
        }
    }

    /// Human label. `university` switches the two hospital-facing labels
    /// for cases routed to a university instead of a hospital.
    pub fn label(&self, university: bool) -> &'static str {
        match self {
            CaseStatus::New => "New Case",
            CaseStatus::CaseAgentReview => "Agent Review",
            CaseStatus::AdminReview => "Admin Review",
            CaseStatus::AssignedToHospital if university => "Assigned to University",
            CaseStatus::AssignedToHospital => "Assigned to Hospital",
            CaseStatus::HospitalReview if university => "University Review",
            CaseStatus::HospitalReview => "Hospital Review",
            CaseStatus::CaseAccepted => "Case Accepted",
            CaseStatus::CaseRejected => "Case Rejected",
            CaseStatus::TreatmentPlanUploaded => "Treatment Plan Uploaded",
            CaseStatus::VisaProcessingDocuments => "Visa Documents Processing",
            CaseStatus::VisaProcessingPayments => "Visa Payment Processing",
            CaseStatus::VisaApplied => "Visa Applied",
            CaseStatus::VisaApproved => "Visa Approved",
            CaseStatus::VisaCopyUploaded => "Visa Copy Uploaded",
            CaseStatus::VisaRejected => "Visa Rejected",
            CaseStatus::VisaReapply => "Visa Reapply",
            CaseStatus::VisaTerminate => "Visa Terminated",
            CaseStatus::PassTravelDocumentation => "Travel Documentation",
            CaseStatus::TravelBooked => "Travel Booked",
            CaseStatus::PatientArrived => "Patient Arrived",
            CaseStatus::FrroRegistration => "FRRO Registration",
            CaseStatus::Admission => "Hospital Admission",
            CaseStatus::TreatmentInProgress => "Treatment In Progress",
            CaseStatus::FinalReportMedicine => "Final Report & Medicine",
            CaseStatus::DischargeProcess => "Discharge Process",
            CaseStatus::CreditPaymentUpload => "Credit Payment Upload",
            CaseStatus::InvoiceUploaded => "Invoice Uploaded",
            CaseStatus::FinalPayment => "Final Payment",
            CaseStatus::PatientDeparted => "Patient Departed",
            CaseStatus::CaseClosed => "Case Closed",
        }
    }

    pub fn tone(&self) -> StatusTone {
        use CaseStatus::*;

        match self {
            New => StatusTone::New,
            CaseAgentReview | AdminReview | HospitalReview | VisaProcessingDocuments
            | VisaProcessingPayments | VisaApplied | VisaReapply | CreditPaymentUpload
            | InvoiceUploaded | FinalPayment => StatusTone::Pending,
            AssignedToHospital | TreatmentPlanUploaded | VisaCopyUploaded
            | PassTravelDocumentation | TravelBooked | PatientArrived | FrroRegistration
            | Admission | TreatmentInProgress | FinalReportMedicine | DischargeProcess
            | PatientDeparted => StatusTone::Progress,
            CaseAccepted | VisaApproved | CaseClosed => StatusTone::Success,
            CaseRejected | VisaRejected | VisaTerminate => StatusTone::Error,
        }
    }

    /// Position in [`STATUS_FLOW`], `None` for branch markers.
    pub fn flow_index(&self) -> Option<usize> {
        STATUS_FLOW.iter().position(|s| s == self)
    }

    /// Percentage of the happy path covered. Branch markers report 0.
    pub fn progress_percent(&self) -> u8 {
        match self.flow_index() {
            Some(index) => (index * 100 / (STATUS_FLOW.len() - 1)) as u8,
            None => 0,
        }
    }

    /// Terminal states no further work is expected on.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CaseStatus::CaseClosed | CaseStatus::CaseRejected | CaseStatus::VisaTerminate
        )
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for status strings outside the enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown case status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for CaseStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Label for a raw status string; unknown values are returned unchanged.
pub fn status_label(raw: &str, university: bool) -> String {
    match raw.parse::<CaseStatus>() {
        Ok(status) => status.label(university).to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Tone for a raw status string; unknown values are neutral.
pub fn status_tone(raw: &str) -> StatusTone {
    raw.parse::<CaseStatus>()
        .map(|status| status.tone())
        .unwrap_or(StatusTone::Neutral)
}

/// Flow index for a raw status string, -1 when it is not on the flow.
pub fn order_of(raw: &str) -> i32 {
    raw.parse::<CaseStatus>()
        .ok()
        .and_then(|status| status.flow_index())
        .map(|index| index as i32)
        .unwrap_or(-1)
}
