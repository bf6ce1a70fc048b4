//! Optional transition rules for callers that want stricter status changes.
//!
//! The workflow engine accepts any status from any caller. Presentation code
//! that wants to restrict the "next status" choices a role is offered checks
//! them here before calling [`crate::workflow::WorkflowEngine::update_status`].

use thiserror::Error;

use crate::models::{CaseStatus, Role};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("{role} may not move a case from {from} to {to}")]
    NotPermitted {
        role: Role,
        from: CaseStatus,
        to: CaseStatus,
    },
}

use CaseStatus as S;

/// (role, from) → statuses that role may move the case to.
const RULES: &[(Role, CaseStatus, &[CaseStatus])] = &[
    // Agent: intake, visa and travel legs
    (Role::Agent, S::New, &[S::CaseAgentReview]),
    (Role::Agent, S::CaseAgentReview, &[S::AdminReview]),
    (Role::Agent, S::TreatmentPlanUploaded, &[S::VisaProcessingDocuments]),
    (Role::Agent, S::VisaProcessingDocuments, &[S::VisaProcessingPayments]),
    (Role::Agent, S::VisaApplied, &[S::VisaApproved, S::VisaRejected]),
    (Role::Agent, S::VisaApproved, &[S::VisaCopyUploaded, S::PassTravelDocumentation]),
    (Role::Agent, S::VisaCopyUploaded, &[S::PassTravelDocumentation]),
    (Role::Agent, S::VisaRejected, &[S::VisaReapply, S::VisaTerminate]),
    (Role::Agent, S::VisaReapply, &[S::VisaProcessingDocuments]),
    (Role::Agent, S::PassTravelDocumentation, &[S::TravelBooked]),
    (Role::Agent, S::TravelBooked, &[S::PatientArrived]),
    (Role::Agent, S::PatientArrived, &[S::FrroRegistration]),
    (Role::Agent, S::FrroRegistration, &[S::Admission]),
    (Role::Agent, S::FinalPayment, &[S::PatientDeparted]),
    // Hospital: review, treatment and discharge
    (Role::Hospital, S::AssignedToHospital, &[S::HospitalReview]),
    (Role::Hospital, S::HospitalReview, &[S::CaseAccepted, S::CaseRejected]),
    (Role::Hospital, S::CaseAccepted, &[S::TreatmentPlanUploaded]),
    (Role::Hospital, S::Admission, &[S::TreatmentInProgress]),
    (Role::Hospital, S::TreatmentInProgress, &[S::FinalReportMedicine]),
    (Role::Hospital, S::FinalReportMedicine, &[S::DischargeProcess]),
    // Finance: payment checkpoints
    (Role::Finance, S::VisaProcessingPayments, &[S::VisaApplied]),
    (
        Role::Finance,
        S::DischargeProcess,
        &[S::CreditPaymentUpload, S::InvoiceUploaded, S::FinalPayment],
    ),
    (Role::Finance, S::CreditPaymentUpload, &[S::InvoiceUploaded]),
    (Role::Finance, S::InvoiceUploaded, &[S::FinalPayment]),
];

/// Caller-side transition rules. Admins may set any status; clients none.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionPolicy;

impl TransitionPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Statuses `role` may move a case in `from` to.
    pub fn allowed_targets(&self, role: Role, from: CaseStatus) -> Vec<CaseStatus> {
        match role {
            Role::Admin => CaseStatus::ALL
                .iter()
                .copied()
                .filter(|s| *s != from)
                .collect(),
            Role::Client => Vec::new(),
            _ => RULES
                .iter()
                .filter(|(r, f, _)| *r == role && *f == from)
                .flat_map(|(_, _, targets)| targets.iter().copied())
                .collect(),
        }
    }

    pub fn is_allowed(&self, role: Role, from: CaseStatus, to: CaseStatus) -> bool {
        self.allowed_targets(role, from).contains(&to)
    }

    pub fn check(&self, role: Role, from: CaseStatus, to: CaseStatus) -> Result<(), TransitionError> {
        if self.is_allowed(role, from, to) {
            Ok(())
        } else {
            Err(TransitionError::NotPermitted { role, from, to })
        }
    }
}
