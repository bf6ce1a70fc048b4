//! Who may upload which documents at which stage.

use std::collections::BTreeSet;

use crate::models::{CaseStatus, DocumentCategory, DocumentType, Role};

/// What a (role, status) pair grants before already-uploaded types are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grant {
    None,
    Everything,
    Category(DocumentCategory),
    Only(DocumentType),
}

fn grant_for(role: Role, status: CaseStatus) -> Grant {
    use CaseStatus as S;

    match (role, status) {
        (Role::Admin, _) => Grant::Everything,
        (Role::Client, _) => Grant::None,

        (Role::Agent, S::New | S::CaseAgentReview) => Grant::Category(DocumentCategory::Initial),
        (Role::Agent, S::VisaApproved | S::VisaCopyUploaded) => Grant::Only(DocumentType::VisaCopy),
        (Role::Agent, S::PassTravelDocumentation) => Grant::Category(DocumentCategory::Travel),
        (Role::Agent, S::CreditPaymentUpload) => Grant::Only(DocumentType::CreditPaymentProof),

        (Role::Hospital, S::CaseAccepted | S::TreatmentPlanUploaded | S::TreatmentInProgress) => {
            Grant::Category(DocumentCategory::Treatment)
        }
        (Role::Hospital, S::FinalReportMedicine | S::DischargeProcess) => {
            Grant::Category(DocumentCategory::Discharge)
        }

        (Role::Finance, S::VisaProcessingPayments | S::CreditPaymentUpload | S::InvoiceUploaded) => {
            Grant::Category(DocumentCategory::Financial)
        }

        _ => Grant::None,
    }
}

/// Every catalogued type, across all categories.
pub fn all_document_types() -> BTreeSet<DocumentType> {
    DocumentCategory::ALL
        .iter()
        .flat_map(|category| category.types().iter().copied())
        .collect()
}

/// Types `role` may upload on a case in `status`, excluding types already on
/// the case. Re-uploading a type is never offered, although the engine will
/// store a duplicate if asked directly.
pub fn available_document_types(
    role: Role,
    status: CaseStatus,
    uploaded: &[DocumentType],
) -> BTreeSet<DocumentType> {
    let remaining: BTreeSet<DocumentType> = all_document_types()
        .into_iter()
        .filter(|t| !uploaded.contains(t))
        .collect();

    match grant_for(role, status) {
        Grant::None => BTreeSet::new(),
        Grant::Everything => remaining,
        Grant::Category(category) => remaining
            .into_iter()
            .filter(|t| category.types().contains(t))
            .collect(),
        Grant::Only(doc_type) => remaining
            .into_iter()
            .filter(|t| *t == doc_type)
            .collect(),
    }
}

/// Documents `role` is expected to provide at `status`.
pub fn required_documents(role: Role, status: CaseStatus) -> Vec<DocumentType> {
    match (role, status) {
        (Role::Agent, CaseStatus::New | CaseStatus::CaseAgentReview) => {
            DocumentCategory::Initial.types().to_vec()
        }
        (Role::Agent, CaseStatus::VisaApproved) => vec![DocumentType::VisaCopy],
        _ => Vec::new(),
    }
}

/// Required documents not yet on the case.
pub fn missing_required_documents(
    role: Role,
    status: CaseStatus,
    uploaded: &[DocumentType],
) -> Vec<DocumentType> {
    required_documents(role, status)
        .into_iter()
        .filter(|t| !uploaded.contains(t))
        .collect()
}

pub fn is_document_type_allowed(doc_type: DocumentType, role: Role, status: CaseStatus) -> bool {
    available_document_types(role, status, &[]).contains(&doc_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::select;

    #[test]
    fn test_agent_intake_gets_initial_category() {
        let types = available_document_types(Role::Agent, CaseStatus::New, &[]);
        let expected: BTreeSet<_> = DocumentCategory::Initial.types().iter().copied().collect();
        assert_eq!(types, expected);
    }

    #[test]
    fn test_uploaded_types_removed() {
        let types = available_document_types(
            Role::Agent,
            CaseStatus::CaseAgentReview,
            &[DocumentType::Passport, DocumentType::MedicalReports],
        );
        assert_eq!(types.len(), 5);
        assert!(!types.contains(&DocumentType::Passport));
        assert!(!types.contains(&DocumentType::MedicalReports));
    }

    #[test]
    fn test_agent_visa_copy_only() {
        let types = available_document_types(Role::Agent, CaseStatus::VisaApproved, &[]);
        assert_eq!(types.into_iter().collect::<Vec<_>>(), vec![DocumentType::VisaCopy]);

        let types = available_document_types(
            Role::Agent,
            CaseStatus::VisaCopyUploaded,
            &[DocumentType::VisaCopy],
        );
        assert!(types.is_empty());
    }

    #[test]
    fn test_agent_credit_payment_proof_only() {
        let types = available_document_types(Role::Agent, CaseStatus::CreditPaymentUpload, &[]);
        assert_eq!(
            types.into_iter().collect::<Vec<_>>(),
            vec![DocumentType::CreditPaymentProof]
        );
    }

    #[test]
    fn test_hospital_treatment_and_discharge() {
        let treatment = available_document_types(Role::Hospital, CaseStatus::CaseAccepted, &[]);
        assert!(treatment.contains(&DocumentType::MedicalReports));
        assert!(treatment.contains(&DocumentType::TreatmentPlan));
        assert!(!treatment.contains(&DocumentType::DischargeSummary));

        let discharge =
            available_document_types(Role::Hospital, CaseStatus::DischargeProcess, &[]);
        assert!(discharge.contains(&DocumentType::DischargeSummary));
        assert!(!discharge.contains(&DocumentType::TreatmentPlan));

        assert!(available_document_types(Role::Hospital, CaseStatus::New, &[]).is_empty());
    }

    #[test]
    fn test_finance_financial_statuses() {
        for status in [
            CaseStatus::VisaProcessingPayments,
            CaseStatus::CreditPaymentUpload,
            CaseStatus::InvoiceUploaded,
        ] {
            let types = available_document_types(Role::Finance, status, &[]);
            assert!(types.contains(&DocumentType::Invoice));
            assert_eq!(types.len(), DocumentCategory::Financial.types().len());
        }
        assert!(available_document_types(Role::Finance, CaseStatus::New, &[]).is_empty());
    }

    #[test]
    fn test_admin_gets_all_remaining() {
        let all = available_document_types(Role::Admin, CaseStatus::CaseClosed, &[]);
        assert_eq!(all, all_document_types());

        let fewer =
            available_document_types(Role::Admin, CaseStatus::New, &[DocumentType::Invoice]);
        assert_eq!(fewer.len(), all.len() - 1);
    }

    #[test]
    fn test_required_documents() {
        assert_eq!(required_documents(Role::Agent, CaseStatus::New).len(), 7);
        assert_eq!(required_documents(Role::Agent, CaseStatus::CaseAgentReview).len(), 7);
        assert_eq!(
            required_documents(Role::Agent, CaseStatus::VisaApproved),
            vec![DocumentType::VisaCopy]
        );
        assert!(required_documents(Role::Admin, CaseStatus::New).is_empty());
        assert!(required_documents(Role::Agent, CaseStatus::CaseClosed).is_empty());

        let missing = missing_required_documents(
            Role::Agent,
            CaseStatus::New,
            &[DocumentType::Passport],
        );
        assert_eq!(missing.len(), 6);
    }

    #[test]
    fn test_is_document_type_allowed() {
        assert!(is_document_type_allowed(
            DocumentType::Passport,
            Role::Agent,
            CaseStatus::New
        ));
        assert!(!is_document_type_allowed(
            DocumentType::Passport,
            Role::Client,
            CaseStatus::New
        ));
        assert!(!is_document_type_allowed(
            DocumentType::Invoice,
            Role::Agent,
            CaseStatus::New
        ));
    }

    fn any_status() -> impl Strategy<Value = CaseStatus> {
        select(CaseStatus::ALL.to_vec())
    }

    fn any_role() -> impl Strategy<Value = Role> {
        select(Role::ALL.to_vec())
    }

    fn any_uploaded() -> impl Strategy<Value = Vec<DocumentType>> {
        proptest::collection::vec(select(DocumentType::ALL.to_vec()), 0..8)
    }

    proptest! {
        #[test]
        fn prop_client_never_uploads(status in any_status(), uploaded in any_uploaded()) {
            prop_assert!(available_document_types(Role::Client, status, &uploaded).is_empty());
        }

        #[test]
        fn prop_admin_is_superset(status in any_status(), role in any_role()) {
            let admin = available_document_types(Role::Admin, status, &[]);
            let other = available_document_types(role, status, &[]);
            prop_assert!(admin.is_superset(&other));
        }

        #[test]
        fn prop_uploaded_never_offered(
            status in any_status(),
            role in any_role(),
            uploaded in any_uploaded(),
        ) {
            let available = available_document_types(role, status, &uploaded);
            for t in &uploaded {
                prop_assert!(!available.contains(t));
            }
        }
    }
}
