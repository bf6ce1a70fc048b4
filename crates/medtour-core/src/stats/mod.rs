//! Role-scoped case lists, dashboard counters and case search.
//!
//! Everything here reads an [`AppSnapshot`]; nothing touches storage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use crate::db::AppSnapshot;
use crate::models::{Case, CaseStatus, PaymentStatus, Priority, Role, StatusTone, User};

/// Statuses where finance has work to do even before any payment is recorded.
const PAYMENT_GATED: [CaseStatus; 4] = [
    CaseStatus::VisaProcessingPayments,
    CaseStatus::CreditPaymentUpload,
    CaseStatus::InvoiceUploaded,
    CaseStatus::FinalPayment,
];

/// Minimum Jaro-Winkler similarity for a name match.
const NAME_MATCH_THRESHOLD: f64 = 0.85;

/// Cases `user` is allowed to see.
pub fn cases_for<'s>(user: &User, snapshot: &'s AppSnapshot) -> Vec<&'s Case> {
    snapshot
        .cases
        .iter()
        .filter(|case| visible_to(user, case))
        .collect()
}

fn visible_to(user: &User, case: &Case) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Agent => case.created_by == user.id,
        Role::Client => case.client_user_id.as_deref() == Some(user.id.as_str()),
        Role::Hospital => case
            .assigned_hospital
            .as_deref()
            .is_some_and(|h| user.is_affiliated_with(h)),
        Role::Finance => !case.payments.is_empty() || PAYMENT_GATED.contains(&case.status),
    }
}

/// Totals shown on a dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: u32,
    pub by_tone: BTreeMap<StatusTone, u32>,
    pub by_status: BTreeMap<String, u32>,
    pub urgent: u32,
    pub high_priority: u32,
    pub closed: u32,
    /// Closed, rejected or terminated
    pub terminal: u32,
    /// Currency → amount still pending
    pub pending_payments: BTreeMap<String, f64>,
    /// Currency → amount received
    pub completed_payments: BTreeMap<String, f64>,
}

impl DashboardStats {
    pub fn compute<'c, I>(cases: I) -> Self
    where
        I: IntoIterator<Item = &'c Case>,
    {
        let mut stats = Self::default();

        for case in cases {
            stats.total += 1;
            *stats.by_tone.entry(case.status.tone()).or_default() += 1;
            *stats.by_status.entry(case.status.as_str().to_string()).or_default() += 1;

            match case.priority {
                Priority::Urgent => stats.urgent += 1,
                Priority::High => stats.high_priority += 1,
                _ => {}
            }
            if case.status == CaseStatus::CaseClosed {
                stats.closed += 1;
            }
            if case.status.is_terminal() {
                stats.terminal += 1;
            }

            for payment in &case.payments {
                let bucket = match payment.status {
                    PaymentStatus::Pending => &mut stats.pending_payments,
                    PaymentStatus::Completed => &mut stats.completed_payments,
                    PaymentStatus::Failed => continue,
                };
                *bucket.entry(payment.currency.clone()).or_default() += payment.amount;
            }
        }

        stats
    }

    /// Cases still being worked on.
    pub fn active(&self) -> u32 {
        self.total - self.terminal
    }
}

/// Find cases by id prefix or approximate patient name, best match first.
pub fn search_cases<'c>(cases: &[&'c Case], query: &str) -> Vec<&'c Case> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return cases.to_vec();
    }

    let mut scored: Vec<(f64, &Case)> = cases
        .iter()
        .filter_map(|case| {
            let score = match_score(case, &query);
            (score > 0.0).then_some((score, *case))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, case)| case).collect()
}

fn match_score(case: &Case, query: &str) -> f64 {
    if case.id.to_lowercase().starts_with(query) {
        return 2.0;
    }

    let name = case.patient_name().to_lowercase();
    if name.contains(query) {
        return 1.5;
    }

    // Best of whole-name and per-word similarity
    let best = std::iter::once(name.as_str())
        .chain(name.split_whitespace())
        .map(|part| jaro_winkler(part, query))
        .fold(0.0, f64::max);

    if best >= NAME_MATCH_THRESHOLD {
        best
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        timestamp_now, Actor, NewCase, NewPayment, PaymentType,
    };

    fn user(id: &str, role: Role, hospitals: &[&str]) -> User {
        User {
            id: id.into(),
            username: id.into(),
            credential_hash: String::new(),
            role,
            full_name: id.into(),
            email: None,
            phone: None,
            password_changed: true,
            hospital_ids: hospitals.iter().map(|h| h.to_string()).collect(),
            created_at: timestamp_now(),
        }
    }

    fn case_by(agent: &str, patient: &str) -> Case {
        Case::open(
            NewCase::for_patient(patient),
            &Actor::new(agent, agent, Role::Agent),
        )
    }

    fn payment(amount: f64, status: PaymentStatus) -> NewPayment {
        NewPayment {
            payment_type: PaymentType::Treatment,
            amount,
            currency: "USD".into(),
            status,
            method: "card".into(),
            reference: "REF".into(),
            date: "2024-02-01".into(),
            processed_by: None,
            notes: None,
        }
    }

    fn snapshot() -> AppSnapshot {
        let mut mine = case_by("agent_1", "Jane Doe");
        mine.client_user_id = Some("client_1".into());
        mine.assigned_hospital = Some("hospital_a".into());

        let mut theirs = case_by("agent_2", "Ravi Kumar");
        theirs.payments.push(payment(100.0, PaymentStatus::Pending).into_record("payment_1".into()));

        let mut gated = case_by("agent_2", "Maria Lopez");
        gated.status = CaseStatus::InvoiceUploaded;

        AppSnapshot {
            cases: vec![mine, theirs, gated],
            ..Default::default()
        }
    }

    #[test]
    fn test_role_scoping() {
        let snap = snapshot();

        assert_eq!(cases_for(&user("admin", Role::Admin, &[]), &snap).len(), 3);
        assert_eq!(cases_for(&user("agent_1", Role::Agent, &[]), &snap).len(), 1);
        assert_eq!(cases_for(&user("agent_2", Role::Agent, &[]), &snap).len(), 2);
        assert_eq!(cases_for(&user("client_1", Role::Client, &[]), &snap).len(), 1);
        assert_eq!(
            cases_for(&user("h", Role::Hospital, &["hospital_a"]), &snap).len(),
            1
        );
        assert!(cases_for(&user("h", Role::Hospital, &["hospital_b"]), &snap).is_empty());
        assert_eq!(cases_for(&user("fin", Role::Finance, &[]), &snap).len(), 2);
    }

    #[test]
    fn test_dashboard_counts() {
        let mut snap = snapshot();
        snap.cases[0].priority = Priority::Urgent;
        snap.cases[1]
            .payments
            .push(payment(40.0, PaymentStatus::Completed).into_record("payment_2".into()));
        snap.cases[2].status = CaseStatus::CaseClosed;

        let stats = DashboardStats::compute(&snap.cases);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.urgent, 1);
        assert_eq!(stats.closed, 1);
        assert_eq!(stats.terminal, 1);
        assert_eq!(stats.active(), 2);
        assert_eq!(stats.by_status.get("new"), Some(&2));
        assert_eq!(stats.by_tone.get(&StatusTone::Success), Some(&1));
        assert_eq!(stats.pending_payments.get("USD"), Some(&100.0));
        assert_eq!(stats.completed_payments.get("USD"), Some(&40.0));
    }

    #[test]
    fn test_dead_ends_are_not_active() {
        let mut snap = snapshot();
        snap.cases[0].status = CaseStatus::CaseRejected;
        snap.cases[1].status = CaseStatus::VisaTerminate;

        let stats = DashboardStats::compute(&snap.cases);
        assert_eq!(stats.closed, 0);
        assert_eq!(stats.terminal, 2);
        assert_eq!(stats.active(), 1);
    }

    #[test]
    fn test_search_by_name_and_id() {
        let snap = snapshot();
        let all: Vec<&Case> = snap.cases.iter().collect();

        let hits = search_cases(&all, "jane");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].patient_name(), "Jane Doe");

        // Misspelt surname still matches
        let hits = search_cases(&all, "kumaar");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].patient_name(), "Ravi Kumar");

        let prefix = &snap.cases[2].id[..10];
        let hits = search_cases(&all, prefix);
        assert_eq!(hits[0].id, snap.cases[2].id);

        assert_eq!(search_cases(&all, "  ").len(), 3);
        assert!(search_cases(&all, "zzzzzz").is_empty());
    }
}
