//! Canned reply table for the coordinator auto-responder.

use serde::{Deserialize, Serialize};

/// Stage of the case lifecycle a reply is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    /// Intake and agent review
    Intake,
    /// Admin review and hospital matching
    Review,
    /// Hospital review, acceptance/rejection and treatment planning
    HospitalDecision,
    /// Visa processing
    Visa,
    /// Travel, arrival and registration
    Travel,
    /// Treatment, final report and discharge
    Treatment,
    /// Payments and invoices
    Payment,
    /// Departure and closure
    Closure,
}

/// What the client is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    StatusUpdate,
    Appointment,
    Hospital,
    Treatment,
    TravelVisa,
}

/// Status substring predicates, checked in order. First match wins.
pub const STATUS_BUCKETS: &[(StatusBucket, &[&str])] = &[
    (StatusBucket::Intake, &["new", "agent_review"]),
    (StatusBucket::Review, &["admin_review", "assigned"]),
    (
        StatusBucket::HospitalDecision,
        &["hospital_review", "case_accepted", "case_rejected", "treatment_plan"],
    ),
    (StatusBucket::Visa, &["visa"]),
    (
        StatusBucket::Travel,
        &["travel", "arrived", "frro", "admission"],
    ),
    (
        StatusBucket::Treatment,
        &["treatment", "final_report", "discharge"],
    ),
    (StatusBucket::Payment, &["payment", "invoice"]),
    (StatusBucket::Closure, &["closed", "departed"]),
];

/// Message keyword predicates, checked in order. First match wins.
pub const TOPIC_KEYWORDS: &[(Topic, &[&str])] = &[
    (Topic::StatusUpdate, &["update", "status"]),
    (Topic::Appointment, &["appointment", "when"]),
    (Topic::Hospital, &["hospital"]),
    (Topic::Treatment, &["treatment"]),
    (Topic::TravelVisa, &["travel", "visa"]),
];

/// Reply when the case status matches no bucket.
pub const GENERIC_ACKNOWLEDGEMENT: &str =
    "Thank you for reaching out. Our team has received your message and will respond shortly.";

pub const THANK_YOU_REPLY: &str =
    "You're welcome! We're here to help you throughout your medical journey.";

pub const HELP_REPLY: &str =
    "I'm here to help. You can ask about your case status, appointments, hospital, treatment or travel arrangements.";

pub const DOCUMENT_REPLY: &str =
    "You can view all documents shared on your case in the Documents section. Your agent will let you know if anything else is needed.";

pub const DEFAULT_REPLY: &str =
    "Thank you for your message. Your care coordinator will get back to you shortly.";

/// Look up the canned reply for a stage and topic.
pub fn canned_reply(bucket: StatusBucket, topic: Topic) -> &'static str {
    use StatusBucket as B;
    use Topic as T;

    match (bucket, topic) {
        (B::Intake, T::StatusUpdate) => "Your case has been received and is being reviewed by our coordination team. We will update you within 24-48 hours.",
        (B::Intake, T::Appointment) => "We are reviewing your medical documents. Once the review is complete, we will share hospital and appointment options with you.",
        (B::Intake, T::Hospital) => "We will recommend suitable hospitals after our team reviews your medical reports.",
        (B::Intake, T::Treatment) => "Treatment options will be discussed once our medical team has reviewed your reports.",
        (B::Intake, T::TravelVisa) => "Visa and travel arrangements begin after a hospital accepts your case. We will guide you through every step.",

        (B::Review, T::StatusUpdate) => "Your case is under review and is being matched with a suitable hospital.",
        (B::Review, T::Appointment) => "Appointment scheduling starts once the assigned hospital has reviewed your case.",
        (B::Review, T::Hospital) => "We are coordinating with partner hospitals that specialise in your treatment. The assigned hospital will review your case shortly.",
        (B::Review, T::Treatment) => "The hospital will propose a treatment plan after reviewing your case.",
        (B::Review, T::TravelVisa) => "Travel planning begins once the hospital accepts your case.",

        (B::HospitalDecision, T::StatusUpdate) => "The hospital is reviewing your case. We will share their decision and treatment plan as soon as we receive it.",
        (B::HospitalDecision, T::Appointment) => "Your appointment will be confirmed together with the treatment plan from the hospital.",
        (B::HospitalDecision, T::Hospital) => "The hospital's medical team is evaluating your reports. We will notify you once they respond.",
        (B::HospitalDecision, T::Treatment) => "Your treatment plan is being prepared by the hospital. You will be able to review it in your case documents.",
        (B::HospitalDecision, T::TravelVisa) => "Once you approve the treatment plan, we will start your visa process.",

        (B::Visa, T::StatusUpdate) => "Your visa application is being processed. We will notify you as soon as there is an update from the embassy.",
        (B::Visa, T::Appointment) => "Your hospital appointment will be scheduled around your visa approval and travel dates.",
        (B::Visa, T::Hospital) => "The hospital has accepted your case and is waiting for your visa to be approved.",
        (B::Visa, T::Treatment) => "Your treatment plan is confirmed. Treatment will begin after you arrive.",
        (B::Visa, T::TravelVisa) => "Visa processing usually takes 3-5 working days. Please keep your passport and documents ready.",

        (B::Travel, T::StatusUpdate) => "Your travel arrangements are in progress. Tickets and accommodation details will be shared in your case documents.",
        (B::Travel, T::Appointment) => "Your first hospital appointment will be scheduled shortly after your arrival.",
        (B::Travel, T::Hospital) => "Our representative will accompany you to the hospital after you arrive.",
        (B::Travel, T::Treatment) => "Treatment begins after hospital admission. The hospital team will brief you on the first day.",
        (B::Travel, T::TravelVisa) => "Please carry your passport, visa copy and medical reports. Our team will receive you at the airport.",

        (B::Treatment, T::StatusUpdate) => "Your treatment is in progress. The hospital will share regular updates with our team.",
        (B::Treatment, T::Appointment) => "Your follow-up appointments are managed by the hospital. Please check with the ward coordinator for timings.",
        (B::Treatment, T::Hospital) => "The hospital team is taking care of you. Contact our representative anytime if you need assistance.",
        (B::Treatment, T::Treatment) => "Your doctors will share the final report and medicines before discharge.",
        (B::Treatment, T::TravelVisa) => "Return travel will be arranged once the doctors confirm you are fit to fly.",

        (B::Payment, T::StatusUpdate) => "Your payment is being processed by our finance team. You will receive a confirmation once it is complete.",
        (B::Payment, T::Appointment) => "Your appointments are not affected while the payment is being processed.",
        (B::Payment, T::Hospital) => "The hospital has been informed about your payment status.",
        (B::Payment, T::Treatment) => "Treatment charges are listed in your invoice. Contact our finance team for a detailed breakdown.",
        (B::Payment, T::TravelVisa) => "Travel and visa fees are included in your payment summary.",

        (B::Closure, T::StatusUpdate) => "Your case has been completed. Thank you for trusting us with your care.",
        (B::Closure, T::Appointment) => "For follow-up consultations, please contact your agent and we will arrange a teleconsultation.",
        (B::Closure, T::Hospital) => "The hospital's discharge summary is available in your case documents.",
        (B::Closure, T::Treatment) => "Please follow the medication and care instructions in your discharge summary.",
        (B::Closure, T::TravelVisa) => "We hope you had a safe journey home. Reach out anytime if you need assistance.",
    }
}
