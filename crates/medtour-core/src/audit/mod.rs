//! Tamper-evident ledger of case activity.
//!
//! Every activity-log entry the workflow writes is also committed as a leaf
//! of an append-only SHA-256 Merkle tree. Inclusion proofs let an auditor
//! check that an entry existed when a given root was published.

mod ledger;
mod proof;

pub use ledger::*;
pub use proof::*;
