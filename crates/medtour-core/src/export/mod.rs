//! Payment ledger and audit-trail exports.

mod audit_trail;
mod payments;

pub use audit_trail::*;
pub use payments::*;

/// Escape a field for CSV output.
pub(crate) fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
