//! Role and stage permission rules.
//!
//! Pure functions over (role, status); nothing here touches storage.

mod documents;
mod transitions;

pub use documents::*;
pub use transitions::*;
