//! Rule-based auto-responder for client quick-reply messages.
//!
//! When a client sends one of the preset quick replies on a case, the
//! coordinator desk answers immediately with a canned message picked from the
//! case's current stage and the keywords in the message. The whole thing is a
//! pure function: same status + same message always gives the same reply.

pub mod replies;
pub mod responder;

pub use replies::*;
pub use responder::*;
