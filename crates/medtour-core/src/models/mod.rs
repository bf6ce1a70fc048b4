//! Domain models for the medtour system.

mod case;
mod document;
mod hospital;
mod ids;
mod notification;
mod payment;
mod status;
mod user;

pub use case::*;
pub use document::*;
pub use hospital::*;
pub use ids::*;
pub use notification::*;
pub use payment::*;
pub use status::*;
pub use user::*;
