pub mod actions;
pub mod actor;
pub mod aggregation;
pub mod calendar;
pub mod eligibility;
pub mod error;
pub mod gateway;
pub mod status;

pub use actions::{ActionCoordinator, ActionError};
pub use actor::{Actor, Role};
pub use error::{EntityKind, GuardViolation, TransitionError};
