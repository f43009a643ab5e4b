use chrono::NaiveDate;
use std::fmt;

use super::calendar::Term;
use super::status::{EvaluationId, OfferId, OfferStatus};

/// Upper bound on the free-text message attached to a convocation.
pub const MAX_CONVOCATION_MESSAGE_LEN: usize = 500;

/// A precondition known locally failed; the collaborator is never contacted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardViolation {
    #[error("offer {offer_id} starts on {start_date}, before {today}; it cannot be re-enabled")]
    OfferStartPassed {
        offer_id: OfferId,
        start_date: NaiveDate,
        today: NaiveDate,
    },
    #[error("offer {offer_id} is {status}; candidature actions require a published offer")]
    OfferNotPublished {
        offer_id: OfferId,
        status: OfferStatus,
    },
    #[error("convocation date is required")]
    MissingConvocationDate,
    #[error("convocation location is required")]
    MissingConvocationLocation,
    #[error("convocation message is {length} characters (max {max})")]
    ConvocationMessageTooLong { length: usize, max: usize },
    #[error("no supervising teacher is assigned yet")]
    TeacherNotAssigned,
    #[error("evaluation {0} already exists for this student and offer")]
    EvaluationAlreadyExists(EvaluationId),
    #[error("term {0} is outside the selectable window")]
    TermOutsideWindow(Term),
}

/// Entities governed by a state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Offer,
    Candidature,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Offer => f.write_str("offer"),
            EntityKind::Candidature => f.write_str("candidature"),
        }
    }
}

/// Failure of a pure state transition.
///
/// `InvalidTransition` always points at a caller bug or stale UI state, so it stays distinct from
/// business-rule guard failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error(transparent)]
    Guard(#[from] GuardViolation),
    #[error("cannot {action} {entity} while it is {from}")]
    InvalidTransition {
        entity: EntityKind,
        action: &'static str,
        from: &'static str,
    },
}

impl TransitionError {
    pub fn is_guard(&self) -> bool {
        matches!(self, TransitionError::Guard(_))
    }
}
