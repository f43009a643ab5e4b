use chrono::NaiveDate;

use super::domain::{Offer, OfferStatus};
use crate::workflows::error::{EntityKind, GuardViolation, TransitionError};

/// Actions an employer may take on their own offer. Validation and rejection are decided by
/// the program administration and only observed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferAction {
    Disable,
    Enable,
}

impl OfferAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disable => "disable",
            Self::Enable => "enable",
        }
    }

    const fn source(self) -> OfferStatus {
        match self {
            Self::Disable => OfferStatus::Published,
            Self::Enable => OfferStatus::Disabled,
        }
    }

    const fn target(self) -> OfferStatus {
        match self {
            Self::Disable => OfferStatus::Disabled,
            Self::Enable => OfferStatus::Published,
        }
    }
}

/// Whether `action` is listed for the offer's current state, ignoring guards.
pub fn permits(status: OfferStatus, action: OfferAction) -> bool {
    action.source() == status
}

/// An offer can only go back on the board if it has not started yet.
pub fn start_guard(offer: &Offer, now: NaiveDate) -> Result<(), GuardViolation> {
    if offer.start_date >= now {
        Ok(())
    } else {
        Err(GuardViolation::OfferStartPassed {
            offer_id: offer.id.clone(),
            start_date: offer.start_date,
            today: now,
        })
    }
}

pub fn disable(offer: &Offer) -> Result<Offer, TransitionError> {
    apply(offer, OfferAction::Disable)
}

pub fn enable(offer: &Offer, now: NaiveDate) -> Result<Offer, TransitionError> {
    check_source(offer, OfferAction::Enable)?;
    start_guard(offer, now)?;
    apply(offer, OfferAction::Enable)
}

fn check_source(offer: &Offer, action: OfferAction) -> Result<(), TransitionError> {
    if permits(offer.status, action) {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition {
            entity: EntityKind::Offer,
            action: action.label(),
            from: offer.status.label(),
        })
    }
}

fn apply(offer: &Offer, action: OfferAction) -> Result<Offer, TransitionError> {
    check_source(offer, action)?;
    Ok(Offer {
        status: action.target(),
        ..offer.clone()
    })
}
