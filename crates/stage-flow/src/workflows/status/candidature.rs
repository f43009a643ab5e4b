use super::domain::{Candidature, CandidatureStatus, Convocation, ConvocationDraft};
use crate::workflows::error::{EntityKind, TransitionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidatureAction {
    Convoke,
    Accept,
    Reject,
}

impl CandidatureAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Convoke => "convoke",
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }
}

/// The one transition table for candidatures: `(source, action, target)`.
///
/// Rejection is only listed from `CONVENED`. Some screens also allowed rejecting a pending
/// candidature; that variant is intentionally not encoded until the rule is confirmed.
pub const TRANSITIONS: [(CandidatureStatus, CandidatureAction, CandidatureStatus); 3] = [
    (
        CandidatureStatus::Pending,
        CandidatureAction::Convoke,
        CandidatureStatus::Convened,
    ),
    (
        CandidatureStatus::Convened,
        CandidatureAction::Accept,
        CandidatureStatus::Accepted,
    ),
    (
        CandidatureStatus::Convened,
        CandidatureAction::Reject,
        CandidatureStatus::Rejected,
    ),
];

pub fn target(status: CandidatureStatus, action: CandidatureAction) -> Option<CandidatureStatus> {
    TRANSITIONS
        .iter()
        .find(|(source, candidate, _)| *source == status && *candidate == action)
        .map(|(_, _, target)| *target)
}

pub fn permits(status: CandidatureStatus, action: CandidatureAction) -> bool {
    target(status, action).is_some()
}

/// Invites a pending candidate to an interview. The state is checked before the draft, so a
/// stale screen sees `InvalidTransition` even with an incomplete form.
pub fn convoke(
    candidature: &Candidature,
    draft: &ConvocationDraft,
) -> Result<Candidature, TransitionError> {
    let status = next_status(candidature, CandidatureAction::Convoke)?;
    let convocation = Convocation::from_draft(draft)?;

    Ok(Candidature {
        status,
        convocation: Some(convocation),
        ..candidature.clone()
    })
}

pub fn accept(candidature: &Candidature) -> Result<Candidature, TransitionError> {
    let status = next_status(candidature, CandidatureAction::Accept)?;
    Ok(Candidature {
        status,
        ..candidature.clone()
    })
}

pub fn reject(candidature: &Candidature) -> Result<Candidature, TransitionError> {
    let status = next_status(candidature, CandidatureAction::Reject)?;
    Ok(Candidature {
        status,
        ..candidature.clone()
    })
}

fn next_status(
    candidature: &Candidature,
    action: CandidatureAction,
) -> Result<CandidatureStatus, TransitionError> {
    target(candidature.status, action).ok_or(TransitionError::InvalidTransition {
        entity: EntityKind::Candidature,
        action: action.label(),
        from: candidature.status.label(),
    })
}
