use chrono::NaiveDate;
use serde::Serialize;

use crate::workflows::gateway::{EvaluationCheck, TeacherAssignment};
use crate::workflows::status::candidature::{self as candidature_rules, CandidatureAction};
use crate::workflows::error::GuardViolation;
use crate::workflows::status::evaluation::ensure_can_create_evaluation;
use crate::workflows::status::offer::{self as offer_rules, OfferAction};
use crate::workflows::status::{Candidature, EnrollmentPair, EvaluationId, Offer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferActions {
    pub can_preview: bool,
    pub can_disable: bool,
    pub can_enable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatureActions {
    pub can_convoke: bool,
    pub can_accept: bool,
    pub can_reject: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationActionKind {
    Create,
    View,
    Blocked,
}

/// What the evaluation cell links to for one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationAction {
    pub action: EvaluationActionKind,
    pub pair: EnrollmentPair,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_id: Option<EvaluationId>,
    /// Why creation is refused; set only for `BLOCKED`.
    #[serde(skip)]
    pub blocked_by: Option<GuardViolation>,
}

pub fn offer_actions(offer: &Offer, now: NaiveDate) -> OfferActions {
    OfferActions {
        can_preview: true,
        can_disable: offer_rules::permits(offer.status, OfferAction::Disable),
        can_enable: offer_rules::permits(offer.status, OfferAction::Enable)
            && offer_rules::start_guard(offer, now).is_ok(),
    }
}

/// Nothing is allowed on a candidature whose offer is not published.
pub fn candidature_actions(candidature: &Candidature, parent_offer: &Offer) -> CandidatureActions {
    if !parent_offer.is_published() {
        return CandidatureActions::default();
    }

    let status = candidature.status;
    CandidatureActions {
        can_convoke: candidature_rules::permits(status, CandidatureAction::Convoke),
        can_accept: candidature_rules::permits(status, CandidatureAction::Accept),
        can_reject: candidature_rules::permits(status, CandidatureAction::Reject),
    }
}

/// `VIEW` whenever an evaluation exists, `CREATE` once a teacher is assigned, `BLOCKED` otherwise.
pub fn evaluation_action(
    pair: &EnrollmentPair,
    assignment: &TeacherAssignment,
    existing: &EvaluationCheck,
) -> EvaluationAction {
    if existing.exists {
        return EvaluationAction {
            action: EvaluationActionKind::View,
            pair: pair.clone(),
            evaluation_id: existing.evaluation.as_ref().map(|evaluation| evaluation.id.clone()),
            blocked_by: None,
        };
    }

    let (action, blocked_by) = match ensure_can_create_evaluation(assignment.teacher_assigned, None)
    {
        Ok(()) => (EvaluationActionKind::Create, None),
        Err(reason) => (EvaluationActionKind::Blocked, Some(reason)),
    };

    EvaluationAction {
        action,
        pair: pair.clone(),
        evaluation_id: None,
        blocked_by,
    }
}
