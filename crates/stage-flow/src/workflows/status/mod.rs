//! Canonical state machines for offers, candidatures, and evaluations.
//!
//! Every operation here is pure: it takes a snapshot and returns either a new snapshot or a
//! [`TransitionError`](crate::workflows::TransitionError). Persisting the change is the caller's
//! job, and only after the pure check passed.

pub mod candidature;
pub mod domain;
pub mod evaluation;
pub mod offer;

pub use candidature::{accept, convoke, reject, CandidatureAction};
pub use domain::{
    Agreement, AgreementId, AgreementStatus, Candidature, CandidatureId, CandidatureStatus,
    Convocation, ConvocationDraft, EnrollmentPair, Evaluation, EvaluationId, Offer, OfferId,
    OfferStatus, StudentId,
};
pub use evaluation::{can_create_evaluation, ensure_can_create_evaluation};
pub use offer::{disable, enable, OfferAction};
