//! Action permissions derived from entity status and enrichment facts.

mod board;
mod gate;
mod service;

pub use board::{
    evaluation_board, evaluation_pairs, offer_board, CandidatureRow, EvaluationRow, OfferRow,
};
pub use gate::{
    candidature_actions, evaluation_action, offer_actions, CandidatureActions, EvaluationAction,
    EvaluationActionKind, OfferActions,
};
pub use service::{load_parents, BatchFetchError, Board, EligibilityService};
