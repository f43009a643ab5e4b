//! Concurrent per-record enrichment of parent lists.
//!
//! An [`AggregationOrchestrator`] fans a batch of dependent lookups out for every parent key,
//! waits for all of them, and publishes one consolidated map. Each batch is stamped with a
//! generation when dispatched; a batch that completes after a newer one was dispatched is
//! dropped, so a refreshed list never shows facts computed for an older one.

mod lookups;
mod orchestrator;
mod policy;

#[cfg(test)]
mod tests;

pub use lookups::{
    CandidatureSummary, CandidatureSummaryLookup, EvaluationLookup, TeacherAssignmentLookup,
    PREVIEW_LIMIT,
};
pub use orchestrator::{
    AggregationOrchestrator, BatchOutcome, BatchState, DependentLookup, LookupError, Published,
};
pub use policy::LookupPolicy;
