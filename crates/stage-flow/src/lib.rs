//! Workflow and eligibility orchestration for internship offers, candidatures, and evaluations.
//!
//! The crate is split along the same lines the screens consume it:
//!
//! - [`workflows::calendar`] maps dates to academic terms and keeps the per-actor selection.
//! - [`workflows::status`] holds the offer, candidature, and evaluation state machines.
//! - [`workflows::aggregation`] enriches parent lists with per-record facts fetched concurrently.
//! - [`workflows::eligibility`] folds statuses and facts into action permissions.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
