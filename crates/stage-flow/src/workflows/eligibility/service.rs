use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::board::{evaluation_board, evaluation_pairs, offer_board, EvaluationRow, OfferRow};
use crate::workflows::actor::Actor;
use crate::workflows::aggregation::{
    AggregationOrchestrator, CandidatureSummaryLookup, DependentLookup, EvaluationLookup,
    LookupPolicy, Published, TeacherAssignmentLookup,
};
use crate::workflows::calendar::{matches, Term, TermValue};
use crate::workflows::gateway::{EvaluationDirectory, GatewayError, InternshipDirectory};
use crate::workflows::status::OfferId;

/// The top-level parent list could not be fetched. No partial data is returned; the caller
/// may simply try again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not load {resource}: {source}")]
pub struct BatchFetchError {
    pub resource: &'static str,
    pub source: GatewayError,
}

impl BatchFetchError {
    pub fn is_retryable(&self) -> bool {
        true
    }
}

/// Rows of one board refresh, or notice that a newer refresh overtook it.
#[derive(Debug, Clone)]
pub enum Board<R> {
    Current { generation: u64, rows: Vec<R> },
    /// A later refresh was started before this one settled. Its rows must not be shown.
    Superseded { generation: u64, latest: u64 },
}

impl<R> Board<R> {
    pub fn is_current(&self) -> bool {
        matches!(self, Board::Current { .. })
    }

    pub fn rows(&self) -> Option<&[R]> {
        match self {
            Board::Current { rows, .. } => Some(rows.as_slice()),
            Board::Superseded { .. } => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<R>> {
        match self {
            Board::Current { rows, .. } => Some(rows),
            Board::Superseded { .. } => None,
        }
    }
}

pub async fn load_parents<T, Fut>(
    resource: &'static str,
    fetch: Fut,
) -> Result<Vec<T>, BatchFetchError>
where
    Fut: Future<Output = Result<Vec<T>, GatewayError>>,
{
    fetch.await.map_err(|source| {
        warn!(resource, error = %source, "parent list fetch failed");
        BatchFetchError { resource, source }
    })
}

/// Composes the parent fetches, the enrichment orchestrators, and the gate into the rows the
/// dashboards render.
pub struct EligibilityService<D, E>
where
    D: InternshipDirectory + ?Sized,
    E: EvaluationDirectory + ?Sized,
{
    directory: Arc<D>,
    candidatures: AggregationOrchestrator<CandidatureSummaryLookup<D>>,
    assignments: AggregationOrchestrator<TeacherAssignmentLookup<E>>,
    evaluations: AggregationOrchestrator<EvaluationLookup<E>>,
}

impl<D, E> EligibilityService<D, E>
where
    D: InternshipDirectory + ?Sized + 'static,
    E: EvaluationDirectory + ?Sized + 'static,
{
    pub fn new(
        directory: Arc<D>,
        evaluation_directory: Arc<E>,
        policy: LookupPolicy,
        retain_previous: bool,
    ) -> Self {
        let candidatures = AggregationOrchestrator::new(
            Arc::new(CandidatureSummaryLookup::new(directory.clone())),
            policy,
        )
        .retain_previous(retain_previous);
        let assignments = AggregationOrchestrator::new(
            Arc::new(TeacherAssignmentLookup::new(evaluation_directory.clone())),
            policy,
        )
        .retain_previous(retain_previous);
        let evaluations = AggregationOrchestrator::new(
            Arc::new(EvaluationLookup::new(evaluation_directory)),
            policy,
        )
        .retain_previous(retain_previous);

        Self {
            directory,
            candidatures,
            assignments,
            evaluations,
        }
    }

    /// Offers of `actor` (restricted to `term` when given) with their candidature facts.
    ///
    /// The generation is reserved before the offer list is fetched, so a refresh started later
    /// always wins, even when its fetch returns first.
    pub async fn offer_board(
        &self,
        actor: &Actor,
        term: Option<Term>,
        now: NaiveDate,
    ) -> Result<Board<OfferRow>, BatchFetchError> {
        let generation = self.candidatures.begin();
        let offers = match load_parents("offers", self.directory.list_offers(actor)).await {
            Ok(offers) => offers,
            Err(err) => return give_up(&self.candidatures, generation, err),
        };
        let offers = within_term(offers, term, |offer| offer.session.as_ref());

        let ids: Vec<OfferId> = offers.iter().map(|offer| offer.id.clone()).collect();
        let outcome = self.candidatures.refresh_at(generation, &ids).await;
        info!(offers = offers.len(), ?outcome, "offer board refreshed");

        let summaries = self.candidatures.snapshot();
        if let Some(stale) = overtaken(&summaries, generation) {
            return Ok(stale);
        }
        Ok(Board::Current {
            generation,
            rows: offer_board(&offers, &summaries, now),
        })
    }

    /// Signed agreements of `actor` with the evaluation action each one allows.
    pub async fn evaluation_board(
        &self,
        actor: &Actor,
        term: Option<Term>,
    ) -> Result<Board<EvaluationRow>, BatchFetchError> {
        let assigned_generation = self.assignments.begin();
        let evaluated_generation = self.evaluations.begin();
        let agreements =
            match load_parents("agreements", self.directory.list_agreements(actor)).await {
                Ok(agreements) => agreements,
                Err(err) => {
                    self.evaluations.abandon(evaluated_generation);
                    return give_up(&self.assignments, assigned_generation, err);
                }
            };
        let agreements = within_term(agreements, term, |agreement| agreement.session.as_ref());
        let pairs = evaluation_pairs(&agreements);

        let (assigned, evaluated) = tokio::join!(
            self.assignments.refresh_at(assigned_generation, &pairs),
            self.evaluations.refresh_at(evaluated_generation, &pairs)
        );
        info!(pairs = pairs.len(), ?assigned, ?evaluated, "evaluation board refreshed");

        let assignments = self.assignments.snapshot();
        let evaluations = self.evaluations.snapshot();
        if let Some(stale) = overtaken(&assignments, assigned_generation)
            .or_else(|| overtaken(&evaluations, evaluated_generation))
        {
            return Ok(stale);
        }
        Ok(Board::Current {
            generation: assigned_generation,
            rows: evaluation_board(&pairs, &assignments, &evaluations),
        })
    }

    pub fn candidatures(&self) -> &AggregationOrchestrator<CandidatureSummaryLookup<D>> {
        &self.candidatures
    }

    pub fn assignments(&self) -> &AggregationOrchestrator<TeacherAssignmentLookup<E>> {
        &self.assignments
    }

    pub fn evaluations(&self) -> &AggregationOrchestrator<EvaluationLookup<E>> {
        &self.evaluations
    }

    /// Session teardown: drops every published fact.
    pub fn reset(&self) {
        self.candidatures.reset();
        self.assignments.reset();
        self.evaluations.reset();
    }
}

fn within_term<T, F>(records: Vec<T>, term: Option<Term>, accessor: F) -> Vec<T>
where
    F: Fn(&T) -> Option<&TermValue>,
{
    match term {
        Some(term) => records
            .into_iter()
            .filter(|record| matches(term, accessor(record)))
            .collect(),
        None => records,
    }
}

/// A failed parent fetch is only reported while its generation is still the latest one.
fn give_up<L, R>(
    orchestrator: &AggregationOrchestrator<L>,
    generation: u64,
    err: BatchFetchError,
) -> Result<Board<R>, BatchFetchError>
where
    L: DependentLookup,
{
    let latest = orchestrator.latest();
    if latest != generation {
        debug!(generation, latest, error = %err, "ignoring failure of a superseded fetch");
        return Ok(Board::Superseded { generation, latest });
    }
    orchestrator.abandon(generation);
    Err(err)
}

fn overtaken<K, F, R>(published: &Published<K, F>, generation: u64) -> Option<Board<R>> {
    if published.dispatched == generation && published.generation == Some(generation) {
        None
    } else {
        Some(Board::Superseded {
            generation,
            latest: published.dispatched,
        })
    }
}
