use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::oneshot;

use crate::workflows::actor::Actor;
use crate::workflows::aggregation::{
    AggregationOrchestrator, CandidatureSummaryLookup, LookupPolicy,
};
use crate::workflows::gateway::{
    EvaluationCheck, EvaluationDirectory, GatewayError, InternshipDirectory, TeacherAssignment,
};
use crate::workflows::status::{
    Agreement, Candidature, CandidatureId, CandidatureStatus, EnrollmentPair, Offer, OfferId,
    StudentId,
};

/// Scripted answer for one `list_candidatures` call.
pub(super) enum Step {
    Reply(Vec<Candidature>),
    Fail(GatewayError),
    Wait(oneshot::Receiver<Vec<Candidature>>),
    Hang,
}

#[derive(Default)]
pub(super) struct ScriptedDirectory {
    scripts: Mutex<HashMap<OfferId, VecDeque<Step>>>,
    calls: Mutex<Vec<OfferId>>,
}

impl ScriptedDirectory {
    pub(super) fn script(&self, offer_id: &str, step: Step) {
        self.scripts
            .lock()
            .expect("script mutex poisoned")
            .entry(OfferId::new(offer_id))
            .or_default()
            .push_back(step);
    }

    pub(super) fn calls_for(&self, offer_id: &str) -> usize {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .iter()
            .filter(|id| id.as_str() == offer_id)
            .count()
    }
}

#[async_trait]
impl InternshipDirectory for ScriptedDirectory {
    async fn list_offers(&self, _actor: &Actor) -> Result<Vec<Offer>, GatewayError> {
        Ok(Vec::new())
    }

    async fn list_candidatures(
        &self,
        offer_id: &OfferId,
    ) -> Result<Vec<Candidature>, GatewayError> {
        let step = {
            self.calls
                .lock()
                .expect("calls mutex poisoned")
                .push(offer_id.clone());
            self.scripts
                .lock()
                .expect("script mutex poisoned")
                .get_mut(offer_id)
                .and_then(VecDeque::pop_front)
        };

        match step {
            Some(Step::Reply(candidatures)) => Ok(candidatures),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Wait(gate)) => gate
                .await
                .map_err(|_| GatewayError::Unavailable("gate dropped".to_string())),
            Some(Step::Hang) => std::future::pending().await,
            None => Ok(Vec::new()),
        }
    }

    async fn list_agreements(&self, _actor: &Actor) -> Result<Vec<Agreement>, GatewayError> {
        Ok(Vec::new())
    }
}

/// Evaluation directory answering from fixed maps; pairs in `failing` error out.
#[derive(Default)]
pub(super) struct FixedEvaluations {
    pub(super) evaluations: HashMap<EnrollmentPair, EvaluationCheck>,
    pub(super) assignments: HashMap<EnrollmentPair, bool>,
    pub(super) failing: Vec<EnrollmentPair>,
}

#[async_trait]
impl EvaluationDirectory for FixedEvaluations {
    async fn check_evaluation_exists(
        &self,
        pair: &EnrollmentPair,
    ) -> Result<EvaluationCheck, GatewayError> {
        if self.failing.contains(pair) {
            return Err(GatewayError::Malformed("html error page".to_string()));
        }
        Ok(self.evaluations.get(pair).cloned().unwrap_or_default())
    }

    async fn check_teacher_assigned(
        &self,
        pair: &EnrollmentPair,
    ) -> Result<TeacherAssignment, GatewayError> {
        if self.failing.contains(pair) {
            return Err(GatewayError::Unavailable("connection reset".to_string()));
        }
        Ok(TeacherAssignment {
            teacher_assigned: self.assignments.get(pair).copied().unwrap_or(false),
        })
    }
}

pub(super) fn candidatures(offer_id: &str, count: usize) -> Vec<Candidature> {
    (0..count)
        .map(|index| Candidature {
            id: CandidatureId::new(format!("{offer_id}-c{index}")),
            offer_id: OfferId::new(offer_id),
            student_id: StudentId::new(format!("s-{index}")),
            status: CandidatureStatus::Pending,
            application_date: NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid")
                + chrono::Duration::days(index as i64),
            convocation: None,
        })
        .collect()
}

pub(super) fn offer_ids(ids: &[&str]) -> Vec<OfferId> {
    ids.iter().map(|id| OfferId::new(*id)).collect()
}

pub(super) fn no_retry_policy() -> LookupPolicy {
    LookupPolicy::single_attempt(Duration::from_secs(1))
}

pub(super) fn summary_orchestrator(
    directory: Arc<ScriptedDirectory>,
    policy: LookupPolicy,
) -> AggregationOrchestrator<CandidatureSummaryLookup<ScriptedDirectory>> {
    AggregationOrchestrator::new(Arc::new(CandidatureSummaryLookup::new(directory)), policy)
}
