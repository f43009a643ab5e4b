use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use super::orchestrator::{DependentLookup, LookupError};
use crate::workflows::gateway::{
    EvaluationCheck, EvaluationDirectory, InternshipDirectory, TeacherAssignment,
};
use crate::workflows::status::{Candidature, EnrollmentPair, OfferId};

/// Candidatures shown inline under an offer.
pub const PREVIEW_LIMIT: usize = 3;

/// Candidature count badge plus the most recent applications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidatureSummary {
    pub count: usize,
    pub preview: Vec<Candidature>,
}

impl CandidatureSummary {
    pub fn from_candidatures(mut candidatures: Vec<Candidature>) -> Self {
        let count = candidatures.len();
        candidatures.sort_by(|a, b| {
            b.application_date
                .cmp(&a.application_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        candidatures.truncate(PREVIEW_LIMIT);
        Self {
            count,
            preview: candidatures,
        }
    }
}

pub struct CandidatureSummaryLookup<D: ?Sized> {
    directory: Arc<D>,
}

impl<D: ?Sized> CandidatureSummaryLookup<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl<D> DependentLookup for CandidatureSummaryLookup<D>
where
    D: InternshipDirectory + ?Sized,
{
    type Key = OfferId;
    type Fact = CandidatureSummary;

    fn name(&self) -> &'static str {
        "candidature_summary"
    }

    async fn lookup(&self, key: &OfferId) -> Result<CandidatureSummary, LookupError> {
        let candidatures = self.directory.list_candidatures(key).await?;
        Ok(CandidatureSummary::from_candidatures(candidatures))
    }

    fn fallback(&self, _key: &OfferId) -> CandidatureSummary {
        CandidatureSummary::default()
    }
}

pub struct EvaluationLookup<E: ?Sized> {
    directory: Arc<E>,
}

impl<E: ?Sized> EvaluationLookup<E> {
    pub fn new(directory: Arc<E>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl<E> DependentLookup for EvaluationLookup<E>
where
    E: EvaluationDirectory + ?Sized,
{
    type Key = EnrollmentPair;
    type Fact = EvaluationCheck;

    fn name(&self) -> &'static str {
        "evaluation_exists"
    }

    async fn lookup(&self, key: &EnrollmentPair) -> Result<EvaluationCheck, LookupError> {
        let check = self.directory.check_evaluation_exists(key).await?;
        // A payload without `exists` is treated as absent, whatever else it carries.
        Ok(EvaluationCheck {
            exists: check.exists,
            evaluation: check.evaluation.filter(|_| check.exists),
        })
    }

    fn fallback(&self, _key: &EnrollmentPair) -> EvaluationCheck {
        EvaluationCheck::default()
    }
}

pub struct TeacherAssignmentLookup<E: ?Sized> {
    directory: Arc<E>,
}

impl<E: ?Sized> TeacherAssignmentLookup<E> {
    pub fn new(directory: Arc<E>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl<E> DependentLookup for TeacherAssignmentLookup<E>
where
    E: EvaluationDirectory + ?Sized,
{
    type Key = EnrollmentPair;
    type Fact = TeacherAssignment;

    fn name(&self) -> &'static str {
        "teacher_assignment"
    }

    async fn lookup(&self, key: &EnrollmentPair) -> Result<TeacherAssignment, LookupError> {
        Ok(self.directory.check_teacher_assigned(key).await?)
    }

    fn fallback(&self, _key: &EnrollmentPair) -> TeacherAssignment {
        TeacherAssignment::default()
    }
}
