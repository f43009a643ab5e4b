//! Ports onto the remote platform API. The core calls these but never implements them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::status::{
    Agreement, Candidature, CandidatureId, Convocation, EnrollmentPair, Evaluation, Offer, OfferId,
};

/// Read side: the parent lists the dashboards start from.
#[async_trait]
pub trait InternshipDirectory: Send + Sync {
    async fn list_offers(&self, actor: &Actor) -> Result<Vec<Offer>, GatewayError>;
    async fn list_candidatures(&self, offer_id: &OfferId)
        -> Result<Vec<Candidature>, GatewayError>;
    async fn list_agreements(&self, actor: &Actor) -> Result<Vec<Agreement>, GatewayError>;
}

/// Per-pair lookups backing evaluation eligibility.
#[async_trait]
pub trait EvaluationDirectory: Send + Sync {
    async fn check_evaluation_exists(
        &self,
        pair: &EnrollmentPair,
    ) -> Result<EvaluationCheck, GatewayError>;
    async fn check_teacher_assigned(
        &self,
        pair: &EnrollmentPair,
    ) -> Result<TeacherAssignment, GatewayError>;
}

/// Mutating calls. Only invoked after the matching pure transition succeeded.
#[async_trait]
pub trait WorkflowGateway: Send + Sync {
    async fn disable_offer(&self, offer_id: &OfferId) -> Result<(), GatewayError>;
    async fn enable_offer(&self, offer_id: &OfferId) -> Result<(), GatewayError>;
    async fn convoke_candidature(
        &self,
        candidature_id: &CandidatureId,
        convocation: &Convocation,
    ) -> Result<(), GatewayError>;
    async fn accept_candidature(&self, candidature_id: &CandidatureId) -> Result<(), GatewayError>;
    async fn reject_candidature(&self, candidature_id: &CandidatureId) -> Result<(), GatewayError>;
}

/// Answer of the evaluation existence check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationCheck {
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
}

/// Whether a supervising teacher is linked to a pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAssignment {
    pub teacher_assigned: bool,
}

/// Structured failure returned by any collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The server refused the change (e.g. it was modified concurrently).
    #[error("rejected by the server: {0}")]
    Rejected(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Transport-level failures are worth another attempt; answers from the server are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Unavailable(_))
    }
}
