use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::{GuardViolation, TransitionError};
use super::gateway::{GatewayError, WorkflowGateway};
use super::status::{candidature, offer, Candidature, ConvocationDraft, Offer};

/// Outcome of a user action that did not go through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Refused locally; the collaborator was never contacted.
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    /// The collaborator call failed after the local checks passed. Dismissible: the caller keeps
    /// its current snapshot and may refetch.
    #[error("{action} failed: {source}")]
    Failed {
        action: &'static str,
        source: GatewayError,
    },
}

impl From<GuardViolation> for ActionError {
    fn from(value: GuardViolation) -> Self {
        Self::Rejected(TransitionError::Guard(value))
    }
}

/// Runs the pure transition first and only then asks the collaborator to persist it.
///
/// On success the new snapshot is returned for the caller to splice into its list; on failure
/// nothing the caller holds is modified.
pub struct ActionCoordinator<G: ?Sized> {
    gateway: Arc<G>,
}

impl<G> ActionCoordinator<G>
where
    G: WorkflowGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn disable_offer(&self, snapshot: &Offer) -> Result<Offer, ActionError> {
        let next = offer::disable(snapshot)?;
        self.commit("disable offer", self.gateway.disable_offer(&snapshot.id))
            .await?;
        info!(offer_id = %snapshot.id, "offer disabled");
        Ok(next)
    }

    pub async fn enable_offer(&self, snapshot: &Offer, now: NaiveDate) -> Result<Offer, ActionError> {
        let next = offer::enable(snapshot, now)?;
        self.commit("enable offer", self.gateway.enable_offer(&snapshot.id))
            .await?;
        info!(offer_id = %snapshot.id, "offer enabled");
        Ok(next)
    }

    pub async fn convoke(
        &self,
        snapshot: &Candidature,
        parent_offer: &Offer,
        draft: &ConvocationDraft,
    ) -> Result<Candidature, ActionError> {
        ensure_published(parent_offer)?;
        let next = candidature::convoke(snapshot, draft)?;
        let convocation = next
            .convocation
            .as_ref()
            .ok_or(GuardViolation::MissingConvocationDate)?;
        self.commit(
            "convoke candidature",
            self.gateway.convoke_candidature(&snapshot.id, convocation),
        )
        .await?;
        info!(candidature_id = %snapshot.id, "candidate convened");
        Ok(next)
    }

    pub async fn accept(
        &self,
        snapshot: &Candidature,
        parent_offer: &Offer,
    ) -> Result<Candidature, ActionError> {
        ensure_published(parent_offer)?;
        let next = candidature::accept(snapshot)?;
        self.commit(
            "accept candidature",
            self.gateway.accept_candidature(&snapshot.id),
        )
        .await?;
        info!(candidature_id = %snapshot.id, "candidature accepted");
        Ok(next)
    }

    pub async fn reject(
        &self,
        snapshot: &Candidature,
        parent_offer: &Offer,
    ) -> Result<Candidature, ActionError> {
        ensure_published(parent_offer)?;
        let next = candidature::reject(snapshot)?;
        self.commit(
            "reject candidature",
            self.gateway.reject_candidature(&snapshot.id),
        )
        .await?;
        info!(candidature_id = %snapshot.id, "candidature rejected");
        Ok(next)
    }

    async fn commit<F>(&self, action: &'static str, call: F) -> Result<(), ActionError>
    where
        F: Future<Output = Result<(), GatewayError>>,
    {
        call.await.map_err(|source| {
            warn!(action, error = %source, "collaborator refused action");
            ActionError::Failed { action, source }
        })
    }
}

fn ensure_published(parent_offer: &Offer) -> Result<(), GuardViolation> {
    if parent_offer.is_published() {
        Ok(())
    } else {
        Err(GuardViolation::OfferNotPublished {
            offer_id: parent_offer.id.clone(),
            status: parent_offer.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::error::EntityKind;
    use crate::workflows::status::{
        CandidatureId, CandidatureStatus, Convocation, OfferId, OfferStatus, StudentId,
    };
    use async_trait::async_trait;
    use chrono::{NaiveDateTime, NaiveTime};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGateway {
        calls: Mutex<Vec<String>>,
        refuse_with: Option<GatewayError>,
    }

    impl RecordingGateway {
        fn refusing(err: GatewayError) -> Self {
            Self {
                calls: Mutex::default(),
                refuse_with: Some(err),
            }
        }

        fn record(&self, call: String) -> Result<(), GatewayError> {
            self.calls.lock().expect("calls mutex poisoned").push(call);
            match &self.refuse_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls mutex poisoned").clone()
        }
    }

    #[async_trait]
    impl WorkflowGateway for RecordingGateway {
        async fn disable_offer(&self, offer_id: &OfferId) -> Result<(), GatewayError> {
            self.record(format!("disable {offer_id}"))
        }

        async fn enable_offer(&self, offer_id: &OfferId) -> Result<(), GatewayError> {
            self.record(format!("enable {offer_id}"))
        }

        async fn convoke_candidature(
            &self,
            candidature_id: &CandidatureId,
            convocation: &Convocation,
        ) -> Result<(), GatewayError> {
            self.record(format!("convoke {candidature_id} @ {}", convocation.location()))
        }

        async fn accept_candidature(
            &self,
            candidature_id: &CandidatureId,
        ) -> Result<(), GatewayError> {
            self.record(format!("accept {candidature_id}"))
        }

        async fn reject_candidature(
            &self,
            candidature_id: &CandidatureId,
        ) -> Result<(), GatewayError> {
            self.record(format!("reject {candidature_id}"))
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn offer(status: OfferStatus) -> Offer {
        Offer {
            id: OfferId::new("o-1"),
            title: "QA intern".to_string(),
            status,
            start_date: date(2025, 9, 1),
            duration_weeks: 12,
            rejection_comment: None,
            session: None,
        }
    }

    fn candidature(status: CandidatureStatus) -> Candidature {
        Candidature {
            id: CandidatureId::new("c-1"),
            offer_id: OfferId::new("o-1"),
            student_id: StudentId::new("s-1"),
            status,
            application_date: date(2025, 3, 1),
            convocation: None,
        }
    }

    fn draft() -> ConvocationDraft {
        ConvocationDraft {
            date: Some(NaiveDateTime::new(
                date(2025, 3, 10),
                NaiveTime::from_hms_opt(14, 0, 0).expect("valid"),
            )),
            location: "Room 12".to_string(),
            message: "See you there".to_string(),
        }
    }

    #[tokio::test]
    async fn successful_action_returns_new_snapshot() {
        let gateway = Arc::new(RecordingGateway::default());
        let coordinator = ActionCoordinator::new(gateway.clone());

        let convened = coordinator
            .convoke(
                &candidature(CandidatureStatus::Pending),
                &offer(OfferStatus::Published),
                &draft(),
            )
            .await
            .expect("convoke succeeds");

        assert_eq!(convened.status, CandidatureStatus::Convened);
        assert_eq!(gateway.calls(), vec!["convoke c-1 @ Room 12".to_string()]);
    }

    #[tokio::test]
    async fn gateway_receives_the_convocation_stored_on_the_snapshot() {
        let gateway = Arc::new(RecordingGateway::default());
        let coordinator = ActionCoordinator::new(gateway.clone());
        let padded = ConvocationDraft {
            location: "  Room 12  ".to_string(),
            ..draft()
        };

        let convened = coordinator
            .convoke(
                &candidature(CandidatureStatus::Pending),
                &offer(OfferStatus::Published),
                &padded,
            )
            .await
            .expect("convoke succeeds");

        let stored = convened.convocation.expect("convocation attached");
        assert_eq!(stored.location(), "Room 12");
        assert_eq!(
            gateway.calls(),
            vec![format!("convoke c-1 @ {}", stored.location())]
        );
    }

    #[tokio::test]
    async fn guard_failure_never_reaches_the_gateway() {
        let gateway = Arc::new(RecordingGateway::default());
        let coordinator = ActionCoordinator::new(gateway.clone());
        let mut disabled = offer(OfferStatus::Disabled);
        disabled.start_date = date(2025, 1, 1);

        let err = coordinator
            .enable_offer(&disabled, date(2025, 6, 1))
            .await
            .expect_err("start date passed");

        assert!(matches!(
            err,
            ActionError::Rejected(TransitionError::Guard(
                GuardViolation::OfferStartPassed { .. }
            ))
        ));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn candidature_actions_require_published_offer() {
        let gateway = Arc::new(RecordingGateway::default());
        let coordinator = ActionCoordinator::new(gateway.clone());

        let err = coordinator
            .accept(
                &candidature(CandidatureStatus::Convened),
                &offer(OfferStatus::Disabled),
            )
            .await
            .expect_err("offer disabled");

        assert_eq!(
            err,
            ActionError::from(GuardViolation::OfferNotPublished {
                offer_id: OfferId::new("o-1"),
                status: OfferStatus::Disabled,
            })
        );
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_transition_is_reported_distinctly() {
        let gateway = Arc::new(RecordingGateway::default());
        let coordinator = ActionCoordinator::new(gateway.clone());

        let err = coordinator
            .reject(
                &candidature(CandidatureStatus::Accepted),
                &offer(OfferStatus::Published),
            )
            .await
            .expect_err("accepted cannot be rejected");

        assert_eq!(
            err,
            ActionError::Rejected(TransitionError::InvalidTransition {
                entity: EntityKind::Candidature,
                action: "reject",
                from: "ACCEPTED",
            })
        );
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn server_refusal_is_a_dismissible_failure() {
        let gateway = Arc::new(RecordingGateway::refusing(GatewayError::Rejected(
            "offer was modified by another session".to_string(),
        )));
        let coordinator = ActionCoordinator::new(gateway.clone());
        let published = offer(OfferStatus::Published);

        let err = coordinator
            .disable_offer(&published)
            .await
            .expect_err("server refused");

        match err {
            ActionError::Failed { action, source } => {
                assert_eq!(action, "disable offer");
                assert!(matches!(source, GatewayError::Rejected(_)));
            }
            other => panic!("expected collaborator failure, got {other:?}"),
        }
        assert_eq!(published.status, OfferStatus::Published);
        assert_eq!(gateway.calls(), vec!["disable o-1".to_string()]);
    }
}
