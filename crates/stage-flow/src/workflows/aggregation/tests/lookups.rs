use std::sync::Arc;

use super::common::*;
use crate::workflows::aggregation::{
    AggregationOrchestrator, CandidatureSummary, EvaluationLookup, TeacherAssignmentLookup,
    PREVIEW_LIMIT,
};
use crate::workflows::gateway::{EvaluationCheck, TeacherAssignment};
use crate::workflows::status::{EnrollmentPair, Evaluation, EvaluationId};

#[test]
fn summary_counts_everything_and_previews_latest() {
    let summary = CandidatureSummary::from_candidatures(candidatures("o-1", 5));

    assert_eq!(summary.count, 5);
    assert_eq!(summary.preview.len(), PREVIEW_LIMIT);
    let ids: Vec<&str> = summary
        .preview
        .iter()
        .map(|candidature| candidature.id.as_str())
        .collect();
    assert_eq!(ids, vec!["o-1-c4", "o-1-c3", "o-1-c2"]);
}

#[tokio::test]
async fn evaluation_facts_fall_back_per_pair() {
    let reviewed = EnrollmentPair::new("s-1", "o-1");
    let fresh = EnrollmentPair::new("s-2", "o-1");
    let broken = EnrollmentPair::new("s-3", "o-1");
    let mut directory = FixedEvaluations::default();
    directory.evaluations.insert(
        reviewed.clone(),
        EvaluationCheck {
            exists: true,
            evaluation: Some(Evaluation {
                id: EvaluationId::new("ev-1"),
                submitted: true,
                date_evaluation: None,
            }),
        },
    );
    directory.assignments.insert(reviewed.clone(), true);
    directory.assignments.insert(fresh.clone(), true);
    directory.failing.push(broken.clone());
    let directory = Arc::new(directory);

    let evaluations = AggregationOrchestrator::new(
        Arc::new(EvaluationLookup::new(directory.clone())),
        no_retry_policy(),
    );
    let assignments = AggregationOrchestrator::new(
        Arc::new(TeacherAssignmentLookup::new(directory)),
        no_retry_policy(),
    );
    let pairs = vec![reviewed.clone(), fresh.clone(), broken.clone()];

    tokio::join!(evaluations.refresh(&pairs), assignments.refresh(&pairs));

    let evaluations = evaluations.snapshot();
    let assignments = assignments.snapshot();
    assert!(evaluations.fact(&reviewed).is_some_and(|check| check.exists));
    assert_eq!(evaluations.fact(&fresh), Some(&EvaluationCheck::default()));
    assert_eq!(evaluations.fact(&broken), Some(&EvaluationCheck::default()));
    assert_eq!(
        assignments.fact(&fresh),
        Some(&TeacherAssignment {
            teacher_assigned: true
        })
    );
    assert_eq!(assignments.fact(&broken), Some(&TeacherAssignment::default()));
}

#[tokio::test]
async fn evaluation_payload_without_exists_flag_is_absent() {
    let pair = EnrollmentPair::new("s-1", "o-1");
    let mut directory = FixedEvaluations::default();
    directory.evaluations.insert(
        pair.clone(),
        EvaluationCheck {
            exists: false,
            evaluation: Some(Evaluation {
                id: EvaluationId::new("ev-stale"),
                submitted: false,
                date_evaluation: None,
            }),
        },
    );
    let orchestrator = AggregationOrchestrator::new(
        Arc::new(EvaluationLookup::new(Arc::new(directory))),
        no_retry_policy(),
    );

    orchestrator.refresh(&[pair.clone()]).await;

    assert_eq!(
        orchestrator.snapshot().fact(&pair),
        Some(&EvaluationCheck::default())
    );
}
