use super::domain::Evaluation;
use crate::workflows::error::GuardViolation;

/// An evaluation can be created only once a teacher is assigned, and only once per pair.
pub fn can_create_evaluation(teacher_assigned: bool, existing: Option<&Evaluation>) -> bool {
    ensure_can_create_evaluation(teacher_assigned, existing).is_ok()
}

/// Same rule as [`can_create_evaluation`], reporting which half failed.
pub fn ensure_can_create_evaluation(
    teacher_assigned: bool,
    existing: Option<&Evaluation>,
) -> Result<(), GuardViolation> {
    if let Some(evaluation) = existing {
        return Err(GuardViolation::EvaluationAlreadyExists(evaluation.id.clone()));
    }
    if !teacher_assigned {
        return Err(GuardViolation::TeacherNotAssigned);
    }
    Ok(())
}
