use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

use super::gate::{
    candidature_actions, evaluation_action, offer_actions, CandidatureActions, EvaluationAction,
    OfferActions,
};
use crate::workflows::aggregation::{CandidatureSummary, Published};
use crate::workflows::gateway::{EvaluationCheck, TeacherAssignment};
use crate::workflows::status::{Agreement, Candidature, EnrollmentPair, Offer, OfferId};

/// One offer as the employer dashboard shows it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRow {
    pub offer: Offer,
    pub actions: OfferActions,
    /// Candidature count badge; `None` renders a placeholder while facts load.
    pub candidature_count: Option<usize>,
    pub preview: Vec<CandidatureRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatureRow {
    pub candidature: Candidature,
    pub actions: CandidatureActions,
}

/// One signed agreement awaiting (or holding) its evaluation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRow {
    pub pair: EnrollmentPair,
    /// `None` until both the assignment and the evaluation facts are visible.
    pub action: Option<EvaluationAction>,
}

pub fn offer_board(
    offers: &[Offer],
    summaries: &Published<OfferId, CandidatureSummary>,
    now: NaiveDate,
) -> Vec<OfferRow> {
    offers
        .iter()
        .map(|offer| {
            let summary = summaries.fact(&offer.id);
            let preview = summary
                .map(|summary| {
                    summary
                        .preview
                        .iter()
                        .map(|candidature| CandidatureRow {
                            candidature: candidature.clone(),
                            actions: candidature_actions(candidature, offer),
                        })
                        .collect()
                })
                .unwrap_or_default();

            OfferRow {
                offer: offer.clone(),
                actions: offer_actions(offer, now),
                candidature_count: summary.map(|summary| summary.count),
                preview,
            }
        })
        .collect()
}

/// Pairs eligible for evaluation tracking: fully signed agreements, first occurrence wins.
pub fn evaluation_pairs(agreements: &[Agreement]) -> Vec<EnrollmentPair> {
    let mut seen = HashSet::new();
    agreements
        .iter()
        .filter(|agreement| agreement.is_fully_signed())
        .map(Agreement::pair)
        .filter(|pair| seen.insert(pair.clone()))
        .collect()
}

pub fn evaluation_board(
    pairs: &[EnrollmentPair],
    assignments: &Published<EnrollmentPair, TeacherAssignment>,
    evaluations: &Published<EnrollmentPair, EvaluationCheck>,
) -> Vec<EvaluationRow> {
    pairs
        .iter()
        .map(|pair| {
            let action = match (assignments.fact(pair), evaluations.fact(pair)) {
                (Some(assignment), Some(existing)) => {
                    Some(evaluation_action(pair, assignment, existing))
                }
                _ => None,
            };
            EvaluationRow {
                pair: pair.clone(),
                action,
            }
        })
        .collect()
}
