use stage_flow::workflows::calendar::{Term, TermSelection, WINDOW_SIZE};
use stage_flow::workflows::eligibility::{
    CandidatureActions, EvaluationActionKind, EvaluationRow, OfferActions, OfferRow,
};
use stage_flow::workflows::status::{Candidature, Offer};

pub(crate) fn render_terms(window: &[Term; WINDOW_SIZE], selection: &TermSelection) {
    println!("Selectable terms ({})", selection.key());
    for term in window {
        let marker = if *term == selection.selected() { "*" } else { " " };
        println!("  {marker} {term}");
    }
    if !selection.is_durable() {
        println!("(preference storage unavailable; selection kept for this run only)");
    }
}

pub(crate) fn render_offer_board(rows: &[OfferRow], term: Option<Term>) {
    println!("\nOffers{}", scope(term));
    if rows.is_empty() {
        println!("- none");
        return;
    }

    for row in rows {
        let count = row
            .candidature_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| "…".to_string());
        println!(
            "- {} | {} | {} | starts {} | {} candidature(s) | {}",
            row.offer.id,
            row.offer.title,
            row.offer.status,
            row.offer.start_date,
            count,
            offer_actions(&row.actions)
        );
        if let Some(comment) = row.offer.rejection_comment() {
            println!("    rejected: {comment}");
        }
        for preview in &row.preview {
            println!(
                "    • {} | {} | applied {} | {}",
                preview.candidature.id,
                preview.candidature.status,
                preview.candidature.application_date,
                candidature_actions(&preview.actions)
            );
        }
    }
}

pub(crate) fn render_evaluation_board(rows: &[EvaluationRow], term: Option<Term>) {
    println!("\nEvaluations{}", scope(term));
    if rows.is_empty() {
        println!("- none");
        return;
    }

    for row in rows {
        let cell = match row.action.as_ref() {
            None => "loading".to_string(),
            Some(action) => match (action.action, action.evaluation_id.as_ref()) {
                (EvaluationActionKind::View, Some(id)) => format!("view evaluation {id}"),
                (EvaluationActionKind::View, None) => "view evaluation".to_string(),
                (EvaluationActionKind::Create, _) => "create evaluation".to_string(),
                (EvaluationActionKind::Blocked, _) => match action.blocked_by.as_ref() {
                    Some(reason) => format!("blocked: {reason}"),
                    None => "blocked".to_string(),
                },
            },
        };
        println!("- {} | {cell}", row.pair);
    }
}

pub(crate) fn render_offer_change(before: &Offer, after: &Offer) {
    println!(
        "Offer {} moved from {} to {}",
        after.id, before.status, after.status
    );
}

pub(crate) fn render_candidature_change(before: &Candidature, after: &Candidature) {
    println!(
        "Candidature {} moved from {} to {}",
        after.id, before.status, after.status
    );
    if let Some(convocation) = after.convocation.as_ref() {
        println!(
            "  interview on {} at {}",
            convocation.date().format("%Y-%m-%d %H:%M"),
            convocation.location()
        );
        if !convocation.message().is_empty() {
            println!("  message: {}", convocation.message());
        }
    }
}

fn scope(term: Option<Term>) -> String {
    match term {
        Some(term) => format!(" for {term}"),
        None => " (all terms)".to_string(),
    }
}

fn offer_actions(actions: &OfferActions) -> String {
    let mut allowed = vec!["preview"];
    if actions.can_disable {
        allowed.push("disable");
    }
    if actions.can_enable {
        allowed.push("enable");
    }
    allowed.join(", ")
}

fn candidature_actions(actions: &CandidatureActions) -> String {
    let allowed: Vec<&str> = [
        (actions.can_convoke, "convoke"),
        (actions.can_accept, "accept"),
        (actions.can_reject, "reject"),
    ]
    .into_iter()
    .filter_map(|(allowed, label)| allowed.then_some(label))
    .collect();

    if allowed.is_empty() {
        "no actions".to_string()
    } else {
        allowed.join(", ")
    }
}
