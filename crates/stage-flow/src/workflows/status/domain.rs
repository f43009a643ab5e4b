use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::workflows::calendar::TermValue;
use crate::workflows::error::{GuardViolation, MAX_CONVOCATION_MESSAGE_LEN};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of an internship offer.
    OfferId
);
string_id!(CandidatureId);
string_id!(StudentId);
string_id!(AgreementId);
string_id!(EvaluationId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    PendingValidation,
    Published,
    Rejected,
    Disabled,
}

impl OfferStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PendingValidation => "PENDING_VALIDATION",
            Self::Published => "PUBLISHED",
            Self::Rejected => "REJECTED",
            Self::Disabled => "DISABLED",
        }
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Internship posting owned by an employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: OfferId,
    #[serde(default)]
    pub title: String,
    pub status: OfferStatus,
    pub start_date: NaiveDate,
    pub duration_weeks: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<TermValue>,
}

impl Offer {
    /// The reviewer's comment, only meaningful once the offer was rejected.
    pub fn rejection_comment(&self) -> Option<&str> {
        match self.status {
            OfferStatus::Rejected => self.rejection_comment.as_deref(),
            _ => None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == OfferStatus::Published
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidatureStatus {
    Pending,
    Convened,
    Accepted,
    Rejected,
}

impl CandidatureStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Convened => "CONVENED",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for CandidatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A student's application to an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidature {
    pub id: CandidatureId,
    pub offer_id: OfferId,
    pub student_id: StudentId,
    pub status: CandidatureStatus,
    pub application_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convocation: Option<Convocation>,
}

/// Interview invitation as typed by the employer, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvocationDraft {
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub message: String,
}

/// Validated interview invitation. Immutable once attached to a candidature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ConvocationDraft")]
pub struct Convocation {
    date: NaiveDateTime,
    location: String,
    message: String,
}

impl Convocation {
    pub fn from_draft(draft: &ConvocationDraft) -> Result<Self, GuardViolation> {
        let date = draft.date.ok_or(GuardViolation::MissingConvocationDate)?;

        let location = draft.location.trim();
        if location.is_empty() {
            return Err(GuardViolation::MissingConvocationLocation);
        }

        let length = draft.message.chars().count();
        if length > MAX_CONVOCATION_MESSAGE_LEN {
            return Err(GuardViolation::ConvocationMessageTooLong {
                length,
                max: MAX_CONVOCATION_MESSAGE_LEN,
            });
        }

        Ok(Self {
            date,
            location: location.to_string(),
            message: draft.message.clone(),
        })
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl TryFrom<ConvocationDraft> for Convocation {
    type Error = GuardViolation;

    fn try_from(draft: ConvocationDraft) -> Result<Self, Self::Error> {
        Self::from_draft(&draft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgreementStatus {
    #[serde(rename = "BROUILLON")]
    Draft,
    #[serde(rename = "EN_ATTENTE_SIGNATURE")]
    AwaitingSignature,
    #[serde(rename = "VALIDEE")]
    Validated,
}

impl AgreementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "BROUILLON",
            Self::AwaitingSignature => "EN_ATTENTE_SIGNATURE",
            Self::Validated => "VALIDEE",
        }
    }
}

/// Tripartite internship contract (entente) between student, employer, and program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agreement {
    pub id: AgreementId,
    pub student_id: StudentId,
    pub offer_id: OfferId,
    pub status: AgreementStatus,
    #[serde(default)]
    pub employer_signed_on: Option<NaiveDate>,
    #[serde(default)]
    pub student_signed_on: Option<NaiveDate>,
    #[serde(default)]
    pub admin_signed_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<TermValue>,
}

impl Agreement {
    pub fn is_fully_signed(&self) -> bool {
        self.status == AgreementStatus::Validated
            || (self.employer_signed_on.is_some()
                && self.student_signed_on.is_some()
                && self.admin_signed_on.is_some())
    }

    pub fn pair(&self) -> EnrollmentPair {
        EnrollmentPair {
            student_id: self.student_id.clone(),
            offer_id: self.offer_id.clone(),
        }
    }
}

/// Post-internship assessment. At most one exists per [`EnrollmentPair`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: EvaluationId,
    pub submitted: bool,
    pub date_evaluation: Option<NaiveDate>,
}

/// The (student, offer) pair that evaluations and teacher assignments are keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentPair {
    pub student_id: StudentId,
    pub offer_id: OfferId,
}

impl EnrollmentPair {
    pub fn new(student_id: impl Into<String>, offer_id: impl Into<String>) -> Self {
        Self {
            student_id: StudentId::new(student_id),
            offer_id: OfferId::new(offer_id),
        }
    }
}

impl fmt::Display for EnrollmentPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.student_id, self.offer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn draft() -> ConvocationDraft {
        ConvocationDraft {
            date: Some(NaiveDateTime::new(
                NaiveDate::from_ymd_opt(2025, 11, 3).expect("valid"),
                NaiveTime::from_hms_opt(10, 30, 0).expect("valid"),
            )),
            location: "  Room B-214 ".to_string(),
            message: "Bring your portfolio.".to_string(),
        }
    }

    #[test]
    fn convocation_requires_date_and_location() {
        let mut missing_date = draft();
        missing_date.date = None;
        assert_eq!(
            Convocation::from_draft(&missing_date),
            Err(GuardViolation::MissingConvocationDate)
        );

        let mut blank_location = draft();
        blank_location.location = "   ".to_string();
        assert_eq!(
            Convocation::from_draft(&blank_location),
            Err(GuardViolation::MissingConvocationLocation)
        );

        let convocation = Convocation::from_draft(&draft()).expect("valid draft");
        assert_eq!(convocation.location(), "Room B-214");
    }

    #[test]
    fn convocation_message_is_bounded() {
        let mut long = draft();
        long.message = "x".repeat(MAX_CONVOCATION_MESSAGE_LEN + 1);

        assert_eq!(
            Convocation::from_draft(&long),
            Err(GuardViolation::ConvocationMessageTooLong {
                length: MAX_CONVOCATION_MESSAGE_LEN + 1,
                max: MAX_CONVOCATION_MESSAGE_LEN,
            })
        );

        long.message.pop();
        assert!(Convocation::from_draft(&long).is_ok());
    }

    #[test]
    fn convocation_json_goes_through_validation() {
        let blank = serde_json::from_str::<Convocation>(
            r#"{"date":"2025-11-03T10:30:00","location":"  ","message":""}"#,
        );
        assert!(blank.is_err(), "blank location must not deserialize");

        let undated = serde_json::from_str::<Convocation>(r#"{"location":"Room B-214"}"#);
        assert!(undated.is_err(), "missing date must not deserialize");

        let long = format!(
            r#"{{"date":"2025-11-03T10:30:00","location":"Room B-214","message":"{}"}}"#,
            "x".repeat(MAX_CONVOCATION_MESSAGE_LEN + 1)
        );
        assert!(serde_json::from_str::<Convocation>(&long).is_err());

        let stored = Convocation::from_draft(&draft()).expect("valid draft");
        let json = serde_json::to_string(&stored).expect("serializes");
        let reread: Convocation = serde_json::from_str(&json).expect("valid convocation json");
        assert_eq!(reread, stored);

        let candidature: Candidature = serde_json::from_str(
            r#"{"id":"c-1","offerId":"o-1","studentId":"s-1","status":"CONVENED",
                "applicationDate":"2025-03-01",
                "convocation":{"date":"2025-11-03T10:30:00","location":" Room B-214 "}}"#,
        )
        .expect("candidature json");
        assert_eq!(
            candidature.convocation.as_ref().map(Convocation::location),
            Some("Room B-214")
        );
    }

    #[test]
    fn rejection_comment_only_surfaces_for_rejected_offers() {
        let mut offer: Offer = serde_json::from_str(
            r#"{"id":"o-1","status":"REJECTED","startDate":"2025-09-01","durationWeeks":12,
                "rejectionComment":"Missing supervisor"}"#,
        )
        .expect("offer json");
        assert_eq!(offer.rejection_comment(), Some("Missing supervisor"));

        offer.status = OfferStatus::Published;
        assert_eq!(offer.rejection_comment(), None);
    }

    #[test]
    fn agreement_signature_completion() {
        let mut agreement: Agreement = serde_json::from_str(
            r#"{"id":"e-1","studentId":"s-1","offerId":"o-1","status":"EN_ATTENTE_SIGNATURE",
                "employerSignedOn":"2025-05-01","studentSignedOn":"2025-05-02"}"#,
        )
        .expect("agreement json");
        assert!(!agreement.is_fully_signed());

        agreement.admin_signed_on = NaiveDate::from_ymd_opt(2025, 5, 3);
        assert!(agreement.is_fully_signed());

        agreement.admin_signed_on = None;
        agreement.status = AgreementStatus::Validated;
        assert!(agreement.is_fully_signed());
    }
}
