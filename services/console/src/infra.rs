use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use stage_flow::error::AppError;
use stage_flow::workflows::calendar::{PreferenceError, PreferenceStore};
use stage_flow::workflows::gateway::{
    EvaluationCheck, EvaluationDirectory, GatewayError, InternshipDirectory, TeacherAssignment,
    WorkflowGateway,
};
use stage_flow::workflows::status::{
    Agreement, Candidature, CandidatureId, CandidatureStatus, Convocation, EnrollmentPair,
    Evaluation, Offer, OfferId, OfferStatus,
};
use stage_flow::workflows::{Actor, Role};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Term preferences kept in a small JSON object on disk, one entry per actor key.
#[derive(Debug, Clone)]
pub(crate) struct JsonFilePreferenceStore {
    path: PathBuf,
}

impl JsonFilePreferenceStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(PreferenceError::Unavailable(err.to_string())),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|err| PreferenceError::Malformed {
            key: self.path.display().to_string(),
            reason: err.to_string(),
        })
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| PreferenceError::Unavailable(err.to_string()))?;
        }
        let encoded = serde_json::to_string_pretty(entries)
            .map_err(|err| PreferenceError::Unavailable(err.to_string()))?;
        fs::write(&self.path, encoded).map_err(|err| PreferenceError::Unavailable(err.to_string()))
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), PreferenceError> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value);
        self.write(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), PreferenceError> {
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

/// A recorded evaluation for one enrollment pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EvaluationRecord {
    #[serde(flatten)]
    pub(crate) pair: EnrollmentPair,
    pub(crate) evaluation: Evaluation,
}

/// Snapshot of the platform the console works against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Fixture {
    #[serde(default)]
    pub(crate) offers: Vec<Offer>,
    #[serde(default)]
    pub(crate) candidatures: Vec<Candidature>,
    #[serde(default)]
    pub(crate) agreements: Vec<Agreement>,
    #[serde(default)]
    pub(crate) teacher_assignments: Vec<EnrollmentPair>,
    #[serde(default)]
    pub(crate) evaluations: Vec<EvaluationRecord>,
}

/// Serves every collaborator port from a JSON fixture and writes mutations back to it.
#[derive(Debug)]
pub(crate) struct FixtureBackend {
    path: PathBuf,
    fixture: Mutex<Fixture>,
}

impl FixtureBackend {
    pub(crate) fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path)?;
        let fixture: Fixture = serde_json::from_str(&raw)?;
        Ok(Self {
            path: path.to_path_buf(),
            fixture: Mutex::new(fixture),
        })
    }

    pub(crate) fn save(&self) -> Result<(), AppError> {
        let encoded = {
            let guard = self.lock()?;
            serde_json::to_string_pretty(&*guard)?
        };
        fs::write(&self.path, encoded)?;
        Ok(())
    }

    pub(crate) fn offer(&self, id: &OfferId) -> Option<Offer> {
        let guard = self.lock().ok()?;
        guard.offers.iter().find(|offer| &offer.id == id).cloned()
    }

    pub(crate) fn candidature(&self, id: &CandidatureId) -> Option<Candidature> {
        let guard = self.lock().ok()?;
        guard
            .candidatures
            .iter()
            .find(|candidature| &candidature.id == id)
            .cloned()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Fixture>, GatewayError> {
        self.fixture
            .lock()
            .map_err(|_| GatewayError::Unavailable("fixture mutex poisoned".to_string()))
    }

    fn update_offer(&self, id: &OfferId, status: OfferStatus) -> Result<(), GatewayError> {
        let mut guard = self.lock()?;
        let offer = guard
            .offers
            .iter_mut()
            .find(|offer| &offer.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("offer {id}")))?;
        offer.status = status;
        Ok(())
    }

    fn update_candidature<F>(&self, id: &CandidatureId, apply: F) -> Result<(), GatewayError>
    where
        F: FnOnce(&mut Candidature),
    {
        let mut guard = self.lock()?;
        let candidature = guard
            .candidatures
            .iter_mut()
            .find(|candidature| &candidature.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("candidature {id}")))?;
        apply(candidature);
        Ok(())
    }
}

#[async_trait]
impl InternshipDirectory for FixtureBackend {
    async fn list_offers(&self, _actor: &Actor) -> Result<Vec<Offer>, GatewayError> {
        Ok(self.lock()?.offers.clone())
    }

    async fn list_candidatures(
        &self,
        offer_id: &OfferId,
    ) -> Result<Vec<Candidature>, GatewayError> {
        Ok(self
            .lock()?
            .candidatures
            .iter()
            .filter(|candidature| &candidature.offer_id == offer_id)
            .cloned()
            .collect())
    }

    async fn list_agreements(&self, _actor: &Actor) -> Result<Vec<Agreement>, GatewayError> {
        Ok(self.lock()?.agreements.clone())
    }
}

#[async_trait]
impl EvaluationDirectory for FixtureBackend {
    async fn check_evaluation_exists(
        &self,
        pair: &EnrollmentPair,
    ) -> Result<EvaluationCheck, GatewayError> {
        let guard = self.lock()?;
        let evaluation = guard
            .evaluations
            .iter()
            .find(|record| &record.pair == pair)
            .map(|record| record.evaluation.clone());
        Ok(EvaluationCheck {
            exists: evaluation.is_some(),
            evaluation,
        })
    }

    async fn check_teacher_assigned(
        &self,
        pair: &EnrollmentPair,
    ) -> Result<TeacherAssignment, GatewayError> {
        Ok(TeacherAssignment {
            teacher_assigned: self.lock()?.teacher_assignments.contains(pair),
        })
    }
}

#[async_trait]
impl WorkflowGateway for FixtureBackend {
    async fn disable_offer(&self, offer_id: &OfferId) -> Result<(), GatewayError> {
        self.update_offer(offer_id, OfferStatus::Disabled)
    }

    async fn enable_offer(&self, offer_id: &OfferId) -> Result<(), GatewayError> {
        self.update_offer(offer_id, OfferStatus::Published)
    }

    async fn convoke_candidature(
        &self,
        candidature_id: &CandidatureId,
        convocation: &Convocation,
    ) -> Result<(), GatewayError> {
        self.update_candidature(candidature_id, |candidature| {
            candidature.status = CandidatureStatus::Convened;
            candidature.convocation = Some(convocation.clone());
        })
    }

    async fn accept_candidature(&self, candidature_id: &CandidatureId) -> Result<(), GatewayError> {
        self.update_candidature(candidature_id, |candidature| {
            candidature.status = CandidatureStatus::Accepted;
        })
    }

    async fn reject_candidature(&self, candidature_id: &CandidatureId) -> Result<(), GatewayError> {
        self.update_candidature(candidature_id, |candidature| {
            candidature.status = CandidatureStatus::Rejected;
        })
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DDTHH:MM ({err})"))
}

pub(crate) fn parse_role(raw: &str) -> Result<Role, String> {
    Role::ordered()
        .into_iter()
        .find(|role| role.label().eq_ignore_ascii_case(raw.trim()))
        .ok_or_else(|| format!("unknown role '{raw}' (expected employer, teacher, or admin)"))
}
