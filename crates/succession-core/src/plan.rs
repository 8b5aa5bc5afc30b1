//! Succession plan records: the stored JSON shape, the in-memory record, and
//! the submission form.

use base64::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Prefix marking a score sealed with the simulated "FHE" placeholder.
pub const SIMULATED_SEAL_PREFIX: &str = "FHE-";

/// Scores at or above this are `high` readiness.
pub const HIGH_READINESS_MIN: f64 = 80.0;

/// Scores at or below this are `low` readiness.
pub const LOW_READINESS_MAX: f64 = 50.0;

/// Number of candidate id characters shown in the display label.
const CANDIDATE_LABEL_CHARS: usize = 6;

/// Coarse three-tier classification derived from a performance score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessLevel {
    High,
    #[default]
    Medium,
    Low,
}

impl ReadinessLevel {
    /// Classify a plaintext score: `>= 80` is high, `<= 50` is low.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_READINESS_MIN {
            Self::High
        } else if score <= LOW_READINESS_MAX {
            Self::Low
        } else {
            Self::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    fn parse_lenient(s: &str) -> Self {
        match s {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl std::fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A score sealed with the simulated "FHE" placeholder.
///
/// This is **not** encryption: the value is `FHE-` followed by the base64 of
/// the score exactly as entered. It exists so stored records keep the same shape a real
/// confidential-computation backend would produce. No unsealing is offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SealedScore(String);

impl SealedScore {
    pub fn seal(score: &str) -> Self {
        let encoded = BASE64_STANDARD.encode(score);
        Self(format!("{SIMULATED_SEAL_PREFIX}{encoded}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the value carries the simulated-seal prefix.
    pub fn is_simulated(&self) -> bool {
        self.0.starts_with(SIMULATED_SEAL_PREFIX)
    }
}

/// JSON object stored under `succession_plan_<id>`.
///
/// A missing, null, or unrecognised `readinessLevel` decodes as `medium`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPlan {
    pub position: String,
    pub candidate_id: String,
    pub encrypted_score: SealedScore,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub department: String,
    #[serde(default, deserialize_with = "lenient_readiness")]
    pub readiness_level: ReadinessLevel,
}

fn lenient_readiness<'de, D>(deserializer: D) -> Result<ReadinessLevel, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(ReadinessLevel::parse_lenient)
        .unwrap_or_default())
}

/// One succession-plan entry as held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub position: String,
    pub candidate_id: String,
    pub encrypted_score: SealedScore,
    pub timestamp: i64,
    pub department: String,
    pub readiness_level: ReadinessLevel,
}

impl Record {
    pub fn from_stored(id: String, stored: StoredPlan) -> Self {
        Self {
            id,
            position: stored.position,
            candidate_id: stored.candidate_id,
            encrypted_score: stored.encrypted_score,
            timestamp: stored.timestamp,
            department: stored.department,
            readiness_level: stored.readiness_level,
        }
    }

    pub fn to_stored(&self) -> StoredPlan {
        StoredPlan {
            position: self.position.clone(),
            candidate_id: self.candidate_id.clone(),
            encrypted_score: self.encrypted_score.clone(),
            timestamp: self.timestamp,
            department: self.department.clone(),
            readiness_level: self.readiness_level,
        }
    }

    /// Display label for the candidate: `EMP-` plus the first six characters.
    pub fn candidate_label(&self) -> String {
        let prefix: String = self.candidate_id.chars().take(CANDIDATE_LABEL_CHARS).collect();
        format!("EMP-{prefix}")
    }

    /// Submission time, if the stored timestamp is representable.
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Raw submission form, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanInput {
    pub position: String,
    pub candidate_id: String,
    pub department: String,
    pub score: String,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPlan {
    pub position: String,
    pub candidate_id: String,
    pub department: String,
    pub score: f64,
    /// The trimmed score text; this is what gets sealed.
    pub score_text: String,
}

impl PlanInput {
    /// Check required fields and parse the score.
    ///
    /// `position`, `candidate_id` and `score` must be non-blank; `department`
    /// is optional. The score must be a finite number; fractions are kept.
    pub fn validate(&self) -> Result<ValidPlan, ValidationError> {
        if self.position.trim().is_empty() {
            return Err(ValidationError::MissingField("position"));
        }
        if self.candidate_id.trim().is_empty() {
            return Err(ValidationError::MissingField("candidate_id"));
        }
        let score = self.score.trim();
        if score.is_empty() {
            return Err(ValidationError::MissingField("score"));
        }
        let value = score
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ValidationError::InvalidScore(score.to_string()))?;

        Ok(ValidPlan {
            position: self.position.clone(),
            candidate_id: self.candidate_id.clone(),
            department: self.department.clone(),
            score: value,
            score_text: score.to_string(),
        })
    }
}

impl ValidPlan {
    pub fn readiness(&self) -> ReadinessLevel {
        ReadinessLevel::from_score(self.score)
    }

    /// Build the record to persist. The plaintext score does not survive.
    pub fn into_record(self, id: String, timestamp: i64) -> Record {
        let readiness_level = self.readiness();
        Record {
            id,
            position: self.position,
            candidate_id: self.candidate_id,
            encrypted_score: SealedScore::seal(&self.score_text),
            timestamp,
            department: self.department,
            readiness_level,
        }
    }
}
