//! Incident report schema returned by the reasoning service.
//!
//! The service is free to add fields; these types only describe what must be
//! present for a response to count as a valid report.

use serde::{Deserialize, Serialize};

/// Incident priority, ordered most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
    /// Sort bucket for runs without a usable classification. Never accepted
    /// from the service.
    #[serde(skip_deserializing)]
    Unknown,
}

/// Rank given to priority labels that are present but unrecognised.
pub const UNRECOGNISED_PRIORITY_RANK: u8 = 99;

impl Priority {
    pub const fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
            Self::Unknown => 4,
        }
    }

    /// Case-insensitive label lookup (`"high"` → `High`).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Some(Self::Critical),
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            "UNKNOWN" => Some(Self::Unknown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentDomain {
    Security,
    Municipal,
    CivilDefense,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub priority: Priority,
    pub domain: IncidentDomain,
    #[serde(rename = "type")]
    pub incident_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentNarrative {
    pub summary: String,
    pub detailed_narrative: String,
    #[serde(default)]
    pub visual_evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub recommended_unit: String,
    /// Absent or null when no camera was found near the location
    #[serde(default)]
    pub nearest_cctv: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentReport {
    pub incident_id: String,
    pub timestamp: String,
    pub classification: Classification,
    pub report: IncidentNarrative,
    pub action_plan: ActionPlan,
}
