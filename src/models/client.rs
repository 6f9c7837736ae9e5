use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::store::Entity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Planning,
    InProgress,
    Completed,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StageStatus::Planning => "planning",
            StageStatus::InProgress => "in_progress",
            StageStatus::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for StageStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(StageStatus::Planning),
            "in_progress" => Ok(StageStatus::InProgress),
            "completed" => Ok(StageStatus::Completed),
            _ => Err(anyhow::anyhow!("Unknown stage status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgramStage {
    pub name: String,
    pub status: StageStatus,
    #[serde(default)]
    pub description: Option<String>,
}

/// A coaching client record.
///
/// `email` is the address the client logs in with; `created_by` is the owner
/// email the platform stamped at creation. Dependent Session/Message records
/// key off `created_by` — the two are never assumed to coincide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub coach_email: String,
    #[serde(default)]
    pub coach_name: Option<String>,
    #[serde(default)]
    pub program_type: Option<String>,
    #[serde(default)]
    pub total_sessions: i64,
    #[serde(default)]
    pub sessions_used: i64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub program_stages: Vec<ProgramStage>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

impl Entity for Client {
    const NAME: &'static str = "Client";
}

impl Client {
    pub fn sessions_remaining(&self) -> i64 {
        self.total_sessions - self.sessions_used
    }

    /// The stage currently in progress, if any. An empty stage list yields
    /// `None`, not an error.
    pub fn active_stage(&self) -> Option<&ProgramStage> {
        self.program_stages
            .iter()
            .find(|s| s.status == StageStatus::InProgress)
    }
}

/// The stage template every new client starts with.
pub fn default_program_stages() -> Vec<ProgramStage> {
    let stage = |name: &str, description: &str| ProgramStage {
        name: name.into(),
        status: StageStatus::Planning,
        description: Some(description.into()),
    };
    vec![
        stage(
            "Initial Assessment",
            "Getting to know the client and their goals",
        ),
        stage("Program Design", "Creating a customized coaching program"),
        stage("Implementation", "Working through the coaching program"),
        stage(
            "Review & Adjust",
            "Evaluating progress and making adjustments",
        ),
    ]
}

// Request/Response DTOs
#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub program_type: Option<String>,
    #[serde(default)]
    pub total_sessions: Option<i64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateClientRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub program_type: Option<String>,
    #[serde(default)]
    pub total_sessions: Option<i64>,
    #[serde(default)]
    pub sessions_used: Option<i64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub program_stages: Option<Vec<ProgramStage>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_stage_on_empty_list_is_none() {
        let client: Client = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "full_name": "Sam Doe",
            "email": "sam@example.com",
            "coach_email": "coach@example.com",
        }))
        .unwrap();
        assert!(client.program_stages.is_empty());
        assert!(client.active_stage().is_none());
    }

    #[test]
    fn active_stage_finds_in_progress() {
        let mut stages = default_program_stages();
        stages[2].status = StageStatus::InProgress;
        let client = Client {
            id: "c1".into(),
            full_name: "Sam Doe".into(),
            email: "sam@example.com".into(),
            phone: None,
            coach_email: "coach@example.com".into(),
            coach_name: None,
            program_type: None,
            total_sessions: 10,
            sessions_used: 3,
            start_date: None,
            description: None,
            program_stages: stages,
            created_by: None,
            created_date: None,
        };
        assert_eq!(client.active_stage().unwrap().name, "Implementation");
        assert_eq!(client.sessions_remaining(), 7);
    }

    #[test]
    fn default_stages_all_start_in_planning() {
        let stages = default_program_stages();
        assert_eq!(stages.len(), 4);
        assert!(stages.iter().all(|s| s.status == StageStatus::Planning));
    }
}
