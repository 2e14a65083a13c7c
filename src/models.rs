use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One day of usage telemetry for an account. Dates stay raw text so the
/// lenient parser sees exactly what arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub date: String,
    pub dau: f64,
    pub used_seats: f64,
    pub licensed_seats: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    #[serde(default)]
    pub ticket_id: Option<String>,
    pub severity: i32,
    pub created_at: String,
}

/// Signals computed once per request and shared by every downstream
/// generator. Fields are always present; neutral values are 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub dau_trend_mom: f64,
    pub license_utilization: f64,
    pub sev1_last_14d: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDriver {
    pub signal: String,
    pub weight: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub opportunity: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    #[serde(rename = "CSM")]
    Csm,
    Support,
    Sales,
}

impl Owner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Owner::Csm => "CSM",
            Owner::Support => "Support",
            Owner::Sales => "Sales",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookItem {
    pub owner: Owner,
    pub action: String,
    pub eta_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comms {
    pub internal_slack: String,
    pub client_email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub account_id: String,
    pub risk_score: i32,
    pub risk_drivers: Vec<RiskDriver>,
    pub expansion_ops: Vec<Opportunity>,
    pub playbook: Vec<PlaybookItem>,
    pub comms: Comms,
    pub metrics: FeatureSet,
}

#[derive(Debug, Clone)]
pub struct AnalysisSummary {
    pub id: Uuid,
    pub account_id: String,
    pub risk_score: i32,
    pub created_at: DateTime<Utc>,
}
