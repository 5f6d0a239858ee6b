use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::risk::UnknownRiskLabel;

/// One reporting period as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterRecord {
    pub semester: u32,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub cgpa: Option<f64>,
    #[serde(default)]
    pub attendance_percentage: Option<f64>,
    #[serde(default)]
    pub backlogs: u32,
    #[serde(default)]
    pub risk_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentProfile {
    #[serde(alias = "userId")]
    pub student_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub year: Option<u32>,
}

/// Body of `GET /api/dashboard/student/{userId}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentDashboardResponse {
    #[serde(default)]
    pub student: Option<StudentProfile>,
    #[serde(default)]
    pub dashboard: Vec<SemesterRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub label: String,
    pub gpa: f64,
    pub attendance: f64,
    pub risk_score: u8,
}

/// Percentages per bucket. Accepts the counselor wire names as aliases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskDistribution {
    #[serde(alias = "safe")]
    pub low: f64,
    #[serde(alias = "warning")]
    pub medium: f64,
    #[serde(alias = "atRisk")]
    pub high: f64,
}

impl RiskDistribution {
    pub fn total(&self) -> f64 {
        self.low + self.medium + self.high
    }

    /// Labelled slices in chart order.
    pub fn slices(&self) -> [(&'static str, f64); 3] {
        [
            ("Low Risk", self.low),
            ("Medium Risk", self.medium),
            ("High Risk", self.high),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCounts {
    pub safe: usize,
    pub warning: usize,
    pub at_risk: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAnalytics {
    pub avg_gpa: f64,
    pub avg_attendance: f64,
    pub gpa_change: f64,
    pub attendance_change: f64,
    pub risk_distribution: RiskDistribution,
    pub monthly_trends: Vec<TrendPoint>,
    pub student: Option<StudentProfile>,
    pub raw_dashboard: Vec<SemesterRecord>,
}

impl DashboardAnalytics {
    /// Latest record by position, not by semester number.
    pub fn latest_record(&self) -> Option<&SemesterRecord> {
        self.raw_dashboard.last()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RosterEntry {
    pub student_id: String,
    pub name: String,
    pub course: Option<String>,
    pub year: Option<u32>,
    pub current_semester: Option<u32>,
    pub current_gpa: Option<f64>,
    pub current_attendance: Option<f64>,
    pub current_backlogs: u32,
    pub current_risk_status: String,
    pub total_semesters: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CounselorProfile {
    pub user_id: String,
    pub name: String,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounselorAnalytics {
    pub total_students: usize,
    pub avg_gpa: f64,
    pub avg_attendance: f64,
    pub risk_counts: RiskCounts,
    pub risk_distribution: RiskDistribution,
    pub unclassified: Vec<UnknownRiskLabel>,
}

/// What the counselor screen renders: profile, roster and derived summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounselorDashboard {
    pub counselor: Option<CounselorProfile>,
    pub students: Vec<RosterEntry>,
    pub summary: CounselorAnalytics,
}

/// Account role. Roles without a screen of their own keep their raw label so
/// a stored profile reads back exactly as the backend sent it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    #[default]
    Student,
    Counselor,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardKind {
    Student,
    Counselor,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Student => "student",
            Role::Counselor => "counselor",
            Role::Other(label) => label,
        }
    }

    pub fn dashboard(&self) -> DashboardKind {
        match self {
            Role::Counselor => DashboardKind::Counselor,
            Role::Student | Role::Other(_) => DashboardKind::Student,
        }
    }
}

impl From<String> for Role {
    fn from(label: String) -> Self {
        match label.to_lowercase().as_str() {
            "student" => Role::Student,
            "counselor" => Role::Counselor,
            _ => Role::Other(label),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "id")]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub message: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}
