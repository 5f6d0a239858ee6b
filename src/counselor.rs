//! Counselor roster aggregation.

use serde::Deserialize;
use tracing::warn;

use crate::models::{
    CounselorAnalytics, CounselorDashboard, CounselorProfile, RiskCounts, RiskDistribution,
    RosterEntry,
};
use crate::risk::{round_to, RiskLevel};

/// Body of `GET /api/counselor/dashboard`.
///
/// The backend either sends a pre-shaped `{ counselor, students, summary }`
/// object, a bare roster array, or either of those wrapped in `{ data }`.
/// Any server-side summary is ignored; the summary is always derived from
/// the roster.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CounselorPayload {
    Wrapped {
        data: Box<CounselorPayload>,
    },
    Shaped {
        #[serde(default)]
        counselor: Option<CounselorProfile>,
        students: Vec<RosterEntry>,
    },
    Roster(Vec<RosterEntry>),
}

impl CounselorPayload {
    pub fn into_parts(self) -> (Option<CounselorProfile>, Vec<RosterEntry>) {
        match self {
            CounselorPayload::Wrapped { data } => data.into_parts(),
            CounselorPayload::Shaped {
                counselor,
                students,
            } => (counselor, students),
            CounselorPayload::Roster(students) => (None, students),
        }
    }
}

/// Roster-wide statistics. An empty roster yields all zeros.
pub fn transform(roster: &[RosterEntry]) -> CounselorAnalytics {
    if roster.is_empty() {
        return CounselorAnalytics::default();
    }

    let total = roster.len() as f64;
    let gpa_sum: f64 = roster
        .iter()
        .map(|entry| entry.current_gpa.unwrap_or(0.0))
        .sum();
    let attendance_sum: f64 = roster
        .iter()
        .map(|entry| entry.current_attendance.unwrap_or(0.0))
        .sum();

    let mut risk_counts = RiskCounts::default();
    let mut unclassified = Vec::new();
    for entry in roster {
        match RiskLevel::from_roster_status(&entry.current_risk_status) {
            Ok(level) => risk_counts.record(level),
            Err(unknown) => {
                warn!(
                    student = %entry.student_id,
                    label = %entry.current_risk_status,
                    "Roster entry has an unrecognized risk label"
                );
                unclassified.push(unknown.for_student(&entry.student_id));
            }
        }
    }

    CounselorAnalytics {
        total_students: roster.len(),
        avg_gpa: round_to(gpa_sum / total, 2),
        avg_attendance: (attendance_sum / total).round(),
        risk_counts,
        risk_distribution: RiskDistribution::from_counts(&risk_counts, roster.len()),
        unclassified,
    }
}

pub fn build_dashboard(payload: CounselorPayload) -> CounselorDashboard {
    let (counselor, students) = payload.into_parts();
    let summary = transform(&students);
    CounselorDashboard {
        counselor,
        students,
        summary,
    }
}

/// Roster ordered most severe first, then by ascending gpa.
pub fn students_by_risk(dashboard: &CounselorDashboard) -> Vec<&RosterEntry> {
    let mut students: Vec<&RosterEntry> = dashboard.students.iter().collect();
    students.sort_by(|a, b| {
        let rank = |entry: &RosterEntry| {
            RiskLevel::from_roster_status(&entry.current_risk_status)
                .map(RiskLevel::severity_rank)
                .unwrap_or(0)
        };
        rank(b).cmp(&rank(a)).then_with(|| {
            a.current_gpa
                .unwrap_or(0.0)
                .partial_cmp(&b.current_gpa.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    students
}
