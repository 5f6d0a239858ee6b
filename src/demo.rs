//! Fixed datasets shown when the backend cannot be reached.

use crate::counselor::{build_dashboard, CounselorPayload};
use crate::models::{
    CounselorDashboard, CounselorProfile, DashboardAnalytics, RiskDistribution, RosterEntry,
    StudentProfile, TrendPoint,
};

pub fn student_dashboard() -> DashboardAnalytics {
    let trend = |label: &str, gpa: f64, attendance: f64, risk_score: u8| TrendPoint {
        label: label.to_string(),
        gpa,
        attendance,
        risk_score,
    };

    DashboardAnalytics {
        avg_gpa: 3.42,
        avg_attendance: 87.0,
        gpa_change: 2.3,
        attendance_change: -1.5,
        risk_distribution: RiskDistribution {
            low: 62.7,
            medium: 18.0,
            high: 19.3,
        },
        monthly_trends: vec![
            trend("Jan", 3.2, 85.0, 25),
            trend("Feb", 3.3, 87.0, 23),
            trend("Mar", 3.1, 82.0, 28),
            trend("Apr", 3.4, 89.0, 21),
            trend("May", 3.5, 91.0, 19),
            trend("Jun", 3.3, 88.0, 22),
        ],
        student: Some(StudentProfile {
            student_id: Some("DEMO001".to_string()),
            name: Some("Demo Student".to_string()),
            email: Some("demo@student.com".to_string()),
            course: Some("Computer Science".to_string()),
            year: Some(2),
        }),
        raw_dashboard: Vec::new(),
    }
}

type MockStudent = (
    &'static str,
    &'static str,
    &'static str,
    u32,
    u32,
    f64,
    f64,
    u32,
    &'static str,
);

// id, name, course, year, semester, gpa, attendance, backlogs, risk
const MOCK_ROSTER: [MockStudent; 5] = [
    ("STU2024001", "Sarah Johnson", "Computer Science", 2, 3, 2.3, 65.0, 2, "High Risk"),
    ("STU2024002", "Michael Chen", "Business Admin", 1, 2, 2.8, 78.0, 1, "Medium Risk"),
    ("STU2024003", "Emma Wilson", "Engineering", 2, 4, 3.7, 95.0, 0, "Low Risk"),
    ("STU2024004", "David Rodriguez", "Mathematics", 1, 1, 1.9, 45.0, 3, "High Risk"),
    ("STU2024005", "Lisa Park", "Physics", 2, 3, 3.1, 82.0, 0, "Medium Risk"),
];

/// Five-student roster; the summary is derived from it like a live load.
pub fn counselor_dashboard() -> CounselorDashboard {
    let students = MOCK_ROSTER
        .iter()
        .map(
            |&(student_id, name, course, year, semester, gpa, attendance, backlogs, risk)| {
                RosterEntry {
                    student_id: student_id.to_string(),
                    name: name.to_string(),
                    course: Some(course.to_string()),
                    year: Some(year),
                    current_semester: Some(semester),
                    current_gpa: Some(gpa),
                    current_attendance: Some(attendance),
                    current_backlogs: backlogs,
                    current_risk_status: risk.to_string(),
                    total_semesters: Some(semester),
                }
            },
        )
        .collect();

    build_dashboard(CounselorPayload::Shaped {
        counselor: Some(CounselorProfile {
            user_id: "CNS001".to_string(),
            name: "Dr. Sarah Wilson".to_string(),
            department: Some("Computer Science".to_string()),
        }),
        students,
    })
}
