use std::fmt::Write;

use crate::counselor::students_by_risk;
use crate::models::{CounselorDashboard, DashboardAnalytics, RiskDistribution};
use crate::risk::RiskLevel;

fn write_source(output: &mut String, is_demo: bool) {
    if is_demo {
        let _ = writeln!(
            output,
            "> DEMO: the backend could not be reached, figures below are sample data."
        );
    } else {
        let _ = writeln!(output, "Source: live backend");
    }
}

fn write_distribution(output: &mut String, distribution: &RiskDistribution) {
    let _ = writeln!(output, "## Risk Distribution");
    for (label, value) in distribution.slices() {
        let _ = writeln!(output, "- {label}: {value:.1}%");
    }
}

fn signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.1}%")
    } else {
        format!("{value:.1}%")
    }
}

pub fn build_student_report(analytics: &DashboardAnalytics, is_demo: bool) -> String {
    let mut output = String::new();
    let student_label = analytics
        .student
        .as_ref()
        .and_then(|student| student.name.as_deref())
        .unwrap_or("Student");

    let _ = writeln!(output, "# Student Dashboard");
    let _ = writeln!(output, "Generated for {student_label}");
    write_source(&mut output, is_demo);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Metrics");
    let _ = writeln!(
        output,
        "- Average GPA: {:.2} ({} vs previous semester)",
        analytics.avg_gpa,
        signed(analytics.gpa_change)
    );
    let _ = writeln!(
        output,
        "- Average attendance: {:.0}% ({} vs previous semester)",
        analytics.avg_attendance,
        signed(analytics.attendance_change)
    );

    let _ = writeln!(output);
    write_distribution(&mut output, &analytics.risk_distribution);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Trend");
    if analytics.monthly_trends.is_empty() {
        let _ = writeln!(output, "No semesters reported.");
    } else {
        for point in &analytics.monthly_trends {
            let _ = writeln!(
                output,
                "- {}: GPA {:.2}, attendance {:.0}%, risk score {}",
                point.label, point.gpa, point.attendance, point.risk_score
            );
        }
    }

    if let Some(latest) = analytics.latest_record() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Latest Semester");
        let _ = writeln!(
            output,
            "- Semester {}: {} with {} backlog(s)",
            latest.semester,
            RiskLevel::from_semester_status(&latest.risk_status),
            latest.backlogs
        );
    }

    output
}

pub fn build_counselor_report(dashboard: &CounselorDashboard, is_demo: bool) -> String {
    let mut output = String::new();
    let summary = &dashboard.summary;
    let counselor_label = dashboard
        .counselor
        .as_ref()
        .map(|counselor| match &counselor.department {
            Some(department) => format!("{} - {}", counselor.name, department),
            None => counselor.name.clone(),
        })
        .unwrap_or_else(|| "counselor".to_string());

    let _ = writeln!(output, "# Counselor Dashboard");
    let _ = writeln!(output, "Generated for {counselor_label}");
    write_source(&mut output, is_demo);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Total students: {}", summary.total_students);
    let _ = writeln!(output, "- Average GPA: {:.2}", summary.avg_gpa);
    let _ = writeln!(output, "- Average attendance: {:.0}%", summary.avg_attendance);
    let _ = writeln!(
        output,
        "- Safe {} / Warning {} / At risk {}",
        summary.risk_counts.safe, summary.risk_counts.warning, summary.risk_counts.at_risk
    );

    let _ = writeln!(output);
    write_distribution(&mut output, &summary.risk_distribution);

    if !summary.unclassified.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Unrecognized Risk Labels");
        for unknown in &summary.unclassified {
            let _ = writeln!(
                output,
                "- {}: '{}'",
                unknown.student_id.as_deref().unwrap_or("unknown student"),
                unknown.label
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students");
    let students = students_by_risk(dashboard);
    if students.is_empty() {
        let _ = writeln!(output, "No students assigned.");
    } else {
        for student in students {
            let _ = writeln!(
                output,
                "- {} ({}, {}) GPA {} attendance {} backlogs {}: {}",
                student.name,
                student.student_id,
                student.course.as_deref().unwrap_or("n/a"),
                student
                    .current_gpa
                    .map(|gpa| format!("{gpa:.1}"))
                    .unwrap_or_else(|| "N/A".to_string()),
                student
                    .current_attendance
                    .map(|attendance| format!("{attendance:.0}%"))
                    .unwrap_or_else(|| "N/A".to_string()),
                student.current_backlogs,
                student.current_risk_status
            );
        }
    }

    output
}
