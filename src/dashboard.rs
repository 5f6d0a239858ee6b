//! Student dashboard aggregation.
//!
//! Turns the per-semester records of one student into the averages, trend
//! deltas, risk breakdown and chart series shown on the student dashboard.

use std::path::Path;

use crate::error::ClientError;
use crate::models::{
    DashboardAnalytics, RiskCounts, RiskDistribution, SemesterRecord, StudentDashboardResponse,
    TrendPoint,
};
use crate::risk::{percent_change, round_to, RiskLevel};

/// Aggregates semester records in their original order.
///
/// Missing gpa or attendance values count as zero but still take part in the
/// denominator. Fails with [`ClientError::EmptyInput`] when no semesters were
/// reported.
pub fn transform(records: &[SemesterRecord]) -> Result<DashboardAnalytics, ClientError> {
    if records.is_empty() {
        return Err(ClientError::EmptyInput);
    }

    let total = records.len() as f64;
    let gpa_sum: f64 = records.iter().map(|record| record.gpa.unwrap_or(0.0)).sum();
    let attendance_sum: f64 = records
        .iter()
        .map(|record| record.attendance_percentage.unwrap_or(0.0))
        .sum();

    let (gpa_change, attendance_change) = match records {
        [.., previous, latest] => (
            percent_change(previous.gpa, latest.gpa),
            percent_change(
                previous.attendance_percentage,
                latest.attendance_percentage,
            ),
        ),
        _ => (0.0, 0.0),
    };

    let mut counts = RiskCounts::default();
    let mut monthly_trends = Vec::with_capacity(records.len());
    for record in records {
        let level = RiskLevel::from_semester_status(&record.risk_status);
        counts.record(level);
        monthly_trends.push(TrendPoint {
            label: format!("Sem {}", record.semester),
            gpa: record.gpa.unwrap_or(0.0),
            attendance: record.attendance_percentage.unwrap_or(0.0),
            risk_score: level.trend_score(),
        });
    }

    Ok(DashboardAnalytics {
        avg_gpa: round_to(gpa_sum / total, 2),
        avg_attendance: (attendance_sum / total).round(),
        gpa_change,
        attendance_change,
        risk_distribution: RiskDistribution::from_counts(&counts, records.len()),
        monthly_trends,
        student: None,
        raw_dashboard: records.to_vec(),
    })
}

/// Aggregates a full dashboard response, keeping the student profile.
pub fn transform_response(
    response: StudentDashboardResponse,
) -> Result<DashboardAnalytics, ClientError> {
    let mut analytics = transform(&response.dashboard)?;
    analytics.student = response.student;
    Ok(analytics)
}

/// Reads semester records from a CSV export with camelCase headers.
pub fn records_from_csv(csv_path: &Path) -> anyhow::Result<Vec<SemesterRecord>> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut records = Vec::new();

    for result in reader.deserialize::<SemesterRecord>() {
        records.push(result?);
    }

    Ok(records)
}
