use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::models::{RiskCounts, RiskDistribution};

/// Backend-assigned dropout risk, closed over the three levels the UI knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Safe,
    Warning,
    AtRisk,
}

/// A risk label that matched none of the known levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("unrecognized risk label '{label}'")]
pub struct UnknownRiskLabel {
    pub student_id: Option<String>,
    pub label: String,
}

impl UnknownRiskLabel {
    pub fn new(label: &str) -> Self {
        Self {
            student_id: None,
            label: label.to_string(),
        }
    }

    pub fn for_student(mut self, student_id: &str) -> Self {
        self.student_id = Some(student_id.to_string());
        self
    }
}

impl FromStr for RiskLevel {
    type Err = UnknownRiskLabel;

    /// Strict parse of the canonical labels the backend emits.
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label.trim().to_lowercase().as_str() {
            "safe" | "low" | "low risk" => Ok(RiskLevel::Safe),
            "warning" | "medium" | "medium risk" => Ok(RiskLevel::Warning),
            "at risk" | "at-risk" | "atrisk" | "high" | "high risk" => Ok(RiskLevel::AtRisk),
            _ => Err(UnknownRiskLabel::new(label)),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Safe => "Safe",
            RiskLevel::Warning => "Warning",
            RiskLevel::AtRisk => "At Risk",
        };
        f.write_str(label)
    }
}

impl RiskLevel {
    /// Semester labels: "safe" and "warning" are recognised anywhere in the
    /// text, everything else counts as at risk.
    pub fn from_semester_status(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("safe") {
            RiskLevel::Safe
        } else if label.contains("warning") {
            RiskLevel::Warning
        } else {
            RiskLevel::AtRisk
        }
    }

    /// Roster labels: canonical values first, then legacy substring matching.
    /// Note that "No Risk" still lands in the at-risk bucket through "risk".
    pub fn from_roster_status(label: &str) -> Result<Self, UnknownRiskLabel> {
        if let Ok(level) = label.parse() {
            return Ok(level);
        }

        let lowered = label.to_lowercase();
        if lowered.contains("low") || lowered.contains("safe") {
            Ok(RiskLevel::Safe)
        } else if lowered.contains("medium") || lowered.contains("warning") {
            Ok(RiskLevel::Warning)
        } else if lowered.contains("high") || lowered.contains("risk") {
            Ok(RiskLevel::AtRisk)
        } else {
            Err(UnknownRiskLabel::new(label))
        }
    }

    /// Coarse severity used by the trend chart.
    pub fn trend_score(self) -> u8 {
        match self {
            RiskLevel::Safe => 10,
            RiskLevel::Warning => 50,
            RiskLevel::AtRisk => 90,
        }
    }

    pub fn severity_rank(self) -> u8 {
        match self {
            RiskLevel::Safe => 0,
            RiskLevel::Warning => 1,
            RiskLevel::AtRisk => 2,
        }
    }
}

impl RiskCounts {
    pub fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Safe => self.safe += 1,
            RiskLevel::Warning => self.warning += 1,
            RiskLevel::AtRisk => self.at_risk += 1,
        }
    }

    pub fn classified(&self) -> usize {
        self.safe + self.warning + self.at_risk
    }
}

impl RiskDistribution {
    /// Each bucket as a percentage of `total`, rounded to one decimal.
    /// Buckets are not renormalised, so the sum can drift from 100.
    pub fn from_counts(counts: &RiskCounts, total: usize) -> Self {
        if total == 0 {
            return Self::default();
        }

        let percent = |count: usize| round_to(count as f64 / total as f64 * 100.0, 1);
        Self {
            low: percent(counts.safe),
            medium: percent(counts.warning),
            high: percent(counts.at_risk),
        }
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `(latest - previous) / previous * 100` to one decimal, or 0 when the
/// previous value is missing or zero.
pub fn percent_change(previous: Option<f64>, latest: Option<f64>) -> f64 {
    let previous = previous.unwrap_or(0.0);
    if previous == 0.0 {
        return 0.0;
    }

    let latest = latest.unwrap_or(0.0);
    round_to((latest - previous) / previous * 100.0, 1)
}
