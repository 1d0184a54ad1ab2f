//! Impact report and summary types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::TotalScore;
use crate::model::{Attempt, Tier};

/// Fixed explanatory notes carried in every summary.
pub const SUMMARY_NOTES: [&str; 2] = [
    "Stage 1 corrections can also upgrade Stage 2 from easy to hard if the threshold is crossed.",
    "Impacts include both the raw-to-scaled change and any adaptive tier upgrade.",
];

/// One row of the impact report: a single incorrect question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactRow {
    pub subject: String,
    /// 1 or 2.
    pub stage: u8,
    /// The section's tier label, or `threshold_based` when unlabeled.
    pub stage2_tier_current: String,
    pub question_id: String,
    pub unit: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub time_spent: u32,
    pub impact_total_scaled: i64,
    pub impact_section_scaled: i64,
    pub raw_before: u32,
    pub raw_after: u32,
    pub scaled_before: i64,
    pub scaled_after: i64,
    /// Whether the correction moved the section from easy to hard.
    pub tier_upgraded: bool,
}

/// Current score of one section as reported in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub raw: u32,
    pub scaled: i64,
    pub stage2_tier: Tier,
}

/// Headline results of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub student_id: Option<String>,
    pub practice_set_id: Option<String>,
    pub title: Option<String>,
    pub current_total_scaled: i64,
    pub current_by_section: BTreeMap<String, SectionSummary>,
    /// The highest-impact rows of the ranked report.
    pub top: Vec<ImpactRow>,
    pub threshold_used: f64,
    pub notes: Vec<String>,
}

impl Summary {
    /// Build the summary from a ranked report.
    pub fn new(
        attempt: &Attempt,
        current: &TotalScore,
        ranked: &[ImpactRow],
        threshold: f64,
        top_n: usize,
    ) -> Self {
        let current_by_section = current
            .by_section
            .iter()
            .map(|(subject, s)| {
                (
                    subject.clone(),
                    SectionSummary {
                        raw: s.raw,
                        scaled: s.scaled,
                        stage2_tier: s.tier,
                    },
                )
            })
            .collect();

        Self {
            student_id: attempt.student_id.clone(),
            practice_set_id: attempt.practice_set_id.clone(),
            title: attempt.title.clone(),
            current_total_scaled: current.total_scaled,
            current_by_section,
            top: ranked.iter().take(top_n).cloned().collect(),
            threshold_used: threshold,
            notes: SUMMARY_NOTES.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// Full output of [`WhatIfEngine::analyze`](crate::engine::WhatIfEngine::analyze).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub current: TotalScore,
    /// Impact rows, ranked.
    pub rows: Vec<ImpactRow>,
    pub summary: Summary,
}

impl Analysis {
    /// Largest total impact in the report, if any question was incorrect.
    pub fn max_impact(&self) -> Option<i64> {
        self.rows.first().map(|r| r.impact_total_scaled)
    }

    /// Rows whose correction would have upgraded the section's tier.
    pub fn upgrades(&self) -> impl Iterator<Item = &ImpactRow> {
        self.rows.iter().filter(|r| r.tier_upgraded)
    }
}
