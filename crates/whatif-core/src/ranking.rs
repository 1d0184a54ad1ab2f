//! Impact ranker.
//!
//! Simulates a correction for every incorrect question, measures the scaled
//! delta against the current score, and orders the results deterministically.

use std::cmp::Ordering;

use crate::engine::WhatIfEngine;
use crate::error::WhatIfError;
use crate::model::{Attempt, Stage};
use crate::report::{Analysis, ImpactRow, Summary};

impl WhatIfEngine {
    /// Build the ranked impact report and summary for an attempt.
    pub fn analyze(&self, attempt: &Attempt) -> Result<Analysis, WhatIfError> {
        let current = self.total_score(attempt)?;
        let mut rows = Vec::new();

        for (subject, section) in &attempt.sections {
            let before = current.section(subject)?;

            for stage in [Stage::One, Stage::Two] {
                let incorrect = section
                    .items(stage)
                    .iter()
                    .enumerate()
                    .filter(|(_, q)| !q.correct);

                for (index, question) in incorrect {
                    let cf = self.simulate(attempt, subject, stage, index)?;
                    let after = cf.total.section(subject)?;

                    let row = ImpactRow {
                        subject: subject.clone(),
                        stage: stage.number(),
                        stage2_tier_current: section.tier().label().to_string(),
                        question_id: question.id.clone(),
                        unit: question.unit.clone(),
                        topic: question.topic.clone(),
                        difficulty: question.difficulty.clone(),
                        time_spent: question.time_spent,
                        impact_total_scaled: cf.total.total_scaled - current.total_scaled,
                        impact_section_scaled: after.scaled - before.scaled,
                        raw_before: before.raw,
                        raw_after: after.raw,
                        scaled_before: before.scaled,
                        scaled_after: after.scaled,
                        tier_upgraded: cf.tier_upgraded,
                    };
                    tracing::debug!(
                        subject = %row.subject,
                        stage = row.stage,
                        question = %row.question_id,
                        impact = row.impact_total_scaled,
                        "simulated correction"
                    );
                    rows.push(row);
                }
            }
        }

        rank(&mut rows);
        tracing::info!(
            "analyzed {} incorrect of {} questions, current total {}",
            rows.len(),
            attempt.item_count(),
            current.total_scaled
        );

        let summary = Summary::new(attempt, &current, &rows, self.threshold(), self.top_n());
        Ok(Analysis {
            current,
            rows,
            summary,
        })
    }
}

/// Order rows by descending total impact, then subject, then stage.
///
/// The sort is stable, so remaining ties keep their generation order.
pub fn rank(rows: &mut [ImpactRow]) {
    rows.sort_by(compare_rows);
}

fn compare_rows(a: &ImpactRow, b: &ImpactRow) -> Ordering {
    b.impact_total_scaled
        .cmp(&a.impact_total_scaled)
        .then_with(|| a.subject.cmp(&b.subject))
        .then_with(|| a.stage.cmp(&b.stage))
}
