//! Counterfactual simulator.
//!
//! A hypothetical correction is layered over the borrowed attempt as an
//! [`Overlay`] instead of editing a deep copy: the overlay names the corrected
//! item and, when a stage-1 correction crosses the threshold, the upgraded
//! tier. The original attempt is never mutated, and simulations share no
//! state, so they may run in any order.

use crate::engine::{TotalScore, WhatIfEngine};
use crate::error::{InputError, WhatIfError};
use crate::model::{accuracy, Attempt, SectionAttempt, Stage, Tier};

/// A single hypothetical correction within one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correction {
    pub stage: Stage,
    pub index: usize,
}

/// Changes layered over one section while it is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Overlay {
    pub(crate) correction: Option<Correction>,
    pub(crate) tier: Option<Tier>,
}

impl Overlay {
    /// Points gained from the correction, optionally restricted to one stage.
    /// Correcting an already-correct item gains nothing.
    pub(crate) fn gained(&self, section: &SectionAttempt, stage: Option<Stage>) -> usize {
        let Some(c) = self.correction else {
            return 0;
        };
        if stage.is_some_and(|s| s != c.stage) {
            return 0;
        }
        match section.items(c.stage).get(c.index) {
            Some(q) if !q.correct => 1,
            _ => 0,
        }
    }
}

/// Outcome of one simulated correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterfactual {
    pub total: TotalScore,
    /// Whether the correction moved the section from easy to hard.
    pub tier_upgraded: bool,
}

impl WhatIfEngine {
    /// Total score had the given question been answered correctly.
    ///
    /// An already-correct target returns the current total unchanged.
    pub fn flip_question(
        &self,
        attempt: &Attempt,
        subject: &str,
        stage: Stage,
        index: usize,
    ) -> Result<TotalScore, WhatIfError> {
        Ok(self.simulate(attempt, subject, stage, index)?.total)
    }

    /// Like [`flip_question`](Self::flip_question), also reporting whether the
    /// section's tier was upgraded.
    pub fn simulate(
        &self,
        attempt: &Attempt,
        subject: &str,
        stage: Stage,
        index: usize,
    ) -> Result<Counterfactual, WhatIfError> {
        attempt.validate()?;
        let section = attempt.section(subject)?;
        let items = section.items(stage);
        let question = items.get(index).ok_or_else(|| InputError::IndexOutOfRange {
            subject: subject.to_string(),
            stage,
            index,
            len: items.len(),
        })?;

        if question.correct {
            return Ok(Counterfactual {
                total: self.total_with(attempt, None)?,
                tier_upgraded: false,
            });
        }

        let mut overlay = Overlay {
            correction: Some(Correction { stage, index }),
            tier: None,
        };

        // Only stage-1 corrections can move the tier, and only easy → hard.
        if stage == Stage::One {
            let before = self.effective_tier(section);
            let after = accuracy(section.correct_in(Stage::One) + 1, items.len());
            if before == Tier::Easy && after >= self.threshold() {
                overlay.tier = Some(Tier::Hard);
            }
        }

        tracing::trace!(subject, %stage, index, upgrade = overlay.tier.is_some(), "simulating correction");

        Ok(Counterfactual {
            total: self.total_with(attempt, Some((subject, overlay)))?,
            tier_upgraded: overlay.tier.is_some(),
        })
    }
}
