//! Score calculator.
//!
//! Derives each section's raw score, effective stage-2 tier and scaled score,
//! and sums sections into a total. Nothing is cached; every score is a pure
//! function of the attempt and the scoring tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AdaptiveThreshold;
use crate::error::{ConfigError, InputError, WhatIfError};
use crate::model::{accuracy, Attempt, SectionAttempt, Stage, Tier, TierState};
use crate::scoring::ScoringMaps;
use crate::simulate::Overlay;

/// Score for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScore {
    pub subject: String,
    pub raw: u32,
    pub scaled: i64,
    /// The tier the scaled score was looked up under.
    pub tier: Tier,
}

/// Score for a whole attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalScore {
    pub total_scaled: i64,
    pub by_section: BTreeMap<String, SectionScore>,
}

impl TotalScore {
    pub fn section(&self, subject: &str) -> Result<&SectionScore, InputError> {
        self.by_section
            .get(subject)
            .ok_or_else(|| InputError::UnknownSubject(subject.to_string()))
    }
}

/// The what-if engine: scoring tables plus the adaptive threshold.
///
/// Construction validates configuration, so an engine that exists is always
/// usable.
#[derive(Debug, Clone)]
pub struct WhatIfEngine {
    maps: ScoringMaps,
    threshold: AdaptiveThreshold,
    top_n: usize,
}

impl WhatIfEngine {
    /// Default number of report rows carried into the summary.
    pub const DEFAULT_TOP_N: usize = 5;

    pub fn new(maps: ScoringMaps, threshold: f64) -> Result<Self, ConfigError> {
        let threshold = AdaptiveThreshold::try_from(threshold)?;
        maps.validate()?;
        Ok(Self {
            maps,
            threshold,
            top_n: Self::DEFAULT_TOP_N,
        })
    }

    /// Override how many top rows the summary keeps.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold.value()
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn scoring_maps(&self) -> &ScoringMaps {
        &self.maps
    }

    /// Tier implied by a stage-1 accuracy under the threshold rule.
    pub fn tier_for_accuracy(&self, accuracy: f64) -> Tier {
        if accuracy >= self.threshold.value() {
            Tier::Hard
        } else {
            Tier::Easy
        }
    }

    /// Tier the threshold rule assigns from the section's stage-1 answers,
    /// ignoring any label.
    pub fn infer_tier(&self, section: &SectionAttempt) -> Tier {
        self.tier_for_accuracy(section.stage1_accuracy())
    }

    /// The tier in effect for an unmodified section: its label if it has one,
    /// otherwise the threshold rule.
    pub fn effective_tier(&self, section: &SectionAttempt) -> Tier {
        match section.tier() {
            TierState::Labeled(tier) => tier,
            TierState::ThresholdBased => self.infer_tier(section),
        }
    }

    pub fn section_score(&self, section: &SectionAttempt) -> Result<SectionScore, WhatIfError> {
        self.score_with(section, Overlay::default())
    }

    pub fn total_score(&self, attempt: &Attempt) -> Result<TotalScore, WhatIfError> {
        attempt.validate()?;
        self.total_with(attempt, None)
    }

    /// Score one section as seen through an overlay.
    pub(crate) fn score_with(
        &self,
        section: &SectionAttempt,
        overlay: Overlay,
    ) -> Result<SectionScore, WhatIfError> {
        let raw = section.correct_count() + overlay.gained(section, None);

        let tier = match (overlay.tier, section.tier()) {
            (Some(tier), _) => tier,
            (None, TierState::Labeled(tier)) => tier,
            (None, TierState::ThresholdBased) => {
                let correct = section.correct_in(Stage::One) + overlay.gained(section, Some(Stage::One));
                let total = section.items(Stage::One).len();
                self.tier_for_accuracy(accuracy(correct, total))
            }
        };

        let map = self.maps.get(section.subject())?;
        let raw = u32::try_from(raw).unwrap_or(u32::MAX);
        let scaled = map.scaled(i64::from(raw), tier)?;

        Ok(SectionScore {
            subject: section.subject().to_string(),
            raw,
            scaled,
            tier,
        })
    }

    /// Total over every section, applying `edit` to the named subject only.
    pub(crate) fn total_with(
        &self,
        attempt: &Attempt,
        edit: Option<(&str, Overlay)>,
    ) -> Result<TotalScore, WhatIfError> {
        let mut by_section = BTreeMap::new();
        for (subject, section) in &attempt.sections {
            let overlay = match edit {
                Some((target, overlay)) if target == subject => overlay,
                _ => Overlay::default(),
            };
            by_section.insert(subject.clone(), self.score_with(section, overlay)?);
        }

        let total_scaled = by_section.values().map(|s| s.scaled).sum();
        Ok(TotalScore {
            total_scaled,
            by_section,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::section;
    use crate::scoring::fixtures::{linear_map, small_map};

    fn engine() -> WhatIfEngine {
        let mut maps = ScoringMaps::new();
        maps.insert("Math", small_map());
        maps.insert("Reading", linear_map("Reading", 10));
        WhatIfEngine::new(maps, 0.5).unwrap()
    }

    #[test]
    fn rejects_bad_threshold() {
        let mut maps = ScoringMaps::new();
        maps.insert("Math", small_map());
        assert_eq!(
            WhatIfEngine::new(maps.clone(), 1.5).unwrap_err(),
            ConfigError::ThresholdOutOfRange(1.5)
        );
        assert!(WhatIfEngine::new(maps, -0.01).is_err());
    }

    #[test]
    fn explicit_label_beats_threshold() {
        let engine = engine();
        // Stage 1 perfect but labeled easy: label wins for the current score.
        let sec = section("Math", &[true], &[false], Some(Tier::Easy));
        assert_eq!(engine.infer_tier(&sec), Tier::Hard);
        let score = engine.section_score(&sec).unwrap();
        assert_eq!(score.tier, Tier::Easy);
        assert_eq!(score.raw, 1);
        assert_eq!(score.scaled, 260);
    }

    #[test]
    fn unlabeled_section_uses_threshold() {
        let engine = engine();
        let hard = section("Reading", &[true, false], &[true], None);
        assert_eq!(engine.effective_tier(&hard), Tier::Hard);
        assert_eq!(engine.section_score(&hard).unwrap().scaled, 240);

        let easy = section("Reading", &[true, false, false], &[], None);
        assert_eq!(engine.effective_tier(&easy), Tier::Easy);
        assert_eq!(engine.section_score(&easy).unwrap().scaled, 210);
    }

    #[test]
    fn empty_stage_one_infers_easy() {
        let engine = engine();
        let sec = section("Reading", &[], &[true, true], None);
        assert_eq!(engine.effective_tier(&sec), Tier::Easy);

        let mut maps = ScoringMaps::new();
        maps.insert("Reading", linear_map("Reading", 10));
        let zero = WhatIfEngine::new(maps, 0.0).unwrap();
        // A zero threshold admits zero accuracy.
        assert_eq!(zero.effective_tier(&sec), Tier::Hard);
    }

    #[test]
    fn total_sums_sections() {
        let engine = engine();
        let attempt = Attempt::new([
            section("Math", &[false], &[true], Some(Tier::Easy)),
            section("Reading", &[true, true], &[true, false], None),
        ])
        .unwrap();
        let total = engine.total_score(&attempt).unwrap();
        assert_eq!(total.section("Math").unwrap().scaled, 260);
        assert_eq!(total.section("Reading").unwrap().scaled, 250);
        assert_eq!(total.total_scaled, 510);
    }

    #[test]
    fn missing_scoring_map_is_input_error() {
        let engine = engine();
        let attempt = Attempt::new([section("Science", &[true], &[], None)]).unwrap();
        assert_eq!(
            engine.total_score(&attempt).unwrap_err(),
            WhatIfError::Input(InputError::MissingScoringMap("Science".into()))
        );
    }

    #[test]
    fn empty_attempt_rejected() {
        let engine = engine();
        let attempt = Attempt::new(Vec::<SectionAttempt>::new()).unwrap();
        assert_eq!(
            engine.total_score(&attempt).unwrap_err(),
            WhatIfError::Input(InputError::EmptyAttempt)
        );
    }
}
