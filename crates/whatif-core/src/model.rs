//! Attempt data model.
//!
//! An [`Attempt`] holds one test-taker's responses grouped by section subject
//! and then by stage. Constructors enforce the structural invariants so that
//! the scoring and simulation code can rely on them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::InputError;

/// One of the two testing phases within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// The fixed first stage, taken by everyone.
    #[serde(rename = "stage1")]
    One,
    /// The adaptive second stage.
    #[serde(rename = "stage2")]
    Two,
}

impl Stage {
    /// 1 or 2, as reported in output tables.
    pub fn number(self) -> u8 {
        match self {
            Stage::One => 1,
            Stage::Two => 2,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::One => write!(f, "stage1"),
            Stage::Two => write!(f, "stage2"),
        }
    }
}

/// The difficulty track assigned to stage 2 of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Easy,
    Hard,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Easy => write!(f, "easy"),
            Tier::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Tier::Easy),
            "hard" => Ok(Tier::Hard),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

/// A section's resolved stage-2 tier.
///
/// `ThresholdBased` is not missing data: it means the tier is always derived
/// from stage-1 accuracy against the adaptive threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierState {
    Labeled(Tier),
    ThresholdBased,
}

impl TierState {
    pub fn label(self) -> &'static str {
        match self {
            TierState::Labeled(Tier::Easy) => "easy",
            TierState::Labeled(Tier::Hard) => "hard",
            TierState::ThresholdBased => "threshold_based",
        }
    }

    pub fn explicit(self) -> Option<Tier> {
        match self {
            TierState::Labeled(tier) => Some(tier),
            TierState::ThresholdBased => None,
        }
    }
}

impl fmt::Display for TierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TierState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One answered item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier.
    pub id: String,
    pub stage: Stage,
    /// Stage-2 tier label, when the export carries one.
    #[serde(default)]
    pub tier_label: Option<Tier>,
    pub correct: bool,
    /// Seconds spent on the item.
    #[serde(default)]
    pub time_spent: u32,
    pub subject: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    /// Raw difficulty label from the item bank.
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// One section's full response set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionAttempt {
    subject: String,
    stage1: Vec<Question>,
    stage2: Vec<Question>,
    tier: TierState,
}

impl SectionAttempt {
    /// Build a section, checking every question against it and resolving the
    /// stage-2 tier from the items' own labels.
    ///
    /// Disagreeing labels resolve to the majority; on a tie the label seen
    /// first in stage-2 order wins.
    pub fn new(
        subject: impl Into<String>,
        stage1: Vec<Question>,
        stage2: Vec<Question>,
    ) -> Result<Self, InputError> {
        let subject = subject.into();

        for (stage, items) in [(Stage::One, &stage1), (Stage::Two, &stage2)] {
            for q in items {
                if q.stage != stage {
                    return Err(InputError::StageMismatch {
                        question_id: q.id.clone(),
                        expected: stage,
                    });
                }
                if q.subject != subject {
                    return Err(InputError::SubjectMismatch {
                        key: subject.clone(),
                        subject: q.subject.clone(),
                    });
                }
                if stage == Stage::One && q.tier_label.is_some() {
                    return Err(InputError::TierLabelOnStageOne {
                        question_id: q.id.clone(),
                    });
                }
            }
        }

        let tier = resolve_tier(&stage2);
        Ok(Self {
            subject,
            stage1,
            stage2,
            tier,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn tier(&self) -> TierState {
        self.tier
    }

    pub fn items(&self, stage: Stage) -> &[Question] {
        match stage {
            Stage::One => &self.stage1,
            Stage::Two => &self.stage2,
        }
    }

    /// Correct answers in one stage.
    pub fn correct_in(&self, stage: Stage) -> usize {
        self.items(stage).iter().filter(|q| q.correct).count()
    }

    /// Correct answers across both stages (the raw score).
    pub fn correct_count(&self) -> usize {
        self.correct_in(Stage::One) + self.correct_in(Stage::Two)
    }

    /// Stage-1 accuracy; 0 when the stage has no items.
    pub fn stage1_accuracy(&self) -> f64 {
        accuracy(self.correct_in(Stage::One), self.stage1.len())
    }

    /// Whether stage-2 items carry more than one distinct tier label.
    pub fn has_mixed_labels(&self) -> bool {
        let mut labels = self.stage2.iter().filter_map(|q| q.tier_label);
        match labels.next() {
            Some(first) => labels.any(|t| t != first),
            None => false,
        }
    }
}

pub(crate) fn accuracy(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}

fn resolve_tier(stage2: &[Question]) -> TierState {
    let mut first = None;
    let (mut easy, mut hard) = (0usize, 0usize);
    for tier in stage2.iter().filter_map(|q| q.tier_label) {
        if first.is_none() {
            first = Some(tier);
        }
        match tier {
            Tier::Easy => easy += 1,
            Tier::Hard => hard += 1,
        }
    }

    match first {
        None => TierState::ThresholdBased,
        Some(_) if easy > hard => TierState::Labeled(Tier::Easy),
        Some(_) if hard > easy => TierState::Labeled(Tier::Hard),
        Some(tie) => TierState::Labeled(tie),
    }
}

/// One full test instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    /// Sections keyed by subject name.
    pub sections: BTreeMap<String, SectionAttempt>,
    pub student_id: Option<String>,
    pub practice_set_id: Option<String>,
    pub title: Option<String>,
}

impl Attempt {
    /// Key the given sections by subject. Subjects must be unique.
    pub fn new(sections: impl IntoIterator<Item = SectionAttempt>) -> Result<Self, InputError> {
        let mut map = BTreeMap::new();
        for section in sections {
            let subject = section.subject().to_string();
            if map.insert(subject.clone(), section).is_some() {
                return Err(InputError::DuplicateSubject(subject));
            }
        }
        Ok(Self {
            sections: map,
            student_id: None,
            practice_set_id: None,
            title: None,
        })
    }

    pub fn with_student_id(mut self, id: impl Into<String>) -> Self {
        self.student_id = Some(id.into());
        self
    }

    pub fn with_practice_set_id(mut self, id: impl Into<String>) -> Self {
        self.practice_set_id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Check the attempt is non-empty and every key matches its section.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.sections.is_empty() {
            return Err(InputError::EmptyAttempt);
        }
        for (key, section) in &self.sections {
            if key != section.subject() {
                return Err(InputError::SubjectMismatch {
                    key: key.clone(),
                    subject: section.subject().to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn section(&self, subject: &str) -> Result<&SectionAttempt, InputError> {
        self.sections
            .get(subject)
            .ok_or_else(|| InputError::UnknownSubject(subject.to_string()))
    }

    /// Total number of answered items across all sections.
    pub fn item_count(&self) -> usize {
        self.sections
            .values()
            .map(|s| s.items(Stage::One).len() + s.items(Stage::Two).len())
            .sum()
    }
}
