//! JSON input parsing.
//!
//! Turns a scoring-table export and a flat attempt-record export into
//! [`ScoringMaps`] and [`Attempt`], normalizing the loose field shapes seen in
//! real exports along the way.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::InputError;
use crate::model::{Attempt, Question, SectionAttempt, Stage, Tier};
use crate::scoring::{ScaledPair, ScoringMap, ScoringMaps};

/// One subject's entry in a scoring export.
#[derive(Debug, Deserialize)]
struct ScoringEntry {
    key: String,
    map: Vec<ScoringRow>,
}

#[derive(Debug, Deserialize)]
struct ScoringRow {
    raw: u32,
    easy: i64,
    hard: i64,
}

/// Parse a scoring export file.
pub fn parse_scoring_file(path: &Path) -> Result<ScoringMaps> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scoring file: {}", path.display()))?;
    parse_scoring_str(&content)
        .with_context(|| format!("invalid scoring file: {}", path.display()))
}

/// Parse a scoring export: `[{"key": subject, "map": [{"raw", "easy", "hard"}]}]`.
pub fn parse_scoring_str(content: &str) -> Result<ScoringMaps> {
    let entries: Vec<ScoringEntry> =
        serde_json::from_str(content).context("failed to parse scoring JSON")?;

    let mut maps = ScoringMaps::new();
    for entry in entries {
        if maps.contains(&entry.key) {
            anyhow::bail!("subject '{}' appears more than once", entry.key);
        }
        let rows = entry
            .map
            .iter()
            .map(|r| (r.raw, ScaledPair { easy: r.easy, hard: r.hard }));
        let map = ScoringMap::from_rows(&entry.key, rows)?;
        maps.insert(entry.key, map);
    }
    Ok(maps)
}

/// A string-or-number identifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Id {
    Text(String),
    Number(serde_json::Number),
}

impl Id {
    fn into_string(self) -> String {
        match self {
            Id::Text(s) => s,
            Id::Number(n) => n.to_string(),
        }
    }
}

/// A plain name or an object with a `name` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Named {
    Plain(String),
    Object { name: Option<String> },
}

impl Named {
    fn into_name(self) -> Option<String> {
        match self {
            Named::Plain(s) => Some(s),
            Named::Object { name } => name,
        }
    }
}

/// A 0/1 or boolean correctness flag.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(n) => n != 0,
        }
    }
}

/// One flat attempt record, as exported per answered question.
#[derive(Debug, Clone, Deserialize)]
pub struct AttemptRecord {
    #[serde(default)]
    student_id: Option<Id>,
    #[serde(default, rename = "practicesetId")]
    practice_set_id: Option<Id>,
    #[serde(default)]
    title: Option<String>,
    subject: Named,
    /// `Static` for stage 1; `easy`/`hard` (or anything else) for stage 2.
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    question_id: Option<Id>,
    #[serde(default)]
    correct: Option<Flag>,
    #[serde(default)]
    time_spent: Option<f64>,
    #[serde(default)]
    unit: Option<Named>,
    #[serde(default)]
    topic: Option<Named>,
    #[serde(default)]
    complexity: Option<String>,
    /// Misspelled alias of `complexity` found in some exports.
    #[serde(default)]
    compleixty: Option<String>,
}

impl AttemptRecord {
    fn student(&self) -> Option<String> {
        self.student_id.clone().map(Id::into_string)
    }

    fn stage_and_tier(&self) -> (Stage, Option<Tier>) {
        let marker = self.section.as_deref().unwrap_or("").trim();
        if marker.eq_ignore_ascii_case("static") {
            (Stage::One, None)
        } else {
            (Stage::Two, marker.parse().ok())
        }
    }
}

/// Parse an attempt export file, optionally keeping one student's records.
pub fn parse_attempt_file(path: &Path, student_id: Option<&str>) -> Result<Attempt> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read attempt file: {}", path.display()))?;
    parse_attempt_str(&content, student_id)
        .with_context(|| format!("invalid attempt file: {}", path.display()))
}

/// Parse a JSON array of attempt records.
pub fn parse_attempt_str(content: &str, student_id: Option<&str>) -> Result<Attempt> {
    let mut records: Vec<AttemptRecord> =
        serde_json::from_str(content).context("failed to parse attempt JSON")?;

    if let Some(wanted) = student_id {
        records.retain(|r| r.student().as_deref() == Some(wanted));
        if records.is_empty() {
            anyhow::bail!("no attempt records found for student_id={wanted}");
        }
    }

    Ok(attempt_from_records(records)?)
}

/// Group flat records into an [`Attempt`].
///
/// Records are grouped by subject and filed under stage 1 or stage 2 in input
/// order. Test-taker metadata comes from the first record.
pub fn attempt_from_records(records: Vec<AttemptRecord>) -> Result<Attempt, InputError> {
    let Some(first) = records.first() else {
        return Err(InputError::EmptyAttempt);
    };
    let student_id = first.student();
    let practice_set_id = first.practice_set_id.clone().map(Id::into_string);
    let title = first.title.clone();

    let mut grouped: BTreeMap<String, (Vec<Question>, Vec<Question>)> = BTreeMap::new();
    for record in records {
        let (stage, tier_label) = record.stage_and_tier();
        let subject = record.subject.into_name().unwrap_or_default();

        let question = Question {
            id: record.question_id.map(Id::into_string).unwrap_or_default(),
            stage,
            tier_label,
            correct: record.correct.is_some_and(Flag::is_set),
            time_spent: record.time_spent.map(|t| t.max(0.0) as u32).unwrap_or(0),
            subject: subject.clone(),
            unit: record.unit.and_then(Named::into_name),
            topic: record.topic.and_then(Named::into_name),
            difficulty: record.complexity.or(record.compleixty),
        };

        let (stage1, stage2) = grouped.entry(subject).or_default();
        match stage {
            Stage::One => stage1.push(question),
            Stage::Two => stage2.push(question),
        }
    }

    let sections = grouped
        .into_iter()
        .map(|(subject, (stage1, stage2))| SectionAttempt::new(subject, stage1, stage2))
        .collect::<Result<Vec<_>, _>>()?;

    let mut attempt = Attempt::new(sections)?;
    attempt.student_id = student_id;
    attempt.practice_set_id = practice_set_id;
    attempt.title = title;
    Ok(attempt)
}

/// A warning from attempt validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The section subject (if applicable).
    pub subject: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check an attempt for suspicious but scoreable data.
pub fn validate_attempt(attempt: &Attempt, maps: Option<&ScoringMaps>) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut warn = |subject: &str, message: String| {
        warnings.push(ValidationWarning {
            subject: Some(subject.to_string()),
            message,
        })
    };

    for (subject, section) in &attempt.sections {
        let mut seen = HashSet::new();
        for q in section.items(Stage::One).iter().chain(section.items(Stage::Two)) {
            if !seen.insert(q.id.as_str()) {
                warn(subject, format!("duplicate question ID: {}", q.id));
            }
        }

        if section.has_mixed_labels() {
            warn(
                subject,
                format!("stage2 items carry mixed tier labels, using '{}'", section.tier()),
            );
        }

        if section.items(Stage::One).is_empty() {
            warn(subject, "no stage1 items, tier will always infer easy".into());
        }

        if let Some(maps) = maps {
            match maps.get(subject) {
                Ok(map) if !map.is_monotone() => {
                    warn(subject, "scoring map is not monotone in raw score".into())
                }
                Ok(_) => {}
                Err(e) => warn(subject, e.to_string()),
            }
        }
    }

    warnings
}
