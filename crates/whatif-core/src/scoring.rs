//! Raw → scaled score lookup tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, InputError};
use crate::model::Tier;

/// Scaled scores for one raw score, one per adaptive tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaledPair {
    pub easy: i64,
    pub hard: i64,
}

impl ScaledPair {
    pub fn get(&self, tier: Tier) -> i64 {
        match tier {
            Tier::Easy => self.easy,
            Tier::Hard => self.hard,
        }
    }
}

/// One subject's scoring table.
///
/// The domain need not be contiguous. Lookups below the minimum key use the
/// minimum row, lookups above the maximum use the maximum row, and a raw score
/// falling in a gap uses the nearest lower row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoringMap {
    subject: String,
    rows: BTreeMap<u32, ScaledPair>,
}

impl ScoringMap {
    /// Build a table from `(raw, pair)` rows. Empty tables and repeated raw
    /// scores are configuration errors.
    pub fn from_rows(
        subject: &str,
        rows: impl IntoIterator<Item = (u32, ScaledPair)>,
    ) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for (raw, pair) in rows {
            if map.insert(raw, pair).is_some() {
                return Err(ConfigError::DuplicateRawScore {
                    subject: subject.to_string(),
                    raw,
                });
            }
        }
        if map.is_empty() {
            return Err(ConfigError::EmptyScoringMap {
                subject: subject.to_string(),
            });
        }
        Ok(Self {
            subject: subject.to_string(),
            rows: map,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Scaled score for `raw` under `tier`, with clamping.
    pub fn scaled(&self, raw: i64, tier: Tier) -> Result<i64, ConfigError> {
        let empty = || ConfigError::EmptyScoringMap {
            subject: self.subject.clone(),
        };
        let (min, max) = self.bounds().ok_or_else(empty)?;

        let key = u32::try_from(raw.max(0)).unwrap_or(u32::MAX).clamp(min, max);
        let (_, pair) = self.rows.range(..=key).next_back().ok_or_else(empty)?;
        Ok(pair.get(tier))
    }

    /// Smallest and largest raw score in the domain.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        Some((*self.rows.keys().next()?, *self.rows.keys().next_back()?))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether scaled scores never decrease as raw increases, for both tiers.
    ///
    /// The engine assumes this when interpreting impacts but does not enforce it.
    pub fn is_monotone(&self) -> bool {
        self.rows
            .values()
            .zip(self.rows.values().skip(1))
            .all(|(a, b)| a.easy <= b.easy && a.hard <= b.hard)
    }
}

/// Scoring tables keyed by subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoringMaps {
    maps: BTreeMap<String, ScoringMap>,
}

impl ScoringMaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, subject: impl Into<String>, map: ScoringMap) {
        self.maps.insert(subject.into(), map);
    }

    pub fn get(&self, subject: &str) -> Result<&ScoringMap, InputError> {
        self.maps
            .get(subject)
            .ok_or_else(|| InputError::MissingScoringMap(subject.to_string()))
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.maps.contains_key(subject)
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Re-check every table is non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.maps.iter().find(|(_, map)| map.is_empty()) {
            Some((subject, _)) => Err(ConfigError::EmptyScoringMap {
                subject: subject.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl FromIterator<(String, ScoringMap)> for ScoringMaps {
    fn from_iter<I: IntoIterator<Item = (String, ScoringMap)>>(iter: I) -> Self {
        Self {
            maps: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// raw 0 → 200/220, raw 1 → 260/280, raw 2 → 320/340.
    pub fn small_map() -> ScoringMap {
        ScoringMap::from_rows(
            "Math",
            [
                (0, ScaledPair { easy: 200, hard: 220 }),
                (1, ScaledPair { easy: 260, hard: 280 }),
                (2, ScaledPair { easy: 320, hard: 340 }),
            ],
        )
        .unwrap()
    }

    /// A linear table over `0..=max_raw`.
    pub fn linear_map(subject: &str, max_raw: u32) -> ScoringMap {
        ScoringMap::from_rows(
            subject,
            (0..=max_raw).map(|raw| {
                let base = 200 + 10 * raw as i64;
                (raw, ScaledPair { easy: base, hard: base + 20 })
            }),
        )
        .unwrap()
    }
}
