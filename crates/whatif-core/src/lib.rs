//! whatif-core: Scoring tables, counterfactual simulation, and impact ranking.
//!
//! This crate defines the attempt data model, the raw → tier → scaled scoring
//! pipeline, and the what-if engine that estimates how much each incorrectly
//! answered question would have moved a test-taker's final score.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod ranking;
pub mod report;
pub mod scoring;
pub mod simulate;

pub use engine::{SectionScore, TotalScore, WhatIfEngine};
pub use error::{ConfigError, InputError, WhatIfError};
pub use model::{Attempt, Question, SectionAttempt, Stage, Tier, TierState};
pub use report::{Analysis, ImpactRow, Summary};
pub use scoring::{ScaledPair, ScoringMap, ScoringMaps};
