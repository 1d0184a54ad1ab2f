//! End-to-end pipeline tests over the sample inputs.
//!
//! Parse → analyze → write, checking the ranked report against direct
//! counterfactual scoring.

use std::collections::HashSet;
use std::path::Path;

use whatif_core::parser::{parse_attempt_file, parse_attempt_str, parse_scoring_file, parse_scoring_str};
use whatif_core::{Attempt, Stage, Tier, WhatIfEngine};
use whatif_report::csv::impacts_to_csv_string;
use whatif_report::json::write_summary_json;
use whatif_report::output_paths;

fn load(threshold: f64) -> (WhatIfEngine, Attempt) {
    let maps = parse_scoring_file(Path::new("../../data/scoring.json")).unwrap();
    let attempt = parse_attempt_file(Path::new("../../data/attempt.json"), None).unwrap();
    (WhatIfEngine::new(maps, threshold).unwrap(), attempt)
}

#[test]
fn current_score_of_sample() {
    let (engine, attempt) = load(0.5);
    let total = engine.total_score(&attempt).unwrap();

    let math = total.section("Math").unwrap();
    assert_eq!((math.raw, math.scaled, math.tier), (6, 320, Tier::Easy));
    let rw = total.section("Reading and Writing").unwrap();
    assert_eq!((rw.raw, rw.scaled, rw.tier), (9, 475, Tier::Hard));
    assert_eq!(total.total_scaled, 795);
}

#[test]
fn every_incorrect_question_is_ranked_once() {
    let (engine, attempt) = load(0.5);
    let analysis = engine.analyze(&attempt).unwrap();

    let expected: HashSet<(String, String)> = attempt
        .sections
        .values()
        .flat_map(|s| {
            [Stage::One, Stage::Two]
                .into_iter()
                .flat_map(move |stage| s.items(stage).iter())
                .filter(|q| !q.correct)
                .map(|q| (q.subject.clone(), q.id.clone()))
        })
        .collect();
    let seen: HashSet<(String, String)> = analysis
        .rows
        .iter()
        .map(|r| (r.subject.clone(), r.question_id.clone()))
        .collect();

    assert_eq!(analysis.rows.len(), 9);
    assert_eq!(seen, expected);
}

#[test]
fn impacts_match_direct_flips() {
    let (engine, attempt) = load(0.5);
    let analysis = engine.analyze(&attempt).unwrap();

    for row in &analysis.rows {
        let section = attempt.section(&row.subject).unwrap();
        let stage = if row.stage == 1 { Stage::One } else { Stage::Two };
        let index = section
            .items(stage)
            .iter()
            .position(|q| q.id == row.question_id)
            .unwrap();
        let flipped = engine
            .flip_question(&attempt, &row.subject, stage, index)
            .unwrap();
        assert_eq!(
            flipped.total_scaled - analysis.current.total_scaled,
            row.impact_total_scaled,
            "{}",
            row.question_id
        );
        assert!(row.impact_total_scaled >= 0);
        assert_eq!(row.raw_after, row.raw_before + 1);
    }
}

#[test]
fn stage_one_flip_upgrades_math() {
    let (engine, attempt) = load(0.5);
    let analysis = engine.analyze(&attempt).unwrap();

    let top = &analysis.rows[0];
    assert_eq!(top.question_id, "M1-02");
    assert_eq!(top.impact_total_scaled, 115);
    assert_eq!((top.scaled_before, top.scaled_after), (320, 435));
    assert!(top.tier_upgraded);

    // Labeled hard sections never change tier.
    assert!(analysis
        .rows
        .iter()
        .filter(|r| r.subject == "Reading and Writing")
        .all(|r| !r.tier_upgraded && r.impact_total_scaled == 25));
}

#[test]
fn ranking_is_ordered_and_repeatable() {
    let (engine, attempt) = load(0.5);
    let first = engine.analyze(&attempt).unwrap();
    let second = engine.analyze(&attempt).unwrap();
    assert_eq!(first, second);

    for pair in first.rows.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.impact_total_scaled > b.impact_total_scaled
                || (a.impact_total_scaled == b.impact_total_scaled
                    && (a.subject.as_str(), a.stage) <= (b.subject.as_str(), b.stage))
        );
    }

    let ids: Vec<&str> = first.summary.top.iter().map(|r| r.question_id.as_str()).collect();
    assert_eq!(ids, ["M1-02", "M1-03", "M1-05", "M1-06", "RW1-04"]);
}

#[test]
fn original_attempt_is_untouched() {
    let (engine, attempt) = load(0.5);
    let snapshot = attempt.clone();
    engine.analyze(&attempt).unwrap();
    assert_eq!(attempt, snapshot);
}

#[test]
fn worked_example() {
    // Stage 1 at 1/2 correct with the threshold at 0.5: one stage-1 fix
    // reaches the threshold and the hard column.
    let maps = parse_scoring_str(
        r#"[{"key": "Math", "map": [
            {"raw": 0, "easy": 200, "hard": 220},
            {"raw": 1, "easy": 260, "hard": 280},
            {"raw": 2, "easy": 320, "hard": 340}
        ]}]"#,
    )
    .unwrap();
    let attempt = parse_attempt_str(
        r#"[
            {"subject": "Math", "section": "Static", "question_id": "q1", "correct": 0},
            {"subject": "Math", "section": "easy", "question_id": "q2", "correct": 1}
        ]"#,
        None,
    )
    .unwrap();
    let engine = WhatIfEngine::new(maps, 0.5).unwrap();

    assert_eq!(engine.total_score(&attempt).unwrap().total_scaled, 260);
    let flipped = engine.flip_question(&attempt, "Math", Stage::One, 0).unwrap();
    assert_eq!(flipped.total_scaled, 340);

    let analysis = engine.analyze(&attempt).unwrap();
    assert_eq!(analysis.rows.len(), 1);
    assert_eq!(analysis.rows[0].impact_total_scaled, 80);
}

#[test]
fn reports_written_from_analysis() {
    let (engine, attempt) = load(0.5);
    let analysis = engine.analyze(&attempt).unwrap();

    let csv = impacts_to_csv_string(&analysis.rows).unwrap();
    assert_eq!(csv.lines().count(), analysis.rows.len() + 1);

    let dir = tempfile::tempdir().unwrap();
    let paths = output_paths(&dir.path().join("run"));
    write_summary_json(&analysis.summary, &paths.summary_json).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.summary_json).unwrap()).unwrap();
    assert_eq!(json["title"], "Full-Length Practice Test 3");
    assert_eq!(json["notes"].as_array().unwrap().len(), 2);
}
