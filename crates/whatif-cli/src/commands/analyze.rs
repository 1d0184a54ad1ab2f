//! The `whatif analyze` command.

use std::path::PathBuf;

use anyhow::Result;

use whatif_core::config::load_config_from;
use whatif_core::parser::{parse_attempt_file, parse_scoring_file};
use whatif_core::{Analysis, WhatIfEngine};
use whatif_report::csv::write_impacts_csv;
use whatif_report::json::write_summary_json;
use whatif_report::output_paths;

pub fn execute(
    scoring_file: PathBuf,
    attempt_file: PathBuf,
    threshold: Option<f64>,
    student_id: Option<String>,
    out: Option<PathBuf>,
    format: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let maps = parse_scoring_file(&scoring_file)?;
    let attempt = parse_attempt_file(&attempt_file, student_id.as_deref())?;

    let threshold = threshold.unwrap_or(config.adaptive_threshold);
    let engine = WhatIfEngine::new(maps, threshold)?.with_top_n(config.top_n);

    tracing::info!(
        sections = attempt.sections.len(),
        items = attempt.item_count(),
        threshold,
        "analyzing attempt"
    );
    let analysis = engine.analyze(&attempt)?;

    print_summary(&analysis);
    println!(
        "Current total scaled score: {} ({} incorrect questions analyzed)",
        analysis.current.total_scaled,
        analysis.rows.len()
    );

    let formats: Vec<String> = match format {
        Some(f) if f == "all" => vec!["csv".into(), "json".into()],
        Some(f) => f.split(',').map(|s| s.trim().to_string()).collect(),
        None => config.formats.clone(),
    };

    let paths = output_paths(&out.unwrap_or(config.output_prefix));
    for fmt in &formats {
        match fmt.as_str() {
            "csv" => {
                write_impacts_csv(&analysis.rows, &paths.impacts_csv)?;
                eprintln!("Impact report: {}", paths.impacts_csv.display());
            }
            "json" => {
                write_summary_json(&analysis.summary, &paths.summary_json)?;
                eprintln!("Summary: {}", paths.summary_json.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn print_summary(analysis: &Analysis) {
    use comfy_table::{Cell, Table};

    let mut sections = Table::new();
    sections.set_header(vec!["Section", "Raw", "Scaled", "Stage 2"]);
    for (subject, s) in &analysis.summary.current_by_section {
        sections.add_row(vec![
            Cell::new(subject),
            Cell::new(s.raw),
            Cell::new(s.scaled),
            Cell::new(s.stage2_tier),
        ]);
    }
    sections.add_row(vec![
        Cell::new("Total"),
        Cell::new(""),
        Cell::new(analysis.summary.current_total_scaled),
        Cell::new(""),
    ]);
    eprintln!("\n{sections}");

    if analysis.summary.top.is_empty() {
        eprintln!("No incorrect questions: nothing to gain.");
        return;
    }

    let mut top = Table::new();
    top.set_header(vec![
        "Subject", "Stage", "Question", "Topic", "Impact", "Raw", "Scaled", "Upgrade",
    ]);
    for row in &analysis.summary.top {
        top.add_row(vec![
            Cell::new(&row.subject),
            Cell::new(row.stage),
            Cell::new(&row.question_id),
            Cell::new(row.topic.as_deref().unwrap_or("-")),
            Cell::new(format!("+{}", row.impact_total_scaled)),
            Cell::new(format!("{} -> {}", row.raw_before, row.raw_after)),
            Cell::new(format!("{} -> {}", row.scaled_before, row.scaled_after)),
            Cell::new(if row.tier_upgraded { "easy -> hard" } else { "" }),
        ]);
    }
    eprintln!("\nTop {} questions by impact\n{top}", analysis.summary.top.len());
}
