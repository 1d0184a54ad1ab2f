//! The `whatif validate` command.

use std::path::PathBuf;

use anyhow::Result;

use whatif_core::parser::{parse_attempt_file, parse_scoring_file, validate_attempt};
use whatif_core::Stage;

pub fn execute(
    scoring_file: PathBuf,
    attempt_file: PathBuf,
    student_id: Option<String>,
) -> Result<()> {
    let maps = parse_scoring_file(&scoring_file)?;
    maps.validate()?;
    println!("Scoring table: {} subject(s)", maps.subjects().count());

    let attempt = parse_attempt_file(&attempt_file, student_id.as_deref())?;
    if let Some(id) = &attempt.student_id {
        println!("Attempt for student {id}");
    }
    for (subject, section) in &attempt.sections {
        println!(
            "  {subject}: {} stage1 / {} stage2 items, tier {}",
            section.items(Stage::One).len(),
            section.items(Stage::Two).len(),
            section.tier()
        );
    }

    let warnings = validate_attempt(&attempt, Some(&maps));
    for w in &warnings {
        let prefix = w
            .subject
            .as_ref()
            .map(|s| format!("  [{s}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All inputs valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
