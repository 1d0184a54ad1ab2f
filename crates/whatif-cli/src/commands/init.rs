//! The `whatif init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("whatif.toml").exists() {
        println!("whatif.toml already exists, skipping.");
    } else {
        std::fs::write("whatif.toml", SAMPLE_CONFIG)?;
        println!("Created whatif.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: whatif validate --scoring-file scoring.json --attempt-file attempt.json");
    println!("  2. Run: whatif analyze --scoring-file scoring.json --attempt-file attempt.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# whatif configuration

# Stage-1 accuracy at or above which an unlabeled section routes to the hard tier.
adaptive_threshold = 0.5

# Writes <prefix>_impacts.csv and <prefix>_summary.json.
output_prefix = "outputs/run"

# Rows of the ranked report carried into the summary.
top_n = 5

formats = ["csv", "json"]
"#;
