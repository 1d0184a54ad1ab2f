//! Summary as a JSON document.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use whatif_core::Summary;

/// A summary stamped with its generation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: Summary,
}

impl SummaryDocument {
    pub fn new(summary: Summary) -> Self {
        Self {
            generated_at: Utc::now(),
            summary,
        }
    }
}

/// Render a summary document as pretty-printed JSON.
pub fn summary_to_json_string(doc: &SummaryDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Write the summary to a JSON file, creating parent directories.
pub fn write_summary_json(summary: &Summary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = summary_to_json_string(&SummaryDocument::new(summary.clone()))?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use whatif_core::report::{SectionSummary, SUMMARY_NOTES};
    use whatif_core::Tier;

    fn summary() -> Summary {
        let mut by_section = BTreeMap::new();
        by_section.insert(
            "Math".to_string(),
            SectionSummary {
                raw: 1,
                scaled: 260,
                stage2_tier: Tier::Easy,
            },
        );
        Summary {
            student_id: Some("s-42".into()),
            practice_set_id: None,
            title: Some("Practice 1".into()),
            current_total_scaled: 260,
            current_by_section: by_section,
            top: vec![],
            threshold_used: 0.5,
            notes: SUMMARY_NOTES.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn document_fields() {
        let json = summary_to_json_string(&SummaryDocument::new(summary())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["generated_at"].is_string());
        assert_eq!(value["current_total_scaled"], 260);
        assert_eq!(value["current_by_section"]["Math"]["stage2_tier"], "easy");
        assert_eq!(value["threshold_used"], 0.5);
        assert_eq!(value["notes"].as_array().unwrap().len(), 2);
        assert!(value["practice_set_id"].is_null());
    }

    #[test]
    fn write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/run_summary.json");
        write_summary_json(&summary(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let doc: SummaryDocument = serde_json::from_str(&content).unwrap();
        assert_eq!(doc.summary, summary());
        assert!(content.contains("\n  \"current_total_scaled\""));
    }
}
