//! whatif-report: CSV and JSON output for what-if analyses.

pub mod csv;
pub mod json;

use std::path::{Path, PathBuf};

/// Output file locations derived from a run prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub impacts_csv: PathBuf,
    pub summary_json: PathBuf,
}

/// `<prefix>_impacts.csv` and `<prefix>_summary.json`.
pub fn output_paths(prefix: &Path) -> OutputPaths {
    let with_suffix = |suffix: &str| {
        let mut name = prefix.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    };
    OutputPaths {
        impacts_csv: with_suffix("_impacts.csv"),
        summary_json: with_suffix("_summary.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_from_prefix() {
        let paths = output_paths(Path::new("outputs/run"));
        assert_eq!(paths.impacts_csv, PathBuf::from("outputs/run_impacts.csv"));
        assert_eq!(paths.summary_json, PathBuf::from("outputs/run_summary.json"));
    }
}
