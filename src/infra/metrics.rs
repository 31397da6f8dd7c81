// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one CSV row per trained characteristic:
//
//   characteristic,iterations,final_error,holdout_accuracy
//   intent,412,0.009874,0.916667
//   urgency,97,0.009512,
//
// holdout_accuracy is left empty when no hold-out calls were kept.
// Output file: <models_dir>/metrics.csv

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "characteristic,iterations,final_error,holdout_accuracy";

/// Outcome of training one recognizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerMetrics {
    pub characteristic:   String,

    /// RPROP iterations until the error fell under the threshold
    pub iterations:       usize,

    /// Mean squared error after the last iteration
    pub final_error:      f64,

    /// Share of hold-out calls predicted correctly, in [0.0, 1.0]
    pub holdout_accuracy: Option<f64>,
}

impl RecognizerMetrics {
    pub fn new(
        characteristic:   impl Into<String>,
        iterations:       usize,
        final_error:      f64,
        holdout_accuracy: Option<f64>,
    ) -> Self {
        Self { characteristic: characteristic.into(), iterations, final_error, holdout_accuracy }
    }

    fn csv_row(&self) -> String {
        // Commas would split the row; names are otherwise free-form.
        let name = self.characteristic.replace(',', " ");
        let accuracy = self
            .holdout_accuracy
            .map(|a| format!("{a:.6}"))
            .unwrap_or_default();
        format!("{},{},{:.6},{}", name, self.iterations, self.final_error, accuracy)
    }
}

/// Writes recognizer metrics to `metrics.csv`.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Starts a fresh CSV (header only) for a new training run.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        let mut f    = fs::File::create(&csv_path)?;
        writeln!(f, "{HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &RecognizerMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;
        writeln!(f, "{}", m.csv_row())?;

        tracing::debug!(
            "Logged metrics for '{}': iterations={}, error={:.4}",
            m.characteristic,
            m.iterations,
            m.final_error,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_header() {
        let tmp    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::create(tmp.path()).unwrap();

        logger.log(&RecognizerMetrics::new("intent", 412, 0.0098741, Some(0.75))).unwrap();
        logger.log(&RecognizerMetrics::new("urgency", 97, 0.0095, None)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec![
            HEADER,
            "intent,412,0.009874,0.750000",
            "urgency,97,0.009500,",
        ]);
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let tmp = tempfile::tempdir().unwrap();
        MetricsLogger::create(tmp.path())
            .unwrap()
            .log(&RecognizerMetrics::new("old", 1, 0.5, None))
            .unwrap();

        let logger = MetricsLogger::create(tmp.path()).unwrap();
        let csv    = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_commas_in_names_do_not_split_rows() {
        let m = RecognizerMetrics::new("a,b", 3, 0.01, None);
        assert_eq!(m.csv_row().split(',').count(), 4);
    }
}
