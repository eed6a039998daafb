//! JSON Output

use chrono::{DateTime, Utc};
use hookbench_core::{BenchmarkResult, RunStatus};
use hookbench_stats::Summary;
use serde::Serialize;

/// Schema identifier written into every report
pub const SCHEMA: &str = "hookbench-summary";

/// Schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Machine-readable benchmark summary of one session
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Report metadata
    pub meta: JsonMeta,
    /// One entry per benchmarked test, in execution order
    pub results: Vec<JsonResult>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct JsonMeta {
    /// Schema identifier
    pub schema: &'static str,
    /// Schema version
    pub schema_version: u32,
    /// hookbench version that produced the report
    pub version: &'static str,
    /// Generation time
    pub timestamp: DateTime<Utc>,
}

/// One benchmarked test
#[derive(Debug, Clone, Serialize)]
pub struct JsonResult {
    /// Qualified test name
    pub name: String,
    /// Source file as displayed in the table
    pub file: String,
    /// Instrumented target path
    pub target: String,
    /// Requested iterations
    pub iterations: u64,
    /// How far the iterations got
    pub status: RunStatus,
    /// Statistics in seconds; absent values are `null`
    pub summary: Summary,
    /// Raw samples in seconds
    pub samples: Vec<f64>,
}

impl JsonReport {
    /// Build a report stamped with the current time
    pub fn new(results: &[BenchmarkResult]) -> Self {
        Self::at(results, Utc::now())
    }

    /// Build a report with an explicit timestamp
    pub fn at(results: &[BenchmarkResult], timestamp: DateTime<Utc>) -> Self {
        Self {
            meta: JsonMeta {
                schema: SCHEMA,
                schema_version: SCHEMA_VERSION,
                version: env!("CARGO_PKG_VERSION"),
                timestamp,
            },
            results: results.iter().map(JsonResult::from).collect(),
        }
    }
}

impl From<&BenchmarkResult> for JsonResult {
    fn from(result: &BenchmarkResult) -> Self {
        Self {
            name: result.identity().qualified_name(),
            file: result.identity().display_file(),
            target: result.target().to_string(),
            iterations: result.iterations(),
            status: result.status(),
            summary: result.summary(),
            samples: result.store().samples().to_vec(),
        }
    }
}

/// Generate a prettified JSON report.
pub fn generate_json_report(results: &[BenchmarkResult]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport::new(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hookbench_core::TestIdentity;
    use hookbench_stats::SampleStore;
    use serde_json::{Value, json};

    fn results() -> Vec<BenchmarkResult> {
        vec![
            BenchmarkResult::new(
                TestIdentity::new("test_add", "tests/calc.rs"),
                "calc.add",
                2,
                RunStatus::Completed,
                [0.001, 0.003].into_iter().collect::<SampleStore>(),
            ),
            BenchmarkResult::new(
                TestIdentity::new("test_flaky", "tests/calc.rs"),
                "calc.add",
                5,
                RunStatus::Failed { iteration: 1 },
                SampleStore::new(),
            ),
        ]
    }

    #[test]
    fn test_report_shape() {
        let timestamp = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let report = JsonReport::at(&results(), timestamp);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["meta"]["schema"], json!(SCHEMA));
        assert_eq!(value["meta"]["timestamp"], json!("2026-01-02T03:04:05Z"));
        assert_eq!(value["results"][0]["name"], json!("test_add"));
        assert_eq!(value["results"][0]["summary"]["count"], json!(2));
        assert_eq!(value["results"][0]["summary"]["median"], json!(0.003));
        assert_eq!(value["results"][0]["status"]["state"], json!("completed"));
    }

    #[test]
    fn test_absent_statistics_are_null() {
        let report = JsonReport::new(&results());
        let value = serde_json::to_value(&report).unwrap();
        let failed = &value["results"][1];

        assert_eq!(failed["status"], json!({"state": "failed", "iteration": 1}));
        assert_eq!(failed["summary"]["mean"], Value::Null);
        assert_eq!(failed["samples"], json!([]));
    }

    #[test]
    fn test_generate_is_valid_json() {
        let text = generate_json_report(&results()).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["results"].as_array().unwrap().len(), 2);
    }
}
