//! Per-suite view of a history log

use crate::history::HistoryRecord;
use crate::report::time::parse_report_time;
use std::collections::BTreeMap;

/// One suite's figures in one history record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteTrendPoint {
    pub timestamp: String,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    /// Percentage with two decimals, `"0"` when the suite ran no tests.
    pub pass_rate: String,
    pub fail_rate: String,
    pub new_issues: Vec<String>,
    pub resolved_issues: Vec<String>,
}

impl SuiteTrendPoint {
    pub fn has_new_issues(&self) -> bool {
        !self.new_issues.is_empty()
    }

    pub fn has_resolved_issues(&self) -> bool {
        !self.resolved_issues.is_empty()
    }
}

fn rate(part: usize, total: usize) -> String {
    if total == 0 {
        "0".to_string()
    } else {
        format!("{:.2}", part as f64 / total as f64 * 100.0)
    }
}

/// Group a history log by suite, each suite's points oldest first.
///
/// Records are ordered by their capture time; records whose timestamp does
/// not parse keep their position relative to each other and sort first.
pub fn suite_trends(log: &[HistoryRecord]) -> BTreeMap<String, Vec<SuiteTrendPoint>> {
    let mut records: Vec<&HistoryRecord> = log.iter().collect();
    records.sort_by_key(|r| parse_report_time(&r.timestamp));

    let mut trends: BTreeMap<String, Vec<SuiteTrendPoint>> = BTreeMap::new();
    for record in records {
        for (name, suite) in &record.suites {
            let stats = &suite.stats;
            trends.entry(name.clone()).or_default().push(SuiteTrendPoint {
                timestamp: record.timestamp.clone(),
                total_tests: stats.total_tests,
                passed: stats.passed,
                failed: stats.failed,
                pass_rate: rate(stats.passed, stats.total_tests),
                fail_rate: rate(stats.failed, stats.total_tests),
                new_issues: suite.defect_comparison.new_defects.clone(),
                resolved_issues: suite.defect_comparison.resolved_defects.clone(),
            });
        }
    }
    trends
}
