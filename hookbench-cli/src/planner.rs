//! Test Planner
//!
//! Builds the execution plan by filtering and ordering registered test cases.
//!
//! Filtering: regex match on the qualified test name (`Suite.name`).
//!
//! Ordering: by source file, then line, then name, which is declaration order
//! within a file and deterministic across files.

use hookbench_core::TestDef;
use regex::Regex;

/// Execution plan for test cases
pub struct ExecutionPlan {
    /// Ordered list of tests to run
    pub cases: Vec<&'static TestDef>,
}

impl ExecutionPlan {
    /// Number of planned tests carrying a benchmark marker
    pub fn benchmarked(&self) -> usize {
        self.cases.iter().filter(|def| def.bench.is_some()).count()
    }
}

/// Build execution plan from registered tests
pub fn build_plan(
    cases: impl IntoIterator<Item = &'static TestDef>,
    filter: Option<&Regex>,
) -> ExecutionPlan {
    let mut selected: Vec<_> = cases
        .into_iter()
        .filter(|def| filter.is_none_or(|re| re.is_match(&def.qualified_name())))
        .collect();

    selected.sort_by(|a, b| {
        a.file
            .cmp(b.file)
            .then(a.line.cmp(&b.line))
            .then(a.name.cmp(b.name))
    });

    ExecutionPlan { cases: selected }
}
