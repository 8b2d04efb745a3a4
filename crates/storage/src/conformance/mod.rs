//! Conformance test suite for `RepairStore` implementations.
//!
//! A backend-agnostic suite any `RepairStore` can run to verify it behaves
//! the way the dispatcher and the HTTP handlers expect:
//!
//! - **Identity**: identifiers start at 1, increase, and are never reused
//! - **Listing**: `list` returns every row in ascending identifier order
//! - **Patching**: `update` touches only the supplied fields
//! - **Absence**: missing records are `None` / `false`, never `Err`
//!
//! # Usage
//!
//! ```ignore
//! use repairdesk_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn memory_conformance() {
//!     let report = run_conformance_suite(|| async { MemoryStore::new() }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod absence;
mod lifecycle;

use std::fmt;
use std::future::Future;

use crate::record::NewRepair;
use crate::RepairStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "lifecycle", "absence").
    pub category: String,
    /// Test name (e.g. "create_assigns_sequential_ids").
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// storage instance, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: RepairStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(lifecycle::run_lifecycle_tests(&factory).await);
    results.extend(absence::run_absence_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

fn make_new_repair(customer: &str) -> NewRepair {
    NewRepair {
        customer_name: customer.to_string(),
        phone_model: "iPhone 15".to_string(),
        issue: "Screen broken".to_string(),
        status: "PENDING".to_string(),
        estimated_cost: None,
    }
}
