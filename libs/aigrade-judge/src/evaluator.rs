/// Test Evaluator - Comparison Policy
///
/// **Core Responsibility:**
/// Turn one engine evaluation into a pass/fail verdict with a message.
///
/// **Critical Properties:**
/// - Knows nothing about how code runs
/// - Pure function: (test case, evaluation) → case result
///
/// **Normalization Rules:**
/// - Trim leading and trailing whitespace: YES
/// - Internal whitespace: preserved
/// - Case sensitivity: YES (exact match required)
/// - Numeric tolerance / structural comparison: NO
///
/// **Messages:**
/// - engine error `e` → `Error: e`
/// - match → `Passed`
/// - mismatch → `Expected '<expected>' but got '<actual>'` (untrimmed values)

use crate::engine::Evaluation;
use aigrade_common::types::{CaseResult, TestCase};

pub const PASSED: &str = "Passed";

/// Normalize output string for comparison
fn normalize_output(output: &str) -> &str {
    output.trim()
}

/// Judge a single evaluation against its test case
pub fn judge_case(test_case: &TestCase, evaluation: &Evaluation) -> CaseResult {
    let (pass, message) = match evaluation {
        Evaluation::Error(error) => (false, format!("Error: {}", error)),
        Evaluation::Output(output) => {
            if normalize_output(output) == normalize_output(&test_case.expected_output) {
                (true, PASSED.to_string())
            } else {
                (
                    false,
                    format!(
                        "Expected '{}' but got '{}'",
                        test_case.expected_output, output
                    ),
                )
            }
        }
    };

    CaseResult {
        id: test_case.id.clone(),
        pass,
        message,
    }
}
