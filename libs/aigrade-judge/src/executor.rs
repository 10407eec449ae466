/// Test Runner - High-Level Orchestration
///
/// **Responsibility:**
/// Apply an execution engine across a list of test cases and collect the
/// verdicts produced by the evaluator.
///
/// **Guarantees:**
/// - One evaluation per selected case, sequential, no retries
/// - Results come back in the order of the input list
/// - A failing or erroring case never stops the batch
/// - Never fails: the report is always complete

use crate::engine::ExecutionEngine;
use crate::evaluator::judge_case;
use aigrade_common::types::{CaseResult, Language, TestCase};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

pub const UNSUPPORTED_LANGUAGE: &str = "Simulation supports JavaScript only.";

/// Which cases a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunScope {
    /// Sample (public) cases only
    Samples,
    /// Sample and hidden cases, in their original order
    All,
}

impl RunScope {
    pub fn select<'a>(&self, cases: &'a [TestCase]) -> Vec<&'a TestCase> {
        match self {
            RunScope::Samples => cases.iter().filter(|tc| tc.is_sample()).collect(),
            RunScope::All => cases.iter().collect(),
        }
    }
}

impl fmt::Display for RunScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunScope::Samples => write!(f, "samples"),
            RunScope::All => write!(f, "all"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    pub results: Vec<CaseResult>,
}

impl RunReport {
    /// AND over every verdict; an empty run passes
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.pass)
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.pass).count()
    }

    /// One line per case, optionally preceded by an overall headline
    pub fn summary(&self, headline: bool) -> String {
        let lines = self
            .results
            .iter()
            .map(|r| format!("{} {}", if r.pass { "✅" } else { "❌" }, r.message))
            .collect::<Vec<_>>()
            .join("\n");

        if !headline {
            return lines;
        }

        let head = if self.all_passed() {
            "✅ All tests passed!"
        } else {
            "❌ Some tests failed"
        };
        format!("{}\n\n{}", head, lines)
    }
}

/// Run `code` against the cases selected by `scope`
pub async fn run_cases(
    engine: &dyn ExecutionEngine,
    language: Language,
    code: &str,
    cases: &[TestCase],
    scope: RunScope,
) -> RunReport {
    let selected = scope.select(cases);

    info!(
        engine = engine.name(),
        language = %language,
        scope = %scope,
        test_cases = selected.len(),
        source_size = code.len(),
        "Running test cases"
    );

    let start = Instant::now();
    let mut results = Vec::with_capacity(selected.len());

    for test_case in selected {
        let result = if language != Language::JavaScript {
            CaseResult {
                id: test_case.id.clone(),
                pass: false,
                message: UNSUPPORTED_LANGUAGE.to_string(),
            }
        } else {
            let evaluation = engine.evaluate(code, &test_case.input).await;
            judge_case(test_case, &evaluation)
        };

        debug!(
            test_id = %result.id,
            pass = result.pass,
            message = %result.message,
            "Test result"
        );
        results.push(result);
    }

    let report = RunReport { results };

    info!(
        passed = report.passed_count(),
        total = report.results.len(),
        execution_ms = start.elapsed().as_millis() as u64,
        "Run complete"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Evaluation;
    use aigrade_common::types::TestCaseKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stands in for a runtime executing a fixed `solve` implementation
    struct FnEngine<F> {
        solve: F,
        calls: AtomicUsize,
    }

    impl<F> FnEngine<F>
    where
        F: Fn(&str) -> Evaluation + Send + Sync,
    {
        fn new(solve: F) -> Self {
            Self {
                solve,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl<F> ExecutionEngine for FnEngine<F>
    where
        F: Fn(&str) -> Evaluation + Send + Sync,
    {
        fn name(&self) -> &'static str {
            "fn"
        }

        async fn evaluate(&self, _code: &str, input: &str) -> Evaluation {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.solve)(input)
        }
    }

    fn identity() -> FnEngine<impl Fn(&str) -> Evaluation + Send + Sync> {
        FnEngine::new(|input: &str| Evaluation::Output(input.to_string()))
    }

    /// `Number(input) + 10` with JavaScript's NaN for non-numeric input
    fn add_ten() -> FnEngine<impl Fn(&str) -> Evaluation + Send + Sync> {
        FnEngine::new(|input: &str| match input.trim().parse::<f64>() {
            Ok(n) => Evaluation::Output((n + 10.0).to_string()),
            Err(_) => Evaluation::Output("NaN".to_string()),
        })
    }

    fn sample(id: &str, input: &str, expected: &str) -> TestCase {
        TestCase::new(id, input, expected, TestCaseKind::Sample)
    }

    fn hidden(id: &str, input: &str, expected: &str) -> TestCase {
        TestCase::new(id, input, expected, TestCaseKind::Hidden)
    }

    const CODE: &str = "function solve(input){ return input; }";

    #[tokio::test]
    async fn test_identity_passes_only_when_expected_equals_input() {
        let engine = identity();
        let cases = vec![sample("a", "hello", "hello"), sample("b", "hello", "world")];

        let report = run_cases(&engine, Language::JavaScript, CODE, &cases, RunScope::All).await;

        assert!(report.results[0].pass);
        assert!(!report.results[1].pass);
        assert_eq!(report.results[1].message, "Expected 'world' but got 'hello'");
        assert!(!report.all_passed());
    }

    #[tokio::test]
    async fn test_missing_solve_fails_every_case() {
        let engine = FnEngine::new(|_: &str| Evaluation::Error(crate::harness::MISSING_SOLVE.to_string()));
        let cases = vec![sample("a", "1", "1"), hidden("b", "2", "2")];

        let report = run_cases(&engine, Language::JavaScript, "let x = 1;", &cases, RunScope::All).await;

        assert_eq!(report.results.len(), 2);
        for result in &report.results {
            assert!(!result.pass);
            assert_eq!(result.message, "Error: Please define a function named solve(input).");
        }
    }

    #[tokio::test]
    async fn test_throwing_solve_fails_every_case() {
        let engine = FnEngine::new(|_: &str| Evaluation::Error("x".to_string()));
        let cases = vec![sample("a", "1", "1"), sample("b", "2", "2")];

        let report = run_cases(&engine, Language::JavaScript, CODE, &cases, RunScope::All).await;

        assert!(report.results.iter().all(|r| !r.pass && r.message == "Error: x"));
    }

    #[tokio::test]
    async fn test_trim_policy() {
        let engine = identity();
        let cases = vec![sample("a", "5\n", "5"), sample("b", "5 6", "56")];

        let report = run_cases(&engine, Language::JavaScript, CODE, &cases, RunScope::All).await;

        assert!(report.results[0].pass);
        assert!(!report.results[1].pass);
    }

    #[tokio::test]
    async fn test_empty_case_list_passes_vacuously() {
        let engine = identity();

        let report = run_cases(&engine, Language::JavaScript, CODE, &[], RunScope::All).await;

        assert!(report.results.is_empty());
        assert!(report.all_passed());
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_order_is_preserved() {
        let engine = identity();
        let cases = vec![
            sample("A", "x", "wrong"),
            sample("B", "y", "y"),
            sample("C", "z", "also wrong"),
        ];

        let report = run_cases(&engine, Language::JavaScript, CODE, &cases, RunScope::All).await;

        let ids: Vec<_> = report.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(
            report.results.iter().map(|r| r.pass).collect::<Vec<_>>(),
            vec![false, true, false]
        );
    }

    #[tokio::test]
    async fn test_runs_are_idempotent() {
        let engine = add_ten();
        let cases = vec![sample("a", "5", "15"), sample("b", "abc", "15")];

        let first = run_cases(&engine, Language::JavaScript, CODE, &cases, RunScope::All).await;
        let second = run_cases(&engine, Language::JavaScript, CODE, &cases, RunScope::All).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_add_ten_scenarios() {
        let engine = add_ten();
        let cases = vec![sample("ok", "5", "15"), sample("nan", "abc", "15")];

        let report = run_cases(&engine, Language::JavaScript, CODE, &cases, RunScope::All).await;

        assert!(report.results[0].pass);
        assert_eq!(report.results[0].message, "Passed");
        assert!(!report.results[1].pass);
        assert_eq!(report.results[1].message, "Expected '15' but got 'NaN'");
    }

    #[tokio::test]
    async fn test_sample_scope_skips_hidden_cases() {
        let engine = identity();
        let cases = vec![
            sample("s1", "a", "a"),
            hidden("h1", "b", "b"),
            sample("s2", "c", "c"),
        ];

        let samples = run_cases(&engine, Language::JavaScript, CODE, &cases, RunScope::Samples).await;
        assert_eq!(
            samples.results.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["s1", "s2"]
        );
        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);

        let all = run_cases(&engine, Language::JavaScript, CODE, &cases, RunScope::All).await;
        assert_eq!(
            all.results.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["s1", "h1", "s2"]
        );
    }

    #[tokio::test]
    async fn test_non_javascript_is_not_executed() {
        let engine = identity();
        let cases = vec![sample("a", "1", "1")];

        let report = run_cases(&engine, Language::Python, "def solve(i): return i", &cases, RunScope::All).await;

        assert!(!report.results[0].pass);
        assert_eq!(report.results[0].message, "Simulation supports JavaScript only.");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_summary_rendering() {
        let report = RunReport {
            results: vec![
                CaseResult {
                    id: "a".to_string(),
                    pass: true,
                    message: "Passed".to_string(),
                },
                CaseResult {
                    id: "b".to_string(),
                    pass: false,
                    message: "Error: x".to_string(),
                },
            ],
        };

        assert_eq!(report.summary(false), "✅ Passed\n❌ Error: x");
        assert_eq!(
            report.summary(true),
            "❌ Some tests failed\n\n✅ Passed\n❌ Error: x"
        );
        assert_eq!(report.passed_count(), 1);

        let clean = RunReport::default();
        assert!(clean.summary(true).starts_with("✅ All tests passed!"));
    }
}
