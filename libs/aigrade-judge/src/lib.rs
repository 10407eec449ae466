//! Local judging of `solve(input)` submissions.
//!
//! - [`engine`]: runs the harness out of process and yields an [`engine::Evaluation`]
//! - [`evaluator`]: the trimmed-equality comparison policy
//! - [`executor`]: applies an engine over a list of test cases

pub mod capture;
pub mod config;
pub mod docker;
pub mod engine;
pub mod evaluator;
pub mod executor;
pub mod harness;


pub use config::{EngineKind, JudgeConfig};
pub use engine::{build_engine, Evaluation, ExecutionEngine, ProcessEngine};
pub use executor::{run_cases, RunReport, RunScope};
