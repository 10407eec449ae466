// CLI commands for the grading platform
use aigrade_client::api::envelope_message;
use aigrade_client::{ApiClient, ApiResponse, ContestQuery, Debouncer, LeaderboardQuery, SessionStore};
use aigrade_common::config::ClientConfig;
use aigrade_common::types::{
    Contest, DifficultyLevel, Language, LeaderboardEntry, NewContest, NewProblem, NewTestCase,
    Problem, RegisterRequest, SubmissionPayload, SubmissionType, SubmittedTestCase, TestCase,
};
use aigrade_judge::{build_engine, run_cases, EngineKind, JudgeConfig, RunScope};
use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde_json::Value;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::task::JoinSet;
use tracing::debug;

/// Resolved configuration shared by every command
pub struct Context {
    pub api: ApiClient,
    pub judge: JudgeConfig,
}

impl Context {
    pub fn load(api_base: Option<&str>, engine: Option<&str>, timeout_ms: Option<u64>) -> Result<Self> {
        let mut client_config = ClientConfig::from_env().context("Invalid client configuration")?;
        if let Some(base) = api_base {
            client_config.api_base = base.to_string();
        }

        let mut judge = JudgeConfig::from_env().context("Invalid judge configuration")?;
        if let Some(engine) = engine {
            judge.engine = EngineKind::from_str(engine)
                .with_context(|| format!("Unknown engine '{}' (expected process or docker)", engine))?;
        }
        if let Some(ms) = timeout_ms {
            judge.timeout_ms = ms;
        }

        let session = match &client_config.session_file {
            Some(path) => SessionStore::open(path),
            None => SessionStore::in_memory(),
        };

        debug!(
            api_base = %client_config.api_base,
            engine = %judge.engine,
            timeout_ms = judge.timeout_ms,
            "Configuration loaded"
        );

        Ok(Self {
            api: ApiClient::new(&client_config, session),
            judge,
        })
    }
}

/// Successful payload or an error carrying the server's message
fn require<T>(response: ApiResponse<T>, action: &str) -> Result<Option<T>> {
    response
        .into_result()
        .with_context(|| format!("Failed to {}", action))
}

fn require_data<T>(response: ApiResponse<T>, action: &str) -> Result<T> {
    require(response, action)?.with_context(|| format!("Failed to {}: empty response", action))
}

/// Print the server's message for a body-less acknowledgement
fn acknowledge(response: ApiResponse<Value>, action: &str, fallback: &str) -> Result<()> {
    let body = require(response, action)?;
    let message = body.as_ref().and_then(envelope_message).unwrap_or(fallback);
    println!("✅ {}", message);
    Ok(())
}

/// Hidden prompt on a terminal, one plain line when stdin is piped
fn prompt_secret(label: &str, given: Option<String>) -> Result<String> {
    if let Some(value) = given {
        return require_secret(label, value);
    }

    let value = if io::stdin().is_terminal() {
        rpassword::prompt_password(format!("{}: ", label)).context("Failed to read password")?
    } else {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        line
    };
    require_secret(label, value)
}

fn require_secret(label: &str, value: String) -> Result<String> {
    let value = value.trim_end_matches(&['\r', '\n'][..]).to_string();
    if value.is_empty() {
        bail!("{} cannot be empty", label);
    }
    Ok(value)
}

// ---- auth ----

pub async fn login(ctx: &Context, email: &str, password: Option<String>) -> Result<()> {
    let password = prompt_secret("Password", password)?;
    let auth = require_data(ctx.api.login(email, &password).await, "log in")?;

    println!(
        "✅ Logged in as {} {} ({})",
        auth.user.first_name,
        auth.user.last_name,
        auth.user.role.normalized()
    );
    if let Some(path) = ctx.api.session().path() {
        println!("🔑 Session stored in {}", path.display());
    }
    Ok(())
}

pub fn logout(ctx: &Context) {
    ctx.api.logout();
    println!("👋 Logged out");
}

pub async fn register(
    ctx: &Context,
    first_name: String,
    last_name: String,
    email: String,
    password: Option<String>,
) -> Result<()> {
    let request = RegisterRequest {
        first_name,
        last_name,
        email,
        password: prompt_secret("Password", password)?,
    };
    acknowledge(
        ctx.api.register(&request).await,
        "register",
        "Account created. Check your email for a verification code.",
    )
}

pub fn whoami(ctx: &Context) {
    let session = ctx.api.session();
    match (session.user(), session.role()) {
        (Some(user), Some(role)) if session.is_logged_in() => {
            println!("👤 {} {} <{}>", user.first_name, user.last_name, user.email);
            println!("   id: {}", user.id);
            println!("   role: {}", role);
            if !user.email_verified {
                println!("⚠️  Email not verified");
            }
        }
        _ => println!("Not logged in"),
    }
}

pub async fn forgot_password(ctx: &Context, email: &str) -> Result<()> {
    acknowledge(
        ctx.api.forgot_password(email).await,
        "request a password reset",
        "Password reset email sent",
    )
}

pub async fn reset_password(ctx: &Context, token: &str, password: Option<String>) -> Result<()> {
    let password = prompt_secret("New password", password)?;
    acknowledge(
        ctx.api.reset_password(token, &password).await,
        "reset password",
        "Password updated",
    )
}

pub async fn send_otp(ctx: &Context, email: &str) -> Result<()> {
    acknowledge(ctx.api.send_otp(email).await, "send verification code", "Verification code sent")
}

pub async fn verify_email(ctx: &Context, email: &str, otp: &str) -> Result<()> {
    acknowledge(
        ctx.api.verify_email(email, otp).await,
        "verify email",
        "Email verified",
    )
}

// ---- profile ----

pub async fn show_profile(ctx: &Context) -> Result<()> {
    let user = require_data(ctx.api.profile().await, "load profile")?;
    println!("👤 {} {} <{}>", user.first_name, user.last_name, user.email);
    println!("   id: {}", user.id);
    println!("   role: {}", user.role.normalized());
    println!("   verified: {}", if user.email_verified { "yes" } else { "no" });
    Ok(())
}

pub async fn update_profile(
    ctx: &Context,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<()> {
    let current = ctx.api.session().user();
    let first_name = first_name
        .or_else(|| current.as_ref().map(|u| u.first_name.clone()))
        .context("--first-name is required when no session user is cached")?;
    let last_name = last_name
        .or_else(|| current.as_ref().map(|u| u.last_name.clone()))
        .context("--last-name is required when no session user is cached")?;

    let user = require_data(
        ctx.api.update_profile(&first_name, &last_name).await,
        "update profile",
    )?;
    println!("✅ Profile updated: {} {}", user.first_name, user.last_name);
    Ok(())
}

// ---- contests ----

fn print_contests(contests: &[Contest]) {
    if contests.is_empty() {
        println!("No contests found");
        return;
    }
    for contest in contests {
        let window = match (&contest.start_time, &contest.end_time) {
            (Some(start), Some(end)) => format!("{} → {}", start, end),
            (Some(start), None) => format!("from {}", start),
            _ => String::new(),
        };
        println!("{:<38} {:<32} {}", contest.id, contest.name, window);
    }
}

pub async fn list_contests(ctx: &Context, search: Option<String>) -> Result<()> {
    let query = ContestQuery {
        search,
        ..ContestQuery::default()
    };
    let contests = require(ctx.api.contests(&query).await, "load contests")?.unwrap_or_default();
    print_contests(&contests);
    Ok(())
}

pub async fn my_contests(ctx: &Context) -> Result<()> {
    let contests = require(ctx.api.my_contests().await, "load your contests")?.unwrap_or_default();
    print_contests(&contests);
    Ok(())
}

pub async fn show_contest(ctx: &Context, id: &str) -> Result<()> {
    let contest = require_data(ctx.api.contest(id).await, "load contest")?;
    println!("🏆 {}", contest.name);
    println!("   id: {}", contest.id);
    if let Some(description) = contest.description.as_deref().filter(|d| !d.is_empty()) {
        println!("   {}", description);
    }
    if let Some(start) = &contest.start_time {
        println!("   starts: {}", start);
    }
    if let Some(end) = &contest.end_time {
        println!("   ends: {}", end);
    }
    if let Some(key) = &contest.enrollment_key {
        println!("   enrollment key: {}", key);
    }
    Ok(())
}

pub async fn create_contest(
    ctx: &Context,
    name: String,
    description: String,
    enrollment_key: String,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
) -> Result<()> {
    if let (Some(start), Some(end)) = (start_time, end_time) {
        if end <= start {
            bail!("Contest end must be after its start");
        }
    }

    let contest = NewContest {
        name,
        description,
        enrollment_key,
        start_time,
        end_time,
    };
    let created = require(ctx.api.create_contest(contest).await?, "create contest")?;
    match created.as_ref().and_then(|c| c.get("id")).and_then(Value::as_str) {
        Some(id) => println!("✅ Contest created: {}", id),
        None => println!("✅ Contest created"),
    }
    Ok(())
}

pub async fn delete_contest(ctx: &Context, id: &str) -> Result<()> {
    require(ctx.api.delete_contest(id).await, "delete contest")?;
    println!("🗑️  Contest {} deleted", id);
    Ok(())
}

pub async fn enroll(ctx: &Context, contest_id: &str, key: &str) -> Result<()> {
    acknowledge(
        ctx.api.enroll(contest_id, key).await,
        "enroll",
        "Enrolled successfully",
    )
}

pub async fn assign_problems(ctx: &Context, contest_id: &str, problem_ids: &[String]) -> Result<()> {
    require(
        ctx.api.assign_problems(contest_id, problem_ids).await,
        "assign problems",
    )?;
    println!("✅ Assigned {} problem(s) to {}", problem_ids.len(), contest_id);
    Ok(())
}

pub async fn contest_problems(ctx: &Context, contest_id: &str) -> Result<()> {
    let problems = require(
        ctx.api.contest_problems(contest_id).await,
        "load contest problems",
    )?
    .unwrap_or_default();
    print_problems(&problems);
    Ok(())
}

/// Each stdin line is a query; only the latest query's results are printed
pub async fn search_contests(ctx: &Context, delay_ms: u64) -> Result<()> {
    let debouncer = Debouncer::new(Duration::from_millis(delay_ms));
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut searches = JoinSet::new();

    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        let debouncer = debouncer.clone();
        let fetch = {
            let api = ctx.api.clone();
            let query = ContestQuery {
                search: Some(line.clone()),
                ..ContestQuery::default()
            };
            move || async move { api.contests(&query).await }
        };

        searches.spawn(async move {
            if let Some(response) = debouncer.run(fetch).await {
                println!("🔎 {}", line.trim());
                match response.into_result() {
                    Ok(contests) => print_contests(&contests.unwrap_or_default()),
                    Err(e) => println!("❌ {}", e),
                }
            }
        });
    }

    while let Some(joined) = searches.join_next().await {
        joined.context("Search task failed")?;
    }
    Ok(())
}

// ---- problems ----

fn print_problems(problems: &[Problem]) {
    if problems.is_empty() {
        println!("No problems found");
        return;
    }
    for problem in problems {
        println!(
            "{:<38} {:<8} {} ({} tests)",
            problem.id,
            problem.difficulty_level.to_string(),
            problem.title,
            problem.test_cases.len()
        );
    }
}

pub async fn list_problems(ctx: &Context, all: bool) -> Result<()> {
    let response = if all {
        ctx.api.all_problems().await
    } else {
        ctx.api.problems().await
    };
    print_problems(&require(response, "load problems")?.unwrap_or_default());
    Ok(())
}

pub async fn show_problem(ctx: &Context, id: &str) -> Result<()> {
    let problem = require_data(ctx.api.problem(id).await, "load problem")?;
    println!("📄 {} [{}]", problem.title, problem.difficulty_level);
    println!();
    println!("{}", problem.statement);

    for (i, tc) in problem.sample_tests().iter().enumerate() {
        println!();
        println!("Sample {}:", i + 1);
        println!("  input:    {}", tc.input);
        println!("  expected: {}", tc.expected_output);
    }
    let hidden = problem.hidden_tests().len();
    if hidden > 0 {
        println!();
        println!("🔒 {} hidden test(s)", hidden);
    }
    Ok(())
}

pub async fn create_problem(
    ctx: &Context,
    title: String,
    statement: &str,
    difficulty: &str,
    tests: &Path,
) -> Result<()> {
    let statement = match statement.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read statement from {}", path))?,
        None => statement.to_string(),
    };
    let difficulty_level = DifficultyLevel::from_str(difficulty)
        .with_context(|| format!("Unknown difficulty '{}' (expected easy, medium or hard)", difficulty))?;
    let test_cases = load_test_cases(tests)?
        .iter()
        .map(NewTestCase::from)
        .collect();

    let problem = NewProblem {
        title,
        statement,
        difficulty_level,
        test_cases,
    };
    let created = require(ctx.api.create_problem(problem).await?, "create problem")?;
    match created.as_ref().and_then(|p| p.get("id")).and_then(Value::as_str) {
        Some(id) => println!("✅ Problem created: {}", id),
        None => println!("✅ Problem created"),
    }
    Ok(())
}

pub async fn delete_problem(ctx: &Context, id: &str) -> Result<()> {
    require(ctx.api.delete_problem(id).await, "delete problem")?;
    println!("🗑️  Problem {} deleted", id);
    Ok(())
}

// ---- leaderboard ----

pub async fn leaderboard(
    ctx: &Context,
    contest_id: String,
    search: Option<String>,
    page: u32,
    size: u32,
    csv: Option<Option<PathBuf>>,
) -> Result<()> {
    let query = LeaderboardQuery {
        search,
        page,
        size,
        ..LeaderboardQuery::new(contest_id.clone())
    };
    let standings = require_data(ctx.api.leaderboard(&query).await, "load leaderboard")?;

    if let Some(path) = csv {
        let path = path.unwrap_or_else(|| PathBuf::from(format!("leaderboard-{}.csv", contest_id)));
        let mut content = Vec::new();
        write_leaderboard_csv(&mut content, &standings.data)?;
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("✅ Exported {} entries to {}", standings.data.len(), path.display());
        return Ok(());
    }

    if standings.data.is_empty() {
        println!("No entries yet");
        return Ok(());
    }
    println!("{:>4}  {:<28} {:>8} {:>7}", "Rank", "Student", "Score", "Solved");
    for entry in &standings.data {
        println!(
            "{:>4}  {:<28} {:>8.1} {:>7}",
            entry.rank, entry.student_name, entry.total_score, entry.problems_solved
        );
    }
    println!(
        "\nPage {} of {}",
        standings.page.unwrap_or(page) + 1,
        standings.total_pages.max(1)
    );
    Ok(())
}

/// Standings as CSV: header row, one row per entry, `\n` line endings
pub fn write_leaderboard_csv<W: Write>(writer: W, entries: &[LeaderboardEntry]) -> Result<()> {
    if entries.is_empty() {
        bail!("No leaderboard data to export");
    }

    let mut out = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    out.write_record(["Rank", "Student Name", "Score", "Problems Solved", "Last Submission"])?;
    for entry in entries {
        out.write_record([
            entry.rank.to_string(),
            entry.student_name.clone(),
            format!("{:.1}", entry.total_score),
            entry.problems_solved.to_string(),
            entry
                .last_submission_time
                .as_deref()
                .map(submission_time)
                .unwrap_or_default(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// `yyyy-MM-dd HH:mm`, local time for zoned stamps; unparseable values pass through
fn submission_time(raw: &str) -> String {
    const FORMAT: &str = "%Y-%m-%d %H:%M";
    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return zoned.with_timezone(&Local).format(FORMAT).to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => naive.format(FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

// ---- running and submitting ----

/// Parse a JSON array of test cases; ids are generated when missing
pub fn parse_test_cases(content: &str) -> Result<Vec<TestCase>> {
    let cases: Vec<TestCase> =
        serde_json::from_str(content).context("Test file must be a JSON array of test cases")?;
    if cases.is_empty() {
        bail!("Test file contains no test cases");
    }
    Ok(cases)
}

fn load_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read test file {}", path.display()))?;
    parse_test_cases(&content).with_context(|| format!("Invalid test file {}", path.display()))
}

fn parse_language(language: &str) -> Result<Language> {
    Language::from_str(language)
        .with_context(|| format!("Unknown language '{}' (expected javascript or python)", language))
}

/// Where a solution and its test cases come from
pub struct SolutionSource<'a> {
    pub code: &'a Path,
    pub problem: Option<&'a str>,
    pub tests: Option<&'a Path>,
    pub language: &'a str,
}

async fn resolve_cases(ctx: &Context, problem: Option<&str>, tests: Option<&Path>) -> Result<Vec<TestCase>> {
    match (problem, tests) {
        (Some(id), _) => Ok(require_data(ctx.api.problem(id).await, "load problem")?.test_cases),
        (None, Some(path)) => load_test_cases(path),
        (None, None) => bail!("Provide --problem or --tests"),
    }
}

/// Run locally and print the report; returns whether every case passed
pub async fn run_solution(
    ctx: &Context,
    code_path: &Path,
    problem: Option<&str>,
    tests: Option<&Path>,
    language: &str,
    all: bool,
) -> Result<bool> {
    let language = parse_language(language)?;
    let code = fs::read_to_string(code_path)
        .with_context(|| format!("Failed to read solution {}", code_path.display()))?;
    let cases = resolve_cases(ctx, problem, tests).await?;
    let scope = if all { RunScope::All } else { RunScope::Samples };

    let engine = build_engine(&ctx.judge)?;
    println!(
        "🚀 Running {} {} case(s) with the {} engine...",
        scope.select(&cases).len(),
        scope,
        engine.name()
    );

    let report = run_cases(engine.as_ref(), language, &code, &cases, scope).await;
    if report.results.is_empty() {
        println!("⚠️  No test cases to run");
        return Ok(true);
    }

    println!("{}", report.summary(true));
    println!(
        "\n{}/{} passed",
        report.passed_count(),
        report.results.len()
    );
    Ok(report.all_passed())
}

/// Build the submission body from the chosen cases
pub fn build_submission(
    graded_result_id: String,
    student_id: String,
    submission_type: SubmissionType,
    language: Language,
    code: String,
    cases: &[TestCase],
) -> SubmissionPayload {
    let scope = match submission_type {
        SubmissionType::Sample => RunScope::Samples,
        SubmissionType::Final => RunScope::All,
    };
    let test_cases = scope
        .select(cases)
        .into_iter()
        .map(|tc| SubmittedTestCase {
            input: tc.input.clone(),
            expected_output: tc.expected_output.clone(),
        })
        .collect();

    SubmissionPayload {
        graded_result_id,
        student_id,
        submission_type,
        language,
        code,
        test_cases,
    }
}

/// Submit for grading; returns whether the grader accepted the submission
pub async fn submit(
    ctx: &Context,
    source: SolutionSource<'_>,
    graded_result_id: String,
    student_id: Option<String>,
    final_submission: bool,
) -> Result<bool> {
    let language = parse_language(source.language)?;
    let code = fs::read_to_string(source.code)
        .with_context(|| format!("Failed to read solution {}", source.code.display()))?;
    let cases = resolve_cases(ctx, source.problem, source.tests).await?;

    let student_id = match student_id.or_else(|| ctx.api.session().user().map(|u| u.id)) {
        Some(id) => id,
        None => bail!("Log in or pass --student-id"),
    };
    let submission_type = if final_submission {
        SubmissionType::Final
    } else {
        SubmissionType::Sample
    };

    let payload = build_submission(graded_result_id, student_id, submission_type, language, code, &cases);
    println!("📤 Submitting {} case(s)...", payload.test_cases.len());

    let response = ctx.api.submit(&payload).await;
    if !response.success {
        println!("❌ {}", response.message);
        return Ok(false);
    }

    if !response.message.is_empty() {
        println!("✅ {}", response.message);
    }
    for result in response.results.unwrap_or_default() {
        println!("{} {}", if result.pass { "✅" } else { "❌" }, result.message);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aigrade_common::types::TestCaseKind;

    fn entry(rank: u32, name: &str, score: f64, last: Option<&str>) -> LeaderboardEntry {
        LeaderboardEntry {
            id: format!("s-{}", rank),
            student_name: name.to_string(),
            total_score: score,
            rank,
            problems_solved: 2,
            last_submission_time: last.map(str::to_string),
        }
    }

    #[test]
    fn test_leaderboard_csv_escapes_fields() {
        let entries = [
            entry(1, "Lovelace, Ada", 95.0, Some("2025-03-01T09:30:00")),
            entry(2, "Grace \"Amazing\" Hopper", 87.26, None),
            entry(3, "Plain", 10.0, Some("yesterday")),
        ];
        let mut out = Vec::new();
        write_leaderboard_csv(&mut out, &entries).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Rank,Student Name,Score,Problems Solved,Last Submission\n\
             1,\"Lovelace, Ada\",95.0,2,2025-03-01 09:30\n\
             2,\"Grace \"\"Amazing\"\" Hopper\",87.3,2,\n\
             3,Plain,10.0,2,yesterday\n"
        );
    }

    #[test]
    fn test_leaderboard_csv_rejects_empty_standings() {
        let mut out = Vec::new();
        let err = write_leaderboard_csv(&mut out, &[]).unwrap_err();
        assert_eq!(err.to_string(), "No leaderboard data to export");
        assert!(out.is_empty());
    }

    #[test]
    fn test_require_secret() {
        assert_eq!(require_secret("Password", "hunter2\r\n".to_string()).unwrap(), "hunter2");
        assert_eq!(require_secret("Password", "p w".to_string()).unwrap(), "p w");
        let err = require_secret("Password", "\n".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Password cannot be empty");
    }

    #[test]
    fn test_parse_test_cases_generates_ids() {
        let cases = parse_test_cases(
            r#"[
                {"input": "5", "expectedOutput": "15"},
                {"id": "h1", "input": "0", "expectedOutput": "10", "type": "HIDDEN"}
            ]"#,
        )
        .unwrap();

        assert_eq!(cases.len(), 2);
        assert!(!cases[0].id.is_empty());
        assert_eq!(cases[0].kind, TestCaseKind::Sample);
        assert_eq!(cases[1].id, "h1");
        assert_eq!(cases[1].kind, TestCaseKind::Hidden);
    }

    #[test]
    fn test_parse_test_cases_rejects_empty_and_garbage() {
        assert!(parse_test_cases("[]").is_err());
        assert!(parse_test_cases("{\"input\": 1}").is_err());
    }

    #[test]
    fn test_sample_submission_drops_hidden_cases() {
        let cases = vec![
            TestCase::new("s1", "5", "15", TestCaseKind::Sample),
            TestCase::new("h1", "0", "10", TestCaseKind::Hidden),
        ];

        let sample = build_submission(
            "g".to_string(),
            "s".to_string(),
            SubmissionType::Sample,
            Language::JavaScript,
            "code".to_string(),
            &cases,
        );
        assert_eq!(sample.test_cases.len(), 1);
        assert_eq!(sample.test_cases[0].expected_output, "15");

        let final_run = build_submission(
            "g".to_string(),
            "s".to_string(),
            SubmissionType::Final,
            Language::JavaScript,
            "code".to_string(),
            &cases,
        );
        assert_eq!(final_run.test_cases.len(), 2);
    }

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language("JS").unwrap(), Language::JavaScript);
        assert!(parse_language("cobol").is_err());
    }
}
