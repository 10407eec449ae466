mod commands;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aigrade")]
#[command(about = "AI Grading System - contests, problems and local solution runs", long_about = None)]
struct Cli {
    /// API base URL (overrides AIGRADE_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Evaluation engine: process or docker (overrides AIGRADE_ENGINE)
    #[arg(long, global = true)]
    engine: Option<String>,

    /// Time limit for one evaluation in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        /// Prompted for (hidden) when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Create a new account
    Register {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(short, long)]
        email: String,

        /// Prompted for (hidden) when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Show the logged-in user and role
    Whoami,

    /// Request a password reset email
    ForgotPassword {
        #[arg(short, long)]
        email: String,
    },

    /// Set a new password with a reset token
    ResetPassword {
        #[arg(short, long)]
        token: String,

        /// Prompted for (hidden) when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Send an email verification code
    SendOtp {
        #[arg(short, long)]
        email: String,
    },

    /// Verify an email address with the received code
    VerifyEmail {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        otp: String,
    },

    /// View or edit the profile
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Contest management and enrollment
    #[command(subcommand)]
    Contests(ContestCommands),

    /// Problem management
    #[command(subcommand)]
    Problems(ProblemCommands),

    /// Contest standings
    Leaderboard {
        #[arg(short, long)]
        contest_id: String,

        /// Filter by student name
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, default_value = "0")]
        page: u32,

        #[arg(long, default_value = "10")]
        size: u32,

        /// Export the page as CSV (default file: leaderboard-<contest-id>.csv)
        #[arg(long, value_name = "PATH")]
        csv: Option<Option<PathBuf>>,
    },

    /// Run a solution locally against test cases
    Run {
        /// Solution source file
        #[arg(short, long)]
        code: PathBuf,

        /// Take test cases from this problem
        #[arg(short, long, conflicts_with = "tests")]
        problem: Option<String>,

        /// Take test cases from a JSON file
        #[arg(short, long)]
        tests: Option<PathBuf>,

        #[arg(short, long, default_value = "javascript")]
        language: String,

        /// Include hidden cases
        #[arg(long)]
        all: bool,
    },

    /// Submit a solution for grading
    Submit {
        /// Solution source file
        #[arg(short, long)]
        code: PathBuf,

        #[arg(short, long, conflicts_with = "tests")]
        problem: Option<String>,

        #[arg(short, long)]
        tests: Option<PathBuf>,

        #[arg(short, long, default_value = "javascript")]
        language: String,

        #[arg(long)]
        graded_result_id: String,

        /// Defaults to the logged-in user
        #[arg(long)]
        student_id: Option<String>,

        /// Final submission over every case instead of samples only
        #[arg(long = "final")]
        final_submission: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Fetch the profile from the server
    Show,

    /// Change first and last name
    Update {
        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },
}

#[derive(Subcommand)]
enum ContestCommands {
    /// List contests
    List {
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Contests the current user is enrolled in or owns
    Mine,

    Show {
        id: String,
    },

    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(short, long)]
        enrollment_key: String,

        /// RFC 3339, e.g. 2025-03-01T09:00:00Z
        #[arg(long)]
        start: Option<DateTime<Utc>>,

        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },

    Delete {
        id: String,
    },

    /// Join a contest with its enrollment key
    Enroll {
        #[arg(short, long)]
        contest_id: String,

        #[arg(short, long)]
        key: String,
    },

    /// Attach problems to a contest
    Assign {
        #[arg(short, long)]
        contest_id: String,

        /// Comma-separated problem ids
        #[arg(short, long, value_delimiter = ',', required = true)]
        problem_ids: Vec<String>,
    },

    /// Problems of a contest
    Problems {
        contest_id: String,
    },

    /// Interactive search: one query per stdin line, latest query wins
    Search {
        /// Debounce delay in milliseconds
        #[arg(long, default_value = "500")]
        delay_ms: u64,
    },
}

#[derive(Subcommand)]
enum ProblemCommands {
    /// Problems visible to the current user
    List {
        /// Every problem on the platform
        #[arg(long)]
        all: bool,
    },

    Show {
        id: String,
    },

    Create {
        #[arg(short, long)]
        title: String,

        /// Statement text, or @path to read it from a file
        #[arg(short, long)]
        statement: String,

        /// easy, medium or hard
        #[arg(short, long, default_value = "easy")]
        difficulty: String,

        /// JSON file with the test cases
        #[arg(long)]
        tests: PathBuf,
    },

    Delete {
        id: String,
    },
}

fn init_logging(verbose: bool, json: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    let ctx = commands::Context::load(
        cli.api_base.as_deref(),
        cli.engine.as_deref(),
        cli.timeout_ms,
    )?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::login(&ctx, &email, password).await?;
        }
        Commands::Logout => commands::logout(&ctx),
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
        } => {
            commands::register(&ctx, first_name, last_name, email, password).await?;
        }
        Commands::Whoami => commands::whoami(&ctx),
        Commands::ForgotPassword { email } => {
            commands::forgot_password(&ctx, &email).await?;
        }
        Commands::ResetPassword { token, password } => {
            commands::reset_password(&ctx, &token, password).await?;
        }
        Commands::SendOtp { email } => {
            commands::send_otp(&ctx, &email).await?;
        }
        Commands::VerifyEmail { email, otp } => {
            commands::verify_email(&ctx, &email, &otp).await?;
        }
        Commands::Profile(ProfileCommands::Show) => {
            commands::show_profile(&ctx).await?;
        }
        Commands::Profile(ProfileCommands::Update {
            first_name,
            last_name,
        }) => {
            commands::update_profile(&ctx, first_name, last_name).await?;
        }
        Commands::Contests(cmd) => match cmd {
            ContestCommands::List { search } => commands::list_contests(&ctx, search).await?,
            ContestCommands::Mine => commands::my_contests(&ctx).await?,
            ContestCommands::Show { id } => commands::show_contest(&ctx, &id).await?,
            ContestCommands::Create {
                name,
                description,
                enrollment_key,
                start,
                end,
            } => {
                commands::create_contest(&ctx, name, description, enrollment_key, start, end)
                    .await?
            }
            ContestCommands::Delete { id } => commands::delete_contest(&ctx, &id).await?,
            ContestCommands::Enroll { contest_id, key } => {
                commands::enroll(&ctx, &contest_id, &key).await?
            }
            ContestCommands::Assign {
                contest_id,
                problem_ids,
            } => commands::assign_problems(&ctx, &contest_id, &problem_ids).await?,
            ContestCommands::Problems { contest_id } => {
                commands::contest_problems(&ctx, &contest_id).await?
            }
            ContestCommands::Search { delay_ms } => {
                commands::search_contests(&ctx, delay_ms).await?
            }
        },
        Commands::Problems(cmd) => match cmd {
            ProblemCommands::List { all } => commands::list_problems(&ctx, all).await?,
            ProblemCommands::Show { id } => commands::show_problem(&ctx, &id).await?,
            ProblemCommands::Create {
                title,
                statement,
                difficulty,
                tests,
            } => commands::create_problem(&ctx, title, &statement, &difficulty, &tests).await?,
            ProblemCommands::Delete { id } => commands::delete_problem(&ctx, &id).await?,
        },
        Commands::Leaderboard {
            contest_id,
            search,
            page,
            size,
            csv,
        } => {
            commands::leaderboard(&ctx, contest_id, search, page, size, csv).await?;
        }
        Commands::Run {
            code,
            problem,
            tests,
            language,
            all,
        } => {
            let passed =
                commands::run_solution(&ctx, &code, problem.as_deref(), tests.as_deref(), &language, all)
                    .await?;
            if !passed {
                std::process::exit(1);
            }
        }
        Commands::Submit {
            code,
            problem,
            tests,
            language,
            graded_result_id,
            student_id,
            final_submission,
        } => {
            let source = commands::SolutionSource {
                code: &code,
                problem: problem.as_deref(),
                tests: tests.as_deref(),
                language: &language,
            };
            let accepted =
                commands::submit(&ctx, source, graded_result_id, student_id, final_submission).await?;
            if !accepted {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
