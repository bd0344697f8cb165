//! sqlgrade CLI
//!
//! Command-line tool for checking SQL exercise answers.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, warn, Level};
use tracing_subscriber::FmtSubscriber;

use sqlgrade_core::{is_equivalent, Analyzer, AnalyzerOptions, Issue, ResultSet, SchemaInfo};
use sqlgrade_sqlite::{fetch_result_set, introspect, Grader, Verdict};

/// Grades SQL answers and reports structural mistakes.
#[derive(Parser)]
#[command(name = "sqlgrade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL of the exercise database.
    #[arg(short, long, env = "DATABASE_URL")]
    database: Option<String>,

    /// JSON schema file; takes precedence over the database schema.
    #[arg(short, long, env = "SQLGRADE_SCHEMA")]
    schema: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, env = "SQLGRADE_FORMAT", value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Report structural issues in a query.
    Analyze {
        /// The query text.
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        sql: Option<String>,

        /// Read the query from a file.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Accept JOIN / INNER JOIN syntax.
        #[arg(long)]
        allow_explicit_join: bool,
    },

    /// Check whether two queries, or two stored results, hold the same data.
    Compare {
        /// Reference query.
        #[arg(long, requires = "actual", required_unless_present = "expected_json")]
        expected: Option<String>,

        /// Submitted query.
        #[arg(long, requires = "expected")]
        actual: Option<String>,

        /// Reference result as JSON.
        #[arg(long, requires = "actual_json", conflicts_with = "expected")]
        expected_json: Option<PathBuf>,

        /// Submitted result as JSON.
        #[arg(long, requires = "expected_json")]
        actual_json: Option<PathBuf>,
    },

    /// Compare a submission with the reference query and analyze it.
    Grade {
        /// Reference query.
        #[arg(long)]
        expected: String,

        /// Submitted query.
        #[arg(long)]
        actual: String,

        /// Accept JOIN / INNER JOIN syntax.
        #[arg(long)]
        allow_explicit_join: bool,
    },

    /// Print the extracted schema as JSON.
    Schema,
}

#[derive(Serialize)]
struct Comparison {
    equivalent: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Analyze {
            sql,
            file,
            allow_explicit_join,
        } => {
            let sql = match (sql, file) {
                (Some(sql), _) => sql.clone(),
                (None, Some(path)) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => return Err(anyhow!("No query given")),
            };
            let schema = load_schema(&cli).await?;
            let analyzer = Analyzer::with_options(schema, options(*allow_explicit_join));
            let issues = analyzer.analyze(&sql);
            print_issues(cli.format, &issues)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Compare {
            expected,
            actual,
            expected_json,
            actual_json,
        } => {
            let (expected, actual) = match (expected, actual, expected_json, actual_json) {
                (_, _, Some(expected), Some(actual)) => {
                    (read_result_set(expected)?, read_result_set(actual)?)
                }
                (Some(expected), Some(actual), _, _) => {
                    let pool = connect(&cli).await?;
                    (
                        fetch_result_set(&pool, expected).await?,
                        fetch_result_set(&pool, actual).await?,
                    )
                }
                _ => return Err(anyhow!("Give --expected/--actual or --expected-json/--actual-json")),
            };
            let equivalent = is_equivalent(&expected, &actual);
            match cli.format {
                Format::Text => println!("{}", if equivalent { "equivalent" } else { "not equivalent" }),
                Format::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&Comparison { equivalent })?
                ),
            }
            Ok(exit_code(equivalent))
        }

        Commands::Grade {
            expected,
            actual,
            allow_explicit_join,
        } => {
            let pool = connect(&cli).await?;
            let options = options(*allow_explicit_join);
            let grader = match &cli.schema {
                Some(path) => Grader::with_schema(pool, read_schema(path)?, options),
                None => Grader::new(pool, options).await?,
            };
            let verdict = grader.grade(expected, actual).await?;
            print_verdict(cli.format, &verdict)?;
            Ok(exit_code(verdict.passed()))
        }

        Commands::Schema => {
            let schema = load_schema(&cli).await?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

const fn options(allow_explicit_join: bool) -> AnalyzerOptions {
    AnalyzerOptions {
        forbid_explicit_join: !allow_explicit_join,
    }
}

const fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Exercise databases are opened read-only.
async fn connect(cli: &Cli) -> anyhow::Result<SqlitePool> {
    let url = cli
        .database
        .as_deref()
        .ok_or_else(|| anyhow!("This command needs --database or DATABASE_URL"))?;
    debug!(database = %url, "Connecting");
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("Invalid database URL {url}"))?
        .read_only(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open {url}"))?;
    Ok(pool)
}

/// Schema file first, then the database, then an empty schema.
async fn load_schema(cli: &Cli) -> anyhow::Result<SchemaInfo> {
    if let Some(path) = &cli.schema {
        return read_schema(path);
    }
    if cli.database.is_some() {
        let pool = connect(cli).await?;
        return Ok(introspect(&pool).await?);
    }
    warn!("No schema or database given; join conditions are unknown");
    Ok(SchemaInfo::default())
}

fn read_schema(path: &Path) -> anyhow::Result<SchemaInfo> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid schema in {}", path.display()))
}

fn read_result_set(path: &Path) -> anyhow::Result<ResultSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid result set in {}", path.display()))
}

fn print_issues(format: Format, issues: &[Issue]) -> anyhow::Result<()> {
    match format {
        Format::Text if issues.is_empty() => println!("No issues found."),
        Format::Text => {
            for issue in issues {
                println!("{issue}");
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(issues)?),
    }
    Ok(())
}

fn print_verdict(format: Format, verdict: &Verdict) -> anyhow::Result<()> {
    match format {
        Format::Text => {
            println!(
                "Result: {}",
                if verdict.equivalent { "equivalent" } else { "not equivalent" }
            );
            print_issues(format, &verdict.issues)?;
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(verdict)?),
    }
    Ok(())
}
